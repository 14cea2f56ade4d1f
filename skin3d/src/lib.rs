//! CPU-side skin data for GPU vertex skinning.
//!
//! A [`Skin`] stores baked per-frame bone matrices and turns per-bone influence lists into a
//! fixed-stride per-vertex table. Bone hierarchies, matrix math and asset import live elsewhere;
//! this crate only consumes them through [`BoneInfluences`] and [`Transform`].

#![forbid(unsafe_code)]

mod attribute;
mod bone;
mod error;
mod reorganize;
mod skin;
mod transform;

pub use attribute::*;
pub use bone::*;
pub use error::*;
pub use skin::*;
pub use transform::*;




#[cfg(test)]
mod skin_tests;
