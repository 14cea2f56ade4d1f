use std::sync::Arc;

use crate::{Error, MATRIX_LEN, Transform};

/// Bone-centric influence lists consumed by [`crate::Skin::reorganize_by_vertices`].
///
/// `vertex_ids()[i]` is influenced with weight `vertex_weights()[i]`; both slices must have the
/// same length.
pub trait BoneInfluences {
    fn vertex_ids(&self) -> &[u32];
    fn vertex_weights(&self) -> &[f32];
}

/// Bone providers are shared with the host's bone hierarchy, so the skin only holds a reference.
pub type SharedBone = Arc<dyn BoneInfluences + Send + Sync>;

/// A ready-made influence provider, as produced by a model importer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "BoneRepr"))]
pub struct Bone {
    /// Inverse bind pose, row-major.
    pub offset_matrix: [f32; MATRIX_LEN],
    vertex_ids: Vec<u32>,
    vertex_weights: Vec<f32>,
}

impl Bone {
    pub fn new(vertex_ids: Vec<u32>, vertex_weights: Vec<f32>) -> Result<Self, Error> {
        if vertex_ids.len() != vertex_weights.len() {
            return Err(Error::InvalidValue {
                message: format!(
                    "bone has {} vertex ids but {} weights",
                    vertex_ids.len(),
                    vertex_weights.len()
                ),
            });
        }
        Ok(Self {
            offset_matrix: crate::transform::IDENTITY,
            vertex_ids,
            vertex_weights,
        })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let (vertex_ids, vertex_weights) = pairs.into_iter().unzip();
        Self {
            offset_matrix: crate::transform::IDENTITY,
            vertex_ids,
            vertex_weights,
        }
    }

    pub fn with_offset_matrix(mut self, offset: impl Transform) -> Self {
        self.offset_matrix = offset.to_row_major();
        self
    }

    pub fn len(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    pub fn into_shared(self) -> SharedBone {
        Arc::new(self)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct BoneRepr {
    offset_matrix: [f32; MATRIX_LEN],
    vertex_ids: Vec<u32>,
    vertex_weights: Vec<f32>,
}

#[cfg(feature = "serde")]
impl TryFrom<BoneRepr> for Bone {
    type Error = Error;

    fn try_from(repr: BoneRepr) -> Result<Self, Self::Error> {
        Ok(Self::new(repr.vertex_ids, repr.vertex_weights)?.with_offset_matrix(repr.offset_matrix))
    }
}

impl BoneInfluences for Bone {
    fn vertex_ids(&self) -> &[u32] {
        &self.vertex_ids
    }

    fn vertex_weights(&self) -> &[f32] {
        &self.vertex_weights
    }
}
