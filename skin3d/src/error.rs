use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid duration: {value} (must be >= 1e-6 seconds)")]
    InvalidDuration { value: f32 },

    #[error("bone slot {index} has no influence provider")]
    MissingBone { index: usize },

    #[error("bone providers were disposed; the skin cannot be reorganized again")]
    BonesDisposed,

    #[error(
        "bone {bone} lists {vertex_ids} vertex ids but {weights} weights; lists must be index-aligned"
    )]
    InfluenceLengthMismatch {
        bone: usize,
        vertex_ids: usize,
        weights: usize,
    },

    #[error("bone {bone} lists vertex {vertex} more than once with a positive weight")]
    DuplicateInfluence { bone: usize, vertex: u32 },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}
