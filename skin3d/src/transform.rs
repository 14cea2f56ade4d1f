/// Number of scalars in one bone matrix.
pub const MATRIX_LEN: usize = 16;

/// A 4x4 affine transform readable as 16 row-major scalars.
///
/// The skin copies these scalars verbatim; it never inverts, multiplies or decomposes them.
pub trait Transform {
    fn to_row_major(&self) -> [f32; MATRIX_LEN];
}

impl Transform for [f32; MATRIX_LEN] {
    fn to_row_major(&self) -> [f32; MATRIX_LEN] {
        *self
    }
}

impl Transform for [[f32; 4]; 4] {
    /// Outer index is the row.
    fn to_row_major(&self) -> [f32; MATRIX_LEN] {
        let mut out = [0.0; MATRIX_LEN];
        for (row, values) in self.iter().enumerate() {
            out[row * 4..row * 4 + 4].copy_from_slice(values);
        }
        out
    }
}

impl<T: Transform + ?Sized> Transform for &T {
    fn to_row_major(&self) -> [f32; MATRIX_LEN] {
        (**self).to_row_major()
    }
}

// glam stores columns; transposing yields the row-major order the skin buffers use.
#[cfg(feature = "glam")]
impl Transform for glam::Mat4 {
    fn to_row_major(&self) -> [f32; MATRIX_LEN] {
        self.transpose().to_cols_array()
    }
}

pub(crate) const IDENTITY: [f32; MATRIX_LEN] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];
