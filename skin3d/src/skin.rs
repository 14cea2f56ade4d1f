use std::fmt;

use log::{debug, trace, warn};

use crate::{Error, MATRIX_LEN, SharedBone, Transform};

/// Durations below this are treated as "unset".
pub const MIN_DURATION: f32 = 1.0e-6;

/// One (bone, weight) pair of a vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexInfluence {
    pub bone: usize,
    pub weight: f32,
}

/// Baked skinning data for one mesh.
///
/// Holds `frame_count` buffers of `bone_count` row-major matrices, plus a dense per-vertex
/// influence table built by [`Skin::reorganize_by_vertices`]. The table has a fixed stride of
/// `bone_count` slots per vertex; only the first [`Skin::num_vertex_bones`] slots of a vertex are
/// meaningful and the rest stay zero.
///
/// A skin is populated from a single thread and may be shared read-only afterwards.
#[derive(Clone)]
pub struct Skin {
    pub(crate) bone_count: usize,
    duration: f32,
    time_factor: f32,
    pub(crate) bones: Vec<Option<SharedBone>>,
    bone_matrices_per_frame: Vec<Vec<f32>>,

    pub(crate) max_num_vertex_bones: usize,
    pub(crate) num_vertex_bones: Vec<usize>,
    pub(crate) vertex_bones: Vec<usize>,
    pub(crate) vertex_bone_weights: Vec<f32>,
}

impl fmt::Debug for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skin")
            .field("bone_count", &self.bone_count)
            .field("frame_count", &self.frame_count())
            .field("duration", &self.duration)
            .field("time_factor", &self.time_factor)
            .field(
                "bones_set",
                &self.bones.iter().filter(|b| b.is_some()).count(),
            )
            .field("num_vertices", &self.num_vertices())
            .field("max_num_vertex_bones", &self.max_num_vertex_bones)
            .finish()
    }
}

impl Skin {
    pub fn new(bone_count: usize, frame_count: usize) -> Self {
        Self {
            bone_count,
            duration: 0.0,
            time_factor: 0.0,
            bones: vec![None; bone_count],
            bone_matrices_per_frame: vec![vec![0.0; bone_count * MATRIX_LEN]; frame_count],
            max_num_vertex_bones: 0,
            num_vertex_bones: Vec::new(),
            vertex_bones: Vec::new(),
            vertex_bone_weights: Vec::new(),
        }
    }

    /// Drops every bone, frame and influence; the skin ends up with zero bones and frames.
    pub fn clear(&mut self) {
        self.bone_count = 0;
        self.bones.clear();
        self.bone_matrices_per_frame.clear();
        self.duration = 0.0;
        self.time_factor = 0.0;
        self.clear_vertex_table();
    }

    pub(crate) fn clear_vertex_table(&mut self) {
        self.max_num_vertex_bones = 0;
        self.num_vertex_bones.clear();
        self.vertex_bones.clear();
        self.vertex_bone_weights.clear();
    }

    /// Releases the bone providers.
    ///
    /// Call after [`Skin::reorganize_by_vertices`]: the dense table is then the only record of
    /// which bones influence which vertices. Frame matrices and the table are left untouched.
    pub fn dispose_bones(&mut self) -> &mut Self {
        debug!(
            "disposing {} bone providers ({} vertices keep their influences)",
            self.bones.len(),
            self.num_vertices()
        );
        self.bones = Vec::new();
        self
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn frame_count(&self) -> usize {
        self.bone_matrices_per_frame.len()
    }

    pub fn bones(&self) -> &[Option<SharedBone>] {
        &self.bones
    }

    pub fn bone(&self, bone_id: usize) -> Option<&SharedBone> {
        self.bones.get(bone_id).and_then(Option::as_ref)
    }

    pub fn set_bone(&mut self, bone_id: usize, bone: SharedBone) {
        debug_assert!(
            bone_id < self.bones.len(),
            "bone {bone_id} out of range (bone slots: {})",
            self.bones.len()
        );
        self.bones[bone_id] = Some(bone);
    }

    /// Copies the 16 scalars of `transform` into frame `frame_id`, bone `bone_id`.
    pub fn set_matrix(&mut self, frame_id: usize, bone_id: usize, transform: impl Transform) {
        debug_assert!(
            frame_id < self.frame_count() && bone_id < self.bone_count,
            "matrix ({frame_id}, {bone_id}) out of range ({} frames, {} bones)",
            self.frame_count(),
            self.bone_count
        );
        let offset = bone_id * MATRIX_LEN;
        self.bone_matrices_per_frame[frame_id][offset..offset + MATRIX_LEN]
            .copy_from_slice(&transform.to_row_major());
    }

    /// All bone matrices of one frame, concatenated in bone order.
    pub fn matrices(&self, frame_id: usize) -> &[f32] {
        debug_assert!(
            frame_id < self.frame_count(),
            "frame {frame_id} out of range ({} frames)",
            self.frame_count()
        );
        &self.bone_matrices_per_frame[frame_id]
    }

    pub fn matrix(&self, frame_id: usize, bone_id: usize) -> [f32; MATRIX_LEN] {
        debug_assert!(
            bone_id < self.bone_count,
            "bone {bone_id} out of range ({} bones)",
            self.bone_count
        );
        let offset = bone_id * MATRIX_LEN;
        let mut out = [0.0; MATRIX_LEN];
        out.copy_from_slice(&self.matrices(frame_id)[offset..offset + MATRIX_LEN]);
        out
    }

    pub fn try_matrix(&self, frame_id: usize, bone_id: usize) -> Option<[f32; MATRIX_LEN]> {
        if bone_id >= self.bone_count {
            return None;
        }
        let offset = bone_id * MATRIX_LEN;
        let slice = self
            .bone_matrices_per_frame
            .get(frame_id)?
            .get(offset..offset + MATRIX_LEN)?;
        let mut out = [0.0; MATRIX_LEN];
        out.copy_from_slice(slice);
        Some(out)
    }

    #[cfg(feature = "glam")]
    pub fn matrix_mat4(&self, frame_id: usize, bone_id: usize) -> glam::Mat4 {
        glam::Mat4::from_cols_array(&self.matrix(frame_id, bone_id)).transpose()
    }

    /// Frame matrices for a continuous animation time. Empty when the skin has no frames.
    pub fn matrices_at(&self, time: f32) -> &[f32] {
        if self.bone_matrices_per_frame.is_empty() {
            return &[];
        }
        &self.bone_matrices_per_frame[self.frame_id(time)]
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time_factor(&self) -> f32 {
        self.time_factor
    }

    /// Sets the animation length in seconds. Values below [`MIN_DURATION`] (and NaN) are rejected
    /// and leave the previous duration in place.
    pub fn set_duration(&mut self, value: f32) -> Result<(), Error> {
        if value.is_nan() || value < MIN_DURATION {
            warn!("rejected skin duration {value}");
            return Err(Error::InvalidDuration { value });
        }
        self.duration = value;
        self.time_factor = self.frame_count() as f32 / value;
        trace!(
            "skin duration {value}s, {} frames, time factor {}",
            self.frame_count(),
            self.time_factor
        );
        Ok(())
    }

    /// Maps an animation time to a frame index. The animation loops; without a duration (or
    /// frames) every time maps to frame 0.
    pub fn frame_id(&self, time: f32) -> usize {
        let frame_count = self.frame_count();
        if self.duration < MIN_DURATION || frame_count == 0 {
            return 0;
        }
        let t = time.rem_euclid(self.duration);
        // t close to duration can round up to frame_count.
        (t * self.time_factor).floor() as usize % frame_count
    }

    /// Vertices covered by the dense table; 0 before reorganization.
    pub fn num_vertices(&self) -> usize {
        self.num_vertex_bones.len()
    }

    pub fn max_num_vertex_bones(&self) -> usize {
        self.max_num_vertex_bones
    }

    pub fn num_vertex_bones(&self, vertex_id: usize) -> usize {
        debug_assert!(
            vertex_id < self.num_vertices(),
            "vertex {vertex_id} out of range ({} vertices)",
            self.num_vertices()
        );
        self.num_vertex_bones[vertex_id]
    }

    #[inline]
    fn vertex_arrays_index(&self, vertex_id: usize, slot: usize) -> usize {
        debug_assert!(
            vertex_id < self.num_vertices() && slot < self.bone_count,
            "influence ({vertex_id}, {slot}) out of range ({} vertices, {} bones)",
            self.num_vertices(),
            self.bone_count
        );
        vertex_id * self.bone_count + slot
    }

    pub fn vertex_bone_data(&self, vertex_id: usize, slot: usize) -> (usize, f32) {
        let index = self.vertex_arrays_index(vertex_id, slot);
        (self.vertex_bones[index], self.vertex_bone_weights[index])
    }

    pub fn vertex_bone_id(&self, vertex_id: usize, slot: usize) -> usize {
        self.vertex_bones[self.vertex_arrays_index(vertex_id, slot)]
    }

    pub fn vertex_bone_weight(&self, vertex_id: usize, slot: usize) -> f32 {
        self.vertex_bone_weights[self.vertex_arrays_index(vertex_id, slot)]
    }

    /// Checked variant of [`Skin::vertex_bone_data`]; `None` past the vertex's influence count.
    pub fn try_vertex_bone_data(&self, vertex_id: usize, slot: usize) -> Option<VertexInfluence> {
        if slot >= *self.num_vertex_bones.get(vertex_id)? {
            return None;
        }
        let index = vertex_id * self.bone_count + slot;
        Some(VertexInfluence {
            bone: self.vertex_bones[index],
            weight: self.vertex_bone_weights[index],
        })
    }

    /// Meaningful influences of a vertex, in insertion order.
    pub fn vertex_influences(
        &self,
        vertex_id: usize,
    ) -> impl ExactSizeIterator<Item = VertexInfluence> + '_ {
        let start = vertex_id * self.bone_count;
        let end = start + self.num_vertex_bones(vertex_id);
        self.vertex_bones[start..end]
            .iter()
            .zip(&self.vertex_bone_weights[start..end])
            .map(|(&bone, &weight)| VertexInfluence { bone, weight })
    }
}
