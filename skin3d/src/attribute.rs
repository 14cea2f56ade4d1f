//! Fixed-width vertex attributes derived from the dense influence table.
//!
//! These are plain CPU buffers laid out for direct upload; creating GPU resources is left to the
//! renderer.

use log::warn;

use crate::{Error, Skin, VertexInfluence};

/// Per-vertex bone ids and weights with `width` slots per vertex, zero filled.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfluenceBuffer {
    pub width: usize,
    pub num_vertices: usize,
    pub bone_ids: Vec<u32>,
    pub weights: Vec<f32>,
}

impl InfluenceBuffer {
    pub fn vertex(&self, vertex_id: usize) -> (&[u32], &[f32]) {
        let start = vertex_id * self.width;
        let end = start + self.width;
        (&self.bone_ids[start..end], &self.weights[start..end])
    }

    pub fn bone_id_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bone_ids)
    }

    pub fn weight_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.weights)
    }
}

/// The common four-influence vertex attribute.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedInfluences4 {
    pub bones: [u32; 4],
    pub weights: [f32; 4],
}

impl Skin {
    /// Packs the dense table into `width` slots per vertex.
    ///
    /// Vertices with more than `width` influences keep their heaviest ones (in their original slot
    /// order), rescaled so the kept weights add up to the vertex's original total.
    pub fn influence_buffer(&self, width: usize) -> Result<InfluenceBuffer, Error> {
        if width == 0 {
            return Err(Error::InvalidValue {
                message: "influence buffer width must be at least 1".to_string(),
            });
        }
        Ok(self.pack_influences(width))
    }

    /// Packs the dense table using `max_num_vertex_bones` slots per vertex; nothing is dropped.
    pub fn influence_buffer_full(&self) -> InfluenceBuffer {
        self.pack_influences(self.max_num_vertex_bones)
    }

    pub fn packed_influences4(&self) -> Vec<PackedInfluences4> {
        let buffer = self.pack_influences(4);
        buffer
            .bone_ids
            .chunks_exact(4)
            .zip(buffer.weights.chunks_exact(4))
            .map(|(bones, weights)| {
                let mut packed = PackedInfluences4::default();
                packed.bones.copy_from_slice(bones);
                packed.weights.copy_from_slice(weights);
                packed
            })
            .collect()
    }

    /// Raw bytes of one frame's matrices, for uploading as a storage or uniform buffer.
    pub fn frame_bytes(&self, frame_id: usize) -> &[u8] {
        bytemuck::cast_slice(self.matrices(frame_id))
    }

    fn pack_influences(&self, width: usize) -> InfluenceBuffer {
        let num_vertices = self.num_vertices();
        let mut bone_ids = vec![0u32; num_vertices * width];
        let mut weights = vec![0.0f32; num_vertices * width];
        let mut truncated = 0usize;

        let mut scratch: Vec<VertexInfluence> = Vec::with_capacity(self.max_num_vertex_bones);
        for vertex_id in 0..num_vertices {
            scratch.clear();
            scratch.extend(self.vertex_influences(vertex_id));

            if scratch.len() > width {
                truncated += 1;
                keep_heaviest(&mut scratch, width);
            }

            let row = vertex_id * width;
            for (slot, influence) in scratch.iter().enumerate() {
                bone_ids[row + slot] = influence.bone as u32;
                weights[row + slot] = influence.weight;
            }
        }

        if truncated > 0 {
            warn!(
                "{truncated} of {num_vertices} vertices have more than {width} influences; lightest influences were dropped"
            );
        }

        InfluenceBuffer {
            width,
            num_vertices,
            bone_ids,
            weights,
        }
    }
}

fn keep_heaviest(influences: &mut Vec<VertexInfluence>, width: usize) {
    let total: f32 = influences.iter().map(|i| i.weight).sum();

    let mut order: Vec<usize> = (0..influences.len()).collect();
    // Stable, so equal weights keep their slot order.
    order.sort_by(|&a, &b| influences[b].weight.total_cmp(&influences[a].weight));
    order.truncate(width);
    order.sort_unstable();

    let kept: Vec<VertexInfluence> = order.into_iter().map(|i| influences[i]).collect();
    *influences = kept;

    let kept_total: f32 = influences.iter().map(|i| i.weight).sum();
    if kept_total > 0.0 {
        let scale = total / kept_total;
        for influence in influences.iter_mut() {
            influence.weight *= scale;
        }
    }
}
