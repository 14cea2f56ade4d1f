use std::collections::HashSet;

use log::debug;

use crate::{Error, Skin};

impl Skin {
    /// Largest vertex index referenced by any bone provider (0 when there are none).
    pub fn last_vertex_id(&self) -> u32 {
        self.bones
            .iter()
            .flatten()
            .flat_map(|bone| bone.vertex_ids().iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Inverts the per-bone influence lists into the dense per-vertex table.
    ///
    /// Vertex ids are assumed contiguous from 0, so the table covers `last_vertex_id() + 1`
    /// vertices. Influences are appended in bone order, then list order; non-positive (and NaN)
    /// weights are dropped. A bone may list a vertex at most once with a positive weight, so no
    /// vertex takes more than `bone_count` slots. On error the previous table is left untouched.
    pub fn reorganize_by_vertices(&mut self) -> Result<&mut Self, Error> {
        self.validate_bones()?;
        self.clear_vertex_table();

        let num_vertices = self.last_vertex_id() as usize + 1;
        let bone_count = self.bone_count;

        self.num_vertex_bones.resize(num_vertices, 0);
        self.vertex_bones.resize(num_vertices * bone_count, 0);
        self.vertex_bone_weights.resize(num_vertices * bone_count, 0.0);

        let mut dropped = 0usize;
        for (bone_id, bone) in self.bones.iter().enumerate() {
            let Some(bone) = bone else { continue };
            for (&vertex_id, &weight) in bone.vertex_ids().iter().zip(bone.vertex_weights()) {
                if weight.is_nan() || weight <= 0.0 {
                    dropped += 1;
                    continue;
                }
                let vertex_id = vertex_id as usize;
                debug_assert!(vertex_id < num_vertices);

                let slot = self.num_vertex_bones[vertex_id];
                self.num_vertex_bones[vertex_id] += 1;

                let index = vertex_id * bone_count + slot;
                self.vertex_bones[index] = bone_id;
                self.vertex_bone_weights[index] = weight;
            }
        }

        self.max_num_vertex_bones = self.num_vertex_bones.iter().copied().max().unwrap_or(0);

        debug!(
            "reorganized skin: {num_vertices} vertices, {bone_count} bones, up to {} influences per vertex, {dropped} non-positive weights dropped",
            self.max_num_vertex_bones
        );
        Ok(self)
    }

    fn validate_bones(&self) -> Result<(), Error> {
        if self.bones.len() != self.bone_count {
            return Err(Error::BonesDisposed);
        }
        let mut seen = HashSet::new();
        for (index, bone) in self.bones.iter().enumerate() {
            let Some(bone) = bone else {
                return Err(Error::MissingBone { index });
            };
            let vertex_ids = bone.vertex_ids().len();
            let weights = bone.vertex_weights().len();
            if vertex_ids != weights {
                return Err(Error::InfluenceLengthMismatch {
                    bone: index,
                    vertex_ids,
                    weights,
                });
            }

            // A vertex may take at most one slot per bone, which bounds its slots by bone_count.
            seen.clear();
            for (&vertex, &weight) in bone.vertex_ids().iter().zip(bone.vertex_weights()) {
                if weight > 0.0 && !seen.insert(vertex) {
                    return Err(Error::DuplicateInfluence {
                        bone: index,
                        vertex,
                    });
                }
            }
        }
        Ok(())
    }
}
