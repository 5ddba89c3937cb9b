//! Face reconstruction for the primitive topology modes
//!
//! The rules are identical whether indices are explicit or implied by the
//! vertex count; implied indices are simply `0..count`.

use tracing::warn;

use crate::asset::TopologyMode;
use crate::scene::{Face, PrimitiveKinds};

/// Where a primitive's indices come from.
#[derive(Debug, Clone, Copy)]
pub enum IndexSource<'a> {
    /// An explicit index buffer.
    Explicit(&'a [u32]),
    /// Indices implied by the vertex count: `0, 1, .., count-1`.
    Implied(u32),
}

impl IndexSource<'_> {
    fn len(&self) -> u32 {
        match *self {
            IndexSource::Explicit(indices) => indices.len() as u32,
            IndexSource::Implied(count) => count,
        }
    }

    fn get(&self, i: u32) -> u32 {
        match *self {
            IndexSource::Explicit(indices) => indices[i as usize],
            IndexSource::Implied(_) => i,
        }
    }
}

/// Coarse output category of a topology mode, for the mesh bitmask.
pub fn coarse_kind(mode: TopologyMode) -> PrimitiveKinds {
    match mode {
        TopologyMode::Points => PrimitiveKinds::POINT,
        TopologyMode::Lines | TopologyMode::LineLoop | TopologyMode::LineStrip => {
            PrimitiveKinds::LINE
        }
        TopologyMode::Triangles | TopologyMode::TriangleStrip | TopologyMode::TriangleFan => {
            PrimitiveKinds::TRIANGLE
        }
    }
}

/// Rebuilds the face list of one primitive.
///
/// Odd leftovers of `Lines`/`Triangles` are dropped with a warning and the
/// usable count truncated; strips, loops and fans too short for a single
/// face yield no faces at all.
pub fn build_faces(mesh_name: &str, mode: TopologyMode, source: IndexSource) -> Vec<Face> {
    let mut count = source.len();

    match mode {
        TopologyMode::Points => (0..count).map(|i| Face::point(source.get(i))).collect(),

        TopologyMode::Lines => {
            if count % 2 != 0 {
                warn!(
                    "mesh '{mesh_name}': index count {count} is not compatible with the lines \
                     mode, dropping the unmatched final vertex"
                );
                count -= count % 2;
            }
            (0..count / 2)
                .map(|f| Face::line(source.get(2 * f), source.get(2 * f + 1)))
                .collect()
        }

        TopologyMode::LineLoop | TopologyMode::LineStrip => {
            if count < 2 {
                warn!("mesh '{mesh_name}': not enough indices ({count}) for a line strip/loop");
                return Vec::new();
            }
            let mut faces = Vec::with_capacity(count as usize);
            faces.push(Face::line(source.get(0), source.get(1)));
            for i in 2..count {
                // sliding window: reuse the previous face's second index
                let prev = faces[i as usize - 2].indices()[1];
                faces.push(Face::line(prev, source.get(i)));
            }
            if mode == TopologyMode::LineLoop {
                let last = faces[faces.len() - 1].indices()[1];
                let first = faces[0].indices()[0];
                faces.push(Face::line(last, first));
            }
            faces
        }

        TopologyMode::Triangles => {
            if count % 3 != 0 {
                warn!(
                    "mesh '{mesh_name}': index count {count} is not compatible with the \
                     triangles mode, dropping the remainder"
                );
                count -= count % 3;
            }
            (0..count / 3)
                .map(|f| {
                    Face::triangle(source.get(3 * f), source.get(3 * f + 1), source.get(3 * f + 2))
                })
                .collect()
        }

        TopologyMode::TriangleStrip => {
            if count < 3 {
                warn!("mesh '{mesh_name}': not enough indices ({count}) for a triangle strip");
                return Vec::new();
            }
            let mut faces = Vec::with_capacity(count as usize - 2);
            faces.push(Face::triangle(source.get(0), source.get(1), source.get(2)));
            for i in 3..count {
                let prev = faces[i as usize - 3].indices();
                faces.push(Face::triangle(prev[1], prev[2], source.get(i)));
            }
            faces
        }

        TopologyMode::TriangleFan => {
            if count < 3 {
                warn!("mesh '{mesh_name}': not enough indices ({count}) for a triangle fan");
                return Vec::new();
            }
            let mut faces = Vec::with_capacity(count as usize - 2);
            faces.push(Face::triangle(source.get(0), source.get(1), source.get(2)));
            let hub = faces[0].indices()[0];
            for i in 3..count {
                let prev = faces[i as usize - 3].indices()[2];
                faces.push(Face::triangle(hub, prev, source.get(i)));
            }
            faces
        }
    }
}
