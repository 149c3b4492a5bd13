//! Strip/fan expansion into indexed elemental primitives.
//!
//! Every input vertex is encoded exactly once; sharing is expressed through
//! indices. Indices are absolute within the destination step, so appending to a
//! step that already holds vertices offsets them by the existing vertex count.

use crate::coords::Transform;

use super::vertex::{encode_vertex, FLOATS_PER_VERTEX};
use super::{PrimitiveType, Vertex};

/// Number of indices a submission of `vertex_count` vertices expands to.
///
/// Returns 0 when the submission is below the minimum for `kind`. A trailing
/// incomplete primitive of an elemental list contributes nothing.
pub fn expanded_index_count(kind: PrimitiveType, vertex_count: usize) -> usize {
    let count = kind.whole_vertex_count(vertex_count);
    if count < kind.min_vertex_count() {
        return 0;
    }
    match kind {
        PrimitiveType::Points | PrimitiveType::Lines | PrimitiveType::Triangles => count,
        PrimitiveType::LineStrip => (count - 1) * 2,
        PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => (count - 2) * 3,
    }
}

/// Appends the expansion of `input` to `vertices` / `indices`.
///
/// Vertices of a trailing incomplete primitive in an elemental list are not
/// encoded, so later submissions appended to the same step keep their
/// alignment.
///
/// Returns `false` (and leaves both buffers untouched) when the submission is
/// below the minimum vertex count for `kind`, or when the step would hold more
/// vertices than a `u32` index can address.
pub fn expand_into(
    input: &[Vertex],
    kind: PrimitiveType,
    transform: &Transform,
    vertices: &mut Vec<f32>,
    indices: &mut Vec<u32>,
) -> bool {
    let count = kind.whole_vertex_count(input.len());
    if count < kind.min_vertex_count() {
        return false;
    }
    let Some((base, n)) = index_span(vertices.len() / FLOATS_PER_VERTEX, count) else {
        log::debug!("dropped {count}-vertex submission: step exceeds u32 indices");
        return false;
    };

    vertices.reserve(count * FLOATS_PER_VERTEX);
    indices.reserve(expanded_index_count(kind, count));

    for v in &input[..count] {
        encode_vertex(v, transform, vertices);
    }

    match kind {
        PrimitiveType::Points | PrimitiveType::Lines | PrimitiveType::Triangles => {
            indices.extend((0..n).map(|i| base + i));
        }
        PrimitiveType::LineStrip => {
            for i in 1..n {
                indices.extend_from_slice(&[base + i - 1, base + i]);
            }
        }
        PrimitiveType::TriangleStrip => {
            for i in 2..n {
                // Odd triangles swap their first two vertices to keep a consistent winding.
                if i % 2 == 0 {
                    indices.extend_from_slice(&[base + i - 2, base + i - 1, base + i]);
                } else {
                    indices.extend_from_slice(&[base + i - 1, base + i - 2, base + i]);
                }
            }
        }
        PrimitiveType::TriangleFan => {
            for i in 2..n {
                indices.extend_from_slice(&[base, base + i - 1, base + i]);
            }
        }
    }

    true
}

/// First index and vertex count of `count` vertices appended after `existing`,
/// or `None` when the last one would not be addressable by a `u32` index.
fn index_span(existing: usize, count: usize) -> Option<(u32, u32)> {
    let base = u32::try_from(existing).ok()?;
    let n = u32::try_from(count).ok()?;
    base.checked_add(n)?;
    Some((base, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    fn verts(n: usize) -> Vec<Vertex> {
        (0..n).map(|i| Vertex::at(Vec2::new(i as f32, 0.0))).collect()
    }

    fn run(kind: PrimitiveType, n: usize) -> (Vec<f32>, Vec<u32>, bool) {
        let mut v = Vec::new();
        let mut i = Vec::new();
        let ok = expand_into(&verts(n), kind, &Transform::IDENTITY, &mut v, &mut i);
        (v, i, ok)
    }

    const ALL: [PrimitiveType; 6] = [
        PrimitiveType::Points,
        PrimitiveType::Lines,
        PrimitiveType::LineStrip,
        PrimitiveType::Triangles,
        PrimitiveType::TriangleStrip,
        PrimitiveType::TriangleFan,
    ];

    // ── minimum counts ────────────────────────────────────────────────────

    #[test]
    fn below_minimum_adds_nothing() {
        for kind in ALL {
            let (v, i, ok) = run(kind, kind.min_vertex_count() - 1);
            assert!(!ok, "{kind:?}");
            assert!(v.is_empty() && i.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn at_minimum_produces_output() {
        for kind in ALL {
            let (v, i, ok) = run(kind, kind.min_vertex_count());
            assert!(ok, "{kind:?}");
            assert_eq!(v.len(), kind.min_vertex_count() * FLOATS_PER_VERTEX);
            assert_eq!(i.len(), expanded_index_count(kind, kind.min_vertex_count()));
        }
    }

    // ── elemental ─────────────────────────────────────────────────────────

    #[test]
    fn elemental_kinds_index_one_to_one() {
        let (v, i, _) = run(PrimitiveType::Triangles, 6);
        assert_eq!(v.len(), 6 * FLOATS_PER_VERTEX);
        assert_eq!(i, vec![0, 1, 2, 3, 4, 5]);
    }

    // ── strips / fans ─────────────────────────────────────────────────────

    #[test]
    fn line_strip_pairs_neighbours() {
        let (v, i, _) = run(PrimitiveType::LineStrip, 4);
        assert_eq!(v.len(), 4 * FLOATS_PER_VERTEX);
        assert_eq!(i, vec![0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn triangle_strip_emits_n_minus_two_alternating() {
        let n = 6;
        let (v, i, _) = run(PrimitiveType::TriangleStrip, n);
        assert_eq!(v.len(), n * FLOATS_PER_VERTEX);
        assert_eq!(i.len(), (n - 2) * 3);
        assert_eq!(i, vec![0, 1, 2, 2, 1, 3, 2, 3, 4, 4, 3, 5]);
    }

    #[test]
    fn triangle_fan_shares_anchor() {
        let (v, i, _) = run(PrimitiveType::TriangleFan, 5);
        assert_eq!(v.len(), 5 * FLOATS_PER_VERTEX);
        let tris: Vec<&[u32]> = i.chunks(3).collect();
        assert_eq!(tris.len(), 3);
        for t in &tris {
            assert_eq!(t[0], 0);
        }
        assert_eq!(i, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    // ── appending ─────────────────────────────────────────────────────────

    #[test]
    fn appending_offsets_indices_by_existing_vertices() {
        let mut v = Vec::new();
        let mut i = Vec::new();
        expand_into(&verts(3), PrimitiveType::Triangles, &Transform::IDENTITY, &mut v, &mut i);
        expand_into(&verts(4), PrimitiveType::TriangleFan, &Transform::IDENTITY, &mut v, &mut i);
        assert_eq!(v.len(), 7 * FLOATS_PER_VERTEX);
        assert_eq!(i, vec![0, 1, 2, 3, 4, 5, 3, 5, 6]);
    }

    // ── incomplete primitives ─────────────────────────────────────────────

    #[test]
    fn trailing_partial_triangle_is_not_encoded() {
        let (v, i, ok) = run(PrimitiveType::Triangles, 4);
        assert!(ok);
        assert_eq!(v.len(), 3 * FLOATS_PER_VERTEX);
        assert_eq!(i, vec![0, 1, 2]);
        assert_eq!(expanded_index_count(PrimitiveType::Triangles, 4), 3);
    }

    #[test]
    fn partial_lists_keep_following_draws_aligned() {
        let mut v = Vec::new();
        let mut i = Vec::new();
        expand_into(&verts(4), PrimitiveType::Triangles, &Transform::IDENTITY, &mut v, &mut i);
        expand_into(&verts(3), PrimitiveType::Triangles, &Transform::IDENTITY, &mut v, &mut i);
        assert_eq!(v.len(), 6 * FLOATS_PER_VERTEX);
        assert_eq!(i, vec![0, 1, 2, 3, 4, 5]);

        let mut v = Vec::new();
        let mut i = Vec::new();
        expand_into(&verts(3), PrimitiveType::Lines, &Transform::IDENTITY, &mut v, &mut i);
        expand_into(&verts(2), PrimitiveType::Lines, &Transform::IDENTITY, &mut v, &mut i);
        assert_eq!(i, vec![0, 1, 2, 3]);
    }

    // ── index range ───────────────────────────────────────────────────────

    #[test]
    fn index_span_rejects_unaddressable_vertices() {
        assert_eq!(index_span(10, 3), Some((10, 3)));
        assert_eq!(index_span(u32::MAX as usize - 3, 3), Some((u32::MAX - 3, 3)));
        assert_eq!(index_span(u32::MAX as usize - 2, 3), None);
    }
}
