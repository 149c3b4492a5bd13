/// Topology of a vertex submission.
///
/// `Points`, `Lines` and `Triangles` are elemental: no vertex is shared between
/// primitives. The strip and fan kinds share vertices and are expanded into
/// their elemental base kind before batching.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveType {
    /// Smallest submission that produces at least one primitive.
    #[inline]
    pub const fn min_vertex_count(self) -> usize {
        match self {
            PrimitiveType::Points => 1,
            PrimitiveType::Lines | PrimitiveType::LineStrip => 2,
            PrimitiveType::Triangles | PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => 3,
        }
    }

    /// The elemental kind this topology expands into.
    #[inline]
    pub const fn elemental(self) -> PrimitiveType {
        match self {
            PrimitiveType::Points => PrimitiveType::Points,
            PrimitiveType::Lines | PrimitiveType::LineStrip => PrimitiveType::Lines,
            PrimitiveType::Triangles | PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => {
                PrimitiveType::Triangles
            }
        }
    }

    #[inline]
    pub const fn is_elemental(self) -> bool {
        matches!(self, PrimitiveType::Points | PrimitiveType::Lines | PrimitiveType::Triangles)
    }

    /// Leading part of a `vertex_count` submission that forms whole primitives.
    ///
    /// Elemental lists drop a trailing incomplete primitive; strips and fans use
    /// every vertex.
    #[inline]
    pub const fn whole_vertex_count(self, vertex_count: usize) -> usize {
        if self.is_elemental() {
            let arity = self.min_vertex_count();
            vertex_count - vertex_count % arity
        } else {
            vertex_count
        }
    }
}
