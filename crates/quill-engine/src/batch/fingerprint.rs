/// Cheap content summary of a step's packed data.
///
/// Equal fingerprints are necessary but not sufficient for equal content; the
/// diff engine falls back to a full comparison only when fingerprints match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub hash: u64,
    pub vertex_len: usize,
    pub index_len: usize,
}

impl Fingerprint {
    pub fn of(vertices: &[f32], indices: &[u32]) -> Self {
        let mut h = Fnv1a64::new();
        for v in vertices {
            h.write_u32(v.to_bits());
        }
        // Separator so moving data between the two slices changes the hash.
        h.write_u32(u32::MAX);
        for i in indices {
            h.write_u32(*i);
        }
        Self {
            hash: h.finish(),
            vertex_len: vertices.len(),
            index_len: indices.len(),
        }
    }
}

struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self(Self::OFFSET)
    }

    fn write_u32(&mut self, v: u32) {
        for b in v.to_le_bytes() {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Bitwise scalar equality: `NaN` matches itself, `0.0` and `-0.0` differ.
pub(crate) fn same_scalars(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}
