use std::fmt;

/// Why the wgpu backend refused to create or update a GPU resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Width, height or vertex count of zero.
    ZeroSize,
    /// Pixel data does not match `width * height * 4`.
    DataLength { expected: usize, actual: usize },
    /// Requested size is above a device limit.
    ExceedsLimit { requested: u64, limit: u64 },
    /// `offset + count` does not fit in the existing buffer.
    OutOfRange { offset: usize, count: usize, size: usize },
    /// The buffer has no GPU storage yet.
    NotCreated,
    /// Shader source is blank.
    EmptySource,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::ZeroSize => write!(f, "resource has zero size"),
            ResourceError::DataLength { expected, actual } => {
                write!(f, "expected {expected} bytes of pixel data, got {actual}")
            }
            ResourceError::ExceedsLimit { requested, limit } => {
                write!(f, "requested size {requested} exceeds device limit {limit}")
            }
            ResourceError::OutOfRange { offset, count, size } => {
                write!(f, "update of {count} vertices at offset {offset} exceeds buffer of {size}")
            }
            ResourceError::NotCreated => write!(f, "vertex buffer has no GPU storage"),
            ResourceError::EmptySource => write!(f, "shader source is empty"),
        }
    }
}

impl std::error::Error for ResourceError {}
