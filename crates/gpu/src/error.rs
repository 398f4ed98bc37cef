use foundation::ids::ResourceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    UnknownResource(ResourceId),
    ContextLost,
    Surface(String),
    Backend(String),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::UnknownResource(id) => write!(f, "unknown resource {id}"),
            GpuError::ContextLost => write!(f, "rendering context already released"),
            GpuError::Surface(msg) => write!(f, "surface error: {msg}"),
            GpuError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for GpuError {}
