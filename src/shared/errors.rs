#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to create runtime path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resolve home directory for runtime state root")]
    HomeDirectoryUnavailable,
    #[error("runtime state path is not set for workspace `{workspace}`")]
    PathUnset { workspace: String },
    #[error("failed to read runtime state {path}: {source}")]
    ReadState {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse runtime state {path}: {source}")]
    ParseState {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode runtime state {path}: {source}")]
    EncodeState {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write runtime state {path}: {source}")]
    WriteState {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete runtime state {path}: {source}")]
    DeleteState {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        match self {
            RuntimeError::ReadState { source, .. } | RuntimeError::DeleteState { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
