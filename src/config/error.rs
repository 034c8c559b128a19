#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove file {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode yaml for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid registry json in {path}: {source}")]
    ParseRegistry {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode registry json for {path}: {source}")]
    EncodeRegistry {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("settings validation failed: {0}")]
    Settings(String),
    #[error("invalid workspace name `{name}`: {reason}")]
    InvalidWorkspaceName { name: String, reason: String },
    #[error("workspace `{name}` already exists")]
    WorkspaceExists { name: String },
    #[error("unknown app kind `{kind}` in {path} (expected one of: custom, browser, editor, terminal, viewer)")]
    UnknownAppKind { path: String, kind: String },
    #[error("invalid `{kind}` app #{index} in {path}: {reason}")]
    InvalidApp {
        path: String,
        kind: String,
        index: usize,
        reason: String,
    },
}
