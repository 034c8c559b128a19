pub mod definition;
pub mod error;
pub mod paths;
pub mod registry;
pub mod settings;

pub use definition::WorkspaceDefinition;
pub use error::ConfigError;
pub use paths::{
    DEFINITION_FILE_EXTENSION, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR, REGISTRY_FILE_NAME,
    RUNTIME_FILE_EXTENSION,
};
pub use registry::{WorkspaceConfig, WorkspaceRegistry, WorkspaceStatus};
pub use settings::{LaunchSettings, Settings, StatusSettings};
