pub const GLOBAL_STATE_DIR: &str = ".hearth";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const REGISTRY_FILE_NAME: &str = "workspaces.json";
pub const DEFINITION_FILE_EXTENSION: &str = "yaml";
pub const RUNTIME_FILE_EXTENSION: &str = "json";
