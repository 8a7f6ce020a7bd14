//! Constants used throughout the codebase.

/// Identifier of the CommonJS module-loading primitive.
pub const MODULE_LOADER: &str = "require";

/// Method name that marks a container registration call.
pub const REGISTER_METHOD: &str = "register";

/// Placeholder token found in template container files.
pub const PLACEHOLDER_ELLIPSIS: &str = "...";

/// Container file pattern used when none is configured.
pub const DEFAULT_CONTAINER_FILE: &str = "container.js";

/// Name of the workspace configuration file.
pub const CONFIG_FILE_NAME: &str = "awilix.toml";

/// Definition requests slower than this are logged at warn level.
pub const SLOW_DEFINITION_MS: u128 = 100;
