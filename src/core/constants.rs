//! Constants used throughout alertcfg.
//!
//! Centralizes magic strings and configuration values.

/// Settings file name (alertcfg.toml).
pub const SETTINGS_FILE: &str = "alertcfg.toml";

/// Default directory for stored tenant documents.
pub const STORE_DIR: &str = ".alertcfg/store";

/// Default secret key file.
pub const KEY_FILE: &str = ".alertcfg/secret.key";

/// Environment variable that overrides the key file.
pub const KEY_ENV: &str = "ALERTCFG_SECRET_KEY";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "ALERTCFG_LOG";

/// Tenant used when none is given.
pub const DEFAULT_TENANT: &str = "1";

/// Default time the delivery engine gets to accept a configuration.
pub const APPLY_TIMEOUT_MS: u64 = 5_000;

/// Endpoint slack receivers use when no webhook URL is configured.
pub const SLACK_API_ENDPOINT: &str = "https://slack.com/api/chat.postMessage";

/// Success acknowledgement for every accepted set, first or replacing.
pub const CREATED_MESSAGE: &str = "configuration created";
