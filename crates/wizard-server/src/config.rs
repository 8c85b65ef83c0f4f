//! Server Configuration
//!
//! Read from the environment (and `.env` via dotenvy):
//!
//! | variable         | default        |
//! |------------------|----------------|
//! | `BIND_ADDR`      | `0.0.0.0:3000` |
//! | `WIZARD_TABLES`  | built-in tables |
//! | `CORS_ALLOW_ANY` | `true`         |

use std::path::PathBuf;

use bot_wizard::WizardTables;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// JSON file overriding the built-in wizard tables
    pub tables_path: Option<PathBuf>,
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            tables_path: None,
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            tables_path: lookup("WIZARD_TABLES")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            cors_allow_any: lookup("CORS_ALLOW_ANY")
                .map_or(defaults.cors_allow_any, |v| {
                    !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no")
                }),
        }
    }

    /// Built-in tables unless a file is configured
    pub fn load_tables(&self) -> bot_wizard::Result<WizardTables> {
        self.tables_path
            .as_ref()
            .map_or_else(|| Ok(WizardTables::default()), WizardTables::from_json_file)
    }
}
