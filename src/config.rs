// Agent configuration module
//
// All knobs are fixed at deployment time: the host bakes a config into the
// agent when it registers it. There is no CLI and no environment lookup.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Path of the precached application shell document, served as the
/// best-effort substitute for HTML navigations while offline.
pub const SHELL_DOCUMENT: &str = "./index.html";

/// Agent configuration: the two generation identifiers and the precache
/// URL set. Bumping a generation identifier orphans the previous
/// generation; it is swept on the next activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Versioned identifier for the static-asset (shell) generation
    #[serde(default = "default_precache_name")]
    pub precache_name: String,

    /// Versioned identifier for the runtime generation
    #[serde(default = "default_runtime_name")]
    pub runtime_name: String,

    /// Same-origin application shell paths fetched and stored at install
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Cross-origin resources (fonts, CDN scripts, icons) precached
    /// alongside the shell
    #[serde(default = "default_external_urls")]
    pub external_urls: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            precache_name: default_precache_name(),
            runtime_name: default_runtime_name(),
            precache_urls: default_precache_urls(),
            external_urls: default_external_urls(),
        }
    }
}

fn default_precache_name() -> String {
    "prayer-times-app-v1".to_string()
}

fn default_runtime_name() -> String {
    "runtime-cache-v1".to_string()
}

fn default_precache_urls() -> Vec<String> {
    vec![
        "./".to_string(),
        "./index.html".to_string(),
        "./styles.css".to_string(),
        "./manifest.json".to_string(),
    ]
}

fn default_external_urls() -> Vec<String> {
    vec![
        "https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;500;600&display=swap"
            .to_string(),
        "https://fonts.googleapis.com/css2?family=Amiri&family=Scheherazade+New&display=swap"
            .to_string(),
        "https://cdn.jsdelivr.net/npm/canvas-confetti@1.5.1/dist/confetti.browser.min.js"
            .to_string(),
        "https://cdn-icons-png.flaticon.com/512/3771/3771417.png".to_string(),
    ]
}

impl AgentConfig {
    /// Load and validate a config document supplied by the host (YAML)
    pub fn from_yaml(yaml: &str) -> Result<Self, AgentError> {
        let config: AgentConfig = serde_yaml::from_str(yaml)
            .map_err(|e| AgentError::Config(format!("invalid config: {}", e)))?;
        config.validate().map_err(AgentError::Config)?;
        Ok(config)
    }

    /// The identifiers considered current: every other identifier found in
    /// storage is stale and deleted on activation.
    pub fn allow_list(&self) -> [&str; 2] {
        [&self.precache_name, &self.runtime_name]
    }

    /// Combined precache set (shell paths first, then external resources),
    /// fetched and stored as one all-or-nothing batch at install.
    pub fn combined_precache_urls(&self) -> Vec<String> {
        self.precache_urls
            .iter()
            .chain(self.external_urls.iter())
            .cloned()
            .collect()
    }

    /// Validate agent configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.precache_name.is_empty() {
            return Err("precache_name cannot be empty".to_string());
        }
        if self.runtime_name.is_empty() {
            return Err("runtime_name cannot be empty".to_string());
        }
        if self.precache_name == self.runtime_name {
            return Err(format!(
                "precache_name and runtime_name must differ (both are '{}')",
                self.precache_name
            ));
        }
        if self.precache_urls.is_empty() && self.external_urls.is_empty() {
            return Err("precache URL set cannot be empty".to_string());
        }
        Ok(())
    }
}
