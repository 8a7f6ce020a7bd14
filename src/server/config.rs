use crate::analysis::AnalyzerOptions;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_CONTAINER_FILE, MODULE_LOADER, REGISTER_METHOD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwilixConfig {
    /// File name pattern of the container, searched as `**/<pattern>`.
    #[serde(default = "default_container_file")]
    pub container_file: String,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureConfig {
    #[serde(default = "true_bool")]
    pub definition: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default)]
    pub tolerant: bool,
    #[serde(default = "default_module_loader")]
    pub module_loader: String,
    #[serde(default = "default_register_method")]
    pub register_method: String,
}

impl Default for AwilixConfig {
    fn default() -> Self {
        Self {
            container_file: default_container_file(),
            features: FeatureConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { definition: true }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerant: false,
            module_loader: default_module_loader(),
            register_method: default_register_method(),
        }
    }
}

impl AwilixConfig {
    pub fn to_analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            module_loader: self.analysis.module_loader.as_str().into(),
            register_method: self.analysis.register_method.as_str().into(),
            tolerant: self.analysis.tolerant,
        }
    }
}

/// Holds the effective configuration.
///
/// Layers, lowest precedence first: built-in defaults, the client's
/// initialization options, then `awilix.toml` at the workspace root.
pub struct ConfigManager {
    config: Arc<RwLock<AwilixConfig>>,

    init_settings: Arc<RwLock<Option<serde_json::Value>>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AwilixConfig::default())),
            init_settings: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_init_settings(&self, settings: Option<serde_json::Value>) {
        *self.init_settings.write().await = settings;
    }

    pub async fn load_from_workspace(&self, root: &Path) -> Result<AwilixConfig, String> {
        let mut merged = serde_json::to_value(AwilixConfig::default())
            .map_err(|e| format!("Failed to serialize defaults: {}", e))?;

        if let Some(settings) = self.init_settings.read().await.as_ref() {
            merge_json(&mut merged, settings);
        }

        let config_path = root.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|e| format!("Failed to read config: {}", e))?;
            let overlay: serde_json::Value =
                toml::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;
            merge_json(&mut merged, &overlay);
        }

        let config: AwilixConfig = serde_json::from_value(merged)
            .map_err(|e| format!("Failed to deserialize merged config: {}", e))?;

        tracing::info!(
            container_file = %config.container_file,
            definition = config.features.definition,
            "Configuration loaded"
        );

        *self.config.write().await = config.clone();
        Ok(config)
    }

    pub async fn update(&self, new_config: AwilixConfig) {
        *self.config.write().await = new_config;
    }

    pub async fn is_definition_enabled(&self) -> bool {
        self.config.read().await.features.definition
    }

    pub async fn container_file(&self) -> String {
        self.config.read().await.container_file.clone()
    }

    pub async fn analyzer_options(&self) -> AnalyzerOptions {
        self.config.read().await.to_analyzer_options()
    }
}

/// Recursively overlay `overlay` onto `base`; nulls in the overlay are ignored.
fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    use serde_json::Value;

    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map.iter().filter(|(_, v)| !v.is_null()) {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) if !overlay.is_null() => *base = overlay.clone(),
        _ => {}
    }
}

fn default_container_file() -> String {
    DEFAULT_CONTAINER_FILE.to_string()
}

fn default_module_loader() -> String {
    MODULE_LOADER.to_string()
}

fn default_register_method() -> String {
    REGISTER_METHOD.to_string()
}

fn true_bool() -> bool {
    true
}
