//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys come from `__` in env names, e.g. `APP_AZURE__API_KEY`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Build from an inline TOML document; no files or env vars are read.
    pub fn from_toml_str(toml: &str) -> Self {
        Self { figment: Figment::new().merge(Toml::string(toml)) }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The whole document as typed settings, with defaults for missing keys.
    pub fn settings(&self) -> anyhow::Result<AppSettings> {
        let settings: AppSettings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                if self.get::<String>("search.provider").ok().as_deref() == Some("azure") {
                    let key: String = self.get("azure.api_key").unwrap_or_default();
                    if key.is_empty() {
                        anyhow::bail!("azure.api_key must be set in production");
                    }
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Azure,
    #[default]
    Local,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub search: SearchSettings,
    pub azure: AzureSettings,
    pub local: LocalSettings,
    pub dialog: DialogSettings,
    pub data: DataSettings,
}

impl AppSettings {
    fn validate(&self) -> anyhow::Result<()> {
        if self.search.provider == ProviderKind::Azure {
            if self.azure.service.is_empty() { anyhow::bail!("azure.service is required when search.provider = \"azure\""); }
            if self.azure.index.is_empty() { anyhow::bail!("azure.index is required when search.provider = \"azure\""); }
        }
        if self.dialog.page_size == 0 { anyhow::bail!("dialog.page_size must be positive"); }
        if self.data.key_field.trim().is_empty() { anyhow::bail!("data.key_field must name a record field"); }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub provider: ProviderKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    pub service: String,
    pub api_key: String,
    pub index: String,
    pub api_version: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self { service: String::new(), api_key: String::new(), index: String::new(), api_version: "2016-09-01".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub index_dir: String,
}

impl Default for LocalSettings {
    fn default() -> Self { Self { index_dir: "data/indexes/poi".to_string() } }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogSettings {
    pub multiple_selection: bool,
    pub refiners: Vec<String>,
    pub page_size: usize,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self { multiple_selection: true, refiners: default_refiners(), page_size: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub records_dir: String,
    /// Record field holding the stable id. Used by the indexer and the mapper.
    pub key_field: String,
    pub image_field: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { records_dir: "data/records".to_string(), key_field: "id".to_string(), image_field: "thumbnail".to_string() }
    }
}

/// Facet fields of the POI index.
pub fn default_refiners() -> Vec<String> {
    [
        "Category", "ProductType", "Streetname", "Streettype", "State", "District",
        "City", "Neighborhood", "Country", "geohash", "neighboring_gh",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
