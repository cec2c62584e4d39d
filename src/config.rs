use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

pub type Number = f32;

pub const EPSILON: f32 = 1e-6;

pub const DEFAULT_STORAGE_ROOT: &str = "./vector_store";
pub const DEFAULT_DIMENSIONS: usize = 384;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Deserialize, Default)]
pub struct RagdexConfig {
    pub storage_root: Option<String>,
    pub dimensions: Option<usize>,
    pub top_k: Option<usize>,
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}

impl RagdexConfig {
    pub fn try_from(config: &Config) -> Result<Self, ConfigError> {
        Ok(RagdexConfig {
            storage_root: config.get("storage_root").ok(),
            dimensions: config.get("dimensions").ok(),
            top_k: config.get("top_k").ok(),
            chunk_size: config.get("chunk_size").ok(),
            chunk_overlap: config.get("chunk_overlap").ok(),
        })
    }
}

/// Process-wide settings, resolved once at startup and passed by reference
/// to every component constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub storage_root: PathBuf,
    pub dimensions: usize,
    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            dimensions: DEFAULT_DIMENSIONS,
            top_k: DEFAULT_TOP_K,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Settings {
    /// Reads `ragdex_config.*` from the working directory (optional) and
    /// `RAGDEX_*` environment variables, in that order of precedence.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(ConfigFile::with_name("ragdex_config").required(false))
            .add_source(Environment::with_prefix("RAGDEX"))
            .build()
            .context("Failed to read ragdex configuration")?;

        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let raw = RagdexConfig::try_from(config)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RagdexConfig) -> Result<Self> {
        let defaults = Self::default();

        let storage_root = raw
            .storage_root
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);
        let dimensions = raw.dimensions.unwrap_or(defaults.dimensions);
        let top_k = raw.top_k.unwrap_or(defaults.top_k);
        let chunk_size = raw.chunk_size.unwrap_or(defaults.chunk_size);
        let chunk_overlap = raw.chunk_overlap.unwrap_or(defaults.chunk_overlap);

        if dimensions == 0 {
            anyhow::bail!("RAGDEX_DIMENSIONS must be greater than zero.");
        }
        if top_k == 0 {
            anyhow::bail!("RAGDEX_TOP_K must be greater than zero.");
        }
        if chunk_size == 0 {
            anyhow::bail!("RAGDEX_CHUNK_SIZE must be greater than zero.");
        }
        if chunk_overlap >= chunk_size {
            anyhow::bail!(
                "RAGDEX_CHUNK_OVERLAP ({}) must be smaller than RAGDEX_CHUNK_SIZE ({}).",
                chunk_overlap,
                chunk_size
            );
        }

        Ok(Self {
            storage_root,
            dimensions,
            top_k,
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn print_config(&self) {
        println!("storage_root={}", self.storage_root.display());
        println!("dimensions={}", self.dimensions);
        println!("top_k={}", self.top_k);
        println!("chunk_size={}", self.chunk_size);
        println!("chunk_overlap={}", self.chunk_overlap);
    }
}
