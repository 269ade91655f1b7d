use std::path::{Path, PathBuf};

use twelf::reexports::serde::{Deserialize, Serialize};
use twelf::{config, Layer};

use crate::error::BenchError;

pub const ENV_PREFIX: &str = "ES_BULK_BENCH_";

#[config]
#[derive(Debug, Default)]
pub struct Config {
    #[serde(default = "default_url")]
    url: String,
    #[serde(default = "default_bulk_size")]
    bulk_size: u64,
    #[serde(default = "default_index_name")]
    index_name: String,
    #[serde(default = "default_doc_type")]
    doc_type: String,
    #[serde(default = "default_iterations")]
    iterations: u64,
    #[serde(default = "default_pool_size")]
    pool_size: usize,
    #[serde(default)]
    pool_mode: PoolMode,
    #[serde(default)]
    flush_remaining: bool,
    #[serde(default)]
    basic_auth: Option<BasicAuth>,
    #[serde(default)]
    root_certificates: Option<PathBuf>,
    #[serde(default)]
    insecure: bool,
    #[serde(default)]
    audit_file: Option<String>,
}

/// How the string pool is filled.
///
/// `Replicated` draws a single value and repeats it for every slot, which is
/// what the benchmark has always sent. `Distinct` draws every slot on its own
/// and has to be asked for explicitly.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PoolMode {
    #[default]
    Replicated,
    Distinct,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BasicAuth {
    username: String,
    #[serde(default)]
    password: Option<String>,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_bulk_size() -> u64 {
    1000
}

fn default_index_name() -> String {
    "pyindex".to_string()
}

fn default_doc_type() -> String {
    "pytype".to_string()
}

fn default_iterations() -> u64 {
    1_000_000
}

fn default_pool_size() -> usize {
    1000
}

impl Config {
    /// Loads the optional config file first, environment variables second.
    pub fn load(path: Option<&Path>) -> crate::error::Result<Self> {
        let mut layers = vec![];
        if let Some(path) = path {
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            match extension {
                "toml" => layers.push(Layer::Toml(path.to_path_buf())),
                "json" => layers.push(Layer::Json(path.to_path_buf())),
                _ => return Err(BenchError::ConfigFormat(path.to_path_buf())),
            }
        }
        layers.push(Layer::Env(Some(ENV_PREFIX.to_string())));
        let config = Self::with_layers(&layers)?;
        if config.bulk_size == 0 {
            return Err(BenchError::InvalidBulkSize(config.bulk_size));
        }
        Ok(config)
    }

    pub fn get_url(&self) -> &String {
        &self.url
    }
    pub fn get_bulk_size(&self) -> u64 {
        self.bulk_size
    }
    pub fn get_index_name(&self) -> &String {
        &self.index_name
    }
    pub fn get_doc_type(&self) -> &String {
        &self.doc_type
    }
    pub fn get_iterations(&self) -> u64 {
        self.iterations
    }
    pub fn get_pool_size(&self) -> usize {
        self.pool_size
    }
    pub fn get_pool_mode(&self) -> PoolMode {
        self.pool_mode
    }
    pub fn is_flush_remaining(&self) -> bool {
        self.flush_remaining
    }
    pub fn get_basic_auth(&self) -> &Option<BasicAuth> {
        &self.basic_auth
    }
    pub fn get_root_certificates(&self) -> &Option<PathBuf> {
        &self.root_certificates
    }
    pub fn is_insecure(&self) -> bool {
        self.insecure
    }
    pub fn get_audit_file(&self) -> &Option<String> {
        &self.audit_file
    }
}

impl BasicAuth {
    pub fn get_username(&self) -> &String {
        &self.username
    }
    pub fn get_password(&self) -> &Option<String> {
        &self.password
    }
}
