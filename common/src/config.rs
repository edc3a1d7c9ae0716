use crate::yaml_include::load_yaml_with_includes;
use serde::Deserialize;
use std::{error::Error, path::Path};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
    pub database_name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
}

impl Config {
    /// Load a config file. `!include` lines are resolved relative to the file
    /// itself, so both a pre-assembled `total_config.yaml` and a raw
    /// environment file work here.
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let merged = load_yaml_with_includes(Path::new(config_path))?;

        let mut contents = String::new();
        {
            let mut emitter = yaml_rust2::YamlEmitter::new(&mut contents);
            emitter.dump(&merged)?;
        }
        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }
}
