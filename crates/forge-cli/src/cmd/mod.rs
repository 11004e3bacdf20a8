pub mod codegen;
pub mod config;
pub mod infra;
pub mod init;
pub mod run;
pub mod serve;
pub mod spec;

use anyhow::Context;
use clap::Args;
use forge_core::config::{BackendConfig, Config};
use forge_core::ticket::Ticket;
use std::path::Path;

/// Service overrides shared by `codegen`, `infra` and `run`.
#[derive(Args, Debug, Default, Clone)]
pub struct ServiceArgs {
    /// Deployment region (overrides service.region / AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Service directory, relative to the project root
    #[arg(long)]
    pub service_dir: Option<String>,

    /// Service name used in the deployment manifest
    #[arg(long)]
    pub service_name: Option<String>,
}

impl ServiceArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(region) = &self.region {
            config.service.region = region.clone();
        }
        if let Some(dir) = &self.service_dir {
            config.service.dir = dir.clone();
        }
        if let Some(name) = &self.service_name {
            config.service.name = name.clone();
        }
    }
}

/// Project config with environment overrides applied.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load_with_env(root).context("failed to load .forge/config.yaml")
}

/// `--model` enables the backend, keeping any other configured settings.
pub fn apply_model(config: &mut Config, model: Option<String>) {
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        let backend = config
            .backend
            .get_or_insert_with(|| BackendConfig::new(model.as_str()));
        backend.model_id = model;
    }
}

pub fn load_ticket(path: &Path) -> anyhow::Result<Ticket> {
    Ticket::load(path).with_context(|| format!("failed to load ticket {}", path.display()))
}
