use crate::config::BackendConfig;
use std::time::Duration;
use textgen_client::{ClientConfig, HttpTextGenerator};

/// Build the HTTP generator described by `cfg`. The bearer token is read from
/// the environment variable named by `api_key_env`, if any.
pub fn build_generator(cfg: &BackendConfig) -> textgen_client::Result<HttpTextGenerator> {
    let mut client = ClientConfig::new(&cfg.endpoint, &cfg.model_id);
    client.api_key = cfg
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|k| !k.is_empty());
    client.request_timeout = Duration::from_secs(cfg.timeout_secs);
    client.connect_timeout = Duration::from_secs(cfg.connect_timeout_secs);
    HttpTextGenerator::new(client)
}
