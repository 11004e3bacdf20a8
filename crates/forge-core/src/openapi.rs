use crate::error::{ForgeError, Result};
use serde_yaml::Value;
use std::path::Path;

pub const DEFAULT_BASE_PATH: &str = "/api";

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// The parts of an OpenAPI document the scaffolder reads: server URLs and
/// the path → method table, both in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenApiDocument {
    pub servers: Vec<Option<String>>,
    pub paths: Vec<PathItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    pub path: String,
    /// Operation keys as written in the document.
    pub methods: Vec<String>,
}

impl OpenApiDocument {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForgeError::DocumentNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        let Value::Mapping(root) = root else {
            return Err(ForgeError::InvalidDocument(
                "top level is not a mapping".to_string(),
            ));
        };

        let servers = match root.get("servers") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(seq)) => seq
                .iter()
                .map(|s| s.get("url").and_then(Value::as_str).map(str::to_string))
                .collect(),
            Some(_) => {
                return Err(ForgeError::InvalidDocument(
                    "'servers' is not a list".to_string(),
                ))
            }
        };

        let paths = match root.get("paths") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Mapping(map)) => map
                .iter()
                .map(|(k, v)| parse_path_item(k, v))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(ForgeError::InvalidDocument(
                    "'paths' is not a mapping".to_string(),
                ))
            }
        };

        Ok(Self { servers, paths })
    }

    /// Base path for generated routes: the first server's URL path, or
    /// `/api` when the document declares no servers.
    pub fn base_path(&self) -> String {
        match self.servers.first() {
            None => DEFAULT_BASE_PATH.to_string(),
            Some(url) => normalize_base_path(url.as_deref().unwrap_or(DEFAULT_BASE_PATH)),
        }
    }

    /// Every `(path, method)` pair in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.paths
            .iter()
            .flat_map(|p| p.methods.iter().map(move |m| (p.path.as_str(), m.as_str())))
    }
}

fn parse_path_item(key: &Value, value: &Value) -> Result<PathItem> {
    let path = key
        .as_str()
        .ok_or_else(|| ForgeError::InvalidDocument(format!("path key {key:?} is not a string")))?
        .to_string();
    let methods = match value {
        Value::Null => Vec::new(),
        Value::Mapping(ops) => ops
            .keys()
            .filter_map(Value::as_str)
            .filter(|k| HTTP_METHODS.contains(&k.to_ascii_lowercase().as_str()))
            .map(str::to_string)
            .collect(),
        _ => {
            return Err(ForgeError::InvalidDocument(format!(
                "path item '{path}' is not a mapping"
            )))
        }
    };
    Ok(PathItem { path, methods })
}

/// `api` → `/api`, `https://host/v1/` → `/v1`, `/` → `` (routes then start
/// at the root).
pub fn normalize_base_path(url: &str) -> String {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => url,
    };
    let path = if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    path.trim_end_matches('/').to_string()
}
