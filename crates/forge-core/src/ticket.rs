use crate::error::{ForgeError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const UNTITLED: &str = "Untitled Feature";

/// A structured feature request. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default = "default_ticket_id")]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

fn default_ticket_id() -> String {
    format!("TKT-{}", chrono::Utc::now().timestamp())
}

fn default_title() -> String {
    UNTITLED.to_string()
}

impl Ticket {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            acceptance_criteria: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Parse a ticket from YAML or JSON text and validate it.
    pub fn parse(text: &str) -> Result<Self> {
        let ticket: Ticket = serde_yaml::from_str(text)?;
        ticket.validate()?;
        Ok(ticket)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForgeError::InvalidTicket(format!(
                "ticket file not found: {}",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn validate(&self) -> Result<()> {
        paths::validate_ticket_id(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_full_yaml_ticket() {
        let yaml = r#"
id: TKT-DEMO
title: Customer Alerts microservice
description: Backend microservice to manage user alerts.
acceptance_criteria:
  - POST /alerts -> 201 with alertId
  - GET /alerts?userId -> 200 list of alerts
constraints:
  - DynamoDB single-table design preferred
"#;
        let t = Ticket::parse(yaml).unwrap();
        assert_eq!(t.id, "TKT-DEMO");
        assert_eq!(t.acceptance_criteria.len(), 2);
        assert_eq!(t.constraints[0], "DynamoDB single-table design preferred");
    }

    #[test]
    fn parses_json_ticket() {
        let json = r#"{"id": "TKT-7", "title": "Json", "acceptance_criteria": []}"#;
        let t = Ticket::parse(json).unwrap();
        assert_eq!(t.title, "Json");
        assert!(t.description.is_empty());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let t = Ticket::parse("description: only a description\n").unwrap();
        assert!(t.id.starts_with("TKT-"));
        assert_eq!(t.title, UNTITLED);
        assert!(t.constraints.is_empty());
    }

    #[test]
    fn path_like_id_is_rejected() {
        let err = Ticket::parse("id: ../escape\n").unwrap_err();
        assert!(matches!(err, ForgeError::InvalidTicket(_)));
    }

    #[test]
    fn load_missing_file_is_invalid_ticket() {
        let dir = TempDir::new().unwrap();
        let err = Ticket::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("ticket file not found"));
    }
}
