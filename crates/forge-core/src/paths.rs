use crate::error::{ForgeError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const FORGE_DIR: &str = ".forge";
pub const CONFIG_FILE: &str = ".forge/config.yaml";

pub const SPECS_DIR: &str = "docs/specs";
pub const TEMPLATES_DIR: &str = "docs/templates";

pub const DEFAULT_SERVICE_NAME: &str = "customer-alerts";
pub const DEFAULT_SERVICE_DIR: &str = "services/customer-alerts";

pub const CDK_DIR: &str = "infra/cdk";
pub const WORKFLOW_FILE: &str = ".github/workflows/ci-cd.yml";

pub const SPEC_SUFFIX: &str = "-spec.md";
pub const OPENAPI_SUFFIX: &str = "-openapi.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn specs_dir(root: &Path) -> PathBuf {
    root.join(SPECS_DIR)
}

pub fn spec_md_path(root: &Path, ticket_id: &str) -> PathBuf {
    specs_dir(root).join(format!("{ticket_id}{SPEC_SUFFIX}"))
}

pub fn openapi_path(root: &Path, ticket_id: &str) -> PathBuf {
    specs_dir(root).join(format!("{ticket_id}{OPENAPI_SUFFIX}"))
}

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

pub fn cdk_dir(root: &Path) -> PathBuf {
    root.join(CDK_DIR)
}

pub fn workflow_path(root: &Path) -> PathBuf {
    root.join(WORKFLOW_FILE)
}

/// Resolve a configured directory against the project root. Absolute paths
/// are returned unchanged.
pub fn resolve(root: &Path, dir: impl AsRef<Path>) -> PathBuf {
    let p = dir.as_ref();
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

// ---------------------------------------------------------------------------
// Ticket id validation
// ---------------------------------------------------------------------------

static TICKET_ID_RE: OnceLock<Regex> = OnceLock::new();

fn ticket_id_re() -> &'static Regex {
    TICKET_ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$").unwrap())
}

/// Ticket ids become file names under `docs/specs/`, so they must be a single
/// path component.
pub fn validate_ticket_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 128 || id.contains("..") || !ticket_id_re().is_match(id) {
        return Err(ForgeError::InvalidTicket(format!(
            "id '{id}' must be a single file-name component (letters, digits, '.', '_', '-')"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
