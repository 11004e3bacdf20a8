//! Template store and placeholder renderer.
//!
//! Templates are plain text with `{{name}}` slots. A [`Template`] knows the
//! set of slots it contains; [`render`] fills every slot from a [`Fields`]
//! map in one pass and fails on the first slot without a value, so a typo in
//! a template surfaces as an error instead of leaking into an artifact.

use crate::error::{ForgeError, Result};
use crate::io;
use regex::{Captures, Regex};
use rust_embed::Embed;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/templates/"]
struct BuiltinTemplates;

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    SpecDocument,
    OpenApiSkeleton,
    Handler,
    ServerlessManifest,
    ServiceRequirements,
    Makefile,
    HealthTest,
    CdkRequirements,
    CdkApp,
    CdkStack,
    PyProject,
    CiWorkflow,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        &[
            TemplateKind::SpecDocument,
            TemplateKind::OpenApiSkeleton,
            TemplateKind::Handler,
            TemplateKind::ServerlessManifest,
            TemplateKind::ServiceRequirements,
            TemplateKind::Makefile,
            TemplateKind::HealthTest,
            TemplateKind::CdkRequirements,
            TemplateKind::CdkApp,
            TemplateKind::CdkStack,
            TemplateKind::PyProject,
            TemplateKind::CiWorkflow,
        ]
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::SpecDocument => "spec_template.md",
            TemplateKind::OpenApiSkeleton => "openapi_skeleton.yaml",
            TemplateKind::Handler => "handler.py",
            TemplateKind::ServerlessManifest => "serverless.yml",
            TemplateKind::ServiceRequirements => "requirements.txt",
            TemplateKind::Makefile => "Makefile",
            TemplateKind::HealthTest => "test_health.py",
            TemplateKind::CdkRequirements => "cdk_requirements.txt",
            TemplateKind::CdkApp => "cdk_app.py",
            TemplateKind::CdkStack => "alerts_api_stack.py",
            TemplateKind::PyProject => "pyproject.toml",
            TemplateKind::CiWorkflow => "ci-cd.yml",
        }
    }

    /// Document templates may be replaced from a directory on disk; the
    /// service and infra templates are always the embedded ones.
    pub fn is_overridable(self) -> bool {
        matches!(
            self,
            TemplateKind::SpecDocument | TemplateKind::OpenApiSkeleton
        )
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([a-z][a-z0-9_]*)\s*\}\}").unwrap())
}

#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Names of every `{{slot}}` in the template.
    pub fn placeholders(&self) -> BTreeSet<String> {
        placeholder_re()
            .captures_iter(&self.text)
            .map(|c| c[1].to_string())
            .collect()
    }
}

/// Values for template slots, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Fill every slot of `template` from `fields`.
///
/// Substituted values are never re-scanned, so a value containing `{{x}}`
/// is emitted literally.
pub fn render(template: &Template, fields: &Fields) -> Result<String> {
    if let Some(field) = template
        .placeholders()
        .into_iter()
        .find(|p| fields.get(p).is_none())
    {
        return Err(ForgeError::MissingField {
            template: template.name.clone(),
            field,
        });
    }
    let out = placeholder_re().replace_all(&template.text, |caps: &Captures| {
        fields.get(&caps[1]).unwrap_or_default().to_string()
    });
    Ok(out.into_owned())
}

// ---------------------------------------------------------------------------
// TemplateStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    override_dir: Option<PathBuf>,
}

impl TemplateStore {
    pub fn builtin() -> Self {
        Self { override_dir: None }
    }

    /// Read document templates from `dir` instead of the embedded copies.
    /// A document template missing from `dir` is an error, not a silent
    /// fallback to the embedded one.
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    pub fn load(&self, kind: TemplateKind) -> Result<Template> {
        if let (Some(dir), true) = (&self.override_dir, kind.is_overridable()) {
            let path = dir.join(kind.file_name());
            if !path.exists() {
                return Err(ForgeError::TemplateNotFound(path.display().to_string()));
            }
            let text = std::fs::read_to_string(&path)?;
            return Ok(Template::new(kind.file_name(), text));
        }
        Ok(Template::new(kind.file_name(), builtin_text(kind)?))
    }

    /// Load and render in one step.
    pub fn render(&self, kind: TemplateKind, fields: &Fields) -> Result<String> {
        render(&self.load(kind)?, fields)
    }
}

/// The embedded text of a template.
pub fn builtin_text(kind: TemplateKind) -> Result<String> {
    let file = BuiltinTemplates::get(kind.file_name())
        .ok_or_else(|| ForgeError::TemplateNotFound(format!("<builtin>/{}", kind.file_name())))?;
    Ok(String::from_utf8_lossy(&file.data).into_owned())
}

/// Copy the overridable document templates into `dir` so they can be
/// edited. Existing files are left alone. Returns the paths written.
pub fn export_document_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for kind in TemplateKind::all().iter().filter(|k| k.is_overridable()) {
        let path = dir.join(kind.file_name());
        if io::write_if_missing(&path, builtin_text(*kind)?.as_bytes())? {
            written.push(path);
        }
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn render_fills_every_slot() {
        let t = Template::new("t", "Hello {{name}}, welcome to {{ place }}!");
        let fields = Fields::new().with("name", "Ada").with("place", "the lab");
        assert_eq!(render(&t, &fields).unwrap(), "Hello Ada, welcome to the lab!");
    }

    #[test]
    fn render_reports_missing_slot() {
        let t = Template::new("greeting", "Hello {{name}} from {{team}}");
        let err = render(&t, &Fields::new().with("name", "Ada")).unwrap_err();
        match err {
            ForgeError::MissingField { template, field } => {
                assert_eq!(template, "greeting");
                assert_eq!(field, "team");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn render_does_not_rescan_values() {
        let t = Template::new("t", "{{a}}");
        let fields = Fields::new().with("a", "{{b}}");
        assert_eq!(render(&t, &fields).unwrap(), "{{b}}");
    }

    #[test]
    fn github_expressions_are_not_slots() {
        let t = Template::new("ci", "${{ secrets.AWS_CDK_ROLE_ARN }} {{region}}");
        let placeholders = t.placeholders();
        assert_eq!(placeholders.len(), 1);
        assert!(placeholders.contains("region"));
    }

    #[test]
    fn every_builtin_template_is_embedded() {
        for kind in TemplateKind::all() {
            let text = builtin_text(*kind).unwrap();
            assert!(!text.is_empty(), "{} is empty", kind.file_name());
        }
    }

    #[test]
    fn builtin_slots_match_expected_fields() {
        let store = TemplateStore::builtin();
        let openapi = store.load(TemplateKind::OpenApiSkeleton).unwrap();
        assert_eq!(
            openapi.placeholders(),
            BTreeSet::from(["title".to_string()])
        );
        let ci = store.load(TemplateKind::CiWorkflow).unwrap();
        assert_eq!(
            ci.placeholders(),
            BTreeSet::from(["region".to_string(), "service_dir".to_string()])
        );
        let handler = store.load(TemplateKind::Handler).unwrap();
        assert!(handler.placeholders().is_empty());
    }

    #[test]
    fn override_dir_replaces_document_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("openapi_skeleton.yaml"), "openapi: 3.1.0 # {{title}}").unwrap();
        let store = TemplateStore::with_override_dir(dir.path());
        let t = store.load(TemplateKind::OpenApiSkeleton).unwrap();
        assert_eq!(t.text, "openapi: 3.1.0 # {{title}}");
        // Non-document templates still come from the binary.
        assert!(store.load(TemplateKind::Handler).is_ok());
    }

    #[test]
    fn override_dir_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::with_override_dir(dir.path());
        let err = store.load(TemplateKind::SpecDocument).unwrap_err();
        assert!(matches!(err, ForgeError::TemplateNotFound(_)));
    }

    #[test]
    fn export_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let first = export_document_templates(dir.path()).unwrap();
        assert_eq!(first.len(), 2);
        let second = export_document_templates(dir.path()).unwrap();
        assert!(second.is_empty());
    }
}
