//! Spec synthesis: ticket → Markdown specification + OpenAPI document.
//!
//! With a text-generation backend, both documents are requested in one
//! conversation. Any backend failure (transport, timeout, status, unparseable
//! body, empty answer) is logged and replaced by the deterministic template
//! path. A backend OpenAPI answer that does not start with `openapi:` is
//! replaced by the skeleton while the backend spec is kept.

use crate::artifact::Artifact;
use crate::backend;
use crate::config::Config;
use crate::error::Result;
use crate::paths;
use crate::template::{Fields, TemplateKind, TemplateStore};
use crate::ticket::Ticket;
use serde::Serialize;
use std::path::{Path, PathBuf};
use textgen_client::{GenerationRequest, TextGenerator, Turn};

pub const SUMMARY_MAX_CHARS: usize = 500;
pub const OPENAPI_PREFIX: &str = "openapi:";

const SYSTEM_INSTRUCTION: &str = "You are a senior software architect. Produce a precise, \
production-grade technical specification for the requested feature. Output MUST be clean \
Markdown suitable for review by architects, developers, and DevOps. Use exactly these \
top-level sections: Summary, Business Context & Goals, Scope (in/out), Functional \
Requirements, APIs overview, Data Model, Non-Functional Requirements, Acceptance Criteria, \
Test Plan, Deployment & Ops. Keep it concise and actionable.";

// ---------------------------------------------------------------------------
// Generation outcome
// ---------------------------------------------------------------------------

/// Outcome of one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Success(String),
    Fallback(String),
}

impl Generation {
    fn from_backend(backend: &dyn TextGenerator, request: &GenerationRequest) -> Self {
        match backend.generate(request) {
            Ok(text) if text.trim().is_empty() => {
                Generation::Fallback("backend returned an empty response".to_string())
            }
            Ok(text) => Generation::Success(text),
            Err(e) => Generation::Fallback(e.to_string()),
        }
    }
}

/// Where a generated document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Backend,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDocuments {
    pub spec_markdown: String,
    pub openapi_yaml: String,
    pub spec_source: DocumentSource,
    pub openapi_source: DocumentSource,
    /// Why any document came from templates; `None` when both came from the
    /// backend.
    pub fallback_reason: Option<String>,
}

/// Result of [`SpecWriter::run`]: where the documents were written.
#[derive(Debug, Clone, Serialize)]
pub struct SpecOutput {
    pub ticket_id: String,
    pub spec_md: PathBuf,
    pub openapi_yaml: PathBuf,
    pub spec_source: DocumentSource,
    pub openapi_source: DocumentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// SpecWriter
// ---------------------------------------------------------------------------

pub struct SpecWriter {
    root: PathBuf,
    templates: TemplateStore,
    backend: Option<Box<dyn TextGenerator>>,
    max_output_tokens: u32,
    temperature: f32,
}

impl SpecWriter {
    /// A writer with no backend: every run takes the template path.
    pub fn new(root: impl Into<PathBuf>, templates: TemplateStore) -> Self {
        Self {
            root: root.into(),
            templates,
            backend: None,
            max_output_tokens: 3000,
            temperature: 0.2,
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn TextGenerator>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_sampling(mut self, max_output_tokens: u32, temperature: f32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self.temperature = temperature;
        self
    }

    /// Build from project config. A backend that cannot be constructed is
    /// logged and left out, so the writer still works from templates.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        let templates = match &config.templates.override_dir {
            Some(dir) => TemplateStore::with_override_dir(paths::resolve(root, dir)),
            None => TemplateStore::builtin(),
        };
        let mut writer = Self::new(root, templates);
        if let Some(cfg) = &config.backend {
            writer = writer.with_sampling(cfg.max_output_tokens, cfg.temperature);
            match backend::build_generator(cfg) {
                Ok(generator) => writer = writer.with_backend(Box::new(generator)),
                Err(e) => tracing::warn!(
                    model = %cfg.model_id,
                    error = %e,
                    "text-generation backend unavailable; using templates"
                ),
            }
        }
        writer
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Produce both documents without touching the filesystem (other than
    /// reading template overrides).
    pub fn generate(&self, ticket: &Ticket) -> Result<SpecDocuments> {
        let Some(backend) = self.backend.as_deref() else {
            return self.fallback(ticket, None);
        };

        let spec_request = GenerationRequest::new(SYSTEM_INSTRUCTION)
            .with_turn(Turn::user(spec_prompt(ticket)))
            .with_max_output_tokens(self.max_output_tokens)
            .with_temperature(self.temperature);

        let spec_text = match Generation::from_backend(backend, &spec_request) {
            Generation::Success(text) => text,
            Generation::Fallback(reason) => {
                tracing::warn!(model = backend.model_id(), %reason, "spec generation failed; falling back to templates");
                return self.fallback(ticket, Some(reason));
            }
        };

        let openapi_request = spec_request
            .with_turn(Turn::assistant(spec_text.clone()))
            .with_turn(Turn::user(openapi_prompt(ticket)))
            .with_temperature(0.0);

        let openapi_text = match Generation::from_backend(backend, &openapi_request) {
            Generation::Success(text) => text,
            Generation::Fallback(reason) => {
                tracing::warn!(model = backend.model_id(), %reason, "OpenAPI generation failed; falling back to templates");
                return self.fallback(ticket, Some(reason));
            }
        };

        if is_openapi(&openapi_text) {
            tracing::info!(ticket = %ticket.id, model = backend.model_id(), "documents generated by backend");
            return Ok(SpecDocuments {
                spec_markdown: spec_text,
                openapi_yaml: openapi_text,
                spec_source: DocumentSource::Backend,
                openapi_source: DocumentSource::Backend,
                fallback_reason: None,
            });
        }

        let reason = format!("backend OpenAPI response did not start with '{OPENAPI_PREFIX}'");
        tracing::warn!(ticket = %ticket.id, "{reason}; using the OpenAPI skeleton");
        Ok(SpecDocuments {
            spec_markdown: spec_text,
            openapi_yaml: self.render_openapi(ticket)?,
            spec_source: DocumentSource::Backend,
            openapi_source: DocumentSource::Template,
            fallback_reason: Some(reason),
        })
    }

    /// Generate and write `docs/specs/<id>-spec.md` and
    /// `docs/specs/<id>-openapi.yaml`.
    pub fn run(&self, ticket: &Ticket) -> Result<SpecOutput> {
        ticket.validate()?;
        let docs = self.generate(ticket)?;

        let spec = Artifact::new(paths::spec_md_path(&self.root, &ticket.id), docs.spec_markdown);
        let openapi = Artifact::new(
            paths::openapi_path(&self.root, &ticket.id),
            docs.openapi_yaml,
        );
        crate::artifact::write_all(&[spec.clone(), openapi.clone()])?;

        Ok(SpecOutput {
            ticket_id: ticket.id.clone(),
            spec_md: spec.location,
            openapi_yaml: openapi.location,
            spec_source: docs.spec_source,
            openapi_source: docs.openapi_source,
            fallback_reason: docs.fallback_reason,
        })
    }

    fn fallback(&self, ticket: &Ticket, reason: Option<String>) -> Result<SpecDocuments> {
        Ok(SpecDocuments {
            spec_markdown: self
                .templates
                .render(TemplateKind::SpecDocument, &spec_fields(ticket))?,
            openapi_yaml: self.render_openapi(ticket)?,
            spec_source: DocumentSource::Template,
            openapi_source: DocumentSource::Template,
            fallback_reason: Some(
                reason.unwrap_or_else(|| "no text-generation backend configured".to_string()),
            ),
        })
    }

    fn render_openapi(&self, ticket: &Ticket) -> Result<String> {
        self.templates.render(
            TemplateKind::OpenApiSkeleton,
            &Fields::new().with("title", yaml_scalar(&ticket.title)?),
        )
    }
}

// ---------------------------------------------------------------------------
// Fields and prompts
// ---------------------------------------------------------------------------

/// `text` as a single-line YAML scalar, quoted when plain style would change
/// its meaning (`:`, leading `#`, `&`, `*`, `-`, ...).
fn yaml_scalar(text: &str) -> Result<String> {
    Ok(serde_yaml::to_string(text)?.trim_end().to_string())
}

/// Values for the spec template. Derived from the ticket where it has data,
/// fixed defaults elsewhere.
pub fn spec_fields(ticket: &Ticket) -> Fields {
    let summary: String = ticket.description.chars().take(SUMMARY_MAX_CHARS).collect();
    let summary = if summary.is_empty() {
        "N/A".to_string()
    } else {
        summary
    };
    let ac = &ticket.acceptance_criteria;

    Fields::new()
        .with("title", ticket.title.as_str())
        .with("summary", summary)
        .with("primary_objective", "Automate ticket → spec → code → deploy")
        .with("metric_1", "Lead time reduction (%)")
        .with("metric_2", "Change failure rate (%)")
        .with("in_scope_1", "Spec generation from ticket")
        .with("in_scope_2", "OpenAPI draft")
        .with("out_scope_1", "Frontend UX")
        .with("functional_1", "Generate service scaffold and APIs")
        .with("functional_2", "Provide test plan & acceptance criteria")
        .with("base_path", "/api")
        .with("services", "alerts, health")
        .with("entity_1", "Alert")
        .with("fields_1", "id, type, severity, message, createdAt")
        .with("entity_2", "User")
        .with("fields_2", "id, email, preferences")
        .with("nfr_perf", "P95 < 200ms for read APIs")
        .with("nfr_sec", "IAM, JWT (Cognito), least-privilege")
        .with("nfr_rel", "99.9% availability, multi-AZ")
        .with("nfr_obs", "CloudWatch metrics/logs, traces")
        .with("constraints", bullet_list(&ticket.constraints, "None"))
        .with(
            "ac_1",
            ac.first()
                .map(String::as_str)
                .unwrap_or("API responds with 200 for valid request"),
        )
        .with(
            "ac_2",
            ac.get(1)
                .map(String::as_str)
                .unwrap_or("Validation errors return 400 with details"),
        )
        .with("runtime", "AWS Lambda + API Gateway")
}

fn bullet_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!("- {empty}");
    }
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn spec_prompt(ticket: &Ticket) -> String {
    format!(
        "Create a production-ready technical specification for this ticket.\n\n\
         Title: {title}\n\n\
         Description:\n{description}\n\n\
         Acceptance Criteria:\n{ac}\n\n\
         Constraints:\n{constraints}\n\n\
         Include sections: Summary, Business Context & Goals, Scope (in/out), Functional Requirements,\n\
         APIs overview, Data Model, Non-Functional Requirements, Acceptance Criteria, Test Plan, Deployment & Ops (IaC/CI-CD).\n\
         Be concise and specific. Use bullet points where possible.\n",
        title = ticket.title,
        description = ticket.description,
        ac = bullet_list(&ticket.acceptance_criteria, "N/A"),
        constraints = bullet_list(&ticket.constraints, "None"),
    )
}

pub fn openapi_prompt(ticket: &Ticket) -> String {
    format!(
        "Draft a minimal OpenAPI 3.0 YAML for the service '{title}' described below.\n\
         Include at least: /health and one example resource with CRUD (if applicable).\n\
         Keep it valid YAML starting with 'openapi: 3.0.3'. Only output YAML, no explanations.\n\n\
         Description:\n{description}\n",
        title = ticket.title,
        description = ticket.description,
    )
}

pub fn is_openapi(text: &str) -> bool {
    text.trim().starts_with(OPENAPI_PREFIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
