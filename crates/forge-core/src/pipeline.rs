//! Pipeline supervisor: spec synthesis → route scaffolding → infra
//! scaffolding, in that fixed order. The first failing step aborts the run.

use crate::codegen::{CodeGenerator, CodegenOutput};
use crate::config::Config;
use crate::error::Result;
use crate::infra::{InfraGenerator, InfraOutput};
use crate::spec_writer::{SpecOutput, SpecWriter};
use crate::ticket::Ticket;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Built once after spec synthesis and handed read-only to later steps.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub ticket: Ticket,
    pub spec_md_path: PathBuf,
    pub openapi_path: PathBuf,
}

impl PipelineContext {
    pub fn from_spec(ticket: &Ticket, spec: &SpecOutput) -> Self {
        Self {
            ticket: ticket.clone(),
            spec_md_path: spec.spec_md.clone(),
            openapi_path: spec.openapi_yaml.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub spec: SpecOutput,
    pub codegen: CodegenOutput,
    pub infra: InfraOutput,
}

pub struct Pipeline {
    root: PathBuf,
    config: Config,
    spec_writer: SpecWriter,
}

impl Pipeline {
    pub fn new(root: &Path, config: Config) -> Self {
        let spec_writer = SpecWriter::from_config(root, &config);
        Self {
            root: root.to_path_buf(),
            config,
            spec_writer,
        }
    }

    /// Replace the spec writer built from config.
    pub fn with_spec_writer(mut self, writer: SpecWriter) -> Self {
        self.spec_writer = writer;
        self
    }

    pub fn run(&self, ticket: &Ticket) -> Result<PipelineReport> {
        tracing::info!(ticket = %ticket.id, "pipeline: spec synthesis");
        let spec = self.spec_writer.run(ticket)?;

        let ctx = PipelineContext::from_spec(ticket, &spec);

        tracing::info!(
            ticket = %ctx.ticket.id,
            spec = %ctx.spec_md_path.display(),
            openapi = %ctx.openapi_path.display(),
            "pipeline: route scaffolding"
        );
        let codegen = CodeGenerator::from_config(&self.root, &ctx.openapi_path, &self.config).run()?;

        tracing::info!(ticket = %ctx.ticket.id, "pipeline: infra scaffolding");
        let infra = InfraGenerator::from_config(&self.root, &self.config).run()?;

        Ok(PipelineReport {
            spec,
            codegen,
            infra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForgeError;
    use crate::spec_writer::DocumentSource;
    use crate::template::TemplateStore;
    use tempfile::TempDir;
    use textgen_client::{GenerationRequest, TextGenerator};

    struct FixedAnswer(&'static str);

    impl TextGenerator for FixedAnswer {
        fn model_id(&self) -> &str {
            "fixed"
        }

        fn generate(&self, request: &GenerationRequest) -> textgen_client::Result<String> {
            if request.conversation.len() == 1 {
                Ok("# Spec\n\nGenerated.".to_string())
            } else {
                Ok(self.0.to_string())
            }
        }
    }

    fn ticket() -> Ticket {
        Ticket::new("TKT-001", "Customer Alerts microservice")
    }

    #[test]
    fn fallback_run_produces_full_layout() {
        let dir = TempDir::new().unwrap();
        let report = Pipeline::new(dir.path(), Config::default())
            .run(&ticket())
            .unwrap();

        for f in [
            "docs/specs/TKT-001-spec.md",
            "docs/specs/TKT-001-openapi.yaml",
            "services/customer-alerts/handler.py",
            "services/customer-alerts/serverless.yml",
            "services/customer-alerts/requirements.txt",
            "services/customer-alerts/tests/test_health.py",
            "services/customer-alerts/Makefile",
            "infra/cdk/app.py",
            "infra/cdk/stacks/alerts_api_stack.py",
            ".github/workflows/ci-cd.yml",
        ] {
            assert!(dir.path().join(f).exists(), "missing {f}");
        }
        assert_eq!(report.spec.spec_source, DocumentSource::Template);
        assert_eq!(report.codegen.base_path, "/api");
        assert_eq!(
            report.codegen.routes,
            vec![
                "GET /health",
                "GET /alerts",
                "POST /alerts",
                "PATCH /alerts/{id}"
            ]
        );
    }

    #[test]
    fn title_with_yaml_syntax_runs_to_completion() {
        let dir = TempDir::new().unwrap();
        let report = Pipeline::new(dir.path(), Config::default())
            .run(&Ticket::new("TKT-9", "Alerts: v2 service"))
            .unwrap();
        assert_eq!(report.codegen.routes.len(), 4);
        let doc = std::fs::read_to_string(dir.path().join("docs/specs/TKT-9-openapi.yaml")).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&doc).unwrap();
        assert_eq!(doc["info"]["title"].as_str(), Some("Alerts: v2 service"));
    }

    #[test]
    fn context_points_at_written_documents() {
        let dir = TempDir::new().unwrap();
        let spec = SpecWriter::new(dir.path(), TemplateStore::builtin())
            .run(&ticket())
            .unwrap();
        let ctx = PipelineContext::from_spec(&ticket(), &spec);
        assert_eq!(ctx.ticket.id, "TKT-001");
        assert!(ctx.spec_md_path.ends_with("docs/specs/TKT-001-spec.md"));
        assert!(ctx.openapi_path.ends_with("docs/specs/TKT-001-openapi.yaml"));
        assert!(ctx.spec_md_path.exists() && ctx.openapi_path.exists());
    }

    #[test]
    fn codegen_reads_backend_document() {
        let dir = TempDir::new().unwrap();
        let writer = SpecWriter::new(dir.path(), TemplateStore::builtin()).with_backend(Box::new(
            FixedAnswer("openapi: 3.0.3\nservers:\n  - url: /v1\npaths:\n  /widgets:\n    get: {}\n"),
        ));
        let report = Pipeline::new(dir.path(), Config::default())
            .with_spec_writer(writer)
            .run(&ticket())
            .unwrap();
        assert_eq!(report.spec.openapi_source, DocumentSource::Backend);
        assert_eq!(report.codegen.base_path, "/v1");
        assert_eq!(report.codegen.routes, vec!["GET /widgets"]);
    }

    #[test]
    fn collision_stops_before_infra() {
        let dir = TempDir::new().unwrap();
        let writer = SpecWriter::new(dir.path(), TemplateStore::builtin()).with_backend(Box::new(
            FixedAnswer("openapi: 3.0.3\npaths:\n  /a/b:\n    get: {}\n  /a_b:\n    get: {}\n"),
        ));
        let err = Pipeline::new(dir.path(), Config::default())
            .with_spec_writer(writer)
            .run(&ticket())
            .unwrap_err();
        assert!(matches!(err, ForgeError::HandlerCollision { .. }));
        assert!(dir.path().join("docs/specs/TKT-001-spec.md").exists());
        assert!(!dir.path().join("infra/cdk").exists());
    }

    #[test]
    fn report_serializes() {
        let dir = TempDir::new().unwrap();
        let report = Pipeline::new(dir.path(), Config::default())
            .run(&ticket())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["spec"]["ticket_id"], "TKT-001");
        assert_eq!(json["infra"]["notes"].as_array().unwrap().len(), 3);
    }
}
