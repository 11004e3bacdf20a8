use crate::artifact::{self, Artifact};
use crate::config::Config;
use crate::error::{ForgeError, Result};
use crate::openapi::OpenApiDocument;
use crate::paths;
use crate::routes;
use crate::template::{Fields, TemplateKind, TemplateStore};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Scaffolds a minimal serverless service from an OpenAPI document.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    pub openapi_path: PathBuf,
    pub service_dir: PathBuf,
    pub service_name: String,
    pub region: String,
    templates: TemplateStore,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenOutput {
    pub service_dir: PathBuf,
    pub base_path: String,
    pub files: Vec<PathBuf>,
    pub routes: Vec<String>,
}

impl CodeGenerator {
    pub fn new(
        openapi_path: impl Into<PathBuf>,
        service_dir: impl Into<PathBuf>,
        service_name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            openapi_path: openapi_path.into(),
            service_dir: service_dir.into(),
            service_name: service_name.into(),
            region: region.into(),
            templates: TemplateStore::builtin(),
        }
    }

    pub fn from_config(root: &Path, openapi_path: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(
            openapi_path,
            paths::resolve(root, &config.service.dir),
            config.service.name.clone(),
            config.service.region.clone(),
        )
    }

    /// Render every service file without writing anything.
    pub fn render(&self) -> Result<(Vec<Artifact>, CodegenOutput)> {
        if !self.openapi_path.exists() {
            return Err(ForgeError::DocumentNotFound(
                self.openapi_path.display().to_string(),
            ));
        }
        let doc = OpenApiDocument::load(&self.openapi_path)?;
        let base_path = doc.base_path();
        let scaffold = routes::scaffold(&doc, &base_path, &self.templates)?;

        let manifest = self.templates.render(
            TemplateKind::ServerlessManifest,
            &Fields::new()
                .with("service_name", self.service_name.as_str())
                .with("region", self.region.as_str())
                .with("base_path", base_path.as_str())
                .with("dynamic_functions", scaffold.manifest_fragment.as_str()),
        )?;

        let dir = &self.service_dir;
        let artifacts = vec![
            Artifact::new(dir.join("handler.py"), scaffold.handler_source),
            Artifact::new(dir.join("serverless.yml"), manifest),
            Artifact::new(
                dir.join("requirements.txt"),
                self.templates.load(TemplateKind::ServiceRequirements)?.text,
            ),
            Artifact::new(
                dir.join("tests").join("test_health.py"),
                self.templates.load(TemplateKind::HealthTest)?.text,
            ),
            Artifact::new(
                dir.join("Makefile"),
                self.templates.load(TemplateKind::Makefile)?.text,
            ),
        ];

        let output = CodegenOutput {
            service_dir: dir.clone(),
            base_path,
            files: artifacts.iter().map(|a| a.location.clone()).collect(),
            routes: scaffold.route_summary,
        };
        Ok((artifacts, output))
    }

    pub fn run(&self) -> Result<CodegenOutput> {
        let (artifacts, output) = self.render()?;
        artifact::write_all(&artifacts)?;
        tracing::info!(
            service = %self.service_name,
            dir = %self.service_dir.display(),
            routes = output.routes.len(),
            "service scaffolded"
        );
        Ok(output)
    }
}
