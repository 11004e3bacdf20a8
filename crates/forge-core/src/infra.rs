use crate::artifact::{self, Artifact};
use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::paths;
use crate::template::{Fields, TemplateKind, TemplateStore};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Emits the CDK app and the CI/CD workflow for a service.
#[derive(Debug, Clone)]
pub struct InfraGenerator {
    root: PathBuf,
    pub region: String,
    /// Service directory as referenced from generated files, relative to the
    /// project root.
    pub service_dir: String,
    templates: TemplateStore,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfraOutput {
    pub cdk_dir: PathBuf,
    pub workflow: PathBuf,
    pub files: Vec<PathBuf>,
    pub notes: Vec<String>,
}

impl InfraGenerator {
    pub fn new(
        root: impl Into<PathBuf>,
        region: impl Into<String>,
        service_dir: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            region: region.into(),
            service_dir: service_dir.into(),
            templates: TemplateStore::builtin(),
        }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(root, &config.service.region, &config.service.dir)
    }

    pub fn render(&self) -> Result<Vec<Artifact>> {
        let fields = Fields::new()
            .with("region", self.region.as_str())
            .with("service_dir", self.service_dir.trim_end_matches('/'));
        let cdk = paths::cdk_dir(&self.root);
        let render = |kind| self.templates.render(kind, &fields);

        Ok(vec![
            Artifact::new(
                cdk.join("requirements.txt"),
                render(TemplateKind::CdkRequirements)?,
            ),
            Artifact::new(cdk.join("app.py"), render(TemplateKind::CdkApp)?),
            Artifact::new(
                cdk.join("stacks").join("alerts_api_stack.py"),
                render(TemplateKind::CdkStack)?,
            ),
            Artifact::new(cdk.join("pyproject.toml"), render(TemplateKind::PyProject)?),
            Artifact::new(
                paths::workflow_path(&self.root),
                render(TemplateKind::CiWorkflow)?,
            ),
        ])
    }

    pub fn run(&self) -> Result<InfraOutput> {
        let artifacts = self.render()?;
        artifact::write_all(&artifacts)?;
        io::ensure_dir(&paths::resolve(&self.root, &self.service_dir))?;
        tracing::info!(region = %self.region, service_dir = %self.service_dir, "infra scaffolded");

        Ok(InfraOutput {
            cdk_dir: paths::cdk_dir(&self.root),
            workflow: paths::workflow_path(&self.root),
            files: artifacts.into_iter().map(|a| a.location).collect(),
            notes: vec![
                "Set GitHub secret AWS_CDK_ROLE_ARN to an IAM Role ARN trusted for GitHub OIDC."
                    .to_string(),
                format!(
                    "Set AWS_DEFAULT_REGION secret if different from {}.",
                    self.region
                ),
                "Run: npm i -g aws-cdk && pip install -r infra/cdk/requirements.txt && cdk bootstrap"
                    .to_string(),
            ],
        })
    }
}
