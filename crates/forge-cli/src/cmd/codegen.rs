use anyhow::Context;
use clap::Args;
use forge_core::codegen::{CodeGenerator, CodegenOutput};
use forge_core::paths;
use std::path::{Path, PathBuf};

use super::{load_config, ServiceArgs};
use crate::output::{display_path, print_json, print_table, print_written};

/// Which OpenAPI document to scaffold from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct CodegenArgs {
    /// Path to an OpenAPI document
    #[arg(long)]
    pub openapi: Option<PathBuf>,

    /// Ticket id whose docs/specs/<ID>-openapi.yaml to use
    #[arg(long = "ticket", value_name = "ID")]
    pub ticket_id: Option<String>,
}

impl CodegenArgs {
    fn openapi_path(&self, root: &Path) -> anyhow::Result<PathBuf> {
        match (&self.openapi, &self.ticket_id) {
            (Some(path), _) => Ok(paths::resolve(root, path)),
            (None, Some(id)) => {
                paths::validate_ticket_id(id)?;
                Ok(paths::openapi_path(root, id))
            }
            (None, None) => anyhow::bail!("either --openapi or --ticket is required"),
        }
    }
}

pub fn run(root: &Path, args: CodegenArgs, service: &ServiceArgs, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    service.apply(&mut config);
    let openapi = args.openapi_path(root)?;

    let out = CodeGenerator::from_config(root, &openapi, &config)
        .run()
        .with_context(|| format!("code generation failed for {}", openapi.display()))?;

    if json {
        return print_json(&out);
    }
    print_codegen(root, &out);
    Ok(())
}

pub fn print_codegen(root: &Path, out: &CodegenOutput) {
    println!(
        "Service scaffolded in {} (base path {})",
        display_path(root, &out.service_dir),
        if out.base_path.is_empty() { "/" } else { out.base_path.as_str() }
    );
    print_written(root, &out.files);
    println!();
    let rows = out
        .routes
        .iter()
        .map(|r| match r.split_once(' ') {
            Some((method, path)) => vec![method.to_string(), path.to_string()],
            None => vec![r.clone(), String::new()],
        })
        .collect();
    print_table(&["METHOD", "PATH"], rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_openapi(path: &str) -> CodegenArgs {
        CodegenArgs {
            openapi: Some(PathBuf::from(path)),
            ticket_id: None,
        }
    }

    #[test]
    fn relative_openapi_path_is_under_root() {
        let root = Path::new("/srv/project");
        assert_eq!(
            from_openapi("api/openapi.yaml").openapi_path(root).unwrap(),
            PathBuf::from("/srv/project/api/openapi.yaml")
        );
    }

    #[test]
    fn absolute_openapi_path_is_kept() {
        let root = Path::new("/srv/project");
        assert_eq!(
            from_openapi("/tmp/openapi.yaml").openapi_path(root).unwrap(),
            PathBuf::from("/tmp/openapi.yaml")
        );
    }

    #[test]
    fn ticket_id_maps_to_specs_dir() {
        let args = CodegenArgs {
            openapi: None,
            ticket_id: Some("TKT-7".into()),
        };
        let path = args.openapi_path(Path::new("/srv/project")).unwrap();
        assert!(path.ends_with("docs/specs/TKT-7-openapi.yaml"));
    }
}
