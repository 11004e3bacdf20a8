use anyhow::Context;
use forge_core::config::{Config, TemplatesConfig};
use forge_core::{io, paths, template};
use std::path::Path;

use crate::output::{display_path, print_json};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let created_config = if config_path.exists() {
        false
    } else {
        let config = Config {
            templates: TemplatesConfig {
                override_dir: Some(paths::TEMPLATES_DIR.to_string()),
            },
            ..Config::default()
        };
        config.save(root).context("failed to write config.yaml")?;
        true
    };

    let specs = paths::specs_dir(root);
    io::ensure_dir(&specs).with_context(|| format!("failed to create {}", specs.display()))?;

    let exported = template::export_document_templates(&paths::templates_dir(root))
        .context("failed to export document templates")?;

    if json {
        return print_json(&serde_json::json!({
            "root": root,
            "config_created": created_config,
            "templates_exported": exported,
        }));
    }

    println!("Initializing forge in: {}", root.display());
    if created_config {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    for path in &exported {
        println!("  created: {}", display_path(root, path));
    }
    Ok(())
}
