use anyhow::Context;
use forge_core::spec_writer::{DocumentSource, SpecOutput, SpecWriter};
use std::path::Path;

use super::{apply_model, load_config, load_ticket};
use crate::output::{print_json, print_written};

pub fn run(root: &Path, ticket_path: &Path, model: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    apply_model(&mut config, model);
    let ticket = load_ticket(ticket_path)?;

    let out = SpecWriter::from_config(root, &config)
        .run(&ticket)
        .with_context(|| format!("spec generation failed for {}", ticket.id))?;

    if json {
        return print_json(&out);
    }
    print_spec(root, &out);
    Ok(())
}

pub fn source_label(source: DocumentSource) -> &'static str {
    match source {
        DocumentSource::Backend => "backend",
        DocumentSource::Template => "template",
    }
}

pub fn print_spec(root: &Path, out: &SpecOutput) {
    println!(
        "Spec for {} (spec: {}, openapi: {})",
        out.ticket_id,
        source_label(out.spec_source),
        source_label(out.openapi_source)
    );
    print_written(root, &[&out.spec_md, &out.openapi_yaml]);
    if let Some(reason) = &out.fallback_reason {
        println!("  note: {reason}");
    }
}
