use anyhow::Context;
use forge_core::pipeline::Pipeline;
use std::path::Path;

use super::{apply_model, load_config, load_ticket, ServiceArgs};
use crate::output::print_json;

pub fn run(
    root: &Path,
    ticket_path: &Path,
    model: Option<String>,
    service: &ServiceArgs,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    apply_model(&mut config, model);
    service.apply(&mut config);
    let ticket = load_ticket(ticket_path)?;

    let report = Pipeline::new(root, config)
        .run(&ticket)
        .with_context(|| format!("pipeline failed for {}", ticket.id))?;

    if json {
        return print_json(&report);
    }
    super::spec::print_spec(root, &report.spec);
    println!();
    super::codegen::print_codegen(root, &report.codegen);
    println!();
    super::infra::print_infra(root, &report.infra);
    Ok(())
}
