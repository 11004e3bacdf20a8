use anyhow::Context;
use forge_core::infra::{InfraGenerator, InfraOutput};
use std::path::Path;

use super::{load_config, ServiceArgs};
use crate::output::{print_json, print_written};

pub fn run(root: &Path, service: &ServiceArgs, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    service.apply(&mut config);

    let out = InfraGenerator::from_config(root, &config)
        .run()
        .context("infra scaffolding failed")?;

    if json {
        return print_json(&out);
    }
    print_infra(root, &out);
    Ok(())
}

pub fn print_infra(root: &Path, out: &InfraOutput) {
    println!("Infra scaffolded");
    print_written(root, &out.files);
    println!();
    println!("Next steps:");
    for note in &out.notes {
        println!("  - {note}");
    }
}
