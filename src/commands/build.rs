use anyhow::Context;
use neurocell::{CellTemplate, Model, ModelBuilder, ModelSummary, Offset, SwcLoader};

use crate::cli::BuildArgs;

pub fn run(template: CellTemplate, args: BuildArgs) -> anyhow::Result<()> {
    let path = args
        .morphology
        .or_else(|| template.morphology.clone())
        .context("no morphology given and the template names none")?;

    let name = match (args.anonymous, args.name) {
        (true, _) => None,
        (false, Some(name)) => Some(name),
        (false, None) => Some(template.default_name.clone()),
    };

    let builder = ModelBuilder::new(template)?;
    let model = builder
        .build(
            &SwcLoader::from_path(&path),
            name.as_deref(),
            Offset::new(args.x, args.y, args.z),
        )
        .with_context(|| format!("building model from {}", path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&model.summary())?);
    } else {
        print_summary(&model, &model.summary());
    }

    Ok(())
}

fn print_summary(model: &Model, summary: &ModelSummary) {
    println!("-------{}-------", summary.name);
    println!(
        "offset ({}, {}, {}), {} sections",
        summary.offset.x,
        summary.offset.y,
        summary.offset.z,
        model.sections().len()
    );
    for region in &summary.regions {
        println!(
            "{:<5} {:>4} sections {:>10.1} um {:>5} segments  {}",
            region.region.to_string(),
            region.sections,
            region.total_length,
            region.total_nseg,
            region.mechanisms.join(" ")
        );
    }
}
