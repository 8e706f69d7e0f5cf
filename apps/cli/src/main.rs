mod cli;
mod config;
mod logging;

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::Parser;

use fhirloom_engine::Coordinator;
use fhirloom_hl7::adapt;
use fhirloom_templates::{TemplateLoader, TemplateSource};

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = cli::Cli::parse();

    let app_config = config::AppConfig::load().context("failed to load configuration")?;
    let conversion_config = app_config.into_conversion_config();

    let source = TemplateSource::new(cli.template_dir.clone(), cli.override_dir.clone());
    let loader = TemplateLoader::new(source);
    let coordinator = Coordinator::new(loader, conversion_config);

    let raw = read_input(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;
    let tree = adapt(&raw).context("failed to parse HL7 message")?;
    tracing::info!(input = %cli.input.display(), "parsed HL7 message");

    let outcome = coordinator.convert(&tree).context("conversion failed")?;
    tracing::info!(
        entries = outcome.bundle.entry_count(),
        message_id = outcome.coverage.message_id.as_deref().unwrap_or("(none)"),
        "conversion complete"
    );

    let bundle_json = outcome.bundle.to_value().context("failed to serialize bundle")?;
    write_output(cli.out.as_deref(), &bundle_json)?;

    if cli.coverage {
        let coverage_json = serde_json::to_string_pretty(&outcome.coverage)?;
        eprintln!("{coverage_json}");
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: Option<&Path>, value: &serde_json::Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
