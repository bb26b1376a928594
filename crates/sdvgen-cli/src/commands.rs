//! Subcommand implementations

use crate::config::Config;
use crate::document;
use anyhow::{Context, Result};
use sdvgen_codegen::{bridge_artifacts, idl_artifacts};
use sdvgen_core::{BatchReport, BuildOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Input documents shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub arxml: Vec<PathBuf>,
    pub deployment: Option<PathBuf>,
    pub package: Option<String>,
}

/// Whether per-document progress lines go to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Print,
    Quiet,
}

/// Build each document and hand the successful reports to `each`.
///
/// A document that cannot be read or parsed is reported and skipped; the
/// remaining documents are still processed.
fn for_each_document(
    config: &Config,
    inputs: &Inputs,
    progress: Progress,
    mut each: impl FnMut(&Path, &BatchReport) -> Result<()>,
) -> Result<()> {
    let options = BuildOptions {
        package: config.package(inputs.package.as_deref())?,
    };
    let deployment = document::read_deployment(inputs.deployment.as_deref())?;

    let mut failed = 0;
    for path in &inputs.arxml {
        if progress == Progress::Print {
            println!("Parsing ARXML: {}", path.display());
        }
        let report = match document::load(path, deployment.as_ref(), &options) {
            Ok(report) => report,
            Err(e) => {
                error!(document = %path.display(), error = %format!("{e:#}"), "document skipped");
                eprintln!("Error: {e:#}");
                failed += 1;
                continue;
            }
        };
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.interface, failure.error);
        }
        each(path, &report)?;
        if progress == Progress::Print {
            println!("{}", document::summary(path, &report));
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} documents could not be processed", inputs.arxml.len());
    }
    Ok(())
}

/// `sdvgen convert`: Franca IDL and deployment files
pub fn convert(config: &Config, inputs: &Inputs, output: Option<&Path>) -> Result<()> {
    let root = config.output_dir(output);
    for_each_document(config, inputs, Progress::Print, |_, report| {
        for iface in &report.interfaces {
            let files = idl_artifacts(iface);
            let written = document::write_files(&root, &files)?;
            info!(interface = %iface.name, files = written, "generated Franca IDL");
            if iface.instances.is_empty() {
                println!("  {}: FIDL (no provided instances, FDEPL skipped)", iface.name);
            } else {
                println!("  {}: FIDL, FDEPL", iface.name);
            }
        }
        Ok(())
    })
}

/// `sdvgen generate`: JNI bridge, Java classes, and AIDL
pub fn generate(config: &Config, inputs: &Inputs, java_package: Option<&str>, output: Option<&Path>) -> Result<()> {
    let options = config.bridge_options(java_package)?;
    let root = config.output_dir(output);
    for_each_document(config, inputs, Progress::Print, |_, report| {
        for iface in &report.interfaces {
            let artifacts = bridge_artifacts(iface, &options);
            for failure in &artifacts.failures {
                warn!(interface = %iface.name, member = failure.member(), "member not generated");
                eprintln!("  {}: {}", iface.name, failure);
            }
            let written = document::write_files(&root, &artifacts.files)?;
            println!(
                "  {}: {} files, {} members skipped",
                iface.name,
                written,
                artifacts.failures.len()
            );
        }
        Ok(())
    })
}

/// `sdvgen check`: build models without writing anything
pub fn check(config: &Config, inputs: &Inputs) -> Result<()> {
    let mut failures = 0;
    for_each_document(config, inputs, Progress::Print, |_, report| {
        for iface in &report.interfaces {
            println!(
                "✓ {}.{} v{}.{} ({} attributes, {} broadcasts, {} methods, {} instances)",
                iface.package_path(),
                iface.name,
                iface.version.major,
                iface.version.minor,
                iface.attributes.len(),
                iface.events.len(),
                iface.methods.len(),
                iface.instances.len()
            );
        }
        failures += report.failure_count();
        Ok(())
    })?;

    if failures > 0 {
        anyhow::bail!("{failures} interfaces failed to build");
    }
    println!("\nAll interfaces are valid!");
    Ok(())
}

/// `sdvgen dump`: resolved models as JSON on stdout
///
/// Models from every readable document are printed even when another input
/// fails, and the failure is still reflected in the exit status.
pub fn dump(config: &Config, inputs: &Inputs) -> Result<()> {
    let mut interfaces = Vec::new();
    let outcome = for_each_document(config, inputs, Progress::Quiet, |_, report| {
        interfaces.extend(report.interfaces.iter().cloned());
        Ok(())
    });
    let json = serde_json::to_string_pretty(&interfaces).context("Failed to serialize interfaces")?;
    println!("{json}");
    outcome
}
