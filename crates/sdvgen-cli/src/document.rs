//! Shared document handling: reading ARXML, building models, reporting, and
//! writing generated files.

use anyhow::{Context, Result};
use sdvgen_codegen::GeneratedFile;
use sdvgen_core::{BatchReport, BuildOptions, TreeNode, build_document, parse_xml};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Build every interface in `path`, with deployment records read from
/// `deployment` when given and from the document itself otherwise.
pub fn load(path: &Path, deployment: Option<&TreeNode>, options: &BuildOptions) -> Result<BatchReport> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read ARXML: {}", path.display()))?;
    let document = parse_xml(&text).with_context(|| format!("Failed to parse ARXML: {}", path.display()))?;
    let report = build_document(&document, deployment, options);
    info!(
        document = %path.display(),
        interfaces = report.success_count(),
        failures = report.failure_count(),
        "document built"
    );
    Ok(report)
}

/// Read and parse a separate deployment document once for every input.
pub fn read_deployment(path: Option<&Path>) -> Result<Option<TreeNode>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read deployment: {}", path.display()))?;
    let tree = parse_xml(&text).with_context(|| format!("Failed to parse deployment: {}", path.display()))?;
    debug!(deployment = %path.display(), "deployment parsed");
    Ok(Some(tree))
}

/// One-line per-document result
pub fn summary(path: &Path, report: &BatchReport) -> String {
    format!(
        "Total {} interfaces in {}  Success: {} Error: {}",
        report.total(),
        path.display(),
        report.success_count(),
        report.failure_count()
    )
}

/// Write `files` below `root`, creating directories as needed.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> Result<usize> {
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, &file.contents).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = file.contents.len(), "wrote file");
    }
    Ok(files.len())
}
