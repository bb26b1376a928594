//! Document-level processing with per-interface failure isolation.

use crate::builder::{BuildOptions, INTERFACE_TAG, build_interface};
use crate::error::{ModelError, ModelResult};
use crate::model::Interface;
use crate::tree::{TreeNode, parse_xml};
use std::fmt;
use tracing::error;

/// One interface that failed to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceFailure {
    pub interface: String,
    pub error: ModelError,
}

/// Outcome of building every interface in one document
#[derive(Debug, Default)]
pub struct BatchReport {
    pub interfaces: Vec<Interface>,
    pub failures: Vec<InterfaceFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.interfaces.len() + self.failures.len()
    }

    pub fn success_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total {} interfaces  Success: {} Error: {}",
            self.total(),
            self.success_count(),
            self.failure_count()
        )
    }
}

/// Build every `SERVICE-INTERFACE` in `document`.
///
/// `deployment` defaults to `document` itself. A failing interface is logged
/// and recorded; the remaining interfaces are still built.
pub fn build_document(document: &TreeNode, deployment: Option<&TreeNode>, options: &BuildOptions) -> BatchReport {
    let deployment = deployment.unwrap_or(document);
    let mut report = BatchReport::default();

    for (index, node) in document.find_all(INTERFACE_TAG).into_iter().enumerate() {
        match build_interface(node, document, deployment, options) {
            Ok(interface) => report.interfaces.push(interface),
            Err(err) => {
                let interface = node
                    .short_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("<interface #{index}>"));
                error!(interface = %interface, error = %err, "interface skipped");
                report.failures.push(InterfaceFailure {
                    interface,
                    error: err,
                });
            }
        }
    }
    report
}

/// Parse and build from XML text. Malformed input fails the whole document.
pub fn build_document_str(
    document: &str,
    deployment: Option<&str>,
    options: &BuildOptions,
) -> ModelResult<BatchReport> {
    let document = parse_xml(document)?;
    let deployment = deployment.map(parse_xml).transpose()?;
    Ok(build_document(&document, deployment.as_ref(), options))
}

#[cfg(test)]
#[path = "batch/batch_tests.rs"]
mod batch_tests;
