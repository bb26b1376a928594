#![allow(non_snake_case)]

use super::*;
use crate::error::ErrorKind;

const VEHICLE: &str = include_str!("../../tests/fixtures/vehicle.arxml");

#[test]
fn build_document_str___mixed_document___isolates_failing_interfaces() {
    let report = build_document_str(VEHICLE, None, &BuildOptions::default()).unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 2);
    assert_eq!(report.interfaces[0].name, "Navigation");
}

#[test]
fn build_document_str___failures___carry_interface_and_kind() {
    let report = build_document_str(VEHICLE, None, &BuildOptions::default()).unwrap();

    let diagnostics = &report.failures[0];
    let telemetry = &report.failures[1];
    assert_eq!(diagnostics.interface, "Diagnostics");
    assert!(matches!(diagnostics.error, ModelError::MissingDeployment { .. }));
    assert_eq!(telemetry.interface, "Telemetry");
    assert_eq!(telemetry.error.kind(), ErrorKind::UnresolvableReference);
}

#[test]
fn build_document_str___malformed_xml___fails_whole_document() {
    let result = build_document_str("<AUTOSAR><SERVICE-INTERFACE>", None, &BuildOptions::default());

    assert!(matches!(result, Err(ModelError::MalformedDocument(_))));
}

#[test]
fn build_document_str___separate_deployment_without_records___fails_every_interface() {
    let report = build_document_str(VEHICLE, Some("<AUTOSAR/>"), &BuildOptions::default()).unwrap();

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failure_count(), 3);
}

#[test]
fn BatchReport___display___summarizes_counts() {
    let report = build_document_str(VEHICLE, None, &BuildOptions::default()).unwrap();

    assert_eq!(report.to_string(), "Total 3 interfaces  Success: 1 Error: 2");
    assert!(!report.is_clean());
}

#[test]
fn build_document___no_interfaces___is_empty_and_clean() {
    let report = build_document(&TreeNode::new("AUTOSAR"), None, &BuildOptions::default());

    assert_eq!(report.total(), 0);
    assert!(report.is_clean());
}
