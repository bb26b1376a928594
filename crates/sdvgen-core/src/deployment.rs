//! SOME/IP deployment merge and provided-instance discovery.

use crate::error::{ModelError, ModelResult};
use crate::model::{
    Accessor, AttributeDecl, EventDecl, Interface, MethodDecl, Notifier, ProvidedInstance, Version,
};
use crate::primitive::{parse_integer, unescape_name};
use crate::tree::{TreeNode, has_segment, last_segment};
use tracing::{debug, warn};

/// Offset added to every declared event and notifier id on the wire
pub const EVENT_ID_OFFSET: u16 = 0x8000;

pub const INTERFACE_DEPLOYMENT_TAG: &str = "SOMEIP-SERVICE-INTERFACE-DEPLOYMENT";

/// Apply `declared + 0x8000`, rejecting ids already in the event range.
pub fn offset_event_id(declared: u16) -> Option<u16> {
    if declared >= EVENT_ID_OFFSET {
        return None;
    }
    declared.checked_add(EVENT_ID_OFFSET)
}

/// Fill service id, version, and per-member deployment from `deployment`.
pub fn merge(interface: &mut Interface, deployment: &TreeNode) -> ModelResult<()> {
    let name = interface.name.clone();
    let records = deployment.find_named(INTERFACE_DEPLOYMENT_TAG, &name);
    let Some(record) = records.first().copied() else {
        return Err(ModelError::MissingDeployment { interface: name });
    };
    if records.len() > 1 {
        warn!(interface = %name, count = records.len(), "multiple deployment records, using the first");
    }

    interface.version = Version {
        major: required_number(record, "MAJOR-VERSION", &name)
            .ok_or_else(|| missing_version(&name, "major"))??,
        minor: required_number(record, "MINOR-VERSION", &name)
            .ok_or_else(|| missing_version(&name, "minor"))??,
    };
    interface.service_id = required_number(record, "SERVICE-INTERFACE-ID", &name)
        .ok_or_else(|| ModelError::MissingServiceId {
            interface: name.clone(),
        })??;

    for attribute in &mut interface.attributes {
        merge_attribute(&name, attribute, record)?;
    }
    for event in &mut interface.events {
        merge_event(&name, event, record)?;
    }
    for method in &mut interface.methods {
        merge_method(&name, method, record)?;
    }
    debug!(interface = %name, service_id = interface.service_id, "deployment merged");
    Ok(())
}

fn merge_attribute(interface: &str, attribute: &mut AttributeDecl, record: &TreeNode) -> ModelResult<()> {
    let member = unescape_name(&attribute.name);
    let field = record
        .find_named("SOMEIP-FIELD-DEPLOYMENT", member)
        .first()
        .copied();
    let part = |tag: &str| field.and_then(|f| f.find_first(tag));

    if attribute.readable {
        let get = part("GET").ok_or_else(|| missing_member(interface, member, "getter"))?;
        attribute.getter = Some(Accessor {
            id: member_id(get, "METHOD-ID", interface, member)?,
            reliable: reliability(get, interface, member),
        });
    }
    if attribute.writable {
        let set = part("SET").ok_or_else(|| missing_member(interface, member, "setter"))?;
        attribute.setter = Some(Accessor {
            id: member_id(set, "METHOD-ID", interface, member)?,
            reliable: reliability(set, interface, member),
        });
    }
    if attribute.notifiable {
        let notifier = part("NOTIFIER").ok_or_else(|| missing_member(interface, member, "notifier"))?;
        attribute.notifier = Some(Notifier {
            id: event_id(notifier, interface, member)?,
            reliable: reliability(notifier, interface, member),
            event_groups: event_groups(record, member, interface)?,
        });
    }
    Ok(())
}

fn merge_event(interface: &str, event: &mut EventDecl, record: &TreeNode) -> ModelResult<()> {
    let member = unescape_name(&event.name);
    let deployment = record
        .find_named("SOMEIP-EVENT-DEPLOYMENT", member)
        .first()
        .copied()
        .ok_or_else(|| missing_member(interface, member, "event"))?;
    event.id = event_id(deployment, interface, member)?;
    event.reliable = reliability(deployment, interface, member);
    event.event_groups = event_groups(record, member, interface)?;
    Ok(())
}

fn merge_method(interface: &str, method: &mut MethodDecl, record: &TreeNode) -> ModelResult<()> {
    let member = unescape_name(&method.name);
    let all = record.find_all("SOMEIP-METHOD-DEPLOYMENT");
    let mut candidates: Vec<&TreeNode> = all
        .iter()
        .copied()
        .filter(|node| node.short_name() == Some(member))
        .collect();
    for node in all.iter().copied().filter(|node| {
        node.first_text("METHOD-REF")
            .is_some_and(|reference| last_segment(reference) == member)
    }) {
        if !candidates.iter().any(|c| std::ptr::eq(*c, node)) {
            candidates.push(node);
        }
    }

    let deployment = match candidates.as_slice() {
        [] => return Err(missing_member(interface, member, "method")),
        [single] => *single,
        several => {
            return Err(ModelError::AmbiguousMethodDeployment {
                interface: interface.to_string(),
                method: member.to_string(),
                candidates: several
                    .iter()
                    .map(|node| node.short_name().unwrap_or("<unnamed>").to_string())
                    .collect(),
            });
        }
    };
    method.id = member_id(deployment, "METHOD-ID", interface, member)?;
    method.reliable = reliability(deployment, interface, member);
    Ok(())
}

/// Event-group ids of every group with an `EVENT-REF` through `member`.
///
/// A notifier record nested under the field still counts as the field.
fn event_groups(record: &TreeNode, member: &str, interface: &str) -> ModelResult<Vec<u16>> {
    let mut groups = Vec::new();
    for group in record.find_all("SOMEIP-EVENT-GROUP") {
        let listed = group
            .find_all("EVENT-REF")
            .into_iter()
            .filter_map(TreeNode::text)
            .any(|reference| has_segment(reference, member));
        if !listed {
            continue;
        }
        if let Some(id) = required_number::<u16>(group, "EVENT-GROUP-ID", interface) {
            groups.push(id?);
        }
    }
    Ok(groups)
}

/// `TRANSPORT-PROTOCOL` of `UDP` is unreliable, any other value reliable.
fn reliability(node: &TreeNode, interface: &str, member: &str) -> bool {
    match node.first_text("TRANSPORT-PROTOCOL") {
        Some(protocol) => !protocol.eq_ignore_ascii_case("UDP"),
        None => {
            warn!(interface, member, "no transport protocol, assuming unreliable");
            false
        }
    }
}

fn member_id(node: &TreeNode, tag: &str, interface: &str, member: &str) -> ModelResult<u16> {
    required_number(node, tag, interface).ok_or_else(|| ModelError::MissingId {
        interface: interface.to_string(),
        member: member.to_string(),
        what: tag.to_string(),
    })?
}

fn event_id(node: &TreeNode, interface: &str, member: &str) -> ModelResult<u16> {
    let declared = member_id(node, "EVENT-ID", interface, member)?;
    offset_event_id(declared).ok_or_else(|| ModelError::EventIdOutOfRange {
        interface: interface.to_string(),
        member: member.to_string(),
        id: declared,
    })
}

/// `None` when `tag` is absent, `Some(Err)` when present but not a valid `T`.
fn required_number<T: TryFrom<i64>>(node: &TreeNode, tag: &str, interface: &str) -> Option<ModelResult<T>> {
    let text = node.first_text(tag)?;
    Some(
        parse_integer(text)
            .and_then(|value| T::try_from(value).ok())
            .ok_or_else(|| ModelError::InvalidNumber {
                context: format!("{interface}: {tag}"),
                text: text.to_string(),
            }),
    )
}

fn missing_version(interface: &str, which: &str) -> ModelError {
    ModelError::MissingVersion {
        interface: interface.to_string(),
        which: which.to_string(),
    }
}

fn missing_member(interface: &str, member: &str, capability: &str) -> ModelError {
    ModelError::MissingMemberDeployment {
        interface: interface.to_string(),
        member: member.to_string(),
        capability: capability.to_string(),
    }
}

/// Provided instances whose deployment reference mentions `interface`.
pub fn provided_instances(interface: &str, deployment: &TreeNode) -> ModelResult<Vec<ProvidedInstance>> {
    let mappings = deployment.find_all("SOMEIP-SERVICE-INSTANCE-TO-MACHINE-MAPPING");
    let mut instances = Vec::new();

    for node in deployment.find_all("PROVIDED-SOMEIP-SERVICE-INSTANCE") {
        let Some(reference) = node.first_text("SERVICE-INTERFACE-DEPLOYMENT-REF") else {
            continue;
        };
        if !reference.contains(interface) {
            continue;
        }
        let name = node.short_name().ok_or_else(|| ModelError::MissingShortName {
            context: format!("{interface}: provided instance"),
        })?;
        let instance_id = required_number(node, "SERVICE-INSTANCE-ID", interface)
            .ok_or_else(|| ModelError::MissingInstanceId {
                interface: interface.to_string(),
                instance: name.to_string(),
            })??;

        let mut instance = ProvidedInstance {
            name: name.to_string(),
            instance_id,
            reliable_port: None,
            unreliable_port: None,
        };
        for mapping in &mappings {
            let points_here = mapping
                .find_all("SERVICE-INSTANCE-REF")
                .into_iter()
                .filter_map(TreeNode::text)
                .any(|r| has_segment(r, name));
            if !points_here {
                continue;
            }
            if let Some(port) = required_number(mapping, "TCP-PORT", interface) {
                instance.reliable_port = Some(port?);
            }
            if let Some(port) = required_number(mapping, "UDP-PORT", interface) {
                instance.unreliable_port = Some(port?);
            }
        }
        instances.push(instance);
    }
    Ok(instances)
}

#[cfg(test)]
#[path = "deployment/deployment_tests.rs"]
mod deployment_tests;
