//! Interface model builder.
//!
//! Building runs in four steps: direct members, closure resolution, deployment
//! merge, then provided instances. Any structural error aborts this one
//! interface.

use crate::definition::namespace_of;
use crate::deployment;
use crate::error::{ModelError, ModelResult};
use crate::model::{AttributeDecl, EventDecl, FieldDecl, Interface, MethodDecl, TypeRef};
use crate::primitive::escape_name;
use crate::resolve::Resolver;
use crate::tree::{TreeNode, last_segment};
use tracing::info;

pub const INTERFACE_TAG: &str = "SERVICE-INTERFACE";

/// Caller-supplied overrides
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Dotted package replacing the one declared in the document
    pub package: Option<String>,
}

/// Build one fully resolved and deployed interface.
pub fn build_interface(
    node: &TreeNode,
    document: &TreeNode,
    deployment_document: &TreeNode,
    options: &BuildOptions,
) -> ModelResult<Interface> {
    let namespace = namespace_of(node);
    let mut interface = read_members(node, &namespace, options)?;

    let mut resolver = Resolver::new(namespace);
    for ty in interface.type_refs() {
        resolver.require(ty, &interface);
    }
    resolver.run(document, &mut interface)?;
    let passes = resolver.passes();
    resolver.finish(&mut interface);
    interface.warm_shapes();

    deployment::merge(&mut interface, deployment_document)?;
    interface.instances = deployment::provided_instances(&interface.name, deployment_document)?;

    info!(
        interface = %interface.name,
        package = %interface.package_path(),
        passes,
        types = interface.imports.len(),
        instances = interface.instances.len(),
        "interface built"
    );
    Ok(interface)
}

/// Step 1: name, package, and members read straight off the interface node.
pub fn read_members(node: &TreeNode, namespace: &[String], options: &BuildOptions) -> ModelResult<Interface> {
    let name = node
        .short_name()
        .ok_or_else(|| ModelError::MissingShortName {
            context: INTERFACE_TAG.to_string(),
        })?
        .to_string();

    let package = match &options.package {
        Some(package) => package.split('.').map(str::to_string).collect(),
        None => namespace.to_vec(),
    };
    if package.is_empty() {
        return Err(ModelError::MissingPackage { interface: name });
    }

    let mut interface = Interface::new(name, package);
    for field in node.find_all("FIELD") {
        interface.attributes.push(read_attribute(field, &interface.name)?);
    }
    for event in node.find_all("VARIABLE-DATA-PROTOTYPE") {
        let name = member_name(event, &interface.name, "VARIABLE-DATA-PROTOTYPE")?;
        interface.events.push(EventDecl {
            ty: type_ref(event, &interface.name, &name)?,
            name,
            id: 0,
            reliable: false,
            event_groups: Vec::new(),
        });
    }
    for operation in node.find_all("CLIENT-SERVER-OPERATION") {
        interface.methods.push(read_method(operation, &interface.name)?);
    }
    Ok(interface)
}

fn read_attribute(node: &TreeNode, interface: &str) -> ModelResult<AttributeDecl> {
    let name = member_name(node, interface, "FIELD")?;
    Ok(AttributeDecl {
        ty: type_ref(node, interface, &name)?,
        readable: flag(node, "HAS-GETTER"),
        writable: flag(node, "HAS-SETTER"),
        notifiable: flag(node, "HAS-NOTIFIER"),
        name,
        getter: None,
        setter: None,
        notifier: None,
    })
}

fn read_method(node: &TreeNode, interface: &str) -> ModelResult<MethodDecl> {
    let name = member_name(node, interface, "CLIENT-SERVER-OPERATION")?;
    let mut method = MethodDecl {
        name,
        in_args: Vec::new(),
        out_args: Vec::new(),
        fire_and_forget: flag(node, "FIRE-AND-FORGET"),
        id: 0,
        reliable: false,
    };
    for argument in node.find_all("ARGUMENT-DATA-PROTOTYPE") {
        let arg_name = member_name(argument, interface, "ARGUMENT-DATA-PROTOTYPE")?;
        let ty = type_ref(argument, interface, &format!("{}.{arg_name}", method.name))?;
        let field = FieldDecl::new(arg_name, ty);
        match argument.first_text("DIRECTION").unwrap_or("IN") {
            "OUT" => method.out_args.push(field),
            "INOUT" => {
                method.in_args.push(field.clone());
                method.out_args.push(field);
            }
            _ => method.in_args.push(field),
        }
    }
    Ok(method)
}

fn member_name(node: &TreeNode, interface: &str, tag: &str) -> ModelResult<String> {
    node.short_name()
        .map(escape_name)
        .ok_or_else(|| ModelError::MissingShortName {
            context: format!("{interface}: {tag}"),
        })
}

fn type_ref(node: &TreeNode, interface: &str, member: &str) -> ModelResult<TypeRef> {
    node.first_text("TYPE-TREF")
        .map(|path| TypeRef::from_reference(last_segment(path)))
        .ok_or_else(|| ModelError::MissingTypeReference {
            interface: interface.to_string(),
            member: member.to_string(),
        })
}

fn flag(node: &TreeNode, tag: &str) -> bool {
    node.first_text(tag)
        .is_some_and(|text| text.eq_ignore_ascii_case("true"))
}
