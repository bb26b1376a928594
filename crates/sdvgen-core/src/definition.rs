//! Composite type definitions read from `STD-CPP-IMPLEMENTATION-DATA-TYPE` nodes.

use crate::error::{ModelError, ModelResult};
use crate::model::{ArrayDecl, EnumDecl, Enumerator, FieldDecl, MapDecl, Owner, StructDecl, TypeRef};
use crate::primitive::{Primitive, escape_name, parse_integer};
use crate::tree::{TreeNode, last_segment};
use tracing::{debug, warn};

pub const DATA_TYPE_TAG: &str = "STD-CPP-IMPLEMENTATION-DATA-TYPE";

/// A parsed definition, ready to be routed into an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Struct(StructDecl),
    Array(ArrayDecl),
    Enumeration(EnumDecl),
    Map(MapDecl),
    /// String or primitive typedef; resolves to the target, never to a decl.
    Alias { name: String, target: Primitive },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Struct(decl) => &decl.name,
            Definition::Array(decl) => &decl.name,
            Definition::Enumeration(decl) => &decl.name,
            Definition::Map(decl) => &decl.name,
            Definition::Alias { name, .. } => name,
        }
    }

    /// References this definition needs resolved in turn
    pub fn dependencies(&self) -> Vec<&TypeRef> {
        match self {
            Definition::Struct(decl) => decl.fields.iter().map(|f| &f.ty).collect(),
            Definition::Array(decl) => vec![&decl.element],
            Definition::Map(decl) => vec![&decl.key, &decl.value],
            Definition::Enumeration(_) | Definition::Alias { .. } => Vec::new(),
        }
    }
}

/// What a definition needs to know about the interface pulling it in
#[derive(Debug, Clone)]
pub struct DefinitionContext<'a> {
    pub interface: &'a str,
    pub namespace: &'a [String],
}

/// Namespace symbols declared under a node's `SYMBOL-PROPS`
pub fn namespace_of(node: &TreeNode) -> Vec<String> {
    node.find_all("SYMBOL-PROPS")
        .into_iter()
        .filter_map(|props| {
            props
                .child("SYMBOL")
                .and_then(TreeNode::text)
                .or_else(|| props.short_name())
        })
        .map(str::to_string)
        .collect()
}

/// Owner for a definition declared in `namespace`
pub fn owner_for(namespace: &[String], interface_namespace: &[String]) -> Owner {
    match namespace.last() {
        Some(last) if namespace != interface_namespace => Owner::TypeCollection(capitalize(last)),
        _ => Owner::Interface,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse one data type node. Categories that do not map to a composite or an
/// alias yield `Ok(None)`.
pub fn parse_definition(
    node: &TreeNode,
    document: &TreeNode,
    ctx: &DefinitionContext<'_>,
) -> ModelResult<Option<Definition>> {
    let Some(raw_name) = node.short_name() else {
        return Ok(None);
    };
    let name = escape_name(raw_name);
    let owner = owner_for(&namespace_of(node), ctx.namespace);
    let category = node
        .child("CATEGORY")
        .and_then(TreeNode::text)
        .unwrap_or_default();

    let definition = match category {
        "STRUCTURE" => Definition::Struct(StructDecl {
            fields: parse_elements(node, &name, ctx)?,
            name,
            owner,
        }),
        "VECTOR" | "ARRAY" => {
            let element = template_refs(node)
                .into_iter()
                .next()
                .ok_or_else(|| missing_type(ctx, &name))?;
            Definition::Array(ArrayDecl {
                name,
                owner,
                element,
            })
        }
        "ASSOCIATIVE_MAP" => {
            let mut refs = template_refs(node).into_iter();
            match (refs.next(), refs.next()) {
                (Some(key), Some(value)) => Definition::Map(MapDecl {
                    name,
                    owner,
                    key,
                    value,
                }),
                _ => return Err(missing_type(ctx, &name)),
            }
        }
        "STRING" => Definition::Alias {
            name,
            target: Primitive::String,
        },
        "TYPE_REFERENCE" => {
            let target = node
                .first_text("TYPE-REFERENCE-REF")
                .map(|path| TypeRef::from_reference(last_segment(path)))
                .and_then(|ty| Primitive::from_name(&ty.name).filter(|_| !ty.is_anonymous()));
            match document.find_named("COMPU-METHOD", raw_name).first() {
                Some(compu) => Definition::Enumeration(EnumDecl {
                    backing: enum_backing(&name, target),
                    enumerators: parse_enumerators(compu, &name)?,
                    name,
                    owner,
                }),
                None => match target {
                    Some(target) => Definition::Alias { name, target },
                    None => {
                        debug!(name = %name, "type reference to a non-primitive, not routable");
                        return Ok(None);
                    }
                },
            }
        }
        other => {
            debug!(name = %name, category = other, "unhandled data type category");
            return Ok(None);
        }
    };
    Ok(Some(definition))
}

fn parse_elements(
    node: &TreeNode,
    owner_name: &str,
    ctx: &DefinitionContext<'_>,
) -> ModelResult<Vec<FieldDecl>> {
    node.find_all("CPP-IMPLEMENTATION-DATA-TYPE-ELEMENT")
        .into_iter()
        .map(|element| {
            let name = element
                .short_name()
                .ok_or_else(|| ModelError::MissingShortName {
                    context: format!("element of {owner_name}"),
                })?;
            let member = format!("{owner_name}.{name}");
            let ty = match element.first_text("TYPE-REFERENCE-REF") {
                Some(path) => TypeRef::from_reference(last_segment(path)),
                None => template_refs(element)
                    .into_iter()
                    .next()
                    .map(TypeRef::implicit_array)
                    .ok_or_else(|| missing_type(ctx, &member))?,
            };
            Ok(FieldDecl::new(escape_name(name), ty))
        })
        .collect()
}

fn template_refs(node: &TreeNode) -> Vec<TypeRef> {
    node.find_all("TEMPLATE-TYPE-REF")
        .into_iter()
        .filter_map(TreeNode::text)
        .map(|path| TypeRef::from_reference(last_segment(path)))
        .collect()
}

fn enum_backing(name: &str, target: Option<Primitive>) -> Primitive {
    match target {
        Some(kind) if kind.is_integer() => kind,
        Some(kind) => {
            warn!(enumeration = name, backing = %kind, "non-integer backing type, using UInt8");
            Primitive::UInt8
        }
        None => Primitive::UInt8,
    }
}

fn parse_enumerators(compu: &TreeNode, name: &str) -> ModelResult<Vec<Enumerator>> {
    let mut enumerators = Vec::new();
    for scale in compu.find_all("COMPU-SCALE") {
        let Some(label) = scale.first_text("VT") else {
            warn!(enumeration = name, "COMPU-SCALE without VT label skipped");
            continue;
        };
        let value = match scale.first_text("UPPER-LIMIT") {
            Some(text) => Some(parse_integer(text).ok_or_else(|| ModelError::InvalidNumber {
                context: format!("{name}.{label}"),
                text: text.to_string(),
            })?),
            None => None,
        };
        enumerators.push(Enumerator {
            label: escape_name(label),
            value,
        });
    }
    Ok(enumerators)
}

fn missing_type(ctx: &DefinitionContext<'_>, member: &str) -> ModelError {
    ModelError::MissingTypeReference {
        interface: ctx.interface.to_string(),
        member: member.to_string(),
    }
}
