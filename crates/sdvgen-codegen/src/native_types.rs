//! Native (CommonAPI C++) spelling of model types.

use sdvgen_core::{Interface, Owner, TypeRef, TypeShape};

/// Namespace-qualified name of a composite definition, relative to the
/// `using namespace` emitted at the top of each bridge file.
pub fn qualified_name(ty: &TypeRef, interface: &Interface) -> String {
    match interface.owner_of(ty) {
        Some(Owner::TypeCollection(collection)) => format!("{collection}::{}", ty.name),
        Some(Owner::Interface) | None => match &ty.qualifier {
            Some(qualifier) => format!("{}::{}", qualifier.replace('.', "::"), ty.name),
            None => format!("{}::{}", interface.name, ty.name),
        },
    }
}

/// Native type for a reference with a known shape.
pub fn native_type(shape: &TypeShape, ty: &TypeRef, interface: &Interface) -> String {
    match shape {
        TypeShape::Primitive(primitive) => primitive.native_name().to_string(),
        TypeShape::StringT => "std::string".to_string(),
        TypeShape::ImplicitArray { element } => format!("std::vector<{}>", element.native_name()),
        TypeShape::ComplexArray {
            element_is_implicit: true,
            element,
            ..
        } => format!("std::vector<{}>", qualified_name(element, interface)),
        TypeShape::ExplicitArray { .. }
        | TypeShape::ComplexArray { .. }
        | TypeShape::Struct { .. }
        | TypeShape::Enumeration { .. }
        | TypeShape::Map { .. }
        | TypeShape::Unsupported => qualified_name(ty, interface),
    }
}

/// `v<major>::a::b::c`, the namespace CommonAPI generates for the interface
pub fn interface_namespace(interface: &Interface) -> String {
    let mut namespace = format!("v{}", interface.version.major);
    for segment in &interface.package {
        namespace.push_str("::");
        namespace.push_str(segment);
    }
    namespace
}

/// Include path of the generated CommonAPI proxy header
pub fn proxy_header(interface: &Interface) -> String {
    let mut path = format!("v{}", interface.version.major);
    for segment in &interface.package {
        path.push('/');
        path.push_str(segment);
    }
    format!("{path}/{}Proxy.hpp", interface.name)
}
