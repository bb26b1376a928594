//! Type classification.
//!
//! [`classify`] is a pure function of a reference and the definitions the
//! interface owns so far. It never guesses: anything it cannot place is
//! [`TypeShape::Unsupported`].

use crate::model::{Interface, TypeRef, TypeShape, scope_of};
use crate::primitive::Primitive;

/// Classify `ty` against the definitions `interface` currently owns.
pub fn classify(ty: &TypeRef, interface: &Interface) -> TypeShape {
    if let Some(element) = &ty.element {
        return classify_anonymous(element, interface);
    }

    if ty.qualifier.is_none() {
        let kind = Primitive::from_name(&ty.name).or_else(|| interface.aliases.get(&ty.name).copied());
        if let Some(kind) = kind {
            return scalar(kind);
        }
    }

    if let Some(array) = interface.find_array(ty) {
        let scope = scope_of(&array.owner, ty);
        return match classify(&array.element, interface) {
            TypeShape::Struct { .. } => TypeShape::ComplexArray {
                scope,
                element_is_implicit: false,
                element: Box::new(array.element.clone()),
            },
            TypeShape::Primitive(element) => TypeShape::ExplicitArray { scope, element },
            TypeShape::StringT => TypeShape::ExplicitArray {
                scope,
                element: Primitive::String,
            },
            _ => TypeShape::Unsupported,
        };
    }

    if let Some(decl) = interface.find_struct(ty) {
        return TypeShape::Struct {
            scope: scope_of(&decl.owner, ty),
        };
    }

    if let Some(decl) = interface.find_enum(ty) {
        return TypeShape::Enumeration {
            backing: decl.backing,
        };
    }

    if let Some(decl) = interface.find_map(ty) {
        return TypeShape::Map {
            key: Box::new(decl.key.clone()),
            value: Box::new(decl.value.clone()),
        };
    }

    TypeShape::Unsupported
}

fn classify_anonymous(element: &TypeRef, interface: &Interface) -> TypeShape {
    match classify(element, interface) {
        TypeShape::Struct { scope } => TypeShape::ComplexArray {
            scope,
            element_is_implicit: true,
            element: Box::new(element.clone()),
        },
        TypeShape::Primitive(element) => TypeShape::ImplicitArray { element },
        TypeShape::StringT => TypeShape::ImplicitArray {
            element: Primitive::String,
        },
        _ => TypeShape::Unsupported,
    }
}

fn scalar(kind: Primitive) -> TypeShape {
    match kind {
        Primitive::String => TypeShape::StringT,
        other => TypeShape::Primitive(other),
    }
}

#[cfg(test)]
#[path = "classify/classify_tests.rs"]
mod classify_tests;
