#![allow(non_snake_case)]

use super::*;
use crate::model::{ArrayDecl, EnumDecl, Enumerator, FieldDecl, MapDecl, Owner, Scope, StructDecl};

fn point() -> StructDecl {
    StructDecl {
        name: "Point".into(),
        owner: Owner::Interface,
        fields: vec![
            FieldDecl::new("x", TypeRef::primitive(Primitive::UInt8)),
            FieldDecl::new("y", TypeRef::primitive(Primitive::UInt8)),
        ],
    }
}

fn interface() -> Interface {
    let mut iface = Interface::new("Navigation", vec!["com".into(), "example".into()]);
    iface.structs.push(point());
    iface.structs.push(StructDecl {
        name: "Pose".into(),
        owner: Owner::TypeCollection("Common".into()),
        fields: vec![FieldDecl::new("heading", TypeRef::primitive(Primitive::Float))],
    });
    iface.arrays.push(ArrayDecl {
        name: "Points".into(),
        owner: Owner::Interface,
        element: TypeRef::named("Point"),
    });
    iface.arrays.push(ArrayDecl {
        name: "Samples".into(),
        owner: Owner::TypeCollection("Common".into()),
        element: TypeRef::primitive(Primitive::Int16),
    });
    iface.arrays.push(ArrayDecl {
        name: "Names".into(),
        owner: Owner::Interface,
        element: TypeRef::named("Label"),
    });
    iface.enumerations.push(EnumDecl {
        name: "Gear".into(),
        owner: Owner::Interface,
        backing: Primitive::UInt8,
        enumerators: vec![Enumerator {
            label: "PARK".into(),
            value: Some(0),
        }],
    });
    iface.maps.push(MapDecl {
        name: "Routes".into(),
        owner: Owner::Interface,
        key: TypeRef::primitive(Primitive::String),
        value: TypeRef::named("Points"),
    });
    iface.aliases.insert("Label".into(), Primitive::String);
    iface.aliases.insert("Speed".into(), Primitive::UInt32);
    iface
}

#[test]
fn classify___primitive_name___returns_primitive() {
    let shape = classify(&TypeRef::parse("Int32"), &interface());

    assert_eq!(shape, TypeShape::Primitive(Primitive::Int32));
}

#[test]
fn classify___string___returns_string_shape() {
    let shape = classify(&TypeRef::parse("String"), &interface());

    assert_eq!(shape, TypeShape::StringT);
}

#[test]
fn classify___alias_to_primitive___returns_target_primitive() {
    let iface = interface();

    assert_eq!(
        classify(&TypeRef::named("Speed"), &iface),
        TypeShape::Primitive(Primitive::UInt32)
    );
    assert_eq!(classify(&TypeRef::named("Label"), &iface), TypeShape::StringT);
}

#[test]
fn classify___local_unqualified_struct___is_local() {
    let shape = classify(&TypeRef::named("Point"), &interface());

    assert_eq!(shape, TypeShape::Struct { scope: Scope::Local });
}

#[test]
fn classify___struct_owned_by_collection___is_external() {
    let iface = interface();

    assert_eq!(
        classify(&TypeRef::named("Pose"), &iface),
        TypeShape::Struct {
            scope: Scope::External
        }
    );
    assert_eq!(
        classify(&TypeRef::parse("Common.Pose"), &iface),
        TypeShape::Struct {
            scope: Scope::External
        }
    );
}

#[test]
fn classify___qualifier_naming_wrong_collection___is_unsupported() {
    let shape = classify(&TypeRef::parse("Other.Pose"), &interface());

    assert_eq!(shape, TypeShape::Unsupported);
}

#[test]
fn classify___array_of_struct___is_explicit_complex_array() {
    let shape = classify(&TypeRef::named("Points"), &interface());

    assert_eq!(
        shape,
        TypeShape::ComplexArray {
            scope: Scope::Local,
            element_is_implicit: false,
            element: Box::new(TypeRef::named("Point")),
        }
    );
}

#[test]
fn classify___anonymous_array_of_struct___is_implicit_complex_array() {
    let shape = classify(&TypeRef::parse("Point[]"), &interface());

    assert!(matches!(
        shape,
        TypeShape::ComplexArray {
            scope: Scope::Local,
            element_is_implicit: true,
            ..
        }
    ));
}

#[test]
fn classify___external_array_of_primitive___is_explicit_array() {
    let shape = classify(&TypeRef::named("Samples"), &interface());

    assert_eq!(
        shape,
        TypeShape::ExplicitArray {
            scope: Scope::External,
            element: Primitive::Int16
        }
    );
}

#[test]
fn classify___array_of_string_alias___has_string_element() {
    let shape = classify(&TypeRef::named("Names"), &interface());

    assert_eq!(
        shape,
        TypeShape::ExplicitArray {
            scope: Scope::Local,
            element: Primitive::String
        }
    );
}

#[test]
fn classify___byte_buffer___is_implicit_uint8_array() {
    let shape = classify(&TypeRef::parse("ByteBuffer"), &interface());

    assert_eq!(
        shape,
        TypeShape::ImplicitArray {
            element: Primitive::UInt8
        }
    );
}

#[test]
fn classify___enumeration___carries_backing_kind() {
    let shape = classify(&TypeRef::named("Gear"), &interface());

    assert_eq!(
        shape,
        TypeShape::Enumeration {
            backing: Primitive::UInt8
        }
    );
}

#[test]
fn classify___map___carries_key_and_value() {
    let shape = classify(&TypeRef::named("Routes"), &interface());

    match shape {
        TypeShape::Map { key, value } => {
            assert_eq!(key.name, "String");
            assert_eq!(value.name, "Points");
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn classify___undefined_name___is_unsupported() {
    let shape = classify(&TypeRef::named("Missing"), &interface());

    assert_eq!(shape, TypeShape::Unsupported);
}

#[test]
fn classify___anonymous_array_of_map___is_unsupported() {
    let shape = classify(&TypeRef::parse("Routes[]"), &interface());

    assert_eq!(shape, TypeShape::Unsupported);
}

#[test]
fn TypeRef___shape___caches_supported_result_only() {
    let mut iface = Interface::new("Navigation", vec![]);
    let ty = TypeRef::named("Point");

    assert_eq!(ty.shape(&iface), TypeShape::Unsupported);
    assert!(ty.cached_shape().is_none());

    iface.structs.push(point());
    assert_eq!(ty.shape(&iface), TypeShape::Struct { scope: Scope::Local });
    assert!(ty.cached_shape().is_some());

    iface.structs.clear();
    assert_eq!(ty.shape(&iface), TypeShape::Struct { scope: Scope::Local });
}
