//! AIDL generation: the service interface, its callback interface, and one
//! parcelable declaration per data class.

use crate::fragments::{BridgeContext, MemberFragments, Param};
use crate::jvm_types::JvmType;
use std::collections::BTreeSet;

/// Primitives and `String` take no direction tag; everything else is `in`.
fn needs_direction(ty: &JvmType) -> bool {
    !ty.is_primitive && ty.java != "String"
}

fn aidl_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| {
            if needs_direction(&p.ty) {
                format!("in {} {}", p.ty.java, p.name)
            } else {
                format!("{} {}", p.ty.java, p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn imported_class(ty: &JvmType) -> Option<String> {
    let class = ty.java.trim_end_matches("[]");
    let builtin = matches!(
        class,
        "boolean" | "byte" | "int" | "long" | "float" | "double" | "String"
    );
    (!builtin).then(|| class.to_string())
}

fn imports<'t>(package: &str, types: impl Iterator<Item = &'t JvmType>) -> String {
    let classes: BTreeSet<String> = types.filter_map(imported_class).collect();
    classes
        .iter()
        .map(|class| format!("import {package}.{class};\n"))
        .collect()
}

/// Generate `I<Interface>.aidl`.
pub fn generate_interface(ctx: &BridgeContext<'_>, members: &[MemberFragments]) -> String {
    let package = &ctx.options.java_package;
    let name = &ctx.interface.name;
    let exposed: Vec<_> = members
        .iter()
        .flat_map(|m| m.entries.iter())
        .filter(|e| e.exposed)
        .collect();
    let types = exposed
        .iter()
        .flat_map(|e| e.params.iter().map(|p| &p.ty).chain(e.ret.as_ref()));

    let mut code = format!("package {package};\n\n");
    code.push_str(&format!("import {package}.I{name}Callback;\n"));
    code.push_str(&imports(package, types));
    code.push('\n');
    code.push_str(&format!("interface I{name} {{\n"));
    for entry in &exposed {
        code.push_str(&format!(
            "    {} {}({});\n",
            entry.ret.as_ref().map_or("void", |r| r.java.as_str()),
            entry.name,
            aidl_params(&entry.params)
        ));
    }
    code.push_str(&format!("    void registerCallback(I{name}Callback callback);\n"));
    code.push_str(&format!("    void unregisterCallback(I{name}Callback callback);\n"));
    code.push_str("}\n");
    code
}

/// Generate `I<Interface>Callback.aidl`.
pub fn generate_callback_interface(ctx: &BridgeContext<'_>, members: &[MemberFragments]) -> String {
    let package = &ctx.options.java_package;
    let callbacks: Vec<_> = members.iter().flat_map(|m| m.callbacks.iter()).collect();
    let types = callbacks.iter().flat_map(|c| c.params.iter().map(|p| &p.ty));

    let mut code = format!("package {package};\n\n");
    let imported = imports(package, types);
    if !imported.is_empty() {
        code.push_str(&imported);
        code.push('\n');
    }
    code.push_str(&format!("oneway interface I{}Callback {{\n", ctx.interface.name));
    for callback in &callbacks {
        code.push_str(&format!(
            "    void {}({});\n",
            callback.name,
            aidl_params(&callback.params)
        ));
    }
    code.push_str("}\n");
    code
}

/// Generate `<Class>.aidl` declaring a Parcelable.
pub fn generate_parcelable(class: &str, package: &str) -> String {
    format!("package {package};\n\nparcelable {class};\n")
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::jvm_types::JvmKind;

    #[test]
    fn aidl_params___tags_arrays_and_parcelables_with_in() {
        let params = vec![
            Param::new("count", JvmType::primitive(JvmKind::Int)),
            Param::new("query", JvmType::string()),
            Param::new("where", JvmType::class("p", "Point")),
            Param::new("raw", JvmType::array_of(&JvmType::primitive(JvmKind::Int))),
        ];

        assert_eq!(
            aidl_params(&params),
            "int count, String query, in Point where, in int[] raw"
        );
    }

    #[test]
    fn imports___lists_generated_classes_once_sorted() {
        let point = JvmType::class("p", "Point");
        let points = JvmType::array_of(&point);
        let entry = JvmType::array_of(&JvmType::class("p", "TagsEntry"));
        let int = JvmType::primitive(JvmKind::Int);

        let text = imports("p", [&points, &int, &entry, &point].into_iter());

        assert_eq!(text, "import p.Point;\nimport p.TagsEntry;\n");
    }

    #[test]
    fn generate_parcelable___declares_class_in_package() {
        assert_eq!(
            generate_parcelable("Point", "com.example"),
            "package com.example;\n\nparcelable Point;\n"
        );
    }
}
