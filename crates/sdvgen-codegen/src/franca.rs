//! Franca IDL (`.fidl`) and SOME/IP deployment (`.fdepl`) templaters.

use sdvgen_core::{ArrayDecl, EnumDecl, Interface, MapDecl, Owner, StructDecl, TypeRef};

const DEPLOYMENT_SPEC: &str = "org.genivi.commonapi.someip.deployment";
const DEPLOYMENT_IMPORT: &str =
    "platform:/plugin/org.genivi.commonapi.someip/deployment/CommonAPI-4-SOMEIP_deployment_spec.fdepl";

/// Type name as written inside the namespace `context`.
///
/// Aliases collapse to their primitive (`String` for string aliases);
/// definitions owned by another type collection are qualified with it.
pub fn fidl_type(ty: &TypeRef, iface: &Interface, context: &Owner) -> String {
    if let Some(element) = &ty.element {
        return format!("{}[]", fidl_type(element, iface, context));
    }
    if ty.qualifier.is_none() {
        if let Some(primitive) = iface.aliases.get(&ty.name) {
            return primitive.name().to_string();
        }
    }
    match iface.owner_of(ty) {
        Some(owner @ Owner::TypeCollection(collection)) if owner != context => {
            format!("{collection}.{}", ty.name)
        }
        _ => ty.display(),
    }
}

fn owned_by<'a, T>(
    items: &'a [T],
    owner: &'a Owner,
    owner_of: impl Fn(&T) -> &Owner + 'a,
) -> impl Iterator<Item = &'a T> {
    items.iter().filter(move |item| owner_of(*item) == owner)
}

/// Body of a namespace: arrays, structs, enumerations, then maps.
fn render_types(out: &mut String, iface: &Interface, owner: &Owner) {
    let arrays: Vec<&ArrayDecl> = owned_by(&iface.arrays, owner, |d| &d.owner).collect();
    let structs: Vec<&StructDecl> = owned_by(&iface.structs, owner, |d| &d.owner).collect();
    let enums: Vec<&EnumDecl> = owned_by(&iface.enumerations, owner, |d| &d.owner).collect();
    let maps: Vec<&MapDecl> = owned_by(&iface.maps, owner, |d| &d.owner).collect();

    if !arrays.is_empty() {
        out.push('\n');
        for array in arrays {
            out.push_str(&format!("    array {} of {}\n", array.name, fidl_type(&array.element, iface, owner)));
        }
    }
    for decl in structs {
        out.push_str(&format!("\n    struct {} {{\n", decl.name));
        for field in &decl.fields {
            out.push_str(&format!("        {} {}\n", fidl_type(&field.ty, iface, owner), field.name));
        }
        out.push_str("    }\n");
    }
    for decl in enums {
        out.push_str(&format!("\n    enumeration {} {{\n", decl.name));
        for enumerator in &decl.enumerators {
            match enumerator.value {
                Some(value) => {
                    out.push_str(&format!("        {} = {value}\n", enumerator.label));
                }
                None => {
                    out.push_str(&format!("        {}\n", enumerator.label));
                }
            }
        }
        out.push_str("    }\n");
    }
    for map in maps {
        out.push_str(&format!("\n    map {} {{\n", map.name));
        out.push_str(&format!(
            "        {} to {}\n",
            fidl_type(&map.key, iface, owner),
            fidl_type(&map.value, iface, owner)
        ));
        out.push_str("    }\n");
    }
}

fn render_args(out: &mut String, direction: &str, args: &[sdvgen_core::FieldDecl], iface: &Interface) {
    if args.is_empty() {
        return;
    }
    out.push_str(&format!("        {direction} {{\n"));
    for arg in args {
        out.push_str(&format!("            {} {}\n", fidl_type(&arg.ty, iface, &Owner::Interface), arg.name));
    }
    out.push_str("        }\n");
}

/// Render the `.fidl` file: type collections for external definitions, then
/// the interface.
pub fn render_fidl(iface: &Interface) -> String {
    let local = Owner::Interface;
    let version = format!(
        "    version {{ major {} minor {} }}\n",
        iface.version.major, iface.version.minor
    );
    let mut out = format!("package {}\n", iface.package_path());

    for collection in iface.type_collections() {
        out.push_str(&format!("\ntypeCollection {collection} {{\n"));
        out.push_str(&version);
        render_types(&mut out, iface, &Owner::TypeCollection(collection.clone()));
        out.push_str("}\n");
    }

    out.push_str(&format!("\ninterface {} {{\n", iface.name));
    out.push_str(&version);

    if !iface.attributes.is_empty() {
        out.push('\n');
    }
    for attr in &iface.attributes {
        let mut line = format!("    attribute {} {}", fidl_type(&attr.ty, iface, &local), attr.name);
        if !attr.writable {
            line.push_str(" readonly");
        }
        if !attr.notifiable {
            line.push_str(" noSubscriptions");
        }
        out.push_str(&line);
        out.push('\n');
    }

    for event in &iface.events {
        out.push_str(&format!("\n    broadcast {} {{\n", event.name));
        out.push_str("        out {\n");
        out.push_str(&format!(
            "            {} {}\n",
            fidl_type(&event.ty, iface, &local),
            crate::naming::lower_first(&event.name)
        ));
        out.push_str("        }\n");
        out.push_str("    }\n");
    }

    for method in &iface.methods {
        let flag = if method.fire_and_forget { " fireAndForget" } else { "" };
        out.push_str(&format!("\n    method {}{flag} {{\n", method.name));
        render_args(&mut out, "in", &method.in_args, iface);
        if !method.fire_and_forget {
            render_args(&mut out, "out", &method.out_args, iface);
        }
        out.push_str("    }\n");
    }

    render_types(&mut out, iface, &local);
    out.push_str("}\n");
    out
}

fn group_list(groups: &[u16]) -> String {
    groups.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
}

/// Deployment blocks for the definitions `owner` holds.
fn render_type_deployments(out: &mut String, iface: &Interface, owner: &Owner) {
    for array in owned_by(&iface.arrays, owner, |d| &d.owner) {
        out.push_str(&format!("\n    array {} {{ }}\n", array.name));
    }
    for decl in owned_by(&iface.structs, owner, |d| &d.owner) {
        out.push_str(&format!("\n    struct {} {{ }}\n", decl.name));
    }
    for decl in owned_by(&iface.enumerations, owner, |d| &d.owner) {
        out.push_str(&format!("\n    enumeration {} {{\n", decl.name));
        let backing = decl.backing.name();
        if backing == "UInt8" {
            out.push_str(&format!("        //EnumBackingType = {backing}\n"));
        } else {
            out.push_str(&format!("        EnumBackingType = {backing}\n"));
        }
        for enumerator in &decl.enumerators {
            out.push_str(&format!("        {} {{ }}\n", enumerator.label));
        }
        out.push_str("    }\n");
    }
    for map in owned_by(&iface.maps, owner, |d| &d.owner) {
        out.push_str(&format!("\n    map {} {{ }}\n", map.name));
    }
}

/// Render the `.fdepl` file: interface deployment, type collection
/// deployments, and one provider block per provided instance.
pub fn render_fdepl(iface: &Interface) -> String {
    let package = iface.package_path();
    let mut out = String::new();
    out.push_str(&format!("import \"{DEPLOYMENT_IMPORT}\"\n"));
    out.push_str(&format!("import \"{}.fidl\"\n", iface.name));

    out.push_str(&format!(
        "\ndefine {DEPLOYMENT_SPEC} for interface {package}.{} {{\n",
        iface.name
    ));
    out.push_str(&format!("    SomeIpServiceID = {}\n", iface.service_id));

    for attr in &iface.attributes {
        out.push_str(&format!("\n    attribute {} {{\n", attr.name));
        if let Some(getter) = &attr.getter {
            out.push_str(&format!("        SomeIpGetterID = {}\n", getter.id));
            out.push_str(&format!("        SomeIpGetterReliable = {}\n", getter.reliable));
        }
        if let Some(setter) = &attr.setter {
            out.push_str(&format!("        SomeIpSetterID = {}\n", setter.id));
            out.push_str(&format!("        SomeIpSetterReliable = {}\n", setter.reliable));
        }
        if let Some(notifier) = &attr.notifier {
            out.push_str(&format!("        SomeIpNotifierID = {}\n", notifier.id));
            out.push_str(&format!("        SomeIpNotifierReliable = {}\n", notifier.reliable));
            out.push_str(&format!(
                "        SomeIpNotifierEventGroups = {{{}}}\n",
                group_list(&notifier.event_groups)
            ));
        }
        out.push_str("    }\n");
    }

    for event in &iface.events {
        out.push_str(&format!("\n    broadcast {} {{\n", event.name));
        out.push_str(&format!("        SomeIpEventID = {}\n", event.id));
        out.push_str(&format!("        SomeIpEventReliable = {}\n", event.reliable));
        out.push_str(&format!("        SomeIpEventGroups = {{{}}}\n", group_list(&event.event_groups)));
        out.push_str("        out { }\n");
        out.push_str("    }\n");
    }

    for method in &iface.methods {
        out.push_str(&format!("\n    method {} {{\n", method.name));
        out.push_str(&format!("        SomeIpMethodID = {}\n", method.id));
        out.push_str(&format!("        SomeIpReliable = {}\n", method.reliable));
        if !method.in_args.is_empty() {
            out.push_str("        in { }\n");
        }
        if !method.fire_and_forget && !method.out_args.is_empty() {
            out.push_str("        out { }\n");
        }
        out.push_str("    }\n");
    }

    render_type_deployments(&mut out, iface, &Owner::Interface);
    out.push_str("}\n");

    for collection in iface.type_collections() {
        out.push_str(&format!(
            "\ndefine {DEPLOYMENT_SPEC} for typeCollection {package}.{collection} {{\n"
        ));
        render_type_deployments(&mut out, iface, &Owner::TypeCollection(collection));
        out.push_str("}\n");
    }

    for instance in &iface.instances {
        out.push_str(&format!("\ndefine {DEPLOYMENT_SPEC} for provider as {} {{\n", instance.name));
        out.push_str(&format!("    instance {package}.{} {{\n", iface.name));
        out.push_str(&format!("        InstanceId = \"{package}.{}\"\n", instance.name));
        out.push_str(&format!("        SomeIpInstanceID = {}\n", instance.instance_id));
        out.push_str("        //SomeIpUnicastAddress: set the host address in vsomeip.json\n");
        out.push_str(&format!(
            "        //SomeIpReliableUnicastPort: {} set the host TCP port in vsomeip.json\n",
            port(instance.reliable_port)
        ));
        out.push_str(&format!(
            "        //SomeIpUnreliableUnicastPort: {} set the host UDP port in vsomeip.json\n",
            port(instance.unreliable_port)
        ));
        out.push_str("    }\n");
        out.push_str("}\n");
    }

    out
}

fn port(value: Option<u16>) -> String {
    value.map_or_else(|| "none".to_string(), |p| p.to_string())
}
