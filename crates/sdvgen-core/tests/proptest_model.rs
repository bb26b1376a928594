//! Property-based tests for classification and deployment laws
//!
//! Checks that classification is total over arbitrary names and that every
//! stored event id is the declared id plus the fixed offset.

use proptest::prelude::*;
use sdvgen_core::{
    AttributeDecl, EVENT_ID_OFFSET, EventDecl, Interface, Primitive, TypeRef, TypeShape, classify, merge,
    parse_integer, parse_xml,
};

// Strategy: identifiers that never collide with a primitive name
fn arb_type_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,12}Type"
}

fn arb_primitive() -> impl Strategy<Value = Primitive> {
    proptest::sample::select(Primitive::ALL.to_vec())
}

proptest! {
    /// Property: undefined names classify as Unsupported, never panic
    #[test]
    fn proptest_undefined_name_is_unsupported(name in arb_type_name(), anonymous in any::<bool>()) {
        let iface = Interface::new("Probe", vec!["demo".into()]);
        let ty = if anonymous {
            TypeRef::implicit_array(TypeRef::named(name))
        } else {
            TypeRef::named(name)
        };

        prop_assert_eq!(classify(&ty, &iface), TypeShape::Unsupported);
    }

    /// Property: every primitive classifies as itself, strings as StringT
    #[test]
    fn proptest_primitive_classifies_as_itself(kind in arb_primitive()) {
        let iface = Interface::new("Probe", vec!["demo".into()]);

        let shape = classify(&TypeRef::primitive(kind), &iface);
        let array = classify(&TypeRef::implicit_array(TypeRef::primitive(kind)), &iface);

        if kind == Primitive::String {
            prop_assert_eq!(shape, TypeShape::StringT);
        } else {
            prop_assert_eq!(shape, TypeShape::Primitive(kind));
        }
        prop_assert_eq!(array, TypeShape::ImplicitArray { element: kind });
    }

    /// Property: stored event and notifier ids equal declared + 32768
    #[test]
    fn proptest_event_id_offset_law(event_id in 0u16..0x8000, notifier_id in 0u16..0x8000) {
        let xml = format!(
            "<AUTOSAR><SOMEIP-SERVICE-INTERFACE-DEPLOYMENT><SHORT-NAME>Probe</SHORT-NAME>\
             <SERVICE-INTERFACE-ID>1</SERVICE-INTERFACE-ID><MAJOR-VERSION>1</MAJOR-VERSION><MINOR-VERSION>0</MINOR-VERSION>\
             <SOMEIP-EVENT-DEPLOYMENT><SHORT-NAME>tick</SHORT-NAME><EVENT-ID>{event_id}</EVENT-ID></SOMEIP-EVENT-DEPLOYMENT>\
             <SOMEIP-FIELD-DEPLOYMENT><SHORT-NAME>level</SHORT-NAME><NOTIFIER><EVENT-ID>0x{notifier_id:x}</EVENT-ID></NOTIFIER></SOMEIP-FIELD-DEPLOYMENT>\
             </SOMEIP-SERVICE-INTERFACE-DEPLOYMENT></AUTOSAR>"
        );
        let mut iface = Interface::new("Probe", vec!["demo".into()]);
        iface.events.push(EventDecl {
            name: "tick".into(),
            ty: TypeRef::primitive(Primitive::UInt8),
            id: 0,
            reliable: false,
            event_groups: vec![],
        });
        iface.attributes.push(AttributeDecl {
            name: "level".into(),
            ty: TypeRef::primitive(Primitive::UInt8),
            readable: false,
            writable: false,
            notifiable: true,
            getter: None,
            setter: None,
            notifier: None,
        });

        merge(&mut iface, &parse_xml(&xml).unwrap()).unwrap();

        prop_assert_eq!(u32::from(iface.events[0].id), u32::from(event_id) + 32768);
        let notifier = iface.attributes[0].notifier.as_ref().unwrap();
        prop_assert_eq!(u32::from(notifier.id), u32::from(notifier_id) + u32::from(EVENT_ID_OFFSET));
    }

    /// Property: hex and decimal spellings of the same value agree
    #[test]
    fn proptest_hex_and_decimal_agree(value in any::<u32>()) {
        prop_assert_eq!(parse_integer(&format!("0x{value:X}")), parse_integer(&value.to_string()));
    }
}
