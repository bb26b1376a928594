#![allow(non_snake_case)]

use super::*;
use crate::model::{FieldDecl, TypeRef};
use crate::tree::parse_xml;
use test_case::test_case;

const DEPLOYMENT: &str = r#"<AUTOSAR>
  <SOMEIP-SERVICE-INTERFACE-DEPLOYMENT>
    <SHORT-NAME>Climate</SHORT-NAME>
    <SERVICE-INTERFACE-ID>0x1234</SERVICE-INTERFACE-ID>
    <SERVICE-INTERFACE-VERSION>
      <MAJOR-VERSION>1</MAJOR-VERSION>
      <MINOR-VERSION>2</MINOR-VERSION>
    </SERVICE-INTERFACE-VERSION>
    <FIELD-DEPLOYMENTS>
      <SOMEIP-FIELD-DEPLOYMENT>
        <SHORT-NAME>temperature</SHORT-NAME>
        <GET><METHOD-ID>1</METHOD-ID><TRANSPORT-PROTOCOL>TCP</TRANSPORT-PROTOCOL></GET>
        <SET><METHOD-ID>2</METHOD-ID><TRANSPORT-PROTOCOL>UDP</TRANSPORT-PROTOCOL></SET>
        <NOTIFIER><EVENT-ID>3</EVENT-ID></NOTIFIER>
      </SOMEIP-FIELD-DEPLOYMENT>
      <SOMEIP-FIELD-DEPLOYMENT>
        <SHORT-NAME>version</SHORT-NAME>
        <GET><METHOD-ID>9</METHOD-ID></GET>
      </SOMEIP-FIELD-DEPLOYMENT>
    </FIELD-DEPLOYMENTS>
    <EVENT-DEPLOYMENTS>
      <SOMEIP-EVENT-DEPLOYMENT>
        <SHORT-NAME>overheat</SHORT-NAME>
        <EVENT-ID>0x10</EVENT-ID>
        <TRANSPORT-PROTOCOL>TCP</TRANSPORT-PROTOCOL>
      </SOMEIP-EVENT-DEPLOYMENT>
    </EVENT-DEPLOYMENTS>
    <METHOD-DEPLOYMENTS>
      <SOMEIP-METHOD-DEPLOYMENT>
        <SHORT-NAME>reset</SHORT-NAME>
        <METHOD-ID>20</METHOD-ID>
        <TRANSPORT-PROTOCOL>TCP</TRANSPORT-PROTOCOL>
      </SOMEIP-METHOD-DEPLOYMENT>
      <SOMEIP-METHOD-DEPLOYMENT>
        <SHORT-NAME>ClimateSetMode</SHORT-NAME>
        <METHOD-REF>/Interfaces/Climate/setMode</METHOD-REF>
        <METHOD-ID>21</METHOD-ID>
      </SOMEIP-METHOD-DEPLOYMENT>
    </METHOD-DEPLOYMENTS>
    <EVENT-GROUPS>
      <SOMEIP-EVENT-GROUP>
        <SHORT-NAME>Everything</SHORT-NAME>
        <EVENT-GROUP-ID>10</EVENT-GROUP-ID>
        <EVENT-REFS>
          <EVENT-REF>/Deployments/Climate/temperature</EVENT-REF>
          <EVENT-REF>/Deployments/Climate/overheat</EVENT-REF>
        </EVENT-REFS>
      </SOMEIP-EVENT-GROUP>
      <SOMEIP-EVENT-GROUP>
        <SHORT-NAME>Alarms</SHORT-NAME>
        <EVENT-GROUP-ID>11</EVENT-GROUP-ID>
        <EVENT-REFS><EVENT-REF>/Deployments/Climate/overheat</EVENT-REF></EVENT-REFS>
      </SOMEIP-EVENT-GROUP>
    </EVENT-GROUPS>
  </SOMEIP-SERVICE-INTERFACE-DEPLOYMENT>
  <PROVIDED-SOMEIP-SERVICE-INSTANCE>
    <SHORT-NAME>ClimateFront</SHORT-NAME>
    <SERVICE-INTERFACE-DEPLOYMENT-REF>/Deployments/Climate</SERVICE-INTERFACE-DEPLOYMENT-REF>
    <SERVICE-INSTANCE-ID>1</SERVICE-INSTANCE-ID>
  </PROVIDED-SOMEIP-SERVICE-INSTANCE>
  <PROVIDED-SOMEIP-SERVICE-INSTANCE>
    <SHORT-NAME>ClimateRear</SHORT-NAME>
    <SERVICE-INTERFACE-DEPLOYMENT-REF>/Deployments/ClimateRearDeployment</SERVICE-INTERFACE-DEPLOYMENT-REF>
    <SERVICE-INSTANCE-ID>0x2</SERVICE-INSTANCE-ID>
  </PROVIDED-SOMEIP-SERVICE-INSTANCE>
  <PROVIDED-SOMEIP-SERVICE-INSTANCE>
    <SHORT-NAME>Radio</SHORT-NAME>
    <SERVICE-INTERFACE-DEPLOYMENT-REF>/Deployments/Radio</SERVICE-INTERFACE-DEPLOYMENT-REF>
    <SERVICE-INSTANCE-ID>7</SERVICE-INSTANCE-ID>
  </PROVIDED-SOMEIP-SERVICE-INSTANCE>
  <SOMEIP-SERVICE-INSTANCE-TO-MACHINE-MAPPING>
    <SERVICE-INSTANCE-REFS><SERVICE-INSTANCE-REF>/Instances/ClimateFront</SERVICE-INSTANCE-REF></SERVICE-INSTANCE-REFS>
    <TCP-PORT>30501</TCP-PORT>
    <UDP-PORT>30502</UDP-PORT>
  </SOMEIP-SERVICE-INSTANCE-TO-MACHINE-MAPPING>
</AUTOSAR>"#;

fn attribute(name: &str, readable: bool, writable: bool, notifiable: bool) -> AttributeDecl {
    AttributeDecl {
        name: name.into(),
        ty: TypeRef::parse("Int32"),
        readable,
        writable,
        notifiable,
        getter: None,
        setter: None,
        notifier: None,
    }
}

fn method(name: &str) -> MethodDecl {
    MethodDecl {
        name: name.into(),
        in_args: vec![FieldDecl::new("mode", TypeRef::parse("UInt8"))],
        out_args: vec![],
        fire_and_forget: false,
        id: 0,
        reliable: false,
    }
}

fn climate() -> Interface {
    let mut iface = Interface::new("Climate", vec!["vehicle".into()]);
    iface.attributes.push(attribute("temperature", true, true, true));
    iface.events.push(EventDecl {
        name: "overheat".into(),
        ty: TypeRef::parse("Boolean"),
        id: 0,
        reliable: false,
        event_groups: vec![],
    });
    iface.methods.push(method("reset"));
    iface.methods.push(method("setMode"));
    iface
}

fn merged(iface: &mut Interface) -> ModelResult<()> {
    merge(iface, &parse_xml(DEPLOYMENT).unwrap())
}

#[test]
fn merge___interface_record___reads_service_id_and_version() {
    let mut iface = climate();

    merged(&mut iface).unwrap();

    assert_eq!(iface.service_id, 0x1234);
    assert_eq!(iface.version, Version { major: 1, minor: 2 });
}

#[test]
fn merge___attribute_with_all_capabilities___fills_each_accessor() {
    let mut iface = climate();

    merged(&mut iface).unwrap();

    let attr = &iface.attributes[0];
    assert_eq!(attr.getter, Some(Accessor { id: 1, reliable: true }));
    assert_eq!(attr.setter, Some(Accessor { id: 2, reliable: false }));
    assert_eq!(
        attr.notifier,
        Some(Notifier {
            id: 3 + EVENT_ID_OFFSET,
            reliable: false,
            event_groups: vec![10],
        })
    );
}

#[test]
fn merge___escaped_attribute_name___matches_raw_record() {
    let mut iface = climate();
    iface.attributes.push(attribute("version_", true, false, false));

    merged(&mut iface).unwrap();

    assert_eq!(iface.attributes[1].getter.map(|g| g.id), Some(9));
}

#[test]
fn merge___event___offsets_id_and_collects_every_group() {
    let mut iface = climate();

    merged(&mut iface).unwrap();

    let event = &iface.events[0];
    assert_eq!(event.id, 0x8010);
    assert!(event.reliable);
    assert_eq!(event.event_groups, vec![10, 11]);
}

#[test]
fn merge___method_without_named_record___falls_back_to_method_ref() {
    let mut iface = climate();

    merged(&mut iface).unwrap();

    assert_eq!(iface.methods[0].id, 20);
    assert_eq!(iface.methods[1].id, 21);
    assert!(!iface.methods[1].reliable);
}

#[test]
fn merge___name_and_reference_pick_different_records___is_ambiguous() {
    let xml = DEPLOYMENT.replace(
        "<METHOD-REF>/Interfaces/Climate/setMode</METHOD-REF>",
        "<METHOD-REF>/Interfaces/Climate/reset</METHOD-REF>",
    );
    let mut iface = climate();

    let result = merge(&mut iface, &parse_xml(&xml).unwrap());

    assert!(matches!(
        result,
        Err(ModelError::AmbiguousMethodDeployment { ref method, .. }) if method == "reset"
    ));
}

#[test]
fn merge___notifier_flag_without_record___is_missing_member_deployment() {
    let mut iface = climate();
    iface.attributes.push(attribute("version_", true, false, true));

    let result = merged(&mut iface);

    assert_eq!(
        result,
        Err(ModelError::MissingMemberDeployment {
            interface: "Climate".into(),
            member: "version".into(),
            capability: "notifier".into(),
        })
    );
}

#[test]
fn merge___method_without_any_record___is_missing_member_deployment() {
    let mut iface = climate();
    iface.methods.push(method("calibrate"));

    let result = merged(&mut iface);

    assert!(matches!(
        result,
        Err(ModelError::MissingMemberDeployment { ref capability, .. }) if capability == "method"
    ));
}

#[test_case("<MAJOR-VERSION>1</MAJOR-VERSION>", "major")]
#[test_case("<MINOR-VERSION>2</MINOR-VERSION>", "minor")]
fn merge___missing_version___is_fatal(removed: &str, which: &str) {
    let xml = DEPLOYMENT.replace(removed, "");
    let mut iface = climate();

    let result = merge(&mut iface, &parse_xml(&xml).unwrap());

    assert_eq!(
        result,
        Err(ModelError::MissingVersion {
            interface: "Climate".into(),
            which: which.into(),
        })
    );
}

#[test]
fn merge___unknown_interface___is_missing_deployment() {
    let mut iface = Interface::new("Seat", vec![]);

    let result = merged(&mut iface);

    assert!(matches!(result, Err(ModelError::MissingDeployment { .. })));
}

#[test]
fn merge___event_id_in_event_range___is_out_of_range() {
    let xml = DEPLOYMENT.replace("<EVENT-ID>0x10</EVENT-ID>", "<EVENT-ID>0x8001</EVENT-ID>");
    let mut iface = climate();

    let result = merge(&mut iface, &parse_xml(&xml).unwrap());

    assert!(matches!(result, Err(ModelError::EventIdOutOfRange { id: 0x8001, .. })));
}

#[test_case(0, Some(0x8000))]
#[test_case(3, Some(0x8003))]
#[test_case(0x7FFF, Some(0xFFFF))]
#[test_case(0x8000, None)]
fn offset_event_id___declared___adds_fixed_offset(declared: u16, expected: Option<u16>) {
    assert_eq!(offset_event_id(declared), expected);
}

#[test]
fn provided_instances___substring_match___returns_every_instance_with_ports() {
    let doc = parse_xml(DEPLOYMENT).unwrap();

    let instances = provided_instances("Climate", &doc).unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(
        instances[0],
        ProvidedInstance {
            name: "ClimateFront".into(),
            instance_id: 1,
            reliable_port: Some(30501),
            unreliable_port: Some(30502),
        }
    );
    assert_eq!(instances[1].instance_id, 2);
    assert_eq!(instances[1].reliable_port, None);
}

#[test]
fn provided_instances___missing_instance_id___is_fatal() {
    let xml = DEPLOYMENT.replace("<SERVICE-INSTANCE-ID>7</SERVICE-INSTANCE-ID>", "");
    let doc = parse_xml(&xml).unwrap();

    let result = provided_instances("Radio", &doc);

    assert_eq!(
        result,
        Err(ModelError::MissingInstanceId {
            interface: "Radio".into(),
            instance: "Radio".into(),
        })
    );
}

#[test]
fn merge___notifier_referenced_through_nested_record___collects_group() {
    let xml = DEPLOYMENT
        .replace(
            "<NOTIFIER><EVENT-ID>3</EVENT-ID></NOTIFIER>",
            "<NOTIFIER><SHORT-NAME>temperatureNotifier</SHORT-NAME><EVENT-ID>3</EVENT-ID></NOTIFIER>",
        )
        .replace(
            "<EVENT-REF>/Deployments/Climate/temperature</EVENT-REF>",
            "<EVENT-REF>/Deployments/Climate/temperature/temperatureNotifier</EVENT-REF>",
        );
    let mut iface = climate();

    merge(&mut iface, &parse_xml(&xml).unwrap()).unwrap();

    let notifier = iface.attributes[0].notifier.as_ref().unwrap();
    assert_eq!(notifier.event_groups, vec![10]);
}

#[test]
fn merge___reference_with_longer_member_name___is_not_collected() {
    let xml = DEPLOYMENT.replace(
        "<EVENT-REF>/Deployments/Climate/temperature</EVENT-REF>",
        "<EVENT-REF>/Deployments/Climate/temperatureLimit</EVENT-REF>",
    );
    let mut iface = climate();

    merge(&mut iface, &parse_xml(&xml).unwrap()).unwrap();

    let notifier = iface.attributes[0].notifier.as_ref().unwrap();
    assert!(notifier.event_groups.is_empty());
}

#[test]
fn provided_instances___nested_instance_reference___keeps_ports() {
    let xml = DEPLOYMENT.replace(
        "<SERVICE-INSTANCE-REF>/Instances/ClimateFront</SERVICE-INSTANCE-REF>",
        "<SERVICE-INSTANCE-REF>/Instances/ClimateFront/Ecu1</SERVICE-INSTANCE-REF>",
    );
    let doc = parse_xml(&xml).unwrap();

    let instances = provided_instances("Climate", &doc).unwrap();

    assert_eq!(instances[0].reliable_port, Some(30501));
    assert_eq!(instances[0].unreliable_port, Some(30502));
    assert_eq!(instances[1].reliable_port, None);
}
