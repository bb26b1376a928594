#![allow(non_snake_case)]

use super::*;
use sdvgen_core::{BuildOptions, build_document_str};

const FIXTURE: &str = include_str!("../../../sdvgen-core/tests/fixtures/vehicle.arxml");
const PACKAGE: &str = "com.example.vehicle.bridge";

fn navigation() -> Interface {
    let report = build_document_str(FIXTURE, None, &BuildOptions::default()).unwrap();
    report
        .interfaces
        .into_iter()
        .find(|iface| iface.name == "Navigation")
        .unwrap()
}

fn attribute<'a>(iface: &'a Interface, name: &str) -> &'a AttributeDecl {
    iface.attributes.iter().find(|a| a.name == name).unwrap()
}

fn method<'a>(iface: &'a Interface, name: &str) -> &'a MethodDecl {
    iface.methods.iter().find(|m| m.name == name).unwrap()
}

fn event<'a>(iface: &'a Interface, name: &str) -> &'a EventDecl {
    iface.events.iter().find(|e| e.name == name).unwrap()
}

fn entry<'a>(fragments: &'a MemberFragments, name: &str) -> &'a Entry {
    fragments.entries.iter().find(|e| e.name == name).unwrap()
}

fn names(fragments: &MemberFragments) -> Vec<&str> {
    fragments.entries.iter().map(|e| e.name.as_str()).collect()
}

// ============================================================================
// Attribute Tests
// ============================================================================

#[test]
fn attribute_fragments___read_write_notify___three_entries_and_callback() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "speed")).unwrap();

    assert_eq!(
        names(&fragments),
        vec!["getSpeedAttribute", "setSpeedAttribute", "subscribeSpeedAttribute"]
    );
    assert!(entry(&fragments, "getSpeedAttribute").exposed);
    assert!(!entry(&fragments, "subscribeSpeedAttribute").exposed);
    assert_eq!(fragments.callbacks.len(), 1);
    assert_eq!(fragments.callbacks[0].name, "onSpeedChanged");
    assert_eq!(fragments.callbacks[0].descriptor, "(I)V");
}

#[test]
fn attribute_fragments___readonly___no_setter() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "position")).unwrap();

    assert_eq!(names(&fragments), vec!["getPositionAttribute", "subscribePositionAttribute"]);
}

#[test]
fn attribute_fragments___struct_getter___constructs_point_with_field_order() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "position")).unwrap();
    let native = &entry(&fragments, "getPositionAttribute").native;

    assert!(native.contains("jmethodID ctor_Point = env->GetMethodID(cls_Point, \"<init>\", \"(II)V\");"));
    assert!(native.contains("jobject result = env->NewObject(cls_Point, ctor_Point, result_f_x, result_f_y);"));
    assert!(native.contains("gProxy->getPositionAttribute().getValue(callStatus, value);"));
    assert!(native.contains("return result;"));
}

#[test]
fn attribute_fragments___nested_arrays___distinct_loop_indices_both_ways() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "route")).unwrap();
    let native = &entry(&fragments, "setRouteAttribute").native;

    assert!(native.contains("for (jsize i_0 = 0; i_0 < in_value_len; ++i_0) {"));
    assert!(native.contains("for (jsize i_1 = 0; i_1 < in_value_e_f_points_len; ++i_1) {"));
    assert!(native.contains("for (size_t i_0 = 0; i_0 < resp_n.size(); ++i_0) {"));
    assert!(native.contains("for (size_t i_1 = 0; i_1 < resp_e_f_points_n.size(); ++i_1) {"));
}

#[test]
fn attribute_fragments___lookups___hoisted_once_per_function() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "route")).unwrap();
    let native = &entry(&fragments, "setRouteAttribute").native;

    assert_eq!(native.matches("jclass cls_Point =").count(), 1);
    assert_eq!(native.matches("jclass cls_Segment =").count(), 1);
    let lookup = native.find("jclass cls_Point =").unwrap();
    let first_loop = native.find("for (").unwrap();
    assert!(lookup < first_loop);
}

#[test]
fn attribute_fragments___guards___every_early_return_kept() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "speed")).unwrap();
    let native = &entry(&fragments, "setSpeedAttribute").native;

    assert_eq!(native.matches("return {};").count(), 2);
    assert!(native.contains("if (!requireProxy(env, \"setSpeedAttribute\")) {"));
    assert!(native.contains("throwCallStatus(env, \"setSpeedAttribute\", callStatus);"));
}

#[test]
fn attribute_fragments___subscription___callback_uses_local_frame() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = attribute_fragments(&ctx, attribute(&iface, "speed")).unwrap();
    let native = &entry(&fragments, "subscribeSpeedAttribute").native;

    assert!(native.contains("getChangedEvent().subscribe([](const int32_t& value) {"));
    assert!(native.contains("env->PushLocalFrame(32)"));
    assert!(native.contains("env->GetStaticMethodID(cls_NavigationNative, \"onSpeedChanged\", \"(I)V\");"));
    assert!(native.contains("env->CallStaticVoidMethod(cls_NavigationNative, cb_onSpeedChanged, managed);"));
    assert!(native.contains("env->PopLocalFrame(nullptr);"));
}

// ============================================================================
// Event Tests
// ============================================================================

#[test]
fn event_fragments___struct_array_event___subscription_and_callback() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = event_fragments(&ctx, event(&iface, "routeUpdated")).unwrap();

    assert_eq!(names(&fragments), vec!["subscribeRouteUpdatedEvent"]);
    let callback = &fragments.callbacks[0];
    assert_eq!(callback.name, "onRouteUpdated");
    assert_eq!(callback.params[0].name, "routeUpdated");
    assert_eq!(callback.descriptor, format!("([L{}/Segment;)V", PACKAGE.replace('.', "/")));
    assert!(
        entry(&fragments, "subscribeRouteUpdatedEvent")
            .native
            .contains("gProxy->getRouteUpdatedEvent().subscribe(")
    );
}

// ============================================================================
// Method Tests
// ============================================================================

#[test]
fn method_fragments___several_outputs___result_class() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = method_fragments(&ctx, method(&iface, "lookupPlaces")).unwrap();
    let entry = &fragments.entries[0];

    assert_eq!(fragments.data_classes.len(), 1);
    let class = &fragments.data_classes[0];
    assert_eq!(class.name, "LookupPlacesResult");
    let fields: Vec<&str> = class.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["places", "count"]);
    assert_eq!(entry.ret.as_ref().unwrap().java, "LookupPlacesResult");
    assert!(entry.native.contains("gProxy->lookupPlaces(in_query, in_tags, callStatus, out_places, out_count);"));
    assert!(entry.native.contains("jobject result = env->NewObject(cls_LookupPlacesResult, ctor_LookupPlacesResult, ret_places, ret_count);"));
}

#[test]
fn method_fragments___single_output___returns_value_directly() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = method_fragments(&ctx, method(&iface, "getPosition")).unwrap();
    let entry = &fragments.entries[0];

    assert!(fragments.data_classes.is_empty());
    assert!(entry.params.is_empty());
    assert_eq!(entry.ret.as_ref().unwrap().java, "Point");
    assert!(entry.native.contains("return ret_pos;"));
}

#[test]
fn method_fragments___fire_and_forget___void_without_outputs() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = method_fragments(&ctx, method(&iface, "resetTrip")).unwrap();
    let entry = &fragments.entries[0];

    assert!(entry.ret.is_none());
    assert_eq!(entry.native_descriptor, "(I)V");
    assert!(entry.native.contains("gProxy->resetTrip(in_trip, callStatus);"));
    assert!(entry.native.contains("return;"));
    assert!(!entry.native.contains("return {};"));
}

#[test]
fn method_fragments___inout_argument___passed_both_ways() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = method_fragments(&ctx, method(&iface, "sendRaw")).unwrap();
    let entry = &fragments.entries[0];

    assert_eq!(entry.native_descriptor, "([I)[I");
    assert!(entry.native.contains("gProxy->sendRaw(in_payload, callStatus, out_payload);"));
}

// ============================================================================
// Signature Agreement Tests
// ============================================================================

#[test]
fn signature_descriptor___matches_jni_parameter_list() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);
    let ctx = BridgeContext::new(&iface, &options);

    let fragments = method_fragments(&ctx, method(&iface, "lookupPlaces")).unwrap();
    let entry = &fragments.entries[0];

    assert!(entry.native.contains("(JNIEnv* env, jclass, jstring j_query, jobjectArray j_tags)"));
    assert_eq!(
        entry.native_descriptor,
        format!(
            "(Ljava/lang/String;[L{pkg}/TagsEntry;)L{pkg}/LookupPlacesResult;",
            pkg = PACKAGE.replace('.', "/")
        )
    );
}

#[test]
fn BridgeContext___native_class___named_after_interface() {
    let iface = navigation();
    let options = BridgeOptions::new(PACKAGE);

    assert_eq!(BridgeContext::new(&iface, &options).native_class(), "NavigationNative");
}
