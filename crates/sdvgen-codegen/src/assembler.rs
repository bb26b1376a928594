//! Whole-interface assembly: turns a resolved [`Interface`] into the set of
//! generated files.
//!
//! Paths are relative to the output root:
//!
//! ```text
//! fidl/<Name>.fidl
//! fidl/<Name>.fdepl                      (only when instances are deployed)
//! bridge/cpp/<Name>Bridge.cpp
//! bridge/java/<package path>/<Class>.java
//! bridge/aidl/<package path>/<Class>.aidl
//! ```

use crate::aidl;
use crate::error::CodegenError;
use crate::fragments::{
    BridgeContext, DataClass, MemberFragments, Param, attribute_fragments, event_fragments, method_fragments,
};
use crate::franca::{render_fdepl, render_fidl};
use crate::java;
use crate::jvm_types::entry_class;
use crate::marshal::Marshaller;
use crate::naming::{class_path, java_identifier, jni_symbol};
use crate::native_types::{interface_namespace, proxy_header};
use crate::options::BridgeOptions;
use sdvgen_core::Interface;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// One generated file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: PathBuf, contents: String) -> Self {
        Self { path, contents }
    }
}

/// Bridge files for one interface plus the members that could not be
/// generated.
#[derive(Debug, Clone)]
pub struct InterfaceArtifacts {
    pub interface: String,
    pub files: Vec<GeneratedFile>,
    pub failures: Vec<CodegenError>,
}

impl InterfaceArtifacts {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == PathBuf::from(path))
    }
}

/// Franca IDL files for `iface`.
///
/// The deployment file is written only when the interface provides at least
/// one instance.
pub fn idl_artifacts(iface: &Interface) -> Vec<GeneratedFile> {
    let mut files = vec![GeneratedFile::new(
        PathBuf::from("fidl").join(format!("{}.fidl", iface.name)),
        render_fidl(iface),
    )];
    if iface.instances.is_empty() {
        debug!(interface = %iface.name, "no provided instances, skipping deployment file");
    } else {
        files.push(GeneratedFile::new(
            PathBuf::from("fidl").join(format!("{}.fdepl", iface.name)),
            render_fdepl(iface),
        ));
    }
    files
}

/// Fragments for every member, isolating failures per member.
pub fn member_fragments(ctx: &BridgeContext<'_>) -> (Vec<MemberFragments>, Vec<CodegenError>) {
    let iface = ctx.interface;
    let results = iface
        .attributes
        .iter()
        .map(|a| attribute_fragments(ctx, a))
        .chain(iface.events.iter().map(|e| event_fragments(ctx, e)))
        .chain(iface.methods.iter().map(|m| method_fragments(ctx, m)));

    let mut members = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(fragments) => members.push(fragments),
            Err(e) => {
                error!(interface = %iface.name, member = e.member(), error = %e, "skipping member");
                failures.push(e);
            }
        }
    }
    (members, failures)
}

/// Data classes for structs, map entries, and multi-output method results.
///
/// Classes are keyed by name so a type shared across members is generated
/// once.
pub fn data_classes(ctx: &BridgeContext<'_>, members: &[MemberFragments]) -> (Vec<DataClass>, Vec<CodegenError>) {
    let iface = ctx.interface;
    let mut classes: BTreeMap<String, DataClass> = BTreeMap::new();
    let mut failures = Vec::new();

    for decl in &iface.structs {
        let marshaller = Marshaller::new(iface, &ctx.options.java_package, &decl.name);
        match marshaller.field_types(decl) {
            Ok(types) => {
                let fields = decl
                    .fields
                    .iter()
                    .zip(types)
                    .map(|(f, ty)| Param::new(java_identifier(&f.name), ty))
                    .collect();
                classes.insert(
                    decl.name.clone(),
                    DataClass {
                        name: decl.name.clone(),
                        fields,
                    },
                );
            }
            Err(e) => failures.push(e),
        }
    }

    for map in &iface.maps {
        let marshaller = Marshaller::new(iface, &ctx.options.java_package, &map.name);
        let key = marshaller.managed_type(&map.key, &format!("{}.key", map.name));
        let value = marshaller.managed_type(&map.value, &format!("{}.value", map.name));
        match (key, value) {
            (Ok(key), Ok(value)) => {
                let name = entry_class(&map.name);
                let fields = vec![Param::new("key", key), Param::new("value", value)];
                classes.insert(name.clone(), DataClass { name, fields });
            }
            (Err(e), _) | (_, Err(e)) => failures.push(e),
        }
    }

    for class in members.iter().flat_map(|m| m.data_classes.iter()) {
        classes.insert(class.name.clone(), class.clone());
    }

    for e in &failures {
        error!(interface = %iface.name, member = e.member(), error = %e, "skipping data class");
    }
    (classes.into_values().collect(), failures)
}

const CPP_PRELUDE: &str = r#"// Generated by sdvgen from {{qualified-name}}. Do not edit.

#include <jni.h>

#include <algorithm>
#include <cstdint>
#include <memory>
#include <string>
#include <utility>
#include <vector>

#include <CommonAPI/CommonAPI.hpp>
#include <{{proxy-header}}>

using namespace {{namespace}};

namespace {

JavaVM* gVm = nullptr;
jobject gClassLoader = nullptr;
jmethodID gLoadClass = nullptr;
std::shared_ptr<{{name}}Proxy<>> gProxy;

struct ThreadDetacher {
    bool attached = false;

    ~ThreadDetacher() {
        if (attached && gVm != nullptr) {
            gVm->DetachCurrentThread();
        }
    }
};

JNIEnv* attachEnv() {
    thread_local ThreadDetacher detacher;
    JNIEnv* env = nullptr;
    if (gVm == nullptr) {
        return nullptr;
    }
    jint status = gVm->GetEnv(reinterpret_cast<void**>(&env), {{jni-version}});
    if (status == JNI_EDETACHED) {
        if (gVm->AttachCurrentThread(&env, nullptr) != JNI_OK) {
            return nullptr;
        }
        detacher.attached = true;
    } else if (status != JNI_OK) {
        return nullptr;
    }
    return env;
}

jclass findClass(JNIEnv* env, const char* name) {
    std::string binaryName(name);
    std::replace(binaryName.begin(), binaryName.end(), '/', '.');
    jstring jname = env->NewStringUTF(binaryName.c_str());
    auto cls = static_cast<jclass>(env->CallObjectMethod(gClassLoader, gLoadClass, jname));
    env->DeleteLocalRef(jname);
    return cls;
}

std::string toStdString(JNIEnv* env, jstring value) {
    if (value == nullptr) {
        return std::string();
    }
    const char* chars = env->GetStringUTFChars(value, nullptr);
    std::string result(chars);
    env->ReleaseStringUTFChars(value, chars);
    return result;
}

void throwIllegalState(JNIEnv* env, const std::string& message) {
    jclass cls = env->FindClass("java/lang/IllegalStateException");
    env->ThrowNew(cls, message.c_str());
    env->DeleteLocalRef(cls);
}

void throwCallStatus(JNIEnv* env, const char* call, CommonAPI::CallStatus status) {
    throwIllegalState(env, std::string(call) + " failed with CallStatus " + std::to_string(static_cast<int>(status)));
}

bool requireProxy(JNIEnv* env, const char* call) {
    if (gProxy) {
        return true;
    }
    throwIllegalState(env, std::string(call) + " called before init");
    return false;
}

}  // namespace

extern "C" {

JNIEXPORT jint JNICALL JNI_OnLoad(JavaVM* vm, void*) {
    gVm = vm;
    JNIEnv* env = nullptr;
    if (vm->GetEnv(reinterpret_cast<void**>(&env), {{jni-version}}) != JNI_OK) {
        return JNI_ERR;
    }
    jclass nativeClass = env->FindClass("{{native-path}}");
    if (nativeClass == nullptr) {
        return JNI_ERR;
    }
    jclass classClass = env->GetObjectClass(nativeClass);
    jmethodID getClassLoader = env->GetMethodID(classClass, "getClassLoader", "()Ljava/lang/ClassLoader;");
    jobject loader = env->CallObjectMethod(nativeClass, getClassLoader);
    gClassLoader = env->NewGlobalRef(loader);
    jclass loaderClass = env->FindClass("java/lang/ClassLoader");
    gLoadClass = env->GetMethodID(loaderClass, "loadClass", "(Ljava/lang/String;)Ljava/lang/Class;");
    env->DeleteLocalRef(loader);
    env->DeleteLocalRef(loaderClass);
    env->DeleteLocalRef(classClass);
    env->DeleteLocalRef(nativeClass);
    return {{jni-version}};
}

JNIEXPORT jboolean JNICALL {{init-symbol}}(JNIEnv* env, jclass, jstring j_domain, jstring j_instance, jstring j_connection) {
    gProxy = CommonAPI::Runtime::get()->buildProxy<{{name}}Proxy>(
        toStdString(env, j_domain), toStdString(env, j_instance), toStdString(env, j_connection));
    return gProxy ? JNI_TRUE : JNI_FALSE;
}

JNIEXPORT jboolean JNICALL {{available-symbol}}(JNIEnv*, jclass) {
    return gProxy && gProxy->isAvailable() ? JNI_TRUE : JNI_FALSE;
}
"#;

/// Render `<Name>Bridge.cpp`.
pub fn render_bridge_cpp(ctx: &BridgeContext<'_>, members: &[MemberFragments]) -> String {
    let iface = ctx.interface;
    let package = &ctx.options.java_package;
    let native_class = ctx.native_class();

    let mut code = CPP_PRELUDE
        .replace("{{qualified-name}}", &format!("{}.{}", iface.package_path(), iface.name))
        .replace("{{proxy-header}}", &proxy_header(iface))
        .replace("{{namespace}}", &interface_namespace(iface))
        .replace("{{name}}", &iface.name)
        .replace("{{jni-version}}", &ctx.options.jni_version)
        .replace("{{native-path}}", &class_path(package, &native_class))
        .replace("{{init-symbol}}", &jni_symbol(package, &native_class, "init"))
        .replace("{{available-symbol}}", &jni_symbol(package, &native_class, "isAvailable"));

    for entry in members.iter().flat_map(|m| m.entries.iter()) {
        code.push('\n');
        code.push_str(&entry.native);
    }
    code.push_str("\n}  // extern \"C\"\n");
    code
}

/// JNI bridge, Java, and AIDL files for `iface`.
///
/// Members that cannot be generated are reported in
/// [`InterfaceArtifacts::failures`]; every other member is still emitted.
pub fn bridge_artifacts(iface: &Interface, options: &BridgeOptions) -> InterfaceArtifacts {
    let ctx = BridgeContext::new(iface, options);
    let (members, mut failures) = member_fragments(&ctx);
    let (classes, class_failures) = data_classes(&ctx, &members);
    failures.extend(class_failures);

    let package_dir: PathBuf = options.java_package.split('.').collect();
    let java_dir = PathBuf::from("bridge").join("java").join(&package_dir);
    let aidl_dir = PathBuf::from("bridge").join("aidl").join(&package_dir);
    let name = &iface.name;

    let mut files = vec![
        GeneratedFile::new(
            PathBuf::from("bridge").join("cpp").join(format!("{name}Bridge.cpp")),
            render_bridge_cpp(&ctx, &members),
        ),
        GeneratedFile::new(
            java_dir.join(format!("{}.java", ctx.native_class())),
            java::generate_native_class(&ctx, &members),
        ),
        GeneratedFile::new(
            java_dir.join(format!("{name}Service.java")),
            java::generate_service_class(&ctx, &members),
        ),
        GeneratedFile::new(
            aidl_dir.join(format!("I{name}.aidl")),
            aidl::generate_interface(&ctx, &members),
        ),
        GeneratedFile::new(
            aidl_dir.join(format!("I{name}Callback.aidl")),
            aidl::generate_callback_interface(&ctx, &members),
        ),
    ];
    for class in &classes {
        files.push(GeneratedFile::new(
            java_dir.join(format!("{}.java", class.name)),
            java::generate_data_class(class, &options.java_package),
        ));
        files.push(GeneratedFile::new(
            aidl_dir.join(format!("{}.aidl", class.name)),
            aidl::generate_parcelable(&class.name, &options.java_package),
        ));
    }

    info!(
        interface = %name,
        members = members.len(),
        data_classes = classes.len(),
        failures = failures.len(),
        "generated bridge"
    );
    InterfaceArtifacts {
        interface: name.clone(),
        files,
        failures,
    }
}
