//! Per-member bridge fragments.
//!
//! Each interface member becomes one or more static native entry points on
//! the managed side plus, for notifiable attributes and broadcasts, a
//! callback the native side invokes. Members are generated independently:
//! an error in one never affects another.

use crate::emit::{Body, Fragment};
use crate::error::CodegenResult;
use crate::jvm_types::{JvmType, constructor_descriptor, method_descriptor};
use crate::marshal::{Direction, Marshaller};
use crate::naming::{capitalize, class_path, java_identifier, jni_symbol, lower_first};
use crate::options::BridgeOptions;
use sdvgen_core::{AttributeDecl, EventDecl, Interface, MethodDecl};
use tracing::{debug, warn};

/// A managed parameter or field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: JvmType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: JvmType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Descriptor of a method over `params` returning `ret`
pub fn signature_descriptor(params: &[Param], ret: Option<&JvmType>) -> String {
    method_descriptor(params.iter().map(|p| &p.ty), ret)
}

/// One static native method and its C++ implementation.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<JvmType>,
    /// C++ definition of the exported JNI function
    pub native: String,
    /// Descriptor implied by the C++ parameter and return types
    pub native_descriptor: String,
    /// Whether the service stub and AIDL interface expose this method
    pub exposed: bool,
}

/// A static managed method the native side calls back into.
#[derive(Debug, Clone)]
pub struct Callback {
    pub name: String,
    pub params: Vec<Param>,
    /// Descriptor passed to `GetStaticMethodID`
    pub descriptor: String,
}

/// A generated Parcelable data class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataClass {
    pub name: String,
    pub fields: Vec<Param>,
}

impl DataClass {
    /// Descriptor of the all-fields constructor
    pub fn constructor_descriptor(&self) -> String {
        constructor_descriptor(self.fields.iter().map(|f| &f.ty))
    }
}

/// Everything generated for one member.
#[derive(Debug, Clone)]
pub struct MemberFragments {
    pub member: String,
    pub entries: Vec<Entry>,
    pub callbacks: Vec<Callback>,
    /// Result classes for methods with several out arguments
    pub data_classes: Vec<DataClass>,
}

impl MemberFragments {
    fn new(member: &str) -> Self {
        Self {
            member: member.to_string(),
            entries: Vec::new(),
            callbacks: Vec::new(),
            data_classes: Vec::new(),
        }
    }
}

/// Interface-wide generation context.
pub struct BridgeContext<'a> {
    pub interface: &'a Interface,
    pub options: &'a BridgeOptions,
}

impl<'a> BridgeContext<'a> {
    pub fn new(interface: &'a Interface, options: &'a BridgeOptions) -> Self {
        Self { interface, options }
    }

    /// Managed class holding the native declarations
    pub fn native_class(&self) -> String {
        format!("{}Native", self.interface.name)
    }

    fn marshaller<'m>(&'m self, member: &'m str) -> Marshaller<'m> {
        Marshaller::new(self.interface, &self.options.java_package, member)
    }

    fn jni_function(&self, name: &str, params: &[Param], ret: Option<&JvmType>, body: Body) -> String {
        let symbol = jni_symbol(&self.options.java_package, &self.native_class(), name);
        let mut out = format!(
            "JNIEXPORT {} JNICALL {symbol}(JNIEnv* env, jclass",
            ret.map_or("void", |r| r.jni.as_str())
        );
        for param in params {
            out.push_str(&format!(", {} j_{}", param.ty.jni, param.name));
        }
        out.push_str(") {\n");
        for line in body.render(1) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    fn entry(&self, name: String, params: Vec<Param>, ret: Option<JvmType>, body: Body, exposed: bool) -> Entry {
        let native = self.jni_function(&name, &params, ret.as_ref(), body);
        let native_descriptor = signature_descriptor(&params, ret.as_ref());
        Entry {
            name,
            params,
            ret,
            native,
            native_descriptor,
            exposed,
        }
    }

    /// Body of a subscription lambda invoking `callback` with `value`.
    fn callback_lambda(&self, callback: &Callback, mut read: Fragment) -> Vec<String> {
        let native_class = self.native_class();
        read.decl(format!(
            "jclass cls_{native_class} = findClass(env, \"{}\");",
            class_path(&self.options.java_package, &native_class)
        ));
        read.decl(format!(
            "jmethodID cb_{name} = env->GetStaticMethodID(cls_{native_class}, \"{name}\", \"{}\");",
            callback.descriptor,
            name = callback.name
        ));

        let mut lambda = Body::new();
        lambda.prologue("JNIEnv* env = attachEnv();");
        lambda.prologue("if (env == nullptr || env->PushLocalFrame(32) != JNI_OK) {");
        lambda.prologue("    return;");
        lambda.prologue("}");
        lambda.fragment(read);
        lambda.line(format!(
            "env->CallStaticVoidMethod(cls_{native_class}, cb_{}, managed);",
            callback.name
        ));
        lambda.line("if (env->ExceptionCheck()) {");
        lambda.line("    env->ExceptionDescribe();");
        lambda.line("    env->ExceptionClear();");
        lambda.line("}");
        lambda.line("env->PopLocalFrame(nullptr);");
        lambda.render(1)
    }
}

fn proxy_guard(body: &mut Body, call: &str, returns: bool) {
    body.line(format!("if (!requireProxy(env, \"{call}\")) {{"));
    body.line(format!("    {}", failure_return(returns)));
    body.line("}");
}

fn status_guard(body: &mut Body, call: &str, returns: bool) {
    body.line("if (callStatus != CommonAPI::CallStatus::SUCCESS) {");
    body.line(format!("    throwCallStatus(env, \"{call}\", callStatus);"));
    body.line(format!("    {}", failure_return(returns)));
    body.line("}");
}

fn failure_return(returns: bool) -> &'static str {
    if returns { "return {};" } else { "return;" }
}

/// Entry points for an attribute: getter, setter, and subscription as its
/// capabilities allow.
pub fn attribute_fragments(ctx: &BridgeContext<'_>, attr: &AttributeDecl) -> CodegenResult<MemberFragments> {
    let marshaller = ctx.marshaller(&attr.name);
    let native = marshaller.native_type(&attr.ty, &attr.name)?;
    let cap = capitalize(&attr.name);
    let accessor = format!("gProxy->get{cap}Attribute()");
    let mut fragments = MemberFragments::new(&attr.name);

    if attr.readable {
        let name = format!("get{cap}Attribute");
        let mut read = Fragment::new();
        let ret = marshaller.emit(Direction::Read, &mut read, "value", &attr.ty, "result")?;

        let mut body = Body::new();
        proxy_guard(&mut body, &name, true);
        body.line("CommonAPI::CallStatus callStatus;");
        body.line(format!("{native} value{{}};"));
        body.line(format!("{accessor}.getValue(callStatus, value);"));
        status_guard(&mut body, &name, true);
        body.fragment(read);
        body.line("return result;");
        fragments.entries.push(ctx.entry(name, Vec::new(), Some(ret), body, true));
    }

    if attr.writable {
        let name = format!("set{cap}Attribute");
        let mut pre = Fragment::new();
        let param = marshaller.emit(Direction::PreCall, &mut pre, "j_value", &attr.ty, "in_value")?;
        let mut post = Fragment::new();
        let ret = marshaller.emit(Direction::PostCall, &mut post, "resp_value", &attr.ty, "resp")?;

        let mut body = Body::new();
        proxy_guard(&mut body, &name, true);
        body.fragment(pre);
        body.line("CommonAPI::CallStatus callStatus;");
        body.line(format!("{native} resp_value{{}};"));
        body.line(format!("{accessor}.setValue(in_value, callStatus, resp_value);"));
        status_guard(&mut body, &name, true);
        body.fragment(post);
        body.line("return resp;");
        let params = vec![Param::new("value", param)];
        fragments.entries.push(ctx.entry(name, params, Some(ret), body, true));
    }

    if attr.notifiable {
        let name = format!("subscribe{cap}Attribute");
        let mut read = Fragment::new();
        let value = marshaller.emit(Direction::Read, &mut read, "value", &attr.ty, "managed")?;
        let params = vec![Param::new(java_identifier(&attr.name), value)];
        let callback = Callback {
            name: format!("on{cap}Changed"),
            descriptor: signature_descriptor(&params, None),
            params,
        };

        let mut body = Body::new();
        proxy_guard(&mut body, &name, false);
        body.line(format!(
            "{accessor}.getChangedEvent().subscribe([](const {native}& value) {{"
        ));
        body.lines(ctx.callback_lambda(&callback, read));
        body.line("});");
        fragments.entries.push(ctx.entry(name, Vec::new(), None, body, false));
        fragments.callbacks.push(callback);
    }

    debug!(member = %attr.name, entries = fragments.entries.len(), "attribute fragments");
    Ok(fragments)
}

/// Subscription entry point and callback for a broadcast.
pub fn event_fragments(ctx: &BridgeContext<'_>, event: &EventDecl) -> CodegenResult<MemberFragments> {
    let marshaller = ctx.marshaller(&event.name);
    let native = marshaller.native_type(&event.ty, &event.name)?;
    let cap = capitalize(&event.name);
    let name = format!("subscribe{cap}Event");

    let mut read = Fragment::new();
    let value = marshaller.emit(Direction::Read, &mut read, "value", &event.ty, "managed")?;
    let params = vec![Param::new(java_identifier(&lower_first(&event.name)), value)];
    let callback = Callback {
        name: format!("on{cap}"),
        descriptor: signature_descriptor(&params, None),
        params,
    };

    let mut body = Body::new();
    proxy_guard(&mut body, &name, false);
    body.line(format!("gProxy->get{cap}Event().subscribe([](const {native}& value) {{"));
    body.lines(ctx.callback_lambda(&callback, read));
    body.line("});");

    let mut fragments = MemberFragments::new(&event.name);
    fragments.entries.push(ctx.entry(name, Vec::new(), None, body, false));
    fragments.callbacks.push(callback);
    Ok(fragments)
}

/// Entry point for a method.
///
/// No out arguments returns void, one returns that value, several return a
/// generated `<Method>Result` class.
pub fn method_fragments(ctx: &BridgeContext<'_>, method: &MethodDecl) -> CodegenResult<MemberFragments> {
    let marshaller = ctx.marshaller(&method.name);
    let mut fragments = MemberFragments::new(&method.name);
    let outs = if method.fire_and_forget {
        if !method.out_args.is_empty() {
            warn!(method = %method.name, "fire-and-forget method declares out arguments; ignoring them");
        }
        &[][..]
    } else {
        &method.out_args[..]
    };

    let mut pre = Fragment::new();
    let mut params = Vec::with_capacity(method.in_args.len());
    let mut call_args = Vec::new();
    for arg in &method.in_args {
        let java_name = java_identifier(&arg.name);
        let ty = marshaller.emit(
            Direction::PreCall,
            &mut pre,
            &format!("j_{java_name}"),
            &arg.ty,
            &format!("in_{}", arg.name),
        )?;
        params.push(Param::new(java_name, ty));
        call_args.push(format!("in_{}", arg.name));
    }
    call_args.push("callStatus".to_string());

    let mut out_decls = Vec::with_capacity(outs.len());
    let mut post = Fragment::new();
    let mut results = Vec::with_capacity(outs.len());
    for arg in outs {
        let native = marshaller.native_type(&arg.ty, &arg.name)?;
        out_decls.push(format!("{native} out_{}{{}};", arg.name));
        call_args.push(format!("out_{}", arg.name));
        let value = format!("ret_{}", arg.name);
        let ty = marshaller.emit(Direction::PostCall, &mut post, &format!("out_{}", arg.name), &arg.ty, &value)?;
        results.push((value, Param::new(java_identifier(&arg.name), ty)));
    }

    let (ret, returned) = match results.len() {
        0 => (None, None),
        1 => {
            let (value, param) = results.remove(0);
            (Some(param.ty), Some(value))
        }
        _ => {
            let class = DataClass {
                name: format!("{}Result", capitalize(&method.name)),
                fields: results.iter().map(|(_, p)| p.clone()).collect(),
            };
            let path = class_path(&ctx.options.java_package, &class.name);
            post.decl(format!("jclass cls_{} = findClass(env, \"{path}\");", class.name));
            post.decl(format!(
                "jmethodID ctor_{name} = env->GetMethodID(cls_{name}, \"<init>\", \"{}\");",
                class.constructor_descriptor(),
                name = class.name
            ));
            let values: Vec<&str> = results.iter().map(|(v, _)| v.as_str()).collect();
            post.line(format!(
                "jobject result = env->NewObject(cls_{name}, ctor_{name}, {});",
                values.join(", "),
                name = class.name
            ));
            for (value, param) in &results {
                if !param.ty.is_primitive {
                    post.line(format!("env->DeleteLocalRef({value});"));
                }
            }
            let ty = JvmType::class(&ctx.options.java_package, &class.name);
            fragments.data_classes.push(class);
            (Some(ty), Some("result".to_string()))
        }
    };

    let returns = ret.is_some();
    let mut body = Body::new();
    proxy_guard(&mut body, &method.name, returns);
    body.fragment(pre);
    body.line("CommonAPI::CallStatus callStatus;");
    for decl in out_decls {
        body.line(decl);
    }
    body.line(format!("gProxy->{}({});", method.name, call_args.join(", ")));
    status_guard(&mut body, &method.name, returns);
    body.fragment(post);
    if let Some(value) = returned {
        body.line(format!("return {value};"));
    }

    let name = java_identifier(&method.name);
    fragments.entries.push(ctx.entry(name, params, ret, body, true));
    Ok(fragments)
}

#[cfg(test)]
#[path = "fragments/fragments_tests.rs"]
mod fragments_tests;
