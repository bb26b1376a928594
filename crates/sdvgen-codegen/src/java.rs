//! Java source generation: data classes, the native declaration class, and
//! the Android service stub.
//!
//! The native declarations and the stub are rendered from the same
//! [`Entry`] list the C++ side was generated from, so the three always agree
//! on names, parameter order, and types.

use crate::fragments::{BridgeContext, Callback, DataClass, Entry, MemberFragments, Param, signature_descriptor};
use crate::jvm_types::JvmType;
use crate::naming::capitalize;

/// Rendered Java text plus the JNI descriptor it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub descriptor: String,
}

fn param_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty.java, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn return_type(ret: Option<&JvmType>) -> &str {
    ret.map_or("void", |r| r.java.as_str())
}

/// `public static native ...;` line for an entry.
pub fn native_declaration(entry: &Entry) -> Rendered {
    Rendered {
        text: format!(
            "    public static native {} {}({});\n",
            return_type(entry.ret.as_ref()),
            entry.name,
            param_list(&entry.params)
        ),
        descriptor: signature_descriptor(&entry.params, entry.ret.as_ref()),
    }
}

/// Binder stub method forwarding to the native declaration.
pub fn stub_method(native_class: &str, entry: &Entry) -> Rendered {
    let args: Vec<&str> = entry.params.iter().map(|p| p.name.as_str()).collect();
    let call = format!("{native_class}.{}({})", entry.name, args.join(", "));
    let statement = match entry.ret {
        Some(_) => format!("return {call};"),
        None => format!("{call};"),
    };

    let mut text = String::new();
    text.push_str("        @Override\n");
    text.push_str(&format!(
        "        public {} {}({}) {{\n",
        return_type(entry.ret.as_ref()),
        entry.name,
        param_list(&entry.params)
    ));
    text.push_str(&format!("            {statement}\n"));
    text.push_str("        }\n");

    let forwarded: Vec<&JvmType> = entry.params.iter().map(|p| &p.ty).collect();
    Rendered {
        text,
        descriptor: crate::jvm_types::method_descriptor(forwarded, entry.ret.as_ref()),
    }
}

// ============================================================================
// Data classes
// ============================================================================

fn element_class(ty: &JvmType) -> &str {
    ty.java.trim_end_matches("[]")
}

fn parcel_write(ty: &JvmType, field: &str) -> String {
    match ty.descriptor.as_str() {
        "Z" => format!("dest.writeInt({field} ? 1 : 0);"),
        "B" => format!("dest.writeByte({field});"),
        "I" => format!("dest.writeInt({field});"),
        "J" => format!("dest.writeLong({field});"),
        "F" => format!("dest.writeFloat({field});"),
        "D" => format!("dest.writeDouble({field});"),
        "Ljava/lang/String;" => format!("dest.writeString({field});"),
        "[Z" => format!("dest.writeBooleanArray({field});"),
        "[B" => format!("dest.writeByteArray({field});"),
        "[I" => format!("dest.writeIntArray({field});"),
        "[J" => format!("dest.writeLongArray({field});"),
        "[F" => format!("dest.writeFloatArray({field});"),
        "[D" => format!("dest.writeDoubleArray({field});"),
        "[Ljava/lang/String;" => format!("dest.writeStringArray({field});"),
        _ if ty.is_array() => format!("dest.writeTypedArray({field}, flags);"),
        _ => format!("dest.writeTypedObject({field}, flags);"),
    }
}

fn parcel_read(ty: &JvmType) -> String {
    match ty.descriptor.as_str() {
        "Z" => "in.readInt() != 0".to_string(),
        "B" => "in.readByte()".to_string(),
        "I" => "in.readInt()".to_string(),
        "J" => "in.readLong()".to_string(),
        "F" => "in.readFloat()".to_string(),
        "D" => "in.readDouble()".to_string(),
        "Ljava/lang/String;" => "in.readString()".to_string(),
        "[Z" => "in.createBooleanArray()".to_string(),
        "[B" => "in.createByteArray()".to_string(),
        "[I" => "in.createIntArray()".to_string(),
        "[J" => "in.createLongArray()".to_string(),
        "[F" => "in.createFloatArray()".to_string(),
        "[D" => "in.createDoubleArray()".to_string(),
        "[Ljava/lang/String;" => "in.createStringArray()".to_string(),
        _ if ty.is_array() => format!("in.createTypedArray({}.CREATOR)", element_class(ty)),
        _ => format!("in.readTypedObject({}.CREATOR)", ty.java),
    }
}

/// Generate a Parcelable class with an all-fields constructor.
///
/// The constructor parameter order is the field order, which is also the
/// order the native side passes values in.
pub fn generate_data_class(class: &DataClass, package: &str) -> String {
    let name = &class.name;
    let mut code = String::new();

    code.push_str(&format!("package {package};\n\n"));
    code.push_str("import android.os.Parcel;\n");
    code.push_str("import android.os.Parcelable;\n\n");
    code.push_str(&format!("public final class {name} implements Parcelable {{\n"));

    if !class.fields.is_empty() {
        code.push('\n');
    }
    for field in &class.fields {
        code.push_str(&format!("    private {} {};\n", field.ty.java, field.name));
    }

    // All-fields constructor, invoked from native code
    code.push_str(&format!("\n    public {name}({}) {{\n", param_list(&class.fields)));
    for field in &class.fields {
        code.push_str(&format!("        this.{0} = {0};\n", field.name));
    }
    code.push_str("    }\n");

    code.push_str(&format!("\n    private {name}(Parcel in) {{\n"));
    for field in &class.fields {
        code.push_str(&format!("        this.{} = {};\n", field.name, parcel_read(&field.ty)));
    }
    code.push_str("    }\n");

    for field in &class.fields {
        let part = capitalize(&field.name);
        code.push_str(&format!("\n    public {} get{part}() {{\n", field.ty.java));
        code.push_str(&format!("        return {};\n", field.name));
        code.push_str("    }\n");
        code.push_str(&format!(
            "\n    public void set{part}({} {}) {{\n",
            field.ty.java, field.name
        ));
        code.push_str(&format!("        this.{0} = {0};\n", field.name));
        code.push_str("    }\n");
    }

    code.push_str("\n    @Override\n");
    code.push_str("    public int describeContents() {\n");
    code.push_str("        return 0;\n");
    code.push_str("    }\n");

    code.push_str("\n    @Override\n");
    code.push_str("    public void writeToParcel(Parcel dest, int flags) {\n");
    for field in &class.fields {
        code.push_str(&format!("        {}\n", parcel_write(&field.ty, &field.name)));
    }
    code.push_str("    }\n");

    code.push_str(&format!(
        "\n    public static final Creator<{name}> CREATOR = new Creator<{name}>() {{\n"
    ));
    code.push_str("        @Override\n");
    code.push_str(&format!("        public {name} createFromParcel(Parcel in) {{\n"));
    code.push_str(&format!("            return new {name}(in);\n"));
    code.push_str("        }\n\n");
    code.push_str("        @Override\n");
    code.push_str(&format!("        public {name}[] newArray(int size) {{\n"));
    code.push_str(&format!("            return new {name}[size];\n"));
    code.push_str("        }\n");
    code.push_str("    };\n");

    code.push_str("}\n");
    code
}

// ============================================================================
// Native declarations
// ============================================================================

fn callbacks(members: &[MemberFragments]) -> impl Iterator<Item = &Callback> {
    members.iter().flat_map(|m| m.callbacks.iter())
}

fn entries(members: &[MemberFragments]) -> impl Iterator<Item = &Entry> {
    members.iter().flat_map(|m| m.entries.iter())
}

/// Generate `<Interface>Native.java`.
pub fn generate_native_class(ctx: &BridgeContext<'_>, members: &[MemberFragments]) -> String {
    let class = ctx.native_class();
    let mut code = String::new();

    code.push_str(&format!("package {};\n\n", ctx.options.java_package));
    code.push_str("/**\n");
    code.push_str(&format!(
        " * Native bridge to the {} CommonAPI proxy.\n",
        ctx.interface.name
    ));
    code.push_str(" */\n");
    code.push_str(&format!("public final class {class} {{\n\n"));

    code.push_str("    static {\n");
    code.push_str(&format!(
        "        System.loadLibrary(\"{}\");\n",
        ctx.options.library_for(&ctx.interface.name)
    ));
    code.push_str("    }\n\n");

    code.push_str("    /** Receives attribute notifications and broadcasts. */\n");
    code.push_str("    public interface Listener {\n");
    for callback in callbacks(members) {
        code.push_str(&format!(
            "        void {}({});\n",
            callback.name,
            param_list(&callback.params)
        ));
    }
    code.push_str("    }\n\n");

    code.push_str("    private static volatile Listener listener;\n\n");
    code.push_str(&format!("    private {class}() {{\n"));
    code.push_str("    }\n\n");
    code.push_str("    public static void setListener(Listener value) {\n");
    code.push_str("        listener = value;\n");
    code.push_str("    }\n\n");

    code.push_str("    public static native boolean init(String domain, String instance, String connection);\n\n");
    code.push_str("    public static native boolean isAvailable();\n");

    for entry in entries(members) {
        code.push('\n');
        code.push_str(&native_declaration(entry).text);
    }

    for callback in callbacks(members) {
        let args: Vec<&str> = callback.params.iter().map(|p| p.name.as_str()).collect();
        code.push_str(&format!(
            "\n    private static void {}({}) {{\n",
            callback.name,
            param_list(&callback.params)
        ));
        code.push_str("        Listener current = listener;\n");
        code.push_str("        if (current != null) {\n");
        code.push_str(&format!(
            "            current.{}({});\n",
            callback.name,
            args.join(", ")
        ));
        code.push_str("        }\n");
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    code
}

// ============================================================================
// Service stub
// ============================================================================

/// Instance string the service connects to by default
pub fn default_instance(ctx: &BridgeContext<'_>) -> String {
    let iface = ctx.interface;
    let name = iface.instances.first().map_or(iface.name.as_str(), |i| i.name.as_str());
    format!("{}.{name}", iface.package_path())
}

/// Generate `<Interface>Service.java`, the Android service exposing the
/// AIDL interface over the native bridge.
pub fn generate_service_class(ctx: &BridgeContext<'_>, members: &[MemberFragments]) -> String {
    let iface = &ctx.interface.name;
    let native = ctx.native_class();
    let callback_iface = format!("I{iface}Callback");
    let mut code = String::new();

    code.push_str(&format!("package {};\n\n", ctx.options.java_package));
    code.push_str("import android.app.Service;\n");
    code.push_str("import android.content.Intent;\n");
    code.push_str("import android.os.IBinder;\n");
    code.push_str("import android.os.RemoteCallbackList;\n");
    code.push_str("import android.os.RemoteException;\n");
    code.push_str("import android.util.Log;\n\n");

    code.push_str(&format!(
        "public class {iface}Service extends Service implements {native}.Listener {{\n\n"
    ));
    code.push_str(&format!("    private static final String TAG = \"{iface}Service\";\n\n"));
    code.push_str(&format!(
        "    private final RemoteCallbackList<{callback_iface}> callbacks = new RemoteCallbackList<>();\n\n"
    ));

    code.push_str(&format!("    private final I{iface}.Stub binder = new I{iface}.Stub() {{\n"));
    for entry in entries(members).filter(|e| e.exposed) {
        code.push_str(&stub_method(&native, entry).text);
        code.push('\n');
    }
    code.push_str("        @Override\n");
    code.push_str(&format!("        public void registerCallback({callback_iface} callback) {{\n"));
    code.push_str("            callbacks.register(callback);\n");
    code.push_str("        }\n\n");
    code.push_str("        @Override\n");
    code.push_str(&format!("        public void unregisterCallback({callback_iface} callback) {{\n"));
    code.push_str("            callbacks.unregister(callback);\n");
    code.push_str("        }\n");
    code.push_str("    };\n\n");

    code.push_str("    @Override\n");
    code.push_str("    public void onCreate() {\n");
    code.push_str("        super.onCreate();\n");
    code.push_str(&format!("        {native}.setListener(this);\n"));
    code.push_str(&format!(
        "        if (!{native}.init(\"local\", \"{}\", \"{iface}Service\")) {{\n",
        default_instance(ctx)
    ));
    code.push_str(&format!(
        "            Log.e(TAG, \"failed to build the {iface} proxy\");\n"
    ));
    code.push_str("            return;\n");
    code.push_str("        }\n");
    for entry in entries(members).filter(|e| !e.exposed) {
        code.push_str(&format!("        {native}.{}();\n", entry.name));
    }
    code.push_str("    }\n\n");

    code.push_str("    @Override\n");
    code.push_str("    public IBinder onBind(Intent intent) {\n");
    code.push_str("        return binder;\n");
    code.push_str("    }\n\n");

    code.push_str("    @Override\n");
    code.push_str("    public void onDestroy() {\n");
    code.push_str("        callbacks.kill();\n");
    code.push_str(&format!("        {native}.setListener(null);\n"));
    code.push_str("        super.onDestroy();\n");
    code.push_str("    }\n");

    for callback in callbacks(members) {
        let args: Vec<&str> = callback.params.iter().map(|p| p.name.as_str()).collect();
        code.push_str("\n    @Override\n");
        code.push_str(&format!(
            "    public void {}({}) {{\n",
            callback.name,
            param_list(&callback.params)
        ));
        code.push_str("        int count = callbacks.beginBroadcast();\n");
        code.push_str("        try {\n");
        code.push_str("            for (int i = 0; i < count; i++) {\n");
        code.push_str("                try {\n");
        code.push_str(&format!(
            "                    callbacks.getBroadcastItem(i).{}({});\n",
            callback.name,
            args.join(", ")
        ));
        code.push_str("                } catch (RemoteException e) {\n");
        code.push_str(&format!(
            "                    Log.w(TAG, \"{} delivery failed\", e);\n",
            callback.name
        ));
        code.push_str("                }\n");
        code.push_str("            }\n");
        code.push_str("        } finally {\n");
        code.push_str("            callbacks.finishBroadcast();\n");
        code.push_str("        }\n");
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    code
}
