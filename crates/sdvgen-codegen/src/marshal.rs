//! Marshaling engine: converts values between CommonAPI C++ and JNI.
//!
//! Three paths share one engine:
//!
//! - [`Direction::Read`]: native value to managed value (getters, callbacks)
//! - [`Direction::PreCall`]: managed argument to native value before a call
//! - [`Direction::PostCall`]: native response to managed value after a call
//!
//! Every variable the engine introduces is derived from the destination name
//! of the value being converted, so siblings never collide. Loop indices are
//! named after the nesting depth (`i_0`, `i_1`, ...), which keeps nested
//! loops distinct without tracking state.

use crate::emit::Fragment;
use crate::error::{CodegenError, CodegenResult};
use crate::jvm_types::{JvmType, entry_class, map_shape, needs_element_copy, primitive_kind};
use crate::naming::{capitalize, class_path, java_identifier};
use crate::native_types::native_type;
use sdvgen_core::{FieldDecl, Interface, Primitive, StructDecl, TypeRef, TypeShape};
use tracing::trace;

/// Which way a value crosses the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    PreCall,
    PostCall,
}

/// Loop index for nesting depth `depth`
pub fn loop_var(depth: usize) -> String {
    format!("i_{depth}")
}

/// Marshaling context for one member.
pub struct Marshaller<'a> {
    interface: &'a Interface,
    package: &'a str,
    member: &'a str,
}

impl<'a> Marshaller<'a> {
    pub fn new(interface: &'a Interface, package: &'a str, member: &'a str) -> Self {
        Self {
            interface,
            package,
            member,
        }
    }

    /// Convert `src` to `dst` along `direction`.
    ///
    /// `Read` and `PostCall` declare a managed local `dst` from the native
    /// expression `src`; `PreCall` declares a native local `dst` from the
    /// managed expression `src`. Returns the managed type of the value.
    pub fn emit(
        &self,
        direction: Direction,
        fragment: &mut Fragment,
        src: &str,
        ty: &TypeRef,
        dst: &str,
    ) -> CodegenResult<JvmType> {
        trace!(member = self.member, ?direction, ty = %ty.display(), dst, "marshal");
        match direction {
            Direction::Read | Direction::PostCall => self.read(fragment, src, ty, dst, dst, 0),
            Direction::PreCall => {
                self.write(fragment, src, ty, dst, dst, 0)?;
                self.managed_type(ty, dst)
            }
        }
    }

    /// Supported shape of `ty`, or the error naming `field`.
    pub fn shape(&self, ty: &TypeRef, field: &str) -> CodegenResult<TypeShape> {
        match ty.shape(self.interface) {
            TypeShape::Unsupported => Err(self.unsupported(ty, field)),
            shape => Ok(shape),
        }
    }

    fn unsupported(&self, ty: &TypeRef, field: &str) -> CodegenError {
        CodegenError::Unsupported {
            member: self.member.to_string(),
            field: field.to_string(),
            type_name: ty.display(),
        }
    }

    pub fn managed_type(&self, ty: &TypeRef, field: &str) -> CodegenResult<JvmType> {
        let shape = self.shape(ty, field)?;
        self.managed_for(&shape, ty, field)
    }

    pub fn native_type(&self, ty: &TypeRef, field: &str) -> CodegenResult<String> {
        let shape = self.shape(ty, field)?;
        Ok(native_type(&shape, ty, self.interface))
    }

    /// Managed types of a struct's fields, in declaration order
    pub fn field_types(&self, decl: &StructDecl) -> CodegenResult<Vec<JvmType>> {
        decl.fields
            .iter()
            .map(|f| self.managed_type(&f.ty, &format!("{}.{}", decl.name, f.name)))
            .collect()
    }

    fn managed_for(&self, shape: &TypeShape, ty: &TypeRef, field: &str) -> CodegenResult<JvmType> {
        map_shape(shape, &ty.name, self.package).ok_or_else(|| self.unsupported(ty, field))
    }

    fn find_struct(&self, ty: &TypeRef) -> CodegenResult<&'a StructDecl> {
        self.interface
            .find_struct(ty)
            .ok_or_else(|| CodegenError::MissingDefinition {
                member: self.member.to_string(),
                type_name: ty.display(),
            })
    }

    fn class_decl(&self, fragment: &mut Fragment, class: &str) -> String {
        let var = format!("cls_{class}");
        fragment.decl(format!(
            "jclass {var} = findClass(env, \"{}\");",
            class_path(self.package, class)
        ));
        var
    }

    fn string_class_decl(fragment: &mut Fragment) -> &'static str {
        fragment.decl("jclass cls_String = findClass(env, \"java/lang/String\");");
        "cls_String"
    }

    fn constructor_decl(fragment: &mut Fragment, class: &str, descriptor: &str) -> String {
        let var = format!("ctor_{class}");
        fragment.decl(format!(
            "jmethodID {var} = env->GetMethodID(cls_{class}, \"<init>\", \"{descriptor}\");"
        ));
        var
    }

    // ------------------------------------------------------------------
    // Native to managed
    // ------------------------------------------------------------------

    fn read(
        &self,
        fragment: &mut Fragment,
        src: &str,
        ty: &TypeRef,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<JvmType> {
        let shape = self.shape(ty, field)?;
        let managed = self.managed_for(&shape, ty, field)?;
        match &shape {
            TypeShape::Primitive(_) => {
                fragment.line(format!("{jt} {dst} = static_cast<{jt}>({src});", jt = managed.jni));
            }
            TypeShape::StringT => {
                fragment.line(format!("jstring {dst} = env->NewStringUTF({src}.c_str());"));
            }
            TypeShape::Enumeration { .. } => {
                fragment.line(format!("jbyte {dst} = static_cast<jbyte>({src}.value_);"));
            }
            TypeShape::ExplicitArray { element, .. } | TypeShape::ImplicitArray { element } => {
                self.read_primitive_array(fragment, src, *element, dst, depth);
            }
            TypeShape::Struct { .. } => {
                self.read_struct(fragment, src, ty, dst, field, depth)?;
            }
            TypeShape::ComplexArray { element, .. } => {
                self.read_struct_array(fragment, src, element, dst, field, depth)?;
            }
            TypeShape::Map { key, value } => {
                self.read_map(fragment, src, &ty.name, key, value, dst, field, depth)?;
            }
            TypeShape::Unsupported => return Err(self.unsupported(ty, field)),
        }
        Ok(managed)
    }

    fn read_primitive_array(&self, fragment: &mut Fragment, src: &str, element: Primitive, dst: &str, depth: usize) {
        fragment.line(format!("const auto& {dst}_n = {src};"));
        if element == Primitive::String {
            let cls = Self::string_class_decl(fragment);
            let i = loop_var(depth);
            fragment.line(format!(
                "jobjectArray {dst} = env->NewObjectArray(static_cast<jsize>({dst}_n.size()), {cls}, nullptr);"
            ));
            fragment.open(format!("for (size_t {i} = 0; {i} < {dst}_n.size(); ++{i}) {{"));
            fragment.line(format!("jstring {dst}_e = env->NewStringUTF({dst}_n[{i}].c_str());"));
            fragment.line(format!("env->SetObjectArrayElement({dst}, static_cast<jsize>({i}), {dst}_e);"));
            fragment.line(format!("env->DeleteLocalRef({dst}_e);"));
            fragment.close();
            return;
        }

        let kind = primitive_kind(element);
        let (jt, array, name) = (kind.jni_type(), kind.array_type(), kind.jni_name());
        if needs_element_copy(element) {
            fragment.line(format!("std::vector<{jt}> {dst}_buf({dst}_n.begin(), {dst}_n.end());"));
            fragment.line(format!(
                "{array} {dst} = env->New{name}Array(static_cast<jsize>({dst}_buf.size()));"
            ));
            fragment.line(format!(
                "env->Set{name}ArrayRegion({dst}, 0, static_cast<jsize>({dst}_buf.size()), {dst}_buf.data());"
            ));
        } else {
            fragment.line(format!(
                "{array} {dst} = env->New{name}Array(static_cast<jsize>({dst}_n.size()));"
            ));
            fragment.line(format!(
                "env->Set{name}ArrayRegion({dst}, 0, static_cast<jsize>({dst}_n.size()), reinterpret_cast<const {jt}*>({dst}_n.data()));"
            ));
        }
    }

    fn read_struct(
        &self,
        fragment: &mut Fragment,
        src: &str,
        ty: &TypeRef,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let decl = self.find_struct(ty)?;
        let cls = self.class_decl(fragment, &decl.name);
        fragment.line(format!("const auto& {dst}_n = {src};"));

        let mut args = Vec::with_capacity(decl.fields.len());
        let mut types = Vec::with_capacity(decl.fields.len());
        for f in &decl.fields {
            let value = format!("{dst}_f_{}", f.name);
            let getter = format!("{dst}_n.get{}()", capitalize(&f.name));
            let managed = self.read(fragment, &getter, &f.ty, &value, &format!("{field}.{}", f.name), depth)?;
            args.push(value);
            types.push(managed);
        }

        let ctor = Self::constructor_decl(fragment, &decl.name, &crate::jvm_types::constructor_descriptor(&types));
        let mut call = format!("jobject {dst} = env->NewObject({cls}, {ctor}");
        for arg in &args {
            call.push_str(", ");
            call.push_str(arg);
        }
        call.push_str(");");
        fragment.line(call);
        release_locals(fragment, args.iter().zip(&types));
        Ok(())
    }

    fn read_struct_array(
        &self,
        fragment: &mut Fragment,
        src: &str,
        element: &TypeRef,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let decl = self.find_struct(element)?;
        let cls = self.class_decl(fragment, &decl.name);
        let i = loop_var(depth);
        fragment.line(format!("const auto& {dst}_n = {src};"));
        fragment.line(format!(
            "jobjectArray {dst} = env->NewObjectArray(static_cast<jsize>({dst}_n.size()), {cls}, nullptr);"
        ));
        fragment.open(format!("for (size_t {i} = 0; {i} < {dst}_n.size(); ++{i}) {{"));
        self.read(fragment, &format!("{dst}_n[{i}]"), element, &format!("{dst}_e"), field, depth + 1)?;
        fragment.line(format!("env->SetObjectArrayElement({dst}, static_cast<jsize>({i}), {dst}_e);"));
        fragment.line(format!("env->DeleteLocalRef({dst}_e);"));
        fragment.close();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn read_map(
        &self,
        fragment: &mut Fragment,
        src: &str,
        map: &str,
        key: &TypeRef,
        value: &TypeRef,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let entry = entry_class(map);
        let cls = self.class_decl(fragment, &entry);
        let (i, it) = (loop_var(depth), format!("it_{depth}"));
        fragment.line(format!("const auto& {dst}_n = {src};"));
        fragment.line(format!(
            "jobjectArray {dst} = env->NewObjectArray(static_cast<jsize>({dst}_n.size()), {cls}, nullptr);"
        ));
        fragment.open(format!(
            "for (auto [{it}, {i}] = std::make_pair({dst}_n.cbegin(), jsize{{0}}); {it} != {dst}_n.cend(); ++{it}, ++{i}) {{"
        ));
        let (k, v) = (format!("{dst}_k"), format!("{dst}_v"));
        let key_type = self.read(fragment, &format!("{it}->first"), key, &k, &format!("{field}.key"), depth + 1)?;
        let value_type = self.read(fragment, &format!("{it}->second"), value, &v, &format!("{field}.value"), depth + 1)?;
        let ctor = Self::constructor_decl(
            fragment,
            &entry,
            &crate::jvm_types::constructor_descriptor([&key_type, &value_type]),
        );
        fragment.line(format!("jobject {dst}_e = env->NewObject({cls}, {ctor}, {k}, {v});"));
        fragment.line(format!("env->SetObjectArrayElement({dst}, {i}, {dst}_e);"));
        release_locals(fragment, [(&k, &key_type), (&v, &value_type)]);
        fragment.line(format!("env->DeleteLocalRef({dst}_e);"));
        fragment.close();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Managed to native
    // ------------------------------------------------------------------

    fn write(
        &self,
        fragment: &mut Fragment,
        src: &str,
        ty: &TypeRef,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<String> {
        let shape = self.shape(ty, field)?;
        let native = native_type(&shape, ty, self.interface);
        match &shape {
            TypeShape::Primitive(_) => {
                fragment.line(format!("{native} {dst} = static_cast<{native}>({src});"));
            }
            TypeShape::StringT => {
                fragment.line(format!("std::string {dst} = toStdString(env, static_cast<jstring>({src}));"));
            }
            TypeShape::Enumeration { .. } => {
                fragment.line(format!("{native} {dst} = static_cast<{native}::Literal>({src});"));
            }
            TypeShape::ExplicitArray { element, .. } | TypeShape::ImplicitArray { element } => {
                self.write_primitive_array(fragment, src, *element, &native, dst, depth);
            }
            TypeShape::Struct { .. } => {
                self.write_struct(fragment, src, ty, &native, dst, field, depth)?;
            }
            TypeShape::ComplexArray { element, .. } => {
                self.write_struct_array(fragment, src, element, &native, dst, field, depth)?;
            }
            TypeShape::Map { key, value } => {
                self.write_map(fragment, src, &ty.name, key, value, &native, dst, field, depth)?;
            }
            TypeShape::Unsupported => return Err(self.unsupported(ty, field)),
        }
        Ok(native)
    }

    fn array_length(fragment: &mut Fragment, src: &str, array: &str, dst: &str) {
        fragment.line(format!("{array} {dst}_a = static_cast<{array}>({src});"));
        fragment.line(format!(
            "jsize {dst}_len = {dst}_a != nullptr ? env->GetArrayLength({dst}_a) : 0;"
        ));
    }

    fn write_primitive_array(
        &self,
        fragment: &mut Fragment,
        src: &str,
        element: Primitive,
        native: &str,
        dst: &str,
        depth: usize,
    ) {
        if element == Primitive::String {
            let i = loop_var(depth);
            Self::array_length(fragment, src, "jobjectArray", dst);
            fragment.line(format!("{native} {dst};"));
            fragment.line(format!("{dst}.reserve(static_cast<size_t>({dst}_len));"));
            fragment.open(format!("for (jsize {i} = 0; {i} < {dst}_len; ++{i}) {{"));
            fragment.line(format!(
                "auto {dst}_j = static_cast<jstring>(env->GetObjectArrayElement({dst}_a, {i}));"
            ));
            fragment.line(format!("{dst}.push_back(toStdString(env, {dst}_j));"));
            fragment.line(format!("env->DeleteLocalRef({dst}_j);"));
            fragment.close();
            return;
        }

        let kind = primitive_kind(element);
        let (jt, name) = (kind.jni_type(), kind.jni_name());
        Self::array_length(fragment, src, kind.array_type(), dst);
        if needs_element_copy(element) {
            fragment.line(format!("std::vector<{jt}> {dst}_buf(static_cast<size_t>({dst}_len));"));
            fragment.open(format!("if ({dst}_len > 0) {{"));
            fragment.line(format!("env->Get{name}ArrayRegion({dst}_a, 0, {dst}_len, {dst}_buf.data());"));
            fragment.close();
            fragment.line(format!("{native} {dst}({dst}_buf.begin(), {dst}_buf.end());"));
        } else {
            fragment.line(format!("{native} {dst}(static_cast<size_t>({dst}_len));"));
            fragment.open(format!("if ({dst}_len > 0) {{"));
            fragment.line(format!(
                "env->Get{name}ArrayRegion({dst}_a, 0, {dst}_len, reinterpret_cast<{jt}*>({dst}.data()));"
            ));
            fragment.close();
        }
    }

    /// Read field `f` of managed object `object` (an instance of `class`) and
    /// convert it to the native local `dst`.
    #[allow(clippy::too_many_arguments)]
    fn write_field(
        &self,
        fragment: &mut Fragment,
        object: &str,
        class: &str,
        f: &FieldDecl,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let managed = self.managed_type(&f.ty, field)?;
        let java_name = java_identifier(&f.name);
        let fid = format!("fid_{class}_{java_name}");
        fragment.decl(format!(
            "jfieldID {fid} = env->GetFieldID(cls_{class}, \"{java_name}\", \"{}\");",
            managed.descriptor
        ));
        let raw = format!("{dst}_raw");
        fragment.line(format!(
            "{} {raw} = env->Get{}Field({object}, {fid});",
            managed.kind.jni_type(),
            managed.kind.jni_name()
        ));
        self.write(fragment, &raw, &f.ty, dst, field, depth)?;
        if !managed.is_primitive {
            fragment.line(format!("env->DeleteLocalRef({raw});"));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_struct(
        &self,
        fragment: &mut Fragment,
        src: &str,
        ty: &TypeRef,
        native: &str,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let decl = self.find_struct(ty)?;
        self.class_decl(fragment, &decl.name);
        let mut args = Vec::with_capacity(decl.fields.len());
        for f in &decl.fields {
            let value = format!("{dst}_f_{}", f.name);
            self.write_field(fragment, src, &decl.name, f, &value, &format!("{field}.{}", f.name), depth)?;
            args.push(value);
        }
        if args.is_empty() {
            fragment.line(format!("{native} {dst};"));
        } else {
            fragment.line(format!("{native} {dst}({});", args.join(", ")));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_struct_array(
        &self,
        fragment: &mut Fragment,
        src: &str,
        element: &TypeRef,
        native: &str,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let i = loop_var(depth);
        Self::array_length(fragment, src, "jobjectArray", dst);
        fragment.line(format!("{native} {dst};"));
        fragment.line(format!("{dst}.reserve(static_cast<size_t>({dst}_len));"));
        fragment.open(format!("for (jsize {i} = 0; {i} < {dst}_len; ++{i}) {{"));
        fragment.line(format!("jobject {dst}_j = env->GetObjectArrayElement({dst}_a, {i});"));
        self.write(fragment, &format!("{dst}_j"), element, &format!("{dst}_e"), field, depth + 1)?;
        fragment.line(format!("{dst}.push_back({dst}_e);"));
        fragment.line(format!("env->DeleteLocalRef({dst}_j);"));
        fragment.close();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_map(
        &self,
        fragment: &mut Fragment,
        src: &str,
        map: &str,
        key: &TypeRef,
        value: &TypeRef,
        native: &str,
        dst: &str,
        field: &str,
        depth: usize,
    ) -> CodegenResult<()> {
        let entry = entry_class(map);
        self.class_decl(fragment, &entry);
        let i = loop_var(depth);
        Self::array_length(fragment, src, "jobjectArray", dst);
        fragment.line(format!("{native} {dst};"));
        fragment.open(format!("for (jsize {i} = 0; {i} < {dst}_len; ++{i}) {{"));
        let object = format!("{dst}_j");
        fragment.line(format!("jobject {object} = env->GetObjectArrayElement({dst}_a, {i});"));
        let (k, v) = (format!("{dst}_k"), format!("{dst}_v"));
        let key_field = FieldDecl::new("key", key.clone());
        let value_field = FieldDecl::new("value", value.clone());
        self.write_field(fragment, &object, &entry, &key_field, &k, &format!("{field}.key"), depth + 1)?;
        self.write_field(fragment, &object, &entry, &value_field, &v, &format!("{field}.value"), depth + 1)?;
        fragment.line(format!("{dst}.emplace({k}, {v});"));
        fragment.line(format!("env->DeleteLocalRef({object});"));
        fragment.close();
        Ok(())
    }
}

fn release_locals<'t>(fragment: &mut Fragment, values: impl IntoIterator<Item = (&'t String, &'t JvmType)>) {
    for (name, ty) in values {
        if !ty.is_primitive {
            fragment.line(format!("env->DeleteLocalRef({name});"));
        }
    }
}
