//! JVM type mappings for the managed side of the bridge.
//!
//! Every supported [`TypeShape`] maps to exactly one [`JvmType`]. The same
//! mapping feeds the JNI descriptors, the Java declarations, and the AIDL
//! files, so a member's signature cannot drift between them.
//!
//! # Type Mappings
//!
//! | IDL | Java | Descriptor |
//! |-----|------|------------|
//! | `Int8` | `byte` | `B` |
//! | `UInt8` / `Int16` / `UInt16` / `Int32` | `int` | `I` |
//! | `UInt32` / `Int64` / `UInt64` | `long` | `J` |
//! | `Boolean` | `boolean` | `Z` |
//! | `Float` / `Double` | `float` / `double` | `F` / `D` |
//! | `String` | `String` | `Ljava/lang/String;` |
//! | enumeration | `byte` | `B` |
//! | struct `S` | `S` | `Lpkg/S;` |
//! | array of `T` | `T[]` | `[T` |
//! | map `M` | `MEntry[]` | `[Lpkg/MEntry;` |

use crate::naming::class_path;
use sdvgen_core::{Primitive, TypeShape};

/// JNI value category; selects the `Get<Kind>Field` / `New<Kind>Array` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JvmKind {
    Boolean,
    Byte,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl JvmKind {
    /// Name used inside JNI function names (`GetIntField`, `NewLongArray`)
    pub fn jni_name(self) -> &'static str {
        match self {
            JvmKind::Boolean => "Boolean",
            JvmKind::Byte => "Byte",
            JvmKind::Int => "Int",
            JvmKind::Long => "Long",
            JvmKind::Float => "Float",
            JvmKind::Double => "Double",
            JvmKind::Object => "Object",
        }
    }

    /// C type of a scalar of this kind
    pub fn jni_type(self) -> &'static str {
        match self {
            JvmKind::Boolean => "jboolean",
            JvmKind::Byte => "jbyte",
            JvmKind::Int => "jint",
            JvmKind::Long => "jlong",
            JvmKind::Float => "jfloat",
            JvmKind::Double => "jdouble",
            JvmKind::Object => "jobject",
        }
    }

    /// C type of an array of this kind
    pub fn array_type(self) -> &'static str {
        match self {
            JvmKind::Boolean => "jbooleanArray",
            JvmKind::Byte => "jbyteArray",
            JvmKind::Int => "jintArray",
            JvmKind::Long => "jlongArray",
            JvmKind::Float => "jfloatArray",
            JvmKind::Double => "jdoubleArray",
            JvmKind::Object => "jobjectArray",
        }
    }

    fn java_name(self) -> &'static str {
        match self {
            JvmKind::Boolean => "boolean",
            JvmKind::Byte => "byte",
            JvmKind::Int => "int",
            JvmKind::Long => "long",
            JvmKind::Float => "float",
            JvmKind::Double => "double",
            JvmKind::Object => "Object",
        }
    }

    fn descriptor(self) -> &'static str {
        match self {
            JvmKind::Boolean => "Z",
            JvmKind::Byte => "B",
            JvmKind::Int => "I",
            JvmKind::Long => "J",
            JvmKind::Float => "F",
            JvmKind::Double => "D",
            JvmKind::Object => "Ljava/lang/Object;",
        }
    }
}

/// Managed kind carrying a primitive, widened so unsigned values keep their sign.
pub fn primitive_kind(primitive: Primitive) -> JvmKind {
    match primitive {
        Primitive::Int8 => JvmKind::Byte,
        Primitive::UInt8 | Primitive::Int16 | Primitive::UInt16 | Primitive::Int32 => JvmKind::Int,
        Primitive::UInt32 | Primitive::Int64 | Primitive::UInt64 => JvmKind::Long,
        Primitive::Boolean => JvmKind::Boolean,
        Primitive::Float => JvmKind::Float,
        Primitive::Double => JvmKind::Double,
        Primitive::String => JvmKind::Object,
    }
}

/// Whether an array of `primitive` needs an element-wise copy rather than a
/// bulk region transfer, because native and managed element layouts differ.
pub fn needs_element_copy(primitive: Primitive) -> bool {
    primitive.is_unsigned() || matches!(primitive, Primitive::Int16 | Primitive::Boolean)
}

/// A managed type as seen from Java source, JNI descriptors, and C.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmType {
    /// Java source spelling (`int`, `String`, `Point[]`)
    pub java: String,
    /// JNI type descriptor (`I`, `[Lcom/example/Point;`)
    pub descriptor: String,
    /// C parameter and return type (`jint`, `jobjectArray`)
    pub jni: String,
    /// Scalar kind used for field access
    pub kind: JvmKind,
    /// Whether this is a Java primitive (no local reference to release)
    pub is_primitive: bool,
}

impl JvmType {
    /// Create a JVM primitive type.
    pub fn primitive(kind: JvmKind) -> Self {
        Self {
            java: kind.java_name().to_string(),
            descriptor: kind.descriptor().to_string(),
            jni: kind.jni_type().to_string(),
            kind,
            is_primitive: true,
        }
    }

    /// `java.lang.String`
    pub fn string() -> Self {
        Self::reference("String", "Ljava/lang/String;", "jstring")
    }

    /// Generated class `class` in `package`.
    pub fn class(package: &str, class: &str) -> Self {
        Self::reference(class, &format!("L{};", class_path(package, class)), "jobject")
    }

    /// Array whose elements are `element`.
    pub fn array_of(element: &JvmType) -> Self {
        let jni = if element.is_primitive {
            element.kind.array_type()
        } else {
            "jobjectArray"
        };
        Self::reference(&format!("{}[]", element.java), &format!("[{}", element.descriptor), jni)
    }

    fn reference(java: &str, descriptor: &str, jni: &str) -> Self {
        Self {
            java: java.to_string(),
            descriptor: descriptor.to_string(),
            jni: jni.to_string(),
            kind: JvmKind::Object,
            is_primitive: false,
        }
    }

    /// Whether this is a Java array
    pub fn is_array(&self) -> bool {
        self.descriptor.starts_with('[')
    }
}

/// Managed type for a single primitive or string element.
pub fn map_primitive(primitive: Primitive) -> JvmType {
    match primitive {
        Primitive::String => JvmType::string(),
        other => JvmType::primitive(primitive_kind(other)),
    }
}

/// Map a classified shape to its managed type.
///
/// `name` is the written name of the reference; it names the generated class
/// for structs and, with an `Entry` suffix, for maps. Returns `None` for
/// [`TypeShape::Unsupported`].
pub fn map_shape(shape: &TypeShape, name: &str, package: &str) -> Option<JvmType> {
    let mapped = match shape {
        TypeShape::Primitive(primitive) => map_primitive(*primitive),
        TypeShape::StringT => JvmType::string(),
        TypeShape::Enumeration { .. } => JvmType::primitive(JvmKind::Byte),
        TypeShape::ExplicitArray { element, .. } | TypeShape::ImplicitArray { element } => {
            JvmType::array_of(&map_primitive(*element))
        }
        TypeShape::Struct { .. } => JvmType::class(package, name),
        TypeShape::ComplexArray { element, .. } => JvmType::array_of(&JvmType::class(package, &element.name)),
        TypeShape::Map { .. } => JvmType::array_of(&JvmType::class(package, &entry_class(name))),
        TypeShape::Unsupported => return None,
    };
    Some(mapped)
}

/// Class carrying one key/value pair of map `map`
pub fn entry_class(map: &str) -> String {
    format!("{map}Entry")
}

/// Descriptor of a constructor taking `params` in order.
pub fn constructor_descriptor<'a>(params: impl IntoIterator<Item = &'a JvmType>) -> String {
    let mut descriptor = String::from("(");
    for param in params {
        descriptor.push_str(&param.descriptor);
    }
    descriptor.push_str(")V");
    descriptor
}

/// Descriptor of a method taking `params` and returning `ret` (`None` is void).
pub fn method_descriptor<'a>(params: impl IntoIterator<Item = &'a JvmType>, ret: Option<&JvmType>) -> String {
    let mut descriptor = String::from("(");
    for param in params {
        descriptor.push_str(&param.descriptor);
    }
    descriptor.push(')');
    descriptor.push_str(ret.map_or("V", |r| r.descriptor.as_str()));
    descriptor
}
