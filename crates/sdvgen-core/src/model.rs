//! Interface model: the resolved, language-neutral view of one service interface.

use crate::primitive::{BYTE_BUFFER, Primitive, escape_name, idl_type_name};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Where a composite type lives relative to the interface using it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scope {
    Local,
    External,
}

/// Namespace owning a composite definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Owner {
    Interface,
    TypeCollection(String),
}

/// Classifier output: exactly one shape per type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Primitive(Primitive),
    StringT,
    ExplicitArray { scope: Scope, element: Primitive },
    ImplicitArray { element: Primitive },
    Struct { scope: Scope },
    Enumeration { backing: Primitive },
    /// Array whose element is a struct; `element` names that struct.
    ComplexArray {
        scope: Scope,
        element_is_implicit: bool,
        element: Box<TypeRef>,
    },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Unsupported,
}

impl TypeShape {
    pub fn is_supported(&self) -> bool {
        !matches!(self, TypeShape::Unsupported)
    }

    /// Short tag used in logs and error messages
    pub fn tag(&self) -> &'static str {
        match self {
            TypeShape::Primitive(_) => "primitive",
            TypeShape::StringT => "string",
            TypeShape::ExplicitArray { .. } => "explicit array",
            TypeShape::ImplicitArray { .. } => "implicit array",
            TypeShape::Struct { .. } => "struct",
            TypeShape::Enumeration { .. } => "enumeration",
            TypeShape::ComplexArray { .. } => "complex array",
            TypeShape::Map { .. } => "map",
            TypeShape::Unsupported => "unsupported",
        }
    }
}

/// A possibly-qualified type name plus a lazily computed shape.
///
/// Anonymous (inline) arrays carry their element in `element`. The shape cache
/// only ever holds a supported shape, so a reference classified before its
/// definition was resolved is classified again later.
#[derive(Debug, Clone, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<TypeRef>>,
    #[serde(skip)]
    shape: OnceCell<TypeShape>,
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.qualifier == other.qualifier
            && self.element == other.element
    }
}

impl Eq for TypeRef {}

impl TypeRef {
    /// Parse a written type name: `Foo`, `Collection.Foo`, `UInt8[]`, or the
    /// `ByteBuffer` sentinel.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = text.strip_suffix("[]") {
            return Self::implicit_array(Self::parse(inner));
        }
        if text == BYTE_BUFFER {
            return Self::implicit_array(Self::primitive(Primitive::UInt8));
        }
        match text.rsplit_once('.') {
            Some((qualifier, name)) => Self {
                name: name.to_string(),
                qualifier: Some(qualifier.to_string()),
                element: None,
                shape: OnceCell::new(),
            },
            None => Self::named(text),
        }
    }

    /// Build from the last segment of an ARXML reference path, converting C
    /// spellings and escaping reserved words.
    pub fn from_reference(segment: &str) -> Self {
        let name = idl_type_name(segment);
        if name == BYTE_BUFFER || Primitive::from_name(name).is_some() {
            return Self::parse(name);
        }
        Self::named(escape_name(name))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            element: None,
            shape: OnceCell::new(),
        }
    }

    pub fn primitive(kind: Primitive) -> Self {
        Self::named(kind.name())
    }

    /// Anonymous array of `element`
    pub fn implicit_array(element: TypeRef) -> Self {
        Self {
            name: format!("{}[]", element.display()),
            qualifier: None,
            element: Some(Box::new(element)),
            shape: OnceCell::new(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.element.is_some()
    }

    /// Name as written in IDL text
    pub fn display(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{qualifier}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Composite name this reference depends on, if any
    pub fn composite_name(&self) -> Option<&str> {
        match &self.element {
            Some(element) => element.composite_name(),
            None if Primitive::from_name(&self.name).is_some() => None,
            None => Some(&self.name),
        }
    }

    /// Shape, classified on first use and cached once supported.
    pub fn shape(&self, interface: &Interface) -> TypeShape {
        if let Some(shape) = self.shape.get() {
            return shape.clone();
        }
        let shape = crate::classify::classify(self, interface);
        if shape.is_supported() {
            let _ = self.shape.set(shape.clone());
        }
        shape
    }

    /// Cached shape without classifying
    pub fn cached_shape(&self) -> Option<&TypeShape> {
        self.shape.get()
    }
}

/// Ordered named value: struct field or method argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDecl {
    pub name: String,
    pub owner: Owner,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayDecl {
    pub name: String,
    pub owner: Owner,
    pub element: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumerator {
    pub label: String,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub owner: Owner,
    pub backing: Primitive,
    pub enumerators: Vec<Enumerator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapDecl {
    pub name: String,
    pub owner: Owner,
    pub key: TypeRef,
    pub value: TypeRef,
}

/// Getter or setter deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Accessor {
    pub id: u16,
    pub reliable: bool,
}

/// Notifier deployment; `id` already carries the event offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notifier {
    pub id: u16,
    pub reliable: bool,
    pub event_groups: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDecl {
    pub name: String,
    pub ty: TypeRef,
    pub readable: bool,
    pub writable: bool,
    pub notifiable: bool,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub notifier: Option<Notifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDecl {
    pub name: String,
    pub in_args: Vec<FieldDecl>,
    pub out_args: Vec<FieldDecl>,
    pub fire_and_forget: bool,
    pub id: u16,
    pub reliable: bool,
}

/// Broadcast; `id` already carries the event offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDecl {
    pub name: String,
    pub ty: TypeRef,
    pub id: u16,
    pub reliable: bool,
    pub event_groups: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvidedInstance {
    pub name: String,
    pub instance_id: u16,
    pub reliable_port: Option<u16>,
    pub unreliable_port: Option<u16>,
}

/// One service interface with its resolved composite types and deployment.
///
/// Deployment values (`service_id`, `version`, member ids) are zero until the
/// deployment merge has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub name: String,
    pub package: Vec<String>,
    pub version: Version,
    pub service_id: u16,
    pub attributes: Vec<AttributeDecl>,
    pub methods: Vec<MethodDecl>,
    pub events: Vec<EventDecl>,
    pub structs: Vec<StructDecl>,
    pub arrays: Vec<ArrayDecl>,
    pub enumerations: Vec<EnumDecl>,
    pub maps: Vec<MapDecl>,
    /// Names defined as plain primitives or strings; never become decls.
    pub aliases: BTreeMap<String, Primitive>,
    pub imports: BTreeSet<String>,
    pub references: BTreeSet<String>,
    pub instances: Vec<ProvidedInstance>,
}

impl Interface {
    pub fn new(name: impl Into<String>, package: Vec<String>) -> Self {
        Self {
            name: name.into(),
            package,
            version: Version::default(),
            service_id: 0,
            attributes: Vec::new(),
            methods: Vec::new(),
            events: Vec::new(),
            structs: Vec::new(),
            arrays: Vec::new(),
            enumerations: Vec::new(),
            maps: Vec::new(),
            aliases: BTreeMap::new(),
            imports: BTreeSet::new(),
            references: BTreeSet::new(),
            instances: Vec::new(),
        }
    }

    /// Dotted package path
    pub fn package_path(&self) -> String {
        self.package.join(".")
    }

    pub fn find_struct(&self, ty: &TypeRef) -> Option<&StructDecl> {
        self.structs
            .iter()
            .find(|decl| matches_ref(&decl.name, &decl.owner, ty))
    }

    pub fn find_array(&self, ty: &TypeRef) -> Option<&ArrayDecl> {
        self.arrays
            .iter()
            .find(|decl| matches_ref(&decl.name, &decl.owner, ty))
    }

    pub fn find_enum(&self, ty: &TypeRef) -> Option<&EnumDecl> {
        self.enumerations
            .iter()
            .find(|decl| matches_ref(&decl.name, &decl.owner, ty))
    }

    pub fn find_map(&self, ty: &TypeRef) -> Option<&MapDecl> {
        self.maps
            .iter()
            .find(|decl| matches_ref(&decl.name, &decl.owner, ty))
    }

    /// Owner of the composite definition `ty` names, if any
    pub fn owner_of(&self, ty: &TypeRef) -> Option<&Owner> {
        self.find_struct(ty)
            .map(|d| &d.owner)
            .or_else(|| self.find_array(ty).map(|d| &d.owner))
            .or_else(|| self.find_enum(ty).map(|d| &d.owner))
            .or_else(|| self.find_map(ty).map(|d| &d.owner))
    }

    /// Type collections owning at least one definition, sorted
    pub fn type_collections(&self) -> BTreeSet<String> {
        let owners = self
            .structs
            .iter()
            .map(|d| &d.owner)
            .chain(self.arrays.iter().map(|d| &d.owner))
            .chain(self.enumerations.iter().map(|d| &d.owner))
            .chain(self.maps.iter().map(|d| &d.owner));
        owners
            .filter_map(|owner| match owner {
                Owner::TypeCollection(name) => Some(name.clone()),
                Owner::Interface => None,
            })
            .collect()
    }

    /// Every type reference reachable from members and composite definitions
    pub fn type_refs(&self) -> Vec<&TypeRef> {
        let mut refs: Vec<&TypeRef> = Vec::new();
        refs.extend(self.attributes.iter().map(|a| &a.ty));
        refs.extend(self.events.iter().map(|e| &e.ty));
        for method in &self.methods {
            refs.extend(method.in_args.iter().map(|a| &a.ty));
            refs.extend(method.out_args.iter().map(|a| &a.ty));
        }
        for decl in &self.structs {
            refs.extend(decl.fields.iter().map(|f| &f.ty));
        }
        refs.extend(self.arrays.iter().map(|a| &a.element));
        for map in &self.maps {
            refs.push(&map.key);
            refs.push(&map.value);
        }
        refs
    }

    /// Classify every reachable reference, filling the shape caches
    pub fn warm_shapes(&self) -> usize {
        self.type_refs()
            .into_iter()
            .filter(|ty| ty.shape(self).is_supported())
            .count()
    }
}

/// Scope of a definition owned by `owner` as seen through `ty`
pub fn scope_of(owner: &Owner, ty: &TypeRef) -> Scope {
    match (owner, &ty.qualifier) {
        (Owner::Interface, None) => Scope::Local,
        _ => Scope::External,
    }
}

fn matches_ref(name: &str, owner: &Owner, ty: &TypeRef) -> bool {
    if name != ty.name {
        return false;
    }
    match (&ty.qualifier, owner) {
        (None, _) => true,
        (Some(qualifier), Owner::TypeCollection(collection)) => qualifier == collection,
        (Some(_), Owner::Interface) => false,
    }
}
