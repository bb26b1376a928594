//! sdvgen-core - Interface model construction from AUTOSAR ARXML
//!
//! This crate turns ARXML service interfaces into a resolved, deployed
//! [`Interface`] model:
//! - [`TreeNode`] / [`parse_xml`] expose the document as an owned labeled tree
//! - [`classify`] maps a [`TypeRef`] to exactly one [`TypeShape`]
//! - [`Resolver`] closes the composite type graph by fixpoint iteration
//! - [`build_interface`] merges members, types, and SOME/IP deployment
//! - [`build_document`] isolates failures per interface

mod batch;
mod builder;
mod classify;
mod definition;
mod deployment;
mod error;
mod model;
mod primitive;
mod resolve;
mod tree;

pub use batch::{BatchReport, InterfaceFailure, build_document, build_document_str};
pub use builder::{BuildOptions, INTERFACE_TAG, build_interface, read_members};
pub use classify::classify;
pub use definition::{DATA_TYPE_TAG, Definition, DefinitionContext, namespace_of, owner_for, parse_definition};
pub use deployment::{EVENT_ID_OFFSET, merge, offset_event_id, provided_instances};
pub use error::{ErrorKind, ModelError, ModelResult};
pub use model::{
    Accessor, ArrayDecl, AttributeDecl, EnumDecl, Enumerator, EventDecl, FieldDecl, Interface, MapDecl,
    MethodDecl, Notifier, Owner, ProvidedInstance, Scope, StructDecl, TypeRef, TypeShape, Version, scope_of,
};
pub use primitive::{BYTE_BUFFER, Primitive, RESERVED_NAMES, escape_name, idl_type_name, parse_integer, unescape_name};
pub use resolve::Resolver;
pub use tree::{TreeNode, has_segment, last_segment, parse_xml};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BatchReport, BuildOptions, Interface, ModelError, ModelResult, Primitive, Scope, TypeRef, TypeShape,
    };
}
