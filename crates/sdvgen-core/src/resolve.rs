//! Transitive closure of composite type references.

use crate::definition::{DATA_TYPE_TAG, Definition, DefinitionContext, parse_definition};
use crate::error::{ModelError, ModelResult};
use crate::model::{Interface, TypeRef};
use crate::primitive::escape_name;
use crate::tree::TreeNode;
use std::collections::BTreeSet;
use tracing::debug;

/// Owns the `imports`/`references` working sets while an interface resolves.
///
/// `references` accumulates every composite name some member or definition
/// needs; `imports` holds the names already routed into the interface. The
/// interface is closed once `references ⊆ imports`.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    namespace: Vec<String>,
    imports: BTreeSet<String>,
    references: BTreeSet<String>,
    passes: usize,
}

impl Resolver {
    /// Start resolving for an interface declared in `namespace`
    pub fn new(namespace: Vec<String>) -> Self {
        Self {
            namespace,
            ..Self::default()
        }
    }

    /// Continue from the sets stored on an already resolved interface
    pub fn resume(interface: &Interface, namespace: Vec<String>) -> Self {
        Self {
            namespace,
            imports: interface.imports.clone(),
            references: interface.references.clone(),
            passes: 0,
        }
    }

    /// Record the composite name `ty` depends on, if any.
    pub fn require(&mut self, ty: &TypeRef, interface: &Interface) {
        if let Some(name) = ty.composite_name()
            && !interface.aliases.contains_key(name)
        {
            self.references.insert(name.to_string());
        }
    }

    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    pub fn references(&self) -> &BTreeSet<String> {
        &self.references
    }

    /// Number of document scans performed so far
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn is_closed(&self) -> bool {
        self.references.is_subset(&self.imports)
    }

    /// Referenced names not yet imported
    pub fn missing(&self) -> Vec<String> {
        self.references.difference(&self.imports).cloned().collect()
    }

    /// Scan every definition in `document` once, routing each one that is
    /// referenced but not yet imported. Returns whether anything was routed.
    pub fn resolve_once(&mut self, document: &TreeNode, interface: &mut Interface) -> ModelResult<bool> {
        self.passes += 1;
        let interface_name = interface.name.clone();
        let namespace = self.namespace.clone();
        let ctx = DefinitionContext {
            interface: &interface_name,
            namespace: &namespace,
        };
        let mut routed = 0usize;

        for node in document.find_all(DATA_TYPE_TAG) {
            let Some(raw_name) = node.short_name() else {
                continue;
            };
            let name = escape_name(raw_name);
            if !self.references.contains(&name) || self.imports.contains(&name) {
                continue;
            }
            if let Some(definition) = parse_definition(node, document, &ctx)? {
                self.route(definition, interface);
                routed += 1;
            }
        }

        debug!(
            interface = %interface_name,
            pass = self.passes,
            routed,
            missing = self.missing().len(),
            "resolution pass"
        );
        Ok(routed > 0)
    }

    /// Repeat [`Resolver::resolve_once`] until closed, failing when a pass
    /// makes no progress.
    pub fn run(&mut self, document: &TreeNode, interface: &mut Interface) -> ModelResult<()> {
        while !self.is_closed() {
            if !self.resolve_once(document, interface)? {
                return Err(ModelError::UnresolvableReference {
                    interface: interface.name.clone(),
                    names: self.missing(),
                });
            }
        }
        Ok(())
    }

    /// Store the final sets on the interface
    pub fn finish(self, interface: &mut Interface) {
        interface.imports = self.imports;
        interface.references = self.references;
    }

    fn route(&mut self, definition: Definition, interface: &mut Interface) {
        if let Definition::Alias { name, target } = definition {
            self.references.remove(&name);
            interface.aliases.insert(name, target);
            return;
        }

        for ty in definition.dependencies() {
            self.require(ty, interface);
        }
        self.imports.insert(definition.name().to_string());
        match definition {
            Definition::Struct(decl) => interface.structs.push(decl),
            Definition::Array(decl) => interface.arrays.push(decl),
            Definition::Enumeration(decl) => interface.enumerations.push(decl),
            Definition::Map(decl) => interface.maps.push(decl),
            Definition::Alias { .. } => {}
        }
    }
}
