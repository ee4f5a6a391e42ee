//! Object descriptor table.
//!
//! Maps a type name to its parameter schema, its shape function and a
//! factory. The shape is a pure function of the parsed parameters, so the
//! control side can compute a node's inlet/outlet counts without ever
//! touching its instance.
//!
//! ```
//! use patchbay::{is_valid_object, Registry};
//!
//! assert!(is_valid_object("route"));
//! assert!(!is_valid_object("no-such-thing"));
//!
//! let registry = Registry::new();
//! let route = registry.instantiate("route", "foo bar").unwrap();
//! assert_eq!(route.shape.outlets, 3);
//! ```

use hashbrown::HashMap;

use crate::error::PatchError;
use crate::node::{Object, Shape};
use crate::nodes::BUILTINS;
use crate::params::{parse_args, validate_schema, ParamSpec, Params};

/// Factory function type for creating object instances.
pub type Factory = fn(&Params) -> Box<dyn Object>;

/// Computes inlet/outlet counts from parameters.
pub type ShapeFn = fn(&Params) -> Shape;

/// Describes one object type.
#[derive(Clone, Copy)]
pub struct ObjectDescriptor {
    /// Unique type name, as typed into an object box
    pub name: &'static str,
    /// Brief description for editors
    pub description: &'static str,
    /// Positional parameters
    pub params: &'static [ParamSpec],
    pub shape: ShapeFn,
    pub factory: Factory,
}

impl core::fmt::Debug for ObjectDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A freshly built object, not yet part of any patch.
pub struct Instance {
    pub params: Params,
    pub shape: Shape,
    pub object: Box<dyn Object>,
}

/// Whether `name` is one of the built-in object types.
///
/// Needs no registry or live patch; editors use it for validation and
/// autocompletion.
pub fn is_valid_object(name: &str) -> bool {
    BUILTINS.iter().any(|d| d.name == name)
}

/// Registry of object types available to a patch.
pub struct Registry {
    entries: Vec<ObjectDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with all built-in objects.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for descriptor in BUILTINS {
            if let Err(err) = registry.register(*descriptor) {
                tracing::error!("built-in object rejected: {}", err);
            }
        }
        registry
    }

    /// Registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Adds an object type.
    pub fn register(&mut self, descriptor: ObjectDescriptor) -> Result<(), PatchError> {
        if self.by_name.contains_key(descriptor.name) {
            return Err(PatchError::DuplicateType(descriptor.name.to_string()));
        }
        validate_schema(descriptor.name, descriptor.params)?;

        self.by_name.insert(descriptor.name, self.entries.len());
        self.entries.push(descriptor);
        Ok(())
    }

    pub fn is_valid_type(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&ObjectDescriptor> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// All descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.entries.iter()
    }

    /// Parses `args` only, without building an instance.
    pub fn parse(&self, name: &str, args: &str) -> Result<(Params, Shape), PatchError> {
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| PatchError::UnknownType(name.to_string()))?;
        let params = parse_args(name, descriptor.params, args)?;
        let shape = (descriptor.shape)(&params);
        Ok((params, shape))
    }

    /// Builds an instance of `name` from its argument text.
    pub fn instantiate(&self, name: &str, args: &str) -> Result<Instance, PatchError> {
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| PatchError::UnknownType(name.to_string()))?;
        let params = parse_args(name, descriptor.params, args)?;
        let shape = (descriptor.shape)(&params);
        let object = (descriptor.factory)(&params);
        Ok(Instance { params, shape, object })
    }
}
