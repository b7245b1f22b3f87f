//! Resolved type graph.
//!
//! Types live in an arena ([`TypeRegistry`]) and are addressed by
//! [`TypeId`]. An entry is reserved before its content is resolved, so
//! recursive references see a valid handle while the entry is still being
//! filled; nothing reads an entry's element map until resolution is done.

use crate::diagnostics::Diagnostic;
use crate::error::ResolveError;
use crate::types::QName;
use crate::wsdl::OperationDescriptor;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::ops::{Index, IndexMut};

/// Handle to a [`SchemaType`] in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    /// Returns the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Scalar classification of a simple type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleKind {
    /// Boolean value.
    Boolean,
    /// Decimal number.
    Decimal,
    /// String value.
    String,
    /// One of a fixed set of literals.
    Enum,
    /// Whitespace-separated list of enum literals.
    ListOfEnum,
}

impl SimpleKind {
    /// Returns the lowercase name used in artifacts and override tables.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Enum => "enum",
            Self::ListOfEnum => "list",
        }
    }
}

impl From<crate::types::Primitive> for SimpleKind {
    fn from(primitive: crate::types::Primitive) -> Self {
        match primitive {
            crate::types::Primitive::Boolean => Self::Boolean,
            crate::types::Primitive::Decimal => Self::Decimal,
            crate::types::Primitive::String => Self::String,
        }
    }
}

/// One contained element of a type, or one global element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    /// Referenced type.
    pub type_id: TypeId,
    /// This occurrence may repeat.
    pub is_list: bool,
    /// Serialized name, when it differs from the source name.
    pub serialized_name: Option<String>,
    /// Declared tag, when it differs from the entry's key.
    pub source_name: Option<QName>,
    /// Serialized type hint that cannot be derived from the type.
    pub format_hint: Option<String>,
    /// Value to serialize when the element is absent.
    pub default_value: Option<serde_json::Value>,
}

impl ElementDescriptor {
    /// Creates a descriptor with no overrides.
    #[must_use]
    pub fn new(type_id: TypeId, is_list: bool) -> Self {
        Self {
            type_id,
            is_list,
            serialized_name: None,
            source_name: None,
            format_hint: None,
            default_value: None,
        }
    }

    /// Clones this descriptor for a substitute type.
    ///
    /// List flag, serialized name, hint and default are kept; the type and
    /// source name are replaced.
    #[must_use]
    pub fn substitute(&self, type_id: TypeId, source_name: QName) -> Self {
        Self {
            type_id,
            source_name: Some(source_name),
            ..self.clone()
        }
    }
}

/// Ordered element map keyed by element (or substitute type) name.
pub type ElementMap = IndexMap<String, ElementDescriptor>;

/// A named or synthesized type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaType {
    /// Namespace, `None` for synthesized types.
    pub namespace: Option<String>,
    /// Local or synthesized name.
    pub name: String,
    /// Contained elements in serialization order.
    pub elements: ElementMap,
    /// Attribute name to attribute type.
    pub attributes: IndexMap<String, Option<TypeId>>,
    /// Type cannot appear directly.
    pub is_abstract: bool,
    /// The content model is a collection.
    pub is_list: bool,
    /// Scalar classification, `None` for complex types.
    pub simple_kind: Option<SimpleKind>,
    /// Enum literals in declaration order.
    pub enum_values: Vec<String>,
    /// Item type of a list-of-enum type.
    pub list_item_type: Option<TypeId>,
    /// Type accepts any attribute.
    pub any_attribute: bool,
    /// Attribute carrying the scalar value of a simple type with attributes.
    pub text_attribute: Option<String>,
    /// Serialized type name override.
    pub serialized_name: Option<String>,
    /// Collection wrapper name override.
    pub list_name: Option<String>,
    /// Properties present only in the JSON-like format.
    pub extra_properties: Vec<String>,
}

impl SchemaType {
    /// Creates an empty type.
    #[must_use]
    pub fn new(namespace: Option<&str>, name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.into(),
            is_abstract,
            ..Self::default()
        }
    }

    /// Returns the registry key.
    #[must_use]
    pub fn key(&self) -> String {
        self.qname().to_string()
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.as_deref(), self.name.as_str())
    }

    /// Returns true for simple types.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.simple_kind.is_some()
    }

    /// Fills derived fields once resolution is complete.
    pub fn finish(&mut self) {
        if self.is_simple() && !self.attributes.is_empty() && self.text_attribute.is_none() {
            self.text_attribute = Some("Value".to_string());
        }
    }
}

/// Arena of resolved types, one entry per key.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<SchemaType>,
    index: HashMap<String, TypeId>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type and returns its handle.
    ///
    /// # Errors
    /// Returns `ResolveError::DuplicateType` if the key is taken.
    pub fn reserve(&mut self, schema_type: SchemaType) -> Result<TypeId, ResolveError> {
        let key = schema_type.key();
        if self.index.contains_key(&key) {
            return Err(ResolveError::DuplicateType { name: key });
        }
        let id = TypeId(self.types.len());
        self.types.push(schema_type);
        self.index.insert(key, id);
        Ok(id)
    }

    /// Looks up a type by key.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<TypeId> {
        self.index.get(key).copied()
    }

    /// Returns the type for a handle.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &SchemaType {
        &self.types[id.0]
    }

    /// Returns the type for a handle, mutably.
    pub fn get_mut(&mut self, id: TypeId) -> &mut SchemaType {
        &mut self.types[id.0]
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over handles and types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &SchemaType)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    /// Runs the finishing pass over every type.
    pub fn finish(&mut self) {
        for schema_type in &mut self.types {
            schema_type.finish();
        }
    }
}

impl Index<TypeId> for TypeRegistry {
    type Output = SchemaType;

    fn index(&self, id: TypeId) -> &SchemaType {
        self.get(id)
    }
}

impl IndexMut<TypeId> for TypeRegistry {
    fn index_mut(&mut self, id: TypeId) -> &mut SchemaType {
        self.get_mut(id)
    }
}

/// Fully resolved output of a compilation.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    /// All resolved types.
    pub types: TypeRegistry,
    /// Global elements.
    pub elements: ElementMap,
    /// Operations by lookup name.
    pub operations: IndexMap<String, OperationDescriptor>,
    /// Union of all input header elements.
    pub request_headers: Option<TypeId>,
    /// Union of all output header elements.
    pub response_headers: Option<TypeId>,
    /// Untyped header-only elements left out of `elements`.
    pub skipped_headers: HashSet<String>,
    /// Non-fatal conditions met while building the graph.
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeGraph {
    /// Looks up a type by registry key.
    #[must_use]
    pub fn type_by_key(&self, key: &str) -> Option<&SchemaType> {
        self.types.lookup(key).map(|id| self.types.get(id))
    }

    /// Returns the registry key of a type.
    #[must_use]
    pub fn key_of(&self, id: TypeId) -> String {
        self.types.get(id).key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_and_lookup() {
        let mut registry = TypeRegistry::new();
        let id = registry
            .reserve(SchemaType::new(Some("urn:t"), "FooType", false))
            .unwrap();
        assert_eq!(registry.lookup("{urn:t}FooType"), Some(id));
        assert_eq!(registry[id].name, "FooType");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reserve_duplicate() {
        let mut registry = TypeRegistry::new();
        registry
            .reserve(SchemaType::new(None, "FooAnonType", false))
            .unwrap();
        let result = registry.reserve(SchemaType::new(None, "FooAnonType", false));
        assert!(matches!(result, Err(ResolveError::DuplicateType { .. })));
    }

    #[test]
    fn test_finish_defaults_text_attribute() {
        let mut simple = SchemaType::new(Some("urn:t"), "PhoneType", false);
        simple.simple_kind = Some(SimpleKind::String);
        simple.attributes.insert("Key".to_string(), None);
        simple.finish();
        assert_eq!(simple.text_attribute.as_deref(), Some("Value"));

        let mut complex = SchemaType::new(Some("urn:t"), "ItemType", false);
        complex.attributes.insert("Id".to_string(), None);
        complex.finish();
        assert_eq!(complex.text_attribute, None);
    }

    #[test]
    fn test_substitute_keeps_overrides() {
        let mut registry = TypeRegistry::new();
        let base = registry
            .reserve(SchemaType::new(Some("urn:t"), "BaseType", true))
            .unwrap();
        let concrete = registry
            .reserve(SchemaType::new(Some("urn:t"), "FooType", false))
            .unwrap();

        let mut original = ElementDescriptor::new(base, true);
        original.serialized_name = Some("Items".to_string());

        let source = QName::new(Some("urn:t"), "Item");
        let copy = original.substitute(concrete, source.clone());
        assert_eq!(copy.type_id, concrete);
        assert!(copy.is_list);
        assert_eq!(copy.serialized_name.as_deref(), Some("Items"));
        assert_eq!(copy.source_name, Some(source));
        assert_eq!(original.source_name, None);
    }
}
