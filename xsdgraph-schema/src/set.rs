//! Linked collection of schema documents.

use crate::builtins::builtin_types;
use crate::error::{ParseError, SchemaError};
use crate::parser::SchemaDocument;
use crate::types::{
    AttributeDecl, AttributeGroupDef, ElementDecl, ModelGroupDef, QName, TypeDef, TypeRef,
};
use crate::validation::validate_references;
use indexmap::IndexMap;

/// Declaration order of one loaded document.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    /// `targetNamespace` of the document.
    pub target_namespace: Option<String>,
    /// Global elements in declaration order.
    pub elements: Vec<QName>,
    /// Named types in declaration order.
    pub types: Vec<QName>,
}

/// All global declarations of a set of documents, keyed by qualified name.
///
/// Documents are added in order and then linked once. Lookups never fail
/// for names that passed linking.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    documents: Vec<DocumentIndex>,
    types: IndexMap<QName, TypeDef>,
    builtins: IndexMap<QName, TypeDef>,
    elements: IndexMap<QName, ElementDecl>,
    attributes: IndexMap<QName, AttributeDecl>,
    attribute_groups: IndexMap<QName, AttributeGroupDef>,
    groups: IndexMap<QName, ModelGroupDef>,
    substitution_groups: IndexMap<QName, Vec<QName>>,
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaSet {
    /// Creates an empty set that knows the builtin datatypes.
    #[must_use]
    pub fn new() -> Self {
        let builtins = builtin_types()
            .into_iter()
            .filter_map(|def| def.name.clone().map(|name| (name, def)))
            .collect();
        Self {
            documents: Vec::new(),
            types: IndexMap::new(),
            builtins,
            elements: IndexMap::new(),
            attributes: IndexMap::new(),
            attribute_groups: IndexMap::new(),
            groups: IndexMap::new(),
            substitution_groups: IndexMap::new(),
        }
    }

    /// Parses each source and links the result.
    ///
    /// # Errors
    /// Returns `SchemaError` if any document fails to parse or link.
    pub fn from_sources<S: AsRef<str>>(sources: &[S]) -> Result<Self, SchemaError> {
        let mut set = Self::new();
        for source in sources {
            set.add_document(SchemaDocument::parse(source.as_ref())?)?;
        }
        set.link()?;
        Ok(set)
    }

    /// Adds the declarations of a parsed document.
    ///
    /// # Errors
    /// Returns `ParseError::DuplicateDefinition` if a global name is
    /// already declared by an earlier document.
    pub fn add_document(&mut self, doc: SchemaDocument) -> Result<(), ParseError> {
        let mut index = DocumentIndex {
            target_namespace: doc.target_namespace,
            ..DocumentIndex::default()
        };

        for def in doc.types {
            let Some(name) = def.name.clone() else {
                return Err(ParseError::structure("global type without a name"));
            };
            if self.types.contains_key(&name) || self.builtins.contains_key(&name) {
                return Err(ParseError::duplicate("type", name.to_string()));
            }
            index.types.push(name.clone());
            self.types.insert(name, def);
        }

        for decl in doc.elements {
            let name = decl.name.clone();
            if self.elements.contains_key(&name) {
                return Err(ParseError::duplicate("element", name.to_string()));
            }
            if let Some(head) = &decl.substitution_group {
                self.substitution_groups
                    .entry(head.clone())
                    .or_default()
                    .push(name.clone());
            }
            index.elements.push(name.clone());
            self.elements.insert(name, decl);
        }

        for (name, decl) in doc.attributes {
            if self.attributes.insert(name.clone(), decl).is_some() {
                return Err(ParseError::duplicate("attribute", name.to_string()));
            }
        }
        for group in doc.attribute_groups {
            let name = group.name.clone();
            if self.attribute_groups.insert(name.clone(), group).is_some() {
                return Err(ParseError::duplicate("attributeGroup", name.to_string()));
            }
        }
        for group in doc.groups {
            let name = group.name.clone();
            if self.groups.insert(name.clone(), group).is_some() {
                return Err(ParseError::duplicate("group", name.to_string()));
            }
        }

        self.documents.push(index);
        Ok(())
    }

    /// Links the loaded documents.
    ///
    /// Untyped substitution group members take the type of their head, then
    /// every reference is checked.
    ///
    /// # Errors
    /// Returns `SchemaError` on a dangling reference or circular derivation.
    pub fn link(&mut self) -> Result<(), SchemaError> {
        // heads may themselves be untyped members, so repeat until stable
        loop {
            let mut inherited = Vec::new();
            for (head, members) in &self.substitution_groups {
                let Some(head_decl) = self.elements.get(head) else {
                    continue;
                };
                if head_decl.type_ref == TypeRef::Unspecified {
                    continue;
                }
                for member in members {
                    if self
                        .elements
                        .get(member)
                        .is_some_and(|m| m.type_ref == TypeRef::Unspecified)
                    {
                        inherited.push((member.clone(), head_decl.type_ref.clone()));
                    }
                }
            }
            if inherited.is_empty() {
                break;
            }
            for (member, type_ref) in inherited {
                if let Some(decl) = self.elements.get_mut(&member) {
                    decl.type_ref = type_ref;
                }
            }
        }

        validate_references(self)
    }

    /// Returns the loaded documents in load order.
    #[must_use]
    pub fn documents(&self) -> &[DocumentIndex] {
        &self.documents
    }

    /// Looks up a type by name, including builtins.
    #[must_use]
    pub fn type_def(&self, name: &QName) -> Option<&TypeDef> {
        self.types.get(name).or_else(|| self.builtins.get(name))
    }

    /// Looks up a global element.
    #[must_use]
    pub fn element(&self, name: &QName) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    /// Looks up a global attribute.
    #[must_use]
    pub fn attribute(&self, name: &QName) -> Option<&AttributeDecl> {
        self.attributes.get(name)
    }

    /// Looks up an attribute group.
    #[must_use]
    pub fn attribute_group(&self, name: &QName) -> Option<&AttributeGroupDef> {
        self.attribute_groups.get(name)
    }

    /// Looks up a named model group.
    #[must_use]
    pub fn group(&self, name: &QName) -> Option<&ModelGroupDef> {
        self.groups.get(name)
    }

    /// Iterates over declared (non-builtin) types in load order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Iterates over global elements in load order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementDecl> {
        self.elements.values()
    }

    /// Iterates over named model groups.
    pub fn groups(&self) -> impl Iterator<Item = &ModelGroupDef> {
        self.groups.values()
    }

    /// Iterates over attribute groups.
    pub fn attribute_groups(&self) -> impl Iterator<Item = &AttributeGroupDef> {
        self.attribute_groups.values()
    }

    /// Returns the members of a substitution group in declaration order.
    #[must_use]
    pub fn substitution_members(&self, head: &QName) -> &[QName] {
        self.substitution_groups
            .get(head)
            .map_or(&[], Vec::as_slice)
    }
}
