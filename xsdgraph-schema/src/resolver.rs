//! Schema-to-type-graph resolver.
//!
//! The resolver walks every global element and named type of a linked
//! [`SchemaSet`] and produces one [`SchemaType`] per reachable type. Types
//! are memoized by key: resolving the same definition twice returns the same
//! [`TypeId`], and a type is reserved in the registry before its content is
//! walked so recursive content terminates.
//!
//! Content models are flattened into an ordered element map. Choice groups
//! take their shared JSON key from the [`OverrideTable`], substitution group
//! heads fan out to their members, and elements typed by an abstract complex
//! type are expanded to every concrete descendant.

use crate::builtins::primitive_of;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{ResolveError, SchemaError};
use crate::hierarchy::ClassHierarchy;
use crate::ir::{ElementDescriptor, ElementMap, SchemaType, SimpleKind, TypeGraph, TypeId, TypeRegistry};
use crate::overrides::OverrideTable;
use crate::set::SchemaSet;
use crate::types::{
    AttributeUse, ComplexContent, ComplexDef, Compositor, Derivation, ElementDecl, ModelGroup,
    Occurs, Particle, Primitive, QName, SimpleDerivation, TypeDef, TypeKind, TypeRef,
    XSD_NAMESPACE,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Name of the list property of a type whose content is a repeated
/// substitution group head.
const SUBSTITUTION_LIST_NAME: &str = "Items";

/// Placeholders every graph carries, in registration order.
const PLACEHOLDERS: [Primitive; 3] = [Primitive::String, Primitive::Boolean, Primitive::Decimal];

/// Resolver settings.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Namespaces whose types get their own entry. Empty means the target
    /// namespaces of the loaded documents. The XSD namespace is always known.
    pub known_namespaces: Vec<String>,
    /// Elements that may appear untyped because they are only used as
    /// SOAP headers.
    pub header_only_elements: Vec<QName>,
}

/// Result of removing inherited particles from a merged content list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inherited<T> {
    /// Every particle came from the base type.
    FullyInherited,
    /// Particles the derived type declared itself, in order.
    Remaining(Vec<T>),
}

/// Removes the particles a derived type inherited from its base.
///
/// Each inherited particle removes its first equal occurrence in `merged`.
pub fn subtract_inherited<T: PartialEq + Clone>(merged: &[T], inherited: &[T]) -> Inherited<T> {
    let mut remaining = merged.to_vec();
    for particle in inherited {
        if let Some(pos) = remaining.iter().position(|p| p == particle) {
            remaining.remove(pos);
        }
    }
    if remaining.is_empty() {
        Inherited::FullyInherited
    } else {
        Inherited::Remaining(remaining)
    }
}

/// A content particle with references followed.
#[derive(Debug, Clone, PartialEq)]
enum Member<'s> {
    Element { decl: &'s ElementDecl, occurs: Occurs },
    Group(GroupView<'s>),
    Any,
}

/// A model group with references followed.
#[derive(Debug, Clone, PartialEq)]
struct GroupView<'s> {
    compositor: Compositor,
    occurs: Occurs,
    anonymous: bool,
    members: Vec<Member<'s>>,
}

impl GroupView<'_> {
    fn is_choice(&self) -> bool {
        self.compositor == Compositor::Choice
    }
}

/// Effective content of a complex type.
#[derive(Debug, Clone, Default)]
struct Layout<'s> {
    /// The content model is a choice at the top level.
    is_choice: bool,
    /// The content group repeats.
    is_list: bool,
    members: Vec<Member<'s>>,
}

/// Value class of a simple type.
struct Classified<'s> {
    kind: SimpleKind,
    enum_values: Vec<String>,
    list_item: Option<&'s QName>,
}

impl Classified<'_> {
    fn primitive(primitive: Primitive) -> Self {
        Self {
            kind: primitive.into(),
            enum_values: Vec::new(),
            list_item: None,
        }
    }
}

/// Builds a [`TypeGraph`] from a linked schema set.
pub struct Resolver<'s> {
    set: &'s SchemaSet,
    hierarchy: &'s ClassHierarchy,
    overrides: &'s OverrideTable,
    known_namespaces: HashSet<String>,
    header_only: HashSet<QName>,
    skipped_headers: HashSet<String>,
    anonymous: HashMap<TypeId, &'s TypeDef>,
    types: TypeRegistry,
    elements: ElementMap,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Resolver<'s> {
    /// Creates a resolver with the primitive placeholders registered.
    ///
    /// # Errors
    /// Returns `ResolveError` if a placeholder cannot be registered.
    pub fn new(
        set: &'s SchemaSet,
        hierarchy: &'s ClassHierarchy,
        overrides: &'s OverrideTable,
        options: &ResolveOptions,
    ) -> Result<Self, ResolveError> {
        let mut known_namespaces: HashSet<String> = if options.known_namespaces.is_empty() {
            set.documents()
                .iter()
                .filter_map(|doc| doc.target_namespace.clone())
                .collect()
        } else {
            options.known_namespaces.iter().cloned().collect()
        };
        known_namespaces.insert(XSD_NAMESPACE.to_string());

        let mut resolver = Self {
            set,
            hierarchy,
            overrides,
            known_namespaces,
            header_only: options.header_only_elements.iter().cloned().collect(),
            skipped_headers: HashSet::new(),
            anonymous: HashMap::new(),
            types: TypeRegistry::new(),
            elements: ElementMap::new(),
            diagnostics: Vec::new(),
        };
        for primitive in PLACEHOLDERS {
            resolver.resolve_named(&QName::xsd(primitive.builtin_name()))?;
        }
        Ok(resolver)
    }

    /// Resolves every global element and named type, document by document.
    ///
    /// # Errors
    /// Returns `ResolveError` on the first element or type that cannot be
    /// resolved.
    pub fn resolve_all(&mut self) -> Result<(), ResolveError> {
        let set = self.set;
        for doc in set.documents() {
            for name in &doc.elements {
                let decl = lookup_element(set, name, "(global)")?;
                let mut elements = std::mem::take(&mut self.elements);
                let result = self.process_element(&mut elements, decl, decl.occurs, "(global)");
                self.elements = elements;
                result?;
            }
            for name in &doc.types {
                self.resolve_named(name)?;
            }
            debug!(
                "Resolved document {}: {} elements, {} types",
                doc.target_namespace.as_deref().unwrap_or("(no namespace)"),
                doc.elements.len(),
                doc.types.len()
            );
        }
        info!(
            "Resolved {} types and {} global elements",
            self.types.len(),
            self.elements.len()
        );
        Ok(())
    }

    /// Resolves a definition that needs no enclosing element.
    ///
    /// # Errors
    /// Returns `ResolveError` if the type or anything it references cannot
    /// be resolved.
    pub fn resolve(&mut self, def: &'s TypeDef) -> Result<TypeId, ResolveError> {
        self.resolve_type(def, None)
    }

    /// Resolves a definition declared inline in `context`.
    ///
    /// # Errors
    /// Returns `ResolveError` if the type or anything it references cannot
    /// be resolved.
    pub fn resolve_in(&mut self, def: &'s TypeDef, context: &QName) -> Result<TypeId, ResolveError> {
        self.resolve_type(def, Some(context))
    }

    /// Resolves a named type.
    ///
    /// # Errors
    /// Returns `ResolveError` if the name is unknown or cannot be resolved.
    pub fn resolve_named(&mut self, name: &QName) -> Result<TypeId, ResolveError> {
        let def = lookup_type(self.set, name, "resolver")?;
        self.resolve_type(def, None)
    }

    /// Returns the registry built so far.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Finishes every type and returns the graph.
    #[must_use]
    pub fn finish(mut self) -> TypeGraph {
        self.types.finish();
        TypeGraph {
            types: self.types,
            elements: self.elements,
            skipped_headers: self.skipped_headers,
            diagnostics: self.diagnostics,
            ..TypeGraph::default()
        }
    }

    fn is_known(&self, name: &QName) -> bool {
        name.namespace()
            .is_some_and(|ns| self.known_namespaces.contains(ns))
    }

    fn diagnose(&mut self, kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, subject, message);
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn resolve_type(&mut self, def: &'s TypeDef, context: Option<&QName>) -> Result<TypeId, ResolveError> {
        let (namespace, name) = match &def.name {
            Some(qname) => {
                if let Some(id) = self.types.lookup(&qname.to_string()) {
                    return Ok(id);
                }
                if !self.is_known(qname) {
                    if def.is_simple() {
                        return self.placeholder(def);
                    }
                    return Err(ResolveError::ForeignType {
                        name: qname.to_string(),
                    });
                }
                (qname.namespace(), qname.local().to_string())
            }
            None if def.is_simple() => return self.placeholder(def),
            None => {
                let context = context.ok_or(ResolveError::MissingAnonymousContext)?;
                let name = format!("{}AnonType", context.local());
                if let Some(id) = self.types.lookup(&name) {
                    return match self.anonymous.get(&id) {
                        Some(first) if std::ptr::eq(*first, def) => Ok(id),
                        _ => Err(ResolveError::AnonymousTypeCollision {
                            name,
                            element: context.to_string(),
                        }),
                    };
                }
                (None, name)
            }
        };

        let id = self
            .types
            .reserve(SchemaType::new(namespace, name, def.is_abstract))?;
        if def.name.is_none() {
            self.anonymous.insert(id, def);
        }
        self.populate(id, def)?;
        Ok(id)
    }

    /// Returns the shared placeholder for a simple type's primitive class.
    fn placeholder(&mut self, def: &'s TypeDef) -> Result<TypeId, ResolveError> {
        let primitive = self.primitive_of_def(def)?;
        let name = QName::xsd(primitive.builtin_name());
        match self.types.lookup(&name.to_string()) {
            Some(id) => Ok(id),
            None => self.resolve_named(&name),
        }
    }

    fn populate(&mut self, id: TypeId, def: &'s TypeDef) -> Result<(), ResolveError> {
        let mut uses = Vec::new();
        let mut any_attribute = false;
        self.collect_attributes(def, &mut uses, &mut any_attribute)?;
        for (name, type_ref) in uses {
            let type_id = match type_ref {
                TypeRef::Named(qname) => Some(self.resolve_named(qname)?),
                TypeRef::Anonymous(inner) => Some(self.resolve_type(inner, None)?),
                TypeRef::Unspecified => None,
            };
            self.types[id].attributes.insert(name.to_string(), type_id);
        }
        self.types[id].any_attribute = any_attribute;

        if def.is_simple() {
            let classified = self.classify(def)?;
            let list_item = match classified.list_item {
                Some(item) => Some(self.resolve_named(item)?),
                None => None,
            };
            let ty = &mut self.types[id];
            ty.simple_kind = Some(classified.kind);
            ty.enum_values = classified.enum_values;
            ty.list_item_type = list_item;
        } else if let Some(complex) = def.as_complex() {
            self.populate_complex(id, complex)?;
        }
        Ok(())
    }

    /// Collects attribute uses along the extension chain, base first.
    fn collect_attributes(
        &self,
        def: &'s TypeDef,
        uses: &mut Vec<(&'s str, &'s TypeRef)>,
        any_attribute: &mut bool,
    ) -> Result<(), ResolveError> {
        let Some(complex) = def.as_complex() else {
            return Ok(());
        };
        if let Derivation::Extension(base) = &complex.derivation {
            let base_def = lookup_type(self.set, base, &def.display_name())?;
            self.collect_attributes(base_def, uses, any_attribute)?;
        }
        *any_attribute |= complex.any_attribute;
        let mut seen_groups = Vec::new();
        self.collect_uses(&complex.attributes, uses, any_attribute, &mut seen_groups)
    }

    fn collect_uses(
        &self,
        attributes: &'s [AttributeUse],
        uses: &mut Vec<(&'s str, &'s TypeRef)>,
        any_attribute: &mut bool,
        seen_groups: &mut Vec<&'s QName>,
    ) -> Result<(), ResolveError> {
        let set = self.set;
        for attribute in attributes {
            match attribute {
                AttributeUse::Local(decl) => uses.push((decl.name.as_str(), &decl.type_ref)),
                AttributeUse::Ref(name) => {
                    let decl = set
                        .attribute(name)
                        .ok_or_else(|| SchemaError::dangling("attribute", name, "resolver"))?;
                    uses.push((decl.name.as_str(), &decl.type_ref));
                }
                AttributeUse::Group(name) => {
                    if seen_groups.contains(&name) {
                        continue;
                    }
                    seen_groups.push(name);
                    let group = set
                        .attribute_group(name)
                        .ok_or_else(|| SchemaError::dangling("attributeGroup", name, "resolver"))?;
                    *any_attribute |= group.any_attribute;
                    self.collect_uses(&group.attributes, uses, any_attribute, seen_groups)?;
                }
            }
        }
        Ok(())
    }

    /// Determines the value class of a simple type.
    fn classify(&self, def: &'s TypeDef) -> Result<Classified<'s>, ResolveError> {
        match &def.kind {
            TypeKind::Builtin(primitive) => Ok(Classified::primitive(*primitive)),
            TypeKind::Simple(SimpleDerivation::Restriction { base, enumerations }) => {
                if !enumerations.is_empty() {
                    return Ok(Classified {
                        kind: SimpleKind::Enum,
                        enum_values: enumerations.clone(),
                        list_item: None,
                    });
                }
                self.classify_ref(base, def)
            }
            TypeKind::Simple(SimpleDerivation::List { item }) => {
                // only a named enum item gets its own entry to point at
                if let TypeRef::Named(name) = item {
                    let item_def = lookup_type(self.set, name, &def.display_name())?;
                    if self.classify(item_def)?.kind == SimpleKind::Enum {
                        return Ok(Classified {
                            kind: SimpleKind::ListOfEnum,
                            enum_values: Vec::new(),
                            list_item: Some(name),
                        });
                    }
                }
                Ok(Classified::primitive(Primitive::String))
            }
            TypeKind::Simple(SimpleDerivation::Union) => Ok(Classified::primitive(Primitive::String)),
            TypeKind::Complex(complex) => {
                if let ComplexContent::Simple { enumerations } = &complex.content {
                    if !enumerations.is_empty() {
                        return Ok(Classified {
                            kind: SimpleKind::Enum,
                            enum_values: enumerations.clone(),
                            list_item: None,
                        });
                    }
                }
                match &complex.derivation {
                    Derivation::Extension(base) | Derivation::Restriction(base) => {
                        let base_def = lookup_type(self.set, base, &def.display_name())?;
                        self.classify(base_def)
                    }
                    Derivation::None => Ok(Classified::primitive(Primitive::String)),
                }
            }
        }
    }

    fn classify_ref(&self, type_ref: &'s TypeRef, owner: &TypeDef) -> Result<Classified<'s>, ResolveError> {
        match type_ref {
            TypeRef::Named(name) => {
                let base = lookup_type(self.set, name, &owner.display_name())?;
                self.classify(base)
            }
            TypeRef::Anonymous(inner) => self.classify(inner),
            TypeRef::Unspecified => Ok(Classified::primitive(Primitive::String)),
        }
    }

    fn primitive_of_def(&self, def: &'s TypeDef) -> Result<Primitive, ResolveError> {
        if let TypeKind::Builtin(primitive) = def.kind {
            return Ok(primitive);
        }
        if let Some(primitive) = def.name.as_ref().filter(|n| n.is_xsd()).and_then(|n| primitive_of(n.local())) {
            return Ok(primitive);
        }
        Ok(match self.classify(def)?.kind {
            SimpleKind::Boolean => Primitive::Boolean,
            SimpleKind::Decimal => Primitive::Decimal,
            SimpleKind::String | SimpleKind::Enum | SimpleKind::ListOfEnum => Primitive::String,
        })
    }

    fn populate_complex(&mut self, id: TypeId, complex: &'s ComplexDef) -> Result<(), ResolveError> {
        let owner = self.types[id].key();
        let layout = self.layout(complex, &owner)?;

        let mut elements = ElementMap::new();
        let mut list_name = None;
        // `None` until the outer choice name has been looked up
        let mut outer: Option<Option<String>> = None;
        let mut inner: Option<String> = None;
        let mut choice_index = 0;

        for member in layout.members {
            match member {
                Member::Group(group) => {
                    if matches!(outer, Some(Some(_))) {
                        return Err(ResolveError::MixedChoiceContent { type_name: owner });
                    }
                    inner = if group.is_choice() {
                        let name = self.choice_name(&owner, Some(choice_index))?;
                        choice_index += 1;
                        name
                    } else {
                        None
                    };
                    self.process_group(&mut elements, &group, inner.as_deref(), &owner, &mut list_name)?;
                }
                Member::Element { decl, occurs } => {
                    let name = if layout.is_choice {
                        if inner.is_some() {
                            return Err(ResolveError::MixedChoiceContent { type_name: owner });
                        }
                        if outer.is_none() {
                            outer = Some(self.choice_name(&owner, None)?);
                        }
                        outer.clone().flatten()
                    } else {
                        None
                    };
                    self.process_particle(&mut elements, decl, occurs, name.as_deref(), &owner, &mut list_name)?;
                }
                Member::Any => self.diagnose(
                    DiagnosticKind::SkippedWildcard,
                    owner.as_str(),
                    "element wildcard has no JSON representation",
                ),
            }
        }

        let ty = &mut self.types[id];
        let collapses = ty.attributes.is_empty()
            && elements.len() == 1
            && elements.values().all(|e| e.is_list);
        ty.is_list = layout.is_list || collapses;
        ty.elements = elements;
        if list_name.is_some() {
            ty.list_name = list_name;
        }
        Ok(())
    }

    fn process_group(
        &mut self,
        elements: &mut ElementMap,
        group: &GroupView<'s>,
        name: Option<&str>,
        owner: &str,
        list_name: &mut Option<String>,
    ) -> Result<(), ResolveError> {
        for member in &group.members {
            match member {
                Member::Element { decl, occurs } => {
                    self.process_particle(elements, *decl, *occurs, name, owner, list_name)?;
                }
                Member::Group(nested) => self.process_group(elements, nested, name, owner, list_name)?,
                Member::Any => self.diagnose(
                    DiagnosticKind::SkippedWildcard,
                    owner,
                    "element wildcard has no JSON representation",
                ),
            }
        }
        Ok(())
    }

    /// Adds one content element plus its substitutes or concrete subtypes.
    fn process_particle(
        &mut self,
        elements: &mut ElementMap,
        decl: &'s ElementDecl,
        occurs: Occurs,
        group_name: Option<&str>,
        owner: &str,
        list_name: &mut Option<String>,
    ) -> Result<(), ResolveError> {
        let entry = self.process_element(elements, decl, occurs, owner)?;
        if let (Some(key), Some(name)) = (&entry, group_name) {
            if !name.is_empty() {
                if let Some(descriptor) = elements.get_mut(key) {
                    descriptor.serialized_name = Some(name.to_string());
                }
            }
        }

        let set = self.set;
        let members = set.substitution_members(&decl.name);
        if !members.is_empty() {
            if occurs.is_repeated() {
                *list_name = Some(SUBSTITUTION_LIST_NAME.to_string());
            }
            for member in members {
                let member_decl = lookup_element(set, member, owner)?;
                let key = self.process_element(elements, member_decl, member_decl.occurs, owner)?;
                if let Some(descriptor) = key.as_ref().and_then(|k| elements.get_mut(k)) {
                    descriptor.serialized_name = Some(decl.name.local().to_string());
                }
            }
            debug!("Fanned out {} substitutes of {} in {}", members.len(), decl.name, owner);
            return Ok(());
        }

        let Some(key) = entry else {
            return Ok(());
        };
        let Some(descriptor) = elements.get(&key).cloned() else {
            return Ok(());
        };
        let element_type = &self.types[descriptor.type_id];
        if element_type.is_abstract && !element_type.is_simple() {
            let abstract_name = element_type.qname();
            self.expand_abstract(elements, decl, &descriptor, &abstract_name, owner)?;
        }
        Ok(())
    }

    /// Adds one entry per concrete descendant of an element's abstract
    /// type, keyed by the descendant's type name.
    fn expand_abstract(
        &mut self,
        elements: &mut ElementMap,
        decl: &ElementDecl,
        descriptor: &ElementDescriptor,
        abstract_name: &QName,
        owner: &str,
    ) -> Result<(), ResolveError> {
        let set = self.set;
        let hierarchy = self.hierarchy;
        let mut expanded = 0;

        for subtype in hierarchy.descendants(abstract_name) {
            let def = lookup_type(set, subtype, owner)?;
            if def.is_abstract {
                continue;
            }
            let type_id = self.resolve_type(def, None)?;
            let key = subtype.to_string();
            if elements.contains_key(&key) {
                return Err(ResolveError::ExpansionCollision {
                    type_name: owner.to_string(),
                    element: decl.name.to_string(),
                    subtype: key,
                });
            }
            let mut substitute = descriptor.substitute(type_id, decl.name.clone());
            if substitute.serialized_name.is_none() {
                substitute.serialized_name = Some(decl.name.local().to_string());
            }
            elements.insert(key, substitute);
            expanded += 1;
        }

        if expanded == 0 {
            self.diagnose(
                DiagnosticKind::NoConcreteSubtypes,
                format!("{owner}/{}", decl.name),
                format!("abstract type {abstract_name} has no concrete subtype"),
            );
        } else {
            debug!("Expanded {} in {} to {} subtypes", decl.name, owner, expanded);
        }
        Ok(())
    }

    /// Adds a single element descriptor. Returns its key, or `None` if the
    /// element was skipped.
    fn process_element(
        &mut self,
        elements: &mut ElementMap,
        decl: &'s ElementDecl,
        occurs: Occurs,
        owner: &str,
    ) -> Result<Option<String>, ResolveError> {
        let type_id = match &decl.type_ref {
            TypeRef::Named(name) => self.resolve_named(name)?,
            TypeRef::Anonymous(def) => self.resolve_type(def, Some(&decl.name))?,
            TypeRef::Unspecified => {
                if self.header_only.contains(&decl.name) {
                    self.skipped_headers.insert(decl.name.to_string());
                    self.diagnose(
                        DiagnosticKind::SkippedHeaderElement,
                        decl.name.to_string(),
                        format!("untyped header-only element in {owner}"),
                    );
                    return Ok(None);
                }
                return Err(ResolveError::UnresolvedType {
                    element: decl.name.to_string(),
                    context: owner.to_string(),
                });
            }
        };

        let key = decl.name.to_string();
        if elements.contains_key(&key) {
            self.diagnose(
                DiagnosticKind::DuplicateElement,
                format!("{owner}/{key}"),
                "element declared twice; keeping the first",
            );
            return Ok(None);
        }
        elements.insert(key.clone(), ElementDescriptor::new(type_id, occurs.is_repeated()));
        Ok(Some(key))
    }

    fn choice_name(&self, owner: &str, index: Option<usize>) -> Result<Option<String>, ResolveError> {
        self.overrides
            .choice_group(owner, index)
            .map(|name| name.map(str::to_string))
            .ok_or_else(|| ResolveError::MissingChoiceGroup {
                type_name: owner.to_string(),
                index,
            })
    }

    /// Computes the effective content of a complex type, inherited
    /// particles included.
    fn layout(&self, complex: &'s ComplexDef, owner: &str) -> Result<Layout<'s>, ResolveError> {
        let own = match &complex.content {
            ComplexContent::Elements(group) => Some(self.view(group, group.occurs, true, owner)?),
            _ => None,
        };
        let base = match &complex.derivation {
            Derivation::Extension(base) => {
                let base_def = lookup_type(self.set, base, owner)?;
                match base_def.as_complex() {
                    Some(base_complex) => self.layout(base_complex, owner)?,
                    None => Layout::default(),
                }
            }
            _ => Layout::default(),
        };

        let Some(own) = own else {
            return Ok(base);
        };
        if base.members.is_empty() {
            return Ok(Self::own_layout(own));
        }

        let own_members = if own.is_choice() {
            // a choice extension may restate base particles inside its own group
            match subtract_inherited(&own.members, &base.members) {
                Inherited::FullyInherited => return Ok(base),
                Inherited::Remaining(rest) => vec![Member::Group(GroupView {
                    compositor: Compositor::Choice,
                    occurs: own.occurs,
                    anonymous: true,
                    members: rest,
                })],
            }
        } else {
            own.members
        };

        let mut members = if base.is_choice {
            vec![Member::Group(GroupView {
                compositor: Compositor::Choice,
                occurs: Occurs::once(),
                anonymous: true,
                members: base.members,
            })]
        } else {
            base.members
        };
        members.extend(own_members);
        Ok(Layout {
            is_choice: false,
            is_list: false,
            members,
        })
    }

    fn own_layout(group: GroupView<'s>) -> Layout<'s> {
        let is_choice = group.is_choice();
        let folded = match group.members.as_slice() {
            [Member::Group(inner)] if inner.anonymous => Some(inner.clone()),
            _ => None,
        };
        let group = folded.unwrap_or(group);
        let single_repeated = group.compositor == Compositor::Sequence
            && match group.members.as_slice() {
                [Member::Element { occurs, .. }] => occurs.is_repeated(),
                [Member::Group(inner)] => inner.occurs.is_repeated(),
                _ => false,
            };
        Layout {
            is_choice,
            is_list: group.occurs.is_repeated() || single_repeated,
            members: group.members,
        }
    }

    fn view(
        &self,
        group: &'s ModelGroup,
        occurs: Occurs,
        anonymous: bool,
        owner: &str,
    ) -> Result<GroupView<'s>, ResolveError> {
        let set = self.set;
        let mut members = Vec::with_capacity(group.particles.len());
        for particle in &group.particles {
            let member = match particle {
                Particle::Element(decl) => Member::Element {
                    decl,
                    occurs: decl.occurs,
                },
                Particle::ElementRef { name, occurs } => Member::Element {
                    decl: lookup_element(set, name, owner)?,
                    occurs: *occurs,
                },
                Particle::Group(nested) => Member::Group(self.view(nested, nested.occurs, true, owner)?),
                Particle::GroupRef { name, occurs } => {
                    let def = set
                        .group(name)
                        .ok_or_else(|| SchemaError::dangling("group", name, owner))?;
                    Member::Group(self.view(&def.group, *occurs, false, owner)?)
                }
                Particle::Any { .. } => Member::Any,
            };
            members.push(member);
        }
        Ok(GroupView {
            compositor: group.compositor,
            occurs,
            anonymous,
            members,
        })
    }
}

fn lookup_type<'s>(set: &'s SchemaSet, name: &QName, context: &str) -> Result<&'s TypeDef, ResolveError> {
    set.type_def(name)
        .ok_or_else(|| SchemaError::dangling("type", name, context).into())
}

fn lookup_element<'s>(set: &'s SchemaSet, name: &QName, context: &str) -> Result<&'s ElementDecl, ResolveError> {
    set.element(name)
        .ok_or_else(|| SchemaError::dangling("element", name, context).into())
}
