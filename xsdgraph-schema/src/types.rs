//! Schema declaration model.
//!
//! This module contains the data structures read from XSD documents:
//! qualified names, element and attribute declarations, model groups and
//! simple/complex type definitions. Every node exposes the same fixed set of
//! fields whether or not a given construct uses them.

use std::fmt;

/// Namespace of the XML Schema vocabulary and its builtin datatypes.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: Option<String>,
    local: String,
}

impl QName {
    /// Creates a new qualified name.
    #[must_use]
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    /// Creates a name in the XSD namespace.
    #[must_use]
    pub fn xsd(local: impl Into<String>) -> Self {
        Self::new(Some(XSD_NAMESPACE), local)
    }

    /// Parses Clark notation (`{namespace}local`, or a bare local name).
    #[must_use]
    pub fn from_clark(value: &str) -> Self {
        match value.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
            Some((namespace, local)) => Self::new(Some(namespace), local),
            None => Self::new(None, value),
        }
    }

    /// Returns the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local part.
    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Returns true for names in the XSD namespace.
    #[must_use]
    pub fn is_xsd(&self) -> bool {
        self.namespace() == Some(XSD_NAMESPACE)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Upper occurrence bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    /// Finite bound.
    Bounded(u32),
    /// `maxOccurs="unbounded"`.
    Unbounded,
}

/// Occurrence bounds of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum occurrences.
    pub min: u32,
    /// Maximum occurrences.
    pub max: MaxOccurs,
}

impl Occurs {
    /// Exactly once, the XSD default.
    #[must_use]
    pub const fn once() -> Self {
        Self {
            min: 1,
            max: MaxOccurs::Bounded(1),
        }
    }

    /// Zero or more.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: 0,
            max: MaxOccurs::Unbounded,
        }
    }

    /// Returns true if the particle may occur more than once.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        match self.max {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Bounded(n) => n > 1,
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// Reference from a declaration to its type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Named type, resolved through the schema set.
    Named(QName),
    /// Anonymous type declared inline.
    Anonymous(Box<TypeDef>),
    /// No type given.
    Unspecified,
}

/// Element declaration, global or local.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Qualified element name.
    pub name: QName,
    /// Declared type.
    pub type_ref: TypeRef,
    /// Occurrence bounds at the declaration site.
    pub occurs: Occurs,
    /// `abstract="true"`.
    pub is_abstract: bool,
    /// Head of the substitution group this element joins.
    pub substitution_group: Option<QName>,
}

/// Model group compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositor {
    /// `xs:sequence`.
    Sequence,
    /// `xs:choice`.
    Choice,
    /// `xs:all`.
    All,
}

/// A sequence, choice or all group.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    /// Group compositor.
    pub compositor: Compositor,
    /// Occurrence bounds of the group itself.
    pub occurs: Occurs,
    /// Member particles in declaration order.
    pub particles: Vec<Particle>,
}

impl ModelGroup {
    /// Creates a group occurring exactly once.
    #[must_use]
    pub fn new(compositor: Compositor, particles: Vec<Particle>) -> Self {
        Self {
            compositor,
            occurs: Occurs::once(),
            particles,
        }
    }

    /// Returns true for choice groups.
    #[must_use]
    pub fn is_choice(&self) -> bool {
        self.compositor == Compositor::Choice
    }
}

/// Content particle.
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    /// Local element declaration.
    Element(ElementDecl),
    /// Reference to a global element.
    ElementRef {
        /// Referenced element.
        name: QName,
        /// Occurrence bounds at the reference site.
        occurs: Occurs,
    },
    /// Nested anonymous group.
    Group(ModelGroup),
    /// Reference to a named model group.
    GroupRef {
        /// Referenced group.
        name: QName,
        /// Occurrence bounds at the reference site.
        occurs: Occurs,
    },
    /// Element wildcard.
    Any {
        /// Occurrence bounds.
        occurs: Occurs,
    },
}

impl Particle {
    /// Returns the occurrence bounds of the particle.
    #[must_use]
    pub fn occurs(&self) -> Occurs {
        match self {
            Self::Element(decl) => decl.occurs,
            Self::Group(group) => group.occurs,
            Self::ElementRef { occurs, .. }
            | Self::GroupRef { occurs, .. }
            | Self::Any { occurs } => *occurs,
        }
    }
}

/// Local attribute declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    /// Attribute name (attributes are unqualified).
    pub name: String,
    /// Declared type.
    pub type_ref: TypeRef,
}

/// Attribute entry of a complex type or attribute group.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeUse {
    /// Inline declaration.
    Local(AttributeDecl),
    /// Reference to a global attribute.
    Ref(QName),
    /// Reference to an attribute group.
    Group(QName),
}

/// Named attribute group.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeGroupDef {
    /// Group name.
    pub name: QName,
    /// Attributes in declaration order.
    pub attributes: Vec<AttributeUse>,
    /// Group carries `xs:anyAttribute`.
    pub any_attribute: bool,
}

/// Named model group.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroupDef {
    /// Group name.
    pub name: QName,
    /// The group's content.
    pub group: ModelGroup,
}

/// Primitive classes the builtin datatypes fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `xs:boolean`.
    Boolean,
    /// The decimal family.
    Decimal,
    /// Everything else.
    String,
}

impl Primitive {
    /// Returns the builtin type name of the primitive's placeholder.
    #[must_use]
    pub fn builtin_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::String => "string",
        }
    }
}

/// How a simple type is derived.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleDerivation {
    /// `xs:restriction` with optional enumeration facets.
    Restriction {
        /// Base type.
        base: TypeRef,
        /// Enumeration literals in declaration order.
        enumerations: Vec<String>,
    },
    /// `xs:list`.
    List {
        /// Item type.
        item: TypeRef,
    },
    /// `xs:union`.
    Union,
}

/// Base-type relationship of a complex type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Derivation {
    /// Not derived.
    #[default]
    None,
    /// `xs:extension`.
    Extension(QName),
    /// `xs:restriction`.
    Restriction(QName),
}

/// Content model of a complex type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ComplexContent {
    /// No element content.
    #[default]
    Empty,
    /// Element content.
    Elements(ModelGroup),
    /// Simple content; the value class comes from the base type.
    Simple {
        /// Enumeration facets of a simple-content restriction.
        enumerations: Vec<String>,
    },
}

/// Complex type body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexDef {
    /// Base-type relationship.
    pub derivation: Derivation,
    /// Declared content, not including inherited particles.
    pub content: ComplexContent,
    /// Declared attributes, not including inherited ones.
    pub attributes: Vec<AttributeUse>,
    /// Type carries `xs:anyAttribute`.
    pub any_attribute: bool,
}

/// Kind of type definition.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// User-defined simple type.
    Simple(SimpleDerivation),
    /// User-defined complex type.
    Complex(ComplexDef),
    /// Builtin XSD datatype.
    Builtin(Primitive),
}

/// Simple or complex type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Qualified name, `None` for anonymous types.
    pub name: Option<QName>,
    /// `abstract="true"`.
    pub is_abstract: bool,
    /// Definition body.
    pub kind: TypeKind,
}

impl TypeDef {
    /// Returns the base type this type extends, if any.
    #[must_use]
    pub fn extension_base(&self) -> Option<&QName> {
        match &self.kind {
            TypeKind::Complex(ComplexDef {
                derivation: Derivation::Extension(base),
                ..
            }) => Some(base),
            _ => None,
        }
    }

    /// Returns true for types whose instances carry a scalar value.
    ///
    /// Complex types with simple content count as simple here; they are
    /// simple types that also carry attributes.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        match &self.kind {
            TypeKind::Simple(_) | TypeKind::Builtin(_) => true,
            TypeKind::Complex(def) => matches!(def.content, ComplexContent::Simple { .. }),
        }
    }

    /// Returns the complex body, if this is a complex type.
    #[must_use]
    pub fn as_complex(&self) -> Option<&ComplexDef> {
        match &self.kind {
            TypeKind::Complex(def) => Some(def),
            _ => None,
        }
    }

    /// Returns the type's name for messages, `(anonymous)` if unnamed.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(|| "(anonymous)".to_string(), ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let name = QName::new(Some("urn:t"), "FooType");
        assert_eq!(name.to_string(), "{urn:t}FooType");
        assert_eq!(QName::new(None, "Bare").to_string(), "Bare");
    }

    #[test]
    fn test_qname_from_clark() {
        let name = QName::from_clark("{urn:t}FooType");
        assert_eq!(name.namespace(), Some("urn:t"));
        assert_eq!(name.local(), "FooType");

        let bare = QName::from_clark("FooAnonType");
        assert_eq!(bare.namespace(), None);
        assert_eq!(bare.local(), "FooAnonType");
    }

    #[test]
    fn test_occurs_repeated() {
        assert!(!Occurs::once().is_repeated());
        assert!(Occurs::unbounded().is_repeated());
        let two = Occurs {
            min: 0,
            max: MaxOccurs::Bounded(2),
        };
        assert!(two.is_repeated());
    }

    #[test]
    fn test_extension_base() {
        let base = QName::new(Some("urn:t"), "BaseType");
        let def = TypeDef {
            name: Some(QName::new(Some("urn:t"), "DerivedType")),
            is_abstract: false,
            kind: TypeKind::Complex(ComplexDef {
                derivation: Derivation::Extension(base.clone()),
                ..ComplexDef::default()
            }),
        };
        assert_eq!(def.extension_base(), Some(&base));
        assert!(!def.is_simple());
    }
}
