//! Error types for schema reading, linking and resolution.

use thiserror::Error;

/// Error type for XSD and WSDL document parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Unknown element encountered.
    #[error("unknown element '{element}' in context '{context}'")]
    UnknownElement {
        /// Element name.
        element: String,
        /// Parent context.
        context: String,
    },

    /// A qualified name used a prefix with no namespace binding in scope.
    #[error("unbound namespace prefix '{prefix}' in '{value}'")]
    UnboundPrefix {
        /// The prefix.
        prefix: String,
        /// The full attribute value.
        value: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} definition: '{name}'")]
    DuplicateDefinition {
        /// Kind of definition (type, element, etc.).
        kind: String,
        /// Name of the duplicate.
        name: String,
    },

    /// Invalid document structure.
    #[error("invalid schema structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for cross-document schema checks.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A `ref` or `base` points at a declaration that does not exist.
    #[error("{kind} '{name}' referenced from '{context}' not found")]
    DanglingReference {
        /// Kind of declaration (type, element, group, ...).
        kind: String,
        /// Referenced name.
        name: String,
        /// Where the reference was made.
        context: String,
    },

    /// Circular derivation chain.
    #[error("circular type derivation detected: {path}")]
    CircularReference {
        /// Path of the circular reference.
        path: String,
    },

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

/// Error type for type-graph resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Schema loading or linking error.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An element's type cannot be determined.
    #[error("element '{element}' in '{context}' has no resolvable type")]
    UnresolvedType {
        /// Element name.
        element: String,
        /// Owning type, or `(global)`.
        context: String,
    },

    /// A complex type outside the known namespaces was referenced.
    #[error("complex type '{name}' is outside the known namespaces")]
    ForeignType {
        /// Type name.
        name: String,
    },

    /// An anonymous complex type has no enclosing element to name it.
    #[error("anonymous complex type without an enclosing element")]
    MissingAnonymousContext,

    /// A choice group has no entry in the override table.
    #[error("no choice group name for type '{type_name}' ({})", choice_label(.index))]
    MissingChoiceGroup {
        /// Owning type key.
        type_name: String,
        /// Zero-based choice group index, `None` for an outer choice.
        index: Option<usize>,
    },

    /// A content model mixes an outer choice with nested groups.
    #[error("type '{type_name}' mixes an outer choice with nested groups")]
    MixedChoiceContent {
        /// Owning type key.
        type_name: String,
    },

    /// Abstract-type expansion would overwrite an existing entry.
    #[error("expanding '{element}' in '{type_name}' collides with existing entry '{subtype}'")]
    ExpansionCollision {
        /// Owning type key.
        type_name: String,
        /// Declared element name.
        element: String,
        /// Concrete subtype key.
        subtype: String,
    },

    /// Two different anonymous types would share one synthesized name.
    #[error("anonymous type of '{element}' collides with another anonymous type named '{name}'")]
    AnonymousTypeCollision {
        /// Synthesized registry key.
        name: String,
        /// Element declaring the second type.
        element: String,
    },

    /// Two types were registered under one key.
    #[error("type '{name}' registered twice")]
    DuplicateType {
        /// Registry key.
        name: String,
    },

    /// An operation names a header element that was not resolved.
    #[error("header element '{element}' of operation '{operation}' not found")]
    UnknownHeader {
        /// Operation name.
        operation: String,
        /// Header element name.
        element: String,
    },
}

/// Error type for applying an override table.
#[derive(Debug, Error)]
pub enum OverrideError {
    /// The table could not be read.
    #[error("failed to read override table: {0}")]
    Io(#[from] std::io::Error),

    /// The table is not valid YAML for the expected shape.
    #[error("invalid override table: {0}")]
    Format(#[from] serde_yaml::Error),

    /// A name uses a prefix missing from the table's `namespaces` map.
    #[error("unknown prefix '{prefix}' in override name '{name}'")]
    UnknownPrefix {
        /// The prefix.
        prefix: String,
        /// The full name.
        name: String,
    },

    /// A correction targets a type that was not resolved.
    #[error("override targets unknown type '{name}'")]
    UnknownType {
        /// Type key.
        name: String,
    },

    /// A correction targets an element the type does not contain.
    #[error("override targets unknown element '{element}' of type '{type_name}'")]
    UnknownElement {
        /// Type key.
        type_name: String,
        /// Element key.
        element: String,
    },

    /// An alias targets an operation that does not exist.
    #[error("override targets unknown operation '{name}'")]
    UnknownOperation {
        /// Operation name.
        name: String,
    },

    /// An alias would replace an existing operation.
    #[error("alias '{alias}' for '{name}' already names an operation")]
    DuplicateOperation {
        /// Aliased operation.
        name: String,
        /// Alias.
        alias: String,
    },

    /// A simple-kind correction is malformed.
    #[error("invalid simple kind override for '{name}': {message}")]
    InvalidSimpleKind {
        /// Type key.
        name: String,
        /// What is wrong.
        message: String,
    },
}

/// Error type for checks over a finished graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A sealed-graph invariant does not hold.
    #[error("graph validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

/// Error type for the whole schema-to-graph pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The override table does not match the graph.
    #[error(transparent)]
    Override(#[from] OverrideError),

    /// The finished graph is inconsistent.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown element error.
    pub fn unknown_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownElement {
            element: element.into(),
            context: context.into(),
        }
    }

    /// Creates a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates an invalid structure error.
    pub fn structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}

impl SchemaError {
    /// Creates a dangling reference error.
    pub fn dangling(
        kind: impl Into<String>,
        name: impl std::fmt::Display,
        context: impl std::fmt::Display,
    ) -> Self {
        Self::DanglingReference {
            kind: kind.into(),
            name: name.to_string(),
            context: context.to_string(),
        }
    }
}

impl GraphError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

fn choice_label(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("choice index {i}"),
        None => "outer choice".to_string(),
    }
}
