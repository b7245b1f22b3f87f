//! Serializable rendering of a finished type graph.
//!
//! The artifact is the contract between the resolver and every output
//! format: types sorted by emitted name, each with its ordered elements,
//! sorted attributes and serialization overrides, plus the operation table.

use crate::error::CodegenError;
use crate::naming::{DEFAULT_TYPE_SUFFIX, Prefixes, json_type_name};
use serde::Serialize;
use xsdgraph_schema::{Diagnostic, ElementDescriptor, OperationDescriptor, QName, SchemaType, TypeGraph};

/// Settings for building an artifact.
#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    /// Suffix appended to serialized type names.
    pub type_suffix: String,
    /// Prefixes used to shorten qualified names.
    pub prefixes: Prefixes,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            type_suffix: DEFAULT_TYPE_SUFFIX.to_string(),
            prefixes: Prefixes::new(),
        }
    }
}

/// A whole graph, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct GraphArtifact {
    /// Types sorted by name.
    pub types: Vec<TypeArtifact>,
    /// Operations sorted by name.
    pub operations: Vec<OperationArtifact>,
    /// Name of the request header type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<String>,
    /// Name of the response header type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<String>,
    /// Non-fatal conditions met while resolving.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// One resolved type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeArtifact {
    /// Shortened type name.
    pub name: String,
    /// Serialized type name; absent for anonymous types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_type: Option<String>,
    /// Elements in serialization order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementArtifact>,
    /// Attributes sorted by name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeArtifact>,
    /// Properties present only in the JSON form.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_properties: Vec<String>,
    /// Content model repeats.
    pub is_list: bool,
    /// Type is abstract.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
    /// Simple value class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_kind: Option<&'static str>,
    /// Type carries an attribute wildcard.
    pub any_attribute: bool,
    /// Attribute holding the text value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_attribute: Option<String>,
    /// Collection wrapper name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    /// Enumeration literals.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Item type of a list-of-enum type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_item_type: Option<String>,
}

/// One element of a type.
#[derive(Debug, Clone, Serialize)]
pub struct ElementArtifact {
    /// Shortened XML element name.
    pub xml_name: String,
    /// Serialized name when it differs from the XML name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    /// Referenced type name.
    pub type_name: String,
    /// Occurrence repeats.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_list: bool,
    /// Serialized type hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_hint: Option<String>,
    /// Value used when the element is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_default: Option<serde_json::Value>,
}

/// One attribute of a type.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeArtifact {
    /// Attribute name.
    pub name: String,
    /// Referenced type name, if the attribute is typed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// One operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationArtifact {
    /// Name the operation is looked up by.
    pub name: String,
    /// SOAP action.
    pub action: String,
    /// Serialized name of the request body type.
    pub body_type: String,
    /// Serialized name of the request envelope type.
    pub request_type: String,
    /// Type of the input element.
    pub request: String,
    /// Shortened output element name.
    pub response_element: String,
    /// JSON key of the response.
    pub response_name: String,
    /// Type of the output element.
    pub response: String,
}

impl GraphArtifact {
    /// Builds the artifact for a finished graph.
    ///
    /// # Errors
    /// Returns `CodegenError::UnknownElement` if an operation's input or
    /// output element is not in the graph.
    pub fn build(graph: &TypeGraph, options: &ArtifactOptions) -> Result<Self, CodegenError> {
        let builder = Builder { graph, options };

        let mut types: Vec<TypeArtifact> = graph
            .types
            .iter()
            .map(|(_, schema_type)| builder.type_artifact(schema_type))
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));

        let mut operations = graph
            .operations
            .iter()
            .map(|(name, op)| builder.operation_artifact(name, op))
            .collect::<Result<Vec<_>, _>>()?;
        operations.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            types,
            operations,
            request_headers: graph.request_headers.map(|id| builder.type_name(&graph.types[id])),
            response_headers: graph.response_headers.map(|id| builder.type_name(&graph.types[id])),
            diagnostics: graph.diagnostics.clone(),
        })
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<&TypeArtifact> {
        self.types
            .binary_search_by(|t| t.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.types[i])
    }

    /// Renders the artifact as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `CodegenError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, CodegenError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the artifact as YAML.
    ///
    /// # Errors
    /// Returns `CodegenError::Yaml` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, CodegenError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

struct Builder<'a> {
    graph: &'a TypeGraph,
    options: &'a ArtifactOptions,
}

impl Builder<'_> {
    fn type_name(&self, schema_type: &SchemaType) -> String {
        self.options.prefixes.shorten(&schema_type.qname())
    }

    fn type_artifact(&self, schema_type: &SchemaType) -> TypeArtifact {
        let graph = self.graph;

        let elements = schema_type
            .elements
            .iter()
            .map(|(key, descriptor)| self.element_artifact(key, descriptor))
            .collect();

        let mut attributes: Vec<AttributeArtifact> = schema_type
            .attributes
            .iter()
            .map(|(name, type_id)| AttributeArtifact {
                name: name.clone(),
                type_name: type_id.map(|id| self.type_name(&graph.types[id])),
            })
            .collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));

        TypeArtifact {
            name: self.type_name(schema_type),
            json_type: json_type_name(schema_type, &self.options.type_suffix),
            elements,
            attributes,
            extra_properties: schema_type.extra_properties.clone(),
            is_list: schema_type.is_list,
            is_abstract: schema_type.is_abstract,
            simple_kind: schema_type.simple_kind.map(|kind| kind.as_str()),
            any_attribute: schema_type.any_attribute,
            text_attribute: schema_type.text_attribute.clone(),
            list_name: schema_type.list_name.clone(),
            enum_values: schema_type.enum_values.clone(),
            list_item_type: schema_type
                .list_item_type
                .map(|id| self.type_name(&graph.types[id])),
        }
    }

    fn element_artifact(&self, key: &str, descriptor: &ElementDescriptor) -> ElementArtifact {
        let xml_name = match &descriptor.source_name {
            Some(source) => self.options.prefixes.shorten(source),
            None => self.options.prefixes.shorten(&QName::from_clark(key)),
        };
        ElementArtifact {
            xml_name,
            json_name: descriptor.serialized_name.clone(),
            type_name: self.type_name(&self.graph.types[descriptor.type_id]),
            is_list: descriptor.is_list,
            json_hint: descriptor.format_hint.clone(),
            json_default: descriptor.default_value.clone(),
        }
    }

    fn operation_artifact(
        &self,
        name: &str,
        op: &OperationDescriptor,
    ) -> Result<OperationArtifact, CodegenError> {
        let element_type = |element: &QName| {
            self.graph
                .elements
                .get(&element.to_string())
                .map(|descriptor| self.type_name(&self.graph.types[descriptor.type_id]))
                .ok_or_else(|| CodegenError::UnknownElement {
                    element: element.to_string(),
                    operation: name.to_string(),
                })
        };
        let suffix = &self.options.type_suffix;

        Ok(OperationArtifact {
            name: name.to_string(),
            action: op.action.clone(),
            body_type: format!("{}Request{suffix}", op.action),
            request_type: format!("{}JsonRequest{suffix}", op.action),
            request: element_type(&op.input)?,
            response_element: self.options.prefixes.shorten(&op.output),
            response_name: op.output.local().to_string(),
            response: element_type(&op.output)?,
        })
    }
}
