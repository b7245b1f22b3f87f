//! Rust module generation from a graph artifact.

use crate::artifact::GraphArtifact;
use crate::rust::{EnumGenerator, OperationGenerator, TypeGenerator};

/// Composes the Rust generators into one self-contained module.
pub struct Generator<'a> {
    artifact: &'a GraphArtifact,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(artifact: &'a GraphArtifact) -> Self {
        Self { artifact }
    }

    /// Generates the complete module source.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.generate_preamble());
        output.push_str(&TypeGenerator::new(self.artifact).generate());
        output.push_str(&OperationGenerator::new(self.artifact).generate());
        output.push_str(&EnumGenerator::new(self.artifact).generate());

        output
    }

    fn generate_preamble(&self) -> String {
        let mut output = String::new();

        output.push_str("// Code generated by xsdgraph; DO NOT EDIT.\n");
        output.push_str(&format!(
            "// {} types, {} operations.\n\n",
            self.artifact.types.len(),
            self.artifact.operations.len()
        ));
        output.push_str("/// Value class of a simple type.\n");
        output.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n");
        output.push_str("pub enum SimpleKind {\n");
        output.push_str("    Boolean,\n");
        output.push_str("    Decimal,\n");
        output.push_str("    String,\n");
        output.push_str("    Enum,\n");
        output.push_str("    List,\n");
        output.push_str("}\n\n");

        output.push_str("/// One element of a type, in serialization order.\n");
        output.push_str("#[derive(Debug, Clone, Copy)]\n");
        output.push_str("pub struct ElementDef {\n");
        output.push_str("    pub xml_name: &'static str,\n");
        output.push_str("    pub json_name: Option<&'static str>,\n");
        output.push_str("    pub type_name: &'static str,\n");
        output.push_str("    pub is_list: bool,\n");
        output.push_str("    pub json_hint: Option<&'static str>,\n");
        output.push_str("    /// Default value as compact JSON.\n");
        output.push_str("    pub json_default: Option<&'static str>,\n");
        output.push_str("}\n\n");

        output.push_str("/// One attribute of a type.\n");
        output.push_str("#[derive(Debug, Clone, Copy)]\n");
        output.push_str("pub struct AttributeDef {\n");
        output.push_str("    pub name: &'static str,\n");
        output.push_str("    pub type_name: Option<&'static str>,\n");
        output.push_str("}\n\n");

        output.push_str("/// One resolved type.\n");
        output.push_str("#[derive(Debug, Clone, Copy)]\n");
        output.push_str("pub struct TypeDef {\n");
        output.push_str("    pub name: &'static str,\n");
        output.push_str("    pub json_type: Option<&'static str>,\n");
        output.push_str("    pub elements: &'static [ElementDef],\n");
        output.push_str("    pub attributes: &'static [AttributeDef],\n");
        output.push_str("    pub extra_properties: &'static [&'static str],\n");
        output.push_str("    pub is_list: bool,\n");
        output.push_str("    pub is_abstract: bool,\n");
        output.push_str("    pub simple_kind: Option<SimpleKind>,\n");
        output.push_str("    pub any_attribute: bool,\n");
        output.push_str("    pub text_attribute: Option<&'static str>,\n");
        output.push_str("    pub list_name: Option<&'static str>,\n");
        output.push_str("    pub enum_values: &'static [&'static str],\n");
        output.push_str("    pub list_item_type: Option<&'static str>,\n");
        output.push_str("}\n\n");

        output.push_str("/// One service operation.\n");
        output.push_str("#[derive(Debug, Clone, Copy)]\n");
        output.push_str("pub struct OperationDef {\n");
        output.push_str("    pub name: &'static str,\n");
        output.push_str("    pub action: &'static str,\n");
        output.push_str("    pub body_type: &'static str,\n");
        output.push_str("    pub request_type: &'static str,\n");
        output.push_str("    pub request: &'static str,\n");
        output.push_str("    pub response_element: &'static str,\n");
        output.push_str("    pub response_name: &'static str,\n");
        output.push_str("    pub response: &'static str,\n");
        output.push_str("}\n\n");

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_order() {
        let artifact = GraphArtifact {
            types: Vec::new(),
            operations: Vec::new(),
            request_headers: None,
            response_headers: None,
            diagnostics: Vec::new(),
        };
        let output = Generator::new(&artifact).generate();

        assert!(output.starts_with("// Code generated by xsdgraph; DO NOT EDIT.\n"));
        assert!(output.contains("// 0 types, 0 operations."));
        let preamble = output.find("pub struct TypeDef").unwrap();
        let types = output.find("pub static TYPES").unwrap();
        let operations = output.find("pub static OPERATIONS").unwrap();
        assert!(preamble < types && types < operations);
    }
}
