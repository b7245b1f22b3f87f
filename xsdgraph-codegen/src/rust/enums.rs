//! Enum code generation.

use super::str_literal;
use crate::artifact::{GraphArtifact, TypeArtifact};
use crate::naming::rust_ident;
use std::collections::HashSet;

/// Names declared by the module preamble.
const PREAMBLE_TYPES: [&str; 5] = ["SimpleKind", "ElementDef", "AttributeDef", "TypeDef", "OperationDef"];

/// Generator for enum simple types.
pub struct EnumGenerator<'a> {
    artifact: &'a GraphArtifact,
}

impl<'a> EnumGenerator<'a> {
    /// Creates a new enum generator.
    #[must_use]
    pub fn new(artifact: &'a GraphArtifact) -> Self {
        Self { artifact }
    }

    /// Generates one Rust enum per enum simple type.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();
        let mut taken: HashSet<String> = PREAMBLE_TYPES.iter().map(ToString::to_string).collect();

        for type_artifact in &self.artifact.types {
            if type_artifact.simple_kind != Some("enum") || type_artifact.enum_values.is_empty() {
                continue;
            }
            let rust_name = unique_name(&type_artifact.name, &mut taken);
            output.push_str(&self.generate_enum(&rust_name, type_artifact));
        }

        output
    }

    /// Generates an enum definition.
    fn generate_enum(&self, rust_name: &str, t: &TypeArtifact) -> String {
        let mut output = String::new();
        let variants = variant_names(&t.enum_values);

        output.push_str(&format!("/// Values of `{}`.\n", t.name));
        output.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n");
        output.push_str(&format!("pub enum {rust_name} {{\n"));
        for (variant, literal) in variants.iter().zip(&t.enum_values) {
            output.push_str(&format!("    /// `{literal}`.\n"));
            output.push_str(&format!("    {variant},\n"));
        }
        output.push_str("}\n\n");

        output.push_str(&format!("impl {rust_name} {{\n"));
        output.push_str("    /// Returns the schema literal.\n");
        output.push_str("    #[must_use]\n");
        output.push_str("    pub const fn as_str(self) -> &'static str {\n");
        output.push_str("        match self {\n");
        for (variant, literal) in variants.iter().zip(&t.enum_values) {
            output.push_str(&format!(
                "            Self::{variant} => {},\n",
                str_literal(literal)
            ));
        }
        output.push_str("        }\n");
        output.push_str("    }\n\n");

        output.push_str("    /// Parses a schema literal.\n");
        output.push_str("    #[must_use]\n");
        output.push_str("    pub fn parse(value: &str) -> Option<Self> {\n");
        output.push_str("        match value {\n");
        for (variant, literal) in variants.iter().zip(&t.enum_values) {
            output.push_str(&format!(
                "            {} => Some(Self::{variant}),\n",
                str_literal(literal)
            ));
        }
        output.push_str("            _ => None,\n");
        output.push_str("        }\n");
        output.push_str("    }\n");
        output.push_str("}\n\n");

        output
    }
}

/// Picks a Rust name for a type, qualifying it with its prefix on clashes.
fn unique_name(type_name: &str, taken: &mut HashSet<String>) -> String {
    let (prefix, local) = type_name.rsplit_once(':').unwrap_or(("", type_name));
    let mut name = rust_ident(local);
    if !taken.insert(name.clone()) {
        name = rust_ident(&format!("{prefix}_{local}"));
        let base = name.clone();
        let mut n = 2;
        while !taken.insert(name.clone()) {
            name = format!("{base}{n}");
            n += 1;
        }
    }
    name
}

/// Turns literals into distinct variant names.
fn variant_names(literals: &[String]) -> Vec<String> {
    let mut taken = HashSet::new();
    literals
        .iter()
        .map(|literal| {
            let base = rust_ident(literal);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_type(name: &str, values: &[&str]) -> TypeArtifact {
        TypeArtifact {
            name: name.to_string(),
            json_type: None,
            elements: Vec::new(),
            attributes: Vec::new(),
            extra_properties: Vec::new(),
            is_list: false,
            is_abstract: false,
            simple_kind: Some("enum"),
            any_attribute: false,
            text_attribute: None,
            list_name: None,
            enum_values: values.iter().map(ToString::to_string).collect(),
            list_item_type: None,
        }
    }

    fn artifact(types: Vec<TypeArtifact>) -> GraphArtifact {
        GraphArtifact {
            types,
            operations: Vec::new(),
            request_headers: None,
            response_headers: None,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_generate_enum() {
        let artifact = artifact(vec![enum_type("t:DayOfWeekType", &["Sunday", "Monday", "Weekday"])]);
        let output = EnumGenerator::new(&artifact).generate();

        assert!(output.contains("pub enum DayOfWeekType {"));
        assert!(output.contains("    Monday,\n"));
        assert!(output.contains("Self::Sunday => \"Sunday\","));
        assert!(output.contains("\"Weekday\" => Some(Self::Weekday),"));
    }

    #[test]
    fn test_name_clash_uses_prefix() {
        let artifact = artifact(vec![
            enum_type("m:ShapeType", &["A"]),
            enum_type("t:ShapeType", &["B"]),
        ]);
        let output = EnumGenerator::new(&artifact).generate();
        assert!(output.contains("pub enum ShapeType {"));
        assert!(output.contains("pub enum TShapeType {"));
    }

    #[test]
    fn test_preamble_name_is_qualified() {
        let artifact = artifact(vec![enum_type("t:SimpleKind", &["A"])]);
        let output = EnumGenerator::new(&artifact).generate();
        assert!(output.contains("pub enum TSimpleKind {"));
    }

    #[test]
    fn test_variant_names() {
        let literals: Vec<String> = ["8bit", "text/plain", "Text-Plain", ""]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            variant_names(&literals),
            vec!["V8bit", "TextPlain", "TextPlain2", "Empty"]
        );
    }

    #[test]
    fn test_generate_empty_artifact() {
        let mut not_enum = enum_type("t:NameType", &[]);
        not_enum.simple_kind = Some("string");
        let artifact = artifact(vec![not_enum]);
        let output = EnumGenerator::new(&artifact).generate();
        assert!(output.is_empty());
    }
}
