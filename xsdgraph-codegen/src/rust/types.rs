//! Type table code generation.

use super::{opt_literal, slice_literal, str_literal};
use crate::artifact::{ElementArtifact, GraphArtifact, TypeArtifact};

/// Generator for the static type table.
pub struct TypeGenerator<'a> {
    artifact: &'a GraphArtifact,
}

impl<'a> TypeGenerator<'a> {
    /// Creates a new type generator.
    #[must_use]
    pub fn new(artifact: &'a GraphArtifact) -> Self {
        Self { artifact }
    }

    /// Generates the type table and its lookup function.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str("/// Every resolved type, sorted by name.\n");
        output.push_str("pub static TYPES: &[TypeDef] = &[\n");
        for type_artifact in &self.artifact.types {
            output.push_str(&self.generate_type(type_artifact));
        }
        output.push_str("];\n\n");

        output.push_str("/// Looks up a type by name.\n");
        output.push_str("#[must_use]\n");
        output.push_str("pub fn lookup_type(name: &str) -> Option<&'static TypeDef> {\n");
        output.push_str("    TYPES\n");
        output.push_str("        .binary_search_by(|t| t.name.cmp(name))\n");
        output.push_str("        .ok()\n");
        output.push_str("        .map(|i| &TYPES[i])\n");
        output.push_str("}\n\n");

        output
    }

    /// Generates one table entry.
    fn generate_type(&self, t: &TypeArtifact) -> String {
        let mut output = String::new();

        output.push_str("    TypeDef {\n");
        output.push_str(&format!("        name: {},\n", str_literal(&t.name)));
        output.push_str(&format!(
            "        json_type: {},\n",
            opt_literal(t.json_type.as_deref())
        ));

        if t.elements.is_empty() {
            output.push_str("        elements: &[],\n");
        } else {
            output.push_str("        elements: &[\n");
            for element in &t.elements {
                output.push_str(&format!("            {},\n", element_literal(element)));
            }
            output.push_str("        ],\n");
        }

        if t.attributes.is_empty() {
            output.push_str("        attributes: &[],\n");
        } else {
            output.push_str("        attributes: &[\n");
            for attribute in &t.attributes {
                output.push_str(&format!(
                    "            AttributeDef {{ name: {}, type_name: {} }},\n",
                    str_literal(&attribute.name),
                    opt_literal(attribute.type_name.as_deref())
                ));
            }
            output.push_str("        ],\n");
        }

        output.push_str(&format!(
            "        extra_properties: {},\n",
            slice_literal(&t.extra_properties)
        ));
        output.push_str(&format!("        is_list: {},\n", t.is_list));
        output.push_str(&format!("        is_abstract: {},\n", t.is_abstract));
        output.push_str(&format!(
            "        simple_kind: {},\n",
            simple_kind_literal(t.simple_kind)
        ));
        output.push_str(&format!("        any_attribute: {},\n", t.any_attribute));
        output.push_str(&format!(
            "        text_attribute: {},\n",
            opt_literal(t.text_attribute.as_deref())
        ));
        output.push_str(&format!(
            "        list_name: {},\n",
            opt_literal(t.list_name.as_deref())
        ));
        output.push_str(&format!(
            "        enum_values: {},\n",
            slice_literal(&t.enum_values)
        ));
        output.push_str(&format!(
            "        list_item_type: {},\n",
            opt_literal(t.list_item_type.as_deref())
        ));
        output.push_str("    },\n");

        output
    }
}

fn element_literal(element: &ElementArtifact) -> String {
    let default = element.json_default.as_ref().map(ToString::to_string);
    format!(
        "ElementDef {{ xml_name: {}, json_name: {}, type_name: {}, is_list: {}, json_hint: {}, json_default: {} }}",
        str_literal(&element.xml_name),
        opt_literal(element.json_name.as_deref()),
        str_literal(&element.type_name),
        element.is_list,
        opt_literal(element.json_hint.as_deref()),
        opt_literal(default.as_deref())
    )
}

fn simple_kind_literal(kind: Option<&str>) -> String {
    let variant = match kind {
        None => return "None".to_string(),
        Some("boolean") => "Boolean",
        Some("decimal") => "Decimal",
        Some("enum") => "Enum",
        Some("list") => "List",
        Some(_) => "String",
    };
    format!("Some(SimpleKind::{variant})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::AttributeArtifact;

    fn type_artifact(name: &str) -> TypeArtifact {
        TypeArtifact {
            name: name.to_string(),
            json_type: None,
            elements: Vec::new(),
            attributes: Vec::new(),
            extra_properties: Vec::new(),
            is_list: false,
            is_abstract: false,
            simple_kind: None,
            any_attribute: false,
            text_attribute: None,
            list_name: None,
            enum_values: Vec::new(),
            list_item_type: None,
        }
    }

    fn artifact() -> GraphArtifact {
        let mut folder = type_artifact("m:FindFolderType");
        folder.json_type = Some("FindFolder:#Exchange".to_string());
        folder.elements.push(ElementArtifact {
            xml_name: "m:IndexedPageFolderView".to_string(),
            json_name: Some("Paging".to_string()),
            type_name: "t:IndexedPageViewType".to_string(),
            is_list: false,
            json_hint: None,
            json_default: Some(serde_json::json!({ "Offset": 0 })),
        });
        folder.attributes.push(AttributeArtifact {
            name: "Traversal".to_string(),
            type_name: Some("t:FolderQueryTraversalType".to_string()),
        });

        let mut phone = type_artifact("t:PhoneNumberDictionaryEntryType");
        phone.simple_kind = Some("string");
        phone.text_attribute = Some("PhoneNumber".to_string());

        GraphArtifact {
            types: vec![folder, phone],
            operations: Vec::new(),
            request_headers: None,
            response_headers: None,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_generate_table() {
        let artifact = artifact();
        let output = TypeGenerator::new(&artifact).generate();

        assert!(output.contains("pub static TYPES: &[TypeDef]"));
        assert!(output.contains("name: \"m:FindFolderType\""));
        assert!(output.contains("json_type: Some(\"FindFolder:#Exchange\")"));
        assert!(output.contains("json_name: Some(\"Paging\")"));
        assert!(output.contains(r#"json_default: Some("{\"Offset\":0}")"#));
        assert!(output.contains("AttributeDef { name: \"Traversal\""));
        assert!(output.contains("simple_kind: Some(SimpleKind::String)"));
        assert!(output.contains("text_attribute: Some(\"PhoneNumber\")"));
        assert!(output.contains("pub fn lookup_type"));
    }

    #[test]
    fn test_generate_empty() {
        let artifact = GraphArtifact {
            types: Vec::new(),
            operations: Vec::new(),
            request_headers: None,
            response_headers: None,
            diagnostics: Vec::new(),
        };
        let output = TypeGenerator::new(&artifact).generate();
        assert!(output.contains("pub static TYPES: &[TypeDef] = &[\n];"));
    }
}
