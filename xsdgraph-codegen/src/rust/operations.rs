//! Operation table code generation.

use super::{opt_literal, str_literal};
use crate::artifact::{GraphArtifact, OperationArtifact};

/// Generator for the static operation table.
pub struct OperationGenerator<'a> {
    artifact: &'a GraphArtifact,
}

impl<'a> OperationGenerator<'a> {
    /// Creates a new operation generator.
    #[must_use]
    pub fn new(artifact: &'a GraphArtifact) -> Self {
        Self { artifact }
    }

    /// Generates the operation table, its lookup function and the header
    /// type names.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str("/// Type holding every request header element.\n");
        output.push_str(&format!(
            "pub const REQUEST_HEADERS: Option<&str> = {};\n\n",
            opt_literal(self.artifact.request_headers.as_deref())
        ));
        output.push_str("/// Type holding every response header element.\n");
        output.push_str(&format!(
            "pub const RESPONSE_HEADERS: Option<&str> = {};\n\n",
            opt_literal(self.artifact.response_headers.as_deref())
        ));

        output.push_str("/// Every operation, sorted by name.\n");
        output.push_str("pub static OPERATIONS: &[OperationDef] = &[\n");
        for op in &self.artifact.operations {
            output.push_str(&self.generate_operation(op));
        }
        output.push_str("];\n\n");

        output.push_str("/// Looks up an operation by name.\n");
        output.push_str("#[must_use]\n");
        output.push_str("pub fn lookup_operation(name: &str) -> Option<&'static OperationDef> {\n");
        output.push_str("    OPERATIONS\n");
        output.push_str("        .binary_search_by(|op| op.name.cmp(name))\n");
        output.push_str("        .ok()\n");
        output.push_str("        .map(|i| &OPERATIONS[i])\n");
        output.push_str("}\n\n");

        output
    }

    fn generate_operation(&self, op: &OperationArtifact) -> String {
        let mut output = String::new();
        output.push_str("    OperationDef {\n");
        for (field, value) in [
            ("name", &op.name),
            ("action", &op.action),
            ("body_type", &op.body_type),
            ("request_type", &op.request_type),
            ("request", &op.request),
            ("response_element", &op.response_element),
            ("response_name", &op.response_name),
            ("response", &op.response),
        ] {
            output.push_str(&format!("        {field}: {},\n", str_literal(value)));
        }
        output.push_str("    },\n");
        output
    }
}
