//! # xsdgraph Codegen
//!
//! Output stage for compiled type graphs.
//!
//! This crate provides:
//! - The serializable graph artifact (JSON and YAML)
//! - Rust table generation with per-enum types
//! - Name shortening and serialized type naming

pub mod artifact;
pub mod error;
pub mod generator;
pub mod naming;
pub mod rust;

pub use artifact::{ArtifactOptions, GraphArtifact};
pub use error::CodegenError;
pub use generator::Generator;
pub use naming::{DEFAULT_TYPE_SUFFIX, Prefixes};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use xsdgraph_schema::TypeGraph;

/// Output format of the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
    /// Rust source with static tables.
    Rust,
}

impl FromStr for OutputFormat {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "rust" | "rs" => Ok(Self::Rust),
            other => Err(CodegenError::generation(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

/// Renders a finished graph in the given format.
///
/// # Errors
/// Returns `CodegenError` if the artifact cannot be built or serialized.
pub fn render(
    graph: &TypeGraph,
    format: OutputFormat,
    options: &ArtifactOptions,
) -> Result<String, CodegenError> {
    let artifact = GraphArtifact::build(graph, options)?;
    tracing::debug!(
        types = artifact.types.len(),
        operations = artifact.operations.len(),
        ?format,
        "rendering graph"
    );
    match format {
        OutputFormat::Json => artifact.to_json(),
        OutputFormat::Yaml => artifact.to_yaml(),
        OutputFormat::Rust => Ok(Generator::new(&artifact).generate()),
    }
}

/// Renders a graph and writes it to a file.
///
/// # Errors
/// Returns `CodegenError` if rendering or writing fails.
pub fn render_to_file(
    graph: &TypeGraph,
    format: OutputFormat,
    options: &ArtifactOptions,
    path: &std::path::Path,
) -> Result<(), CodegenError> {
    let output = render(graph, format, options)?;
    std::fs::write(path, output)?;
    tracing::info!(path = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xsdgraph_schema::{OverrideTable, ResolveOptions, SchemaSet, compile};

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:t="urn:t" targetNamespace="urn:t" elementFormDefault="qualified">
    <xs:simpleType name="ColorType">
        <xs:restriction base="xs:string">
            <xs:enumeration value="Red"/>
            <xs:enumeration value="Blue"/>
        </xs:restriction>
    </xs:simpleType>
    <xs:complexType name="PaintType">
        <xs:sequence>
            <xs:element name="Color" type="t:ColorType"/>
        </xs:sequence>
    </xs:complexType>
    <xs:element name="Paint" type="t:PaintType"/>
</xs:schema>"#;

    fn graph() -> TypeGraph {
        let set = SchemaSet::from_sources(&[SCHEMA]).expect("Failed to link");
        compile(&set, Vec::new(), &OverrideTable::default(), &ResolveOptions::default())
            .expect("Failed to compile")
    }

    fn options() -> ArtifactOptions {
        ArtifactOptions {
            prefixes: [("t", "urn:t")].into_iter().collect(),
            ..ArtifactOptions::default()
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("rust".parse::<OutputFormat>().unwrap(), OutputFormat::Rust);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_formats() {
        let graph = graph();

        let json = render(&graph, OutputFormat::Json, &options()).expect("Failed to render");
        assert!(json.contains("\"t:PaintType\""));
        assert!(json.contains("\"Paint:#Exchange\""));

        let yaml = render(&graph, OutputFormat::Yaml, &options()).expect("Failed to render");
        assert!(yaml.contains("t:ColorType"));

        let rust = render(&graph, OutputFormat::Rust, &options()).expect("Failed to render");
        assert!(rust.contains("pub enum ColorType {"));
        assert!(rust.contains("name: \"t:PaintType\""));
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("graph.json");
        render_to_file(&graph(), OutputFormat::Json, &options(), &path).expect("Failed to write");

        let written = std::fs::read_to_string(&path).expect("Failed to read");
        let value: serde_json::Value = serde_json::from_str(&written).expect("Failed to parse");
        assert!(value["types"].as_array().unwrap().len() >= 2);
    }
}
