//! Project configuration (`xsdgraph.yaml`).
//!
//! Relative paths in the file are resolved against the directory that
//! holds it.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xsdgraph_codegen::{ArtifactOptions, DEFAULT_TYPE_SUFFIX, OutputFormat, Prefixes};
use xsdgraph_schema::{
    CompileError, OperationDescriptor, OverrideError, OverrideTable, ParseError, QName,
    ResolveOptions, SchemaDocument, SchemaError, SchemaSet, TypeGraph, XSD_NAMESPACE, compile,
    parse_operations,
};

/// Name of the bundled Exchange Web Services override table.
pub const BUILTIN_EXCHANGE: &str = "exchange";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration file is malformed.
    #[error("invalid configuration: {0}")]
    Format(#[from] serde_yaml::Error),

    /// No schema documents were listed.
    #[error("no schema documents configured")]
    NoSchemas,

    /// A schema or WSDL document failed to parse.
    #[error("in '{path}': {source}")]
    Document {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        source: ParseError,
    },

    /// A name uses a prefix missing from the namespace map.
    #[error("unknown prefix in '{name}'")]
    UnknownPrefix {
        /// The offending name.
        name: String,
    },

    /// The requested builtin override table does not exist.
    #[error("unknown builtin override table '{name}'")]
    UnknownBuiltin {
        /// Requested table name.
        name: String,
    },

    /// The documents could not be linked.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The override table could not be loaded.
    #[error(transparent)]
    Override(#[from] OverrideError),

    /// The type graph could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn document(path: &Path, source: ParseError) -> Self {
        Self::Document {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where the override table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OverrideSource {
    /// A table bundled with the crate.
    Builtin {
        /// Table name.
        builtin: String,
    },
    /// A YAML file.
    Path(PathBuf),
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Destination file; standard output when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// A project configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema documents, in load order.
    pub schemas: Vec<PathBuf>,
    /// WSDL document with the operation bindings.
    #[serde(default)]
    pub wsdl: Option<PathBuf>,
    /// Override table; none means no corrections.
    #[serde(default)]
    pub overrides: Option<OverrideSource>,
    /// Prefix to namespace map. Its namespaces are the known namespaces and
    /// its prefixes shorten emitted names.
    #[serde(default)]
    pub namespaces: IndexMap<String, String>,
    /// Elements that may be untyped because they only appear as headers.
    #[serde(default)]
    pub header_only_elements: Vec<String>,
    /// Suffix appended to serialized type names.
    #[serde(default = "default_type_suffix")]
    pub type_suffix: String,
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_type_suffix() -> String {
    DEFAULT_TYPE_SUFFIX.to_string()
}

impl Config {
    /// Parses a configuration; relative paths resolve against `base_dir`.
    ///
    /// # Errors
    /// Returns `ConfigError::Format` if the YAML is malformed.
    pub fn from_yaml(yaml: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.base_dir = base_dir.into();
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_yaml(&yaml, base_dir)
    }

    /// Resolves a path against the configuration directory.
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Returns the output destination, if any.
    #[must_use]
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.path.as_deref().map(|p| self.resolve_path(p))
    }

    /// Builds the prefix map used for emitted names.
    #[must_use]
    pub fn prefixes(&self) -> Prefixes {
        self.namespaces
            .iter()
            .map(|(prefix, namespace)| (prefix.as_str(), namespace.as_str()))
            .collect()
    }

    /// Builds the artifact settings.
    #[must_use]
    pub fn artifact_options(&self) -> ArtifactOptions {
        ArtifactOptions {
            type_suffix: self.type_suffix.clone(),
            prefixes: self.prefixes(),
        }
    }

    /// Builds the resolver settings.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownPrefix` if a header-only element name
    /// uses an unmapped prefix.
    pub fn resolve_options(&self) -> Result<ResolveOptions, ConfigError> {
        let known_namespaces = self
            .namespaces
            .values()
            .filter(|ns| ns.as_str() != XSD_NAMESPACE)
            .cloned()
            .collect();
        let header_only_elements = self
            .header_only_elements
            .iter()
            .map(|name| self.qualify(name))
            .collect::<Result<_, _>>()?;
        Ok(ResolveOptions {
            known_namespaces,
            header_only_elements,
        })
    }

    /// Expands `prefix:local`, `{ns}local` or a bare local name.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownPrefix` for an unmapped prefix.
    pub fn qualify(&self, name: &str) -> Result<QName, ConfigError> {
        if name.starts_with('{') {
            return Ok(QName::from_clark(name));
        }
        match name.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self.namespaces.get(prefix).ok_or_else(|| {
                    ConfigError::UnknownPrefix {
                        name: name.to_string(),
                    }
                })?;
                Ok(QName::new(Some(namespace.as_str()), local))
            }
            None => Ok(QName::new(None, name)),
        }
    }

    /// Loads the configured override table.
    ///
    /// # Errors
    /// Returns `ConfigError` if the table cannot be read or parsed.
    pub fn override_table(&self) -> Result<OverrideTable, ConfigError> {
        match &self.overrides {
            None => Ok(OverrideTable::default()),
            Some(OverrideSource::Builtin { builtin }) if builtin == BUILTIN_EXCHANGE => {
                Ok(OverrideTable::exchange()?)
            }
            Some(OverrideSource::Builtin { builtin }) => Err(ConfigError::UnknownBuiltin {
                name: builtin.clone(),
            }),
            Some(OverrideSource::Path(path)) => {
                Ok(OverrideTable::from_file(self.resolve_path(path))?)
            }
        }
    }

    /// Reads and links the schema documents.
    ///
    /// # Errors
    /// Returns `ConfigError` if a document cannot be read, parsed or linked.
    pub fn schema_set(&self) -> Result<SchemaSet, ConfigError> {
        if self.schemas.is_empty() {
            return Err(ConfigError::NoSchemas);
        }
        let mut set = SchemaSet::new();
        for path in &self.schemas {
            let path = self.resolve_path(path);
            let xml = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
            let document =
                SchemaDocument::parse(&xml).map_err(|e| ConfigError::document(&path, e))?;
            set.add_document(document)
                .map_err(|e| ConfigError::document(&path, e))?;
            tracing::debug!(path = %path.display(), "loaded schema document");
        }
        set.link()?;
        Ok(set)
    }

    /// Reads the operation bindings; empty when no WSDL is configured.
    ///
    /// # Errors
    /// Returns `ConfigError` if the WSDL cannot be read or parsed.
    pub fn operations(&self) -> Result<Vec<OperationDescriptor>, ConfigError> {
        let Some(path) = &self.wsdl else {
            return Ok(Vec::new());
        };
        let path = self.resolve_path(path);
        let xml = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        parse_operations(&xml).map_err(|e| ConfigError::document(&path, e))
    }

    /// Runs the whole pipeline.
    ///
    /// # Errors
    /// Returns `ConfigError` if any input fails to load or the graph fails
    /// to compile.
    pub fn compile(&self) -> Result<TypeGraph, ConfigError> {
        let set = self.schema_set()?;
        let operations = self.operations()?;
        let overrides = self.override_table()?;
        let options = self.resolve_options()?;
        Ok(compile(&set, operations, &overrides, &options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
schemas:
  - types.xsd
  - /abs/messages.xsd
wsdl: services.wsdl
overrides:
  builtin: exchange
namespaces:
  t: urn:t
  xs: http://www.w3.org/2001/XMLSchema
header_only_elements:
  - t:Version
  - "{urn:x}Culture"
  - Plain
output:
  path: out/graph.yaml
  format: yaml
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(CONFIG, "/project").expect("Failed to parse config");

        assert_eq!(config.schemas.len(), 2);
        assert_eq!(
            config.resolve_path(&config.schemas[0]),
            PathBuf::from("/project/types.xsd")
        );
        assert_eq!(
            config.resolve_path(&config.schemas[1]),
            PathBuf::from("/abs/messages.xsd")
        );
        assert_eq!(config.output_path(), Some(PathBuf::from("/project/out/graph.yaml")));
        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert_eq!(config.type_suffix, DEFAULT_TYPE_SUFFIX);
        assert_eq!(
            config.overrides,
            Some(OverrideSource::Builtin {
                builtin: "exchange".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_options() {
        let config = Config::from_yaml(CONFIG, "/project").expect("Failed to parse config");
        let options = config.resolve_options().expect("Failed to build options");

        assert_eq!(options.known_namespaces, vec!["urn:t".to_string()]);
        assert_eq!(
            options.header_only_elements,
            vec![
                QName::new(Some("urn:t"), "Version"),
                QName::new(Some("urn:x"), "Culture"),
                QName::new(None, "Plain"),
            ]
        );
    }

    #[test]
    fn test_override_sources() {
        let path = Config::from_yaml("schemas: [a.xsd]\noverrides: fixes.yaml\n", "/p")
            .expect("Failed to parse config");
        assert_eq!(
            path.overrides,
            Some(OverrideSource::Path(PathBuf::from("fixes.yaml")))
        );

        let unknown = Config::from_yaml("schemas: [a.xsd]\noverrides: { builtin: other }\n", "/p")
            .expect("Failed to parse config");
        assert!(matches!(
            unknown.override_table(),
            Err(ConfigError::UnknownBuiltin { .. })
        ));

        let none = Config::from_yaml("schemas: [a.xsd]\n", "/p").expect("Failed to parse config");
        assert_eq!(none.override_table().expect("Failed to load"), OverrideTable::default());
    }

    #[test]
    fn test_unknown_prefix() {
        let config = Config::from_yaml("schemas: [a.xsd]\nheader_only_elements: [q:Foo]\n", "/p")
            .expect("Failed to parse config");
        assert!(matches!(
            config.resolve_options(),
            Err(ConfigError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(Config::from_yaml("schemas: []\nschema: x\n", "/p").is_err());
    }

    #[test]
    fn test_no_schemas() {
        let config = Config::from_yaml("schemas: []\n", "/p").expect("Failed to parse config");
        assert!(matches!(config.schema_set(), Err(ConfigError::NoSchemas)));
    }
}
