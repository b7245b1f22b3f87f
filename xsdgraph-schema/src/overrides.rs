//! Curated override table and the engine that applies it.
//!
//! The table is versioned YAML data. Names in it use prefixes bound by the
//! table's own `namespaces` map and are expanded to registry keys (Clark
//! form) when the table is loaded; unprefixed names stay bare, which is how
//! synthesized types such as `JsonRequestHeaders` are keyed.

use crate::error::OverrideError;
use crate::ir::{SimpleKind, TypeGraph, TypeId};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const EXCHANGE_TABLE: &str = include_str!("../data/exchange.yaml");

/// Key of a choice group entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChoiceKey {
    /// Owning type key.
    pub type_name: String,
    /// Zero-based choice group index, `None` for an outer choice.
    pub index: Option<usize>,
}

/// Simple-kind correction for one type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SimpleKindOverride {
    /// Force boolean.
    Boolean,
    /// Force decimal.
    Decimal,
    /// Force string.
    String,
    /// Force enum.
    Enum,
    /// Force list of enum with the given item type.
    List {
        /// Item type key.
        item: String,
    },
}

/// Serialized-name correction for elements of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNameOverride {
    /// Owning type key.
    pub type_name: String,
    /// Element keys.
    pub elements: Vec<String>,
    /// Serialized name to assign.
    pub name: String,
}

/// A per-element correction carrying a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementOverride<T> {
    /// Owning type key.
    pub type_name: String,
    /// Element key.
    pub element: String,
    /// The value to assign.
    pub value: T,
}

/// Versioned corrections, keyed by registry key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    /// Table version label.
    pub version: String,
    /// Shared serialized names of choice groups.
    pub choice_groups: IndexMap<ChoiceKey, Option<String>>,
    /// Serialized type names.
    pub type_names: IndexMap<String, String>,
    /// Collection wrapper names.
    pub list_names: IndexMap<String, String>,
    /// Serialization-only extra properties.
    pub extra_properties: IndexMap<String, Vec<String>>,
    /// Text attribute names.
    pub text_attributes: IndexMap<String, String>,
    /// Simple-kind corrections.
    pub simple_kinds: IndexMap<String, SimpleKindOverride>,
    /// Element serialized names.
    pub element_names: Vec<ElementNameOverride>,
    /// Element format hints.
    pub element_hints: Vec<ElementOverride<String>>,
    /// Element default literals.
    pub element_defaults: Vec<ElementOverride<serde_json::Value>>,
    /// Alias name to operation name.
    pub operation_aliases: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    version: String,
    #[serde(default)]
    namespaces: IndexMap<String, String>,
    #[serde(default)]
    choice_groups: Vec<RawChoiceGroup>,
    #[serde(default)]
    type_names: IndexMap<String, String>,
    #[serde(default)]
    list_names: IndexMap<String, String>,
    #[serde(default)]
    extra_properties: IndexMap<String, Vec<String>>,
    #[serde(default)]
    text_attributes: IndexMap<String, String>,
    #[serde(default)]
    simple_kinds: IndexMap<String, SimpleKindOverride>,
    #[serde(default)]
    element_names: Vec<RawElementName>,
    #[serde(default)]
    element_hints: Vec<RawElementHint>,
    #[serde(default)]
    element_defaults: Vec<RawElementDefault>,
    #[serde(default)]
    operation_aliases: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChoiceGroup {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    index: Option<usize>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawElementName {
    #[serde(rename = "type")]
    type_name: String,
    elements: Vec<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawElementHint {
    #[serde(rename = "type")]
    type_name: String,
    element: String,
    hint: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawElementDefault {
    #[serde(rename = "type")]
    type_name: String,
    element: String,
    default: serde_json::Value,
}

struct Expander<'a> {
    namespaces: &'a IndexMap<String, String>,
}

impl Expander<'_> {
    fn expand(&self, name: &str) -> Result<String, OverrideError> {
        if name.starts_with('{') {
            return Ok(name.to_string());
        }
        match name.split_once(':') {
            Some((prefix, local)) => {
                let namespace =
                    self.namespaces
                        .get(prefix)
                        .ok_or_else(|| OverrideError::UnknownPrefix {
                            prefix: prefix.to_string(),
                            name: name.to_string(),
                        })?;
                Ok(format!("{{{namespace}}}{local}"))
            }
            None => Ok(name.to_string()),
        }
    }

    fn expand_keys<V>(&self, map: IndexMap<String, V>) -> Result<IndexMap<String, V>, OverrideError> {
        map.into_iter()
            .map(|(k, v)| Ok((self.expand(&k)?, v)))
            .collect()
    }
}

impl OverrideTable {
    /// Parses a table from YAML.
    ///
    /// # Errors
    /// Returns `OverrideError` if the YAML is malformed or uses an unbound
    /// prefix.
    pub fn from_yaml(yaml: &str) -> Result<Self, OverrideError> {
        let raw: RawTable = serde_yaml::from_str(yaml)?;
        let ex = Expander {
            namespaces: &raw.namespaces,
        };

        let mut choice_groups = IndexMap::new();
        for group in raw.choice_groups {
            let key = ChoiceKey {
                type_name: ex.expand(&group.type_name)?,
                index: group.index,
            };
            choice_groups.insert(key, group.name);
        }

        let simple_kinds = raw
            .simple_kinds
            .into_iter()
            .map(|(name, kind)| {
                let kind = match kind {
                    SimpleKindOverride::List { item } => SimpleKindOverride::List {
                        item: ex.expand(&item)?,
                    },
                    other => other,
                };
                Ok((ex.expand(&name)?, kind))
            })
            .collect::<Result<_, OverrideError>>()?;

        let element_names = raw
            .element_names
            .into_iter()
            .map(|entry| {
                Ok(ElementNameOverride {
                    type_name: ex.expand(&entry.type_name)?,
                    elements: entry
                        .elements
                        .iter()
                        .map(|e| ex.expand(e))
                        .collect::<Result<_, _>>()?,
                    name: entry.name,
                })
            })
            .collect::<Result<_, OverrideError>>()?;

        let element_hints = raw
            .element_hints
            .into_iter()
            .map(|entry| {
                Ok(ElementOverride {
                    type_name: ex.expand(&entry.type_name)?,
                    element: ex.expand(&entry.element)?,
                    value: entry.hint,
                })
            })
            .collect::<Result<_, OverrideError>>()?;

        let element_defaults = raw
            .element_defaults
            .into_iter()
            .map(|entry| {
                Ok(ElementOverride {
                    type_name: ex.expand(&entry.type_name)?,
                    element: ex.expand(&entry.element)?,
                    value: entry.default,
                })
            })
            .collect::<Result<_, OverrideError>>()?;

        Ok(Self {
            version: raw.version,
            choice_groups,
            type_names: ex.expand_keys(raw.type_names)?,
            list_names: ex.expand_keys(raw.list_names)?,
            extra_properties: ex.expand_keys(raw.extra_properties)?,
            text_attributes: ex.expand_keys(raw.text_attributes)?,
            simple_kinds,
            element_names,
            element_hints,
            element_defaults,
            operation_aliases: raw.operation_aliases,
        })
    }

    /// Reads a table from a YAML file.
    ///
    /// # Errors
    /// Returns `OverrideError` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OverrideError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Returns the bundled Exchange Web Services table.
    ///
    /// # Errors
    /// Returns `OverrideError` if the bundled data fails to parse.
    pub fn exchange() -> Result<Self, OverrideError> {
        Self::from_yaml(EXCHANGE_TABLE)
    }

    /// Looks up a choice group entry.
    ///
    /// The outer `Option` tells whether the entry exists; the inner one is
    /// the entry's name, which may be absent.
    #[must_use]
    pub fn choice_group(&self, type_name: &str, index: Option<usize>) -> Option<Option<&str>> {
        let key = ChoiceKey {
            type_name: type_name.to_string(),
            index,
        };
        self.choice_groups.get(&key).map(Option::as_deref)
    }
}

/// Applies an [`OverrideTable`] to a finished graph.
///
/// Every step targets existing keys; a stale key is an error. Applying the
/// same table twice leaves the graph unchanged.
#[derive(Debug, Clone, Copy)]
pub struct OverrideEngine<'t> {
    table: &'t OverrideTable,
}

impl<'t> OverrideEngine<'t> {
    /// Creates an engine for a table.
    #[must_use]
    pub fn new(table: &'t OverrideTable) -> Self {
        Self { table }
    }

    /// Applies every correction in order.
    ///
    /// # Errors
    /// Returns `OverrideError` naming the first correction whose target does
    /// not exist.
    pub fn apply(&self, graph: &mut TypeGraph) -> Result<(), OverrideError> {
        let table = self.table;

        for (key, name) in &table.type_names {
            let id = type_id(graph, key)?;
            graph.types[id].serialized_name = Some(name.clone());
        }
        debug!("Applied {} type names", table.type_names.len());

        for (key, name) in &table.list_names {
            let id = type_id(graph, key)?;
            graph.types[id].list_name = Some(name.clone());
        }

        for (key, extra) in &table.extra_properties {
            let id = type_id(graph, key)?;
            graph.types[id].extra_properties.clone_from(extra);
        }

        for (key, attribute) in &table.text_attributes {
            let id = type_id(graph, key)?;
            graph.types[id].text_attribute = Some(attribute.clone());
        }

        for (key, kind) in &table.simple_kinds {
            apply_simple_kind(graph, key, kind)?;
        }

        for entry in &table.element_names {
            let id = type_id(graph, &entry.type_name)?;
            for element in &entry.elements {
                element_mut(graph, id, &entry.type_name, element)?.serialized_name =
                    Some(entry.name.clone());
            }
        }
        debug!("Applied {} element name groups", table.element_names.len());

        for entry in &table.element_hints {
            let id = type_id(graph, &entry.type_name)?;
            element_mut(graph, id, &entry.type_name, &entry.element)?.format_hint =
                Some(entry.value.clone());
        }

        for entry in &table.element_defaults {
            let id = type_id(graph, &entry.type_name)?;
            element_mut(graph, id, &entry.type_name, &entry.element)?.default_value =
                Some(entry.value.clone());
        }

        for (alias, target) in &table.operation_aliases {
            let op = graph
                .operations
                .get(target)
                .cloned()
                .ok_or_else(|| OverrideError::UnknownOperation {
                    name: target.clone(),
                })?;
            if let Some(existing) = graph.operations.get(alias) {
                if *existing != op {
                    return Err(OverrideError::DuplicateOperation {
                        name: target.clone(),
                        alias: alias.clone(),
                    });
                }
                continue;
            }
            graph.operations.insert(alias.clone(), op);
        }

        info!("Applied override table '{}'", table.version);
        Ok(())
    }
}

fn type_id(graph: &TypeGraph, key: &str) -> Result<TypeId, OverrideError> {
    graph
        .types
        .lookup(key)
        .ok_or_else(|| OverrideError::UnknownType {
            name: key.to_string(),
        })
}

fn element_mut<'g>(
    graph: &'g mut TypeGraph,
    id: TypeId,
    type_name: &str,
    element: &str,
) -> Result<&'g mut crate::ir::ElementDescriptor, OverrideError> {
    graph.types[id]
        .elements
        .get_mut(element)
        .ok_or_else(|| OverrideError::UnknownElement {
            type_name: type_name.to_string(),
            element: element.to_string(),
        })
}

fn apply_simple_kind(
    graph: &mut TypeGraph,
    key: &str,
    kind: &SimpleKindOverride,
) -> Result<(), OverrideError> {
    let id = type_id(graph, key)?;
    let (simple_kind, item) = match kind {
        SimpleKindOverride::Boolean => (SimpleKind::Boolean, None),
        SimpleKindOverride::Decimal => (SimpleKind::Decimal, None),
        SimpleKindOverride::String => (SimpleKind::String, None),
        SimpleKindOverride::Enum => (SimpleKind::Enum, None),
        SimpleKindOverride::List { item } => {
            let item_id = type_id(graph, item)?;
            if item_id == id {
                return Err(OverrideError::InvalidSimpleKind {
                    name: key.to_string(),
                    message: "a list cannot be its own item type".to_string(),
                });
            }
            (SimpleKind::ListOfEnum, Some(item_id))
        }
    };
    let schema_type = &mut graph.types[id];
    schema_type.simple_kind = Some(simple_kind);
    schema_type.list_item_type = item;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ElementDescriptor, SchemaType};
    use crate::types::QName;
    use crate::wsdl::OperationDescriptor;

    const TABLE: &str = r#"
version: test-1
namespaces:
  t: urn:t
choice_groups:
  - { type: t:FooType, index: 0, name: Item }
  - { type: t:BarType, name: null }
  - { type: t:BazType, name: "" }
type_names:
  t:FooType: Foo2
list_names:
  t:FooType: Changes
extra_properties:
  t:FooType: [ChangeType]
text_attributes:
  t:PhoneType: PhoneNumber
simple_kinds:
  t:DayType: { kind: enum }
  t:DaysType: { kind: list, item: t:DayType }
element_names:
  - { type: t:FooType, elements: [t:Create], name: Item }
element_hints:
  - { type: t:FooType, element: t:Create, hint: "CreateType:#Exchange" }
element_defaults:
  - type: t:FooType
    element: t:Create
    default: { __type: "View:#Exchange", Offset: 0 }
operation_aliases:
  PingRequest: Ping
"#;

    fn graph() -> TypeGraph {
        let mut graph = TypeGraph::default();
        let string = graph
            .types
            .reserve(SchemaType::new(Some("urn:x"), "string", false))
            .unwrap();
        let mut foo = SchemaType::new(Some("urn:t"), "FooType", false);
        foo.elements.insert(
            "{urn:t}Create".to_string(),
            ElementDescriptor::new(string, false),
        );
        graph.types.reserve(foo).unwrap();
        for name in ["PhoneType", "DayType", "DaysType"] {
            let mut simple = SchemaType::new(Some("urn:t"), name, false);
            simple.simple_kind = Some(SimpleKind::String);
            graph.types.reserve(simple).unwrap();
        }
        let op = OperationDescriptor {
            action: "Ping".to_string(),
            input: QName::new(Some("urn:m"), "Ping"),
            output: QName::new(Some("urn:m"), "PingResponse"),
            input_headers: Vec::new(),
            output_headers: Vec::new(),
        };
        graph.operations.insert("Ping".to_string(), op);
        graph
    }

    #[test]
    fn test_parse_table() {
        let table = OverrideTable::from_yaml(TABLE).expect("Failed to parse");
        assert_eq!(table.version, "test-1");
        assert_eq!(table.choice_group("{urn:t}FooType", Some(0)), Some(Some("Item")));
        assert_eq!(table.choice_group("{urn:t}BarType", None), Some(None));
        assert_eq!(table.choice_group("{urn:t}BazType", None), Some(Some("")));
        assert_eq!(table.choice_group("{urn:t}FooType", None), None);
        assert_eq!(
            table.simple_kinds.get("{urn:t}DaysType"),
            Some(&SimpleKindOverride::List {
                item: "{urn:t}DayType".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_prefix() {
        let yaml = "version: x\ntype_names: { q:FooType: Foo }\n";
        assert!(matches!(
            OverrideTable::from_yaml(yaml),
            Err(OverrideError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn test_apply_overrides() {
        let table = OverrideTable::from_yaml(TABLE).unwrap();
        let mut graph = graph();
        OverrideEngine::new(&table).apply(&mut graph).expect("Failed to apply");

        let foo = graph.type_by_key("{urn:t}FooType").unwrap();
        assert_eq!(foo.serialized_name.as_deref(), Some("Foo2"));
        assert_eq!(foo.list_name.as_deref(), Some("Changes"));
        assert_eq!(foo.extra_properties, vec!["ChangeType".to_string()]);

        let create = &foo.elements["{urn:t}Create"];
        assert_eq!(create.serialized_name.as_deref(), Some("Item"));
        assert_eq!(create.format_hint.as_deref(), Some("CreateType:#Exchange"));
        let default = create.default_value.as_ref().unwrap();
        assert_eq!(default.to_string(), r#"{"__type":"View:#Exchange","Offset":0}"#);

        let phone = graph.type_by_key("{urn:t}PhoneType").unwrap();
        assert_eq!(phone.text_attribute.as_deref(), Some("PhoneNumber"));

        let days = graph.type_by_key("{urn:t}DaysType").unwrap();
        assert_eq!(days.simple_kind, Some(SimpleKind::ListOfEnum));
        let day_id = graph.types.lookup("{urn:t}DayType").unwrap();
        assert_eq!(days.list_item_type, Some(day_id));
        assert_eq!(graph.types[day_id].simple_kind, Some(SimpleKind::Enum));

        assert_eq!(graph.operations["PingRequest"].action, "Ping");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let table = OverrideTable::from_yaml(TABLE).unwrap();
        let mut graph = graph();
        let engine = OverrideEngine::new(&table);
        engine.apply(&mut graph).unwrap();
        let once: Vec<_> = graph.types.iter().map(|(_, t)| t.clone()).collect();
        engine.apply(&mut graph).expect("second application failed");
        let twice: Vec<_> = graph.types.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(once, twice);
        assert_eq!(graph.operations.len(), 2);
    }

    #[test]
    fn test_stale_type_key() {
        let table = OverrideTable::from_yaml("version: x\nlist_names: { Missing: Items }\n").unwrap();
        let mut graph = graph();
        let err = OverrideEngine::new(&table).apply(&mut graph).unwrap_err();
        assert!(matches!(err, OverrideError::UnknownType { ref name } if name == "Missing"));
    }

    #[test]
    fn test_stale_element_key() {
        let yaml = "version: x\nnamespaces: { t: 'urn:t' }\nelement_hints:\n  - { type: t:FooType, element: t:Gone, hint: H }\n";
        let table = OverrideTable::from_yaml(yaml).unwrap();
        let err = OverrideEngine::new(&table).apply(&mut graph()).unwrap_err();
        assert!(matches!(err, OverrideError::UnknownElement { .. }));
    }

    #[test]
    fn test_alias_conflict() {
        let table =
            OverrideTable::from_yaml("version: x\noperation_aliases: { Ping: Pong }\n").unwrap();
        let err = OverrideEngine::new(&table).apply(&mut graph()).unwrap_err();
        assert!(matches!(err, OverrideError::UnknownOperation { .. }));

        let mut graph = graph();
        let mut other = graph.operations["Ping"].clone();
        other.action = "Other".to_string();
        graph.operations.insert("Other".to_string(), other);
        let table =
            OverrideTable::from_yaml("version: x\noperation_aliases: { Ping: Other }\n").unwrap();
        let err = OverrideEngine::new(&table).apply(&mut graph).unwrap_err();
        assert!(matches!(err, OverrideError::DuplicateOperation { .. }));
    }

    #[test]
    fn test_exchange_table_loads() {
        let table = OverrideTable::exchange().expect("bundled table");
        let t = "{http://schemas.microsoft.com/exchange/services/2006/types}";
        let m = "{http://schemas.microsoft.com/exchange/services/2006/messages}";
        assert_eq!(
            table.type_names.get(&format!("{t}BodyType")).map(String::as_str),
            Some("BodyContentType")
        );
        assert_eq!(
            table.choice_group(&format!("{m}FindItemType"), Some(1)),
            Some(Some("Grouping"))
        );
        let restriction = table
            .element_names
            .iter()
            .find(|e| e.type_name == format!("{t}RestrictionType"))
            .unwrap();
        assert_eq!(restriction.elements.len(), 12);
        assert_eq!(
            table.operation_aliases.get("GetUserAvailabilityRequest").map(String::as_str),
            Some("GetUserAvailability")
        );
    }
}
