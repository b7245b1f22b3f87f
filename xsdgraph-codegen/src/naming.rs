//! Name conversions shared by the artifact and the Rust renderer.

use indexmap::IndexMap;
use xsdgraph_schema::{QName, SchemaType, XSD_NAMESPACE};

/// Suffix appended to serialized type names unless configured otherwise.
pub const DEFAULT_TYPE_SUFFIX: &str = ":#Exchange";

/// Suffix marking a type synthesized for an anonymous complex type.
const ANON_SUFFIX: &str = "AnonType";

/// Namespace to prefix map used to shorten qualified names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefixes {
    by_namespace: IndexMap<String, String>,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self::new()
    }
}

impl Prefixes {
    /// Creates a map that knows only the XSD namespace (`xs`).
    #[must_use]
    pub fn new() -> Self {
        let mut by_namespace = IndexMap::new();
        by_namespace.insert(XSD_NAMESPACE.to_string(), "xs".to_string());
        Self { by_namespace }
    }

    /// Binds a prefix to a namespace.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.by_namespace.insert(namespace.into(), prefix.into());
    }

    /// Renders `prefix:local`, or the full `{ns}local` form when the
    /// namespace is unbound.
    #[must_use]
    pub fn shorten(&self, name: &QName) -> String {
        match name.namespace() {
            None => name.local().to_string(),
            Some(ns) => match self.by_namespace.get(ns) {
                Some(prefix) => format!("{prefix}:{}", name.local()),
                None => name.to_string(),
            },
        }
    }

    /// Returns the prefix bound to a namespace.
    #[must_use]
    pub fn prefix_of(&self, namespace: &str) -> Option<&str> {
        self.by_namespace.get(namespace).map(String::as_str)
    }
}

impl<P: Into<String>, N: Into<String>> FromIterator<(P, N)> for Prefixes {
    fn from_iter<I: IntoIterator<Item = (P, N)>>(iter: I) -> Self {
        let mut prefixes = Self::new();
        for (prefix, namespace) in iter {
            prefixes.bind(prefix, namespace);
        }
        prefixes
    }
}

/// Returns the serialized type name of a type, or `None` for anonymous
/// types.
///
/// An explicit serialized name wins; otherwise a trailing `Type` is dropped
/// from the type name. The suffix is appended in both cases.
#[must_use]
pub fn json_type_name(schema_type: &SchemaType, suffix: &str) -> Option<String> {
    if schema_type.name.ends_with(ANON_SUFFIX) {
        return None;
    }
    let base = match &schema_type.serialized_name {
        Some(name) => name.as_str(),
        None => schema_type
            .name
            .strip_suffix("Type")
            .unwrap_or(&schema_type.name),
    };
    Some(format!("{base}{suffix}"))
}

/// Converts a string to PascalCase.
///
/// Characters that cannot appear in an identifier act as word breaks.
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if !c.is_ascii_alphanumeric() {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Converts a string to SCREAMING_SNAKE_CASE.
#[must_use]
pub fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if !c.is_ascii_alphanumeric() {
            if !result.ends_with('_') && !result.is_empty() {
                result.push('_');
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower {
            result.push('_');
        }
        result.push(c.to_ascii_uppercase());
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    result
}

/// Turns an arbitrary literal into a Rust type or variant identifier.
#[must_use]
pub fn rust_ident(s: &str) -> String {
    let ident = to_pascal_case(s);
    match ident.chars().next() {
        None => "Empty".to_string(),
        Some(c) if c.is_ascii_digit() => format!("V{ident}"),
        Some(_) if ident == "Self" => "Self_".to_string(),
        Some(_) => ident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        let mut prefixes = Prefixes::new();
        prefixes.bind("t", "urn:t");

        assert_eq!(prefixes.shorten(&QName::new(Some("urn:t"), "ItemType")), "t:ItemType");
        assert_eq!(prefixes.shorten(&QName::xsd("string")), "xs:string");
        assert_eq!(prefixes.shorten(&QName::new(None, "GetItemAnonType")), "GetItemAnonType");
        assert_eq!(prefixes.shorten(&QName::new(Some("urn:x"), "Other")), "{urn:x}Other");
        assert_eq!(prefixes.prefix_of("urn:t"), Some("t"));
    }

    #[test]
    fn test_json_type_name() {
        let mut item = SchemaType::new(Some("urn:t"), "ItemType", false);
        assert_eq!(json_type_name(&item, DEFAULT_TYPE_SUFFIX).as_deref(), Some("Item:#Exchange"));

        item.serialized_name = Some("BodyContentType".to_string());
        assert_eq!(json_type_name(&item, "").as_deref(), Some("BodyContentType"));

        let anon = SchemaType::new(None, "GetItemAnonType", false);
        assert_eq!(json_type_name(&anon, DEFAULT_TYPE_SUFFIX), None);

        let headers = SchemaType::new(None, "JsonRequestHeaders", false);
        assert_eq!(json_type_name(&headers, "").as_deref(), Some("JsonRequestHeaders"));
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_pascal_case("day_of-week"), "DayOfWeek");
        assert_eq!(to_pascal_case("Beginning"), "Beginning");
        assert_eq!(to_screaming_snake_case("DayOfWeekType"), "DAY_OF_WEEK_TYPE");
        assert_eq!(to_screaming_snake_case("t:Item"), "T_ITEM");
        assert_eq!(rust_ident("8bit"), "V8bit");
        assert_eq!(rust_ident(""), "Empty");
        assert_eq!(rust_ident("text/plain"), "TextPlain");
    }
}
