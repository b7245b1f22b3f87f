//! Minimal element tree over quick-xml events.
//!
//! Schema and service documents are small and walked many times in
//! different orders (declarations, then references), so they are read once
//! into an owned tree that keeps the in-scope namespace bindings of every
//! element. Text content is not retained; nothing in XSD or WSDL that this
//! crate consumes lives in text nodes.

use crate::error::ParseError;
use crate::types::QName;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::rc::Rc;

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

type Scope = Rc<HashMap<String, String>>;

/// A parsed XML element with its attributes, children and namespace scope.
#[derive(Debug, Clone)]
pub struct XmlElement {
    /// Tag prefix, if the tag was prefixed.
    pub prefix: Option<String>,
    /// Local tag name.
    pub local: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    scope: Scope,
}

impl XmlElement {
    /// Returns the tag as written in the document.
    #[must_use]
    pub fn tag(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }

    /// Returns true if the local tag name matches.
    #[must_use]
    pub fn is(&self, local: &str) -> bool {
        self.local == local
    }

    /// Returns the namespace of the element's own tag.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.scope
            .get(self.prefix.as_deref().unwrap_or(""))
            .map(String::as_str)
    }

    /// Looks up an attribute by its name as written.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Looks up an attribute that must be present.
    ///
    /// # Errors
    /// Returns `ParseError::MissingAttribute` if it is absent.
    pub fn required_attr(&self, name: &str) -> Result<&str, ParseError> {
        self.attr(name)
            .ok_or_else(|| ParseError::missing_attr(self.tag(), name))
    }

    /// Reads an attribute holding a prefixed name and resolves it.
    ///
    /// # Errors
    /// Returns `ParseError::UnboundPrefix` if the prefix has no binding.
    pub fn qname_attr(&self, name: &str) -> Result<Option<QName>, ParseError> {
        self.attr(name).map(|v| self.resolve_qname(v)).transpose()
    }

    /// Resolves a `prefix:local` value against this element's scope.
    ///
    /// Unprefixed values take the default namespace, if one is bound.
    ///
    /// # Errors
    /// Returns `ParseError::UnboundPrefix` if the prefix has no binding.
    pub fn resolve_qname(&self, value: &str) -> Result<QName, ParseError> {
        let value = value.trim();
        match value.split_once(':') {
            Some((prefix, local)) => {
                let namespace =
                    self.scope
                        .get(prefix)
                        .ok_or_else(|| ParseError::UnboundPrefix {
                            prefix: prefix.to_string(),
                            value: value.to_string(),
                        })?;
                Ok(QName::new(Some(namespace.as_str()), local))
            }
            None => Ok(QName::new(self.scope.get("").map(String::as_str), value)),
        }
    }

    /// Iterates over child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter()
    }

    /// Iterates over child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local == local)
    }

    /// Returns the first child element with the given local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local == local)
    }
}

/// Parses a document into its root element.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or has no single root.
pub fn parse_document(xml: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let base: Scope = Rc::new(HashMap::from([(
        "xml".to_string(),
        XML_NAMESPACE.to_string(),
    )]));
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let parent = stack.last().map_or(&base, |p| &p.scope);
                let element = open_element(e, parent)?;
                stack.push(element);
            }
            Ok(Event::Empty(ref e)) => {
                let parent = stack.last().map_or(&base, |p| &p.scope);
                let element = open_element(e, parent)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::structure("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::structure(format!(
            "element '{}' is not closed",
            open.tag()
        )));
    }

    root.ok_or_else(|| ParseError::structure("document has no root element"))
}

fn open_element(e: &BytesStart<'_>, parent: &Scope) -> Result<XmlElement, ParseError> {
    let name_bytes = e.name().as_ref().to_vec();
    let name = std::str::from_utf8(&name_bytes)?;
    let (prefix, local) = match name.split_once(':') {
        Some((p, l)) => (Some(p.to_string()), l.to_string()),
        None => (None, name.to_string()),
    };

    let mut attributes = Vec::new();
    let mut declared = Vec::new();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|_| ParseError::invalid_attr(name, key, raw))?
            .into_owned();

        if key == "xmlns" {
            declared.push((String::new(), value));
        } else if let Some(bound) = key.strip_prefix("xmlns:") {
            declared.push((bound.to_string(), value));
        } else {
            attributes.push((key.to_string(), value));
        }
    }

    let scope = if declared.is_empty() {
        Rc::clone(parent)
    } else {
        let mut bindings = (**parent).clone();
        bindings.extend(declared);
        Rc::new(bindings)
    };

    Ok(XmlElement {
        prefix,
        local,
        attributes,
        children: Vec::new(),
        scope,
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::structure("document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}
