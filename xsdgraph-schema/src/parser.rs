//! XSD document parser.
//!
//! This module reads one `xs:schema` document into a [`SchemaDocument`].
//! Cross-document references are left as names; they are checked when the
//! documents are linked into a [`crate::SchemaSet`].

use crate::error::ParseError;
use crate::types::{
    AttributeDecl, AttributeGroupDef, AttributeUse, ComplexContent, ComplexDef, Compositor,
    Derivation, ElementDecl, MaxOccurs, ModelGroup, ModelGroupDef, Occurs, Particle, QName,
    SimpleDerivation, TypeDef, TypeKind, TypeRef, XSD_NAMESPACE,
};
use crate::xml::{XmlElement, parse_document};

/// Global declarations of one schema document, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    /// `targetNamespace`.
    pub target_namespace: Option<String>,
    /// Global element declarations.
    pub elements: Vec<ElementDecl>,
    /// Named type definitions.
    pub types: Vec<TypeDef>,
    /// Global attribute declarations, keyed by qualified name.
    pub attributes: Vec<(QName, AttributeDecl)>,
    /// Named attribute groups.
    pub attribute_groups: Vec<AttributeGroupDef>,
    /// Named model groups.
    pub groups: Vec<ModelGroupDef>,
}

impl SchemaDocument {
    /// Parses a schema document from a string.
    ///
    /// # Errors
    /// Returns `ParseError` if the XML is malformed or contains constructs
    /// that are not valid in their position.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        parse_schema(xml)
    }
}

#[derive(Debug, Clone, Copy)]
struct Context<'a> {
    target: Option<&'a str>,
    elements_qualified: bool,
}

impl Context<'_> {
    fn global_name(&self, local: &str) -> QName {
        QName::new(self.target, local)
    }

    fn local_element_name(&self, node: &XmlElement, local: &str) -> QName {
        let qualified = match node.attr("form") {
            Some(form) => form == "qualified",
            None => self.elements_qualified,
        };
        if qualified {
            QName::new(self.target, local)
        } else {
            QName::new(None, local)
        }
    }
}

/// Parses an XSD document from a string.
///
/// # Arguments
/// * `xml` - XSD document content
///
/// # Returns
/// The document's global declarations or a parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or is not an `xs:schema`.
pub fn parse_schema(xml: &str) -> Result<SchemaDocument, ParseError> {
    let root = parse_document(xml)?;
    if !root.is("schema") || root.namespace() != Some(XSD_NAMESPACE) {
        return Err(ParseError::structure(format!(
            "expected xs:schema root, found '{}'",
            root.tag()
        )));
    }

    let target = root.attr("targetNamespace");
    let ctx = Context {
        target,
        elements_qualified: root.attr("elementFormDefault") == Some("qualified"),
    };

    let mut doc = SchemaDocument {
        target_namespace: target.map(str::to_string),
        ..SchemaDocument::default()
    };

    for child in root.children() {
        match child.local.as_str() {
            "element" => doc.elements.push(parse_element(child, ctx, true)?),
            "complexType" => {
                let name = ctx.global_name(child.required_attr("name")?);
                doc.types.push(parse_complex_type(child, ctx, Some(name))?);
            }
            "simpleType" => {
                let name = ctx.global_name(child.required_attr("name")?);
                doc.types.push(parse_simple_type(child, ctx, Some(name))?);
            }
            "attribute" => {
                let decl = parse_attribute_decl(child, ctx)?;
                doc.attributes.push((ctx.global_name(&decl.name), decl));
            }
            "attributeGroup" => doc.attribute_groups.push(parse_attribute_group(child, ctx)?),
            "group" => doc.groups.push(parse_group_def(child, ctx)?),
            "annotation" | "import" | "include" | "notation" => {}
            _ => return Err(ParseError::unknown_element(child.tag(), "schema")),
        }
    }

    Ok(doc)
}

/// Parses an element declaration. Global declarations always take the
/// target namespace.
fn parse_element(
    node: &XmlElement,
    ctx: Context<'_>,
    global: bool,
) -> Result<ElementDecl, ParseError> {
    let local = node.required_attr("name")?;
    let name = if global {
        ctx.global_name(local)
    } else {
        ctx.local_element_name(node, local)
    };

    let type_ref = match node.qname_attr("type")? {
        Some(qname) => TypeRef::Named(qname),
        None => inline_type(node, ctx)?,
    };

    Ok(ElementDecl {
        name,
        type_ref,
        occurs: parse_occurs(node)?,
        is_abstract: parse_bool(node, "abstract")?,
        substitution_group: node.qname_attr("substitutionGroup")?,
    })
}

fn inline_type(node: &XmlElement, ctx: Context<'_>) -> Result<TypeRef, ParseError> {
    for child in node.children() {
        match child.local.as_str() {
            "complexType" => {
                return Ok(TypeRef::Anonymous(Box::new(parse_complex_type(
                    child, ctx, None,
                )?)));
            }
            "simpleType" => {
                return Ok(TypeRef::Anonymous(Box::new(parse_simple_type(
                    child, ctx, None,
                )?)));
            }
            _ => {}
        }
    }
    Ok(TypeRef::Unspecified)
}

fn parse_occurs(node: &XmlElement) -> Result<Occurs, ParseError> {
    let mut occurs = Occurs::once();
    if let Some(min) = node.attr("minOccurs") {
        occurs.min = min
            .parse()
            .map_err(|_| ParseError::invalid_attr(node.tag(), "minOccurs", min))?;
    }
    if let Some(max) = node.attr("maxOccurs") {
        occurs.max = if max == "unbounded" {
            MaxOccurs::Unbounded
        } else {
            MaxOccurs::Bounded(
                max.parse()
                    .map_err(|_| ParseError::invalid_attr(node.tag(), "maxOccurs", max))?,
            )
        };
    }
    Ok(occurs)
}

fn parse_bool(node: &XmlElement, attribute: &str) -> Result<bool, ParseError> {
    match node.attr(attribute) {
        None | Some("false" | "0") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some(other) => Err(ParseError::invalid_attr(node.tag(), attribute, other)),
    }
}

fn compositor_of(local: &str) -> Option<Compositor> {
    match local {
        "sequence" => Some(Compositor::Sequence),
        "choice" => Some(Compositor::Choice),
        "all" => Some(Compositor::All),
        _ => None,
    }
}

fn parse_model_group(
    node: &XmlElement,
    ctx: Context<'_>,
    compositor: Compositor,
) -> Result<ModelGroup, ParseError> {
    let mut particles = Vec::new();

    for child in node.children() {
        let local = child.local.as_str();
        if let Some(nested) = compositor_of(local) {
            particles.push(Particle::Group(parse_model_group(child, ctx, nested)?));
            continue;
        }
        match local {
            "element" => particles.push(parse_element_particle(child, ctx)?),
            "group" => particles.push(parse_group_ref(child)?),
            "any" => particles.push(Particle::Any {
                occurs: parse_occurs(child)?,
            }),
            "annotation" => {}
            _ => return Err(ParseError::unknown_element(child.tag(), node.tag())),
        }
    }

    Ok(ModelGroup {
        compositor,
        occurs: parse_occurs(node)?,
        particles,
    })
}

fn parse_element_particle(node: &XmlElement, ctx: Context<'_>) -> Result<Particle, ParseError> {
    match node.qname_attr("ref")? {
        Some(name) => Ok(Particle::ElementRef {
            name,
            occurs: parse_occurs(node)?,
        }),
        None => Ok(Particle::Element(parse_element(node, ctx, false)?)),
    }
}

fn parse_group_ref(node: &XmlElement) -> Result<Particle, ParseError> {
    let name = node
        .qname_attr("ref")?
        .ok_or_else(|| ParseError::missing_attr(node.tag(), "ref"))?;
    Ok(Particle::GroupRef {
        name,
        occurs: parse_occurs(node)?,
    })
}

/// Parses a `complexType`, named or anonymous.
fn parse_complex_type(
    node: &XmlElement,
    ctx: Context<'_>,
    name: Option<QName>,
) -> Result<TypeDef, ParseError> {
    let mut def = ComplexDef::default();

    for child in node.children() {
        match child.local.as_str() {
            "complexContent" => parse_complex_content(child, ctx, &mut def)?,
            "simpleContent" => parse_simple_content(child, ctx, &mut def)?,
            "annotation" => {}
            _ => parse_content_child(child, node, ctx, &mut def)?,
        }
    }

    Ok(TypeDef {
        name,
        is_abstract: parse_bool(node, "abstract")?,
        kind: TypeKind::Complex(def),
    })
}

/// Handles the children shared by `complexType`, `extension` and
/// `restriction`: a model group plus attributes.
fn parse_content_child(
    child: &XmlElement,
    parent: &XmlElement,
    ctx: Context<'_>,
    def: &mut ComplexDef,
) -> Result<(), ParseError> {
    let local = child.local.as_str();
    if let Some(compositor) = compositor_of(local) {
        def.content = ComplexContent::Elements(parse_model_group(child, ctx, compositor)?);
        return Ok(());
    }
    match local {
        "group" => {
            let group_ref = parse_group_ref(child)?;
            def.content =
                ComplexContent::Elements(ModelGroup::new(Compositor::Sequence, vec![group_ref]));
        }
        "attribute" | "attributeGroup" => {
            if let Some(attribute) = parse_attribute_use(child, ctx)? {
                def.attributes.push(attribute);
            }
        }
        "anyAttribute" => def.any_attribute = true,
        "annotation" => {}
        _ => return Err(ParseError::unknown_element(child.tag(), parent.tag())),
    }
    Ok(())
}

fn parse_complex_content(
    node: &XmlElement,
    ctx: Context<'_>,
    def: &mut ComplexDef,
) -> Result<(), ParseError> {
    for derivation in node.children() {
        let base = || -> Result<QName, ParseError> {
            derivation
                .qname_attr("base")?
                .ok_or_else(|| ParseError::missing_attr(derivation.tag(), "base"))
        };
        match derivation.local.as_str() {
            "extension" => def.derivation = Derivation::Extension(base()?),
            "restriction" => def.derivation = Derivation::Restriction(base()?),
            "annotation" => continue,
            _ => return Err(ParseError::unknown_element(derivation.tag(), node.tag())),
        }
        for child in derivation.children() {
            parse_content_child(child, derivation, ctx, def)?;
        }
    }
    Ok(())
}

fn parse_simple_content(
    node: &XmlElement,
    ctx: Context<'_>,
    def: &mut ComplexDef,
) -> Result<(), ParseError> {
    for derivation in node.children() {
        let base = derivation
            .qname_attr("base")?
            .ok_or_else(|| ParseError::missing_attr(derivation.tag(), "base"));
        match derivation.local.as_str() {
            "extension" => def.derivation = Derivation::Extension(base?),
            "restriction" => def.derivation = Derivation::Restriction(base?),
            "annotation" => continue,
            _ => return Err(ParseError::unknown_element(derivation.tag(), node.tag())),
        }

        let mut enumerations = Vec::new();
        for child in derivation.children() {
            match child.local.as_str() {
                "enumeration" => enumerations.push(child.required_attr("value")?.to_string()),
                "attribute" | "attributeGroup" => {
                    if let Some(attribute) = parse_attribute_use(child, ctx)? {
                        def.attributes.push(attribute);
                    }
                }
                "anyAttribute" => def.any_attribute = true,
                // remaining facets do not affect the value class
                _ => {}
            }
        }
        def.content = ComplexContent::Simple { enumerations };
    }
    Ok(())
}

/// Parses a `simpleType`, named or anonymous.
fn parse_simple_type(
    node: &XmlElement,
    ctx: Context<'_>,
    name: Option<QName>,
) -> Result<TypeDef, ParseError> {
    let mut derivation = None;

    for child in node.children() {
        match child.local.as_str() {
            "restriction" => {
                let base = match child.qname_attr("base")? {
                    Some(base) => TypeRef::Named(base),
                    None => inline_type(child, ctx)?,
                };
                let enumerations = child
                    .children_named("enumeration")
                    .map(|e| e.required_attr("value").map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()?;
                derivation = Some(SimpleDerivation::Restriction { base, enumerations });
            }
            "list" => {
                let item = match child.qname_attr("itemType")? {
                    Some(item) => TypeRef::Named(item),
                    None => inline_type(child, ctx)?,
                };
                derivation = Some(SimpleDerivation::List { item });
            }
            "union" => derivation = Some(SimpleDerivation::Union),
            "annotation" => {}
            _ => return Err(ParseError::unknown_element(child.tag(), node.tag())),
        }
    }

    let derivation = derivation.ok_or_else(|| {
        ParseError::structure(format!(
            "simpleType '{}' has no restriction, list or union",
            name.as_ref()
                .map_or_else(|| "(anonymous)".to_string(), ToString::to_string)
        ))
    })?;

    Ok(TypeDef {
        name,
        is_abstract: false,
        kind: TypeKind::Simple(derivation),
    })
}

fn parse_attribute_decl(node: &XmlElement, ctx: Context<'_>) -> Result<AttributeDecl, ParseError> {
    let name = node.required_attr("name")?.to_string();
    let type_ref = match node.qname_attr("type")? {
        Some(qname) => TypeRef::Named(qname),
        None => inline_type(node, ctx)?,
    };
    Ok(AttributeDecl { name, type_ref })
}

/// Parses an attribute or attribute group use. Prohibited attributes
/// yield `None`.
fn parse_attribute_use(
    node: &XmlElement,
    ctx: Context<'_>,
) -> Result<Option<AttributeUse>, ParseError> {
    if node.attr("use") == Some("prohibited") {
        return Ok(None);
    }
    let reference = node.qname_attr("ref")?;
    let attribute = match (node.local.as_str(), reference) {
        ("attributeGroup", Some(name)) => AttributeUse::Group(name),
        ("attributeGroup", None) => return Err(ParseError::missing_attr(node.tag(), "ref")),
        (_, Some(name)) => AttributeUse::Ref(name),
        (_, None) => AttributeUse::Local(parse_attribute_decl(node, ctx)?),
    };
    Ok(Some(attribute))
}

fn parse_attribute_group(
    node: &XmlElement,
    ctx: Context<'_>,
) -> Result<AttributeGroupDef, ParseError> {
    let mut group = AttributeGroupDef {
        name: ctx.global_name(node.required_attr("name")?),
        attributes: Vec::new(),
        any_attribute: false,
    };
    for child in node.children() {
        match child.local.as_str() {
            "attribute" | "attributeGroup" => {
                if let Some(attribute) = parse_attribute_use(child, ctx)? {
                    group.attributes.push(attribute);
                }
            }
            "anyAttribute" => group.any_attribute = true,
            "annotation" => {}
            _ => return Err(ParseError::unknown_element(child.tag(), node.tag())),
        }
    }
    Ok(group)
}

fn parse_group_def(node: &XmlElement, ctx: Context<'_>) -> Result<ModelGroupDef, ParseError> {
    let name = ctx.global_name(node.required_attr("name")?);
    let group = node
        .children()
        .find_map(|child| {
            compositor_of(&child.local).map(|compositor| parse_model_group(child, ctx, compositor))
        })
        .transpose()?
        .ok_or_else(|| ParseError::structure(format!("group '{name}' has no content")))?;
    Ok(ModelGroupDef { name, group })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:t="urn:test:types"
           targetNamespace="urn:test:types"
           elementFormDefault="qualified">
    <xs:annotation><xs:documentation>fixture</xs:documentation></xs:annotation>
    <xs:simpleType name="ColorType">
        <xs:restriction base="xs:string">
            <xs:enumeration value="Red"/>
            <xs:enumeration value="Green"/>
        </xs:restriction>
    </xs:simpleType>
    <xs:complexType name="BaseItemType" abstract="true">
        <xs:sequence>
            <xs:element name="Subject" type="xs:string" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="Id" type="xs:string" use="required"/>
    </xs:complexType>
    <xs:complexType name="MessageType">
        <xs:complexContent>
            <xs:extension base="t:BaseItemType">
                <xs:choice maxOccurs="unbounded">
                    <xs:element name="To" type="xs:string"/>
                    <xs:element ref="t:Cc"/>
                </xs:choice>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
    <xs:complexType name="PhoneType">
        <xs:simpleContent>
            <xs:extension base="xs:string">
                <xs:attribute name="Key" type="t:ColorType"/>
            </xs:extension>
        </xs:simpleContent>
    </xs:complexType>
    <xs:element name="Cc" type="xs:string"/>
    <xs:element name="Wrapper">
        <xs:complexType>
            <xs:sequence>
                <xs:any processContents="lax"/>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

    #[test]
    fn test_parse_declarations() {
        let doc = parse_schema(TYPES_XSD).expect("Failed to parse");
        assert_eq!(doc.target_namespace.as_deref(), Some("urn:test:types"));
        assert_eq!(doc.types.len(), 4);
        assert_eq!(doc.elements.len(), 2);
        assert_eq!(
            doc.elements[0].name,
            QName::new(Some("urn:test:types"), "Cc")
        );
    }

    #[test]
    fn test_parse_enumeration() {
        let doc = parse_schema(TYPES_XSD).expect("Failed to parse");
        let color = &doc.types[0];
        match &color.kind {
            TypeKind::Simple(SimpleDerivation::Restriction { base, enumerations }) => {
                assert_eq!(base, &TypeRef::Named(QName::xsd("string")));
                assert_eq!(enumerations, &["Red", "Green"]);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_parse_extension() {
        let doc = parse_schema(TYPES_XSD).expect("Failed to parse");
        let base = &doc.types[1];
        assert!(base.is_abstract);

        let message = &doc.types[2];
        assert_eq!(
            message.extension_base(),
            Some(&QName::new(Some("urn:test:types"), "BaseItemType"))
        );
        let def = message.as_complex().unwrap();
        let ComplexContent::Elements(group) = &def.content else {
            panic!("expected element content");
        };
        assert!(group.is_choice());
        assert!(group.occurs.is_repeated());
        assert_eq!(group.particles.len(), 2);
        assert!(matches!(
            &group.particles[1],
            Particle::ElementRef { name, .. } if name.local() == "Cc"
        ));
        match &group.particles[0] {
            Particle::Element(decl) => {
                assert_eq!(decl.name, QName::new(Some("urn:test:types"), "To"));
            }
            other => panic!("unexpected particle {other:?}"),
        }
    }

    #[test]
    fn test_parse_simple_content() {
        let doc = parse_schema(TYPES_XSD).expect("Failed to parse");
        let phone = &doc.types[3];
        assert!(phone.is_simple());
        let def = phone.as_complex().unwrap();
        assert_eq!(def.attributes.len(), 1);
    }

    #[test]
    fn test_parse_anonymous_and_wildcard() {
        let doc = parse_schema(TYPES_XSD).expect("Failed to parse");
        let wrapper = &doc.elements[1];
        let TypeRef::Anonymous(def) = &wrapper.type_ref else {
            panic!("expected anonymous type");
        };
        assert!(def.name.is_none());
        let ComplexContent::Elements(group) = &def.as_complex().unwrap().content else {
            panic!("expected element content");
        };
        assert!(matches!(group.particles[0], Particle::Any { .. }));
    }

    #[test]
    fn test_unqualified_local_elements() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:x">
            <xs:complexType name="T">
                <xs:sequence><xs:element name="a" type="xs:int" maxOccurs="3"/></xs:sequence>
            </xs:complexType>
        </xs:schema>"#;
        let doc = parse_schema(xsd).expect("Failed to parse");
        let ComplexContent::Elements(group) = &doc.types[0].as_complex().unwrap().content else {
            panic!("expected element content");
        };
        let Particle::Element(decl) = &group.particles[0] else {
            panic!("expected element");
        };
        assert_eq!(decl.name, QName::new(None, "a"));
        assert_eq!(decl.occurs.max, MaxOccurs::Bounded(3));
    }

    #[test]
    fn test_reject_non_schema_root() {
        assert!(parse_schema("<definitions/>").is_err());
    }

    #[test]
    fn test_invalid_occurs() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="a" type="xs:int" maxOccurs="many"/>
        </xs:schema>"#;
        assert!(matches!(
            parse_schema(xsd),
            Err(ParseError::InvalidAttribute { .. })
        ));
    }
}
