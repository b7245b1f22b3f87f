//! XSD builtin datatypes.

use crate::types::{ComplexDef, Primitive, QName, TypeDef, TypeKind};

const DECIMAL_FAMILY: &[&str] = &[
    "decimal",
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "nonNegativeInteger",
    "positiveInteger",
    "long",
    "int",
    "short",
    "byte",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
];

const STRING_FAMILY: &[&str] = &[
    "anySimpleType",
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "QName",
    "NOTATION",
    "anyURI",
    "base64Binary",
    "hexBinary",
    "float",
    "double",
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
];

/// Returns the primitive class of a builtin datatype, by local name.
#[must_use]
pub fn primitive_of(local: &str) -> Option<Primitive> {
    if local == "boolean" {
        Some(Primitive::Boolean)
    } else if DECIMAL_FAMILY.contains(&local) {
        Some(Primitive::Decimal)
    } else if STRING_FAMILY.contains(&local) {
        Some(Primitive::String)
    } else {
        None
    }
}

/// Returns every builtin type definition.
///
/// `anyType` is complex: empty content with an attribute wildcard.
#[must_use]
pub fn builtin_types() -> Vec<TypeDef> {
    let mut types = vec![TypeDef {
        name: Some(QName::xsd("anyType")),
        is_abstract: false,
        kind: TypeKind::Complex(ComplexDef {
            any_attribute: true,
            ..ComplexDef::default()
        }),
    }];

    let simple = std::iter::once("boolean")
        .chain(DECIMAL_FAMILY.iter().copied())
        .chain(STRING_FAMILY.iter().copied());

    for local in simple {
        if let Some(primitive) = primitive_of(local) {
            types.push(TypeDef {
                name: Some(QName::xsd(local)),
                is_abstract: false,
                kind: TypeKind::Builtin(primitive),
            });
        }
    }

    types
}
