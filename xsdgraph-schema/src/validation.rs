//! Schema and graph validation utilities.
//!
//! [`validate_references`] runs when a [`SchemaSet`] is linked: every name
//! a declaration points at must exist and derivation chains must end.
//! [`validate_graph`] runs over a finished [`TypeGraph`].

use crate::error::{GraphError, SchemaError};
use crate::ir::{SimpleKind, TypeGraph};
use crate::set::SchemaSet;
use crate::types::{
    AttributeUse, ComplexContent, Derivation, ElementDecl, ModelGroup, Particle, QName,
    SimpleDerivation, TypeDef, TypeKind, TypeRef,
};
use std::collections::HashSet;

/// Validates every reference in a schema set.
///
/// # Errors
/// Returns `SchemaError::DanglingReference` for a name with no declaration
/// and `SchemaError::CircularReference` for a cyclic derivation or group.
pub fn validate_references(set: &SchemaSet) -> Result<(), SchemaError> {
    for def in set.types() {
        let context = def.display_name();
        check_type(set, def, &context)?;
        check_derivation_chain(set, def)?;
    }
    for decl in set.elements() {
        check_element(set, decl, "(global)")?;
    }
    for group in set.groups() {
        check_group(set, &group.group, &group.name.to_string())?;
        check_group_cycle(set, &group.name, &mut Vec::new())?;
    }
    for group in set.attribute_groups() {
        check_attributes(set, &group.attributes, &group.name.to_string())?;
    }
    Ok(())
}

fn check_type_ref(set: &SchemaSet, type_ref: &TypeRef, context: &str) -> Result<(), SchemaError> {
    match type_ref {
        TypeRef::Named(name) if set.type_def(name).is_none() => {
            Err(SchemaError::dangling("type", name, context))
        }
        TypeRef::Anonymous(def) => check_type(set, def, context),
        _ => Ok(()),
    }
}

fn check_type(set: &SchemaSet, def: &TypeDef, context: &str) -> Result<(), SchemaError> {
    match &def.kind {
        TypeKind::Simple(SimpleDerivation::Restriction { base, .. }) => {
            check_type_ref(set, base, context)
        }
        TypeKind::Simple(SimpleDerivation::List { item }) => check_type_ref(set, item, context),
        TypeKind::Simple(SimpleDerivation::Union) | TypeKind::Builtin(_) => Ok(()),
        TypeKind::Complex(complex) => {
            if let Derivation::Extension(base) | Derivation::Restriction(base) =
                &complex.derivation
            {
                if set.type_def(base).is_none() {
                    return Err(SchemaError::dangling("base type", base, context));
                }
            }
            if let ComplexContent::Elements(group) = &complex.content {
                check_group(set, group, context)?;
            }
            check_attributes(set, &complex.attributes, context)
        }
    }
}

fn check_group(set: &SchemaSet, group: &ModelGroup, context: &str) -> Result<(), SchemaError> {
    for particle in &group.particles {
        match particle {
            Particle::Element(decl) => check_element(set, decl, context)?,
            Particle::ElementRef { name, .. } if set.element(name).is_none() => {
                return Err(SchemaError::dangling("element", name, context));
            }
            Particle::Group(nested) => check_group(set, nested, context)?,
            Particle::GroupRef { name, .. } if set.group(name).is_none() => {
                return Err(SchemaError::dangling("group", name, context));
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_element(set: &SchemaSet, decl: &ElementDecl, context: &str) -> Result<(), SchemaError> {
    if let Some(head) = &decl.substitution_group {
        if set.element(head).is_none() {
            return Err(SchemaError::dangling("substitution group head", head, &decl.name));
        }
    }
    check_type_ref(set, &decl.type_ref, &format!("{} in {}", decl.name, context))
}

fn check_attributes(
    set: &SchemaSet,
    attributes: &[AttributeUse],
    context: &str,
) -> Result<(), SchemaError> {
    for attribute in attributes {
        match attribute {
            AttributeUse::Local(decl) => check_type_ref(set, &decl.type_ref, context)?,
            AttributeUse::Ref(name) if set.attribute(name).is_none() => {
                return Err(SchemaError::dangling("attribute", name, context));
            }
            AttributeUse::Group(name) if set.attribute_group(name).is_none() => {
                return Err(SchemaError::dangling("attributeGroup", name, context));
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_derivation_chain(set: &SchemaSet, def: &TypeDef) -> Result<(), SchemaError> {
    let Some(name) = &def.name else {
        return Ok(());
    };
    let mut path = vec![name];
    let mut current = def;

    while let Some(base) = derivation_base(current) {
        if path.contains(&base) {
            path.push(base);
            return Err(SchemaError::CircularReference {
                path: join_path(&path),
            });
        }
        path.push(base);
        match set.type_def(base) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(())
}

/// Named base of a complex derivation or simple restriction.
fn derivation_base(def: &TypeDef) -> Option<&QName> {
    match &def.kind {
        TypeKind::Complex(complex) => match &complex.derivation {
            Derivation::Extension(base) | Derivation::Restriction(base) => Some(base),
            Derivation::None => None,
        },
        TypeKind::Simple(SimpleDerivation::Restriction {
            base: TypeRef::Named(base),
            ..
        }) => Some(base),
        _ => None,
    }
}

fn check_group_cycle<'a>(
    set: &'a SchemaSet,
    name: &'a QName,
    stack: &mut Vec<&'a QName>,
) -> Result<(), SchemaError> {
    if stack.contains(&name) {
        stack.push(name);
        return Err(SchemaError::CircularReference {
            path: join_path(stack),
        });
    }
    let Some(def) = set.group(name) else {
        return Ok(());
    };
    stack.push(name);
    for referenced in group_refs(&def.group) {
        check_group_cycle(set, referenced, stack)?;
    }
    stack.pop();
    Ok(())
}

fn group_refs(group: &ModelGroup) -> Vec<&QName> {
    let mut refs = Vec::new();
    for particle in &group.particles {
        match particle {
            Particle::GroupRef { name, .. } => refs.push(name),
            Particle::Group(nested) => refs.extend(group_refs(nested)),
            _ => {}
        }
    }
    refs
}

fn join_path(path: &[&QName]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Validates a finished type graph.
///
/// # Errors
/// Returns `GraphError::Validation` naming the first violation: a list type
/// without an enum item type, or an operation whose body or header element
/// is not a global element.
pub fn validate_graph(graph: &TypeGraph) -> Result<(), GraphError> {
    for (_, schema_type) in graph.types.iter() {
        if schema_type.simple_kind != Some(SimpleKind::ListOfEnum) {
            continue;
        }
        let item = schema_type.list_item_type.ok_or_else(|| {
            GraphError::validation(format!("list type '{}' has no item type", schema_type.key()))
        })?;
        if graph.types[item].simple_kind != Some(SimpleKind::Enum) {
            return Err(GraphError::validation(format!(
                "item type '{}' of list type '{}' is not an enum",
                graph.key_of(item),
                schema_type.key()
            )));
        }
    }

    let mut seen = HashSet::new();
    for (name, op) in &graph.operations {
        if !seen.insert(op.action.as_str()) {
            // an alias of an operation already checked
            continue;
        }
        let bodies = [&op.input, &op.output];
        let headers = op
            .input_headers
            .iter()
            .chain(&op.output_headers)
            .filter(|header| !graph.skipped_headers.contains(&header.to_string()));
        for element in bodies.into_iter().chain(headers) {
            if !graph.elements.contains_key(&element.to_string()) {
                return Err(GraphError::validation(format!(
                    "operation '{name}' references unknown element '{element}'"
                )));
            }
        }
    }

    Ok(())
}
