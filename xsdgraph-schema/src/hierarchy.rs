//! Class hierarchy index.

use crate::set::SchemaSet;
use crate::types::QName;
use indexmap::{IndexMap, IndexSet};

/// Map from a base type to every type that transitively extends it.
///
/// Descendants are kept in type declaration order. Built once, before
/// any element is resolved, and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    descendants: IndexMap<QName, IndexSet<QName>>,
}

impl ClassHierarchy {
    /// Indexes every extension relationship in the set.
    #[must_use]
    pub fn build(set: &SchemaSet) -> Self {
        let mut descendants: IndexMap<QName, IndexSet<QName>> = IndexMap::new();

        for def in set.types() {
            let Some(name) = &def.name else { continue };
            let mut seen = IndexSet::new();
            let mut base = def.extension_base();

            while let Some(ancestor) = base {
                if !seen.insert(ancestor) {
                    break;
                }
                descendants
                    .entry(ancestor.clone())
                    .or_default()
                    .insert(name.clone());
                base = set.type_def(ancestor).and_then(|d| d.extension_base());
            }
        }

        Self { descendants }
    }

    /// Returns the transitive descendants of a type.
    pub fn descendants(&self, base: &QName) -> impl Iterator<Item = &QName> {
        self.descendants.get(base).into_iter().flatten()
    }

    /// Returns true if any type extends `base`.
    #[must_use]
    pub fn has_descendants(&self, base: &QName) -> bool {
        self.descendants.get(base).is_some_and(|d| !d.is_empty())
    }

    /// Number of base types with at least one descendant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descendants.len()
    }

    /// Returns true if no extension relationship was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descendants.is_empty()
    }
}
