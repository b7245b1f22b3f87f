//! Schema set to finished type graph.

use crate::error::CompileError;
use crate::headers::aggregate_headers;
use crate::hierarchy::ClassHierarchy;
use crate::ir::TypeGraph;
use crate::overrides::{OverrideEngine, OverrideTable};
use crate::resolver::{ResolveOptions, Resolver};
use crate::set::SchemaSet;
use crate::validation::validate_graph;
use crate::wsdl::OperationDescriptor;
use tracing::{info, warn};

/// Runs every stage over a linked schema set.
///
/// Stages run strictly in order: hierarchy index, resolution, type
/// finishing, operation registration, header aggregation, overrides and
/// graph validation.
///
/// # Errors
/// Returns `CompileError` from the first stage that fails.
pub fn compile(
    set: &SchemaSet,
    operations: Vec<OperationDescriptor>,
    overrides: &OverrideTable,
    options: &ResolveOptions,
) -> Result<TypeGraph, CompileError> {
    let hierarchy = ClassHierarchy::build(set);
    info!("Indexed {} base types", hierarchy.len());

    let mut resolver = Resolver::new(set, &hierarchy, overrides, options)?;
    resolver.resolve_all()?;
    let mut graph = resolver.finish();

    for op in operations {
        if let Some(previous) = graph.operations.insert(op.action.clone(), op) {
            warn!("Operation {} bound twice; keeping the last", previous.action);
        }
    }
    aggregate_headers(&mut graph)?;
    OverrideEngine::new(overrides).apply(&mut graph)?;
    validate_graph(&graph)?;

    info!(
        "Compiled {} types, {} elements, {} operations ({} diagnostics)",
        graph.types.len(),
        graph.elements.len(),
        graph.operations.len(),
        graph.diagnostics.len()
    );
    Ok(graph)
}
