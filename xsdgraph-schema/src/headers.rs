//! Request and response header types.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::ResolveError;
use crate::ir::{SchemaType, TypeGraph};
use indexmap::IndexMap;
use tracing::debug;

/// Key of the synthesized request header type.
pub const REQUEST_HEADERS: &str = "JsonRequestHeaders";
/// Key of the synthesized response header type.
pub const RESPONSE_HEADERS: &str = "JsonResponseHeaders";

/// Synthesizes the two header types from the graph's operations.
///
/// Every input header element of every operation becomes an element of
/// [`REQUEST_HEADERS`], and every output header element an element of
/// [`RESPONSE_HEADERS`], in first-seen order. Descriptors are copied from
/// the global element map. Header-only elements that resolution left out
/// are skipped with a diagnostic.
///
/// # Errors
/// Returns `ResolveError::UnknownHeader` if an operation names a header
/// element that is neither a resolved global element nor a skipped one.
pub fn aggregate_headers(graph: &mut TypeGraph) -> Result<(), ResolveError> {
    let mut request = SchemaType::new(None, REQUEST_HEADERS, false);
    let mut response = SchemaType::new(None, RESPONSE_HEADERS, false);
    let mut skipped: IndexMap<String, String> = IndexMap::new();

    for op in graph.operations.values() {
        for (headers, target) in [
            (&op.input_headers, &mut request),
            (&op.output_headers, &mut response),
        ] {
            for header in headers {
                let key = header.to_string();
                if graph.skipped_headers.contains(&key) {
                    skipped.entry(key).or_insert_with(|| op.action.clone());
                    continue;
                }
                add_header(graph, &op.action, key, target)?;
            }
        }
    }

    for (key, operation) in skipped {
        debug!("Header {} of {} has no type, skipping", key, operation);
        graph.diagnostics.push(Diagnostic::new(
            DiagnosticKind::SkippedHeaderElement,
            key,
            format!("untyped header of operation {operation} left out of the header types"),
        ));
    }

    debug!(
        "Aggregated {} request and {} response headers",
        request.elements.len(),
        response.elements.len()
    );
    graph.request_headers = Some(graph.types.reserve(request)?);
    graph.response_headers = Some(graph.types.reserve(response)?);
    Ok(())
}

fn add_header(
    graph: &TypeGraph,
    operation: &str,
    key: String,
    target: &mut SchemaType,
) -> Result<(), ResolveError> {
    if target.elements.contains_key(&key) {
        return Ok(());
    }
    let descriptor = graph
        .elements
        .get(&key)
        .ok_or_else(|| ResolveError::UnknownHeader {
            operation: operation.to_string(),
            element: key.clone(),
        })?;
    target.elements.insert(key, descriptor.clone());
    Ok(())
}
