//! # xsdgraph Schema
//!
//! XSD and WSDL readers and the schema-to-type-graph resolver.
//!
//! This crate provides:
//! - A namespace-aware XSD reader and a linked [`SchemaSet`]
//! - WSDL operation binding extraction
//! - The class hierarchy index and the type resolver
//! - Request/response header aggregation
//! - Override tables and the engine that applies them
//! - Reference and graph validation
//!
//! [`compile`] runs the whole pipeline:
//!
//! ```no_run
//! use xsdgraph_schema::{OverrideTable, ResolveOptions, SchemaSet, compile, parse_operations};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let set = SchemaSet::from_sources(&[
//!     std::fs::read_to_string("types.xsd")?,
//!     std::fs::read_to_string("messages.xsd")?,
//! ])?;
//! let operations = parse_operations(&std::fs::read_to_string("services.wsdl")?)?;
//! let overrides = OverrideTable::exchange()?;
//! let graph = compile(&set, operations, &overrides, &ResolveOptions::default())?;
//! println!("{} types", graph.types.len());
//! # Ok(())
//! # }
//! ```

pub mod builtins;
pub mod diagnostics;
pub mod error;
pub mod headers;
pub mod hierarchy;
pub mod ir;
pub mod overrides;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod set;
pub mod types;
pub mod validation;
pub mod wsdl;
pub mod xml;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{CompileError, GraphError, OverrideError, ParseError, ResolveError, SchemaError};
pub use headers::{REQUEST_HEADERS, RESPONSE_HEADERS, aggregate_headers};
pub use hierarchy::ClassHierarchy;
pub use ir::{ElementDescriptor, ElementMap, SchemaType, SimpleKind, TypeGraph, TypeId, TypeRegistry};
pub use overrides::{OverrideEngine, OverrideTable};
pub use parser::{SchemaDocument, parse_schema};
pub use pipeline::compile;
pub use resolver::{ResolveOptions, Resolver};
pub use set::SchemaSet;
pub use types::{QName, TypeDef, XSD_NAMESPACE};
pub use validation::validate_graph;
pub use wsdl::{OperationDescriptor, parse_operations};
