//! Prelude module for convenient imports.
//!
//! ```ignore
//! use xsdgraph::prelude::*;
//! ```

// Schema types
pub use xsdgraph_schema::{
    ClassHierarchy, CompileError, Diagnostic, DiagnosticKind, ElementDescriptor, OperationDescriptor,
    OverrideEngine, OverrideTable, QName, ResolveOptions, Resolver, SchemaSet, SchemaType,
    SimpleKind, TypeGraph, TypeId, compile, parse_operations,
};

// Codegen types
pub use xsdgraph_codegen::{
    ArtifactOptions, CodegenError, Generator, GraphArtifact, OutputFormat, Prefixes, render,
    render_to_file,
};

// Configuration
pub use crate::config::{Config, ConfigError};
