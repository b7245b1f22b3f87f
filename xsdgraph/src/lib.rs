//! # xsdgraph
//!
//! Compiles XSD schemas and WSDL service bindings into a type graph that
//! drives JSON serialization of SOAP messages.
//!
//! ## Features
//!
//! - **Schema-to-graph resolution** - Inheritance flattening, choice groups,
//!   abstract and substitution-group expansion
//! - **Operation binding** - Request/response headers aggregated from WSDL
//! - **Override tables** - Versioned YAML corrections applied after resolution
//! - **Multiple outputs** - JSON or YAML artifacts and Rust descriptor tables
//!
//! ## Quick Start
//!
//! ```no_run
//! use xsdgraph::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("xsdgraph.yaml")?;
//! let graph = config.compile()?;
//! let json = render(&graph, OutputFormat::Json, &config.artifact_options())?;
//! println!("{json}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - XSD/WSDL reading, resolution, overrides and validation
//! - [`codegen`] - Artifact rendering and Rust table generation
//! - [`config`] - Project configuration file

pub mod config;
pub mod prelude;

pub use config::{Config, ConfigError, OutputConfig, OverrideSource};

/// XSD/WSDL reading and type graph resolution.
pub mod schema {
    pub use xsdgraph_schema::*;
}

/// Artifact rendering and code generation.
pub mod codegen {
    pub use xsdgraph_codegen::*;
}
