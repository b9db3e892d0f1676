#![forbid(unsafe_code)]
//! pkgdag-core library.
//!
//! Turns a directory of per-package build configuration documents into a
//! dependency graph and derives build orders, subgraphs and artifact
//! targets from it.
//!
//! # Conventions
//!
//! - **Errors**: library APIs return [`error::GraphError`] / [`manifest::ParseError`];
//!   `anyhow::Result` only at the configuration-file edge.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Typical Usage
//!
//! ```rust,ignore
//! use pkgdag_core::graph::Graph;
//! use pkgdag_core::source::DirSource;
//!
//! let graph = Graph::build(&DirSource::new("packages"))?;
//! for name in graph.build_order()? {
//!     println!("{}", graph.make_target(&name, "x86_64")?);
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod pipeline;
pub mod source;
pub mod target;

pub use error::{ErrorCode, GraphError};
pub use graph::{BootstrapWarning, Graph, GraphBuilder, Registration};
pub use manifest::{PackageConfig, ParseError};
