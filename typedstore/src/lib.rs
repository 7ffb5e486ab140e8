#![allow(
    clippy::module_inception,
)]
//! # typedstore - Typed Document Store Access
//!
//! typedstore is a typed access layer over a document store. Callers ask for a Rust type
//! and an identifier or a query, and get back fully materialized entities; the layer
//! works out the type's metadata from the type itself.
//!
//! ## Key Features
//!
//! - **Generic dispatch**: `find_by_id::<Person>("doc-1")`, no class tokens or descriptors
//! - **Three execution modes**: blocking, future-based and stream-based retrieval behind
//!   one contract
//! - **Queries**: secondary-index (view) queries, spatial queries, filter queries and
//!   projections
//! - **Uniform errors**: the same error kinds in every mode
//! - **Pluggable stores**: any client implementing [store::StoreOperationsProvider];
//!   an in-memory store is bundled
//! - **Derive macros**: entity metadata and conversions through `typedstore_derive`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use typedstore::store::memory::InMemoryStore;
//! use typedstore::template::DocumentTemplate;
//! use typedstore_derive::{Convertible, DocumentEntity};
//!
//! #[derive(Default, Convertible, DocumentEntity)]
//! #[entity(id(field = "id"))]
//! struct Person {
//!     id: String,
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let template = DocumentTemplate::new(InMemoryStore::new())?;
//! template.save(&Person { id: "doc-1".into(), name: "Ada".into() })?;
//!
//! let person = template.blocking().find_by_id::<Person>("doc-1")?;
//! let person = template.future()?.find_by_id::<Person>("doc-1").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Values and conversions
//! - [`descriptor`] - Type descriptors and their resolver
//! - [`document`] - Documents and raw store records
//! - [`entity`] - Entity metadata traits
//! - [`errors`] - Error types and result definitions
//! - [`mode`] - Execution modes and their handles
//! - [`operations`] - Typed retrieval facade
//! - [`query`] - View, spatial, filter and projection queries, filters, scan consistency
//! - [`store`] - Store client interface and the in-memory store
//! - [`template`] - Template entry point
//! - [`template_builder`] - Template builder
//! - [`template_config`] - Template configuration

pub mod common;
pub mod descriptor;
pub mod document;
pub mod entity;
pub mod errors;
mod materializer;
pub mod mode;
pub mod operations;
pub mod query;
pub mod store;
pub mod template;
pub mod template_builder;
pub mod template_config;

#[cfg(test)]
mod test_support;
