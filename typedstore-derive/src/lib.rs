#![recursion_limit = "128"]
//! # typedstore Derive Macros
//!
//! Procedural macros that describe an entity's shape to `typedstore`.
//!
//! ## Macros
//!
//! ### `Convertible`
//!
//! Derives the `Convertible` trait for structs and enums, converting between the type
//! and its `Document` representation.
//!
//! - **Supported for**: structs with named fields and enums
//! - **Type attribute**: `#[converter(ignored = "field_a, field_b")]` leaves fields out of
//!   the document; they are set to their default when read back
//! - Fields missing from a document, or stored as null, are set to their default, so every
//!   field type must implement `Default`
//!
//! ### `DocumentEntity`
//!
//! Derives the `DocumentEntity` trait for structs, naming the identifier and version
//! fields the template uses to materialize documents.
//!
//! - **Supported for**: structs with named fields only
//! - **Type attribute**:
//!   `#[entity(name = "...", id(field = "..."), version(field = "..."))]`
//!
//! A struct without `id(field = ...)` still derives, but every retrieval of it fails
//! with `InvalidEntityType`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use typedstore_derive::{Convertible, DocumentEntity};
//!
//! #[derive(Default, Convertible, DocumentEntity)]
//! #[entity(name = "airline", id(field = "id"), version(field = "cas"))]
//! #[converter(ignored = "cached_rank")]
//! pub struct Airline {
//!     pub id: String,
//!     pub name: String,
//!     pub country: String,
//!     pub cas: u64,
//!     pub cached_rank: u32,
//! }
//!
//! #[derive(Default, Convertible)]
//! pub enum Status {
//!     #[default]
//!     Active,
//!     Suspended { reason: String },
//! }
//! ```

extern crate proc_macro;
mod convertible;
mod entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `Convertible` trait for automatic type conversion.
///
/// # Attributes
///
/// - `#[converter(ignored = "a, b")]` - fields left out of the document
///
/// # Errors
///
/// Returns a compile error if:
/// - The type is a tuple or unit struct
/// - The type is a union
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convert(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => {
            let result = generate_convertible_for_struct(&ast, data);
            match result {
                Ok(token_stream) => token_stream,
                Err(e) => {
                    let error = syn::Error::new_spanned(
                        &ast,
                        format!(
                            "Failed to derive Convertible for struct '{}': {}.\n\
                             Make sure all fields implement Convertible and Default.",
                            ast.ident, e
                        ),
                    );
                    error.to_compile_error().into()
                }
            }
        },
        Data::Enum(ref data) => {
            let result = generate_convertible_for_enum(&ast, data);
            match result {
                Ok(token_stream) => token_stream,
                Err(e) => {
                    let error = syn::Error::new_spanned(
                        &ast,
                        format!(
                            "Failed to derive Convertible for enum '{}': {}.\n\
                             Ensure all enum variants have supported types.",
                            ast.ident, e
                        ),
                    );
                    error.to_compile_error().into()
                }
            }
        },
        Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Convertible for unions. Unions are not supported by the Convertible derive macro.",
            );
            error.to_compile_error().into()
        }
    }
}

/// Derives the `DocumentEntity` trait.
///
/// The struct must also implement `Default` and `Convertible` to be retrieved through a
/// template.
///
/// # Attributes
///
/// - `#[entity(name = "...")]` - entity name, defaults to the struct name
/// - `#[entity(id(field = "..."))]` - identifier field, must be a `String` or
///   `Option<String>`
/// - `#[entity(version(field = "..."))]` - field receiving the document's CAS token
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum or union
/// - The id or version attribute names a field the struct does not have
#[proc_macro_derive(DocumentEntity, attributes(entity))]
pub fn derive_document_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => {
            let result = generate_entity_for_struct(&ast, data);
            match result {
                Ok(token_stream) => token_stream,
                Err(e) => {
                    let error = syn::Error::new_spanned(
                        &ast,
                        format!(
                            "Failed to derive DocumentEntity for struct '{}': {}.\n\
                             Example: #[entity(id(field = \"id\"))] pub struct MyEntity {{ id: String }}",
                            ast.ident, e
                        ),
                    );
                    error.to_compile_error().into()
                }
            }
        },
        Data::Enum(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive DocumentEntity for enums. Only structs are supported.",
            );
            error.to_compile_error().into()
        },
        Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive DocumentEntity for unions. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
    }
}
