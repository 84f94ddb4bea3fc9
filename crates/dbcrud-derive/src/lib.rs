//! Derive macros for dbcrud
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;

/// Derive `Entity` metadata for a struct and mark it for `dbcrud-gen`.
///
/// # Example
///
/// ```ignore
/// use dbcrud::Entity;
///
/// #[derive(Entity)]
/// struct SpecifyTypes {
///     id: i64,
///     #[dbcrud(type = "char(255)")]
///     a_str: String,
/// }
/// ```
///
/// # Attributes
///
/// - `#[dbcrud(id)]` - Use this field as the identity column instead of `id`
/// - `#[dbcrud(type = "...")]` - Column type override, read by `dbcrud-gen`
///
/// # Generated
///
/// - `TABLE` - snake_case of the struct name
/// - `COLUMNS` - snake_case of each field name, in declaration order
/// - `IDENTITY` - the identity column
#[proc_macro_derive(Entity, attributes(dbcrud))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
