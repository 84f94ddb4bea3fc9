//! Entity derive macro implementation

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::attrs::field_attrs;

// Mirrors `dbcrud::entity::DEFAULT_IDENTITY`; a proc-macro crate cannot
// depend on the runtime.
const DEFAULT_IDENTITY: &str = "id";

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let table = name.unraw().to_string().to_snake_case();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut columns = Vec::with_capacity(fields.len());
    let mut explicit_id: Option<String> = None;

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let column = ident.unraw().to_string().to_snake_case();

        if field_attrs(&field.attrs)?.is_id {
            if let Some(first) = &explicit_id {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("duplicate #[dbcrud(id)]: `{first}` is already the identity"),
                ));
            }
            explicit_id = Some(column.clone());
        }
        columns.push(column);
    }

    let identity = match explicit_id {
        Some(column) => column,
        None if columns.iter().any(|c| c == DEFAULT_IDENTITY) => DEFAULT_IDENTITY.to_string(),
        None => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity needs an `id` field or a field marked #[dbcrud(id)]",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::dbcrud::Entity for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;
            const COLUMNS: &'static [&'static str] = &[#(#columns),*];
            const IDENTITY: &'static str = #identity;
        }
    })
}
