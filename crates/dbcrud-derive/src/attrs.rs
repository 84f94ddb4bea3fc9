use syn::ext::IdentExt;
use syn::{Attribute, LitStr, Result};

/// Parsed `#[dbcrud(...)]` options on a field.
///
/// `type = "..."` is only checked for presence here; `dbcrud-gen` reads and
/// validates the override itself.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub is_id: bool,
}

impl syn::parse::Parse for FieldAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            // `type` is a keyword, so accept any ident here.
            let ident = syn::Ident::parse_any(input)?;
            match ident.to_string().as_str() {
                "id" => attrs.is_id = true,
                "type" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: LitStr = input.parse()?;
                    if value.value().trim().is_empty() {
                        return Err(syn::Error::new(value.span(), "empty column type"));
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown dbcrud attribute `{other}` (expected `id` or `type`)"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

/// Merge every `#[dbcrud(...)]` attribute on a field.
pub(crate) fn field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut merged = FieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("dbcrud")) {
        let parsed: FieldAttrs = attr.parse_args()?;
        merged.is_id |= parsed.is_id;
    }
    Ok(merged)
}
