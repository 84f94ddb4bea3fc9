//! Declaration collector: scans Rust sources with `syn` and records every
//! struct, newtype and type alias with its module path.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use quote::ToTokens;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Fields, GenericArgument, Item, PathArguments, Type, UseTree};

use crate::decl::{DeclKind, DeclSet, FieldDecl, PrimitiveKind, SemanticType, TypeDecl, TypePath};
use crate::error::{GenError, GenResult};

/// Collect declarations from every `.rs` file under `src_root`.
///
/// Files under any of `exclude` (typically the output directory) are skipped.
pub fn collect_dir(src_root: &Path, exclude: &[PathBuf]) -> GenResult<DeclSet> {
    let mut set = DeclSet::new();
    for file in source_files(src_root)? {
        if exclude.iter().any(|dir| file.starts_with(dir)) {
            continue;
        }
        let source = std::fs::read_to_string(&file).map_err(|source| GenError::Io {
            path: file.clone(),
            source,
        })?;
        let module = module_path_for(src_root, &file);
        tracing::debug!(file = %file.display(), %module, "scanning");
        collect_source(&module, &source, &mut set).map_err(|source| GenError::Parse {
            path: file.clone(),
            source,
        })?;
    }
    Ok(set)
}

fn source_files(src_root: &Path) -> GenResult<Vec<PathBuf>> {
    let pattern = src_root.join("**").join("*.rs");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| GenError::config(format!("invalid source path: {}", src_root.display())))?;

    let mut files = BTreeSet::new();
    let entries =
        glob::glob(pattern).map_err(|e| GenError::config(format!("invalid glob {pattern}: {e}")))?;
    for entry in entries {
        let path = entry.map_err(|e| GenError::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            files.insert(path);
        }
    }
    Ok(files.into_iter().collect())
}

/// Module path of `file` relative to the crate source root.
///
/// `lib.rs`/`main.rs` map to `crate`, `a/mod.rs` to `crate::a`, `a/b.rs` to
/// `crate::a::b`.
pub fn module_path_for(src_root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(src_root).unwrap_or(file);
    let mut parts: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect();

    let stem = rel.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let is_root = parts.is_empty() && (stem == "lib" || stem == "main");
    if stem != "mod" && !is_root {
        parts.push(stem.to_string());
    }

    let mut module = String::from("crate");
    for part in parts {
        module.push_str("::");
        module.push_str(&part);
    }
    module
}

/// Collect declarations from one file's source text.
pub fn collect_source(module: &str, source: &str, set: &mut DeclSet) -> syn::Result<()> {
    let file = syn::parse_file(source)?;
    collect_items(module, &file.items, set)
}

/// Names brought into scope by `use` items, mapped to their full path.
struct Scope<'a> {
    module: &'a str,
    uses: HashMap<String, Vec<String>>,
}

fn collect_items(module: &str, items: &[Item], set: &mut DeclSet) -> syn::Result<()> {
    let mut scope = Scope {
        module,
        uses: HashMap::new(),
    };
    for item in items {
        if let Item::Use(u) = item {
            flatten_use(&mut Vec::new(), &u.tree, &mut scope.uses);
        }
    }

    for item in items {
        match item {
            Item::Struct(s) => {
                let path = TypePath::new(module, s.ident.unraw().to_string());
                let kind = match &s.fields {
                    Fields::Named(named) => {
                        let mut fields = Vec::with_capacity(named.named.len());
                        for f in &named.named {
                            fields.push(field_decl(f, &scope)?);
                        }
                        DeclKind::Struct {
                            fields,
                            marked: derives_entity(&s.attrs)?,
                        }
                    }
                    Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                        DeclKind::Newtype(classify(&unnamed.unnamed[0].ty, &scope))
                    }
                    _ => DeclKind::Other,
                };
                set.insert(TypeDecl { path, kind });
            }
            Item::Type(t) => {
                set.insert(TypeDecl {
                    path: TypePath::new(module, t.ident.unraw().to_string()),
                    kind: DeclKind::Alias(classify(&t.ty, &scope)),
                });
            }
            Item::Enum(e) => {
                set.insert(TypeDecl {
                    path: TypePath::new(module, e.ident.unraw().to_string()),
                    kind: DeclKind::Other,
                });
            }
            Item::Mod(m) => {
                if let Some((_, content)) = &m.content {
                    let child = format!("{module}::{}", m.ident.unraw());
                    collect_items(&child, content, set)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn flatten_use(prefix: &mut Vec<String>, tree: &UseTree, out: &mut HashMap<String, Vec<String>>) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.unraw().to_string());
            flatten_use(prefix, &p.tree, out);
            prefix.pop();
        }
        UseTree::Name(n) => {
            let name = n.ident.unraw().to_string();
            if name == "self" {
                if let Some(last) = prefix.last() {
                    out.insert(last.clone(), prefix.clone());
                }
            } else {
                let mut full = prefix.clone();
                full.push(name.clone());
                out.insert(name, full);
            }
        }
        UseTree::Rename(r) => {
            let mut full = prefix.clone();
            full.push(r.ident.unraw().to_string());
            out.insert(r.rename.unraw().to_string(), full);
        }
        UseTree::Group(g) => {
            for t in &g.items {
                flatten_use(prefix, t, out);
            }
        }
        UseTree::Glob(_) => {}
    }
}

fn derives_entity(attrs: &[Attribute]) -> syn::Result<bool> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let paths =
            attr.parse_args_with(Punctuated::<syn::Path, syn::Token![,]>::parse_terminated)?;
        if paths
            .iter()
            .any(|p| p.segments.last().is_some_and(|s| s.ident == "Entity"))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

#[derive(Default)]
struct FieldOptions {
    is_id: bool,
    type_override: Option<String>,
}

impl syn::parse::Parse for FieldOptions {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut opts = FieldOptions::default();
        while !input.is_empty() {
            let ident = syn::Ident::parse_any(input)?;
            match ident.to_string().as_str() {
                "id" => opts.is_id = true,
                "type" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    opts.type_override = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown dbcrud attribute `{other}`"),
                    ));
                }
            }
            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }
        Ok(opts)
    }
}

fn field_decl(field: &syn::Field, scope: &Scope<'_>) -> syn::Result<FieldDecl> {
    let mut opts = FieldOptions::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("dbcrud")) {
        let parsed: FieldOptions = attr.parse_args()?;
        opts.is_id |= parsed.is_id;
        if parsed.type_override.is_some() {
            opts.type_override = parsed.type_override;
        }
    }

    let name = field
        .ident
        .as_ref()
        .map(|i| i.unraw().to_string())
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

    Ok(FieldDecl {
        name,
        ty: classify(&field.ty, scope),
        ty_text: type_text(&field.ty),
        type_override: opts.type_override,
        is_id: opts.is_id,
    })
}

fn type_text(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

/// Classify a written type into a primitive, a named reference or neither.
fn classify(ty: &Type, scope: &Scope<'_>) -> SemanticType {
    let path = match ty {
        Type::Paren(p) => return classify(&p.elem, scope),
        Type::Group(g) => return classify(&g.elem, scope),
        Type::Path(p) if p.qself.is_none() => &p.path,
        _ => return SemanticType::Unsupported(type_text(ty)),
    };

    let segments: Vec<String> = path
        .segments
        .iter()
        .map(|s| s.ident.unraw().to_string())
        .collect();
    let Some(last) = path.segments.last() else {
        return SemanticType::Unsupported(type_text(ty));
    };

    if let PathArguments::AngleBracketed(args) = &last.arguments {
        if last.ident == "Vec" && is_single_u8(args) {
            return SemanticType::Primitive(PrimitiveKind::Binary);
        }
        return SemanticType::Unsupported(type_text(ty));
    }
    if !last.arguments.is_none() {
        return SemanticType::Unsupported(type_text(ty));
    }

    if segments.len() == 1 && UNSUPPORTED_SCALARS.contains(&segments[0].as_str()) {
        return SemanticType::Unsupported(type_text(ty));
    }

    let expanded = scope.expand(&segments);
    for candidate in [segments.join("::"), expanded.join("::")] {
        if let Some(kind) = PrimitiveKind::from_type_name(&candidate) {
            return SemanticType::Primitive(kind);
        }
    }

    let absolute = scope.absolute(&expanded);
    match absolute.split_last() {
        Some((name, module)) if !module.is_empty() => {
            SemanticType::Named(TypePath::new(module.join("::"), name.clone()))
        }
        _ => SemanticType::Unsupported(type_text(ty)),
    }
}

/// Built-in scalars with no column mapping.
const UNSUPPORTED_SCALARS: &[&str] = &[
    "i8", "i16", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "char", "str",
];

fn is_single_u8(args: &syn::AngleBracketedGenericArguments) -> bool {
    if args.args.len() != 1 {
        return false;
    }
    matches!(
        args.args.first(),
        Some(GenericArgument::Type(Type::Path(p))) if p.qself.is_none() && p.path.is_ident("u8")
    )
}

impl Scope<'_> {
    /// Replace a leading `use`d name with the path it was imported from.
    fn expand(&self, segments: &[String]) -> Vec<String> {
        match segments.split_first() {
            Some((first, rest)) => match self.uses.get(first) {
                Some(full) => full.iter().chain(rest).cloned().collect(),
                None => segments.to_vec(),
            },
            None => Vec::new(),
        }
    }

    /// Anchor a path at `crate`, resolving `self`/`super` against this module.
    fn absolute(&self, segments: &[String]) -> Vec<String> {
        let mut module: Vec<String> = self.module.split("::").map(str::to_string).collect();
        let mut rest = segments;

        match rest.first().map(String::as_str) {
            Some("crate") => return segments.to_vec(),
            Some("self") => rest = &rest[1..],
            Some("super") => {
                while rest.first().map(String::as_str) == Some("super") {
                    if module.len() > 1 {
                        module.pop();
                    }
                    rest = &rest[1..];
                }
            }
            _ => {}
        }

        module.extend(rest.iter().cloned());
        module
    }
}
