//! Declarations collected from the source tree.
//!
//! This is the compiler's input model: every struct, newtype and type alias
//! found in the scanned files, with field types already classified into
//! primitives and named-type references.

use std::collections::HashMap;
use std::fmt;

/// The primitive kinds a column can be derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
    Binary,
    Timestamp,
}

impl PrimitiveKind {
    /// Classify a single-segment (or `chrono::`-qualified) type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "i32" => Self::Int32,
            "i64" => Self::Int64,
            "f32" => Self::Float32,
            "f64" => Self::Float64,
            "String" | "std::string::String" | "alloc::string::String" => Self::Text,
            "NaiveDateTime" | "chrono::NaiveDateTime" | "dbcrud::chrono::NaiveDateTime" => {
                Self::Timestamp
            }
            _ => return None,
        })
    }

    /// The Rust type generated code uses for this kind.
    pub fn rust_type(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Text => "String",
            Self::Binary => "Vec<u8>",
            Self::Timestamp => "NaiveDateTime",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }
}

/// Identity of a declared type: the module it lives in plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePath {
    pub module: String,
    pub name: String,
}

impl TypePath {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// A field or alias target type, as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticType {
    Primitive(PrimitiveKind),
    /// A reference to another declaration, to be looked up by identity.
    Named(TypePath),
    /// Anything the compiler cannot map (references, tuples, generics, ...).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name as written (raw identifiers unescaped).
    pub name: String,
    pub ty: SemanticType,
    /// The type as written, for messages.
    pub ty_text: String,
    /// `#[dbcrud(type = "...")]`
    pub type_override: Option<String>,
    /// `#[dbcrud(id)]`
    pub is_id: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// A struct with named fields.
    Struct {
        fields: Vec<FieldDecl>,
        /// Carries `#[derive(Entity)]`.
        marked: bool,
    },
    /// `struct X(T);`
    Newtype(SemanticType),
    /// `type X = T;`
    Alias(SemanticType),
    /// Declared, but with a shape the compiler cannot use as a column type.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub path: TypePath,
    pub kind: DeclKind,
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        &self.path.name
    }

    pub fn is_marked_entity(&self) -> bool {
        matches!(self.kind, DeclKind::Struct { marked: true, .. })
    }
}

/// Every declaration found in one generation run, in discovery order.
#[derive(Debug, Default)]
pub struct DeclSet {
    decls: Vec<TypeDecl>,
    index: HashMap<TypePath, usize>,
}

impl DeclSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. A later declaration with the same identity
    /// (e.g. under `#[cfg]` variants) replaces the earlier one.
    pub fn insert(&mut self, decl: TypeDecl) {
        match self.index.get(&decl.path) {
            Some(&i) => self.decls[i] = decl,
            None => {
                self.index.insert(decl.path.clone(), self.decls.len());
                self.decls.push(decl);
            }
        }
    }

    pub fn get(&self, path: &TypePath) -> Option<&TypeDecl> {
        self.index.get(path).map(|&i| &self.decls[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Declarations with the given bare name, in any module.
    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TypeDecl> + 'a {
        self.decls.iter().filter(move |d| d.path.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names() {
        assert_eq!(PrimitiveKind::from_type_name("i64"), Some(PrimitiveKind::Int64));
        assert_eq!(
            PrimitiveKind::from_type_name("chrono::NaiveDateTime"),
            Some(PrimitiveKind::Timestamp)
        );
        assert_eq!(PrimitiveKind::from_type_name("u64"), None);
    }

    #[test]
    fn later_declaration_replaces_earlier() {
        let mut set = DeclSet::new();
        let path = TypePath::new("crate", "Flag");
        set.insert(TypeDecl {
            path: path.clone(),
            kind: DeclKind::Alias(SemanticType::Primitive(PrimitiveKind::Bool)),
        });
        set.insert(TypeDecl {
            path: path.clone(),
            kind: DeclKind::Alias(SemanticType::Primitive(PrimitiveKind::Int32)),
        });

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(&path).map(|d| &d.kind),
            Some(&DeclKind::Alias(SemanticType::Primitive(PrimitiveKind::Int32)))
        );
    }
}
