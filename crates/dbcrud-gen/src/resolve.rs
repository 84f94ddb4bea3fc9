//! Type resolver: named field types down to a primitive kind.

use crate::decl::{DeclKind, DeclSet, PrimitiveKind, SemanticType, TypePath};

/// How a field's declared type reached its primitive kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Via {
    /// Declared directly as a primitive.
    Direct,
    /// `type X = prim;` binds and decodes as the primitive itself.
    Alias(TypePath),
    /// `struct X(prim);` binds `.0` and is re-wrapped on decode.
    Newtype(TypePath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub kind: PrimitiveKind,
    pub via: Via,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No declaration with this identity.
    Unresolved(TypePath),
    /// The declaration points at another named type.
    Chain { ty: TypePath, target: TypePath },
    /// Not something a column can hold (unsupported syntax, enum, struct).
    Unmappable(String),
}

/// Resolves through at most one level of named-type indirection.
pub struct TypeResolver<'a> {
    decls: &'a DeclSet,
}

impl<'a> TypeResolver<'a> {
    pub fn new(decls: &'a DeclSet) -> Self {
        Self { decls }
    }

    pub fn resolve(&self, ty: &SemanticType) -> Result<Resolved, ResolveError> {
        match ty {
            SemanticType::Primitive(kind) => Ok(Resolved {
                kind: *kind,
                via: Via::Direct,
            }),
            SemanticType::Unsupported(text) => Err(ResolveError::Unmappable(text.clone())),
            SemanticType::Named(path) => {
                let decl = self
                    .decls
                    .get(path)
                    .ok_or_else(|| ResolveError::Unresolved(path.clone()))?;
                let (inner, via) = match &decl.kind {
                    DeclKind::Alias(inner) => (inner, Via::Alias(path.clone())),
                    DeclKind::Newtype(inner) => (inner, Via::Newtype(path.clone())),
                    DeclKind::Struct { .. } | DeclKind::Other => {
                        return Err(ResolveError::Unmappable(path.to_string()));
                    }
                };
                match inner {
                    SemanticType::Primitive(kind) => Ok(Resolved { kind: *kind, via }),
                    SemanticType::Named(target) => Err(ResolveError::Chain {
                        ty: path.clone(),
                        target: target.clone(),
                    }),
                    SemanticType::Unsupported(text) => Err(ResolveError::Unmappable(text.clone())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDecl;

    fn decls() -> DeclSet {
        let mut set = DeclSet::new();
        set.insert(TypeDecl {
            path: TypePath::new("crate", "Int32Enum"),
            kind: DeclKind::Newtype(SemanticType::Primitive(PrimitiveKind::Int32)),
        });
        set.insert(TypeDecl {
            path: TypePath::new("crate", "StringEnum"),
            kind: DeclKind::Alias(SemanticType::Primitive(PrimitiveKind::Text)),
        });
        set.insert(TypeDecl {
            path: TypePath::new("crate", "Twice"),
            kind: DeclKind::Alias(SemanticType::Named(TypePath::new("crate", "StringEnum"))),
        });
        set.insert(TypeDecl {
            path: TypePath::new("crate", "Color"),
            kind: DeclKind::Other,
        });
        set
    }

    #[test]
    fn primitives_pass_through() {
        let set = decls();
        let r = TypeResolver::new(&set)
            .resolve(&SemanticType::Primitive(PrimitiveKind::Bool))
            .unwrap();
        assert_eq!(r.kind, PrimitiveKind::Bool);
        assert_eq!(r.via, Via::Direct);
    }

    #[test]
    fn one_hop() {
        let set = decls();
        let resolver = TypeResolver::new(&set);

        let r = resolver
            .resolve(&SemanticType::Named(TypePath::new("crate", "Int32Enum")))
            .unwrap();
        assert_eq!(r.kind, PrimitiveKind::Int32);
        assert!(matches!(r.via, Via::Newtype(_)));

        let r = resolver
            .resolve(&SemanticType::Named(TypePath::new("crate", "StringEnum")))
            .unwrap();
        assert_eq!(r.kind, PrimitiveKind::Text);
        assert!(matches!(r.via, Via::Alias(_)));
    }

    #[test]
    fn deeper_chains_are_rejected() {
        let set = decls();
        let err = TypeResolver::new(&set)
            .resolve(&SemanticType::Named(TypePath::new("crate", "Twice")))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Chain { .. }));
    }

    #[test]
    fn unknown_and_unmappable() {
        let set = decls();
        let resolver = TypeResolver::new(&set);

        // Same name, different module: identity includes the module.
        let err = resolver
            .resolve(&SemanticType::Named(TypePath::new("crate::other", "Int32Enum")))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unresolved(_)));

        let err = resolver
            .resolve(&SemanticType::Named(TypePath::new("crate", "Color")))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unmappable(_)));
    }
}
