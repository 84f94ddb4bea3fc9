//! Output emission: schema DDL, CRUD modules and round-trip tests.
//!
//! Each entity gets its own directory under the output root:
//!
//! ```text
//! <out>/mod.rs                      pub mod <entity>; ...
//! <out>/<entity>/mod.rs             mod db_crud; pub use db_crud::*;
//! <out>/<entity>/schema.sql
//! <out>/<entity>/db_crud.rs
//! <out>/<entity>/db_crud_test.rs
//! ```

mod crud;
mod fixtures;
pub mod ir;
pub mod printer;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use dbcrud::qb::Dialect;

use crate::decl::{PrimitiveKind, TypePath};
use crate::resolve::Via;
use crate::schema::{Column, TableSchema};
use ir::{Item, RustFile, Vis};

pub const GENERATED_BY: &str = "@generated by dbcrud-gen. Do not edit by hand.";

const CRUD_MODULE: &str = "db_crud";
const TEST_MODULE: &str = "db_crud_test";

/// A file produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// How generated functions obtain their connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// `db: &impl GenericClient` as the first argument.
    #[default]
    Explicit,
    /// `cx: &DbContext`, with the client type fixed at generation time.
    Context,
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub dialect: Dialect,
    pub connection: ConnectionMode,
    /// Concrete client type stored in a `DbContext`.
    pub context_client: String,
    pub max_rows: usize,
    /// Column names stamped with the current time on insert.
    pub auto_timestamps: Vec<String>,
    pub schema: bool,
    pub crud: bool,
    pub tests: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            connection: ConnectionMode::Explicit,
            context_client: "dbcrud::tokio_postgres::Client".into(),
            max_rows: 1000,
            auto_timestamps: vec!["inserted_at".into(), "updated_at".into()],
            schema: true,
            crud: true,
            tests: true,
        }
    }
}

impl EmitOptions {
    pub(crate) fn is_auto_timestamp(&self, column: &Column) -> bool {
        !column.primary_key
            && column.kind == PrimitiveKind::Timestamp
            && self.auto_timestamps.iter().any(|t| *t == column.name)
    }
}

/// All files for one compiled entity.
pub fn emit_entity(schema: &TableSchema, opts: &EmitOptions, out_dir: &Path) -> Vec<GeneratedFile> {
    let dir = out_dir.join(&schema.name);
    let mut files = Vec::new();

    if opts.schema {
        files.push(GeneratedFile {
            path: dir.join("schema.sql"),
            content: format!("-- {GENERATED_BY}\n\n{}", schema.create_table_sql(opts.dialect)),
        });
    }
    if opts.crud {
        files.push(GeneratedFile {
            path: dir.join(format!("{CRUD_MODULE}.rs")),
            content: printer::print_file(&header(), &crud::crud_file(schema, opts)),
        });
        files.push(GeneratedFile {
            path: dir.join("mod.rs"),
            content: printer::print_file(&header(), &entity_mod(opts.tests && opts.schema)),
        });
    }
    if opts.crud && opts.tests && opts.schema {
        files.push(GeneratedFile {
            path: dir.join(format!("{TEST_MODULE}.rs")),
            content: printer::print_file(&header(), &fixtures::test_file(schema, opts)),
        });
    }
    files
}

/// `<out>/mod.rs` declaring one module per entity.
pub fn emit_root_mod(schemas: &[TableSchema], out_dir: &Path) -> GeneratedFile {
    let names: BTreeSet<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
    let mut file = RustFile::new();
    for name in names {
        file.push(Item::Mod {
            attrs: Vec::new(),
            vis: Vis::Pub,
            name: name.to_string(),
        });
    }
    GeneratedFile {
        path: out_dir.join("mod.rs"),
        content: printer::print_file(&header(), &file),
    }
}

fn header() -> String {
    format!("// {GENERATED_BY}")
}

fn entity_mod(tests: bool) -> RustFile {
    let mut file = RustFile::new();
    file.push(Item::Mod {
        attrs: Vec::new(),
        vis: Vis::Private,
        name: CRUD_MODULE.into(),
    });
    if tests {
        file.push(Item::Mod {
            attrs: vec!["cfg(test)".into()],
            vis: Vis::Private,
            name: TEST_MODULE.into(),
        });
    }
    file.push(Item::Reexport(format!("{CRUD_MODULE}::*")));
    file
}

/// `use` path for a declared type, relative to the crate root.
pub(crate) fn use_path(path: &TypePath) -> String {
    format!("{}::{}", path.module, path.name)
}

/// `use` lines for the entity and any newtype wrappers its columns use.
pub(crate) fn model_uses(schema: &TableSchema) -> Vec<String> {
    let mut paths = BTreeSet::new();
    paths.insert(use_path(&schema.entity));
    for c in &schema.columns {
        if let Via::Newtype(p) = &c.via {
            paths.insert(use_path(p));
        }
    }
    paths.into_iter().collect()
}

/// A field name usable as an identifier in emitted code.
pub(crate) fn ident(name: &str) -> String {
    if is_keyword(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "gen"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "yield"
    )
}

/// Quote `s` as a Rust string literal.
pub(crate) fn str_lit(s: &str) -> String {
    format!("{s:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_mod_is_sorted() {
        let schema = |name: &str| TableSchema {
            entity: TypePath::new("crate", name),
            name: name.into(),
            columns: Vec::new(),
        };
        let file = emit_root_mod(&[schema("zeta"), schema("alpha")], Path::new("gen"));
        assert_eq!(file.path, Path::new("gen/mod.rs"));
        assert_eq!(
            file.content,
            format!("// {GENERATED_BY}\n\npub mod alpha;\n\npub mod zeta;\n")
        );
    }

    #[test]
    fn entity_mod_declares_test_module() {
        let text = printer::print_file("//", &entity_mod(true));
        assert_eq!(
            text,
            "//\n\nmod db_crud;\n\n#[cfg(test)]\nmod db_crud_test;\n\npub use db_crud::*;\n"
        );
    }

    #[test]
    fn keywords_become_raw_identifiers() {
        assert_eq!(ident("type"), "r#type");
        assert_eq!(ident("some_int"), "some_int");
    }
}
