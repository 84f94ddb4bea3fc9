use std::collections::HashMap;
use std::path::Path;

use dbcrud::qb::Dialect;

use crate::cli::GenerateArgs;
use crate::collect::collect_dir;
use crate::config::{Connection, ProjectConfig};
use crate::decl::{DeclKind, DeclSet, TypeDecl};
use crate::emit::{EmitOptions, GeneratedFile, emit_entity, emit_root_mod};
use crate::error::{GenError, GenResult};
use crate::schema::{SchemaCompiler, TableSchema};
use crate::type_mapper::SqlTypeMapper;
use crate::write::{WriteOptions, apply_generated_files};

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let mut project = ProjectConfig::discover(args.config.clone())?;

    if args.context {
        project.file.crud.connection = Connection::Context;
    }
    if let Some(dialect) = args.dialect {
        project.file.output.dialect = dialect.name().to_string();
        // mysql output is schema-only
        if dialect == Dialect::MySql {
            project.file.output.crud = false;
            project.file.output.tests = false;
        }
    }
    project.file.validate()?;

    let src = args.src.clone().unwrap_or_else(|| project.src_dir());
    let out = args.out.clone().unwrap_or_else(|| project.out_dir());
    let opts = project.file.emit_options()?;

    tracing::info!(
        src = %src.display(),
        out = %out.display(),
        dialect = %opts.dialect,
        "generating"
    );

    let files = generate(
        &src,
        &out,
        &project.file.input.entities,
        &opts,
    )?;

    let summary = apply_generated_files(
        &files,
        &out,
        WriteOptions {
            dry_run: args.dry_run,
            check: args.check,
        },
    )?;
    tracing::info!(
        files = files.len(),
        changed = summary.changes.len(),
        unchanged = summary.unchanged,
        applied = summary.applied,
        "done"
    );
    Ok(())
}

/// Compile every entity under `src` and render the files to write under
/// `out`.
///
/// All entities are compiled before anything is emitted, so a single bad
/// entity yields an error and no files.
pub fn generate(
    src: &Path,
    out: &Path,
    allow: &[String],
    opts: &EmitOptions,
) -> GenResult<Vec<GeneratedFile>> {
    let decls = collect_dir(src, &[out.to_path_buf()])?;
    tracing::debug!(declarations = decls.len(), "collected");

    let entities = select_entities(&decls, allow)?;
    if entities.is_empty() {
        tracing::warn!(src = %src.display(), "no entities found");
    }

    let compiler = SchemaCompiler::new(&decls, SqlTypeMapper::default());
    let schemas = entities
        .iter()
        .map(|e| compiler.compile(e))
        .collect::<GenResult<Vec<TableSchema>>>()?;
    check_table_names(&schemas)?;

    let mut files = Vec::new();
    for schema in &schemas {
        files.extend(emit_entity(schema, opts, out));
    }
    if opts.crud && !schemas.is_empty() {
        files.push(emit_root_mod(&schemas, out));
    }
    Ok(files)
}

/// Structs marked `#[derive(Entity)]` plus the allow-listed names.
fn select_entities<'a>(decls: &'a DeclSet, allow: &[String]) -> GenResult<Vec<&'a TypeDecl>> {
    for name in allow {
        if decls.by_name(name).next().is_none() {
            return Err(GenError::config(format!(
                "input.entities: no declaration named `{name}`"
            )));
        }
    }

    let mut out = Vec::new();
    for decl in decls.iter() {
        let listed = allow.iter().any(|n| n == decl.name());
        if !decl.is_marked_entity() && !listed {
            continue;
        }
        if !matches!(decl.kind, DeclKind::Struct { .. }) {
            return Err(GenError::NotAStruct {
                name: decl.name().to_string(),
            });
        }
        out.push(decl);
    }
    Ok(out)
}

fn check_table_names(schemas: &[TableSchema]) -> GenResult<()> {
    let mut seen: HashMap<&str, &TableSchema> = HashMap::new();
    for s in schemas {
        if let Some(first) = seen.insert(&s.name, s) {
            return Err(GenError::config(format!(
                "`{}` and `{}` both map to table `{}`",
                first.entity, s.entity, s.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_source;

    fn decls(src: &str) -> DeclSet {
        let mut set = DeclSet::new();
        collect_source("crate", src, &mut set).unwrap();
        set
    }

    #[test]
    fn marked_and_listed_entities() {
        let set = decls(
            "#[derive(Entity)] struct A { id: i64 }
             struct B { id: i64 }
             struct C { id: i64 }",
        );
        let names: Vec<_> = select_entities(&set, &["C".to_string()])
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn listed_non_struct_is_rejected() {
        let set = decls("type Flag = bool; struct Level(i32);");
        let err = select_entities(&set, &["Level".to_string()]).unwrap_err();
        assert!(matches!(err, GenError::NotAStruct { ref name } if name == "Level"));

        let err = select_entities(&set, &["Missing".to_string()]).unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn duplicate_table_names() {
        let mut set = DeclSet::new();
        collect_source("crate::a", "#[derive(Entity)] struct User { id: i64 }", &mut set).unwrap();
        collect_source("crate::b", "#[derive(Entity)] struct User { id: i64 }", &mut set).unwrap();

        let compiler = SchemaCompiler::new(&set, SqlTypeMapper::default());
        let schemas: Vec<_> = set.iter().map(|d| compiler.compile(d).unwrap()).collect();
        let err = check_table_names(&schemas).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: `crate::a::User` and `crate::b::User` both map to table `user`"
        );
    }
}
