//! Schema compiler: entity declaration to table schema and DDL.

use heck::ToSnakeCase;

use dbcrud::entity::DEFAULT_IDENTITY;
use dbcrud::qb::Dialect;

use crate::decl::{DeclKind, DeclSet, FieldDecl, PrimitiveKind, TypeDecl, TypePath};
use crate::error::{GenError, GenResult};
use crate::resolve::{ResolveError, TypeResolver, Via};
use crate::type_mapper::{ColumnType, SqlTypeMapper};

/// One column, derived from one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// snake_case column name.
    pub name: String,
    /// Rust field name, as declared.
    pub field: String,
    pub ty: ColumnType,
    pub kind: PrimitiveKind,
    pub via: Via,
    pub primary_key: bool,
    pub auto_increment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// The entity this table was compiled from.
    pub entity: TypePath,
    pub name: String,
    /// Declaration order.
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn identity(&self) -> &Column {
        // `compile` guarantees exactly one primary key.
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .unwrap_or(&self.columns[0])
    }

    /// Columns bound by an insert: everything but the identity.
    pub fn insert_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// The `CREATE TABLE` statement for this table.
    pub fn create_table_sql(&self, dialect: Dialect) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let ty = c.ty.render(dialect);
                match (c.auto_increment, dialect) {
                    (true, Dialect::MySql) => format!("  {} {ty} NOT NULL AUTO_INCREMENT", c.name),
                    (true, Dialect::Postgres) => {
                        format!("  {} {ty} GENERATED BY DEFAULT AS IDENTITY", c.name)
                    }
                    (false, _) => format!("  {} {ty} NOT NULL", c.name),
                }
            })
            .collect();
        lines.push(format!("  PRIMARY KEY ({})", self.identity().name));

        format!("CREATE TABLE {} (\n{}\n);\n", self.name, lines.join(",\n"))
    }
}

pub struct SchemaCompiler<'a> {
    resolver: TypeResolver<'a>,
    mapper: SqlTypeMapper,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(decls: &'a DeclSet, mapper: SqlTypeMapper) -> Self {
        Self {
            resolver: TypeResolver::new(decls),
            mapper,
        }
    }

    pub fn compile(&self, entity: &TypeDecl) -> GenResult<TableSchema> {
        let DeclKind::Struct { fields, .. } = &entity.kind else {
            return Err(GenError::NotAStruct {
                name: entity.name().to_string(),
            });
        };

        let entity_name = entity.name();
        let identity = self.identity_index(entity_name, fields)?;

        let mut columns = Vec::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            let resolved = self
                .resolver
                .resolve(&field.ty)
                .map_err(|e| resolve_error(entity_name, field, e))?;
            let ty = self
                .mapper
                .map(resolved.kind, field.type_override.as_deref())
                .map_err(|reason| GenError::InvalidOverride {
                    entity: entity_name.to_string(),
                    field: field.name.clone(),
                    text: field.type_override.clone().unwrap_or_default(),
                    reason,
                })?;

            let is_identity = i == identity;
            if is_identity && !resolved.kind.is_integer() {
                return Err(GenError::IdentityNotInteger {
                    entity: entity_name.to_string(),
                    field: field.name.clone(),
                    ty: field.ty_text.clone(),
                });
            }

            columns.push(Column {
                name: field.name.to_snake_case(),
                field: field.name.clone(),
                ty,
                kind: resolved.kind,
                via: resolved.via,
                primary_key: is_identity,
                auto_increment: is_identity,
            });
        }

        let schema = TableSchema {
            entity: entity.path.clone(),
            name: entity_name.to_snake_case(),
            columns,
        };
        tracing::debug!(
            entity = %entity.path,
            table = %schema.name,
            columns = schema.columns.len(),
            "compiled table"
        );
        Ok(schema)
    }

    fn identity_index(&self, entity: &str, fields: &[FieldDecl]) -> GenResult<usize> {
        let mut marked = fields.iter().enumerate().filter(|(_, f)| f.is_id);
        if let Some((i, first)) = marked.next() {
            if let Some((_, second)) = marked.next() {
                return Err(GenError::DuplicateIdentity {
                    entity: entity.to_string(),
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
            return Ok(i);
        }

        fields
            .iter()
            .position(|f| f.name.to_snake_case() == DEFAULT_IDENTITY)
            .ok_or_else(|| GenError::MissingIdentity {
                entity: entity.to_string(),
                identity: DEFAULT_IDENTITY.to_string(),
            })
    }
}

fn resolve_error(entity: &str, field: &FieldDecl, err: ResolveError) -> GenError {
    let entity = entity.to_string();
    let field_name = field.name.clone();
    match err {
        ResolveError::Unresolved(_) => GenError::UnresolvedType {
            entity,
            field: field_name,
            ty: field.ty_text.clone(),
        },
        ResolveError::Chain { ty, target } => GenError::AliasChain {
            entity,
            field: field_name,
            ty: ty.name,
            target: target.to_string(),
        },
        ResolveError::Unmappable(_) => GenError::NoSqlMapping {
            entity,
            field: field_name,
            ty: field.ty_text.clone(),
        },
    }
}
