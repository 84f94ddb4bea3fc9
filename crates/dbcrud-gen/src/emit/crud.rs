//! The per-entity CRUD module.

use dbcrud::qb::{self, SelectColumn};

use crate::decl::PrimitiveKind;
use crate::emit::ir::{Arg, ConstDecl, FnDecl, Item, RustFile, Stmt, Vis};
use crate::emit::{ConnectionMode, EmitOptions, ident, model_uses, str_lit};
use crate::resolve::Via;
use crate::schema::TableSchema;

pub(super) fn crud_file(schema: &TableSchema, opts: &EmitOptions) -> RustFile {
    let e = CrudEmitter::new(schema, opts);
    let mut file = RustFile::new();

    let mut runtime = vec![
        "dbcrud::qb::{self, Dialect}".to_string(),
        "dbcrud::tokio_postgres::Row".to_string(),
    ];
    runtime.push(match opts.connection {
        ConnectionMode::Explicit => "dbcrud::{CrudError, CrudResult, Fields, GenericClient, Operation}",
        ConnectionMode::Context => {
            "dbcrud::{CrudError, CrudResult, DbContext, Fields, GenericClient, Operation}"
        }
    }
    .to_string());
    file.push(Item::Uses(runtime));
    file.push(Item::Uses(model_uses(schema)));

    for c in e.consts() {
        file.push(c);
    }
    file.push(e.insert());
    file.push(e.select());
    file.push(e.select_by_id());
    file.push(e.update());
    file.push(e.update_by_id());
    file.push(e.delete());
    file.push(e.delete_by_id());
    file.push(e.contains_field());
    file.push(e.from_row());
    file
}

struct CrudEmitter<'a> {
    schema: &'a TableSchema,
    opts: &'a EmitOptions,
    model: &'a str,
    id_ty: &'static str,
}

impl<'a> CrudEmitter<'a> {
    fn new(schema: &'a TableSchema, opts: &'a EmitOptions) -> Self {
        Self {
            schema,
            opts,
            model: &schema.entity.name,
            id_ty: schema.identity().kind.rust_type(),
        }
    }

    fn consts(&self) -> Vec<Item> {
        let s = self.schema;
        let columns: Vec<&str> = s.columns.iter().map(|c| c.name.as_str()).collect();
        let insert_columns: Vec<&str> = s.insert_columns().map(|c| c.name.as_str()).collect();
        let select_columns: Vec<SelectColumn<'_>> = s
            .columns
            .iter()
            .map(|c| match c.kind {
                PrimitiveKind::Bool => SelectColumn::boolean(&c.name),
                PrimitiveKind::Text if c.ty.is_blank_padded(self.opts.dialect) => {
                    SelectColumn::trimmed(&c.name)
                }
                _ => SelectColumn::new(&c.name),
            })
            .collect();

        let dialect = format!("Dialect::{:?}", self.opts.dialect);
        let column_list = columns.iter().map(|c| str_lit(c)).collect::<Vec<_>>().join(", ");

        vec![
            konst(Vis::Pub, "TABLE", "&str", str_lit(&s.name)),
            konst(Vis::Pub, "COLUMNS", "&[&str]", format!("&[{column_list}]")),
            konst(Vis::Pub, "IDENTITY", "&str", str_lit(&s.identity().name)),
            ConstDecl {
                doc: vec!["Upper bound on rows returned by one select.".into()],
                vis: Vis::Pub,
                name: "MAX_ROWS".into(),
                ty: "usize".into(),
                value: self.opts.max_rows.to_string(),
            }
            .into(),
            konst(Vis::Private, "DIALECT", "Dialect", dialect),
            konst(
                Vis::Private,
                "INSERT_SQL",
                "&str",
                str_lit(&qb::insert_sql(
                    self.opts.dialect,
                    &s.name,
                    &insert_columns,
                    &s.identity().name,
                )),
            ),
            konst(
                Vis::Private,
                "SELECT_SQL",
                "&str",
                str_lit(&qb::select_sql(&s.name, &select_columns)),
            ),
        ]
    }

    /// Connection argument plus the statements that bind `db`.
    fn conn(&self) -> (Arg, Vec<Stmt>) {
        match self.opts.connection {
            ConnectionMode::Explicit => (Arg::new("db", "&impl GenericClient"), Vec::new()),
            ConnectionMode::Context => (
                Arg::new("cx", "&DbContext"),
                vec![Stmt::line(format!(
                    "let db = cx.db::<{}>()?;",
                    self.opts.context_client
                ))],
            ),
        }
    }

    /// Name to pass when one generated function calls another.
    fn conn_name(&self) -> &'static str {
        match self.opts.connection {
            ConnectionMode::Explicit => "db",
            ConnectionMode::Context => "cx",
        }
    }

    fn func(&self, name: &str) -> (FnDecl, Vec<Stmt>) {
        let (arg, prelude) = self.conn();
        (FnDecl::new(name).public().asyncness().arg(arg), prelude)
    }

    fn id_fields(&self) -> String {
        format!(
            "&Fields::new().with({}, id)",
            str_lit(&self.schema.identity().name)
        )
    }

    fn insert(&self) -> Item {
        let auto: Vec<&str> = self
            .schema
            .insert_columns()
            .filter(|c| self.opts.is_auto_timestamp(c))
            .map(|c| c.name.as_str())
            .collect();

        let (mut f, mut body) = self.func("insert");
        f = f
            .doc("Inserts `d` and returns the id assigned to the new row.")
            .arg(Arg::new("d", format!("&{}", self.model)))
            .returns(format!("CrudResult<{}>", self.id_ty));
        if !auto.is_empty() {
            f = f.doc("").doc(format!(
                "{} set to the current time; the values on `d` are ignored.",
                auto.iter()
                    .map(|c| format!("`{c}`"))
                    .collect::<Vec<_>>()
                    .join(" and ")
                    + if auto.len() == 1 { " is" } else { " are" }
            ));
            body.push(Stmt::line("let now = dbcrud::clock::now();"));
        }

        let params = self
            .schema
            .insert_columns()
            .map(|c| {
                let expr = if self.opts.is_auto_timestamp(c) {
                    "&now".to_string()
                } else if matches!(c.via, Via::Newtype(_)) {
                    format!("&d.{}.0", ident(&c.field))
                } else {
                    format!("&d.{}", ident(&c.field))
                };
                Stmt::line(format!("{expr},"))
            })
            .collect();
        body.push(Stmt::block(
            "let row = GenericClient::query_one(db, INSERT_SQL, &[",
            params,
            "]).await?;",
        ));
        body.push(Stmt::line("Ok(row.try_get(0)?)"));
        f.body(body).into()
    }

    fn select(&self) -> Item {
        let (f, mut body) = self.func("select");
        body.extend([
            Stmt::line("let stmt = qb::select(DIALECT, SELECT_SQL, query, model_contains_field)?"),
            Stmt::line("    .with_limit(MAX_ROWS + 1);"),
            Stmt::line("let rows = GenericClient::query(db, &stmt.sql, &stmt.params()).await?;"),
            Stmt::braced(
                "if rows.len() > MAX_ROWS",
                vec![Stmt::line("return Err(CrudError::TooManyRows { max: MAX_ROWS });")],
            ),
            Stmt::line("rows.iter().map(from_row).collect()"),
        ]);
        f.doc("Selects every row whose columns equal the values in `query`.")
            .doc("")
            .doc("An empty `query` selects the whole table.")
            .arg(Arg::new("query", "&Fields"))
            .returns(format!("CrudResult<Vec<{}>>", self.model))
            .body(body)
            .into()
    }

    fn select_by_id(&self) -> Item {
        let f = FnDecl::new("select_by_id")
            .public()
            .asyncness()
            .doc("Selects the row with the given id.");
        let (arg, _) = self.conn();
        let body = vec![
            Stmt::line(format!(
                "let mut rows = select({}, {}).await?;",
                self.conn_name(),
                self.id_fields()
            )),
            Stmt::block(
                "match rows.len() {",
                vec![
                    Stmt::line(
                        "0 => Err(CrudError::NotFound { op: Operation::SelectById, id: i64::from(id) }),",
                    ),
                    Stmt::line("1 => Ok(rows.remove(0)),"),
                    Stmt::line("count => Err(CrudError::Ambiguous { op: Operation::SelectById, count }),"),
                ],
                "}",
            ),
        ];
        f.arg(arg)
            .arg(Arg::new("id", self.id_ty))
            .returns(format!("CrudResult<{}>", self.model))
            .body(body)
            .into()
    }

    fn update(&self) -> Item {
        let (f, mut body) = self.func("update");
        body.extend([
            Stmt::block(
                "let Some(stmt) = qb::update(DIALECT, TABLE, updates, query, model_contains_field)? else {",
                vec![Stmt::line("return Ok(0);")],
                "};",
            ),
            Stmt::line("GenericClient::execute(db, &stmt.sql, &stmt.params()).await"),
        ]);
        f.doc("Sets `updates` on every row matching `query` and returns the number of rows changed.")
            .doc("")
            .doc("Does nothing when `updates` is empty.")
            .arg(Arg::new("updates", "&Fields"))
            .arg(Arg::new("query", "&Fields"))
            .returns("CrudResult<u64>")
            .body(body)
            .into()
    }

    fn update_by_id(&self) -> Item {
        let (arg, _) = self.conn();
        let body = vec![
            Stmt::braced("if updates.is_empty()", vec![Stmt::line("return Ok(());")]),
            Stmt::line(format!(
                "let n = update({}, updates, {}).await?;",
                self.conn_name(),
                self.id_fields()
            )),
            Stmt::braced(
                "if n == 0",
                vec![Stmt::line(
                    "return Err(CrudError::NoSuchId { op: Operation::UpdateById });",
                )],
            ),
            Stmt::line("Ok(())"),
        ];
        FnDecl::new("update_by_id")
            .public()
            .asyncness()
            .arg(arg)
            .arg(Arg::new("id", self.id_ty))
            .arg(Arg::new("updates", "&Fields"))
            .returns("CrudResult<()>")
            .body(body)
            .into()
    }

    fn delete(&self) -> Item {
        let (f, mut body) = self.func("delete");
        body.extend([
            Stmt::line("let stmt = qb::delete(DIALECT, TABLE, query, model_contains_field)?;"),
            Stmt::line("GenericClient::execute(db, &stmt.sql, &stmt.params()).await"),
        ]);
        f.doc("Deletes every row matching `query`; an empty `query` empties the table.")
            .arg(Arg::new("query", "&Fields"))
            .returns("CrudResult<u64>")
            .body(body)
            .into()
    }

    fn delete_by_id(&self) -> Item {
        let (arg, _) = self.conn();
        let body = vec![
            Stmt::line(format!(
                "let n = delete({}, {}).await?;",
                self.conn_name(),
                self.id_fields()
            )),
            Stmt::braced(
                "if n == 0",
                vec![Stmt::line(
                    "return Err(CrudError::NoSuchId { op: Operation::DeleteById });",
                )],
            ),
            Stmt::line("Ok(())"),
        ];
        FnDecl::new("delete_by_id")
            .public()
            .asyncness()
            .arg(arg)
            .arg(Arg::new("id", self.id_ty))
            .returns("CrudResult<()>")
            .body(body)
            .into()
    }

    fn contains_field(&self) -> Item {
        FnDecl::new("model_contains_field")
            .arg(Arg::new("field", "&str"))
            .returns("bool")
            .body(vec![Stmt::line("COLUMNS.contains(&field)")])
            .into()
    }

    fn from_row(&self) -> Item {
        let inits = self
            .schema
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let get = format!("row.try_get({i})?");
                let value = match &c.via {
                    Via::Newtype(p) => format!("{}({get})", p.name),
                    Via::Direct | Via::Alias(_) => get,
                };
                Stmt::line(format!("{}: {value},", ident(&c.field)))
            })
            .collect();

        FnDecl::new("from_row")
            .arg(Arg::new("row", "&Row"))
            .returns(format!("CrudResult<{}>", self.model))
            .body(vec![Stmt::block(
                format!("Ok({} {{", self.model),
                inits,
                "})",
            )])
            .into()
    }
}

fn konst(vis: Vis, name: &str, ty: &str, value: String) -> Item {
    ConstDecl {
        doc: Vec::new(),
        vis,
        name: name.into(),
        ty: ty.into(),
        value,
    }
    .into()
}
