//! Round-trip tests emitted next to each CRUD module.
//!
//! The tests run the generated functions against a real Postgres server
//! (`DATABASE_URL`), one fresh schema per case, and skip when no server is
//! configured. Model values are derived from an integer nonce so that two
//! values built from the same nonce compare equal. The entity must derive
//! `Debug` and `PartialEq`.

use crate::decl::PrimitiveKind;
use crate::emit::ir::{Arg, ConstDecl, FnDecl, Item, RustFile, Stmt, StructDecl, Vis};
use crate::emit::{ConnectionMode, EmitOptions, ident, model_uses, str_lit};
use crate::resolve::Via;
use crate::schema::{Column, TableSchema};

#[derive(Debug, Clone, Copy)]
enum Payload {
    Empty,
    Nonce(i64),
    /// A key that names no column.
    Unknown,
}

#[derive(Debug, Clone, Copy)]
struct CaseTemplate {
    name: &'static str,
    insert: &'static [i64],
    id: Option<i64>,
    updates: Payload,
    query: Payload,
    expected_count: Option<u64>,
    /// (nonce, id) pairs, in id order.
    expected: &'static [(i64, i64)],
    expect_err: bool,
}

const CASE: CaseTemplate = CaseTemplate {
    name: "",
    insert: &[],
    id: None,
    updates: Payload::Empty,
    query: Payload::Empty,
    expected_count: None,
    expected: &[],
    expect_err: false,
};

const INSERT_AND_SELECT: &[CaseTemplate] = &[
    CaseTemplate {
        name: "selects nothing when nothing inserted",
        ..CASE
    },
    CaseTemplate {
        name: "insert one and select",
        insert: &[11],
        expected: &[(11, 1)],
        ..CASE
    },
    CaseTemplate {
        name: "insert many and select",
        insert: &[11, 21, 31, 41],
        expected: &[(11, 1), (21, 2), (31, 3), (41, 4)],
        ..CASE
    },
    CaseTemplate {
        name: "insert many and select with query",
        insert: &[22, 45, 45, 1, 45],
        query: Payload::Nonce(45),
        expected: &[(45, 2), (45, 3), (45, 5)],
        ..CASE
    },
    CaseTemplate {
        name: "select query field which is not in data model returns error",
        insert: &[1],
        query: Payload::Unknown,
        expect_err: true,
        ..CASE
    },
];

const SELECT_BY_ID: &[CaseTemplate] = &[
    CaseTemplate {
        name: "when ID not found returns error",
        insert: &[100, 200],
        id: Some(12345),
        expect_err: true,
        ..CASE
    },
    CaseTemplate {
        name: "when ID is found returns row",
        insert: &[100, 200, 300],
        id: Some(2),
        expected: &[(200, 2)],
        ..CASE
    },
];

const UPDATE: &[CaseTemplate] = &[
    CaseTemplate {
        name: "empty params does nothing",
        expected_count: Some(0),
        ..CASE
    },
    CaseTemplate {
        name: "update unknown field throws error",
        insert: &[1],
        updates: Payload::Unknown,
        expected: &[(1, 1)],
        expect_err: true,
        ..CASE
    },
    CaseTemplate {
        name: "query unknown field throws error",
        insert: &[7, 8],
        updates: Payload::Nonce(1),
        query: Payload::Unknown,
        expected: &[(7, 1), (8, 2)],
        expect_err: true,
        ..CASE
    },
    CaseTemplate {
        name: "update all records",
        insert: &[123, 124, 125, 126],
        updates: Payload::Nonce(111),
        expected_count: Some(4),
        expected: &[(111, 1), (111, 2), (111, 3), (111, 4)],
        ..CASE
    },
    CaseTemplate {
        name: "update records with query",
        insert: &[123, 125, 124, 125, 126, 125],
        updates: Payload::Nonce(999),
        query: Payload::Nonce(125),
        expected_count: Some(3),
        expected: &[(123, 1), (999, 2), (124, 3), (999, 4), (126, 5), (999, 6)],
        ..CASE
    },
];

const UPDATE_BY_ID: &[CaseTemplate] = &[
    CaseTemplate {
        name: "no updates does not error even if ID does not exist",
        insert: &[5],
        id: Some(1234),
        expected: &[(5, 1)],
        ..CASE
    },
    CaseTemplate {
        name: "when there are updates and ID not found throws error",
        insert: &[1, 2],
        id: Some(1234),
        updates: Payload::Nonce(1),
        expected: &[(1, 1), (2, 2)],
        expect_err: true,
        ..CASE
    },
    CaseTemplate {
        name: "when update field not in schema throws error",
        insert: &[1],
        id: Some(1),
        updates: Payload::Unknown,
        expected: &[(1, 1)],
        expect_err: true,
        ..CASE
    },
    CaseTemplate {
        name: "insert many and update one by id",
        insert: &[101, 102, 103, 104],
        id: Some(3),
        updates: Payload::Nonce(555),
        expected: &[(101, 1), (102, 2), (555, 3), (104, 4)],
        ..CASE
    },
];

const DELETE: &[CaseTemplate] = &[
    CaseTemplate {
        name: "empty query deletes all records",
        insert: &[1000, 1001, 1002, 1003, 1004],
        expected_count: Some(5),
        ..CASE
    },
    CaseTemplate {
        name: "delete records using query",
        insert: &[1000, 1001, 1002, 1002, 1003, 1004, 1002],
        query: Payload::Nonce(1002),
        expected_count: Some(3),
        expected: &[(1000, 1), (1001, 2), (1003, 5), (1004, 6)],
        ..CASE
    },
    CaseTemplate {
        name: "when query contains field not in data model returns error",
        insert: &[1000],
        query: Payload::Unknown,
        expected: &[(1000, 1)],
        expect_err: true,
        ..CASE
    },
];

const DELETE_BY_ID: &[CaseTemplate] = &[
    CaseTemplate {
        name: "when ID not found returns error",
        insert: &[101, 102],
        id: Some(0),
        expected: &[(101, 1), (102, 2)],
        expect_err: true,
        ..CASE
    },
    CaseTemplate {
        name: "insert many and delete by ID",
        insert: &[101, 102, 103, 104],
        id: Some(3),
        expected: &[(101, 1), (102, 2), (104, 4)],
        ..CASE
    },
];

#[derive(Debug, Clone, Copy)]
enum Suite {
    InsertAndSelect,
    SelectById,
    Update,
    UpdateById,
    Delete,
    DeleteById,
}

const SUITES: [Suite; 6] = [
    Suite::InsertAndSelect,
    Suite::SelectById,
    Suite::Update,
    Suite::UpdateById,
    Suite::Delete,
    Suite::DeleteById,
];

impl Suite {
    fn name(self) -> &'static str {
        match self {
            Self::InsertAndSelect => "insert_and_select",
            Self::SelectById => "select_by_id",
            Self::Update => "update",
            Self::UpdateById => "update_by_id",
            Self::Delete => "delete",
            Self::DeleteById => "delete_by_id",
        }
    }

    fn cases(self) -> &'static [CaseTemplate] {
        match self {
            Self::InsertAndSelect => INSERT_AND_SELECT,
            Self::SelectById => SELECT_BY_ID,
            Self::Update => UPDATE,
            Self::UpdateById => UPDATE_BY_ID,
            Self::Delete => DELETE,
            Self::DeleteById => DELETE_BY_ID,
        }
    }

    /// Statements run after the case's rows are inserted. `id` is the
    /// field access used to sort rows by identity.
    fn check(self, id: &str) -> Vec<Stmt> {
        let call = match self {
            Self::InsertAndSelect => "crud::select(conn, &case.query)",
            Self::SelectById => "crud::select_by_id(conn, case.id)",
            Self::Update => "crud::update(conn, &case.updates, &case.query)",
            Self::UpdateById => "crud::update_by_id(conn, case.id, &case.updates)",
            Self::Delete => "crud::delete(conn, &case.query)",
            Self::DeleteById => "crud::delete_by_id(conn, case.id)",
        };
        let (binding, mut ok) = match self {
            Self::InsertAndSelect => (
                "Ok(mut actual)",
                vec![
                    Stmt::line(format!("actual.sort_by_key(|d| d.{id});")),
                    Stmt::line("assert_eq!(case.expected, actual, \"{}\", case.name);"),
                ],
            ),
            Self::SelectById => (
                "Ok(actual)",
                vec![Stmt::line(
                    "assert_eq!(case.expected, vec![actual], \"{}\", case.name);",
                )],
            ),
            Self::Update | Self::Delete => (
                "Ok(n)",
                vec![
                    Stmt::line("assert_eq!(case.expected_count, n, \"{}\", case.name);"),
                    Stmt::line("assert_rows(conn, &case).await;"),
                ],
            ),
            Self::UpdateById | Self::DeleteById => (
                "Ok(())",
                vec![Stmt::line("assert_rows(conn, &case).await;")],
            ),
        };
        ok.insert(
            0,
            Stmt::line("assert!(!case.expect_err, \"{}: expected an error\", case.name);"),
        );

        let expect_err = "assert!(case.expect_err, \"{}: {e}\", case.name);";
        let err = if self.mutates() {
            // a failed write must leave the seeded rows as they were
            Stmt::block(
                "Err(e) => {",
                vec![
                    Stmt::line(expect_err),
                    Stmt::line("assert_rows(conn, &case).await;"),
                ],
                "}",
            )
        } else {
            Stmt::line(format!("Err(e) => {},", expect_err.trim_end_matches(';')))
        };

        vec![Stmt::block(
            format!("match {call}.await {{"),
            vec![Stmt::block(format!("{binding} => {{"), ok, "}"), err],
            "}",
        )]
    }

    fn mutates(self) -> bool {
        !matches!(self, Self::InsertAndSelect | Self::SelectById)
    }
}

pub(super) fn test_file(schema: &TableSchema, opts: &EmitOptions) -> RustFile {
    TestEmitter::new(schema, opts).file()
}

struct TestEmitter<'a> {
    schema: &'a TableSchema,
    opts: &'a EmitOptions,
    model: &'a str,
    identity: &'a Column,
}

impl<'a> TestEmitter<'a> {
    fn new(schema: &'a TableSchema, opts: &'a EmitOptions) -> Self {
        Self {
            schema,
            opts,
            model: &schema.entity.name,
            identity: schema.identity(),
        }
    }

    fn file(&self) -> RustFile {
        let mut file = RustFile::new();

        let chrono = if self.needs_timestamp_from_nonce() {
            "dbcrud::chrono::{DateTime, NaiveDateTime}"
        } else {
            "dbcrud::chrono::NaiveDateTime"
        };
        let runtime = match self.opts.connection {
            ConnectionMode::Explicit => "dbcrud::{Fields, GenericClient, clock}",
            ConnectionMode::Context => "dbcrud::{DbContext, Fields, clock}",
        };
        file.push(Item::Uses(vec![
            chrono.to_string(),
            "dbcrud::testing::TestDatabase".to_string(),
            runtime.to_string(),
        ]));
        let mut local = vec!["super::db_crud as crud".to_string()];
        local.extend(model_uses(self.schema));
        file.push(Item::Uses(local));

        file.push(Item::Const(ConstDecl {
            doc: Vec::new(),
            vis: Vis::Private,
            name: "SCHEMA".into(),
            ty: "&str".into(),
            value: "include_str!(\"schema.sql\")".into(),
        }));
        file.push(self.case_struct());

        if self.needs_timestamp_from_nonce() {
            file.push(
                FnDecl::new("timestamp_from_nonce")
                    .arg(Arg::new("nonce", "i64"))
                    .returns("NaiveDateTime")
                    .body(vec![
                        Stmt::line("DateTime::from_timestamp(nonce, 0)"),
                        Stmt::line("    .map(|t| t.naive_utc())"),
                        Stmt::line("    .unwrap_or_default()"),
                    ]),
            );
        }
        file.push(self.populate_from_nonce());
        file.push(self.populate_with_id_and_timestamp());
        file.push(self.fields_from_nonce());

        file.push(
            FnDecl::new("open")
                .asyncness()
                .returns("Option<TestDatabase>")
                .body(vec![Stmt::line(
                    "TestDatabase::from_env(SCHEMA).await.expect(\"create test schema\")",
                )]),
        );
        file.push(self.insert_all());
        file.push(self.assert_rows());

        for suite in SUITES {
            file.push(self.suite(suite));
        }
        file
    }

    fn id_ty(&self) -> &'static str {
        self.identity.kind.rust_type()
    }

    fn conn_ty(&self) -> &'static str {
        match self.opts.connection {
            ConnectionMode::Explicit => "&impl GenericClient",
            ConnectionMode::Context => "&DbContext",
        }
    }

    /// Columns populated from the nonce: everything but the identity and
    /// the auto-stamped timestamps.
    fn plain_columns(&self) -> impl Iterator<Item = &'a Column> + '_ {
        self.schema
            .columns
            .iter()
            .filter(move |c| !c.primary_key && !self.opts.is_auto_timestamp(c))
    }

    fn auto_columns(&self) -> impl Iterator<Item = &'a Column> + '_ {
        self.schema
            .columns
            .iter()
            .filter(move |c| self.opts.is_auto_timestamp(c))
    }

    fn needs_timestamp_from_nonce(&self) -> bool {
        self.plain_columns()
            .any(|c| c.kind == PrimitiveKind::Timestamp)
    }

    /// Field access for sorting by identity.
    fn id_access(&self) -> String {
        match &self.identity.via {
            Via::Newtype(_) => format!("{}.0", ident(&self.identity.field)),
            _ => ident(&self.identity.field),
        }
    }

    fn case_struct(&self) -> Item {
        StructDecl {
            derives: vec!["Default".into()],
            vis: Vis::Private,
            name: "Case".into(),
            fields: vec![
                ("name".into(), "&'static str".into()),
                ("to_insert".into(), format!("Vec<{}>", self.model)),
                ("id".into(), self.id_ty().into()),
                ("updates".into(), "Fields".into()),
                ("query".into(), "Fields".into()),
                ("expected_count".into(), "u64".into()),
                ("expected".into(), format!("Vec<{}>", self.model)),
                ("expect_err".into(), "bool".into()),
            ],
        }
        .into()
    }

    fn populate_from_nonce(&self) -> Item {
        let inits = self
            .schema
            .columns
            .iter()
            .map(|c| {
                let value = if c.primary_key {
                    wrap(c, "0".into())
                } else if self.opts.is_auto_timestamp(c) {
                    wrap(c, "NaiveDateTime::default()".into())
                } else {
                    wrap(c, nonce_value(c.kind))
                };
                Stmt::line(format!("{}: {value},", ident(&c.field)))
            })
            .collect();

        FnDecl::new("populate_from_nonce")
            .arg(Arg::new("nonce", "i64"))
            .returns(self.model)
            .body(vec![Stmt::block(format!("{} {{", self.model), inits, "}")])
            .into()
    }

    fn populate_with_id_and_timestamp(&self) -> Item {
        let auto: Vec<&Column> = self.auto_columns().collect();
        let t = if auto.is_empty() { "_t" } else { "t" };

        let mut body = vec![
            Stmt::line("let mut d = populate_from_nonce(nonce);"),
            Stmt::line(format!(
                "d.{} = {};",
                ident(&self.identity.field),
                wrap(self.identity, "id".into())
            )),
        ];
        for c in auto {
            body.push(Stmt::line(format!("d.{} = t;", ident(&c.field))));
        }
        body.push(Stmt::line("d"));

        FnDecl::new("populate_with_id_and_timestamp")
            .arg(Arg::new("nonce", "i64"))
            .arg(Arg::new("id", self.id_ty()))
            .arg(Arg::new(t, "NaiveDateTime"))
            .returns(self.model)
            .body(body)
            .into()
    }

    fn fields_from_nonce(&self) -> Item {
        let calls: Vec<Stmt> = self
            .plain_columns()
            .map(|c| {
                Stmt::line(format!(
                    ".with({}, {})",
                    str_lit(&c.name),
                    nonce_value(c.kind)
                ))
            })
            .collect();
        let body = if calls.is_empty() {
            vec![Stmt::line("Fields::new()")]
        } else {
            vec![Stmt::block("Fields::new()", calls, "")]
        };

        FnDecl::new("fields_from_nonce")
            .arg(Arg::new("nonce", "i64"))
            .returns("Fields")
            .body(body)
            .into()
    }

    fn insert_all(&self) -> Item {
        FnDecl::new("insert_all")
            .asyncness()
            .arg(Arg::new("conn", self.conn_ty()))
            .arg(Arg::new("case", "&Case"))
            .body(vec![Stmt::braced(
                "for d in &case.to_insert",
                vec![Stmt::line("crud::insert(conn, d).await.expect(case.name);")],
            )])
            .into()
    }

    /// Compare the whole table against `case.expected`.
    fn assert_rows(&self) -> Item {
        FnDecl::new("assert_rows")
            .asyncness()
            .arg(Arg::new("conn", self.conn_ty()))
            .arg(Arg::new("case", "&Case"))
            .body(vec![
                Stmt::line(
                    "let mut actual = crud::select(conn, &Fields::new()).await.expect(case.name);",
                ),
                Stmt::line(format!("actual.sort_by_key(|d| d.{});", self.id_access())),
                Stmt::line("assert_eq!(case.expected, actual, \"{}\", case.name);"),
            ])
            .into()
    }

    fn suite(&self, suite: Suite) -> Item {
        let cases: Vec<Stmt> = suite.cases().iter().map(|c| self.case(c)).collect();

        let conn = match self.opts.connection {
            ConnectionMode::Explicit => vec![Stmt::line("let conn = db.client();")],
            ConnectionMode::Context => vec![
                Stmt::line("let cx = db.context();"),
                Stmt::line("let conn = &cx;"),
            ],
        };
        let mut per_case = vec![Stmt::block(
            "let Some(db) = open().await else {",
            vec![Stmt::line("return;")],
            "};",
        )];
        per_case.extend(conn);
        per_case.push(Stmt::line("insert_all(conn, &case).await;"));
        per_case.push(Stmt::Blank);
        per_case.extend(suite.check(&self.id_access()));
        per_case.push(Stmt::Blank);
        per_case.push(Stmt::line("db.close().await.expect(\"drop test schema\");"));

        FnDecl::new(suite.name())
            .attr("tokio::test")
            .asyncness()
            .body(vec![
                Stmt::line("let clock = clock::freeze_now();"),
                Stmt::line("let now = clock.time();"),
                Stmt::block("let cases = vec![", cases, "];"),
                Stmt::Blank,
                Stmt::braced("for case in cases", per_case),
            ])
            .into()
    }

    fn case(&self, tpl: &CaseTemplate) -> Stmt {
        let mut fields = vec![Stmt::line(format!("name: {},", str_lit(tpl.name)))];
        if !tpl.insert.is_empty() {
            let items = tpl
                .insert
                .iter()
                .map(|n| format!("populate_from_nonce({n})"))
                .collect();
            fields.push(vec_field("to_insert", items));
        }
        if let Some(id) = tpl.id {
            fields.push(Stmt::line(format!("id: {id},")));
        }
        if let Some(p) = self.payload(tpl.updates) {
            fields.push(Stmt::line(format!("updates: {p},")));
        }
        if let Some(p) = self.payload(tpl.query) {
            fields.push(Stmt::line(format!("query: {p},")));
        }
        if let Some(n) = tpl.expected_count {
            fields.push(Stmt::line(format!("expected_count: {n},")));
        }
        if !tpl.expected.is_empty() {
            let items = tpl
                .expected
                .iter()
                .map(|(nonce, id)| format!("populate_with_id_and_timestamp({nonce}, {id}, now)"))
                .collect();
            fields.push(vec_field("expected", items));
        }
        if tpl.expect_err {
            fields.push(Stmt::line("expect_err: true,"));
        }
        fields.push(Stmt::line("..Default::default()"));

        Stmt::block("Case {", fields, "},")
    }

    fn payload(&self, p: Payload) -> Option<String> {
        match p {
            Payload::Empty => None,
            Payload::Nonce(n) => Some(format!("fields_from_nonce({n})")),
            Payload::Unknown => Some(format!(
                "Fields::new().with({}, 1i64)",
                str_lit(&format!("field_not_in_{}", self.schema.name))
            )),
        }
    }
}

/// `name: vec![a]` inline for one item, one item per line otherwise.
fn vec_field(name: &str, items: Vec<String>) -> Stmt {
    if let [one] = items.as_slice() {
        return Stmt::line(format!("{name}: vec![{one}],"));
    }
    Stmt::block(
        format!("{name}: vec!["),
        items.into_iter().map(|i| Stmt::line(format!("{i},"))).collect(),
        "],",
    )
}

/// The value a nonce maps to, as the field's underlying primitive.
fn nonce_value(kind: PrimitiveKind) -> String {
    match kind {
        PrimitiveKind::Bool => "nonce % 2 == 0",
        PrimitiveKind::Int32 => "nonce as i32",
        PrimitiveKind::Int64 => "nonce",
        PrimitiveKind::Float32 => "nonce as f32",
        PrimitiveKind::Float64 => "nonce as f64",
        PrimitiveKind::Text => "format!(\"some_str{nonce}\")",
        PrimitiveKind::Binary => "format!(\"some_bytes{nonce}\").into_bytes()",
        PrimitiveKind::Timestamp => "timestamp_from_nonce(nonce)",
    }
    .to_string()
}

/// Wrap `expr` in the column's newtype, if it has one.
fn wrap(c: &Column, expr: String) -> String {
    match &c.via {
        Via::Newtype(p) => format!("{}({expr})", p.name),
        Via::Direct | Via::Alias(_) => expr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_source;
    use crate::decl::{DeclSet, TypePath};
    use crate::emit::printer::print_file;
    use crate::schema::SchemaCompiler;
    use crate::type_mapper::SqlTypeMapper;
    use pretty_assertions::assert_eq;

    fn schema(src: &str, name: &str) -> TableSchema {
        let mut set = DeclSet::new();
        collect_source("crate", src, &mut set).unwrap();
        let decl = set.get(&TypePath::new("crate", name)).unwrap().clone();
        SchemaCompiler::new(&set, SqlTypeMapper::default())
            .compile(&decl)
            .unwrap()
    }

    const MODEL: &str = r#"
        pub struct Level(pub i32);

        #[derive(Debug, PartialEq, Entity)]
        pub struct Event {
            pub id: i64,
            pub updated_at: NaiveDateTime,
            pub happened_at: NaiveDateTime,
            pub label: String,
            pub level: Level,
        }
    "#;

    fn render(opts: &EmitOptions) -> String {
        print_file("//", &test_file(&schema(MODEL, "Event"), opts))
    }

    #[test]
    fn nonce_helpers_skip_special_fields() {
        let text = render(&EmitOptions::default());

        assert!(text.contains("use dbcrud::chrono::{DateTime, NaiveDateTime};\n"));
        assert!(text.contains(
            "fn populate_from_nonce(nonce: i64) -> Event {
    Event {
        id: 0,
        updated_at: NaiveDateTime::default(),
        happened_at: timestamp_from_nonce(nonce),
        label: format!(\"some_str{nonce}\"),
        level: Level(nonce as i32),
    }
}
"
        ));
        assert!(text.contains(
            "fn populate_with_id_and_timestamp(nonce: i64, id: i64, t: NaiveDateTime) -> Event {
    let mut d = populate_from_nonce(nonce);
    d.id = id;
    d.updated_at = t;
    d
}
"
        ));
        assert!(text.contains(
            "fn fields_from_nonce(nonce: i64) -> Fields {
    Fields::new()
        .with(\"happened_at\", timestamp_from_nonce(nonce))
        .with(\"label\", format!(\"some_str{nonce}\"))
        .with(\"level\", nonce as i32)
}
"
        ));
    }

    #[test]
    fn emits_every_suite() {
        let text = render(&EmitOptions::default());
        for suite in SUITES {
            assert!(
                text.contains(&format!("#[tokio::test]\nasync fn {}() {{\n", suite.name())),
                "{suite:?}"
            );
        }
        assert_eq!(text.matches("        Case {\n").count(), 21);
        assert!(text.contains("const SCHEMA: &str = include_str!(\"schema.sql\");"));
        assert!(text.contains("query: Fields::new().with(\"field_not_in_event\", 1i64),"));
    }

    #[test]
    fn case_rendering() {
        let text = render(&EmitOptions::default());
        assert!(text.contains(
            "        Case {
            name: \"insert many and select with query\",
            to_insert: vec![
                populate_from_nonce(22),
                populate_from_nonce(45),
                populate_from_nonce(45),
                populate_from_nonce(1),
                populate_from_nonce(45),
            ],
            query: fields_from_nonce(45),
            expected: vec![
                populate_with_id_and_timestamp(45, 2, now),
                populate_with_id_and_timestamp(45, 3, now),
                populate_with_id_and_timestamp(45, 5, now),
            ],
            ..Default::default()
        },
"
        ));
        assert!(text.contains(
            "        match crud::select(conn, &case.query).await {
            Ok(mut actual) => {
                assert!(!case.expect_err, \"{}: expected an error\", case.name);
                actual.sort_by_key(|d| d.id);
"
        ));
    }

    #[test]
    fn context_mode_uses_test_context() {
        let opts = EmitOptions {
            connection: ConnectionMode::Context,
            ..EmitOptions::default()
        };
        let text = render(&opts);
        assert!(text.contains("use dbcrud::{DbContext, Fields, clock};\n"));
        assert!(text.contains("        let cx = db.context();\n        let conn = &cx;\n"));
        assert!(text.contains("async fn assert_rows(conn: &DbContext, case: &Case) {"));
    }

    #[test]
    fn unused_timestamp_parameter_is_underscored() {
        let s = schema(
            "#[derive(Entity)] struct Plain { id: i32, name: String }",
            "Plain",
        );
        let text = print_file("//", &test_file(&s, &EmitOptions::default()));
        assert!(text.contains(
            "fn populate_with_id_and_timestamp(nonce: i64, id: i32, _t: NaiveDateTime) -> Plain {"
        ));
        assert!(text.contains("use dbcrud::chrono::NaiveDateTime;\n"));
        assert!(!text.contains("timestamp_from_nonce"));
    }
    #[test]
    fn failed_writes_recheck_the_table() {
        let text = render(&EmitOptions::default());
        assert!(text.contains(
            "        match crud::delete_by_id(conn, case.id).await {
            Ok(()) => {
                assert!(!case.expect_err, \"{}: expected an error\", case.name);
                assert_rows(conn, &case).await;
            }
            Err(e) => {
                assert!(case.expect_err, \"{}: {e}\", case.name);
                assert_rows(conn, &case).await;
            }
        }
"
        ));
        assert!(text.contains(
            "            Err(e) => assert!(case.expect_err, \"{}: {e}\", case.name),\n"
        ));
        assert!(text.contains(
            "        Case {
            name: \"when ID not found returns error\",
            to_insert: vec![
                populate_from_nonce(101),
                populate_from_nonce(102),
            ],
            id: 0,
            expected: vec![
                populate_with_id_and_timestamp(101, 1, now),
                populate_with_id_and_timestamp(102, 2, now),
            ],
            expect_err: true,
            ..Default::default()
        },
"
        ));
    }

    #[test]
    fn rows_sort_by_the_identity_field() {
        let s = schema(
            "pub struct Key(pub i64);
             #[derive(Entity)] struct Keyed { #[dbcrud(id)] key: Key, name: String }",
            "Keyed",
        );
        let text = print_file("//", &test_file(&s, &EmitOptions::default()));
        assert_eq!(text.matches("actual.sort_by_key(|d| d.key.0);").count(), 2);
        assert!(!text.contains("d.id"));
    }
}
