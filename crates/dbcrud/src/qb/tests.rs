//! Integration tests for the qb module.

use crate::error::{CrudError, FieldRole, Operation};
use crate::qb::{Dialect, SelectColumn, delete, insert_sql, select, select_sql, update, validate};
use crate::value::{Fields, Value};
use pretty_assertions::assert_eq;

const COLUMNS: &[&str] = &["id", "a_str", "an_int", "a_bool"];

fn contains(field: &str) -> bool {
    COLUMNS.contains(&field)
}

fn base_select() -> String {
    select_sql(
        "my_model",
        &[
            SelectColumn::new("id"),
            SelectColumn::new("a_str"),
            SelectColumn::new("an_int"),
            SelectColumn::boolean("a_bool"),
        ],
    )
}

#[test]
fn test_insert_mysql() {
    let sql = insert_sql(Dialect::MySql, "my_model", &["a_str", "an_int", "a_bool"], "id");
    assert_eq!(sql, "insert into my_model set a_str=?, an_int=?, a_bool=?");
}

#[test]
fn test_insert_postgres_returns_identity() {
    let sql = insert_sql(Dialect::Postgres, "my_model", &["a_str", "an_int"], "id");
    assert_eq!(
        sql,
        "insert into my_model (a_str, an_int) values ($1, $2) returning id"
    );
}

#[test]
fn test_insert_identity_only() {
    assert_eq!(
        insert_sql(Dialect::MySql, "t", &[], "id"),
        "insert into t () values ()"
    );
    assert_eq!(
        insert_sql(Dialect::Postgres, "t", &[], "id"),
        "insert into t default values returning id"
    );
}

#[test]
fn test_select_list_projects_bools() {
    assert_eq!(
        base_select(),
        "select id, a_str, an_int, (a_bool = '1') from my_model"
    );
}

#[test]
fn test_select_list_trims_fixed_width_text() {
    let sql = select_sql(
        "specify_types",
        &[
            SelectColumn::new("row_key"),
            SelectColumn::trimmed("a_str"),
            SelectColumn::new("b_str"),
        ],
    );
    assert_eq!(sql, "select row_key, rtrim(a_str), b_str from specify_types");
}

#[test]
fn test_select_without_filter() {
    let query = Fields::new();
    let base = base_select();
    let stmt = select(Dialect::MySql, &base, &query, contains).unwrap();
    assert_eq!(stmt.sql, base);
    assert!(stmt.values().is_empty());
}

#[test]
fn test_select_with_filter() {
    let query = Fields::new().with("an_int", 5i64).with("a_bool", true);
    let base = base_select();

    let stmt = select(Dialect::MySql, &base, &query, contains).unwrap();
    assert_eq!(
        stmt.sql,
        "select id, a_str, an_int, (a_bool = '1') from my_model where an_int=? and a_bool=?"
    );
    assert_eq!(stmt.values(), &[&Value::Int64(5), &Value::Bool(true)]);

    let stmt = select(Dialect::Postgres, &base, &query, contains).unwrap();
    assert!(stmt.sql.ends_with("where an_int=$1 and a_bool=$2"));
    assert_eq!(stmt.params().len(), 2);
}

#[test]
fn test_select_with_limit() {
    let query = Fields::new().with("an_int", 5i64);
    let base = base_select();

    let stmt = select(Dialect::Postgres, &base, &query, contains)
        .unwrap()
        .with_limit(1001);
    assert!(stmt.sql.ends_with("where an_int=$1 limit 1001"));
    assert_eq!(stmt.values().len(), 1);
}

#[test]
fn test_select_rejects_unknown_key() {
    let query = Fields::new()
        .with("a_str", "x")
        .with("not_in_schema", "x");
    let base = base_select();

    let err = select(Dialect::MySql, &base, &query, contains).unwrap_err();
    assert_eq!(err.to_string(), "Select: no such field to query - not_in_schema");
}

#[test]
fn test_update_sql() {
    let updates = Fields::new().with("an_int", 9i64);
    let query = Fields::new().with("id", 1i64);

    let stmt = update(Dialect::MySql, "my_model", &updates, &query, contains)
        .unwrap()
        .unwrap();
    assert_eq!(stmt.sql, "update my_model set an_int=? where id=?");
    assert_eq!(stmt.values(), &[&Value::Int64(9), &Value::Int64(1)]);

    let stmt = update(Dialect::Postgres, "my_model", &updates, &query, contains)
        .unwrap()
        .unwrap();
    assert_eq!(stmt.sql, "update my_model set an_int=$1 where id=$2");
}

#[test]
fn test_update_without_filter_touches_all_rows() {
    let updates = Fields::new().with("a_bool", false).with("a_str", "y");
    let query = Fields::new();
    let stmt = update(Dialect::MySql, "my_model", &updates, &query, contains)
        .unwrap()
        .unwrap();
    assert_eq!(stmt.sql, "update my_model set a_bool=?, a_str=?");
}

#[test]
fn test_update_empty_is_noop() {
    let query = Fields::new().with("id", 1i64);
    let updates = Fields::new();
    let stmt = update(Dialect::MySql, "my_model", &updates, &query, contains).unwrap();
    assert!(stmt.is_none());
}

#[test]
fn test_update_distinguishes_roles() {
    let good = Fields::new().with("an_int", 1i64);
    let bad = Fields::new().with("nope", 1i64);

    let err = update(Dialect::MySql, "my_model", &bad, &good, contains).unwrap_err();
    assert_eq!(err.to_string(), "Update: no such field to update - nope");

    let err = update(Dialect::MySql, "my_model", &good, &bad, contains).unwrap_err();
    assert_eq!(err.to_string(), "Update: no such field to query - nope");
}

#[test]
fn test_delete_sql() {
    let query = Fields::new().with("a_str", "x");
    let stmt = delete(Dialect::MySql, "my_model", &query, contains).unwrap();
    assert_eq!(stmt.sql, "delete from my_model where a_str=?");

    let all = Fields::new();
    let stmt = delete(Dialect::Postgres, "my_model", &all, contains).unwrap();
    assert_eq!(stmt.sql, "delete from my_model");
}

#[test]
fn test_delete_rejects_unknown_key() {
    let query = Fields::new().with("missing", 1i32);
    let err = delete(Dialect::MySql, "my_model", &query, contains).unwrap_err();
    assert!(matches!(
        err,
        CrudError::UnknownField {
            op: Operation::Delete,
            role: FieldRole::Query,
            ..
        }
    ));
}

#[test]
fn test_validate_reports_first_unknown() {
    let fields = Fields::new().with("id", 1i64).with("b", 1i64).with("c", 1i64);
    let err = validate(Operation::Select, FieldRole::Query, &fields, &contains).unwrap_err();
    assert_eq!(err.to_string(), "Select: no such field to query - b");
}

#[test]
fn test_dialect_from_str() {
    assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
    assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert!("oracle".parse::<Dialect>().is_err());
}
