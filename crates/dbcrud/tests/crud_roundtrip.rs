//! Live round trip through the statement grammar.
//!
//! Set DATABASE_URL to run against Postgres; skipped otherwise.

use dbcrud::qb::{self, Dialect, SelectColumn};
use dbcrud::tokio_postgres::{self, Client, NoTls, Row};
use dbcrud::{CrudError, CrudResult, Fields, GenericClient, Operation};
use pretty_assertions::assert_eq;

const TABLE: &str = "my_model";
const COLUMNS: &[&str] = &["id", "a_str", "an_int", "a_bool"];

#[derive(Debug, Clone, PartialEq)]
struct MyModel {
    id: i64,
    a_str: String,
    an_int: i64,
    a_bool: bool,
}

fn contains(field: &str) -> bool {
    COLUMNS.contains(&field)
}

fn from_row(row: &Row) -> CrudResult<MyModel> {
    Ok(MyModel {
        id: row.try_get(0)?,
        a_str: row.try_get(1)?,
        an_int: row.try_get(2)?,
        a_bool: row.try_get(3)?,
    })
}

async fn insert(db: &impl GenericClient, d: &MyModel) -> CrudResult<i64> {
    let sql = qb::insert_sql(Dialect::Postgres, TABLE, &COLUMNS[1..], "id");
    let row = db
        .query_one(&sql, &[&d.a_str, &d.an_int, &d.a_bool])
        .await?;
    Ok(row.try_get(0)?)
}

async fn select(db: &impl GenericClient, query: &Fields) -> CrudResult<Vec<MyModel>> {
    let base = qb::select_sql(
        TABLE,
        &[
            SelectColumn::new("id"),
            SelectColumn::new("a_str"),
            SelectColumn::new("an_int"),
            SelectColumn::boolean("a_bool"),
        ],
    );
    let stmt = qb::select(Dialect::Postgres, &base, query, contains)?;
    let rows = db.query(&stmt.sql, &stmt.params()).await?;
    rows.iter().map(from_row).collect()
}

async fn select_by_id(db: &impl GenericClient, id: i64) -> CrudResult<MyModel> {
    let mut rows = select(db, &Fields::new().with("id", id)).await?;
    match rows.len() {
        0 => Err(CrudError::NotFound {
            op: Operation::SelectById,
            id,
        }),
        1 => Ok(rows.remove(0)),
        count => Err(CrudError::Ambiguous {
            op: Operation::SelectById,
            count,
        }),
    }
}

async fn update(db: &impl GenericClient, updates: &Fields, query: &Fields) -> CrudResult<u64> {
    match qb::update(Dialect::Postgres, TABLE, updates, query, contains)? {
        Some(stmt) => db.execute(&stmt.sql, &stmt.params()).await,
        None => Ok(0),
    }
}

async fn try_connect() -> Option<Client> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    client
        .batch_execute(
            "CREATE TEMP TABLE my_model (
                id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
                a_str VARCHAR(255) NOT NULL,
                an_int BIGINT NOT NULL,
                a_bool BOOLEAN NOT NULL
            )",
        )
        .await
        .expect("create temp table");
    Some(client)
}

#[tokio::test]
async fn insert_select_update_by_id() {
    let Some(client) = try_connect().await else {
        return;
    };

    let model = MyModel {
        id: 0,
        a_str: "x".into(),
        an_int: 5,
        a_bool: true,
    };
    let id = insert(&client, &model).await.unwrap();
    assert_eq!(id, 1);

    let fetched = select_by_id(&client, 1).await.unwrap();
    assert_eq!(fetched, MyModel { id: 1, ..model.clone() });

    let n = update(
        &client,
        // plain integer literals are i32; they still bind to BIGINT columns
        &dbcrud::fields! { "an_int" => 9 },
        &dbcrud::fields! { "id" => 1 },
    )
    .await
    .unwrap();
    assert_eq!(n, 1);

    let fetched = select_by_id(&client, 1).await.unwrap();
    assert_eq!(fetched.an_int, 9);

    let err = select(&client, &Fields::new().with("not_in_schema", "x"))
        .await
        .unwrap_err();
    assert!(err.is_unknown_field());

    let err = select_by_id(&client, 2).await.unwrap_err();
    assert_eq!(err.to_string(), "SelectByID: id not found - 2");
}

#[tokio::test]
async fn works_inside_transaction() {
    let Some(mut client) = try_connect().await else {
        return;
    };

    let tx = client.transaction().await.unwrap();
    let model = MyModel {
        id: 0,
        a_str: "tx".into(),
        an_int: 1,
        a_bool: false,
    };
    insert(&tx, &model).await.unwrap();
    assert_eq!(select(&tx, &Fields::new()).await.unwrap().len(), 1);
    tx.rollback().await.unwrap();

    assert!(select(&client, &Fields::new()).await.unwrap().is_empty());
}
