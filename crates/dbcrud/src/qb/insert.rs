use crate::qb::dialect::Dialect;

/// Render the insert statement for `columns` (identity excluded).
///
/// Placeholders follow `columns` order. The Postgres form returns the
/// generated identity; the MySQL form relies on `LAST_INSERT_ID()`.
pub fn insert_sql(dialect: Dialect, table: &str, columns: &[&str], identity: &str) -> String {
    let mut ph = dialect.placeholders();
    match dialect {
        Dialect::MySql if columns.is_empty() => format!("insert into {table} () values ()"),
        Dialect::MySql => {
            let sets: Vec<String> = columns
                .iter()
                .map(|c| format!("{c}={}", ph.next()))
                .collect();
            format!("insert into {table} set {}", sets.join(", "))
        }
        Dialect::Postgres if columns.is_empty() => {
            format!("insert into {table} default values returning {identity}")
        }
        Dialect::Postgres => {
            let values: Vec<String> = columns.iter().map(|_| ph.next()).collect();
            format!(
                "insert into {table} ({}) values ({}) returning {identity}",
                columns.join(", "),
                values.join(", ")
            )
        }
    }
}
