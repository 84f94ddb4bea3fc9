//! Entity metadata.

/// Column used as the identity when no field is marked `#[dbcrud(id)]`.
///
/// `#[derive(Entity)]` and `dbcrud-gen` apply the same rule.
pub const DEFAULT_IDENTITY: &str = "id";

/// Static table metadata for a struct marked with `#[derive(Entity)]`.
///
/// The derive doubles as the marker `dbcrud-gen` looks for when deciding
/// which structs get a table and CRUD functions.
pub trait Entity {
    /// Table name (snake_case of the struct name).
    const TABLE: &'static str;

    /// Column names in field declaration order.
    const COLUMNS: &'static [&'static str];

    /// Name of the auto-increment primary key column.
    const IDENTITY: &'static str;

    /// Whether `field` names a column of this entity.
    fn contains_field(field: &str) -> bool {
        Self::COLUMNS.contains(&field)
    }
}
