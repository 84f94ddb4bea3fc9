use dbcrud::Entity;
use dbcrud::chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct MyDataModel {
    pub id: i64,
    pub inserted_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub some_string: String,
    pub some_int: i32,
    pub some_bool: bool,
}
