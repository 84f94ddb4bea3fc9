use dbcrud::Entity;
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct MyDataModel {
    pub id: i64,
    pub created_at: dbcrud::chrono::NaiveDateTime,
    pub some_string: String,
    pub some_bool: bool,
}

#[derive(Debug, Entity)]
struct SpecifyTypes {
    #[dbcrud(id)]
    pub row_key: i32,
    #[dbcrud(type = "char(255)")]
    pub a_str: String,
    #[dbcrud(type = "varchar(128)")]
    pub b_str: String,
}

#[derive(Debug, Entity)]
struct Account {
    pub key: i64,
    pub id: i64,
    pub name: String,
}

#[test]
fn derives_table_and_columns() {
    assert_eq!(MyDataModel::TABLE, "my_data_model");
    assert_eq!(
        MyDataModel::COLUMNS,
        &["id", "created_at", "some_string", "some_bool"]
    );
    assert_eq!(MyDataModel::IDENTITY, "id");
}

#[test]
fn explicit_identity_attribute() {
    assert_eq!(SpecifyTypes::TABLE, "specify_types");
    assert_eq!(SpecifyTypes::IDENTITY, "row_key");
    assert!(SpecifyTypes::contains_field("b_str"));
    assert!(!SpecifyTypes::contains_field("c_str"));
}

#[test]
fn conventional_identity_is_id() {
    assert_eq!(Account::IDENTITY, dbcrud::entity::DEFAULT_IDENTITY);
    assert_eq!(MyDataModel::IDENTITY, dbcrud::entity::DEFAULT_IDENTITY);
}
