use dbcrud::Entity;

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct SpecifyTypes {
    #[dbcrud(id)]
    pub row_key: i32,
    #[dbcrud(type = "char(255)")]
    pub a_str: String,
    #[dbcrud(type = "varchar(128)")]
    pub b_str: String,
}
