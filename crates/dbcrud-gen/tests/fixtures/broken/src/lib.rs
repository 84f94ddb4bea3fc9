use dbcrud::Entity;

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct Valid {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct Invalid {
    pub id: i64,
    pub counter: u64,
}
