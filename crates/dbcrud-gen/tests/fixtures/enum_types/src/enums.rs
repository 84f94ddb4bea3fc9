pub type BytesEnum = Vec<u8>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int32Enum(pub i32);

impl Int32Enum {
    pub const FIRST: Self = Self(1);
    pub const SECOND: Self = Self(2);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int64Enum(pub i64);

pub type StringEnum = String;
