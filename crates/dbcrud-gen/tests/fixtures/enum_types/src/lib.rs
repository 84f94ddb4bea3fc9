mod enums;

use dbcrud::Entity;
use enums::{BytesEnum, Int32Enum, Int64Enum, StringEnum};

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct EnumModel {
    pub id: i64,
    pub some_bytes: BytesEnum,
    pub some_i32: Int32Enum,
    pub some_i64: Int64Enum,
    pub some_string: StringEnum,
}
