pub mod model {
    use dbcrud::Entity;

    #[derive(Debug, Clone, PartialEq, Entity)]
    pub struct WithoutTimestamps {
        pub id: i64,
        pub a_str: String,
        pub some_bytes: Vec<u8>,
        pub an_i64: i64,
        pub an_i32: i32,
        pub an_f32: f32,
        pub an_f64: f64,
    }
}
