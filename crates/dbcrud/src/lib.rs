//! # dbcrud
//!
//! Runtime support for the CRUD layer written by `dbcrud-gen`.
//!
//! `dbcrud-gen` reads plain Rust structs marked with `#[derive(Entity)]`,
//! compiles each into a table schema and writes a module of free async
//! functions per entity:
//!
//! - `insert`, `select`, `select_by_id`
//! - `update`, `update_by_id`
//! - `delete`, `delete_by_id`
//!
//! The generated code is thin. Statement text, field validation and error
//! values all live here so every entity behaves the same.
//!
//! ```ignore
//! use dbcrud::Entity;
//!
//! #[derive(Debug, Clone, PartialEq, Entity)]
//! pub struct MyDataModel {
//!     pub id: i64,
//!     pub some_string: String,
//!     pub some_bool: bool,
//! }
//!
//! // after `dbcrud-gen`:
//! let id = my_data_model::insert(&client, &model).await?;
//! let rows = my_data_model::select(&client, &dbcrud::fields! { "some_bool" => true }).await?;
//! ```

pub mod client;
pub mod clock;
pub mod context;
pub mod entity;
pub mod error;
pub mod qb;
pub mod value;

#[cfg(feature = "testing")]
pub mod testing;

pub use client::GenericClient;
pub use context::DbContext;
pub use entity::Entity;
pub use error::{CrudError, CrudResult, FieldRole, Operation};
pub use value::{Fields, Value};

#[cfg(feature = "derive")]
pub use dbcrud_derive::Entity;

// Generated code names these through `dbcrud::` so user crates need no
// direct dependency on them.
pub use chrono;
pub use tokio_postgres;
