//! # dbcrud-gen
//!
//! Model compiler for `dbcrud`. Scans a Rust source tree for entity structs,
//! compiles each into a table schema and writes, per entity, the
//! `CREATE TABLE` statement, a module of async CRUD functions and a
//! table-driven round-trip test module.
//!
//! The pipeline is collect, resolve, map, compile, emit, write. Every
//! entity must compile before any file is written.

pub mod cli;
pub mod collect;
pub mod config;
pub mod decl;
pub mod emit;
pub mod error;
pub mod generate;
pub mod resolve;
pub mod schema;
pub mod type_mapper;
pub mod write;

pub use error::{GenError, GenResult};
pub use generate::generate;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    match cli::parse_args(&args)? {
        cli::Command::Help => {
            cli::print_help();
            Ok(())
        }
        cli::Command::Generate(args) => generate::run(args),
    }
}
