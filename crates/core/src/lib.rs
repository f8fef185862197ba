//! Core types and pure logic for mysqlc
//!
//! Everything here is free of I/O: command classification, schema and
//! transcript types, query outcomes and the result table renderer.

mod classifier;
mod constants;
mod env_config;
mod query;
mod render;
mod schema;
mod transcript;

pub use classifier::*;
pub use constants::*;
pub use env_config::*;
pub use query::*;
pub use render::*;
pub use schema::*;
pub use transcript::*;
