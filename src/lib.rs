// ============================================================================
// memorm: a small ORM with a unit-of-work persistence context
// ============================================================================

// Lets `#[derive(Entity)]` output (`::memorm::...`) resolve inside this crate.
extern crate self as memorm;

pub mod config;
pub mod core;
pub mod facade;
pub mod metadata;
pub mod persistence;
pub mod result;
pub mod sql;
pub mod storage;
pub mod template;
mod executor;
mod parser;

pub use config::OrmConfig;
pub use core::{OrmError, Result, Value};
pub use facade::InMemoryDB;
pub use metadata::{ColumnMetadata, ColumnValue, Entity, EntityMetadata, SqlType};
pub use persistence::{EntityManager, EntityStatus, MergeOutcome, PersistenceContext};
pub use result::QueryResult;
pub use sql::Dialect;
pub use template::{ResultRow, SqlExecutor, SqlTemplate};

/// `#[derive(Entity)]`, see [`memorm_derive`].
pub use memorm_derive::Entity;
