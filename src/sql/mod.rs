//! Statement builders. Every builder returns a complete statement with
//! literals inlined, columns in metadata order.

pub mod ddl;
pub mod dml;
pub mod literal;

pub use ddl::{CreateQueryBuilder, Dialect, DropQueryBuilder};
pub use dml::{
    DeleteQueryBuilder, InsertQueryBuilder, SelectAllQueryBuilder, SelectByIdQueryBuilder,
    UpdateQueryBuilder,
};
pub use literal::to_sql_literal;
