pub mod adapter;
pub mod ast;
pub mod expression;

pub use adapter::SqlParserAdapter;
