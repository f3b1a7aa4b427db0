pub mod column;
pub mod entity;
pub mod value;

pub use column::{ColumnData, ColumnMetadata, SqlType};
pub use entity::{Entity, EntityMetadata, EntityMetadataBuilder, decode_column};
pub use value::ColumnValue;
