//! Hand-written `Entity` implementation used by unit tests.

use std::sync::OnceLock;

use crate::core::{Result, Value};
use crate::metadata::{ColumnMetadata, ColumnValue, Entity, EntityMetadata, SqlType};
use crate::template::ResultRow;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub code: Option<String>,
    pub owner: String,
    pub balance: i64,
}

impl Account {
    pub fn new(code: Option<&str>, owner: &str, balance: i64) -> Self {
        Self {
            code: code.map(str::to_string),
            owner: owner.to_string(),
            balance,
        }
    }
}

impl Entity for Account {
    fn metadata() -> &'static EntityMetadata {
        static METADATA: OnceLock<EntityMetadata> = OnceLock::new();
        METADATA.get_or_init(|| {
            EntityMetadata::builder("accounts")
                .column(ColumnMetadata::new("code", SqlType::Varchar).primary_key().length(16))
                .column(ColumnMetadata::new("owner", SqlType::Varchar).not_null())
                .column(ColumnMetadata::new("balance", SqlType::BigInt))
                .build()
                .expect("account metadata")
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.code.to_value(), self.owner.to_value(), self.balance.to_value()]
    }

    fn from_row(row: &ResultRow<'_>) -> Result<Self> {
        Ok(Self {
            code: row.decode("code")?,
            owner: row.decode("owner")?,
            balance: row.decode("balance")?,
        })
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.code = Option::<String>::from_value(&id)?;
        Ok(())
    }
}
