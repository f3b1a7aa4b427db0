use serde::{Deserialize, Serialize};

use crate::sql::Dialect;

/// Session-wide settings of an [`EntityManager`](crate::EntityManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrmConfig {
    /// SQL dialect used by generated DDL
    pub dialect: Dialect,
    /// Log every executed statement at `info` level under the `memorm::sql` target
    pub show_sql: bool,
    /// VARCHAR length for text columns that declare none
    pub default_varchar_length: u32,
    /// Emit `CREATE TABLE IF NOT EXISTS`
    pub ddl_if_not_exists: bool,
    /// Emit `DROP TABLE IF EXISTS`
    pub ddl_if_exists: bool,
}

impl OrmConfig {
    pub fn new() -> Self {
        Self {
            dialect: Dialect::H2,
            show_sql: false,
            default_varchar_length: 255,
            ddl_if_not_exists: false,
            ddl_if_exists: false,
        }
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn show_sql(mut self, show_sql: bool) -> Self {
        self.show_sql = show_sql;
        self
    }

    pub fn default_varchar_length(mut self, length: u32) -> Self {
        self.default_varchar_length = length;
        self
    }

    pub fn ddl_if_not_exists(mut self, enabled: bool) -> Self {
        self.ddl_if_not_exists = enabled;
        self
    }

    pub fn ddl_if_exists(mut self, enabled: bool) -> Self {
        self.ddl_if_exists = enabled;
        self
    }
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self::new()
    }
}
