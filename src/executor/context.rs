use crate::storage::InMemoryStorage;

/// Mutable view of the database handed to each executor.
pub struct ExecutionContext<'a> {
    pub storage: &'a mut InMemoryStorage,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(storage: &'a mut InMemoryStorage) -> Self {
        Self { storage }
    }
}
