/// Entity primary keys as issued by the commerce database.
pub type DbId = i64;

/// Store (tenant) identifiers share the entity key space.
pub type StoreId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
