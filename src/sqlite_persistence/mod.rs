mod versioned_schema;

pub use versioned_schema::{
    open_database, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
