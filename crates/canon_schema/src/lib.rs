pub mod table;
pub mod validate;

pub use table::{schema_for, Arity, CategorySchema, ReferenceField, SCHEMAS};
pub use validate::{validate_record, validate_records};
