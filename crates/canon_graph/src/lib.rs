pub mod content_set;
pub mod integrity;
pub mod load;

pub use content_set::ContentSet;
pub use integrity::check_integrity;
pub use load::{load_content_set, LoadError, LoadOptions, LoadedSet};
