pub mod frontmatter;
pub mod loader;

pub use frontmatter::{split_document, ParseError};
pub use loader::{load_all, load_category, LoadedContent};
