pub mod commands;

pub use commands::paths::{run_paths, PathsArgs};
pub use commands::relock::{run_relock, RelockArgs};
pub use commands::validate::{run_validate, ValidateArgs};
