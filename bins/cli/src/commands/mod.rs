//! Local CLI command handlers.

pub mod check_ignore;
pub mod create;
pub mod extract;

pub use check_ignore::run_check_ignore;
pub use create::run_create;
pub use extract::run_extract;
