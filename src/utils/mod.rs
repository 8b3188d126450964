// Small generic helpers shared by the watchers

pub mod retry;
pub mod text;

pub use retry::with_retry;
pub use text::{fill, truncate_chars};
