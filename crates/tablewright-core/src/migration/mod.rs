//! Migration discovery.
//!
//! Locates versioned `.sql` migration files, orders them for replay and
//! extracts the statements of their "up" direction.

mod error;
mod source;
mod split;

pub use error::DiscoveryError;
pub use source::{discover, sequence_key, up_statements, Migration, MigrationStatement};
pub use split::split_statements;
