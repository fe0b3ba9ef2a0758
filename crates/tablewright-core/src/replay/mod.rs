//! DDL replay.
//!
//! Migrations are replayed statement by statement, in file order, into a
//! fresh [`Catalog`](crate::catalog::Catalog). The [`DdlApplier`] applies a
//! single statement atomically; the [`Replayer`] drives it across files,
//! either strictly or confining failures to the table they affect.

mod applier;
mod error;
mod replayer;
mod validate;

pub use applier::{DdlApplier, Outcome};
pub use error::{ApplyError, ApplyErrorKind, PrimaryKeyError};
pub use replayer::{ReplayReport, Replayer};
pub use validate::{identity_types, validate_primary_key_datatype};
