//! Table-level cleaning stages.
//!
//! Each stage consumes a [`Table`](crate::frame::Table) and returns the
//! transformed table. The dataset cleaners in [`crate::cleaners`] chain them in
//! a fixed order: whitespace, missing values, type coercion, deduplication.

pub mod coerce;
pub mod dedup;
pub mod missing;
pub mod whitespace;

pub use coerce::coerce_types;
pub use dedup::drop_duplicates;
pub use missing::{MissingStrategy, resolve_missing};
pub use whitespace::strip_whitespace;
