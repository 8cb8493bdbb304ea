//! Validated request-side domain values.

mod interval;
mod symbol;

pub use interval::Interval;
pub use symbol::Symbol;
