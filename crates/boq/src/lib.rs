//! BOQ (Bill of Quantities) allocation domain module.
//!
//! Pure allocation math and status derivation for per-project BOQ lines.
//! Posting the matching stock movement and committing the updated line is
//! the engine's job; nothing here performs IO.

pub mod line;

pub use line::{BoqLine, BoqStatus};
