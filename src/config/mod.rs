//! Configuration parsing and types.
//!
//! - `types` - Root [`Config`] and its sections
//! - `duration` - Human-readable duration strings ("500ms", "2s")
//! - `parser` - Locating and loading `slink.yaml`

mod duration;
mod parser;
mod types;

pub use duration::*;
pub use parser::*;
pub use types::*;
