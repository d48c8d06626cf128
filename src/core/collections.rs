//! High-performance collection types used by the weight space skeleton.
//!
//! Aliases over `rustc_hash`, `smallvec` and `slotmap` so that the rest of the
//! crate names collections by purpose rather than by implementation.

mod aliases;
mod buffers;
mod helpers;

pub use aliases::*;
pub use buffers::*;
pub use helpers::*;
