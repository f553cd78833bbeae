//! Shared foundational types used across the Kairos timing toolchain.
//!
//! This crate provides interned identifiers for instance and wire names,
//! dense ID-indexed arenas, `{max, min}` timing pairs, and the common
//! internal-error result type.

#![warn(missing_docs)]

pub mod arena;
pub mod ident;
pub mod minmax;
pub mod result;

pub use arena::{Arena, ArenaId};
pub use ident::{Ident, Interner};
pub use minmax::MinMax;
pub use result::{InternalError, KairosResult};
