//! Sds - Dynamic byte string with explicit length and spare capacity
//!
//! An [`Sds`] keeps a small header (valid length, spare bytes) next to a
//! single owned byte region. Length queries are O(1), appends are amortized
//! O(1) thanks to the [`GrowthPolicy`], and a zero byte always follows the
//! valid bytes.
//!
//! Every mutation is built from three primitives:
//!
//! - [`Sds::make_room_for`] grows storage so a number of spare bytes exist
//! - [`Sds::incr_len`] commits (or un-commits) spare bytes as valid
//! - [`Sds::remove_free_space`] gives spare bytes back to the allocator

pub mod core;
pub mod growth;
pub mod header;
pub mod io;
pub mod spare;

pub use self::core::Sds;
pub use growth::{GrowthPolicy, MAX_PREALLOC};
pub use header::{Header, HeaderWord, MAX_SIZE};
pub use spare::SpareGuard;
