// Clippy lints that are too pedantic for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]

//! sdsbuf - Dynamic byte strings for buffers that grow
//!
//! An [`Sds`] is a byte string that knows its length and its spare capacity
//! without scanning, keeps a zero terminator after its bytes, and grows by
//! a policy that makes repeated appends cheap. It is meant for key/value
//! payloads, protocol input buffers and log accumulation.
//!
//! # Modules
//!
//! - `buffer` - the `Sds` type, its header, growth policy and adapters
//! - `config` - serde-backed settings for the growth policy
//! - `error` - error type shared by every fallible operation
//! - `ffi` - C-compatible `sds_*` exports over opaque handles
//!
//! # Example
//!
//! ```
//! use sdsbuf::Sds;
//!
//! let mut s = Sds::new(b"abc")?;
//! s.cat_len(b"de")?;
//! assert_eq!(s, "abcde");
//!
//! s.clear();
//! assert_eq!(s.len(), 0);
//! assert_eq!(s.avail() + s.len() + 1, s.alloc_size());
//! # Ok::<(), sdsbuf::Error>(())
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod ffi;

pub use buffer::{GrowthPolicy, Sds, SpareGuard};
pub use config::BufferConfig;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
