//! Bounds- and lifetime-checked owning buffers.
//!
//! An [`Sptr<T>`] is a fat handle: a heap allocation, its element count,
//! and a validity state. Every element access checks the index and the
//! state before touching memory, and release refuses to run twice. Any
//! violation prints one line to stderr and terminates the process:
//!
//! ```text
//! src/main.rs:12 error: index out of the range
//! ```
//!
//! # Operations
//!
//! | operation | checked build fails with |
//! |-----------|--------------------------|
//! | [`Sptr::new`] / [`Sptr::from_fn`] / [`Sptr::filled`] | `memory allocation failed` |
//! | [`Sptr::at`] | `index out of the range`, then `use after free` |
//! | [`Sptr::release`] | `double free` |
//! | [`Sptr::at2`] | [`Sptr::at`] applied at both levels |
//!
//! Each has a `try_*` twin returning [`SptrError`]; [`catch_fatal`]
//! intercepts the default operations for tests.
//!
//! # Variants
//!
//! The `unchecked` cargo feature compiles out the validity state and every
//! check, leaving a pointer and a length. Misuse is then undefined
//! behaviour. [`CHECKED`] reports which variant was built. [`OwnedSptr`]
//! is the compile-time alternative: release consumes it.
//!
//! # Caller obligations
//!
//! - Release every buffer exactly once. Unreleased buffers leak.
//! - Release every row of a matrix; releasing the outer buffer does not.
//! - Handles are neither `Send` nor `Sync`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod fatal;
pub mod index;
pub mod matrix;
pub mod owned;
mod raw;

// Public re-exports for the primary API surface.
pub use buffer::{BufferState, Sptr};
pub use config::{fatal_policy, set_fatal_policy, FatalPolicy, CHECKED, EXIT_STATUS};
pub use error::{ErrorKind, Site, SptrError};
pub use fatal::catch_fatal;
pub use index::ElementIndex;
pub use owned::OwnedSptr;
