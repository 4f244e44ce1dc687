//! Error types for checked buffer operations.
//!
//! Every detected misuse is represented as an [`SptrError`] carrying the
//! call site that triggered it. By default these errors never reach the
//! caller: the fatal path prints them and terminates the process. The
//! `try_*` operations and [`catch_fatal`](crate::fatal::catch_fatal) hand
//! them back as values instead.

use std::error::Error;
use std::fmt;
use std::panic::Location;

/// Source location of the operation that raised an error.
pub type Site = &'static Location<'static>;

/// The four error classes a checked buffer can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The allocation request could not be satisfied.
    AllocationFailed,
    /// The index was negative or not below the capacity.
    OutOfRange,
    /// Access to a released (or untracked) buffer.
    UseAfterFree,
    /// Release of a released (or untracked) buffer.
    DoubleFree,
}

impl ErrorKind {
    /// Fixed human-readable message for this kind.
    pub fn message(self) -> &'static str {
        match self {
            Self::AllocationFailed => "memory allocation failed",
            Self::OutOfRange => "index out of the range",
            Self::UseAfterFree => "use after free",
            Self::DoubleFree => "double free",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A detected buffer misuse, tagged with the offending call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SptrError {
    /// Backing storage could not be allocated.
    AllocationFailed {
        /// Requested size in bytes, or `None` if the size overflowed `usize`.
        bytes: Option<usize>,
        /// Where the buffer was constructed.
        site: Site,
    },
    /// Index outside `0..capacity`.
    OutOfRange {
        /// The index as passed by the caller.
        index: i128,
        /// Capacity of the buffer.
        capacity: usize,
        /// Where the access was made.
        site: Site,
    },
    /// The buffer was already released, or never tracked.
    UseAfterFree {
        /// Where the access was made.
        site: Site,
    },
    /// The buffer was already released, or never tracked.
    DoubleFree {
        /// Where the second release was requested.
        site: Site,
    },
}

impl SptrError {
    /// The error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AllocationFailed { .. } => ErrorKind::AllocationFailed,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::UseAfterFree { .. } => ErrorKind::UseAfterFree,
            Self::DoubleFree { .. } => ErrorKind::DoubleFree,
        }
    }

    /// The call site that raised this error.
    pub fn site(&self) -> Site {
        match self {
            Self::AllocationFailed { site, .. }
            | Self::OutOfRange { site, .. }
            | Self::UseAfterFree { site }
            | Self::DoubleFree { site } => site,
        }
    }
}

/// Renders the one-line diagnostic: `file:line error: message`.
impl fmt::Display for SptrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let site = self.site();
        write!(f, "{}:{} error: {}", site.file(), site.line(), self.kind())
    }
}

impl Error for SptrError {}
