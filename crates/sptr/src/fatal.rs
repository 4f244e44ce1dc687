//! The fatal path and its test-time interception.
//!
//! Misuse is never returned to the caller of a default operation. It is
//! routed through `fail`, which either terminates the process according
//! to the [`FatalPolicy`] or, inside [`catch_fatal`], unwinds back to the
//! harness with the error as payload.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::process;

use crate::config::{fatal_policy, FatalPolicy, EXIT_STATUS};
use crate::error::SptrError;

thread_local! {
    /// Nesting depth of `catch_fatal` on this thread.
    static INTERCEPT: Cell<u32> = const { Cell::new(0) };
}

/// Report `err` and stop.
#[cold]
#[inline(never)]
pub(crate) fn fail(err: SptrError) -> ! {
    // resume_unwind skips the panic hook, so intercepted errors stay silent.
    if INTERCEPT.with(|depth| depth.get() > 0) {
        panic::resume_unwind(Box::new(err));
    }
    match fatal_policy() {
        FatalPolicy::Exit => {
            eprintln!("{err}");
            process::exit(EXIT_STATUS)
        }
        FatalPolicy::Abort => {
            eprintln!("{err}");
            process::abort()
        }
        FatalPolicy::Panic => panic::panic_any(err),
    }
}

/// Unwrap a checked result, sending any error down the fatal path.
#[inline]
pub(crate) fn or_fail<T>(result: Result<T, SptrError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => fail(err),
    }
}

struct InterceptGuard;

impl InterceptGuard {
    fn enter() -> Self {
        INTERCEPT.with(|depth| depth.set(depth.get() + 1));
        InterceptGuard
    }
}

impl Drop for InterceptGuard {
    fn drop(&mut self) {
        INTERCEPT.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Run `f`, turning a fatal condition raised on this thread into `Err`.
///
/// Nothing is written to stderr and the process keeps running. Panics that
/// are not buffer misuse propagate unchanged. Only works when the crate is
/// built with `panic = "unwind"`.
///
/// ```
/// use sptr::{catch_fatal, ErrorKind, Sptr};
/// # if !sptr::CHECKED { return; }
///
/// let mut buf = Sptr::<u8>::new(2);
/// let err = catch_fatal(|| *buf.at(2)).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::OutOfRange);
/// # buf.release();
/// ```
pub fn catch_fatal<R>(f: impl FnOnce() -> R) -> Result<R, SptrError> {
    let _guard = InterceptGuard::enter();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<SptrError>() {
            Ok(err) => Err(*err),
            Err(other) => panic::resume_unwind(other),
        },
    }
}
