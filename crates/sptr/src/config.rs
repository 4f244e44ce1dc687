//! Build-variant constants and fatal-path policy.
//!
//! The checked/unchecked split is decided at build time by the `unchecked`
//! cargo feature. What happens once a checked build detects misuse is
//! decided at run time by the process-wide [`FatalPolicy`].

use std::sync::atomic::{AtomicU8, Ordering};

/// `true` when bounds and lifetime checks are compiled in.
pub const CHECKED: bool = cfg!(not(feature = "unchecked"));

/// Process exit status used by [`FatalPolicy::Exit`].
pub const EXIT_STATUS: i32 = 1;

/// What the fatal path does after a misuse is detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FatalPolicy {
    /// Print the diagnostic to stderr and exit with [`EXIT_STATUS`].
    #[default]
    Exit,
    /// Print the diagnostic to stderr and abort the process.
    Abort,
    /// Panic with the [`SptrError`](crate::SptrError) as payload.
    ///
    /// Nothing is printed by this crate; the panic hook decides.
    Panic,
}

impl FatalPolicy {
    const fn to_raw(self) -> u8 {
        match self {
            Self::Exit => 0,
            Self::Abort => 1,
            Self::Panic => 2,
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Abort,
            2 => Self::Panic,
            _ => Self::Exit,
        }
    }
}

static POLICY: AtomicU8 = AtomicU8::new(FatalPolicy::Exit.to_raw());

/// Set the process-wide fatal policy.
pub fn set_fatal_policy(policy: FatalPolicy) {
    POLICY.store(policy.to_raw(), Ordering::Relaxed);
}

/// The current process-wide fatal policy.
pub fn fatal_policy() -> FatalPolicy {
    FatalPolicy::from_raw(POLICY.load(Ordering::Relaxed))
}
