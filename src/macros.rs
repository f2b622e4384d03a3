//! Feature-gated tracing for debugging the harness itself.

#[cfg(feature = "color")]
pub(crate) use anstream::{eprint, eprintln};
#[cfg(not(feature = "color"))]
pub(crate) use std::{eprint, eprintln};

/// Extra diagnostics about sandbox setup and command runs, enabled with the
/// `debug` feature.
#[cfg(feature = "debug")]
macro_rules! debug {
    ($($arg:tt)*) => ({
        $crate::macros::eprint!("[{:>w$}] \t", module_path!(), w = 24);
        $crate::macros::eprintln!($($arg)*);
    })
}

#[cfg(not(feature = "debug"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub(crate) use debug;
