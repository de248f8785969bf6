//! Logging shims for layout and rendering diagnostics.
//!
//! With the `tracing` feature the macros below are `tracing`'s own. Without it
//! they swallow their arguments, so call sites never need `cfg` guards.
//! `warn!` is used for figure authoring problems (skipped elements, labels that
//! ended up on the fallback grid), `debug!` for solver progress.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __geofig_debug {
    ($($arg:tt)*) => { () };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __geofig_warn {
    ($($arg:tt)*) => { () };
}

#[cfg(not(feature = "tracing"))]
pub use crate::{__geofig_debug as debug, __geofig_warn as warn};
