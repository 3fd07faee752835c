//! Internal logging facade.
//!
//! Forwards to the [`log`](https://crates.io/crates/log) crate when the `log`
//! feature is enabled and evaluates to a no-op otherwise, so library code can
//! log unconditionally without pulling a logger into every build. The `defmt`
//! feature only adds `Format` derives to public types; hosts that log via
//! defmt do so at the application layer.

#![allow(unused_macros)]

#[cfg(feature = "log")]
macro_rules! debug { ($($arg:tt)*) => { ::log::debug!($($arg)*) }; }
#[cfg(not(feature = "log"))]
macro_rules! debug { ($($arg:tt)*) => {{ let _ = ($($arg)*,); }}; }

#[cfg(feature = "log")]
macro_rules! info { ($($arg:tt)*) => { ::log::info!($($arg)*) }; }
#[cfg(not(feature = "log"))]
macro_rules! info { ($($arg:tt)*) => {{ let _ = ($($arg)*,); }}; }

#[cfg(feature = "log")]
macro_rules! warn_macro { ($($arg:tt)*) => { ::log::warn!($($arg)*) }; }
#[cfg(not(feature = "log"))]
macro_rules! warn_macro { ($($arg:tt)*) => {{ let _ = ($($arg)*,); }}; }

#[cfg(feature = "log")]
macro_rules! error { ($($arg:tt)*) => { ::log::error!($($arg)*) }; }
#[cfg(not(feature = "log"))]
macro_rules! error { ($($arg:tt)*) => {{ let _ = ($($arg)*,); }}; }

pub(crate) use {debug, error, info, warn_macro as warn};
