//! Internal diagnostics that forward to `tracing` when the feature is enabled.

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: "termspin", $($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: "termspin", $($arg)*);
    }};
}

macro_rules! warning {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::warn!(target: "termspin", $($arg)*);
    }};
}

pub(crate) use {debug, trace, warning};
