//! Internal macros.

/// Emit a `tracing` event when the `tracing` feature is enabled.
///
/// Expands to nothing otherwise, so call sites need no `cfg` of their own.
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        {
            ::tracing::$level!($($arg)+);
        }
    }};
}

pub(crate) use trace_event;
