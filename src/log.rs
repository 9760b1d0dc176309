//! Logging macros.
//!
//! Forward to `defmt` when the `defmt` feature is enabled and compile to
//! nothing otherwise. Arguments are still evaluated by reference so that
//! call sites do not trigger unused-variable warnings.

/// Log a debug message.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($fmt $(, $arg)*);

        #[cfg(not(feature = "defmt"))]
        {
            let _ = ($(&$arg,)*);
        }
    }};
}

/// Log an info message.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($fmt $(, $arg)*);

        #[cfg(not(feature = "defmt"))]
        {
            let _ = ($(&$arg,)*);
        }
    }};
}

/// Log a warning message.
#[macro_export]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($fmt $(, $arg)*);

        #[cfg(not(feature = "defmt"))]
        {
            let _ = ($(&$arg,)*);
        }
    }};
}
