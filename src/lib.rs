pub mod nav;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100th call site iteration when the `perf_stats`
/// feature is enabled.
///
/// `$counter` is any unsigned integer expression the caller increments.
/// Without the feature the macro expands to nothing and its arguments are
/// never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(queries, "[COST TABLE] {} path queries done", queries);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {
        if $counter % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {};
}
