//! Rounding and pay settings threaded into every duration computation.

/// Default rounding granularity in hours (a quarter hour).
pub const DEFAULT_RESOLUTION: f64 = 0.25;

/// Settings consumed by the core.
///
/// The core never reads ambient state; callers load these from wherever
/// they keep configuration and pass them in explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Rounding granularity for computed hours, in hours.
    pub resolution: f64,

    /// Optional currency-per-hour multiplier. Absent means no cost
    /// figures are computed anywhere.
    pub rate: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            rate: None,
        }
    }
}
