// Domain models: the four sample kinds, alerts, and write batches.

mod alert;
mod health;
mod sample;
mod usage;

pub use alert::{Alert, AlertDraft, AlertType, Severity};
pub use health::{FilesystemHealthSample, FsStatus, SystemHealthSample};
pub use sample::{Sample, SampleBatch, SampleKind};
pub use usage::{DiskUsageSample, InodeUsageSample};

/// Round to `places` decimals (half away from zero).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / total * 100`, rounded to 2 decimals and clamped to [0, 100]. Zero total yields 0.
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() || !part.is_finite() {
        return 0.0;
    }
    clamp_percent(round_to(part / total * 100.0, 2))
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
