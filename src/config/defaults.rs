use crate::history::DEFAULT_MAX_DEPTH;
use crate::duration::DEFAULT_BATCH_SIZE;

pub(super) const MAX_BATCH_SIZE: usize = 32;

pub(super) fn default_history_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

pub(super) fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

pub(super) fn default_copy_attempts() -> u32 {
    3
}

pub(super) fn default_backoff_base_ms() -> u64 {
    100
}

pub(super) fn default_volume() -> f32 {
    1.0
}

pub(super) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        default_volume()
    }
}

pub(super) fn clamp_pause(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}
