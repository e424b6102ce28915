use rand::Rng;

use super::session::minutes_to_secs;

/// Draws a short-break interval: whole seconds, uniform over
/// `[min_minutes * 60, max_minutes * 60]` inclusive.
///
/// Inverted bounds are swapped rather than rejected.
pub fn random_interval_secs<R: Rng + ?Sized>(rng: &mut R, min_minutes: u32, max_minutes: u32) -> u64 {
    let (lo, hi) = if min_minutes <= max_minutes {
        (min_minutes, max_minutes)
    } else {
        (max_minutes, min_minutes)
    };
    rng.gen_range(minutes_to_secs(lo)..=minutes_to_secs(hi))
}

/// `MM:SS`; minutes are not wrapped into hours.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
