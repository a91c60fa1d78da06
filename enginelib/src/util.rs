// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Conversions between domain values and stored column values.

use std::time::{Duration, SystemTime};

use enginelib_db::{system_time_to_unix, unix_to_system_time};

use crate::snapshot::Sampling;

const SECS_PER_DAY: i64 = 86_400;

/// Final path component, split on either separator.
pub(crate) fn filename(relative_path: &str) -> &str {
    relative_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(relative_path)
}

/// Text after the last `.` of a filename.
pub(crate) fn file_extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

/// Whole seconds as `MM:SS`.
pub(crate) fn format_mm_ss(secs: i64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// A zero sample rate means the sampling is unknown.
pub(crate) fn known_sampling(sampling: Option<Sampling>) -> Option<Sampling> {
    sampling.filter(|s| s.sample_rate != 0.0)
}

/// Track length in whole seconds, derived from the sampling.
pub(crate) fn calculated_length(sampling: Option<Sampling>) -> Option<i64> {
    known_sampling(sampling).map(|s| (s.sample_count as f64 / s.sample_rate) as i64)
}

/// Tempo measured between the first two markers of a beat grid.
pub(crate) fn grid_bpm(
    sampling: Option<Sampling>,
    grid: &[enginelib_perfdata::BeatGridMarker],
) -> Option<f64> {
    let sampling = known_sampling(sampling)?;
    let [first, second, ..] = grid else {
        return None;
    };
    if first.sample_offset == second.sample_offset {
        return None;
    }
    Some(
        sampling.sample_rate * 60.0 * (second.beat_index - first.beat_index) as f64
            / (second.sample_offset - first.sample_offset),
    )
}

/// Hardware players store last-accessed times as the midnight ending that day.
///
/// Saturates at the last representable midnight.
pub(crate) fn ceil_to_end_of_day(timestamp: i64) -> i64 {
    let t = timestamp.saturating_add(SECS_PER_DAY - 1);
    t - t.rem_euclid(SECS_PER_DAY)
}

pub(crate) fn to_timestamp(time: Option<SystemTime>) -> Option<i64> {
    time.map(system_time_to_unix)
}

pub(crate) fn to_time(timestamp: Option<i64>) -> Option<SystemTime> {
    timestamp.map(unix_to_system_time)
}

/// Duration of `sample_count` samples, truncated to milliseconds.
pub(crate) fn sampled_duration(sampling: Sampling) -> Duration {
    let ms = 1000.0 * sampling.sample_count as f64 / sampling.sample_rate;
    Duration::from_millis(ms.max(0.0) as u64)
}
