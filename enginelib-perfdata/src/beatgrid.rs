// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use crate::beat_data::BeatGridMarker;
use crate::error::InvalidBeatgrid;

/// Beat index players expect the first marker of a grid to carry.
pub const FIRST_BEAT_INDEX: i64 = -4;

const WAVEFORM_SAMPLES_PER_SECOND: f64 = 105.0;

fn samples_per_beat(a: &BeatGridMarker, b: &BeatGridMarker) -> Result<f64, InvalidBeatgrid> {
    let beats = b.beat_index - a.beat_index;
    let samples = b.sample_offset - a.sample_offset;
    if beats <= 0 || samples <= 0.0 {
        return Err(InvalidBeatgrid(format!(
            "markers at beat {} and {} are not ascending",
            a.beat_index, b.beat_index
        )));
    }
    Ok(samples / beats as f64)
}

/// Rewrite a beat grid into the shape hardware players write.
///
/// The first marker is moved to beat [`FIRST_BEAT_INDEX`] and the last marker
/// to the first beat at or past `sample_count`, both extrapolated with the
/// tempo of their neighbouring marker. Interior markers that fall outside the
/// new bounds are dropped.
pub fn normalize_beatgrid(
    mut markers: Vec<BeatGridMarker>,
    sample_count: i64,
) -> Result<Vec<BeatGridMarker>, InvalidBeatgrid> {
    if markers.len() < 2 {
        return Err(InvalidBeatgrid(format!(
            "need at least two markers, got {}",
            markers.len()
        )));
    }
    for pair in markers.windows(2) {
        samples_per_beat(&pair[0], &pair[1])?;
    }

    let spb = samples_per_beat(&markers[0], &markers[1])?;
    let first = &mut markers[0];
    let shift = first.beat_index - FIRST_BEAT_INDEX;
    first.sample_offset -= shift as f64 * spb;
    first.beat_index = FIRST_BEAT_INDEX;

    let n = markers.len();
    let spb = samples_per_beat(&markers[n - 2], &markers[n - 1])?;
    let last = &mut markers[n - 1];
    let beats = ((sample_count as f64 - last.sample_offset) / spb).ceil() as i64;
    last.sample_offset += beats as f64 * spb;
    last.beat_index += beats;

    let (first, last) = (markers[0], markers[n - 1]);
    if last.beat_index <= first.beat_index {
        return Err(InvalidBeatgrid(
            "grid does not span the track".to_string(),
        ));
    }
    let mut out = Vec::with_capacity(n);
    out.push(first);
    out.extend(
        markers[1..n - 1]
            .iter()
            .filter(|m| m.beat_index > first.beat_index && m.beat_index < last.beat_index)
            .copied(),
    );
    out.push(last);
    Ok(out)
}

/// Number of audio samples summarised by each high-resolution waveform entry.
pub fn required_waveform_samples_per_entry(sample_rate: f64) -> f64 {
    if sample_rate <= 0.0 {
        return 0.0;
    }
    (sample_rate / WAVEFORM_SAMPLES_PER_SECOND).trunc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn m(sample_offset: f64, beat_index: i64) -> BeatGridMarker {
        BeatGridMarker::new(sample_offset, beat_index)
    }

    #[test]
    fn test_normalize_two_markers() {
        // 120 bpm at 44.1kHz: 22050 samples per beat
        let grid = normalize_beatgrid(vec![m(0.0, 0), m(22050.0, 1)], 441000).unwrap();
        assert_eq!(grid, vec![m(-88200.0, -4), m(441000.0, 20)]);
    }

    #[test]
    fn test_normalize_pulls_back_overlong_grid() {
        let grid = normalize_beatgrid(vec![m(0.0, -4), m(22050.0 * 100.0, 96)], 441000).unwrap();
        assert_eq!(grid, vec![m(0.0, -4), m(441000.0, 16)]);
    }

    #[test]
    fn test_normalize_keeps_interior_markers() {
        let grid = normalize_beatgrid(
            vec![m(1000.0, 0), m(23050.0, 1), m(45100.0, 2), m(67150.0, 3)],
            100000,
        )
        .unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], m(1000.0 - 4.0 * 22050.0, -4));
        assert_eq!(grid[1], m(23050.0, 1));
        assert_eq!(grid[3].beat_index, 5);
        assert!(grid[3].sample_offset >= 100000.0);
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::single(vec![m(0.0, 0)])]
    #[case::descending(vec![m(100.0, 1), m(0.0, 0)])]
    #[case::same_beat(vec![m(0.0, 1), m(10.0, 1)])]
    fn test_normalize_rejects(#[case] markers: Vec<BeatGridMarker>) {
        assert!(normalize_beatgrid(markers, 1000).is_err());
    }

    #[rstest]
    #[case::cd(44100.0, 420.0)]
    #[case::dat(48000.0, 457.0)]
    #[case::zero(0.0, 0.0)]
    fn test_required_samples_per_entry(#[case] rate: f64, #[case] expected: f64) {
        assert_eq!(required_waveform_samples_per_entry(rate), expected);
    }
}
