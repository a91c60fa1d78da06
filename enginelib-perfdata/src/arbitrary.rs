// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Proptest strategies for the analysis blob types.

use proptest::collection::vec;
use proptest::prelude::*;

use crate::{
    BeatData, BeatGridMarker, HighResWaveformData, HotCue, Loop, LoopsData,
    OVERVIEW_WAVEFORM_ENTRIES, OverviewWaveformData, PadColor, QuickCuesData, TrackData,
    WaveformEntry,
};

fn offset() -> impl Strategy<Value = f64> {
    -1.0e9f64..1.0e9
}

prop_compose! {
    pub fn arb_color()(rgba in any::<u32>()) -> PadColor {
        PadColor::from_rgba(rgba)
    }
}

prop_compose! {
    pub fn arb_track_data()(
        sample_rate in 0.0f64..192_000.0,
        sample_count in 0i64..1_000_000_000,
        average_loudness in 0.0f64..1.0,
        key in 0i32..=24,
    ) -> TrackData {
        TrackData { sample_rate, sample_count, average_loudness, key }
    }
}

prop_compose! {
    pub fn arb_marker()(sample_offset in offset(), beat_index in -4i64..100_000) -> BeatGridMarker {
        BeatGridMarker::new(sample_offset, beat_index)
    }
}

prop_compose! {
    pub fn arb_beat_data()(
        sample_rate in 0.0f64..192_000.0,
        sample_count in 0i64..1_000_000_000,
        default_markers in vec(arb_marker(), 0..8),
        adjusted_markers in vec(arb_marker(), 0..8),
    ) -> BeatData {
        BeatData { sample_rate, sample_count, default_markers, adjusted_markers }
    }
}

fn entry() -> impl Strategy<Value = WaveformEntry> {
    any::<(u8, u8, u8)>().prop_map(|(l, m, h)| WaveformEntry::new(l, m, h))
}

prop_compose! {
    pub fn arb_high_res()(
        sample_rate in 0.0f64..192_000.0,
        samples_per_entry in 0.0f64..2_000.0,
        entries in vec(entry(), 0..512),
    ) -> HighResWaveformData {
        HighResWaveformData { sample_rate, samples_per_entry, entries }
    }
}

prop_compose! {
    pub fn arb_overview()(
        sample_rate in 0.0f64..192_000.0,
        samples_per_entry in 0.0f64..1_000_000.0,
        entries in prop_oneof![
            Just(Vec::new()),
            vec(entry(), OVERVIEW_WAVEFORM_ENTRIES),
        ],
    ) -> OverviewWaveformData {
        OverviewWaveformData { sample_rate, samples_per_entry, entries }
    }
}

prop_compose! {
    pub fn arb_hot_cue()(label in "[a-zA-Z0-9 ]{0,16}", sample_offset in offset(), color in arb_color()) -> HotCue {
        HotCue { label, sample_offset, color }
    }
}

prop_compose! {
    pub fn arb_quick_cues()(
        cues in vec(proptest::option::of(arb_hot_cue()), 8),
        adjusted_main_cue in offset(),
        is_main_cue_adjusted in any::<bool>(),
        default_main_cue in offset(),
    ) -> QuickCuesData {
        let mut data = QuickCuesData {
            adjusted_main_cue,
            is_main_cue_adjusted,
            default_main_cue,
            ..Default::default()
        };
        for (slot, cue) in data.hot_cues.iter_mut().zip(cues) {
            *slot = cue;
        }
        data
    }
}

prop_compose! {
    pub fn arb_loop()(
        label in "\\PC{0,12}",
        start_sample_offset in offset(),
        end_sample_offset in offset(),
        color in arb_color(),
    ) -> Loop {
        Loop { label, start_sample_offset, end_sample_offset, color }
    }
}

prop_compose! {
    pub fn arb_loops()(loops in vec(proptest::option::of(arb_loop()), 8)) -> LoopsData {
        let mut data = LoopsData::default();
        for (slot, l) in data.loops.iter_mut().zip(loops) {
            *slot = l;
        }
        data
    }
}
