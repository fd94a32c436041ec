use arranger::edit_actions::EditProcessor;
use arranger::grid::GridSnapper;
use arranger::input::InputModifiers;
use arranger::model::{AudioClip, ClipKind, ClipRef, TrackType};
use arranger::selection::{SelectionMode, SelectionModel};
use arranger::time_utils::CoordinateSystem;
use arranger::track_manager::TrackBuilder;
use arranger::{Arrangement, EditorConfig};
use egui::pos2;
use proptest::prelude::*;

fn kind(audio: bool) -> ClipKind {
    if audio { ClipKind::Audio } else { ClipKind::Midi }
}

proptest! {
    #[test]
    fn snapping_is_idempotent(beats in -100_000.0f64..100_000.0, zoom in 1.0f64..600.0) {
        let snapper = GridSnapper::new(zoom);
        let once = snapper.snap(beats);
        prop_assert_eq!(snapper.snap(once), once);
    }

    #[test]
    fn bypassed_snap_is_clamped_only(beats in -1_000.0f64..1_000.0, zoom in 10.0f64..500.0) {
        let snapper = GridSnapper::new(zoom);
        prop_assert_eq!(snapper.snap_or_bypass(beats, true), beats.max(0.0));
    }

    #[test]
    fn seconds_survive_a_pixel_round_trip(
        seconds in 0.0f64..100_000.0,
        bpm in 1.0f64..400.0,
        zoom in 10.0f64..500.0,
    ) {
        let coords = CoordinateSystem::new(bpm, zoom);
        let back = coords.pixels_to_seconds(coords.seconds_to_pixels(seconds));
        prop_assert!((back - seconds).abs() <= 1e-9 * seconds.max(1.0));
    }

    #[test]
    fn conversion_paths_agree(
        seconds in 0.0f64..100_000.0,
        bpm in 1.0f64..400.0,
        zoom in 10.0f64..500.0,
    ) {
        let coords = CoordinateSystem::new(bpm, zoom);
        let direct = coords.seconds_to_pixels(seconds);
        let via_beats = coords.beats_to_pixels(coords.seconds_to_beats(seconds));
        prop_assert!((direct - via_beats).abs() <= 1e-9 * direct.max(1.0));
    }

    #[test]
    fn selection_never_mixes_kinds(
        ops in prop::collection::vec((any::<bool>(), 0u64..8, 0u8..6), 0..64),
    ) {
        let mut sel = SelectionModel::new();
        for (audio, id, op) in ops {
            let clip = ClipRef { kind: kind(audio), id };
            match op {
                0 => sel.select(clip, SelectionMode::Replace),
                1 => sel.select(clip, SelectionMode::Add),
                2 => sel.select(clip, SelectionMode::Toggle),
                3 => {
                    sel.remove(clip);
                }
                4 => sel.select_all_of(clip.kind, 0..id),
                _ => sel.clear(),
            }
            prop_assert!(sel.selected_audio().is_empty() || sel.selected_midi().is_empty());
            for k in [ClipKind::Audio, ClipKind::Midi] {
                let set = match k {
                    ClipKind::Audio => sel.selected_audio(),
                    ClipKind::Midi => sel.selected_midi(),
                };
                match sel.primary(k) {
                    Some(p) => prop_assert!(set.contains(&p)),
                    None => prop_assert!(set.is_empty()),
                }
            }
        }
    }

    #[test]
    fn audio_split_conserves_length(
        start in 0.0f64..100.0,
        duration in 0.5f64..50.0,
        offset in 0.0f64..10.0,
        fraction in 0.01f64..0.99,
    ) {
        let mut clip = AudioClip::new(1, 1, "loop.wav", start, duration);
        clip.source_offset = offset;
        let at = start + duration * fraction;
        let (left, right) = EditProcessor::split_audio(&clip, at, 2).unwrap();

        prop_assert!((left.duration + right.duration - duration).abs() < 1e-9);
        prop_assert_eq!(left.start_time, start);
        prop_assert_eq!(right.start_time, at);
        prop_assert!((right.source_offset - (offset + at - start)).abs() < 1e-9);
    }

    #[test]
    fn dragged_clips_never_start_before_zero(dx in -3_000.0f32..3_000.0) {
        let mut arr = Arrangement::new(EditorConfig::default());
        let state = arr.state_mut();
        state.tracks.insert(TrackBuilder::new(1, TrackType::Audio).build());
        state.clips.add_audio(AudioClip::new(10, 1, "a.wav", 1.0, 2.0));
        state.clips.add_audio(AudioClip::new(11, 1, "b.wav", 4.0, 1.0));
        arr.select_all();

        arr.pointer_down(pos2(300.0, 40.0));
        arr.pointer_move(pos2(300.0 + dx, 40.0), InputModifiers::NONE);
        arr.pointer_up(pos2(300.0 + dx, 40.0), InputModifiers::NONE);

        for clip in arr.state().clips.audio_clips() {
            prop_assert!(clip.start_time >= 0.0);
        }
    }
}
