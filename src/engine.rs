use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::constants::SILENT_PEAK_DB;
use crate::messages::{EditorEvent, EditorObserver};
use crate::model::{ClipId, TrackId, TrackInfo, TrackType, WaveformPeak};

/// The audio/MIDI engine, as far as the arrangement view needs it.
pub trait Engine: Send + Sync {
    fn load_audio_file(&self, path: &Path) -> Result<ClipId>;
    fn get_clip_duration(&self, clip: ClipId) -> Result<f64>;
    fn get_waveform_peaks(&self, clip: ClipId, resolution: usize) -> Result<Vec<WaveformPeak>>;
    fn set_clip_start_time(&self, track: TrackId, clip: ClipId, seconds: f64) -> Result<()>;
    fn remove_clip(&self, track: TrackId, clip: ClipId) -> Result<()>;

    fn get_all_track_ids(&self) -> Result<Vec<TrackId>>;
    /// `id,name,type[,volumeDb,pan,mute,solo,...]`
    fn get_track_info(&self, track: TrackId) -> Result<String>;
    /// `leftDb,rightDb`
    fn get_track_peak_levels(&self, track: TrackId) -> Result<String>;
    fn create_track(&self, track_type: TrackType, name: &str) -> Result<TrackId>;
    fn set_track_name(&self, track: TrackId, name: &str) -> Result<()>;
}

/// Parse one track info row. Rows with fewer than three fields, a bad id or
/// an unknown type give `None`; bad optional fields are left unset.
pub fn parse_track_info(csv: &str) -> Option<TrackInfo> {
    let fields: Vec<&str> = csv.trim().split(',').map(str::trim).collect();
    if fields.len() < 3 {
        return None;
    }
    let id = fields[0].parse::<TrackId>().ok()?;
    let track_type = TrackType::from_engine_str(fields[2])?;
    let field = |i: usize| fields.get(i).copied();

    Some(TrackInfo {
        id,
        name: fields[1].to_string(),
        track_type,
        volume_db: field(3).and_then(|s| s.parse().ok()),
        pan: field(4).and_then(|s| s.parse().ok()),
        muted: field(5).and_then(parse_flag),
        solo: field(6).and_then(parse_flag),
    })
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "1" | "true" | "True" => Some(true),
        "0" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// `leftDb,rightDb`; anything unparsable reads as silence on both channels.
pub fn parse_peak_levels(csv: &str) -> (f32, f32) {
    let mut parts = csv.trim().split(',').map(|s| s.trim().parse::<f32>());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(l)), Some(Ok(r)), None) if l.is_finite() && r.is_finite() => (l, r),
        _ => (SILENT_PEAK_DB, SILENT_PEAK_DB),
    }
}

/// Comma-separated id list as some engine bindings return it. Bad entries
/// are dropped.
pub fn parse_track_ids(csv: &str) -> Vec<TrackId> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Fetch and parse every track row the engine reports, skipping bad rows.
pub fn fetch_track_infos(engine: &dyn Engine) -> Result<Vec<TrackInfo>> {
    let ids = engine.get_all_track_ids()?;
    let mut infos = Vec::with_capacity(ids.len());
    for id in ids {
        match engine.get_track_info(id) {
            Ok(row) => match parse_track_info(&row) {
                Some(info) => infos.push(info),
                None => log::warn!("Skipping malformed track row: {:?}", row),
            },
            Err(e) => log::warn!("Failed to get info for track {}: {}", id, e),
        }
    }
    Ok(infos)
}

/// Mirrors committed edits to the engine. Calls are fire and forget: a
/// failure is logged and local state stays as it is.
pub struct EngineSync {
    engine: Arc<dyn Engine>,
}

impl EngineSync {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    fn report(what: &str, result: Result<()>) {
        if let Err(e) = result {
            log::warn!("Engine {} failed: {}", what, e);
        }
    }
}

impl EditorObserver for EngineSync {
    fn id(&self) -> &'static str {
        "engine-sync"
    }

    fn on_event(&self, event: &EditorEvent) {
        match event {
            EditorEvent::ClipMoved {
                clip,
                track,
                start_seconds,
                ..
            } => Self::report(
                "set_clip_start_time",
                self.engine.set_clip_start_time(*track, clip.id, *start_seconds),
            ),
            EditorEvent::ClipTrimmed {
                clip,
                track,
                start_changed: true,
                start_seconds,
                ..
            } => Self::report(
                "set_clip_start_time",
                self.engine.set_clip_start_time(*track, clip.id, *start_seconds),
            ),
            EditorEvent::ClipsDeleted(clips) => {
                for (clip, track) in clips {
                    Self::report("remove_clip", self.engine.remove_clip(*track, clip.id));
                }
            }
            EditorEvent::TrackRenamed { track, name } => Self::report(
                "set_track_name",
                self.engine.set_track_name(*track, name),
            ),
            _ => {}
        }
    }
}

/// Background thread that polls the engine's track list and sends each
/// snapshot to the UI thread.
pub struct TrackPoller {
    rx: Receiver<Vec<TrackInfo>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TrackPoller {
    pub fn spawn(engine: Arc<dyn Engine>, interval: Duration) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = std::thread::spawn(move || {
            loop {
                match fetch_track_infos(engine.as_ref()) {
                    Ok(infos) => {
                        if tx.send(infos).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("Track refresh failed: {}", e),
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
            log::debug!("Track poller stopped");
        });

        Self {
            rx,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn receiver(&self) -> &Receiver<Vec<TrackInfo>> {
        &self.rx
    }

    /// Newest snapshot waiting, older ones are dropped.
    pub fn try_latest(&self) -> Option<Vec<TrackInfo>> {
        self.rx.try_iter().last()
    }

    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("Track poller thread panicked");
        }
    }
}

impl Drop for TrackPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Engine double that records calls and serves canned track rows.
    #[derive(Default)]
    pub(crate) struct MockEngine {
        pub calls: Mutex<Vec<String>>,
        pub rows: Mutex<Vec<(TrackId, String)>>,
        pub fail_writes: bool,
        pub durations: Mutex<Vec<(ClipId, f64)>>,
        pub next_id: Mutex<u64>,
    }

    impl MockEngine {
        pub fn with_rows(rows: &[(TrackId, &str)]) -> Self {
            let engine = Self::default();
            *engine.rows.lock() = rows.iter().map(|(id, r)| (*id, r.to_string())).collect();
            engine
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().push(call);
            if self.fail_writes {
                anyhow::bail!("engine offline");
            }
            Ok(())
        }

        fn fresh_id(&self) -> u64 {
            let mut next = self.next_id.lock();
            *next += 1;
            1000 + *next
        }
    }

    impl Engine for MockEngine {
        fn load_audio_file(&self, path: &Path) -> Result<ClipId> {
            let name = path.display().to_string();
            if name.contains("corrupt") {
                anyhow::bail!("cannot decode {}", name);
            }
            let id = self.fresh_id();
            self.durations.lock().push((id, 3.0));
            self.calls.lock().push(format!("load {}", name));
            Ok(id)
        }

        fn get_clip_duration(&self, clip: ClipId) -> Result<f64> {
            self.durations
                .lock()
                .iter()
                .find(|(id, _)| *id == clip)
                .map(|(_, d)| *d)
                .ok_or_else(|| anyhow::anyhow!("unknown clip {}", clip))
        }

        fn get_waveform_peaks(&self, _clip: ClipId, resolution: usize) -> Result<Vec<WaveformPeak>> {
            Ok(vec![WaveformPeak { min: -0.5, max: 0.5 }; resolution.min(4)])
        }

        fn set_clip_start_time(&self, track: TrackId, clip: ClipId, seconds: f64) -> Result<()> {
            self.record(format!("start {} {} {}", track, clip, seconds))
        }

        fn remove_clip(&self, track: TrackId, clip: ClipId) -> Result<()> {
            self.record(format!("remove {} {}", track, clip))
        }

        fn get_all_track_ids(&self) -> Result<Vec<TrackId>> {
            Ok(self.rows.lock().iter().map(|(id, _)| *id).collect())
        }

        fn get_track_info(&self, track: TrackId) -> Result<String> {
            self.rows
                .lock()
                .iter()
                .find(|(id, _)| *id == track)
                .map(|(_, row)| row.clone())
                .ok_or_else(|| anyhow::anyhow!("Track {} not found", track))
        }

        fn get_track_peak_levels(&self, track: TrackId) -> Result<String> {
            match track {
                1 => Ok("-6.00,-3.50".to_string()),
                _ => Ok("Error: no meter".to_string()),
            }
        }

        fn create_track(&self, track_type: TrackType, name: &str) -> Result<TrackId> {
            self.record(format!("create {} {}", track_type.as_engine_str(), name))?;
            Ok(self.fresh_id())
        }

        fn set_track_name(&self, track: TrackId, name: &str) -> Result<()> {
            self.record(format!("rename {} {}", track, name))
        }
    }

    #[test]
    fn parses_full_and_short_track_rows() {
        let info = parse_track_info("3,Lead Synth,MIDI,-6.00,0.25,1,0,0").unwrap();
        assert_eq!(info.id, 3);
        assert_eq!(info.name, "Lead Synth");
        assert_eq!(info.track_type, TrackType::Midi);
        assert_eq!(info.volume_db, Some(-6.0));
        assert_eq!(info.pan, Some(0.25));
        assert_eq!(info.muted, Some(true));
        assert_eq!(info.solo, Some(false));

        let short = parse_track_info("0,Master,Master").unwrap();
        assert_eq!(short.track_type, TrackType::Master);
        assert_eq!(short.volume_db, None);

        let group = parse_track_info("7,Bus,Group,abc").unwrap();
        assert_eq!(group.track_type, TrackType::Audio);
        assert_eq!(group.volume_db, None);
    }

    #[test]
    fn malformed_track_rows_are_rejected() {
        assert!(parse_track_info("").is_none());
        assert!(parse_track_info("1,OnlyTwo").is_none());
        assert!(parse_track_info("x,Name,Audio").is_none());
        assert!(parse_track_info("1,Name,Video").is_none());
        assert!(parse_track_info("Error: Track 4 not found").is_none());
    }

    #[test]
    fn peak_levels_fall_back_to_silence() {
        assert_eq!(parse_peak_levels("-6.00,-3.50"), (-6.0, -3.5));
        assert_eq!(parse_peak_levels("garbage"), (-96.0, -96.0));
        assert_eq!(parse_peak_levels("-1.0"), (-96.0, -96.0));
        assert_eq!(parse_peak_levels("-1.0,-2.0,-3.0"), (-96.0, -96.0));
    }

    #[test]
    fn track_id_lists_skip_bad_entries() {
        assert_eq!(parse_track_ids("1, 2,x,,5"), vec![1, 2, 5]);
        assert!(parse_track_ids("").is_empty());
    }

    #[test]
    fn fetch_skips_rows_that_do_not_parse() {
        let engine = MockEngine::with_rows(&[(1, "1,Drums,Audio"), (2, "2,broken"), (3, "3,Keys,MIDI")]);
        let infos = fetch_track_infos(&engine).unwrap();
        assert_eq!(infos.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn engine_sync_forwards_edits_and_swallows_failures() {
        let engine = Arc::new(MockEngine {
            fail_writes: true,
            ..Default::default()
        });
        let sync = EngineSync::new(engine.clone());
        sync.on_event(&EditorEvent::ClipMoved {
            clip: crate::model::ClipRef::audio(4),
            track: 1,
            from: 0.0,
            to: 2.0,
            start_seconds: 2.0,
        });
        sync.on_event(&EditorEvent::ClipTrimmed {
            clip: crate::model::ClipRef::audio(4),
            track: 1,
            start_changed: false,
            start_seconds: 2.0,
            duration: 1.0,
        });
        sync.on_event(&EditorEvent::ClipsDeleted(vec![(crate::model::ClipRef::audio(4), 1)]));
        sync.on_event(&EditorEvent::TrackRenamed {
            track: 1,
            name: "Drums".into(),
        });
        assert_eq!(engine.calls(), vec!["start 1 4 2", "remove 1 4", "rename 1 Drums"]);
    }

    #[test]
    fn poller_delivers_snapshots_and_stops() {
        let engine = Arc::new(MockEngine::with_rows(&[(1, "1,Drums,Audio")]));
        let mut poller = TrackPoller::spawn(engine, Duration::from_millis(10));
        let first = poller
            .receiver()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(first.len(), 1);
        poller.stop();
        assert!(poller.handle.is_none());
    }
}
