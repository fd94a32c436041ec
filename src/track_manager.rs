use std::collections::HashMap;

use crate::model::{Track, TrackId, TrackInfo, TrackType};

#[derive(Debug, Clone)]
pub struct TrackBuilder {
    id: TrackId,
    ordinal: usize,
    name: Option<String>,
    track_type: TrackType,
    confirmed: bool,
}

impl TrackBuilder {
    pub fn new(id: TrackId, track_type: TrackType) -> Self {
        Self {
            id,
            ordinal: 1,
            name: None,
            track_type,
            confirmed: false,
        }
    }

    /// Number used in the default name ("Audio 3").
    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the track as known to the engine.
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn build(self) -> Track {
        let name = self
            .name
            .unwrap_or_else(|| self.track_type.default_name(self.ordinal));
        let mut track = Track::new(self.id, name, self.track_type);
        track.confirmed = self.confirmed;
        track
    }
}

/// What a refresh merge changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshOutcome {
    pub added: Vec<TrackId>,
    pub updated: Vec<TrackId>,
    pub removed: Vec<TrackId>,
}

impl RefreshOutcome {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Regular tracks in display order plus an optional Master pinned after them.
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    tracks: HashMap<TrackId, Track>,
    order: Vec<TrackId>,
    master: Option<TrackId>,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track at the end of the regular order, or as the Master.
    /// A second Master replaces the first one.
    pub fn insert(&mut self, track: Track) {
        let id = track.id;
        if self.tracks.contains_key(&id) {
            log::warn!("Track {} already present, replacing", id);
            self.remove(id);
        }
        if track.is_master() {
            if let Some(old) = self.master.take() {
                self.tracks.remove(&old);
            }
            self.master = Some(id);
        } else {
            self.order.push(id);
        }
        self.tracks.insert(id, track);
    }

    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        self.order.retain(|&t| t != id);
        if self.master == Some(id) {
            self.master = None;
        }
        self.tracks.remove(&id)
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Ids of regular tracks in display order.
    pub fn regular_order(&self) -> &[TrackId] {
        &self.order
    }

    pub fn master(&self) -> Option<&Track> {
        self.master.and_then(|id| self.tracks.get(&id))
    }

    /// Row ids top to bottom: regular tracks, then Master.
    pub fn row_ids(&self) -> Vec<TrackId> {
        self.order.iter().copied().chain(self.master).collect()
    }

    pub fn rows(&self) -> Vec<&Track> {
        self.row_ids()
            .into_iter()
            .filter_map(|id| self.tracks.get(&id))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.order.len() + usize::from(self.master.is_some())
    }

    pub fn row_of(&self, id: TrackId) -> Option<usize> {
        if let Some(index) = self.index_of(id) {
            return Some(index);
        }
        (self.master == Some(id)).then_some(self.order.len())
    }

    pub fn track_at_row(&self, row: usize) -> Option<&Track> {
        match self.order.get(row) {
            Some(id) => self.tracks.get(id),
            None if row == self.order.len() => self.master(),
            None => None,
        }
    }

    /// Position among the regular tracks; `None` for Master and unknown ids.
    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.order.iter().position(|&t| t == id)
    }

    /// Move the regular track at `from` so it ends up at index `to`.
    /// Master never moves. Returns whether the order changed.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.order.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        true
    }

    /// Set a name locally. It stays pending until the engine reports it back.
    pub fn rename(&mut self, id: TrackId, name: impl Into<String>) -> Option<String> {
        let track = self.tracks.get_mut(&id)?;
        let name = name.into();
        let old = std::mem::replace(&mut track.name, name.clone());
        track.pending_name = Some(name);
        Some(old)
    }

    /// Ordinal for the next default name of this type.
    pub fn next_ordinal(&self, track_type: TrackType) -> usize {
        self.tracks
            .values()
            .filter(|t| t.track_type == track_type)
            .count()
            + 1
    }

    pub fn max_id(&self) -> Option<TrackId> {
        self.tracks.keys().copied().max()
    }

    /// Merge an engine snapshot by id.
    ///
    /// Known tracks take the engine's fields, except that a pending local
    /// rename wins until the engine reports the same name. Unknown ids are
    /// appended. Tracks the engine confirmed earlier but no longer reports
    /// are removed; local tracks it has never seen are kept.
    pub fn apply_refresh(&mut self, infos: Vec<TrackInfo>) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();
        let reported: Vec<TrackId> = infos.iter().map(|i| i.id).collect();

        for info in infos {
            match self.tracks.get_mut(&info.id) {
                Some(track) => {
                    if merge_info(track, info) {
                        outcome.updated.push(track.id);
                    }
                }
                None => {
                    let id = info.id;
                    self.insert(info.into_track());
                    outcome.added.push(id);
                }
            }
        }

        let stale: Vec<TrackId> = self
            .tracks
            .values()
            .filter(|t| t.confirmed && !reported.contains(&t.id))
            .map(|t| t.id)
            .collect();
        for id in stale {
            self.remove(id);
            outcome.removed.push(id);
        }

        outcome
    }
}

fn merge_info(track: &mut Track, info: TrackInfo) -> bool {
    let mut changed = !track.confirmed;
    track.confirmed = true;

    match &track.pending_name {
        Some(pending) if *pending == info.name => track.pending_name = None,
        Some(_) => {}
        None => {
            if track.name != info.name {
                track.name = info.name;
                changed = true;
            }
        }
    }

    if track.track_type != info.track_type && !track.is_master() {
        if info.track_type == TrackType::Master {
            log::warn!("Track {} reported as Master, keeping its type", track.id);
        } else {
            track.track_type = info.track_type;
            changed = true;
        }
    }

    if let Some(v) = info.volume_db {
        changed |= track.volume_db != v;
        track.volume_db = v;
    }
    if let Some(p) = info.pan {
        changed |= track.pan != p;
        track.pan = p;
    }
    if let Some(m) = info.muted {
        changed |= track.muted != m;
        track.muted = m;
    }
    if let Some(s) = info.solo {
        changed |= track.solo != s;
        track.solo = s;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: TrackId, name: &str, track_type: TrackType) -> TrackInfo {
        TrackInfo {
            id,
            name: name.to_string(),
            track_type,
            volume_db: None,
            pan: None,
            muted: None,
            solo: None,
        }
    }

    fn list_with(ids: &[TrackId]) -> TrackList {
        let mut list = TrackList::new();
        for &id in ids {
            list.insert(TrackBuilder::new(id, TrackType::Audio).with_ordinal(id as usize).build());
        }
        list
    }

    #[test]
    fn builder_uses_default_names() {
        let audio = TrackBuilder::new(1, TrackType::Audio).with_ordinal(3).build();
        assert_eq!(audio.name, "Audio 3");
        let midi = TrackBuilder::new(2, TrackType::Midi).build();
        assert_eq!(midi.name, "MIDI 1");
        let named = TrackBuilder::new(3, TrackType::Midi).with_name("Keys").build();
        assert_eq!(named.name, "Keys");
    }

    #[test]
    fn master_is_pinned_after_regular_tracks() {
        let mut list = TrackList::new();
        list.insert(TrackBuilder::new(10, TrackType::Master).build());
        list.insert(TrackBuilder::new(1, TrackType::Audio).build());
        list.insert(TrackBuilder::new(2, TrackType::Midi).build());
        assert_eq!(list.row_ids(), vec![1, 2, 10]);
        assert_eq!(list.row_of(10), Some(2));
        assert_eq!(list.index_of(10), None);
        assert_eq!(list.track_at_row(2).map(|t| t.id), Some(10));
    }

    #[test]
    fn move_track_places_track_at_target_index() {
        let mut list = list_with(&[1, 2, 3, 4]);
        assert!(list.move_track(0, 2));
        assert_eq!(list.regular_order(), &[2, 3, 1, 4]);
        assert!(list.move_track(2, 0));
        assert_eq!(list.regular_order(), &[1, 2, 3, 4]);
    }

    #[test]
    fn move_track_rejects_master_and_out_of_range() {
        let mut list = list_with(&[1, 2]);
        list.insert(TrackBuilder::new(9, TrackType::Master).build());
        assert!(!list.move_track(0, 2));
        assert!(!list.move_track(2, 0));
        assert!(!list.move_track(1, 1));
        assert_eq!(list.row_ids(), vec![1, 2, 9]);
    }

    #[test]
    fn refresh_updates_appends_and_keeps_local_tracks() {
        let mut list = TrackList::new();
        list.insert(TrackBuilder::new(1, TrackType::Audio).confirmed().build());
        list.insert(TrackBuilder::new(50, TrackType::Midi).build()); // local only

        let mut row = info(1, "Drums", TrackType::Audio);
        row.volume_db = Some(-6.0);
        let outcome = list.apply_refresh(vec![row, info(2, "Bass", TrackType::Midi)]);

        assert_eq!(outcome.added, vec![2]);
        assert_eq!(outcome.updated, vec![1]);
        assert!(outcome.removed.is_empty());
        assert_eq!(list.get(1).unwrap().name, "Drums");
        assert_eq!(list.get(1).unwrap().volume_db, -6.0);
        assert!(list.contains(50));
        assert_eq!(list.regular_order(), &[1, 50, 2]);
    }

    #[test]
    fn refresh_drops_confirmed_tracks_the_engine_lost() {
        let mut list = TrackList::new();
        list.apply_refresh(vec![info(1, "A", TrackType::Audio), info(2, "B", TrackType::Audio)]);
        let outcome = list.apply_refresh(vec![info(2, "B", TrackType::Audio)]);
        assert_eq!(outcome.removed, vec![1]);
        assert_eq!(list.regular_order(), &[2]);
    }

    #[test]
    fn pending_rename_survives_until_echoed() {
        let mut list = TrackList::new();
        list.apply_refresh(vec![info(1, "Old", TrackType::Audio)]);
        list.rename(1, "New");

        list.apply_refresh(vec![info(1, "Old", TrackType::Audio)]);
        assert_eq!(list.get(1).unwrap().name, "New");
        assert!(list.get(1).unwrap().pending_name.is_some());

        list.apply_refresh(vec![info(1, "New", TrackType::Audio)]);
        assert!(list.get(1).unwrap().pending_name.is_none());

        list.apply_refresh(vec![info(1, "Renamed elsewhere", TrackType::Audio)]);
        assert_eq!(list.get(1).unwrap().name, "Renamed elsewhere");
    }

    #[test]
    fn unchanged_refresh_reports_nothing() {
        let mut list = TrackList::new();
        list.apply_refresh(vec![info(1, "A", TrackType::Audio)]);
        let outcome = list.apply_refresh(vec![info(1, "A", TrackType::Audio)]);
        assert!(outcome.is_empty());
    }
}
