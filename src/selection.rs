use std::collections::BTreeSet;

use crate::model::{ClipId, ClipKind, ClipRef};

/// How a click changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Plain click
    Replace,
    /// Shift-click
    Add,
    /// Secondary-modifier click
    Toggle,
}

#[derive(Debug, Clone, Default)]
struct KindSelection {
    ids: BTreeSet<ClipId>,
    primary: Option<ClipId>,
}

impl KindSelection {
    fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    fn insert(&mut self, id: ClipId) {
        self.ids.insert(id);
        self.primary = Some(id);
    }

    fn remove(&mut self, id: ClipId) -> bool {
        if !self.ids.remove(&id) {
            return false;
        }
        if self.primary == Some(id) {
            // next member after the removed one, wrapping to the first
            self.primary = self
                .ids
                .range(id..)
                .next()
                .or_else(|| self.ids.iter().next())
                .copied();
        }
        true
    }
}

/// Selected audio and MIDI clips. At most one of the two kinds is non-empty.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    audio: KindSelection,
    midi: KindSelection,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn kind(&self, kind: ClipKind) -> &KindSelection {
        match kind {
            ClipKind::Audio => &self.audio,
            ClipKind::Midi => &self.midi,
        }
    }

    fn kind_mut(&mut self, kind: ClipKind) -> &mut KindSelection {
        match kind {
            ClipKind::Audio => &mut self.audio,
            ClipKind::Midi => &mut self.midi,
        }
    }

    fn other_mut(&mut self, kind: ClipKind) -> &mut KindSelection {
        match kind {
            ClipKind::Audio => &mut self.midi,
            ClipKind::Midi => &mut self.audio,
        }
    }

    /// Apply a click on `clip` with the given mode.
    pub fn select(&mut self, clip: ClipRef, mode: SelectionMode) {
        match mode {
            SelectionMode::Replace => {
                let set = self.kind_mut(clip.kind);
                set.clear();
                set.insert(clip.id);
            }
            SelectionMode::Add => self.kind_mut(clip.kind).insert(clip.id),
            SelectionMode::Toggle => {
                let set = self.kind_mut(clip.kind);
                if !set.remove(clip.id) {
                    set.insert(clip.id);
                }
            }
        }
        self.other_mut(clip.kind).clear();
    }

    /// Select every clip of one kind, replacing whatever was selected.
    pub fn select_all_of(&mut self, kind: ClipKind, ids: impl IntoIterator<Item = ClipId>) {
        let set = self.kind_mut(kind);
        set.clear();
        for id in ids {
            set.insert(id);
        }
        set.primary = set.ids.iter().next().copied();
        self.other_mut(kind).clear();
    }

    /// Drop a clip that no longer exists.
    pub fn remove(&mut self, clip: ClipRef) -> bool {
        self.kind_mut(clip.kind).remove(clip.id)
    }

    pub fn clear(&mut self) {
        self.audio.clear();
        self.midi.clear();
    }

    pub fn contains(&self, clip: ClipRef) -> bool {
        self.kind(clip.kind).ids.contains(&clip.id)
    }

    pub fn selected_audio(&self) -> &BTreeSet<ClipId> {
        &self.audio.ids
    }

    pub fn selected_midi(&self) -> &BTreeSet<ClipId> {
        &self.midi.ids
    }

    pub fn primary(&self, kind: ClipKind) -> Option<ClipId> {
        self.kind(kind).primary
    }

    /// Kind of the current selection, if any.
    pub fn active_kind(&self) -> Option<ClipKind> {
        if !self.audio.ids.is_empty() {
            Some(ClipKind::Audio)
        } else if !self.midi.ids.is_empty() {
            Some(ClipKind::Midi)
        } else {
            None
        }
    }

    pub fn selected(&self) -> Vec<ClipRef> {
        self.audio
            .ids
            .iter()
            .map(|&id| ClipRef::audio(id))
            .chain(self.midi.ids.iter().map(|&id| ClipRef::midi(id)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.audio.ids.len() + self.midi.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_clears_previous_members() {
        let mut sel = SelectionModel::new();
        sel.select(ClipRef::audio(1), SelectionMode::Replace);
        sel.select(ClipRef::audio(2), SelectionMode::Replace);
        assert_eq!(sel.selected(), vec![ClipRef::audio(2)]);
        assert_eq!(sel.primary(ClipKind::Audio), Some(2));
    }

    #[test]
    fn add_keeps_previous_members() {
        let mut sel = SelectionModel::new();
        sel.select(ClipRef::midi(1), SelectionMode::Replace);
        sel.select(ClipRef::midi(2), SelectionMode::Add);
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.primary(ClipKind::Midi), Some(2));
    }

    #[test]
    fn toggle_removes_and_moves_primary_to_next_member() {
        let mut sel = SelectionModel::new();
        sel.select(ClipRef::audio(1), SelectionMode::Add);
        sel.select(ClipRef::audio(3), SelectionMode::Add);
        sel.select(ClipRef::audio(2), SelectionMode::Add);
        assert_eq!(sel.primary(ClipKind::Audio), Some(2));

        sel.select(ClipRef::audio(2), SelectionMode::Toggle);
        assert!(!sel.contains(ClipRef::audio(2)));
        assert_eq!(sel.primary(ClipKind::Audio), Some(3));

        sel.select(ClipRef::audio(3), SelectionMode::Toggle);
        assert_eq!(sel.primary(ClipKind::Audio), Some(1));

        sel.select(ClipRef::audio(1), SelectionMode::Toggle);
        assert_eq!(sel.primary(ClipKind::Audio), None);
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_inserts_missing_clip() {
        let mut sel = SelectionModel::new();
        sel.select(ClipRef::midi(7), SelectionMode::Toggle);
        assert!(sel.contains(ClipRef::midi(7)));
        assert_eq!(sel.primary(ClipKind::Midi), Some(7));
    }

    #[test]
    fn selecting_one_kind_clears_the_other() {
        let mut sel = SelectionModel::new();
        sel.select(ClipRef::audio(1), SelectionMode::Add);
        sel.select(ClipRef::audio(2), SelectionMode::Add);
        sel.select(ClipRef::midi(5), SelectionMode::Add);
        assert!(sel.selected_audio().is_empty());
        assert_eq!(sel.primary(ClipKind::Audio), None);
        assert_eq!(sel.active_kind(), Some(ClipKind::Midi));
    }

    #[test]
    fn select_all_of_replaces_and_clears_other_kind() {
        let mut sel = SelectionModel::new();
        sel.select(ClipRef::midi(9), SelectionMode::Replace);
        sel.select_all_of(ClipKind::Audio, [4, 2, 8]);
        assert_eq!(sel.selected_audio().len(), 3);
        assert!(sel.selected_midi().is_empty());
        assert_eq!(sel.primary(ClipKind::Audio), Some(2));
    }
}
