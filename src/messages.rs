use std::sync::Arc;

use crate::model::{ClipRef, TrackId, TrackType};

/// Domain events published after an edit has been applied to local state.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ClipMoved {
        clip: ClipRef,
        track: TrackId,
        /// Native unit: seconds for audio, beats for MIDI.
        from: f64,
        to: f64,
        start_seconds: f64,
    },
    ClipsDuplicated {
        source: ClipRef,
        copies: Vec<ClipRef>,
    },
    ClipTrimmed {
        clip: ClipRef,
        track: TrackId,
        start_changed: bool,
        start_seconds: f64,
        duration: f64,
    },
    ClipResized {
        clip: ClipRef,
        track: TrackId,
        duration: f64,
    },
    ClipSplit {
        original: ClipRef,
        track: TrackId,
        left: ClipRef,
        right: ClipRef,
    },
    ClipsDeleted(Vec<(ClipRef, TrackId)>),
    /// A local-only clip was given a new id.
    ClipReassigned {
        from: ClipRef,
        to: ClipRef,
        track: TrackId,
    },
    ClipCreated {
        clip: ClipRef,
        track: TrackId,
    },
    TrackCreated {
        track: TrackId,
        track_type: TrackType,
    },
    TrackRenamed {
        track: TrackId,
        name: String,
    },
    TrackReordered {
        track: TrackId,
        from: usize,
        to: usize,
    },
    SelectionChanged(Vec<ClipRef>),
    TracksRefreshed {
        added: Vec<TrackId>,
        updated: Vec<TrackId>,
        removed: Vec<TrackId>,
    },
}

/// Something that reacts to editor events: engine sync, undo history, a
/// repaint trigger.
pub trait EditorObserver: Send + Sync {
    fn id(&self) -> &'static str;
    fn on_event(&self, event: &EditorEvent);
}

/// Delivers every event to every observer in subscription order.
#[derive(Default, Clone)]
pub struct EventBus {
    observers: Vec<Arc<dyn EditorObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn EditorObserver>) {
        log::debug!("Observer '{}' subscribed", observer.id());
        self.observers.push(observer);
    }

    /// Remove observers with this id. Returns how many were removed.
    pub fn unsubscribe(&mut self, id: &str) -> usize {
        let before = self.observers.len();
        self.observers.retain(|o| o.id() != id);
        before - self.observers.len()
    }

    pub fn publish(&self, event: &EditorEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    pub fn publish_all(&self, events: &[EditorEvent]) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.id()))
            .finish()
    }
}
