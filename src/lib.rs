pub mod audio_import;
pub mod commands;
pub mod config;
pub mod constants;
pub mod edit_actions;
pub mod editor;
pub mod engine;
pub mod error;
pub mod grid;
pub mod idgen;
pub mod input;
pub mod layout;
pub mod messages;
pub mod model;
pub mod paths;
pub mod repository;
pub mod selection;
pub mod state;
pub mod time_utils;
pub mod track_manager;

pub use config::EditorConfig;
pub use editor::Arrangement;
pub use error::{ArrangerError, Result};
pub use messages::{EditorEvent, EditorObserver};
