use std::path::PathBuf;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "arranger", "arranger")
}

/// Platform config directory, `None` when no home directory can be found.
pub fn config_root_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn config_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("config.json"))
}
