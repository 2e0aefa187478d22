//! Session persistence: checkpoints on disk.
//!
//! A session is one checkpoint file (`<name>.json`) in a session directory.
//! These helpers are for callers that own disk I/O; the colony itself never
//! touches the filesystem.

use crate::checkpoint;
use crate::colony::Colony;
use formica_core::error::Result;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Summary of a saved session, read without rebuilding the colony.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub name: String,
    pub path: PathBuf,
    pub session_id: String,
    pub frame: u64,
    pub sim_day: u64,
    pub agent_count: usize,
}

/// The few checkpoint fields a listing needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SessionHeader {
    session_id: String,
    frame: u64,
    sim_day: u64,
    agents: Vec<IgnoredAny>,
}

/// Path of the session file `name` inside `dir`.
pub fn session_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Write the colony's checkpoint to `path`, creating parent directories.
pub fn save_session(colony: &Colony, path: &Path) -> Result<()> {
    let json = checkpoint::serialize(colony)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    debug!(path = %path.display(), frame = colony.frame(), "Session saved");
    Ok(())
}

/// Load a session. A file that exists but holds no usable checkpoint
/// yields a fresh colony; only I/O failures are errors.
pub fn load_session(path: &Path) -> Result<Colony> {
    let json = std::fs::read_to_string(path)?;
    Ok(checkpoint::deserialize(&json))
}

/// Load a session if the file exists.
pub fn load_or_found(path: &Path) -> Result<Colony> {
    if path.exists() {
        load_session(path)
    } else {
        Ok(Colony::new())
    }
}

/// Saved sessions in `dir`, sorted by name. Unreadable files are skipped.
pub fn list_sessions(dir: &Path) -> Result<Vec<SessionInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let header: SessionHeader = match std::fs::read_to_string(&path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
        {
            Some(h) => h,
            None => {
                debug!(path = %path.display(), "Skipping unreadable session file");
                continue;
            }
        };
        sessions.push(SessionInfo {
            name,
            path,
            session_id: header.session_id,
            frame: header.frame,
            sim_day: header.sim_day,
            agent_count: header.agents.len(),
        });
    }
    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::ColonyConfig;
    use formica_core::context::SimulationContext;

    #[test]
    fn save_load_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut colony = Colony::with_context(ColonyConfig::default(), SimulationContext::seeded(3)).expect("colony");
        colony.run(50);

        let path = session_path(dir.path(), "alpha");
        save_session(&colony, &path).expect("save");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");
        std::fs::write(dir.path().join("broken.json"), "{").expect("write");

        let restored = load_session(&path).expect("load");
        assert_eq!(restored.frame(), 50);
        assert_eq!(restored.agents().len(), colony.agents().len());

        let listed = list_sessions(dir.path()).expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "alpha");
        assert_eq!(listed[0].frame, 50);
        assert_eq!(listed[0].session_id, colony.session_id());
        assert_eq!(listed[0].agent_count, colony.agents().len());
    }

    #[test]
    fn missing_file_is_an_error_but_found_is_not() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = session_path(dir.path(), "none");
        assert!(load_session(&path).is_err());
        assert_eq!(load_or_found(&path).expect("fresh").frame(), 0);
        assert!(list_sessions(&dir.path().join("absent")).expect("list").is_empty());
    }

    #[test]
    fn corrupt_session_loads_fresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = session_path(dir.path(), "bad");
        std::fs::write(&path, r#"{"terrain":"%%%","frame":99}"#).expect("write");
        assert_eq!(load_session(&path).expect("load").frame(), 0);
    }
}
