//! Formica Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use formica_runtime::prelude::*;
//! ```

// Re-export colony
pub use crate::colony::{workforce_of, Colony, ColonyConfig, ColonyCounters, ColonyEvent, ColonyStats};

// Re-export passes
pub use crate::chambers::ChamberDetector;
pub use crate::goals::{count_galleries, derive_phase, measure_shaft, quotas_for};

// Re-export checkpoints and sessions
pub use crate::checkpoint::{deserialize, serialize, try_deserialize, AgentRecord, Checkpoint, CHECKPOINT_VERSION};
pub use crate::session::{list_sessions, load_or_found, load_session, save_session, session_path, SessionInfo};

// Re-export snapshot
pub use crate::snapshot::{BroodCounts, ColonySnapshot};

// Re-export from agents
pub use formica_agents::prelude::*;
