//! Formica Agents Prelude: convenient imports for common usage.
//!
//! ```rust
//! use formica_agents::prelude::*;
//! ```

pub use crate::behavior::{BehaviorEngine, BASE_DRAIN, WORK_DRAIN};
pub use crate::initiative::evaluate_initiative;
pub use crate::nav::{find_path, is_walkable, navigate, settle, surface_cell, NavStatus};
pub use crate::physics::apply_physics;
pub use crate::queen::update_queen;
pub use crate::recovery::{escape_if_stuck, find_escape, STUCK_LIMIT};
pub use crate::sense::{sense, FoodSighting, Senses};

// Re-export from core
pub use formica_core::prelude::*;
