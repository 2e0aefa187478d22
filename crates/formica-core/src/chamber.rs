//! Chambers: the rooms the colony has carved out.

use crate::types::Position;
use serde::{Deserialize, Serialize};

/// What a chamber is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChamberType {
    #[default]
    General,
    Royal,
    Brood,
    Food,
    Midden,
}

impl ChamberType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChamberType::General => "general",
            ChamberType::Royal => "royal",
            ChamberType::Brood => "brood",
            ChamberType::Food => "food",
            ChamberType::Midden => "midden",
        }
    }
}

/// A connected open cavity below the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chamber {
    pub centroid: Position,
    /// Number of cells in the cavity.
    #[serde(default)]
    pub size: usize,
    /// Rows below the surface, measured at the centroid.
    #[serde(default)]
    pub depth: f64,
    /// Zero in a saved record means "derive from size on load".
    #[serde(default)]
    pub radius: f64,
    #[serde(default, rename = "type")]
    pub chamber_type: ChamberType,
}

/// Reach of a chamber with `size` cells: the radius of a disc that size,
/// plus a margin for the ragged walls.
pub fn radius_for(size: usize) -> f64 {
    (size as f64 / std::f64::consts::PI).sqrt() + 1.5
}

impl Chamber {
    /// Fill in a radius that is missing or unusable.
    pub fn repair(&mut self) {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            self.radius = radius_for(self.size);
        }
        if !self.depth.is_finite() {
            self.depth = 0.0;
        }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.centroid.distance_to(pos) <= self.radius
    }
}

/// First chamber of a given type, if any.
pub fn find_chamber(chambers: &[Chamber], kind: ChamberType) -> Option<&Chamber> {
    chambers.iter().find(|c| c.chamber_type == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_uses_radius() {
        let c = Chamber {
            centroid: Position::new(10.0, 20.0),
            size: 20,
            depth: 8.0,
            radius: 3.0,
            chamber_type: ChamberType::Food,
        };
        assert!(c.contains(&Position::new(12.0, 21.0)));
        assert!(!c.contains(&Position::new(14.0, 20.0)));
        assert!(find_chamber(&[c.clone()], ChamberType::Food).is_some());
        assert!(find_chamber(&[c], ChamberType::Royal).is_none());
    }

    #[test]
    fn partial_record_gets_radius_from_size() {
        let mut c: Chamber =
            serde_json::from_str(r#"{"centroid":{"x":30.0,"y":30.0},"size":20}"#).unwrap();
        assert_eq!(c.radius, 0.0);
        c.repair();
        assert!((c.radius - radius_for(20)).abs() < 1e-12);
        assert_eq!(c.chamber_type, ChamberType::General);
    }

    #[test]
    fn type_serializes_lowercase() {
        let json = serde_json::to_string(&ChamberType::Midden).unwrap();
        assert_eq!(json, "\"midden\"");
    }
}
