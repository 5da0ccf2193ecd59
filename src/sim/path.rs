//! Map layout: the enemy waypoint path and tower placement slots

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed polyline enemies walk along, first waypoint to last (the base)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub waypoints: Vec<Vec2>,
}

impl Path {
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    /// The classic single-lane map
    pub fn classic() -> Self {
        Self::new(vec![
            Vec2::new(0.0, 300.0),
            Vec2::new(200.0, 300.0),
            Vec2::new(200.0, 500.0),
            Vec2::new(500.0, 500.0),
            Vec2::new(500.0, 200.0),
            Vec2::new(800.0, 200.0),
            Vec2::new(1000.0, 400.0),
        ])
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Entry point enemies walk toward first
    pub fn start(&self) -> Vec2 {
        self.waypoints.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Unit direction of the first segment (used to place spawns before the path)
    pub fn entry_direction(&self) -> Vec2 {
        match (self.waypoints.first(), self.waypoints.get(1)) {
            (Some(a), Some(b)) => (*b - *a).normalize_or(Vec2::X),
            _ => Vec2::X,
        }
    }
}

/// Tower slots for the classic map
pub fn classic_slots() -> Vec<Vec2> {
    vec![
        Vec2::new(400.0, 400.0),
        Vec2::new(600.0, 300.0),
        Vec2::new(700.0, 500.0),
        Vec2::new(900.0, 250.0),
        Vec2::new(1000.0, 350.0),
    ]
}
