use std::collections::BTreeMap;

use townview_shared::{MapConfig, PlayerUpdate, Vec2};

use crate::colors::palette_css;

/// Longest gap extrapolated in one step, so a backgrounded tab does not
/// fling markers across the map when it resumes.
const MAX_STEP_MS: f64 = 250.0;

/// A player character on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMarker {
    pub name: Option<String>,
    pub color: String,
    pub position: Vec2,
    /// Town units per second.
    pub speed: Vec2,
}

/// Markers for every player the config declares.
#[derive(Debug, Clone, Default)]
pub struct Players {
    markers: BTreeMap<String, PlayerMarker>,
}

impl Players {
    pub fn from_config(config: &MapConfig) -> Self {
        let markers = config
            .players
            .iter()
            .enumerate()
            .map(|(index, (id, player))| {
                let color = player
                    .color
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| palette_css(index));
                (
                    id.clone(),
                    PlayerMarker {
                        name: player.name.clone(),
                        color,
                        position: player.spawn,
                        speed: Vec2::default(),
                    },
                )
            })
            .collect();
        Self { markers }
    }

    /// Apply a sync frame. Ids the config did not declare are skipped.
    /// Returns how many markers changed.
    pub fn apply_sync(&mut self, updates: &BTreeMap<String, PlayerUpdate>) -> usize {
        let mut applied = 0;
        for (id, update) in updates {
            let Some(marker) = self.markers.get_mut(id) else {
                continue;
            };
            if let Some(position) = update.position {
                marker.position = position;
            }
            if let Some(speed) = update.speed {
                marker.speed = speed;
            }
            applied += 1;
        }
        applied
    }

    /// Move every marker along its last known speed.
    pub fn advance(&mut self, elapsed_ms: f64) {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return;
        }
        let secs = elapsed_ms.min(MAX_STEP_MS) / 1000.0;
        for marker in self.markers.values_mut() {
            marker.position.x += marker.speed.x * secs;
            marker.position.y += marker.speed.y * secs;
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn get(&self, id: &str) -> Option<&PlayerMarker> {
        self.markers.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlayerMarker)> {
        self.markers.iter().map(|(id, marker)| (id.as_str(), marker))
    }
}
