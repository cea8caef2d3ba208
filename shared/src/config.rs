use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A point or velocity in town coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Map configuration served by the API server at `/config`.
///
/// Fields the client does not understand are kept in `extra` rather than
/// rejected, so an older client keeps booting against a newer server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub town_width: f64,
    pub town_height: f64,
    /// Texture name -> file name under the static textures directory.
    pub textures: BTreeMap<String, String>,
    pub players: BTreeMap<String, PlayerConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            town_width: 1024.0,
            town_height: 1024.0,
            textures: BTreeMap::new(),
            players: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec2,
    pub color: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: MapConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.town_width, 1024.0);
        assert!(config.textures.is_empty());
        assert!(config.players.is_empty());
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let config: MapConfig = serde_json::from_str(
            r##"{
                "town_width": 300,
                "town_height": 200,
                "textures": { "town": "town-view.png" },
                "players": { "1": { "spawn": { "x": 4, "y": 5 }, "color": "#ff0" } },
                "goals": ["clean-air"]
            }"##,
        )
        .unwrap();

        assert_eq!(config.town_width, 300.0);
        assert_eq!(config.textures["town"], "town-view.png");
        assert_eq!(config.players["1"].spawn, Vec2::new(4.0, 5.0));
        assert_eq!(config.players["1"].color.as_deref(), Some("#ff0"));
        assert!(config.extra.contains_key("goals"));
    }
}
