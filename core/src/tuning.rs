use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physics, layout and presentation constants for a play session.
///
/// A single immutable value is threaded through level generation, world
/// instantiation and the session loop. Every field has a default so partial
/// configuration files only need to name what they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Width of the visible viewport in pixels.
    pub viewport_width: f32,
    /// Height of the visible viewport in pixels.
    pub viewport_height: f32,
    /// Side length of a square tile in pixels.
    pub tile_size: f32,
    /// Number of columns in generated levels.
    pub level_columns: u32,
    /// Number of rows in generated levels.
    pub level_rows: u32,
    /// Downward acceleration added to the player's vertical speed every tick.
    pub gravity: f32,
    /// Vertical speed applied when a jump starts; negative is upward.
    pub jump_speed: f32,
    /// Horizontal speed while a movement key is held.
    pub player_move_speed: f32,
    /// Horizontal speed of patrolling enemies.
    pub enemy_move_speed: f32,
    /// Animation frames advanced per tick.
    pub animation_speed: f32,
    /// Width of the player's bounding box.
    pub player_width: f32,
    /// Height of the player's bounding box.
    pub player_height: f32,
    /// Width of an enemy's bounding box.
    pub enemy_width: f32,
    /// Height of an enemy's bounding box.
    pub enemy_height: f32,
    /// Distance below the viewport bottom at which the player counts as fallen.
    pub fall_margin: f32,
    /// How far left of its spawn an enemy may patrol.
    pub patrol_reach_left: f32,
    /// How far right of its spawn an enemy may patrol.
    pub patrol_reach_right: f32,
    /// Fraction of the remaining distance the camera closes per tick.
    pub camera_smoothing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: 960.0,
            viewport_height: 704.0,
            tile_size: 64.0,
            level_columns: 80,
            level_rows: 12,
            gravity: 0.8,
            jump_speed: -22.0,
            player_move_speed: 7.0,
            enemy_move_speed: 2.0,
            animation_speed: 0.15,
            player_width: 64.0,
            player_height: 64.0,
            enemy_width: 64.0,
            enemy_height: 64.0,
            fall_margin: 100.0,
            patrol_reach_left: 64.0,
            patrol_reach_right: 128.0,
            camera_smoothing: 0.08,
        }
    }
}

/// Reasons a [`Tuning`] value is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    /// A size or speed that must be strictly positive was not.
    #[error("`{field}` must be positive (received {value})")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The camera smoothing factor fell outside `(0, 1]`.
    #[error("`camera_smoothing` must lie in (0, 1] (received {0})")]
    Smoothing(f32),
}

impl Tuning {
    /// Checks that every size is positive and the smoothing factor is usable.
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("tile_size", self.tile_size),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
            ("player_move_speed", self.player_move_speed),
            ("gravity", self.gravity),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(TuningError::Smoothing(self.camera_smoothing));
        }
        Ok(())
    }
}
