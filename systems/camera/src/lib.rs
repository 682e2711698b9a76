#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Smoothed follow camera that keeps the viewport inside the world.
//!
//! The camera stores a translation offset rather than a position: adding the
//! offset to a world-space box yields its screen-space box. Offsets are
//! therefore non-positive once the camera has scrolled right or down.

use jungle_escape_core::{Tuning, WorldRect};

/// Follows a target box with exponential smoothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    world_width: f32,
    world_height: f32,
    viewport_width: f32,
    viewport_height: f32,
    smoothing: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Camera {
    /// Creates a camera at offset zero, showing the world's top-left corner.
    #[must_use]
    pub fn new(
        world_width: f32,
        world_height: f32,
        viewport_width: f32,
        viewport_height: f32,
        smoothing: f32,
    ) -> Self {
        Self {
            world_width,
            world_height,
            viewport_width,
            viewport_height,
            smoothing,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Creates a camera sized for a `columns` × `rows` level under `tuning`.
    #[must_use]
    pub fn from_tuning(columns: u32, rows: u32, tuning: &Tuning) -> Self {
        Self::new(
            columns as f32 * tuning.tile_size,
            rows as f32 * tuning.tile_size,
            tuning.viewport_width,
            tuning.viewport_height,
            tuning.camera_smoothing,
        )
    }

    /// Moves one smoothing step toward the clamped offset that centres `target`.
    pub fn update(&mut self, target: WorldRect) {
        let target_x = clamp_axis(
            -target.x() + (self.viewport_width / 2.0).floor(),
            self.world_width,
            self.viewport_width,
        );
        let target_y = clamp_axis(
            -target.y() + (self.viewport_height / 2.0).floor(),
            self.world_height,
            self.viewport_height,
        );

        self.offset_x += (target_x - self.offset_x) * self.smoothing;
        self.offset_y += (target_y - self.offset_y) * self.smoothing;
    }

    /// Returns the camera to its initial offset.
    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }

    /// Sub-pixel translation accumulated by smoothing.
    #[must_use]
    pub fn smoothed_offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    /// Whole-pixel translation applied to world boxes, truncated toward zero.
    #[must_use]
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x as i32, self.offset_y as i32)
    }

    /// Maps a world-space box to screen space.
    #[must_use]
    pub fn apply(&self, rect: WorldRect) -> WorldRect {
        let (dx, dy) = self.offset();
        rect.translated(dx as f32, dy as f32)
    }

    /// Portion of the world currently covered by the viewport.
    #[must_use]
    pub fn visible_region(&self) -> WorldRect {
        let (dx, dy) = self.offset();
        WorldRect::new(
            -dx as f32,
            -dy as f32,
            self.viewport_width,
            self.viewport_height,
        )
    }

    /// Whether any part of `rect` falls inside the viewport.
    #[must_use]
    pub fn is_visible(&self, rect: WorldRect) -> bool {
        self.visible_region().overlaps(&rect)
    }
}

/// Clamps a target offset to `[-(world - viewport), 0]`; worlds narrower than
/// the viewport stay pinned at zero.
fn clamp_axis(target: f32, world: f32, viewport: f32) -> f32 {
    let lowest = -(world - viewport);
    target.max(lowest).min(0.0)
}
