#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Jungle Escape simulation kernel.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! adapters react to deterministically. Level layouts travel between the
//! generator and the world as immutable [`Grid`] values.

mod grid;
mod tuning;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{CellTag, Grid, GridError};
pub use tuning::{Tuning, TuningError};

/// Title shown by hosts when the experience boots.
pub const GAME_TITLE: &str = "Jungle Escape";

/// Coarse state of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayState {
    /// The player is in control and the simulation advances every tick.
    Playing,
    /// The player died; the simulation is frozen until a reset.
    GameOver,
    /// The player unlocked the door; the simulation is frozen until a reset.
    Won,
}

impl PlayState {
    /// Reports whether the state suppresses further simulation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces every entity with a fresh instantiation of the provided grid.
    LoadLevel {
        /// Layout the world should materialise.
        grid: Grid,
    },
    /// Advances the player and then every enemy by a single fixed step.
    Tick {
        /// Input sampled by the host for this tick.
        input: InputSnapshot,
    },
}

/// Events broadcast by the world and the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the world was rebuilt from a grid.
    LevelLoaded {
        /// Number of columns in the loaded grid.
        columns: u32,
        /// Number of rows in the loaded grid.
        rows: u32,
    },
    /// Reports that a level could not be instantiated; the previous world is kept.
    LevelRejected {
        /// Specific reason the grid was refused.
        reason: LevelError,
    },
    /// Indicates that the simulation advanced by one tick.
    TimeAdvanced {
        /// Number of ticks simulated since the level was loaded.
        tick: u64,
    },
    /// Reports that the player consumed a pickup.
    ItemCollected {
        /// Identifier of the removed item.
        item: EntityId,
        /// Kind of item that was consumed.
        kind: ItemKind,
        /// Running gem total after the pickup.
        gems_collected: u32,
    },
    /// Reports that the player died during the tick.
    PlayerDied {
        /// What killed the player.
        cause: DeathCause,
    },
    /// Reports that the player reached the door while holding the key.
    PlayerWon {
        /// Gems collected over the run.
        gems_collected: u32,
    },
    /// Announces that the session entered a new coarse state.
    PlayStateChanged {
        /// State that became active.
        state: PlayState,
    },
    /// Requests an audio collaborator to react.
    Audio {
        /// Cue that should be played or stopped.
        cue: AudioCue,
    },
}

/// Reasons a grid cannot be turned into a world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum LevelError {
    /// The grid contains no player start cell.
    #[error("grid has no player start")]
    MissingPlayerStart,
    /// The grid contains more than one player start cell.
    #[error("grid has {count} player starts, expected exactly one")]
    MultiplePlayerStarts {
        /// Number of player start cells found.
        count: usize,
    },
}

/// Cues forwarded to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Start the background music.
    MusicStart {
        /// Whether the track should loop indefinitely.
        looped: bool,
    },
    /// Stop the background music.
    MusicStop,
}

/// Host-level commands that are only honoured while the session is not playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostCommand {
    /// Rebuild the current level from its retained grid.
    Retry,
    /// Generate a brand new level.
    NewLevel,
    /// Leave the game.
    Quit,
}

/// Reasons the player may die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The player touched a patrolling enemy.
    Enemy,
    /// The player fell below the bottom of the visible world.
    FellOutOfWorld,
}

/// Consumable pickups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Collectible gem that increments the score.
    Gem,
    /// Key that unlocks the door.
    Key,
}

/// Type tag of a static object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaticKind {
    /// Solid tile that blocks movement.
    Wall,
    /// Collectible gem.
    Gem,
    /// Door key.
    Key,
    /// Locked exit door.
    Door,
}

/// Input sampled once per tick by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputSnapshot {
    /// Whether the move-left control is held.
    pub move_left: bool,
    /// Whether the move-right control is held.
    pub move_right: bool,
    /// Whether the jump control is held.
    pub jump: bool,
}

impl InputSnapshot {
    /// Snapshot with nothing held.
    pub const IDLE: Self = Self {
        move_left: false,
        move_right: false,
        jump: false,
    };

    /// Resolves the horizontal axis; right wins when both directions are held.
    #[must_use]
    pub const fn horizontal(&self) -> Option<Facing> {
        if self.move_right {
            Some(Facing::Right)
        } else if self.move_left {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Horizontal orientation of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Looking toward decreasing x.
    Left,
    /// Looking toward increasing x.
    Right,
}

impl Facing {
    /// Unit sign of the direction along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Animation state derived from the player's velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Standing still.
    Idle,
    /// Moving horizontally on the ground.
    Run,
    /// Moving vertically.
    Jump,
}

impl AnimationState {
    /// Derives the state from a velocity: vertical motion wins over horizontal.
    #[must_use]
    pub fn from_velocity(velocity_x: f32, velocity_y: f32) -> Self {
        if velocity_y != 0.0 {
            Self::Jump
        } else if velocity_x != 0.0 {
            Self::Run
        } else {
            Self::Idle
        }
    }

    /// Number of frames in the state's animation strip.
    #[must_use]
    pub const fn frame_count(self) -> u32 {
        match self {
            Self::Idle | Self::Jump => 1,
            Self::Run => 2,
        }
    }
}

/// Stable handle assigned to every entity in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space position of the cell's upper-left corner.
    #[must_use]
    pub fn world_origin(&self, tile_size: f32) -> (f32, f32) {
        (
            self.column as f32 * tile_size,
            self.row as f32 * tile_size,
        )
    }
}

/// Axis-aligned rectangle expressed in world pixels with y growing downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl WorldRect {
    /// Constructs a rectangle from its upper-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal position of the left edge.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical position of the top edge.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Reports whether the interiors of two rectangles intersect.
    ///
    /// Rectangles that merely share an edge do not overlap, so a body resting
    /// on a floor tile is not considered to collide with it.
    #[must_use]
    pub fn overlaps(&self, other: &WorldRect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Returns the rectangle shifted by the provided offsets.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Moves the rectangle horizontally by `dx`.
    pub fn shift_x(&mut self, dx: f32) {
        self.x += dx;
    }

    /// Moves the rectangle vertically by `dy`.
    pub fn shift_y(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Moves the rectangle so its left edge sits at `edge`.
    pub fn set_left(&mut self, edge: f32) {
        self.x = edge;
    }

    /// Moves the rectangle so its right edge sits at `edge`.
    pub fn set_right(&mut self, edge: f32) {
        self.x = edge - self.width;
    }

    /// Moves the rectangle so its top edge sits at `edge`.
    pub fn set_top(&mut self, edge: f32) {
        self.y = edge;
    }

    /// Moves the rectangle so its bottom edge sits at `edge`.
    pub fn set_bottom(&mut self, edge: f32) {
        self.y = edge - self.height;
    }
}
