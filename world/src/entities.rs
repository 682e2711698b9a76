//! Entities materialised from a grid.

use jungle_escape_core::{
    AnimationState, CellTag, EntityId, Facing, InputSnapshot, StaticKind, Tuning, WorldRect,
};

/// Capability shared by everything that occupies space in the world.
pub trait Body {
    /// Stable handle of the entity.
    fn id(&self) -> EntityId;

    /// Bounding box in world pixels.
    fn bounds(&self) -> WorldRect;
}

/// The player-controlled character.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    id: EntityId,
    pub(crate) bounds: WorldRect,
    pub(crate) velocity_x: f32,
    pub(crate) velocity_y: f32,
    facing: Facing,
    animation: AnimationState,
    frame_cursor: f32,
    pub(crate) on_ground: bool,
    pub(crate) has_key: bool,
    pub(crate) gems_collected: u32,
    pub(crate) dead: bool,
    pub(crate) won: bool,
}

impl Player {
    pub(crate) fn spawn(id: EntityId, x: f32, y: f32, tuning: &Tuning) -> Self {
        Self {
            id,
            bounds: WorldRect::new(x, y, tuning.player_width, tuning.player_height),
            velocity_x: 0.0,
            velocity_y: 0.0,
            facing: Facing::Right,
            animation: AnimationState::Idle,
            frame_cursor: 0.0,
            on_ground: false,
            has_key: false,
            gems_collected: 0,
            dead: false,
            won: false,
        }
    }

    /// Horizontal velocity in pixels per tick.
    #[must_use]
    pub fn velocity_x(&self) -> f32 {
        self.velocity_x
    }

    /// Vertical velocity in pixels per tick; negative is upward.
    #[must_use]
    pub fn velocity_y(&self) -> f32 {
        self.velocity_y
    }

    /// Direction the player last moved in.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Animation state derived during the last update.
    #[must_use]
    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    /// Index of the frame to show within the current animation strip.
    #[must_use]
    pub fn animation_frame(&self) -> u32 {
        (self.frame_cursor as u32).min(self.animation.frame_count().saturating_sub(1))
    }

    /// Whether the player is standing on a wall.
    #[must_use]
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether the key has been picked up.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.has_key
    }

    /// Gems collected so far.
    #[must_use]
    pub fn gems_collected(&self) -> u32 {
        self.gems_collected
    }

    /// Whether the player died.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the player unlocked the door.
    #[must_use]
    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Dead or victorious players no longer update.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.dead || self.won
    }

    /// Sets velocities from the input snapshot.
    ///
    /// Horizontal speed is replaced outright; a jump only starts from the ground.
    pub(crate) fn apply_input(&mut self, input: InputSnapshot, tuning: &Tuning) {
        self.velocity_x = 0.0;
        if let Some(direction) = input.horizontal() {
            self.velocity_x = direction.sign() * tuning.player_move_speed;
            self.facing = direction;
        }

        if input.jump && self.on_ground {
            self.velocity_y = tuning.jump_speed;
            self.on_ground = false;
        }
    }

    pub(crate) fn animate(&mut self, tuning: &Tuning) {
        self.animation = AnimationState::from_velocity(self.velocity_x, self.velocity_y);
        self.frame_cursor += tuning.animation_speed;
        if self.frame_cursor >= self.animation.frame_count() as f32 {
            self.frame_cursor = 0.0;
        }
    }

    pub(crate) fn apply_gravity(&mut self, tuning: &Tuning) {
        self.velocity_y += tuning.gravity;
    }
}

impl Body for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> WorldRect {
        self.bounds
    }
}

/// Enemy walking back and forth within a horizontal interval.
#[derive(Clone, Debug, PartialEq)]
pub struct PatrollingEnemy {
    id: EntityId,
    bounds: WorldRect,
    speed: f32,
    min_x: f32,
    max_x: f32,
}

impl PatrollingEnemy {
    pub(crate) fn spawn(id: EntityId, x: f32, y: f32, tuning: &Tuning) -> Self {
        Self {
            id,
            bounds: WorldRect::new(x, y, tuning.enemy_width, tuning.enemy_height),
            speed: tuning.enemy_move_speed,
            min_x: x - tuning.patrol_reach_left,
            max_x: x + tuning.patrol_reach_right,
        }
    }

    /// Signed horizontal speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Patrol interval `[min_x, max_x]` in world pixels.
    #[must_use]
    pub fn patrol_bounds(&self) -> (f32, f32) {
        (self.min_x, self.max_x)
    }

    /// Steps horizontally and turns around once either edge leaves the patrol interval.
    pub(crate) fn update(&mut self) {
        self.bounds.shift_x(self.speed);
        if self.bounds.right() > self.max_x || self.bounds.left() < self.min_x {
            self.speed = -self.speed;
        }
    }
}

impl Body for PatrollingEnemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> WorldRect {
        self.bounds
    }
}

/// Wall, gem, key or door.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticObject {
    id: EntityId,
    bounds: WorldRect,
    kind: StaticKind,
    source: CellTag,
}

impl StaticObject {
    pub(crate) fn new(id: EntityId, bounds: WorldRect, kind: StaticKind, source: CellTag) -> Self {
        Self {
            id,
            bounds,
            kind,
            source,
        }
    }

    /// Type tag of the object.
    #[must_use]
    pub fn kind(&self) -> StaticKind {
        self.kind
    }

    /// Cell tag the object was instantiated from.
    #[must_use]
    pub fn source(&self) -> CellTag {
        self.source
    }
}

impl Body for StaticObject {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> WorldRect {
        self.bounds
    }
}

/// Borrowed view over any entity, used for ordered traversal.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    /// The player.
    Player(&'a Player),
    /// A patrolling enemy.
    Enemy(&'a PatrollingEnemy),
    /// A wall or item.
    Static(&'a StaticObject),
}

impl Body for EntityRef<'_> {
    fn id(&self) -> EntityId {
        match self {
            Self::Player(player) => player.id(),
            Self::Enemy(enemy) => enemy.id(),
            Self::Static(object) => object.id(),
        }
    }

    fn bounds(&self) -> WorldRect {
        match self {
            Self::Player(player) => player.bounds(),
            Self::Enemy(enemy) => enemy.bounds(),
            Self::Static(object) => object.bounds(),
        }
    }
}
