#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Jungle Escape adapters.
//!
//! A [`RenderFrame`] is a backend-agnostic snapshot of a [`Session`]: the
//! visible sprites in draw order with their screen boxes, the HUD values and
//! the terminal overlay. Backends own windows, textures and input devices.

use anyhow::Result as AnyResult;
use glam::Vec2;
use jungle_escape_core::{
    AnimationState, CellTag, EntityId, Facing, HostCommand, InputSnapshot, PlayState, StaticKind,
    Tuning, WorldRect, GAME_TITLE,
};
use jungle_escape_system_simulation::Session;
use jungle_escape_world::{query, Body, EntityRef};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 255)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }
}

/// Palette shared by every backend.
pub mod palette {
    use super::Color;

    /// Clear color behind the level.
    pub const BACKGROUND: Color = Color::from_rgb_u8(40, 40, 60);
    /// Default text color.
    pub const TEXT: Color = Color::from_rgb_u8(255, 255, 255);
    /// Translucent veil drawn over a frozen level.
    pub const OVERLAY: Color = Color::from_rgba_u8(0, 0, 0, 200);
    /// Overlay subtitle color.
    pub const SUBTITLE: Color = Color::from_rgb_u8(200, 200, 200);
    /// Overlay options line and held-key indicator.
    pub const HIGHLIGHT: Color = Color::from_rgb_u8(255, 255, 0);
    /// Key indicator before the key is picked up.
    pub const INACTIVE: Color = Color::from_rgb_u8(150, 150, 150);
}

/// Image an entity is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Player frame for the given animation.
    Player {
        /// Active animation strip.
        animation: AnimationState,
        /// Frame within the strip.
        frame: u32,
    },
    /// Surface wall tile.
    Grass,
    /// Wall tile beneath a surface.
    Dirt,
    /// Collectible gem.
    Gem,
    /// Door key.
    Key,
    /// Two-tile locked door.
    Door,
    /// Patrolling enemy.
    Enemy,
}

impl SpriteKey {
    /// Source rectangle within the sprite sheet as `(origin, size)` in texels.
    #[must_use]
    pub fn atlas_region(self) -> (Vec2, Vec2) {
        let (x, y, width, height) = match self {
            Self::Player {
                animation: AnimationState::Idle,
                ..
            } => (0.0, 0.0, 96.0, 96.0),
            Self::Player {
                animation: AnimationState::Run,
                frame,
            } => (96.0 * (1 + frame.min(1)) as f32, 0.0, 96.0, 96.0),
            Self::Player {
                animation: AnimationState::Jump,
                ..
            } => (288.0, 0.0, 96.0, 96.0),
            Self::Grass => (64.0, 0.0, 64.0, 64.0),
            Self::Dirt => (64.0, 64.0, 64.0, 64.0),
            Self::Gem => (512.0, 192.0, 64.0, 64.0),
            Self::Key => (512.0, 256.0, 64.0, 64.0),
            Self::Door => (512.0, 320.0, 64.0, 128.0),
            Self::Enemy => (64.0, 320.0, 64.0, 64.0),
        };
        (Vec2::new(x, y), Vec2::new(width, height))
    }
}

/// Sprite to draw this frame, already translated into screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePlacement {
    /// Entity the sprite represents.
    pub entity: EntityId,
    /// Image to draw.
    pub sprite: SpriteKey,
    /// Top-left corner in screen pixels.
    pub position: Vec2,
    /// Destination size in screen pixels.
    pub size: Vec2,
    /// Whether the image should be mirrored horizontally.
    pub flip_horizontal: bool,
}

/// Always-visible counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    /// Gems collected in the current level.
    pub gems: u32,
    /// Whether the key is held.
    pub has_key: bool,
}

impl Hud {
    /// Text lines shown in the top-left corner.
    #[must_use]
    pub fn lines(&self) -> Vec<TextLine> {
        let key_color = if self.has_key {
            palette::HIGHLIGHT
        } else {
            palette::INACTIVE
        };
        vec![
            TextLine::new(
                format!("Gems: {}", self.gems),
                Vec2::new(20.0, 20.0),
                TextAnchor::TopLeft,
                palette::TEXT,
            ),
            TextLine::new(
                "KEY",
                Vec2::new(20.0, 70.0),
                TextAnchor::TopLeft,
                key_color,
            ),
        ]
    }
}

/// Screen shown once a level ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    /// Headline naming the outcome.
    pub title: String,
    /// Secondary line.
    pub subtitle: String,
    /// Host controls available in the terminal state.
    pub options: String,
}

impl Overlay {
    /// Builds the overlay for `state`, or `None` while playing.
    #[must_use]
    pub fn for_state(state: PlayState, gems: u32) -> Option<Self> {
        let (title, subtitle) = match state {
            PlayState::Playing => return None,
            PlayState::GameOver => ("YOU DIED", "Try Again?".to_owned()),
            PlayState::Won => ("VICTORY!", format!("Gems: {gems}")),
        };
        Some(Self {
            title: title.to_owned(),
            subtitle,
            options: "[R]etry  [N]ew Level  [Q]uit".to_owned(),
        })
    }

    /// Text lines centred horizontally within a viewport of `viewport` pixels.
    #[must_use]
    pub fn lines(&self, viewport: Vec2) -> Vec<TextLine> {
        let center = (viewport / 2.0).floor();
        vec![
            TextLine::new(
                self.title.clone(),
                center - Vec2::new(0.0, 60.0),
                TextAnchor::Center,
                palette::TEXT,
            ),
            TextLine::new(
                self.subtitle.clone(),
                center,
                TextAnchor::Center,
                palette::SUBTITLE,
            ),
            TextLine::new(
                self.options.clone(),
                center + Vec2::new(0.0, 80.0),
                TextAnchor::Center,
                palette::HIGHLIGHT,
            ),
        ]
    }
}

/// How a text line is positioned relative to its anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// The anchor is the top-left corner of the text.
    TopLeft,
    /// The anchor is the centre of the text.
    Center,
}

/// Line of text to draw in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Content to render.
    pub text: String,
    /// Anchor point in screen pixels.
    pub position: Vec2,
    /// Interpretation of `position`.
    pub anchor: TextAnchor,
    /// Fill color.
    pub color: Color,
}

impl TextLine {
    /// Creates a text line.
    #[must_use]
    pub fn new<T>(text: T, position: Vec2, anchor: TextAnchor, color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            position,
            anchor,
            color,
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    /// Visible sprites in draw order.
    pub sprites: Vec<SpritePlacement>,
    /// Counters drawn on top of the level.
    pub hud: Hud,
    /// Terminal-state overlay, if any.
    pub overlay: Option<Overlay>,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl RenderFrame {
    /// Captures the session as seen through its camera.
    ///
    /// Sprites keep grid scan order and anything outside the viewport is culled.
    #[must_use]
    pub fn capture(session: &Session) -> Self {
        let world = session.world();
        let camera = session.camera();
        let tuning = session.tuning();
        let screen = WorldRect::new(0.0, 0.0, tuning.viewport_width, tuning.viewport_height);

        let sprites = query::entities(world)
            .into_iter()
            .filter_map(|entity| {
                let bounds = camera.apply(entity.bounds());
                if !screen.overlaps(&bounds) {
                    return None;
                }
                let (sprite, flip_horizontal) = sprite_for(entity);
                Some(SpritePlacement {
                    entity: entity.id(),
                    sprite,
                    position: Vec2::new(bounds.x(), bounds.y()),
                    size: Vec2::new(bounds.width(), bounds.height()),
                    flip_horizontal,
                })
            })
            .collect();

        let player = query::player(world);
        Self {
            sprites,
            hud: Hud {
                gems: player.gems_collected(),
                has_key: player.has_key(),
            },
            overlay: Overlay::for_state(session.state(), player.gems_collected()),
            viewport: viewport(tuning),
        }
    }

    /// HUD and overlay text in draw order.
    #[must_use]
    pub fn text(&self) -> Vec<TextLine> {
        let mut lines = self.hud.lines();
        if let Some(overlay) = &self.overlay {
            lines.extend(overlay.lines(self.viewport));
        }
        lines
    }
}

fn sprite_for(entity: EntityRef<'_>) -> (SpriteKey, bool) {
    match entity {
        EntityRef::Player(player) => (
            SpriteKey::Player {
                animation: player.animation(),
                frame: player.animation_frame(),
            },
            player.facing() == Facing::Left,
        ),
        EntityRef::Enemy(_) => (SpriteKey::Enemy, false),
        EntityRef::Static(object) => {
            let sprite = match object.kind() {
                StaticKind::Wall if object.source() == CellTag::Dirt => SpriteKey::Dirt,
                StaticKind::Wall => SpriteKey::Grass,
                StaticKind::Gem => SpriteKey::Gem,
                StaticKind::Key => SpriteKey::Key,
                StaticKind::Door => SpriteKey::Door,
            };
            (sprite, false)
        }
    }
}

fn viewport(tuning: &Tuning) -> Vec2 {
    Vec2::new(tuning.viewport_width, tuning.viewport_height)
}

/// Input gathered by a backend for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Movement controls held during the frame.
    pub controls: InputSnapshot,
    /// Host command requested during the frame, if any.
    pub host_command: Option<HostCommand>,
}

/// Whether a backend should keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present the next frame.
    Continue,
    /// Stop the backend.
    Exit,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, viewport: Vec2) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            viewport,
        }
    }

    /// Default presentation for a session configured with `tuning`.
    #[must_use]
    pub fn for_tuning(tuning: &Tuning) -> Self {
        Self::new(GAME_TITLE, palette::BACKGROUND, viewport(tuning))
    }
}

/// Rendering backend capable of presenting Jungle Escape frames.
pub trait RenderingBackend {
    /// Runs the backend until `update_frame` asks it to exit.
    ///
    /// Each iteration the backend samples input, hands it to `update_frame`,
    /// which advances the simulation and refreshes the frame, then draws the
    /// result.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut RenderFrame) -> AnyResult<FrameControl>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_texts_follow_state() {
        assert_eq!(Overlay::for_state(PlayState::Playing, 3), None);

        let died = Overlay::for_state(PlayState::GameOver, 3).expect("overlay");
        assert_eq!(died.title, "YOU DIED");
        assert_eq!(died.subtitle, "Try Again?");

        let won = Overlay::for_state(PlayState::Won, 3).expect("overlay");
        assert_eq!(won.title, "VICTORY!");
        assert_eq!(won.subtitle, "Gems: 3");
        assert_eq!(won.options, "[R]etry  [N]ew Level  [Q]uit");
    }

    #[test]
    fn overlay_lines_are_centred() {
        let overlay = Overlay::for_state(PlayState::Won, 0).expect("overlay");
        let lines = overlay.lines(Vec2::new(960.0, 704.0));

        let positions: Vec<Vec2> = lines.iter().map(|line| line.position).collect();
        assert_eq!(
            positions,
            vec![
                Vec2::new(480.0, 292.0),
                Vec2::new(480.0, 352.0),
                Vec2::new(480.0, 432.0)
            ]
        );
    }

    #[test]
    fn hud_key_indicator_lights_up() {
        let without = Hud {
            gems: 2,
            has_key: false,
        };
        let with = Hud {
            gems: 2,
            has_key: true,
        };

        assert_eq!(without.lines()[0].text, "Gems: 2");
        assert_eq!(without.lines()[1].color, palette::INACTIVE);
        assert_eq!(with.lines()[1].color, palette::HIGHLIGHT);
    }

    #[test]
    fn run_frames_map_to_sheet_columns() {
        let first = SpriteKey::Player {
            animation: AnimationState::Run,
            frame: 0,
        };
        let second = SpriteKey::Player {
            animation: AnimationState::Run,
            frame: 1,
        };

        assert_eq!(first.atlas_region().0, Vec2::new(96.0, 0.0));
        assert_eq!(second.atlas_region().0, Vec2::new(192.0, 0.0));
        assert_eq!(SpriteKey::Door.atlas_region().1, Vec2::new(64.0, 128.0));
    }
}
