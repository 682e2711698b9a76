#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-tick play session driving the world through its lifecycle.
//!
//! A [`Session`] owns the retained level grid, the world built from it and the
//! follow camera. It advances the world only while [`PlayState::Playing`] and
//! latches into a terminal state when the player dies or wins. Terminal states
//! accept [`HostCommand`]s to reload the same layout, generate a new one or quit.

use jungle_escape_core::{
    AudioCue, Command, Event, Grid, HostCommand, InputSnapshot, LevelError, PlayState, Tuning,
    TuningError,
};
use jungle_escape_system_camera::Camera;
use jungle_escape_system_level_generation::{GenerationError, LevelGenerator};
use jungle_escape_world::{self as world, query, Body, World};
use log::info;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Failures raised while starting or resetting a session.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The supplied tuning is unusable.
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
    /// The level generator refused the configured size.
    #[error("level generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// A generated layout could not be instantiated.
    #[error("level could not be loaded: {0}")]
    Level(#[from] LevelError),
}

/// Result of executing a host command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command reset the session back to playing.
    Applied,
    /// The command is only honoured in a terminal state.
    Ignored,
    /// The host should shut down.
    Quit,
}

/// One play-through of generated levels.
#[derive(Clone, Debug)]
pub struct Session {
    tuning: Tuning,
    generator: LevelGenerator,
    seeds: ChaCha8Rng,
    level_seed: u64,
    grid: Grid,
    world: World,
    camera: Camera,
    state: PlayState,
}

impl Session {
    /// Validates `tuning`, generates the first level from `seed` and starts playing.
    ///
    /// The first level is generated from `seed` itself; later levels draw their
    /// seeds from a stream seeded by it.
    pub fn start(
        tuning: Tuning,
        seed: u64,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, SessionError> {
        tuning.validate()?;
        let level = LevelGenerator::from_tuning(&tuning)?.generate(seed)?;
        Self::with_grid(tuning, level.grid, seed, out_events)
    }

    /// Starts playing a prepared layout.
    ///
    /// `seed` still drives the layouts produced by later `NewLevel` commands.
    pub fn with_grid(
        tuning: Tuning,
        grid: Grid,
        seed: u64,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, SessionError> {
        tuning.validate()?;
        let generator = LevelGenerator::from_tuning(&tuning)?;
        let world = World::build(&grid, &tuning)?;
        let camera = Camera::from_tuning(grid.columns(), grid.rows(), &tuning);

        out_events.push(Event::LevelLoaded {
            columns: grid.columns(),
            rows: grid.rows(),
        });
        info!(
            "session started with level seed {seed:#x} ({}x{})",
            grid.columns(),
            grid.rows()
        );

        let mut session = Self {
            tuning,
            generator,
            seeds: ChaCha8Rng::seed_from_u64(seed),
            level_seed: seed,
            grid,
            world,
            camera,
            state: PlayState::Playing,
        };
        session.resume(out_events);
        Ok(session)
    }

    /// Advances one fixed step while playing; terminal states ignore ticks.
    pub fn tick(&mut self, input: InputSnapshot, out_events: &mut Vec<Event>) {
        if self.state != PlayState::Playing {
            return;
        }

        world::apply(&mut self.world, Command::Tick { input }, out_events);
        let player = query::player(&self.world);
        self.camera.update(player.bounds());

        let outcome = if player.is_dead() {
            Some(PlayState::GameOver)
        } else if player.has_won() {
            Some(PlayState::Won)
        } else {
            None
        };
        if let Some(state) = outcome {
            self.finish(state, out_events);
        }
    }

    /// Executes a host command.
    ///
    /// `Retry` rebuilds the world from the retained grid, `NewLevel` generates
    /// a fresh one and `Quit` asks the host to shut down. All three are ignored
    /// while playing; backends close their window through their own exit path.
    pub fn execute(
        &mut self,
        command: HostCommand,
        out_events: &mut Vec<Event>,
    ) -> Result<CommandOutcome, SessionError> {
        match command {
            _ if self.state == PlayState::Playing => return Ok(CommandOutcome::Ignored),
            HostCommand::Quit => return Ok(CommandOutcome::Quit),
            HostCommand::Retry => {
                info!("retrying level seed {:#x}", self.level_seed);
                self.load(self.grid.clone(), out_events)?;
            }
            HostCommand::NewLevel => {
                let seed = self.seeds.next_u64();
                let level = self.generator.generate(seed)?;
                info!("generating new level from seed {seed:#x}");
                self.load(level.grid, out_events)?;
                self.level_seed = seed;
            }
        }

        self.resume(out_events);
        Ok(CommandOutcome::Applied)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// World being simulated.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Follow camera for the current level.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Layout retained for retries.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Seed the current layout was generated from.
    #[must_use]
    pub fn level_seed(&self) -> u64 {
        self.level_seed
    }

    /// Tuning shared by generation, physics and the camera.
    #[must_use]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    fn load(&mut self, grid: Grid, out_events: &mut Vec<Event>) -> Result<(), SessionError> {
        let first = out_events.len();
        world::apply(
            &mut self.world,
            Command::LoadLevel { grid: grid.clone() },
            out_events,
        );
        let rejected = out_events[first..].iter().find_map(|event| match event {
            Event::LevelRejected { reason } => Some(*reason),
            _ => None,
        });
        if let Some(reason) = rejected {
            return Err(SessionError::Level(reason));
        }

        self.camera = Camera::from_tuning(grid.columns(), grid.rows(), &self.tuning);
        self.grid = grid;
        Ok(())
    }

    fn resume(&mut self, out_events: &mut Vec<Event>) {
        self.state = PlayState::Playing;
        out_events.push(Event::PlayStateChanged {
            state: PlayState::Playing,
        });
        out_events.push(Event::Audio {
            cue: AudioCue::MusicStart { looped: true },
        });
    }

    fn finish(&mut self, state: PlayState, out_events: &mut Vec<Event>) {
        self.state = state;
        info!(
            "level ended in {state:?} after {} ticks with {} gems",
            query::tick_index(&self.world),
            query::player(&self.world).gems_collected()
        );
        out_events.push(Event::PlayStateChanged { state });
        out_events.push(Event::Audio {
            cue: AudioCue::MusicStop,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_announces_level_state_and_music() {
        let mut events = Vec::new();
        let session = Session::start(Tuning::default(), 5, &mut events).expect("session starts");

        assert_eq!(session.state(), PlayState::Playing);
        assert_eq!(session.level_seed(), 5);
        assert_eq!(
            events,
            vec![
                Event::LevelLoaded {
                    columns: 80,
                    rows: 12
                },
                Event::PlayStateChanged {
                    state: PlayState::Playing
                },
                Event::Audio {
                    cue: AudioCue::MusicStart { looped: true }
                },
            ]
        );
    }

    #[test]
    fn start_rejects_invalid_configuration() {
        let mut events = Vec::new();
        let tiny = Tuning {
            level_columns: 20,
            ..Tuning::default()
        };
        assert_eq!(
            Session::start(tiny, 1, &mut events).unwrap_err(),
            SessionError::Generation(GenerationError::GridTooSmall {
                columns: 20,
                rows: 12
            })
        );

        let huge = Tuning {
            level_columns: u32::MAX,
            ..Tuning::default()
        };
        assert!(matches!(
            Session::start(huge, 1, &mut events),
            Err(SessionError::Generation(GenerationError::GridTooLarge { .. }))
        ));

        let frozen_camera = Tuning {
            camera_smoothing: 0.0,
            ..Tuning::default()
        };
        assert!(matches!(
            Session::start(frozen_camera, 1, &mut events),
            Err(SessionError::Tuning(_))
        ));
        assert!(events.is_empty());
    }

    #[test]
    fn host_commands_are_ignored_while_playing() {
        let mut events = Vec::new();
        let mut session = Session::start(Tuning::default(), 5, &mut events).expect("session starts");
        events.clear();

        for command in [HostCommand::Retry, HostCommand::NewLevel, HostCommand::Quit] {
            assert_eq!(
                session.execute(command, &mut events),
                Ok(CommandOutcome::Ignored)
            );
        }
        assert!(events.is_empty());
        assert_eq!(session.state(), PlayState::Playing);
        assert_eq!(session.level_seed(), 5);
    }
}
