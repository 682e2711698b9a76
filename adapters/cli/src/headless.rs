use anyhow::Result;
use jungle_escape_core::{HostCommand, InputSnapshot};
use jungle_escape_rendering::{
    FrameControl, FrameInput, Presentation, RenderFrame, RenderingBackend,
};
use log::{debug, info};

/// Controls fed to the session on every playing frame: run right and jump
/// whenever the player is grounded.
const AUTOPILOT: InputSnapshot = InputSnapshot {
    move_left: false,
    move_right: true,
    jump: true,
};

/// Backend that runs without a window, steering the player with a fixed autopilot.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    max_frames: u64,
    retries_left: u32,
}

/// What the backend observed before it stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) levels_finished: u32,
    pub(crate) sprites_drawn: u64,
}

impl HeadlessBackend {
    pub(crate) fn new(max_frames: u64, retries: u32) -> Self {
        Self {
            max_frames,
            retries_left: retries,
        }
    }

    /// Picks the input for the next frame from what the last frame showed.
    fn sample_input(&mut self, frame: &RenderFrame) -> FrameInput {
        if frame.overlay.is_none() {
            return FrameInput {
                controls: AUTOPILOT,
                host_command: None,
            };
        }

        let command = if self.retries_left > 0 {
            self.retries_left -= 1;
            HostCommand::NewLevel
        } else {
            HostCommand::Quit
        };
        FrameInput {
            controls: InputSnapshot::IDLE,
            host_command: Some(command),
        }
    }

    pub(crate) fn run_with_summary<F>(
        mut self,
        presentation: &Presentation,
        mut update_frame: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(FrameInput, &mut RenderFrame) -> Result<FrameControl>,
    {
        info!(
            "running {} headless at {}x{}",
            presentation.window_title, presentation.viewport.x, presentation.viewport.y
        );

        let mut frame = RenderFrame::default();
        let mut summary = RunSummary::default();
        while summary.frames < self.max_frames {
            let input = self.sample_input(&frame);
            let was_finished = frame.overlay.is_some();
            if update_frame(input, &mut frame)? == FrameControl::Exit {
                break;
            }

            summary.frames += 1;
            summary.sprites_drawn += frame.sprites.len() as u64;
            if frame.overlay.is_some() && !was_finished {
                summary.levels_finished += 1;
                debug!("frame {}: level finished", summary.frames);
            }
        }

        Ok(summary)
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, update_frame: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut RenderFrame) -> Result<FrameControl>,
    {
        let summary = self.run_with_summary(&presentation, update_frame)?;
        info!(
            "presented {} frames ({} sprites), {} levels finished",
            summary.frames, summary.sprites_drawn, summary.levels_finished
        );
        Ok(())
    }
}
