use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{ensure, Context, Result as AnyResult};
use biocrowds_rendering::{FrameInput, Presentation, RenderFrame, RenderingBackend};
use tracing::{debug, info};

/// Backend that drives a fixed number of frames without a window.
///
/// Input is replayed from a script keyed by frame number. When a snapshot
/// path is set, the debug field of the last frame is written there as a PPM.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    frames: u64,
    script: BTreeMap<u64, FrameInput>,
    snapshot_path: Option<PathBuf>,
}

impl HeadlessBackend {
    pub(crate) fn new(frames: u64, script: BTreeMap<u64, FrameInput>) -> Self {
        Self {
            frames,
            script,
            snapshot_path: None,
        }
    }

    pub(crate) fn with_snapshot(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut RenderFrame) -> AnyResult<()>,
    {
        info!(
            title = %presentation.window_title,
            width = presentation.floor.width(),
            height = presentation.floor.height(),
            clear_color = ?presentation.clear_color,
            frames = self.frames,
            debug_view = ?presentation.debug_view,
            "headless presentation started"
        );

        let mut frame = RenderFrame::default();
        for index in 0..self.frames {
            let input = self.script.get(&index).copied().unwrap_or_default();
            update_frame(input, &mut frame)
                .with_context(|| format!("failed to update frame {index}"))?;
            debug!(frame = index, tick = frame.tick, "frame presented");
        }

        let Some(path) = self.snapshot_path else {
            return Ok(());
        };
        let image = frame
            .field
            .as_ref()
            .context("no debug field was rendered; run at least one un-paused tick")?;
        ensure!(
            image.floor() == presentation.floor,
            "debug field covers {}x{} pixels but the floor is {}x{}",
            image.floor().width(),
            image.floor().height(),
            presentation.floor.width(),
            presentation.floor.height()
        );
        fs::write(&path, image.to_ppm())
            .with_context(|| format!("failed to write field snapshot to {}", path.display()))?;
        info!(path = %path.display(), "field snapshot written");
        Ok(())
    }
}
