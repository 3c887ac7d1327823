//! Presenter that reports visual and audio requests through `tracing`.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use dungeon_defence_core::SoundId;
use dungeon_defence_rendering::{Presenter, VisualHandle, VisualKind, VisualState};
use glam::Vec2;
use tracing::{debug, info, trace};

/// Headless presenter that keeps visuals in memory and logs every call.
#[derive(Debug, Default)]
pub(crate) struct TracingPresenter {
    next_handle: u32,
    visuals: BTreeMap<VisualHandle, (VisualKind, Vec2)>,
    sounds_played: usize,
}

impl TracingPresenter {
    /// Number of visuals currently alive.
    pub(crate) fn live_visuals(&self) -> usize {
        self.visuals.len()
    }

    /// Number of sound effects played so far.
    pub(crate) fn sounds_played(&self) -> usize {
        self.sounds_played
    }
}

impl Presenter for TracingPresenter {
    fn spawn_visual(&mut self, kind: VisualKind, position: Vec2) -> Result<VisualHandle> {
        let handle = VisualHandle::new(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        let _ = self.visuals.insert(handle, (kind, position));
        debug!(handle = handle.get(), ?kind, x = position.x, y = position.y, "spawn visual");
        Ok(handle)
    }

    fn set_visual_position(&mut self, handle: VisualHandle, position: Vec2) -> Result<()> {
        let Some((_, current)) = self.visuals.get_mut(&handle) else {
            bail!("visual {} does not exist", handle.get());
        };
        *current = position;
        trace!(handle = handle.get(), x = position.x, y = position.y, "move visual");
        Ok(())
    }

    fn set_visual_state(&mut self, handle: VisualHandle, state: VisualState) -> Result<()> {
        if !self.visuals.contains_key(&handle) {
            bail!("visual {} does not exist", handle.get());
        }
        debug!(handle = handle.get(), ?state, "visual state");
        Ok(())
    }

    fn destroy_visual(&mut self, handle: VisualHandle) -> Result<()> {
        if self.visuals.remove(&handle).is_none() {
            bail!("visual {} was already destroyed", handle.get());
        }
        debug!(handle = handle.get(), "destroy visual");
        Ok(())
    }

    fn play_sound(&mut self, sound: SoundId) -> Result<()> {
        self.sounds_played += 1;
        info!(?sound, "play sound");
        Ok(())
    }
}
