//! Framed save-file container.
//!
//! A [`SaveFile`] holds every player's ordered Xfer payload plus enough
//! header to validate compatibility on load. The container framing is
//! bincode; the payloads themselves stay opaque bytes produced and consumed
//! by [`crate::player::PlayerState::xfer_snapshot`], so the canonical
//! per-player schema never depends on the framing format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StateError};
use crate::player::{PlayerState, XferContext};
use crate::xfer::Xfer;

/// Save container format version for compatibility.
pub const SAVE_CONTAINER_VERSION: u32 = 1;

/// A framed collection of per-player snapshot payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    /// Container format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Logic frame the save was taken at.
    pub frame: u32,
    /// One Xfer payload per player, in player-index order.
    pub player_payloads: Vec<Vec<u8>>,
}

impl SaveFile {
    /// Create an empty container for a scenario.
    #[must_use]
    pub fn new(scenario_id: impl Into<String>, frame: u32) -> Self {
        Self {
            version: SAVE_CONTAINER_VERSION,
            scenario_id: scenario_id.into(),
            frame,
            player_payloads: Vec::new(),
        }
    }

    /// Snapshot a player and append its payload.
    ///
    /// Players must be appended in player-index order.
    pub fn add_player(&mut self, player: &mut PlayerState, ctx: &XferContext<'_>) -> Result<()> {
        let mut xfer = Xfer::saver();
        player.xfer_snapshot(&mut xfer, ctx)?;
        self.player_payloads.push(xfer.into_bytes());
        Ok(())
    }

    /// Restore one player from its payload.
    ///
    /// The player should be freshly initialized; the payload drives it to
    /// the saved state.
    pub fn restore_player(
        &self,
        slot: usize,
        player: &mut PlayerState,
        ctx: &XferContext<'_>,
    ) -> Result<()> {
        let payload = self.player_payloads.get(slot).ok_or_else(|| {
            StateError::InvalidContainer(format!("no payload for player slot {slot}"))
        })?;
        let mut xfer = Xfer::loader(payload.clone());
        player.xfer_snapshot(&mut xfer, ctx)
    }

    /// Number of player payloads in the container.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_payloads.len()
    }

    /// Save the container to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self).map_err(|e| {
            StateError::InvalidContainer(format!("failed to serialize save file: {e}"))
        })?;
        std::fs::write(path.as_ref(), bytes).map_err(|e| {
            StateError::InvalidContainer(format!("failed to write save file: {e}"))
        })?;
        Ok(())
    }

    /// Load a container from a file.
    ///
    /// # Errors
    /// Returns an error if file reading, deserialization, or the version
    /// check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            StateError::InvalidContainer(format!("failed to read save file: {e}"))
        })?;
        let save: Self = bincode::deserialize(&bytes).map_err(|e| {
            StateError::InvalidContainer(format!("failed to deserialize save file: {e}"))
        })?;

        // Version check
        if save.version != SAVE_CONTAINER_VERSION {
            return Err(StateError::InvalidContainer(format!(
                "save version mismatch: expected {SAVE_CONTAINER_VERSION}, got {}",
                save.version
            )));
        }

        Ok(save)
    }
}
