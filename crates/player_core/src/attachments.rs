//! Nullable owned attachments: AI, resource gathering, tunnel network.
//!
//! The subsystems behind these live outside this crate; the player only
//! owns their persistent state so snapshots can carry it. Each attachment
//! travels behind a presence flag, and on load the flag drives allocation
//! or deallocation of the attachment.

use serde::{Deserialize, Serialize};

use crate::hooks::GameDifficulty;
use crate::team::ObjectId;
use crate::xfer::{Xfer, XferError, XferMode};

const AI_STATE_VERSION: u8 = 1;
const RESOURCE_MANAGER_VERSION: u8 = 1;
const TUNNEL_NETWORK_VERSION: u8 = 1;

/// Persistent state of a computer-controlled player's AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiState {
    /// Difficulty this AI plays at.
    pub difficulty: GameDifficulty,
    /// Skill-set variant selected for this AI.
    pub skillset: i32,
}

impl AiState {
    /// Transfer this state through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = AI_STATE_VERSION;
        xfer.xfer_version(&mut version, AI_STATE_VERSION)?;
        let mut difficulty = self.difficulty.to_wire();
        xfer.xfer_i32(&mut difficulty)?;
        self.difficulty = GameDifficulty::from_wire(difficulty);
        xfer.xfer_i32(&mut self.skillset)
    }
}

/// Persistent state of the resource-gathering manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceManagerState {
    /// Supply sources queued for harvesting, in claim order.
    pub pending_supply_sources: Vec<ObjectId>,
}

impl ResourceManagerState {
    /// Transfer this state through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = RESOURCE_MANAGER_VERSION;
        xfer.xfer_version(&mut version, RESOURCE_MANAGER_VERSION)?;
        xfer_object_vec(xfer, &mut self.pending_supply_sources)
    }
}

/// Persistent state of a player's tunnel network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelNetwork {
    /// Tunnel entrances, in construction order.
    pub tunnels: Vec<ObjectId>,
    /// Units currently inside the network, in entry order.
    pub occupants: Vec<ObjectId>,
}

impl TunnelNetwork {
    /// Transfer this state through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = TUNNEL_NETWORK_VERSION;
        xfer.xfer_version(&mut version, TUNNEL_NETWORK_VERSION)?;
        xfer_object_vec(xfer, &mut self.tunnels)?;
        xfer_object_vec(xfer, &mut self.occupants)
    }
}

fn xfer_object_vec(xfer: &mut Xfer, objects: &mut Vec<ObjectId>) -> Result<(), XferError> {
    let count = xfer.xfer_count(objects.len())?;
    match xfer.mode() {
        XferMode::Save => {
            for object in objects {
                xfer.xfer_u64(&mut object.0)?;
            }
        }
        XferMode::Load => {
            objects.clear();
            for _ in 0..count {
                let mut id = 0u64;
                xfer.xfer_u64(&mut id)?;
                objects.push(ObjectId(id));
            }
        }
    }
    Ok(())
}
