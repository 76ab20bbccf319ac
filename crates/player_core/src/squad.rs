//! Named unit groupings: the ten hotkey squads and the AI squad.
//!
//! Every player always carries exactly [`SQUAD_COUNT`] addressable hotkey
//! squads plus one AI-controlled squad; the slots themselves are permanent
//! and only their membership changes. Snapshots persist membership in list
//! order.

use serde::{Deserialize, Serialize};

use crate::team::ObjectId;
use crate::xfer::{Xfer, XferError, XferMode};

/// Number of addressable hotkey squads per player.
pub const SQUAD_COUNT: usize = 10;

const SQUAD_VERSION: u8 = 1;

/// A grouping of object references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    objects: Vec<ObjectId>,
}

impl Squad {
    /// Create an empty squad.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Members in assignment order.
    #[must_use]
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Whether an object is on this squad.
    #[must_use]
    pub fn is_on_squad(&self, object: ObjectId) -> bool {
        self.objects.contains(&object)
    }

    /// Add an object; already-present objects are left alone.
    pub fn add_object(&mut self, object: ObjectId) {
        if !self.objects.contains(&object) {
            self.objects.push(object);
        }
    }

    /// Remove an object if present.
    pub fn remove_object(&mut self, object: ObjectId) {
        self.objects.retain(|o| *o != object);
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the squad has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Transfer membership through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = SQUAD_VERSION;
        xfer.xfer_version(&mut version, SQUAD_VERSION)?;
        let count = xfer.xfer_count(self.objects.len())?;
        match xfer.mode() {
            XferMode::Save => {
                for object in &mut self.objects {
                    xfer.xfer_u64(&mut object.0)?;
                }
            }
            XferMode::Load => {
                self.objects.clear();
                for _ in 0..count {
                    let mut id = 0u64;
                    xfer.xfer_u64(&mut id)?;
                    self.objects.push(ObjectId(id));
                }
            }
        }
        Ok(())
    }
}
