//! Pre-placed base build-list entries.
//!
//! A scenario can seed each player with an ordered list of structures to
//! build (or that start built). The player owns its list exclusively and
//! rebuilds it wholesale on load, preserving entry order.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::xfer::{Xfer, XferError};

const BUILD_LIST_VERSION: u8 = 1;

/// One structure entry in a player's build list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildListInfo {
    /// Structure template to build.
    pub template_name: String,
    /// Placement X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Placement Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Facing angle in radians.
    #[serde(with = "fixed_serde")]
    pub angle: Fixed,
    /// Whether the structure exists at match start.
    pub initially_built: bool,
    /// How many times the AI may rebuild it after loss.
    pub num_rebuilds: u32,
    /// Script attached to the entry, empty if none.
    pub script: String,
}

impl BuildListInfo {
    /// Transfer this entry through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = BUILD_LIST_VERSION;
        xfer.xfer_version(&mut version, BUILD_LIST_VERSION)?;
        xfer.xfer_ascii_string(&mut self.template_name)?;
        xfer.xfer_real(&mut self.x)?;
        xfer.xfer_real(&mut self.y)?;
        xfer.xfer_real(&mut self.angle)?;
        xfer.xfer_bool(&mut self.initially_built)?;
        xfer.xfer_u32(&mut self.num_rebuilds)?;
        xfer.xfer_ascii_string(&mut self.script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xfer_roundtrip() {
        let mut entry = BuildListInfo {
            template_name: "PowerPlant".into(),
            x: Fixed::from_num(120),
            y: Fixed::from_num(-48.5),
            angle: Fixed::from_num(1.5),
            initially_built: true,
            num_rebuilds: 3,
            script: "OnRebuilt".into(),
        };

        let mut save = Xfer::saver();
        entry.xfer_snapshot(&mut save).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = BuildListInfo::default();
        decoded.xfer_snapshot(&mut load).unwrap();
        assert_eq!(decoded, entry);
    }
}
