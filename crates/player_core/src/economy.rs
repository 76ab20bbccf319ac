//! Money and energy sub-states owned by a player.
//!
//! Both are plain counters with their own versioned snapshot sections;
//! income and power production themselves are driven by external resource
//! and building subsystems through these state hooks.

use serde::{Deserialize, Serialize};

use crate::xfer::{Xfer, XferError};

const MONEY_VERSION: u8 = 1;
const ENERGY_VERSION: u8 = 1;

/// A player's cash reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Money {
    amount: u32,
}

impl Money {
    /// Create a reserve with an initial amount.
    #[must_use]
    pub const fn new(amount: u32) -> Self {
        Self { amount }
    }

    /// Current amount.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Reset to zero.
    pub fn empty(&mut self) {
        self.amount = 0;
    }

    /// Add funds.
    pub fn deposit(&mut self, amount: u32) {
        self.amount = self.amount.saturating_add(amount);
    }

    /// Spend funds if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn withdraw(&mut self, amount: u32) -> bool {
        if self.amount >= amount {
            self.amount -= amount;
            true
        } else {
            false
        }
    }

    /// Check if a cost is affordable.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.amount >= cost
    }

    /// Transfer this reserve through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = MONEY_VERSION;
        xfer.xfer_version(&mut version, MONEY_VERSION)?;
        xfer.xfer_u32(&mut self.amount)
    }
}

/// A player's power grid state.
///
/// Production and consumption are adjusted by building subsystems as
/// structures come and go; `penalty_frame` is the frame until which a
/// brown-out penalty holds (0 when none is pending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Energy {
    production: i32,
    consumption: i32,
    penalty_frame: u32,
}

impl Energy {
    /// Create an idle grid.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            production: 0,
            consumption: 0,
            penalty_frame: 0,
        }
    }

    /// Reset to the fresh-match baseline.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Current production.
    #[must_use]
    pub const fn production(&self) -> i32 {
        self.production
    }

    /// Current consumption.
    #[must_use]
    pub const fn consumption(&self) -> i32 {
        self.consumption
    }

    /// Adjust production by a delta (structure built or lost).
    pub fn adjust_production(&mut self, delta: i32) {
        self.production += delta;
    }

    /// Adjust consumption by a delta.
    pub fn adjust_consumption(&mut self, delta: i32) {
        self.consumption += delta;
    }

    /// Whether production covers consumption.
    #[must_use]
    pub const fn has_sufficient_power(&self) -> bool {
        self.production >= self.consumption
    }

    /// Frame until which a brown-out penalty holds, 0 if none.
    #[must_use]
    pub const fn penalty_frame(&self) -> u32 {
        self.penalty_frame
    }

    /// Arm or clear the brown-out penalty timer.
    pub fn set_penalty_frame(&mut self, frame: u32) {
        self.penalty_frame = frame;
    }

    /// Transfer this grid state through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = ENERGY_VERSION;
        xfer.xfer_version(&mut version, ENERGY_VERSION)?;
        xfer.xfer_i32(&mut self.production)?;
        xfer.xfer_i32(&mut self.consumption)?;
        xfer.xfer_u32(&mut self.penalty_frame)
    }
}
