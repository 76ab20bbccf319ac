//! Fixed-point math utilities for deterministic simulation.
//!
//! Every quantity the player state stores fractionally (percent modifiers,
//! bonus multipliers) uses fixed-point arithmetic. Floating-point operations
//! can produce different results on different CPUs, which would desync
//! lockstep multiplayer and break replay verification.

use std::collections::BTreeMap;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = fixed::types::I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `BTreeMap<String, Fixed>` tables.
///
/// The per-template production modifier tables are string-keyed maps of
/// fixed-point percents; values travel as raw bits like [`fixed_serde`].
pub mod fixed_map_serde {
    use super::{BTreeMap, Fixed};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a map of fixed-point values via their raw bits.
    pub fn serialize<S>(map: &BTreeMap<String, Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bits: BTreeMap<&str, i64> = map
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_bits()))
            .collect();
        bits.serialize(serializer)
    }

    /// Deserialize a map of fixed-point values from their raw bits.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = BTreeMap::<String, i64>::deserialize(deserializer)?;
        Ok(bits
            .into_iter()
            .map(|(k, v)| (k, Fixed::from_bits(v)))
            .collect())
    }
}
