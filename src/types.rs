//! Opaque domain records that flow through the property tree.
//!
//! The tree stores these without inspecting their structure; only the
//! bring-up callbacks and the streaming layer interpret them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A numeric range with an optional step, used for gain and frequency
/// capability paths. `clamp` is idempotent: clamping a clamped value is a
/// no-op.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaRange {
    /// Lowest valid value.
    pub start: f64,
    /// Highest valid value.
    pub stop: f64,
    /// Step between valid values; 0.0 means continuous.
    pub step: f64,
}

impl MetaRange {
    /// A continuous range.
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop, step: 0.0 }
    }

    /// A stepped range.
    pub fn with_step(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Clamp `value` into the range, snapping to the nearest step when
    /// one is defined.
    pub fn clamp(&self, value: f64) -> f64 {
        let bounded = value.clamp(self.start, self.stop);
        if self.step > 0.0 {
            let steps = ((bounded - self.start) / self.step).round();
            (self.start + steps * self.step).clamp(self.start, self.stop)
        } else {
            bounded
        }
    }
}

/// Command issued on a `stream_cmd` path to start or stop streaming.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamCmd {
    /// Stream continuously until stopped.
    StartContinuous,
    /// Stop a continuous stream.
    StopContinuous,
    /// Stream a finite number of samples, then stop.
    NumSampsAndDone(u64),
}

/// Motherboard identity record, keyed EEPROM fields ("name", "serial",
/// "mcr", ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MboardEeprom(pub BTreeMap<String, String>);

impl MboardEeprom {
    /// Value of a field, empty when absent.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    /// Set a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

/// Daughterboard identity record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DboardEeprom {
    /// Hardware id code, 0 for an empty slot.
    pub id: u16,
    /// Serial number string.
    pub serial: String,
}

/// One daughterboard slot / frontend pairing, e.g. `A:0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdevPair {
    /// Daughterboard slot name.
    pub slot: String,
    /// Frontend name on that daughterboard.
    pub frontend: String,
}

/// Which frontend(s) a stream maps onto, e.g. `"A:0 B:0"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdevSpec(pub Vec<SubdevPair>);

impl SubdevSpec {
    /// True when no pairing has been chosen yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SubdevSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pair in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}:{}", pair.slot, pair.frontend)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for SubdevSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = Vec::new();
        for word in s.split_whitespace() {
            let (slot, frontend) = word
                .split_once(':')
                .ok_or_else(|| format!("bad subdev pair '{word}', expected SLOT:FRONTEND"))?;
            pairs.push(SubdevPair {
                slot: slot.to_string(),
                frontend: frontend.to_string(),
            });
        }
        Ok(SubdevSpec(pairs))
    }
}
