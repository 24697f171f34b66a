//! Mock hardware implementation.
//!
//! Provides a simulated 32-bit register file for testing without physical
//! hardware. Reads and writes are tracked so tests can assert on the
//! exact hardware side effects a tree operation produced, and tests can
//! mutate registers behind the driver's back to verify that published
//! paths never serve stale values.

use std::collections::HashMap;

use anyhow::{bail, Result};
use parking_lot::Mutex;

use super::RegisterIo;

/// Simulated register file.
///
/// # Example
///
/// ```rust
/// use rust_sdr::hardware::{MockRegisters, RegisterIo};
///
/// let regs = MockRegisters::new().with_register(0x04, 0x0000_0033);
/// assert_eq!(regs.peek32(0x04).unwrap(), 0x33);
/// regs.poke32(0x08, 1).unwrap();
/// assert_eq!(regs.write_log(), vec![(0x08, 1)]);
/// ```
pub struct MockRegisters {
    regs: Mutex<HashMap<u32, u32>>,
    writes: Mutex<Vec<(u32, u32)>>,
    fail_writes: Mutex<bool>,
}

impl MockRegisters {
    /// An empty register file; unseeded registers read as zero.
    pub fn new() -> Self {
        Self {
            regs: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Seed a register value (builder style).
    pub fn with_register(self, addr: u32, value: u32) -> Self {
        self.regs.lock().insert(addr, value);
        self
    }

    /// Mutate a register from outside the driver, simulating hardware
    /// state that changes on its own (a running time counter, a moved
    /// switch).
    pub fn set_register(&self, addr: u32, value: u32) {
        self.regs.lock().insert(addr, value);
    }

    /// Every `poke32` performed, in order.
    pub fn write_log(&self) -> Vec<(u32, u32)> {
        self.writes.lock().clone()
    }

    /// Last value written to `addr`, if any write happened.
    pub fn last_write(&self, addr: u32) -> Option<u32> {
        self.writes.lock().iter().rev().find(|(a, _)| *a == addr).map(|(_, v)| *v)
    }

    /// Make every subsequent `poke32` fail, simulating a dead transport.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterIo for MockRegisters {
    fn peek32(&self, addr: u32) -> Result<u32> {
        Ok(*self.regs.lock().get(&addr).unwrap_or(&0))
    }

    fn poke32(&self, addr: u32, value: u32) -> Result<()> {
        if *self.fail_writes.lock() {
            bail!("register write to {addr:#06x} failed: transport stalled");
        }
        self.regs.lock().insert(addr, value);
        self.writes.lock().push((addr, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseeded_registers_read_zero() {
        let regs = MockRegisters::new();
        assert_eq!(regs.peek32(0x40).unwrap(), 0);
    }

    #[test]
    fn writes_read_back_and_log() {
        let regs = MockRegisters::new();
        regs.poke32(0x10, 7).unwrap();
        regs.poke32(0x10, 9).unwrap();
        assert_eq!(regs.peek32(0x10).unwrap(), 9);
        assert_eq!(regs.write_log(), vec![(0x10, 7), (0x10, 9)]);
        assert_eq!(regs.last_write(0x10), Some(9));
        assert_eq!(regs.last_write(0x11), None);
    }

    #[test]
    fn failing_transport_rejects_writes() {
        let regs = MockRegisters::new();
        regs.fail_writes(true);
        assert!(regs.poke32(0x10, 1).is_err());
        assert!(regs.write_log().is_empty());
        regs.fail_writes(false);
        assert!(regs.poke32(0x10, 1).is_ok());
    }
}
