//! Abstract hardware register capability.
//!
//! The core never talks to a transport directly. Hardware objects
//! implement the minimal [`RegisterIo`] capability and are wired to
//! specific tree paths at bring-up through coercion/subscriber/publisher
//! closures, keeping the tree itself hardware-agnostic.
//!
//! Methods are synchronous: tree callbacks execute on the caller's
//! thread, and register pokes over the control transport are short,
//! blocking operations. Implementations must use interior mutability and
//! be safe to share across the control and soft-time threads.

pub mod mock;

pub use mock::MockRegisters;

use anyhow::Result;

/// Capability: 32-bit register access.
///
/// # Contract
/// - `addr` is a device-native register number, not a byte offset.
/// - Both methods block until the transport acknowledges.
/// - Errors are transport failures (stall, timeout, NAK); the core
///   surfaces them through the property tree as hardware read/write
///   errors and never retries.
pub trait RegisterIo: Send + Sync {
    /// Read a 32-bit register.
    fn peek32(&self, addr: u32) -> Result<u32>;

    /// Write a 32-bit register.
    fn poke32(&self, addr: u32, value: u32) -> Result<()>;
}
