//! # rust_sdr
//!
//! Driver core for a software-defined-radio peripheral: a reactive
//! property tree models the device as a hierarchy of typed, path-addressed
//! values with hardware side effects attached, and a converter registry
//! moves sample blocks between host and wire formats.
//!
//! ## Modules
//!
//! - [`tree`] — the path-addressed reactive property tree
//! - [`convert`] — sample format tags, converters, and the dispatch registry
//! - [`bringup`] — populates the tree with the device hierarchy at init
//! - [`hardware`] — the register access capability and its mock
//! - [`types`] — domain records that flow through the tree (ranges,
//!   EEPROMs, stream commands, subdevice specs)
//! - [`config`] — layered TOML/environment configuration
//! - [`error`] — the crate error type
//! - [`logging`] — tracing subscriber setup
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_sdr::bringup;
//! use rust_sdr::config::SdrConfig;
//! use rust_sdr::hardware::{MockRegisters, RegisterIo};
//! use rust_sdr::tree::PropertyTree;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SdrConfig::default();
//! let tree = PropertyTree::new();
//! let regs: Arc<dyn RegisterIo> = Arc::new(MockRegisters::new().with_register(0x09, 0x33));
//! let (tx, _rx) = crossbeam_channel::unbounded();
//! bringup::bring_up(&tree, &regs, &config.device, tx)?;
//!
//! // requested rates are coerced to what the hardware can do
//! tree.set("/mboards/0/rx_dsps/0/rate/value", 3e6)?;
//! let actual: f64 = tree.get("/mboards/0/rx_dsps/0/rate/value")?;
//! assert_eq!(actual, 64e6 / 21.0);
//! # Ok(())
//! # }
//! ```

pub mod bringup;
pub mod config;
pub mod convert;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod tree;
pub mod types;

pub use config::SdrConfig;
pub use convert::{ConverterRegistry, SampleFormat};
pub use error::{SdrError, SdrResult};
pub use tree::{PropPath, PropertyTree};
