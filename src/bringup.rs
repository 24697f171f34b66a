//! Device bring-up.
//!
//! Populates the property tree in dependency order — identity/EEPROM →
//! capabilities → clock → codecs → frontends → DSP chains → time →
//! daughterboards — wiring each hardware-backed path to the abstract
//! [`RegisterIo`] capability through coercion/subscriber/publisher
//! closures. The tree never learns what sits behind a path; the closures
//! capture exactly the state they need.
//!
//! Stream commands are delivered by message passing: the `stream_cmd`
//! subscriber posts into a channel consumed by the soft-time/streaming
//! side, so the timer thread that issues commands never runs streaming
//! code inside a tree callback.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use tracing::{error, info};

use crate::config::DeviceConfig;
use crate::convert::SampleFormat;
use crate::hardware::RegisterIo;
use crate::tree::{PropertyTree, Subtree};
use crate::types::{DboardEeprom, MboardEeprom, MetaRange, StreamCmd, SubdevPair, SubdevSpec};

/// Device register map (mock layout; a real transport maps these onto
/// its own control space).
pub mod regs {
    /// Mode register, 0 = normal (no loopback, no counting).
    pub const MODE: u32 = 0x00;
    /// RX sample rate divisor, minus one.
    pub const RX_RATE_DIV: u32 = 0x01;
    /// TX sample rate divisor, minus one.
    pub const TX_RATE_DIV: u32 = 0x02;
    /// RX wire format select.
    pub const RX_FORMAT: u32 = 0x03;
    /// TX wire format select.
    pub const TX_FORMAT: u32 = 0x04;
    /// RX frontend mux.
    pub const RX_MUX: u32 = 0x05;
    /// TX frontend mux.
    pub const TX_MUX: u32 = 0x06;
    /// Free-running time counter, in ticks of the master clock.
    pub const TIME_TICKS: u32 = 0x07;
    /// Scratch register (EEPROM commit checksum lands here).
    pub const SCRATCH: u32 = 0x08;
    /// Capabilities readback.
    pub const CAPS_RB: u32 = 0x09;
    /// RX DDC tuning word, one register per DSP.
    pub const RX_FREQ_BASE: u32 = 0x10;
    /// TX DUC tuning word, one register per DSP.
    pub const TX_FREQ_BASE: u32 = 0x18;
    /// RX codec PGA gain, one register per daughterboard slot.
    pub const RX_PGA_BASE: u32 = 0x20;
    /// TX codec PGA gain, one register per daughterboard slot.
    pub const TX_PGA_BASE: u32 = 0x28;
}

/// Decoded capabilities readback.
///
/// ```text
///    3                   2                   1                   0
///  1 0 9 8 7 6 5 4 3 2 1 0 9 8 7 6 5 4 3 2 1 0 9 8 7 6 5 4 3 2 1 0
/// +-----------------------------------------------+-+-----+-+-----+
/// |               Reserved                        |T|DUCs |R|DDCs |
/// +-----------------------------------------------+-+-----+-+-----+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caps {
    /// Number of RX digital downconverters.
    pub num_ddcs: usize,
    /// Number of TX digital upconverters.
    pub num_ducs: usize,
    /// RX halfband filter present.
    pub rx_halfband: bool,
    /// TX halfband filter present.
    pub tx_halfband: bool,
}

/// Decode the capabilities readback register.
pub fn decode_caps(regval: u32) -> Caps {
    Caps {
        num_ddcs: (regval & 0x7) as usize,
        rx_halfband: (regval >> 3) & 0x1 == 1,
        num_ducs: ((regval >> 4) & 0x7) as usize,
        tx_halfband: (regval >> 7) & 0x1 == 1,
    }
}

/// DDS tuning word for a frequency, as a fraction of the clock rate.
pub fn dds_tuning_word(freq: f64, clock_rate: f64) -> u32 {
    ((freq / clock_rate) * 4294967296.0).round() as i64 as u32
}

fn eeprom_checksum(bytes: impl Iterator<Item = u8>) -> u32 {
    bytes.fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// Populate `tree` with the full device hierarchy, wiring hardware-backed
/// paths to `regs`. Stream commands issued on the `stream_cmd` path are
/// posted into `stream_tx`.
pub fn bring_up(
    tree: &PropertyTree,
    regs: &Arc<dyn RegisterIo>,
    device: &DeviceConfig,
    stream_tx: Sender<StreamCmd>,
) -> Result<()> {
    info!("bringing up mock SDR device");

    tree.create::<String>("/name")?.set("Mock SDR Device".to_string())?;
    let mb = tree.subtree("/mboards/0");
    mb.create::<String>("name")?.set("Mock SDR (rev0)".to_string())?;

    // identity record; committing it back writes a checksum the tests
    // (and a curious operator) can observe
    let mut eeprom = MboardEeprom::default();
    eeprom.set("name", "mock-sdr");
    eeprom.set("serial", "MOCK000");
    {
        let r = regs.clone();
        mb.create::<MboardEeprom>("eeprom")?
            .set(eeprom.clone())?
            .subscribe(move |e: &MboardEeprom| {
                let sum = eeprom_checksum(
                    e.0.iter().flat_map(|(k, v)| k.bytes().chain(v.bytes())),
                );
                r.poke32(regs::SCRATCH, sum)
            });
    }

    // master clock rate, with the EEPROM override the legacy hardware
    // supports
    let mut clock_rate = device.master_clock_rate;
    let mcr = eeprom.get("mcr");
    if !mcr.is_empty() {
        match mcr.parse::<f64>() {
            Ok(rate) => clock_rate = rate,
            Err(e) => error!("bad clock rate in EEPROM mcr field: {e}"),
        }
    }
    info!(clock_rate_mhz = clock_rate / 1e6, "using master clock rate");
    mb.create::<f64>("tick_rate")?.set(clock_rate)?;

    // capability readback decides how much of the tree exists below
    let caps = decode_caps(regs.peek32(regs::CAPS_RB)?);
    info!(
        num_ddcs = caps.num_ddcs,
        num_ducs = caps.num_ducs,
        rx_halfband = caps.rx_halfband,
        tx_halfband = caps.tx_halfband,
        "device capabilities"
    );

    // normal mode, hardware format defaults
    regs.poke32(regs::MODE, 0x0000_0000)?;
    regs.poke32(regs::RX_RATE_DIV, 0x0000_0001)?;
    regs.poke32(regs::TX_RATE_DIV, 0x0000_0001)?;

    // negotiated wire formats; the subscriber translates the tag into
    // the hardware's format select encoding
    for (path, reg) in [("rx_wire_format", regs::RX_FORMAT), ("tx_wire_format", regs::TX_FORMAT)] {
        let r = regs.clone();
        mb.create::<SampleFormat>(path)?
            .subscribe(move |fmt: &SampleFormat| match fmt {
                SampleFormat::Sc16 => r.poke32(reg, 0x0000_0300),
                SampleFormat::Sc8 => r.poke32(reg, 0x0000_0100),
                host => Err(anyhow!("{host} is not a wire format")),
            })
            .set(device.wire_format)?;
    }

    // phony node so the directory exists
    mb.create::<i32>("sensors")?;

    // codec control per slot
    for (slot_idx, slot) in device.dboard_slots.iter().enumerate() {
        populate_codec(
            &mb.subtree(format!("rx_codecs/{slot}")),
            regs,
            regs::RX_PGA_BASE + slot_idx as u32,
            MetaRange::with_step(0.0, 20.0, 0.05),
        )?;
        populate_codec(
            &mb.subtree(format!("tx_codecs/{slot}")),
            regs,
            regs::TX_PGA_BASE + slot_idx as u32,
            MetaRange::with_step(-20.0, 0.0, 0.1),
        )?;
    }

    // frontend selection
    {
        let r = regs.clone();
        mb.create::<SubdevSpec>("rx_subdev_spec")?
            .subscribe(move |spec: &SubdevSpec| {
                info!(spec = %spec, "rx subdev spec");
                r.poke32(regs::RX_MUX, spec.0.len() as u32)
            });
        let r = regs.clone();
        mb.create::<SubdevSpec>("tx_subdev_spec")?
            .subscribe(move |spec: &SubdevSpec| {
                info!(spec = %spec, "tx subdev spec");
                r.poke32(regs::TX_MUX, spec.0.len() as u32)
            });
    }

    // rx dsp chains
    mb.create::<i32>("rx_dsps")?; // dummy in case we have none
    for dspno in 0..caps.num_ddcs {
        let dsp = mb.subtree(format!("rx_dsps/{dspno}"));
        populate_dsp(&dsp, regs, clock_rate, regs::RX_RATE_DIV, regs::RX_FREQ_BASE + dspno as u32)?;
        dsp.create::<MetaRange>("freq/range")?
            .set(MetaRange::new(-clock_rate / 2.0, clock_rate / 2.0))?;
        dsp.create::<f64>("scale_factor")?.set(device.rx_scale_factor)?;
        dsp.create::<StreamCmd>("stream_cmd")?;
        if dspno == 0 {
            // only dsp0 carries the subscriber since it streams all dsps
            let tx = stream_tx.clone();
            mb.access::<StreamCmd>("rx_dsps/0/stream_cmd")?
                .subscribe(move |cmd: &StreamCmd| {
                    tx.send(cmd.clone())
                        .map_err(|_| anyhow!("stream command receiver dropped"))
                });
        }
    }

    // tx dsp chains
    mb.create::<i32>("tx_dsps")?; // dummy in case we have none
    for dspno in 0..caps.num_ducs {
        let dsp = mb.subtree(format!("tx_dsps/{dspno}"));
        populate_dsp(&dsp, regs, clock_rate, regs::TX_RATE_DIV, regs::TX_FREQ_BASE + dspno as u32)?;
        // magic scalar comes from codec interpolation limits
        dsp.create::<MetaRange>("freq/range")?
            .set(MetaRange::new(-clock_rate * 0.6875, clock_rate * 0.6875))?;
        dsp.create::<f64>("scale_factor")?.set(device.tx_scale_factor)?;
    }

    // device time rides the tick counter; reads always hit hardware
    {
        let r = regs.clone();
        let node = mb.create::<f64>("time/now")?;
        node.publish(move || Ok(f64::from(r.peek32(regs::TIME_TICKS)?) / clock_rate))?;
        let r = regs.clone();
        node.subscribe(move |secs: &f64| r.poke32(regs::TIME_TICKS, (secs * clock_rate) as u32));
    }

    mb.create::<Vec<String>>("clock_source/options")?.set(vec!["internal".to_string()])?;
    mb.create::<Vec<String>>("time_source/options")?.set(vec!["none".to_string()])?;
    mb.create::<String>("clock_source/value")?.set("internal".to_string())?;
    mb.create::<String>("time_source/value")?.set("none".to_string())?;

    // daughterboards
    for slot in &device.dboard_slots {
        let db = mb.subtree(format!("dboards/{slot}"));
        for side in ["rx", "tx"] {
            let r = regs.clone();
            db.create::<DboardEeprom>(format!("{side}_eeprom"))?
                .set(DboardEeprom {
                    id: 0x0001,
                    serial: format!("DB{slot}0"),
                })?
                .subscribe(move |e: &DboardEeprom| {
                    let sum = eeprom_checksum(e.serial.bytes()) ^ u32::from(e.id);
                    r.poke32(regs::SCRATCH, sum)
                });
            let fe = db.subtree(format!("{side}_frontends/0"));
            fe.create::<String>("name")?.set(format!("{} frontend 0", side.to_uppercase()))?;
            fe.create::<String>("connection")?.set("IQ".to_string())?;
        }
    }

    // now that the tick rate is known, start the host rates somewhere sane
    for name in mb.list("rx_dsps") {
        mb.set(format!("rx_dsps/{name}/rate/value"), 1e6)?;
    }
    for name in mb.list("tx_dsps") {
        mb.set(format!("tx_dsps/{name}/rate/value"), 1e6)?;
    }

    // default the subdev specs to the first frontend of the first slot
    if let Some(slot) = device.dboard_slots.first() {
        let spec = SubdevSpec(vec![SubdevPair {
            slot: slot.clone(),
            frontend: "0".to_string(),
        }]);
        if !mb.list("rx_dsps").is_empty() {
            mb.set("rx_subdev_spec", spec.clone())?;
        }
        if !mb.list("tx_dsps").is_empty() {
            mb.set("tx_subdev_spec", spec)?;
        }
    }

    info!("bring-up complete");
    Ok(())
}

/// Codec gain paths: range, and a value that is clamped, written to the
/// PGA register in step counts, and read back from hardware on get.
fn populate_codec(
    codec: &Subtree<'_>,
    regs: &Arc<dyn RegisterIo>,
    gain_reg: u32,
    range: MetaRange,
) -> Result<()> {
    codec.create::<String>("name")?.set("mock-codec".to_string())?;
    codec.create::<MetaRange>("gains/pga/range")?.set(range)?;

    let value = codec.create::<f64>("gains/pga/value")?;
    value.coerce(move |gain| range.clamp(gain));
    let r = regs.clone();
    value.subscribe(move |gain: &f64| {
        let counts = ((gain - range.start) / range.step).round() as u32;
        r.poke32(gain_reg, counts)
    });
    let r = regs.clone();
    value.publish(move || {
        let counts = r.peek32(gain_reg)?;
        Ok(range.start + f64::from(counts) * range.step)
    })?;
    value.set(range.clamp(0.0))?;
    Ok(())
}

/// DSP rate and frequency paths shared by the RX and TX chains.
fn populate_dsp(
    dsp: &Subtree<'_>,
    regs: &Arc<dyn RegisterIo>,
    clock_rate: f64,
    rate_reg: u32,
    freq_reg: u32,
) -> Result<()> {
    let rate = dsp.create::<f64>("rate/value")?;
    rate.coerce(move |requested| {
        // achievable rates are integer divisions of the master clock
        let div = (clock_rate / requested).round().clamp(1.0, 256.0);
        clock_rate / div
    });
    let r = regs.clone();
    rate.subscribe(move |actual: &f64| {
        let div = (clock_rate / actual).round() as u32;
        r.poke32(rate_reg, div - 1)
    });

    let freq = dsp.create::<f64>("freq/value")?;
    freq.coerce(move |f| f.clamp(-clock_rate / 2.0, clock_rate / 2.0));
    let r = regs.clone();
    freq.subscribe(move |f: &f64| r.poke32(freq_reg, dds_tuning_word(*f, clock_rate)));
    freq.set(0.0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_register_decodes_all_fields() {
        let caps = decode_caps(0b1010_1010);
        assert_eq!(
            caps,
            Caps {
                num_ddcs: 2,
                rx_halfband: true,
                num_ducs: 2,
                tx_halfband: true,
            }
        );
        assert_eq!(decode_caps(0).num_ddcs, 0);
    }

    #[test]
    fn tuning_word_is_a_clock_fraction() {
        assert_eq!(dds_tuning_word(0.0, 64e6), 0);
        // clock/4 is a quarter of the phase accumulator
        assert_eq!(dds_tuning_word(16e6, 64e6), 0x4000_0000);
        // negative frequencies wrap two's-complement
        assert_eq!(dds_tuning_word(-16e6, 64e6), 0xC000_0000);
    }

    #[test]
    fn eeprom_checksum_tracks_content() {
        let a = eeprom_checksum("serial=1".bytes());
        let b = eeprom_checksum("serial=2".bytes());
        assert_ne!(a, b);
    }
}
