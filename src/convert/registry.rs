//! The converter registry.
//!
//! Two tables over the same entries: a name-keyed table for introspection
//! (a name permanently maps to one function for the process lifetime) and
//! a format-pair-keyed table for dispatch. Per pair, only the entry with
//! the numerically highest priority is retained; an equal-priority
//! re-registration is ambiguous by construction, so it wins as
//! last-registered and logs a warning rather than failing.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::format::{ConverterId, SampleFormat};
use super::{ConverterFn, SampleBuf, SampleBufMut};
use crate::error::{SdrError, SdrResult};

/// One registered converter.
#[derive(Clone, Copy, Debug)]
struct ConverterEntry {
    id: ConverterId,
    func: ConverterFn,
    priority: i32,
}

/// Priority-dispatched table of sample-format converters.
///
/// Built explicitly at startup; registration is not a load-order side
/// effect. Lookup and dispatch take `&self`, so one registry can be
/// shared across streaming threads.
#[derive(Default)]
pub struct ConverterRegistry {
    by_name: HashMap<String, ConverterEntry>,
    by_pair: HashMap<ConverterId, ConverterEntry>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated from the compiled-in table of general-purpose
    /// converters.
    pub fn with_defaults() -> SdrResult<Self> {
        let mut registry = Self::new();
        for &(name, id, func, priority) in super::converters::DEFAULT_CONVERTERS {
            registry.register(name, id, func, priority)?;
        }
        Ok(registry)
    }

    /// Register a converter under `name` for the format pair `id`.
    ///
    /// Fails with [`SdrError::DuplicateName`] when the name is already
    /// taken; that is a wiring bug caught at process start. Priority
    /// decides dispatch: higher wins, lower is ignored, and an equal
    /// priority replaces the incumbent with a warning.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        id: ConverterId,
        func: ConverterFn,
        priority: i32,
    ) -> SdrResult<()> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SdrError::DuplicateName { name });
        }
        let entry = ConverterEntry { id, func, priority };
        self.by_name.insert(name.clone(), entry);

        match self.by_pair.get(&id) {
            Some(incumbent) if incumbent.priority > priority => {
                debug!(converter = %name, %id, priority, "ignoring lower-priority converter");
            }
            Some(incumbent) if incumbent.priority == priority => {
                warn!(
                    converter = %name,
                    %id,
                    priority,
                    "equal-priority converter re-registration, last one wins"
                );
                self.by_pair.insert(id, entry);
            }
            _ => {
                self.by_pair.insert(id, entry);
            }
        }
        Ok(())
    }

    /// The highest-priority converter for `(input, output)`.
    pub fn get_converter(
        &self,
        input: SampleFormat,
        output: SampleFormat,
    ) -> SdrResult<ConverterFn> {
        let id = ConverterId::new(input, output);
        self.by_pair
            .get(&id)
            .map(|entry| entry.func)
            .ok_or(SdrError::ConverterNotFound { id })
    }

    /// Look up the converter for the pair and apply it to one block.
    ///
    /// Buffer formats are validated against the requested pair before
    /// dispatch, and the converter validates lengths against `nsamps`
    /// before writing anything.
    pub fn convert(
        &self,
        input_format: SampleFormat,
        output_format: SampleFormat,
        input: &SampleBuf<'_>,
        output: &mut SampleBufMut<'_>,
        nsamps: usize,
        scale_factor: f64,
    ) -> SdrResult<()> {
        if input.format() != input_format {
            return Err(SdrError::BufferFormat {
                expected: input_format,
                found: input.format(),
            });
        }
        if output.format() != output_format {
            return Err(SdrError::BufferFormat {
                expected: output_format,
                found: output.format(),
            });
        }
        let func = self.get_converter(input_format, output_format)?;
        func(input, output, nsamps, scale_factor)
    }

    /// Registered converter names, for introspection. Unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Format pair and priority registered under `name`, if any.
    pub fn describe(&self, name: &str) -> Option<(ConverterId, i32)> {
        self.by_name.get(name).map(|e| (e.id, e.priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_a(
        _: &SampleBuf<'_>,
        _: &mut SampleBufMut<'_>,
        _: usize,
        _: f64,
    ) -> SdrResult<()> {
        Ok(())
    }

    fn noop_b(
        _: &SampleBuf<'_>,
        _: &mut SampleBufMut<'_>,
        _: usize,
        _: f64,
    ) -> SdrResult<()> {
        Err(SdrError::UnknownFormat("marker".into()))
    }

    fn pair() -> ConverterId {
        ConverterId::new(SampleFormat::Fc32, SampleFormat::Sc16)
    }

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        for (first, second, winner_is_b) in [(10, 20, true), (20, 10, false)] {
            let mut reg = ConverterRegistry::new();
            reg.register("conv_a", pair(), noop_a, first).unwrap();
            reg.register("conv_b", pair(), noop_b, second).unwrap();
            let func = reg
                .get_converter(SampleFormat::Fc32, SampleFormat::Sc16)
                .unwrap();
            assert_eq!(func as usize == noop_b as usize, winner_is_b);
        }
    }

    #[test]
    fn equal_priority_is_last_registered_wins() {
        let mut reg = ConverterRegistry::new();
        reg.register("conv_a", pair(), noop_a, 10).unwrap();
        reg.register("conv_b", pair(), noop_b, 10).unwrap();
        let func = reg
            .get_converter(SampleFormat::Fc32, SampleFormat::Sc16)
            .unwrap();
        assert_eq!(func as usize, noop_b as usize);
    }

    #[test]
    fn duplicate_name_is_fatal() {
        let mut reg = ConverterRegistry::new();
        reg.register("conv", pair(), noop_a, 0).unwrap();
        assert!(matches!(
            reg.register("conv", pair(), noop_b, 99),
            Err(SdrError::DuplicateName { name }) if name == "conv"
        ));
    }

    #[test]
    fn missing_pair_is_converter_not_found() {
        let reg = ConverterRegistry::new();
        assert!(matches!(
            reg.get_converter(SampleFormat::Sc8, SampleFormat::Fc64),
            Err(SdrError::ConverterNotFound { .. })
        ));
    }

    #[test]
    fn defaults_cover_all_eight_directions() {
        let reg = ConverterRegistry::with_defaults().unwrap();
        assert_eq!(reg.names().count(), 8);
        for host in [SampleFormat::Fc64, SampleFormat::Fc32] {
            for wire in [SampleFormat::Sc16, SampleFormat::Sc8] {
                reg.get_converter(host, wire).unwrap();
                reg.get_converter(wire, host).unwrap();
            }
        }
        let (id, priority) = reg.describe("fc32_to_sc16").unwrap();
        assert_eq!(id, ConverterId::new(SampleFormat::Fc32, SampleFormat::Sc16));
        assert_eq!(priority, crate::convert::PRIORITY_GENERAL);
    }

    #[test]
    fn convert_checks_buffer_formats_against_the_pair() {
        let reg = ConverterRegistry::with_defaults().unwrap();
        let src = vec![0u32; 4];
        let mut dst = vec![0u32; 4];
        let err = reg
            .convert(
                SampleFormat::Fc32,
                SampleFormat::Sc16,
                &SampleBuf::Sc16(&src),
                &mut SampleBufMut::Sc16(&mut dst),
                4,
                1.0,
            )
            .unwrap_err();
        assert!(matches!(err, SdrError::BufferFormat { .. }));
    }
}
