//! Equalizer presets and gradual transitions between them
//!
//! A preset is a named set of gains over seven fixed frequency bands. Presets
//! are value objects: blending two presets always produces a new one and never
//! mutates either operand. [`EqualizerBank`] is the registry the scheduler
//! resolves preset names against, and produces [`Transition`] sequences that
//! step from one preset to another.

use cadence_common::config::PresetDefinition;
use cadence_common::{Error, Result};
use std::collections::BTreeMap;
use std::iter::FusedIterator;
use std::str::FromStr;

/// Number of canonical frequency bands
pub const NUM_BANDS: usize = 7;

/// Name of the preset every bank must provide
pub const FLAT_PRESET: &str = "flat";

/// Canonical equalizer bands, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrequencyBand {
    Sub,
    Bass,
    LowMid,
    Mid,
    HighMid,
    Presence,
    Brilliance,
}

impl FrequencyBand {
    /// All bands in canonical order
    pub const ALL: [FrequencyBand; NUM_BANDS] = [
        FrequencyBand::Sub,
        FrequencyBand::Bass,
        FrequencyBand::LowMid,
        FrequencyBand::Mid,
        FrequencyBand::HighMid,
        FrequencyBand::Presence,
        FrequencyBand::Brilliance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyBand::Sub => "sub",
            FrequencyBand::Bass => "bass",
            FrequencyBand::LowMid => "low_mid",
            FrequencyBand::Mid => "mid",
            FrequencyBand::HighMid => "high_mid",
            FrequencyBand::Presence => "presence",
            FrequencyBand::Brilliance => "brilliance",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for FrequencyBand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FrequencyBand::ALL
            .iter()
            .copied()
            .find(|band| band.as_str() == s)
            .ok_or_else(|| Error::InvalidField(format!("Unknown frequency band {:?}", s)))
    }
}

impl std::fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named gains for every canonical band
#[derive(Debug, Clone, PartialEq)]
pub struct EqualizerPreset {
    name: String,
    gains: [f64; NUM_BANDS],
}

impl EqualizerPreset {
    /// Create a preset; bands not listed in `gains` are set to 0.0
    pub fn new<I>(name: impl Into<String>, gains: I) -> Self
    where
        I: IntoIterator<Item = (FrequencyBand, f64)>,
    {
        let mut values = [0.0; NUM_BANDS];
        for (band, gain) in gains {
            values[band.index()] = gain;
        }
        Self {
            name: name.into(),
            gains: values,
        }
    }

    /// Preset with every band at 0.0
    pub fn flat(name: impl Into<String>) -> Self {
        Self::new(name, std::iter::empty())
    }

    /// Build a preset from a config file definition
    ///
    /// Band names are validated; an unknown band is `InvalidField`.
    pub fn from_definition(definition: &PresetDefinition) -> Result<Self> {
        let gains = definition
            .gains
            .iter()
            .map(|(band, gain)| Ok((band.parse::<FrequencyBand>()?, *gain)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(definition.name.clone(), gains))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gain(&self, band: FrequencyBand) -> f64 {
        self.gains[band.index()]
    }

    /// Gains in canonical band order
    pub fn gains(&self) -> impl Iterator<Item = (FrequencyBand, f64)> + '_ {
        FrequencyBand::ALL
            .into_iter()
            .map(move |band| (band, self.gain(band)))
    }

    /// Linear interpolation towards `other`
    ///
    /// `ratio` is clamped into `[0, 1]`; 0 reproduces `self`'s gains and 1
    /// reproduces `other`'s. The result is named `blend(<self>,<other>)`.
    pub fn blend(&self, other: &EqualizerPreset, ratio: f64) -> EqualizerPreset {
        let ratio = ratio.clamp(0.0, 1.0);
        let mut gains = [0.0; NUM_BANDS];
        for (i, gain) in gains.iter_mut().enumerate() {
            *gain = self.gains[i] * (1.0 - ratio) + other.gains[i] * ratio;
        }
        EqualizerPreset {
            name: format!("blend({},{})", self.name, other.name),
            gains,
        }
    }

    /// Band-for-band equality of gains, ignoring names
    pub fn same_gains(&self, other: &EqualizerPreset) -> bool {
        self.gains == other.gains
    }
}

/// Registry of named presets
#[derive(Debug, Clone, Default)]
pub struct EqualizerBank {
    presets: BTreeMap<String, EqualizerPreset>,
}

impl EqualizerBank {
    /// Empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank holding `presets`; later duplicates replace earlier ones
    pub fn with_presets<I>(presets: I) -> Self
    where
        I: IntoIterator<Item = EqualizerPreset>,
    {
        let mut bank = Self::new();
        for preset in presets {
            bank.add_preset(preset);
        }
        bank
    }

    /// `flat`, `bass_boost` and `acoustic`
    pub fn builtin() -> Self {
        Self::with_presets([
            EqualizerPreset::flat(FLAT_PRESET),
            EqualizerPreset::new(
                "bass_boost",
                [(FrequencyBand::Bass, 4.0), (FrequencyBand::LowMid, 2.0)],
            ),
            EqualizerPreset::new(
                "acoustic",
                [
                    (FrequencyBand::Mid, 2.5),
                    (FrequencyBand::Presence, 3.0),
                    (FrequencyBand::Brilliance, 2.0),
                ],
            ),
        ])
    }

    /// Built-in presets followed by config-defined ones
    pub fn from_definitions(definitions: &[PresetDefinition]) -> Result<Self> {
        let mut bank = Self::builtin();
        for definition in definitions {
            bank.add_preset(EqualizerPreset::from_definition(definition)?);
        }
        Ok(bank)
    }

    /// Register a preset, replacing any existing preset of the same name
    pub fn add_preset(&mut self, preset: EqualizerPreset) {
        self.presets.insert(preset.name.clone(), preset);
    }

    pub fn get(&self, name: &str) -> Result<&EqualizerPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Equalizer preset {:?} not found", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Step from preset `from` to preset `to`
    ///
    /// With `steps <= 1` the sequence is just the `to` preset. Otherwise it
    /// yields `steps` blends at ratios `1/steps, 2/steps, ..., 1.0`.
    pub fn transition(&self, from: &str, to: &str, steps: usize) -> Result<Transition> {
        let start = self.get(from)?.clone();
        let end = self.get(to)?.clone();
        Ok(Transition::new(start, end, steps))
    }
}

/// Lazily computed sequence of presets between two endpoints
///
/// Consumed as it is iterated; it cannot be restarted.
#[derive(Debug)]
pub struct Transition {
    start: EqualizerPreset,
    end: EqualizerPreset,
    steps: usize,
    next_step: usize,
}

impl Transition {
    fn new(start: EqualizerPreset, end: EqualizerPreset, steps: usize) -> Self {
        Self {
            start,
            end,
            steps,
            next_step: 1,
        }
    }

    fn total(&self) -> usize {
        self.steps.max(1)
    }
}

impl Iterator for Transition {
    type Item = EqualizerPreset;

    fn next(&mut self) -> Option<EqualizerPreset> {
        if self.next_step > self.total() {
            return None;
        }
        let step = self.next_step;
        self.next_step += 1;

        if self.steps <= 1 {
            return Some(self.end.clone());
        }
        let ratio = step as f64 / self.steps as f64;
        Some(self.start.blend(&self.end, ratio))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total() + 1).saturating_sub(self.next_step);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Transition {}

impl FusedIterator for Transition {}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_gain(preset: &EqualizerPreset, band: FrequencyBand, expected: f64) {
        let actual = preset.gain(band);
        assert!(
            (actual - expected).abs() < EPSILON,
            "{} {} should be {}, got {}",
            preset.name(),
            band,
            expected,
            actual
        );
    }

    #[test]
    fn test_missing_bands_default_to_zero() {
        let preset = EqualizerPreset::new("bass_only", [(FrequencyBand::Bass, 3.0)]);
        for band in FrequencyBand::ALL {
            let expected = if band == FrequencyBand::Bass { 3.0 } else { 0.0 };
            assert_gain(&preset, band, expected);
        }
        assert_eq!(preset.gains().count(), NUM_BANDS);
    }

    #[test]
    fn test_band_names_round_trip() {
        for band in FrequencyBand::ALL {
            assert_eq!(band.as_str().parse::<FrequencyBand>().unwrap(), band);
        }
        assert!(matches!(
            "treble".parse::<FrequencyBand>(),
            Err(Error::InvalidField(_))
        ));
    }

    #[test]
    fn test_blend_midpoint() {
        let bank = EqualizerBank::builtin();
        let flat = bank.get("flat").unwrap();
        let boost = bank.get("bass_boost").unwrap();

        let half = flat.blend(boost, 0.5);
        assert_eq!(half.name(), "blend(flat,bass_boost)");
        assert_gain(&half, FrequencyBand::Bass, 2.0);
        assert_gain(&half, FrequencyBand::LowMid, 1.0);
        assert_gain(&half, FrequencyBand::Mid, 0.0);
    }

    #[test]
    fn test_blend_clamps_ratio() {
        let bank = EqualizerBank::builtin();
        let acoustic = bank.get("acoustic").unwrap();
        let boost = bank.get("bass_boost").unwrap();

        assert!(acoustic.blend(boost, -3.0).same_gains(&acoustic.blend(boost, 0.0)));
        assert!(acoustic.blend(boost, 7.5).same_gains(&acoustic.blend(boost, 1.0)));
        assert!(acoustic.blend(boost, 0.0).same_gains(acoustic));
        assert!(acoustic.blend(boost, 1.0).same_gains(boost));
    }

    #[test]
    fn test_blend_leaves_operands_untouched() {
        let flat = EqualizerPreset::flat("flat");
        let boost = EqualizerPreset::new("boost", [(FrequencyBand::Sub, 6.0)]);
        let _ = flat.blend(&boost, 0.25);
        assert_gain(&flat, FrequencyBand::Sub, 0.0);
        assert_gain(&boost, FrequencyBand::Sub, 6.0);
    }

    #[test]
    fn test_duplicate_registration_last_write_wins() {
        let mut bank = EqualizerBank::builtin();
        bank.add_preset(EqualizerPreset::new("acoustic", [(FrequencyBand::Mid, -1.0)]));

        assert_eq!(bank.len(), 3);
        assert_gain(bank.get("acoustic").unwrap(), FrequencyBand::Mid, -1.0);
        assert_gain(bank.get("acoustic").unwrap(), FrequencyBand::Presence, 0.0);
    }

    #[test]
    fn test_get_unknown_preset() {
        let bank = EqualizerBank::builtin();
        assert!(bank.get("loudness").unwrap_err().is_not_found());
    }

    #[test]
    fn test_transition_single_step_yields_target() {
        let bank = EqualizerBank::builtin();
        for steps in [0, 1] {
            let presets: Vec<_> = bank.transition("flat", "acoustic", steps).unwrap().collect();
            assert_eq!(presets.len(), 1);
            assert_eq!(&presets[0], bank.get("acoustic").unwrap());
        }
    }

    #[test]
    fn test_transition_two_steps() {
        let bank = EqualizerBank::builtin();
        let presets: Vec<_> = bank.transition("flat", "bass_boost", 2).unwrap().collect();

        assert_eq!(presets.len(), 2);
        assert_gain(&presets[0], FrequencyBand::Bass, 2.0);
        assert_gain(&presets[0], FrequencyBand::LowMid, 1.0);
        assert_gain(&presets[1], FrequencyBand::Bass, 4.0);
        assert_gain(&presets[1], FrequencyBand::LowMid, 2.0);
        for preset in &presets {
            for band in [
                FrequencyBand::Sub,
                FrequencyBand::Mid,
                FrequencyBand::HighMid,
                FrequencyBand::Presence,
                FrequencyBand::Brilliance,
            ] {
                assert_gain(preset, band, 0.0);
            }
        }
    }

    #[test]
    fn test_transition_length_and_final_gains() {
        let bank = EqualizerBank::builtin();
        let target = bank.get("acoustic").unwrap();
        for steps in 2..12 {
            let presets: Vec<_> = bank.transition("bass_boost", "acoustic", steps).unwrap().collect();
            assert_eq!(presets.len(), steps);
            let last = presets.last().unwrap();
            assert_eq!(last.name(), "blend(bass_boost,acoustic)");
            for band in FrequencyBand::ALL {
                assert_gain(last, band, target.gain(band));
            }
        }
    }

    #[test]
    fn test_transition_is_exact_size_and_fused() {
        let bank = EqualizerBank::builtin();
        let mut transition = bank.transition("flat", "bass_boost", 4).unwrap();
        assert_eq!(transition.len(), 4);
        transition.next();
        assert_eq!(transition.len(), 3);
        assert_eq!(transition.by_ref().count(), 3);
        assert!(transition.next().is_none());
        assert!(transition.next().is_none());
    }

    #[test]
    fn test_transition_unknown_endpoint() {
        let bank = EqualizerBank::builtin();
        assert!(bank.transition("flat", "missing", 3).unwrap_err().is_not_found());
        assert!(bank.transition("missing", "flat", 3).unwrap_err().is_not_found());
    }

    #[test]
    fn test_from_definitions_adds_user_presets() {
        let mut gains = BTreeMap::new();
        gains.insert("presence".to_string(), 3.5);
        let definitions = vec![PresetDefinition {
            name: "vocal".to_string(),
            gains,
        }];

        let bank = EqualizerBank::from_definitions(&definitions).unwrap();
        assert!(bank.contains("flat"));
        assert_gain(bank.get("vocal").unwrap(), FrequencyBand::Presence, 3.5);
    }

    #[test]
    fn test_from_definitions_rejects_unknown_band() {
        let mut gains = BTreeMap::new();
        gains.insert("treble".to_string(), 1.0);
        let definitions = vec![PresetDefinition {
            name: "bad".to_string(),
            gains,
        }];

        assert!(matches!(
            EqualizerBank::from_definitions(&definitions),
            Err(Error::InvalidField(_))
        ));
    }
}
