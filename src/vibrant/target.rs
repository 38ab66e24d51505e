use std::fmt;

const WEIGHT_SATURATION: f32 = 3.0;
const WEIGHT_LUMA: f32 = 6.5;
const WEIGHT_POPULATION: f32 = 0.5;

const MIN_VIBRANT_SATURATION: f32 = 0.35;
const TARGET_VIBRANT_SATURATION: f32 = 1.0;

pub(crate) const TARGET_MUTED_SATURATION: f32 = 0.3;
const MAX_MUTED_SATURATION: f32 = 0.4;

const MIN_LIGHT_LUMA: f32 = 0.55;
pub(crate) const TARGET_LIGHT_LUMA: f32 = 0.74;

pub(crate) const TARGET_DARK_LUMA: f32 = 0.26;
const MAX_DARK_LUMA: f32 = 0.45;

const MIN_NORMAL_LUMA: f32 = 0.3;
pub(crate) const TARGET_NORMAL_LUMA: f32 = 0.5;
const MAX_NORMAL_LUMA: f32 = 0.7;

/// The named swatches a [`crate::Palette`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum SwatchKind {
    Vibrant,
    LightVibrant,
    DarkVibrant,
    Muted,
    LightMuted,
    DarkMuted,
}

impl SwatchKind {
    /// Every kind, in the order swatches are selected for them.
    pub const ALL: [SwatchKind; 6] = [
        SwatchKind::Vibrant,
        SwatchKind::LightVibrant,
        SwatchKind::DarkVibrant,
        SwatchKind::Muted,
        SwatchKind::LightMuted,
        SwatchKind::DarkMuted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SwatchKind::Vibrant => "vibrant",
            SwatchKind::LightVibrant => "light-vibrant",
            SwatchKind::DarkVibrant => "dark-vibrant",
            SwatchKind::Muted => "muted",
            SwatchKind::LightMuted => "light-muted",
            SwatchKind::DarkMuted => "dark-muted",
        }
    }

    pub fn target(self) -> Target {
        match self {
            SwatchKind::Vibrant => Target::vibrant_saturation().with_lightness(Target::NORMAL),
            SwatchKind::LightVibrant => Target::vibrant_saturation().with_lightness(Target::LIGHT),
            SwatchKind::DarkVibrant => Target::vibrant_saturation().with_lightness(Target::DARK),
            SwatchKind::Muted => Target::muted_saturation().with_lightness(Target::NORMAL),
            SwatchKind::LightMuted => Target::muted_saturation().with_lightness(Target::LIGHT),
            SwatchKind::DarkMuted => Target::muted_saturation().with_lightness(Target::DARK),
        }
    }
}

impl fmt::Display for SwatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Saturation and lightness ranges a swatch has to fall in to be picked for a [`SwatchKind`], and the weights used to
/// score the candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    // min, target, max
    saturation_targets: (f32, f32, f32),
    // min, target, max
    lightness_targets: (f32, f32, f32),
    // sat, luma, pop
    weights: (f32, f32, f32),
}

impl Target {
    const NORMAL: (f32, f32, f32) = (MIN_NORMAL_LUMA, TARGET_NORMAL_LUMA, MAX_NORMAL_LUMA);
    const LIGHT: (f32, f32, f32) = (MIN_LIGHT_LUMA, TARGET_LIGHT_LUMA, 1.0);
    const DARK: (f32, f32, f32) = (0.0, TARGET_DARK_LUMA, MAX_DARK_LUMA);

    fn vibrant_saturation() -> Target {
        Target {
            saturation_targets: (MIN_VIBRANT_SATURATION, TARGET_VIBRANT_SATURATION, 1.0),
            ..Target::default()
        }
    }

    fn muted_saturation() -> Target {
        Target {
            saturation_targets: (0.0, TARGET_MUTED_SATURATION, MAX_MUTED_SATURATION),
            ..Target::default()
        }
    }

    fn with_lightness(self, lightness_targets: (f32, f32, f32)) -> Target {
        Target {
            lightness_targets,
            ..self
        }
    }

    pub fn minimum_saturation(self) -> f32 {
        self.saturation_targets.0
    }

    pub fn target_saturation(self) -> f32 {
        self.saturation_targets.1
    }

    pub fn maximum_saturation(self) -> f32 {
        self.saturation_targets.2
    }

    pub fn minimum_lightness(self) -> f32 {
        self.lightness_targets.0
    }

    pub fn target_lightness(self) -> f32 {
        self.lightness_targets.1
    }

    pub fn maximum_lightness(self) -> f32 {
        self.lightness_targets.2
    }

    /// Whether a color with the given saturation and lightness falls within this target's ranges, bounds included.
    pub fn accepts(self, saturation: f32, lightness: f32) -> bool {
        (self.minimum_saturation()..=self.maximum_saturation()).contains(&saturation)
            && (self.minimum_lightness()..=self.maximum_lightness()).contains(&lightness)
    }

    /// Weighted mean of how close the color is to the target saturation and lightness, and how large its population
    /// is relative to the most populous swatch.
    pub fn score(self, saturation: f32, lightness: f32, population: u32, max_population: u32) -> f32 {
        let (saturation_weight, lightness_weight, population_weight) = self.weights;
        let weights_sum = saturation_weight + lightness_weight + population_weight;

        if weights_sum == 0.0 {
            return 0.0;
        }

        let population_share = if max_population > 0 {
            population as f32 / max_population as f32
        } else {
            0.0
        };

        let sum = saturation_weight * invert_diff(saturation, self.target_saturation())
            + lightness_weight * invert_diff(lightness, self.target_lightness())
            + population_weight * population_share;

        sum / weights_sum
    }
}

impl Default for Target {
    fn default() -> Self {
        Self {
            saturation_targets: (0.0, 0.5, 1.0),
            lightness_targets: (0.0, 0.5, 1.0),
            weights: (WEIGHT_SATURATION, WEIGHT_LUMA, WEIGHT_POPULATION),
        }
    }
}

fn invert_diff(value: f32, target: f32) -> f32 {
    1.0 - (value - target).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vibrant_accepts_saturated_mid_tones() {
        let target = SwatchKind::Vibrant.target();

        assert!(target.accepts(1.0, 0.5));
        assert!(target.accepts(0.35, 0.3));
        assert!(!target.accepts(0.2, 0.5));
        assert!(!target.accepts(1.0, 0.2));
    }

    #[test]
    fn dark_and_light_ranges_do_not_overlap() {
        let dark = SwatchKind::DarkMuted.target();
        let light = SwatchKind::LightMuted.target();

        assert!(dark.maximum_lightness() < light.minimum_lightness());
    }

    #[test]
    fn score_prefers_closer_colors() {
        let target = SwatchKind::Vibrant.target();

        let exact = target.score(1.0, 0.5, 10, 10);
        let off = target.score(0.6, 0.65, 10, 10);
        assert!(exact > off);
        assert!((exact - 1.0).abs() < 1e-6);
    }

    #[test]
    fn score_without_population_reference() {
        let target = SwatchKind::Muted.target();
        let score = target.score(0.3, 0.5, 5, 0);

        assert!((score - 9.5 / 10.0).abs() < 1e-6);
    }

    #[test]
    fn kinds_have_kebab_case_names() {
        assert_eq!(SwatchKind::DarkVibrant.to_string(), "dark-vibrant");
        assert_eq!(SwatchKind::ALL.len(), 6);
    }
}
