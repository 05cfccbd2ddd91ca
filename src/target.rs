use std::hash::Hash;

const WEIGHT_SATURATION: f32 = 0.24;
const WEIGHT_LUMA: f32 = 0.52;
const WEIGHT_POPULATION: f32 = 0.24;

const MIN_VIBRANT_SATURATION: f32 = 0.35;
const TARGET_VIBRANT_SATURATION: f32 = 1.0;

const TARGET_MUTED_SATURATION: f32 = 0.3;
const MAX_MUTED_SATURATION: f32 = 0.4;

const MIN_LIGHT_LUMA: f32 = 0.55;
const TARGET_LIGHT_LUMA: f32 = 0.74;

const TARGET_DARK_LUMA: f32 = 0.26;
const MAX_DARK_LUMA: f32 = 0.45;

const MIN_NORMAL_LUMA: f32 = 0.3;
const TARGET_NORMAL_LUMA: f32 = 0.5;
const MAX_NORMAL_LUMA: f32 = 0.7;

// ids of the built-in targets. custom targets get a random id
const VIBRANT_ID: u64 = 0;
const DARK_VIBRANT_ID: u64 = 1;
const LIGHT_VIBRANT_ID: u64 = 2;
const MUTED_ID: u64 = 3;
const DARK_MUTED_ID: u64 = 4;
const LIGHT_MUTED_ID: u64 = 5;

/// The named slots of a [`crate::Palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    Dominant,
    Vibrant,
    LightVibrant,
    DarkVibrant,
    Muted,
    LightMuted,
    DarkMuted,
}

impl Slot {
    /// Every slot, in display order.
    pub const ALL: [Slot; 7] = [
        Slot::Dominant,
        Slot::LightVibrant,
        Slot::Vibrant,
        Slot::DarkVibrant,
        Slot::LightMuted,
        Slot::Muted,
        Slot::DarkMuted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Dominant => "Dominant",
            Slot::Vibrant => "Vibrant",
            Slot::LightVibrant => "Light Vibrant",
            Slot::DarkVibrant => "Dark Vibrant",
            Slot::Muted => "Muted",
            Slot::LightMuted => "Light Muted",
            Slot::DarkMuted => "Dark Muted",
        }
    }

    /// The target a slot is matched against. The dominant slot has none; it's always the most populous swatch.
    pub fn target(self) -> Option<Target> {
        match self {
            Slot::Dominant => None,
            Slot::Vibrant => Some(Target::vibrant()),
            Slot::LightVibrant => Some(Target::light_vibrant()),
            Slot::DarkVibrant => Some(Target::dark_vibrant()),
            Slot::Muted => Some(Target::muted()),
            Slot::LightMuted => Some(Target::light_muted()),
            Slot::DarkMuted => Some(Target::dark_muted()),
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of saturation and lightness ranges a swatch is matched against.
///
/// A swatch is a candidate for a target if both its saturation and lightness are within the target's minimum and
/// maximum values, inclusive. Among the candidates the one with the highest score is selected, where the score weighs
/// how close the swatch's saturation and lightness are to the target values, and how populous the swatch is relative
/// to the dominant swatch.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    name: u64,
    // min, target, max
    saturation_targets: (f32, f32, f32),
    // min, target, max
    lightness_targets: (f32, f32, f32),
    // sat, luma, pop
    weights: (f32, f32, f32),
    is_exclusive: bool,
}

impl Target {
    /// The built-in targets, in the order they are assigned swatches in.
    pub fn default_targets() -> [Target; 6] {
        [
            Target::vibrant(),
            Target::dark_vibrant(),
            Target::light_vibrant(),
            Target::muted(),
            Target::dark_muted(),
            Target::light_muted(),
        ]
    }

    pub fn light_vibrant() -> Target {
        Target {
            name: LIGHT_VIBRANT_ID,
            saturation_targets: (MIN_VIBRANT_SATURATION, TARGET_VIBRANT_SATURATION, 1.0),
            lightness_targets: (MIN_LIGHT_LUMA, TARGET_LIGHT_LUMA, 1.0),
            ..Target::new()
        }
    }

    pub fn vibrant() -> Target {
        Target {
            name: VIBRANT_ID,
            saturation_targets: (MIN_VIBRANT_SATURATION, TARGET_VIBRANT_SATURATION, 1.0),
            lightness_targets: (MIN_NORMAL_LUMA, TARGET_NORMAL_LUMA, MAX_NORMAL_LUMA),
            ..Target::new()
        }
    }

    pub fn dark_vibrant() -> Target {
        Target {
            name: DARK_VIBRANT_ID,
            saturation_targets: (MIN_VIBRANT_SATURATION, TARGET_VIBRANT_SATURATION, 1.0),
            lightness_targets: (0.0, TARGET_DARK_LUMA, MAX_DARK_LUMA),
            ..Target::new()
        }
    }

    pub fn light_muted() -> Target {
        Target {
            name: LIGHT_MUTED_ID,
            saturation_targets: (0.0, TARGET_MUTED_SATURATION, MAX_MUTED_SATURATION),
            lightness_targets: (MIN_LIGHT_LUMA, TARGET_LIGHT_LUMA, 1.0),
            ..Target::new()
        }
    }

    pub fn muted() -> Target {
        Target {
            name: MUTED_ID,
            saturation_targets: (0.0, TARGET_MUTED_SATURATION, MAX_MUTED_SATURATION),
            lightness_targets: (MIN_NORMAL_LUMA, TARGET_NORMAL_LUMA, MAX_NORMAL_LUMA),
            ..Target::new()
        }
    }

    pub fn dark_muted() -> Target {
        Target {
            name: DARK_MUTED_ID,
            saturation_targets: (0.0, TARGET_MUTED_SATURATION, MAX_MUTED_SATURATION),
            lightness_targets: (0.0, TARGET_DARK_LUMA, MAX_DARK_LUMA),
            ..Target::new()
        }
    }

    /// Create a new custom target that accepts any saturation and lightness, aiming for the middle of both. Each call
    /// creates a distinct target.
    pub fn new() -> Self {
        Self {
            name: rand::random::<u64>().max(LIGHT_MUTED_ID + 1),
            saturation_targets: (0.0, 0.5, 1.0),
            lightness_targets: (0.0, 0.5, 1.0),
            weights: (WEIGHT_SATURATION, WEIGHT_LUMA, WEIGHT_POPULATION),
            is_exclusive: true,
        }
    }

    /// Set the minimum, target and maximum saturation. Values are clamped to 0.0 to 1.0.
    pub fn with_saturation(self, minimum: f32, target: f32, maximum: f32) -> Self {
        Self {
            saturation_targets: clamp_targets(minimum, target, maximum),
            ..self
        }
    }

    /// Set the minimum, target and maximum lightness. Values are clamped to 0.0 to 1.0.
    pub fn with_lightness(self, minimum: f32, target: f32, maximum: f32) -> Self {
        Self {
            lightness_targets: clamp_targets(minimum, target, maximum),
            ..self
        }
    }

    /// Set the relative importance of saturation, lightness and population when scoring swatches. Negative weights
    /// are treated as zero. The weights don't need to sum to 1; they are normalized when the palette is generated.
    pub fn with_weights(self, saturation: f32, lightness: f32, population: f32) -> Self {
        Self {
            weights: (saturation.max(0.0), lightness.max(0.0), population.max(0.0)),
            ..self
        }
    }

    /// Set whether a swatch selected for this target is removed from consideration for the targets after it.
    pub fn with_exclusive(self, is_exclusive: bool) -> Self {
        Self { is_exclusive, ..self }
    }

    pub(crate) fn id(self) -> u64 {
        self.name
    }

    pub(crate) fn normalize_weights(&mut self) {
        let weights_sum = self.weights.0 + self.weights.1 + self.weights.2;

        if weights_sum != 0.0 {
            if self.weights.0 > 0.0 {
                self.weights.0 /= weights_sum;
            }

            if self.weights.1 > 0.0 {
                self.weights.1 /= weights_sum;
            }

            if self.weights.2 > 0.0 {
                self.weights.2 /= weights_sum;
            }
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

    pub fn saturation_weight(self) -> f32 {
        self.weights.0
    }

    pub fn lightness_weight(self) -> f32 {
        self.weights.1
    }

    pub fn population_weight(self) -> f32 {
        self.weights.2
    }

    pub fn is_exclusive(self) -> bool {
        self.is_exclusive
    }

    /// Return whether the given saturation and lightness fall within this target's ranges.
    pub fn accepts(self, saturation: f32, lightness: f32) -> bool {
        (self.minimum_saturation()..=self.maximum_saturation()).contains(&saturation)
            && (self.minimum_lightness()..=self.maximum_lightness()).contains(&lightness)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new()
    }
}

impl Eq for Target {}
impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Target {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

fn clamp_targets(minimum: f32, target: f32, maximum: f32) -> (f32, f32, f32) {
    let minimum = if minimum.is_nan() { 0.0 } else { minimum.clamp(0.0, 1.0) };
    let maximum = if maximum.is_nan() { 1.0 } else { maximum.clamp(minimum, 1.0) };
    let target = if target.is_nan() { (minimum + maximum) / 2.0 } else { target.clamp(minimum, maximum) };

    (minimum, target, maximum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_targets_are_in_assignment_order() {
        let slots: Vec<_> = Target::default_targets()
            .iter()
            .map(|target| Slot::ALL.into_iter().find(|slot| slot.target() == Some(*target)))
            .collect();

        assert_eq!(
            slots,
            vec![
                Some(Slot::Vibrant),
                Some(Slot::DarkVibrant),
                Some(Slot::LightVibrant),
                Some(Slot::Muted),
                Some(Slot::DarkMuted),
                Some(Slot::LightMuted),
            ]
        );
    }

    #[test]
    fn dark_ranges_include_zero_lightness() {
        assert!(Target::dark_muted().accepts(0.0, 0.0));
        assert!(Target::dark_vibrant().accepts(1.0, 0.0));
        assert!(!Target::muted().accepts(0.0, 0.0));
    }

    #[test]
    fn custom_targets_are_distinct() {
        let a = Target::new();
        let b = Target::new();

        assert_ne!(a, b);
        assert_eq!(a, a.with_exclusive(false));
        assert!(Target::default_targets().iter().all(|target| *target != a));
    }

    #[test]
    fn weights_are_normalized() {
        let mut target = Target::new().with_weights(1.0, 3.0, 0.0);
        target.normalize_weights();

        assert_eq!(target.saturation_weight(), 0.25);
        assert_eq!(target.lightness_weight(), 0.75);
        assert_eq!(target.population_weight(), 0.0);
    }

    #[test]
    fn ranges_are_clamped() {
        let target = Target::new().with_lightness(-1.0, 2.0, 0.5);

        assert_eq!(target.minimum_lightness(), 0.0);
        assert_eq!(target.target_lightness(), 0.5);
        assert_eq!(target.maximum_lightness(), 0.5);
    }

    #[test]
    fn nan_ranges_fall_back_to_bounds() {
        let target = Target::new().with_lightness(f32::NAN, 0.5, 1.0);
        assert_eq!(
            (target.minimum_lightness(), target.target_lightness(), target.maximum_lightness()),
            (0.0, 0.5, 1.0)
        );

        let target = Target::new().with_saturation(0.2, f32::NAN, f32::NAN);
        assert_eq!(
            (target.minimum_saturation(), target.target_saturation(), target.maximum_saturation()),
            (0.2, 0.6, 1.0)
        );
    }
}
