const BLACK_MAX_LIGHTNESS: f32 = 0.05;
const WHITE_MIN_LIGHTNESS: f32 = 0.95;

/// A trait used to keep swatches out of the named palette slots.
///
/// Filters are consulted after quantization, when swatches are matched against targets. A swatch any filter disallows
/// won't be selected for any target. Filters never affect the dominant swatch, which is always picked from every
/// swatch the image produced.
///
/// See [`crate::PaletteBuilder::add_filter`] on how to add filters to the palette generation.
pub trait Filter {
    /// Return whether a given color should be allowed or not. The same color is given in both sRGB and HSL for
    /// convenience.
    fn is_allowed(&self, rgb: (u8, u8, u8), hsl: (f32, f32, f32)) -> bool;
}

impl<F> Filter for F
where
    F: Fn((u8, u8, u8), (f32, f32, f32)) -> bool,
{
    fn is_allowed(&self, rgb: (u8, u8, u8), hsl: (f32, f32, f32)) -> bool {
        self(rgb, hsl)
    }
}

/// The default filter included in every [`crate::PaletteBuilder`] by default.
///
/// This filter will disallow colors very close to black, colors very close to white, and colors near the red I line
/// (the hues of human skin tones).
#[derive(Debug)]
pub struct DefaultFilter;
impl Filter for DefaultFilter {
    fn is_allowed(&self, rgb: (u8, u8, u8), (h, s, l): (f32, f32, f32)) -> bool {
        LightnessFilter::default().is_allowed(rgb, (h, s, l)) && !is_near_red_i_line(h, s)
    }
}

/// A filter that disallows colors darker or lighter than the given bounds.
#[derive(Debug, Clone, Copy)]
pub struct LightnessFilter {
    /// Colors with lightness at or below this are considered black.
    pub black_max_lightness: f32,
    /// Colors with lightness at or above this are considered white.
    pub white_min_lightness: f32,
}

impl Default for LightnessFilter {
    fn default() -> Self {
        Self {
            black_max_lightness: BLACK_MAX_LIGHTNESS,
            white_min_lightness: WHITE_MIN_LIGHTNESS,
        }
    }
}

impl Filter for LightnessFilter {
    fn is_allowed(&self, _: (u8, u8, u8), (_, _, l): (f32, f32, f32)) -> bool {
        l > self.black_max_lightness && l < self.white_min_lightness
    }
}

fn is_near_red_i_line(h: f32, s: f32) -> bool {
    (10.0..=37.0).contains(&h) && s <= 0.82
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_rejects_extremes() {
        assert!(!DefaultFilter.is_allowed((0, 0, 0), (0.0, 0.0, 0.0)));
        assert!(!DefaultFilter.is_allowed((255, 255, 255), (0.0, 0.0, 1.0)));
        assert!(DefaultFilter.is_allowed((255, 0, 0), (0.0, 1.0, 0.5)));
    }

    #[test]
    fn default_filter_rejects_skin_tones() {
        assert!(!DefaultFilter.is_allowed((210, 150, 120), (20.0, 0.5, 0.65)));
        assert!(DefaultFilter.is_allowed((255, 120, 0), (28.0, 1.0, 0.5)));
    }

    #[test]
    fn lightness_filter_bounds() {
        let filter = LightnessFilter {
            black_max_lightness: 0.02,
            white_min_lightness: 0.9,
        };

        assert!(filter.is_allowed((8, 8, 8), (0.0, 0.0, 0.03)));
        assert!(!filter.is_allowed((240, 240, 240), (0.0, 0.0, 0.94)));
    }

    #[test]
    fn closures_are_filters() {
        let no_blue = |(_, _, b): (u8, u8, u8), _: (f32, f32, f32)| b < 128;

        assert!(no_blue.is_allowed((255, 0, 0), (0.0, 1.0, 0.5)));
        assert!(!no_blue.is_allowed((0, 0, 255), (240.0, 1.0, 0.5)));
    }
}
