use crate::contrast::{self, BLACK, WHITE};

const MIN_CONTRAST_TITLE_TEXT: f32 = 3.0;
const MIN_CONTRAST_BODY_TEXT: f32 = 4.5;

/// A single representative color of an image, along with how many of the image's pixels it represents.
///
/// Each swatch also carries a label color: one of two on-colors (white and black by default) that is the most legible
/// when drawn over the swatch. See [`crate::PaletteBuilder::label_colors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swatch {
    red: u8,
    green: u8,
    blue: u8,
    population: u32,
    label: (u8, u8, u8),
}

impl Swatch {
    /// Create a new swatch with a white or black label color.
    pub fn new((red, green, blue): (u8, u8, u8), population: u32) -> Swatch {
        Self {
            red,
            green,
            blue,
            population,
            label: contrast::label_color((red, green, blue), WHITE, BLACK),
        }
    }

    /// Return a copy of this swatch whose label color is chosen between the given light and dark colors.
    pub fn with_label_colors(self, light: (u8, u8, u8), dark: (u8, u8, u8)) -> Swatch {
        Self {
            label: contrast::label_color(self.rgb(), light, dark),
            ..self
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// The color in HSL, as (hue in degrees, saturation, lightness).
    pub fn hsl(self) -> (f32, f32, f32) {
        crate::rgb_to_hsl(self.rgb())
    }

    pub fn population(self) -> u32 {
        self.population
    }

    /// The opaque color text drawn over this swatch should use.
    pub fn label_color(self) -> (u8, u8, u8) {
        self.label
    }

    /// The color as an uppercase `#RRGGBB` string.
    pub fn hex(self) -> String {
        hex(self.rgb())
    }

    /// A translucent white or black, as RGBA, legible for title text over this swatch.
    pub fn title_text_color(self) -> (u8, u8, u8, u8) {
        self.text_colors().0
    }

    /// A translucent white or black, as RGBA, legible for body text over this swatch. Body text needs more contrast
    /// than title text so this is never more transparent than [`Swatch::title_text_color`].
    pub fn body_text_color(self) -> (u8, u8, u8, u8) {
        self.text_colors().1
    }

    /// Blend this swatch's color with another one. A ratio of 0.0 returns this color and 1.0 returns the other.
    pub fn blend(self, (red, green, blue): (u8, u8, u8), ratio: f32) -> (u8, u8, u8) {
        let ratio = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - ratio) + b as f32 * ratio).round() as u8;

        (mix(self.red, red), mix(self.green, green), mix(self.blue, blue))
    }

    // (title, body)
    fn text_colors(self) -> ((u8, u8, u8, u8), (u8, u8, u8, u8)) {
        let rgb = self.rgb();
        let with_alpha = |(r, g, b): (u8, u8, u8), a: u8| (r, g, b, a);

        let light_body = contrast::minimum_alpha(WHITE, rgb, MIN_CONTRAST_BODY_TEXT);
        let light_title = contrast::minimum_alpha(WHITE, rgb, MIN_CONTRAST_TITLE_TEXT);

        if let (Some(body), Some(title)) = (light_body, light_title) {
            return (with_alpha(WHITE, title), with_alpha(WHITE, body));
        }

        let dark_body = contrast::minimum_alpha(BLACK, rgb, MIN_CONTRAST_BODY_TEXT);
        let dark_title = contrast::minimum_alpha(BLACK, rgb, MIN_CONTRAST_TITLE_TEXT);

        if let (Some(body), Some(title)) = (dark_body, dark_title) {
            return (with_alpha(BLACK, title), with_alpha(BLACK, body));
        }

        // neither color works for both, so mix and match whichever does. every color reaches 4.5 against either black
        // or white, so one of each pair is always present
        let title = match (light_title, dark_title) {
            (Some(alpha), _) => with_alpha(WHITE, alpha),
            (None, Some(alpha)) => with_alpha(BLACK, alpha),
            (None, None) => with_alpha(BLACK, 255),
        };

        let body = match (light_body, dark_body) {
            (Some(alpha), _) => with_alpha(WHITE, alpha),
            (None, Some(alpha)) => with_alpha(BLACK, alpha),
            (None, None) => with_alpha(BLACK, 255),
        };

        (title, body)
    }
}

/// Format a color as an uppercase `#RRGGBB` string.
pub fn hex((red, green, blue): (u8, u8, u8)) -> String {
    format!("#{red:02X}{green:02X}{blue:02X}")
}
