//! WCAG 2.x luminance and contrast helpers used to pick legible text colors for swatches.

use palette::{LinSrgb, Srgb};

pub const WHITE: (u8, u8, u8) = (255, 255, 255);
pub const BLACK: (u8, u8, u8) = (0, 0, 0);

// binary search bounds for minimum_alpha, same as androidx.core ColorUtils
const MIN_ALPHA_SEARCH_MAX_ITERATIONS: u32 = 10;
const MIN_ALPHA_SEARCH_PRECISION: u8 = 1;

/// Return the relative luminance of an sRGB color, in the range 0.0 to 1.0.
pub fn relative_luminance(rgb: (u8, u8, u8)) -> f32 {
    let srgb: Srgb<f32> = Srgb::from_components(rgb).into_format();
    let linear: LinSrgb<f32> = srgb.into_linear();

    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

/// Return the contrast ratio between two opaque colors. The result is always at least 1.0 and at most 21.0, regardless
/// of argument order.
pub fn contrast_ratio(a: (u8, u8, u8), b: (u8, u8, u8)) -> f32 {
    let (a, b) = (relative_luminance(a), relative_luminance(b));
    let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };

    (lighter + 0.05) / (darker + 0.05)
}

/// Pick whichever of the two candidate colors contrasts more against the background. On a tie the dark candidate is
/// returned.
pub fn label_color(background: (u8, u8, u8), light: (u8, u8, u8), dark: (u8, u8, u8)) -> (u8, u8, u8) {
    if contrast_ratio(light, background) > contrast_ratio(dark, background) {
        light
    } else {
        dark
    }
}

/// Composite a translucent foreground over an opaque background.
pub fn composite((fr, fg, fb): (u8, u8, u8), alpha: u8, (br, bg, bb): (u8, u8, u8)) -> (u8, u8, u8) {
    let channel = |f: u8, b: u8| ((f as u32 * alpha as u32 + b as u32 * (255 - alpha as u32)) / 255) as u8;
    (channel(fr, br), channel(fg, bg), channel(fb, bb))
}

/// Find the smallest alpha the foreground can be drawn with over the background while still reaching the given
/// contrast ratio. Returns `None` if even the fully opaque foreground doesn't reach it.
pub fn minimum_alpha(foreground: (u8, u8, u8), background: (u8, u8, u8), min_contrast_ratio: f32) -> Option<u8> {
    if contrast_ratio(foreground, background) < min_contrast_ratio {
        return None;
    }

    let mut min_alpha = 0u8;
    let mut max_alpha = 255u8;
    let mut iterations = 0;

    while iterations <= MIN_ALPHA_SEARCH_MAX_ITERATIONS && max_alpha - min_alpha > MIN_ALPHA_SEARCH_PRECISION {
        let test_alpha = ((min_alpha as u16 + max_alpha as u16) / 2) as u8;
        let blended = composite(foreground, test_alpha, background);

        if contrast_ratio(blended, background) < min_contrast_ratio {
            min_alpha = test_alpha;
        } else {
            max_alpha = test_alpha;
        }

        iterations += 1;
    }

    Some(max_alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn black_and_white_have_maximum_contrast() {
        let ratio = contrast_ratio(BLACK, WHITE);
        assert!((ratio - 21.0).abs() < 0.01, "got {ratio}");
        assert_eq!(contrast_ratio(WHITE, BLACK), ratio);
    }

    #[test]
    fn identical_colors_have_no_contrast() {
        let ratio = contrast_ratio((120, 40, 200), (120, 40, 200));
        assert!((ratio - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn luminance_is_ordered_by_lightness() {
        assert_eq!(relative_luminance(BLACK), 0.0);
        assert!((relative_luminance(WHITE) - 1.0).abs() < 0.001);
        assert!(relative_luminance((128, 128, 128)) < relative_luminance((200, 200, 200)));
    }

    #[test]
    fn label_color_picks_the_more_legible_candidate() {
        assert_eq!(label_color(WHITE, WHITE, BLACK), BLACK);
        assert_eq!(label_color(BLACK, WHITE, BLACK), WHITE);
        assert_eq!(label_color((0, 0, 128), WHITE, BLACK), WHITE);
        assert_eq!(label_color((255, 235, 59), WHITE, BLACK), BLACK);
    }

    #[test]
    fn composite_endpoints() {
        assert_eq!(composite(WHITE, 255, BLACK), WHITE);
        assert_eq!(composite(WHITE, 0, BLACK), BLACK);
        assert_eq!(composite(WHITE, 51, BLACK), (51, 51, 51));
    }

    #[test]
    fn minimum_alpha_reaches_requested_contrast() {
        let background = (20, 30, 90);
        let alpha = minimum_alpha(WHITE, background, 4.5).expect("white is legible on dark blue");

        assert!(alpha < 255);
        assert!(contrast_ratio(composite(WHITE, alpha, background), background) >= 4.5);
    }

    #[test]
    fn minimum_alpha_fails_when_unreachable() {
        assert_eq!(minimum_alpha(WHITE, (250, 250, 250), 3.0), None);
    }
}
