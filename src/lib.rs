// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Extract a named palette of prominent colors from an image.
//!
//! An image is reduced to a small set of representative colors ([`Swatch`]es) with median cut quantization. The most
//! populous swatch becomes the dominant color, and the rest are matched against six saturation and lightness
//! [`Target`]s: vibrant, light vibrant, dark vibrant, muted, light muted and dark muted. Every swatch carries a label
//! color that stays legible when drawn over it.
//!
//! The slot classification follows the Palette library in Android Jetpack. Android Jetpack is Copyright 2018 The
//! Android Open Source Project. Android Jetpack is licensed under the Apache License, Version 2.0.
//!
//! ```no_run
//! use swatchbook::PaletteBuilder;
//!
//! let image = swatchbook::image::open("cover.jpg").unwrap().to_rgba8();
//! let palette = PaletteBuilder::from_image(image).generate();
//!
//! for (slot, swatch) in palette.slots() {
//!     match swatch {
//!         Some(swatch) => println!("{slot}: {} on {:?}", swatch.hex(), swatch.label_color()),
//!         None => println!("{slot}: {}", swatchbook::NO_COLOR_LABEL),
//!     }
//! }
//! ```

pub mod contrast;

mod color_cut_quantizer;
mod error;
mod filter;
mod swatch;
mod target;

/// The maximum number of swatches an image is quantized into by default.
pub const DEFAULT_CALCULATE_NUMBER_COLORS: usize = 16;
/// Images larger than this many pixels are scaled down before quantization by default.
pub const DEFAULT_RESIZE_IMAGE_AREA: u32 = 112 * 112;
/// Pixels with an alpha below this are ignored by default, i.e. only fully transparent pixels are ignored.
pub const DEFAULT_MINIMUM_ALPHA: u8 = 1;
/// The label [`Palette::hex_label`] returns for an empty slot.
pub const NO_COLOR_LABEL: &str = "none";

pub use crate::{
    error::{Error, Result},
    filter::{DefaultFilter, Filter, LightnessFilter},
    swatch::{hex, Swatch},
    target::{Slot, Target},
};
pub use image;
pub use palette;

use color_cut_quantizer::ColorCutQuantizer;
use contrast::{BLACK, WHITE};
use image::{math::Rect, GenericImageView, ImageBuffer};
use palette::IntoColor;
use std::collections::{BTreeMap, HashSet};

/// The swatches extracted from an image, and which of them were selected for each target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    swatches: Vec<Swatch>,
    targets: Vec<Target>,
    dominant: Option<Swatch>,
    selected_swatches: BTreeMap<u64, Option<Swatch>>,
}

/// Configures and runs the palette generation for an image.
pub struct PaletteBuilder<P>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    image: ImageBuffer<P, Vec<u8>>,
    targets: Vec<Target>,
    maximum_color_count: usize,
    resize_area: u32,
    region: Option<Rect>,
    minimum_alpha: u8,
    filters: Vec<Box<dyn Filter>>,
    label_colors: ((u8, u8, u8), (u8, u8, u8)),
}

impl Palette {
    pub fn from_image<P>(image: ImageBuffer<P, Vec<u8>>) -> PaletteBuilder<P>
    where
        P: image::Pixel<Subpixel = u8> + 'static,
    {
        PaletteBuilder::from_image(image)
    }

    /// Generate a palette from already quantized swatches, using the default targets and no filters.
    pub fn from_swatches(swatches: Vec<Swatch>) -> Palette {
        Palette::generate(swatches, Target::default_targets().to_vec(), &[])
    }

    /// A palette with every slot empty.
    pub fn empty() -> Palette {
        Palette::from_swatches(Vec::new())
    }

    /// Every swatch the image was quantized into, including the ones not selected for any target.
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Return whether every slot is empty, for example when the image had no opaque pixels.
    pub fn is_empty(&self) -> bool {
        Slot::ALL.iter().all(|slot| self.swatch(*slot).is_none())
    }

    /// The swatch in a given slot, if any.
    pub fn swatch(&self, slot: Slot) -> Option<Swatch> {
        match slot.target() {
            Some(target) => self.get_swatch_for_target(target),
            None => self.dominant,
        }
    }

    /// Every slot and its swatch, in display order.
    pub fn slots(&self) -> impl Iterator<Item = (Slot, Option<Swatch>)> + '_ {
        Slot::ALL.into_iter().map(move |slot| (slot, self.swatch(slot)))
    }

    /// The uppercase `#RRGGBB` color of the swatch in a given slot, or [`NO_COLOR_LABEL`] if the slot is empty.
    pub fn hex_label(&self, slot: Slot) -> String {
        self.swatch(slot)
            .map(Swatch::hex)
            .unwrap_or_else(|| NO_COLOR_LABEL.to_string())
    }

    /// The most populous swatch in the image.
    pub fn dominant_swatch(&self) -> Option<Swatch> {
        self.dominant
    }

    pub fn light_vibrant_swatch(&self) -> Option<Swatch> {
        self.get_swatch_for_target(Target::light_vibrant())
    }

    pub fn vibrant_swatch(&self) -> Option<Swatch> {
        self.get_swatch_for_target(Target::vibrant())
    }

    pub fn dark_vibrant_swatch(&self) -> Option<Swatch> {
        self.get_swatch_for_target(Target::dark_vibrant())
    }

    pub fn light_muted_swatch(&self) -> Option<Swatch> {
        self.get_swatch_for_target(Target::light_muted())
    }

    pub fn muted_swatch(&self) -> Option<Swatch> {
        self.get_swatch_for_target(Target::muted())
    }

    pub fn dark_muted_swatch(&self) -> Option<Swatch> {
        self.get_swatch_for_target(Target::dark_muted())
    }

    pub fn dominant_color(&self) -> Option<(u8, u8, u8)> {
        self.dominant.map(|swatch| swatch.rgb())
    }

    pub fn light_vibrant_color(&self) -> Option<(u8, u8, u8)> {
        self.light_vibrant_swatch().map(|swatch| swatch.rgb())
    }

    pub fn vibrant_color(&self) -> Option<(u8, u8, u8)> {
        self.vibrant_swatch().map(|swatch| swatch.rgb())
    }

    pub fn dark_vibrant_color(&self) -> Option<(u8, u8, u8)> {
        self.dark_vibrant_swatch().map(|swatch| swatch.rgb())
    }

    pub fn light_muted_color(&self) -> Option<(u8, u8, u8)> {
        self.light_muted_swatch().map(|swatch| swatch.rgb())
    }

    pub fn muted_color(&self) -> Option<(u8, u8, u8)> {
        self.muted_swatch().map(|swatch| swatch.rgb())
    }

    pub fn dark_muted_color(&self) -> Option<(u8, u8, u8)> {
        self.dark_muted_swatch().map(|swatch| swatch.rgb())
    }

    pub fn get_swatch_for_target(&self, target: Target) -> Option<Swatch> {
        self.selected_swatches.get(&target.id()).copied().flatten()
    }

    fn generate(swatches: Vec<Swatch>, mut targets: Vec<Target>, filters: &[Box<dyn Filter>]) -> Palette {
        let dominant = find_dominant_swatch(&swatches);
        let max_population = dominant.map(|swatch| swatch.population()).unwrap_or(0);

        // filters only keep swatches out of the targets, the dominant swatch is picked from all of them
        let allowed = swatches
            .iter()
            .map(|swatch| is_allowed(filters, *swatch))
            .collect::<Vec<_>>();

        let mut selected_swatches = BTreeMap::new();
        let mut used_swatches = HashSet::new();

        for target in &mut targets {
            target.normalize_weights();

            let selected = generate_scored_target(&swatches, &allowed, *target, max_population, &mut used_swatches);
            tracing::trace!(target_id = target.id(), swatch = ?selected, "selected swatch for target");

            selected_swatches.insert(target.id(), selected);
        }

        tracing::debug!(
            swatches = swatches.len(),
            dominant = ?dominant.map(Swatch::rgb),
            "generated palette"
        );

        Self {
            swatches,
            targets,
            dominant,
            selected_swatches,
        }
    }
}

impl<P> PaletteBuilder<P>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    pub fn from_image(image: ImageBuffer<P, Vec<u8>>) -> Self {
        Self {
            image,
            targets: Target::default_targets().to_vec(),
            maximum_color_count: DEFAULT_CALCULATE_NUMBER_COLORS,
            resize_area: DEFAULT_RESIZE_IMAGE_AREA,
            region: None,
            minimum_alpha: DEFAULT_MINIMUM_ALPHA,
            filters: vec![Box::new(DefaultFilter)],
            label_colors: (WHITE, BLACK),
        }
    }

    /// Set the maximum number of swatches the image is quantized into. At least one swatch is always allowed.
    pub fn maximum_color_count(self, maximum_color_count: usize) -> Self {
        Self {
            maximum_color_count: maximum_color_count.max(1),
            ..self
        }
    }

    /// Set the area images larger than are scaled down to before quantization. 0 disables scaling.
    pub fn resize_image_area(self, resize_area: u32) -> Self {
        Self { resize_area, ..self }
    }

    /// Only use pixels within the given region of the image. The region is clamped to the image bounds.
    pub fn region(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            region: Some(Rect { x, y, width, height }),
            ..self
        }
    }

    /// Ignore pixels with an alpha below the given value.
    pub fn minimum_alpha(self, minimum_alpha: u8) -> Self {
        Self { minimum_alpha, ..self }
    }

    /// Set the light and dark colors each swatch's label color is chosen between.
    pub fn label_colors(self, light: (u8, u8, u8), dark: (u8, u8, u8)) -> Self {
        Self {
            label_colors: (light, dark),
            ..self
        }
    }

    pub fn add_target(mut self, target: Target) -> Self {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }

        self
    }

    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn clear_region(self) -> Self {
        Self { region: None, ..self }
    }

    pub fn clear_targets(self) -> Self {
        Self {
            targets: Vec::new(),
            ..self
        }
    }

    pub fn clear_filters(self) -> Self {
        Self {
            filters: Vec::new(),
            ..self
        }
    }

    pub fn generate(mut self) -> Palette {
        let (original_width, original_height) = self.image.dimensions();

        if let Some(scaled) = scale_down(&self.image, self.resize_area) {
            tracing::debug!(
                from = ?(original_width, original_height),
                to = ?scaled.dimensions(),
                "scaled image down"
            );

            if let Some(mut region) = self.region {
                // scale down the region to match the new scaled image
                let scale_x = scaled.width() as f32 / original_width as f32;
                let scale_y = scaled.height() as f32 / original_height as f32;

                region.x = (region.x as f32 * scale_x).floor() as u32;
                region.y = (region.y as f32 * scale_y).floor() as u32;
                region.width = (region.width as f32 * scale_x).ceil() as u32;
                region.height = (region.height as f32 * scale_y).ceil() as u32;

                self.region = Some(region);
            }

            self.image = scaled;
        }

        let (width, height) = self.image.dimensions();
        let region = clamp_region(self.region, width, height);

        let pixels = if region.width == 0 || region.height == 0 {
            Vec::new()
        } else {
            let minimum_alpha = self.minimum_alpha;

            self.image
                .view(region.x, region.y, region.width, region.height)
                .pixels()
                .filter_map(|(_, _, pixel)| {
                    let [r, g, b, a] = pixel.to_rgba().0;
                    (a >= minimum_alpha).then_some((r, g, b))
                })
                .collect::<Vec<_>>()
        };

        let (light, dark) = self.label_colors;
        let swatches = ColorCutQuantizer::new(pixels, self.maximum_color_count)
            .get_quantized_colors()
            .into_iter()
            .map(|swatch| swatch.with_label_colors(light, dark))
            .collect();

        Palette::generate(swatches, self.targets, &self.filters)
    }
}

impl PaletteBuilder<image::Rgba<u8>> {
    /// Create a builder from raw RGBA bytes, four per pixel in row-major order.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        validate_buffer(width, height, 4, data.len())?;

        ImageBuffer::from_raw(width, height, data)
            .map(Self::from_image)
            .ok_or_else(|| Error::invalid_input("buffer doesn't fit the image dimensions"))
    }
}

impl PaletteBuilder<image::Rgb<u8>> {
    /// Create a builder from raw RGB bytes, three per pixel in row-major order.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        validate_buffer(width, height, 3, data.len())?;

        ImageBuffer::from_raw(width, height, data)
            .map(Self::from_image)
            .ok_or_else(|| Error::invalid_input("buffer doesn't fit the image dimensions"))
    }
}

/// Scale an image down so its area is at most `resize_area`, keeping its aspect ratio. Returns `None` if the image is
/// already small enough or `resize_area` is 0. Scaling an image this returned again returns `None`.
pub fn scale_down<P>(image: &ImageBuffer<P, Vec<u8>>, resize_area: u32) -> Option<ImageBuffer<P, Vec<u8>>>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = image.dimensions();
    let area = width as u64 * height as u64;

    if resize_area == 0 || area <= resize_area as u64 {
        return None;
    }

    // round down so the result never exceeds the area and wouldn't get scaled again
    let scale_ratio = (resize_area as f64 / area as f64).sqrt();
    let scaled_width = ((width as f64 * scale_ratio).floor() as u32).max(1);
    let scaled_height = ((height as f64 * scale_ratio).floor() as u32).max(1);

    // a very elongated image rounds its short side up to 1, so the long side has to give up the difference
    let scaled_width = scaled_width.min((resize_area / scaled_height).max(1));
    let scaled_height = scaled_height.min((resize_area / scaled_width).max(1));

    Some(image::imageops::resize(
        image,
        scaled_width,
        scaled_height,
        image::imageops::FilterType::Nearest,
    ))
}

fn validate_buffer(width: u32, height: u32, channels: u64, len: usize) -> Result<()> {
    let pixels = width as u64 * height as u64;

    if pixels == 0 {
        return Err(Error::invalid_input(format!("{width}x{height} image has no pixels")));
    }

    let expected = pixels
        .checked_mul(channels)
        .ok_or_else(|| Error::invalid_input(format!("{width}x{height} image is too large")))?;

    if expected != len as u64 {
        return Err(Error::invalid_input(format!(
            "{width}x{height} image with {channels} channels needs {expected} bytes, got {len}"
        )));
    }

    Ok(())
}

fn clamp_region(region: Option<Rect>, width: u32, height: u32) -> Rect {
    match region {
        Some(region) => {
            let x = region.x.min(width);
            let y = region.y.min(height);

            Rect {
                x,
                y,
                width: region.width.min(width - x),
                height: region.height.min(height - y),
            }
        }
        None => Rect { x: 0, y: 0, width, height },
    }
}

// the first swatch wins when several share the highest population
fn find_dominant_swatch(swatches: &[Swatch]) -> Option<Swatch> {
    swatches.iter().copied().reduce(|dominant, swatch| {
        if swatch.population() > dominant.population() {
            swatch
        } else {
            dominant
        }
    })
}

fn is_allowed(filters: &[Box<dyn Filter>], swatch: Swatch) -> bool {
    let rgb = swatch.rgb();
    let hsl = swatch.hsl();

    filters.iter().all(|filter| filter.is_allowed(rgb, hsl))
}

fn generate_scored_target(
    swatches: &[Swatch],
    allowed: &[bool],
    target: Target,
    max_population: u32,
    used_swatches: &mut HashSet<usize>,
) -> Option<Swatch> {
    let (index, swatch) = get_max_scored_swatch_for_target(swatches, allowed, target, max_population, used_swatches)?;

    if target.is_exclusive() {
        used_swatches.insert(index);
    }

    Some(swatch)
}

fn get_max_scored_swatch_for_target(
    swatches: &[Swatch],
    allowed: &[bool],
    target: Target,
    max_population: u32,
    used_swatches: &HashSet<usize>,
) -> Option<(usize, Swatch)> {
    let mut max_score = 0.0;
    let mut max_score_swatch = None;

    for (index, swatch) in swatches.iter().copied().enumerate() {
        if allowed[index] && should_be_scored_for_target(index, swatch, target, used_swatches) {
            let score = generate_score(swatch, target, max_population);

            // strictly greater, so the earlier swatch keeps a tie
            if max_score_swatch.is_none() || score > max_score {
                max_score_swatch = Some((index, swatch));
                max_score = score;
            }
        }
    }

    max_score_swatch
}

fn should_be_scored_for_target(index: usize, swatch: Swatch, target: Target, used_swatches: &HashSet<usize>) -> bool {
    let (_, saturation, lightness) = swatch.hsl();

    target.accepts(saturation, lightness) && !used_swatches.contains(&index)
}

fn generate_score(swatch: Swatch, target: Target, max_population: u32) -> f32 {
    let (_, saturation, lightness) = swatch.hsl();

    let saturation_score = if target.saturation_weight() > 0.0 {
        target.saturation_weight() * (1.0 - (saturation - target.target_saturation()).abs())
    } else {
        0.0
    };

    let luminance_score = if target.lightness_weight() > 0.0 {
        target.lightness_weight() * (1.0 - (lightness - target.target_lightness()).abs())
    } else {
        0.0
    };

    let population_score = if target.population_weight() > 0.0 && max_population > 0 {
        target.population_weight() * (swatch.population() as f32 / max_population as f32)
    } else {
        0.0
    };

    saturation_score + luminance_score + population_score
}

fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let raw = palette::Srgb::from_components(rgb);
    let raw_float: palette::Srgb<f32> = raw.into_format();
    let hsl: palette::Hsl = raw_float.into_color();
    let (h, s, l) = hsl.into_components();

    (h.into_positive_degrees(), s, l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hsl_of_primaries() {
        let (h, s, l) = rgb_to_hsl((255, 0, 0));
        assert_eq!((h, s, l), (0.0, 1.0, 0.5));

        let (h, s, l) = rgb_to_hsl((0, 0, 255));
        assert!((h - 240.0).abs() < 0.01);
        assert_eq!((s, l), (1.0, 0.5));

        let (_, s, l) = rgb_to_hsl((0, 0, 0));
        assert_eq!((s, l), (0.0, 0.0));
    }

    #[test]
    fn dominant_keeps_the_first_of_equals() {
        let swatches = [
            Swatch::new((1, 1, 1), 4),
            Swatch::new((2, 2, 2), 9),
            Swatch::new((3, 3, 3), 9),
        ];

        assert_eq!(find_dominant_swatch(&swatches), Some(swatches[1]));
        assert_eq!(find_dominant_swatch(&[]), None);
    }

    #[test]
    fn region_is_clamped_to_the_image() {
        let region = clamp_region(
            Some(Rect {
                x: 8,
                y: 2,
                width: 10,
                height: 3,
            }),
            10,
            10,
        );

        assert_eq!((region.x, region.y, region.width, region.height), (8, 2, 2, 3));

        let outside = clamp_region(
            Some(Rect {
                x: 20,
                y: 20,
                width: 5,
                height: 5,
            }),
            10,
            10,
        );

        assert_eq!((outside.width, outside.height), (0, 0));
    }

    #[test]
    fn buffer_validation() {
        assert!(validate_buffer(2, 2, 4, 16).is_ok());
        assert!(validate_buffer(2, 2, 4, 15).is_err());
        assert!(validate_buffer(2, 2, 3, 16).is_err());
        assert!(validate_buffer(0, 5, 4, 0).is_err());
        assert!(validate_buffer(u32::MAX, u32::MAX, 4, 0).is_err());
    }

    #[test]
    fn score_prefers_closer_and_more_populous_swatches() {
        let mut target = Target::vibrant();
        target.normalize_weights();

        let close = Swatch::new((255, 0, 0), 10);
        let far = Swatch::new((110, 60, 60), 10);
        let populous = Swatch::new((255, 0, 0), 20);

        assert!(generate_score(close, target, 20) > generate_score(far, target, 20));
        assert!(generate_score(populous, target, 20) > generate_score(close, target, 20));
    }

    #[test]
    fn score_with_no_population() {
        let mut target = Target::vibrant();
        target.normalize_weights();

        let score = generate_score(Swatch::new((255, 0, 0), 0), target, 0);
        assert!(score.is_finite());
    }
}
