use crate::swatch::Swatch;
use std::collections::{BinaryHeap, HashMap};

const QUANTIZE_WORD_WIDTH: u32 = 5;
const QUANTIZE_WORD_MAX: u8 = (1 << QUANTIZE_WORD_WIDTH) - 1;

/// Reduces a set of colors into at most a given number of swatches using median cut.
pub struct ColorCutQuantizer {
    pixels: Vec<(u8, u8, u8)>,
    max_colors: usize,
}

/// A single histogram entry: a color quantized to 5 bits per channel, how many pixels fell into it, and the sums of
/// those pixels' full 8-bit channels.
#[derive(Debug, Clone, Copy)]
struct Bin {
    color: (u8, u8, u8),
    count: u32,
    sums: (u64, u64, u64),
}

struct Vbox<'a> {
    colors: &'a mut [Bin],
    population: u32,
    red_range: (u8, u8),
    green_range: (u8, u8),
    blue_range: (u8, u8),
    // creation order, used to break volume ties in the queue
    sequence: usize,
}

#[derive(Debug, PartialEq)]
enum Component {
    Red,
    Green,
    Blue,
}

impl ColorCutQuantizer {
    pub fn new(pixels: Vec<(u8, u8, u8)>, max_colors: usize) -> Self {
        Self {
            pixels,
            max_colors: max_colors.max(1),
        }
    }

    /// Return the quantized swatches in ascending order of their lowest quantized color, with red as the most
    /// significant channel.
    pub fn get_quantized_colors(self) -> Vec<Swatch> {
        // begin by generating a histogram of quantized pixel values, keeping the original channel values around so the
        // final colors don't lose precision
        let mut hist: HashMap<(u8, u8, u8), Bin> = HashMap::new();
        for &(r, g, b) in self.pixels.iter() {
            let color = (quantize(r), quantize(g), quantize(b));
            let bin = hist.entry(color).or_insert(Bin {
                color,
                count: 0,
                sums: (0, 0, 0),
            });

            bin.count += 1;
            bin.sums.0 += r as u64;
            bin.sums.1 += g as u64;
            bin.sums.2 += b as u64;
        }

        // the colors have to be ordered at this point since the histogram's iteration order is arbitrary
        let mut colors = hist.into_values().collect::<Vec<_>>();
        colors.sort_by_key(|bin| packed(bin.color));

        tracing::trace!(pixels = self.pixels.len(), distinct = colors.len(), "built color histogram");

        if colors.len() <= self.max_colors {
            // there are less colors than requested, no need for further processing; just return each color as a swatch
            colors.iter().map(|bin| average_color(std::slice::from_ref(bin))).collect()
        } else {
            self.quantize_pixels(colors)
        }
    }

    fn quantize_pixels(&self, mut colors: Vec<Bin>) -> Vec<Swatch> {
        // create a priority queue of Vboxes with the first one containing all the given colors. the queue always pops
        // the largest Vbox by volume first
        let mut pq = BinaryHeap::with_capacity(self.max_colors);
        pq.push(Vbox::new(&mut colors, 0));

        // go through the queue until there are enough colors or no more boxes to split
        self.split_boxes(&mut pq);

        let mut boxes = pq
            .iter()
            .map(|vbox| (vbox.lowest_color(), vbox.get_average_color()))
            .collect::<Vec<_>>();
        boxes.sort_by_key(|(lowest, _)| *lowest);

        boxes.into_iter().map(|(_, swatch)| swatch).collect()
    }

    fn split_boxes(&self, pq: &mut BinaryHeap<Vbox<'_>>) {
        let mut sequence = 1;

        while pq.len() < self.max_colors {
            if let Some(vbox) = pq.pop() {
                if vbox.can_split() {
                    // split the box in two and push them both back to the queue
                    let (left, right) = vbox.split_box(sequence);
                    sequence += 2;

                    pq.push(left);
                    pq.push(right);

                    continue;
                }

                // the largest box is a single color, so nothing else can be split either. put it back and stop
                pq.push(vbox);
            }

            return;
        }
    }
}

impl<'a> Vbox<'a> {
    fn new(colors: &'a mut [Bin], sequence: usize) -> Self {
        // compute the boundaries of the Vbox to tightly fit around the colors within it

        let mut population = 0;
        // min, max
        let (mut min_red, mut max_red) = (QUANTIZE_WORD_MAX, 0);
        let (mut min_green, mut max_green) = (QUANTIZE_WORD_MAX, 0);
        let (mut min_blue, mut max_blue) = (QUANTIZE_WORD_MAX, 0);

        for bin in colors.iter() {
            let (r, g, b) = bin.color;
            population += bin.count;

            min_red = min_red.min(r);
            max_red = max_red.max(r);
            min_green = min_green.min(g);
            max_green = max_green.max(g);
            min_blue = min_blue.min(b);
            max_blue = max_blue.max(b);
        }

        Self {
            colors,
            population,
            red_range: (min_red, max_red),
            green_range: (min_green, max_green),
            blue_range: (min_blue, max_blue),
            sequence,
        }
    }

    fn volume(&self) -> u32 {
        (self.red_range.1 - self.red_range.0 + 1) as u32
            * (self.green_range.1 - self.green_range.0 + 1) as u32
            * (self.blue_range.1 - self.blue_range.0 + 1) as u32
    }

    fn split_box(mut self, sequence: usize) -> (Vbox<'a>, Vbox<'a>) {
        // split the Vbox at the median of its longest color dimension
        debug_assert!(self.can_split());

        // sort the colors by the longest dimension so the median can be searched for
        self.sort_colors_by_longest_dimension();

        let split_point = self.find_split_point();
        let (old, new) = self.colors.split_at_mut(split_point);

        (Vbox::new(old, sequence), Vbox::new(new, sequence + 1))
    }

    fn sort_colors_by_longest_dimension(&mut self) {
        let longest_dimension = self.get_longest_dimension();

        // the sort is stable, so colors equal in the longest dimension keep their previous relative order
        self.colors.sort_by_key(|bin| {
            let (r, g, b) = bin.color;

            match longest_dimension {
                Component::Red => r,
                Component::Green => g,
                Component::Blue => b,
            }
        });
    }

    fn find_split_point(&self) -> usize {
        let midpoint = self.population / 2;
        let mut pop = 0;

        // keep a total sum of the color populations and split right after the first color that crosses the midpoint.
        // both halves always get at least one color
        for (i, bin) in self.colors.iter().enumerate() {
            pop += bin.count;

            if pop >= midpoint {
                return (i + 1).clamp(1, self.colors.len() - 1);
            }
        }

        self.colors.len() - 1
    }

    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    fn get_longest_dimension(&self) -> Component {
        let red_length = self.red_range.1 - self.red_range.0;
        let green_length = self.green_range.1 - self.green_range.0;
        let blue_length = self.blue_range.1 - self.blue_range.0;

        if red_length >= green_length && red_length >= blue_length {
            Component::Red
        } else if green_length >= blue_length {
            Component::Green
        } else {
            Component::Blue
        }
    }

    fn lowest_color(&self) -> u32 {
        self.colors.iter().map(|bin| packed(bin.color)).min().unwrap_or(0)
    }

    fn get_average_color(&self) -> Swatch {
        average_color(self.colors)
    }
}

impl Eq for Vbox<'_> {}
impl PartialEq for Vbox<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Ord for Vbox<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // larger volume first, then the box created earlier
        self.volume()
            .cmp(&other.volume())
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Vbox<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn average_color(colors: &[Bin]) -> Swatch {
    // calculate the total population and the sums of each original color channel
    let (pop, red_sum, green_sum, blue_sum) =
        colors
            .iter()
            .fold((0u32, 0u64, 0u64, 0u64), |(pop, red_sum, green_sum, blue_sum), bin| {
                (
                    pop + bin.count,
                    red_sum + bin.sums.0,
                    green_sum + bin.sums.1,
                    blue_sum + bin.sums.2,
                )
            });

    if pop == 0 {
        return Swatch::new((0, 0, 0), 0);
    }

    // rounded means of the channel sums
    let mean = |sum: u64| ((sum + pop as u64 / 2) / pop as u64) as u8;

    Swatch::new((mean(red_sum), mean(green_sum), mean(blue_sum)), pop)
}

fn quantize(channel: u8) -> u8 {
    channel >> (8 - QUANTIZE_WORD_WIDTH)
}

// combine the channels into a single integer where the red channel is the most significant and the blue the least
fn packed((r, g, b): (u8, u8, u8)) -> u32 {
    ((r as u32) << (QUANTIZE_WORD_WIDTH + QUANTIZE_WORD_WIDTH)) | ((g as u32) << QUANTIZE_WORD_WIDTH) | b as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn repeat(color: (u8, u8, u8), count: usize) -> Vec<(u8, u8, u8)> {
        vec![color; count]
    }

    fn gradient() -> Vec<(u8, u8, u8)> {
        let mut pixels = Vec::new();
        for r in (0..=255u8).step_by(16) {
            for g in (0..=255u8).step_by(32) {
                for b in (0..=255u8).step_by(64) {
                    pixels.push((r, g, b));
                }
            }
        }
        pixels
    }

    #[test]
    fn no_pixels_no_swatches() {
        assert_eq!(ColorCutQuantizer::new(Vec::new(), 16).get_quantized_colors(), Vec::new());
    }

    #[test]
    fn few_colors_are_returned_as_is() {
        let mut pixels = repeat((255, 0, 0), 3);
        pixels.extend(repeat((0, 0, 255), 5));

        let swatches = ColorCutQuantizer::new(pixels, 16).get_quantized_colors();

        assert_eq!(swatches, vec![Swatch::new((0, 0, 255), 5), Swatch::new((255, 0, 0), 3)]);
    }

    #[test]
    fn similar_colors_share_a_bin() {
        let pixels = vec![(8, 8, 8), (10, 10, 10)];
        let swatches = ColorCutQuantizer::new(pixels, 16).get_quantized_colors();

        assert_eq!(swatches, vec![Swatch::new((9, 9, 9), 2)]);
    }

    #[test]
    fn quantization_respects_maximum() {
        let pixels = gradient();
        let total = pixels.len() as u32;

        for max_colors in [1, 2, 5, 16, 64] {
            let swatches = ColorCutQuantizer::new(pixels.clone(), max_colors).get_quantized_colors();
            let population: u32 = swatches.iter().map(|swatch| swatch.population()).sum();

            assert!(swatches.len() <= max_colors, "{} > {max_colors}", swatches.len());
            assert_eq!(population, total);
        }
    }

    #[test]
    fn quantization_fills_up_to_maximum() {
        let swatches = ColorCutQuantizer::new(gradient(), 16).get_quantized_colors();
        assert_eq!(swatches.len(), 16);
    }

    #[test]
    fn quantization_is_deterministic() {
        let first = ColorCutQuantizer::new(gradient(), 10).get_quantized_colors();
        let second = ColorCutQuantizer::new(gradient(), 10).get_quantized_colors();

        assert_eq!(first, second);
    }

    #[test]
    fn split_along_the_widest_channel() {
        let mut colors = vec![
            Bin {
                color: (0, 10, 0),
                count: 1,
                sums: (0, 80, 0),
            },
            Bin {
                color: (2, 0, 0),
                count: 1,
                sums: (16, 0, 0),
            },
            Bin {
                color: (1, 31, 0),
                count: 1,
                sums: (8, 248, 0),
            },
        ];

        let vbox = Vbox::new(&mut colors, 0);
        assert_eq!(vbox.get_longest_dimension(), Component::Green);
        assert_eq!(vbox.population, 3);
        assert_eq!(vbox.volume(), 3 * 32);
    }

    #[test]
    fn split_point_is_the_population_median() {
        let bin = |g: u8, count: u32| Bin {
            color: (0, g, 0),
            count,
            sums: (0, (g as u64) << 3, 0),
        };
        let mut colors = vec![bin(0, 1), bin(1, 1), bin(2, 10), bin(3, 1)];

        let (left, right) = Vbox::new(&mut colors, 0).split_box(1);

        assert_eq!(left.population, 12);
        assert_eq!(right.population, 1);
    }
}
