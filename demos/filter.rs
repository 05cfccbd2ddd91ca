use swatchbook::{LightnessFilter, PaletteBuilder};

// this filter uses the same approach as the default filter, except it allows more darker colors and blocks more
// lighter colors, and lets skin tones through
const CUSTOM_FILTER: LightnessFilter = LightnessFilter {
    black_max_lightness: 0.02,
    white_min_lightness: 0.90,
};

fn main() {
    let path = std::env::args().nth(1).expect("usage: filter <image>");
    let image = swatchbook::image::open(path).unwrap().to_rgba8();

    let palette = PaletteBuilder::from_image(image)
        .clear_filters() // remove the default filter
        .add_filter(CUSTOM_FILTER) // add our custom filter
        .generate();

    println!("{:#?}", palette);
}
