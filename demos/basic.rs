use swatchbook::PaletteBuilder;

fn main() {
    let path = std::env::args().nth(1).expect("usage: basic <image>");
    let image = swatchbook::image::open(path).unwrap().to_rgba8();

    let palette = PaletteBuilder::from_image(image).generate();

    for (slot, _) in palette.slots() {
        println!("{slot}({})", palette.hex_label(slot));
    }
}
