use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use swatchbook::{Palette, PaletteBuilder, Slot, Swatch};
use tracing_subscriber::EnvFilter;

/// Print the palette of prominent colors of one or more images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Maximum number of colors the image is quantized into
    #[arg(short = 'c', long, default_value_t = swatchbook::DEFAULT_CALCULATE_NUMBER_COLORS)]
    max_colors: usize,

    /// Scale images larger than this many pixels down before quantizing. 0 disables scaling
    #[arg(short, long, default_value_t = swatchbook::DEFAULT_RESIZE_IMAGE_AREA)]
    resize_area: u32,

    /// Only use the pixels within a region, given as X,Y,WIDTH,HEIGHT
    #[arg(long, value_parser = parse_region)]
    region: Option<(u32, u32, u32, u32)>,

    /// Ignore pixels with an alpha below this
    #[arg(long, default_value_t = swatchbook::DEFAULT_MINIMUM_ALPHA)]
    min_alpha: u8,

    /// Don't filter near-black, near-white and skin tone colors out of the named slots
    #[arg(long)]
    no_filters: bool,

    /// Print the palette as JSON
    #[arg(long)]
    json: bool,
}

#[derive(serde::Serialize)]
struct SlotReport {
    slot: Slot,
    name: &'static str,
    hex: String,
    swatch: Option<Swatch>,
    label: Option<String>,
}

#[derive(serde::Serialize)]
struct PaletteReport {
    path: PathBuf,
    slots: Vec<SlotReport>,
    swatches: Vec<Swatch>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    for input in &args.inputs {
        let image = swatchbook::image::open(input)
            .with_context(|| format!("failed to decode {}", input.display()))?
            .to_rgba8();

        let mut builder = PaletteBuilder::from_image(image)
            .maximum_color_count(args.max_colors)
            .resize_image_area(args.resize_area)
            .minimum_alpha(args.min_alpha);

        if let Some((x, y, width, height)) = args.region {
            builder = builder.region(x, y, width, height);
        }

        if args.no_filters {
            builder = builder.clear_filters();
        }

        let palette = builder.generate();

        if args.json {
            let report = report(input.clone(), &palette);
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_palette(input, &palette);
        }
    }

    Ok(())
}

fn report(path: PathBuf, palette: &Palette) -> PaletteReport {
    let slots = palette
        .slots()
        .map(|(slot, swatch)| SlotReport {
            slot,
            name: slot.name(),
            hex: palette.hex_label(slot),
            swatch,
            label: swatch.map(|swatch| swatchbook::hex(swatch.label_color())),
        })
        .collect();

    PaletteReport {
        path,
        slots,
        swatches: palette.swatches().to_vec(),
    }
}

fn print_palette(path: &std::path::Path, palette: &Palette) {
    println!("{}", path.display());

    if palette.is_empty() {
        println!("  no palette available");
        return;
    }

    for (slot, swatch) in palette.slots() {
        match swatch {
            Some(swatch) => println!(
                "  {}({}) label={} population={}",
                slot.name(),
                swatch.hex(),
                swatchbook::hex(swatch.label_color()),
                swatch.population()
            ),
            None => println!("  {}({})", slot.name(), palette.hex_label(slot)),
        }
    }
}

fn parse_region(value: &str) -> Result<(u32, u32, u32, u32)> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid region {value:?}"))?;

    match parts.as_slice() {
        [x, y, width, height] => Ok((*x, *y, *width, *height)),
        _ => bail!("region must be X,Y,WIDTH,HEIGHT, got {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn region_parses() {
        assert_eq!(parse_region("1, 2,30,40").unwrap(), (1, 2, 30, 40));
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("a,b,c,d").is_err());
    }

    #[test]
    fn report_labels_empty_slots() {
        let report = report(PathBuf::from("empty.png"), &Palette::empty());

        assert_eq!(report.slots.len(), Slot::ALL.len());
        assert!(report.slots.iter().all(|slot| slot.hex == swatchbook::NO_COLOR_LABEL));
    }
}
