use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

/// HSV (degrees, 0..1, 0..1) to opaque RGBA.
fn hsv_to_rgba(h: f32, s: f32, v: f32) -> [u8; 4] {
    let c = v * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to(r), to(g), to(b), 255]
}

fn draw_border_full(img: &mut RgbaImage, color: [u8; 4]) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    for x in 0..w {
        img.put_pixel(x, 0, Rgba(color));
        img.put_pixel(x, h - 1, Rgba(color));
    }
    for y in 0..h {
        img.put_pixel(0, y, Rgba(color));
        img.put_pixel(w - 1, y, Rgba(color));
    }
}

/// A sprite dominated by one hue with a little jitter and a dark border.
fn swatch(rng: &mut impl Rng, hue: f32) -> RgbaImage {
    let w = rng.gen_range(16..=128);
    let h = rng.gen_range(16..=128);
    let mut img = RgbaImage::from_fn(w, h, |_, _| {
        let jitter = rng.gen_range(-6.0..6.0);
        Rgba(hsv_to_rgba(hue + jitter, rng.gen_range(0.6..1.0), rng.gen_range(0.5..1.0)))
    });
    draw_border_full(&mut img, [0, 0, 0, 255]);
    img
}

fn gen_hues(out: &Path, rng: &mut impl Rng) -> anyhow::Result<()> {
    fs::create_dir_all(out)?;
    // hue families leave a gap around 200..280 degrees
    let families = [0.0f32, 25.0, 55.0, 100.0, 140.0, 170.0, 300.0, 335.0];
    for i in 0..160u32 {
        let hue = families[rng.gen_range(0..families.len())];
        swatch(rng, hue).save(out.join(format!("hue_{:03}_{:03}.png", hue as u32, i)))?;
    }
    Ok(())
}

fn gen_neutrals(out: &Path, rng: &mut impl Rng) -> anyhow::Result<()> {
    fs::create_dir_all(out)?;
    for (name, v) in [("black", 0.02f32), ("gray", 0.5), ("white", 0.99)] {
        for i in 0..12u32 {
            let (w, h) = (rng.gen_range(16..=96), rng.gen_range(16..=96));
            let img = RgbaImage::from_pixel(w, h, Rgba(hsv_to_rgba(0.0, 0.05, v)));
            img.save(out.join(format!("{name}_{i:02}.png")))?;
        }
    }
    // nothing to classify: dropped as undefined
    RgbaImage::new(24, 24).save(out.join("transparent.png"))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Usage: cargo run -p hue-atlas-cli --example gen_swatches -- [out_root]
    // Default out_root: assets/swatches
    let out_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/swatches"));
    fs::create_dir_all(&out_root)?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(0xC0FFEE);
    gen_hues(&out_root.join("hues"), &mut rng)?;
    gen_neutrals(&out_root.join("neutrals"), &mut rng)?;

    // ids are relative to out_root, so these are usable with `--groups`
    fs::write(
        out_root.join("groups.yaml"),
        "groups:\n  - name: mixed\n    members: [neutrals/black_00, neutrals/gray_00, neutrals/white_00]\n",
    )?;
    println!("Generated swatches under {}", out_root.display());
    Ok(())
}
