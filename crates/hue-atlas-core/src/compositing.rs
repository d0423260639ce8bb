use crate::model::Page;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

/// Blit `src` into `canvas` with its top-left at (dx, dy), clipping at the
/// canvas edges. With `outlines`, a red 1px outline is drawn around the copy.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, outlines: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();

    for yy in 0..sh {
        let ty = dy as u64 + yy as u64;
        if ty >= ch as u64 {
            break;
        }
        for xx in 0..sw {
            let tx = dx as u64 + xx as u64;
            if tx >= cw as u64 {
                break;
            }
            canvas.put_pixel(tx as u32, ty as u32, *src.get_pixel(xx, yy));
        }
    }

    if outlines && sw > 0 && sh > 0 {
        let red = Rgba([255, 0, 0, 255]);
        let mut put = |x: u64, y: u64| {
            if x < cw as u64 && y < ch as u64 {
                canvas.put_pixel(x as u32, y as u32, red);
            }
        };
        let (x0, y0) = (dx as u64, dy as u64);
        let (x1, y1) = (x0 + sw as u64 - 1, y0 + sh as u64 - 1);
        for x in x0..=x1 {
            put(x, y0);
            put(x, y1);
        }
        for y in y0..=y1 {
            put(x0, y);
            put(x1, y);
        }
    }
}

/// Renders a page on a transparent canvas of the page's size.
/// Placements without a source image are left transparent.
pub fn render_page<K>(page: &Page<K>, sources: &HashMap<K, RgbaImage>, outlines: bool) -> RgbaImage
where
    K: std::hash::Hash + Eq,
{
    let mut canvas = RgbaImage::new(page.width, page.height);
    for p in &page.placements {
        if let Some(src) = sources.get(&p.key) {
            blit_rgba(src, &mut canvas, p.frame.x, p.frame.y, outlines);
        }
    }
    canvas
}
