use super::Packer;
use crate::model::{Placement, Rect};

/// Single-page shelf packer.
///
/// Assets are placed left to right; a row wraps when the next asset would
/// cross the right edge, and the page is full once an asset would cross the
/// bottom edge. Rows are never revisited.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    row_h: u32,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            row_h: 0,
        }
    }

    /// Current cursor `(x, y)` and row height.
    pub fn cursor(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.row_h)
    }

    /// True if `rect` fits an empty page.
    pub fn can_pack(&self, rect: &Rect) -> bool {
        rect.w > 0 && rect.h > 0 && rect.w <= self.width && rect.h <= self.height
    }

    /// Clears the page, moving the cursor back to the origin.
    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
        self.row_h = 0;
    }
}

impl<K> Packer<K> for ShelfPacker {
    fn can_pack(&self, rect: &Rect) -> bool {
        ShelfPacker::can_pack(self, rect)
    }

    fn pack(&mut self, key: K, rect: &Rect) -> Option<Placement<K>> {
        if !ShelfPacker::can_pack(self, rect) {
            return None;
        }
        if self.x as u64 + rect.w as u64 > self.width as u64 {
            self.x = 0;
            self.y = self.y.saturating_add(self.row_h);
            self.row_h = 0;
        }
        if self.y as u64 + rect.h as u64 > self.height as u64 {
            return None;
        }
        let frame = Rect::new(self.x, self.y, rect.w, rect.h);
        self.x += rect.w;
        self.row_h = self.row_h.max(rect.h);
        Some(Placement {
            key,
            frame,
            bucket: 0,
        })
    }
}
