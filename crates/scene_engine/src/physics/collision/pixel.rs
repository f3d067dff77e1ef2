//! Perfect-pixel overlap
//!
//! Two surfaces collide when, somewhere inside the intersection of their
//! screen rectangles, both sample a texel with non-zero alpha. Screen
//! positions are mapped back into texture space, so scaled and mirrored
//! sprites compare the texels actually drawn there.

use crate::assets::PixelData;
use crate::foundation::math::{Rectangle, Vec2};
use crate::render::{Color, SpriteEffects};

/// Screen placement of a texture for the pixel test
#[derive(Debug, Clone, Copy)]
pub struct PixelSurface<'a> {
    /// Where the texture is drawn
    pub destination: Rectangle,
    /// Region of the texture drawn into `destination`; the whole texture when `None`
    pub source: Option<Rectangle>,
    /// Mirroring applied when drawing
    pub effects: SpriteEffects,
    /// Texels
    pub pixels: &'a PixelData,
}

impl<'a> PixelSurface<'a> {
    /// Whole texture drawn unmirrored into `destination`
    pub fn new(destination: Rectangle, pixels: &'a PixelData) -> Self {
        Self {
            destination,
            source: None,
            effects: SpriteEffects::empty(),
            pixels,
        }
    }

    /// Builder pattern: Set source region
    pub fn with_source(mut self, source: Option<Rectangle>) -> Self {
        self.source = source;
        self
    }

    /// Builder pattern: Set mirroring
    pub fn with_effects(mut self, effects: SpriteEffects) -> Self {
        self.effects = effects;
        self
    }

    fn source_region(&self) -> Rectangle {
        self.source.unwrap_or_else(|| {
            Rectangle::new(0.0, 0.0, self.pixels.width() as f32, self.pixels.height() as f32)
        })
    }

    /// Texel drawn at a screen point, `None` when the point maps outside the texture
    pub fn texel_at(&self, point: Vec2) -> Option<Color> {
        let destination = self.destination;
        if destination.width <= 0.0 || destination.height <= 0.0 {
            return None;
        }

        let mut u = (point.x - destination.x) / destination.width;
        let mut v = (point.y - destination.y) / destination.height;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        if self.effects.contains(SpriteEffects::FLIP_HORIZONTALLY) {
            u = 1.0 - u;
        }
        if self.effects.contains(SpriteEffects::FLIP_VERTICALLY) {
            v = 1.0 - v;
        }

        let source = self.source_region();
        let tx = (source.x + u * source.width).floor();
        let ty = (source.y + v * source.height).floor();
        if tx < 0.0 || ty < 0.0 {
            return None;
        }
        // Mirroring maps the left edge to exactly 1.0
        let tx = (tx as u32).min((source.right().ceil() as u32).saturating_sub(1));
        let ty = (ty as u32).min((source.bottom().ceil() as u32).saturating_sub(1));
        self.pixels.get(tx, ty)
    }
}

/// True on the first screen pixel where both surfaces draw a non-transparent texel
///
/// Walks the screen pixels covered by the overlap of the two destination
/// rectangles, sampling each at the centre of its covered part, so slivers
/// thinner than a pixel are still tested. Returns false straight away when
/// the rectangles do not overlap.
pub fn perfect_pixel_overlap(a: &PixelSurface<'_>, b: &PixelSurface<'_>) -> bool {
    let Some(overlap) = a.destination.intersection(&b.destination) else {
        return false;
    };

    let top = overlap.top().floor() as i64;
    let bottom = overlap.bottom().ceil() as i64;
    let left = overlap.left().floor() as i64;
    let right = overlap.right().ceil() as i64;

    for y in top..bottom {
        let Some(sample_y) = covered_centre(y, overlap.top(), overlap.bottom()) else {
            continue;
        };
        for x in left..right {
            let Some(sample_x) = covered_centre(x, overlap.left(), overlap.right()) else {
                continue;
            };
            let sample = Vec2::new(sample_x, sample_y);
            let hit = matches!(
                (a.texel_at(sample), b.texel_at(sample)),
                (Some(ta), Some(tb)) if ta.is_opaque_texel() && tb.is_opaque_texel()
            );
            if hit {
                return true;
            }
        }
    }
    false
}

/// Centre of the part of pixel `cell` lying within `[start, end)`
fn covered_centre(cell: i64, start: f32, end: f32) -> Option<f32> {
    let low = (cell as f32).max(start);
    let high = (cell as f32 + 1.0).min(end);
    (high > low).then(|| (low + high) * 0.5)
}
