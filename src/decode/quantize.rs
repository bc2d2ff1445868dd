use std::collections::HashMap;

use crate::config::{MAX_PALETTE_SIZE, MIN_PALETTE_SIZE};

/// Pixels with alpha below this are mapped to the transparent palette entry.
pub const ALPHA_THRESHOLD: u8 = 128;

/// A raster reduced to a small fixed palette.
///
/// `indices` is row-major, one byte per pixel, each a valid index into `palette`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantizedImage {
    width: u32,
    height: u32,
    palette: Vec<[u8; 4]>,
    indices: Vec<u8>,
    transparent: Option<u8>,
}

impl QuantizedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Straight-alpha RGBA palette entries. The transparent entry, if any, is `[0, 0, 0, 0]`.
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn transparent(&self) -> Option<u8> {
        self.transparent
    }

    /// Expand back to straight RGBA8.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let mut data = Vec::with_capacity(self.indices.len() * 4);
        for &i in &self.indices {
            data.extend_from_slice(&self.palette[usize::from(i)]);
        }
        // Length is width * height * 4 by construction.
        image::RgbaImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

#[derive(Clone, Copy, Debug)]
struct ColorCount {
    rgb: [u8; 3],
    count: u32,
}

/// Contiguous run of `colors` plus its widest channel, measured once when the box is made.
#[derive(Clone, Copy, Debug)]
struct ColorBox {
    start: usize,
    end: usize,
    channel: usize,
    extent: u8,
}

impl ColorBox {
    fn new(start: usize, end: usize, colors: &[ColorCount]) -> Self {
        let (channel, extent) = widest_channel(&colors[start..end]);
        Self {
            start,
            end,
            channel,
            extent,
        }
    }

    fn len(self) -> usize {
        self.end - self.start
    }
}

/// (widest channel, its extent)
fn widest_channel(members: &[ColorCount]) -> (usize, u8) {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for c in members {
        for ch in 0..3 {
            lo[ch] = lo[ch].min(c.rgb[ch]);
            hi[ch] = hi[ch].max(c.rgb[ch]);
        }
    }

    let mut best = (0usize, 0u8);
    for ch in 0..3 {
        let extent = hi[ch].saturating_sub(lo[ch]);
        if extent > best.1 {
            best = (ch, extent);
        }
    }
    best
}

/// Reduce `img` to at most `palette_size` colors with median cut.
///
/// Deterministic: identical input pixels always produce identical palette and indices.
pub fn quantize_median_cut(img: &image::RgbaImage, palette_size: usize) -> QuantizedImage {
    let palette_size = palette_size.clamp(MIN_PALETTE_SIZE, MAX_PALETTE_SIZE);
    let (width, height) = img.dimensions();

    let mut histogram = HashMap::<[u8; 3], u32>::new();
    let mut has_transparent = false;
    for px in img.pixels() {
        let [r, g, b, a] = px.0;
        if a < ALPHA_THRESHOLD {
            has_transparent = true;
            continue;
        }
        *histogram.entry([r, g, b]).or_insert(0) += 1;
    }

    let mut colors: Vec<ColorCount> = histogram
        .into_iter()
        .map(|(rgb, count)| ColorCount { rgb, count })
        .collect();
    colors.sort_unstable_by_key(|c| c.rgb);

    let budget = palette_size - usize::from(has_transparent);
    let boxes = median_cut(&mut colors, budget);

    let mut palette = Vec::with_capacity(boxes.len() + usize::from(has_transparent));
    let mut lookup = HashMap::<[u8; 3], u8>::with_capacity(colors.len());
    for (slot, b) in boxes.iter().enumerate() {
        let members = &colors[b.start..b.end];
        palette.push(weighted_mean(members));
        for c in members {
            lookup.insert(c.rgb, slot as u8);
        }
    }

    let transparent = if has_transparent {
        palette.push([0, 0, 0, 0]);
        Some((palette.len() - 1) as u8)
    } else {
        None
    };

    let indices = img
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            if a < ALPHA_THRESHOLD {
                transparent.unwrap_or(0)
            } else {
                lookup.get(&[r, g, b]).copied().unwrap_or(0)
            }
        })
        .collect();

    QuantizedImage {
        width,
        height,
        palette,
        indices,
        transparent,
    }
}

fn median_cut(colors: &mut [ColorCount], budget: usize) -> Vec<ColorBox> {
    if colors.is_empty() {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox::new(0, colors.len(), colors)];

    while boxes.len() < budget {
        // Split the box with the widest channel extent; ties go to the earliest box.
        let mut pick: Option<(usize, u8)> = None;
        for (i, b) in boxes.iter().enumerate() {
            if b.len() < 2 {
                continue;
            }
            if pick.is_none_or(|(_, best)| b.extent > best) {
                pick = Some((i, b.extent));
            }
        }
        let Some((i, _)) = pick else {
            break;
        };

        let b = boxes[i];
        let ch = b.channel;
        let members = &mut colors[b.start..b.end];
        members.sort_unstable_by_key(|c| (c.rgb[ch], c.rgb));

        let split = b.start + weighted_median_split(members);
        boxes[i] = ColorBox::new(b.start, split, colors);
        boxes.insert(i + 1, ColorBox::new(split, b.end, colors));
    }

    boxes
}

/// Offset in `1..members.len()` where the cumulative pixel count first reaches half.
fn weighted_median_split(members: &[ColorCount]) -> usize {
    let total: u64 = members.iter().map(|c| u64::from(c.count)).sum();
    let mut acc = 0u64;
    for (i, c) in members.iter().enumerate() {
        acc += u64::from(c.count);
        if acc * 2 >= total {
            return (i + 1).clamp(1, members.len() - 1);
        }
    }
    members.len() / 2
}

fn weighted_mean(members: &[ColorCount]) -> [u8; 4] {
    let mut sum = [0u64; 3];
    let mut n = 0u64;
    for c in members {
        let w = u64::from(c.count);
        for ch in 0..3 {
            sum[ch] += u64::from(c.rgb[ch]) * w;
        }
        n += w;
    }
    let n = n.max(1);
    let avg = |s: u64| ((s + n / 2) / n).min(255) as u8;
    [avg(sum[0]), avg(sum[1]), avg(sum[2]), 255]
}

#[cfg(test)]
#[path = "../../tests/unit/decode/quantize.rs"]
mod tests;
