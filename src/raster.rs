// SPDX: CC0-1.0

//! CPU implementation of [`Context`] over an RGBA8 framebuffer.

use crate::{
    gfx::{Context, GfxErr},
    scene::{Primitive, Rgba},
};
use std::io::{self, Write};

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 16384;

#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    viewport: (u32, u32),
    scale: f32,
    color: [u8; 4],
    buffer: Vec<f32>,
}

fn alloc(width: u32, height: u32) -> Result<Vec<[u8; 4]>, GfxErr> {
    let unavailable = GfxErr::Unavailable { width, height };
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(unavailable);
    }
    let len = usize::try_from(width)
        .ok()
        .and_then(|w| w.checked_mul(usize::try_from(height).ok()?))
        .ok_or(unavailable)?;
    Ok(vec![[0; 4]; len])
}

fn to_rgba8(color: Rgba) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, GfxErr> {
        Ok(Self {
            width,
            height,
            pixels: alloc(width, height)?,
            viewport: (width, height),
            scale: 1.0,
            color: [0, 0, 0, 255],
            buffer: Vec::new(),
        })
    }

    /// Color at `(x, y)`, counted from the top left corner.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Writes the framebuffer as a binary PPM. Alpha is dropped.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        for [r, g, b, _] in &self.pixels {
            out.write_all(&[*r, *g, *b])?;
        }
        out.flush()
    }

    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = self.color;
    }

    /// Clip space to pixel coordinates, y pointing down.
    fn to_pixel(&self, [x, y]: [f64; 2]) -> [i64; 2] {
        let (vw, vh) = (f64::from(self.viewport.0), f64::from(self.viewport.1));
        let px = ((x + 1.0) * 0.5 * vw).floor() as i64;
        let py = ((1.0 - y) * 0.5 * vh).floor() as i64;
        // clip space edges land one past the last pixel
        [
            px.min(i64::from(self.viewport.0) - 1),
            py.min(i64::from(self.viewport.1) - 1),
        ]
    }

    fn segment(&mut self, a: [f32; 2], b: [f32; 2]) {
        let scale = f64::from(self.scale);
        let a = [f64::from(a[0]) / scale, f64::from(a[1]) / scale];
        let b = [f64::from(b[0]) / scale, f64::from(b[1]) / scale];
        if !a.iter().chain(&b).all(|c| c.is_finite()) {
            // breaks the strip, like a NaN vertex on a GPU
            return;
        }
        if let Some((a, b)) = clip_segment(a, b) {
            let (a, b) = (self.to_pixel(a), self.to_pixel(b));
            self.bresenham(a, b);
        }
    }

    fn bresenham(&mut self, [x0, y0]: [i64; 2], [x1, y1]: [i64; 2]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Liang-Barsky clipping of `a -> b` against the `[-1, 1]` square.
///
/// Clipped endpoints are snapped onto the edge they cross, since `t` alone
/// loses the edge when the segment is many orders of magnitude longer than
/// the square.
fn clip_segment(a: [f64; 2], b: [f64; 2]) -> Option<([f64; 2], [f64; 2])> {
    type Bound = (f64, Option<(usize, f64)>);

    let d = [b[0] - a[0], b[1] - a[1]];
    let mut enter: Bound = (0.0, None);
    let mut exit: Bound = (1.0, None);
    for (p, q, edge) in [
        (-d[0], a[0] + 1.0, (0, -1.0)),
        (d[0], 1.0 - a[0], (0, 1.0)),
        (-d[1], a[1] + 1.0, (1, -1.0)),
        (d[1], 1.0 - a[1], (1, 1.0)),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > exit.0 {
                return None;
            }
            if r > enter.0 {
                enter = (r, Some(edge));
            }
        } else {
            if r < enter.0 {
                return None;
            }
            if r < exit.0 {
                exit = (r, Some(edge));
            }
        }
    }

    let at = |(t, edge): Bound| {
        let mut pt = [a[0] + t * d[0], a[1] + t * d[1]];
        if let Some((axis, value)) = edge {
            pt[axis] = value;
        }
        pt
    };
    Some((at(enter), at(exit)))
}

impl Context for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) -> Result<(), GfxErr> {
        self.pixels = alloc(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(to_rgba8(color));
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn set_color(&mut self, color: Rgba) {
        self.color = to_rgba8(color);
    }

    fn buffer_data(&mut self, data: &[f32]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(data);
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize) {
        let buffer = std::mem::take(&mut self.buffer);
        let end = (first + count).min(buffer.len() / 2);
        let verts: Vec<[f32; 2]> = buffer
            .get(first * 2..end * 2)
            .unwrap_or_default()
            .chunks_exact(2)
            .map(|xy| [xy[0], xy[1]])
            .collect();
        match primitive {
            Primitive::Lines => {
                // a trailing unpaired vertex is ignored
                for pair in verts.chunks_exact(2) {
                    self.segment(pair[0], pair[1]);
                }
            }
            Primitive::LineStrip => {
                for pair in verts.windows(2) {
                    self.segment(pair[0], pair[1]);
                }
            }
        }
        self.buffer = buffer;
    }
}
