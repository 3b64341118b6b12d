// SPDX: CC0-1.0

//! Draw objects: flattened vertex lists with a primitive kind and a color.

use crate::{Number, Point};

pub type Rgba = [f32; 4];

pub const CLEAR_COLOR: Rgba = [0.0, 0.0, 0.0, 1.0];
pub const AXIS_COLOR: Rgba = [0.0, 0.0, 0.5, 1.0];
pub const CURVE_COLOR: Rgba = [0.3, 1.0, 0.3, 1.0];

/// Largest axis length the grid is built for, in world units.
pub const MAX_UNITS_PER_AXE: Number = 2000.0;

/// Half the length of a unit tick mark, in world units.
pub const TICK_HALF_LEN: f32 = 0.06;

/// How consecutive vertices are joined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Every pair of vertices is its own segment.
    Lines,
    /// Each vertex is joined to the one before it.
    LineStrip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawObject {
    /// `x0, y0, x1, y1, ...`
    pub points: Vec<f32>,
    pub primitive: Primitive,
    pub color: Rgba,
}

impl DrawObject {
    pub fn curve(curve: &[Point<Number>]) -> Self {
        let mut points = Vec::with_capacity(curve.len() * 2);
        for p in curve {
            points.push(p.x as f32);
            points.push(p.y as f32);
        }
        Self {
            points,
            primitive: Primitive::LineStrip,
            color: CURVE_COLOR,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len() / 2
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point<f32>> + '_ {
        self.points
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
    }
}

/// Both axes, spanning `units_per_axe` in total, with a tick on every
/// integer of `[-units_per_axe / 2, units_per_axe / 2)`.
pub fn axis_grid(units_per_axe: Number) -> DrawObject {
    let semi = units_per_axe / 2.0;
    let edge = semi as f32;
    let mut points = vec![
        -edge, 0.0, edge, 0.0, // x axis
        0.0, edge, 0.0, -edge, // y axis
    ];

    let first = (-semi).ceil() as i64;
    for i in (first..).take_while(|&i| (i as Number) < semi) {
        let i = i as f32;
        points.extend_from_slice(&[i, TICK_HALF_LEN, i, -TICK_HALF_LEN]); // x mark
        points.extend_from_slice(&[-TICK_HALF_LEN, i, TICK_HALF_LEN, i]); // y mark
    }

    DrawObject {
        points,
        primitive: Primitive::Lines,
        color: AXIS_COLOR,
    }
}

/// What a surface draws for one redraw: the grid underneath, then the curve.
#[derive(Debug)]
pub struct Scene<'grid> {
    grid: &'grid DrawObject,
    curve: DrawObject,
}

impl<'grid> Scene<'grid> {
    pub fn new(grid: &'grid DrawObject, curve: &[Point<Number>]) -> Self {
        Self {
            grid,
            curve: DrawObject::curve(curve),
        }
    }

    /// In draw order.
    pub fn objects(&self) -> [&DrawObject; 2] {
        [self.grid, &self.curve]
    }
}
