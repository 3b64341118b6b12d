// SPDX: CC0-1.0

//! Per-surface render pipeline over a minimal immediate-mode context.

use crate::{
    sample::Projection,
    scene::{self, DrawObject, Primitive, Rgba, Scene},
    Number, Point,
};
use core::fmt;
use log::{debug, info, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GfxErr {
    /// No backing store could be provided for the requested size.
    Unavailable { width: u32, height: u32 },
}

impl fmt::Display for GfxErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { width, height } => write!(
                f,
                "graphics context unavailable: cannot allocate a {width}x{height} drawing buffer"
            ),
        }
    }
}

impl std::error::Error for GfxErr {}

/// The handful of calls a pipeline needs from a drawing surface.
///
/// Positions go through a fixed vertex stage, `clip = position / scale`,
/// and every fragment takes the current color.
pub trait Context {
    /// Size of the drawing buffer in pixels.
    fn size(&self) -> (u32, u32);

    /// Reallocates the drawing buffer. Its contents are not preserved.
    fn set_size(&mut self, width: u32, height: u32) -> Result<(), GfxErr>;

    fn viewport(&mut self, width: u32, height: u32);

    fn clear(&mut self, color: Rgba);

    fn set_scale(&mut self, scale: f32);

    fn set_color(&mut self, color: Rgba);

    /// Replaces the bound vertex buffer with `data` (`x, y` pairs).
    fn buffer_data(&mut self, data: &[f32]);

    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize);
}

/// A surface that has been set up for drawing.
///
/// Constructing one is the only setup step. The scale uniform is set there
/// and never changes afterwards.
#[derive(Debug)]
pub struct Pipeline<C> {
    projection: Projection,
    ctx: C,
    grid: DrawObject,
    scale: f32,
}

impl<C: Context> Pipeline<C> {
    pub fn init(ctx: C, projection: Projection, units_per_axe: Number) -> Self {
        let scale = (units_per_axe / 2.0) as f32;
        let mut ret = Self {
            projection,
            ctx,
            grid: scene::axis_grid(units_per_axe),
            scale,
        };
        ret.ctx.set_scale(scale);
        let (width, height) = ret.ctx.size();
        info!("{projection} pipeline ready ({width}x{height}, scale {scale})");
        ret
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn grid(&self) -> &DrawObject {
        &self.grid
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Draws `curve` over this surface's axis grid.
    pub fn draw(&mut self, curve: &[Point<Number>]) {
        let scene = Scene::new(&self.grid, curve);
        render(&mut self.ctx, &scene);
    }

    pub fn render(&mut self, scene: &Scene<'_>) {
        render(&mut self.ctx, scene);
    }

    /// Changes the drawing buffer size. Nothing is drawn until the next
    /// redraw.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GfxErr> {
        self.ctx.set_size(width, height)?;
        debug!("{} surface resized to {width}x{height}", self.projection);
        Ok(())
    }
}

fn render<C: Context>(ctx: &mut C, scene: &Scene<'_>) {
    let (width, height) = ctx.size();
    ctx.viewport(width, height);
    ctx.clear(scene::CLEAR_COLOR);

    for obj in scene.objects() {
        trace!(
            "draw {:?} with {} vertices",
            obj.primitive,
            obj.vertex_count()
        );
        ctx.set_color(obj.color);
        ctx.buffer_data(&obj.points);
        ctx.draw_arrays(obj.primitive, 0, obj.vertex_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sample::{self, Sweep},
        scene::{AXIS_COLOR, CURVE_COLOR},
    };

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        SetSize(u32, u32),
        Viewport(u32, u32),
        Clear(Rgba),
        Scale(f32),
        Color(Rgba),
        Buffer(usize),
        Draw(Primitive, usize, usize),
    }

    #[derive(Debug)]
    struct Recorder {
        size: (u32, u32),
        calls: Vec<Call>,
    }

    impl Recorder {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                calls: Vec::new(),
            }
        }
    }

    impl Context for Recorder {
        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn set_size(&mut self, width: u32, height: u32) -> Result<(), GfxErr> {
            if width == 0 || height == 0 {
                return Err(GfxErr::Unavailable { width, height });
            }
            self.size = (width, height);
            self.calls.push(Call::SetSize(width, height));
            Ok(())
        }

        fn viewport(&mut self, width: u32, height: u32) {
            self.calls.push(Call::Viewport(width, height));
        }

        fn clear(&mut self, color: Rgba) {
            self.calls.push(Call::Clear(color));
        }

        fn set_scale(&mut self, scale: f32) {
            self.calls.push(Call::Scale(scale));
        }

        fn set_color(&mut self, color: Rgba) {
            self.calls.push(Call::Color(color));
        }

        fn buffer_data(&mut self, data: &[f32]) {
            self.calls.push(Call::Buffer(data.len()));
        }

        fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize) {
            self.calls.push(Call::Draw(primitive, first, count));
        }
    }

    #[test_log::test]
    fn scale_is_set_once_at_init() {
        let mut pipeline = Pipeline::init(Recorder::new(10, 10), Projection::Cartesian, 8.0);
        assert_eq!(pipeline.scale(), 4.0);
        assert_eq!(pipeline.context().calls, [Call::Scale(4.0)]);

        pipeline.draw(&[]);
        pipeline.draw(&[]);
        let scales = pipeline
            .context()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Scale(_)))
            .count();
        assert_eq!(scales, 1);
    }

    #[test_log::test]
    fn draw_call_order() {
        let mut pipeline = Pipeline::init(Recorder::new(30, 20), Projection::Polar, 8.0);
        let curve = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
        pipeline.draw(&curve);
        assert_eq!(
            pipeline.context().calls[1..],
            [
                Call::Viewport(30, 20),
                Call::Clear(scene::CLEAR_COLOR),
                Call::Color(AXIS_COLOR),
                Call::Buffer(72),
                Call::Draw(Primitive::Lines, 0, 36),
                Call::Color(CURVE_COLOR),
                Call::Buffer(6),
                Call::Draw(Primitive::LineStrip, 0, 3),
            ]
        );
    }

    #[test_log::test]
    fn render_prebuilt_scene() {
        let mut pipeline = Pipeline::init(Recorder::new(30, 20), Projection::Cartesian, 8.0);
        let grid = pipeline.grid().clone();
        let scene = Scene::new(&grid, &[Point::new(1.0, 1.0)]);
        pipeline.render(&scene);
        let draws: Vec<&Call> = pipeline
            .context()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Draw(..)))
            .collect();
        assert_eq!(
            draws,
            [
                &Call::Draw(Primitive::Lines, 0, 36),
                &Call::Draw(Primitive::LineStrip, 0, 1)
            ]
        );
    }

    #[test_log::test]
    fn viewport_follows_resize() {
        let mut pipeline = Pipeline::init(Recorder::new(30, 20), Projection::Cartesian, 8.0);
        pipeline.resize(50, 40).unwrap();
        pipeline.draw(&[]);
        assert!(pipeline.context().calls.contains(&Call::Viewport(50, 40)));
    }

    #[test_log::test]
    fn resize_does_not_draw_or_touch_the_curve() {
        let curve = sample::sample(&Sweep::CARTESIAN, Projection::Cartesian, |t| {
            Ok::<_, ()>((t, t / 2.0))
        })
        .unwrap();
        let before = curve.clone();

        let mut pipeline = Pipeline::init(Recorder::new(30, 20), Projection::Cartesian, 8.0);
        pipeline.draw(&curve);
        let drawn = pipeline.context().calls.len();

        pipeline.resize(60, 60).unwrap();
        let calls = &pipeline.context().calls;
        assert_eq!(calls.len(), drawn + 1);
        assert_eq!(calls.last(), Some(&Call::SetSize(60, 60)));
        assert_eq!(pipeline.context().size(), (60, 60));
        assert_eq!(curve, before);
    }

    #[test_log::test]
    fn failed_resize_keeps_size() {
        let mut pipeline = Pipeline::init(Recorder::new(30, 20), Projection::Cartesian, 8.0);
        assert_eq!(
            pipeline.resize(0, 10),
            Err(GfxErr::Unavailable {
                width: 0,
                height: 10
            })
        );
        assert_eq!(pipeline.context().size(), (30, 20));
    }
}
