//! Braille canvas surface the starfield draws on.

use nightsky_core::{DrawCommand, Viewport};
use nightsky_starfield::{Surface, SurfaceError};
use ratatui::{
    buffer::Buffer,
    layout::{Rect, Size},
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Line, Painter, Shape},
    },
};

/// Holds the last frame submitted by the starfield.
#[derive(Debug, Default)]
pub struct CanvasSurface {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl CanvasSurface {
    /// Acquire a surface for a terminal of `size` cells.
    pub fn acquire(size: Size) -> Result<Self, SurfaceError> {
        if std::env::var("TERM").is_ok_and(|term| term == "dumb") {
            return Err(SurfaceError::Unavailable(
                "terminal does not support drawing".to_string(),
            ));
        }
        if size.width == 0 || size.height == 0 {
            return Err(SurfaceError::Unavailable(format!(
                "terminal is {}x{} cells",
                size.width, size.height
            )));
        }
        Ok(Self::default())
    }

    /// Widget rendering the last submitted frame.
    pub fn widget(&self) -> SkyCanvas<'_> {
        SkyCanvas {
            viewport: self.viewport,
            commands: &self.commands,
        }
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.clear();
    }

    fn submit(&mut self, commands: &[DrawCommand]) {
        self.commands.clear();
        self.commands.extend_from_slice(commands);
    }
}

/// Grey level for an opacity over black.
pub fn opacity_to_color(opacity: f32) -> Color {
    let v = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(v, v, v)
}

/// Filled circle, painted dot by dot.
#[derive(Debug, Clone, Copy)]
struct Disc {
    x: f64,
    y: f64,
    radius: f64,
    color: Color,
}

impl Shape for Disc {
    fn draw(&self, painter: &mut Painter) {
        // Sample on a half-dot grid so small radii still light their center
        let radius = self.radius.max(0.5);
        let steps = (radius * 2.0).ceil() as i32;
        for i in -steps..=steps {
            for j in -steps..=steps {
                let dx = i as f64 * 0.5;
                let dy = j as f64 * 0.5;
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                if let Some((px, py)) = painter.get_point(self.x + dx, self.y + dy) {
                    painter.paint(px, py, self.color);
                }
            }
        }
    }
}

/// Renders draw commands with y pointing down, like the surface they target.
pub struct SkyCanvas<'a> {
    viewport: Viewport,
    commands: &'a [DrawCommand],
}

impl Widget for SkyCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.viewport.width as f64;
        let height = self.viewport.height as f64;
        // Canvas y grows upward
        let flip = |y: f32| height - y as f64;

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(Color::Black)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for command in self.commands {
                    match *command {
                        DrawCommand::Clear => {}
                        DrawCommand::FillCircle {
                            x,
                            y,
                            radius,
                            opacity,
                        } => ctx.draw(&Disc {
                            x: x as f64,
                            y: flip(y),
                            radius: radius as f64,
                            color: opacity_to_color(opacity),
                        }),
                        DrawCommand::Line {
                            x1,
                            y1,
                            x2,
                            y2,
                            opacity,
                            ..
                        } => ctx.draw(&Line::new(
                            x1 as f64,
                            flip(y1),
                            x2 as f64,
                            flip(y2),
                            opacity_to_color(opacity),
                        )),
                    }
                }
            })
            .render(area, buf);
    }
}
