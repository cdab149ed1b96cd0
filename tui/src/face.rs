//! Face widget
//!
//! Draws a [`FrameDescription`] with ratatui's braille canvas. Face space is
//! 100 x 100 with `y` down; the canvas has `y` up, so every point is flipped.
//! Head tilt is approximated by foreshortening around the face centre.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line};
use ratatui::widgets::Widget;

use visage_core::compositor::{Eye, QuadCurve};
use visage_core::FrameDescription;

use crate::theme;

/// Cubic segments of the head outline (same outline as the SVG head path)
const HEAD_SEGMENTS: [[(f32, f32); 4]; 4] = [
    [(50.0, 10.0), (20.0, 10.0), (15.0, 40.0), (15.0, 60.0)],
    [(15.0, 60.0), (15.0, 85.0), (35.0, 95.0), (50.0, 95.0)],
    [(50.0, 95.0), (65.0, 95.0), (85.0, 85.0), (85.0, 60.0)],
    [(85.0, 60.0), (85.0, 40.0), (80.0, 10.0), (50.0, 10.0)],
];

/// Finger strokes relative to the hand origin, outer fingers first
const FINGERS: [((f32, f32), (f32, f32)); 3] = [
    ((43.0, 100.0), (41.0, 88.0)),
    ((57.0, 100.0), (59.0, 88.0)),
    ((50.0, 98.0), (50.0, 82.0)),
];

/// Aura ring dash count
const AURA_DASHES: usize = 12;

/// Maps face coordinates to canvas coordinates
#[derive(Clone, Copy, Debug)]
struct Projection {
    dx: f32,
    dy: f32,
    scale_x: f32,
    scale_y: f32,
}

impl Projection {
    fn for_frame(frame: &FrameDescription) -> Self {
        Self {
            dx: frame.head.offset.x,
            dy: frame.head.offset.y,
            scale_x: frame.head.tilt.rotate_y.to_radians().cos(),
            scale_y: frame.head.tilt.rotate_x.to_radians().cos(),
        }
    }

    fn map(self, x: f32, y: f32) -> (f64, f64) {
        let px = 50.0 + (x - 50.0) * self.scale_x + self.dx;
        let py = 50.0 + (y - 50.0) * self.scale_y + self.dy;
        (f64::from(px), f64::from(100.0 - py))
    }
}

/// Widget rendering one frame of the face
pub struct FaceView<'a> {
    frame: &'a FrameDescription,
    /// Seconds since mount, for breathing and aura pulse
    time: f32,
}

impl<'a> FaceView<'a> {
    /// Create a view of `frame` at `time` seconds
    pub fn new(frame: &'a FrameDescription, time: f32) -> Self {
        Self { frame, time }
    }
}

impl Widget for FaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.frame;
        let time = self.time;
        let proj = Projection::for_frame(frame);

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, 100.0])
            .y_bounds([0.0, 100.0])
            .paint(move |ctx| {
                draw_aura(ctx, frame, time);
                draw_head(ctx, proj);
                for eye in [&frame.eyes.left, &frame.eyes.right] {
                    draw_eye(ctx, proj, eye, frame, time);
                }
                let brow = theme::to_terminal(theme::BROW);
                polyline(ctx, proj, &frame.brows.left.sample(8), brow);
                polyline(ctx, proj, &frame.brows.right.sample(8), brow);
                draw_mouth(ctx, proj, frame);
                draw_hand(ctx, proj, frame);
            })
            .render(area, buf);
    }
}

fn draw_aura(ctx: &mut Context, frame: &FrameDescription, time: f32) {
    let aura = &frame.aura;
    let pulse = if aura.pulse_period_secs > 0.0 {
        0.75 + 0.25 * (std::f32::consts::TAU * time / aura.pulse_period_secs).sin()
    } else {
        1.0
    };
    let color = theme::to_terminal_with(aura.color, (aura.opacity * pulse).clamp(0.0, 1.0));

    let step = 360.0 / AURA_DASHES as f32;
    for i in 0..AURA_DASHES {
        let start = aura.rotation_deg + i as f32 * step;
        let arc: Vec<(f32, f32)> = (0..=3)
            .map(|k| {
                let angle = (start + k as f32 * step / 6.0).to_radians();
                (50.0 + aura.radius * angle.cos(), 50.0 + aura.radius * angle.sin())
            })
            .collect();
        // The aura ignores head pose
        for pair in arc.windows(2) {
            ctx.draw(&Line::new(
                f64::from(pair[0].0),
                f64::from(100.0 - pair[0].1),
                f64::from(pair[1].0),
                f64::from(100.0 - pair[1].1),
                color,
            ));
        }
    }
}

fn draw_head(ctx: &mut Context, proj: Projection) {
    let color = theme::to_terminal(theme::FACE_OUTLINE);
    for [p0, p1, p2, p3] in HEAD_SEGMENTS {
        let points: Vec<(f32, f32)> = (0..=12)
            .map(|i| cubic(p0, p1, p2, p3, i as f32 / 12.0))
            .collect();
        draw_points(ctx, proj, &points, color);
    }
}

fn draw_eye(ctx: &mut Context, proj: Projection, eye: &Eye, frame: &FrameDescription, time: f32) {
    let socket: Vec<(f32, f32)> = (0..=24)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / 24.0;
            (
                eye.socket_center.x + eye.socket_rx * angle.cos(),
                eye.socket_center.y + eye.socket_ry * angle.sin(),
            )
        })
        .collect();
    draw_points(ctx, proj, &socket, theme::to_terminal(theme::SOCKET));

    let (x, y) = proj.map(eye.pupil_center.x, eye.pupil_center.y);
    ctx.draw(&Circle {
        x,
        y,
        radius: f64::from(eye.breath.radius_at(time)),
        color: theme::to_terminal(frame.glow),
    });
}

fn draw_mouth(ctx: &mut Context, proj: Projection, frame: &FrameDescription) {
    let mouth = &frame.mouth;
    let base = if mouth.glow { frame.glow } else { visage_core::Color::WHITE };
    // Terminal strokes need more weight than the vector strokes
    let color = theme::to_terminal_with(base, (mouth.stroke_opacity * 2.5).min(1.0));
    polyline(ctx, proj, &mouth.curve.sample(12), color);
}

fn draw_hand(ctx: &mut Context, proj: Projection, frame: &FrameDescription) {
    let hand = &frame.hand;
    if !hand.is_visible() {
        return;
    }
    let color = theme::to_terminal_with(theme::HAND, hand.opacity);
    let shift = |(x, y): (f32, f32)| (x + hand.offset_x, y + hand.offset_y);

    let palm: Vec<(f32, f32)> = (0..=8)
        .map(|i| {
            let t = i as f32 / 8.0;
            let p = QuadCurve::new(
                point(shift((40.0, 105.0))),
                point(shift((50.0, 95.0))),
                point(shift((60.0, 105.0))),
            )
            .point_at(t);
            (p.x, p.y)
        })
        .collect();
    draw_points(ctx, proj, &palm, color);

    for (from, to) in FINGERS {
        draw_points(ctx, proj, &[shift(from), shift(to)], color);
    }
}

fn point((x, y): (f32, f32)) -> visage_core::compositor::Point {
    visage_core::compositor::Point::new(x, y)
}

fn polyline(ctx: &mut Context, proj: Projection, points: &[visage_core::compositor::Point], color: Color) {
    let pairs: Vec<(f32, f32)> = points.iter().map(|p| (p.x, p.y)).collect();
    draw_points(ctx, proj, &pairs, color);
}

fn draw_points(ctx: &mut Context, proj: Projection, points: &[(f32, f32)], color: Color) {
    for pair in points.windows(2) {
        let (x1, y1) = proj.map(pair[0].0, pair[0].1);
        let (x2, y2) = proj.map(pair[1].0, pair[1].1);
        ctx.draw(&Line::new(x1, y1, x2, y2, color));
    }
}

fn cubic(p0: (f32, f32), p1: (f32, f32), p2: (f32, f32), p3: (f32, f32), t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    (
        a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
        a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use visage_core::{compose, resolve, HostSignal, ParallaxVector};

    fn frame_for(signal: &HostSignal) -> FrameDescription {
        let (mode, emotion) = resolve(signal);
        compose(signal, mode, emotion, &ParallaxVector::center(), Duration::ZERO)
    }

    fn render(frame: &FrameDescription) -> Buffer {
        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);
        FaceView::new(frame, 0.0).render(area, &mut buf);
        buf
    }

    fn drawn(buf: &Buffer) -> usize {
        buf.content.iter().filter(|c| c.symbol() != " ").count()
    }

    #[test]
    fn test_face_renders_something() {
        let buf = render(&frame_for(&HostSignal::default()));
        assert!(drawn(&buf) > 50);
    }

    #[test]
    fn test_pupils_use_glow_color() {
        let buf = render(&frame_for(&HostSignal::default().idle(true).alert(true)));
        assert!(buf.content.iter().any(|c| c.fg == Color::Rgb(239, 68, 68)));
    }

    #[test]
    fn test_hand_adds_strokes_while_typing() {
        let idle = drawn(&render(&frame_for(&HostSignal::default())));
        let typing = drawn(&render(&frame_for(&HostSignal::default().typing(true))));
        assert!(typing > idle);
    }

    #[test]
    fn test_cubic_endpoints() {
        let [p0, p1, p2, p3] = HEAD_SEGMENTS[0];
        assert_eq!(cubic(p0, p1, p2, p3, 0.0), p0);
        assert_eq!(cubic(p0, p1, p2, p3, 1.0), p3);
    }
}
