//! SVG rendering of a frame
//!
//! Produces a standalone document in a `0 0 100 100` viewBox that web
//! surfaces can inline directly. Pupil breathing and the aura pulse are
//! emitted as SMIL `<animate>` elements so the browser runs them.

use std::fmt::Write;

use super::frame::{fmt_coord, Eye, FrameDescription, HAND_FINGER_PATHS, HAND_PALM_PATH, HEAD_PATH};

/// Render a frame as an SVG document
#[must_use]
pub fn render_svg(frame: &FrameDescription) -> String {
    let mut out = String::with_capacity(2_048);
    match write_svg(&mut out, frame) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}

/// Write a frame as an SVG document into any [`Write`] sink
///
/// # Errors
///
/// Propagates the first error reported by `out`.
pub fn write_svg<W: Write>(out: &mut W, frame: &FrameDescription) -> std::fmt::Result {
    let glow = frame.glow.to_css();

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" class="avatar {} {}">"#,
        frame.mode, frame.emotion
    )?;
    writeln!(
        out,
        r#"<defs><filter id="glow"><feGaussianBlur stdDeviation="3"><animate attributeName="stdDeviation" values="2;4;2" dur="{}s" repeatCount="indefinite"/></feGaussianBlur><feComposite in="SourceGraphic" operator="over"/></filter></defs>"#,
        fmt_coord(frame.aura.pulse_period_secs)
    )?;

    // Aura ring, rotated about the face centre
    let aura = &frame.aura;
    writeln!(
        out,
        r#"<circle cx="50" cy="50" r="{}" fill="none" stroke="{}" stroke-width="{}" opacity="{}" stroke-dasharray="4 2" transform="rotate({} 50 50)" filter="url(#glow)"/>"#,
        fmt_coord(aura.radius),
        aura.color.to_css(),
        fmt_coord(aura.stroke_width),
        fmt_coord(aura.opacity),
        fmt_coord(aura.rotation_deg),
    )?;

    let head = &frame.head;
    writeln!(
        out,
        r#"<g transform="translate({} {})" data-rotate-x="{}" data-rotate-y="{}">"#,
        fmt_coord(head.offset.x),
        fmt_coord(head.offset.y),
        fmt_coord(head.tilt.rotate_x),
        fmt_coord(head.tilt.rotate_y),
    )?;
    writeln!(
        out,
        r##"<path d="{HEAD_PATH}" fill="#0a0a0a" stroke="rgba(255, 255, 255, 0.050)" stroke-width="0.5"/>"##
    )?;

    for eye in [&frame.eyes.left, &frame.eyes.right] {
        write_eye(out, eye, &glow)?;
    }

    for brow in [&frame.brows.left, &frame.brows.right] {
        writeln!(
            out,
            r#"<path d="{}" fill="none" stroke="rgba(255, 255, 255, 0.050)" stroke-width="0.5"/>"#,
            brow.to_path()
        )?;
    }

    let mouth = &frame.mouth;
    writeln!(
        out,
        r#"<path d="{}" fill="none" stroke="rgba(255, 255, 255, {:.3})" stroke-width="{}" stroke-linecap="round"{}/>"#,
        mouth.curve.to_path(),
        mouth.stroke_opacity,
        fmt_coord(mouth.stroke_width),
        if mouth.glow { r#" filter="url(#glow)""# } else { "" },
    )?;

    let hand = &frame.hand;
    if hand.is_visible() {
        writeln!(
            out,
            r#"<g transform="translate({} {})" opacity="{}">"#,
            fmt_coord(hand.offset_x),
            fmt_coord(hand.offset_y),
            fmt_coord(hand.opacity),
        )?;
        writeln!(
            out,
            r#"<path d="{HAND_PALM_PATH}" fill="none" stroke="rgba(255, 255, 255, 0.100)" stroke-width="2"/>"#
        )?;
        for finger in HAND_FINGER_PATHS {
            writeln!(
                out,
                r#"<path d="{finger}" stroke="rgba(255, 255, 255, 0.200)" stroke-width="1" stroke-linecap="round"/>"#
            )?;
        }
        out.write_str("</g>\n")?;
    }

    out.write_str("</g>\n</svg>\n")
}

fn write_eye<W: Write>(out: &mut W, eye: &Eye, glow: &str) -> std::fmt::Result {
    writeln!(
        out,
        r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="rgba(0, 0, 0, 0.800)"/>"#,
        fmt_coord(eye.socket_center.x),
        fmt_coord(eye.socket_center.y),
        fmt_coord(eye.socket_rx),
        fmt_coord(eye.socket_ry),
    )?;
    let breath = &eye.breath;
    writeln!(
        out,
        r#"<circle cx="{}" cy="{}" r="{}" fill="{glow}" filter="url(#glow)"><animate attributeName="r" values="{};{};{}" dur="{}s" repeatCount="indefinite"/></circle>"#,
        fmt_coord(eye.pupil_center.x),
        fmt_coord(eye.pupil_center.y),
        fmt_coord(eye.pupil_radius),
        fmt_coord(breath.min_radius),
        fmt_coord(breath.max_radius),
        fmt_coord(breath.min_radius),
        fmt_coord(breath.period_secs),
    )
}
