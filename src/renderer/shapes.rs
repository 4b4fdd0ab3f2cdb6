//! Shape generation for 2D primitives
//!
//! Turns the rectangle commands of a [`Frame`] into a triangle list.
//! Text is not handled here; the web frontend lays it out in the DOM.

use super::scene::{DrawCmd, Frame, Rect, Rgba};
use super::vertex::Vertex;
use crate::consts::{WINDOW_HEIGHT, WINDOW_WIDTH};

/// Playfield pixels (origin top-left, y down) to NDC (origin center, y up)
pub fn to_ndc(x: f32, y: f32) -> [f32; 2] {
    [x / WINDOW_WIDTH * 2.0 - 1.0, 1.0 - y / WINDOW_HEIGHT * 2.0]
}

/// Two triangles covering `rect`
pub fn fill_rect(out: &mut Vec<Vertex>, rect: Rect, color: Rgba) {
    if rect.w <= 0.0 || rect.h <= 0.0 || color.a == 0 {
        return;
    }
    let color = color.to_linear();
    let tl = to_ndc(rect.x, rect.y);
    let tr = to_ndc(rect.x + rect.w, rect.y);
    let bl = to_ndc(rect.x, rect.y + rect.h);
    let br = to_ndc(rect.x + rect.w, rect.y + rect.h);

    out.extend_from_slice(&[
        Vertex::new(tl, color),
        Vertex::new(bl, color),
        Vertex::new(tr, color),
        Vertex::new(tr, color),
        Vertex::new(bl, color),
        Vertex::new(br, color),
    ]);
}

/// 1 px outline as four thin quads (top, bottom, left, right)
pub fn stroke_rect(out: &mut Vec<Vertex>, rect: Rect, color: Rgba) {
    const W: f32 = 1.0;
    fill_rect(out, Rect::new(rect.x, rect.y, rect.w, W), color);
    fill_rect(out, Rect::new(rect.x, rect.y + rect.h - W, rect.w, W), color);
    fill_rect(out, Rect::new(rect.x, rect.y + W, W, rect.h - 2.0 * W), color);
    fill_rect(out, Rect::new(rect.x + rect.w - W, rect.y + W, W, rect.h - 2.0 * W), color);
}

/// Clear color (last `Clear` wins) and triangles for a frame
pub fn frame_vertices(frame: &Frame) -> (Option<Rgba>, Vec<Vertex>) {
    let mut clear = None;
    let mut vertices = Vec::with_capacity(frame.commands.len() * 6);

    for cmd in &frame.commands {
        match cmd {
            DrawCmd::Clear(color) => {
                clear = Some(*color);
                vertices.clear();
            }
            DrawCmd::FillRect(rect, color) => fill_rect(&mut vertices, *rect, *color),
            DrawCmd::StrokeRect(rect, color) => stroke_rect(&mut vertices, *rect, *color),
            DrawCmd::Text { .. } => {}
        }
    }

    (clear, vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_corners() {
        assert_eq!(to_ndc(0.0, 0.0), [-1.0, 1.0]);
        assert_eq!(to_ndc(WINDOW_WIDTH, WINDOW_HEIGHT), [1.0, -1.0]);
        assert_eq!(to_ndc(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0), [0.0, 0.0]);
    }

    #[test]
    fn test_fill_rect_is_two_triangles() {
        let mut out = Vec::new();
        fill_rect(&mut out, Rect::new(0.0, 0.0, WINDOW_WIDTH, WINDOW_HEIGHT), Rgba::WHITE);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].position, [-1.0, 1.0]);
        assert_eq!(out[5].position, [1.0, -1.0]);
        assert_eq!(out[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_degenerate_and_transparent_rects_are_skipped() {
        let mut out = Vec::new();
        fill_rect(&mut out, Rect::new(10.0, 10.0, 0.0, 5.0), Rgba::WHITE);
        fill_rect(&mut out, Rect::new(10.0, 10.0, 5.0, 5.0), Rgba::WHITE.with_alpha(0));
        assert!(out.is_empty());
    }

    #[test]
    fn test_stroke_is_four_quads() {
        let mut out = Vec::new();
        stroke_rect(&mut out, Rect::new(10.0, 10.0, 50.0, 50.0), Rgba::WHITE);
        assert_eq!(out.len(), 24);
    }

    #[test]
    fn test_frame_vertices_skip_text() {
        let frame = Frame {
            commands: vec![
                DrawCmd::Clear(Rgba::BLACK),
                DrawCmd::FillRect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgba::WHITE),
                DrawCmd::Text {
                    text: "hi".into(),
                    x: 0.0,
                    y: 0.0,
                    size: crate::renderer::scene::TextSize::Small,
                    anchor: crate::renderer::scene::Anchor::TopLeft,
                    color: Rgba::WHITE,
                },
            ],
        };
        let (clear, vertices) = frame_vertices(&frame);
        assert_eq!(clear, Some(Rgba::BLACK));
        assert_eq!(vertices.len(), 6);
    }
}
