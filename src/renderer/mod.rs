//! Rendering
//!
//! `scene` turns a [`GameState`](crate::sim::GameState) into a list of draw
//! commands. The WebGPU pipeline rasterizes the rectangles; text is left to
//! the frontend.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{Anchor, DrawCmd, Frame, Rect, Rgba, SceneOptions, TextSize, build_frame};
