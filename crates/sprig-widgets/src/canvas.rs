#![forbid(unsafe_code)]

//! Drawing surface consumed by render strategies.
//!
//! Pixel output belongs to the host. Widgets and behaviors only issue
//! primitive commands through [`Canvas`]; [`RecordingCanvas`] captures them
//! for inspection.

use serde::{Deserialize, Serialize};
use sprig_core::geometry::{Point, Rect, Size};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const LIGHT_GRAY: Self = Self::rgb(211, 211, 211);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Target of render commands, in the coordinates of the view being drawn.
pub trait Canvas {
    /// Fill `rect` with `color`.
    fn rect(&mut self, rect: Rect, color: Color);

    /// Stroke a one-unit line from `from` to `to`.
    fn line(&mut self, from: Point, to: Point, color: Color);

    /// Drawable area.
    fn size(&self) -> Size;
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect { rect: Rect, color: Color },
    Line { from: Point, to: Point, color: Color },
}

/// Canvas that records commands instead of drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingCanvas {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Commands in the order they were issued.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn line(&mut self, from: Point, to: Point, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn size(&self) -> Size {
        self.size
    }
}
