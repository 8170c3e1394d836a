/// ASCII presenter for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use mvk_core::{Frame, Present};
use std::io::{self, Write};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Converts frames to colored characters, one per terminal cell
pub struct AsciiRenderer<W: Write> {
    writer: W,
    status: String,
    overlay: Vec<String>,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            status: String::new(),
            overlay: Vec::new(),
        }
    }

    /// Text drawn over the first row
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Lines drawn right-aligned below the status row; empty hides the overlay
    pub fn set_overlay(&mut self, lines: Vec<String>) {
        self.overlay = lines;
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

/// Pick a ramp character for a premultiplied pixel
pub fn cell_char(pixel: [f32; 4]) -> char {
    let [r, g, b, _] = pixel;
    let brightness = (0.2126 * r + 0.7152 * g + 0.0722 * b).clamp(0.0, 1.0).sqrt();
    let index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Foreground color for a pixel, from its straight color
fn cell_color(frame: &Frame, x: usize, y: usize) -> Color {
    let ([r, g, b], _) = frame.straight(x, y);
    let encode = |c: f32| (c.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
    Color::Rgb {
        r: encode(r),
        g: encode(g),
        b: encode(b),
    }
}

impl<W: Write> Present for AsciiRenderer<W> {
    type Error = io::Error;

    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        let width = frame.width();
        for y in 0..frame.height() {
            self.writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..width {
                let c = cell_char(frame.pixel(x, y));
                if c != ' ' {
                    self.writer.queue(SetForegroundColor(cell_color(frame, x, y)))?;
                }
                self.writer.queue(Print(c))?;
            }
        }

        for (row, line) in self.overlay.iter().enumerate() {
            let len = line.chars().count().min(width);
            let column = width.saturating_sub(len + 1);
            self.writer
                .queue(cursor::MoveTo(column as u16, row as u16 + 1))?
                .queue(SetForegroundColor(Color::Cyan))?
                .queue(Print(line.chars().take(len).collect::<String>()))?;
        }

        if !self.status.is_empty() {
            self.writer
                .queue(cursor::MoveTo(0, 0))?
                .queue(SetForegroundColor(Color::Yellow))?
                .queue(Print(&self.status))?;
        }

        self.writer.queue(ResetColor)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_ends() {
        assert_eq!(cell_char([0.0; 4]), ' ');
        assert_eq!(cell_char([1.0, 1.0, 1.0, 1.0]), '@');
        assert_eq!(cell_char([4.0, 4.0, 4.0, 1.0]), '@');
    }

    #[test]
    fn brighter_pixels_use_denser_characters() {
        let position = |c| LUMINOSITY_RAMP.iter().position(|&r| r == c).unwrap();
        let dim = position(cell_char([0.05, 0.05, 0.05, 1.0]));
        let bright = position(cell_char([0.6, 0.6, 0.6, 1.0]));
        assert!(dim < bright);
    }

    #[test]
    fn present_writes_every_row_and_overlay() {
        let mut renderer = AsciiRenderer::new(Vec::new());
        renderer.set_status("fps 60");
        renderer.set_overlay(vec!["ior 1.60".to_string()]);
        renderer.present(&Frame::new(12, 3)).unwrap();

        let output = String::from_utf8(renderer.writer().clone()).unwrap();
        assert!(output.contains("fps 60"));
        assert!(output.contains("ior 1.60"));
        assert!(output.matches(' ').count() >= 12 * 3);
    }
}
