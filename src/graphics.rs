use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use crate::point::{ProjectedPoint, Rgba};

/// Glyph ramp from the faintest to the heaviest dot
const RAMP: [char; 4] = ['\u{00b7}', '\u{2219}', '\u{2022}', '\u{25cf}'];
/// Glow at or above this paints a faint halo into empty neighbor cells
const HALO_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Option<(u8, u8, u8)>,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: None,
};

/// Cell buffer a frame is composed into before being flushed to the
/// terminal in one batch. One cell spans two abstract pixel rows, so a
/// square viewport stays round on ~2:1 terminal cells.
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Frame {
            width,
            height,
            cells: vec![BLANK; width as usize * height as usize],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Plot dots in the order given; later dots overwrite earlier ones, so
    /// the caller passes the depth-sorted render set.
    pub fn draw_points(&mut self, points: &[ProjectedPoint]) {
        for point in points {
            let col = point.x.round() as i32;
            let row = (point.y / 2.0).round() as i32;
            let color = shade(point.color, point.opacity, point.glow);
            if point.glow >= HALO_THRESHOLD {
                let halo = Cell {
                    glyph: RAMP[0],
                    color: Some(shade(point.color, point.opacity * 0.3, 0.0)),
                };
                for (dc, dr) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                    if self.at(col + dc, row + dr) == Some(BLANK) {
                        self.put(col + dc, row + dr, halo);
                    }
                }
            }
            self.put(
                col,
                row,
                Cell {
                    glyph: glyph_for(point.size),
                    color: Some(color),
                },
            );
        }
    }

    /// Write a line of text into the buffer, clipped at the right edge
    pub fn put_str(&mut self, col: u16, row: u16, text: &str, color: (u8, u8, u8)) {
        for (i, glyph) in text.chars().enumerate() {
            self.put(
                col as i32 + i as i32,
                row as i32,
                Cell {
                    glyph,
                    color: Some(color),
                },
            );
        }
    }

    fn put(&mut self, col: i32, row: i32, cell: Cell) {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return;
        }
        self.cells[row as usize * self.width as usize + col as usize] = cell;
    }

    fn at(&self, col: i32, row: i32) -> Option<Cell> {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        Some(self.cells[row as usize * self.width as usize + col as usize])
    }

    #[cfg(test)]
    fn cell(&self, col: u16, row: u16) -> Cell {
        self.cells[row as usize * self.width as usize + col as usize]
    }

    /// Flush the frame as one batched command sequence, ending with a
    /// color reset so no style leaks past the batch.
    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        let mut active: Option<(u8, u8, u8)> = None;
        for row in 0..self.height {
            queue!(out, MoveTo(0, row))?;
            for col in 0..self.width {
                let cell = self.cells[row as usize * self.width as usize + col as usize];
                if let Some((r, g, b)) = cell.color {
                    if active != Some((r, g, b)) {
                        queue!(out, SetForegroundColor(Color::Rgb { r, g, b }))?;
                        active = Some((r, g, b));
                    }
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

/// Dot glyph for a projected radius
fn glyph_for(size: f64) -> char {
    if size < 0.45 {
        RAMP[0]
    } else if size < 0.8 {
        RAMP[1]
    } else if size < 1.2 {
        RAMP[2]
    } else {
        RAMP[3]
    }
}

/// Fold opacity and glow into a terminal color: effective alpha dims the
/// hue toward the dark background, glow lifts it toward white.
pub fn shade(color: Rgba, opacity: f64, glow: f64) -> (u8, u8, u8) {
    let alpha = (color.a * opacity).clamp(0.0, 1.0);
    let lift = (glow * 0.12).clamp(0.0, 0.5);
    let channel = |c: u8| {
        let base = c as f64 * alpha;
        (base + (255.0 - base) * lift * alpha).round().min(255.0) as u8
    };
    (channel(color.r), channel(color.g), channel(color.b))
}

/// RAII guard for the terminal session: raw mode, alternate screen,
/// hidden cursor and mouse capture, all restored on drop.
pub struct TerminalSession;

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            Hide,
            EnableMouseCapture
        )?;
        Ok(TerminalSession)
    }

    /// Current terminal size in cells, with fallbacks
    pub fn size() -> (u16, u16) {
        if let Some(size) = termsize::get() {
            return (size.cols, size.rows);
        }
        terminal::size().unwrap_or((80, 24))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            Show,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
