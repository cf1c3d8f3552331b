//! Raw-mode terminal screen that draws a tree's visible lines.

use std::io::{self, Write};
use std::time::Duration;

use arbor::visual::{VisualKind, VisualLine};
use crossterm::{
    cursor,
    event::{self, Event},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns of indentation per tree level.
const INDENT: usize = 2;

pub struct Screen {
    stdout: io::Stdout,
    scroll: usize,
}

/// What the screen shows besides the tree.
pub struct Frame<'a> {
    pub lines: &'a [VisualLine],
    pub status: &'a str,
    pub prompt: Option<&'a str>,
}

impl Screen {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture
        )?;
        Ok(Self { stdout, scroll: 0 })
    }

    /// Wait up to `timeout` for input, then drain whatever else is pending.
    pub fn poll(&self, timeout: Duration) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        if event::poll(timeout)? {
            events.push(event::read()?);
            while event::poll(Duration::ZERO)? {
                events.push(event::read()?);
            }
        }
        Ok(events)
    }

    /// Index into the drawn lines for a screen row, if it shows one.
    pub fn line_at_row(&self, row: u16, line_count: usize) -> Option<usize> {
        let index = self.scroll + usize::from(row);
        (index < line_count).then_some(index)
    }

    /// Whether a click at `column` hits the expander of a line.
    pub fn hits_expander(line: &VisualLine, column: u16) -> bool {
        let start = line.level * INDENT;
        line.kind == VisualKind::Parent && (start..start + 2).contains(&usize::from(column))
    }

    pub fn draw(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        let width = usize::from(width);
        let rows = usize::from(height.saturating_sub(1));
        self.follow_focus(frame.lines, rows);

        queue!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
        for (row, line) in frame.lines.iter().skip(self.scroll).take(rows).enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, row as u16))?;
            if line.focused {
                queue!(self.stdout, SetAttribute(Attribute::Reverse))?;
            }
            if line.selected {
                queue!(self.stdout, SetAttribute(Attribute::Bold))?;
            }
            queue!(self.stdout, Print(truncate(&render_line(line), width)))?;
            queue!(self.stdout, SetAttribute(Attribute::Reset))?;
        }

        let bottom = match frame.prompt {
            Some(query) => format!("/{query}"),
            None => frame.status.to_string(),
        };
        queue!(
            self.stdout,
            cursor::MoveTo(0, height.saturating_sub(1)),
            SetAttribute(Attribute::Dim),
            Print(truncate(&bottom, width)),
            SetAttribute(Attribute::Reset)
        )?;
        self.stdout.flush()
    }

    /// Keep the focused line inside the viewport.
    fn follow_focus(&mut self, lines: &[VisualLine], rows: usize) {
        let Some(focused) = lines.iter().position(|line| line.focused) else {
            self.scroll = self.scroll.min(lines.len().saturating_sub(1));
            return;
        };
        if focused < self.scroll {
            self.scroll = focused;
        } else if rows > 0 && focused >= self.scroll + rows {
            self.scroll = focused + 1 - rows;
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn render_line(line: &VisualLine) -> String {
    let marker = match (line.kind, line.collapsed) {
        (VisualKind::Parent, true) => "▶ ",
        (VisualKind::Parent, false) => "▼ ",
        (VisualKind::Leaf, _) => "  ",
    };
    format!("{}{marker}{}", " ".repeat(line.level * INDENT), line.content)
}

/// Cut `text` to at most `width` display columns.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}
