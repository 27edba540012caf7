//! Terminal surface: screen acquisition, color capability and input
//!
//! The surface owns the alternate screen and raw mode, restores both when
//! dropped, and writes frames with explicit per-line cursor positioning so a
//! long line can never corrupt the rows below it.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::time::{Duration, Instant};

/// Color capability of the terminal, detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Monochrome,
    Ansi16,
    Ansi256,
}

/// Detect color depth from the environment. Honors NO_COLOR and treats dumb
/// or unset terminals as monochrome.
pub fn detect_color_depth() -> ColorDepth {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorDepth::Monochrome;
    }
    let term = std::env::var("TERM").unwrap_or_default();
    if term.is_empty() || term == "dumb" {
        return ColorDepth::Monochrome;
    }
    let colorterm = std::env::var("COLORTERM").unwrap_or_default();
    if term.contains("256color") || colorterm == "truecolor" || colorterm == "24bit" {
        ColorDepth::Ansi256
    } else {
        ColorDepth::Ansi16
    }
}

// Reds through warm whites on the 256-color cube, darkest first.
const PALETTE_256: &[u8] = &[88, 124, 160, 196, 210, 216, 229, 231];
const PALETTE_16: &[u8] = &[1, 9, 11, 15];

/// Ordered ANSI foreground colors used to shade intensity bands.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: &'static [u8],
}

impl Palette {
    /// Palette for the detected color depth; `None` selects glyph-only mode.
    pub fn for_depth(depth: ColorDepth) -> Option<Self> {
        match depth {
            ColorDepth::Ansi256 => Some(Self { colors: PALETTE_256 }),
            ColorDepth::Ansi16 => Some(Self { colors: PALETTE_16 }),
            ColorDepth::Monochrome => None,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color value for a 1-based quantizer index.
    pub fn color(&self, index: usize) -> u8 {
        self.colors[index - 1]
    }
}

/// Terminal surface with buffered output
pub struct TerminalSurface {
    width: u16,
    height: u16,
    last_resize_check: Instant,
    buffer: BufWriter<Stdout>,
}

impl TerminalSurface {
    pub fn new() -> io::Result<Self> {
        // Enter the alternate screen first to get accurate dimensions.
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;

        Ok(Self {
            width,
            height,
            last_resize_check: Instant::now(),
            buffer: BufWriter::new(stdout),
        })
    }

    pub fn get_size(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    /// Check if the terminal has been resized, at most every 100ms.
    pub fn check_resize(&mut self) -> bool {
        if self.last_resize_check.elapsed() < Duration::from_millis(100) {
            return false;
        }
        self.last_resize_check = Instant::now();

        if let Ok((new_width, new_height)) = terminal::size() {
            if new_width != self.width || new_height != self.height {
                self.width = new_width;
                self.height = new_height;
                return true;
            }
        }
        false
    }

    /// Write a frame with explicit cursor positioning per line.
    pub fn draw(&mut self, frame: &str) -> io::Result<()> {
        // \x1b[?7l = disable line wrap while the frame goes out.
        write!(self.buffer, "\x1b[?7l")?;

        for (i, line) in frame.lines().enumerate() {
            // Position at row i+1, column 1.
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
        }

        // Clear anything left over from a larger previous frame, re-enable
        // line wrap, and flush.
        write!(self.buffer, "\x1b[J\x1b[?7h")?;
        self.buffer.flush()
    }

    /// Check for keyboard input; the timeout doubles as the frame delay.
    pub fn poll_input(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                return Ok(Some(key_event));
            }
        }
        Ok(None)
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = self.buffer.flush();
        let _ = execute!(stdout(), cursor::Show, LeaveAlternateScreen);
    }
}

/// Key actions for the render loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
}

/// Parse keyboard input. In raw mode Ctrl-C arrives as a key event rather
/// than SIGINT, so it is handled here.
pub fn parse_key_event(event: KeyEvent) -> Action {
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        _ => Action::None,
    }
}
