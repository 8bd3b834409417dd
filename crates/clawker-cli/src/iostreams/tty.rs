//! Terminal capability probe.
//!
//! Answers "is this stream a terminal", "is color on", "what theme", "how
//! big is the terminal" — each resolved at most once and cached. All
//! probing is infallible: every accessor has a well-defined default.

use std::io::IsTerminal;
use std::sync::Mutex;

/// Color override state: auto-detect unless forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Enabled iff stdout is a TTY and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Forced on (`--color`).
    On,
    /// Forced off (`--no-color`).
    Off,
}

/// Detected terminal background theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Light background.
    Light,
    /// Dark background (the default guess).
    Dark,
    /// No theme: color is disabled.
    None,
}

/// TTY answer for one stream: resolved at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TriState {
    #[default]
    Unchecked,
    No,
    Yes,
}

impl TriState {
    fn from_bool(v: bool) -> Self {
        if v { Self::Yes } else { Self::No }
    }
}

/// Per-process cached terminal capabilities.
#[derive(Debug)]
pub struct TermProbe {
    // When false (test streams) every unchecked probe resolves to No.
    real: bool,
    stdin_tty: Mutex<TriState>,
    stdout_tty: Mutex<TriState>,
    stderr_tty: Mutex<TriState>,
    color_mode: Mutex<ColorMode>,
    no_color_env: bool,
    theme_hint: Theme,
    size: Mutex<Option<(u16, u16)>>,
}

impl TermProbe {
    /// Probe wired to the process's real standard streams.
    pub fn system() -> Self {
        Self {
            real: true,
            stdin_tty: Mutex::new(TriState::Unchecked),
            stdout_tty: Mutex::new(TriState::Unchecked),
            stderr_tty: Mutex::new(TriState::Unchecked),
            color_mode: Mutex::new(ColorMode::Auto),
            no_color_env: std::env::var_os("NO_COLOR").is_some(),
            theme_hint: detect_theme(
                std::env::var("COLORFGBG").ok().as_deref(),
                std::env::var("TERM_PROGRAM").ok().as_deref(),
            ),
            size: Mutex::new(None),
        }
    }

    /// Probe for in-memory test streams: never a TTY, never colored,
    /// fixed 80x24 until overridden.
    pub fn test() -> Self {
        Self {
            real: false,
            stdin_tty: Mutex::new(TriState::Unchecked),
            stdout_tty: Mutex::new(TriState::Unchecked),
            stderr_tty: Mutex::new(TriState::Unchecked),
            color_mode: Mutex::new(ColorMode::Off),
            no_color_env: false,
            theme_hint: Theme::Dark,
            size: Mutex::new(Some((80, 24))),
        }
    }

    /// Whether stdin is a terminal (cached after the first call).
    pub fn is_input_tty(&self) -> bool {
        Self::resolve(&self.stdin_tty, self.real, || std::io::stdin().is_terminal())
    }

    /// Whether stdout is a terminal (cached after the first call).
    pub fn is_output_tty(&self) -> bool {
        Self::resolve(&self.stdout_tty, self.real, || {
            std::io::stdout().is_terminal()
        })
    }

    /// Whether stderr is a terminal (cached after the first call).
    pub fn is_stderr_tty(&self) -> bool {
        Self::resolve(&self.stderr_tty, self.real, || {
            std::io::stderr().is_terminal()
        })
    }

    fn resolve(slot: &Mutex<TriState>, real: bool, probe: impl FnOnce() -> bool) -> bool {
        let mut state = slot.lock().unwrap();
        match *state {
            TriState::Yes => true,
            TriState::No => false,
            TriState::Unchecked => {
                let answer = real && probe();
                *state = TriState::from_bool(answer);
                answer
            }
        }
    }

    /// Force the stdin TTY answer (tests).
    pub fn set_stdin_tty(&self, tty: bool) {
        *self.stdin_tty.lock().unwrap() = TriState::from_bool(tty);
    }

    /// Force the stdout TTY answer (tests).
    pub fn set_stdout_tty(&self, tty: bool) {
        *self.stdout_tty.lock().unwrap() = TriState::from_bool(tty);
    }

    /// Force the stderr TTY answer (tests).
    pub fn set_stderr_tty(&self, tty: bool) {
        *self.stderr_tty.lock().unwrap() = TriState::from_bool(tty);
    }

    /// Whether color output is enabled right now.
    pub fn color_enabled(&self) -> bool {
        match *self.color_mode.lock().unwrap() {
            ColorMode::On => true,
            ColorMode::Off => false,
            ColorMode::Auto => self.is_output_tty() && !self.no_color_env,
        }
    }

    /// Override color detection.
    pub fn set_color_enabled(&self, enabled: bool) {
        *self.color_mode.lock().unwrap() = if enabled { ColorMode::On } else { ColorMode::Off };
    }

    /// Current theme; [`Theme::None`] whenever color is disabled.
    pub fn theme(&self) -> Theme {
        if self.color_enabled() {
            self.theme_hint
        } else {
            Theme::None
        }
    }

    /// Terminal size in columns/rows, `(80, 24)` when detection fails.
    pub fn terminal_size(&self) -> (u16, u16) {
        let mut cache = self.size.lock().unwrap();
        if let Some(size) = *cache {
            return size;
        }
        let size = if self.real {
            crossterm::terminal::size().unwrap_or((80, 24))
        } else {
            (80, 24)
        };
        *cache = Some(size);
        size
    }

    /// Pin the terminal size (tests).
    pub fn set_terminal_size(&self, width: u16, height: u16) {
        *self.size.lock().unwrap() = Some((width, height));
    }

    /// Drop the cached size so the next query re-probes (window resize).
    pub fn invalidate_terminal_size_cache(&self) {
        *self.size.lock().unwrap() = None;
    }
}

/// Map environment hints onto a theme.
///
/// `COLORFGBG` is `"<fg>;<bg>"` (some emulators add a middle field); a dark
/// background code (0-6 or 8) means a dark theme. The mapping is
/// approximate: emulators disagree about this variable, so treat the result
/// as a hint, not ground truth.
fn detect_theme(colorfgbg: Option<&str>, term_program: Option<&str>) -> Theme {
    if let Some(value) = colorfgbg
        && let Some(bg) = value.rsplit(';').next()
    {
        return match bg {
            "0" | "1" | "2" | "3" | "4" | "5" | "6" | "8" => Theme::Dark,
            _ => Theme::Light,
        };
    }
    if term_program == Some("Apple_Terminal") {
        return Theme::Light;
    }
    Theme::Dark
}
