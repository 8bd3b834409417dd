//! Animated spinner with a deterministic textual fallback.
//!
//! Animated mode runs a background thread writing
//! `\r<clear><frame> <label>` to ErrOut every ~120ms. Textual mode (spinner
//! disabled or ErrOut not a TTY) prints `label...\n` once per start so
//! piped transcripts stay byte-stable.

use super::StreamHandle;
use super::color::ColorScheme;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Frame set used by the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinnerStyle {
    /// Braille dots (the default).
    #[default]
    Braille,
    /// Simple dot cycle.
    Dots,
    /// ASCII line.
    Line,
    /// Growing pulse.
    Pulse,
    /// Spinning globe.
    Globe,
    /// Moon phases.
    Moon,
}

impl SpinnerStyle {
    /// The frame sequence for this style.
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Self::Braille => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            Self::Dots => &["   ", ".  ", ".. ", "..."],
            Self::Line => &["-", "\\", "|", "/"],
            Self::Pulse => &["█", "▓", "▒", "░"],
            Self::Globe => &["🌍", "🌎", "🌏"],
            Self::Moon => &["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"],
        }
    }
}

/// Render one spinner frame: deterministic, used directly by tests.
pub fn spinner_frame(style: SpinnerStyle, tick: usize, label: &str, scheme: &ColorScheme) -> String {
    let frames = style.frames();
    let frame = frames[tick % frames.len()];
    format!("{} {label}", scheme.info(frame))
}

/// Normalize a textual-fallback label: ensure a single trailing `...`,
/// defaulting to `Working...` for empty labels.
pub(super) fn textual_label(label: &str) -> String {
    if label.is_empty() {
        return "Working...".to_string();
    }
    if label.ends_with("...") {
        label.to_string()
    } else {
        format!("{label}...")
    }
}

/// A running animated spinner. One per streams instance, behind a mutex.
#[derive(Debug)]
pub(super) struct SpinnerHandle {
    label: Arc<Mutex<String>>,
    done_tx: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl SpinnerHandle {
    /// Launch the animation thread.
    pub(super) fn spawn(
        err_out: StreamHandle,
        style: SpinnerStyle,
        label: String,
        scheme: ColorScheme,
    ) -> Self {
        let label = Arc::new(Mutex::new(label));
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let thread_label = Arc::clone(&label);
        let thread = std::thread::spawn(move || {
            let mut tick = 0usize;
            loop {
                match done_rx.recv_timeout(Duration::from_millis(120)) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }
                let text = {
                    let label = thread_label.lock().unwrap();
                    spinner_frame(style, tick, &label, &scheme)
                };
                // A failed write aborts the loop rather than spinning hot
                // against a broken pipe.
                if err_out.write_str(&format!("\r\x1b[K{text}")).is_err() {
                    break;
                }
                tick += 1;
            }
        });
        Self {
            label,
            done_tx,
            thread,
        }
    }

    /// Swap the label shown by the running animation.
    pub(super) fn set_label(&self, label: String) {
        *self.label.lock().unwrap() = label;
    }

    /// Signal the thread, wait for it to exit, then erase the line.
    ///
    /// The join guarantees no late frame write races the clear.
    pub(super) fn stop(self, err_out: &StreamHandle) {
        let _ = self.done_tx.send(());
        let _ = self.thread.join();
        let _ = err_out.write_str("\r\x1b[K");
    }
}

#[cfg(test)]
mod tests {
    use super::super::tty::Theme;
    use super::*;

    #[test]
    fn test_frames_cycle() {
        let scheme = ColorScheme::new(false, Theme::None);
        let frames = SpinnerStyle::Braille.frames();
        assert_eq!(
            spinner_frame(SpinnerStyle::Braille, 0, "load", &scheme),
            format!("{} load", frames[0])
        );
        assert_eq!(
            spinner_frame(SpinnerStyle::Braille, frames.len(), "load", &scheme),
            format!("{} load", frames[0])
        );
        assert_eq!(
            spinner_frame(SpinnerStyle::Braille, 3, "load", &scheme),
            format!("{} load", frames[3])
        );
    }

    #[test]
    fn test_frame_applies_info_color() {
        let scheme = ColorScheme::new(true, Theme::Dark);
        let styled = spinner_frame(SpinnerStyle::Line, 0, "x", &scheme);
        assert!(styled.contains('-'));
        assert!(styled.contains('\u{1b}'));
        assert!(styled.ends_with(" x"));
    }

    #[test]
    fn test_every_style_has_frames() {
        for style in [
            SpinnerStyle::Braille,
            SpinnerStyle::Dots,
            SpinnerStyle::Line,
            SpinnerStyle::Pulse,
            SpinnerStyle::Globe,
            SpinnerStyle::Moon,
        ] {
            assert!(!style.frames().is_empty());
        }
    }

    #[test]
    fn test_textual_label() {
        assert_eq!(textual_label(""), "Working...");
        assert_eq!(textual_label("Building"), "Building...");
        assert_eq!(textual_label("Building..."), "Building...");
    }
}
