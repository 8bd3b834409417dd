//! I/O streams - the one handle every subcommand talks to the terminal
//! through.
//!
//! Output discipline: machine-readable data goes to `Out`, human status
//! (progress, icons, errors, hints) goes to `ErrOut`. Scripts piping `Out`
//! must never see progress chatter, and a user redirecting `Out` must still
//! see errors.
//!
//! No method here blocks on network or disk I/O.

pub mod color;
mod pager;
mod progress;
mod spinner;
pub mod tty;

pub use progress::ProgressBar;
pub use spinner::{SpinnerStyle, spinner_frame};

use color::ColorScheme;
use pager::PagerProcess;
use spinner::SpinnerHandle;
use std::io::{BufRead, Read, Write};
use std::sync::{Arc, Mutex};
use tty::TermProbe;

mod render;
pub use render::TablePrinter;

/// Where a stream handle currently writes.
#[derive(Debug)]
enum Sink {
    Stdout,
    Stderr,
    Buffer(Vec<u8>),
    Pager(std::process::ChildStdin),
}

/// A cloneable output handle; clones share one sink, so redirecting `Out`
/// into a pager is visible everywhere at once.
#[derive(Debug, Clone)]
pub struct StreamHandle(Arc<Mutex<Sink>>);

impl StreamHandle {
    fn stdout() -> Self {
        Self(Arc::new(Mutex::new(Sink::Stdout)))
    }

    fn stderr() -> Self {
        Self(Arc::new(Mutex::new(Sink::Stderr)))
    }

    fn buffer() -> Self {
        Self(Arc::new(Mutex::new(Sink::Buffer(Vec::new()))))
    }

    /// Write a string, flushing immediately. One call, one atomic write
    /// from the underlying writer's point of view.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error (callers either propagate or latch).
    pub fn write_str(&self, s: &str) -> std::io::Result<()> {
        let mut sink = self.0.lock().unwrap();
        match &mut *sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(s.as_bytes())?;
                out.flush()
            }
            Sink::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(s.as_bytes())?;
                err.flush()
            }
            Sink::Buffer(buf) => {
                buf.extend_from_slice(s.as_bytes());
                Ok(())
            }
            Sink::Pager(stdin) => {
                stdin.write_all(s.as_bytes())?;
                stdin.flush()
            }
        }
    }

    /// Write a string followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error.
    pub fn write_line(&self, s: &str) -> std::io::Result<()> {
        self.write_str(&format!("{s}\n"))
    }

    /// Snapshot of the buffer contents; empty for non-buffer sinks.
    pub fn contents(&self) -> Vec<u8> {
        match &*self.0.lock().unwrap() {
            Sink::Buffer(buf) => buf.clone(),
            _ => Vec::new(),
        }
    }

    fn replace(&self, new: Sink) -> Sink {
        std::mem::replace(&mut *self.0.lock().unwrap(), new)
    }
}

/// Input side of the streams: process stdin or an in-memory script.
#[derive(Debug, Clone)]
pub struct InputHandle(Arc<Mutex<Source>>);

#[derive(Debug)]
enum Source {
    Stdin,
    Buffer(std::io::Cursor<Vec<u8>>),
}

impl InputHandle {
    fn stdin() -> Self {
        Self(Arc::new(Mutex::new(Source::Stdin)))
    }

    fn buffer() -> Self {
        Self(Arc::new(Mutex::new(Source::Buffer(std::io::Cursor::new(
            Vec::new(),
        )))))
    }

    /// Read one line, without the trailing newline. `None` on EOF.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error.
    pub fn read_line(&self) -> std::io::Result<Option<String>> {
        let mut source = self.0.lock().unwrap();
        let mut line = String::new();
        let n = match &mut *source {
            Source::Stdin => std::io::stdin().lock().read_line(&mut line)?,
            Source::Buffer(cursor) => cursor.read_line(&mut line)?,
        };
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Replace the buffered input script (tests).
    pub fn set_content(&self, content: &str) {
        let mut source = self.0.lock().unwrap();
        if let Source::Buffer(cursor) = &mut *source {
            *cursor = std::io::Cursor::new(content.as_bytes().to_vec());
        }
    }

    /// How many bytes of buffered input remain unread (tests).
    pub fn remaining(&self) -> usize {
        match &mut *self.0.lock().unwrap() {
            Source::Buffer(cursor) => {
                let mut rest = Vec::new();
                let pos = cursor.position();
                let n = cursor.read_to_end(&mut rest).unwrap_or(0);
                cursor.set_position(pos);
                n
            }
            Source::Stdin => 0,
        }
    }
}

#[derive(Debug)]
struct PagerState {
    process: PagerProcess,
    saved: Sink,
}

#[derive(Debug, Default)]
struct AltScreen {
    enabled: bool,
    active: bool,
}

/// Handles to a test stream set, for asserting transcripts.
#[derive(Debug, Clone)]
pub struct TestStreams {
    /// The shared stdin script.
    pub input: InputHandle,
    out: StreamHandle,
    err_out: StreamHandle,
}

impl TestStreams {
    /// Everything written to Out so far.
    pub fn out_string(&self) -> String {
        String::from_utf8_lossy(&self.out.contents()).into_owned()
    }

    /// Everything written to ErrOut so far.
    pub fn err_string(&self) -> String {
        String::from_utf8_lossy(&self.err_out.contents()).into_owned()
    }
}

/// The per-process stream triple with terminal-UX state attached.
#[derive(Debug)]
pub struct IoStreams {
    input: InputHandle,
    out: StreamHandle,
    err_out: StreamHandle,
    probe: TermProbe,
    spinner_disabled: bool,
    spinner_style: Mutex<SpinnerStyle>,
    spinner: Mutex<Option<SpinnerHandle>>,
    pager: Mutex<Option<PagerState>>,
    alt_screen: Mutex<AltScreen>,
    never_prompt: Mutex<bool>,
}

impl IoStreams {
    /// Streams wired to the process's standard handles.
    pub fn system() -> Self {
        Self {
            input: InputHandle::stdin(),
            out: StreamHandle::stdout(),
            err_out: StreamHandle::stderr(),
            probe: TermProbe::system(),
            spinner_disabled: std::env::var_os("CLAWKER_SPINNER_DISABLED").is_some(),
            spinner_style: Mutex::new(SpinnerStyle::default()),
            spinner: Mutex::new(None),
            pager: Mutex::new(None),
            alt_screen: Mutex::new(AltScreen::default()),
            never_prompt: Mutex::new(false),
        }
    }

    /// Streams wired to in-memory buffers: TTY=false, color=false, with
    /// knobs on the returned probe/handles to flip them.
    pub fn test() -> (Self, TestStreams) {
        let input = InputHandle::buffer();
        let out = StreamHandle::buffer();
        let err_out = StreamHandle::buffer();
        let handles = TestStreams {
            input: input.clone(),
            out: out.clone(),
            err_out: err_out.clone(),
        };
        let ios = Self {
            input,
            out,
            err_out,
            probe: TermProbe::test(),
            spinner_disabled: false,
            spinner_style: Mutex::new(SpinnerStyle::default()),
            spinner: Mutex::new(None),
            pager: Mutex::new(None),
            alt_screen: Mutex::new(AltScreen::default()),
            never_prompt: Mutex::new(false),
        };
        (ios, handles)
    }

    /// The data sink.
    pub fn out(&self) -> &StreamHandle {
        &self.out
    }

    /// The status sink.
    pub fn err(&self) -> &StreamHandle {
        &self.err_out
    }

    /// The input side.
    pub fn input(&self) -> &InputHandle {
        &self.input
    }

    /// The capability probe (TTY/color/theme/size).
    pub fn probe(&self) -> &TermProbe {
        &self.probe
    }

    /// Whether stdin is a terminal.
    pub fn is_input_tty(&self) -> bool {
        self.probe.is_input_tty()
    }

    /// Whether stdout is a terminal.
    pub fn is_output_tty(&self) -> bool {
        self.probe.is_output_tty()
    }

    /// Whether stderr is a terminal.
    pub fn is_stderr_tty(&self) -> bool {
        self.probe.is_stderr_tty()
    }

    /// Whether color output is currently enabled.
    pub fn color_enabled(&self) -> bool {
        self.probe.color_enabled()
    }

    /// Override color detection (`--color` / `--no-color`).
    pub fn set_color_enabled(&self, enabled: bool) {
        self.probe.set_color_enabled(enabled);
    }

    /// Scheme bound to the current enabled/theme state.
    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme::new(self.color_enabled(), self.probe.theme())
    }

    /// Terminal size, `(80, 24)` when unknown.
    pub fn terminal_size(&self) -> (u16, u16) {
        self.probe.terminal_size()
    }

    /// Whether interactive prompting is allowed.
    pub fn can_prompt(&self) -> bool {
        !*self.never_prompt.lock().unwrap() && self.is_input_tty() && self.is_output_tty()
    }

    /// Force every prompt to return its default (`--yes`).
    pub fn set_never_prompt(&self, never: bool) {
        *self.never_prompt.lock().unwrap() = never;
    }

    /// Whether animated progress UI is appropriate.
    pub fn progress_enabled(&self) -> bool {
        self.is_stderr_tty()
    }

    // --- status messages (ErrOut) ---

    /// One success line with an icon on ErrOut.
    pub fn print_success(&self, msg: impl std::fmt::Display) {
        let scheme = self.color_scheme();
        let _ = self.err_out.write_line(&scheme.success_icon_with_text(msg));
    }

    /// One warning line with an icon on ErrOut.
    pub fn print_warning(&self, msg: impl std::fmt::Display) {
        let scheme = self.color_scheme();
        let _ = self.err_out.write_line(&scheme.warning_icon_with_text(msg));
    }

    /// One info line with an icon on ErrOut.
    pub fn print_info(&self, msg: impl std::fmt::Display) {
        let scheme = self.color_scheme();
        let _ = self.err_out.write_line(&scheme.info_icon_with_text(msg));
    }

    /// One failure line with an icon on ErrOut.
    pub fn print_failure(&self, msg: impl std::fmt::Display) {
        let scheme = self.color_scheme();
        let _ = self.err_out.write_line(&scheme.failure_icon_with_text(msg));
    }

    /// `No {noun} found.` plus optional muted hints, on ErrOut.
    pub fn print_empty(&self, noun: &str, hints: &[&str]) {
        let scheme = self.color_scheme();
        let _ = self.err_out.write_line(&format!("No {noun} found."));
        for hint in hints {
            let _ = self.err_out.write_line(&scheme.muted(hint));
        }
    }

    // --- spinner ---

    /// Select the frame set used by subsequent spinners.
    pub fn set_spinner_style(&self, style: SpinnerStyle) {
        *self.spinner_style.lock().unwrap() = style;
    }

    /// Start the spinner, or update its label when already running.
    ///
    /// Textual fallback (spinner disabled or ErrOut not a TTY) prints
    /// exactly one `label...` line per call.
    pub fn start_spinner(&self, label: &str) {
        let mut slot = self.spinner.lock().unwrap();
        if let Some(handle) = slot.as_ref() {
            handle.set_label(label.to_string());
            return;
        }
        if self.progress_enabled() && !self.spinner_disabled {
            let style = *self.spinner_style.lock().unwrap();
            *slot = Some(SpinnerHandle::spawn(
                self.err_out.clone(),
                style,
                label.to_string(),
                self.color_scheme(),
            ));
        } else {
            let _ = self.err_out.write_line(&spinner::textual_label(label));
        }
    }

    /// Stop the spinner and erase its line. Idempotent; waits for the
    /// animation thread to exit before clearing.
    pub fn stop_spinner(&self) {
        let handle = self.spinner.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.stop(&self.err_out);
        }
    }

    /// Run `fut` under a spinner, stopping it on every return path.
    ///
    /// # Errors
    ///
    /// Propagates `fut`'s error unchanged.
    pub async fn run_with_spinner<T, E, Fut>(&self, label: &str, fut: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        self.start_spinner(label);
        let result = fut.await;
        self.stop_spinner();
        result
    }

    // --- progress bar ---

    /// A progress bar over `total` units, rendered on ErrOut.
    pub fn progress_bar(&self, total: u64, label: &str) -> ProgressBar {
        ProgressBar::new(
            self.err_out.clone(),
            self.is_stderr_tty(),
            total,
            label.to_string(),
        )
    }

    // --- pager ---

    /// Redirect `Out` through the configured pager. No-op when `Out` is
    /// not a TTY or a pager is already running.
    ///
    /// # Errors
    ///
    /// Returns an error when the pager cannot be spawned.
    pub fn start_pager(&self) -> std::io::Result<()> {
        if !self.is_output_tty() {
            return Ok(());
        }
        let mut pager = self.pager.lock().unwrap();
        if pager.is_some() {
            return Ok(());
        }
        let Some(argv) = pager::resolve_pager() else {
            return Ok(());
        };
        let (process, stdin) = PagerProcess::spawn(&argv)?;
        let saved = self.out.replace(Sink::Pager(stdin));
        *pager = Some(PagerState { process, saved });
        Ok(())
    }

    /// Close the pager's stdin, wait for it to exit, and restore `Out`.
    /// Broken pipes are swallowed; quitting the pager early is normal.
    pub fn stop_pager(&self) {
        let state = self.pager.lock().unwrap().take();
        if let Some(state) = state {
            // Swapping back drops the pager sink, closing the child's stdin.
            let _ = self.out.replace(state.saved);
            state.process.wait();
        }
    }

    // --- alternate screen ---

    /// Allow `start_alternate_screen_buffer` to take effect.
    pub fn set_alternate_screen_buffer_enabled(&self, enabled: bool) {
        self.alt_screen.lock().unwrap().enabled = enabled;
    }

    /// Switch to the alternate screen when enabled, stdout is a TTY, and
    /// it is not already active.
    pub fn start_alternate_screen_buffer(&self) {
        let mut alt = self.alt_screen.lock().unwrap();
        if alt.enabled && !alt.active && self.is_output_tty() && self.out.write_str("\x1b[?1049h").is_ok() {
            alt.active = true;
        }
    }

    /// Restore the normal screen if the alternate one is active.
    pub fn stop_alternate_screen_buffer(&self) {
        let mut alt = self.alt_screen.lock().unwrap();
        if alt.active {
            let _ = self.out.write_str("\x1b[?1049l");
            alt.active = false;
        }
    }
}
