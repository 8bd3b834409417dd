//! Deterministic-percentage progress bar.
//!
//! On a TTY the bar redraws in place; off-TTY it emits at most one line per
//! 25% bucket plus a forced final line, so a piped build log stays short.
//! One failed write latches the bar silent for the rest of its life.

use super::StreamHandle;
use std::sync::Mutex;

const BAR_WIDTH: usize = 20;

#[derive(Debug)]
struct Inner {
    current: u64,
    finished: bool,
    write_err: bool,
    // -1 until the first render so a 0% line is still emitted off-TTY.
    last_bucket: i64,
}

/// Progress indicator bound to ErrOut.
#[derive(Debug)]
pub struct ProgressBar {
    err_out: StreamHandle,
    tty: bool,
    total: u64,
    label: String,
    inner: Mutex<Inner>,
}

impl ProgressBar {
    pub(super) fn new(err_out: StreamHandle, tty: bool, total: u64, label: String) -> Self {
        Self {
            err_out,
            tty,
            total: total.max(1),
            label,
            inner: Mutex::new(Inner {
                current: 0,
                finished: false,
                write_err: false,
                last_bucket: -1,
            }),
        }
    }

    /// Set progress to `n`, clamped to `[0, total]`.
    pub fn set(&self, n: i64) {
        let clamped = n.clamp(0, self.total as i64) as u64;
        let mut inner = self.inner.lock().unwrap();
        if inner.finished || inner.write_err {
            return;
        }
        inner.current = clamped;
        self.render(&mut inner, false);
    }

    /// Advance progress by one.
    pub fn increment(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.finished || inner.write_err {
            return;
        }
        inner.current = (inner.current + 1).min(self.total);
        self.render(&mut inner, false);
    }

    /// Complete the bar. Idempotent; no writes occur afterwards.
    pub fn finish(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.finished {
            return;
        }
        inner.current = self.total;
        if !inner.write_err {
            self.render(&mut inner, true);
        }
        inner.finished = true;
    }

    fn percent(&self, current: u64) -> u64 {
        current * 100 / self.total
    }

    fn render(&self, inner: &mut Inner, finishing: bool) {
        let pct = self.percent(inner.current);
        let text = if self.tty {
            let filled = (pct as usize * BAR_WIDTH) / 100;
            let bar = format!("{}{}", "=".repeat(filled), "-".repeat(BAR_WIDTH - filled));
            let mut line = format!(
                "\r\x1b[K{} [{bar}] {pct}% ({}/{})",
                self.label, inner.current, self.total
            );
            if finishing {
                line.push('\n');
            }
            line
        } else {
            let bucket = (pct / 25 * 25) as i64;
            if finishing {
                if inner.last_bucket >= 100 {
                    return;
                }
                inner.last_bucket = 100;
                format!("{}... 100%\n", self.label)
            } else {
                if bucket <= inner.last_bucket {
                    return;
                }
                inner.last_bucket = bucket;
                format!("{}... {bucket}%\n", self.label)
            }
        };
        if self.err_out.write_str(&text).is_err() {
            inner.write_err = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::IoStreams;
    use super::*;

    fn bar(total: u64) -> (ProgressBar, super::super::TestStreams) {
        let (ios, handles) = IoStreams::test();
        (ios.progress_bar(total, "Building"), handles)
    }

    #[test]
    fn test_non_tty_buckets() {
        let (bar, handles) = bar(100);
        for n in 0..=100 {
            bar.set(n);
        }
        bar.finish();
        assert_eq!(
            handles.err_string(),
            "Building... 0%\nBuilding... 25%\nBuilding... 50%\nBuilding... 75%\nBuilding... 100%\n"
        );
    }

    #[test]
    fn test_non_tty_line_budget() {
        let (bar, handles) = bar(1000);
        for n in (0..=1000).step_by(7) {
            bar.set(n);
        }
        bar.finish();
        assert!(handles.err_string().lines().count() <= 5);
    }

    #[test]
    fn test_set_clamps() {
        let (bar, handles) = bar(10);
        bar.set(-1);
        bar.set(50);
        bar.finish();
        let out = handles.err_string();
        assert!(out.contains("Building... 0%"));
        assert!(out.contains("Building... 100%"));
        assert!(!out.contains("500%"));
    }

    #[test]
    fn test_finish_is_idempotent_and_final() {
        let (bar, handles) = bar(4);
        bar.set(4);
        bar.finish();
        let after_finish = handles.err_string();
        bar.finish();
        bar.set(2);
        bar.increment();
        assert_eq!(handles.err_string(), after_finish);
    }

    #[test]
    fn test_increment_reaches_total() {
        let (bar, handles) = bar(2);
        bar.increment();
        bar.increment();
        bar.increment();
        bar.finish();
        let out = handles.err_string();
        assert!(out.contains("50%"));
        assert!(out.ends_with("Building... 100%\n"));
    }

    #[test]
    fn test_tty_renders_in_place() {
        let (ios, handles) = IoStreams::test();
        ios.probe().set_stderr_tty(true);
        let bar = ios.progress_bar(10, "Copy");
        bar.set(5);
        bar.finish();
        let out = handles.err_string();
        assert!(out.contains("\r\x1b[K"));
        assert!(out.contains("Copy [==========----------] 50% (5/10)"));
        assert!(out.contains("100% (10/10)"));
        assert!(out.ends_with('\n'));
    }
}
