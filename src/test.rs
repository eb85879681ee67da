use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::ansi::{HIDE_CURSOR, RESET, SHOW_CURSOR};
use crate::{BarStyle, ProgressBar, Spinner, SpinnerState, SpinnerStyle};

/// In-memory writer whose clones share one buffer.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.text().matches(needle).count()
    }

    pub fn screen(&self) -> VirtualTerm {
        let mut term = VirtualTerm::new();
        term.feed(&self.text());
        term
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Interprets the subset of ANSI the crate emits into plain screen lines.
pub struct VirtualTerm {
    lines: Vec<Vec<char>>,
    row: usize,
    col: usize,
    pub cursor_visible: bool,
}

impl VirtualTerm {
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            row: 0,
            col: 0,
            cursor_visible: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.iter().collect()).collect()
    }

    pub fn feed(&mut self, s: &str) {
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            match c {
                '\x1b' => {
                    if chars.next() != Some('[') {
                        continue;
                    }
                    let mut params = String::new();
                    let mut command = None;
                    for c in chars.by_ref() {
                        if c.is_ascii_alphabetic() {
                            command = Some(c);
                            break;
                        }
                        params.push(c);
                    }
                    match (params.as_str(), command) {
                        ("?25", Some('l')) => self.cursor_visible = false,
                        ("?25", Some('h')) => self.cursor_visible = true,
                        ("2", Some('K')) => self.lines[self.row].clear(),
                        _ => {}
                    }
                }
                '\r' => self.col = 0,
                '\n' => {
                    self.row += 1;
                    self.col = 0;
                    if self.lines.len() <= self.row {
                        self.lines.push(Vec::new());
                    }
                }
                c => {
                    let line = &mut self.lines[self.row];
                    if self.col < line.len() {
                        line[self.col] = c;
                    } else {
                        line.push(c);
                    }
                    self.col += 1;
                }
            }
        }
    }
}

fn sleep(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

/// Polls `cond` for up to a second.
fn eventually(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(1);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        sleep(2);
    }
    cond()
}

/// Time until `cond` holds, polling for no longer than `limit`.
fn time_until(limit: Duration, cond: impl Fn() -> bool) -> Option<Duration> {
    let start = Instant::now();
    while start.elapsed() <= limit {
        if cond() {
            return Some(start.elapsed());
        }
        std::thread::yield_now();
    }
    None
}

#[test]
fn test_virtual_term() {
    let mut term = VirtualTerm::new();
    term.feed("\x1b[?25l\r\x1b[2Kfirst\r\x1b[2K\x1b[32mok\x1b[0m\n\x1b[?25h");
    assert_eq!(term.lines(), vec!["ok", ""]);
    assert!(term.cursor_visible);
}

#[test]
fn test_spinner_stop_without_start() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("working")
        .final_symbol("✔")
        .final_text(" Done")
        .build_with_writer(out.clone());

    spinner.stop().unwrap();

    assert_eq!(out.text(), "\x1b[2K\r\x1b[32m✔\x1b[0m  Done\n\x1b[?25h");
    assert_eq!(spinner.state(), SpinnerState::Stopped);
}

#[test]
fn test_spinner_double_start() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("working")
        .interval(Duration::from_millis(2))
        .build_with_writer(out.clone());

    spinner.start().unwrap();
    spinner.start().unwrap();
    assert_eq!(spinner.state(), SpinnerState::Running);
    assert!(spinner.is_running());
    sleep(20);
    spinner.stop().unwrap();

    assert_eq!(out.count(HIDE_CURSOR), 1);
    assert_eq!(out.count(SHOW_CURSOR), 1);
    let screen = out.screen();
    assert_eq!(screen.lines(), vec!["✔  Done", ""]);
    assert!(screen.cursor_visible);
}

#[test]
fn test_spinner_cycles_frames() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("working")
        .theme(SpinnerStyle::Line)
        .interval(Duration::from_millis(1))
        .build_with_writer(out.clone());

    spinner.start().unwrap();
    assert!(eventually(|| out.text().contains("\x1b[32m\\\x1b[0m working")));
    spinner.stop().unwrap();

    assert!(out.text().contains("\x1b[32m-\x1b[0m working"));
    assert!(!out.text().contains("working\n"));
}

#[test]
fn test_spinner_silent_after_stop() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("working")
        .interval(Duration::from_millis(1))
        .build_with_writer(out.clone());

    spinner.start().unwrap();
    sleep(10);
    spinner.stop().unwrap();
    let written = out.len();
    sleep(20);

    assert_eq!(out.len(), written);
    assert!(!spinner.is_running());
}

#[test]
fn test_spinner_cannot_restart() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("working").build_with_writer(out.clone());
    spinner.start().unwrap();
    spinner.stop().unwrap();
    spinner.start().unwrap();
    spinner.stop().unwrap();

    assert_eq!(spinner.state(), SpinnerState::Stopped);
    assert_eq!(out.count(HIDE_CURSOR), 1);
    assert_eq!(out.count(SHOW_CURSOR), 1);
}

#[test]
fn test_spinner_callback_after_final_line() {
    let out = Capture::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = out.clone();
    let counter = calls.clone();
    let mut spinner = Spinner::builder("working")
        .on_finish(move || {
            assert!(seen.text().ends_with(SHOW_CURSOR));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build_with_writer(out.clone());

    spinner.start().unwrap();
    spinner.stop().unwrap();
    spinner.stop().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_spinner_guard_stops_on_panic() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("working").build_with_writer(out.clone());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = spinner.scoped().unwrap();
        panic!("work failed");
    }));

    assert!(result.is_err());
    assert_eq!(spinner.state(), SpinnerState::Stopped);
    assert!(!spinner.is_running());
    assert!(out.text().ends_with(SHOW_CURSOR));
}

#[test]
fn test_spinner_run_returns_value() {
    let out = Capture::default();
    let mut spinner = Spinner::builder("adding").build_with_writer(out.clone());
    let sum = spinner.run(|| 2 + 2).unwrap();
    assert_eq!(sum, 4);
    assert_eq!(out.screen().lines(), vec!["✔  Done", ""]);
}

#[test]
fn test_spinner_drop_stops_animation() {
    let out = Capture::default();
    {
        let mut spinner = Spinner::builder("working").build_with_writer(out.clone());
        spinner.start().unwrap();
    }
    assert_eq!(out.count(SHOW_CURSOR), 1);

    let idle = Capture::default();
    drop(Spinner::builder("never started").build_with_writer(idle.clone()));
    assert_eq!(idle.text(), "");
}

#[test]
fn test_progress_quarter_steps() {
    let out = Capture::default();
    let interval = Duration::from_millis(100);
    let bar = ProgressBar::builder(100)
        .style(BarStyle::Classic)
        .interval(interval)
        .start_with_writer(out.clone())
        .unwrap();
    assert!(bar.is_rendering());

    for _ in 0..3 {
        bar.step_by(25);
    }
    let snapshot = bar.snapshot();
    assert_eq!(snapshot.ratio(), 0.75);
    assert_eq!(snapshot.filled(30), 22);
    assert!(!bar.is_done());

    bar.step_by(25);
    assert!(bar.is_done());
    let exited = time_until(interval, || !bar.is_rendering());
    assert!(exited.is_some(), "render thread still alive one interval after completion");

    bar.finish().unwrap();
    let screen = out.screen();
    assert_eq!(screen.lines(), vec!["[==============================] 100.00%", ""]);
    assert!(screen.cursor_visible);
}

#[test]
fn test_progress_zero_total() {
    let out = Capture::default();
    let bar = ProgressBar::builder(0)
        .interval(Duration::from_millis(5))
        .start_with_writer(out.clone())
        .unwrap();
    assert_eq!(bar.total(), 1);
    assert_eq!(bar.snapshot().ratio(), 0.0);

    bar.step();
    assert_eq!(bar.value(), 1);
    assert!(bar.is_done());
    assert_eq!(bar.snapshot().ratio(), 1.0);
    bar.finish().unwrap();
}

#[test]
fn test_progress_step_clamps_at_total() {
    let bar = ProgressBar::builder(10)
        .start_with_writer(Capture::default())
        .unwrap();
    bar.step_by(7);
    bar.step_by(7);
    bar.step_by(u64::MAX);
    assert_eq!(bar.value(), 10);
    bar.finish().unwrap();
}

#[test]
fn test_progress_finish_is_final() {
    let out = Capture::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let bar = ProgressBar::builder(50)
        .show_percent(false)
        .interval(Duration::from_millis(2))
        .on_finish(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .start_with_writer(out.clone())
        .unwrap();

    bar.step_by(10);
    sleep(10);
    bar.finish().unwrap();
    let written = out.len();
    sleep(20);

    assert_eq!(out.len(), written);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(out.count(HIDE_CURSOR), 1);
    assert_eq!(out.count(SHOW_CURSOR), 1);
    assert!(out.text().ends_with(&format!("{RESET}\n{SHOW_CURSOR}")));
    assert_eq!(out.screen().lines()[0], "[==============================]");
}

#[test]
fn test_progress_steps_from_other_thread() {
    let out = Capture::default();
    let bar = ProgressBar::builder(200)
        .interval(Duration::from_millis(1))
        .start_with_writer(out.clone())
        .unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    bar.step();
                }
            });
        }
    });

    assert_eq!(bar.value(), 200);
    assert!(bar.is_done());
    bar.finish().unwrap();
    assert!(out.screen().lines()[0].ends_with("100.00%"));
}

#[test]
fn test_progress_drop_restores_cursor() {
    let out = Capture::default();
    {
        let bar = ProgressBar::builder(3)
            .start_with_writer(out.clone())
            .unwrap();
        bar.step();
    }
    assert_eq!(out.count(SHOW_CURSOR), 1);
    assert!(out.screen().cursor_visible);
}

#[test]
fn test_progress_live_eta() {
    let out = Capture::default();
    let bar = ProgressBar::builder(10)
        .show_eta(true)
        .interval(Duration::from_millis(2))
        .start_with_writer(out.clone())
        .unwrap();
    assert_eq!(bar.snapshot().elapsed(), None);

    bar.step_by(5);
    sleep(40);

    let snapshot = bar.snapshot();
    let elapsed = snapshot.elapsed().unwrap();
    assert!(elapsed >= Duration::from_millis(40));
    // Half done, so the remaining estimate equals the elapsed time.
    assert!(snapshot.eta().unwrap() >= Duration::from_millis(40));
    assert!(eventually(|| out.text().contains(" 50.00% ETA ")));

    bar.finish().unwrap();
    let line = &out.screen().lines()[0];
    assert!(line.ends_with("100.00% ETA    0.0s"), "{line:?}");
}
