use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::ansi::{Painted, SHOW_CURSOR};
use crate::log;
use crate::runner::{Frame, RenderLoop, lock};
use crate::spinner::Callback;
use crate::theme::BarTheme;

/// Appearance and timing of a [`ProgressBar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressOptions {
    pub theme: BarTheme,
    /// Append the completion percentage, e.g. ` 42.00%`.
    pub show_percent: bool,
    /// Append the estimated time remaining, e.g. ` ETA    3.2s`.
    pub show_eta: bool,
    pub interval: Duration,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            theme: BarTheme::default(),
            show_percent: true,
            show_eta: false,
            interval: Duration::from_millis(100),
        }
    }
}

/// A consistent reading of a bar's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    value: u64,
    total: u64,
    elapsed: Option<Duration>,
}

impl ProgressSnapshot {
    /// `total` is clamped to at least 1 and `value` to at most `total`.
    pub fn new(value: u64, total: u64, elapsed: Option<Duration>) -> Self {
        let total = total.max(1);
        Self {
            value: value.min(total),
            total,
            elapsed,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Time since the first step, if there was one.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn ratio(&self) -> f64 {
        self.value as f64 / self.total as f64
    }

    /// Number of filled cells in a bar `width` cells wide.
    pub fn filled(&self, width: usize) -> usize {
        (u128::from(self.value) * width as u128 / u128::from(self.total)) as usize
    }

    /// Estimated time remaining, extrapolated from the elapsed time.
    ///
    /// `None` until at least one unit of work is done.
    pub fn eta(&self) -> Option<Duration> {
        if self.value == 0 {
            return None;
        }
        let elapsed = self.elapsed?;
        let factor = self.total as f64 / self.value as f64 - 1.0;
        Duration::try_from_secs_f64(elapsed.as_secs_f64() * factor).ok()
    }

    pub fn is_complete(&self) -> bool {
        self.value >= self.total
    }
}

/// The rendered body of a progress line.
///
/// ```text
/// [======================--------]  75.00% ETA    1.3s
/// ```
pub(crate) struct BarLine<'a> {
    pub theme: &'a BarTheme,
    pub snapshot: ProgressSnapshot,
    pub show_percent: bool,
    pub show_eta: bool,
}

impl std::fmt::Display for BarLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let theme = self.theme;
        let filled = self.snapshot.filled(theme.width).min(theme.width);
        let empty = theme.width - filled;
        write!(f, "{}", Painted(theme.color, Cells { theme, filled, empty }))?;

        if self.show_percent {
            write!(f, " {:6.2}%", self.snapshot.ratio() * 100.0)?;
        }
        if self.show_eta
            && let Some(eta) = self.snapshot.eta()
        {
            write!(f, " ETA {:6.1}s", eta.as_secs_f64())?;
        }
        Ok(())
    }
}

struct Cells<'a> {
    theme: &'a BarTheme,
    filled: usize,
    empty: usize,
}

impl std::fmt::Display for Cells<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.theme.left)?;
        for _ in 0..self.filled {
            f.write_str(self.theme.fill)?;
        }
        for _ in 0..self.empty {
            f.write_str(self.theme.empty)?;
        }
        f.write_str(self.theme.right)
    }
}

#[derive(Debug)]
struct ProgressState {
    total: u64,
    value: u64,
    started: Option<Instant>,
    done: bool,
}

impl ProgressState {
    fn new(total: u64) -> Self {
        Self {
            total,
            value: 0,
            started: None,
            done: false,
        }
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.value, self.total, self.started.map(|at| at.elapsed()))
    }
}

struct ProgressFrame {
    state: Arc<Mutex<ProgressState>>,
    options: ProgressOptions,
}

impl Frame for ProgressFrame {
    fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let snapshot = lock(&self.state).snapshot();
        write!(
            out,
            "{}",
            BarLine {
                theme: &self.options.theme,
                snapshot,
                show_percent: self.options.show_percent,
                show_eta: self.options.show_eta,
            }
        )
    }

    fn is_done(&self) -> bool {
        lock(&self.state).done
    }
}

/// Builds and starts a [`ProgressBar`].
///
/// ```rust,ignore
/// let bar = ProgressBar::builder(files.len() as u64)
///     .style(BarStyle::Striped)
///     .show_eta(true)
///     .start()?;
/// ```
pub struct ProgressBuilder {
    total: u64,
    options: ProgressOptions,
    callback: Option<Callback>,
}

impl ProgressBuilder {
    pub fn style(mut self, style: impl Into<BarTheme>) -> Self {
        self.options.theme = style.into();
        self
    }

    pub fn show_percent(mut self, yes: bool) -> Self {
        self.options.show_percent = yes;
        self
    }

    pub fn show_eta(mut self, yes: bool) -> Self {
        self.options.show_eta = yes;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: ProgressOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs `f` at the end of [`ProgressBar::finish`].
    pub fn on_finish(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.callback = Some(Box::new(f));
        self
    }

    /// Starts rendering to stdout.
    pub fn start(self) -> io::Result<ProgressBar<Stdout>> {
        self.start_with_writer(io::stdout())
    }

    pub fn start_with_writer<W: Write + Send + 'static>(
        self, writer: W,
    ) -> io::Result<ProgressBar<W>> {
        if self.total == 0 {
            log::debug!("progress total of 0 clamped to 1");
        }
        let state = Arc::new(Mutex::new(ProgressState::new(self.total.max(1))));

        let mut render = RenderLoop::new(writer, self.options.interval);
        render.start(ProgressFrame {
            state: Arc::clone(&state),
            options: self.options,
        })?;

        Ok(ProgressBar {
            state,
            render,
            callback: Mutex::new(self.callback),
            finished: false,
        })
    }
}

/// A determinate progress bar repainted on a background thread.
///
/// Rendering starts as soon as the bar is built. Call [`ProgressBar::step`]
/// from the working thread and [`ProgressBar::finish`] once at the end.
///
/// ```rust,ignore
/// let bar = ProgressBar::new(100)?;
/// for chunk in chunks {
///     upload(chunk);
///     bar.step();
/// }
/// bar.finish()?;
/// // => [==============================] 100.00%
/// ```
pub struct ProgressBar<W: Write + Send + 'static = Stdout> {
    state: Arc<Mutex<ProgressState>>,
    render: RenderLoop<W>,
    callback: Mutex<Option<Callback>>,
    finished: bool,
}

impl ProgressBar<Stdout> {
    /// Starts a bar with default options on stdout. A `total` of 0 is
    /// treated as 1.
    pub fn new(total: u64) -> io::Result<Self> {
        Self::builder(total).start()
    }

    pub fn builder(total: u64) -> ProgressBuilder {
        ProgressBuilder {
            total,
            options: ProgressOptions::default(),
            callback: None,
        }
    }
}

impl<W: Write + Send + 'static> ProgressBar<W> {
    /// Advances the bar by one.
    pub fn step(&self) {
        self.step_by(1);
    }

    /// Advances the bar by `n`, stopping at the total.
    ///
    /// The first step starts the ETA clock. Reaching the total lets the
    /// render thread draw its last frame and exit.
    pub fn step_by(&self, n: u64) {
        let completed = {
            let mut state = lock(&self.state);
            if state.started.is_none() {
                state.started = Some(Instant::now());
            }
            state.value = state.value.saturating_add(n).min(state.total);
            let completed = !state.done && state.value >= state.total;
            state.done |= completed;
            completed
        };
        if completed {
            log::debug!("progress complete");
            self.render.wake();
        }
    }

    pub fn value(&self) -> u64 {
        lock(&self.state).value
    }

    pub fn total(&self) -> u64 {
        lock(&self.state).total
    }

    pub fn is_done(&self) -> bool {
        lock(&self.state).done
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.state).snapshot()
    }

    /// Returns `true` while the render thread is alive.
    pub fn is_rendering(&self) -> bool {
        self.render.is_running()
    }

    /// Fills the bar, waits for the final frame, ends the line, shows the
    /// cursor and runs the completion callback.
    pub fn finish(mut self) -> io::Result<()> {
        {
            let mut state = lock(&self.state);
            state.value = state.total;
            state.done = true;
        }
        let result = self.close();
        if let Some(callback) = lock(&self.callback).take() {
            callback();
        }
        result
    }

    fn close(&mut self) -> io::Result<()> {
        self.finished = true;
        let joined = self.render.stop();
        let written = {
            let mut out = self.render.writer();
            write!(out, "\n{SHOW_CURSOR}").and_then(|()| out.flush())
        };
        joined.and(written)
    }
}

impl<W: Write + Send + 'static> Drop for ProgressBar<W> {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn drop(&mut self) {
        if !self.finished
            && let Err(error) = self.close()
        {
            log::warning!(%error, "progress bar dropped with an error");
        }
    }
}
