use std::io::{self, Stdout, Write};
use std::time::Duration;

use crate::ansi::{CARRIAGE, CLEAR_LINE, Color, Painted, SHOW_CURSOR};
use crate::log;
use crate::runner::{Frame, RenderLoop};
use crate::theme::AnimationTheme;

pub(crate) type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Appearance and timing of a [`Spinner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinnerOptions {
    pub theme: AnimationTheme,
    pub color: Color,
    /// Delay between two frames.
    pub interval: Duration,
    /// Symbol printed in place of the animation once stopped.
    pub final_symbol: String,
    pub final_text: String,
}

impl Default for SpinnerOptions {
    fn default() -> Self {
        Self {
            theme: AnimationTheme::default(),
            color: Color::Green,
            interval: Duration::from_millis(100),
            final_symbol: "✔".to_string(),
            final_text: " Done".to_string(),
        }
    }
}

/// Lifecycle of a [`Spinner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerState {
    Idle,
    Running,
    /// Terminal: a stopped spinner cannot be restarted.
    Stopped,
}

/// Builds a [`Spinner`].
///
/// ```rust,ignore
/// let mut spinner = Spinner::builder("fetching index")
///     .theme(SpinnerStyle::Arrow)
///     .color(Color::Cyan)
///     .final_text(" fetched")
///     .build();
/// ```
pub struct SpinnerBuilder {
    text: String,
    options: SpinnerOptions,
    callback: Option<Callback>,
}

impl SpinnerBuilder {
    pub fn theme(mut self, theme: impl Into<AnimationTheme>) -> Self {
        self.options.theme = theme.into();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.options.color = color;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    pub fn final_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.options.final_symbol = symbol.into();
        self
    }

    pub fn final_text(mut self, text: impl Into<String>) -> Self {
        self.options.final_text = text.into();
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: SpinnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs `f` on the stopping thread right after the final line is written.
    pub fn on_finish(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.callback = Some(Box::new(f));
        self
    }

    /// Builds a spinner drawing to stdout.
    pub fn build(self) -> Spinner<Stdout> {
        self.build_with_writer(io::stdout())
    }

    pub fn build_with_writer<W: Write + Send + 'static>(self, writer: W) -> Spinner<W> {
        Spinner {
            render: RenderLoop::new(writer, self.options.interval),
            text: self.text,
            options: self.options,
            callback: self.callback,
            state: SpinnerState::Idle,
        }
    }
}

/// An indeterminate spinner animated on a background thread.
///
/// ```rust,ignore
/// let mut spinner = Spinner::new("resolving dependencies");
/// spinner.run(|| resolve())?;
/// // => ✔  Done
/// ```
pub struct Spinner<W: Write + Send + 'static = Stdout> {
    text: String,
    options: SpinnerOptions,
    callback: Option<Callback>,
    state: SpinnerState,
    render: RenderLoop<W>,
}

impl Spinner<Stdout> {
    /// A spinner with default options drawing to stdout.
    pub fn new(text: impl Into<String>) -> Self {
        Self::builder(text).build()
    }

    pub fn builder(text: impl Into<String>) -> SpinnerBuilder {
        SpinnerBuilder {
            text: text.into(),
            options: SpinnerOptions::default(),
            callback: None,
        }
    }
}

impl<W: Write + Send + 'static> Spinner<W> {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &SpinnerOptions {
        &self.options
    }

    pub fn state(&self) -> SpinnerState {
        self.state
    }

    /// Returns `true` while the animation thread is alive.
    pub fn is_running(&self) -> bool {
        self.render.is_running()
    }

    /// Hides the cursor and starts animating.
    ///
    /// Calling this on a running or stopped spinner does nothing.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn start(&mut self) -> io::Result<()> {
        match self.state {
            SpinnerState::Idle => {
                self.render.start(SpinnerFrame {
                    text: self.text.clone(),
                    theme: self.options.theme,
                    color: self.options.color,
                    index: 0,
                })?;
                self.state = SpinnerState::Running;
                Ok(())
            }
            state => {
                log::debug!(?state, "spinner start ignored");
                Ok(())
            }
        }
    }

    /// Stops the animation, replaces it with the final symbol and text,
    /// shows the cursor and runs the completion callback.
    ///
    /// Blocks until the animation thread has exited. Stopping a spinner that
    /// was never started still prints the final line; stopping it twice
    /// does nothing the second time.
    pub fn stop(&mut self) -> io::Result<()> {
        if self.state == SpinnerState::Stopped {
            return Ok(());
        }
        self.state = SpinnerState::Stopped;

        let joined = self.render.stop();
        let written = self.write_final_line();
        if let Some(callback) = self.callback.take() {
            callback();
        }
        joined.and(written)
    }

    /// Starts the spinner and returns a guard that stops it when dropped,
    /// including while unwinding.
    pub fn scoped(&mut self) -> io::Result<SpinnerGuard<'_, W>> {
        self.start()?;
        Ok(SpinnerGuard { spinner: self })
    }

    /// Animates while `f` runs.
    pub fn run<T>(&mut self, f: impl FnOnce() -> T) -> io::Result<T> {
        let guard = self.scoped()?;
        let value = f();
        guard.finish()?;
        Ok(value)
    }

    fn write_final_line(&self) -> io::Result<()> {
        let mut out = self.render.writer();
        write!(
            out,
            "{CLEAR_LINE}{CARRIAGE}{} {}\n{SHOW_CURSOR}",
            Painted(self.options.color, &self.options.final_symbol),
            self.options.final_text,
        )?;
        out.flush()
    }
}

impl<W: Write + Send + 'static> Drop for Spinner<W> {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn drop(&mut self) {
        if self.state == SpinnerState::Running
            && let Err(error) = self.stop()
        {
            log::warning!(%error, "spinner stopped with an error");
        }
    }
}

/// Keeps a [`Spinner`] running for as long as it is alive.
///
/// Returned by [`Spinner::scoped`].
pub struct SpinnerGuard<'a, W: Write + Send + 'static> {
    spinner: &'a mut Spinner<W>,
}

impl<W: Write + Send + 'static> SpinnerGuard<'_, W> {
    /// Stops the spinner now, returning any write error.
    pub fn finish(self) -> io::Result<()> {
        self.spinner.stop()
    }
}

impl<W: Write + Send + 'static> Drop for SpinnerGuard<'_, W> {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn drop(&mut self) {
        if let Err(error) = self.spinner.stop() {
            log::warning!(%error, "spinner stopped with an error");
        }
    }
}

struct SpinnerFrame {
    text: String,
    theme: AnimationTheme,
    color: Color,
    index: usize,
}

impl Frame for SpinnerFrame {
    fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let frame = self.theme.frame(self.index);
        self.index = self.index.wrapping_add(1);
        write!(out, "{} {}", Painted(self.color, frame), self.text)
    }
}
