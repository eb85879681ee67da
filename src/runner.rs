use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::ansi::{CARRIAGE, CLEAR_LINE, HIDE_CURSOR, RESET};
use crate::log;

/// Smallest repaint interval; anything shorter is rounded up.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// The content of the animated line.
///
/// [`RenderLoop`] clears the line and returns the cursor to column 0 before
/// every call to [`Frame::render`], so implementations only write the line
/// body. They must never write a newline.
///
/// ```rust,ignore
/// struct Counter(u64);
///
/// impl Frame for Counter {
///     fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
///         self.0 += 1;
///         write!(out, "tick {}", self.0)
///     }
/// }
/// ```
pub trait Frame: Send + 'static {
    /// Writes the current line body. Called once per tick and once more after
    /// the loop has been told to stop.
    fn render(&mut self, out: &mut dyn Write) -> io::Result<()>;

    /// Returns `true` once the frame has nothing left to animate. The loop
    /// then performs its final render and exits without waiting for `stop`.
    fn is_done(&self) -> bool {
        false
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Repaints one terminal line on a background thread until stopped.
///
/// The writer is shared with the owner, which may write its own output once
/// [`RenderLoop::stop`] has returned.
///
/// ```rust,ignore
/// let mut render = RenderLoop::new(std::io::stdout(), Duration::from_millis(80));
/// render.start(Counter(0))?;
/// do_work();
/// render.stop()?;
/// ```
pub struct RenderLoop<W: Write + Send + 'static> {
    writer: Arc<Mutex<W>>,
    interval: Duration,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<io::Result<()>>>,
}

impl<W: Write + Send + 'static> RenderLoop<W> {
    pub fn new(writer: W, interval: Duration) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            interval: interval.max(MIN_INTERVAL),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` while the render thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Hides the cursor and spawns the render thread for `frame`.
    ///
    /// Does nothing if a render thread is already running. A previous thread
    /// that exited on its own is joined first and its error, if any, is
    /// returned instead of starting.
    pub fn start<F: Frame>(&mut self, frame: F) -> io::Result<()> {
        if self.is_running() {
            log::debug!("render loop already running");
            return Ok(());
        }
        self.stop()?;
        self.stop.store(false, Ordering::Release);

        {
            let mut out = lock(&self.writer);
            out.write_all(HIDE_CURSOR.as_bytes())?;
            out.flush()?;
        }

        let writer = Arc::clone(&self.writer);
        let stop = Arc::clone(&self.stop);
        let interval = self.interval;
        let handle = thread::Builder::new()
            .name("termspin-render".into())
            .spawn(move || run(frame, &writer, &stop, interval))?;
        self.handle = Some(handle);

        log::debug!(interval = ?self.interval, "render thread started");
        Ok(())
    }

    /// Wakes the render thread so it re-checks [`Frame::is_done`] now rather
    /// than after the current interval.
    pub fn wake(&self) {
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
    }

    /// Signals the render thread to stop and blocks until it has exited.
    ///
    /// Once this returns, the final frame has been written and nothing else
    /// will be painted. Returns the first write error the thread hit.
    pub fn stop(&mut self) -> io::Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        let result = handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("render thread panicked")));
        log::debug!(ok = result.is_ok(), "render thread joined");
        result
    }

    /// Exclusive access to the shared writer.
    pub(crate) fn writer(&self) -> MutexGuard<'_, W> {
        lock(&self.writer)
    }
}

impl<W: Write + Send + 'static> Drop for RenderLoop<W> {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            log::warning!(%error, "render loop stopped with an error");
        }
    }
}

fn run<F: Frame, W: Write>(
    mut frame: F, writer: &Mutex<W>, stop: &AtomicBool, interval: Duration,
) -> io::Result<()> {
    while !stop.load(Ordering::Acquire) && !frame.is_done() {
        paint(&mut frame, writer)?;
        thread::park_timeout(interval);
    }

    // One last frame so the final state is always visible.
    paint(&mut frame, writer)?;
    let mut out = lock(writer);
    out.write_all(RESET.as_bytes())?;
    out.flush()
}

fn paint<F: Frame, W: Write>(frame: &mut F, writer: &Mutex<W>) -> io::Result<()> {
    let mut out = lock(writer);
    out.write_all(CARRIAGE.as_bytes())?;
    out.write_all(CLEAR_LINE.as_bytes())?;
    frame.render(&mut *out)?;
    out.flush()?;
    log::trace!("repaint");
    Ok(())
}
