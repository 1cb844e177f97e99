//! Playback cursor: a Stopped/Playing state machine that keeps a displayed
//! pitch value synchronized to audio time.
//!
//! The cursor is parameterized by an injectable [`Clock`] so end-of-stream
//! and scrubbing behavior can be tested deterministically without real
//! timers. Audible rendering sits behind the [`RenderSink`] seam; the
//! cursor guarantees at most one active render at any time. A repeating
//! tick can be driven manually (call [`PlaybackCursor::tick`] from a
//! rendering loop) or by [`spawn_ticker`], a cancellable periodic task.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::contour::{FrameMeasurement, PitchContour};

/// Monotonic time source for the cursor.
pub trait Clock: Send {
    /// Seconds elapsed since an arbitrary fixed origin.
    fn now_secs(&self) -> f64;
}

/// Wall-clock [`Clock`] anchored at construction.
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// The seam to the audible renderer.
///
/// `start` begins rendering from an offset in seconds; `stop` releases the
/// live render. Implementations must tolerate `stop` without a prior
/// `start`.
pub trait RenderSink: Send {
    fn start(&mut self, from_secs: f64) -> anyhow::Result<()>;
    fn stop(&mut self);
}

/// Cursor state. There is no separate paused state: pausing stops the
/// render and retains the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Synchronizes a virtual playback clock to a loaded buffer.
pub struct PlaybackCursor<C: Clock> {
    clock: C,
    sink: Option<Box<dyn RenderSink>>,
    duration_secs: f64,
    state: PlaybackState,
    /// `clock_now - from_time` at the moment playback started.
    anchor_secs: f64,
    current_time_secs: f64,
    /// Incrementally advancing index into the contour; avoids a linear
    /// scan on every tick.
    frame_cursor: usize,
}

impl<C: Clock> PlaybackCursor<C> {
    /// Creates a cursor with no source loaded. `play` is a no-op until
    /// [`load`](Self::load) is called.
    pub fn new(clock: C, sink: Option<Box<dyn RenderSink>>) -> Self {
        Self {
            clock,
            sink,
            duration_secs: 0.0,
            state: PlaybackState::Stopped,
            anchor_secs: 0.0,
            current_time_secs: 0.0,
            frame_cursor: 0,
        }
    }

    /// Loads a source of the given duration, resetting the cursor to
    /// `{0, Stopped}`.
    pub fn load(&mut self, duration_secs: f64) {
        self.stop_sink();
        self.duration_secs = duration_secs.max(0.0);
        self.state = PlaybackState::Stopped;
        self.current_time_secs = 0.0;
        self.frame_cursor = 0;
    }

    /// Starts playback from `from_secs`, or from the retained current time
    /// when `None`. Idempotent: a no-op when already playing or when no
    /// source is loaded.
    pub fn play(&mut self, from_secs: Option<f64>) -> anyhow::Result<()> {
        if self.state == PlaybackState::Playing || self.duration_secs <= 0.0 {
            return Ok(());
        }
        let from = from_secs
            .unwrap_or(self.current_time_secs)
            .clamp(0.0, self.duration_secs);
        if let Some(sink) = self.sink.as_mut() {
            sink.start(from)?;
        }
        self.anchor_secs = self.clock.now_secs() - from;
        self.current_time_secs = from;
        self.frame_cursor = 0;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Advances the virtual clock. Publishes the elapsed time while the
    /// source still has material; at end of stream the render is released
    /// and the cursor resets to `{0, Stopped}`.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let elapsed = self.clock.now_secs() - self.anchor_secs;
        if elapsed >= self.duration_secs {
            self.stop_sink();
            self.state = PlaybackState::Stopped;
            self.current_time_secs = 0.0;
            self.frame_cursor = 0;
        } else {
            self.current_time_secs = elapsed;
        }
    }

    /// Stops rendering and retains the current time. Idempotent when
    /// already stopped.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        let elapsed = (self.clock.now_secs() - self.anchor_secs).clamp(0.0, self.duration_secs);
        self.current_time_secs = elapsed;
        self.stop_sink();
        self.state = PlaybackState::Stopped;
    }

    /// Moves the cursor to `secs`, clamped to the loaded duration. Always
    /// legal; when playing, the live render is stopped before re-entering
    /// playback at the new position.
    pub fn seek(&mut self, secs: f64) -> anyhow::Result<()> {
        let target = secs.clamp(0.0, self.duration_secs);
        self.frame_cursor = 0;
        if self.state == PlaybackState::Playing {
            self.stop_sink();
            if let Some(sink) = self.sink.as_mut() {
                sink.start(target)?;
            }
            self.anchor_secs = self.clock.now_secs() - target;
        }
        self.current_time_secs = target;
        Ok(())
    }

    /// Current position of the virtual clock, in `[0, duration]`.
    pub fn current_time_secs(&self) -> f64 {
        self.current_time_secs
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The contour measurement at the current position.
    ///
    /// The internal index only moves forward between calls, so per-tick
    /// cost is independent of contour length; seeking resets it.
    pub fn current_measurement<'a>(
        &mut self,
        contour: &'a PitchContour,
    ) -> Option<&'a FrameMeasurement> {
        let t = self.current_time_secs as f32;
        let ms = &contour.measurements;
        while self.frame_cursor + 1 < ms.len() && ms[self.frame_cursor + 1].timestamp_secs <= t {
            self.frame_cursor += 1;
        }
        ms.get(self.frame_cursor)
    }

    fn stop_sink(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
    }
}

/// Handle to a running ticker task. Cancelling (or dropping) the handle
/// stops the task; leaking it would leave a tick running against a paused
/// cursor and drift the displayed clock.
pub struct TickerHandle {
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stops the ticker and waits for the task to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns a repeating, cancellable tick driving `cursor` every `period`.
///
/// The single ticker thread plus the cursor mutex guarantee two ticks are
/// never concurrently active.
pub fn spawn_ticker<C: Clock + 'static>(
    cursor: Arc<Mutex<PlaybackCursor<C>>>,
    period: Duration,
) -> TickerHandle {
    let (stop_tx, stop_rx) = bounded::<()>(1);
    let ticker = tick(period);

    let join = std::thread::spawn(move || {
        loop {
            select! {
                recv(ticker) -> _ => {
                    if let Ok(mut cursor) = cursor.lock() {
                        cursor.tick();
                    }
                }
                recv(stop_rx) -> _ => break,
            }
        }
    });

    TickerHandle {
        stop_tx,
        join: Some(join),
    }
}
