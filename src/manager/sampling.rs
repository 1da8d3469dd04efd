//! Color sampling for the picker tool.

use std::time::{Duration, Instant};

use super::ScreenshotManager;
use crate::capture::CaptureError;
use crate::draw::RgbColor;
use crate::geometry::Point;
use crate::input::InputEvent;

/// Minimum-interval throttle with a single trailing slot.
///
/// A skipped position replaces any earlier skipped one and becomes due once
/// the interval has passed, so the newest pointer position is always sampled.
#[derive(Debug, Clone, Copy)]
pub struct SampleThrottle {
    interval: Duration,
    last: Option<Instant>,
    deferred: Option<Point>,
}

impl SampleThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            deferred: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Whether a sample may run at `now`; records it if so.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Remembers `pos` for a trailing sample, superseding any older one.
    pub fn defer(&mut self, pos: Point) {
        self.deferred = Some(pos);
    }

    /// Marks a sample taken at `now` outside the throttle. Clears the
    /// trailing slot since the newer sample supersedes it.
    pub fn record(&mut self, now: Instant) {
        self.last = Some(now);
        self.deferred = None;
    }

    /// When the trailing sample may run, if one is waiting.
    pub fn next_due(&self) -> Option<Instant> {
        self.deferred?;
        Some(self.last.map_or_else(Instant::now, |last| last + self.interval))
    }

    /// Takes the trailing position once the interval has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<Point> {
        let pos = self.deferred?;
        if !self.ready(now) {
            return None;
        }
        self.deferred = None;
        Some(pos)
    }
}

impl ScreenshotManager {
    /// Samples the pixel under the logical canvas position `pos` plus a
    /// preview of its surroundings, and feeds the result to the reducer.
    ///
    /// Continuous samples (`force == false`) are throttled; `Ok(None)` means
    /// the sample was deferred until
    /// [`run_deferred_sample`](Self::run_deferred_sample) picks it up.
    pub async fn sample_color(
        &mut self,
        pos: Point,
        force: bool,
    ) -> Result<Option<RgbColor>, CaptureError> {
        let now = Instant::now();
        if !force && !self.throttle.ready(now) {
            self.throttle.defer(pos);
            return Ok(None);
        }
        self.throttle.record(now);
        self.read_color(pos).await.map(Some)
    }

    /// Samples the newest position the throttle skipped, once its interval
    /// has passed. Hosts call this when [`next_sample_due`](Self::next_sample_due)
    /// elapses; [`run_pending`](Self::run_pending) also calls it when idle.
    pub async fn run_deferred_sample(&mut self) -> Result<Option<RgbColor>, CaptureError> {
        let Some(pos) = self.throttle.take_due(Instant::now()) else {
            return Ok(None);
        };
        if !self.state.color_picker.is_active {
            return Ok(None);
        }
        log::trace!("trailing color sample at ({}, {})", pos.x, pos.y);
        self.read_color(pos).await.map(Some)
    }

    /// When a skipped sample becomes due, if one is waiting.
    pub fn next_sample_due(&self) -> Option<Instant> {
        self.throttle.next_due()
    }

    async fn read_color(&mut self, pos: Point) -> Result<RgbColor, CaptureError> {
        let scale = self.host.scale;
        let x = ((self.host.x + pos.x) * scale).round() as i32;
        let y = ((self.host.y + pos.y) * scale).round() as i32;

        let color = self
            .deps
            .screen
            .pixel_color(x, y)
            .await
            .inspect_err(|e| log::error!("get_pixel_color failed at ({x}, {y}): {e}"))?;

        let size = self.config.color_picker.preview_size.max(1);
        let half = (size / 2) as i32;
        let preview = match self
            .deps
            .screen
            .screen_preview(x - half, y - half, size, size)
            .await
        {
            Ok(png) => Some(png),
            Err(e) => {
                log::debug!("get_screen_preview failed: {e}");
                None
            }
        };

        self.state.apply(&InputEvent::ColorSampled {
            pos,
            color,
            preview,
        });
        Ok(color)
    }

    /// Copies the color under the pointer in the picker's display format.
    /// Samples first unless the last sample was taken at the pointer.
    pub async fn copy_color(&mut self) -> Result<String, CaptureError> {
        if !self.state.color_picker.is_current() {
            let pos = self.state.color_picker.mouse_position;
            self.sample_color(pos, true).await?;
        }
        let text = self
            .state
            .color_picker
            .formatted()
            .ok_or_else(|| CaptureError::InvalidResponse("no color sampled".into()))?;
        self.deps
            .clipboard
            .copy_text(&text)
            .inspect_err(|e| log::error!("copy_to_clipboard failed for color {text}: {e}"))?;
        log::info!("copied color {text}");
        self.state.apply(&InputEvent::ColorCopied);
        Ok(text)
    }
}
