//! Screenshot manager: the orchestrator around the interaction reducer.
//!
//! The manager owns the [`InteractionState`], an input event queue, the
//! render pools and the external services. Hosts push [`InputEvent`]s,
//! call [`ScreenshotManager::process_events`] once per frame, render, and
//! then await [`ScreenshotManager::run_pending`] to execute whatever I/O the
//! reducer asked for.

mod finalize;
mod sampling;

use std::collections::VecDeque;

pub use finalize::{capture_geometry, composite_scale};
pub use sampling::SampleThrottle;

use crate::capture::{CaptureDependencies, CaptureError, FinalizeResult, HostWindowInfo};
use crate::config::Config;
use crate::draw::RgbColor;
use crate::geometry::{Point, Rect};
use crate::input::{InputEvent, InteractionState, PendingAction, reduce, snap};
use crate::pool::RenderPools;
use crate::render::{self, OverlayStyle};

/// What [`ScreenshotManager::run_pending`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Finalized(FinalizeResult),
    /// The formatted color that reached the clipboard
    ColorCopied(String),
    Sampled(RgbColor),
    /// A continuous sample was deferred by the throttle
    Throttled,
    /// Selection in logical screen coordinates, for the translation pipeline
    TranslateRequested(Rect),
    Exit,
}

pub struct ScreenshotManager {
    state: InteractionState,
    events: VecDeque<InputEvent>,
    deps: CaptureDependencies,
    pools: RenderPools,
    style: OverlayStyle,
    config: Config,
    host: HostWindowInfo,
    throttle: SampleThrottle,
}

impl ScreenshotManager {
    pub fn new(config: Config, deps: CaptureDependencies) -> Self {
        Self {
            state: InteractionState::new(&config),
            events: VecDeque::new(),
            pools: RenderPools::new(&config.pools),
            style: OverlayStyle::from_config(&config),
            throttle: SampleThrottle::from_millis(config.color_picker.sample_interval_ms),
            host: HostWindowInfo::default(),
            deps,
            config,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> HostWindowInfo {
        self.host
    }

    pub fn pools(&self) -> &RenderPools {
        &self.pools
    }

    /// Queues an event for the next [`process_events`](Self::process_events).
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Feeds every queued event through the reducer. Returns how many were
    /// processed.
    pub fn process_events(&mut self) -> usize {
        let count = self.events.len();
        if count == 0 {
            return 0;
        }
        let state = std::mem::replace(&mut self.state, InteractionState::new(&self.config));
        self.state = self.events.drain(..).fold(state, |state, event| reduce(state, &event));
        log::trace!("processed {count} input event(s)");
        count
    }

    /// Sets the capture region directly, bypassing pointer input.
    pub fn set_selection(&mut self, rect: Rect) {
        self.state.selection = Some(rect.normalized());
        self.state.needs_redraw = true;
    }

    pub fn load_annotations(&mut self, annotations: Vec<crate::annotation::Annotation>) {
        self.state.load_annotations(annotations);
    }

    /// Renders the current state onto `ctx`. Clears the redraw flag.
    pub fn render(
        &mut self,
        ctx: &cairo::Context,
        background: Option<&cairo::ImageSurface>,
        width: f64,
        height: f64,
    ) {
        render::render_frame(
            ctx,
            &self.state,
            background,
            width,
            height,
            self.host.scale,
            &self.style,
            &self.pools,
        );
        self.state.needs_redraw = false;
    }

    /// Queries the surface origin and scale. Failures keep the previous value.
    pub async fn refresh_host_info(&mut self) -> HostWindowInfo {
        match self.deps.screen.window_info().await {
            Ok(info) if info.scale.is_finite() && info.scale > 0.0 => {
                log::debug!(
                    "host surface at ({}, {}) scale {}",
                    info.x,
                    info.y,
                    info.scale
                );
                self.host = info;
            }
            Ok(info) => log::warn!("ignoring host info with invalid scale {}", info.scale),
            Err(e) => log::warn!("window_info failed: {e}; keeping {:?}", self.host),
        }
        self.host
    }

    /// Takes a fresh window snapshot for snapping and queues it. On failure
    /// the previous snapshot stays in use.
    pub async fn refresh_windows(&mut self) -> Result<usize, CaptureError> {
        let windows = self.deps.screen.all_windows().await.inspect_err(|e| {
            log::warn!(
                "all_windows failed: {e}; keeping {} stale window(s)",
                self.state.windows.len()
            )
        })?;
        let origin = Point::new(self.host.x, self.host.y);
        let candidates: Vec<_> = snap::filter_windows(windows, &self.config.selection)
            .into_iter()
            .map(|w| w.relative_to(origin))
            .collect();
        let count = candidates.len();
        log::debug!("{count} snap candidate(s)");
        self.push_event(InputEvent::WindowsUpdated(candidates));
        Ok(count)
    }

    /// Executes the reducer's pending action, if any. With nothing pending,
    /// runs a trailing color sample that has become due.
    ///
    /// Errors are logged and returned. The session stays interactive so the
    /// user can retry.
    pub async fn run_pending(&mut self) -> Result<Option<ActionOutcome>, CaptureError> {
        let Some(action) = self.state.take_pending_action() else {
            return Ok(self.run_deferred_sample().await?.map(ActionOutcome::Sampled));
        };
        let outcome = match action {
            PendingAction::Finalize(target) => ActionOutcome::Finalized(self.finalize(target).await?),
            PendingAction::CopyColor => ActionOutcome::ColorCopied(self.copy_color().await?),
            PendingAction::SampleColor(pos) => match self.sample_color(pos, false).await? {
                Some(color) => ActionOutcome::Sampled(color),
                None => ActionOutcome::Throttled,
            },
            PendingAction::Translate => {
                let selection = self
                    .state
                    .selection_rect()
                    .ok_or_else(|| CaptureError::Cancelled("no selection to translate".into()))?;
                ActionOutcome::TranslateRequested(selection.translate(self.host.x, self.host.y))
            }
            PendingAction::Exit => ActionOutcome::Exit,
        };
        Ok(Some(outcome))
    }
}
