//! Initial framing of a freshly shown diagram.
//!
//! Once positions are resolved the controller waits a short delay, then fits
//! the view to all nodes exactly once. Later resolutions of the same view do
//! not re-frame it. Times are host clock readings, see [`crate::canvas`].

use std::time::Duration;

use log::debug;

use crate::canvas::{Canvas, FitViewOptions};

pub const DEFAULT_FIT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingState {
    Idle,
    Scheduled { due: Duration },
    Framed,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: FramingState,
    delay: Duration,
    fit: Option<FitViewOptions>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(DEFAULT_FIT_DELAY)
    }
}

impl ViewportController {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: FramingState::Idle,
            delay,
            fit: None,
        }
    }

    /// Overrides the canvas' own fit options.
    pub fn with_fit_options(mut self, fit: FitViewOptions) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn state(&self) -> FramingState {
        self.state
    }

    /// Positions became available. Only the first call schedules a fit.
    pub fn notify_resolved(&mut self, now: Duration) {
        if self.state == FramingState::Idle {
            self.state = FramingState::Scheduled {
                due: now + self.delay,
            };
        }
    }

    /// Applies the scheduled fit once its delay has elapsed. Returns `true`
    /// when the viewport was changed by this call.
    pub fn poll(&mut self, now: Duration, canvas: &mut Canvas) -> bool {
        let FramingState::Scheduled { due } = self.state else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut handle = canvas.viewport_handle();
        let fit = self.fit.unwrap_or_else(|| handle.default_fit_options());
        let fitted = handle.fit_view(fit);
        self.state = FramingState::Framed;
        debug!(layout = canvas.layout_name.as_str(); "Initial framing applied: {fitted}");
        fitted
    }

    /// Schedules and immediately applies the fit, for headless rendering.
    pub fn frame_now(&mut self, now: Duration, canvas: &mut Canvas) -> bool {
        self.notify_resolved(now);
        if let FramingState::Scheduled { .. } = self.state {
            self.state = FramingState::Scheduled { due: now };
        }
        self.poll(now, canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Viewport;
    use crate::diagrams;
    use crate::layout::RankedEngine;
    use crate::resolve::PositionResolver;
    use crate::saved_layout::NoSource;

    fn canvas() -> Canvas {
        let diagram = diagrams::find("message-flow").expect("diagram");
        let resolved = PositionResolver::new(&NoSource, &RankedEngine).resolve(diagram);
        Canvas::new(resolved, diagram.canvas)
    }

    #[test]
    fn fits_after_the_delay() {
        let mut canvas = canvas();
        let mut controller = ViewportController::default();
        let start = Duration::from_secs(3);
        assert!(!controller.poll(start, &mut canvas));
        controller.notify_resolved(start);
        assert!(!controller.poll(start + Duration::from_millis(50), &mut canvas));
        assert_eq!(canvas.viewport(), Viewport::default());
        assert!(controller.poll(start + Duration::from_millis(100), &mut canvas));
        assert_eq!(controller.state(), FramingState::Framed);
        assert_ne!(canvas.viewport(), Viewport::default());
    }

    #[test]
    fn frames_only_once() {
        let mut canvas = canvas();
        let mut controller = ViewportController::default();
        let start = Duration::from_secs(3);
        controller.notify_resolved(start);
        assert!(controller.poll(start + DEFAULT_FIT_DELAY, &mut canvas));

        canvas.pan_by(40.0, 40.0);
        let panned = canvas.viewport();
        controller.notify_resolved(start + Duration::from_secs(1));
        assert!(!controller.poll(start + Duration::from_secs(2), &mut canvas));
        assert_eq!(canvas.viewport(), panned);
    }

    #[test]
    fn custom_fit_options_bound_zoom() {
        let mut canvas = canvas();
        let mut controller = ViewportController::new(Duration::ZERO).with_fit_options(FitViewOptions {
            padding: 0.08,
            min_zoom: 0.5,
            max_zoom: 0.5,
        });
        assert!(controller.frame_now(Duration::ZERO, &mut canvas));
        assert_eq!(canvas.viewport().zoom, 0.5);
    }
}
