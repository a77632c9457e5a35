//! Tab shell: tracks the active diagram and installs resolved views.
//!
//! Resolution may finish out of order when the user switches tabs quickly.
//! Every activation gets a generation number and only the latest one may
//! install its view.

use std::time::Duration;

use log::{debug, info};

use crate::canvas::Canvas;
use crate::diagrams::{self, DIAGRAM_TABS, DiagramTab};
use crate::ir::Diagram;
use crate::resolve::{PositionResolver, ResolvedDiagram};
use crate::viewport::{DEFAULT_FIT_DELAY, ViewportController};

/// Ticket returned by [`Shell::activate`].
#[derive(Debug, Clone, Copy)]
pub struct Activation {
    pub generation: u64,
    pub diagram: &'static Diagram,
}

#[derive(Debug)]
pub struct View {
    pub tab: &'static str,
    pub canvas: Canvas,
    pub controller: ViewportController,
}

#[derive(Debug)]
pub struct Shell {
    active: &'static Diagram,
    generation: u64,
    view: Option<View>,
    fit_delay: Duration,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(DEFAULT_FIT_DELAY)
    }
}

impl Shell {
    pub fn new(fit_delay: Duration) -> Self {
        Self {
            active: diagrams::find_or_default(diagrams::DEFAULT_TAB),
            generation: 0,
            view: None,
            fit_delay,
        }
    }

    pub fn tabs(&self) -> &'static [DiagramTab] {
        &DIAGRAM_TABS
    }

    pub fn active_tab(&self) -> &'static str {
        tab_id(self.active)
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn into_view(self) -> Option<View> {
        self.view
    }

    pub fn fit_delay(&self) -> Duration {
        self.fit_delay
    }

    /// Switches to `tab`; unknown ids select the overview.
    pub fn activate(&mut self, tab: &str) -> Activation {
        let diagram = diagrams::find_or_default(tab);
        if diagram.id != tab {
            debug!(requested = tab; "Unknown tab, showing {}", diagram.id);
        }
        self.active = diagram;
        self.generation += 1;
        info!("Activated {} (generation {})", diagram.id, self.generation);
        Activation {
            generation: self.generation,
            diagram,
        }
    }

    pub fn is_current(&self, activation: &Activation) -> bool {
        activation.generation == self.generation
    }

    /// Installs a resolved view if `activation` is still the latest one.
    /// Returns `false` when the result was superseded and discarded.
    pub fn complete(&mut self, activation: Activation, resolved: ResolvedDiagram, now: Duration) -> bool {
        if !self.is_current(&activation) {
            debug!(
                "Discarding stale resolution for {} (generation {}, current {})",
                activation.diagram.id, activation.generation, self.generation
            );
            return false;
        }
        let mut canvas = Canvas::new(resolved, activation.diagram.canvas);
        canvas.viewport_handle().reset_animation_clock(now);
        let mut controller = ViewportController::new(self.fit_delay);
        controller.notify_resolved(now);
        self.view = Some(View {
            tab: tab_id(activation.diagram),
            canvas,
            controller,
        });
        true
    }

    /// Activates and resolves synchronously.
    pub fn show(&mut self, tab: &str, resolver: &PositionResolver<'_>, now: Duration) -> Option<&mut View> {
        let activation = self.activate(tab);
        let resolved = resolver.resolve(activation.diagram);
        if self.complete(activation, resolved, now) {
            self.view.as_mut()
        } else {
            None
        }
    }

    /// Drives the initial framing of the current view.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.view.as_mut() {
            Some(view) => view.controller.poll(now, &mut view.canvas),
            None => false,
        }
    }
}

fn tab_id(diagram: &'static Diagram) -> &'static str {
    DIAGRAM_TABS
        .iter()
        .find(|tab| tab.id == diagram.id)
        .map_or(diagrams::DEFAULT_TAB, |tab| tab.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RankedEngine;
    use crate::saved_layout::NoSource;
    use crate::viewport::FramingState;

    fn resolve(activation: &Activation) -> ResolvedDiagram {
        PositionResolver::new(&NoSource, &RankedEngine).resolve(activation.diagram)
    }

    #[test]
    fn unknown_tab_falls_back_to_overview() {
        let mut shell = Shell::default();
        let activation = shell.activate("no-such-tab");
        assert_eq!(activation.diagram.id, "overview");
        assert_eq!(shell.active_tab(), "overview");
    }

    #[test]
    fn last_activation_wins() {
        let mut shell = Shell::default();
        let now = Duration::from_secs(1);
        let first = shell.activate("message-flow");
        let second = shell.activate("kubernetes");
        let first_resolved = resolve(&first);
        let second_resolved = resolve(&second);

        assert!(shell.complete(second, second_resolved, now));
        assert!(!shell.complete(first, first_resolved, now));
        let view = shell.view().expect("view installed");
        assert_eq!(view.tab, "kubernetes");
        assert_eq!(view.canvas.layout_name, "kubernetesInfra");
    }

    #[test]
    fn installed_view_starts_its_animation_clock() {
        let mut shell = Shell::default();
        let shown = Duration::from_secs(7);
        let activation = shell.activate("correlation");
        let resolved = resolve(&activation);
        assert!(shell.complete(activation, resolved, shown));
        let canvas = &shell.view().expect("view").canvas;
        assert_eq!(canvas.animation_elapsed(shown), Duration::ZERO);
        assert_eq!(
            canvas.animation_elapsed(shown + Duration::from_millis(250)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn each_view_frames_once() {
        let mut shell = Shell::new(Duration::from_millis(10));
        let resolver = PositionResolver::new(&NoSource, &RankedEngine);
        let now = Duration::from_secs(1);
        shell.show("overview", &resolver, now).expect("shown");
        assert!(!shell.tick(now));
        assert!(shell.tick(now + Duration::from_millis(10)));
        assert!(!shell.tick(now + Duration::from_millis(20)));

        let view = shell.show("correlation", &resolver, now).expect("shown");
        assert!(matches!(view.controller.state(), FramingState::Scheduled { .. }));
        assert!(shell.tick(now + Duration::from_millis(10)));
    }

    #[test]
    fn tabs_are_in_fixed_order() {
        let shell = Shell::default();
        let ids: Vec<&str> = shell.tabs().iter().map(|tab| tab.id).collect();
        assert_eq!(ids, ["overview", "message-flow", "correlation", "kubernetes"]);
    }
}
