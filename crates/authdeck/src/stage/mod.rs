//! The diagram stage: measured node geometry, routed edges and the pulse
//! phase for one mounted slide.

pub mod geometry;
pub mod layout;
pub mod pulse;
pub mod registry;
pub mod routing;
pub mod scheduler;
pub mod types;

use std::time::{Duration, Instant};

use layout::{TextMeasure, layout_pass};
use pulse::{PULSE_STEP, PulseAnimator};
use registry::{ElementHandle, NodeRegistry};
use routing::plan_routes;
use routing::types::{RoutingConfig, RoutingOutput};
use scheduler::{Scheduler, StageTask};
use types::{EdgeSpec, NodeBox, NodeSpec};

/// Timer cadence and routing knobs for a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    /// Registry refresh cadence. Zero disables polling.
    pub refresh_interval: Duration,
    /// One-shot recomputes after mount.
    pub retry_delays: Vec<Duration>,
    /// Steady recompute cadence. Zero disables it.
    pub steady_recompute: Duration,
    pub routing: RoutingConfig,
    pub pulse_step: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(200),
            retry_delays: [100, 300, 500, 1000]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
            steady_recompute: Duration::from_millis(1000),
            routing: RoutingConfig::default(),
            pulse_step: PULSE_STEP,
        }
    }
}

pub struct Stage {
    config: StageConfig,
    registry: NodeRegistry,
    nodes: Vec<NodeSpec>,
    edges: Vec<EdgeSpec>,
    routes: RoutingOutput,
    pulse: PulseAnimator,
    scheduler: Scheduler,
    viewport: (f32, f32),
    recomputes: u64,
}

impl Stage {
    /// Mount an empty stage and arm its timers.
    pub fn mount(now: Instant, config: StageConfig) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.set_interval(now, config.refresh_interval, StageTask::RefreshRegistry);
        for delay in &config.retry_delays {
            scheduler.set_timeout(now, *delay, StageTask::RecomputeRoutes);
        }
        scheduler.set_interval(now, config.steady_recompute, StageTask::RecomputeRoutes);
        log::debug!("stage mounted with {} timer(s)", scheduler.len());

        Self {
            pulse: PulseAnimator::new(config.pulse_step),
            config,
            registry: NodeRegistry::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            routes: RoutingOutput::default(),
            scheduler,
            viewport: (0.0, 0.0),
            recomputes: 0,
        }
    }

    /// Replace the declared nodes and edges.
    ///
    /// Runs one layout pass, refreshes the registry and recomputes routes,
    /// so the new scene is drawable immediately.
    pub fn set_scene(
        &mut self,
        nodes: Vec<NodeSpec>,
        edges: Vec<EdgeSpec>,
        measure: &dyn TextMeasure,
    ) {
        if self.is_torn_down() {
            return;
        }
        self.nodes = nodes;
        self.edges = edges;
        self.relayout(measure);
        self.pulse.sync(&self.edges);
    }

    /// Run every timer due at `now`. Returns true if anything ran.
    pub fn tick(&mut self, now: Instant, measure: &dyn TextMeasure) -> bool {
        let tasks = self.scheduler.due(now);
        for task in &tasks {
            match task {
                StageTask::RefreshRegistry => {
                    layout_pass(&mut self.registry, &self.nodes, measure);
                    self.registry.refresh();
                    self.recompute();
                }
                StageTask::RecomputeRoutes => self.recompute(),
            }
        }
        !tasks.is_empty()
    }

    /// Advance the pulse phase by one frame.
    pub fn on_frame(&mut self) {
        self.pulse.on_frame();
    }

    /// Note a viewport size. Any change recomputes routes.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.is_torn_down() || self.viewport == (width, height) {
            return;
        }
        log::trace!("stage resized to {width}x{height}");
        self.viewport = (width, height);
        self.recompute();
    }

    /// Layout, refresh and route in one go.
    pub fn relayout(&mut self, measure: &dyn TextMeasure) {
        layout_pass(&mut self.registry, &self.nodes, measure);
        self.registry.refresh();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.routes = plan_routes(self.registry.snapshot(), &self.edges, &self.config.routing);
        self.recomputes += 1;
    }

    pub fn routes(&self) -> &RoutingOutput {
        &self.routes
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Measured box for a node, if it is mounted and measured.
    pub fn node_box(&self, id: &str) -> Option<NodeBox> {
        self.registry.get(id)
    }

    /// Live element for a node, for positioning overlays next to it.
    pub fn element(&self, id: &str) -> Option<ElementHandle> {
        self.registry.element(id)
    }

    pub fn phase(&self) -> f32 {
        self.pulse.phase()
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulse.is_running()
    }

    /// How many times routes were recomputed since mount.
    #[cfg(test)]
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Time until the next timer, if any remain.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.scheduler.next_deadline(now)
    }

    pub fn is_torn_down(&self) -> bool {
        self.scheduler.is_torn_down()
    }

    /// Cancel every timer, stop the pulse loop and release all elements.
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            return;
        }
        self.scheduler.teardown();
        self.pulse.stop();
        self.registry.clear();
        self.routes = RoutingOutput::default();
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.teardown();
    }
}
