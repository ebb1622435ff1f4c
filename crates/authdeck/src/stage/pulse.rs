use super::types::EdgeSpec;

/// Phase wraps at this value.
pub const PULSE_PERIOD: f32 = 20.0;
/// Default per-frame phase increment.
pub const PULSE_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseState {
    Idle,
    Running,
}

/// Shared dash-offset phase for pulsing edges.
#[derive(Debug, Clone)]
pub struct PulseAnimator {
    state: PulseState,
    phase: f32,
    step: f32,
}

impl Default for PulseAnimator {
    fn default() -> Self {
        Self::new(PULSE_STEP)
    }
}

impl PulseAnimator {
    pub fn new(step: f32) -> Self {
        Self {
            state: PulseState::Idle,
            phase: 0.0,
            step,
        }
    }

    /// Re-evaluate the state after the edge list changed.
    /// Running iff at least one visible edge asks to pulse.
    pub fn sync(&mut self, edges: &[EdgeSpec]) -> PulseState {
        let wanted = edges.iter().any(|e| e.visible && e.pulse);
        let next = if wanted {
            PulseState::Running
        } else {
            PulseState::Idle
        };
        if next != self.state {
            log::trace!("pulse {:?} -> {:?} at phase {}", self.state, next, self.phase);
            self.state = next;
        }
        next
    }

    /// Advance one frame. Does nothing while idle.
    pub fn on_frame(&mut self) {
        if self.state == PulseState::Running {
            self.phase = (self.phase + self.step).rem_euclid(PULSE_PERIOD);
        }
    }

    /// Stop without touching the phase.
    pub fn stop(&mut self) {
        self.state = PulseState::Idle;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PulseState::Running
    }
}
