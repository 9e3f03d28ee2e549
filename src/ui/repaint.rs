use std::time::Duration;

/// Frame rate while a timer or job needs watching.
pub const TIMER_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default)]
pub struct RepaintDecisionInputs {
    pub shell_state_changed: bool,
    pub has_pending_actions: bool,
    pub has_input_events: bool,
    pub has_pending_jobs: bool,
    pub has_running_timers: bool,
}

pub fn should_request_repaint_now(inputs: RepaintDecisionInputs) -> bool {
    inputs.shell_state_changed || inputs.has_pending_actions || inputs.has_input_events
}

/// Jobs and timers resolve without user input, so keep polling them.
pub fn should_request_periodic_repaint(inputs: RepaintDecisionInputs) -> bool {
    !should_request_repaint_now(inputs) && (inputs.has_pending_jobs || inputs.has_running_timers)
}
