//! State interpolation for smooth rendering
//!
//! The tick controller refreshes a pair of endpoints once per network tick;
//! the renderer samples them every frame. Frame rate and tick rate are not
//! synchronized, so the blend fraction is allowed to leave `[0, 1]` and the
//! position is extrapolated along the same line.

use tickback_core::{State, Vec3};

/// Two states bracketing the current render time
///
/// Copied wholesale between the tick path and the render path, so a reader
/// always sees a matching pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoints {
    pub from_state: State,
    pub from_time: f64,
    pub to_state: State,
    pub to_time: f64,
}

impl Endpoints {
    /// Endpoints that hold `state` still
    pub fn at_rest(state: State, time: f64) -> Self {
        Self {
            from_state: state,
            from_time: time,
            to_state: state,
            to_time: time,
        }
    }

    /// Blend fraction `1 - (to_time - now) / (to_time - from_time)`.
    ///
    /// A zero-length interval yields `1.0` (show the target).
    pub fn fraction(&self, now: f64) -> f64 {
        let span = self.to_time - self.from_time;
        if span == 0.0 {
            return 1.0;
        }
        1.0 - (self.to_time - now) / span
    }

    /// Interpolated position at `now`, unclamped
    pub fn sample(&self, now: f64) -> Vec3 {
        let f = self.fraction(now) as f32;
        self.from_state
            .position
            .lerp_unclamped(self.to_state.position, f)
    }
}

/// Interpolation endpoints plus the last rendered position
#[derive(Debug, Clone)]
pub struct Interpolator {
    endpoints: Endpoints,
    rendered: Vec3,
}

impl Interpolator {
    /// Start at rest on `state`
    pub fn new(state: State, time: f64) -> Self {
        Self {
            endpoints: Endpoints::at_rest(state, time),
            rendered: state.position,
        }
    }

    /// Begin a tick: the rendered position becomes the new origin, and the
    /// interval spans the upcoming tick.
    pub fn begin_tick(&mut self, time: f64, delta_time: f64) {
        self.endpoints.from_state = State::new(self.rendered);
        self.endpoints.from_time = time;
        self.endpoints.to_time = time + delta_time;
    }

    /// Finish a tick with the settled state to display
    pub fn end_tick(&mut self, to_state: State) {
        self.endpoints.to_state = to_state;
    }

    /// Sample the endpoints at `now` and record the result as the rendered
    /// position.
    pub fn render(&mut self, now: f64) -> Vec3 {
        self.rendered = self.endpoints.sample(now);
        self.rendered
    }

    pub fn endpoints(&self) -> Endpoints {
        self.endpoints
    }

    pub fn rendered(&self) -> Vec3 {
        self.rendered
    }
}
