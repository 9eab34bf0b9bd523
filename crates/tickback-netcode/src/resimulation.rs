//! Resimulation over tick-keyed history
//!
//! Replays the simulation step across an inclusive tick range, deriving each
//! state from the state stored for the tick before it and the input stored for
//! the tick itself. Missing entries read as the buffers' defaults, so a range
//! that reaches past the recorded inputs simply holds position.

use tickback_core::{Input, Simulation, State, Tick, TickHistory};
use tracing::debug;

/// An inclusive range of ticks that was resimulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResimRange {
    pub from: Tick,
    pub to: Tick,
}

impl ResimRange {
    /// Number of ticks in the range
    pub fn len(&self) -> u64 {
        if self.to < self.from {
            0
        } else {
            (self.to - self.from + 1) as u64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }
}

/// Resimulate `[from, to]` in ascending order.
///
/// Each produced state is written into `states` and handed to `on_state`
/// before the next tick is computed. Returns the range that was covered,
/// which is empty when `from > to`.
pub fn resimulate<S, I, H, F>(
    simulation: &S,
    inputs: &I,
    states: &mut H,
    from: Tick,
    to: Tick,
    delta_time: f32,
    mut on_state: F,
) -> ResimRange
where
    S: Simulation + ?Sized,
    I: TickHistory<Input> + ?Sized,
    H: TickHistory<State> + ?Sized,
    F: FnMut(Tick, State),
{
    let range = ResimRange { from, to };
    if range.is_empty() {
        return range;
    }

    debug!(from, to, ticks = range.len(), "resimulating");
    for tick in from..=to {
        let state = simulation.simulate(&inputs.get(tick), &states.get(tick - 1), delta_time);
        states.set(state, tick);
        on_state(tick, state);
    }
    range
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickback_core::{Movement, Vec3};
    use tickback_rollback_buffer::HistoryBuffer;

    fn right() -> Input {
        Input::new(Vec3::new(1.0, 0.0, 0.0))
    }

    #[test]
    fn test_replays_recorded_inputs() {
        let mut inputs = HistoryBuffer::new(64, Input::NONE, 0);
        let mut states = HistoryBuffer::seeded(64, State::default(), 0);
        for tick in 1..=4 {
            inputs.set(right(), tick);
        }

        let mut emitted = Vec::new();
        let range = resimulate(
            &Movement::new(1.0),
            &inputs,
            &mut states,
            1,
            4,
            1.0,
            |tick, state| emitted.push((tick, state)),
        );

        assert_eq!(range.len(), 4);
        assert_eq!(states.get(4), State::at(4.0, 0.0, 0.0));
        let ticks: Vec<_> = emitted.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_range_is_noop() {
        let inputs = HistoryBuffer::new(8, Input::NONE, 0);
        let mut states = HistoryBuffer::seeded(8, State::default(), 0);
        let range = resimulate(&Movement::default(), &inputs, &mut states, 5, 4, 0.1, |_, _| {
            panic!("nothing to emit")
        });
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(states.len(), 1);
    }

    #[test]
    fn test_missing_input_holds_position() {
        let inputs = HistoryBuffer::new(8, Input::NONE, 0);
        let mut states = HistoryBuffer::seeded(8, State::at(1.0, 2.0, 3.0), 0);
        resimulate(&Movement::default(), &inputs, &mut states, 1, 3, 0.1, |_, _| {});
        assert_eq!(states.get(3), State::at(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_late_input_scenario() {
        // Tick 5 was first simulated with no input, then the real input arrived.
        let mut inputs = HistoryBuffer::new(64, Input::NONE, 0);
        let mut states = HistoryBuffer::seeded(64, State::default(), 0);
        let step = Movement::new(2.0);

        resimulate(&step, &inputs, &mut states, 1, 5, 0.1, |_, _| {});
        assert_eq!(states.get(5), State::default());

        inputs.set(right(), 5);
        let mut commits = Vec::new();
        resimulate(&step, &inputs, &mut states, 5, 6, 0.1, |t, s| commits.push((t, s)));

        let (tick, state) = commits[0];
        assert_eq!(tick, 5);
        assert!(state.approx_eq(&State::at(0.2, 0.0, 0.0), 1e-6));
        assert_eq!(states.get(6), states.get(5));
    }

    #[test]
    fn test_bit_identical_reruns() {
        let step = Movement::new(3.7);
        let mut inputs = HistoryBuffer::new(64, Input::NONE, 0);
        for tick in 0..40 {
            let x = (tick as f32 * 0.37).sin();
            let z = (tick as f32 * 0.11).cos();
            inputs.set(Input::new(Vec3::new(x, 0.0, z)), tick);
        }

        let run = || {
            let mut states = HistoryBuffer::seeded(64, State::at(0.1, 0.2, 0.3), 0);
            resimulate(&step, &inputs, &mut states, 1, 39, 1.0 / 60.0, |_, _| {});
            states
        };
        let a = run();
        let b = run();
        for tick in 0..40 {
            let (pa, pb) = (a.get(tick).position, b.get(tick).position);
            assert_eq!(pa.x.to_bits(), pb.x.to_bits());
            assert_eq!(pa.y.to_bits(), pb.y.to_bits());
            assert_eq!(pa.z.to_bits(), pb.z.to_bits());
        }
    }
}
