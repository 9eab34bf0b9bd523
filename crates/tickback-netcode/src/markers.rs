//! Pending-resimulation markers
//!
//! Message handlers record where buffered history went stale; the tick
//! controller consumes the marker for its role and resimulates from there.
//! A stream with nothing pending holds `None`.
//!
//! The two streams widen in opposite directions. The authority replays from
//! the *oldest* input it has newly learned about, because any later tick may
//! depend on it. The client replays from the *newest* authoritative state it
//! was corrected to, because that is the freshest anchor it can trust.

use tickback_core::Tick;

/// Divergence markers for the input and state streams of one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivergenceMarkers {
    /// Oldest tick with a newly received input
    input: Option<Tick>,
    /// Tick of the last input resimulation; new input marks never start later
    input_floor: Option<Tick>,
    /// Newest tick with a corrected state
    state: Option<Tick>,
}

impl DivergenceMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input received for `tick`
    pub fn mark_input(&mut self, tick: Tick) {
        let earliest = self.input.or(self.input_floor);
        self.input = Some(earliest.map_or(tick, |e| e.min(tick)));
    }

    /// Record a state correction applied at `tick`
    pub fn mark_state(&mut self, tick: Tick) {
        self.state = Some(self.state.map_or(tick, |s| s.max(tick)));
    }

    /// Consume the pending input marker, remembering `current` as the floor
    /// for the next mark.
    pub fn take_input(&mut self, current: Tick) -> Option<Tick> {
        let from = self.input.take();
        if from.is_some() {
            self.input_floor = Some(current);
        }
        from
    }

    /// Consume the pending state marker
    pub fn take_state(&mut self) -> Option<Tick> {
        self.state.take()
    }

    pub fn pending_input(&self) -> Option<Tick> {
        self.input
    }

    pub fn pending_state(&self) -> Option<Tick> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_keeps_oldest() {
        let mut markers = DivergenceMarkers::new();
        markers.mark_input(7);
        markers.mark_input(5);
        markers.mark_input(9);
        assert_eq!(markers.pending_input(), Some(5));
    }

    #[test]
    fn test_state_keeps_newest() {
        let mut markers = DivergenceMarkers::new();
        markers.mark_state(7);
        markers.mark_state(5);
        markers.mark_state(9);
        assert_eq!(markers.pending_state(), Some(9));
    }

    #[test]
    fn test_take_clears() {
        let mut markers = DivergenceMarkers::new();
        markers.mark_input(3);
        markers.mark_state(4);

        assert_eq!(markers.take_input(10), Some(3));
        assert_eq!(markers.take_input(11), None);
        assert_eq!(markers.take_state(), Some(4));
        assert_eq!(markers.take_state(), None);
    }

    #[test]
    fn test_input_floor_after_take() {
        let mut markers = DivergenceMarkers::new();
        markers.mark_input(3);
        markers.take_input(10);

        // An input for a tick past the last resimulation still replays from it
        markers.mark_input(12);
        assert_eq!(markers.pending_input(), Some(10));

        markers.take_input(12);
        markers.mark_input(8);
        assert_eq!(markers.pending_input(), Some(8));
    }

    #[test]
    fn test_empty_take_keeps_floor() {
        let mut markers = DivergenceMarkers::new();
        assert_eq!(markers.take_input(10), None);
        markers.mark_input(12);
        assert_eq!(markers.pending_input(), Some(12));
    }
}
