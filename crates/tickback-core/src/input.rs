//! Input source collaborator

use crate::{Input, Tick};

/// Produces one input sample per tick for the locally controlled entity.
pub trait InputSource {
    fn poll(&mut self, tick: Tick) -> Input;
}

impl<F> InputSource for F
where
    F: FnMut(Tick) -> Input,
{
    fn poll(&mut self, tick: Tick) -> Input {
        self(tick)
    }
}

/// Replays a fixed sequence of inputs, one per poll, then idles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: Vec<Input>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(script: Vec<Input>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Number of scripted samples not yet polled
    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.cursor)
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _tick: Tick) -> Input {
        let input = self.script.get(self.cursor).copied().unwrap_or(Input::NONE);
        self.cursor += 1;
        input
    }
}
