use serde::{Deserialize, Serialize};

use crate::app::{InputAction, InputSnapshot};

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputTrace {
    pub frames: Vec<TraceFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceFrame {
    pub dt: f32,
    #[serde(default)]
    pub held: Vec<InputAction>,
    #[serde(default)]
    pub pressed: Vec<InputAction>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl TraceFrame {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            held: Vec::new(),
            pressed: Vec::new(),
            repeat: 1,
        }
    }

    /// Pressed edges only fire on the first repetition.
    pub fn input(&self, first_repetition: bool) -> InputSnapshot {
        let mut input = self
            .held
            .iter()
            .fold(InputSnapshot::empty(), |input, &action| {
                input.with_action_down(action, true)
            });
        if first_repetition {
            input = self
                .pressed
                .iter()
                .fold(input, |input, &action| input.with_action_pressed(action, true));
        }
        input
    }
}

impl InputTrace {
    pub fn tick_count(&self) -> u64 {
        self.frames.iter().map(|frame| u64::from(frame.repeat)).sum()
    }

    pub fn ticks(&self) -> impl Iterator<Item = (f32, InputSnapshot)> + '_ {
        self.frames.iter().flat_map(|frame| {
            (0..frame.repeat).map(move |repetition| (frame.dt, frame.input(repetition == 0)))
        })
    }
}
