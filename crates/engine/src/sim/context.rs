use crate::app::InputSnapshot;
use crate::world::TileWorld;

use super::entity::EntityId;

pub trait SoundSink {
    fn play_sound(&mut self, name: &'static str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundQueue {
    pending: Vec<&'static str>,
}

impl SoundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[&'static str] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl SoundSink for SoundQueue {
    fn play_sound(&mut self, name: &'static str) {
        self.pending.push(name);
    }
}

pub struct SimContext<'a> {
    world: &'a TileWorld,
    input: &'a InputSnapshot,
    sounds: &'a mut dyn SoundSink,
    kill_requests: Vec<EntityId>,
}

impl<'a> SimContext<'a> {
    pub fn new(
        world: &'a TileWorld,
        input: &'a InputSnapshot,
        sounds: &'a mut dyn SoundSink,
    ) -> Self {
        Self {
            world,
            input,
            sounds,
            kill_requests: Vec::new(),
        }
    }

    pub fn world(&self) -> &TileWorld {
        self.world
    }

    pub fn input(&self) -> &InputSnapshot {
        self.input
    }

    pub fn play_sound(&mut self, name: &'static str) {
        self.sounds.play_sound(name);
    }

    /// Marks another entity dead once the current callback returns.
    pub fn request_kill(&mut self, id: EntityId) {
        if !self.kill_requests.contains(&id) {
            self.kill_requests.push(id);
        }
    }

    pub(crate) fn take_kill_requests(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.kill_requests)
    }
}
