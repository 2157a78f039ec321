use serde::{Deserialize, Serialize};

use crate::app::InputSnapshot;
use crate::geometry::Vec2;
use crate::world::{TileWorld, Viewport};

use super::context::{SimContext, SoundQueue};
use super::entity::Entity;
use super::player::PlayerState;
use super::registry::{EntityRegistry, TickReport};
use super::trace::InputTrace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: u32,
    pub invincible: bool,
    pub facing: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub tick: u64,
    pub player: Option<PlayerSnapshot>,
    pub live_entities: usize,
    pub viewport: Viewport,
}

#[derive(Debug)]
pub struct Simulation {
    world: TileWorld,
    registry: EntityRegistry,
    viewport: Viewport,
    sounds: SoundQueue,
    tick: u64,
}

impl Simulation {
    pub fn new(world: TileWorld, viewport: Viewport) -> Self {
        Self {
            world,
            registry: EntityRegistry::new(),
            viewport,
            sounds: SoundQueue::new(),
            tick: 0,
        }
    }

    pub fn with_registry(mut self, registry: EntityRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn start(&mut self) {
        self.registry.initialize();
        self.sounds.drain();
        self.tick = 0;
        self.follow_player();
    }

    pub fn step(&mut self, dt: f32, input: &InputSnapshot) -> TickReport {
        let report = {
            let mut ctx = SimContext::new(&self.world, input, &mut self.sounds);
            self.registry.tick(dt, &self.viewport, &mut ctx)
        };
        self.follow_player();
        self.tick += 1;
        report
    }

    pub fn replay(&mut self, trace: &InputTrace) -> Vec<SimSnapshot> {
        let mut snapshots = Vec::new();
        for (dt, input) in trace.ticks() {
            self.step(dt, &input);
            snapshots.push(self.snapshot());
        }
        snapshots
    }

    fn follow_player(&mut self) {
        let Some(focus) = self.registry.player().map(|player| player.position()) else {
            return;
        };
        self.world.update_viewport(&mut self.viewport, focus);
    }

    pub fn drain_sounds(&mut self) -> Vec<&'static str> {
        self.sounds.drain()
    }

    pub fn world(&self) -> &TileWorld {
        &self.world
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn snapshot(&self) -> SimSnapshot {
        let player = self.registry.player().map(|player| PlayerSnapshot {
            state: player.state(),
            position: player.position(),
            velocity: player.velocity(),
            health: player.health(),
            invincible: player.is_invincible(),
            facing: player.facing(),
        });
        SimSnapshot {
            tick: self.tick,
            player,
            live_entities: self.registry.len(),
            viewport: self.viewport,
        }
    }

    pub fn player_alive(&self) -> bool {
        self.registry
            .player()
            .is_some_and(|player| player.body().is_alive() && player.state() != PlayerState::Die)
    }
}
