use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::InputAction;
use crate::geometry::Vec2;
use crate::world::TileWorld;

use super::context::SimContext;
use super::entity::{Body, Drawable, Entity, EntityId, EntityKind, EntityView};
use super::physics::{has_ground_support, move_horizontal, move_vertical, VerticalContact};

pub const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 42.0);
pub const STARTING_HEALTH: u32 = 5;
pub const WALK_SPEED: f32 = 128.0;
pub const GRAVITY: f32 = 800.0;
pub const MAX_FALL_SPEED: f32 = 256.0;
pub const JUMP_STRENGTH: f32 = 280.0;
pub const SPAWN_GRACE_SECS: f32 = 1.5;
pub const DAMAGE_GRACE_SECS: f32 = 1.0;

pub const SPRITE_BASE: u16 = 0x0A00;
const FIDGET_AFTER_SECS: f32 = 10.0;
const ASH_FRAMES_PER_SEC: f32 = 4.0;
const ASH_LAST_FRAME: u16 = 3;

pub const SOUND_JUMP: &str = "jump";
pub const SOUND_OUCH: &str = "ouch";
pub const SOUND_HERO_DIE: &str = "herodie";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Begin,
    Stand,
    Jumping,
    Die,
    Transport,
    Platform,
    Climbing,
    Still,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Ignored,
    Hurt,
    Killed,
}

#[derive(Debug, Clone)]
pub struct Player {
    body: Body,
    state: PlayerState,
    health: u32,
    invincibility: f32,
    facing: i32,
    state_time: f32,
    idle_time: f32,
    walk_phase: u32,
}

impl Player {
    pub fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            body: Body::new(id, position, PLAYER_SIZE),
            state: PlayerState::Begin,
            health: STARTING_HEALTH,
            invincibility: SPAWN_GRACE_SECS,
            facing: 1,
            state_time: 0.0,
            idle_time: 0.0,
            walk_phase: 0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    pub fn facing(&self) -> i32 {
        self.facing
    }

    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.state == PlayerState::Die || self.is_invincible() {
            return DamageOutcome::Ignored;
        }
        self.health = self.health.saturating_sub(amount);
        self.invincibility = DAMAGE_GRACE_SECS;
        debug!(
            entity = self.body.id.0,
            amount,
            health = self.health,
            "player_damaged"
        );
        if self.health == 0 {
            self.set_state(PlayerState::Die);
            self.body.velocity = Vec2::ZERO;
            return DamageOutcome::Killed;
        }
        DamageOutcome::Hurt
    }

    fn set_state(&mut self, next: PlayerState) {
        if self.state == next {
            return;
        }
        debug!(
            entity = self.body.id.0,
            from = ?self.state,
            to = ?next,
            "player_state_changed"
        );
        self.state = next;
        self.state_time = 0.0;
        self.idle_time = 0.0;
    }

    fn update_standing(&mut self, dt: f32, axis: i32, ctx: &mut SimContext<'_>) {
        self.body.velocity.x = axis as f32 * WALK_SPEED;
        if axis != 0 {
            self.walk_phase = self.walk_phase.wrapping_add(1);
            self.idle_time = 0.0;
        } else {
            self.idle_time += dt;
        }

        // velocity.y <= 0 is the ground proxy for the jump gate
        if self.body.velocity.y > 0.0 {
            self.set_state(PlayerState::Jumping);
            return;
        }
        if ctx.input().was_pressed(InputAction::Jump) {
            self.set_state(PlayerState::Jumping);
            self.body.velocity.y = -JUMP_STRENGTH;
            ctx.play_sound(SOUND_JUMP);
            return;
        }
        if !has_ground_support(&self.body, ctx.world()) {
            self.set_state(PlayerState::Jumping);
        }
    }

    fn update_jumping(&mut self, dt: f32, axis: i32) {
        self.body.velocity.x = axis as f32 * WALK_SPEED;
        self.body.velocity.y = (self.body.velocity.y + GRAVITY * dt).min(MAX_FALL_SPEED);
    }

    fn integrate(&mut self, dt: f32, world: &TileWorld) {
        let dx = self.body.velocity.x * dt;
        move_horizontal(&mut self.body, world, dx);
        let dy = self.body.velocity.y * dt;
        if move_vertical(&mut self.body, world, dy) == VerticalContact::Floor {
            self.set_state(PlayerState::Stand);
        }
    }

    pub fn sprite_ref(&self) -> u16 {
        match self.state {
            PlayerState::Stand if self.body.velocity.x != 0.0 => {
                let frame = ((self.walk_phase / 2) % 4) as u16;
                SPRITE_BASE + frame + if self.facing > 0 { 4 } else { 0 }
            }
            PlayerState::Stand if self.idle_time > FIDGET_AFTER_SECS => SPRITE_BASE + 0x09,
            PlayerState::Jumping => {
                let rising = self.body.velocity.y <= 0.0;
                let offset = match (self.facing > 0, rising) {
                    (true, true) => 0x11,
                    (true, false) => 0x12,
                    (false, true) => 0x0F,
                    (false, false) => 0x10,
                };
                SPRITE_BASE + offset
            }
            PlayerState::Die => {
                let ash = ((self.state_time * ASH_FRAMES_PER_SEC) as u16).min(ASH_LAST_FRAME);
                SPRITE_BASE + 0x13 + ash
            }
            _ => SPRITE_BASE + 0x08,
        }
    }

    pub fn is_blinked_out(&self) -> bool {
        self.state != PlayerState::Die
            && self.is_invincible()
            && ((self.invincibility * 10.0) as i32) % 2 == 0
    }
}

impl Entity for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) {
        self.state_time += dt;
        if self.state == PlayerState::Die {
            return;
        }

        if self.invincibility > 0.0 {
            self.invincibility -= dt;
        }

        let axis = ctx.input().horizontal_axis();
        if axis != 0 {
            self.facing = axis;
        }

        match self.state {
            PlayerState::Begin => {
                if self.invincibility <= 0.0 {
                    self.set_state(PlayerState::Stand);
                }
            }
            PlayerState::Stand => self.update_standing(dt, axis, ctx),
            PlayerState::Jumping => self.update_jumping(dt, axis),
            PlayerState::Die
            | PlayerState::Transport
            | PlayerState::Platform
            | PlayerState::Climbing
            | PlayerState::Still => {}
        }

        self.integrate(dt, ctx.world());
    }

    fn on_touch(&mut self, other: &EntityView, ctx: &mut SimContext<'_>) {
        if other.kind != EntityKind::Enemy {
            return;
        }
        match self.take_damage(1) {
            DamageOutcome::Hurt => ctx.play_sound(SOUND_OUCH),
            DamageOutcome::Killed => ctx.play_sound(SOUND_HERO_DIE),
            DamageOutcome::Ignored => {}
        }
    }

    fn drawable(&self) -> Drawable {
        Drawable {
            id: self.body.id,
            kind: EntityKind::Player,
            bounds: self.body.bounds(),
            sprite_ref: self.sprite_ref(),
            visible: !self.is_blinked_out(),
        }
    }

    fn always_active(&self) -> bool {
        true
    }

    fn as_player(&self) -> Option<&Player> {
        Some(self)
    }
}
