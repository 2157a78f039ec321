use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Vec2};

use super::context::SimContext;
use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Prop,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    alive: bool,
}

impl Body {
    pub fn new(id: EntityId, position: Vec2, size: Vec2) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            size,
            alive: true,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position_size(self.position, self.size)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

/// Snapshot of the other party in a touch. Never stored past the callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub bounds: Rect,
    pub velocity: Vec2,
    pub is_weapon: bool,
    pub is_killable: bool,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub id: EntityId,
    pub kind: EntityKind,
    pub bounds: Rect,
    pub sprite_ref: u16,
    pub visible: bool,
}

pub trait Entity: fmt::Debug {
    fn kind(&self) -> EntityKind;

    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>);

    fn on_touch(&mut self, _other: &EntityView, _ctx: &mut SimContext<'_>) {}

    fn drawable(&self) -> Drawable {
        Drawable {
            id: self.body().id,
            kind: self.kind(),
            bounds: self.body().bounds(),
            sprite_ref: 0,
            visible: true,
        }
    }

    fn is_weapon(&self) -> bool {
        false
    }

    fn is_killable(&self) -> bool {
        false
    }

    fn always_active(&self) -> bool {
        false
    }

    fn as_player(&self) -> Option<&Player> {
        None
    }

    fn view(&self) -> EntityView {
        let body = self.body();
        EntityView {
            id: body.id,
            kind: self.kind(),
            bounds: body.bounds(),
            velocity: body.velocity,
            is_weapon: self.is_weapon(),
            is_killable: self.is_killable(),
            alive: body.is_alive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prop {
    body: Body,
    sprite_ref: u16,
    weapon: bool,
    always_active: bool,
}

impl Prop {
    pub fn new(id: EntityId, position: Vec2, size: Vec2) -> Self {
        Self {
            body: Body::new(id, position, size),
            sprite_ref: 0,
            weapon: false,
            always_active: false,
        }
    }

    pub fn with_sprite(mut self, sprite_ref: u16) -> Self {
        self.sprite_ref = sprite_ref;
        self
    }

    pub fn with_weapon(mut self, weapon: bool) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn with_always_active(mut self, always_active: bool) -> Self {
        self.always_active = always_active;
        self
    }
}

impl Entity for Prop {
    fn kind(&self) -> EntityKind {
        EntityKind::Prop
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, _dt: f32, _ctx: &mut SimContext<'_>) {}

    fn drawable(&self) -> Drawable {
        Drawable {
            id: self.body.id,
            kind: EntityKind::Prop,
            bounds: self.body.bounds(),
            sprite_ref: self.sprite_ref,
            visible: true,
        }
    }

    fn is_weapon(&self) -> bool {
        self.weapon
    }

    fn always_active(&self) -> bool {
        self.always_active
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    body: Body,
}

impl Enemy {
    pub fn new(id: EntityId, position: Vec2, size: Vec2) -> Self {
        Self {
            body: Body::new(id, position, size),
        }
    }
}

impl Entity for Enemy {
    fn kind(&self) -> EntityKind {
        EntityKind::Enemy
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, _dt: f32, _ctx: &mut SimContext<'_>) {}

    fn is_killable(&self) -> bool {
        true
    }
}
