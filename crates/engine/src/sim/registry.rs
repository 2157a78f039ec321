use tracing::{debug, info};

use crate::geometry::Vec2;
use crate::world::Viewport;

use super::context::SimContext;
use super::entity::{Drawable, Entity, EntityId, EntityIdAllocator, EntityView};
use super::player::Player;

pub const ACTIVE_MARGIN_X: f32 = 96.0;
pub const ACTIVE_MARGIN_Y: f32 = 48.0;
pub const PLAYER_SPAWN: Vec2 = Vec2::new(40.0, 40.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub active: usize,
    pub touches: usize,
    pub purged: usize,
}

#[derive(Debug)]
pub struct EntityRegistry {
    entities: Vec<Box<dyn Entity>>,
    active: Vec<EntityId>,
    ids: EntityIdAllocator,
    spawn_point: Vec2,
    player_id: Option<EntityId>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            active: Vec::new(),
            ids: EntityIdAllocator::default(),
            spawn_point: PLAYER_SPAWN,
            player_id: None,
        }
    }

    pub fn with_spawn_point(mut self, spawn_point: Vec2) -> Self {
        self.spawn_point = spawn_point;
        self
    }

    pub fn initialize(&mut self) {
        self.entities.clear();
        self.active.clear();
        let spawn_point = self.spawn_point;
        let player_id = self.spawn(|id| Player::new(id, spawn_point));
        self.player_id = Some(player_id);
        info!(
            player = player_id.0,
            x = spawn_point.x,
            y = spawn_point.y,
            "registry_initialized"
        );
    }

    pub fn spawn<E, F>(&mut self, build: F) -> EntityId
    where
        E: Entity + 'static,
        F: FnOnce(EntityId) -> E,
    {
        let id = self.ids.allocate();
        self.entities.push(Box::new(build(id)));
        id
    }

    /// Marks an entity dead; it is purged at the end of the next tick.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.body_mut().kill();
                true
            }
            None => false,
        }
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities
            .binary_search_by_key(&id, |entity| entity.body().id)
            .ok()
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        let index = self.index_of(id)?;
        self.entities.get(index).map(|entity| entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        let index = self.index_of(id)?;
        self.entities.get_mut(index).map(|entity| entity.as_mut())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn player(&self) -> Option<&Player> {
        self.get(self.player_id?)?.as_player()
    }

    pub fn active_ids(&self) -> &[EntityId] {
        &self.active
    }

    pub fn drawables(&self) -> Vec<Drawable> {
        self.active
            .iter()
            .filter_map(|&id| self.get(id))
            .filter(|entity| entity.body().is_alive())
            .map(|entity| entity.drawable())
            .collect()
    }

    pub fn tick(&mut self, dt: f32, viewport: &Viewport, ctx: &mut SimContext<'_>) -> TickReport {
        let region = viewport
            .as_rect()
            .expanded(ACTIVE_MARGIN_X, ACTIVE_MARGIN_Y);
        let active = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| {
                entity.body().is_alive()
                    && (entity.always_active() || entity.body().bounds().intersects(&region))
            })
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        for &index in &active {
            let Some(entity) = self.entities.get_mut(index) else {
                continue;
            };
            entity.update(dt, ctx);
            self.apply_kill_requests(ctx);
        }

        let mut touches = 0usize;
        for (position, &first) in active.iter().enumerate() {
            for &second in &active[position + 1..] {
                let (Some(first_view), Some(second_view)) =
                    (self.view_at(first), self.view_at(second))
                else {
                    continue;
                };
                if !first_view.alive
                    || !second_view.alive
                    || !first_view.bounds.intersects(&second_view.bounds)
                {
                    continue;
                }
                touches += 1;
                if let Some(entity) = self.entities.get_mut(first) {
                    entity.on_touch(&second_view, ctx);
                }
                self.apply_kill_requests(ctx);
                if let Some(entity) = self.entities.get_mut(second) {
                    entity.on_touch(&first_view, ctx);
                }
                self.apply_kill_requests(ctx);
            }
        }

        self.active = active
            .iter()
            .filter_map(|&index| self.entities.get(index))
            .filter(|entity| entity.body().is_alive())
            .map(|entity| entity.body().id)
            .collect();

        let before = self.entities.len();
        self.entities.retain(|entity| entity.body().is_alive());
        let purged = before - self.entities.len();
        if purged > 0 {
            debug!(purged, remaining = self.entities.len(), "entities_purged");
        }

        TickReport {
            active: active.len(),
            touches,
            purged,
        }
    }

    fn view_at(&self, index: usize) -> Option<EntityView> {
        self.entities.get(index).map(|entity| entity.view())
    }

    fn apply_kill_requests(&mut self, ctx: &mut SimContext<'_>) {
        for id in ctx.take_kill_requests() {
            self.kill(id);
        }
    }
}
