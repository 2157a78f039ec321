mod context;
mod entity;
#[cfg(test)]
mod fixtures;
mod physics;
mod player;
mod registry;
mod session;
mod trace;

pub use context::{SimContext, SoundQueue, SoundSink};
pub use entity::{
    Body, Drawable, Enemy, Entity, EntityId, EntityIdAllocator, EntityKind, EntityView, Prop,
};
pub use physics::{has_ground_support, move_horizontal, move_vertical, VerticalContact, MAX_STEP_PX};
pub use player::{
    DamageOutcome, Player, PlayerState, DAMAGE_GRACE_SECS, GRAVITY, JUMP_STRENGTH, MAX_FALL_SPEED,
    PLAYER_SIZE, SOUND_HERO_DIE, SOUND_JUMP, SOUND_OUCH, SPAWN_GRACE_SECS, SPRITE_BASE,
    STARTING_HEALTH, WALK_SPEED,
};
pub use registry::{EntityRegistry, TickReport, ACTIVE_MARGIN_X, ACTIVE_MARGIN_Y, PLAYER_SPAWN};
pub use session::{PlayerSnapshot, SimSnapshot, Simulation};
pub use trace::{InputTrace, TraceFrame};
