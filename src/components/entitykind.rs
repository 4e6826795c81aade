use bevy_ecs::prelude::Component;

/// What kind of game object an entity is. Contact handling, damage and
/// charge-loss delegation match on this exhaustively.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    PlayerBot,
    TaskBot,
    Moogle,
    Trap,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::PlayerBot => "PlayerBot",
            EntityKind::TaskBot => "TaskBot",
            EntityKind::Moogle => "Moogle",
            EntityKind::Trap => "Trap",
        }
    }
}
