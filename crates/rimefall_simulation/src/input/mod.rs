//! Input events
//!
//! Абстрактные действия игрока. Polling реальных устройств — забота
//! внешнего input-глю: оно переводит нажатия в эти events (edge-triggered)
//! и пишет непрерывные оси в компонент `MoveInput` тела.

use bevy::prelude::*;

use crate::components::{GrabDirection, HandSide};

/// Event: нажат захват (press = начать захват рукой `side`)
#[derive(Event, Debug, Clone, Copy)]
pub struct GrabPressed {
    /// Тело персонажа (entity с CharacterRig)
    pub entity: Entity,
    pub side: HandSide,
    pub direction: GrabDirection,
}

/// Event: захват отпущен (release = отпустить руку `side`)
#[derive(Event, Debug, Clone, Copy)]
pub struct GrabReleased {
    pub entity: Entity,
    pub side: HandSide,
}

/// Event: respawn персонажа в configured точку
#[derive(Event, Debug, Clone, Copy)]
pub struct RespawnPressed {
    pub entity: Entity,
}
