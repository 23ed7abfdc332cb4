//! Climbing module: constraint-рига, захваты, ice-slip
//!
//! Порядок систем в FixedUpdate (жёсткая цепочка, до physics step):
//! 1. tick_ice_cooldowns — тик cooldown'ов
//! 2. handle_respawn — respawn бросает захваты и телепортирует тело
//! 3. handle_grab_start / handle_grab_release — dispatch input events
//! 4. detect_ice_slip — hazard форсит срыв в том же тике
//! 5. sync_follow_mode — reconciler режима (side effects переходов)
//! 6. mirror_anchor / follow_anchor — зеркалирование по текущему режиму
//!
//! Locomotion-система ходьбы встаёт между 5 и 6 (см. LocomotionPlugin).

use bevy::prelude::*;
use bevy_rapier2d::prelude::PhysicsSet;

pub mod follow;
pub mod grab;
pub mod ice;

// Re-export основных операций
pub use follow::{follow_anchor, handle_respawn, mirror_anchor, sync_follow_mode};
pub use grab::{grab_at, handle_grab_release, handle_grab_start, release_grab, resolve_grab_target};
pub use ice::{detect_ice_slip, tick_ice_cooldowns, HAND_ICE_DETECTION_RADIUS};

use crate::animation::PoseHint;
use crate::input::{GrabPressed, GrabReleased, RespawnPressed};

/// Plugin лазания по constraint-риге
pub struct ClimbingPlugin;

impl Plugin for ClimbingPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<GrabPressed>()
            .add_event::<GrabReleased>()
            .add_event::<RespawnPressed>()
            .add_event::<PoseHint>();

        // Вся мутация состояния — синхронно внутри одного тика,
        // до синхронизации physics backend'а
        app.add_systems(
            FixedUpdate,
            (
                ice::tick_ice_cooldowns,
                follow::handle_respawn,
                grab::handle_grab_start,
                grab::handle_grab_release,
                ice::detect_ice_slip,
                follow::sync_follow_mode,
                follow::mirror_anchor,
                follow::follow_anchor,
            )
                .chain()
                .before(PhysicsSet::SyncBackend),
        );
    }
}
