//! Ice-slip governor
//!
//! Пока ведёт рига, каждый тик проверяем hazard-контакт: sensor rays тела
//! и circle overlap у обеих рук (радиус в несколько пикселей, только слой
//! льда). Контакт — немедленный срыв в том же тике: захваты брошены,
//! cooldown запущен, восходящая скорость погашена, чтобы падение началось
//! сразу. Edge-флаг just_slipped не даёт длящемуся контакту срываться
//! каждый тик повторно.

use bevy::prelude::*;

use crate::climbing::grab;
use crate::collision_layers::ICE_MASK;
use crate::components::{CharacterBody, CharacterRig, ControlMode, Hand, IceSlip, PhysicsBody, SensorRays};
use crate::logger;
use crate::terrain::TerrainMap;

/// Радиус hazard-детектора руки (px)
pub const HAND_ICE_DETECTION_RADIUS: f32 = 4.0;

/// Система: тик cooldown'ов ice-slip
pub fn tick_ice_cooldowns(time: Res<Time<Fixed>>, mut query: Query<&mut IceSlip>) {
    let delta = time.delta_secs();
    for mut slip in query.iter_mut() {
        slip.tick(delta);
    }
}

/// Система: hazard-контакт во время лазания
///
/// Работает только в AnchorLeads: в BodyLeads стояние на льду ловят
/// sensor rays в locomotion-системе (узкий legacy-путь, без смены режима).
pub fn detect_ice_slip(
    mut commands: Commands,
    terrain: Res<TerrainMap>,
    mut bodies: Query<
        (&CharacterRig, &ControlMode, &Transform, &SensorRays, &mut PhysicsBody, &mut IceSlip),
        With<CharacterBody>,
    >,
    mut hands: Query<(&mut Hand, &Transform), Without<CharacterBody>>,
) {
    for (rig, mode, body_transform, rays, mut physics, mut slip) in bodies.iter_mut() {
        if *mode != ControlMode::AnchorLeads {
            continue;
        }

        let body_position = body_transform.translation.truncate();
        let body_on_ice = rays
            .rays
            .iter()
            .any(|(from, to)| terrain.ray_hits_hazard(body_position + *from, body_position + *to));
        let hand_on_ice = rig.hands().iter().any(|&hand_entity| {
            hands
                .get(hand_entity)
                .map(|(_, transform)| {
                    terrain.circle_overlaps(
                        transform.translation.truncate(),
                        HAND_ICE_DETECTION_RADIUS,
                        ICE_MASK,
                    )
                })
                .unwrap_or(false)
        });

        if !body_on_ice && !hand_on_ice {
            slip.just_slipped = false;
            continue;
        }
        if slip.just_slipped {
            continue;
        }

        slip.just_slipped = true;
        for hand_entity in rig.hands() {
            if let Ok((mut hand, _)) = hands.get_mut(hand_entity) {
                grab::release_grab(&mut commands, hand_entity, &mut hand);
            }
        }
        slip.start_cooldown();
        // гасим восходящую составляющую: падение видно немедленно
        physics.velocity.y = physics.velocity.y.min(0.0);

        logger::log_info("Slipped on ice: grabs dropped, cooldown running");
    }
}
