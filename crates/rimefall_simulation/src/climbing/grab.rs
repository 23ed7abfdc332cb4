//! Захваты: lifecycle ephemeral world anchor'ов
//!
//! Каждый захват = одна entity (`GrabAnchor`): fixed body в точке мира +
//! revolute joint к руке. Despawn entity уничтожает пару целиком, поэтому
//! joint не может пережить якорь и наоборот. Правило владения: сперва
//! release, потом acquire — единственный механизм против утечек при
//! быстром повторном input'е.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::collision_layers::CLIMBABLE_MASK;
use crate::components::{CharacterBody, CharacterRig, ClimbAnchor, GrabAnchor, Hand, IceSlip};
use crate::input::{GrabPressed, GrabReleased};
use crate::logger;
use crate::terrain::TerrainMap;

/// Resolve точки захвата
///
/// Противоположная рука уже держится — тянемся offset'ом вверх/вниз,
/// коротким ray предпочитая реальную геометрию (climbable-слои). Луч
/// промахнулся — всё равно тянемся в воздух. Противоположная рука
/// свободна — цепляемся там, где рука сейчас (начало лазания).
pub fn resolve_grab_target(
    terrain: &TerrainMap,
    hand_position: Vec2,
    offset: Vec2,
    opposite_grabbing: bool,
) -> Vec2 {
    if !opposite_grabbing {
        return hand_position;
    }

    let candidate = hand_position + offset;
    match terrain.ray_terrain(hand_position, candidate, CLIMBABLE_MASK) {
        Some((point, _)) => point,
        None => candidate,
    }
}

/// Начать захват рукой в точке мира
///
/// Рука никогда не держит два якоря: старый захват отпускается первым.
pub fn grab_at(
    commands: &mut Commands,
    hand_entity: Entity,
    hand: &mut Hand,
    hand_transform: &mut Transform,
    hand_velocity: &mut Velocity,
    world_point: Vec2,
) {
    release_grab(commands, hand_entity, hand);

    hand_transform.translation = world_point.extend(0.0);
    *hand_velocity = Velocity::zero();

    let mut joint = RevoluteJointBuilder::new()
        .local_anchor1(Vec2::ZERO)
        .local_anchor2(Vec2::ZERO)
        .build();
    joint.set_contacts_enabled(false);
    let anchor = commands
        .spawn((
            GrabAnchor { hand: hand_entity },
            Transform::from_translation(world_point.extend(0.0)),
            RigidBody::Fixed,
            ImpulseJoint::new(hand_entity, joint),
        ))
        .id();

    hand.grab_anchor = Some(anchor);
    hand.grabbing = true;
    // спящее dynamic тело не отреагирует на joint
    commands.entity(hand_entity).insert(Sleeping::disabled());

    logger::log(&format!(
        "{:?} hand grabbed at ({:.1}, {:.1})",
        hand.side, world_point.x, world_point.y
    ));
}

/// Отпустить захват
///
/// Терпит повторные вызовы и свободную руку: no-op, не ошибка.
pub fn release_grab(commands: &mut Commands, hand_entity: Entity, hand: &mut Hand) {
    if let Some(anchor) = hand.grab_anchor.take() {
        commands.entity(anchor).despawn();
        logger::log(&format!("{:?} hand released grab", hand.side));
    }
    hand.grabbing = false;
    commands.entity(hand_entity).insert(Sleeping::default());
}

/// Система: dispatch события начала захвата
///
/// Ice-slip cooldown гасит новые захваты целиком: после срыва персонаж
/// обязан немного попадать, прежде чем снова цепляться.
pub fn handle_grab_start(
    mut commands: Commands,
    mut events: EventReader<GrabPressed>,
    terrain: Res<TerrainMap>,
    bodies: Query<(&CharacterRig, &IceSlip), With<CharacterBody>>,
    anchors: Query<&ClimbAnchor>,
    mut hands: Query<(&mut Hand, &mut Transform, &mut Velocity), Without<CharacterBody>>,
) {
    for event in events.read() {
        let Ok((rig, slip)) = bodies.get(event.entity) else {
            continue;
        };
        if !slip.is_cooldown_stopped() {
            logger::log("Grab suppressed: ice-slip cooldown is running");
            continue;
        }
        let Ok(anchor_config) = anchors.get(rig.anchor) else {
            continue;
        };

        let opposite_grabbing = hands
            .get(rig.hand(event.side.opposite()))
            .map(|(hand, _, _)| hand.grabbing)
            .unwrap_or(false);

        let hand_entity = rig.hand(event.side);
        let Ok((mut hand, mut transform, mut velocity)) = hands.get_mut(hand_entity) else {
            continue;
        };

        let target = resolve_grab_target(
            &terrain,
            transform.translation.truncate(),
            anchor_config.grab_offset(event.direction),
            opposite_grabbing,
        );
        grab_at(&mut commands, hand_entity, &mut hand, &mut transform, &mut velocity, target);
    }
}

/// Система: dispatch события отпускания захвата
pub fn handle_grab_release(
    mut commands: Commands,
    mut events: EventReader<GrabReleased>,
    bodies: Query<&CharacterRig, With<CharacterBody>>,
    mut hands: Query<&mut Hand>,
) {
    for event in events.read() {
        let Ok(rig) = bodies.get(event.entity) else {
            continue;
        };
        let hand_entity = rig.hand(event.side);
        let Ok(mut hand) = hands.get_mut(hand_entity) else {
            continue;
        };
        release_grab(&mut commands, hand_entity, &mut hand);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileCell;

    #[test]
    fn test_resolve_in_place_when_opposite_idle() {
        let terrain = TerrainMap::default();
        let hand = Vec2::new(8.0, 40.0);
        let target = resolve_grab_target(&terrain, hand, Vec2::new(0.0, 50.0), false);
        assert_eq!(target, hand);
    }

    #[test]
    fn test_resolve_prefers_real_geometry() {
        // скала в клетке (0,4): мир [0..16) x [64..80)
        let mut terrain = TerrainMap::default();
        terrain.set_cell(IVec2::new(0, 4), TileCell::cliff());

        let target = resolve_grab_target(&terrain, Vec2::new(8.0, 40.0), Vec2::new(0.0, 50.0), true);
        assert_eq!(target, Vec2::new(8.0, 64.0));
    }

    #[test]
    fn test_resolve_falls_back_to_offset_in_open_space() {
        let terrain = TerrainMap::default();
        let target = resolve_grab_target(&terrain, Vec2::new(8.0, 40.0), Vec2::new(0.0, 50.0), true);
        assert_eq!(target, Vec2::new(8.0, 90.0));
    }

    #[test]
    fn test_resolve_ray_ignores_ice() {
        // лёд не climbable: луч его не видит, цепляемся в воздух
        let mut terrain = TerrainMap::default();
        terrain.set_cell(IVec2::new(0, 4), TileCell::ice());

        let target = resolve_grab_target(&terrain, Vec2::new(8.0, 40.0), Vec2::new(0.0, 50.0), true);
        assert_eq!(target, Vec2::new(8.0, 90.0));
    }
}
