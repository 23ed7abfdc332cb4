//! Follow-режим: кто ведёт персонажа — тело или рига
//!
//! Единственный владелец режима — `ControlMode` на entity тела. Переходы
//! делает reconciler `sync_follow_mode`: сравнивает режим с фактом "хоть
//! одна рука держится" и применяет side effects ровно один раз на
//! переход. Повторный захват в том же режиме не перезапускает физические
//! side effects.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::animation::{climb_frame, Pose, PoseHint};
use crate::components::{
    AnchorMode, CharacterBody, CharacterRig, ClimbAnchor, ControlMode, Hand, PhysicsBody,
};
use crate::climbing::grab;
use crate::input::RespawnPressed;
use crate::logger;

/// Система: reconciler режима управления
///
/// BodyLeads → AnchorLeads при первом захвате: рига становится dynamic,
/// тело — пассажиром с выключенным collider'ом (иначе двойная коллизия
/// с миром). AnchorLeads → BodyLeads когда рук не осталось: вращения и
/// angular velocity сбрасываются, рига возвращается в kinematic-зеркало.
pub fn sync_follow_mode(
    mut commands: Commands,
    mut bodies: Query<(Entity, &CharacterRig, &mut CharacterBody, &mut ControlMode, &mut Transform)>,
    mut anchors: Query<
        (&mut ClimbAnchor, &mut Transform, &mut Velocity, &mut RigidBody),
        Without<CharacterBody>,
    >,
    mut hands: Query<(&Hand, &mut RigidBody), (Without<CharacterBody>, Without<ClimbAnchor>)>,
) {
    for (body_entity, rig, mut body, mut mode, mut body_transform) in bodies.iter_mut() {
        let any_grabbing = rig
            .hands()
            .iter()
            .any(|&hand| hands.get(hand).map(|(h, _)| h.grabbing).unwrap_or(false));

        match (*mode, any_grabbing) {
            (ControlMode::BodyLeads, true) => {
                *mode = ControlMode::AnchorLeads;
                body.following = true;
                commands.entity(body_entity).insert(ColliderDisabled);

                if let Ok((mut anchor, _, _, mut rigid_body)) = anchors.get_mut(rig.anchor) {
                    anchor.mode = AnchorMode::Dynamic;
                    *rigid_body = RigidBody::Dynamic;
                }
                for hand_entity in rig.hands() {
                    if let Ok((_, mut rigid_body)) = hands.get_mut(hand_entity) {
                        *rigid_body = RigidBody::Dynamic;
                    }
                    commands.entity(hand_entity).insert(Sleeping::disabled());
                }

                logger::log("Anchor leads: grab joints now drive the character");
            }
            (ControlMode::AnchorLeads, false) => {
                body_transform.rotation = Quat::IDENTITY;
                body.following = false;
                *mode = ControlMode::BodyLeads;
                commands.entity(body_entity).remove::<ColliderDisabled>();

                if let Ok((mut anchor, mut anchor_transform, mut velocity, mut rigid_body)) =
                    anchors.get_mut(rig.anchor)
                {
                    anchor.mode = AnchorMode::Mirror;
                    anchor_transform.rotation = Quat::IDENTITY;
                    velocity.angvel = 0.0;
                    *rigid_body = RigidBody::KinematicPositionBased;
                }
                for hand_entity in rig.hands() {
                    if let Ok((_, mut rigid_body)) = hands.get_mut(hand_entity) {
                        *rigid_body = RigidBody::KinematicPositionBased;
                    }
                }

                logger::log("Body leads: kinematic movement restored");
            }
            // уже в нужном режиме — side effects не повторяем
            _ => {}
        }
    }
}

/// Система: kinematic-зеркало риги (режим Mirror)
///
/// Рига копирует transform тела с нулевой velocity, руки прижаты к
/// socket'ам joint'ов. Rotation в этом режиме всегда ноль, поэтому
/// socket'ы не вращаем.
pub fn mirror_anchor(
    bodies: Query<(&CharacterRig, &Transform), With<CharacterBody>>,
    mut anchors: Query<(&ClimbAnchor, &mut Transform, &mut Velocity), Without<CharacterBody>>,
    mut hands: Query<
        (&mut Transform, &mut Velocity),
        (With<Hand>, Without<CharacterBody>, Without<ClimbAnchor>),
    >,
) {
    for (rig, body_transform) in bodies.iter() {
        let Ok((anchor, mut anchor_transform, mut velocity)) = anchors.get_mut(rig.anchor) else {
            continue;
        };
        if anchor.mode != AnchorMode::Mirror {
            continue;
        }

        *anchor_transform = *body_transform;
        *velocity = Velocity::zero();

        let base = anchor_transform.translation.truncate();
        let sockets = [(rig.left_hand, anchor.left_socket), (rig.right_hand, anchor.right_socket)];
        for (hand_entity, socket) in sockets {
            if let Ok((mut hand_transform, mut hand_velocity)) = hands.get_mut(hand_entity) {
                hand_transform.translation = (base + socket).extend(0.0);
                *hand_velocity = Velocity::zero();
            }
        }
    }
}

/// Система: тело едет за ригой (режим AnchorLeads)
///
/// Transform копируется, собственная скорость тела — ноль. Заодно
/// публикуем climb-кадр по взаимной высоте рук.
pub fn follow_anchor(
    mut poses: EventWriter<PoseHint>,
    mut bodies: Query<
        (Entity, &CharacterRig, &ControlMode, &mut Transform, &mut PhysicsBody),
        With<CharacterBody>,
    >,
    anchors: Query<(&ClimbAnchor, &Transform), Without<CharacterBody>>,
    hands: Query<&Transform, (With<Hand>, Without<CharacterBody>, Without<ClimbAnchor>)>,
) {
    for (entity, rig, mode, mut body_transform, mut physics) in bodies.iter_mut() {
        if *mode != ControlMode::AnchorLeads {
            continue;
        }
        let Ok((anchor, anchor_transform)) = anchors.get(rig.anchor) else {
            continue;
        };

        *body_transform = *anchor_transform;
        physics.velocity = Vec2::ZERO;

        let (Ok(left), Ok(right)) = (hands.get(rig.left_hand), hands.get(rig.right_hand)) else {
            continue;
        };
        let frame = climb_frame(
            left.translation.y,
            right.translation.y,
            anchor.hand_height_dead_zone,
        );
        poses.write(PoseHint { entity, pose: Pose::Climb { frame }, facing_left: false });
    }
}

/// Система: respawn персонажа
///
/// Бросает все захваты, телепортирует тело в configured точку, зануляет
/// скорости тела и риги. Выход из AnchorLeads доделает reconciler в этом
/// же тике.
pub fn handle_respawn(
    mut commands: Commands,
    mut events: EventReader<RespawnPressed>,
    mut bodies: Query<(&CharacterRig, &CharacterBody, &mut PhysicsBody, &mut Transform)>,
    mut anchors: Query<&mut Velocity, (With<ClimbAnchor>, Without<Hand>)>,
    mut hands: Query<&mut Hand>,
) {
    for event in events.read() {
        let Ok((rig, body, mut physics, mut transform)) = bodies.get_mut(event.entity) else {
            continue;
        };

        for hand_entity in rig.hands() {
            if let Ok(mut hand) = hands.get_mut(hand_entity) {
                grab::release_grab(&mut commands, hand_entity, &mut hand);
            }
        }

        physics.velocity = Vec2::ZERO;
        transform.translation = body.spawn_position.extend(0.0);
        if let Ok(mut velocity) = anchors.get_mut(rig.anchor) {
            *velocity = Velocity::zero();
        }

        logger::log_info(&format!(
            "Respawned at ({:.1}, {:.1})",
            body.spawn_position.x, body.spawn_position.y
        ));
    }
}
