//! Spawn игрока: граф тела/риги/рук с валидированными ссылками
//!
//! Вся проводка (anchor, руки, socket joints) создаётся здесь и только
//! здесь. `CharacterRig` получает готовые Entity — никакого resolve по
//! именам в рантайме, некорректный config валит spawn сразу.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::collision_layers::{body_groups, rig_groups};
use crate::components::{
    CharacterBody, CharacterRig, ClimbAnchor, ControlMode, Hand, HandSide, IceSlip, MoveInput,
    PhysicsBody, SensorRays,
};

/// Конфигурация спавна персонажа
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub body: CharacterBody,
    pub anchor: ClimbAnchor,
    pub sensor_rays: SensorRays,
    /// Длительность ice-slip cooldown (сек)
    pub ice_cooldown: f32,
    /// Радиус ball-collider'а руки (px)
    pub hand_radius: f32,
    /// Capsule тела и риги: (half_height, radius)
    pub capsule: (f32, f32),
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            body: CharacterBody::default(),
            anchor: ClimbAnchor::default(),
            sensor_rays: SensorRays::default(),
            ice_cooldown: 2.0,
            hand_radius: 4.0,
            capsule: (8.0, 6.0),
        }
    }
}

impl PlayerConfig {
    /// Fail fast: конфигурационные ошибки ловим на спавне, не в физике
    fn validate(&self) {
        assert!(self.ice_cooldown > 0.0, "ice_cooldown must be positive");
        assert!(self.hand_radius > 0.0, "hand_radius must be positive");
        assert!(
            self.capsule.0 > 0.0 && self.capsule.1 > 0.0,
            "capsule dimensions must be positive"
        );
        assert!(
            self.anchor.left_socket != self.anchor.right_socket,
            "hand sockets must not coincide"
        );
        assert!(
            !self.sensor_rays.rays.is_empty(),
            "body needs at least one sensor ray"
        );
    }
}

/// Entity-граф заспавненного персонажа
#[derive(Debug, Clone, Copy)]
pub struct PlayerHandles {
    pub body: Entity,
    pub anchor: Entity,
    pub left_hand: Entity,
    pub right_hand: Entity,
}

/// Spawn персонажа целиком: тело + рига + две руки с socket joints
///
/// Все тела стартуют kinematic (режим BodyLeads): рига и руки зеркалят
/// тело, пока первый захват не переведёт их в dynamic.
pub fn spawn_player(commands: &mut Commands, config: PlayerConfig) -> PlayerHandles {
    config.validate();

    let spawn = config.body.spawn_position;
    let (half_height, radius) = config.capsule;

    let anchor = commands
        .spawn((
            config.anchor.clone(),
            Transform::from_translation(spawn.extend(0.0)),
            RigidBody::KinematicPositionBased,
            Velocity::zero(),
            Collider::capsule_y(half_height, radius),
            rig_groups(),
        ))
        .id();

    let left_hand = spawn_hand(commands, HandSide::Left, anchor, &config, spawn);
    let right_hand = spawn_hand(commands, HandSide::Right, anchor, &config, spawn);

    let body = commands
        .spawn((
            config.body.clone(),
            PhysicsBody::default(),
            MoveInput::default(),
            config.sensor_rays.clone(),
            IceSlip::with_duration(config.ice_cooldown),
            ControlMode::default(),
            CharacterRig { anchor, left_hand, right_hand },
            Transform::from_translation(spawn.extend(0.0)),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(half_height, radius),
            body_groups(),
        ))
        .id();

    PlayerHandles { body, anchor, left_hand, right_hand }
}

/// Рука: постоянным pin joint'ом привязана к socket'у риги
fn spawn_hand(
    commands: &mut Commands,
    side: HandSide,
    anchor: Entity,
    config: &PlayerConfig,
    spawn: Vec2,
) -> Entity {
    let socket = config.anchor.socket(side);
    let mut joint = RevoluteJointBuilder::new()
        .local_anchor1(socket)
        .local_anchor2(Vec2::ZERO)
        .build();
    joint.set_contacts_enabled(false);

    commands
        .spawn((
            Hand::new(side),
            Transform::from_translation((spawn + socket).extend(0.0)),
            RigidBody::KinematicPositionBased,
            Velocity::zero(),
            Sleeping::default(),
            Collider::ball(config.hand_radius),
            rig_groups(),
            ImpulseJoint::new(anchor, joint),
        ))
        .id()
}
