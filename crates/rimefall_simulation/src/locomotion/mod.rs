//! Kinematic ходьба/бег/прыжок (режим BodyLeads)
//!
//! Custom velocity интеграция в духе move-toward: rapier здесь только для
//! коллизий риги, тело двигаем сами и фиксируем на верхней грани тайла.
//! Заодно система публикует pose hints аниматору и одну debug-строку
//! за тик во внешний sink.

use bevy::prelude::*;
use bevy_rapier2d::prelude::PhysicsSet;

use crate::animation::{ground_pose, PoseHint};
use crate::collision_layers::CLIMBABLE_MASK;
use crate::components::{CharacterBody, IceSlip, MoveInput, PhysicsBody, SensorRays};
use crate::terrain::TerrainMap;

/// Одна free-text debug-строка за тик (отображение — забота host'а)
#[derive(Resource, Debug, Default)]
pub struct DebugText {
    pub line: String,
}

/// Аналог Mathf.MoveToward: шаг к цели не длиннее max_delta
fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Система: интеграция ходьбы kinematic тела
///
/// Пока ведёт рига (`following`), тело не интегрирует ничего — его
/// transform пишет follow-система. Sensor rays тела здесь ловят стояние
/// на льду и запускают cooldown без смены режима.
pub fn walk_body(
    time: Res<Time<Fixed>>,
    terrain: Res<TerrainMap>,
    mut debug: ResMut<DebugText>,
    mut poses: EventWriter<PoseHint>,
    mut bodies: Query<(
        Entity,
        &mut CharacterBody,
        &mut PhysicsBody,
        &mut Transform,
        &MoveInput,
        &SensorRays,
        &mut IceSlip,
    )>,
) {
    let delta = time.delta_secs();

    for (entity, mut body, mut physics, mut transform, input, rays, mut slip) in bodies.iter_mut() {
        if body.following {
            continue;
        }

        let mut position = transform.translation.truncate();
        let mut velocity = physics.velocity;

        let feet = position - Vec2::new(0.0, body.half_height);
        let on_floor =
            velocity.y <= 0.0 && terrain.is_solid_at(feet - Vec2::new(0.0, 1.0), CLIMBABLE_MASK);
        let landed = !body.was_on_floor && on_floor;
        let start_jumping = input.jump && on_floor;

        // горизонталь: move-toward к walk/run скорости
        let target_speed =
            input.direction.x * if input.speed_boost { body.run_speed } else { body.walk_speed };
        velocity.x = move_toward(velocity.x, target_speed, body.acceleration * delta);

        // вертикаль: гравитация в воздухе, прыжок только с пола
        if !on_floor {
            velocity.y -= body.gravity * delta;
        } else if velocity.y < 0.0 {
            velocity.y = 0.0;
        }
        if start_jumping {
            velocity.y = body.jump_velocity;
        }

        // интеграция + фиксация ступней на верхней грани тайла
        position += velocity * delta;
        if velocity.y <= 0.0 {
            let new_feet = position - Vec2::new(0.0, body.half_height);
            if terrain.is_solid_at(new_feet, CLIMBABLE_MASK) {
                let cell_size = terrain.cell_size();
                let cell_top = ((new_feet.y / cell_size).floor() + 1.0) * cell_size;
                position.y = cell_top + body.half_height;
                velocity.y = 0.0;
            }
        }

        // стояние на льду: лучи тела запускают cooldown и в BodyLeads
        let on_ice = rays
            .rays
            .iter()
            .any(|(from, to)| terrain.ray_hits_hazard(position + *from, position + *to));
        if on_ice {
            slip.start_cooldown();
        }

        let pose = ground_pose(velocity, on_floor, start_jumping, landed, input.speed_boost);
        poses.write(PoseHint { entity, pose, facing_left: input.direction.x < 0.0 });

        debug.line = format!(
            "Velocity: ({:.1}, {:.1}), IsOnFloor: {}, Pose: {:?}",
            velocity.x, velocity.y, on_floor, pose
        );

        physics.velocity = velocity;
        transform.translation = position.extend(0.0);
        body.on_floor = on_floor;
        body.was_on_floor = on_floor;
    }
}

/// Plugin наземного движения
///
/// Ходьба встаёт между reconciler'ом режима и зеркалированием риги:
/// переходы этого тика уже применены, рига зеркалит свежий transform.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PoseHint>().init_resource::<DebugText>();

        app.add_systems(
            FixedUpdate,
            walk_body
                .after(crate::climbing::follow::sync_follow_mode)
                .before(crate::climbing::follow::mirror_anchor)
                .before(PhysicsSet::SyncBackend),
        );
    }
}
