//! Rimefall Simulation Core
//!
//! ECS-симуляция гибридного locomotion/climbing контроллера на Bevy 0.16.
//! Персонаж живёт в двух взаимоисключающих режимах: kinematic тело ведёт
//! ходьбу/бег/прыжки (BodyLeads), либо constraint-рига тянет персонажа за
//! захваты рук (AnchorLeads). Лёд — hazard: контакт во время лазания
//! срывает захваты и запускает cooldown.
//!
//! Rendering, реальный input и показ debug-текста — внешние коллабораторы:
//! общение только через events/resources этого crate.

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier2d::prelude::{NoUserData, RapierPhysicsPlugin};

// Публичные модули
pub mod animation;
pub mod climbing;
pub mod collision_layers;
pub mod components;
pub mod input;
pub mod locomotion;
pub mod logger;
pub mod player;
pub mod terrain;

// Re-export базовых типов для удобства
pub use animation::{climb_frame, ground_pose, Pose, PoseHint};
pub use climbing::{resolve_grab_target, ClimbingPlugin, HAND_ICE_DETECTION_RADIUS};
pub use components::*;
pub use input::{GrabPressed, GrabReleased, RespawnPressed};
pub use locomotion::{DebugText, LocomotionPlugin};
pub use logger::init_logger;
pub use player::{spawn_player, PlayerConfig, PlayerHandles};
pub use terrain::{TerrainMap, TerrainSample, TileCell, HAZARD_TERRAIN};

/// Частота фиксированного тика симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Масштаб rapier: мир считаем в пикселях
pub const PIXELS_PER_METER: f32 = 100.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            // Пустая карта по умолчанию (host подкладывает уровень)
            .init_resource::<TerrainMap>()
            // Rapier в фиксированном расписании: joints риги и коллизии тайлов
            .add_plugins(
                RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(PIXELS_PER_METER)
                    .in_fixed_schedule(),
            )
            // Подсистемы
            .add_plugins((ClimbingPlugin, LocomotionPlugin));
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(TransformPlugin)
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));

    app
}

/// Прогнать ровно один фиксированный тик симуляции
///
/// Generic Time двигаем на период вручную, поэтому прогон не зависит от
/// wall-clock: тесты и headless runner детерминированы по числу тиков.
pub fn step_simulation(app: &mut App) {
    let period = app.world().resource::<Time<Fixed>>().timestep();
    app.world_mut().resource_mut::<Time>().advance_by(period);
    app.world_mut().run_schedule(FixedUpdate);
    // physics step живёт в FixedPostUpdate; схемы без него просто пропускаем
    let _ = app.world_mut().try_run_schedule(FixedPostUpdate);
}

/// Debug-снепшот компонентов мира для сравнения прогонов
///
/// Сортируем по Entity ID: порядок итерации query недетерминирован.
pub fn snapshot_components<T: Component + std::fmt::Debug>(world: &mut World) -> String {
    let mut query = world.query::<(Entity, &T)>();
    let mut entries: Vec<_> = query
        .iter(world)
        .map(|(entity, component)| (entity.index(), format!("{:?}", component)))
        .collect();
    entries.sort_by_key(|(index, _)| *index);

    entries
        .into_iter()
        .map(|(index, line)| format!("{} {}\n", index, line))
        .collect()
}
