//! Компоненты kinematic тела персонажа

use bevy::prelude::*;

use crate::components::climb::HandSide;

/// Kinematic тело персонажа (ведёт движение в режиме BodyLeads)
///
/// Tuning ходьбы/бега/прыжка + флаги контакта с полом. Ось Y направлена
/// вверх: прыжок — положительная скорость, гравитация — отрицательная.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CharacterBody {
    /// Скорость ходьбы (px/s)
    pub walk_speed: f32,
    /// Скорость бега при speed-boost (px/s)
    pub run_speed: f32,
    /// Горизонтальное ускорение move-toward (px/s²)
    pub acceleration: f32,
    /// Начальная скорость прыжка (px/s, вверх)
    pub jump_velocity: f32,
    /// Гравитация (px/s², прикладывается вниз)
    pub gravity: f32,
    /// Половина высоты capsule (до "ступней")
    pub half_height: f32,
    /// Точка respawn в мировых координатах
    pub spawn_position: Vec2,
    /// Тело едет за ригой (пассажир, не коллайдер)
    pub following: bool,
    /// Контакт с полом на текущем тике
    pub on_floor: bool,
    /// Контакт с полом на прошлом тике (для landed edge)
    pub was_on_floor: bool,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            walk_speed: 100.0,
            run_speed: 300.0,
            acceleration: 2000.0,
            jump_velocity: 400.0,
            gravity: 980.0,
            half_height: 14.0,
            spawn_position: Vec2::new(0.0, 2000.0),
            following: false,
            on_floor: false,
            was_on_floor: false,
        }
    }
}

/// Custom velocity тела (интегрируем сами, rapier только для коллизий)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
}

/// Входные данные движения за текущий тик
///
/// Заполняется внешним input-глю каждый физический тик. `jump` — уже
/// edge-triggered (true только на тике нажатия), `speed_boost` — held.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MoveInput {
    /// Направление движения, две оси в [-1, 1]
    pub direction: Vec2,
    pub jump: bool,
    pub speed_boost: bool,
}

/// Фиксированные sensor rays тела (локальные отрезки origin → target)
///
/// Тело не коллидирует со льдом физически, поэтому стояние на льду
/// обнаруживают эти лучи. Четыре луча вниз от ступней.
#[derive(Component, Debug, Clone)]
pub struct SensorRays {
    pub rays: Vec<(Vec2, Vec2)>,
}

impl Default for SensorRays {
    fn default() -> Self {
        let reach = -20.0;
        Self {
            rays: vec![
                (Vec2::new(-9.0, 0.0), Vec2::new(-9.0, reach)),
                (Vec2::new(-3.0, 0.0), Vec2::new(-3.0, reach)),
                (Vec2::new(3.0, 0.0), Vec2::new(3.0, reach)),
                (Vec2::new(9.0, 0.0), Vec2::new(9.0, reach)),
            ],
        }
    }
}

/// Валидированные ссылки на части риги персонажа
///
/// Создаётся только spawn-хелпером: ссылки существуют всегда, никакого
/// "resolve по имени" в рантайме.
#[derive(Component, Debug, Clone, Copy)]
pub struct CharacterRig {
    pub anchor: Entity,
    pub left_hand: Entity,
    pub right_hand: Entity,
}

impl CharacterRig {
    pub fn hand(&self, side: HandSide) -> Entity {
        match side {
            HandSide::Left => self.left_hand,
            HandSide::Right => self.right_hand,
        }
    }

    pub fn hands(&self) -> [Entity; 2] {
        [self.left_hand, self.right_hand]
    }
}

/// Единственный владелец режима управления персонажем
///
/// BodyLeads: kinematic тело интегрирует ходьбу, рига зеркалит его.
/// AnchorLeads: рига — свободное dynamic тело под joint'ами захватов,
/// тело копирует её transform. Все переходы проходят через follow-системы,
/// флаги тела/риги/рук не живут своей жизнью.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum ControlMode {
    #[default]
    BodyLeads,
    AnchorLeads,
}
