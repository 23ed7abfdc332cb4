//! Компоненты constraint-риги: anchor, руки, захваты, ice-slip cooldown

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Сторона руки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub fn opposite(&self) -> HandSide {
        match self {
            HandSide::Left => HandSide::Right,
            HandSide::Right => HandSide::Left,
        }
    }
}

/// Вертикальное направление захвата
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum GrabDirection {
    Up,
    Down,
}

/// Рука персонажа (dynamic тело, цепляется за мир joint'ом)
///
/// Рука владеет максимум одним world anchor'ом. Инвариант: `grabbing`
/// истинно ⇔ `grab_anchor` указывает на живую entity якоря.
#[derive(Component, Debug, Clone)]
pub struct Hand {
    pub side: HandSide,
    pub grabbing: bool,
    /// Ephemeral world anchor (entity: fixed body + joint к руке)
    pub grab_anchor: Option<Entity>,
}

impl Hand {
    pub fn new(side: HandSide) -> Self {
        Self { side, grabbing: false, grab_anchor: None }
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }
}

/// Ephemeral world anchor захвата
///
/// Entity несёт fixed body в точке захвата и revolute joint к руке;
/// despawn уничтожает оба разом — утечка joint'а невозможна.
#[derive(Component, Debug, Clone, Copy)]
pub struct GrabAnchor {
    pub hand: Entity,
}

/// Режим риги
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AnchorMode {
    /// Kinematic-зеркало тела: transform копируется, velocity ноль
    #[default]
    Mirror,
    /// Свободное dynamic тело, тянут только joint'ы захватов
    Dynamic,
}

/// Рига (anchor): второе физическое тело персонажа
///
/// В Mirror зеркалит тело, в Dynamic ведёт его. Sockets — локальные
/// позиции постоянных pin joint'ов рук.
#[derive(Component, Debug, Clone)]
pub struct ClimbAnchor {
    pub mode: AnchorMode,
    /// Socket левой руки (локально к риге)
    pub left_socket: Vec2,
    /// Socket правой руки (локально к риге)
    pub right_socket: Vec2,
    /// Dead zone сравнения высот рук (px, против мерцания кадра)
    pub hand_height_dead_zone: f32,
    /// Offset точки захвата вверх (от текущей позиции руки)
    pub grab_up_offset: Vec2,
    /// Offset точки захвата вниз
    pub grab_down_offset: Vec2,
}

impl Default for ClimbAnchor {
    fn default() -> Self {
        Self {
            mode: AnchorMode::Mirror,
            left_socket: Vec2::new(-10.0, 12.0),
            right_socket: Vec2::new(10.0, 12.0),
            hand_height_dead_zone: 3.0,
            grab_up_offset: Vec2::new(0.0, 50.0),
            grab_down_offset: Vec2::new(0.0, -20.0),
        }
    }
}

impl ClimbAnchor {
    pub fn socket(&self, side: HandSide) -> Vec2 {
        match side {
            HandSide::Left => self.left_socket,
            HandSide::Right => self.right_socket,
        }
    }

    pub fn grab_offset(&self, direction: GrabDirection) -> Vec2 {
        match direction {
            GrabDirection::Up => self.grab_up_offset,
            GrabDirection::Down => self.grab_down_offset,
        }
    }
}

/// Ice-slip состояние персонажа
///
/// Cooldown форсит короткое падение после соскальзывания, прежде чем
/// снова разрешить лазание. `just_slipped` — edge-флаг, чтобы один
/// продолжительный контакт не порождал срыв каждый тик.
#[derive(Component, Debug, Clone)]
pub struct IceSlip {
    cooldown_remaining: f32,
    pub cooldown_duration: f32,
    pub just_slipped: bool,
}

impl Default for IceSlip {
    fn default() -> Self {
        Self {
            cooldown_remaining: 0.0,
            cooldown_duration: 2.0,
            just_slipped: false,
        }
    }
}

impl IceSlip {
    pub fn with_duration(duration: f32) -> Self {
        Self { cooldown_duration: duration, ..Default::default() }
    }

    /// Запустить cooldown; no-op если уже бежит (таймер не рестартуем)
    pub fn start_cooldown(&mut self) {
        if !self.is_cooldown_stopped() {
            return;
        }
        self.cooldown_remaining = self.cooldown_duration;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - delta).max(0.0);
        }
    }

    pub fn is_cooldown_stopped(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }
}
