//! Pose hints для animation-коллаборатора
//!
//! Симуляция не проигрывает спрайты — она только сообщает, какую позу
//! сейчас имеет смысл показывать. Подбор анимаций, speed scale и
//! дедупликация повторов — на стороне аниматора.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Именованная поза персонажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    Idle,
    Walk,
    Run,
    Jump,
    Land,
    /// Лазание: дискретный кадр 0..=2 по взаимной высоте рук
    Climb { frame: u8 },
}

/// Event: подсказка позы за текущий тик
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PoseHint {
    pub entity: Entity,
    pub pose: Pose,
    /// Смотрит влево (по знаку горизонтального input'а)
    pub facing_left: bool,
}

/// Выбор наземной позы по состоянию тела
///
/// Приоритет как у аниматора: walk/run на полу, jump перекрывает land,
/// иначе idle.
pub fn ground_pose(velocity: Vec2, on_floor: bool, jumped: bool, landed: bool, boosting: bool) -> Pose {
    let is_idle = on_floor && !jumped && velocity.length() < 1.0;
    let is_walking = on_floor && !is_idle && !jumped && !boosting;
    let is_running = on_floor && !is_idle && !jumped && boosting;

    if is_walking {
        Pose::Walk
    } else if is_running {
        Pose::Run
    } else if jumped {
        Pose::Jump
    } else if landed {
        Pose::Land
    } else {
        Pose::Idle
    }
}

/// Кадр лазания по взаимной высоте рук (0..=2)
///
/// Dead zone в несколько пикселей гасит мерцание, когда руки почти
/// на одной высоте. Выше левая — 2, выше правая — 0, иначе 1.
pub fn climb_frame(left_height: f32, right_height: f32, dead_zone: f32) -> u8 {
    let left_higher = left_height > right_height + dead_zone;
    let right_higher = right_height > left_height + dead_zone;

    if left_higher {
        2
    } else if right_higher {
        0
    } else {
        1
    }
}
