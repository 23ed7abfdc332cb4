//! Collision Layers Constants
//!
//! Physics layers тайлового мира — centralised constants для всего проекта.
//!
//! ## Архитектура:
//! - **Layers (битовая маска):** На каком слое находится объект
//! - **Mask (битовая маска):** С какими слоями объект коллидирует
//!
//! ## Layers (1-32):
//! - Layer 1 (0b1 = 1): Player (тело, рига, руки)
//! - Layer 2 (0b10 = 2): Ground (обычные тайлы земли)
//! - Layer 3 (0b100 = 4): Cliffs (скалы, за которые можно цепляться)
//! - Layer 4 (0b1000 = 8): Ice Cliffs (hazard)
//!
//! Ключевой контракт: персонаж и рига НИКОГДА не коллидируют со льдом.
//! Лёд обнаруживается только query-проверками (circle overlap у рук,
//! sensor rays у тела), иначе персонаж "стоял" бы на льду вместо
//! соскальзывания.

use bevy_rapier2d::prelude::{CollisionGroups, Group};

// ============================================================================
// Layer битовые маски (на каком слое объект находится)
// ============================================================================

/// Layer 1: Player (body, anchor, hands)
pub const LAYER_PLAYER: u32 = 0b1; // 1

/// Layer 2: Ground (walkable тайлы)
pub const LAYER_GROUND: u32 = 0b10; // 2

/// Layer 3: Cliffs (climbable тайлы)
pub const LAYER_CLIFFS: u32 = 0b100; // 4

/// Layer 4: Ice Cliffs (hazard, только для queries)
pub const LAYER_ICE: u32 = 0b1000; // 8

// ============================================================================
// Mask битовые маски (с чем объект коллидирует / что видит query)
// ============================================================================

/// Mask: за что можно цепляться руками (Ground | Cliffs)
///
/// Используется ray query при resolve точки захвата.
pub const CLIMBABLE_MASK: u32 = LAYER_GROUND | LAYER_CLIFFS; // 6

/// Mask: hazard query у рук (только лёд)
pub const ICE_MASK: u32 = LAYER_ICE; // 8

/// Mask: все твёрдые тайлы (sensor rays тела видят и лёд)
pub const SOLID_MASK: u32 = LAYER_GROUND | LAYER_CLIFFS | LAYER_ICE; // 14

// ============================================================================
// Helper Functions
// ============================================================================

/// CollisionGroups для тела персонажа (kinematic capsule)
///
/// Коллидирует с Ground + Cliffs, лёд исключён из маски.
pub fn body_groups() -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(LAYER_PLAYER),
        Group::from_bits_truncate(CLIMBABLE_MASK),
    )
}

/// CollisionGroups для риги и рук (dynamic тела constraint-рига)
///
/// Та же маска что у тела: лазание по льду невозможно физически.
pub fn rig_groups() -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(LAYER_PLAYER),
        Group::from_bits_truncate(CLIMBABLE_MASK),
    )
}

/// CollisionGroups для collider'а твёрдого тайла
///
/// Membership = физические слои самого тайла, маска = игрок.
pub fn tile_groups(layer_bits: u32) -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(layer_bits),
        Group::from_bits_truncate(LAYER_PLAYER),
    )
}

/// Получить название слоя для debug логов
pub fn get_layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        LAYER_PLAYER => "Player",
        LAYER_GROUND => "Ground",
        LAYER_CLIFFS => "Cliffs",
        LAYER_ICE => "Ice",
        _ => "Unknown",
    }
}
