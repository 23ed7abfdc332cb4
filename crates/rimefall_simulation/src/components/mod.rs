//! ECS Components персонажа
//!
//! Организация по доменам:
//! - body: kinematic тело (tuning ходьбы, custom velocity, sensor rays)
//! - climb: constraint-рига (anchor, руки, захваты, ice-slip cooldown)

pub mod body;
pub mod climb;


// Re-exports для удобного импорта
pub use body::*;
pub use climb::*;
