//! Terrain sensor: классификация тайлов + hazard/climbable queries
//!
//! Тайловый мир живёт в `TerrainMap` resource. Каждая клетка несёт пару
//! (terrain_set, terrain) для классификации и битовую маску physics-слоёв
//! для queries. Все операции — чистые point-in-time запросы к снепшоту
//! мира текущего тика, без side effects.
//!
//! Твёрдые клетки можно материализовать как rapier colliders
//! (`spawn_solid_colliders`) — их видит solver constraint-риги. Лёд
//! collider'а не получает никогда: он существует только для queries.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, RigidBody};
use std::collections::HashMap;

use crate::collision_layers::{tile_groups, CLIMBABLE_MASK, LAYER_CLIFFS, LAYER_GROUND, LAYER_ICE, SOLID_MASK};

/// Terrain label: клетка есть, но terrain-данные некорректны
pub const TERRAIN_UNRECOGNIZED: &str = "Unrecognized tile type";

/// Terrain label: клетки по координате нет
pub const TERRAIN_EMPTY: &str = "Empty";

pub const TERRAIN_GROUND: &str = "Ground";
pub const TERRAIN_CLIFFS: &str = "Cliffs";

/// Hazard terrain: контакт во время лазания форсит срыв
pub const HAZARD_TERRAIN: &str = "Icy Cliff";

/// Одна клетка тайлового слоя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCell {
    /// Индекс terrain-набора (< 0 — данные некорректны)
    pub terrain_set: i32,
    /// Индекс terrain внутри набора (< 0 — данные некорректны)
    pub terrain: i32,
    /// Physics-слои клетки (см. collision_layers)
    pub layers: u32,
}

impl TileCell {
    pub fn ground() -> Self {
        Self { terrain_set: 0, terrain: 0, layers: LAYER_GROUND }
    }

    pub fn cliff() -> Self {
        Self { terrain_set: 0, terrain: 1, layers: LAYER_CLIFFS }
    }

    pub fn ice() -> Self {
        Self { terrain_set: 0, terrain: 2, layers: LAYER_ICE }
    }
}

/// Результат классификации точки мира (transient, не персистится)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainSample {
    pub map_coords: IVec2,
    pub terrain: String,
}

/// Тайловый слой мира
///
/// `scale` повторяет масштаб слоя сцены: координата клетки считается в два
/// прохода — сперва floor по tile_size, затем floor по scale.
#[derive(Resource, Debug, Clone)]
pub struct TerrainMap {
    pub tile_size: f32,
    pub scale: f32,
    terrain_sets: Vec<Vec<String>>,
    cells: HashMap<IVec2, TileCell>,
}

impl Default for TerrainMap {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            scale: 1.0,
            terrain_sets: vec![vec![
                TERRAIN_GROUND.to_string(),
                TERRAIN_CLIFFS.to_string(),
                HAZARD_TERRAIN.to_string(),
            ]],
            cells: HashMap::new(),
        }
    }
}

impl TerrainMap {
    /// Размер клетки в мировых координатах
    pub fn cell_size(&self) -> f32 {
        self.tile_size * self.scale
    }

    pub fn set_cell(&mut self, coords: IVec2, cell: TileCell) {
        self.cells.insert(coords, cell);
    }

    pub fn clear_cell(&mut self, coords: IVec2) {
        self.cells.remove(&coords);
    }

    /// Заполнить прямоугольник клеток одним типом (удобно для уровней и тестов)
    pub fn fill_rect(&mut self, min: IVec2, max: IVec2, cell: TileCell) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                self.set_cell(IVec2::new(x, y), cell);
            }
        }
    }

    pub fn cell(&self, coords: IVec2) -> Option<&TileCell> {
        self.cells.get(&coords)
    }

    pub fn terrain_name(&self, set: i32, terrain: i32) -> Option<&str> {
        self.terrain_sets
            .get(set as usize)
            .and_then(|names| names.get(terrain as usize))
            .map(|s| s.as_str())
    }

    /// Классифицировать точку мира в (map coords, terrain label)
    ///
    /// Политика: оба индекса неотрицательны → имя terrain из набора;
    /// любой отрицателен → "Unrecognized tile type"; клетки нет → "Empty".
    pub fn classify(&self, world_point: Vec2) -> TerrainSample {
        let coarse = (world_point / self.tile_size).floor().as_ivec2();
        let map_coords = (coarse.as_vec2() / self.scale).floor().as_ivec2();

        let terrain = match self.cells.get(&map_coords) {
            Some(cell) if cell.terrain_set >= 0 && cell.terrain >= 0 => self
                .terrain_name(cell.terrain_set, cell.terrain)
                .unwrap_or(TERRAIN_UNRECOGNIZED)
                .to_string(),
            Some(_) => TERRAIN_UNRECOGNIZED.to_string(),
            None => TERRAIN_EMPTY.to_string(),
        };

        TerrainSample { map_coords, terrain }
    }

    fn cell_at_point(&self, point: Vec2) -> IVec2 {
        (point / self.cell_size()).floor().as_ivec2()
    }

    fn cell_matches(&self, coords: IVec2, mask: u32) -> bool {
        self.cells
            .get(&coords)
            .map(|cell| cell.layers & mask != 0)
            .unwrap_or(false)
    }

    fn sample_at(&self, coords: IVec2) -> TerrainSample {
        let terrain = match self.cells.get(&coords) {
            Some(cell) if cell.terrain_set >= 0 && cell.terrain >= 0 => self
                .terrain_name(cell.terrain_set, cell.terrain)
                .unwrap_or(TERRAIN_UNRECOGNIZED)
                .to_string(),
            Some(_) => TERRAIN_UNRECOGNIZED.to_string(),
            None => TERRAIN_EMPTY.to_string(),
        };
        TerrainSample { map_coords: coords, terrain }
    }

    /// Точка лежит в клетке с любым из слоёв `mask`
    pub fn is_solid_at(&self, point: Vec2, mask: u32) -> bool {
        self.cell_matches(self.cell_at_point(point), mask)
    }

    /// Shape-overlap query: окружность против клеток со слоями `mask`
    ///
    /// Достаточно первого пересечения, полный список не собираем.
    pub fn circle_overlaps(&self, center: Vec2, radius: f32, mask: u32) -> bool {
        let cs = self.cell_size();
        let min = ((center - Vec2::splat(radius)) / cs).floor().as_ivec2();
        let max = ((center + Vec2::splat(radius)) / cs).floor().as_ivec2();

        for x in min.x..=max.x {
            for y in min.y..=max.y {
                let coords = IVec2::new(x, y);
                if !self.cell_matches(coords, mask) {
                    continue;
                }
                // ближайшая к центру точка AABB клетки
                let cell_min = coords.as_vec2() * cs;
                let closest = center.clamp(cell_min, cell_min + Vec2::splat(cs));
                if closest.distance_squared(center) <= radius * radius {
                    return true;
                }
            }
        }

        false
    }

    /// Ray query по сетке (Amanatides-Woo): первая клетка со слоями `mask`
    ///
    /// Возвращает точку входа луча в клетку и её классификацию.
    /// Нет пересечений на отрезке — `None`: это нормальный исход, не ошибка.
    pub fn ray_terrain(&self, from: Vec2, to: Vec2, mask: u32) -> Option<(Vec2, TerrainSample)> {
        let cs = self.cell_size();
        let mut cell = self.cell_at_point(from);

        // луч стартует внутри подходящей клетки
        if self.cell_matches(cell, mask) {
            return Some((from, self.sample_at(cell)));
        }

        let delta = to - from;
        if delta.length_squared() <= f32::EPSILON {
            return None;
        }

        let step_x: i32 = if delta.x >= 0.0 { 1 } else { -1 };
        let step_y: i32 = if delta.y >= 0.0 { 1 } else { -1 };

        let boundary = |index: i32, step: i32| -> f32 {
            if step > 0 {
                (index + 1) as f32 * cs
            } else {
                index as f32 * cs
            }
        };

        let mut t_max_x = if delta.x != 0.0 {
            (boundary(cell.x, step_x) - from.x) / delta.x
        } else {
            f32::INFINITY
        };
        let mut t_max_y = if delta.y != 0.0 {
            (boundary(cell.y, step_y) - from.y) / delta.y
        } else {
            f32::INFINITY
        };
        let t_delta_x = if delta.x != 0.0 { cs / delta.x.abs() } else { f32::INFINITY };
        let t_delta_y = if delta.y != 0.0 { cs / delta.y.abs() } else { f32::INFINITY };

        loop {
            let t_entry;
            if t_max_x < t_max_y {
                t_entry = t_max_x;
                t_max_x += t_delta_x;
                cell.x += step_x;
            } else {
                t_entry = t_max_y;
                t_max_y += t_delta_y;
                cell.y += step_y;
            }

            if t_entry > 1.0 {
                return None;
            }
            if self.cell_matches(cell, mask) {
                return Some((from + delta * t_entry, self.sample_at(cell)));
            }
        }
    }

    /// Fixed ray проверка: луч упирается в твёрдую клетку и её terrain — hazard
    pub fn ray_hits_hazard(&self, from: Vec2, to: Vec2) -> bool {
        match self.ray_terrain(from, to, SOLID_MASK) {
            Some((_, sample)) => sample.terrain == HAZARD_TERRAIN,
            None => false,
        }
    }

    /// Материализовать твёрдые (climbable) клетки как fixed cuboid colliders
    ///
    /// Лёд намеренно пропускается: hazard-клетки видят только queries.
    /// Возвращает число заспавненных collider'ов.
    pub fn spawn_solid_colliders(&self, commands: &mut Commands) -> usize {
        let cs = self.cell_size();
        let half = cs / 2.0;
        let mut count = 0;

        for (coords, cell) in &self.cells {
            let solid = cell.layers & CLIMBABLE_MASK;
            if solid == 0 {
                continue;
            }
            let center = coords.as_vec2() * cs + Vec2::splat(half);
            commands.spawn((
                Transform::from_translation(center.extend(0.0)),
                RigidBody::Fixed,
                Collider::cuboid(half, half),
                tile_groups(solid),
            ));
            count += 1;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision_layers::ICE_MASK;

    fn map_with(cells: &[(IVec2, TileCell)]) -> TerrainMap {
        let mut map = TerrainMap::default();
        for (coords, cell) in cells {
            map.set_cell(*coords, *cell);
        }
        map
    }

    #[test]
    fn test_classify_known_terrain() {
        let map = map_with(&[(IVec2::new(2, 3), TileCell::cliff())]);
        // клетка (2,3) покрывает мировые координаты [32..48) x [48..64)
        let sample = map.classify(Vec2::new(40.0, 50.0));
        assert_eq!(sample.map_coords, IVec2::new(2, 3));
        assert_eq!(sample.terrain, TERRAIN_CLIFFS);
    }

    #[test]
    fn test_classify_empty_and_unrecognized() {
        let mut map = map_with(&[]);
        assert_eq!(map.classify(Vec2::new(5.0, 5.0)).terrain, TERRAIN_EMPTY);

        map.set_cell(
            IVec2::new(0, 0),
            TileCell { terrain_set: -1, terrain: 0, layers: LAYER_GROUND },
        );
        assert_eq!(map.classify(Vec2::new(5.0, 5.0)).terrain, TERRAIN_UNRECOGNIZED);

        map.set_cell(
            IVec2::new(0, 0),
            TileCell { terrain_set: 0, terrain: -2, layers: LAYER_GROUND },
        );
        assert_eq!(map.classify(Vec2::new(5.0, 5.0)).terrain, TERRAIN_UNRECOGNIZED);
    }

    #[test]
    fn test_classify_negative_coords() {
        let map = map_with(&[(IVec2::new(-1, -1), TileCell::ground())]);
        let sample = map.classify(Vec2::new(-0.5, -0.5));
        assert_eq!(sample.map_coords, IVec2::new(-1, -1));
        assert_eq!(sample.terrain, TERRAIN_GROUND);
    }

    #[test]
    fn test_ray_hits_cell_at_entry_point() {
        // колонна скалы в клетке (0,4): мир [0..16) x [64..80)
        let map = map_with(&[(IVec2::new(0, 4), TileCell::cliff())]);
        let hit = map.ray_terrain(Vec2::new(8.0, 40.0), Vec2::new(8.0, 90.0), CLIMBABLE_MASK);
        let (point, sample) = hit.expect("ray must hit the cliff cell");
        assert_eq!(point, Vec2::new(8.0, 64.0));
        assert_eq!(sample.terrain, TERRAIN_CLIFFS);
    }

    #[test]
    fn test_ray_miss_is_none() {
        let map = map_with(&[(IVec2::new(10, 10), TileCell::cliff())]);
        assert!(map
            .ray_terrain(Vec2::new(8.0, 40.0), Vec2::new(8.0, 90.0), CLIMBABLE_MASK)
            .is_none());
    }

    #[test]
    fn test_ray_respects_mask() {
        // лёд не считается climbable, но виден SOLID_MASK
        let map = map_with(&[(IVec2::new(0, 4), TileCell::ice())]);
        assert!(map
            .ray_terrain(Vec2::new(8.0, 40.0), Vec2::new(8.0, 90.0), CLIMBABLE_MASK)
            .is_none());
        assert!(map.ray_hits_hazard(Vec2::new(8.0, 40.0), Vec2::new(8.0, 90.0)));
    }

    #[test]
    fn test_ray_hazard_blocked_by_ground_first() {
        // земля ближе льда: луч упирается в Ground, hazard не срабатывает
        let map = map_with(&[
            (IVec2::new(0, 3), TileCell::ground()),
            (IVec2::new(0, 4), TileCell::ice()),
        ]);
        assert!(!map.ray_hits_hazard(Vec2::new(8.0, 40.0), Vec2::new(8.0, 90.0)));
    }

    #[test]
    fn test_circle_overlap_first_hit() {
        let map = map_with(&[(IVec2::new(1, 0), TileCell::ice())]);
        // клетка льда: [16..32) x [0..16); рука в 3px от края
        assert!(map.circle_overlaps(Vec2::new(13.0, 8.0), 4.0, ICE_MASK));
        assert!(!map.circle_overlaps(Vec2::new(8.0, 8.0), 4.0, ICE_MASK));
        // маска фильтрует: climbable-query лёд не видит
        assert!(!map.circle_overlaps(Vec2::new(13.0, 8.0), 4.0, CLIMBABLE_MASK));
    }

    #[test]
    fn test_diagonal_ray_walks_cells() {
        let map = map_with(&[(IVec2::new(2, 2), TileCell::cliff())]);
        // диагональ из (8,8) в (40,40) проходит клетки (0,0),(1,1),(2,2)
        let hit = map.ray_terrain(Vec2::new(8.0, 8.0), Vec2::new(40.0, 40.0), CLIMBABLE_MASK);
        let (point, sample) = hit.expect("diagonal ray must reach (2,2)");
        assert_eq!(sample.map_coords, IVec2::new(2, 2));
        assert!((point - Vec2::new(32.0, 32.0)).length() < 1.0e-3);
    }
}
