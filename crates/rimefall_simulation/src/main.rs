//! Headless прогон Rimefall
//!
//! Сценарий: дойти до скалы, залезть, чередуя руки, упереться в ледяную
//! шапку и сорваться. Прогресс печатается раз в секунду симуляции.

use bevy::prelude::*;
use rimefall_simulation::*;

fn main() {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);
    // один пустой update: стартовые схемы инициализируют physics context
    app.update();

    // Уровень: пол, колонна скалы, ледяная шапка сверху
    let mut map = TerrainMap::default();
    map.fill_rect(IVec2::new(-4, -1), IVec2::new(24, -1), TileCell::ground());
    map.fill_rect(IVec2::new(12, 0), IVec2::new(12, 9), TileCell::cliff());
    map.fill_rect(IVec2::new(12, 10), IVec2::new(12, 12), TileCell::ice());
    app.insert_resource(map.clone());

    let (player, tiles) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let tiles = map.spawn_solid_colliders(&mut commands);

        let mut config = PlayerConfig::default();
        config.body.spawn_position = Vec2::new(80.0, 14.0);
        let player = spawn_player(&mut commands, config);
        (player, tiles)
    };
    app.world_mut().flush();

    println!("Starting rimefall headless simulation ({} solid tiles)", tiles);

    for tick in 0..900u32 {
        script_inputs(&mut app, player.body, tick);
        step_simulation(&mut app);

        if tick % 60 == 0 {
            let mode = app
                .world()
                .entity(player.body)
                .get::<ControlMode>()
                .copied()
                .unwrap_or_default();
            let debug = app.world().resource::<DebugText>();
            println!("Tick {}: mode {:?} | {}", tick, mode, debug.line);
        }
    }

    println!("Simulation complete!");
}

/// Скриптованный input: ходьба вправо, затем лазание с чередованием рук
fn script_inputs(app: &mut App, body: Entity, tick: u32) {
    let world = app.world_mut();

    if let Some(mut input) = world.entity_mut(body).get_mut::<MoveInput>() {
        input.direction = if tick < 120 { Vec2::new(1.0, 0.0) } else { Vec2::ZERO };
        input.jump = false;
        input.speed_boost = false;
    }

    match tick {
        // первый захват — на месте, дальше тянемся вверх попеременно
        120 | 240 | 360 | 480 => {
            world.send_event(GrabPressed {
                entity: body,
                side: HandSide::Left,
                direction: GrabDirection::Up,
            });
        }
        180 | 300 | 420 | 540 => {
            world.send_event(GrabPressed {
                entity: body,
                side: HandSide::Right,
                direction: GrabDirection::Up,
            });
        }
        840 => {
            world.send_event(RespawnPressed { entity: body });
        }
        _ => {}
    }
}
