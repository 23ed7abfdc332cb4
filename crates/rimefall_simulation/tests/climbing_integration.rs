//! Climbing integration tests
//!
//! Полный headless App, тик за тиком: захваты, переходы режима,
//! срыв на льду, respawn. Время двигаем вручную (`step_simulation`),
//! поэтому прогоны не зависят от wall-clock.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ColliderDisabled, RigidBody, Velocity};
use rimefall_simulation::*;

/// Пол под точкой спавна: клетки (-10..10, -1), мир y [-16..0)
fn floor_map() -> TerrainMap {
    let mut map = TerrainMap::default();
    map.fill_rect(IVec2::new(-10, -1), IVec2::new(10, -1), TileCell::ground());
    map
}

fn create_app(map: TerrainMap) -> App {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);
    app.insert_resource(map);
    // стартовые схемы (инициализация physics context)
    app.update();
    app
}

/// Spawn на полу: тело (0,14), ступни на верхней грани тайла
fn spawn_on_floor(app: &mut App) -> PlayerHandles {
    let world = app.world_mut();
    let handles = {
        let mut commands = world.commands();
        let mut config = PlayerConfig::default();
        config.body.spawn_position = Vec2::new(0.0, 14.0);
        config.ice_cooldown = 0.5;
        spawn_player(&mut commands, config)
    };
    world.flush();
    handles
}

fn mode(app: &App, body: Entity) -> ControlMode {
    app.world().entity(body).get::<ControlMode>().copied().expect("body has ControlMode")
}

fn is_grabbing(app: &App, hand: Entity) -> bool {
    app.world().entity(hand).get::<Hand>().expect("hand component").grabbing
}

fn grab_anchor_count(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut query = world.query::<&GrabAnchor>();
    query.iter(world).count()
}

fn grab_anchor_positions(app: &mut App) -> Vec<Vec2> {
    let world = app.world_mut();
    let mut query = world.query::<(&GrabAnchor, &Transform)>();
    query.iter(world).map(|(_, t)| t.translation.truncate()).collect()
}

fn hand_position(app: &App, hand: Entity) -> Vec2 {
    app.world().entity(hand).get::<Transform>().expect("hand transform").translation.truncate()
}

fn grab(app: &mut App, body: Entity, side: HandSide, direction: GrabDirection) {
    app.world_mut().send_event(GrabPressed { entity: body, side, direction });
}

fn release(app: &mut App, body: Entity, side: HandSide) {
    app.world_mut().send_event(GrabReleased { entity: body, side });
}

#[test]
fn test_first_grab_enters_anchor_leads() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    // рука в socket'е, противоположная свободна — захват на месте
    let expected = hand_position(&app, player.left_hand);
    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);

    assert!(is_grabbing(&app, player.left_hand));
    assert_eq!(mode(&app, player.body), ControlMode::AnchorLeads);

    let positions = grab_anchor_positions(&mut app);
    assert_eq!(positions.len(), 1, "exactly one world anchor after a grab");
    assert!((positions[0] - expected).length() < 1.0e-3);

    let body = app.world().entity(player.body);
    assert!(body.get::<CharacterBody>().expect("body").following);
    assert!(body.contains::<ColliderDisabled>(), "passenger body must not collide");
    assert!(matches!(
        app.world().entity(player.anchor).get::<RigidBody>(),
        Some(&RigidBody::Dynamic)
    ));
}

#[test]
fn test_release_last_grab_returns_to_body_leads() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    grab(&mut app, player.body, HandSide::Right, GrabDirection::Up);
    step_simulation(&mut app);
    assert_eq!(grab_anchor_count(&mut app), 2);

    // одна рука ещё держится — рига продолжает вести
    release(&mut app, player.body, HandSide::Left);
    step_simulation(&mut app);
    assert_eq!(mode(&app, player.body), ControlMode::AnchorLeads);
    assert_eq!(grab_anchor_count(&mut app), 1);

    // отпустили последнюю — возврат к kinematic телу в том же тике
    release(&mut app, player.body, HandSide::Right);
    step_simulation(&mut app);

    assert_eq!(mode(&app, player.body), ControlMode::BodyLeads);
    assert_eq!(grab_anchor_count(&mut app), 0);

    let body = app.world().entity(player.body);
    assert_eq!(body.get::<Transform>().expect("transform").rotation, Quat::IDENTITY);
    assert!(!body.contains::<ColliderDisabled>(), "collider re-enabled on exit");
    assert!(!body.get::<CharacterBody>().expect("body").following);

    let anchor = app.world().entity(player.anchor);
    assert!(matches!(anchor.get::<RigidBody>(), Some(&RigidBody::KinematicPositionBased)));
    assert_eq!(anchor.get::<ClimbAnchor>().expect("anchor").mode, AnchorMode::Mirror);
}

#[test]
fn test_rapid_regrab_keeps_single_anchor() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    // два события одной руке в одном тике: старый якорь умирает первым
    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    assert_eq!(grab_anchor_count(&mut app), 1);
    assert!(is_grabbing(&app, player.left_hand));

    // и повторные захваты по тику — тоже максимум один якорь
    for _ in 0..5 {
        grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
        step_simulation(&mut app);
        assert_eq!(grab_anchor_count(&mut app), 1);
    }
}

#[test]
fn test_release_is_idempotent() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    // release свободной руки — no-op, не ошибка
    release(&mut app, player.body, HandSide::Left);
    step_simulation(&mut app);
    assert!(!is_grabbing(&app, player.left_hand));
    assert_eq!(mode(&app, player.body), ControlMode::BodyLeads);

    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    release(&mut app, player.body, HandSide::Left);
    step_simulation(&mut app);

    let first = (
        is_grabbing(&app, player.left_hand),
        grab_anchor_count(&mut app),
        mode(&app, player.body),
    );

    // повторный release ничего не меняет
    release(&mut app, player.body, HandSide::Left);
    step_simulation(&mut app);
    let second = (
        is_grabbing(&app, player.left_hand),
        grab_anchor_count(&mut app),
        mode(&app, player.body),
    );

    assert_eq!(first, second);
    assert_eq!(second, (false, 0, ControlMode::BodyLeads));
}

#[test]
fn test_grab_up_resolves_against_cliff() {
    // скала над правой рукой: resolve должен прилипнуть к геометрии
    let mut map = floor_map();
    // правая рука после спавна в (10, 26); клетка (0, 4) = мир [0..16) x [64..80)
    map.fill_rect(IVec2::new(0, 4), IVec2::new(0, 4), TileCell::cliff());
    let mut app = create_app(map);
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    // левая цепляется на месте, правая тянется вверх
    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    grab(&mut app, player.body, HandSide::Right, GrabDirection::Up);
    step_simulation(&mut app);

    let positions = grab_anchor_positions(&mut app);
    assert_eq!(positions.len(), 2);
    // луч (10,26) -> (10,76) входит в клетку скалы на y=64
    assert!(
        positions.iter().any(|p| (*p - Vec2::new(10.0, 64.0)).length() < 1.0),
        "expected an anchor stuck to the cliff face, got {:?}",
        positions
    );
}

#[test]
fn test_ice_contact_forces_fall_and_cooldown() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    assert_eq!(mode(&app, player.body), ControlMode::AnchorLeads);

    // подкладываем лёд прямо под руку
    let hand = hand_position(&app, player.left_hand);
    let cell = (hand / 16.0).floor().as_ivec2();
    app.world_mut().resource_mut::<TerrainMap>().set_cell(cell, TileCell::ice());
    step_simulation(&mut app);

    // срыв в том же тике: захваты брошены, режим вернулся, cooldown бежит
    assert_eq!(mode(&app, player.body), ControlMode::BodyLeads);
    assert!(!is_grabbing(&app, player.left_hand));
    assert!(!is_grabbing(&app, player.right_hand));
    assert_eq!(grab_anchor_count(&mut app), 0);

    let body = app.world().entity(player.body);
    assert!(!body.get::<IceSlip>().expect("slip").is_cooldown_stopped());
    assert!(body.get::<PhysicsBody>().expect("physics").velocity.y <= 0.0);

    // пока cooldown бежит — новые захваты подавлены
    app.world_mut().resource_mut::<TerrainMap>().clear_cell(cell);
    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    assert!(!is_grabbing(&app, player.left_hand));
    assert_eq!(mode(&app, player.body), ControlMode::BodyLeads);

    // cooldown 0.5s = 30 тиков; с запасом — и захват снова разрешён
    for _ in 0..40 {
        step_simulation(&mut app);
    }
    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    assert!(is_grabbing(&app, player.left_hand));
    assert_eq!(mode(&app, player.body), ControlMode::AnchorLeads);
}

#[test]
fn test_respawn_mid_climb() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    grab(&mut app, player.body, HandSide::Right, GrabDirection::Up);
    for _ in 0..10 {
        step_simulation(&mut app);
    }
    assert_eq!(mode(&app, player.body), ControlMode::AnchorLeads);

    app.world_mut().send_event(RespawnPressed { entity: player.body });
    step_simulation(&mut app);

    assert_eq!(mode(&app, player.body), ControlMode::BodyLeads);
    assert!(!is_grabbing(&app, player.left_hand));
    assert!(!is_grabbing(&app, player.right_hand));
    assert_eq!(grab_anchor_count(&mut app), 0);

    let body = app.world().entity(player.body);
    let translation = body.get::<Transform>().expect("transform").translation.truncate();
    assert!((translation - Vec2::new(0.0, 14.0)).length() < 1.0e-3);
    assert_eq!(body.get::<PhysicsBody>().expect("physics").velocity, Vec2::ZERO);
    assert_eq!(
        app.world().entity(player.anchor).get::<Velocity>().expect("velocity").linvel,
        Vec2::ZERO
    );
}

#[test]
fn test_walk_jump_and_land_poses() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    // ходьба вправо: скорость стремится к walk_speed, с пола не сходим
    set_move_input(&mut app, player.body, Vec2::new(1.0, 0.0), false, false);
    for _ in 0..30 {
        step_simulation(&mut app);
    }
    let body = app.world().entity(player.body);
    let physics = body.get::<PhysicsBody>().expect("physics");
    assert!((physics.velocity.x - 100.0).abs() < 1.0);
    assert!(body.get::<CharacterBody>().expect("body").on_floor);

    let poses: Vec<Pose> = pose_hints(&app);
    assert!(poses.contains(&Pose::Walk));

    // прыжок: вертикальная скорость вверх, затем приземление обратно
    set_move_input(&mut app, player.body, Vec2::ZERO, true, false);
    step_simulation(&mut app);
    set_move_input(&mut app, player.body, Vec2::ZERO, false, false);

    let physics = app.world().entity(player.body).get::<PhysicsBody>().expect("physics");
    assert!(physics.velocity.y > 300.0, "jump must launch upward");
    assert!(pose_hints(&app).contains(&Pose::Jump));

    for _ in 0..90 {
        step_simulation(&mut app);
    }
    let body = app.world().entity(player.body);
    assert!(body.get::<CharacterBody>().expect("body").on_floor, "must land back on the floor");
    assert!(pose_hints(&app).contains(&Pose::Land));
}

#[test]
fn test_climb_pose_reflects_hand_heights() {
    let mut app = create_app(floor_map());
    let player = spawn_on_floor(&mut app);
    step_simulation(&mut app);

    grab(&mut app, player.body, HandSide::Left, GrabDirection::Up);
    step_simulation(&mut app);
    // правая тянется вверх — окажется заметно выше левой
    grab(&mut app, player.body, HandSide::Right, GrabDirection::Up);
    step_simulation(&mut app);

    let poses = pose_hints(&app);
    assert!(
        poses.iter().any(|pose| matches!(pose, Pose::Climb { frame: 0 })),
        "right hand higher must map to climb frame 0, got {:?}",
        poses
    );
}

fn set_move_input(app: &mut App, body: Entity, direction: Vec2, jump: bool, boost: bool) {
    if let Some(mut input) = app.world_mut().entity_mut(body).get_mut::<MoveInput>() {
        input.direction = direction;
        input.jump = jump;
        input.speed_boost = boost;
    }
}

fn pose_hints(app: &App) -> Vec<Pose> {
    app.world()
        .resource::<Events<PoseHint>>()
        .iter_current_update_events()
        .map(|hint| hint.pose)
        .collect()
}
