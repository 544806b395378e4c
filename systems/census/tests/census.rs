use robot_arena_core::{AgentKind, Command, DVec2, Event, ObstacleShape, Placement};
use robot_arena_system_census::{roster, Census};
use robot_arena_world::{self as world, query, Config, World};

fn apply_all(world: &mut World, census: &mut Census, commands: Vec<Command>) {
    for command in commands {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        census.handle(&events);
    }
}

fn at(kind: AgentKind, x: f64, y: f64) -> Command {
    Command::SpawnAgent {
        kind,
        placement: Placement::At(DVec2::new(x, y)),
    }
}

#[test]
fn report_counts_population_and_destruction() {
    let mut world = World::new(Config::new(400.0, 400.0).with_seed(5)).expect("config");
    let mut census = Census::new();
    apply_all(
        &mut world,
        &mut census,
        vec![
            at(AgentKind::Normal, 200.0, 200.0),
            at(AgentKind::Weak, 214.0, 200.0),
            at(AgentKind::Weak, 100.0, 300.0),
            at(AgentKind::Beam, 320.0, 120.0),
            Command::SpawnObstacle {
                shape: ObstacleShape::Line,
                placement: Placement::At(DVec2::new(60.0, 120.0)),
            },
            Command::Tick,
        ],
    );

    let report = census.report(&query::snapshot(&world));
    assert_eq!(report.robots(AgentKind::Normal), 1);
    assert_eq!(report.robots(AgentKind::Weak), 1);
    assert_eq!(report.robots(AgentKind::Beam), 1);
    assert_eq!(report.robots(AgentKind::Avoider), 0);
    assert_eq!(report.total_robots(), 3);
    assert_eq!(report.obstacles(ObstacleShape::Line), 1);
    assert_eq!(report.obstacles(ObstacleShape::Circle), 0);
    assert_eq!(report.destroyed(), 1);
    assert_eq!(report.ticks(), 1);
}

#[test]
fn roster_lists_robots_then_obstacles_with_rounded_positions() {
    let mut world = World::new(Config::new(400.0, 400.0).with_seed(5)).expect("config");
    let mut census = Census::new();
    apply_all(
        &mut world,
        &mut census,
        vec![
            at(AgentKind::Avoider, 100.4, 150.6),
            Command::SpawnObstacle {
                shape: ObstacleShape::Circle,
                placement: Placement::At(DVec2::new(300.0, 250.0)),
            },
        ],
    );

    assert_eq!(
        roster(&query::snapshot(&world)),
        vec![
            "Avoider Robot0: (100, 151)".to_owned(),
            "Circle Obstacle0: (300, 250)".to_owned(),
        ]
    );
}

#[test]
fn evasions_are_tallied() {
    let mut census = Census::new();
    census.handle(&[Event::EvasionStarted {
        agent: robot_arena_core::AgentId::new(2),
        obstacle: robot_arena_core::ObstacleId::new(0),
    }]);
    assert_eq!(census.evasions(), 1);
}
