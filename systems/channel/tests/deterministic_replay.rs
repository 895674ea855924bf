use astral_beam_core::{
    ActorId, BeamAbility, CellCoord, Command, DamageKind, Event, Fill, GridId,
};
use astral_beam_rendering::SegmentLedger;
use astral_beam_system_channel::{BeamChannel, ChannelStatus};
use astral_beam_world::{self as world, query, World};
use glam::Vec3;

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::ActorDied { .. })),
        "scripted channels should kill at least one actor"
    );
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::ExplosionTriggered { .. })));
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    statuses: Vec<ChannelStatus>,
    survivors: Vec<(ActorId, u32)>,
    live_segments: usize,
}

fn replay() -> ReplayOutcome {
    let mut world = World::new();
    let mut ledger = SegmentLedger::new();
    let mut log = Vec::new();

    run(
        &mut world,
        Command::ConfigureGrid {
            columns: 24,
            rows: 16,
        },
        &mut log,
    );
    for (column, row) in [(9, 2), (14, 7), (3, 12)] {
        run(
            &mut world,
            Command::PlaceObstacle {
                cell: CellCoord::new(column, row),
                fill: Fill::Full,
            },
            &mut log,
        );
    }
    run(
        &mut world,
        Command::PlaceObstacle {
            cell: CellCoord::new(6, 3),
            fill: Fill::Partial,
        },
        &mut log,
    );

    let east = spawn(&mut world, CellCoord::new(1, 3), 60, &mut log);
    let south = spawn(&mut world, CellCoord::new(14, 1), 60, &mut log);
    for (cell, health) in [
        (CellCoord::new(5, 3), 10),
        (CellCoord::new(6, 3), 60),
        (CellCoord::new(8, 4), 60),
        (CellCoord::new(14, 5), 60),
        (CellCoord::new(13, 4), 60),
    ] {
        let _ = spawn(&mut world, cell, health, &mut log);
    }

    let grid = query::grid_id(&world);
    let mut channels = vec![
        cast(&world, &ledger, east, grid, Vec3::new(12.0, 0.0, 3.5)),
        cast(&world, &ledger, south, grid, Vec3::new(14.5, 0.0, 9.0)),
    ];
    let mut statuses = Vec::new();

    for step in 0..200_u32 {
        if step == 90 {
            run(
                &mut world,
                Command::MoveActor {
                    actor: east,
                    cell: CellCoord::new(1, 4),
                },
                &mut log,
            );
        }
        if step == 150 {
            run(
                &mut world,
                Command::PlaceObstacle {
                    cell: CellCoord::new(14, 2),
                    fill: Fill::Full,
                },
                &mut log,
            );
        }

        let mut commands = Vec::new();
        for (channel, caster) in channels.iter_mut() {
            let snapshot = query::caster_snapshot(&world, *caster);
            let status = channel.step(
                &query::grid_view(&world),
                snapshot.as_ref(),
                &mut ledger,
                &mut commands,
            );
            if !status.is_active() {
                statuses.push(status);
            }
        }
        channels.retain(|(channel, _)| channel.termination().is_none());

        for command in commands {
            run(&mut world, command, &mut log);
        }
        run(&mut world, Command::Tick, &mut log);
    }

    let survivors = query::actors(&world)
        .into_iter()
        .map(|actor| (actor.id, actor.health))
        .collect();

    ReplayOutcome {
        events: log,
        statuses,
        survivors,
        live_segments: ledger.len(),
    }
}

fn cast(
    world: &World,
    ledger: &SegmentLedger,
    caster: ActorId,
    grid: GridId,
    target: Vec3,
) -> (BeamChannel, ActorId) {
    let position = query::caster_snapshot(world, caster)
        .expect("caster exists")
        .position;
    let config = BeamAbility {
        strand_count: 2,
        max_range: 12.0,
        damage_amount: 7,
        armor_penetration: 0.25,
        damage_kind: DamageKind::Burn,
        duration_seconds: 3.0,
        pulse_interval_seconds: 0.25,
        min_safe_distance: 2.0,
        explosion_radius: 2.0,
    }
    .configure(caster, grid, position, target)
    .expect("valid ability");
    let channel =
        BeamChannel::cast(&query::grid_view(world), config, ledger).expect("clear line of fire");
    (channel, caster)
}

fn spawn(world: &mut World, cell: CellCoord, health: u32, log: &mut Vec<Event>) -> ActorId {
    let start = log.len();
    run(
        world,
        Command::SpawnActor {
            cell,
            health,
            armor: 0.5,
        },
        log,
    );
    log[start..]
        .iter()
        .find_map(|event| match event {
            Event::ActorSpawned { actor, .. } => Some(*actor),
            _ => None,
        })
        .expect("actor spawned")
}

fn run(world: &mut World, command: Command, log: &mut Vec<Event>) {
    world::apply(world, command, log);
}
