use astral_beam_core::{
    ActorId, BeamAbility, BeamConfig, CellCoord, Command, DamageKind, Event, Fill, SegmentKind,
};
use astral_beam_rendering::SegmentLedger;
use astral_beam_system_channel::{
    BeamChannel, ChannelSnapshot, ChannelStatus, TerminationReason,
};
use astral_beam_system_overload::CastRejection;
use astral_beam_world::{apply, query, World};
use glam::Vec2;

const CASTER_CELL: CellCoord = CellCoord::new(0, 1);

fn ability() -> BeamAbility {
    BeamAbility {
        strand_count: 3,
        max_range: 10.0,
        damage_amount: 10,
        armor_penetration: 0.0,
        damage_kind: DamageKind::Astral,
        duration_seconds: 5.0,
        pulse_interval_seconds: 0.2,
        min_safe_distance: 2.0,
        explosion_radius: 2.0,
    }
}

fn spawn(world: &mut World, cell: CellCoord, health: u32) -> ActorId {
    let mut events = Vec::new();
    apply(
        world,
        Command::SpawnActor {
            cell,
            health,
            armor: 0.0,
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::ActorSpawned { actor, .. } => Some(*actor),
            _ => None,
        })
        .expect("actor spawned")
}

fn place(world: &mut World, cell: CellCoord) {
    let mut events = Vec::new();
    apply(
        world,
        Command::PlaceObstacle {
            cell,
            fill: Fill::Full,
        },
        &mut events,
    );
}

struct Harness {
    world: World,
    ledger: SegmentLedger,
    caster: ActorId,
    bystander: ActorId,
    channel: BeamChannel,
}

impl Harness {
    fn new() -> Self {
        Self::with_ledger(SegmentLedger::new())
    }

    fn with_ledger(ledger: SegmentLedger) -> Self {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                columns: 20,
                rows: 20,
            },
            &mut events,
        );
        let caster = spawn(&mut world, CASTER_CELL, 100);
        let bystander = spawn(&mut world, CellCoord::new(5, 1), 10_000);

        let config = configure(&world, caster, Vec2::new(4.5, 1.5));
        let channel = BeamChannel::cast(&query::grid_view(&world), config, &ledger)
            .expect("clear line of fire");

        Self {
            world,
            ledger,
            caster,
            bystander,
            channel,
        }
    }

    fn step(&mut self) -> (ChannelStatus, Vec<Command>, Vec<Event>) {
        let mut commands = Vec::new();
        let caster = query::caster_snapshot(&self.world, self.caster);
        let status = self.channel.step(
            &query::grid_view(&self.world),
            caster.as_ref(),
            &mut self.ledger,
            &mut commands,
        );

        let mut events = Vec::new();
        for command in commands.iter().cloned() {
            apply(&mut self.world, command, &mut events);
        }
        (status, commands, events)
    }

    fn health_of(&self, actor: ActorId) -> u32 {
        query::actors(&self.world)
            .into_iter()
            .find(|snapshot| snapshot.id == actor)
            .map(|snapshot| snapshot.health)
            .expect("actor exists")
    }
}

fn configure(world: &World, caster: ActorId, target: Vec2) -> BeamConfig {
    let snapshot = query::caster_snapshot(world, caster).expect("caster exists");
    ability()
        .configure(
            caster,
            query::grid_id(world),
            snapshot.position,
            glam::Vec3::new(target.x, 0.0, target.y),
        )
        .expect("valid ability")
}

#[test]
fn pulses_every_interval_and_expires_after_duration() {
    let mut harness = Harness::new();
    let mut pulse_steps = Vec::new();

    for step in 0..300_u32 {
        let (status, commands, _) = harness.step();
        assert_eq!(status, ChannelStatus::Active, "step {step} terminated early");
        if commands
            .iter()
            .any(|command| matches!(command, Command::ApplyAreaDamage { .. }))
        {
            pulse_steps.push(step);
        }
    }

    let (status, commands, _) = harness.step();
    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::Expired)
    );
    assert!(commands.is_empty(), "no damage on the expiry step");

    let expected: Vec<u32> = (0..300).step_by(12).collect();
    assert_eq!(pulse_steps, expected);
    assert_eq!(harness.health_of(harness.bystander), 10_000 - 25 * 10);
    assert_eq!(harness.health_of(harness.caster), 100);
    assert!(harness.ledger.is_empty(), "expiry must release segments");
    assert_eq!(harness.channel.live_segments(), 0);
}

#[test]
fn area_damage_excludes_the_caster() {
    let mut harness = Harness::new();

    let (_, commands, events) = harness.step();

    match &commands[..] {
        [Command::ApplyAreaDamage {
            cells,
            amount,
            source,
            excluded,
            ..
        }] => {
            assert_eq!(*amount, 10);
            assert_eq!(*source, harness.caster);
            assert_eq!(excluded, &vec![harness.caster]);
            assert!(!cells.contains(&CASTER_CELL));
            assert!(cells.contains(&CellCoord::new(5, 1)));
        }
        other => panic!("unexpected commands {other:?}"),
    }
    assert!(events.contains(&Event::ActorDamaged {
        actor: harness.bystander,
        source: harness.caster,
        amount: 10,
        kind: DamageKind::Astral,
    }));
}

#[test]
fn obstacle_placed_mid_channel_overloads_and_explodes() {
    let mut harness = Harness::new();
    // beside the caster, off every strand but inside the blast radius
    let near = spawn(&mut harness.world, CellCoord::new(0, 3), 5);
    for _ in 0..5 {
        let (status, _, _) = harness.step();
        assert!(status.is_active());
    }
    assert!(!harness.ledger.is_empty());

    place(&mut harness.world, CellCoord::new(1, 1));
    let (status, commands, events) = harness.step();

    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::Overloaded)
    );
    assert_eq!(
        commands,
        vec![Command::ApplyExplosion {
            center: CASTER_CELL,
            radius: 2.0,
            amount: 10,
            armor_penetration: 0.0,
            kind: DamageKind::Astral,
            source: harness.caster,
            excluded: vec![harness.caster],
        }]
    );
    assert!(events.contains(&Event::ActorDied { actor: near }));
    assert!(!events.iter().any(
        |event| matches!(event, Event::ActorDamaged { actor, .. } if *actor == harness.caster)
    ));
    assert!(harness.ledger.is_empty(), "overload must release segments");
}

#[test]
fn dead_or_missing_caster_terminates_without_damage() {
    let mut harness = Harness::new();
    let _ = harness.step();

    let mut events = Vec::new();
    apply(
        &mut harness.world,
        Command::DespawnActor {
            actor: harness.caster,
        },
        &mut events,
    );
    let (status, commands, _) = harness.step();

    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::CasterInvalid)
    );
    assert!(commands.is_empty());
    assert!(harness.ledger.is_empty());

    let mut commands = Vec::new();
    let status = harness.channel.step(
        &query::grid_view(&harness.world),
        None,
        &mut harness.ledger,
        &mut commands,
    );
    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::CasterInvalid)
    );
    assert!(commands.is_empty());
}

#[test]
fn reconfigured_grid_invalidates_the_caster() {
    let mut harness = Harness::new();
    let _ = harness.step();

    let mut events = Vec::new();
    apply(
        &mut harness.world,
        Command::ConfigureGrid {
            columns: 20,
            rows: 20,
        },
        &mut events,
    );
    let (status, _, _) = harness.step();

    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::CasterInvalid)
    );
}

#[test]
fn cancellation_is_observed_on_the_next_step() {
    let mut harness = Harness::new();
    let _ = harness.step();
    let elapsed = harness.channel.state().elapsed_ticks;

    harness.channel.cancel();
    assert!(harness.channel.termination().is_none());
    let (status, commands, _) = harness.step();

    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::Cancelled)
    );
    assert!(commands.is_empty());
    assert!(harness.ledger.is_empty());
    assert_eq!(harness.channel.state().elapsed_ticks, elapsed);

    let (status, commands, _) = harness.step();
    assert!(!status.is_active());
    assert!(commands.is_empty());
}

#[test]
fn destroy_releases_segments_immediately() {
    let mut harness = Harness::new();
    let _ = harness.step();
    assert!(!harness.ledger.is_empty());

    let status = harness.channel.destroy(&mut harness.ledger);

    assert_eq!(
        status,
        ChannelStatus::Terminated(TerminationReason::Cancelled)
    );
    assert!(harness.ledger.is_empty());
}

#[test]
fn blocked_strand_splits_the_drawn_beam() {
    let mut harness = Harness::new();
    place(&mut harness.world, CellCoord::new(6, 1));

    let _ = harness.step();

    assert_eq!(harness.ledger.count_of(SegmentKind::Head), 1);
    assert_eq!(harness.ledger.count_of(SegmentKind::Middle), 3);
    assert_eq!(harness.ledger.count_of(SegmentKind::Tail), 3);
    assert_eq!(harness.channel.live_segments(), 7);

    let (_, head) = harness
        .ledger
        .quads()
        .find(|(_, quad)| quad.template.kind() == SegmentKind::Head)
        .expect("head drawn");
    assert!(head.start.distance(Vec2::new(1.0, 1.5)) < 1.0e-5);
    assert!(head.end.distance(Vec2::new(2.0, 1.5)) < 1.0e-5);
    assert_eq!(head.width, 3.0);

    let _ = harness.step();
    assert_eq!(harness.ledger.len(), 7, "segments are replaced, not leaked");
}

#[test]
fn missing_templates_skip_visuals_but_not_damage() {
    let ledger = SegmentLedger::new()
        .without_template(SegmentKind::Tail)
        .with_capacity_limit(2);
    let mut harness = Harness::with_ledger(ledger);

    let (status, commands, _) = harness.step();

    assert!(status.is_active());
    assert_eq!(commands.len(), 1);
    assert_eq!(harness.ledger.count_of(SegmentKind::Tail), 0);
    assert_eq!(harness.ledger.len(), 2);

    let (status, _, _) = harness.step();
    assert!(status.is_active());
    assert_eq!(harness.ledger.len(), 2);
}

#[test]
fn cast_is_rejected_when_the_beam_would_overload() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ConfigureGrid {
            columns: 20,
            rows: 20,
        },
        &mut events,
    );
    let caster = spawn(&mut world, CASTER_CELL, 100);
    place(&mut world, CellCoord::new(1, 1));
    let config = configure(&world, caster, Vec2::new(9.5, 1.5));

    let rejection = BeamChannel::cast(&query::grid_view(&world), config, &SegmentLedger::new())
        .expect_err("target too close");

    assert!(matches!(rejection, CastRejection::Overload { .. }));
}

#[test]
fn coincident_target_channels_without_effect() {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ConfigureGrid {
            columns: 20,
            rows: 20,
        },
        &mut events,
    );
    let caster = spawn(&mut world, CASTER_CELL, 100);
    let config = configure(&world, caster, CASTER_CELL.center());
    let mut ledger = SegmentLedger::new();
    let mut channel =
        BeamChannel::cast(&query::grid_view(&world), config, &ledger).expect("not an overload");

    let mut commands = Vec::new();
    let snapshot = query::caster_snapshot(&world, caster);
    let status = channel.step(
        &query::grid_view(&world),
        snapshot.as_ref(),
        &mut ledger,
        &mut commands,
    );

    assert!(status.is_active());
    assert!(commands.is_empty());
    assert!(ledger.is_empty());
}

#[test]
fn restored_channel_continues_where_it_left_off() {
    let mut uninterrupted = Harness::new();
    for _ in 0..7 {
        let _ = uninterrupted.step();
    }

    let bytes = bincode::serialize(&uninterrupted.channel.snapshot()).expect("serialize");
    let snapshot: ChannelSnapshot = bincode::deserialize(&bytes).expect("deserialize");
    assert_eq!(snapshot, uninterrupted.channel.snapshot());
    assert_eq!(snapshot.state.elapsed_ticks, 7);
    assert_eq!(snapshot.state.ticks_until_next_pulse, 5);

    let mut ledger = SegmentLedger::new();
    let mut restored = BeamChannel::restore(snapshot, &ledger).expect("valid snapshot");
    assert_eq!(restored.live_segments(), 0);

    for _ in 0..20 {
        let caster = query::caster_snapshot(&uninterrupted.world, uninterrupted.caster);
        let mut restored_commands = Vec::new();
        let restored_status = restored.step(
            &query::grid_view(&uninterrupted.world),
            caster.as_ref(),
            &mut ledger,
            &mut restored_commands,
        );

        let (status, commands, _) = uninterrupted.step();
        assert_eq!(restored_status, status);
        assert_eq!(restored_commands, commands);
    }
    assert_eq!(ledger.len(), uninterrupted.ledger.len());
}

#[test]
fn restore_rejects_corrupt_configuration() {
    let harness = Harness::new();
    let mut snapshot = harness.channel.snapshot();
    snapshot.config.strand_count = 0;

    assert!(BeamChannel::restore(snapshot, &SegmentLedger::new()).is_err());
}
