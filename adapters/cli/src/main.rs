#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that channels Astral Beam scenarios step by step.

mod scenario;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use astral_beam_core::{BeamConfig, CellCoord, Command, Event, Fill};
use astral_beam_rendering::{Color, PreviewPresentation, SegmentLedger, TextFrame};
use astral_beam_system_channel::{BeamChannel, ChannelStatus};
use astral_beam_system_overload::{preview_cast, validate_cast, CastPreview};
use astral_beam_world::{self as world, query};
use clap::{Parser, Subcommand};
use log::info;

use crate::scenario::{Scenario, StagedScenario};

/// Channels multi-strand energy beams across a grid.
#[derive(Debug, Parser)]
#[command(name = "astral-beam", version)]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Casts the scenario's beam and prints every world event until it ends.
    Run {
        /// Path to the scenario TOML file.
        scenario: PathBuf,
        /// Stops after this many steps even if the channel is still active.
        #[arg(long)]
        steps: Option<u32>,
        /// Draws the grid before the cast and lists the first step's segments.
        #[arg(long)]
        draw: bool,
    },
    /// Validates the scenario's cast and prints the targeting preview.
    Check {
        /// Path to the scenario TOML file.
        scenario: PathBuf,
    },
}

/// Entry point for the Astral Beam command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Mode::Run {
            scenario,
            steps,
            draw,
        } => run(&scenario, steps, draw),
        Mode::Check { scenario } => check(&scenario),
    }
}

fn load(path: &Path) -> Result<(Scenario, StagedScenario)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    let scenario = Scenario::from_toml(&contents)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    let staged = scenario.stage().context("failed to stage scenario")?;
    info!(
        "staged {}x{} grid with {} bystanders",
        scenario.grid.columns,
        scenario.grid.rows,
        staged.bystanders.len()
    );
    Ok((scenario, staged))
}

fn check(path: &Path) -> Result<()> {
    let (scenario, staged) = load(path)?;
    let config = configure(&scenario, &staged)?;
    let caster = query::caster_snapshot(&staged.world, staged.caster)
        .context("caster missing from staged world")?;

    let preview = preview_cast(
        &query::grid_view(&staged.world),
        &config,
        caster.position,
        caster.cell,
    );
    print!("{}", draw(&staged, Some(&preview)));

    match validate_cast(&query::grid_view(&staged.world), &config) {
        Ok(()) => println!("cast accepted, {} cells affected", preview.cells.len()),
        Err(rejection) => println!("cast rejected: {rejection}"),
    }
    Ok(())
}

fn run(path: &Path, steps: Option<u32>, show: bool) -> Result<()> {
    let (scenario, mut staged) = load(path)?;
    let config = configure(&scenario, &staged)?;
    if show {
        print!("{}", draw(&staged, None));
    }

    let mut ledger = SegmentLedger::new();
    let mut channel = BeamChannel::cast(&query::grid_view(&staged.world), config, &ledger)
        .context("beam cast rejected")?;
    let limit = steps.unwrap_or_else(|| channel.config().total_duration_ticks.saturating_add(1));

    let mut commands = Vec::new();
    let mut events = Vec::new();
    let mut status = ChannelStatus::Active;
    for step in 0..limit {
        if scenario.cancel_at == Some(step) {
            channel.cancel();
        }

        commands.clear();
        let caster = query::caster_snapshot(&staged.world, staged.caster);
        status = channel.step(
            &query::grid_view(&staged.world),
            caster.as_ref(),
            &mut ledger,
            &mut commands,
        );

        if show && step == 0 {
            outline(&ledger);
        }

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut staged.world, command, &mut events);
        }
        world::apply(&mut staged.world, Command::Tick, &mut events);
        for event in &events {
            if let Some(line) = describe(event) {
                println!("[{step:>4}] {line}");
            }
        }

        if !status.is_active() {
            break;
        }
    }

    if status.is_active() {
        let _ = channel.destroy(&mut ledger);
        println!("stopped after {limit} steps");
    } else {
        println!(
            "channel ended after {} steps: {status:?}",
            channel.state().elapsed_ticks
        );
    }
    summarize(&staged);
    Ok(())
}

fn configure(scenario: &Scenario, staged: &StagedScenario) -> Result<BeamConfig> {
    let caster = query::caster_snapshot(&staged.world, staged.caster)
        .context("caster missing from staged world")?;
    scenario
        .ability
        .configure(
            staged.caster,
            query::grid_id(&staged.world),
            caster.position,
            staged.target,
        )
        .context("invalid beam ability")
}

fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::AreaDamaged { source, cells } => {
            format!("actor {} pulses over {cells} cells", source.get())
        }
        Event::ExplosionTriggered {
            source,
            center,
            radius,
        } => format!(
            "beam of actor {} overloads at ({}, {}) radius {radius}",
            source.get(),
            center.column(),
            center.row()
        ),
        Event::ActorDamaged {
            actor,
            amount,
            kind,
            ..
        } => format!("actor {} takes {amount} {kind:?} damage", actor.get()),
        Event::ActorDied { actor } => format!("actor {} dies", actor.get()),
        Event::ActorDespawned { actor } => format!("actor {} leaves the grid", actor.get()),
        _ => return None,
    };
    Some(line)
}

fn draw(staged: &StagedScenario, preview: Option<&CastPreview>) -> String {
    let (columns, rows) = query::dimensions(&staged.world);
    let mut frame = TextFrame::new(columns, rows);

    for row in 0..rows as i32 {
        for column in 0..columns as i32 {
            let cell = CellCoord::new(column, row);
            match query::obstacle(&staged.world, cell) {
                Some(Fill::Full) => frame.mark(cell, '#'),
                Some(Fill::Partial) => frame.mark(cell, '+'),
                None => {}
            }
        }
    }

    if let Some(preview) = preview {
        let overlay = PreviewPresentation::new(preview.cells.clone(), preview.valid);
        let glyph = if overlay.color == Color::WHITE {
            '*'
        } else {
            '!'
        };
        for cell in &overlay.cells {
            if frame.glyph(*cell) == Some(TextFrame::EMPTY) {
                frame.mark(*cell, glyph);
            }
        }
    }

    for actor in query::actors(&staged.world) {
        let glyph = if actor.id == staged.caster { '@' } else { 'o' };
        frame.mark(actor.cell, glyph);
    }
    frame.to_string()
}

fn outline(ledger: &SegmentLedger) {
    for (handle, quad) in ledger.quads() {
        println!(
            "segment {} {:?}: length {:.2}, width {}",
            handle.get(),
            quad.template.kind(),
            quad.length(),
            quad.width
        );
    }
}

fn summarize(staged: &StagedScenario) {
    let setup = staged
        .events
        .iter()
        .filter(|event| matches!(event, Event::ObstaclePlaced { .. }))
        .count();
    println!("{setup} structures on the grid");
    for actor in query::actors(&staged.world) {
        if staged.bystanders.contains(&actor.id) {
            println!(
                "bystander {} at ({}, {}): {} health, {:?}",
                actor.id.get(),
                actor.cell.column(),
                actor.cell.row(),
                actor.health,
                actor.state
            );
        }
    }
}
