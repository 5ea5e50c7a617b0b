//! Shamble Headless Simulation Harness
//!
//! Generates a map, runs the stumble resolver for a number of ticks and
//! checks the invariants the host relies on. Runs entirely in-process,
//! no rendering and no host game.
//!
//! Usage:
//!   cargo run -p shamble-simtest
//!   cargo run -p shamble-simtest -- --verbose --ticks 2000 --seed 7
//!   cargo run -p shamble-simtest -- --json --settings timeline.json

use std::collections::HashMap;

use serde::Serialize;
use shamble_core::engine::SimulationEngine;
use shamble_core::generation::MapConfig;
use shamble_core::prelude::*;
use shamble_core::systems::ActionStats;
use shamble_logic::settings::SettingsTimeline;

// ── Command line ────────────────────────────────────────────────────────

struct Args {
    verbose: bool,
    json: bool,
    ticks: u64,
    seed: u64,
    settings: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: false,
        json: false,
        ticks: 1_000,
        seed: 42,
        settings: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--json" => args.json = true,
            "--ticks" => {
                if let Some(n) = it.next().and_then(|v| v.parse().ok()) {
                    args.ticks = n;
                }
            }
            "--seed" => {
                if let Some(n) = it.next().and_then(|v| v.parse().ok()) {
                    args.seed = n;
                }
            }
            "--settings" => args.settings = it.next(),
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }
    args
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    ticks: u64,
    zombies: usize,
    raging: usize,
    colonists: usize,
    corpses: usize,
    stats: ActionStats,
    steps: Vec<(String, u64)>,
    results: Vec<TestResult>,
}

fn main() {
    let args = parse_args();
    if !args.json {
        println!("=== Shamble Simulation Harness ===\n");
    }

    let timeline = match load_timeline(&args) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();
    let config = MapConfig::default();

    // 1. Map generation
    let mut engine = SimulationEngine::new(args.seed);
    engine.set_timeline(timeline.clone());
    engine.generate(config.clone());
    results.extend(validate_generation(&engine, &config, &args));

    // 2. Long run with per-tick invariants
    results.extend(validate_run(&mut engine, &args));

    // 3. Save/load round trip
    results.extend(validate_persistence(&engine, &args));

    // 4. Determinism
    results.extend(validate_determinism(&timeline, &config, &args));

    let mut steps: Vec<(String, u64)> = engine
        .step_counts
        .iter()
        .map(|(step, n)| (format!("{:?}", step), *n))
        .collect();
    steps.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let failed = results.iter().filter(|r| !r.passed).count();
    let report = Report {
        seed: args.seed,
        ticks: engine.tick(),
        zombies: engine.zombie_count(),
        raging: engine.raging_count(),
        colonists: engine.colonist_count(),
        corpses: engine.corpse_count(),
        stats: engine.stats,
        steps,
        results,
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("failed to encode report: {}", e),
        }
    } else {
        print_summary(&report, args.verbose);
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_timeline(args: &Args) -> Result<SettingsTimeline, String> {
    let Some(path) = &args.settings else {
        return Ok(SettingsTimeline::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    // A bare settings object or a keyframe array
    if let Ok(settings) = ZombieSettings::from_json(&text) {
        return Ok(SettingsTimeline::new(settings));
    }
    SettingsTimeline::from_json(&text).map_err(|e| format!("{}: {}", path, e))
}

fn print_summary(report: &Report, verbose: bool) {
    println!("\n--- Final State (tick {}) ---", report.ticks);
    println!(
        "  zombies={} raging={} colonists={} corpses={}",
        report.zombies, report.raging, report.colonists, report.corpses
    );
    let s = &report.stats;
    println!(
        "  attacks={} downed={} killed={} bites={} consumed={}",
        s.attacks, s.creatures_downed, s.creatures_killed, s.bites, s.corpses_consumed
    );
    println!(
        "  smash_hits={} destroyed={} mined={} rages={}/{} electrified={} zombies_killed={}",
        s.smash_hits,
        s.obstacles_destroyed,
        s.rocks_mined,
        s.rages_started,
        s.rages_ended,
        s.electrified,
        s.zombies_killed
    );
    if verbose {
        println!("  Ticks ended by step:");
        for (name, n) in &report.steps {
            println!("    {:20} {}", name, n);
        }
    }

    println!();
    let passed = report.results.iter().filter(|r| r.passed).count();
    let total = report.results.len();
    for r in &report.results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }
    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        total,
        total - passed
    );
}

/// Problems with zombie positions, destinations and grid occupancy.
fn invariant_violations(engine: &SimulationEngine) -> Vec<String> {
    let mut problems = Vec::new();
    for (e, (pos, job)) in engine.world.query::<(&Position, &StumbleJob)>().iter() {
        if !engine.grid.in_bounds(pos.cell()) {
            problems.push(format!("{:?} stands outside the map at {:?}", e, pos.cell()));
        }
        if job.has_destination() && !engine.grid.in_bounds(job.destination) {
            problems.push(format!("{:?} heads outside the map to {:?}", e, job.destination));
        }
    }
    let on_grid = engine.grid.total_zombies() as usize;
    let in_world = engine.zombie_count();
    if on_grid != in_world {
        problems.push(format!(
            "grid counts {} zombies, world has {}",
            on_grid, in_world
        ));
    }
    problems
}

// ── 1. Generation ───────────────────────────────────────────────────────

fn validate_generation(
    engine: &SimulationEngine,
    config: &MapConfig,
    args: &Args,
) -> Vec<TestResult> {
    if !args.json {
        println!("--- Map Generation ---");
    }
    let mut results = Vec::new();

    results.push(TestResult {
        name: "gen_zombie_count".into(),
        passed: engine.zombie_count() == config.zombies as usize,
        detail: format!("{} of {} zombies placed", engine.zombie_count(), config.zombies),
    });
    results.push(TestResult {
        name: "gen_colonist_count".into(),
        passed: engine.colonist_count() == config.colonists as usize,
        detail: format!(
            "{} of {} colonists placed",
            engine.colonist_count(),
            config.colonists
        ),
    });
    results.push(TestResult {
        name: "gen_colony_center".into(),
        passed: engine.colony_center.is_some_and(|c| engine.grid.in_bounds(c)),
        detail: format!("colony at {:?}", engine.colony_center),
    });

    let problems = invariant_violations(engine);
    results.push(TestResult {
        name: "gen_invariants".into(),
        passed: problems.is_empty(),
        detail: problems
            .first()
            .cloned()
            .unwrap_or_else(|| "positions and occupancy consistent".into()),
    });
    results
}

// ── 2. Run ──────────────────────────────────────────────────────────────

fn validate_run(engine: &mut SimulationEngine, args: &Args) -> Vec<TestResult> {
    if !args.json {
        println!("--- Running {} ticks ---", args.ticks);
    }
    let mut results = Vec::new();
    let mut first_problem: Option<(u64, String)> = None;
    let mut violations = 0usize;
    let mut peak_raging = 0usize;

    for _ in 0..args.ticks {
        engine.update();
        peak_raging = peak_raging.max(engine.raging_count());
        let problems = invariant_violations(engine);
        violations += problems.len();
        if first_problem.is_none() {
            if let Some(p) = problems.into_iter().next() {
                first_problem = Some((engine.tick(), p));
            }
        }
        if args.verbose && !args.json && engine.tick() % 250 == 0 {
            println!(
                "  tick {:6}: zombies={} raging={} colonists={} corpses={}",
                engine.tick(),
                engine.zombie_count(),
                engine.raging_count(),
                engine.colonist_count(),
                engine.corpse_count()
            );
        }
    }

    results.push(TestResult {
        name: "run_invariants".into(),
        passed: violations == 0,
        detail: match first_problem {
            None => format!("{} ticks without violations", args.ticks),
            Some((tick, p)) => format!("{} violations, first at tick {}: {}", violations, tick, p),
        },
    });

    let resolved: u64 = engine.step_counts.values().sum();
    results.push(TestResult {
        name: "run_zombies_resolved".into(),
        passed: args.ticks == 0 || resolved > 0,
        detail: format!("{} zombie ticks resolved", resolved),
    });

    results.push(TestResult {
        name: "run_rage_bounded".into(),
        passed: engine.stats.rages_ended <= engine.stats.rages_started,
        detail: format!(
            "{} started, {} ended, peak {} raging",
            engine.stats.rages_started, engine.stats.rages_ended, peak_raging
        ),
    });
    results
}

// ── 3. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(engine: &SimulationEngine, args: &Args) -> Vec<TestResult> {
    if !args.json {
        println!("--- Save / Load ---");
    }
    let mut results = Vec::new();

    let mut buf = Vec::new();
    if let Err(e) = engine.save(&mut buf) {
        results.push(TestResult {
            name: "save".into(),
            passed: false,
            detail: e.to_string(),
        });
        return results;
    }

    let mut a = SimulationEngine::new(0);
    let mut b = SimulationEngine::new(0);
    let loaded = a.load(buf.as_slice()).and_then(|_| b.load(buf.as_slice()));
    if let Err(e) = loaded {
        results.push(TestResult {
            name: "load".into(),
            passed: false,
            detail: e.to_string(),
        });
        return results;
    }

    results.push(TestResult {
        name: "persist_state_restored".into(),
        passed: a.tick() == engine.tick()
            && a.zombie_count() == engine.zombie_count()
            && a.corpse_count() == engine.corpse_count()
            && a.grid == engine.grid
            && a.stats == engine.stats,
        detail: format!("{} bytes, tick {}", buf.len(), a.tick()),
    });

    for _ in 0..100 {
        a.update();
        b.update();
    }
    results.push(TestResult {
        name: "persist_resume_deterministic".into(),
        passed: a.stats == b.stats && a.grid == b.grid,
        detail: "two loads of one save run identically".into(),
    });
    let problems = invariant_violations(&a);
    results.push(TestResult {
        name: "persist_resume_invariants".into(),
        passed: problems.is_empty(),
        detail: problems
            .first()
            .cloned()
            .unwrap_or_else(|| "loaded world keeps running cleanly".into()),
    });
    results
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(
    timeline: &SettingsTimeline,
    config: &MapConfig,
    args: &Args,
) -> Vec<TestResult> {
    if !args.json {
        println!("--- Determinism ---");
    }
    let ticks = args.ticks.min(300);
    let run = || {
        let mut engine = SimulationEngine::new(args.seed);
        engine.set_timeline(timeline.clone());
        engine.generate(config.clone());
        for _ in 0..ticks {
            engine.update();
        }
        let counts: HashMap<Step, u64> = engine.step_counts.clone();
        (engine.stats, engine.grid.clone(), counts)
    };
    let (stats_a, grid_a, steps_a) = run();
    let (stats_b, grid_b, steps_b) = run();

    vec![TestResult {
        name: "same_seed_same_run".into(),
        passed: stats_a == stats_b && grid_a == grid_b && steps_a == steps_b,
        detail: format!("seed {} over {} ticks", args.seed, ticks),
    }]
}
