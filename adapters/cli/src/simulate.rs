//! Headless play-through of a chart by a seeded bot.

use std::{fmt, time::Duration};

use anyhow::{ensure, Context, Result};
use keyfall_core::{GameState, Grade, HitCounts, Lane, NoteRecord, Transport};
use keyfall_session::{ManualTransport, Session};
use keyfall_system_chart::PreparedChart;
use keyfall_world::query;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::config::GameConfig;

/// Seconds simulated past the last note before giving up on a game over.
const TAIL_SECONDS: f64 = 2.0;

/// How the bot plays.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BotProfile {
    /// Standard deviation of press timing error in milliseconds.
    pub(crate) jitter_ms: f64,
    /// Probability of ignoring a note entirely.
    pub(crate) skip_rate: f64,
    /// Seed for the bot's random stream.
    pub(crate) seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Press {
    time: f64,
    lane: Lane,
}

/// End-of-song report produced by a simulated attempt.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SimulationSummary {
    pub(crate) title: String,
    pub(crate) final_state: GameState,
    pub(crate) score: u64,
    pub(crate) max_combo: u32,
    pub(crate) hit_counts: HitCounts,
    pub(crate) total_notes: usize,
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  state      {:?}", self.final_state)?;
        writeln!(f, "  score      {}", self.score)?;
        writeln!(
            f,
            "  max combo  {} / {}",
            self.max_combo, self.total_notes
        )?;
        for grade in Grade::ALL {
            writeln!(f, "  {:<10} {}", grade.to_string(), self.hit_counts.grade(grade))?;
        }
        write!(f, "  {:<10} {}", "Miss", self.hit_counts.missed())
    }
}

/// Plays the chart with a bot and reports the outcome.
pub(crate) fn simulate(
    chart: &PreparedChart,
    config: &GameConfig,
    profile: &BotProfile,
) -> Result<SimulationSummary> {
    let presses = schedule(&chart.notes, profile)?;
    let mut session = Session::new(&chart.notes, config.gameplay.clone(), ManualTransport::new())
        .context("failed to build the rhythm world")?;

    session.on_key_down("Space");
    session.on_key_up("Space");

    let tick = config.engine.tick_rate();
    let deadline = chart
        .notes
        .iter()
        .map(|note| note.time)
        .fold(0.0_f64, f64::max)
        + config.gameplay.windows().outer()
        + TAIL_SECONDS;

    run(&mut session, &presses, tick, deadline);

    let snapshot = session.snapshot();
    Ok(SimulationSummary {
        title: chart.entry.name.clone(),
        final_state: snapshot.state,
        score: snapshot.score,
        max_combo: snapshot.max_combo,
        hit_counts: snapshot.hit_counts,
        total_notes: snapshot.total_notes(),
    })
}

fn schedule(notes: &[NoteRecord], profile: &BotProfile) -> Result<Vec<Press>> {
    ensure!(
        (0.0..=1.0).contains(&profile.skip_rate),
        "skip rate must lie in 0..=1 (received {})",
        profile.skip_rate
    );
    let jitter = Normal::new(0.0, profile.jitter_ms / 1_000.0)
        .context("jitter must be a non-negative number of milliseconds")?;
    let mut rng = ChaCha8Rng::seed_from_u64(profile.seed);

    let mut presses: Vec<Press> = notes
        .iter()
        .filter_map(|note| {
            let skipped = rng.gen_bool(profile.skip_rate);
            let offset = jitter.sample(&mut rng);
            (!skipped).then(|| Press {
                time: (note.time + offset).max(0.0),
                lane: note.lane,
            })
        })
        .collect();
    presses.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(presses)
}

fn run(session: &mut Session<ManualTransport>, presses: &[Press], tick: Duration, deadline: f64) {
    let tick_seconds = tick.as_secs_f64();
    let mut pending = presses.iter().peekable();

    while query::state(session.world()) != GameState::GameOver {
        let now = session.transport().now();
        if now > deadline {
            log::warn!("simulation stopped at {now:.3}s without reaching game over");
            break;
        }

        let target = now + tick_seconds;
        while let Some(press) = pending.next_if(|press| press.time <= target) {
            let current = session.transport().now();
            if press.time > current {
                session.transport_mut().advance(press.time - current);
            }
            session.on_key_down(press.lane.code());
            session.on_key_up(press.lane.code());
        }

        let current = session.transport().now();
        if target > current {
            session.transport_mut().advance(target - current);
        }
        session.update(tick);
    }
}
