//! Tally view state
//!
//! Owns the last known scores and everything derived from them. Poll
//! outcomes go in through [`TallyState::apply`]; the renderer pulls a
//! [`TallyView`] for the current instant.

use std::time::{Duration, Instant};

use crate::combo::{ComboSettings, ComboTracker};
use crate::config::TallyConfig;
use crate::effects::{ease_out, EffectFrame, EffectSet, EffectSettings};
use crate::scores::{Increase, Scores, Team};
use crate::Result;

/// Something worth logging that happened while applying an update
#[derive(Debug, Clone, PartialEq)]
pub enum TallyEvent {
    Connected,
    Disconnected { error: String },
    Increased { increase: Increase, scale: f64, chain: u32, key: u64 },
}

impl std::fmt::Display for TallyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyEvent::Connected => f.write_str("connected"),
            TallyEvent::Disconnected { error } => write!(f, "disconnected: {error}"),
            TallyEvent::Increased { increase, scale, chain, .. } => write!(
                f,
                "{} {} -> {} (+{}) scale {:.2} chain {}",
                increase.team,
                increase.from,
                increase.to,
                increase.delta(),
                scale,
                chain
            ),
        }
    }
}

/// Per-team slice of the view
#[derive(Debug, Clone, PartialEq)]
pub struct TeamView {
    pub team: Team,
    pub label: String,
    pub count: u64,
    pub percentage: f64,
    /// Animated bar fill in percent, trailing `percentage`
    pub bar_fill: f64,
    /// Shimmer sweep position, 0..1
    pub shimmer: f64,
    pub scale: f64,
    pub chain: u32,
    pub anim_key: u64,
    pub effects: Option<EffectFrame>,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TallyView {
    pub title: String,
    pub total: u64,
    pub connected: bool,
    pub teams: [TeamView; 2],
}

impl TallyView {
    /// Connectivity badge text
    pub fn badge(&self) -> &'static str {
        if self.connected {
            "C"
        } else {
            "D"
        }
    }

    pub fn team(&self, team: Team) -> &TeamView {
        &self.teams[team.index()]
    }
}

const BAR_TWEEN: Duration = Duration::from_millis(800);
const SHIMMER_PERIOD: Duration = Duration::from_secs(2);

/// Bar fill easing from its previous value to the latest percentage
#[derive(Debug, Clone, Copy, Default)]
struct BarTween {
    from: f64,
    to: f64,
    since: Option<Instant>,
}

impl BarTween {
    fn value(&self, now: Instant) -> f64 {
        let Some(since) = self.since else {
            return self.to;
        };
        let t = now.saturating_duration_since(since).as_secs_f64() / BAR_TWEEN.as_secs_f64();
        self.from + (self.to - self.from) * ease_out(t)
    }

    fn retarget(&mut self, target: f64, now: Instant) {
        if (target - self.to).abs() > f64::EPSILON {
            *self = BarTween {
                from: self.value(now),
                to: target,
                since: Some(now),
            };
        }
    }
}

pub struct TallyState {
    epoch: Instant,
    title: String,
    labels: [String; 2],
    scores: Scores,
    previous: Scores,
    connected: bool,
    combos: [ComboTracker; 2],
    anim_keys: [u64; 2],
    bars: [BarTween; 2],
    effects: EffectSet,
}

impl TallyState {
    pub fn new(config: &TallyConfig) -> Self {
        let combo = ComboSettings::from(config);
        Self {
            epoch: Instant::now(),
            title: config.title.clone(),
            labels: [config.team1_label.clone(), config.team2_label.clone()],
            scores: Scores::default(),
            previous: Scores::default(),
            connected: true,
            combos: [ComboTracker::new(combo), ComboTracker::new(combo)],
            anim_keys: [0, 0],
            bars: [BarTween::default(); 2],
            effects: EffectSet::new(EffectSettings::from(config)),
        }
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn previous(&self) -> Scores {
        self.previous
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn anim_key(&self, team: Team) -> u64 {
        self.anim_keys[team.index()]
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    /// Apply one poll outcome. A failure keeps the last known scores.
    pub fn apply(&mut self, outcome: Result<Scores>, now: Instant) -> Vec<TallyEvent> {
        match outcome {
            Ok(scores) => {
                let mut events = Vec::new();
                if !self.connected {
                    tracing::info!("Scores endpoint reachable again");
                    events.push(TallyEvent::Connected);
                }
                self.connected = true;
                events.extend(self.update(scores, now));
                events
            }
            Err(e) => {
                let was_connected = self.connected;
                self.connected = false;
                if was_connected {
                    tracing::warn!(error = %e, "Scores endpoint unreachable");
                    vec![TallyEvent::Disconnected { error: e.to_string() }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Local +1 for a team, handled exactly like a polled increase
    pub fn bump(&mut self, team: Team, now: Instant) -> Vec<TallyEvent> {
        let mut next = self.scores;
        let count = next.get_mut(team);
        *count = count.saturating_add(1);
        self.update(next, now)
    }

    fn update(&mut self, scores: Scores, now: Instant) -> Vec<TallyEvent> {
        self.previous = self.scores;
        self.scores = scores;
        for team in Team::ALL {
            self.bars[team.index()].retarget(self.scores.percentage(team), now);
        }

        self.scores
            .increases_since(&self.previous)
            .into_iter()
            .map(|increase| {
                let idx = increase.team.index();
                let scale = self.combos[idx].register(now);
                let chain = self.combos[idx].chain(now);
                self.anim_keys[idx] += 1;
                let key = self.anim_keys[idx];
                self.effects.spawn(increase.team, key, scale, now);

                tracing::info!(
                    team = %increase.team,
                    from = increase.from,
                    to = increase.to,
                    scale,
                    chain,
                    "Vote increase"
                );
                TallyEvent::Increased { increase, scale, chain, key }
            })
            .collect()
    }

    /// Drop finished effects
    pub fn tick(&mut self, now: Instant) {
        self.effects.prune(now);
    }

    pub fn view(&self, now: Instant) -> TallyView {
        let shimmer = (now.saturating_duration_since(self.epoch).as_secs_f64()
            % SHIMMER_PERIOD.as_secs_f64())
            / SHIMMER_PERIOD.as_secs_f64();

        let team_view = |team: Team| TeamView {
            team,
            label: self.labels[team.index()].clone(),
            count: self.scores.get(team),
            percentage: self.scores.percentage(team),
            bar_fill: self.bars[team.index()].value(now),
            shimmer,
            scale: self.combos[team.index()].scale(now),
            chain: self.combos[team.index()].chain(now),
            anim_key: self.anim_keys[team.index()],
            effects: self.effects.frame(team, now),
        };

        TallyView {
            title: self.title.clone(),
            total: self.scores.total(),
            connected: self.connected,
            teams: [team_view(Team::One), team_view(Team::Two)],
        }
    }
}
