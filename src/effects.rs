//! Timed visual effects
//!
//! Each detected increase spawns a [`Burst`] for the team: a particle
//! spray, a background flash, a border flash, three ripple rings, eight
//! radiating glyphs and an avatar wobble. A new burst replaces the team's
//! previous one, so at most one burst per team is ever alive.
//!
//! Bursts hold only their start time and random draws. [`Burst::frame`]
//! evaluates every tween at a given instant, which keeps rendering a pure
//! function of time. All positions are in avatar pixels relative to the
//! avatar centre, where the avatar has radius [`AVATAR_RADIUS`].

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::{TallyConfig, MAX_PARTICLES};
use crate::scores::Team;

pub const AVATAR_RADIUS: f64 = 100.0;
pub const PARTICLE_SPREAD: f64 = 50.0;
pub const GLYPH_COUNT: usize = 8;
pub const GLYPH_DISTANCE: f64 = 150.0;

const PARTICLE_TWEEN: Duration = Duration::from_millis(800);
const GLYPH_DURATION: Duration = Duration::from_millis(1000);
const GLYPH_STAGGER: Duration = Duration::from_millis(50);
const WOBBLE_DURATION: Duration = Duration::from_millis(600);

/// Target scale, duration and delay of each ripple ring
const RINGS: [(f64, u64, u64); 3] = [(2.5, 1000, 0), (2.8, 1200, 100), (3.2, 1400, 200)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colours and glyphs for one side
#[derive(Debug)]
pub struct TeamStyle {
    pub primary: Rgb,
    pub accent: Rgb,
    pub flash_tint: Rgb,
    pub border: Rgb,
    pub rings: [Rgb; 3],
    pub particles: [Rgb; 4],
    pub glyph: char,
    pub wobble: [f64; 4],
}

static TEAM_ONE: TeamStyle = TeamStyle {
    primary: Rgb(0x31, 0x82, 0xce),
    accent: Rgb(0x63, 0xb3, 0xed),
    flash_tint: Rgb(0x1a, 0x36, 0x5d),
    border: Rgb(0x42, 0x99, 0xe1),
    rings: [Rgb(0x63, 0xb3, 0xed), Rgb(0x76, 0xe4, 0xf7), Rgb(0x90, 0xcd, 0xf4)],
    particles: [
        Rgb(0x31, 0x82, 0xce),
        Rgb(0x63, 0xb3, 0xed),
        Rgb(0x42, 0x99, 0xe1),
        Rgb(0x2c, 0x52, 0x82),
    ],
    glyph: '✦',
    wobble: [0.0, -5.0, 5.0, 0.0],
};

static TEAM_TWO: TeamStyle = TeamStyle {
    primary: Rgb(0xe5, 0x3e, 0x3e),
    accent: Rgb(0xfc, 0x81, 0x81),
    flash_tint: Rgb(0x63, 0x17, 0x1b),
    border: Rgb(0xf5, 0x65, 0x65),
    rings: [Rgb(0xfc, 0x81, 0x81), Rgb(0xf6, 0x87, 0xb3), Rgb(0xfe, 0xb2, 0xb2)],
    particles: [
        Rgb(0xe5, 0x3e, 0x3e),
        Rgb(0xfc, 0x81, 0x81),
        Rgb(0xf5, 0x65, 0x65),
        Rgb(0xc5, 0x30, 0x30),
    ],
    glyph: '♥',
    wobble: [0.0, 5.0, -5.0, 0.0],
};

pub fn team_style(team: Team) -> &'static TeamStyle {
    match team {
        Team::One => &TEAM_ONE,
        Team::Two => &TEAM_TWO,
    }
}

/// Cubic ease-out
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Linear interpolation across evenly spaced keyframes
pub fn keyframes(values: &[f64], t: f64) -> f64 {
    match values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let t = t.clamp(0.0, 1.0);
            let segments = (values.len() - 1) as f64;
            let pos = t * segments;
            let i = (pos.floor() as usize).min(values.len() - 2);
            lerp(values[i], values[i + 1], pos - i as f64)
        }
    }
}

/// Linear progress of a delayed tween, clamped to 0..=1
fn progress(elapsed: Duration, delay: Duration, duration: Duration) -> f64 {
    let Some(running) = elapsed.checked_sub(delay) else {
        return 0.0;
    };
    if duration.is_zero() {
        return 1.0;
    }
    (running.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Effect parameters taken from the config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSettings {
    pub particle_count: usize,
    pub particle_lifetime: Duration,
    pub flash_duration: Duration,
    pub combo_base: f64,
}

impl From<&TallyConfig> for EffectSettings {
    fn from(config: &TallyConfig) -> Self {
        Self {
            particle_count: config.particle_count,
            particle_lifetime: config.particle_lifetime(),
            flash_duration: config.flash_duration(),
            combo_base: config.combo_base,
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self::from(&TallyConfig::default())
    }
}

impl EffectSettings {
    /// How far above the base combo scale `intensity` is, never below 1
    fn boost(&self, intensity: f64) -> f64 {
        if self.combo_base <= 0.0 {
            return 1.0;
        }
        (intensity / self.combo_base).max(1.0)
    }

    pub fn particles_for(&self, intensity: f64) -> usize {
        let scaled = (self.particle_count as f64 * self.boost(intensity)).round();
        scaled.min(MAX_PARTICLES as f64) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

/// All effects spawned by one increase
#[derive(Debug, Clone)]
pub struct Burst {
    pub team: Team,
    pub key: u64,
    pub started: Instant,
    pub intensity: f64,
    pub particles: Vec<Particle>,
    settings: EffectSettings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFrame {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub opacity: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashFrame {
    pub color: Rgb,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    /// Ring radius in avatar pixels
    pub radius: f64,
    pub opacity: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphFrame {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub glyph: char,
}

/// Every live effect of a burst evaluated at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct EffectFrame {
    pub team: Team,
    pub key: u64,
    pub particles: Vec<ParticleFrame>,
    pub background_flash: Option<FlashFrame>,
    pub border_flash: Option<FlashFrame>,
    pub rings: Vec<RingFrame>,
    pub glyphs: Vec<GlyphFrame>,
    /// Avatar rotation in degrees
    pub wobble: f64,
}

impl Burst {
    pub fn new<R: Rng + ?Sized>(
        team: Team,
        key: u64,
        intensity: f64,
        started: Instant,
        settings: EffectSettings,
        first_particle_id: u64,
        rng: &mut R,
    ) -> Self {
        let style = team_style(team);
        let spread = PARTICLE_SPREAD * settings.boost(intensity);
        let particles = (0..settings.particles_for(intensity))
            .map(|i| Particle {
                id: first_particle_id + i as u64,
                x: rng.gen_range(-spread..spread),
                y: rng.gen_range(-spread..spread),
                color: style.particles[rng.gen_range(0..style.particles.len())],
            })
            .collect();

        Self {
            team,
            key,
            started,
            intensity,
            particles,
            settings,
        }
    }

    /// Longest-running effect of this burst
    pub fn lifetime(&self) -> Duration {
        let rings = RINGS
            .iter()
            .map(|&(_, duration, delay)| Duration::from_millis(duration + delay))
            .max()
            .unwrap_or_default();
        let glyphs = GLYPH_DURATION + GLYPH_STAGGER * (GLYPH_COUNT as u32 - 1);

        [
            self.settings.particle_lifetime,
            self.settings.flash_duration,
            WOBBLE_DURATION,
            rings,
            glyphs,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.lifetime()
    }

    pub fn frame(&self, now: Instant) -> EffectFrame {
        let elapsed = now.saturating_duration_since(self.started);
        let style = team_style(self.team);

        let particles = if elapsed < self.settings.particle_lifetime {
            let t = ease_out(progress(elapsed, Duration::ZERO, PARTICLE_TWEEN));
            self.particles
                .iter()
                .map(|p| ParticleFrame {
                    x: p.x * t,
                    y: p.y * t,
                    scale: 1.0 - t,
                    opacity: 1.0 - t,
                    color: p.color,
                })
                .collect()
        } else {
            Vec::new()
        };

        let flashing = elapsed < self.settings.flash_duration;
        let flash_t = progress(elapsed, Duration::ZERO, self.settings.flash_duration);
        let background_flash = flashing.then(|| FlashFrame {
            color: style.flash_tint,
            opacity: keyframes(&[0.0, 0.3, 0.0], flash_t),
        });
        let border_flash = flashing.then(|| FlashFrame {
            color: style.border,
            opacity: 1.0 - ease_out(flash_t),
        });

        let rings = RINGS
            .iter()
            .zip(style.rings)
            .filter_map(|(&(target, duration, delay), color)| {
                let delay = Duration::from_millis(delay);
                let duration = Duration::from_millis(duration);
                if elapsed >= delay + duration {
                    return None;
                }
                let t = ease_out(progress(elapsed, delay, duration));
                Some(RingFrame {
                    radius: AVATAR_RADIUS * lerp(1.0, target, t),
                    opacity: 1.0 - t,
                    color,
                })
            })
            .collect();

        let glyphs = (0..GLYPH_COUNT)
            .filter_map(|idx| {
                let delay = GLYPH_STAGGER * idx as u32;
                if elapsed >= delay + GLYPH_DURATION {
                    return None;
                }
                let t = ease_out(progress(elapsed, delay, GLYPH_DURATION));
                let rad = (idx as f64 * 45.0) * PI / 180.0;
                Some(GlyphFrame {
                    x: rad.cos() * GLYPH_DISTANCE * t,
                    y: rad.sin() * GLYPH_DISTANCE * t,
                    scale: 1.5 * t,
                    rotation: 360.0 * t,
                    opacity: 1.0 - t,
                    glyph: style.glyph,
                })
            })
            .collect();

        let wobble = if elapsed < WOBBLE_DURATION {
            keyframes(
                &style.wobble,
                ease_out(progress(elapsed, Duration::ZERO, WOBBLE_DURATION)),
            )
        } else {
            0.0
        };

        EffectFrame {
            team: self.team,
            key: self.key,
            particles,
            background_flash,
            border_flash,
            rings,
            glyphs,
            wobble,
        }
    }
}

/// The live bursts, at most one per team
#[derive(Debug)]
pub struct EffectSet {
    settings: EffectSettings,
    bursts: [Option<Burst>; 2],
    next_particle_id: u64,
}

impl EffectSet {
    pub fn new(settings: EffectSettings) -> Self {
        Self {
            settings,
            bursts: [None, None],
            next_particle_id: 0,
        }
    }

    pub fn spawn(&mut self, team: Team, key: u64, intensity: f64, now: Instant) {
        self.spawn_with_rng(team, key, intensity, now, &mut rand::thread_rng());
    }

    /// Replace the team's burst with a fresh one
    pub fn spawn_with_rng<R: Rng + ?Sized>(
        &mut self,
        team: Team,
        key: u64,
        intensity: f64,
        now: Instant,
        rng: &mut R,
    ) {
        let burst = Burst::new(team, key, intensity, now, self.settings, self.next_particle_id, rng);
        self.next_particle_id += burst.particles.len() as u64;
        self.bursts[team.index()] = Some(burst);
    }

    /// Drop bursts whose every effect has finished
    pub fn prune(&mut self, now: Instant) {
        for slot in &mut self.bursts {
            if slot.as_ref().is_some_and(|b| b.is_expired(now)) {
                *slot = None;
            }
        }
    }

    pub fn burst(&self, team: Team) -> Option<&Burst> {
        self.bursts[team.index()].as_ref()
    }

    pub fn frame(&self, team: Team, now: Instant) -> Option<EffectFrame> {
        self.burst(team)
            .filter(|b| !b.is_expired(now))
            .map(|b| b.frame(now))
    }

    pub fn active_count(&self) -> usize {
        self.bursts.iter().flatten().count()
    }

    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }
}
