//! Tally configuration with builder pattern

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default scores API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

/// Upper bound on particles per burst, whatever the combo intensity
pub const MAX_PARTICLES: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TallyConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Two increases closer than this chain into a combo
    pub combo_window_ms: u64,
    pub combo_base: f64,
    pub combo_step: f64,
    pub combo_cap: f64,
    /// How long a combo scale is held after the latest increase
    pub scale_hold_ms: u64,
    pub particle_count: usize,
    pub particle_lifetime_ms: u64,
    pub flash_duration_ms: u64,
    pub frame_rate: u32,
    pub title: String,
    pub team1_label: String,
    pub team2_label: String,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_ms: 1000,
            request_timeout_ms: 5000,
            combo_window_ms: 500,
            combo_base: 1.3,
            combo_step: 0.15,
            combo_cap: 1.6,
            scale_hold_ms: 600,
            particle_count: 15,
            particle_lifetime_ms: 1000,
            flash_duration_ms: 800,
            frame_rate: 30,
            title: "DANCE BATTLE".to_string(),
            team1_label: "TEAM 1".to_string(),
            team2_label: "TEAM 2".to_string(),
        }
    }
}

impl TallyConfig {
    pub fn builder() -> TallyConfigBuilder {
        TallyConfigBuilder::default()
    }

    /// Load a TOML config file. Missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: TallyConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(crate::Error::Config("api_base_url cannot be empty".into()));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(crate::Error::Config(format!(
                "api_base_url must be http(s): {}",
                self.api_base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(crate::Error::Config("poll_interval_ms must be positive".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(crate::Error::Config("request_timeout_ms must be positive".into()));
        }
        if self.combo_window_ms == 0 || self.scale_hold_ms == 0 {
            return Err(crate::Error::Config("combo timings must be positive".into()));
        }
        if self.particle_lifetime_ms == 0 || self.flash_duration_ms == 0 {
            return Err(crate::Error::Config("effect durations must be positive".into()));
        }
        if !(1.0..=self.combo_cap).contains(&self.combo_base) {
            return Err(crate::Error::Config(format!(
                "combo_base must be within 1.0..={}, got {}",
                self.combo_cap, self.combo_base
            )));
        }
        if self.combo_step < 0.0 {
            return Err(crate::Error::Config("combo_step cannot be negative".into()));
        }
        if self.particle_count > MAX_PARTICLES {
            return Err(crate::Error::Config(format!(
                "particle_count must be at most {MAX_PARTICLES}"
            )));
        }
        if !(1..=120).contains(&self.frame_rate) {
            return Err(crate::Error::Config("frame_rate must be within 1..=120".into()));
        }
        Ok(())
    }

    /// Full URL of the scores endpoint
    pub fn scores_url(&self) -> String {
        format!("{}/scores", self.api_base_url.trim_end_matches('/'))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn combo_window(&self) -> Duration {
        Duration::from_millis(self.combo_window_ms)
    }

    pub fn scale_hold(&self) -> Duration {
        Duration::from_millis(self.scale_hold_ms)
    }

    pub fn particle_lifetime(&self) -> Duration {
        Duration::from_millis(self.particle_lifetime_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }
}

#[derive(Default)]
pub struct TallyConfigBuilder {
    config: TallyConfig,
}

impl TallyConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn combo_window_ms(mut self, ms: u64) -> Self {
        self.config.combo_window_ms = ms;
        self
    }

    pub fn combo(mut self, base: f64, step: f64, cap: f64) -> Self {
        self.config.combo_base = base;
        self.config.combo_step = step;
        self.config.combo_cap = cap;
        self
    }

    pub fn scale_hold_ms(mut self, ms: u64) -> Self {
        self.config.scale_hold_ms = ms;
        self
    }

    pub fn particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.config.frame_rate = fps;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn team_labels(mut self, team1: impl Into<String>, team2: impl Into<String>) -> Self {
        self.config.team1_label = team1.into();
        self.config.team2_label = team2.into();
        self
    }

    pub fn build(self) -> TallyConfig {
        self.config
    }

    pub fn build_validated(self) -> crate::Result<TallyConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TallyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.combo_window(), Duration::from_millis(500));
        assert_eq!(config.particle_count, 15);
    }

    #[test]
    fn test_config_builder() {
        let config = TallyConfig::builder()
            .api_base_url("https://votes.example.com/api")
            .poll_interval_ms(250)
            .combo(1.2, 0.1, 1.5)
            .team_labels("RED", "BLUE")
            .build();

        assert_eq!(config.api_base_url, "https://votes.example.com/api");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.combo_cap, 1.5);
        assert_eq!(config.team2_label, "BLUE");
    }

    #[test]
    fn test_config_validation() {
        assert!(TallyConfig::builder().api_base_url("").build_validated().is_err());
        assert!(TallyConfig::builder().api_base_url("ftp://x").build_validated().is_err());
        assert!(TallyConfig::builder().poll_interval_ms(0).build_validated().is_err());
        assert!(TallyConfig::builder().combo(1.8, 0.1, 1.6).build_validated().is_err());
        assert!(TallyConfig::builder().combo(0.5, 0.1, 1.6).build_validated().is_err());
        assert!(TallyConfig::builder().combo(1.3, -0.1, 1.6).build_validated().is_err());
        assert!(TallyConfig::builder().particle_count(1000).build_validated().is_err());
        assert!(TallyConfig::builder().frame_rate(0).build_validated().is_err());
        assert!(TallyConfig::builder().build_validated().is_ok());
    }

    #[test]
    fn test_scores_url_trims_trailing_slash() {
        let config = TallyConfig::builder().api_base_url("http://host/api/").build();
        assert_eq!(config.scores_url(), "http://host/api/scores");
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"https://votes.example.com/api\"").unwrap();
        writeln!(file, "poll_interval_ms = 2000").unwrap();
        writeln!(file, "title = \"FINAL ROUND\"").unwrap();

        let config = TallyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.title, "FINAL ROUND");
        assert_eq!(config.combo_window_ms, 500);
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pol_interval = 5").unwrap();

        let err = TallyConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = TallyConfig::builder().title("X").build();
        let text = toml::to_string(&config).unwrap();
        let back: TallyConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
