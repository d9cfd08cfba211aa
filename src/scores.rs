//! Score tuple and delta detection

use serde::{Deserialize, Serialize};

/// One of the two competing sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::One, Team::Two];

    pub fn index(self) -> usize {
        match self {
            Team::One => 0,
            Team::Two => 1,
        }
    }

    /// Key in the scores payload
    pub fn key(self) -> &'static str {
        match self {
            Team::One => "team1",
            Team::Two => "team2",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Counters returned by the scores endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub team1: u64,
    pub team2: u64,
}

impl Scores {
    pub fn new(team1: u64, team2: u64) -> Self {
        Self { team1, team2 }
    }

    pub fn get(&self, team: Team) -> u64 {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut u64 {
        match team {
            Team::One => &mut self.team1,
            Team::Two => &mut self.team2,
        }
    }

    pub fn total(&self) -> u64 {
        self.team1.saturating_add(self.team2)
    }

    /// Share of the total in percent, 0 when nobody has voted yet
    pub fn percentage(&self, team: Team) -> f64 {
        let total = self.team1 as f64 + self.team2 as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.get(team) as f64 / total * 100.0
    }

    /// Teams whose count went up since `previous`
    pub fn increases_since(&self, previous: &Scores) -> Vec<Increase> {
        Team::ALL
            .into_iter()
            .filter_map(|team| {
                let (from, to) = (previous.get(team), self.get(team));
                (to > from).then_some(Increase { team, from, to })
            })
            .collect()
    }
}

/// A detected rise in one team's count between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Increase {
    pub team: Team,
    pub from: u64,
    pub to: u64,
}

impl Increase {
    pub fn delta(&self) -> u64 {
        self.to - self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_empty() {
        let scores = Scores::default();
        assert_eq!(scores.total(), 0);
        assert_eq!(scores.percentage(Team::One), 0.0);
        assert_eq!(scores.percentage(Team::Two), 0.0);
    }

    #[test]
    fn test_percentage_split() {
        let scores = Scores::new(3, 1);
        assert_eq!(scores.total(), 4);
        assert_eq!(scores.percentage(Team::One), 75.0);
        assert_eq!(scores.percentage(Team::Two), 25.0);
    }

    #[test]
    fn test_percentage_near_u64_max_sums_to_100() {
        let even = Scores::new(u64::MAX, u64::MAX);
        assert_eq!(even.percentage(Team::One), 50.0);
        assert_eq!(even.percentage(Team::Two), 50.0);

        let lopsided = Scores::new(u64::MAX, u64::MAX / 3);
        let sum = lopsided.percentage(Team::One) + lopsided.percentage(Team::Two);
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((lopsided.percentage(Team::Two) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_increases_detects_both_sides() {
        let prev = Scores::new(10, 4);
        let next = Scores::new(12, 5);
        let ups = next.increases_since(&prev);
        assert_eq!(ups.len(), 2);
        assert_eq!(ups[0], Increase { team: Team::One, from: 10, to: 12 });
        assert_eq!(ups[0].delta(), 2);
        assert_eq!(ups[1].team, Team::Two);
    }

    #[test]
    fn test_decrease_and_equal_are_ignored() {
        let prev = Scores::new(10, 4);
        assert!(Scores::new(9, 4).increases_since(&prev).is_empty());
        assert!(prev.increases_since(&prev).is_empty());
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let scores: Scores =
            serde_json::from_str(r#"{"team1": 7, "team2": 2, "updated": "now"}"#).unwrap();
        assert_eq!(scores, Scores::new(7, 2));
    }

    #[test]
    fn test_decode_rejects_negative() {
        assert!(serde_json::from_str::<Scores>(r#"{"team1": -1, "team2": 2}"#).is_err());
        assert!(serde_json::from_str::<Scores>(r#"{"team1": 1}"#).is_err());
    }
}
