use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One scheduled game in the weekly slate, in the shape the odds fetch step
/// writes. `matchup` is the combined `"<Away> vs. <Home>"` label; everything
/// past `info` is opaque display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: String,
    pub matchup: String,
    #[serde(default)]
    pub odds: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub commence_time: String,
    #[serde(rename = "overUnder", skip_serializing_if = "Option::is_none")]
    pub over_under: Option<f64>,
    #[serde(rename = "impliedHome", skip_serializing_if = "Option::is_none")]
    pub implied_home: Option<f64>,
    #[serde(rename = "impliedAway", skip_serializing_if = "Option::is_none")]
    pub implied_away: Option<f64>,
}

impl Matchup {
    /// Splits the combined label into (away, home). A label without the
    /// literal `" vs. "` separator yields the whole string as the away side
    /// and an empty home side, which downstream parsing treats as unparsable.
    pub fn sides(&self) -> (&str, &str) {
        match self.matchup.split_once(" vs. ") {
            Some((away, home)) => (away, home),
            None => (self.matchup.as_str(), ""),
        }
    }

    pub fn away(&self) -> &str {
        self.sides().0
    }

    pub fn home(&self) -> &str {
        self.sides().1
    }
}

/// The JSON document the scheduled fetch script produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsPayload {
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: String,
    #[serde(rename = "currentWeek", default = "default_week")]
    pub current_week: u32,
    #[serde(default)]
    pub games: Vec<Matchup>,
    #[serde(rename = "gamesByWeek", default)]
    pub games_by_week: HashMap<String, Vec<Matchup>>,
}

fn default_week() -> u32 {
    1
}

impl Default for OddsPayload {
    fn default() -> Self {
        Self {
            last_updated: String::new(),
            current_week: default_week(),
            games: Vec::new(),
            games_by_week: HashMap::new(),
        }
    }
}

impl OddsPayload {
    /// The slate for one week: the week-scoped bucket when present, the flat
    /// `games` list when asked for the payload's own week, otherwise empty.
    pub fn week_games(&self, week: u32) -> Vec<Matchup> {
        if let Some(games) = self.games_by_week.get(&week.to_string()) {
            return games.clone();
        }
        if week == self.current_week {
            return self.games.clone();
        }
        Vec::new()
    }
}

pub fn parse_payload(raw: &str) -> Result<OddsPayload> {
    serde_json::from_str(raw).context("invalid odds payload JSON")
}

pub fn load_payload(path: &Path) -> Result<OddsPayload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading odds payload {}", path.display()))?;
    parse_payload(&raw)
}

/// Hard-coded slate used when the payload file is absent or corrupt, so the
/// board still renders something interactive.
pub fn fallback_games() -> Vec<Matchup> {
    FALLBACK_GAMES.clone()
}

static FALLBACK_GAMES: Lazy<Vec<Matchup>> = Lazy::new(|| {
    vec![
        sample_game("1", "Chiefs vs. Lions", "Chiefs: -140 ★ / Lions: +120", "Thu 8:20pm"),
        sample_game("2", "Bears vs. Packers", "Packers: -130 ★ / Bears: +110", "Sun 1:00pm"),
        sample_game("3", "Cowboys vs. Giants", "Cowboys: -125 ★ / Giants: +105", "Sun 8:20pm"),
    ]
});

fn sample_game(id: &str, matchup: &str, odds: &str, info: &str) -> Matchup {
    Matchup {
        id: id.to_string(),
        matchup: matchup.to_string(),
        odds: odds.to_string(),
        info: info.to_string(),
        commence_time: String::new(),
        over_under: None,
        implied_home: None,
        implied_away: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_split_on_vs() {
        let game = sample_game("1", "Bears vs. Packers", "", "");
        assert_eq!(game.sides(), ("Bears", "Packers"));
    }

    #[test]
    fn sides_without_separator_leave_home_empty() {
        let game = sample_game("1", "Pro Bowl skills showdown", "", "");
        assert_eq!(game.sides(), ("Pro Bowl skills showdown", ""));
    }

    #[test]
    fn week_games_prefers_week_bucket() {
        let mut payload = OddsPayload {
            current_week: 4,
            games: fallback_games(),
            ..Default::default()
        };
        payload
            .games_by_week
            .insert("4".to_string(), vec![sample_game("9", "A vs. B", "", "")]);
        assert_eq!(payload.week_games(4).len(), 1);
        assert!(payload.week_games(5).is_empty());
    }

    #[test]
    fn week_games_falls_back_to_flat_list_for_current_week() {
        let payload = OddsPayload {
            current_week: 2,
            games: fallback_games(),
            ..Default::default()
        };
        assert_eq!(payload.week_games(2).len(), 3);
    }
}
