use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::data::Matchup;
use crate::odds::displayed_odds;
use crate::persist;

pub const EXPORT_HEADER: &str = "Confidence\tAway\tAway Odds\tHome\tHome Odds\tInfo\tPick";

const CLIPBOARD_FILE: &str = "clipboard.tsv";

/// Result of importing a pasted table.
#[derive(Debug, Default)]
pub struct Imported {
    pub games: Vec<Matchup>,
    pub picks: HashMap<String, String>,
}

/// Renders the slate as a tab-separated table, one row per game in current
/// order. Odds columns carry the raw price text as written in the odds
/// string (sign and marker preserved), not the parsed integers.
pub fn export_table(games: &[Matchup], picks: &HashMap<String, String>) -> String {
    let mut lines = Vec::with_capacity(games.len() + 1);
    lines.push(EXPORT_HEADER.to_string());
    for (i, game) in games.iter().enumerate() {
        let (away, home) = game.sides();
        let (away_odds, home_odds) = displayed_odds(&game.odds, away, home);
        let pick = picks.get(&game.id).map(String::as_str).unwrap_or("");
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            games.len() - i,
            away,
            away_odds,
            home,
            home_odds,
            game.info,
            pick
        ));
    }
    lines.join("\n")
}

/// Parses a pasted table back into a slate. The header decides the layout:
/// "away" + "pick" (case-insensitive) means the current 7-column format,
/// anything else falls back to the legacy 4-column one (confidence, matchup,
/// odds, info) with no picks. Rows with missing columns degrade to empty
/// fields. Imported games get fresh sequential ids, so identity never
/// survives a round trip, only content; the ★ marker is not reconstructed
/// either.
pub fn import_table(text: &str) -> Imported {
    let mut lines = text.trim().lines();
    let Some(header) = lines.next() else {
        return Imported::default();
    };
    let header = header.to_lowercase();
    let current_format = header.contains("away") && header.contains("pick");

    let mut imported = Imported::default();
    for (idx, line) in lines.enumerate() {
        let cols: Vec<&str> = line.split('\t').collect();
        let col = |n: usize| cols.get(n).copied().unwrap_or("").to_string();
        let id = (idx + 1).to_string();

        if current_format {
            let (away, away_odds) = (col(1), col(2));
            let (home, home_odds) = (col(3), col(4));
            imported.games.push(Matchup {
                id: id.clone(),
                matchup: format!("{away} vs. {home}"),
                odds: format!("{away}: {away_odds} / {home}: {home_odds}"),
                info: col(5),
                commence_time: Utc::now().to_rfc3339(),
                over_under: None,
                implied_home: None,
                implied_away: None,
            });
            let pick = col(6);
            if !pick.is_empty() {
                imported.picks.insert(id, pick);
            }
        } else {
            imported.games.push(Matchup {
                id,
                matchup: col(1),
                odds: col(2),
                info: col(3),
                commence_time: Utc::now().to_rfc3339(),
                over_under: None,
                implied_home: None,
                implied_away: None,
            });
        }
    }
    imported
}

/// Terminal processes have no portable clipboard, so the host side is an
/// exchange file next to the persistence store: export writes it, import
/// reads it, and external tools can do either. Construction fails (and every
/// caller degrades to a no-op) when no cache location exists.
pub struct ClipboardFile {
    path: PathBuf,
}

impl ClipboardFile {
    pub fn from_env() -> Option<Self> {
        Some(Self {
            path: persist::cache_dir()?.join(CLIPBOARD_FILE),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn write(&self, text: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        fs::write(&self.path, text)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))
    }
}
