use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::clipboard;
use crate::data::{Matchup, OddsPayload};
use crate::odds::{favorite_of, sort_by_favorite_price};

const MAX_LOGS: usize = 200;
const NOTICE_SECS: u64 = 3;

/// Which vertical half of a row a drop landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropHalf {
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient banner shown after a user-initiated action.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub shown_at: Instant,
}

/// Discrete gestures from the presentation layer. Everything the UI can do to
/// the board goes through `apply_command`, so the board's contract is
/// testable without a terminal.
#[derive(Debug, Clone)]
pub enum UiCommand {
    Reorder {
        from: usize,
        to: usize,
        half: DropHalf,
    },
    Pick {
        game_id: String,
        team: String,
    },
    WeekChange(u32),
    Export,
    Import(String),
    Reset,
}

/// All mutable board state: the ranked slate (position 0 = highest
/// confidence), the pick per game id, the current week, and the original
/// payload kept only to recompute the defaults baseline.
pub struct AppState {
    pub games: Vec<Matchup>,
    pub picks: HashMap<String, String>,
    pub current_week: u32,
    pub payload: OddsPayload,
    pub selected: usize,
    pub notice: Option<Notice>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            games: Vec::with_capacity(16),
            picks: HashMap::with_capacity(16),
            current_week: 1,
            payload: OddsPayload::default(),
            selected: 0,
            notice: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    /// Replaces the slate with the default order (ascending favorite price)
    /// and defaults every pick to the favorite. Used on first load, on week
    /// change and on reset.
    pub fn initialize(&mut self, mut games: Vec<Matchup>) {
        sort_by_favorite_price(&mut games);
        self.picks = games
            .iter()
            .map(|g| (g.id.clone(), favorite_of(g).label))
            .collect();
        self.games = games;
        self.clamp_selection();
    }

    /// Adopts a previously persisted slate and pick set verbatim. The caller
    /// (the persistence adapter) has already validated it against the live
    /// slate.
    pub fn restore(&mut self, games: Vec<Matchup>, picks: HashMap<String, String>) {
        self.games = games;
        self.picks = picks;
        self.clamp_selection();
    }

    /// Moves the element at `from` so it sits at index `to` in the
    /// post-removal sequence. Out-of-range indices and `from == to` are
    /// rejected as no-ops; the list is never left partially mutated.
    pub fn move_game(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        if from >= self.games.len() || to >= self.games.len() {
            self.push_log(format!(
                "[WARN] Reorder indices out of range: {from} -> {to} (len {})",
                self.games.len()
            ));
            return;
        }
        let game = self.games.remove(from);
        self.games.insert(to, game);
    }

    pub fn set_pick(&mut self, game_id: &str, team: &str) {
        self.picks.insert(game_id.to_string(), team.to_string());
    }

    /// 1-based confidence rank for a list position; derived from position
    /// alone so rank and order can never diverge.
    pub fn confidence_rank(&self, index: usize) -> usize {
        self.games.len() - index
    }

    /// The default slate and picks for the current week, recomputed from the
    /// original payload without touching live state.
    pub fn defaults(&self) -> (Vec<Matchup>, HashMap<String, String>) {
        let mut games = self.payload.week_games(self.current_week);
        sort_by_favorite_price(&mut games);
        let picks = games
            .iter()
            .map(|g| (g.id.clone(), favorite_of(g).label))
            .collect();
        (games, picks)
    }

    /// True when the live order differs from the default order, or any live
    /// pick differs from its default. Games the user has not picked yet do
    /// not count as changes.
    pub fn has_changed_from_defaults(&self) -> bool {
        let (default_games, default_picks) = self.defaults();
        let live_order: Vec<&str> = self.games.iter().map(|g| g.id.as_str()).collect();
        let default_order: Vec<&str> = default_games.iter().map(|g| g.id.as_str()).collect();
        if live_order != default_order {
            return true;
        }
        self.picks
            .iter()
            .any(|(id, pick)| default_picks.get(id) != Some(pick))
    }

    pub fn select_next(&mut self) {
        if !self.games.is_empty() && self.selected + 1 < self.games.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        if self.games.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.games.len() {
            self.selected = self.games.len() - 1;
        }
    }

    pub fn notify(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.notice = Some(Notice {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    pub fn maybe_clear_notice(&mut self, now: Instant) {
        if let Some(notice) = &self.notice {
            if now.duration_since(notice.shown_at).as_secs() >= NOTICE_SECS {
                self.notice = None;
            }
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

/// Translates a drop gesture into the insertion index `move_game` expects.
/// The half-row rule is asymmetric: dropping in the lower half of a row means
/// "after this row", which only needs an index bump when the dragged row came
/// from below the target (removal from above already shifts the insertion
/// point); the upper half mirrors this with a decrement. Kept exactly as the
/// drag handlers have always behaved; off-by-one regressions here reorder the
/// wrong row.
pub fn resolve_drop_index(from: usize, target: usize, half: DropHalf) -> usize {
    match half {
        DropHalf::Lower if from > target => target + 1,
        DropHalf::Upper if from < target => target.saturating_sub(1),
        _ => target,
    }
}

/// Applies one UI gesture to the board. Pure state transition except for
/// `Export`, which returns the table text for the caller to hand to the
/// clipboard host (the only host-facing side effect is left to the binder).
pub fn apply_command(state: &mut AppState, cmd: UiCommand) -> Option<String> {
    match cmd {
        UiCommand::Reorder { from, to, half } => {
            let to = resolve_drop_index(from, to, half);
            state.move_game(from, to);
            None
        }
        UiCommand::Pick { game_id, team } => {
            state.set_pick(&game_id, &team);
            None
        }
        UiCommand::WeekChange(week) => {
            state.current_week = week;
            let slate = state.payload.week_games(week);
            state.initialize(slate);
            state.push_log(format!("[INFO] Switched to week {week}"));
            None
        }
        UiCommand::Export => Some(clipboard::export_table(&state.games, &state.picks)),
        UiCommand::Import(text) => {
            let imported = clipboard::import_table(&text);
            if imported.games.is_empty() {
                state.notify("Clipboard data invalid or empty.", NoticeKind::Error);
                return None;
            }
            if imported.picks.is_empty() {
                // Legacy rows carry no picks; keep existing picks that still
                // refer to a game in the imported slate.
                let ids: Vec<String> = imported.games.iter().map(|g| g.id.clone()).collect();
                state.picks.retain(|id, _| ids.contains(id));
            } else {
                state.picks = imported.picks;
            }
            state.games = imported.games;
            state.clamp_selection();
            state.notify("Data imported successfully!", NoticeKind::Success);
            None
        }
        UiCommand::Reset => {
            let slate = state.payload.week_games(state.current_week);
            state.initialize(slate);
            state.notify("Reset to default order and selections!", NoticeKind::Success);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn notice_survives_early_ticks_and_then_dismisses() {
        let mut state = AppState::new();
        state.notify("Exported to clipboard!", NoticeKind::Success);
        let shown_at = state.notice.as_ref().unwrap().shown_at;

        state.maybe_clear_notice(shown_at + Duration::from_secs(1));
        assert!(state.notice.is_some());

        state.maybe_clear_notice(shown_at + Duration::from_secs(NOTICE_SECS));
        assert!(state.notice.is_none());
    }

    #[test]
    fn drop_lower_half_from_above_keeps_target() {
        assert_eq!(resolve_drop_index(1, 4, DropHalf::Lower), 4);
    }

    #[test]
    fn drop_lower_half_from_below_bumps_target() {
        assert_eq!(resolve_drop_index(4, 1, DropHalf::Lower), 2);
    }

    #[test]
    fn drop_upper_half_from_below_keeps_target() {
        assert_eq!(resolve_drop_index(4, 1, DropHalf::Upper), 1);
    }

    #[test]
    fn drop_upper_half_from_above_decrements_target() {
        assert_eq!(resolve_drop_index(1, 4, DropHalf::Upper), 3);
    }

    #[test]
    fn drop_upper_half_at_top_saturates() {
        assert_eq!(resolve_drop_index(0, 1, DropHalf::Upper), 0);
    }
}
