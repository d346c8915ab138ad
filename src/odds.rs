use crate::data::Matchup;

/// A moneyline pair extracted from a matchup's odds string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOdds {
    pub favorite: String,
    pub favorite_price: i32,
    pub underdog: String,
    pub underdog_price: i32,
}

/// Default pick for a matchup: the favored side and its price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteInfo {
    pub label: String,
    pub price: i32,
}

/// Parses `"<Team>: <price> ★ / <Team>: <price>"` into a favorite/underdog
/// pair. American odds: the numerically smaller price is the favorite. Returns
/// `None` when the separator or either team label is missing, or when a price
/// does not reduce to an integer. Never guesses; callers own the fallback.
pub fn parse_odds(odds: &str, away: &str, home: &str) -> Option<ParsedOdds> {
    if !odds.contains('/') || !odds.contains(away) || !odds.contains(home) {
        return None;
    }

    let mut away_price: Option<i32> = None;
    let mut home_price: Option<i32> = None;
    for part in odds.split('/').map(str::trim) {
        if let Some(rest) = strip_label_prefix(part, away) {
            away_price = parse_price(rest);
        } else if let Some(rest) = strip_label_prefix(part, home) {
            home_price = parse_price(rest);
        }
    }

    let (away_price, home_price) = (away_price?, home_price?);
    if away_price < home_price {
        Some(ParsedOdds {
            favorite: away.to_string(),
            favorite_price: away_price,
            underdog: home.to_string(),
            underdog_price: home_price,
        })
    } else {
        Some(ParsedOdds {
            favorite: home.to_string(),
            favorite_price: home_price,
            underdog: away.to_string(),
            underdog_price: away_price,
        })
    }
}

fn strip_label_prefix<'a>(part: &'a str, label: &str) -> Option<&'a str> {
    if label.is_empty() {
        return None;
    }
    part.strip_prefix(label)?.strip_prefix(':')
}

/// Keeps digits and minus signs only, so a trailing ★ marker or stray
/// whitespace never reaches the integer parse.
fn parse_price(raw: &str) -> Option<i32> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().ok()
}

/// The favored side of a matchup. When the odds string is unparsable this
/// falls back to the home label at price 0 (the long-standing default-pick
/// policy; pinned by tests, do not change without a migration plan).
pub fn favorite_of(game: &Matchup) -> FavoriteInfo {
    let (away, home) = game.sides();
    match parse_odds(&game.odds, away, home) {
        Some(parsed) => FavoriteInfo {
            label: parsed.favorite,
            price: parsed.favorite_price,
        },
        None => FavoriteInfo {
            label: home.to_string(),
            price: 0,
        },
    }
}

/// Stable ascending sort by favorite price, so the heaviest favorite lands at
/// the top (highest confidence) and equal prices keep their feed order.
pub fn sort_by_favorite_price(games: &mut [Matchup]) {
    games.sort_by_key(|g| favorite_of(g).price);
}

/// Raw price text for each side, as written in the odds string (sign and any
/// marker characters preserved). Used for rendering and export; unlike
/// `parse_odds` this never filters down to digits. Empty strings when the
/// odds string fails the same shape precondition as the parser.
pub fn displayed_odds(odds: &str, away: &str, home: &str) -> (String, String) {
    let mut away_text = String::new();
    let mut home_text = String::new();
    if !odds.contains('/') || !odds.contains(away) || !odds.contains(home) {
        return (away_text, home_text);
    }
    for part in odds.split('/').map(str::trim) {
        if let Some(rest) = strip_label_prefix(part, away) {
            away_text = rest.trim().to_string();
        } else if let Some(rest) = strip_label_prefix(part, home) {
            home_text = rest.trim().to_string();
        }
    }
    (away_text, home_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_odds_finds_favorite_on_either_side() {
        let parsed = parse_odds("Chiefs: -140 ★ / Lions: +120", "Chiefs", "Lions").unwrap();
        assert_eq!(parsed.favorite, "Chiefs");
        assert_eq!(parsed.favorite_price, -140);
        assert_eq!(parsed.underdog, "Lions");
        assert_eq!(parsed.underdog_price, 120);

        let parsed = parse_odds("Bears: +110 / Packers: -130", "Bears", "Packers").unwrap();
        assert_eq!(parsed.favorite, "Packers");
        assert_eq!(parsed.favorite_price, -130);
    }

    #[test]
    fn parse_odds_rejects_missing_pieces() {
        assert!(parse_odds("", "A", "B").is_none());
        assert!(parse_odds("A: -140 B: +120", "A", "B").is_none());
        assert!(parse_odds("A: -140 / C: +120", "A", "B").is_none());
        assert!(parse_odds("A: / B: +120", "A", "B").is_none());
    }

    #[test]
    fn parse_odds_tie_goes_to_home() {
        let parsed = parse_odds("A: -110 / B: -110", "A", "B").unwrap();
        assert_eq!(parsed.favorite, "B");
    }

    #[test]
    fn star_marker_never_reaches_the_price() {
        let parsed = parse_odds("A: -105 ★ / B: +100", "A", "B").unwrap();
        assert_eq!(parsed.favorite_price, -105);
    }

    #[test]
    fn displayed_odds_keeps_raw_text() {
        let (away, home) = displayed_odds("A: -140 ★ / B: +120", "A", "B");
        assert_eq!(away, "-140 ★");
        assert_eq!(home, "+120");
    }

    #[test]
    fn displayed_odds_empty_on_shape_mismatch() {
        assert_eq!(
            displayed_odds("A: -140 ★", "A", "B"),
            (String::new(), String::new())
        );
    }
}
