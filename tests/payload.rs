use std::fs;
use std::path::PathBuf;

use pickem_terminal::data::parse_payload;
use pickem_terminal::state::AppState;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_odds_payload_fixture() {
    let payload = parse_payload(&read_fixture("nfl_odds.json")).expect("fixture should parse");
    assert_eq!(payload.current_week, 5);
    assert_eq!(payload.games.len(), 3);
    assert_eq!(payload.last_updated, "2025-10-01T14:30:00.000Z");

    let bears = &payload.games[0];
    assert_eq!(bears.sides(), ("Bears", "Packers"));
    assert_eq!(bears.over_under, Some(44.5));
    assert_eq!(bears.implied_home, Some(25.0));

    // Display fields are optional.
    assert!(payload.games[2].over_under.is_none());
}

#[test]
fn week_buckets_are_scoped() {
    let payload = parse_payload(&read_fixture("nfl_odds.json")).expect("fixture should parse");
    assert_eq!(payload.week_games(5).len(), 3);
    assert_eq!(payload.week_games(6).len(), 1);
    assert!(payload.week_games(7).is_empty());
}

#[test]
fn fixture_board_derives_default_order_and_picks() {
    let payload = parse_payload(&read_fixture("nfl_odds.json")).expect("fixture should parse");
    let mut state = AppState::new();
    state.current_week = payload.current_week;
    let slate = payload.week_games(payload.current_week);
    state.payload = payload;
    state.initialize(slate);

    // Heaviest favorite first; the odds-less Giants game falls back to the
    // home side at price 0 and sorts last.
    let ids: Vec<&str> = state.games.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["a2", "a1", "a3"]);
    assert_eq!(state.picks.get("a2").unwrap(), "Chiefs");
    assert_eq!(state.picks.get("a1").unwrap(), "Packers");
    assert_eq!(state.picks.get("a3").unwrap(), "Giants");
    assert!(!state.has_changed_from_defaults());
}

#[test]
fn corrupt_payload_is_an_error() {
    assert!(parse_payload("{\"games\": 7}").is_err());
    assert!(parse_payload("").is_err());
}
