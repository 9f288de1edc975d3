use clap::{CommandFactory, Parser};
use mpris_mock_player::player::BUS_NAME;
use mpris_mock_player::Args;

#[test]
fn defaults_match_the_fixture_contract() {
    let args = Args::parse_from(["mpris-mock-player"]);
    assert_eq!(args.bus_name, BUS_NAME);
    assert_eq!(args.timeout_secs, 5);
}

#[test]
fn bus_name_and_timeout_can_be_overridden() {
    let args = Args::parse_from([
        "mpris-mock-player",
        "--bus-name",
        "org.mpris.MediaPlayer2.scratch",
        "--timeout-secs",
        "30",
    ]);
    assert_eq!(args.bus_name, "org.mpris.MediaPlayer2.scratch");
    assert_eq!(args.timeout_secs, 30);
}

#[test]
fn command_definition_is_consistent() {
    Args::command().debug_assert();
}
