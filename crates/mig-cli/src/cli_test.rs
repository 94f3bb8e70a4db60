use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn parse_limit() {
    assert_eq!("3".parse::<Limit>().unwrap(), Limit::Count(3));
    assert_eq!("ALL".parse::<Limit>().unwrap(), Limit::All);
    assert_eq!("0".parse::<Limit>().unwrap(), Limit::Count(0));
    assert!("-1".parse::<Limit>().is_err());
    assert!("many".parse::<Limit>().is_err());
}

#[test]
fn parse_up_with_globals() {
    let cli = Cli::try_parse_from(["mig", "-p", "proj", "up", "2", "-d", "db.duckdb"]).unwrap();
    assert_eq!(cli.global.project_dir, "proj");
    assert_eq!(cli.global.database.as_deref(), Some("db.duckdb"));
    match cli.command {
        Commands::Up(args) => assert_eq!(args.limit, Some(Limit::Count(2))),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_history_defaults() {
    let cli = Cli::try_parse_from(["mig", "history"]).unwrap();
    match cli.command {
        Commands::History(args) => {
            assert_eq!(args.limit, Limit::Count(10));
            assert_eq!(args.output, ListOutput::Table);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["mig", "new", "all", "-o", "json"]).unwrap();
    match cli.command {
        Commands::New(args) => {
            assert_eq!(args.limit, Limit::All);
            assert_eq!(args.output, ListOutput::Json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn to_requires_target() {
    assert!(Cli::try_parse_from(["mig", "to"]).is_err());
    let cli = Cli::try_parse_from(["mig", "mark", "240101_000000"]).unwrap();
    assert!(matches!(cli.command, Commands::Mark(ref args) if args.target == "240101_000000"));
}
