use super::*;
use crate::browse::{parse_browse_command, BrowseCommand, FilterEdit};

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["localmart-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["localmart-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_seed_with_path() {
    let cli = Cli::try_parse_from(["localmart-cli", "db", "seed", "--path", "demo.yaml"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: Some(ref p) }
        }) if p == std::path::Path::new("demo.yaml")
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["localmart-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn locate_takes_a_positional_query() {
    let cli = Cli::try_parse_from(["localmart-cli", "locate", "pune"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Locate { ref query }) if query == "pune"
    ));
}

#[test]
fn catalog_defaults_to_newest_without_location() {
    let cli = Cli::try_parse_from(["localmart-cli", "catalog"]).unwrap();
    let Some(Commands::Catalog { pincode, filters }) = cli.command else {
        panic!("expected catalog command");
    };
    assert!(pincode.is_none());
    assert_eq!(CatalogFilters::from(filters), CatalogFilters::default());
}

#[test]
fn catalog_parses_filters() {
    let cli = Cli::try_parse_from([
        "localmart-cli",
        "catalog",
        "--pincode",
        "411001",
        "--category-id",
        "3",
        "--max-price",
        "500",
        "--sort",
        "price_asc",
    ])
    .unwrap();
    let Some(Commands::Catalog { pincode, filters }) = cli.command else {
        panic!("expected catalog command");
    };
    let filters = CatalogFilters::from(filters);
    assert_eq!(pincode.as_deref(), Some("411001"));
    assert_eq!(filters.category_id, Some(3));
    assert_eq!(filters.price_ceiling, Some(Decimal::new(500, 0)));
    assert_eq!(filters.sort_order, SortOrder::PriceAsc);
}

#[test]
fn catalog_rejects_unknown_sort() {
    assert!(Cli::try_parse_from(["localmart-cli", "catalog", "--sort", "cheapest"]).is_err());
}

#[test]
fn browse_parses_filter_edits() {
    assert_eq!(
        parse_browse_command("search = lamp"),
        Ok(BrowseCommand::Filter(FilterEdit::Search(Some(
            "lamp".to_string()
        ))))
    );
    assert_eq!(
        parse_browse_command("search="),
        Ok(BrowseCommand::Filter(FilterEdit::Search(None)))
    );
    assert_eq!(
        parse_browse_command("max_price=499.50"),
        Ok(BrowseCommand::Filter(FilterEdit::MaxPrice(Some(
            Decimal::new(49950, 2)
        ))))
    );
    assert_eq!(
        parse_browse_command("sort=price-desc"),
        Ok(BrowseCommand::Filter(FilterEdit::Sort(SortOrder::PriceDesc)))
    );
}

#[test]
fn browse_parses_session_commands() {
    assert_eq!(
        parse_browse_command("location=110001"),
        Ok(BrowseCommand::Location("110001".to_string()))
    );
    assert_eq!(parse_browse_command("clear"), Ok(BrowseCommand::ClearLocation));
    assert_eq!(
        parse_browse_command(" reset "),
        Ok(BrowseCommand::Filter(FilterEdit::Reset))
    );
    assert_eq!(parse_browse_command("quit"), Ok(BrowseCommand::Quit));
}

#[test]
fn browse_rejects_bad_input() {
    assert!(parse_browse_command("category=electronics").is_err());
    assert!(parse_browse_command("location=").is_err());
    assert!(parse_browse_command("colour=red").is_err());
    assert!(parse_browse_command("hello").is_err());
}

#[test]
fn filter_edits_apply_and_reset() {
    let mut filters = CatalogFilters::default();
    FilterEdit::Category(Some(7)).apply(&mut filters);
    FilterEdit::MaxPrice(Some(Decimal::new(500, 0))).apply(&mut filters);
    assert_eq!(filters.category_id, Some(7));
    assert_eq!(filters.price_ceiling, Some(Decimal::new(500, 0)));

    FilterEdit::Reset.apply(&mut filters);
    assert_eq!(filters, CatalogFilters::default());
}

#[test]
fn scope_descriptions_name_the_scope() {
    use localmart_core::CatalogScope;

    assert_eq!(
        discover::scope_description(&CatalogScope::City("Pune".to_string())),
        "shops across Pune"
    );
    assert_eq!(
        discover::scope_description(&CatalogScope::Unscoped),
        "all shops"
    );
}
