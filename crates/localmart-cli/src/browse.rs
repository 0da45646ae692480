//! Interactive `browse` session over a [`CatalogFeed`].
//!
//! Each stdin line is one edit. Filter edits are debounced by the feed;
//! results are printed whenever the feed publishes a new snapshot.

use localmart_core::{CatalogFilters, SortOrder};
use localmart_discovery::{
    CatalogFeed, DiscoveryConfig, FeedOutcome, FeedSnapshot, LocationSession, MemorySessionStore,
    SessionId,
};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::discover::{accept_pincode, print_resolution};

const HELP: &str = "\
commands (one per line):
  search=<text>        product name contains <text>; empty clears
  category=<id>        category id; empty clears
  sub_category=<id>    sub-category id; empty clears
  type=<business type> vendor business type; empty clears
  min_price=<amount>   inclusive lower bound; empty clears
  max_price=<amount>   inclusive upper bound; empty clears
  sort=<order>         price_asc | price_desc | newest
  location=<pincode>   verify and switch location
  clear                forget the current location
  reset                restore default filters
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FilterEdit {
    Search(Option<String>),
    Category(Option<i64>),
    SubCategory(Option<i64>),
    BusinessType(Option<String>),
    MinPrice(Option<Decimal>),
    MaxPrice(Option<Decimal>),
    Sort(SortOrder),
    Reset,
}

impl FilterEdit {
    pub(crate) fn apply(self, filters: &mut CatalogFilters) {
        match self {
            FilterEdit::Search(text) => filters.search_text = text,
            FilterEdit::Category(id) => filters.category_id = id,
            FilterEdit::SubCategory(id) => filters.sub_category_id = id,
            FilterEdit::BusinessType(kind) => filters.business_type = kind,
            FilterEdit::MinPrice(amount) => filters.price_floor = amount,
            FilterEdit::MaxPrice(amount) => filters.price_ceiling = amount,
            FilterEdit::Sort(order) => filters.sort_order = order,
            FilterEdit::Reset => filters.reset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BrowseCommand {
    Filter(FilterEdit),
    Location(String),
    ClearLocation,
    Help,
    Quit,
}

fn optional<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("invalid value for {key}: '{value}'"))
}

/// Parse one line of `browse` input.
pub(crate) fn parse_browse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    match line {
        "quit" | "exit" => return Ok(BrowseCommand::Quit),
        "reset" => return Ok(BrowseCommand::Filter(FilterEdit::Reset)),
        "clear" => return Ok(BrowseCommand::ClearLocation),
        "help" | "?" => return Ok(BrowseCommand::Help),
        _ => {}
    }

    let Some((key, value)) = line.split_once('=') else {
        return Err(format!("unrecognized command '{line}'; type `help`"));
    };
    let key = key.trim();
    let value = value.trim();

    let edit = match key {
        "search" => FilterEdit::Search(Some(value.to_string()).filter(|s| !s.is_empty())),
        "category" => FilterEdit::Category(optional(key, value)?),
        "sub_category" => FilterEdit::SubCategory(optional(key, value)?),
        "type" => FilterEdit::BusinessType(Some(value.to_string()).filter(|s| !s.is_empty())),
        "min_price" => FilterEdit::MinPrice(optional(key, value)?),
        "max_price" => FilterEdit::MaxPrice(optional(key, value)?),
        "sort" => FilterEdit::Sort(value.parse().map_err(|e| format!("{e}"))?),
        "location" if !value.is_empty() => return Ok(BrowseCommand::Location(value.to_string())),
        _ => return Err(format!("unrecognized command '{line}'; type `help`")),
    };
    Ok(BrowseCommand::Filter(edit))
}

fn print_snapshot(snapshot: &FeedSnapshot) {
    match &snapshot.outcome {
        FeedOutcome::Idle => {}
        FeedOutcome::Ready(resolution) => {
            println!();
            print_resolution(resolution);
        }
        FeedOutcome::Failed(message) => eprintln!("{message}"),
    }
}

/// Run the interactive browse loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or a location lookup fails.
pub(crate) async fn run_browse(
    pool: &sqlx::PgPool,
    config: DiscoveryConfig,
    pincode: Option<&str>,
) -> anyhow::Result<()> {
    let sessions = MemorySessionStore::new();
    let session = LocationSession::new(&sessions, SessionId::new());
    let accepted = match pincode {
        Some(pincode) => accept_pincode(pool, &session, pincode).await?,
        None => None,
    };

    let feed = CatalogFeed::spawn(pool.clone(), config, accepted);
    let mut snapshots = feed.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_browse_command(&line) {
                    Ok(BrowseCommand::Quit) => break,
                    Ok(BrowseCommand::Help) => println!("{HELP}"),
                    Ok(BrowseCommand::Filter(edit)) => feed.update_filters(|f| edit.apply(f)),
                    Ok(BrowseCommand::Location(pincode)) => {
                        match accept_pincode(pool, &session, &pincode).await {
                            Ok(accepted) => feed.set_location(accepted),
                            Err(e) => eprintln!("{e}"),
                        }
                    }
                    Ok(BrowseCommand::ClearLocation) => {
                        session.invalidate().await?;
                        feed.set_location(None);
                        println!("location cleared");
                    }
                    Err(message) => eprintln!("{message}"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
        }
    }

    Ok(())
}
