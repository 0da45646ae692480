//! One-shot discovery commands: `locate`, `verify`, `catalog`.

use localmart_core::{CatalogFilters, CatalogScope, LocationCandidate};
use localmart_discovery::{
    check_serviceability, resolve_catalog, resolve_location, verify_and_accept, AcceptedLocation,
    CatalogResolution, DiscoveryConfig, DiscoveryError, LocationSession, LocationSessionStore,
    MemorySessionStore, Serviceability, SessionId, MIN_QUERY_CHARS,
};

async fn lookup_candidate(pool: &sqlx::PgPool, pincode: &str) -> anyhow::Result<LocationCandidate> {
    localmart_db::get_active_pincode(pool, pincode)
        .await?
        .map(LocationCandidate::from)
        .ok_or_else(|| anyhow::anyhow!("no active location with pincode '{pincode}'; try `locate`"))
}

/// Verify `pincode` and accept it on `session`.
///
/// A confirmed "no vendors" outcome is reported to the user and yields
/// `None`; the session then has no location.
pub(crate) async fn accept_pincode<T: LocationSessionStore>(
    pool: &sqlx::PgPool,
    session: &LocationSession<'_, T>,
    pincode: &str,
) -> anyhow::Result<Option<AcceptedLocation>> {
    let candidate = lookup_candidate(pool, pincode).await?;
    match verify_and_accept(pool, session, candidate).await {
        Ok(accepted) => {
            println!(
                "location set: {} ({}), {}",
                accepted.city(),
                accepted.pincode(),
                accepted.state()
            );
            Ok(Some(accepted))
        }
        Err(e @ DiscoveryError::NotServiceable { .. }) => {
            eprintln!("{}", e.user_message());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn scope_description(scope: &CatalogScope) -> String {
    match scope {
        CatalogScope::Pincode(pincode) => format!("shops in pincode {pincode}"),
        CatalogScope::City(city) => format!("shops across {city}"),
        CatalogScope::Unscoped => "all shops".to_string(),
    }
}

pub(crate) fn print_resolution(resolution: &CatalogResolution) {
    println!(
        "{} product(s), {}",
        resolution.products.len(),
        scope_description(&resolution.scope)
    );
    if resolution.products.is_empty() {
        return;
    }

    let header = format!("{:>10}  {:<28}{:<16}PRODUCT", "PRICE", "VENDOR", "CATEGORY");
    println!("{header}");
    for product in &resolution.products {
        println!(
            "{:>10}  {:<28}{:<16}{}",
            product.price.round_dp(2),
            product.vendor.business_name,
            product.category_name,
            product.name
        );
    }
}

/// Print candidate areas for `query`.
///
/// # Errors
///
/// Returns an error if the lookup query fails.
pub(crate) async fn run_locate(pool: &sqlx::PgPool, query: &str) -> anyhow::Result<()> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        println!("type at least {MIN_QUERY_CHARS} characters to search");
        return Ok(());
    }

    let candidates = resolve_location(pool, query).await?;
    if candidates.is_empty() {
        println!("no serviceable areas match '{}'", query.trim());
        return Ok(());
    }

    let header = format!("{:<9}{:<20}{:<20}AREA", "PINCODE", "CITY", "STATE");
    println!("{header}");
    for candidate in &candidates {
        println!(
            "{:<9}{:<20}{:<20}{}",
            candidate.pincode,
            candidate.city,
            candidate.state,
            candidate.area_locality.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Report whether `pincode` has approved vendors. Nothing is persisted.
///
/// # Errors
///
/// Returns an error if the pincode is unknown or a query fails.
pub(crate) async fn run_verify(pool: &sqlx::PgPool, pincode: &str) -> anyhow::Result<()> {
    let candidate = lookup_candidate(pool, pincode).await?;
    match check_serviceability(pool, &candidate.pincode).await? {
        Serviceability::Serviceable { approved_vendors } => println!(
            "{} ({}) is serviceable: {approved_vendors} approved vendor(s)",
            candidate.city, candidate.pincode
        ),
        Serviceability::NoVendors => println!(
            "{} ({}): No shops available in this area yet",
            candidate.city, candidate.pincode
        ),
    }
    Ok(())
}

/// Print the catalog once.
///
/// With `pincode`, the area is verified first; an area without approved
/// vendors falls back to the unscoped listing.
///
/// # Errors
///
/// Returns an error if the pincode is unknown or a query fails.
pub(crate) async fn run_catalog(
    pool: &sqlx::PgPool,
    config: &DiscoveryConfig,
    pincode: Option<&str>,
    filters: &CatalogFilters,
) -> anyhow::Result<()> {
    let sessions = MemorySessionStore::new();
    let session = LocationSession::new(&sessions, SessionId::new());
    let accepted = match pincode {
        Some(pincode) => accept_pincode(pool, &session, pincode).await?,
        None => None,
    };

    let resolution = resolve_catalog(pool, accepted.as_ref(), filters, config).await?;
    print_resolution(&resolution);
    Ok(())
}
