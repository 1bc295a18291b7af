//! The Instance Builder: reduces a full catalog to the minimal structure the solver needs.
//!
//! See the Python reference (`preprocess_data`) that this module transcribes: filter packages
//! to those touching the requested games, fold the two price quotes into full-period costs,
//! and group offers by game.

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::catalog::{Cents, Game, GameId, Offer, Package, PackageId};

/// Packages able to stream a single game. Most games have a handful of offering packages, so
/// this stays inline rather than heap-allocating per game.
pub(crate) type PackagesForGame = SmallVec<[PackageId; 4]>;

/// The reduced, solver-ready view of a catalog for one request.
///
/// Built once per request by [`build_reduced_instance`] and then possibly narrowed further by
/// [`crate::preference::apply_preferences`].
#[derive(Debug, Clone)]
pub struct ReducedInstance {
    /// Packages touching at least one requested game.
    pub(crate) packages: Vec<PackageId>,

    /// Requested games that have at least one offer (narrowed further by preference shaping).
    pub(crate) games: Vec<GameId>,

    /// Game id -> calendar start date.
    pub(crate) game_dates: FxHashMap<GameId, NaiveDate>,

    /// Package id -> monthly price in cents, for packages sold monthly.
    pub(crate) c_month: FxHashMap<PackageId, Cents>,

    /// Package id -> full-year price in cents (`12 *` the yearly-subscription monthly quote),
    /// for packages sold yearly.
    pub(crate) c_year: FxHashMap<PackageId, Cents>,

    /// Game id -> packages that can stream it, sorted by package id for deterministic variable
    /// creation order.
    pub(crate) p_g: FxHashMap<GameId, PackagesForGame>,

    /// Requested games with no offer at all.
    pub(crate) games_with_no_offers: Vec<GameId>,

    /// The filtered per-game offer rows the builder derived `p_g` from. Retained so the
    /// preference shaper can rebuild `p_g` in hard mode without re-deriving it from the raw
    /// catalog.
    pub(crate) offers: Vec<Offer>,
}

impl ReducedInstance {
    /// Packages touching at least one requested game.
    #[must_use]
    pub fn packages(&self) -> &[PackageId] {
        &self.packages
    }

    /// Requested games that have at least one offer.
    #[must_use]
    pub fn games(&self) -> &[GameId] {
        &self.games
    }

    /// Requested games that have no offer at all.
    #[must_use]
    pub fn games_with_no_offers(&self) -> &[GameId] {
        &self.games_with_no_offers
    }

    /// Monthly prices, keyed by package id, for packages sold monthly.
    #[must_use]
    pub fn c_month(&self) -> &FxHashMap<PackageId, Cents> {
        &self.c_month
    }

    /// Full-year prices, keyed by package id, for packages sold yearly.
    #[must_use]
    pub fn c_year(&self) -> &FxHashMap<PackageId, Cents> {
        &self.c_year
    }

    /// The packages that can stream a given game, if any.
    #[must_use]
    pub fn packages_for_game(&self, game: &GameId) -> Option<&[PackageId]> {
        self.p_g.get(game).map(SmallVec::as_slice)
    }

    /// The calendar start date of a given game, if it is part of this instance.
    #[must_use]
    pub fn game_date(&self, game: &GameId) -> Option<NaiveDate> {
        self.game_dates.get(game).copied()
    }

    /// `true` if there is nothing left to cover (empty request, or every requested game was
    /// uncoverable).
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.games.is_empty()
    }
}

/// Step 1-7 of §4.1: reduce a full catalog to a [`ReducedInstance`] touching exactly the
/// requested games.
///
/// Requested game ids that are not present in `games_meta` at all are silently dropped (they
/// never reach `games` or `games_with_no_offers`), mirroring the host layer's own
/// pre-filtering and the pandas `isin` semantics of the original implementation.
#[must_use]
pub fn build_reduced_instance(
    requested: &[GameId],
    offers: &[Offer],
    packages: &[Package],
    games_meta: &[Game],
) -> ReducedInstance {
    let requested_set: FxHashSet<&GameId> = requested.iter().collect();

    // Step 1: packages touching a requested game.
    let relevant_pkg_ids: FxHashSet<&PackageId> = offers
        .iter()
        .filter(|o| requested_set.contains(&o.game_id))
        .map(|o| &o.streaming_package_id)
        .collect();

    // Step 2: retain only relevant packages; fold the yearly quote into a full-year price.
    let mut c_month = FxHashMap::default();
    let mut c_year = FxHashMap::default();
    let mut package_ids = Vec::new();

    for package in packages {
        if !relevant_pkg_ids.contains(&package.id) {
            continue;
        }

        package_ids.push(package.id.clone());

        if let Some(monthly) = package.monthly_price_cents {
            c_month.insert(package.id.clone(), monthly);
        }

        if let Some(yearly_monthly_quote) = package.monthly_price_yearly_subscription_in_cents {
            c_year.insert(package.id.clone(), 12 * yearly_monthly_quote);
        }
    }

    package_ids.sort();

    // Step 3: games restricted to the requested ids.
    let game_dates: FxHashMap<GameId, NaiveDate> = games_meta
        .iter()
        .filter(|g| requested_set.contains(&g.id))
        .map(|g| (g.id.clone(), g.start_date))
        .collect();

    // Step 4: offers restricted to the requested ids.
    let filtered_offers: Vec<Offer> = offers
        .iter()
        .filter(|o| requested_set.contains(&o.game_id))
        .cloned()
        .collect();

    // Step 6: distinct packages per game, sorted for deterministic variable creation order.
    let p_g = build_p_g(&filtered_offers);

    // Step 7: partition requested (and catalog-known) games by offer presence.
    let mut games = Vec::new();
    let mut games_with_no_offers = Vec::new();

    for game_id in game_dates.keys() {
        if p_g.contains_key(game_id) {
            games.push(game_id.clone());
        } else {
            games_with_no_offers.push(game_id.clone());
        }
    }

    games.sort();
    games_with_no_offers.sort();

    ReducedInstance {
        packages: package_ids,
        games,
        game_dates,
        c_month,
        c_year,
        p_g,
        games_with_no_offers,
        offers: filtered_offers,
    }
}

/// Group offers by game id, deduplicating repeated (game, package) rows and sorting each
/// game's package list by id.
pub(crate) fn build_p_g(offers: &[Offer]) -> FxHashMap<GameId, PackagesForGame> {
    let mut seen: FxHashMap<GameId, FxHashSet<PackageId>> = FxHashMap::default();

    for offer in offers {
        seen.entry(offer.game_id.clone())
            .or_default()
            .insert(offer.streaming_package_id.clone());
    }

    seen.into_iter()
        .map(|(game_id, packages)| {
            let mut packages: PackagesForGame = packages.into_iter().collect();
            packages.sort();
            (game_id, packages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(game: &str, package: &str, live: bool, highlights: bool) -> Offer {
        Offer {
            game_id: GameId::new(game),
            streaming_package_id: PackageId::new(package),
            live,
            highlights,
        }
    }

    fn package(id: &str, monthly: Option<i64>, yearly_monthly_quote: Option<i64>) -> Package {
        Package {
            id: PackageId::new(id),
            name: id.to_string(),
            monthly_price_cents: monthly,
            monthly_price_yearly_subscription_in_cents: yearly_monthly_quote,
        }
    }

    fn game(id: &str, date: NaiveDate) -> Game {
        Game {
            id: GameId::new(id),
            start_date: date,
        }
    }

    #[test]
    fn yearly_price_is_twelve_times_the_monthly_quote() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default();
        let instance = build_reduced_instance(
            &[GameId::new("g1")],
            &[offer("g1", "p1", true, true)],
            &[package("p1", Some(30), Some(10))],
            &[game("g1", d)],
        );

        assert_eq!(instance.c_year().get(&PackageId::new("p1")), Some(&120));
    }

    #[test]
    fn null_prices_do_not_collapse_to_zero() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default();
        let instance = build_reduced_instance(
            &[GameId::new("g1")],
            &[offer("g1", "p1", true, true)],
            &[package("p1", None, None)],
            &[game("g1", d)],
        );

        assert!(instance.c_month().is_empty());
        assert!(instance.c_year().is_empty());
        // The package is still "retained" (it touches a requested game) even though it has no
        // purchasable plan; the solver simply never creates a variable for it.
        assert_eq!(instance.packages(), &[PackageId::new("p1")]);
    }

    #[test]
    fn games_with_no_offers_are_excluded_from_games() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default();
        let instance = build_reduced_instance(
            &[GameId::new("g1"), GameId::new("g2")],
            &[offer("g1", "p1", true, true)],
            &[package("p1", Some(30), None)],
            &[game("g1", d), game("g2", d)],
        );

        assert_eq!(instance.games(), &[GameId::new("g1")]);
        assert_eq!(instance.games_with_no_offers(), &[GameId::new("g2")]);
    }

    #[test]
    fn duplicate_offer_rows_for_same_game_package_collapse_to_one_entry() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default();
        let instance = build_reduced_instance(
            &[GameId::new("g1")],
            &[
                offer("g1", "p1", true, false),
                offer("g1", "p1", false, true),
            ],
            &[package("p1", Some(30), None)],
            &[game("g1", d)],
        );

        assert_eq!(
            instance.packages_for_game(&GameId::new("g1")),
            Some(&[PackageId::new("p1")][..])
        );
    }

    #[test]
    fn requested_game_absent_from_catalog_is_silently_dropped() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default();
        let instance = build_reduced_instance(
            &[GameId::new("g1"), GameId::new("ghost")],
            &[offer("g1", "p1", true, true)],
            &[package("p1", Some(30), None)],
            &[game("g1", d)],
        );

        assert_eq!(instance.games(), &[GameId::new("g1")]);
        assert!(instance.games_with_no_offers().is_empty());
    }

    #[test]
    fn empty_request_yields_trivial_instance() {
        let instance = build_reduced_instance(&[], &[], &[], &[]);

        assert!(instance.is_trivial());
        assert!(instance.packages().is_empty());
    }
}
