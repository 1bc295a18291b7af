//! The Preference Shaper: turns live/highlight preference weights into either a hard
//! coverage filter or a soft price penalty, applied independently per axis.

use rustc_hash::FxHashSet;

use crate::{
    catalog::{Offer, PackageId, PreferenceMode, Preferences},
    instance::{ReducedInstance, build_p_g},
};

/// Fixed penalty base for the live-coverage soft-preference axis. Stiffer than the highlight
/// base so a live preference dominates a highlight preference at the same weight.
const LIVE_PENALTY_BASE: f64 = 100.0;

/// Fixed penalty base for the highlight-coverage soft-preference axis.
const HIGHLIGHT_PENALTY_BASE: f64 = 30.0;

/// Apply §4.2's preference shaping to a reduced instance, in place.
///
/// Hard-mode axes drop offers lacking the property and rebuild `games`/`p_g`/
/// `games_with_no_offers` from the survivors. Soft-mode axes inflate `c_month`/`c_year` for
/// packages that have at least one offer lacking the property among the requested games. A
/// weight of exactly `0` is a no-op on that axis. The two axes are independent: one may be
/// hard while the other is soft or absent.
pub fn apply_preferences(instance: &mut ReducedInstance, preferences: Preferences) {
    let live_mode = PreferenceMode::for_weight(preferences.live_weight);
    let highlight_mode = PreferenceMode::for_weight(preferences.highlight_weight);

    // Hard filtering happens first and is sequential AND across axes: an offer must satisfy
    // every hard-mode axis to survive. Soft penalties are then computed against whatever
    // offers survived hard filtering, matching the source's order of operations.
    let hard_filtered = apply_hard_filters(&instance.offers, live_mode, highlight_mode);

    if matches!(live_mode, PreferenceMode::Hard) || matches!(highlight_mode, PreferenceMode::Hard)
    {
        rebuild_from_offers(instance, hard_filtered.clone());
    }

    if matches!(live_mode, PreferenceMode::Soft) {
        apply_soft_penalty(
            instance,
            &hard_filtered,
            |o| !o.live,
            LIVE_PENALTY_BASE,
            preferences.live_weight,
        );
    }

    if matches!(highlight_mode, PreferenceMode::Soft) {
        apply_soft_penalty(
            instance,
            &hard_filtered,
            |o| !o.highlights,
            HIGHLIGHT_PENALTY_BASE,
            preferences.highlight_weight,
        );
    }
}

/// Drop offers failing any hard-mode axis. Offers are untouched if neither axis is hard.
fn apply_hard_filters(
    offers: &[Offer],
    live_mode: PreferenceMode,
    highlight_mode: PreferenceMode,
) -> Vec<Offer> {
    offers
        .iter()
        .filter(|o| !(matches!(live_mode, PreferenceMode::Hard) && !o.live))
        .filter(|o| !(matches!(highlight_mode, PreferenceMode::Hard) && !o.highlights))
        .cloned()
        .collect()
}

/// Rebuild `offers`, `p_g`, `games`, and `games_with_no_offers` from a hard-filtered offer set.
fn rebuild_from_offers(instance: &mut ReducedInstance, surviving_offers: Vec<Offer>) {
    let p_g = build_p_g(&surviving_offers);

    let mut games = Vec::new();
    let mut games_with_no_offers = Vec::new();

    for game_id in instance.game_dates.keys() {
        if p_g.contains_key(game_id) {
            games.push(game_id.clone());
        } else {
            games_with_no_offers.push(game_id.clone());
        }
    }

    games.sort();
    games_with_no_offers.sort();

    instance.offers = surviving_offers;
    instance.p_g = p_g;
    instance.games = games;
    instance.games_with_no_offers = games_with_no_offers;
}

/// Inflate `c_month`/`c_year` for every package with at least one surviving offer failing
/// `lacks_property`. The penalty is per-package, not per-offer: a package is penalized once
/// no matter how many of its offers lack the property.
fn apply_soft_penalty(
    instance: &mut ReducedInstance,
    offers: &[Offer],
    lacks_property: impl Fn(&Offer) -> bool,
    base: f64,
    weight: f64,
) {
    let penalized: FxHashSet<&PackageId> = offers
        .iter()
        .filter(|o| lacks_property(o))
        .map(|o| &o.streaming_package_id)
        .collect();

    let monthly_penalty = base.powf(weight);
    let yearly_penalty = 12.0 * monthly_penalty;

    for package_id in penalized {
        if let Some(cost) = instance.c_month.get_mut(package_id) {
            *cost += round_penalty(monthly_penalty);
        }

        if let Some(cost) = instance.c_year.get_mut(package_id) {
            *cost += round_penalty(yearly_penalty);
        }
    }
}

/// `good_lp` coefficients and catalog prices are both represented as integer cents elsewhere
/// in this crate; the `w^x` penalty is the one place non-integer arithmetic enters, so it is
/// rounded to the nearest cent here rather than carried as a float through the rest of the
/// pipeline.
#[allow(
    clippy::cast_possible_truncation,
    reason = "penalty magnitudes are tiny relative to i64::MAX"
)]
fn round_penalty(value: f64) -> i64 {
    value.round() as i64
}
