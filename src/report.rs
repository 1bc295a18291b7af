//! The Solution Reporter: projects a solver's raw variable assignment back onto games, and
//! undoes the `+1`-per-variable cost guard §4.3 introduced before optimizing.

use chrono::NaiveDate;

use crate::{
    catalog::{Cents, GameId, PackageId},
    instance::ReducedInstance,
    solver::{RawAssignment, SolveStatus},
};

/// Which period a [`Subscription`] activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    /// A 30-day rolling monthly subscription.
    Monthly,

    /// A 365-day rolling yearly subscription.
    Yearly,
}

/// One active (package, start date, period) the solver chose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// The activated package.
    pub package_id: PackageId,

    /// The date the subscription period starts on.
    pub start_date: NaiveDate,

    /// Monthly or yearly.
    pub kind: SubscriptionKind,
}

/// The final, caller-facing result of a solve (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    /// The translated solve status.
    pub status: SolveStatus,

    /// The post-adjustment total cost, in cents. `None` when `status` is not [`SolveStatus::Optimal`]
    /// (per §7's `BackendFailure` policy: an undefined cost must not be reported as zero).
    pub total_cost: Option<Cents>,

    /// Active monthly subscriptions.
    pub active_monthly: Vec<Subscription>,

    /// Active yearly subscriptions.
    pub active_yearly: Vec<Subscription>,

    /// Requested games that had no offer at all, carried through from the reduced instance so
    /// callers can distinguish "nothing to cover" from "every game was uncoverable".
    pub games_with_no_offers: Vec<GameId>,
}

/// Build the final [`SolverResult`] from a backend's raw assignment.
///
/// When `report_true_cost` is `false` (the default, matching the source byte-for-byte), the
/// reported cost subtracts the `+1` guard applied to *every* declared variable, not only the
/// active ones, which can under- or even over-subtract relative to the true sum of active
/// costs (§9). When `true`, the reporter instead subtracts exactly `1` per active subscription,
/// which is the mathematically exact inverse of the guard.
#[must_use]
pub fn build_report(
    assignment: RawAssignment,
    instance: &ReducedInstance,
    report_true_cost: bool,
) -> SolverResult {
    let games_with_no_offers = instance.games_with_no_offers().to_vec();

    if assignment.status != SolveStatus::Optimal {
        return SolverResult {
            status: assignment.status,
            total_cost: None,
            active_monthly: Vec::new(),
            active_yearly: Vec::new(),
            games_with_no_offers,
        };
    }

    let active_monthly = to_subscriptions(assignment.active_monthly, SubscriptionKind::Monthly);
    let active_yearly = to_subscriptions(assignment.active_yearly, SubscriptionKind::Yearly);

    // Nothing active means nothing to undo the cost-adjustment guard for: report zero
    // unconditionally rather than running the subtraction formula, which assumes at least one
    // declared variable and goes negative on a trivially-empty bundle (e.g. every requested
    // game was hard-filtered into `games_with_no_offers` after the builder had already priced
    // packages that only ever touched those games).
    let total_cost = if active_monthly.is_empty() && active_yearly.is_empty() {
        Some(0)
    } else {
        assignment.objective_value.map(|objective_value| {
            let adjustment = if report_true_cost {
                usize_to_f64_lossy(active_monthly.len() + active_yearly.len())
            } else {
                let start_dates_count = usize_to_f64_lossy(distinct_game_dates_count(instance));
                let package_count =
                    usize_to_f64_lossy(instance.c_month().len() + instance.c_year().len());
                package_count * start_dates_count
            };

            round_to_cents(objective_value - adjustment)
        })
    };

    SolverResult {
        status: assignment.status,
        total_cost,
        active_monthly,
        active_yearly,
        games_with_no_offers,
    }
}

fn to_subscriptions(
    activations: Vec<crate::solver::Activation>,
    kind: SubscriptionKind,
) -> Vec<Subscription> {
    activations
        .into_iter()
        .map(|a| Subscription {
            package_id: a.package_id,
            start_date: a.start_date,
            kind,
        })
        .collect()
}

/// `|start_dates|`: the count of distinct game dates the builder saw, which is exactly the
/// number of candidate activation dates the solver declared a variable for (§3's invariant).
fn distinct_game_dates_count(instance: &ReducedInstance) -> usize {
    let mut dates: Vec<NaiveDate> = instance.game_dates.values().copied().collect();
    dates.sort_unstable();
    dates.dedup();
    dates.len()
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "reported totals are bounded by realistic subscription prices, far below i64::MAX"
)]
fn round_to_cents(value: f64) -> Cents {
    value.round() as Cents
}

#[allow(
    clippy::cast_precision_loss,
    reason = "package/date counts are tiny relative to f64's 53-bit mantissa"
)]
fn usize_to_f64_lossy(value: usize) -> f64 {
    value as f64
}
