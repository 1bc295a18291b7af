//! A minimum-cost streaming subscription bundle optimizer.
//!
//! Given a set of games a fan wants to watch, a catalog of streaming packages and the offers
//! linking games to packages, and optional live/highlight coverage preferences, [`solve`]
//! computes the cheapest combination of monthly and yearly subscriptions (started at whatever
//! calendar dates minimize cost) that covers every coverable game.
//!
//! The pipeline is four stages, each in its own module: [`instance`] reduces the catalog to
//! what the solver needs, [`preference`] applies hard/soft coverage preferences, [`solver`]
//! formulates and solves the rolling-window set-cover, and [`report`] projects the raw solution
//! back onto games and undoes the solver's internal cost-adjustment guard.

pub mod catalog;
pub mod instance;
pub mod preference;
pub mod report;
pub mod solver;

pub mod prelude;

use catalog::{Game, Offer, Package, Preferences};
use instance::build_reduced_instance;
use preference::apply_preferences;
use report::{SolverResult, build_report};
use solver::{Solver, SolverError, rolling_window::RollingWindowSolver};

/// A single in-process solve request (§6.1): the catalog plus the subset of games to cover and
/// any coverage preferences.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    /// The games the caller wants to watch.
    pub requested_games: &'a [catalog::GameId],

    /// All known (game, package) coverage rows.
    pub offers: &'a [Offer],

    /// All known streaming packages.
    pub packages: &'a [Package],

    /// All known games (the universe `requested_games` is drawn from).
    pub games: &'a [Game],

    /// Live/highlight coverage preferences.
    pub preferences: Preferences,
}

/// Run the full pipeline: build the reduced instance, shape it by preference, solve the
/// rolling-window set-cover, and report the result.
///
/// `report_true_cost` selects between the source's literal (over-subtracting) cost-adjustment
/// undo and the mathematically exact variant; see [`report::build_report`]. There is no
/// implicit default here, callers porting the original behavior pass `false` explicitly.
///
/// # Errors
///
/// Returns [`SolverError`] if a catalog price cannot be represented exactly as a solver
/// coefficient, or if the backend fails outside its normal status taxonomy. Infeasibility and
/// backend non-termination are not errors: they are reported via [`SolverResult::status`].
pub fn solve(request: &SolveRequest<'_>, report_true_cost: bool) -> Result<SolverResult, SolverError> {
    let mut instance = build_reduced_instance(
        request.requested_games,
        request.offers,
        request.packages,
        request.games,
    );

    apply_preferences(&mut instance, request.preferences);

    let assignment = RollingWindowSolver::solve(&instance)?;

    Ok(build_report(assignment, &instance, report_true_cost))
}
