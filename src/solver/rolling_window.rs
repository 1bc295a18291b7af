//! The rolling-window ILP formulation (§4.3): one binary variable per (package, candidate
//! start date, period) pair, a `+1`-per-variable cost guard against free-package degeneracy,
//! and a per-game coverage constraint.

use chrono::{Days, NaiveDate};
use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, variable};
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::{
    catalog::PackageId,
    instance::ReducedInstance,
    solver::{Activation, RawAssignment, SolveStatus, Solver, SolverError},
};

/// Binary threshold for reading a solved variable back as "selected", tolerant of the small
/// numerical slack a floating-point MILP backend can leave on an exact 0/1 value.
const BINARY_THRESHOLD: f64 = 0.5;

/// A monthly subscription's coverage window length.
const MONTHLY_WINDOW_DAYS: u64 = 30;

/// A yearly subscription's coverage window length.
const YEARLY_WINDOW_DAYS: u64 = 365;

/// The default rolling-window MILP solver, routed through `good_lp`'s feature-selected
/// backend (`solver-microlp` by default; `solver-highs` if enabled).
#[derive(Debug)]
pub struct RollingWindowSolver;

impl Solver for RollingWindowSolver {
    fn solve(instance: &ReducedInstance) -> Result<RawAssignment, SolverError> {
        if instance.is_trivial() {
            return Ok(RawAssignment::trivial());
        }

        let start_dates = candidate_start_dates(instance);

        let mut pb = ProblemVariables::new();
        let mut objective = Expression::default();

        let month_vars = add_period_variables(
            &mut pb,
            &mut objective,
            sorted_keys(instance.c_month()),
            |p| instance.c_month().get(p).copied().unwrap_or_default(),
            &start_dates,
        )?;
        let year_vars = add_period_variables(
            &mut pb,
            &mut objective,
            sorted_keys(instance.c_year()),
            |p| instance.c_year().get(p).copied().unwrap_or_default(),
            &start_dates,
        )?;

        let mut model = pb.minimise(objective).using(default_solver);

        for game_id in instance.games() {
            let Some(game_date) = instance.game_date(game_id) else {
                continue;
            };
            let Some(candidate_packages) = instance.packages_for_game(game_id) else {
                continue;
            };

            let mut coverage = Expression::default();

            for package_id in candidate_packages {
                for d in dates_within(&start_dates, game_date, MONTHLY_WINDOW_DAYS) {
                    if let Some(var) = month_vars.get(&(package_id.clone(), d)) {
                        coverage += *var;
                    }
                }

                for d in dates_within(&start_dates, game_date, YEARLY_WINDOW_DAYS) {
                    if let Some(var) = year_vars.get(&(package_id.clone(), d)) {
                        coverage += *var;
                    }
                }
            }

            model = model.with(coverage.geq(1));
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Ok(empty_assignment(SolveStatus::Infeasible)),
            Err(ResolutionError::Unbounded) => return Ok(empty_assignment(SolveStatus::Unbounded)),
            Err(_) => return Ok(empty_assignment(SolveStatus::NotSolved)),
        };

        Ok(RawAssignment {
            status: SolveStatus::Optimal,
            objective_value: Some(evaluate_objective(&solution, &month_vars, &year_vars, instance)),
            active_monthly: collect_active(&solution, &month_vars),
            active_yearly: collect_active(&solution, &year_vars),
        })
    }
}

/// A non-terminal-success result: no activations, no reportable cost (§7's `BackendFailure`).
fn empty_assignment(status: SolveStatus) -> RawAssignment {
    RawAssignment {
        status,
        objective_value: None,
        active_monthly: Vec::new(),
        active_yearly: Vec::new(),
    }
}

/// `good_lp`'s `Solution` trait doesn't expose the objective value independent of the
/// `Expression` used to build it, and that `Expression` was moved into `pb.minimise`. We
/// recompute the same sum the reporter needs: `sum((cost + 1) * z)` over active variables,
/// which equals the solver's optimum by construction.
fn evaluate_objective(
    solution: &impl Solution,
    month_vars: &FxHashMap<(PackageId, NaiveDate), Variable>,
    year_vars: &FxHashMap<(PackageId, NaiveDate), Variable>,
    instance: &ReducedInstance,
) -> f64 {
    let month_total: f64 = month_vars
        .iter()
        .filter(|(_, var)| solution.value(**var) > BINARY_THRESHOLD)
        .filter_map(|((p, _), _)| instance.c_month().get(p))
        .map(|&cents| cents_to_f64_lossy(cents) + 1.0)
        .sum();

    let year_total: f64 = year_vars
        .iter()
        .filter(|(_, var)| solution.value(**var) > BINARY_THRESHOLD)
        .filter_map(|((p, _), _)| instance.c_year().get(p))
        .map(|&cents| cents_to_f64_lossy(cents) + 1.0)
        .sum();

    month_total + year_total
}

#[allow(
    clippy::cast_precision_loss,
    reason = "catalog cents are validated representable via cents_to_f64 at variable-build time"
)]
fn cents_to_f64_lossy(cents: i64) -> f64 {
    cents as f64
}

/// Distinct game dates across the *entire* reduced instance (including games with no offers):
/// per §3's invariant, candidate activation dates are exactly the distinct dates the builder
/// saw, regardless of whether every one of those games ended up coverable. A game with no
/// offers can still anchor a window that covers a different, coverable game.
fn candidate_start_dates(instance: &ReducedInstance) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = instance.game_dates.values().copied().collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// The subset of `start_dates` whose window `[d, d + window_days]` contains `game_date`.
/// `start_dates` is sorted, so this is a small binary-search-bounded slice rather than a full
/// scan.
fn dates_within(start_dates: &[NaiveDate], game_date: NaiveDate, window_days: u64) -> &[NaiveDate] {
    let lower = game_date
        .checked_sub_days(Days::new(window_days))
        .unwrap_or(game_date);

    let lo = start_dates.partition_point(|&d| d < lower);
    let hi = start_dates.partition_point(|&d| d <= game_date);

    start_dates.get(lo..hi).unwrap_or_default()
}

fn sorted_keys(map: &FxHashMap<PackageId, i64>) -> Vec<PackageId> {
    let mut keys: Vec<PackageId> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Create one binary variable per (package, start date) pair for a single period (monthly or
/// yearly), accumulating `(cost + 1) * z` into `objective` as it goes (§4.3's cost guard).
fn add_period_variables(
    pb: &mut ProblemVariables,
    objective: &mut Expression,
    packages: Vec<PackageId>,
    cost_of: impl Fn(&PackageId) -> i64,
    start_dates: &[NaiveDate],
) -> Result<FxHashMap<(PackageId, NaiveDate), Variable>, SolverError> {
    let mut vars = FxHashMap::default();

    for package_id in packages {
        let cents = cost_of(&package_id);
        let coefficient = i64_to_f64_exact(cents)
            .ok_or(SolverError::CentsNotRepresentable { cents })?
            + 1.0;

        for &date in start_dates {
            let var = pb.add(variable().binary());
            *objective += var * coefficient;
            vars.insert((package_id.clone(), date), var);
        }
    }

    Ok(vars)
}

/// Read back every variable the solver set above [`BINARY_THRESHOLD`] as an [`Activation`].
fn collect_active(
    solution: &impl Solution,
    vars: &FxHashMap<(PackageId, NaiveDate), Variable>,
) -> Vec<Activation> {
    let mut active: Vec<Activation> = vars
        .iter()
        .filter(|(_, var)| solution.value(**var) > BINARY_THRESHOLD)
        .map(|((package_id, start_date), _)| Activation {
            package_id: package_id.clone(),
            start_date: *start_date,
        })
        .collect();

    active.sort_by(|a, b| (a.start_date, &a.package_id).cmp(&(b.start_date, &b.package_id)));
    active
}

/// Convert an `i64` to an `f64` only if the round trip is exact, guarding against silently
/// changing the objective for cent amounts beyond `f64`'s 53-bit mantissa.
fn i64_to_f64_exact(v: i64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_i64() == Some(v)).then_some(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{Game, GameId, Offer, Package},
        instance::build_reduced_instance,
    };

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap_or_default()
    }

    fn offer(game: &str, package: &str) -> Offer {
        Offer {
            game_id: GameId::new(game),
            streaming_package_id: PackageId::new(package),
            live: true,
            highlights: true,
        }
    }

    fn monthly_package(id: &str, cents: i64) -> Package {
        Package {
            id: PackageId::new(id),
            name: id.to_string(),
            monthly_price_cents: Some(cents),
            monthly_price_yearly_subscription_in_cents: None,
        }
    }

    fn game(id: &str, date: NaiveDate) -> Game {
        Game {
            id: GameId::new(id),
            start_date: date,
        }
    }

    #[test]
    fn i64_to_f64_exact_round_trips_small_values() {
        assert_eq!(i64_to_f64_exact(0), Some(0.0));
        assert_eq!(i64_to_f64_exact(30), Some(30.0));
    }

    #[test]
    fn dates_within_includes_exact_upper_bound() {
        let start_dates = vec![d(2023, 1, 15)];
        let game_date = d(2023, 2, 14); // exactly 30 days after

        assert_eq!(dates_within(&start_dates, game_date, 30), &start_dates[..]);
    }

    #[test]
    fn dates_within_excludes_one_day_past_window() {
        let start_dates = vec![d(2023, 1, 15)];
        let game_date = d(2023, 2, 15); // 31 days after

        assert!(dates_within(&start_dates, game_date, 30).is_empty());
    }

    #[test]
    fn single_monthly_subscription_covers_two_nearby_games() {
        let instance = build_reduced_instance(
            &[GameId::new("g1"), GameId::new("g2")],
            &[offer("g1", "p1"), offer("g2", "p1")],
            &[monthly_package("p1", 30)],
            &[game("g1", d(2023, 1, 15)), game("g2", d(2023, 2, 10))],
        );

        let result = RollingWindowSolver::solve(&instance).expect("solve should succeed");

        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.active_monthly.len(), 1);
        assert!(result.active_yearly.is_empty());
        // Objective carries the +1-per-active-variable guard on top of the true 30 cents.
        assert_eq!(result.objective_value, Some(31.0));
    }

    #[test]
    fn gap_past_thirty_days_forces_two_activations() {
        let instance = build_reduced_instance(
            &[GameId::new("g1"), GameId::new("g2")],
            &[offer("g1", "p1"), offer("g2", "p1")],
            &[monthly_package("p1", 30)],
            &[game("g1", d(2023, 1, 15)), game("g2", d(2023, 2, 16))],
        );

        let result = RollingWindowSolver::solve(&instance).expect("solve should succeed");

        assert_eq!(result.active_monthly.len(), 2);
        assert_eq!(result.objective_value, Some(62.0));
    }

    #[test]
    fn free_package_is_not_bought_at_every_start_date() {
        let instance = build_reduced_instance(
            &[GameId::new("g1"), GameId::new("g2")],
            &[offer("g1", "p1"), offer("g2", "p1")],
            &[monthly_package("p1", 0)],
            &[game("g1", d(2023, 1, 15)), game("g2", d(2023, 2, 10))],
        );

        let result = RollingWindowSolver::solve(&instance).expect("solve should succeed");

        // Without the +1 guard a zero-cost package would be free to buy at every candidate
        // date; the guard makes a single activation strictly cheaper than two.
        assert_eq!(result.active_monthly.len(), 1);
    }
}
