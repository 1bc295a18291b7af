//! The solver-backend contract: a trait over "binary-variable MILP with linear constraints
//! and an objective" that isolates the rolling-window formulation from the concrete MILP
//! backend (§9's design notes), plus the shared error and status types both the formulation
//! and the reporter use.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    catalog::PackageId,
    instance::ReducedInstance,
};

pub mod rolling_window;

/// Errors the solver layer can surface.
///
/// Note that a backend reporting `Infeasible` or `Unbounded` is *not* an error: per §6.4 those
/// are terminal [`SolveStatus`] values carried in a successful [`RawAssignment`]. This type is
/// reserved for conditions that prevent building a `RawAssignment` at all.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A catalog price in cents cannot be represented exactly as an `f64` solver coefficient.
    #[error("price in cents cannot be represented exactly as a solver coefficient: {cents}")]
    CentsNotRepresentable {
        /// The offending value, in cents.
        cents: i64,
    },
}

/// The solve outcome, translated from the backend's native status into the taxonomy of §6.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// A provably optimal solution was found (including the trivial empty-instance case).
    Optimal,

    /// The backend proved no feasible solution exists.
    Infeasible,

    /// The backend proved the objective is unbounded.
    Unbounded,

    /// The backend terminated without reaching a definite optimal/infeasible/unbounded
    /// conclusion, or failed in some other way `good_lp`'s `ResolutionError` doesn't give this
    /// crate enough information to distinguish from that case.
    NotSolved,
}

/// One solver-chosen (package, start_date) activation, before the reporter attaches a
/// [`crate::report::Subscription::kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The activated package.
    pub package_id: PackageId,

    /// The date the subscription period starts on.
    pub start_date: NaiveDate,
}

/// The raw output of a solve, before the reporter maps it back onto the cost-adjustment
/// bookkeeping of §4.3/§4.4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssignment {
    /// The translated solve status.
    pub status: SolveStatus,

    /// The solver's reported objective value (includes the `+1`-per-variable guard from
    /// §4.3; the reporter undoes it). `None` when the status is not a terminal success
    /// (nothing to report a cost for).
    pub objective_value: Option<f64>,

    /// Active monthly activations.
    pub active_monthly: Vec<Activation>,

    /// Active yearly activations.
    pub active_yearly: Vec<Activation>,
}

impl RawAssignment {
    /// The trivial assignment for an instance with nothing left to cover: optimal, empty,
    /// zero-cost.
    #[must_use]
    pub fn trivial() -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective_value: Some(0.0),
            active_monthly: Vec::new(),
            active_yearly: Vec::new(),
        }
    }
}

/// A pluggable MILP backend for the rolling-window formulation.
///
/// Implementations own the choice of concrete solver (the default,
/// [`rolling_window::RollingWindowSolver`], routes through `good_lp`'s feature-selected
/// backend); callers of [`crate::solve`] never interact with `good_lp` directly.
pub trait Solver {
    /// Formulate and solve the rolling-window set-cover for `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] if a catalog price cannot be represented exactly as a solver
    /// coefficient, or if the backend fails outside the normal status taxonomy.
    fn solve(instance: &ReducedInstance) -> Result<RawAssignment, SolverError>;
}
