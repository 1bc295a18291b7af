//! Convenience re-exports for common library consumers.

pub use crate::{
    SolveRequest, solve,
    catalog::{Cents, Game, GameId, Offer, Package, PackageId, Preferences, PreferencesError},
    instance::ReducedInstance,
    report::{SolverResult, Subscription, SubscriptionKind},
    solver::{Solver, SolverError, SolveStatus, rolling_window::RollingWindowSolver},
};
