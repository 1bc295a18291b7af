//! Basic solve example.
//!
//! Builds a tiny catalog by hand and finds the cheapest bundle covering two games.
//!
//! Run with: `cargo run --example basic_solve`

use chrono::NaiveDate;

use sub_bundle_solver::prelude::*;

#[allow(clippy::print_stdout, reason = "example code")]
pub fn main() -> Result<(), SolverError> {
    let games = vec![
        Game {
            id: GameId::new("g1"),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default(),
        },
        Game {
            id: GameId::new("g2"),
            start_date: NaiveDate::from_ymd_opt(2023, 2, 10).unwrap_or_default(),
        },
    ];

    let packages = vec![Package {
        id: PackageId::new("streamco"),
        name: "StreamCo".to_string(),
        monthly_price_cents: Some(30_00),
        monthly_price_yearly_subscription_in_cents: None,
    }];

    let offers = vec![
        Offer {
            game_id: GameId::new("g1"),
            streaming_package_id: PackageId::new("streamco"),
            live: true,
            highlights: true,
        },
        Offer {
            game_id: GameId::new("g2"),
            streaming_package_id: PackageId::new("streamco"),
            live: true,
            highlights: true,
        },
    ];

    let requested_games = vec![GameId::new("g1"), GameId::new("g2")];

    let request = SolveRequest {
        requested_games: &requested_games,
        offers: &offers,
        packages: &packages,
        games: &games,
        preferences: Preferences::none(),
    };

    let result = solve(&request, false)?;

    println!("status: {:?}", result.status);
    println!("total_cost (cents): {:?}", result.total_cost);
    for sub in &result.active_monthly {
        println!(
            "monthly: {} starting {}",
            sub.package_id, sub.start_date
        );
    }

    Ok(())
}
