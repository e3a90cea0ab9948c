//! Cyclic staff-rotation engine for operating-theatre teams.
//!
//! Computes weekday rotations over a 1..=24 week horizon: each weekday is
//! staffed with Day/Evening/Night pairs and an optional Admin solo, under
//! labour rules (rest after night, rolling 48h, night caps) and fairness
//! objectives (night/evening spread per cohort). A structurally similar
//! but independent planner covers Sat/Sun 12h/24h weekends.
//!
//! # Modules
//!
//! - **`models`**: domain types — `Person`, `Shift`, `Schedule`, plans,
//!   configuration
//! - **`validation`**: team integrity checks (empty team, duplicates,
//!   out-of-range targets)
//! - **`solver`**: the engine — staffing/EDO derivation, the pair model
//!   and seeded search, validator, scorer, multi-restart driver, weekend
//!   planner, rebalancer
//! - **`io`**: the CSV boundary (team rosters in, schedules out and back)
//! - **`error`**: the typed failure taxonomy
//!
//! # Quick start
//!
//! ```no_run
//! use rota_engine::models::{Person, SolveConfig};
//! use rota_engine::solver::solve;
//!
//! let team: Vec<Person> = (0..10)
//!     .map(|i| Person::new(format!("P{i:02}")).with_workdays(4))
//!     .collect();
//! let config = SolveConfig::default().with_weeks(4).with_tries(4).with_seed(42);
//!
//! let result = solve(&team, &config).unwrap();
//! if let Some(schedule) = &result.schedule {
//!     println!("score {} from seed {}", result.score, schedule.seed);
//! }
//! ```

pub mod error;
pub mod io;
pub mod models;
pub mod solver;
pub mod validation;

pub use error::{InputError, SolveError};
pub use models::{Person, Schedule, Shift, SolveConfig, Weekday, WeekendConfig};
pub use solver::{
    solve, solve_cancellable, solve_weekends, Diagnostics, SolveResult, SolveStatus,
    WeekendResult, WeekendStatus,
};
