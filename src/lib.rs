#![doc = "The `farmstand` library crate."]
#![doc = ""]
#![doc = "Accounts, stateless session tokens, the bearer-token gate, product listings with"]
#![doc = "image uploads, the product filter, and the persistence and upload seams behind them."]
#![doc = "The binary (`main.rs`) builds an `AppState` from `Config` and serves `routes::config`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod uploads;

pub use error::AppError;
pub use state::AppState;
