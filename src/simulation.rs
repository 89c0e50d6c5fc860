//! # Simulation
//!
//! $$
//! dS_t=\mu S_t\,dt+\sigma S_t\,dW_t
//! $$
//!
//! Synthetic price histories for the historical input mode.

pub mod calendar;
pub mod dividends;
pub mod gbm;
pub mod history;

pub use calendar::Frequency;
pub use calendar::generate_date_sequence;
pub use dividends::DIVIDEND_MONTHS;
pub use dividends::generate_dividends;
pub use gbm::PricePath;
pub use gbm::generate_price_path;
pub use history::AssetSimulationSpec;
pub use history::PriceHistory;
pub use history::SIMULATION_YEARS;
pub use history::SimulationConfig;
pub use history::estimate_inputs;
pub use history::simulate_history;
