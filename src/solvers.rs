//! # Solvers
//!
//! $$
//! f(x^\*)=0
//! $$
//!
pub mod newton;

pub use newton::internal_rate_of_return;
pub use newton::net_present_value;
pub use newton::newton_raphson;
