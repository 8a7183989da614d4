mod router_tests;
mod scenario_tests;
pub mod utils;
