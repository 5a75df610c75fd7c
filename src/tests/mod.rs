// Test modules

pub mod common;

mod analysis_routes_test;
mod api_contract_test;
