//! API Tests

mod error_tests;
mod health_tests;
mod socket_tests;
mod validation_tests;
