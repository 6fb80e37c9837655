//! Tests for the OTP service

mod mocks;
mod service_tests;
