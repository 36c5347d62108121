//! Integration test crate for FlowCam.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every library crate to verify they work together.

#[cfg(test)]
mod tracking;

#[cfg(test)]
mod capture;
