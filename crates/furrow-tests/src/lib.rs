//! Invariant and adversarial test suite for Furrow.
//!
//! This crate contains integration tests that drive the contract through
//! long random operation sequences and check the accounting invariants of
//! the farming pool after every step.

pub mod helpers;
