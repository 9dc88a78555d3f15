//! Intersection Simulation Library
//!
//! Simulates a four-way intersection under a traffic light and scores how
//! well a control policy clears traffic.

pub mod simulation;
