//! Event plumbing shared by the UI and the (external) agent subsystem.

pub mod bus;
pub mod events;
