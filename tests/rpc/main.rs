#[path = "../support/mod.rs"]
mod support;

mod convenience;
mod failover;
