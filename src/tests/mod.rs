#![warn(clippy::all, clippy::pedantic)]

pub mod config_tests;
pub mod systems_tests;
