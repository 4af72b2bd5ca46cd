#![warn(clippy::all, clippy::pedantic)]

pub mod app;
pub mod clock;
pub mod collision;
pub mod components;
pub mod config;
pub mod game;
pub mod systems;
pub mod ui;

#[cfg(test)]
mod tests;
