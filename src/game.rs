#![warn(clippy::all, clippy::pedantic)]

// Field dimensions
pub const FIELD_WIDTH: usize = 10;
pub const FIELD_HEIGHT: usize = 24;

// Smallest field that still holds every shape's spawn zone
pub const MIN_FIELD_WIDTH: usize = 7;
pub const MIN_FIELD_HEIGHT: usize = 4;

// Timing
pub const FRAMES_PER_SECOND: u32 = 30; // Input polling / redraw rate
pub const FALL_DELAY: u32 = 3; // Gravity steps per second

// Every shape is a tetromino
pub const CELLS_PER_PIECE: usize = 4;
