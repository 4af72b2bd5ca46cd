#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since field dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow potential wrapping when casting between types as field coordinates are within reasonable ranges
    clippy::cast_possible_wrap
)]

//! Collision tests for a piece against the locked cells of a [`Field`].
//!
//! The field passed in never contains the piece's own cells, so a piece can
//! not collide with itself. Walls are checked by coordinate alone; block
//! checks skip any neighbour that lies outside the grid so the field is never
//! queried out of range. The left wall sits at column 0: a piece touching it
//! reports a hit before any further move left is attempted.

use crate::components::{Direction, Field, Piece, Position};

const LEFT_EDGE: i32 = 0;

fn right_edge(field: &Field) -> i32 {
    field.width() as i32 - 1
}

fn bottom_edge(field: &Field) -> i32 {
    field.height() as i32 - 1
}

#[must_use]
pub fn hits_left_wall(piece: &Piece) -> bool {
    piece.cells().iter().any(|cell| cell.x <= LEFT_EDGE)
}

#[must_use]
pub fn hits_right_wall(field: &Field, piece: &Piece) -> bool {
    let edge = right_edge(field);
    piece.cells().iter().any(|cell| cell.x >= edge)
}

#[must_use]
pub fn hits_floor(field: &Field, piece: &Piece) -> bool {
    let edge = bottom_edge(field);
    piece.cells().iter().any(|cell| cell.y >= edge)
}

/// The boundary a move in `direction` would run into.
#[must_use]
pub fn hits_wall(field: &Field, piece: &Piece, direction: Direction) -> bool {
    match direction {
        Direction::Left => hits_left_wall(piece),
        Direction::Right => hits_right_wall(field, piece),
        Direction::Down => hits_floor(field, piece),
    }
}

/// Any locked cell directly next to the piece in `direction`.
#[must_use]
pub fn hits_block_in_direction(field: &Field, piece: &Piece, direction: Direction) -> bool {
    let (dx, dy) = direction.delta();
    piece
        .cells()
        .iter()
        .map(|cell| cell.offset(dx, dy))
        .any(|neighbour| occupied(field, neighbour))
}

#[must_use]
pub fn hits_block_horizontally(field: &Field, piece: &Piece, direction: Direction) -> bool {
    debug_assert!(direction != Direction::Down, "horizontal check needs a side");
    hits_block_in_direction(field, piece, direction)
}

#[must_use]
pub fn hits_block_vertically(field: &Field, piece: &Piece) -> bool {
    hits_block_in_direction(field, piece, Direction::Down)
}

/// Overlap after a speculative move or rotation.
#[must_use]
pub fn hits_block_at_current_position(field: &Field, piece: &Piece) -> bool {
    piece.cells().iter().any(|&cell| occupied(field, cell))
}

/// Any cell outside the grid, e.g. after rotating next to a wall.
#[must_use]
pub fn is_out_of_bounds(field: &Field, piece: &Piece) -> bool {
    piece.cells().iter().any(|&cell| !field.contains(cell))
}

/// Whether moving one step in `direction` is blocked by a boundary or a block.
#[must_use]
pub fn blocks_move(field: &Field, piece: &Piece, direction: Direction) -> bool {
    hits_wall(field, piece, direction) || hits_block_in_direction(field, piece, direction)
}

fn occupied(field: &Field, position: Position) -> bool {
    field.contains(position) && field.is_occupied(position.x, position.y)
}
