#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since field dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow sign loss when going from signed to unsigned types since we validate values are non-negative before casting
    clippy::cast_sign_loss,
    // Allow potential wrapping when casting between types of same size as we validate values are in range
    clippy::cast_possible_wrap
)]

use std::collections::BTreeSet;

use bevy_ecs::prelude::*;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::game::CELLS_PER_PIECE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

/// Immutable catalog entry: bounding square, color, spawn anchor and the
/// four cells relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub size: i32,
    pub color: Color,
    pub start: Position,
    pub offsets: [Position; CELLS_PER_PIECE],
}

const fn cells(raw: [(i32, i32); CELLS_PER_PIECE]) -> [Position; CELLS_PER_PIECE] {
    [
        Position::new(raw[0].0, raw[0].1),
        Position::new(raw[1].0, raw[1].1),
        Position::new(raw[2].0, raw[2].1),
        Position::new(raw[3].0, raw[3].1),
    ]
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::T,
        ShapeKind::Z,
    ];

    /// Picks one of the seven shapes uniformly.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::ALL[rng.usize(0..Self::ALL.len())]
    }

    #[must_use]
    pub fn shape(self) -> Shape {
        //   x = column, y = row, both relative to the top-left of the bounding square
        let (size, start, offsets) = match self {
            // . . . .
            // # # # #
            ShapeKind::I => (4, (3, 0), [(0, 1), (1, 1), (2, 1), (3, 1)]),
            // #
            // # # #
            ShapeKind::J => (3, (4, 0), [(0, 0), (0, 1), (1, 1), (2, 1)]),
            //     #
            // # # #
            ShapeKind::L => (3, (4, 0), [(0, 1), (1, 1), (2, 0), (2, 1)]),
            // # #
            // # #
            ShapeKind::O => (2, (5, 0), [(0, 0), (1, 0), (0, 1), (1, 1)]),
            //   # #
            // # #
            ShapeKind::S => (3, (4, 0), [(0, 1), (1, 0), (1, 1), (2, 0)]),
            //   #
            // # # #
            ShapeKind::T => (3, (4, 0), [(0, 1), (1, 0), (1, 1), (2, 1)]),
            // # #
            //   # #
            ShapeKind::Z => (3, (4, 0), [(0, 0), (1, 0), (1, 1), (2, 1)]),
        };

        let shape = Shape {
            kind: self,
            size,
            color: self.get_color(),
            start: Position::new(start.0, start.1),
            offsets: cells(offsets),
        };
        debug_assert!(shape.is_well_formed(), "malformed shape data for {self:?}");
        shape
    }

    #[must_use]
    pub fn get_color(self) -> Color {
        match self {
            ShapeKind::I => Color::Cyan,
            ShapeKind::J => Color::Blue,
            ShapeKind::L => Color::Rgb(255, 128, 0),
            ShapeKind::O => Color::Yellow,
            ShapeKind::S => Color::Green,
            ShapeKind::T => Color::Rgb(192, 0, 255),
            ShapeKind::Z => Color::Red,
        }
    }
}

impl Shape {
    // Four distinct cells, all inside the bounding square
    fn is_well_formed(&self) -> bool {
        let inside = self
            .offsets
            .iter()
            .all(|p| (0..self.size).contains(&p.x) && (0..self.size).contains(&p.y));
        let distinct = self.offsets.iter().collect::<BTreeSet<_>>().len() == CELLS_PER_PIECE;
        (2..=4).contains(&self.size) && inside && distinct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }
}

/// The piece in play. `cells` is always `anchor + offset` for the current
/// rotation state of its shape.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: ShapeKind,
    size: i32,
    color: Color,
    anchor: Position,
    cells: [Position; CELLS_PER_PIECE],
}

impl Piece {
    /// Instantiates the shape at its fixed start anchor.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self::at(kind, kind.shape().start)
    }

    #[must_use]
    pub fn at(kind: ShapeKind, anchor: Position) -> Self {
        let shape = kind.shape();
        Self {
            kind,
            size: shape.size,
            color: shape.color,
            anchor,
            cells: shape.offsets.map(|p| p.offset(anchor.x, anchor.y)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn size(&self) -> i32 {
        self.size
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn cells(&self) -> &[Position; CELLS_PER_PIECE] {
        &self.cells
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for cell in &mut self.cells {
            *cell = cell.offset(dx, dy);
        }
        self.anchor = self.anchor.offset(dx, dy);
    }

    // On screen (rows grow downward) this turns the piece clockwise.
    // Direct inverse of the counter-clockwise map.
    pub fn rotate_clockwise(&mut self) {
        let size = self.size;
        self.remap(|x, y| (size - y - 1, x));
    }

    pub fn rotate_counter_clockwise(&mut self) {
        let size = self.size;
        self.remap(|x, y| (y, size - x - 1));
    }

    pub fn rotate(&mut self, rotation: Rotation) {
        match rotation {
            Rotation::Clockwise => self.rotate_clockwise(),
            Rotation::CounterClockwise => self.rotate_counter_clockwise(),
        }
    }

    fn remap(&mut self, transform: impl Fn(i32, i32) -> (i32, i32)) {
        let anchor = self.anchor;
        for cell in &mut self.cells {
            let (x, y) = transform(cell.x - anchor.x, cell.y - anchor.y);
            *cell = Position::new(x + anchor.x, y + anchor.y);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    #[must_use]
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Filled(color) => Some(color),
        }
    }
}

/// Fixed-size grid of cells, indexed `cells[x][y]`.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Field {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "field must have at least one cell");
        Self {
            width,
            height,
            cells: vec![vec![Cell::Empty; height]; width],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.height
    }

    /// Panics when `position` is outside the grid; callers bounds-check first.
    #[must_use]
    pub fn get(&self, position: Position) -> Cell {
        assert!(
            self.contains(position),
            "cell ({}, {}) is outside the {}x{} field",
            position.x,
            position.y,
            self.width,
            self.height
        );
        self.cells[position.x as usize][position.y as usize]
    }

    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(Position::new(x, y)) != Cell::Empty
    }

    pub fn clear_cells(&mut self, coords: &[Position]) {
        self.set_cells(coords, Cell::Empty);
    }

    pub fn write_cells(&mut self, coords: &[Position], color: Color) {
        self.set_cells(coords, Cell::Filled(color));
    }

    fn set_cells(&mut self, coords: &[Position], cell: Cell) {
        for &position in coords {
            debug_assert!(self.contains(position));
            self.cells[position.x as usize][position.y as usize] = cell;
        }
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }
}

/// What the player sees: locked cells plus the piece in play. Collision
/// checks never look at this grid, only at [`Field`].
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct View(pub Field);

/// Coordinates whose view cell changed since the shell last drew.
#[derive(Resource, Debug, Clone, Default)]
pub struct DirtyCells {
    cells: BTreeSet<Position>,
    full_redraw: bool,
}

impl DirtyCells {
    pub fn mark(&mut self, coords: &[Position]) {
        self.cells.extend(coords.iter().copied());
    }

    pub fn mark_all(&mut self) {
        self.full_redraw = true;
        self.cells.clear();
    }

    #[must_use]
    pub fn needs_full_redraw(&self) -> bool {
        self.full_redraw
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full_redraw && self.cells.is_empty()
    }

    /// Returns `None` for a full redraw, otherwise the changed cells.
    pub fn take(&mut self) -> Option<Vec<Position>> {
        if std::mem::take(&mut self.full_redraw) {
            self.cells.clear();
            None
        } else {
            Some(std::mem::take(&mut self.cells).into_iter().collect())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Rotate(Rotation),
}

/// Events produced by the shell's input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Intent),
    KeyUp(Direction),
    Restart,
}

// Latched intents, last write wins within a frame
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Input {
    pub direction: Option<Direction>,
    pub rotation: Option<Rotation>,
}

impl Input {
    pub fn press(&mut self, intent: Intent) {
        match intent {
            Intent::Move(direction) => self.direction = Some(direction),
            Intent::Rotate(rotation) => self.rotation = Some(rotation),
        }
    }

    pub fn release(&mut self, direction: Direction) {
        if self.direction == Some(direction) {
            self.direction = None;
        }
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Falling,
    Locking,
    Ended,
}

#[derive(Resource, Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    /// Input frames between two gravity steps.
    pub frames_per_fall: u32,
    pub frame: u32,
}

impl Session {
    #[must_use]
    pub fn new(frames_per_second: u32, fall_delay: u32) -> Self {
        assert!(fall_delay > 0, "fall delay must be positive");
        Self {
            state: SessionState::Falling,
            frames_per_fall: (frames_per_second / fall_delay).max(1),
            frame: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    #[default]
    Uniform,
    AlwaysT,
}

#[derive(Resource, Debug, Clone)]
pub struct Spawner {
    policy: SpawnPolicy,
    rng: fastrand::Rng,
}

impl Spawner {
    #[must_use]
    pub fn new(policy: SpawnPolicy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { policy, rng }
    }

    pub fn next_kind(&mut self) -> ShapeKind {
        match self.policy {
            SpawnPolicy::Uniform => ShapeKind::random(&mut self.rng),
            SpawnPolicy::AlwaysT => ShapeKind::T,
        }
    }
}
