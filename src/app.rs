#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since field coordinates are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow potential wrapping when casting between types as field coordinates are within reasonable ranges
    clippy::cast_possible_wrap,
    // Allow sign loss since dirty coordinates always lie inside the field
    clippy::cast_sign_loss
)]

use bevy_ecs::prelude::*;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info};
use std::error;

use crate::components::{
    Cell, DirtyCells, Direction, Field, Input, InputEvent, Intent, Piece, Position, Rotation,
    Session, SessionState, Spawner, View,
};
use crate::config::Config;
use crate::systems::{self, StepOutcome, spawn_piece};
use crate::ui::CellSurface;

pub type AppResult<T> = std::result::Result<T, Box<dyn error::Error>>;

pub struct App {
    pub world: World,
    pub config: Config,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let world = Self::build_world(&config);
        Self {
            world,
            config,
            should_quit: false,
        }
    }

    fn build_world(config: &Config) -> World {
        let (width, height) = (config.field.width, config.field.height);

        let mut world = World::new();
        world.insert_resource(Field::new(width, height));
        world.insert_resource(View(Field::new(width, height)));
        world.insert_resource(Input::default());
        world.insert_resource(Session::new(
            config.timing.frames_per_second,
            config.timing.fall_delay,
        ));
        world.insert_resource(Spawner::new(config.spawn.policy, config.spawn.seed));

        // The shell starts from a blank surface
        let mut dirty = DirtyCells::default();
        dirty.mark_all();
        world.insert_resource(dirty);

        info!(
            "New session on a {width}x{height} field ({:?} spawns)",
            config.spawn.policy
        );
        spawn_piece(&mut world);
        world
    }

    /// Starts a new session with an empty field.
    pub fn reset(&mut self) {
        self.world = Self::build_world(&self.config);
    }

    pub fn step(&mut self) -> StepOutcome {
        systems::step(&mut self.world)
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.world.resource::<Session>().state
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        self.world.resource::<Field>()
    }

    pub fn active_piece(&mut self) -> Option<Piece> {
        systems::active_piece(&mut self.world).map(|(_, piece)| piece)
    }

    /// Locked cells combined with the piece in play.
    #[must_use]
    pub fn view_cell(&self, column: usize, row: usize) -> Cell {
        self.world
            .resource::<View>()
            .0
            .get(Position::new(column as i32, row as i32))
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit => self.should_quit = true,
            InputEvent::KeyDown(intent) => self.world.resource_mut::<Input>().press(intent),
            InputEvent::KeyUp(direction) => self.world.resource_mut::<Input>().release(direction),
            InputEvent::Restart => {
                if self.session_state() == SessionState::Ended {
                    debug!("Restarting after session end");
                    self.reset();
                }
            }
        }
    }

    /// Draws every view cell that changed since the last flush.
    pub fn flush(&mut self, surface: &mut impl CellSurface) {
        let dirty = self.world.resource_mut::<DirtyCells>().take();
        let Some(dirty) = dirty else {
            self.redraw(surface);
            return;
        };

        for position in dirty {
            let (column, row) = (position.x as usize, position.y as usize);
            surface.draw_cell(column, row, self.view_cell(column, row).color());
        }
    }

    pub fn redraw(&self, surface: &mut impl CellSurface) {
        let view = &self.world.resource::<View>().0;
        for column in 0..view.width() {
            for row in 0..view.height() {
                surface.draw_cell(column, row, self.view_cell(column, row).color());
            }
        }
    }
}

/// Maps a terminal key event onto the simulation's input events.
#[must_use]
pub fn event_from_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return match key.code {
            KeyCode::Left | KeyCode::Char('a') => Some(InputEvent::KeyUp(Direction::Left)),
            KeyCode::Right | KeyCode::Char('d') => Some(InputEvent::KeyUp(Direction::Right)),
            _ => None,
        };
    }

    let event = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputEvent::Quit,
        KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,
        KeyCode::Left | KeyCode::Char('a') => InputEvent::KeyDown(Intent::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') => InputEvent::KeyDown(Intent::Move(Direction::Right)),
        KeyCode::Down | KeyCode::Char('s') => InputEvent::KeyDown(Intent::Move(Direction::Down)),
        KeyCode::Up | KeyCode::Char('w' | 'x') => {
            InputEvent::KeyDown(Intent::Rotate(Rotation::Clockwise))
        }
        KeyCode::Char('z') => InputEvent::KeyDown(Intent::Rotate(Rotation::CounterClockwise)),
        KeyCode::Enter => InputEvent::Restart,
        _ => return None,
    };

    Some(event)
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
