use bevy_ecs::prelude::*;
use log::{debug, info, trace, warn};

use crate::collision::{
    blocks_move, hits_block_at_current_position, hits_block_vertically, hits_floor,
    is_out_of_bounds,
};
use crate::components::{
    DirtyCells, Direction, Field, Input, Piece, Rotation, Session, SessionState, ShapeKind,
    Spawner, View,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityOutcome {
    Fell,
    Spawned,
    Locked,
    SessionEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Input handled, no gravity this frame.
    Frame,
    Gravity(GravityOutcome),
    SessionEnded,
}

impl StepOutcome {
    #[must_use]
    pub fn applied_gravity(self) -> bool {
        matches!(self, StepOutcome::Gravity(_))
    }
}

pub fn spawn_piece(world: &mut World) -> bool {
    let kind = world.resource_mut::<Spawner>().next_kind();
    spawn_piece_of(world, kind)
}

/// Puts a fresh `kind` piece in play at its start anchor. Returns false and
/// ends the session when the spawn cells are already taken.
pub fn spawn_piece_of(world: &mut World, kind: ShapeKind) -> bool {
    // Intents latched for the previous piece do not carry over
    *world.resource_mut::<Input>() = Input::default();

    let piece = Piece::new(kind);

    let blocked = {
        let field = world.resource::<Field>();
        is_out_of_bounds(field, &piece) || hits_block_at_current_position(field, &piece)
    };

    if blocked {
        warn!("No room to spawn {kind:?}, ending session");
        world.resource_mut::<Session>().state = SessionState::Ended;
        return false;
    }

    draw_piece(world, &piece);
    debug!("Spawned {kind:?} at ({}, {})", piece.anchor().x, piece.anchor().y);

    {
        let mut session = world.resource_mut::<Session>();
        session.state = SessionState::Falling;
        session.frame = 0;
    }

    world.spawn(piece);
    true
}

pub fn active_piece(world: &mut World) -> Option<(Entity, Piece)> {
    let mut query = world.query::<(Entity, &Piece)>();
    query
        .iter(world)
        .next()
        .map(|(entity, piece)| (entity, piece.clone()))
}

/// Moves the piece one step unless a wall or block is in the way.
pub fn try_move(field: &Field, piece: &mut Piece, direction: Direction) -> bool {
    if blocks_move(field, piece, direction) {
        trace!("Rejected move {direction:?}");
        return false;
    }

    let (dx, dy) = direction.delta();
    piece.translate(dx, dy);
    true
}

/// Rotates the piece in place, undoing it when the result leaves the field or
/// overlaps a block. There is no wall kick.
pub fn try_rotate(field: &Field, piece: &mut Piece, rotation: Rotation) -> bool {
    piece.rotate(rotation);

    if is_out_of_bounds(field, piece) || hits_block_at_current_position(field, piece) {
        piece.rotate(rotation.inverse());
        trace!("Rejected rotation {rotation:?}");
        return false;
    }

    true
}

pub fn input_system(world: &mut World) {
    let intents = world.resource_mut::<Input>().take();

    if world.resource::<Session>().state != SessionState::Falling {
        return;
    }

    let Some((entity, mut piece)) = active_piece(world) else {
        return;
    };

    if intents == Input::default() {
        return;
    }

    erase_piece(world, &piece);

    {
        let field = world.resource::<Field>();

        if let Some(direction) = intents.direction {
            try_move(field, &mut piece, direction);
        }

        if let Some(rotation) = intents.rotation {
            try_rotate(field, &mut piece, rotation);
        }
    }

    draw_piece(world, &piece);
    world.entity_mut(entity).insert(piece);
}

pub fn gravity_system(world: &mut World) -> GravityOutcome {
    if world.resource::<Session>().state == SessionState::Ended {
        return GravityOutcome::SessionEnded;
    }

    let Some((entity, mut piece)) = active_piece(world) else {
        debug!("No piece in play, spawning a new one");
        return if spawn_piece(world) {
            GravityOutcome::Spawned
        } else {
            GravityOutcome::SessionEnded
        };
    };

    let landed = {
        let field = world.resource::<Field>();
        // Floor first: the cell below a piece on the last row is off the grid
        hits_floor(field, &piece) || hits_block_vertically(field, &piece)
    };

    if landed {
        world.resource_mut::<Session>().state = SessionState::Locking;
        lock_piece(world, entity, &piece);

        return if spawn_piece(world) {
            GravityOutcome::Locked
        } else {
            GravityOutcome::SessionEnded
        };
    }

    erase_piece(world, &piece);
    piece.translate(0, 1);
    draw_piece(world, &piece);
    world.entity_mut(entity).insert(piece);

    GravityOutcome::Fell
}

/// Commits the piece's cells to the field as plain color and drops the piece.
pub fn lock_piece(world: &mut World, entity: Entity, piece: &Piece) {
    info!(
        "Locking {:?} at ({}, {})",
        piece.kind(),
        piece.anchor().x,
        piece.anchor().y
    );

    world
        .resource_mut::<Field>()
        .write_cells(piece.cells(), piece.color());

    world.despawn(entity);
}

/// Advances the simulation by one input frame. Every `frames_per_fall`-th
/// frame also applies gravity.
pub fn step(world: &mut World) -> StepOutcome {
    if world.resource::<Session>().state == SessionState::Ended {
        return StepOutcome::SessionEnded;
    }

    input_system(world);

    let gravity_due = {
        let mut session = world.resource_mut::<Session>();
        session.frame += 1;
        if session.frame >= session.frames_per_fall {
            session.frame = 0;
            true
        } else {
            false
        }
    };

    if !gravity_due {
        return StepOutcome::Frame;
    }

    match gravity_system(world) {
        GravityOutcome::SessionEnded => StepOutcome::SessionEnded,
        outcome => StepOutcome::Gravity(outcome),
    }
}

fn erase_piece(world: &mut World, piece: &Piece) {
    world.resource_mut::<View>().0.clear_cells(piece.cells());
    world.resource_mut::<DirtyCells>().mark(piece.cells());
}

fn draw_piece(world: &mut World, piece: &Piece) {
    world
        .resource_mut::<View>()
        .0
        .write_cells(piece.cells(), piece.color());
    world.resource_mut::<DirtyCells>().mark(piece.cells());
}
