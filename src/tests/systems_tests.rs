#[cfg(test)]
mod tests {
    use crate::collision::hits_left_wall;
    use crate::components::*;
    use crate::systems::*;
    use crate::tests::test_utils::{
        create_test_world, current_piece, fill_test_field, sorted_cells,
    };
    use bevy_ecs::prelude::*;

    fn press(world: &mut World, intent: Intent) {
        world.resource_mut::<Input>().press(intent);
    }

    #[test]
    fn test_spawn_piece() {
        let mut world = create_test_world(10, 24);

        assert!(spawn_piece(&mut world));

        let count = world.query::<&Piece>().iter(&world).count();
        assert_eq!(count, 1);
        assert_eq!(current_piece(&mut world), Piece::new(ShapeKind::T));
        assert_eq!(world.resource::<Session>().state, SessionState::Falling);
    }

    #[test]
    fn test_piece_in_play_is_only_in_the_view() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::L);

        assert_eq!(world.resource::<Field>().filled_count(), 0);
        assert_eq!(world.resource::<View>().0.filled_count(), 4);

        let piece = current_piece(&mut world);
        let view = &world.resource::<View>().0;
        for &cell in piece.cells() {
            assert_eq!(view.get(cell), Cell::Filled(piece.color()));
        }
    }

    #[test]
    fn test_i_piece_walks_into_left_wall() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::I);

        let start = current_piece(&mut world);
        assert_eq!(sorted_cells(&start), vec![(3, 1), (4, 1), (5, 1), (6, 1)]);

        for expected_left in [2, 1, 0] {
            press(&mut world, Intent::Move(Direction::Left));
            input_system(&mut world);

            let piece = current_piece(&mut world);
            assert_eq!(piece.cells().iter().map(|c| c.x).min(), Some(expected_left));
        }

        let before = current_piece(&mut world);
        assert!(hits_left_wall(&before));

        press(&mut world, Intent::Move(Direction::Left));
        input_system(&mut world);

        let after = current_piece(&mut world);
        assert_eq!(after, before);
        assert_eq!(sorted_cells(&after), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_horizontal_move_blocked_by_locked_cell() {
        let mut world = create_test_world(10, 24);
        fill_test_field(&mut world, &[(7, 1)]);
        spawn_piece_of(&mut world, ShapeKind::T);
        let before = current_piece(&mut world);

        press(&mut world, Intent::Move(Direction::Right));
        input_system(&mut world);
        assert_eq!(current_piece(&mut world), before);

        press(&mut world, Intent::Move(Direction::Left));
        input_system(&mut world);
        assert_eq!(current_piece(&mut world).anchor(), Position::new(3, 0));
    }

    #[test]
    fn test_view_follows_moves() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::O);

        press(&mut world, Intent::Move(Direction::Right));
        input_system(&mut world);

        let view = &world.resource::<View>().0;
        assert_eq!(view.filled_count(), 4);
        assert!(!view.is_occupied(5, 0));
        assert!(view.is_occupied(7, 1));
    }

    #[test]
    fn test_rotation_applied_when_free() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::T);

        press(&mut world, Intent::Rotate(Rotation::Clockwise));
        input_system(&mut world);

        let piece = current_piece(&mut world);
        assert_eq!(sorted_cells(&piece), vec![(5, 0), (5, 1), (5, 2), (6, 1)]);
    }

    #[test]
    fn test_rotation_rejected_on_block() {
        let mut world = create_test_world(10, 24);
        fill_test_field(&mut world, &[(5, 2)]);
        spawn_piece_of(&mut world, ShapeKind::T);
        let before = current_piece(&mut world);

        press(&mut world, Intent::Rotate(Rotation::Clockwise));
        input_system(&mut world);

        assert_eq!(current_piece(&mut world), before);
    }

    #[test]
    fn test_rotation_rejected_at_wall_without_kick() {
        let field = Field::new(10, 24);
        let mut piece = Piece::new(ShapeKind::I);

        // Stand the bar up and push it flush against the left wall
        assert!(try_rotate(&field, &mut piece, Rotation::Clockwise));
        while try_move(&field, &mut piece, Direction::Left) {}
        assert_eq!(piece.cells().iter().map(|c| c.x).min(), Some(0));

        let before = piece.clone();
        assert!(!try_rotate(&field, &mut piece, Rotation::Clockwise));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_soft_drop_respects_blocks() {
        let mut world = create_test_world(10, 24);
        fill_test_field(&mut world, &[(5, 3)]);
        spawn_piece_of(&mut world, ShapeKind::O);

        press(&mut world, Intent::Move(Direction::Down));
        input_system(&mut world);
        assert_eq!(current_piece(&mut world).anchor(), Position::new(5, 1));

        // Resting on (5,3): a further soft drop is rejected and nothing locks
        press(&mut world, Intent::Move(Direction::Down));
        input_system(&mut world);
        assert_eq!(current_piece(&mut world).anchor(), Position::new(5, 1));
        assert_eq!(world.resource::<Field>().filled_count(), 1);
    }

    #[test]
    fn test_gravity_moves_piece_down() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::S);
        let before = current_piece(&mut world);

        assert_eq!(gravity_system(&mut world), GravityOutcome::Fell);

        let mut expected = before;
        expected.translate(0, 1);
        assert_eq!(current_piece(&mut world), expected);
    }

    #[test]
    fn test_o_piece_drops_to_floor_and_locks() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::O);

        // Lower edge goes from row 1 to row 23, the last row
        for _ in 0..22 {
            assert_eq!(gravity_system(&mut world), GravityOutcome::Fell);
        }
        let landed = current_piece(&mut world);
        assert_eq!(sorted_cells(&landed), vec![(5, 22), (5, 23), (6, 22), (6, 23)]);

        assert_eq!(gravity_system(&mut world), GravityOutcome::Locked);

        let field = world.resource::<Field>();
        assert_eq!(field.filled_count(), 4);
        for &cell in landed.cells() {
            assert_eq!(field.get(cell), Cell::Filled(ShapeKind::O.get_color()));
        }

        // The next piece appears at its canonical start
        let next = current_piece(&mut world);
        assert_eq!(next, Piece::new(ShapeKind::T));
        assert_eq!(world.query::<&Piece>().iter(&world).count(), 1);
    }

    #[test]
    fn test_every_shape_locks_with_its_color() {
        for kind in ShapeKind::ALL {
            let mut world = create_test_world(10, 24);
            spawn_piece_of(&mut world, kind);

            let mut last = current_piece(&mut world);
            loop {
                match gravity_system(&mut world) {
                    GravityOutcome::Fell => last = current_piece(&mut world),
                    GravityOutcome::Locked => break,
                    other => panic!("unexpected {other:?} for {kind:?}"),
                }
            }

            let field = world.resource::<Field>();
            assert_eq!(field.filled_count(), 4, "{kind:?}");
            for &cell in last.cells() {
                assert_eq!(field.get(cell), Cell::Filled(kind.get_color()));
            }

            let next = current_piece(&mut world);
            let field = world.resource::<Field>();
            assert!(next.cells().iter().all(|&c| !field.is_occupied(c.x, c.y)));
        }
    }

    #[test]
    fn test_piece_lands_on_locked_blocks() {
        let mut world = create_test_world(10, 24);
        fill_test_field(&mut world, &[(5, 10)]);
        spawn_piece_of(&mut world, ShapeKind::O);

        // Rows 0-1 down to rows 8-9, then it rests on (5,10)
        for _ in 0..8 {
            assert_eq!(gravity_system(&mut world), GravityOutcome::Fell);
        }
        assert_eq!(gravity_system(&mut world), GravityOutcome::Locked);
        assert!(world.resource::<Field>().is_occupied(6, 9));
    }

    #[test]
    fn test_spawn_on_blocks_ends_session() {
        let mut world = create_test_world(10, 24);
        fill_test_field(&mut world, &[(5, 1)]);

        assert!(!spawn_piece(&mut world));
        assert_eq!(world.resource::<Session>().state, SessionState::Ended);
        assert!(active_piece(&mut world).is_none());

        // The field is left exactly as it was
        assert_eq!(world.resource::<Field>().filled_count(), 1);
        assert_eq!(step(&mut world), StepOutcome::SessionEnded);
        assert_eq!(gravity_system(&mut world), GravityOutcome::SessionEnded);
    }

    #[test]
    fn test_lock_into_spawn_zone_ends_session() {
        let mut world = create_test_world(10, 24);
        fill_test_field(&mut world, &[(4, 2), (5, 2), (6, 2)]);
        spawn_piece_of(&mut world, ShapeKind::T);

        // The T is resting on the row below, locks, and the next T has no room
        assert_eq!(gravity_system(&mut world), GravityOutcome::SessionEnded);
        assert_eq!(world.resource::<Session>().state, SessionState::Ended);
        assert_eq!(world.resource::<Field>().filled_count(), 7);
    }

    #[test]
    fn test_step_applies_gravity_every_window() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::T);
        let frames = world.resource::<Session>().frames_per_fall;
        assert_eq!(frames, 10);

        for _ in 1..frames {
            assert_eq!(step(&mut world), StepOutcome::Frame);
        }
        assert_eq!(current_piece(&mut world).anchor(), Position::new(4, 0));

        let outcome = step(&mut world);
        assert_eq!(outcome, StepOutcome::Gravity(GravityOutcome::Fell));
        assert!(outcome.applied_gravity());
        assert_eq!(current_piece(&mut world).anchor(), Position::new(4, 1));
    }

    #[test]
    fn test_step_consumes_intents_once() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::T);

        press(&mut world, Intent::Move(Direction::Left));
        step(&mut world);
        step(&mut world);

        assert_eq!(current_piece(&mut world).anchor(), Position::new(3, 0));
        assert_eq!(*world.resource::<Input>(), Input::default());
    }

    #[test]
    fn test_spawn_clears_latched_input() {
        let mut world = create_test_world(10, 24);
        press(&mut world, Intent::Rotate(Rotation::Clockwise));

        spawn_piece(&mut world);
        assert_eq!(*world.resource::<Input>(), Input::default());
    }

    #[test]
    fn test_moves_mark_dirty_cells() {
        let mut world = create_test_world(10, 24);
        spawn_piece_of(&mut world, ShapeKind::T);
        let _ = world.resource_mut::<DirtyCells>().take();

        press(&mut world, Intent::Move(Direction::Left));
        input_system(&mut world);

        let dirty = world
            .resource_mut::<DirtyCells>()
            .take()
            .expect("only changed cells");
        let dirty: Vec<(i32, i32)> = dirty.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(dirty, vec![(3, 1), (4, 0), (4, 1), (5, 0), (5, 1), (6, 1)]);
    }
}
