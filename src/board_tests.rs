use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn pos(x: i8, y: i8) -> Position {
    Position::new(x, y)
}

fn board_from(black: &[(i8, i8)], white: &[(i8, i8)]) -> Board {
    let mut board = Board::new();
    for &(x, y) in black {
        board.set_stone(x, y, Player::Black);
    }
    for &(x, y) in white {
        board.set_stone(x, y, Player::White);
    }
    board
}

fn mask_of(cells: &[usize]) -> BitBoard {
    let mut mask = BitBoard::empty();
    for &idx in cells {
        mask.set(idx, true);
    }
    mask
}

#[test]
fn square_table_has_every_placement() {
    // 16 unit, 18 of extent two, 12 of extent three, 4 of extent four
    assert_eq!(SQUARE_MASKS.len(), 50);
    for mask in SQUARE_MASKS.iter() {
        assert_eq!(mask.count_ones(), 4);
        assert!(is_square_geometric(mask));
    }
}

#[test]
fn pattern_table_agrees_with_geometry_for_all_placements() {
    let mut squares = 0;
    for a in 0..CELLS {
        for b in (a + 1)..CELLS {
            for c in (b + 1)..CELLS {
                for d in (c + 1)..CELLS {
                    let stones = mask_of(&[a, b, c, d]);
                    let geometric = is_square_geometric(&stones);
                    assert_eq!(is_square_pattern(&stones), geometric, "cells {} {} {} {}", a, b, c, d);
                    if geometric {
                        squares += 1;
                    }
                }
            }
        }
    }
    assert_eq!(squares, 50);
}

#[test]
fn corner_square_wins() {
    let board = board_from(&[(0, 0), (0, 4), (4, 0), (4, 4)], &[(2, 2), (1, 2), (3, 2), (2, 1)]);
    assert!(board.is_square(Player::Black));
    assert!(!board.is_square(Player::White));
}

#[test]
fn rotated_square_wins() {
    let board = board_from(&[(1, 0), (0, 3), (4, 1), (3, 4)], &[(2, 2), (1, 2), (3, 2), (2, 1)]);
    assert!(board.is_square(Player::Black));
}

#[test]
fn diamond_wins_for_white() {
    let board = board_from(&[(0, 0), (1, 0), (2, 0), (4, 4)], &[(2, 1), (1, 2), (3, 2), (2, 3)]);
    assert!(board.is_square(Player::White));
}

#[test]
fn collinear_and_rectangles_do_not_win() {
    let line = board_from(&[(0, 0), (1, 0), (2, 0), (3, 0)], &[]);
    assert!(!line.is_square(Player::Black));
    let rectangle = board_from(&[(0, 0), (2, 0), (0, 1), (2, 1)], &[]);
    assert!(!rectangle.is_square(Player::Black));
    let rhombus = board_from(&[(0, 0), (2, 1), (3, 3), (1, 2)], &[]);
    assert!(!rhombus.is_square(Player::Black));
}

#[test]
fn fewer_than_four_stones_is_no_win() {
    let board = board_from(&[(0, 0), (1, 0), (0, 1)], &[]);
    assert!(!board.is_square(Player::Black));
    assert!(board.spread(Player::Black).is_none());
}

#[test]
fn spread_of_square_and_line() {
    let square = board_from(&[(0, 0), (2, 0), (0, 2), (2, 2)], &[]);
    let spread = square.spread(Player::Black).unwrap();
    assert_eq!((spread.min(), spread.max()), (4, 8));
    let line = board_from(&[(0, 0), (1, 0), (2, 0), (3, 0)], &[]);
    let spread = line.spread(Player::Black).unwrap();
    assert_eq!((spread.min(), spread.max()), (1, 9));
}

#[test]
fn set_stone_replaces_other_owner() {
    let mut board = Board::new();
    board.set_stone(2, 3, Player::Black);
    assert_eq!(board.get_stone(2, 3), Some(Player::Black));
    board.set_stone(2, 3, Player::White);
    assert_eq!(board.get_stone(2, 3), Some(Player::White));
    assert!(!board.stones(Player::Black).any());
    board.clear_stone(2, 3);
    assert_eq!(board.get_stone(2, 3), None);
}

#[test]
fn in_board_bounds() {
    assert!(Board::is_in_board(0, 0));
    assert!(Board::is_in_board(4, 4));
    assert!(!Board::is_in_board(-1, 0));
    assert!(!Board::is_in_board(0, 5));
    let board = Board::new();
    assert!(!board.is_no_stone(pos(5, 0)));
    assert!(!board.is_my_stone(Position::NONE));
}

#[test]
fn available_move_rules() {
    let board = board_from(&[(0, 0), (2, 2), (4, 4), (0, 4)], &[(1, 1), (3, 3), (4, 0), (2, 0)]);
    assert_eq!(board.turn_holder(), Player::Black);
    assert!(board.is_available_move(pos(0, 0), pos(1, 0)));
    assert!(board.is_available_move(pos(2, 2), pos(1, 3)));
    // occupied destination
    assert!(!board.is_available_move(pos(0, 0), pos(1, 1)));
    // opponent stone
    assert!(!board.is_available_move(pos(1, 1), pos(1, 2)));
    // not adjacent
    assert!(!board.is_available_move(pos(0, 0), pos(0, 2)));
    // off the board
    assert!(!board.is_available_move(pos(4, 4), pos(5, 4)));
    // empty source
    assert!(!board.is_available_move(pos(1, 0), pos(1, 0)));
}

#[test]
fn do_move_updates_cells_and_turn() {
    let mut board = board_from(&[(0, 0), (2, 2), (4, 4), (0, 4)], &[(1, 1), (3, 3), (4, 0), (2, 0)]);
    let mv = Move::new(pos(2, 2), pos(2, 1));
    board.do_move(mv);
    assert_eq!(board.get_stone(2, 1), Some(Player::Black));
    assert_eq!(board.get_stone(2, 2), None);
    assert_eq!(board.last_move(Player::Black), mv);
    assert_eq!(board.last_move(Player::White), Move::NONE);
    assert_eq!(board.turn(), 1);
    assert_eq!(board.turn_holder(), Player::White);
}

#[test]
fn copies_do_not_share_state() {
    let original = board_from(&[(0, 0), (2, 2), (4, 4), (0, 4)], &[(1, 1), (3, 3), (4, 0), (2, 0)]);
    let mut copy = original;
    copy.do_move(Move::new(pos(0, 0), pos(1, 0)));
    assert_eq!(original.get_stone(0, 0), Some(Player::Black));
    assert_eq!(original.turn(), 0);
    assert_ne!(original, copy);
}

#[test]
fn dawdling_blocks_only_immediate_reversal() {
    let mut board = board_from(&[(0, 0), (2, 2), (4, 4), (0, 4)], &[(1, 1), (3, 3), (4, 0), (2, 0)]);
    board.do_move(Move::new(pos(0, 0), pos(1, 0)));
    board.do_move(Move::new(pos(4, 0), pos(4, 1)));
    assert!(!board.is_available_move(pos(1, 0), pos(0, 0)));
    assert!(!board.enum_next_moves().contains(&Move::new(pos(1, 0), pos(0, 0))));
    // another black move in between lifts the restriction
    board.do_move(Move::new(pos(4, 4), pos(4, 3)));
    board.do_move(Move::new(pos(3, 3), pos(3, 2)));
    assert!(board.is_available_move(pos(1, 0), pos(0, 0)));
    assert!(board.enum_next_moves().contains(&Move::new(pos(1, 0), pos(0, 0))));
}

#[test]
fn dawdling_is_tracked_per_side() {
    let mut board = board_from(&[(0, 0), (2, 2), (4, 4), (0, 4)], &[(1, 1), (3, 3), (4, 0), (2, 0)]);
    board.do_move(Move::new(pos(0, 0), pos(1, 0)));
    // white may step onto the vacated cell
    assert!(board.is_available_move(pos(1, 1), pos(0, 0)));
}

#[test]
fn enumeration_order_is_deterministic() {
    let board = board_from(&[(0, 0), (4, 4), (0, 4), (4, 0)], &[(2, 2), (1, 2), (3, 2), (2, 1)]);
    let moves = board.enum_next_moves();
    assert_eq!(moves, board.enum_next_moves());
    assert_eq!(moves.len(), 12);
    assert_eq!(moves[0], Move::new(pos(0, 0), pos(0, 1)));
    assert_eq!(moves[11].from, pos(4, 4));
}

#[test]
fn enumeration_matches_legality_on_reachable_boards() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let mut board = Board::new();
        board.reset_random(&mut rng);
        for _ in 0..30 {
            let moves = board.enum_next_moves();
            let mut expected = Vec::new();
            for from in 0..CELLS {
                for to in 0..CELLS {
                    let (from, to) = (point_of(from), point_of(to));
                    if board.is_available_move(from, to) {
                        expected.push(Move::new(from, to));
                    }
                }
            }
            let mut sorted = moves.clone();
            sorted.sort_by_key(|mv| mv.packed());
            sorted.dedup();
            assert_eq!(sorted.len(), moves.len(), "duplicate moves on\n{}", board);
            expected.sort_by_key(|mv| mv.packed());
            assert_eq!(sorted, expected, "on\n{}", board);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            let mover = board.turn_holder();
            board.do_move(mv);
            assert_eq!(board.get_stone(mv.to.x, mv.to.y), Some(mover));
            assert_eq!(board.get_stone(mv.from.x, mv.from.y), None);
            if board.is_square(mover) {
                break;
            }
        }
    }
}

#[test]
fn random_reset_places_four_per_side() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut board = Board::new();
    board.reset_random(&mut rng);
    assert_eq!(board.stones(Player::Black).count_ones(), 4);
    assert_eq!(board.stones(Player::White).count_ones(), 4);
    assert!(!(board.stones(Player::Black) & board.stones(Player::White)).any());
    assert_eq!(board.turn(), 0);

    let mut again = Board::new();
    again.reset_random(&mut StdRng::seed_from_u64(42));
    assert_eq!(board, again);
}

#[test]
fn reset_with_places_opening() {
    let mut board = board_from(&[(3, 3)], &[]);
    board.do_move(Move::new(pos(3, 3), pos(3, 4)));
    let black = [pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)];
    let white = [pos(0, 4), pos(1, 4), pos(2, 4), pos(3, 4)];
    board.reset_with(&black, &white);
    assert_eq!(board.turn(), 0);
    assert_eq!(board.last_move(Player::Black), Move::NONE);
    assert_eq!(board.get_stone(3, 0), Some(Player::Black));
    assert_eq!(board.get_stone(3, 4), Some(Player::White));
    assert_eq!(board.stones(Player::Black).count_ones(), 4);
}

#[test]
fn with_turn_holder_switches_side() {
    let board = Board::new();
    assert_eq!(board.with_turn_holder(Player::White).turn_holder(), Player::White);
    assert_eq!(board.with_turn_holder(Player::Black), board);
}

#[test]
fn display_marks_stones() {
    let board = board_from(&[(0, 0), (4, 0)], &[(2, 4)]);
    assert_eq!(
        format!("{}", board),
        "x---x\n\
         -----\n\
         -----\n\
         -----\n\
         --o--\n"
    );
}
