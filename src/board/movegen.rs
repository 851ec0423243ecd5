/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Color, Piece, PieceKind, Position};

/// Deltas for one orthogonal step: up, down, left, right.
const ORTHOGONAL_DELTAS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Deltas for one diagonal step.
const DIAGONAL_DELTAS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Deltas for the movement of the Horse, each paired with the delta of its leg.
///
/// The leg is the single orthogonal step in the direction of the 2-square component.
const HORSE_DELTAS: [((i8, i8), (i8, i8)); 8] = [
    ((-2, -1), (-1, 0)),
    ((-2, 1), (-1, 0)),
    ((2, -1), (1, 0)),
    ((2, 1), (1, 0)),
    ((-1, -2), (0, -1)),
    ((1, -2), (0, -1)),
    ((-1, 2), (0, 1)),
    ((1, 2), (0, 1)),
];

/// A list of moves, each represented as an origin and a destination.
pub type MoveList = Vec<(Position, Position)>;

/// Computes every pseudo-legal destination for `piece` on `board`.
///
/// Pseudo-legal destinations obey the piece's movement rule but may leave its own general in check.
/// No destination is ever occupied by a piece of the mover's color.
pub fn pseudo_legal_moves(piece: &Piece, board: &Board) -> Vec<Position> {
    let mut moves = Vec::with_capacity(17);

    match piece.kind() {
        PieceKind::General => general_moves(piece, board, &mut moves),
        PieceKind::Advisor => advisor_moves(piece, board, &mut moves),
        PieceKind::Elephant => elephant_moves(piece, board, &mut moves),
        PieceKind::Horse => horse_moves(piece, board, &mut moves),
        PieceKind::Chariot => chariot_moves(piece, board, &mut moves),
        PieceKind::Cannon => cannon_moves(piece, board, &mut moves),
        PieceKind::Soldier => soldier_moves(piece, board, &mut moves),
    }

    moves
}

/// Returns `true` if `to` is a destination for a piece of `color`: empty, or held by an enemy.
#[inline(always)]
fn is_open_to(board: &Board, to: Position, color: Color) -> bool {
    board.color_at(to) != Some(color)
}

/// One orthogonal step, staying in the palace, never exposing the generals to each other.
fn general_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();

    for (dr, dc) in ORTHOGONAL_DELTAS {
        let Some(to) = piece.position().offset(dr, dc) else {
            continue;
        };

        if to.is_in_palace(color)
            && is_open_to(board, to, color)
            && !generals_would_face(board, piece, to)
        {
            moves.push(to);
        }
    }
}

/// Returns `true` if moving `general` to `to` would leave both generals on the same file with nothing between them.
///
/// The board is scanned as if the move had been made: the general's origin counts as empty.
pub fn generals_would_face(board: &Board, general: &Piece, to: Position) -> bool {
    let Some(enemy) = board.general(general.color().opponent()) else {
        return false;
    };
    let enemy = enemy.position();

    if enemy.col() != to.col() || enemy == to {
        return false;
    }

    let (low, high) = (to.row().min(enemy.row()), to.row().max(enemy.row()));
    !(low + 1..high).any(|row| {
        let between = Position::new(row, to.col());
        between != general.position() && board.is_occupied(between)
    })
}

/// One diagonal step, staying in the palace.
fn advisor_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();

    for (dr, dc) in DIAGONAL_DELTAS {
        let Some(to) = piece.position().offset(dr, dc) else {
            continue;
        };

        if to.is_in_palace(color) && is_open_to(board, to, color) {
            moves.push(to);
        }
    }
}

/// Exactly two diagonal steps, never crossing the river, blocked by anything on the intervening point.
fn elephant_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();
    let from = piece.position();

    for (dr, dc) in DIAGONAL_DELTAS {
        let (Some(eye), Some(to)) = (from.offset(dr, dc), from.offset(dr * 2, dc * 2)) else {
            continue;
        };

        if !board.is_occupied(eye) && to.is_on_own_side(color) && is_open_to(board, to, color) {
            moves.push(to);
        }
    }
}

/// The eight knight-like jumps, each blocked by anything on its leg.
fn horse_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();
    let from = piece.position();

    for ((dr, dc), (leg_dr, leg_dc)) in HORSE_DELTAS {
        let (Some(leg), Some(to)) = (from.offset(leg_dr, leg_dc), from.offset(dr, dc)) else {
            continue;
        };

        if !board.is_occupied(leg) && is_open_to(board, to, color) {
            moves.push(to);
        }
    }
}

/// Slides along ranks and files up to the first occupied point, which may be captured if it is an enemy.
fn chariot_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();

    for (dr, dc) in ORTHOGONAL_DELTAS {
        let mut current = piece.position();
        while let Some(to) = current.offset(dr, dc) {
            current = to;
            match board.piece_at(to) {
                None => moves.push(to),
                Some(occupant) => {
                    if occupant.color() != color {
                        moves.push(to);
                    }
                    break;
                }
            }
        }
    }
}

/// Slides like a chariot without capturing, or captures the first piece found past exactly one screen.
fn cannon_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();

    for (dr, dc) in ORTHOGONAL_DELTAS {
        let mut screened = false;
        let mut current = piece.position();

        while let Some(to) = current.offset(dr, dc) {
            current = to;
            match (screened, board.piece_at(to)) {
                (false, None) => moves.push(to),
                (false, Some(_)) => screened = true,
                (true, None) => {}
                (true, Some(target)) => {
                    if target.color() != color {
                        moves.push(to);
                    }
                    break;
                }
            }
        }
    }
}

/// One step forward, plus one step sideways once the soldier has crossed the river.
fn soldier_moves(piece: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = piece.color();
    let from = piece.position();

    if let Some(to) = from.offset(color.forward(), 0) {
        if is_open_to(board, to, color) {
            moves.push(to);
        }
    }

    if !from.is_on_own_side(color) {
        for dc in [-1, 1] {
            if let Some(to) = from.offset(0, dc) {
                if is_open_to(board, to, color) {
                    moves.push(to);
                }
            }
        }
    }
}

/// Returns `true` if `color`'s general is attacked: some enemy piece has its square among its pseudo-legal destinations.
///
/// A board without a general of `color` is never in check.
pub fn is_in_check(color: Color, board: &Board) -> bool {
    let Some(general) = board.general(color) else {
        return false;
    };
    let target = general.position();

    board
        .pieces_of(color.opponent())
        .any(|attacker| pseudo_legal_moves(attacker, board).contains(&target))
}

/// Returns `true` if moving the piece on `from` to `to` would leave the mover's own general in check.
///
/// The move is tested on a disposable copy of `board`.
///
/// # Panics
/// If there is no piece on `from`.
pub fn leaves_in_check(board: &Board, from: Position, to: Position) -> bool {
    let Some(color) = board.color_at(from) else {
        panic!("leaves_in_check requires a piece on {from}");
    };

    is_in_check(color, &board.with_move_made(from, to))
}

/// Computes the legal destinations for `piece`: its pseudo-legal destinations that do not leave its own general in check.
pub fn legal_moves_for(piece: &Piece, board: &Board) -> Vec<Position> {
    let from = piece.position();
    let mut moves = pseudo_legal_moves(piece, board);
    moves.retain(|&to| !leaves_in_check(board, from, to));
    moves
}

/// Computes every legal move for `color`, in piece order.
pub fn legal_moves(board: &Board, color: Color) -> MoveList {
    board
        .pieces_of(color)
        .flat_map(|piece| {
            let from = piece.position();
            legal_moves_for(piece, board)
                .into_iter()
                .map(move |to| (from, to))
        })
        .collect()
}

/// Returns `true` if `color` has at least one legal move.
pub fn has_legal_move(board: &Board, color: Color) -> bool {
    board.pieces_of(color).any(|piece| {
        let from = piece.position();
        pseudo_legal_moves(piece, board)
            .into_iter()
            .any(|to| !leaves_in_check(board, from, to))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fetch the pseudo-legal destinations of the piece on `pos`, sorted.
    fn destinations(board: &Board, pos: Position) -> Vec<Position> {
        let piece = board.piece_at(pos).unwrap();
        let mut moves = pseudo_legal_moves(piece, board);
        moves.sort();
        moves
    }

    fn positions(squares: &[&str]) -> Vec<Position> {
        let mut positions = squares
            .iter()
            .map(|s| s.parse::<Position>().unwrap())
            .collect::<Vec<_>>();
        positions.sort();
        positions
    }

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn test_destinations_are_never_friendly() {
        let fens = [
            "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR",
            "r1bakab1r/9/1cn4cn/p1p1p3p/6p2/2P6/P3P1P1P/1CN3NC1/9/R1BAKAB1R",
            "3k5/4a4/4b4/2n1c4/1R2P4/4p4/9/4C4/4A4/3AK4",
        ];

        for fen in fens {
            let board = Board::from_fen(fen).unwrap();
            for piece in board.pieces() {
                for to in pseudo_legal_moves(piece, &board) {
                    assert_ne!(to, piece.position(), "{piece} cannot stay put");
                    assert_ne!(
                        board.color_at(to),
                        Some(piece.color()),
                        "{piece} cannot land on a friendly piece at {to}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_general_stays_in_palace() {
        let board = Board::from_fen("9/9/9/9/9/9/9/9/9/3K5").unwrap();
        assert_eq!(destinations(&board, pos("d0")), positions(&["d1", "e0"]));
    }

    #[test]
    fn test_generals_cannot_face_each_other() {
        // Red's general may not step onto the open e-file where Black's general stands
        let board = Board::from_fen("4k4/9/9/9/9/9/9/9/9/3K5").unwrap();
        assert_eq!(destinations(&board, pos("d0")), positions(&["d1"]));

        // A piece between them makes the e-file safe
        let board = Board::from_fen("4k4/9/9/9/4p4/9/9/9/9/3K5").unwrap();
        assert_eq!(destinations(&board, pos("d0")), positions(&["d1", "e0"]));
    }

    #[test]
    fn test_advisor_moves_diagonally_in_palace() {
        let board = Board::from_fen("9/9/9/9/9/9/9/9/9/3A5").unwrap();
        assert_eq!(destinations(&board, pos("d0")), positions(&["e1"]));

        let board = Board::from_fen("9/9/9/9/9/9/9/9/4A4/9").unwrap();
        assert_eq!(
            destinations(&board, pos("e1")),
            positions(&["d0", "f0", "d2", "f2"])
        );
    }

    #[test]
    fn test_elephant_eye_blocks_move() {
        let board = Board::from_fen("9/9/9/9/9/9/9/9/9/2B6").unwrap();
        assert_eq!(destinations(&board, pos("c0")), positions(&["a2", "e2"]));

        // A piece on the eye blocks that direction, whatever stands on the destination
        let board = Board::from_fen("9/9/9/9/9/9/9/9/3n5/2B6").unwrap();
        assert_eq!(destinations(&board, pos("c0")), positions(&["a2"]));

        // Even with an enemy waiting on e2 to be captured
        let board = Board::from_fen("9/9/9/9/9/9/9/4n4/3n5/2B6").unwrap();
        assert_eq!(destinations(&board, pos("c0")), positions(&["a2"]));
    }

    #[test]
    fn test_elephant_cannot_cross_river() {
        let board = Board::from_fen("9/9/9/9/9/2B6/9/9/9/9").unwrap();
        assert_eq!(destinations(&board, pos("c4")), positions(&["a2", "e2"]));

        let board = Board::from_fen("9/9/9/9/2b6/9/9/9/9/9").unwrap();
        assert_eq!(destinations(&board, pos("c5")), positions(&["a7", "e7"]));
    }

    #[test]
    fn test_horse_leg_blocks_move() {
        let board = Board::from_fen("9/9/9/9/4N4/9/9/9/9/9").unwrap();
        assert_eq!(destinations(&board, pos("e5")).len(), 8);

        // Block the leg towards row 0: both forward jumps are gone, even onto an enemy
        let board = Board::from_fen("9/9/3r5/4P4/4N4/9/9/9/9/9").unwrap();
        let moves = destinations(&board, pos("e5"));
        assert_eq!(moves.len(), 6);
        assert!(!moves.contains(&pos("d7")));
        assert!(!moves.contains(&pos("f7")));
    }

    #[test]
    fn test_horse_in_corner() {
        let board = Board::from_fen("9/9/9/9/9/9/9/9/9/N8").unwrap();
        assert_eq!(destinations(&board, pos("a0")), positions(&["b2", "c1"]));

        let board = Board::from_fen("9/9/9/9/9/9/9/9/P8/NP7").unwrap();
        assert!(destinations(&board, pos("a0")).is_empty());
    }

    #[test]
    fn test_chariot_slides_until_blocked() {
        let board = Board::from_fen("9/9/9/9/9/9/9/9/P8/R1p6").unwrap();
        // Blocked by a friendly soldier above, captures the black soldier on c0
        assert_eq!(destinations(&board, pos("a0")), positions(&["b0", "c0"]));
    }

    #[test]
    fn test_cannon_needs_exactly_one_screen() {
        // No screen: the enemy on the file cannot be captured
        let board = Board::from_fen("4r4/9/9/9/9/9/9/9/9/4C4").unwrap();
        let moves = destinations(&board, pos("e0"));
        assert!(!moves.contains(&pos("e9")));
        assert!(moves.contains(&pos("e8")));

        // One screen: capture is possible, the screen itself is not
        let board = Board::from_fen("4r4/9/9/9/4p4/9/9/9/9/4C4").unwrap();
        let moves = destinations(&board, pos("e0"));
        assert!(moves.contains(&pos("e9")));
        assert!(!moves.contains(&pos("e5")));
        assert!(!moves.contains(&pos("e6")));

        // Two pieces past the cannon: only the first one beyond the screen can be captured
        let board = Board::from_fen("4r4/9/4p4/9/4p4/9/9/9/9/4C4").unwrap();
        let moves = destinations(&board, pos("e0"));
        assert!(moves.contains(&pos("e7")));
        assert!(!moves.contains(&pos("e9")));

        // A friendly piece past the screen cannot be captured
        let board = Board::from_fen("4R4/9/9/9/4p4/9/9/9/9/4C4").unwrap();
        assert!(!destinations(&board, pos("e0")).contains(&pos("e9")));
    }

    #[test]
    fn test_soldier_before_river() {
        let board = Board::from_fen("9/9/9/9/9/9/4P4/9/9/9").unwrap();
        assert_eq!(destinations(&board, pos("e3")), positions(&["e4"]));

        let board = Board::from_fen("9/9/9/4p4/9/9/9/9/9/9").unwrap();
        assert_eq!(destinations(&board, pos("e6")), positions(&["e5"]));
    }

    #[test]
    fn test_soldier_after_river() {
        let board = Board::from_fen("9/9/9/9/4P4/9/9/9/9/9").unwrap();
        assert_eq!(
            destinations(&board, pos("e5")),
            positions(&["e6", "d5", "f5"])
        );

        // On the last row, only sideways steps remain
        let board = Board::from_fen("P8/9/9/9/9/9/9/9/9/9").unwrap();
        assert_eq!(destinations(&board, pos("a9")), positions(&["b9"]));

        let board = Board::from_fen("9/9/9/9/9/4p4/9/9/9/9").unwrap();
        assert_eq!(
            destinations(&board, pos("e4")),
            positions(&["e3", "d4", "f4"])
        );
    }

    #[test]
    fn test_soldier_never_moves_backwards() {
        for pos in Position::iter() {
            for color in Color::all() {
                let mut board = Board::new();
                board.place(PieceKind::Soldier, color, pos).unwrap();
                let piece = board.piece_at(pos).unwrap();
                for to in pseudo_legal_moves(piece, &board) {
                    let progress = (to.row() as i8 - pos.row() as i8) * color.forward();
                    assert!(progress >= 0, "{piece} moved backwards to {to}");
                    if pos.is_on_own_side(color) {
                        assert_eq!(progress, 1, "{piece} moved sideways before the river");
                    }
                }
            }
        }
    }

    #[test]
    fn test_is_in_check() {
        // Chariot on the open file
        let board = Board::from_fen("3k5/9/9/9/9/9/9/9/9/3RK4").unwrap();
        assert!(is_in_check(Color::Black, &board));
        assert!(!is_in_check(Color::Red, &board));

        // Cannon without a screen does not give check
        let board = Board::from_fen("3k5/9/9/9/9/9/9/9/9/3CK4").unwrap();
        assert!(!is_in_check(Color::Black, &board));

        // Cannon with a screen does
        let board = Board::from_fen("3k5/9/9/3p5/9/9/9/9/9/3CK4").unwrap();
        assert!(is_in_check(Color::Black, &board));

        // Horse with a blocked leg does not
        let board = Board::from_fen("3k5/2P6/2N6/9/9/9/9/9/9/4K4").unwrap();
        assert!(!is_in_check(Color::Black, &board));

        // The same horse with a free leg does
        let board = Board::from_fen("3k5/9/2N6/9/9/9/9/9/9/4K4").unwrap();
        assert!(is_in_check(Color::Black, &board));
    }

    #[test]
    fn test_legal_moves_filter_self_check() {
        // The black chariot pins the red horse against its general
        let board = Board::from_fen("3k5/9/9/9/4r4/9/9/4N4/9/4K4").unwrap();
        let horse = board.piece_at(pos("e2")).unwrap();
        assert!(!pseudo_legal_moves(horse, &board).is_empty());
        assert!(legal_moves_for(horse, &board).is_empty());
    }

    #[test]
    fn test_start_position_has_44_moves() {
        let board = Board::standard();
        assert_eq!(legal_moves(&board, Color::Red).len(), 44);
        assert_eq!(legal_moves(&board, Color::Black).len(), 44);
        assert!(has_legal_move(&board, Color::Red));
    }
}
