/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use log::debug;

use crate::{
    has_legal_move, is_in_check, leaves_in_check, legal_moves, legal_moves_for,
    parse_coordinate_move, pseudo_legal_moves, Board, Color, Move, MoveList, Piece,
    Position,
};

/// FEN string for the starting position of Xiangqi.
pub const FEN_STARTPOS: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w";

/// The state of a game, from the perspective of the side to move.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub enum GameStatus {
    #[default]
    Playing,

    /// The side to move is in check, but has a legal move.
    Check,

    /// The side to move is in check and has no legal moves.
    Checkmate,

    /// The side to move is not in check, but has no legal moves.
    ///
    /// No winner is declared.
    Stalemate,

    /// Reserved for drawn games. No rule currently produces it.
    Draw,
}

impl GameStatus {
    /// Returns `true` if the game cannot continue from this status.
    #[inline(always)]
    pub const fn is_game_over(&self) -> bool {
        matches!(self, Self::Checkmate | Self::Stalemate)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Check => "check",
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// A complete snapshot of a game in progress.
///
/// Holds the board, whose turn it is, the status derived for that side, the current selection, and the move history.
/// A [`GamePosition`] can be cloned freely; the [`Game`] owns the live one.
#[derive(Clone, PartialEq, Eq)]
pub struct GamePosition {
    board: Board,
    side_to_move: Color,
    status: GameStatus,
    selected: Option<Piece>,
    valid_moves: Vec<Position>,
    winner: Option<Color>,
    history: Vec<Move>,
}

impl GamePosition {
    /// Creates a new [`GamePosition`] with the standard starting layout, Red to move.
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Color::Red)
    }

    /// Creates a new [`GamePosition`] from a board and the side to move.
    ///
    /// The status and winner are derived for `side_to_move`, and the history is empty.
    /// Any [`Board`] built through [`Board::place`] or [`Board::from_fen`] holds at most one general per color.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        let mut position = Self {
            board,
            side_to_move,
            status: GameStatus::Playing,
            selected: None,
            valid_moves: Vec::new(),
            winner: None,
            history: Vec::new(),
        };

        position.refresh_status();
        position
    }

    /// Creates a new [`GamePosition`] from the provided FEN string.
    ///
    /// The first field is the piece placement and the second is the side to move, which defaults to Red if absent.
    /// Any further fields are ignored.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Color, GamePosition, GameStatus};
    /// let position = GamePosition::from_fen("4k4/9/9/9/9/9/9/9/4R4/3K5 b").unwrap();
    /// assert_eq!(position.side_to_move(), Color::Black);
    /// assert_eq!(position.status(), GameStatus::Check);
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut fields = fen.split_whitespace();

        let Some(placement) = fields.next() else {
            bail!("Invalid FEN {fen:?}: missing piece placement");
        };
        let board = Board::from_fen(placement)?;

        let side_to_move = match fields.next() {
            Some(side) => Color::from_fen(side)?,
            None => Color::Red,
        };

        Ok(Self::from_board(board, side_to_move))
    }

    /// Generates a FEN string for this position.
    pub fn to_fen(&self) -> String {
        format!("{} {}", self.board.to_fen(), self.side_to_move.to_fen())
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// The currently selected piece, if any.
    #[inline(always)]
    pub const fn selected(&self) -> Option<&Piece> {
        self.selected.as_ref()
    }

    /// The legal destinations of the selected piece. Empty if nothing is selected.
    #[inline(always)]
    pub fn valid_moves(&self) -> &[Position] {
        &self.valid_moves
    }

    /// The declared winner. Only set on checkmate.
    #[inline(always)]
    pub const fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Every move made so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        is_in_check(self.side_to_move, &self.board)
    }

    /// Returns `true` if the game has ended in checkmate or stalemate.
    #[inline(always)]
    pub const fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Every legal move for the side to move.
    #[inline(always)]
    pub fn legal_moves(&self) -> MoveList {
        legal_moves(&self.board, self.side_to_move)
    }

    /// Drops the selection and its destinations.
    fn clear_selection(&mut self) {
        self.selected = None;
        self.valid_moves.clear();
    }

    /// Derives the status and winner for the side to move.
    fn refresh_status(&mut self) {
        let side = self.side_to_move;
        let in_check = is_in_check(side, &self.board);
        let can_move = has_legal_move(&self.board, side);

        let (status, winner) = match (in_check, can_move) {
            (true, false) => (GameStatus::Checkmate, Some(side.opponent())),
            (true, true) => (GameStatus::Check, None),
            (false, false) => (GameStatus::Stalemate, None),
            (false, true) => (GameStatus::Playing, None),
        };

        if status != self.status {
            debug!("Status for {side} changed from {} to {status}", self.status);
        }

        self.status = status;
        self.winner = winner;
    }
}

impl Default for GamePosition {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GamePosition {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for GamePosition {
    /// Displays the board, with the FEN, side to move, and status beside it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board.to_string();

        for (i, line) in board.lines().enumerate() {
            write!(f, "{line}")?;
            match i {
                1 => write!(f, "        FEN: {}", self.to_fen())?,
                2 => write!(f, "       Side: {}", self.side_to_move)?,
                3 => write!(f, "     Status: {}", self.status)?,
                4 => {
                    if let Some(winner) = self.winner {
                        write!(f, "     Winner: {winner}")?;
                    }
                }
                6 => write!(f, "      Moves: {}", self.history.len())?,
                7 => {
                    if let Some(selected) = self.selected {
                        write!(f, "   Selected: {selected}")?;
                    }
                }
                _ => {}
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for GamePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// The rules engine: owns the live [`GamePosition`] and is the only thing that mutates it.
///
/// Every operation either succeeds completely or leaves the position untouched.
#[derive(Clone, Debug, Default)]
pub struct Game {
    position: GamePosition,
}

impl Game {
    /// Starts a new game from the standard starting layout.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a game from the provided position.
    #[inline(always)]
    pub fn from_position(position: GamePosition) -> Self {
        Self { position }
    }

    /// The live position.
    #[inline(always)]
    pub const fn position(&self) -> &GamePosition {
        &self.position
    }

    /// An owned copy of the live position, for handing to a search or a renderer.
    #[inline(always)]
    pub fn snapshot(&self) -> GamePosition {
        self.position.clone()
    }

    /// Selects the piece on `pos`, if it belongs to the side to move, storing its legal destinations.
    ///
    /// Otherwise, clears any existing selection and returns `false`.
    pub fn select_piece(&mut self, pos: Position) -> bool {
        let side = self.position.side_to_move;

        match self.position.board.piece_at(pos).copied() {
            Some(piece) if piece.color() == side => {
                self.position.valid_moves = legal_moves_for(&piece, &self.position.board);
                self.position.selected = Some(piece);
                true
            }
            _ => {
                self.position.clear_selection();
                false
            }
        }
    }

    /// Clears the selection and its destinations.
    #[inline(always)]
    pub fn clear_selection(&mut self) {
        self.position.clear_selection();
    }

    /// Moves the piece on `from` to `to`, if that is a legal move for the side to move.
    ///
    /// On success, any piece on `to` is captured, the move is recorded, the turn passes,
    /// the selection is cleared, and the status is derived for the new side to move.
    ///
    /// On failure, returns `false` and nothing changes.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Color, Game};
    /// let mut game = Game::new();
    /// assert!(game.make_move("b0".parse().unwrap(), "c2".parse().unwrap()));
    /// assert_eq!(game.position().side_to_move(), Color::Black);
    /// assert_eq!(game.move_history(), ["Hb0c2"]);
    /// ```
    pub fn make_move(&mut self, from: Position, to: Position) -> bool {
        let position = &mut self.position;
        let side = position.side_to_move;

        let Some(piece) = position.board.piece_at(from).copied() else {
            debug!("Rejected {from}{to}: no piece on {from}");
            return false;
        };

        if piece.color() != side {
            debug!("Rejected {from}{to}: {piece} cannot move on {side}'s turn");
            return false;
        }

        if !pseudo_legal_moves(&piece, &position.board).contains(&to) {
            debug!("Rejected {from}{to}: {piece} cannot reach {to}");
            return false;
        }

        if leaves_in_check(&position.board, from, to) {
            debug!("Rejected {from}{to}: would leave the {side} general in check");
            return false;
        }

        let captured = position.board.relocate(from, to);
        position.history.push(Move::new(piece, to, captured));
        position.side_to_move = side.opponent();
        position.clear_selection();
        position.refresh_status();

        true
    }

    /// Parses a move like `b0c2` or `b0-c2` and makes it.
    pub fn make_move_str(&mut self, mv: &str) -> Result<()> {
        let (from, to) = parse_coordinate_move(mv)?;

        if !self.make_move(from, to) {
            bail!(
                "Illegal move {from}{to} for {} in position {}",
                self.position.side_to_move,
                self.position.to_fen()
            );
        }

        Ok(())
    }

    /// Reverts the most recent move, restoring the mover and anything it captured.
    ///
    /// Returns `false` if there are no moves to undo.
    pub fn undo_last_move(&mut self) -> bool {
        let position = &mut self.position;

        let Some(mv) = position.history.pop() else {
            debug!("Nothing to undo");
            return false;
        };

        position.board.revert(
            mv.from(),
            mv.to(),
            mv.piece().has_moved(),
            mv.captured().copied(),
        );
        position.side_to_move = mv.piece().color();
        position.clear_selection();
        position.refresh_status();

        true
    }

    /// Replaces the live position entirely.
    #[inline(always)]
    pub fn reset_game(&mut self, position: GamePosition) {
        self.position = position;
    }

    /// Replaces the live position with the standard starting layout.
    #[inline(always)]
    pub fn new_game(&mut self) {
        self.reset_game(GamePosition::new());
    }

    /// The legal destinations of every piece of the side to move, grouped by piece.
    ///
    /// Pieces without any legal destination are omitted.
    pub fn get_all_valid_moves(&self) -> Vec<(Piece, Vec<Position>)> {
        let board = &self.position.board;

        board
            .pieces_of(self.position.side_to_move)
            .filter_map(|piece| {
                let moves = legal_moves_for(piece, board);
                (!moves.is_empty()).then_some((*piece, moves))
            })
            .collect()
    }

    /// The legal destinations of the piece on `pos`, or nothing if it is empty.
    ///
    /// Does not care whose turn it is.
    pub fn legal_destinations(&self, pos: Position) -> Vec<Position> {
        self.position
            .board
            .piece_at(pos)
            .map(|piece| legal_moves_for(piece, &self.position.board))
            .unwrap_or_default()
    }

    /// Returns `true` if the game has ended in checkmate or stalemate.
    #[inline(always)]
    pub const fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.position.is_in_check()
    }

    /// The notation of every move made so far, oldest first.
    pub fn move_history(&self) -> Vec<&str> {
        self.position.history.iter().map(Move::notation).collect()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.position.fmt(f)
    }
}
