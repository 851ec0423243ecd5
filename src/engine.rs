/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread::{self, JoinHandle},
    time::Instant,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::{debug, info};

use crate::{
    perft, splitperft, Ai, Color, Difficulty, EngineCommand, Evaluator, Game, GamePosition,
    Position, Search, SearchConfig, SearchResult, MAX_DEPTH,
};

/// The interactive Xiangqi engine.
#[derive(Debug)]
pub struct Engine {
    /// The live game, as known to the engine.
    ///
    /// Only the engine loop touches it, so every mutation happens in the order commands were received.
    game: Game,

    /// The computer opponent, holding the current difficulty.
    ai: Ai,

    /// The side the AI plays on its own after each human move, if any.
    auto_play: Option<Color>,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Handle to the background search thread started by `go`, if one exists.
    search_thread: Option<JoinHandle<SearchResult>>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            game: Game::new(),
            ai: Ai::default(),
            auto_play: None,
            sender,
            receiver,
            search_thread: None,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The live game.
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Replaces the live game with one starting from `position`.
    pub fn set_position(&mut self, position: GamePosition) {
        self.game.reset_game(position);
    }

    /// Changes how deeply the AI searches.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.ai.set_difficulty(difficulty);
    }

    /// Lets the AI play `side` on its own, or stops it from playing if `None`.
    pub fn set_auto_play(&mut self, side: Option<Color>) {
        self.auto_play = side;
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if its corresponding receiver doesn't exist,
        //  and the engine owns that receiver for as long as it exists.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err}");
            }
        });

        // The AI may be on move from the start
        self.auto_play_if_needed()?;

        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, EngineCommand::Exit) {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e:#}");
            }
        }

        Ok(())
    }

    /// Handle the execution of a single [`EngineCommand`].
    fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Clear => self.game.clear_selection(),

            EngineCommand::Difficulty { level } => match level {
                Some(level) => self.set_difficulty(level),
                None => println!("depth {}", self.ai.config().max_depth),
            },

            EngineCommand::Display => println!("{}", self.game),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => self.send_command(EngineCommand::Exit),

            EngineCommand::Fen => println!("{}", self.game.position().to_fen()),

            EngineCommand::Go { depth } => {
                let mut config = self.ai.config();
                if let Some(depth) = depth {
                    config.max_depth = depth.min(MAX_DEPTH);
                }
                self.start_search(config)?;
            }

            EngineCommand::History => self.history(),

            EngineCommand::Move { squares } => {
                self.game.make_move_str(&squares.concat())?;
                self.auto_play_if_needed()?;
            }

            EngineCommand::Moves { square } => self.moves(square),

            EngineCommand::NewGame => self.game.new_game(),

            EngineCommand::Perft { depth } => self.perft::<false>(depth),

            EngineCommand::Position { fen } => self.position(&fen.join(" "))?,

            EngineCommand::Select { square } => {
                if !self.game.select_piece(square) {
                    bail!(
                        "Cannot select {square}: no {} piece there",
                        self.game.position().side_to_move()
                    );
                }
                self.moves(Some(square));
            }

            EngineCommand::Splitperft { depth } => self.perft::<true>(depth),

            EngineCommand::Status => self.status(),

            EngineCommand::Undo => {
                if !self.game.undo_last_move() {
                    bail!("No moves to undo");
                }
            }

            EngineCommand::Wait { play } => self.wait(play)?,
        }

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::from_position(self.game.position());
        if pretty {
            print!("{evaluator}\n\nScore: ");
        }

        println!("{}", evaluator.eval());
    }

    /// Executes the `history` command, printing one move per line.
    fn history(&self) {
        let history = self.game.move_history();
        if history.is_empty() {
            println!("(none)");
        }

        for (i, notation) in history.into_iter().enumerate() {
            println!("{:>3}. {notation}", i + 1);
        }
    }

    /// Executes the `moves` command, printing the destinations of the piece on `square`,
    /// or of every piece of the side to move.
    fn moves(&self, square: Option<Position>) {
        let moves = match square {
            Some(square) => {
                let dests = self.game.legal_destinations(square);
                match self.game.position().board().piece_at(square) {
                    Some(piece) if !dests.is_empty() => vec![(*piece, dests)],
                    _ => Vec::new(),
                }
            }
            None => self.game.get_all_valid_moves(),
        };

        if moves.is_empty() {
            println!("(none)");
        }

        for (piece, dests) in moves {
            let dests = dests
                .into_iter()
                .map(|pos| pos.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("{}{}: {dests}", piece.kind().symbol(), piece.position());
        }
    }

    /// Executes the `perft` and `splitperft` commands on the live position.
    fn perft<const SPLIT: bool>(&self, depth: usize) {
        let position = self.game.position();
        let now = Instant::now();

        let nodes = if SPLIT {
            splitperft(position.board(), position.side_to_move(), depth)
        } else {
            perft(position.board(), position.side_to_move(), depth)
        };

        let elapsed = now.elapsed();
        let nps = (nodes as f64 / elapsed.as_secs_f64()) as u64;
        println!(
            "\n{nodes} nodes in {}ms ({nps} nps)",
            elapsed.as_millis()
        );
    }

    /// Set the position to the supplied FEN string, or the standard starting layout if it is empty.
    fn position(&mut self, fen: &str) -> Result<()> {
        let position = if fen.is_empty() {
            GamePosition::new()
        } else {
            fen.parse()?
        };

        self.set_position(position);
        self.auto_play_if_needed()
    }

    /// Executes the `status` command.
    fn status(&self) {
        let position = self.game.position();
        println!("status {}", position.status());
        println!("side {}", position.side_to_move());
        if let Some(winner) = position.winner() {
            println!("winner {winner}");
        }
    }

    /// Starts a search of a snapshot of the live position on a background thread.
    ///
    /// The result is printed as soon as the search concludes, and can be collected with `wait`.
    fn start_search(&mut self, config: SearchConfig) -> Result<()> {
        if self
            .search_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            bail!("A search is already running");
        }

        let position = self.game.snapshot();
        let handle = thread::spawn(move || {
            let res = Search::new(&position, config).start();
            println!("{res}");
            res
        });

        self.search_thread = Some(handle);
        Ok(())
    }

    /// Awaits the current search thread, blocking until it finishes and returning its result.
    fn stop_search(&mut self) -> Result<SearchResult> {
        let handle = self
            .search_thread
            .take()
            .context("No search has been started")?;

        let id = handle.thread().id();
        handle
            .join()
            .map_err(|_| anyhow!("Failed to join on search thread {id:?}"))
    }

    /// Executes the `wait` command, optionally playing the move that the search found.
    fn wait(&mut self, play: bool) -> Result<()> {
        let res = self.stop_search()?;
        if !play {
            return Ok(());
        }

        let Some(mv) = res.bestmove else {
            bail!("Search found no move to play");
        };

        // The live position may have moved on since the search began
        if !self.game.make_move(mv.from(), mv.to()) {
            bail!("{mv} is no longer legal in the current position");
        }
        println!("played {mv}");

        self.auto_play_if_needed()
    }

    /// Lets the AI move if it plays the side to move, and the game is not over.
    fn auto_play_if_needed(&mut self) -> Result<()> {
        let side = self.game.position().side_to_move();
        if self.auto_play != Some(side) || self.game.is_game_over() {
            return Ok(());
        }

        debug!("AI to move for {side}");
        let res = self.ai.search(self.game.position());
        let Some(mv) = res.bestmove.clone() else {
            bail!("AI found no move for {side}");
        };

        if !self.game.make_move(mv.from(), mv.to()) {
            bail!("AI chose illegal move {mv}");
        }

        info!("AI played {mv} for {side}");
        println!("{res}");

        if self.game.is_game_over() {
            println!("status {}", self.game.position().status());
        }

        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing engine commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}
