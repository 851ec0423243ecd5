/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use xiangqi::{Cli, Engine, GamePosition};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut engine = Engine::new();
    engine.set_difficulty(cli.difficulty);
    engine.set_auto_play(cli.ai);
    if let Some(fen) = cli.fen {
        engine.set_position(GamePosition::from_fen(&fen)?);
    }

    println!("{}", engine.name());

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }

    Ok(())
}
