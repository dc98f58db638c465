/**
 * Parsify, a simple recursive descent parser generator.
 * Copyright (C) 2024  Eduardo Ibarra
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;
use std::process::ExitCode;

use burs_core::reducer::Reducer;
use clap::Parser;
use log::info;

mod demo_lang;
mod grammar_text;

/// Builds a BURS production table from a tiny s-expression grammar file,
/// generates its states, and (if the grammar embeds a demo tree) reduces it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the s-expression grammar description
    grammar: String,

    /// Nonterminal to reduce the embedded demo tree to, if any
    #[arg(short, long)]
    goal: Option<String>,

    /// Write the hierarchical table dump to this path
    #[arg(short, long)]
    dump: Option<PathBuf>,

    /// Raise the log level to debug
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli_args = Args::parse();

    let default_level = if cli_args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let src = match std::fs::read_to_string(&cli_args.grammar) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("could not read grammar file {}: {e}", cli_args.grammar);
            return ExitCode::FAILURE;
        }
    };

    let parsed = match grammar_text::interpret(&src) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut table = parsed.table;
    if let Err(e) = table.generate_states() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    table.report_tie_breaks();
    info!("generated {} states", table.state_count());

    if let Some(path) = &cli_args.dump {
        if let Err(e) = std::fs::write(path, table.dump()) {
            eprintln!("could not write dump to {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    if let Some(tree) = &parsed.tree {
        let reducer = Reducer::new(&table);
        reducer.label(tree);

        if let Some(goal) = &cli_args.goal {
            match reducer.reduce(&mut (), tree, goal) {
                Ok(result) => println!("{result}"),
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
