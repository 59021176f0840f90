//! The chessington chess engine.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::todo)]
#![warn(clippy::option_unwrap_used, clippy::result_unwrap_used)]

use std::fs::File;
use std::path::{Path, PathBuf};
use clap::{App, Arg, SubCommand, crate_version};
use log::info;
use simplelog::{WriteLogger, LevelFilter, Config};
use chessington::chess::{variations, Position, STARTING_FEN};
use chessington::engine::{Engine, SearchLimits, SearchParameters};
use chessington::engine::params::seconds;
use chessington::protocol::Uci;

fn main() -> Result<(), Error> {
    let default_config = dirs::home_dir()
        .map(|home| { home.join(".chessington").join("config.yaml") })
        .unwrap_or_else(|| PathBuf::from("config.yaml"));

    let matches =
        App::new("Chessington")
            .version(crate_version!())
            .author("Mike Leany")
            .about("A bitboard chess engine. Speaks UCI on stdin and stdout unless given a \
                    subcommand.")
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("chessington.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .default_value("info")
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .help("Sets the log level if logging is turned on"))
            .arg(Arg::with_name("config")
                .long("config")
                .short("c")
                .global(true)
                .value_name("CONFIG_FILE")
                .takes_value(true)
                .help("Reads search parameters from a YAML file \
                       (defaults to ~/.chessington/config.yaml if it exists)"))
            .subcommand(SubCommand::with_name("counts")
                .about("Counts the number of variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required(true)
                    .help("Depth to search the position"))
                .arg(Arg::with_name("threads")
                    .long("threads")
                    .short("t")
                    .value_name("THREADS")
                    .takes_value(true)
                    .default_value("1")
                    .help("Number of threads to count with"))
                .arg(Arg::with_name("fen")
                    .value_name("FEN_STRING")
                    .default_value(STARTING_FEN)
                    .hide_default_value(true)
                    .multiple(true)
                    .help("Position to search in Forsyth-Edwards Notation (FEN)")))
            .subcommand(SubCommand::with_name("search")
                .about("Searches a position and prints the best move found")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .help("Maximum depth to search"))
                .arg(Arg::with_name("time")
                    .long("time")
                    .short("t")
                    .value_name("SECONDS")
                    .takes_value(true)
                    .help("Time to search, in seconds"))
                .arg(Arg::with_name("fen")
                    .value_name("FEN_STRING")
                    .default_value(STARTING_FEN)
                    .hide_default_value(true)
                    .help("Position to search in Forsyth-Edwards Notation (FEN)")))
            .get_matches();

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = match matches.value_of("log-level") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(level) => return Err(Error(format!("{}: invalid log level", level))),
        None => unreachable!(),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            Config::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink())
    };

    let params = match matches.value_of_os("config") {
        Some(path) => load_params(&PathBuf::from(path))?,
        None if default_config.is_file() => load_params(&default_config)?,
        None => SearchParameters::default(),
    };

    match matches.subcommand() {
        (_, None) => Uci::new(params).run(),
        ("counts", Some(matches)) => {
            let depth = parse_arg(matches.value_of("depth"), "depth")?;
            let threads = parse_arg(matches.value_of("threads"), "threads")?;

            println!();
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let mut pos: Position = fen.parse()
                    .map_err(|err| {Error(format!("{}: {}", fen, err))})?;
                println!("{}", fen);
                let count = if threads > 1 {
                    variations::count_parallel(&pos, depth, threads)
                } else {
                    variations::print(&mut pos, depth)
                };
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        ("search", Some(matches)) => {
            let fen = matches.value_of("fen").expect("INFALLIBLE");
            let mut pos: Position = fen.parse()
                .map_err(|err| {Error(format!("{}: {}", fen, err))})?;

            let limits = SearchLimits {
                depth: match matches.value_of("depth") {
                    Some(depth) => Some(parse_arg(Some(depth), "depth")?),
                    None => None,
                },
                time: match matches.value_of("time") {
                    Some(time) => Some(seconds(parse_arg(Some(time), "time")?)
                        .ok_or_else(|| Error(format!("{}: invalid search time", time)))?),
                    None => None,
                },
                ..SearchLimits::default()
            };

            let mut engine = Engine::new(params);
            let thinking = engine.search(&mut pos, &limits, |thinking| {
                println!("{}", thinking);
                true
            });

            match thinking.best_move() {
                Some(mv) => println!("best move {} score {}", mv, thinking.score()),
                None => println!("no legal moves, score {}", thinking.score()),
            }
        },
        _ => unreachable!(),
    }

    Ok(())
}

fn load_params(path: &Path) -> Result<SearchParameters, Error> {
    let params = SearchParameters::from_yaml_file(path)
        .map_err(|err| Error(format!("{}: {}", path.display(), err)))?;
    info!("loaded search parameters from {}", path.display());
    Ok(params)
}

fn parse_arg<T: std::str::FromStr>(value: Option<&str>, name: &str) -> Result<T, Error> {
    value.expect("INFALLIBLE")
        .parse()
        .map_err(|_| Error(format!("{} must be numeric", name)))
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }
