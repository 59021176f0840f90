//! Checks move generation against the perft counts of an EPD file, or counts the variations of
//! positions given on the command line.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fs::File;
use std::io::BufReader;
use std::io::prelude::*;
use std::process::exit;
use std::time::Instant;
use clap::{Arg, App, crate_version};
use chessington::chess::{variations, Position, STARTING_FEN};

/// One line of an EPD perft suite: a position and the expected count at each listed depth
#[derive(Debug)]
struct EpdLine {
    fen: String,
    expected: Vec<(usize, usize)>,
}

impl EpdLine {
    /// Parses `FEN ;D1 20 ;D2 400 ...`
    fn parse(line: &str) -> Result<Option<EpdLine>, String> {
        let mut fields = line.split(';');
        let fen = match fields.next().map(str::trim) {
            Some(fen) if !fen.is_empty() => fen.to_string(),
            _ => return Ok(None),
        };

        let mut expected = Vec::new();
        for field in fields {
            let nums: Vec<&str> = field.trim().trim_start_matches('D').split_whitespace().collect();
            if nums.len() != 2 {
                return Err(format!("\"{}\": expected a depth and a count", field));
            }
            let depth = nums[0].parse().map_err(|err| format!("\"{}\": {}", nums[0], err))?;
            let count = nums[1].parse().map_err(|err| format!("\"{}\": {}", nums[1], err))?;
            expected.push((depth, count));
        }

        Ok(Some(EpdLine { fen, expected }))
    }

    fn check(&self, threads: usize) -> Result<(), String> {
        let pos: Position = self.fen.parse().map_err(|err| format!("{}", err))?;

        for &(depth, expected) in &self.expected {
            let start = Instant::now();
            let count = variations::count_parallel(&pos, depth, threads);
            println!("Depth {}:\t{:12}\t{:12}\t{:.3}s",
                depth, expected, count, start.elapsed().as_secs_f64());
            if count != expected {
                return Err(format!("depth {}: expected {} but counted {}", depth, expected, count));
            }
        }

        Ok(())
    }
}

fn check_epd(file: &str, threads: usize) -> Result<(), String> {
    let epd = BufReader::new(File::open(file).map_err(|err| format!("{}: {}", file, err))?);

    for (line_num, line) in epd.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.map_err(|err| format!("{}: line {}: {}", file, line_num, err))?;
        let epd_line = EpdLine::parse(&line)
            .map_err(|err| format!("{}: line {}: {}", file, line_num, err))?;

        if let Some(epd_line) = epd_line {
            println!("\nLine {:3}:\t{}", line_num, epd_line.fen);
            epd_line.check(threads).map_err(|err| format!("{}: line {}: {}", file, line_num, err))?;
        }
    }

    Ok(())
}

fn main() {
    let matches =
        App::new("chessington count")
            .version(crate_version!())
            .author("Mike Leany")
            .about("Counts the number of variations from a given starting position \
                    to a specified\ndepth. Defaults to the standard starting position.")
            .arg(Arg::with_name("file")
                .short("f")
                .value_name("EPD_FILE")
                .takes_value(true)
                .conflicts_with("depth")
                .conflicts_with("fen")
                .help("An EPD file of positions and expected counts to check"))
            .arg(Arg::with_name("fen")
                .value_name("FEN_STRING")
                .default_value(STARTING_FEN)
                .hide_default_value(true)
                .multiple(true)
                .help("Position to search in Forsyth-Edwards Notation (FEN)"))
            .arg(Arg::with_name("depth")
                .long("depth")
                .short("d")
                .value_name("DEPTH")
                .takes_value(true)
                .required_unless("file")
                .help("Depth to search the position"))
            .arg(Arg::with_name("threads")
                .long("threads")
                .short("t")
                .value_name("THREADS")
                .takes_value(true)
                .default_value("1")
                .help("Number of threads to count with"))
            .get_matches();

    let threads = match matches.value_of("threads").expect("INFALLIBLE").parse() {
        Ok(threads) => threads,
        Err(_) => {
            eprintln!("error: threads must be numeric");
            exit(2);
        },
    };

    if let Some(file) = matches.value_of("file") {
        if let Err(error) = check_epd(file, threads) {
            eprintln!("{}", error);
            exit(1);
        }
        return;
    }

    let depth = match matches.value_of("depth").expect("INFALLIBLE").parse() {
        Ok(depth) => depth,
        Err(_) => {
            eprintln!("error: depth must be numeric");
            exit(2);
        },
    };

    for fen in matches.values_of("fen").expect("INFALLIBLE") {
        match fen.parse::<Position>() {
            Ok(mut pos) => {
                println!("\n{}", fen);
                let count = if threads > 1 {
                    variations::count_parallel(&pos, depth, threads)
                } else {
                    variations::print(&mut pos, depth)
                };
                println!("Depth {} total:\t{:12}", depth, count);
            },
            Err(error) => {
                eprintln!("error: {}: {}", fen, error);
                exit(1);
            },
        }
    }
}
