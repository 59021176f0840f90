//! Implements the [Universal Chess Interface](http://wbec-ridderkerk.nl/html/UCIProtocol.html)
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::{max, min};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;
use std::num::ParseIntError;
use log::{debug, info, error};
use lazy_static::lazy_static;
use regex::{RegexSet, Regex};
use super::io;
use crate::chess::{self, Color, Move, Position, Tables};
use crate::engine::{Engine, SearchLimits, SearchParameters, Thinking};

const ENGINE_NAME: &str = "Chessington";
const ENGINE_AUTHOR: &str = "Mike Leany";
const MAX_HASH_MB: usize = 4096;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Implementation of the UCI protocol
#[derive(Debug)]
pub struct Uci {
    client: io::Client,
    tables: Arc<Tables>,
    position: Position,
    engine: Engine,
    debug: bool,

    // commands that arrived during a search and still need handling
    pending: VecDeque<String>,
    quitting: bool,
}

impl Uci {
    /// Connects to the client on stdin and stdout.
    pub fn new(params: SearchParameters) -> Self {
        let tables = Arc::new(Tables::new());
        Uci {
            client: io::Client::connect(),
            position: Position::with_tables(Arc::clone(&tables)),
            tables,
            engine: Engine::new(params),
            debug: false,
            pending: VecDeque::new(),
            quitting: false,
        }
    }

    /// Runs until the client sends `quit` or closes its input.
    pub fn run(&mut self) {
        while !self.quitting {
            let line = match self.pending.pop_front() {
                Some(line) => line,
                None => match self.client.recv() {
                    Ok(line) => line,
                    Err(_) => break,
                },
            };

            match line.parse() {
                Ok(cmd) => self.execute(cmd),
                Err(_) => {
                    debug!("unknown command: {}", line);
                    Response::Info(format!("string unknown command: {}", line)).send();
                },
            }
        }
    }

    fn execute(&mut self, cmd: Command) {
        use Command::*;

        match cmd {
            Uci => {
                Response::Id("name", format!("{} {}", ENGINE_NAME, env!("CARGO_PKG_VERSION")))
                    .send();
                Response::Id("author", ENGINE_AUTHOR.to_string()).send();
                Response::OptionInfo(format!("name Hash type spin default {} min 1 max {}",
                    self.engine.params().hash_size_mb, MAX_HASH_MB)).send();
                Response::OptionInfo("name Clear Hash type button".to_string()).send();
                Response::UciOk.send();
            },
            Debug(on) => {
                self.debug = on;
            },
            IsReady => {
                Response::ReadyOk.send();
            },
            SetOption{ name, value } => {
                self.set_option(&name, value.as_ref().map(String::as_str));
            },
            UciNewGame => {
                self.engine.new_game();
                self.position = Position::with_tables(Arc::clone(&self.tables));
            },
            SetPosition{ fen, moves } => {
                match set_up_position(&self.tables, fen.as_ref().map(String::as_str), &moves) {
                    Ok(pos) => self.position = pos,
                    Err(err) => {
                        error!("invalid position: {}", err);
                        Response::Info(format!("string invalid position: {}", err)).send();
                    },
                }
            },
            Go(params) => {
                let limits = params.limits(self.position.turn());
                let (thinking, stopped) = self.think(&limits);

                // in infinite mode, the move is only sent once asked for
                if params.infinite && !stopped {
                    self.wait_for_stop();
                }
                Response::BestMove(thinking.best_move(), thinking.ponder_move()).send();
            },
            Stop => { },
            Quit => {
                self.quitting = true;
            },
            Display => {
                Response::Info(format!("string fen {}", self.position)).send();
                Response::Info(format!("string key {}", self.position.zobrist_key())).send();
            },
        }
    }

    fn set_option(&mut self, name: &str, value: Option<&str>) {
        match (name.to_lowercase().as_str(), value) {
            ("hash", Some(value)) => match value.parse::<usize>() {
                Ok(size) => {
                    let size = min(max(size, 1), MAX_HASH_MB);
                    info!("hash size set to {} MB", size);
                    self.engine.set_hash_size(size);
                },
                Err(err) => {
                    Response::Info(format!("string invalid hash size {}: {}", value, err)).send();
                },
            },
            ("clear hash", _) => self.engine.new_game(),
            _ => {
                Response::Info(format!("string unknown option: {}", name)).send();
            },
        }
    }

    /// Searches the current position, sending thinking output after each iteration and watching
    /// the input for `stop` or `quit`. Also returns whether the search was told to stop.
    fn think(&mut self, limits: &SearchLimits) -> (Thinking, bool) {
        let Uci { client, position, engine, pending, quitting, debug, .. } = self;
        let debug = *debug;
        let mut stopped = false;

        let thinking = engine.search(position, limits, |thinking| {
            Response::Info(thinking.to_string()).send();

            let mut keep_going = true;
            loop {
                match client.try_recv() {
                    Ok(line) => match line.parse() {
                        Ok(Command::Stop) => {
                            stopped = true;
                            keep_going = false;
                        },
                        Ok(Command::Quit) => {
                            *quitting = true;
                            keep_going = false;
                        },
                        Ok(Command::IsReady) => Response::ReadyOk.send(),
                        _ => pending.push_back(line),
                    },
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        *quitting = true;
                        keep_going = false;
                        break;
                    },
                }
            }
            keep_going
        });

        if debug {
            Response::Info(format!("string searched {} nodes in {} ms",
                thinking.nodes(), thinking.time().as_millis())).send();
        }
        (thinking, stopped)
    }

    fn wait_for_stop(&mut self) {
        while !self.quitting {
            match self.client.recv() {
                Ok(line) => match line.parse() {
                    Ok(Command::Stop) => break,
                    Ok(Command::Quit) => self.quitting = true,
                    Ok(Command::IsReady) => Response::ReadyOk.send(),
                    _ => self.pending.push_back(line),
                },
                Err(_) => self.quitting = true,
            }
        }
    }
}

/// Builds the position given by a `position` command: the starting position or `fen`, followed by
/// `moves` in long algebraic notation.
pub fn set_up_position(tables: &Arc<Tables>, fen: Option<&str>, moves: &[String])
    -> chess::Result<Position> {
    let mut pos = match fen {
        Some(fen) => Position::from_fen_with_tables(fen, Arc::clone(tables))?,
        None => Position::with_tables(Arc::clone(tables)),
    };

    for s in moves {
        let mv = pos.parse_move(s)?;
        pos.make_move(mv);
    }

    Ok(pos)
}

/// Calculates how long to search given the time left on the clock, the increment, and optionally
/// the number of moves until the next time control.
pub fn search_time(remaining: Duration, inc: Duration, moves_to_go: Option<u32>) -> Duration {
    let divisor = moves_to_go.map_or(30, |n| min(max(n, 1), 30));

    if remaining > inc * 6 {
        remaining/divisor + inc
    } else {
        remaining/5
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The arguments of a `go` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Search only to this depth
    pub depth: Option<usize>,
    /// Search exactly this long
    pub movetime: Option<Duration>,
    /// Time left on white's clock
    pub wtime: Option<Duration>,
    /// Time left on black's clock
    pub btime: Option<Duration>,
    /// White's increment per move
    pub winc: Option<Duration>,
    /// Black's increment per move
    pub binc: Option<Duration>,
    /// Moves until the next time control
    pub movestogo: Option<u32>,
    /// Search until told to stop
    pub infinite: bool,
}

impl GoParams {
    /// Converts the arguments into limits for a search by `turn`.
    ///
    /// An infinite search ignores the clock and runs until `stop`. Otherwise an exact move time
    /// wins over the clock, and with no limits at all the engine's default budget applies.
    pub fn limits(&self, turn: Color) -> SearchLimits {
        if self.infinite {
            return SearchLimits { depth: self.depth, ..SearchLimits::infinite() };
        }

        let (remaining, inc) = match turn {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };

        let time = match (self.movetime, remaining) {
            (Some(movetime), _) => Some(movetime),
            (None, Some(remaining)) => Some(
                search_time(remaining, inc.unwrap_or_default(), self.movestogo)),
            _ => None,
        };

        SearchLimits { depth: self.depth, time, infinite: false }
    }
}

impl FromStr for GoParams {
    type Err = UciError;

    fn from_str(s: &str) -> Result<Self, UciError> {
        let mut params = GoParams::default();
        let mut tokens = s.split_whitespace();

        fn millis(arg: Option<&str>) -> Result<Option<Duration>, UciError> {
            // clocks can go negative when a client runs late
            let ms: i64 = arg.ok_or(UciError)?.parse()?;
            Ok(Some(Duration::from_millis(max(ms, 0) as u64)))
        }

        while let Some(token) = tokens.next() {
            match token {
                "depth" => params.depth = Some(tokens.next().ok_or(UciError)?.parse()?),
                "movetime" => params.movetime = millis(tokens.next())?,
                "wtime" => params.wtime = millis(tokens.next())?,
                "btime" => params.btime = millis(tokens.next())?,
                "winc" => params.winc = millis(tokens.next())?,
                "binc" => params.binc = millis(tokens.next())?,
                "movestogo" => params.movestogo = Some(tokens.next().ok_or(UciError)?.parse()?),
                "infinite" => params.infinite = true,
                _ => debug!("ignoring go argument: {}", token),
            }
        }

        Ok(params)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Commands which can be sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tells the engine to use UCI.
    ///
    /// ```text
    /// uci
    /// ```
    Uci,

    /// Turns debug output on or off.
    ///
    /// ```text
    /// debug [ on | off ]
    /// ```
    Debug(bool),

    /// Asks the engine to respond with `readyok` once it's ready for more input.
    ///
    /// ```text
    /// isready
    /// ```
    IsReady,

    /// Sets an engine option.
    ///
    /// ```text
    /// setoption name <id> [value <x>]
    /// ```
    SetOption{
        /// The option's name, which may contain spaces
        name: String,
        /// The new value, absent for buttons
        value: Option<String>,
    },

    /// Tells the engine that the next search will be from a different game.
    ///
    /// ```text
    /// ucinewgame
    /// ```
    UciNewGame,

    /// Sets up the position to search.
    ///
    /// ```text
    /// position [fen <fenstring> | startpos ] [moves <move1> ... <movei>]
    /// ```
    SetPosition{
        /// The starting FEN, or `None` for the standard starting position
        fen: Option<String>,
        /// Moves played from the starting position
        moves: Vec<String>,
    },

    /// Starts searching the current position.
    ///
    /// ```text
    /// go [depth <n>] [movetime <ms>] [wtime <ms>] [btime <ms>] [winc <ms>] [binc <ms>]
    ///    [movestogo <n>] [infinite]
    /// ```
    Go(GoParams),

    /// Tells the engine to stop searching and send its move.
    ///
    /// ```text
    /// stop
    /// ```
    Stop,

    /// Tells the engine to exit.
    ///
    /// ```text
    /// quit
    /// ```
    Quit,

    /// Shows the current position. Not part of UCI itself.
    ///
    /// ```text
    /// d
    /// ```
    Display,
}

impl FromStr for Command {
    type Err = UciError;

    fn from_str(s: &str) -> Result<Self, UciError> {
        use Command::*;

        if let Some(ind) = COMMAND_SET.matches(s).iter().next() {
            let args = COMMAND_VEC[ind].captures(s).expect("INFALLIBLE");
            let arg = |n: usize| args.get(n).map(|m| m.as_str().to_string());

            match ind {
                0 => Ok(Uci),
                1 => Ok(Debug(arg(1).map_or(true, |on| on == "on"))),
                2 => Ok(IsReady),
                3 => Ok(SetOption{ name: arg(1).expect("INFALLIBLE"), value: arg(2) }),
                4 => Ok(UciNewGame),
                5 => Ok(SetPosition{
                    fen: arg(1),
                    moves: arg(2).map_or_else(Vec::new,
                        |moves| moves.split_whitespace().map(str::to_string).collect()),
                }),
                6 => Ok(Go(arg(1).unwrap_or_default().parse()?)),
                7 => Ok(Stop),
                8 => Ok(Quit),
                9 => Ok(Display),
                _ => unreachable!(),
            }
        } else {
            Err(UciError)
        }
    }
}

const COMMANDS: [&str; 10] = [
    r"^uci\s*$",
    r"^debug(?:\s+(on|off))?\s*$",
    r"^isready\b",
    r"^setoption\s+name\s+(.+?)(?:\s+value\s+(.*?))?\s*$",
    r"^ucinewgame\b",
    r"^position\s+(?:startpos|fen\s+(.+?))(?:\s+moves\s+(.*?))?\s*$",
    r"^go\b(.*)$",
    r"^stop\b",
    r"^quit\b",
    r"^d\s*$",
];

lazy_static! {
    static ref COMMAND_SET: RegexSet = RegexSet::new(&COMMANDS).expect("INFALLIBLE");
    static ref COMMAND_VEC: Vec<Regex> = {
        let mut cmd_vec = Vec::new();
        for cmd in &COMMANDS {
            cmd_vec.push(Regex::new(cmd).expect("INFALLIBLE"));
        }
        cmd_vec
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Responses from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Identifies the engine.
    ///
    /// ```text
    /// id name <name>
    /// id author <author>
    /// ```
    Id(&'static str, String),

    /// Describes an option the engine supports.
    ///
    /// ```text
    /// option name <id> type <t> ...
    /// ```
    OptionInfo(String),

    /// Sent once the engine has identified itself and listed its options.
    ///
    /// ```text
    /// uciok
    /// ```
    UciOk,

    /// Response to `isready`.
    ///
    /// ```text
    /// readyok
    /// ```
    ReadyOk,

    /// Tells the client which move the engine has chosen, and optionally which reply it expects.
    /// With no move at all, `0000` is sent.
    ///
    /// ```text
    /// bestmove <move> [ponder <move>]
    /// ```
    BestMove(Option<Move>, Option<Move>),

    /// Search information, or a free-form `string`.
    ///
    /// ```text
    /// info <info>
    /// ```
    Info(String),
}

impl Response {
    /// Sends the response to the client
    pub fn send(&self) {
        io::Client::send(&self.to_string());
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Response::*;

        match self {
            Id(field, value) => write!(f, "id {} {}", field, value),
            OptionInfo(desc) => write!(f, "option {}", desc),
            UciOk => "uciok".fmt(f),
            ReadyOk => "readyok".fmt(f),
            BestMove(None, _) => "bestmove 0000".fmt(f),
            BestMove(Some(mv), None) => write!(f, "bestmove {}", mv),
            BestMove(Some(mv), Some(ponder)) => write!(f, "bestmove {} ponder {}", mv, ponder),
            Info(info) => write!(f, "info {}", info),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error parsing a command
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UciError;

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "invalid UCI command".fmt(f)
    }
}

impl std::error::Error for UciError { }

impl From<ParseIntError> for UciError {
    fn from(_: ParseIntError) -> UciError {
        UciError
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ***************************************** UNIT TESTS ***************************************** //
////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod test {
    use super::*;
    use crate::chess::{Piece, Square};

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_command() {
        use Command::*;

        assert_eq!(Ok(Uci), "uci".parse());
        assert_eq!(Ok(IsReady), "isready".parse());
        assert_eq!(Ok(Debug(true)), "debug on".parse());
        assert_eq!(Ok(Debug(false)), "debug off".parse());
        assert_eq!(Ok(UciNewGame), "ucinewgame".parse());
        assert_eq!(Ok(Stop), "stop".parse());
        assert_eq!(Ok(Quit), "quit".parse());
        assert_eq!(Ok(Display), "d".parse());
        assert_eq!(Ok(SetOption{ name: "Hash".to_string(), value: Some("128".to_string()) }),
            "setoption name Hash value 128".parse());
        assert_eq!(Ok(SetOption{ name: "Clear Hash".to_string(), value: None }),
            "setoption name Clear Hash".parse());
        assert_eq!(Err::<Command, _>(UciError), "dance".parse());
        assert_eq!(Err::<Command, _>(UciError), "go depth deep".parse());
    }

    #[test]
    fn parse_position() {
        use Command::*;

        assert_eq!(Ok(SetPosition{ fen: None, moves: Vec::new() }), "position startpos".parse());
        assert_eq!(Ok(SetPosition{ fen: None, moves: strings(&["e2e4", "e7e5"]) }),
            "position startpos moves e2e4 e7e5".parse());
        assert_eq!(Ok(SetPosition{
                fen: Some("4k3/8/8/8/8/8/8/4K2R w K - 0 1".to_string()),
                moves: strings(&["e1g1"]),
            }),
            "position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1g1".parse());
        assert_eq!(Ok(SetPosition{
                fen: Some("4k3/8/8/8/8/8/8/4K2R w K - 0 1".to_string()),
                moves: Vec::new(),
            }),
            "position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1".parse());
    }

    #[test]
    fn parse_go() {
        assert_eq!(Ok(Command::Go(GoParams::default())), "go".parse());
        assert_eq!(Ok(Command::Go(GoParams{ depth: Some(6), ..GoParams::default() })),
            "go depth 6".parse());
        assert_eq!(Ok(Command::Go(GoParams{
                wtime: Some(Duration::from_secs(60)),
                btime: Some(Duration::from_millis(59_500)),
                winc: Some(Duration::from_secs(1)),
                binc: Some(Duration::from_secs(1)),
                movestogo: Some(20),
                ..GoParams::default()
            })),
            "go wtime 60000 btime 59500 winc 1000 binc 1000 movestogo 20".parse());
        assert_eq!(Ok(Command::Go(GoParams{ infinite: true, ..GoParams::default() })),
            "go infinite".parse());
        assert_eq!(Ok(Command::Go(GoParams{ btime: Some(Duration::from_secs(0)),
                ..GoParams::default() })),
            "go btime -20".parse());
    }

    #[test]
    fn go_limits() {
        let go: GoParams = "wtime 60000 btime 3000 winc 1000 binc 1000".parse().expect("valid");
        assert_eq!(go.limits(Color::White), SearchLimits::time(Duration::from_secs(3)));
        assert_eq!(go.limits(Color::Black), SearchLimits::time(Duration::from_millis(600)));

        let go: GoParams = "movetime 250 wtime 60000".parse().expect("valid");
        assert_eq!(go.limits(Color::White).time, Some(Duration::from_millis(250)));

        let go: GoParams = "infinite".parse().expect("valid");
        assert_eq!(go.limits(Color::White), SearchLimits::infinite());
        assert_eq!(go.limits(Color::White).budget(Duration::from_millis(100)), None);

        let go: GoParams = "infinite wtime 60000 movetime 250".parse().expect("valid");
        assert_eq!(go.limits(Color::White), SearchLimits::infinite());

        let go: GoParams = "infinite depth 7".parse().expect("valid");
        let limits = go.limits(Color::Black);
        assert_eq!((limits.depth, limits.time, limits.infinite), (Some(7), None, true));

        let go: GoParams = "".parse().expect("valid");
        assert_eq!(go.limits(Color::White).budget(Duration::from_millis(100)),
            Some(Duration::from_millis(100)));

        let go: GoParams = "depth 4".parse().expect("valid");
        assert_eq!(go.limits(Color::Black), SearchLimits::depth(4));
    }

    #[test]
    fn time_management() {
        let secs = Duration::from_secs;
        assert_eq!(search_time(secs(300), secs(0), None), secs(10));
        assert_eq!(search_time(secs(300), secs(2), None), secs(12));
        assert_eq!(search_time(secs(10), secs(2), None), secs(2));
        assert_eq!(search_time(secs(100), secs(0), Some(10)), secs(10));
        assert_eq!(search_time(secs(100), secs(0), Some(0)), secs(100));
    }

    #[test]
    fn position_with_moves() {
        let tables = Arc::new(Tables::new());
        let pos = set_up_position(&tables, None, &strings(&["e2e4", "e7e5", "g1f3"]))
            .expect("legal moves");
        assert_eq!(pos.to_fen_str(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");

        let pos = set_up_position(&tables, Some("4k3/8/8/8/8/8/8/4K2R w K - 0 1"),
            &strings(&["e1h1"])).expect("legal moves");
        assert_eq!(pos.piece_at(Square::F1), Some((Color::White, Piece::Rook)));

        assert!(set_up_position(&tables, None, &strings(&["e2e5"])).is_err());
        assert!(set_up_position(&tables, Some("not a fen"), &[]).is_err());
    }

    #[test]
    fn format_response() {
        use Response::*;

        let mv = Move::new(Square::G1, Square::F3, Piece::Knight, None);
        let reply = Move::new(Square::G8, Square::F6, Piece::Knight, None);

        assert_eq!(Id("author", "Mike Leany".to_string()).to_string(), "id author Mike Leany");
        assert_eq!(UciOk.to_string(), "uciok");
        assert_eq!(ReadyOk.to_string(), "readyok");
        assert_eq!(BestMove(Some(mv), None).to_string(), "bestmove g1f3");
        assert_eq!(BestMove(Some(mv), Some(reply)).to_string(), "bestmove g1f3 ponder g8f6");
        assert_eq!(BestMove(None, None).to_string(), "bestmove 0000");
        assert_eq!(Info("string hello".to_string()).to_string(), "info string hello");
    }
}
