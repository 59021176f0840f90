//! Line-based input and output with the UCI client.
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::io::{stdin, BufRead};
use std::thread;
use std::sync::mpsc::*;
use log::{info, error};

/// The engine's end of a UCI conversation.
///
/// Commands arrive on a background thread reading stdin, so a running search can poll for `stop`
/// between iterations without blocking. Replies go to stdout. Every line either way is logged at
/// `info`.
#[derive(Debug)]
pub struct Client(Receiver<String>);

impl Client {
    /// Starts reading commands from stdin.
    pub fn connect() -> Self {
        let (sender, receiver) = channel();
        thread::spawn(move || {
            let stdin = stdin();
            forward_lines(stdin.lock(), &sender);
        });

        Client(receiver)
    }

    /// Waits for the next command. Fails once stdin is closed and every command has been taken.
    pub fn recv(&self) -> Result<String, RecvError> {
        self.0.recv()
    }

    /// Takes the next command if one has already arrived.
    pub fn try_recv(&self) -> Result<String, TryRecvError> {
        self.0.try_recv()
    }

    /// Writes one reply line.
    pub fn send(s: &str) {
        println!("{}", s);
        info!("<engine>: {}", s);
    }
}

/// Sends each non-blank line of `input`, trimmed, to `sender`. Returns the number of lines sent
/// once the input ends, fails, or nobody is listening any more.
fn forward_lines<R: BufRead>(mut input: R, sender: &Sender<String>) -> usize {
    let mut sent = 0;

    loop {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                info!("<client>: end of input");
                return sent;
            },
            Ok(_) => { },
            Err(err) => {
                error!("io error: {}", err);
                return sent;
            },
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        info!("<client>: {}", line);
        if sender.send(line.to_string()).is_err() {
            return sent;
        }
        sent += 1;
    }
}
