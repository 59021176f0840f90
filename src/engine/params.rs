//! Tunable search parameters, loaded from YAML
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::fs::read_to_string;
use std::io;
use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The parameters that control a search.
///
/// Any field missing from a configuration file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    /// Size of the transposition table in megabytes
    pub hash_size_mb: usize,
    /// The extra depth a different position needs to evict a table entry
    pub replace_depth: i8,
    /// The extra age, in searches, a different position needs to evict a table entry
    pub replace_age: u8,
    /// Whether the transposition table is used at all
    pub use_hash: bool,

    /// The default time budget in seconds, used when no clock is given
    pub min_search_time: f64,
    /// The first depth of iterative deepening
    pub starting_depth: i8,
    /// The last depth of iterative deepening
    pub max_depth: i8,

    /// Whether leaves are resolved with a quiescence search
    pub use_quiescence: bool,
    /// Whether quiet checking moves are tried on the first quiescence ply
    pub quiescence_checks: bool,
    /// How many plies the quiescence search may go before it stops
    pub max_quiescence_depth: i8,
    /// Whether hopeless captures are skipped in the quiescence search
    pub use_delta: bool,
    /// Margin for delta pruning, in centipawns
    pub delta_margin: i16,

    pub use_null_move: bool,
    pub null_move_reduction: i8,
    pub use_killers: bool,

    /// Half-width of the aspiration window in centipawns; 0 disables it
    pub aspiration_window: i16,
    /// The first depth searched with an aspiration window
    pub aspiration_min_depth: i8,
}

impl Default for SearchParameters {
    fn default() -> Self {
        SearchParameters {
            hash_size_mb: 16,
            replace_depth: 1,
            replace_age: 7,
            use_hash: true,

            min_search_time: 0.1,
            starting_depth: 1,
            max_depth: 50,

            use_quiescence: true,
            quiescence_checks: true,
            max_quiescence_depth: 16,
            use_delta: true,
            delta_margin: 200,

            use_null_move: true,
            null_move_reduction: 2,
            use_killers: true,

            aspiration_window: 50,
            aspiration_min_depth: 4,
        }
    }
}

impl SearchParameters {
    /// Parses parameters from a YAML document
    pub fn from_yaml_str(s: &str) -> Result<SearchParameters, ConfigError> {
        let params: SearchParameters = serde_yaml::from_str(s)?;
        if seconds(params.min_search_time).is_none() {
            return Err(ConfigError::Invalid(
                format!("min_search_time: {} is not a usable number of seconds",
                    params.min_search_time)));
        }
        Ok(params)
    }

    /// Reads parameters from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<SearchParameters, ConfigError> {
        SearchParameters::from_yaml_str(&read_to_string(path)?)
    }

    /// Writes the parameters as a YAML document
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The default time budget. An unusable `min_search_time` gives no time at all.
    pub fn default_time(&self) -> Duration {
        seconds(self.min_search_time).unwrap_or_default()
    }
}

/// Converts a number of seconds to a `Duration`, or `None` if it is negative, not finite, or too
/// large to represent.
pub fn seconds(secs: f64) -> Option<Duration> {
    const MAX_SECONDS: f64 = 1e12;

    if secs.is_finite() && secs >= 0.0 && secs < MAX_SECONDS {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An error reading the configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read configuration: {}", err),
            ConfigError::Yaml(err) => write!(f, "invalid configuration: {}", err),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Yaml(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod params_tests {
    use super::*;

    #[test]
    fn partial_documents_keep_defaults() {
        let params = SearchParameters::from_yaml_str("hash_size_mb: 64\nuse_null_move: false\n")
            .expect("valid yaml");
        assert_eq!(params.hash_size_mb, 64);
        assert!(!params.use_null_move);
        assert_eq!(params.replace_age, 7);
        assert_eq!(params.delta_margin, 200);
        assert_eq!(params.max_depth, 50);
    }

    #[test]
    fn yaml_round_trip() {
        let mut params = SearchParameters::default();
        params.aspiration_window = 0;
        params.min_search_time = 2.5;

        let s = params.to_yaml_string().expect("serializable");
        assert_eq!(SearchParameters::from_yaml_str(&s).expect("valid yaml"), params);
        assert_eq!(params.default_time(), Duration::from_millis(2_500));
    }

    #[test]
    fn bad_input_is_reported() {
        match SearchParameters::from_yaml_str("hash_size_mb: lots") {
            Err(ConfigError::Yaml(_)) => { },
            other => panic!("unexpected result: {:?}", other),
        }
        match SearchParameters::from_yaml_file("/nonexistent/chessington.yaml") {
            Err(ConfigError::Io(_)) => { },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unusable_search_times_are_rejected() {
        for doc in &["min_search_time: -1", "min_search_time: .inf", "min_search_time: .nan",
                     "min_search_time: 1e300"] {
            match SearchParameters::from_yaml_str(doc) {
                Err(ConfigError::Invalid(_)) => { },
                other => panic!("{}: unexpected result: {:?}", doc, other),
            }
        }

        let params = SearchParameters { min_search_time: std::f64::INFINITY, ..Default::default() };
        assert_eq!(params.default_time(), Duration::default());

        assert_eq!(seconds(0.25), Some(Duration::from_millis(250)));
        assert_eq!(seconds(-0.5), None);
        assert_eq!(seconds(std::f64::NAN), None);
    }
}
