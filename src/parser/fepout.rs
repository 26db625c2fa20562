//! Streaming parser for fepout logs.
//!
//! The fepout format is an external, line-oriented protocol the crate does not own:
//! three recognised line prefixes with numeric fields at fixed whitespace-delimited
//! token positions, interleaved with arbitrary comment and blank lines. The parser
//! is a small explicit state machine over those markers:
//!
//! * `#NEW` opens a window and carries the two lambda endpoints (tokens 6 and 8),
//! * `FepEnergy:` contributes one work sample to the open window (token 6),
//! * `#Free` closes the open window and carries the free-energy estimate the
//!   simulation itself transcribed for that window (token 11).
//!
//! Marker-sequence violations never abort the stream: each violation is yielded as
//! a [`FepBarError::MalformedWindow`] item, the state machine resynchronises on the
//! next `#NEW` marker, and parsing continues. A window still open at end of stream
//! is likewise reported as malformed and discarded.

use crate::error::FepBarError;
use crate::math::constants::DEFAULT_MAX_WINDOWS;
use crate::types::{label_decimals, Window};
use std::io::BufRead;

const NEW_WINDOW_MARKER: &str = "#NEW";
const WORK_SAMPLE_MARKER: &str = "FepEnergy:";
const WINDOW_COMPLETE_MARKER: &str = "#Free";

const LAMBDA1_FIELD: usize = 6;
const LAMBDA2_FIELD: usize = 8;
const WORK_FIELD: usize = 6;
const ESTIMATE_FIELD: usize = 11;

enum ParserState {
    AwaitingNewWindow,
    AccumulatingSamples {
        lambda1: f64,
        lambda2: f64,
        samples: Vec<f64>,
        opened_at: usize,
    },
}

/// A lazy parser over one fepout stream, yielding completed [`Window`]s and
/// per-window diagnostics in input order.
///
/// The iterator item is `Result<Window, FepBarError>`: `Ok` for each completed
/// window, `Err` for each malformed region. Restartable only by re-reading the
/// source; the stream is consumed in a single pass.
pub struct FepoutParser<R> {
    reader: R,
    buf: String,
    state: ParserState,
    line: usize,
    decimals: usize,
}

impl<R: BufRead> FepoutParser<R> {
    /// Wraps a buffered reader over fepout text.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            state: ParserState::AwaitingNewWindow,
            line: 0,
            decimals: label_decimals(DEFAULT_MAX_WINDOWS),
        }
    }

    /// Sets the window-count ceiling used to pick the label precision.
    pub fn with_max_windows(mut self, max_windows: usize) -> Self {
        self.decimals = label_decimals(max_windows);
        self
    }

    /// Runs the parser to completion, splitting the stream into completed windows
    /// and collected diagnostics.
    ///
    /// Only I/O failures abort the pass; every parse-level problem lands in
    /// `diagnostics` and the remaining windows are still returned.
    pub fn collect_windows(self) -> Result<ParsedStream, FepBarError> {
        let mut windows = Vec::new();
        let mut diagnostics = Vec::new();
        for item in self {
            match item {
                Ok(window) => windows.push(window),
                Err(err @ FepBarError::Io(_)) => return Err(err),
                Err(err) => diagnostics.push(err),
            }
        }
        Ok(ParsedStream {
            windows,
            diagnostics,
        })
    }

    fn numeric_field(tokens: &[&str], index: usize, line: usize) -> Result<f64, FepBarError> {
        tokens
            .get(index)
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or_else(|| FepBarError::MalformedWindow {
                line,
                reason: format!("expected a numeric value at field {index}"),
            })
    }

    fn open_window(&mut self, tokens: &[&str]) -> Option<Result<Window, FepBarError>> {
        let was_open = matches!(self.state, ParserState::AccumulatingSamples { .. });
        self.state = ParserState::AwaitingNewWindow;

        let lambda1 = match Self::numeric_field(tokens, LAMBDA1_FIELD, self.line) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let lambda2 = match Self::numeric_field(tokens, LAMBDA2_FIELD, self.line) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if lambda1 == lambda2 {
            return Some(Err(FepBarError::InvalidWindow { lambda: lambda1 }));
        }

        self.state = ParserState::AccumulatingSamples {
            lambda1,
            lambda2,
            samples: Vec::new(),
            opened_at: self.line,
        };

        if was_open {
            // The previous window is discarded; the new one is already open.
            return Some(Err(FepBarError::MalformedWindow {
                line: self.line,
                reason: "new window opened before the previous window completed".to_string(),
            }));
        }
        None
    }

    fn record_sample(&mut self, tokens: &[&str]) -> Option<Result<Window, FepBarError>> {
        match &mut self.state {
            ParserState::AccumulatingSamples { samples, .. } => {
                match Self::numeric_field(tokens, WORK_FIELD, self.line) {
                    Ok(work) => {
                        samples.push(work);
                        None
                    }
                    Err(e) => Some(Err(e)),
                }
            }
            ParserState::AwaitingNewWindow => Some(Err(FepBarError::MalformedWindow {
                line: self.line,
                reason: "work sample outside any window".to_string(),
            })),
        }
    }

    fn complete_window(&mut self, tokens: &[&str]) -> Option<Result<Window, FepBarError>> {
        match std::mem::replace(&mut self.state, ParserState::AwaitingNewWindow) {
            ParserState::AccumulatingSamples {
                lambda1,
                lambda2,
                samples,
                ..
            } => {
                let estimate = match Self::numeric_field(tokens, ESTIMATE_FIELD, self.line) {
                    Ok(v) => v,
                    Err(e) => return Some(Err(e)),
                };
                match Window::with_label_decimals(lambda1, lambda2, samples, self.decimals) {
                    Ok(window) => Some(Ok(window.with_transcribed_estimate(estimate))),
                    Err(FepBarError::EmptySampleSet) => Some(Err(FepBarError::MalformedWindow {
                        line: self.line,
                        reason: "window completed without any work samples".to_string(),
                    })),
                    Err(e) => Some(Err(e)),
                }
            }
            ParserState::AwaitingNewWindow => Some(Err(FepBarError::MalformedWindow {
                line: self.line,
                reason: "window-complete marker without an open window".to_string(),
            })),
        }
    }
}

impl<R: BufRead> Iterator for FepoutParser<R> {
    type Item = Result<Window, FepBarError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let read = match self.reader.read_line(&mut self.buf) {
                Ok(n) => n,
                Err(e) => return Some(Err(FepBarError::Io(e))),
            };

            if read == 0 {
                // End of stream: an open window never saw its completion marker.
                if let ParserState::AccumulatingSamples { opened_at, .. } =
                    std::mem::replace(&mut self.state, ParserState::AwaitingNewWindow)
                {
                    return Some(Err(FepBarError::MalformedWindow {
                        line: opened_at,
                        reason: "stream ended before the window completed".to_string(),
                    }));
                }
                return None;
            }

            self.line += 1;
            let line = self.buf.clone();
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            let emitted = if trimmed.starts_with(NEW_WINDOW_MARKER) {
                self.open_window(&tokens)
            } else if trimmed.starts_with(WORK_SAMPLE_MARKER) {
                self.record_sample(&tokens)
            } else if trimmed.starts_with(WINDOW_COMPLETE_MARKER) {
                self.complete_window(&tokens)
            } else {
                // Comments and unrecognised lines are ignored.
                None
            };

            if let Some(item) = emitted {
                return Some(item);
            }
        }
    }
}

/// Windows and diagnostics from one complete pass over a fepout stream.
#[derive(Debug)]
pub struct ParsedStream {
    /// Completed windows in input order.
    pub windows: Vec<Window>,
    /// Per-window parse failures, in input order. Never fatal to the pass.
    pub diagnostics: Vec<FepBarError>,
}

impl ParsedStream {
    /// Assigns one simulation temperature to every parsed window.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.windows = self
            .windows
            .into_iter()
            .map(|w| w.with_temperature(temperature))
            .collect();
        self
    }
}
