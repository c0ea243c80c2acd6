//! Serves recorded exchanges back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Exchange, Transcript};

/// Hands out exchanges per port/call pair, each pair in recorded order.
#[derive(Debug, Default)]
pub struct TranscriptReplayer {
    queues: HashMap<(String, String), VecDeque<Exchange>>,
}

impl TranscriptReplayer {
    /// Indexes a transcript for replay.
    #[must_use]
    pub fn new(transcript: &Transcript) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Exchange>> = HashMap::new();
        for exchange in &transcript.exchanges {
            queues
                .entry((exchange.port.clone(), exchange.call.clone()))
                .or_default()
                .push_back(exchange.clone());
        }
        Self { queues }
    }

    /// The next unconsumed exchange for `port`/`call`.
    ///
    /// # Errors
    ///
    /// Returns a description of the exhausted pair when nothing is left.
    pub fn next(&mut self, port: &str, call: &str) -> Result<Exchange, String> {
        self.queues
            .get_mut(&(port.to_string(), call.to_string()))
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| format!("transcript has no more {port}::{call} exchanges"))
    }
}
