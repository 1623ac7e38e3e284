//! A sink that keeps every delivered chunk.
//!
//! Callers that want the rendered text back (rather than forwarding it to a
//! terminal or a socket) hand an [`OutputCollector`] to the emitter and read
//! the chunks afterwards.

use core::ffi::CStr;

use crate::emit::{Rendered, SizedSink, TerminatedSink};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputCollector {
    chunks: Vec<String>,
}

impl OutputCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `bytes`. Invalid UTF-8 is replaced, not rejected.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.chunks.push(String::from_utf8_lossy(bytes).into_owned());
    }

    /// Chunks in delivery order, one per successful emit.
    #[must_use]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Hand over the collected chunks and leave the collector empty.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.chunks)
    }

    /// All chunks joined, in delivery order.
    #[must_use]
    pub fn text(&self) -> String {
        self.chunks.concat()
    }

    /// Non-empty lines across every chunk.
    ///
    /// A chunk may carry several newline-separated records, or only part of
    /// one; lines are split on the joined text so both cases read the same.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.text()
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl TerminatedSink for OutputCollector {
    fn emit(&mut self, text: &CStr) {
        self.push_bytes(text.to_bytes());
    }
}

impl SizedSink for OutputCollector {
    fn emit(&mut self, rendered: Rendered<'_>) {
        self.push_bytes(rendered.as_bytes());
    }
}
