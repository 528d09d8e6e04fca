use std::io::{self, Write};

/// What a compressor is doing to the current page
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Analyzing,
    Rasterizing,
}

impl Stage {
    fn verb(&self) -> &'static str {
        match self {
            Stage::Analyzing => "Analyzing",
            Stage::Rasterizing => "Rasterizing",
        }
    }
}

/// Receives per-page progress. `page` is one-based.
pub trait ProgressSink {
    fn page(&mut self, stage: Stage, page: usize, page_count: usize);

    /// Called once after the last page
    fn finish(&mut self) {}
}

/// Rewrites a single status line on stdout
#[derive(Debug, Default)]
pub struct StatusLine {
    active: bool,
}

impl ProgressSink for StatusLine {
    fn page(&mut self, stage: Stage, page: usize, page_count: usize) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "\r  -> {} page {}/{}...", stage.verb(), page, page_count);
        let _ = out.flush();
        self.active = true;
    }

    fn finish(&mut self) {
        if self.active {
            println!();
            self.active = false;
        }
    }
}

/// Discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressSink for Silent {
    fn page(&mut self, _stage: Stage, _page: usize, _page_count: usize) {}
}

/// Records every update, for tests and callers that want the history
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub updates: Vec<(Stage, usize, usize)>,
    pub finished: bool,
}

impl ProgressSink for Recorder {
    fn page(&mut self, stage: Stage, page: usize, page_count: usize) {
        self.updates.push((stage, page, page_count));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
