use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{Level, debug, span};

use crate::analyzer::Analyzer;
use crate::error::{Error, Result};
use crate::extractor::classify;

/// Counters from one pass over a log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: usize,
    /// Lines that produced an event
    pub events: usize,
}

/// Feeds every line of `reader` through the extractor into `analyzer`, then
/// finishes it.
///
/// Lines are decoded lossily, so logs written in a single-byte encoding still
/// parse; only the player names are affected.
pub fn ingest_reader<R: BufRead, A: Analyzer>(
    mut reader: R,
    analyzer: &mut A,
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| Error::Read {
                line: stats.lines,
                source,
            })?;
        if read == 0 {
            break;
        }
        stats.lines += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(event) = classify(line) {
            stats.events += 1;
            analyzer.process(&event);
        }
    }

    analyzer.finish();
    debug!("read {} lines, {} events", stats.lines, stats.events);

    Ok(stats)
}

/// Opens the log at `path` and ingests it. The file is closed before returning.
pub fn ingest_file<A: Analyzer>(path: &Path, analyzer: &mut A) -> Result<IngestStats> {
    let span = span!(Level::DEBUG, "ingest", path = %path.display());
    let _enter = span.enter();

    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    ingest_reader(BufReader::new(file), analyzer)
}
