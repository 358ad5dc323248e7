//! The sort pipeline: spill with keys, external sort, reload and emit.
//!
//! ```text
//! Idle -> Spilling -> Sorting -> Reloading -> Cleanup -> Done
//!            \__________\___________\___________\______> Failed
//! ```
//!
//! Each spilled line is `<key> * <payload>\n`. The key never contains `*`
//! or `\n` and the payload never contains `\n`, so the first ` * ` of a
//! sorted line always splits it correctly.
//!
//! Two runs that target the same output path share scratch file names and
//! must not overlap.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use recsort_core::config::SortConfig;
use recsort_core::schema::Schema;
use recsort_core::stream::RecordSink;
use recsort_core::types::Record;
use recsort_io::buf::bounded_from_path;
use recsort_io::{Compression, Driver, RecordReader, RecordWriter};

use crate::codec;
use crate::error::{Error, Result, StreamError};
use crate::external::SortUtility;
use crate::key::KeyEncoder;
use crate::temp::ScratchFiles;

/// Separates the key from the payload on an intermediate line.
pub const LINE_SEPARATOR: &[u8] = b" * ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Spilling,
    Sorting,
    Reloading,
    Cleanup,
    Done,
    Failed,
}

/// Counters and timings of one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortReport {
    pub records: u64,
    pub spilled_bytes: u64,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,

    pub spill_ms: u64,
    pub sort_ms: u64,
    pub reload_ms: u64,
}

/// One external sort run. A pipeline is single-use: after `run` it is
/// either `Done` or `Failed`.
pub struct SortPipeline {
    config: SortConfig,
    encoder: KeyEncoder,
    utility: SortUtility,
    phase: Phase,
}

impl SortPipeline {
    /// Build a pipeline, locating the sort utility first. Nothing is created
    /// on disk if the utility cannot be found.
    pub fn new(config: SortConfig) -> Result<Self> {
        let utility = SortUtility::from_config(&config)?;
        Ok(Self::with_utility(config, utility))
    }

    pub fn with_utility(config: SortConfig, utility: SortUtility) -> Self {
        Self {
            encoder: KeyEncoder::new(config.columns.clone()),
            config,
            utility,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Sort `input` and append every record, in key order, to the sink that
    /// `open_sink` creates. The sink is only opened once the external sort
    /// has succeeded. Scratch files live next to `target`.
    pub fn run<I, E, S, F>(&mut self, input: I, target: &Path, open_sink: F) -> Result<SortReport>
    where
        I: IntoIterator<Item = std::result::Result<Record, E>>,
        E: Into<StreamError>,
        S: RecordSink,
        F: FnOnce() -> std::result::Result<S, S::Error>,
    {
        if self.phase != Phase::Idle {
            return Err(Error::Invariant(format!(
                "pipeline already used (phase {:?})",
                self.phase
            )));
        }

        let scratch = ScratchFiles::for_target(target);
        let mut report = SortReport {
            started_ms: now_ms(),
            ..SortReport::default()
        };

        match self.execute(input, &scratch, open_sink, &mut report) {
            Ok(()) => {}
            Err(e) => {
                self.transition(Phase::Failed);
                scratch.abandon();
                return Err(e);
            }
        }

        self.transition(Phase::Cleanup);
        if let Err(e) = scratch.release() {
            self.transition(Phase::Failed);
            return Err(e);
        }
        self.transition(Phase::Done);

        report.finished_ms = now_ms();
        tracing::info!(
            records = report.records,
            spilled_bytes = report.spilled_bytes,
            spill_ms = report.spill_ms,
            sort_ms = report.sort_ms,
            reload_ms = report.reload_ms,
            target = %target.display(),
            "sort complete"
        );
        Ok(report)
    }

    fn execute<I, E, S, F>(
        &mut self,
        input: I,
        scratch: &ScratchFiles,
        open_sink: F,
        report: &mut SortReport,
    ) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<Record, E>>,
        E: Into<StreamError>,
        S: RecordSink,
        F: FnOnce() -> std::result::Result<S, S::Error>,
    {
        self.transition(Phase::Spilling);
        let t = Instant::now();
        self.spill(input, scratch.spill(), report)?;
        report.spill_ms = elapsed_ms(t);

        self.transition(Phase::Sorting);
        let t = Instant::now();
        self.utility.run(scratch.spill(), scratch.sorted())?;
        report.sort_ms = elapsed_ms(t);

        self.transition(Phase::Reloading);
        let t = Instant::now();
        let reloaded = self.reload(scratch.sorted(), open_sink)?;
        report.reload_ms = elapsed_ms(t);

        if reloaded != report.records {
            return Err(Error::Invariant(format!(
                "spilled {} records but reloaded {}",
                report.records, reloaded
            )));
        }
        Ok(())
    }

    fn spill<I, E>(&self, input: I, path: &Path, report: &mut SortReport) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<Record, E>>,
        E: Into<StreamError>,
    {
        let file = File::create(path).map_err(|e| Error::io("creating", path, e))?;
        let mut out = BufWriter::with_capacity(self.config.io_buffer_bytes.max(1), file);
        let mut line = Vec::new();

        for item in input {
            let record = item.map_err(|e| Error::Input(e.into()))?;
            let n = report.records + 1;

            line.clear();
            self.encoder
                .key_into(&record, &mut line)
                .map_err(|source| Error::Key { record: n, source })?;
            line.extend_from_slice(LINE_SEPARATOR);
            let payload =
                codec::encode(&record).map_err(|source| Error::Encode { record: n, source })?;
            line.extend_from_slice(&payload);
            line.push(b'\n');

            out.write_all(&line)
                .map_err(|e| Error::io("writing", path, e))?;
            report.records = n;
            report.spilled_bytes += line.len() as u64;
        }

        out.flush().map_err(|e| Error::io("flushing", path, e))?;
        tracing::debug!(records = report.records, bytes = report.spilled_bytes, "spill written");
        Ok(())
    }

    fn reload<S, F>(&self, path: &Path, open_sink: F) -> Result<u64>
    where
        S: RecordSink,
        F: FnOnce() -> std::result::Result<S, S::Error>,
    {
        let mut reader = bounded_from_path(path, self.config.io_buffer_bytes.max(1))
            .map_err(|e| Error::io("opening", path, e))?;
        let mut sink = open_sink().map_err(|e| Error::Output(e.into()))?;

        let mut line = Vec::new();
        let mut count = 0u64;
        while reader
            .next_line(&mut line)
            .map_err(|e| Error::io("reading", path, e))?
        {
            let n = reader.lines_read();
            let at = find(&line, LINE_SEPARATOR).ok_or(Error::MalformedLine { line: n })?;
            let record = codec::decode(&line[at + LINE_SEPARATOR.len()..])
                .map_err(|source| Error::Decode { line: n, source })?;
            sink.append(&record).map_err(|e| Error::Output(e.into()))?;
            count += 1;
        }

        sink.finish().map_err(|e| Error::Output(e.into()))?;
        Ok(count)
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase, to = ?next, "sort phase");
        self.phase = next;
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A record stream on disk. Unset driver or compression follow the path's
/// extensions.
#[derive(Debug, Clone)]
pub struct StreamSpec {
    pub path: PathBuf,
    pub driver: Option<Driver>,
    pub compression: Option<Compression>,
}

impl StreamSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            driver: None,
            compression: None,
        }
    }

    pub fn with_driver(mut self, driver: Option<Driver>) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_compression(mut self, compression: Option<Compression>) -> Self {
        self.compression = compression;
        self
    }
}

/// Sort the records of `input` into `output`.
///
/// The sort utility and both stream formats are checked before anything is
/// written; the output file is only created after the external sort
/// succeeds.
pub fn sort_file(
    config: SortConfig,
    input: &StreamSpec,
    output: &StreamSpec,
    schema: Schema,
) -> Result<SortReport> {
    let mut pipeline = SortPipeline::new(config)?;
    let (out_driver, out_compression) =
        recsort_io::stream::resolve(&output.path, output.driver, output.compression)?;
    let reader = RecordReader::open(&input.path, input.driver, input.compression, schema)?;

    let out_path = output.path.clone();
    pipeline.run(reader, &output.path, move || {
        RecordWriter::create(&out_path, Some(out_driver), Some(out_compression))
    })
}
