use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rand::RngCore;
use tracing::debug;

use crate::error::Result;
use crate::payload::PayloadGenerator;
use crate::session::FlushInterval;
use crate::types::{FlushMeasurement, WriteSessionResult};

/// Drives one sequential write of `total_length` bytes, fsyncing at every
/// interval boundary and timing each fsync.
///
/// The file is opened once in append mode and the handle is held until the
/// session is consumed or dropped. Truncating a leftover file is the
/// caller's job.
///
/// Two layers of buffering:
///   BufWriter.flush()  → Rust buffer → OS page cache
///   file.sync_all()    → OS page cache → physical disk
///
/// Only the second step is timed.
pub struct WriteSession {
    writer: BufWriter<File>,
    interval: FlushInterval,
    total_length: u64,
    written: u64,
    measurements: Vec<FlushMeasurement>,
    chunk_lengths: Vec<u64>,
    hasher: crc32fast::Hasher,
    started: Instant,
}

impl WriteSession {
    /// Open `path` for appending and start the session clock.
    pub fn open(path: &Path, total_length: u64, interval: FlushInterval) -> Result<Self> {
        let started = Instant::now();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(WriteSession {
            writer: BufWriter::new(file),
            interval,
            total_length,
            written: 0,
            measurements: Vec::new(),
            chunk_lengths: Vec::new(),
            hasher: crc32fast::Hasher::new(),
            started,
        })
    }

    /// Write the next chunk. Fsyncs if the chunk completes an interval or the
    /// whole write, and returns that flush's measurement.
    ///
    /// Returns `Ok(None)` without writing once the session is complete.
    pub fn write_chunk<R: RngCore>(
        &mut self,
        payload: &mut PayloadGenerator<R>,
    ) -> Result<Option<FlushMeasurement>> {
        if self.is_complete() {
            return Ok(None);
        }

        let chunk_size = self.interval.bytes().min(self.total_length - self.written);
        let data = payload.generate(chunk_size as usize);

        self.writer.write_all(&data)?;
        self.hasher.update(&data);
        self.written += chunk_size;
        self.chunk_lengths.push(chunk_size);

        // The short tail never lands on a multiple, so the total check covers it
        if self.interval.is_boundary(self.written) || self.written == self.total_length {
            return self.sync().map(Some);
        }
        Ok(None)
    }

    /// Force everything written so far to disk and record how long it took.
    pub fn sync(&mut self) -> Result<FlushMeasurement> {
        self.writer.flush()?;

        let start = Instant::now();
        self.writer.get_ref().sync_all()?;
        let measurement = FlushMeasurement {
            duration: start.elapsed(),
            durable_offset: self.written,
        };

        debug!(
            offset = measurement.durable_offset,
            micros = measurement.duration.as_micros() as u64,
            "fsync"
        );
        self.measurements.push(measurement);
        Ok(measurement)
    }

    /// Write chunks until `total_length` bytes are on disk, then return the
    /// collected measurements.
    pub fn run<R: RngCore>(
        mut self,
        payload: &mut PayloadGenerator<R>,
    ) -> Result<WriteSessionResult> {
        while !self.is_complete() {
            self.write_chunk(payload)?;
        }
        Ok(self.finish())
    }

    /// Stop the clock and hand back the result. The file handle is released here.
    pub fn finish(self) -> WriteSessionResult {
        WriteSessionResult {
            total_duration: self.started.elapsed(),
            flush_measurements: self.measurements,
            chunk_lengths: self.chunk_lengths,
            bytes_written: self.written,
            checksum: self.hasher.finalize(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.written >= self.total_length
    }

    /// Bytes handed to the file so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn interval(&self) -> FlushInterval {
        self.interval
    }
}
