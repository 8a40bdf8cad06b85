/*!
 * Batch processing of CCN columns
 *
 * Canonicalizes and decodes many CCNs at once, typically one column of a CSV
 * extract, with optional parallelism and progress reporting. Results can be
 * summarized with [`BatchStatistics`] and exported as JSON, JSON Lines or CSV.
 */

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{global_config, CcnConfig};
use crate::decode::{Ccn, DecodedFields};
use crate::infer::CcnType;
use crate::{CcnError, OutputFormat, Result};

/// Number of skipped records that are logged individually
const MAX_LOGGED_SKIPS: usize = 10;

/// Outcome of processing a single input value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// 1-based line (CSV) or position (in-memory input) of the value
    pub line: usize,
    /// Raw input as read
    pub input: String,
    /// Decoded fields, if the input was a valid CCN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedFields>,
    /// Error kind (see [`CcnError::kind`]) for invalid input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Error message for invalid input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchRecord {
    pub fn is_valid(&self) -> bool {
        self.decoded.is_some()
    }
}

/// Flat row layout for CSV export
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    line: usize,
    input: &'a str,
    ccn: Option<&'a str>,
    ccn_type: Option<&'static str>,
    region_code: Option<&'a str>,
    region_name: Option<&'a str>,
    category_code: Option<&'a str>,
    category_description: Option<&'a str>,
    parent_category_code: Option<&'a str>,
    parent_category_description: Option<&'a str>,
    sequence_number: Option<u64>,
    error_kind: Option<&'a str>,
    error: Option<&'a str>,
}

impl<'a> From<&'a BatchRecord> for CsvRow<'a> {
    fn from(record: &'a BatchRecord) -> Self {
        let d = record.decoded.as_ref();
        CsvRow {
            line: record.line,
            input: &record.input,
            ccn: d.map(|d| d.code.as_str()),
            ccn_type: d.map(|d| d.kind.name()),
            region_code: d.map(|d| d.region_code.as_str()),
            region_name: d.map(|d| d.region_name.as_str()),
            category_code: d.map(|d| d.category_code.as_str()),
            category_description: d.map(|d| d.category_description.as_str()),
            parent_category_code: d.and_then(|d| d.parent_category_code.as_deref()),
            parent_category_description: d.and_then(|d| d.parent_category_description.as_deref()),
            sequence_number: d.map(|d| d.sequence_number),
            error_kind: record.error_kind.as_deref(),
            error: record.error.as_deref(),
        }
    }
}

/// Summary of a processed batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub processed_at: DateTime<Utc>,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    /// Blank values, which are not treated as CCNs
    pub blank_records: usize,
    /// Valid CCNs whose state or facility code is missing from the lookup tables
    pub unrecognized_records: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_region: BTreeMap<String, usize>,
    pub errors_by_kind: BTreeMap<String, usize>,
}

impl BatchStatistics {
    /// Print summary statistics
    pub fn print_summary(&self) {
        println!("=== CCN Batch Statistics ===");
        println!("Processed At: {}", self.processed_at.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("Total Records: {}", self.total_records);
        println!("  Valid CCNs: {}", self.valid_records);
        println!("  Invalid CCNs: {}", self.invalid_records);
        println!("  Blank Values: {}", self.blank_records);
        println!("Unrecognized State/Facility Codes: {}", self.unrecognized_records);

        if !self.by_type.is_empty() {
            println!("By Type:");
            for (kind, count) in &self.by_type {
                println!("  {}: {}", kind, count);
            }
        }

        if !self.errors_by_kind.is_empty() {
            println!("Errors:");
            for (kind, count) in &self.errors_by_kind {
                println!("  {}: {}", kind, count);
            }
        }

        let mut regions: Vec<_> = self.by_region.iter().collect();
        regions.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if !regions.is_empty() {
            println!("Top States:");
            for (region, count) in regions.into_iter().take(10) {
                println!("  {}: {}", region, count);
            }
        }

        let processed = self.valid_records + self.invalid_records;
        if processed > 0 {
            let valid_percent = (self.valid_records as f64 / processed as f64) * 100.0;
            println!("Valid Percentage: {:.1}%", valid_percent);
        }
    }
}

/// Results of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    pub processed_at: DateTime<Utc>,
    pub records: Vec<BatchRecord>,
    pub blank_records: usize,
}

impl BatchResults {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that decoded successfully
    pub fn valid(&self) -> impl Iterator<Item = &BatchRecord> {
        self.records.iter().filter(|r| r.is_valid())
    }

    /// Records that failed canonicalization or type inference
    pub fn invalid(&self) -> impl Iterator<Item = &BatchRecord> {
        self.records.iter().filter(|r| !r.is_valid())
    }

    /// Compute summary statistics
    pub fn statistics(&self) -> BatchStatistics {
        let mut stats = BatchStatistics {
            processed_at: self.processed_at,
            total_records: self.records.len() + self.blank_records,
            valid_records: 0,
            invalid_records: 0,
            blank_records: self.blank_records,
            unrecognized_records: 0,
            by_type: BTreeMap::new(),
            by_region: BTreeMap::new(),
            errors_by_kind: BTreeMap::new(),
        };

        for record in &self.records {
            match (&record.decoded, &record.error_kind) {
                (Some(decoded), _) => {
                    stats.valid_records += 1;
                    *stats.by_type.entry(decoded.kind.name().to_string()).or_insert(0) += 1;
                    *stats.by_region.entry(decoded.region_name.clone()).or_insert(0) += 1;
                    if !decoded.is_fully_recognized() {
                        stats.unrecognized_records += 1;
                    }
                }
                (None, kind) => {
                    stats.invalid_records += 1;
                    let kind = kind.clone().unwrap_or_else(|| "unknown".to_string());
                    *stats.errors_by_kind.entry(kind).or_insert(0) += 1;
                }
            }
        }

        stats
    }

    /// Export records to a file
    pub fn export<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        match format {
            OutputFormat::Json => self.write_json(&mut writer)?,
            OutputFormat::JsonLines => self.write_json_lines(&mut writer)?,
            OutputFormat::Csv => self.write_csv(&mut writer)?,
        }
        writer.flush()?;
        info!(path = %path.as_ref().display(), %format, records = self.records.len(), "Exported batch results");
        Ok(())
    }

    /// Write records as a pretty-printed JSON array
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.records)?;
        Ok(())
    }

    /// Write one JSON record per line
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<()> {
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Write records as flat CSV rows
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(CsvRow::from(record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Canonicalizes and decodes many CCNs
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Type to parse every value as; inferred per value when `None`
    expected_type: Option<CcnType>,
    skip_invalid_records: bool,
    show_progress: bool,
    parallel_threads: Option<usize>,
    batch_size: usize,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchProcessor {
    /// Create a processor using the global configuration
    pub fn new() -> Self {
        Self::with_config(&global_config())
    }

    /// Create a processor from an explicit configuration
    pub fn with_config(config: &CcnConfig) -> Self {
        Self {
            expected_type: None,
            skip_invalid_records: config.skip_invalid_records,
            show_progress: config.enable_progress_bar,
            parallel_threads: config.parallel_threads,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Parse every value as this type instead of inferring it
    pub fn expected_type(mut self, kind: Option<CcnType>) -> Self {
        self.expected_type = kind;
        self
    }

    /// Record invalid values instead of failing on the first one
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.skip_invalid_records = skip;
        self
    }

    /// Show progress bar
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set number of worker threads (None = use all available)
    pub fn parallel_threads(mut self, threads: Option<usize>) -> Self {
        self.parallel_threads = threads;
        self
    }

    /// Set number of values handed to the workers at a time
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    fn parse_one(&self, input: &str) -> Result<DecodedFields> {
        let ccn = match self.expected_type {
            Some(kind) => Ccn::parse_as(kind, input)?,
            None => Ccn::parse(input)?,
        };
        Ok(ccn.decode())
    }

    /// Process in-memory values; positions are numbered from 1
    pub fn process<I, S>(&self, inputs: I) -> Result<BatchResults>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = inputs
            .into_iter()
            .enumerate()
            .map(|(i, s)| (i + 1, s.as_ref().to_string()))
            .collect();
        self.process_numbered(values)
    }

    /// Process one column of a CSV file with a header row
    pub fn process_csv<P: AsRef<Path>>(&self, path: P, column: &str) -> Result<BatchResults> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CcnError::Io {
                message: format!("File not found: {}", path.display()),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string()),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let index = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column))
            .ok_or_else(|| CcnError::missing_column(column, &headers))?;
        debug!(path = %path.display(), column, index, "Reading CCN column");

        let mut values = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            // header is line 1
            let line = record.position().map(|p| p.line() as usize).unwrap_or(row + 2);
            values.push((line, record.get(index).unwrap_or("").to_string()));
        }

        self.process_numbered(values)
    }

    fn process_numbered(&self, values: Vec<(usize, String)>) -> Result<BatchResults> {
        let start = Instant::now();
        let processed_at = Utc::now();

        let (blank, values): (Vec<_>, Vec<_>) = values.into_iter().partition(|(_, v)| v.trim().is_empty());
        let blank_records = blank.len();
        if blank_records > 0 {
            debug!(blank_records, "Skipping blank values");
        }

        #[cfg(feature = "progress")]
        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(values.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} CCNs ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let pool = match self.parallel_threads {
            Some(threads) if cfg!(feature = "parallel") => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| CcnError::Configuration {
                        message: format!("Failed to build thread pool: {}", e),
                        suggestion: Some("Use a smaller parallel_threads value".to_string()),
                    })?,
            ),
            _ => None,
        };

        let mut records = Vec::with_capacity(values.len());
        let mut skipped = 0usize;

        for chunk in values.chunks(self.batch_size) {
            let parsed = match &pool {
                Some(pool) => pool.install(|| self.parse_chunk(chunk)),
                None => self.parse_chunk(chunk),
            };

            for ((line, input), result) in chunk.iter().zip(parsed) {
                match result {
                    Ok(decoded) => records.push(BatchRecord {
                        line: *line,
                        input: input.clone(),
                        decoded: Some(decoded),
                        error_kind: None,
                        error: None,
                    }),
                    Err(e) if self.skip_invalid_records => {
                        skipped += 1;
                        if skipped <= MAX_LOGGED_SKIPS {
                            warn!(line, input = %input, error = %e, "Skipping invalid CCN");
                        }
                        records.push(BatchRecord {
                            line: *line,
                            input: input.clone(),
                            decoded: None,
                            error_kind: Some(e.kind().to_string()),
                            error: Some(e.to_string()),
                        });
                    }
                    Err(e) => {
                        warn!(line, input = %input, error = %e, "Invalid CCN");
                        return Err(e);
                    }
                }
            }

            #[cfg(feature = "progress")]
            {
                if let Some(ref pb) = progress_bar {
                    pb.inc(chunk.len() as u64);
                }
            }
        }

        #[cfg(feature = "progress")]
        {
            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }
        }

        if skipped > MAX_LOGGED_SKIPS {
            warn!(skipped, "Skipped invalid CCNs (only the first {} were logged)", MAX_LOGGED_SKIPS);
        }
        info!(
            records = records.len(),
            skipped,
            blank_records,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Processed CCN batch"
        );

        Ok(BatchResults { processed_at, records, blank_records })
    }

    fn parse_chunk(&self, chunk: &[(usize, String)]) -> Vec<Result<DecodedFields>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            chunk.par_iter().map(|(_, input)| self.parse_one(input)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            chunk.iter().map(|(_, input)| self.parse_one(input)).collect()
        }
    }
}
