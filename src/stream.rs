//! Line-by-line extraction from an alignment stream to BED output.

use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use noodles::bgzf;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::alignment::AlignmentParser;
use crate::format::AlignmentFormat;
use crate::read::{Parsed, Rendering};

/// Configuration for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Interval written for each mapped read
    pub rendering: Rendering,
    /// Lines starting with any of these are headers or comments
    pub comment_prefixes: Vec<char>,
    /// Format assumed before the first line; detected when `None`
    pub initial_format: Option<AlignmentFormat>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            rendering: Rendering::FirstBase,
            comment_prefixes: vec!['@', '#'],
            initial_format: None,
        }
    }
}

impl ExtractConfig {
    pub fn with_rendering(mut self, rendering: Rendering) -> Self {
        self.rendering = rendering;
        self
    }

    pub fn with_initial_format(mut self, format: AlignmentFormat) -> Self {
        self.initial_format = Some(format);
        self
    }

    fn is_comment(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|c| self.comment_prefixes.contains(&c))
    }
}

/// Line counts for one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub lines: usize,
    pub headers: usize,
    pub blank: usize,
    pub unmapped: usize,
    pub written: usize,
}

/// Write one BED line per mapped read in `input` to `output`.
///
/// Header/comment and blank lines are skipped, as are unmapped SAM records.
/// Any other failure stops the stream; the error carries the line number and
/// the underlying [`ReadError`](crate::error::ReadError) can be recovered with
/// `downcast_ref`.
pub fn extract_five_prime_bases<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &ExtractConfig,
) -> Result<StreamSummary> {
    let mut parser = match config.initial_format {
        Some(format) => AlignmentParser::with_format(format),
        None => AlignmentParser::new(),
    };
    let mut summary = StreamSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read input line {}", index + 1))?;
        summary.lines += 1;

        if line.trim().is_empty() {
            summary.blank += 1;
            continue;
        }
        if config.is_comment(&line) {
            summary.headers += 1;
            continue;
        }

        match parser
            .parse_line(&line)
            .with_context(|| format!("Failed to parse alignment on line {}", index + 1))?
        {
            Parsed::Mapped(read) => {
                writeln!(output, "{}", read.render(config.rendering))?;
                summary.written += 1;
            }
            Parsed::Unmapped { name } => {
                log::debug!("Skipping unmapped read {name}");
                summary.unmapped += 1;
            }
        }
    }

    output.flush()?;

    log::info!(
        "Processed {} lines: {} reads written, {} unmapped, {} header/comment, {} blank",
        summary.lines,
        summary.written,
        summary.unmapped,
        summary.headers,
        summary.blank
    );

    Ok(summary)
}

/// Open an alignment file for line reading.
///
/// `.gz` files are read with a multi-member gzip decoder and `.bgz` files with
/// a BGZF reader; anything else is read as plain text.
pub fn open_alignment_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Could not open alignment file: {}", path.display()))?;

    let extension = path.extension().and_then(|ext| ext.to_str());
    match extension {
        Some("gz") => Ok(Box::new(BufReader::new(MultiGzDecoder::new(file)))),
        Some("bgz") => Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Create an output file, refusing to overwrite one that already exists
pub fn create_new_output<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => {
            log::info!(
                "Confirmed that output file {} does not already exist",
                path.display()
            );
            Ok(BufWriter::new(file))
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => bail!(
            "Output file {} already exists! Please choose a different filename or delete the existing file",
            path.display()
        ),
        Err(e) => Err(e).with_context(|| format!("Could not create output file: {}", path.display())),
    }
}

/// Extract from an alignment file into a new BED file
pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &ExtractConfig,
) -> Result<StreamSummary> {
    let reader = open_alignment_input(&input)?;
    let mut writer = create_new_output(&output)?;
    log::info!(
        "Extracting {} from {} into {}",
        match config.rendering {
            Rendering::FirstBase => "5'-most bases",
            Rendering::FullSpan => "alignment spans",
        },
        input.as_ref().display(),
        output.as_ref().display()
    );
    extract_five_prime_bases(reader, &mut writer, config)
}
