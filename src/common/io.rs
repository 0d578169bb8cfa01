//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::bufread::MultiGzDecoder;

/// Leading bytes of a gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open an input file, decompressing it if its content is gzip.
///
/// The content decides, not the file name.  BGZF files are multi-member gzip
/// files and are read through [`MultiGzDecoder`].
pub fn open_input<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())
        .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path.as_ref(), e))?;
    let mut reader = BufReader::new(file);
    if reader.fill_buf()?.starts_with(&GZIP_MAGIC) {
        tracing::trace!("reading {:?} as gzip", path.as_ref());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        tracing::trace!("reading {:?} as plain text", path.as_ref());
        Ok(Box::new(reader))
    }
}

/// Open a file for writing with buffering.
pub fn open_write<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    tracing::trace!("Opening {:?} for writing", path.as_ref());
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Whether the file is tab-separated, judging from its name (`.tsv`, `.tsv.gz`, `.txt`).
pub fn is_tab_separated<P: AsRef<Path>>(path: P) -> bool {
    let name = path
        .as_ref()
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(name.as_str());
    name.ends_with(".tsv") || name.ends_with(".txt")
}

/// Construct a CSV reader with headers for a comma- or tab-separated file.
///
/// Records may have varying lengths, missing trailing cells are treated as empty.
pub fn open_csv<P>(path: P) -> Result<csv::Reader<Box<dyn BufRead>>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let delimiter = if is_tab_separated(&path) { b'\t' } else { b',' };
    let reader = open_input(&path)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader))
}
