use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use indexmap::IndexMap;

use super::error::{BindError, Result};

/// Opens a file, `.gz` aware, or stdin for `"stdin"`.
///
/// ```
/// use std::io::BufRead;
/// let reader = tfbind::reader("tests/tfbind/seqs.fa").unwrap();
/// assert_eq!(reader.lines().count(), 6);
/// ```
pub fn reader(input: &str) -> Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

pub fn writer(output: &str) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        Box::new(BufWriter::new(std::fs::File::create(output)?))
    };

    Ok(writer)
}

pub fn read_to_string(input: &str) -> Result<String> {
    let mut content = String::new();
    reader(input)?.read_to_string(&mut content)?;
    Ok(content)
}

/// Name to uppercased sequence, in file order. A repeated name keeps its
/// first position and its last sequence. Records with non-ASCII bytes are
/// rejected.
///
/// ```
/// let seqs = tfbind::read_fasta("tests/tfbind/seqs.fa").unwrap();
/// assert_eq!(seqs.keys().collect::<Vec<_>>(), vec!["ref", "del", "ins"]);
/// assert_eq!(seqs["ref"], "ACGTACGTAC");
/// ```
pub fn read_fasta(input: &str) -> Result<IndexMap<String, String>> {
    let mut fa_in = noodles_fasta::io::Reader::new(reader(input)?);

    let mut seqs = IndexMap::new();
    for result in fa_in.records() {
        let record = result?;
        let name = String::from_utf8_lossy(record.name()).into_owned();
        let seq = String::from_utf8_lossy(record.sequence().as_ref()).to_ascii_uppercase();
        if !seq.is_ascii() {
            return Err(BindError::MalformedSequence(name));
        }
        seqs.insert(name, seq);
    }

    Ok(seqs)
}

/// Single-line FASTA records.
pub fn write_fasta<'a, I>(writer: &mut dyn Write, records: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    for (name, seq) in records {
        write!(writer, ">{}\n{}\n", name, seq)?;
    }
    Ok(())
}
