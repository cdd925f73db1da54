//! Reads labeled points from CSV or LIBSVM (SVMLight) files.
use log::debug;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use super::{LabeledPoint, Vector};
use crate::error::{Result, TreeError};


/// The format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma separated values. One row per line.
    Csv,
    /// `label index:value index:value ...` with 1-based indices.
    LibSvm,
}


/// A struct that reads a file into `Vec<LabeledPoint>`.
///
/// # Example
/// ```no_run
/// use minitree::SampleReader;
///
/// let points = SampleReader::new()
///     .file("/path/to/data/file.csv")
///     .has_header(true)
///     .label_column("class")
///     .read()
///     .unwrap();
/// ```
pub struct SampleReader<P, S> {
    file: Option<P>,
    has_header: bool,
    label: Option<S>,
    format: Option<Format>,
}


impl<P, S> SampleReader<P, S> {
    /// Construct a new reader.
    /// By default, the file has no header
    /// and the first CSV column is the label.
    pub fn new() -> Self {
        Self { file: None, has_header: false, label: None, format: None, }
    }


    /// Set the flag whether the file has the header row or not.
    /// Default is `false.`
    pub fn has_header(mut self, flag: bool) -> Self {
        self.has_header = flag;
        self
    }


    /// Set the format explicitly.
    /// Otherwise, files with extension `.csv` are read as CSV
    /// and the others as LIBSVM.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}


impl<P, S> Default for SampleReader<P, S> {
    fn default() -> Self {
        Self::new()
    }
}


impl<P, S> SampleReader<P, S>
    where P: AsRef<Path>
{
    /// Set the file name.
    pub fn file(mut self, file: P) -> Self {
        self.file = Some(file);
        self
    }
}


impl<P, S> SampleReader<P, S>
    where S: AsRef<str>
{
    /// Set the CSV column that holds the label.
    /// Requires a header row.
    pub fn label_column(mut self, column: S) -> Self {
        self.label = Some(column);
        self
    }
}


impl<P, S> SampleReader<P, S>
    where P: AsRef<Path>,
          S: AsRef<str>
{
    /// Reads the file based on the arguments.
    /// This method consumes `self.`
    pub fn read(self) -> Result<Vec<LabeledPoint>> {
        let file = self.file
            .ok_or_else(|| io::Error::new(
                io::ErrorKind::InvalidInput,
                "The file name for csv/libsvm is not set",
            ))?;
        let path = file.as_ref();

        let format = self.format.unwrap_or_else(|| {
            if path.extension().is_some_and(|ext| ext == "csv") {
                Format::Csv
            } else {
                Format::LibSvm
            }
        });

        let reader = BufReader::new(File::open(path)?);
        let points = match format {
            Format::Csv => {
                let label = self.label.as_ref().map(|s| s.as_ref());
                read_csv(reader, self.has_header, label)?
            },
            Format::LibSvm => read_libsvm(reader)?,
        };

        debug!("Read {} points from {}", points.len(), path.display());
        Ok(points)
    }
}


/// Reads CSV rows into dense labeled points.
/// `label` names the label column and requires `has_header`.
/// Without `label`, the first column is the label.
pub fn read_csv<R: Read>(
    reader: BufReader<R>,
    has_header: bool,
    label: Option<&str>,
) -> Result<Vec<LabeledPoint>>
{
    let mut lines = reader.lines().enumerate();

    let mut label_pos = 0_usize;
    if has_header {
        let header = match lines.next() {
            Some((_, line)) => line?,
            None => return Ok(Vec::new()),
        };
        if let Some(name) = label {
            label_pos = header.split(',')
                .position(|col| col.trim() == name)
                .ok_or_else(|| TreeError::Parse {
                    line: 1,
                    message: format!("the label column `{name}` does not exist"),
                })?;
        }
    } else if let Some(name) = label {
        return Err(TreeError::Parse {
            line: 1,
            message: format!("the label column `{name}` requires a header row"),
        });
    }

    let mut points = Vec::new();
    let mut n_columns = None;
    for (i, line) in lines {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() { continue; }

        let mut xs = line.split(',')
            .map(|x| {
                let x = x.trim();
                x.parse::<f64>()
                    .map_err(|_| TreeError::Parse {
                        line: line_no,
                        message: format!("non-numerical value `{x}`"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let expected = *n_columns.get_or_insert(xs.len());
        if xs.len() != expected || label_pos >= xs.len() {
            return Err(TreeError::Parse {
                line: line_no,
                message: format!(
                    "expected {expected} columns, got {}", xs.len()
                ),
            });
        }

        let y = xs.remove(label_pos);
        points.push(LabeledPoint::new(y, xs));
    }
    Ok(points)
}


/// Reads LIBSVM rows into sparse labeled points.
/// Indices in the file are 1-based and become 0-based.
/// The dimension is the largest index in the file.
pub fn read_libsvm<R: Read>(reader: BufReader<R>)
    -> Result<Vec<LabeledPoint>>
{
    let mut rows = Vec::new();
    let mut n_features = 0_usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() { continue; }

        let parse_error = |message: String| TreeError::Parse {
            line: line_no, message,
        };

        let mut words = line.split_whitespace();
        // The first word corresponds to the target value.
        let y = words.next()
            .unwrap_or("")
            .parse::<f64>()
            .map_err(|e| parse_error(format!("invalid label: {e}")))?;

        let mut indices = Vec::new();
        let mut values = Vec::new();
        for word in words {
            let (index, value) = word.split_once(':')
                .ok_or_else(|| parse_error(format!("`{word}` is not index:value")))?;
            let index = index.parse::<usize>()
                .map_err(|e| parse_error(format!("invalid index `{index}`: {e}")))?;
            if index == 0 {
                return Err(parse_error("indices must be 1-based".to_string()));
            }
            if indices.last().is_some_and(|&last| last >= index - 1) {
                return Err(parse_error(
                    "indices must be strictly increasing".to_string()
                ));
            }
            let value = value.parse::<f64>()
                .map_err(|e| parse_error(format!("invalid value `{value}`: {e}")))?;
            indices.push(index - 1);
            values.push(value);
        }

        if let Some(&last) = indices.last() {
            n_features = n_features.max(last + 1);
        }
        rows.push((y, indices, values));
    }

    rows.into_iter()
        .map(|(y, indices, values)| {
            Vector::sparse(n_features, indices, values)
                .map(|x| LabeledPoint::new(y, x))
        })
        .collect()
}
