//! Embedding files and checkpoint naming.
//!
//! One node per line: `<name> <c₀> <c₁> … <c_{d−1}>`, single spaces,
//! coordinates in shortest round-trip decimal form. Lines are written in
//! enumeration order; readers accept any order and any subset of nodes.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::digraph::Digraph;
use crate::error::{EmbedError, Result};
use crate::table::EmbeddingTable;

/// `<output>-after-<epochs, 6 digits>-epochs`
pub fn checkpoint_path(output: &Path, epochs_trained: usize) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(format!("-after-{epochs_trained:06}-epochs"));
    PathBuf::from(name)
}

/// Write every row of `table`, labelled with the node names from `graph`.
pub fn save_vectors(graph: &Digraph, table: &EmbeddingTable, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| EmbedError::io(path, e))?;
    let mut w = BufWriter::new(file);
    for node in graph.nodes() {
        writeln!(w, "{} {}", node.name, table.row(node.enumeration))
            .map_err(|e| EmbedError::io(path, e))?;
    }
    w.flush().map_err(|e| EmbedError::io(path, e))
}

/// Overwrite rows of `table` with the vectors stored at `path`.
///
/// Columns are positional: coordinates past the table dimension are ignored
/// and missing trailing coordinates keep their current value. A name absent
/// from `graph` is an error. Returns the number of rows loaded.
pub fn load_vectors(graph: &Digraph, table: &EmbeddingTable, path: &Path) -> Result<usize> {
    let mut loaded = 0;
    for record in records(path, table.dimension())? {
        let (name, coords) = record?;
        let row = graph
            .enumeration_of(&name)
            .ok_or_else(|| EmbedError::UnknownNode(name.clone()))?;
        for (column, &value) in coords.iter().take(table.dimension()).enumerate() {
            table.set(row, column, value);
        }
        loaded += 1;
    }
    tracing::info!(path = %path.display(), rows = loaded, "Vectors loaded");
    Ok(loaded)
}

/// Lazily parse an embedding file into `(name, coordinates)` records.
/// Blank lines and empty fields (repeated or trailing spaces) are skipped.
pub fn read_vectors(path: &Path) -> Result<impl Iterator<Item = Result<(String, Vec<f64>)>>> {
    records(path, usize::MAX)
}

/// Like [`read_vectors`], reading at most `columns` coordinates per line;
/// anything after them is never parsed.
fn records(
    path: &Path,
    columns: usize,
) -> Result<impl Iterator<Item = Result<(String, Vec<f64>)>>> {
    let file = File::open(path).map_err(|e| EmbedError::io(path, e))?;
    let origin = path.to_path_buf();
    let records = BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(move |(idx, line)| match line {
            Err(e) => Some(Err(EmbedError::io(origin.clone(), e))),
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(parse_record(&line, idx + 1, columns)),
        });
    Ok(records)
}

fn parse_record(line: &str, line_no: usize, columns: usize) -> Result<(String, Vec<f64>)> {
    let mut fields = line.split(' ').filter(|f| !f.is_empty());
    let name = fields.next().unwrap_or_default().to_string();
    let coords = fields
        .take(columns)
        .map(|f| {
            f.parse::<f64>().map_err(|_| EmbedError::InvalidCoordinate {
                line: line_no,
                value: f.to_string(),
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok((name, coords))
}
