//! Neighbor graph export as a `source,target` edge list.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::algo::NeighborGraph;
use crate::error::Result;

/// Write one line per undirected edge, smaller index first.
pub fn write_adjacencies<W: Write>(writer: &mut W, graph: &NeighborGraph) -> Result<()> {
    writeln!(writer, "source,target")?;
    for (a, b) in graph.edges() {
        writeln!(writer, "{},{}", a, b)?;
    }
    Ok(())
}

/// Save the edge list of `graph` to a CSV file.
pub fn save_adjacencies<P: AsRef<Path>>(path: P, graph: &NeighborGraph) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_adjacencies(&mut writer, graph)?;
    writer.flush()?;
    Ok(())
}
