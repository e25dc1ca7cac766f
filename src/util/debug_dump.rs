//! Optional CSV dump of every state popped off the search queue, for
//! visually inspecting a search's expansion order in a GIS tool. Not part of
//! the router's public result API -- the only observable side effect on the
//! hot path, and only built when the `debug-csv-dump` feature is enabled.

use crate::error::RouterError;
use crate::model::units::Weight;
use crate::model::vertex::Vertex;

/// a single `lat,lon,weight` row, written as one popped state is finalized.
#[cfg(feature = "debug-csv-dump")]
pub struct DebugDumpWriter {
    writer: csv::Writer<std::fs::File>,
}

#[cfg(feature = "debug-csv-dump")]
impl DebugDumpWriter {
    pub fn create<P: AsRef<std::path::Path>>(path: P) -> Result<DebugDumpWriter, RouterError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["lat", "lon", "weight"])?;
        Ok(DebugDumpWriter { writer })
    }

    pub fn record(&mut self, vertex: &Vertex, weight: Weight) -> Result<(), RouterError> {
        self.writer
            .write_record([vertex.lat().to_string(), vertex.lon().to_string(), weight.0.to_string()])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), RouterError> {
        self.writer.flush().map_err(|source| RouterError::IoError { source })
    }
}

#[cfg(not(feature = "debug-csv-dump"))]
pub struct DebugDumpWriter;

#[cfg(not(feature = "debug-csv-dump"))]
impl DebugDumpWriter {
    pub fn create<P: AsRef<std::path::Path>>(_path: P) -> Result<DebugDumpWriter, RouterError> {
        Ok(DebugDumpWriter)
    }

    pub fn record(&mut self, _vertex: &Vertex, _weight: Weight) -> Result<(), RouterError> {
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), RouterError> {
        Ok(())
    }
}
