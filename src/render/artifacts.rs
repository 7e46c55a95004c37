use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::data::datetime::format_timestamp;
use crate::error::Result;
use crate::state::series::AccelerationPoint;

pub const ACCELERATION_CSV: &str = "downward_acceleration_points.csv";

/// A named output blob: a chart image or an exported table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Destination for finished artifacts.
pub trait ArtifactSink {
    /// Store `artifact`, replacing any earlier one of the same name, and
    /// return where it ended up.
    fn put(&mut self, artifact: &Artifact) -> Result<String>;
}

/// Writes each artifact to `<dir>/<name>`, creating `dir` on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn put(&mut self, artifact: &Artifact) -> Result<String> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.name);
        std::fs::write(&path, &artifact.bytes)?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(path.display().to_string())
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: BTreeMap<String, Vec<u8>>,
}

impl ArtifactSink for MemorySink {
    fn put(&mut self, artifact: &Artifact) -> Result<String> {
        self.artifacts
            .insert(artifact.name.clone(), artifact.bytes.clone());
        Ok(artifact.name.clone())
    }
}

/// `Index,Timestamp,Value` table of acceleration points. The header is
/// written even when there are no rows.
pub fn acceleration_csv(points: &[AccelerationPoint]) -> Result<Artifact> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(["Index", "Timestamp", "Value"])?;
    for p in points {
        writer.serialize((p.index, format_timestamp(p.timestamp), p.value))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(Artifact::new(ACCELERATION_CSV, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datetime::parse_timestamp;

    fn point(index: usize, ts: &str, value: f64) -> AccelerationPoint {
        AccelerationPoint {
            index,
            timestamp: parse_timestamp(ts).unwrap(),
            value,
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let artifact = acceleration_csv(&[
            point(2, "01/01/23 02:00", 5.0),
            point(9, "02/01/23 13:30", -1.25),
        ])
        .unwrap();
        assert_eq!(artifact.name, ACCELERATION_CSV);
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(
            text,
            "Index,Timestamp,Value\n2,2023-01-01 02:00:00,5.0\n9,2023-01-02 13:30:00,-1.25\n"
        );
    }

    #[test]
    fn empty_csv_keeps_header() {
        let artifact = acceleration_csv(&[]).unwrap();
        assert_eq!(artifact.bytes, b"Index,Timestamp,Value\n");
    }

    #[test]
    fn directory_sink_creates_dir_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let mut sink = DirectorySink::new(&dir);

        sink.put(&Artifact::new("a.txt", b"first".to_vec())).unwrap();
        let location = sink.put(&Artifact::new("a.txt", b"second".to_vec())).unwrap();

        assert_eq!(std::fs::read(dir.join("a.txt")).unwrap(), b"second");
        assert!(location.ends_with("a.txt"));
    }

    #[test]
    fn memory_sink_replaces_by_name() {
        let mut sink = MemorySink::default();
        sink.put(&Artifact::new("x", vec![1])).unwrap();
        sink.put(&Artifact::new("x", vec![2])).unwrap();
        assert_eq!(sink.artifacts.len(), 1);
        assert_eq!(sink.artifacts["x"], vec![2]);
    }
}
