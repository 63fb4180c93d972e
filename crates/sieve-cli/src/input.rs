//! Record ingestion from JSON files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use sieve_core::Record;

/// Read a JSON array of records (`company`, `count`, `price`).
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse input: {}", path.display()))?;
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Write records as pretty JSON, scores included.
pub fn save_records(records: &[Record], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output: {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), records)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_original_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dat.json");
        std::fs::write(
            &path,
            r#"[{"company":"Acme","count":1,"price":1.5},{"company":"Zero","count":0,"price":0}]"#,
        )
        .unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record::new("Acme", 1, 1.5));
        assert_eq!(records[1].quantity, 0);
    }

    #[test]
    fn load_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(load_records(&path).unwrap().is_empty());
    }

    #[test]
    fn load_malformed_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"company":"Acme"}]"#).unwrap();
        let err = load_records(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse input"));
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let records = vec![Record::new("Acme", 1, 1.5).with_score(21)];
        save_records(&records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"score\": 21"));
        // score is output-only
        assert_eq!(load_records(&path).unwrap(), vec![Record::new("Acme", 1, 1.5)]);
    }
}
