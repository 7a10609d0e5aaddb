//! NDJSON (newline-delimited JSON) stream sink.
//!
//! Each record is serialized straight into the buffered writer, one per
//! line.
//!
//! ```ignore
//! let mut sink = JsonStreamSink::stdout();
//! sink.write_analysis(&result)?;
//! sink.write_findings(&FindingRow::from_result(&result))?;
//! ```

use super::{AnalysisRow, FindingRow};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use txguard_core::AnalysisResult;

/// Buffered NDJSON writer over any `Write`.
pub struct JsonStreamSink<W: Write> {
    writer: BufWriter<W>,
    rows_written: usize,
}

impl JsonStreamSink<io::Stdout> {
    /// Write NDJSON to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonStreamSink<W> {
    /// Create a sink wrapping any writer (file, Vec<u8>, etc.).
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(64 * 1024, writer),
            rows_written: 0,
        }
    }

    /// Write one full analysis as it would be returned to a caller.
    pub fn write_analysis(&mut self, result: &AnalysisResult) -> io::Result<()> {
        self.write_line(result)
    }

    /// Write one flattened analysis row.
    pub fn write_row(&mut self, row: &AnalysisRow) -> io::Result<()> {
        self.write_line(row)
    }

    /// Write all finding rows.
    pub fn write_findings(&mut self, rows: &[FindingRow]) -> io::Result<()> {
        rows.iter().try_for_each(|row| self.write_line(row))
    }

    /// Write any serializable record, e.g. a batch assessment.
    pub fn write_line<T: Serialize + ?Sized>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush and return how many rows were written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> AnalysisRow {
        AnalysisRow {
            id: "3f0b6a52-8d1e-4c3b-9a57-3e2f0c1d9b11".into(),
            wallet_address: None,
            tx_hash: None,
            target_address: Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".into()),
            target_protocol: "USDC".into(),
            target_name: "USD Coin (Base)".into(),
            function_name: Some("approve".into()),
            human_readable: "Approve unlimited tokens for 0x742d…".into(),
            value_wei: "0".into(),
            risk_score: 90,
            risk_level: "critical".into(),
            risk_label: "Critical Risk".into(),
            failed_checks: 1,
            simulation_success: false,
            value_at_risk: Some("Unlimited (check token balance)".into()),
            created_at: "2026-02-28T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn one_record_per_line() {
        let mut buf = Vec::new();
        let mut sink = JsonStreamSink::new(&mut buf);

        let findings = vec![FindingRow {
            analysis_id: "3f0b6a52-8d1e-4c3b-9a57-3e2f0c1d9b11".into(),
            check: "unlimited_approval".into(),
            severity: "critical".into(),
            message: "This approval sets an unlimited or extremely high allowance".into(),
            created_at: "2026-02-28T00:00:00+00:00".into(),
        }];

        sink.write_row(&row()).unwrap();
        sink.write_findings(&findings).unwrap();
        assert_eq!(sink.rows_written(), 2);
        let n = sink.finish().unwrap();
        assert_eq!(n, 2);

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["risk_score"], 90);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["check"], "unlimited_approval");
    }
}
