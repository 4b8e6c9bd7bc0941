use crate::domain::lookup::LookupReport;
use crate::error::Result;
use std::io::Write;

/// Writes a lookup report's violations as CSV.
///
/// This writer wraps `csv::Writer` and serializes each violation as one
/// record; the header row comes from the violation's field names.
pub struct ViolationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ViolationWriter<W> {
    /// Creates a new `ViolationWriter` over any `Write` sink (e.g. stdout,
    /// a file, an in-memory buffer).
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().from_writer(sink);
        Self { writer }
    }

    pub fn write_report(&mut self, report: &LookupReport) -> Result<()> {
        for violation in &report.violations {
            self.writer.serialize(violation)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::violation::{Amount, Jurisdiction, Violation};
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_renders_header_and_rows() {
        let report = LookupReport {
            violations: vec![Violation {
                citation: "LNK-30021".to_string(),
                amount: Amount::new(dec!(45.00)).unwrap(),
                jurisdiction: Jurisdiction::new("NE"),
                source: "Lincoln City Treasurer".to_string(),
                status: Some("DELINQUENT".to_string()),
                issued: None,
                link: "https://treasurer.example.ne.gov".to_string(),
            }],
            failures: vec![],
        };

        let mut buffer = Vec::new();
        ViolationWriter::new(&mut buffer).write_report(&report).unwrap();
        let rendered = String::from_utf8(buffer).unwrap();

        let mut lines = rendered.lines();
        assert_eq!(
            lines.next(),
            Some("citation,amount,jurisdiction,source,status,issued,link")
        );
        assert_eq!(
            lines.next(),
            Some("LNK-30021,45.00,NE,Lincoln City Treasurer,DELINQUENT,,https://treasurer.example.ne.gov")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_report_renders_nothing() {
        let mut buffer = Vec::new();
        ViolationWriter::new(&mut buffer)
            .write_report(&LookupReport::default())
            .unwrap();
        assert!(buffer.is_empty());
    }
}
