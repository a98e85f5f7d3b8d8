use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::apply::records;
use super::registry::{bindings_for, ExportColumn, ExportSource};
use super::section::Section;
use crate::api::bridge::Payload;
use crate::error::WhaleScopeError;

pub const NO_EXPORT_DATA: &str = "No data available for export";

const PDF_LINES_PER_PAGE: usize = 50;
const PDF_FONT_SIZE: u32 = 9;
const PDF_LINE_HEIGHT: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub mime: &'static str,
    pub contents: Vec<u8>,
}

/// Destination of finished export documents.
pub trait ExportSink: Send + Sync {
    fn write(&self, document: &ExportDocument) -> Result<PathBuf, WhaleScopeError>;
}

/// Writes documents into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn write(&self, document: &ExportDocument) -> Result<PathBuf, WhaleScopeError> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(WhaleScopeError::ExportError(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&document.filename);
        fs::write(&path, &document.contents)?;
        log::info!("Wrote {} ({} bytes)", path.display(), document.contents.len());
        Ok(path)
    }
}

/// Header labels plus formatted records of one section payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub title: &'static str,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell(value: Option<&Value>, column: &ExportColumn) -> String {
    value
        .filter(|v| !v.is_null())
        .and_then(|v| column.fmt.apply(v))
        .unwrap_or_default()
}

pub fn export_table(section: Section, payload: &Payload) -> ExportTable {
    let layout = &bindings_for(section).export;
    match &layout.source {
        ExportSource::Parallel { container, index, index_label, columns } => {
            let mut header = vec![index_label.to_string()];
            header.extend(columns.iter().map(|c| c.label.to_string()));

            let data = payload.lookup(container);
            let keys = data
                .and_then(|d| d.get(*index))
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let rows = keys
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let mut row = vec![key.as_str().map_or_else(|| key.to_string(), str::to_string)];
                    row.extend(columns.iter().map(|column| {
                        let value = data
                            .and_then(|d| d.get(column.key))
                            .and_then(|series| series.get(i));
                        cell(value, column)
                    }));
                    row
                })
                .collect();

            ExportTable { title: layout.title, header, rows }
        }
        ExportSource::Records { container, columns } => {
            let header = columns.iter().map(|c| c.label.to_string()).collect();
            let rows = payload
                .lookup(container)
                .map(records)
                .unwrap_or_default()
                .into_iter()
                .map(|record| {
                    columns
                        .iter()
                        .map(|column| cell(record.get(column.key), column))
                        .collect()
                })
                .collect();

            ExportTable { title: layout.title, header, rows }
        }
    }
}

pub fn filename(section: Section, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_data_{}.{}",
        section.as_str(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

pub fn build(section: Section, payload: &Payload, format: ExportFormat, date: NaiveDate) -> ExportDocument {
    let table = export_table(section, payload);
    let contents = match format {
        ExportFormat::Csv => to_csv(&table).into_bytes(),
        ExportFormat::Pdf => to_pdf(&table),
    };
    ExportDocument {
        filename: filename(section, format, date),
        mime: format.mime(),
        contents,
    }
}

pub fn to_csv(table: &ExportTable) -> String {
    std::iter::once(&table.header)
        .chain(table.rows.iter())
        .map(|row| {
            row.iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_csv(value: &str) -> String {
    let needs_quotes = value.contains(',') || value.contains('"') || value.contains('\n');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Text lines of the paginated report: title, header, one line per record.
pub fn report_lines(table: &ExportTable) -> Vec<String> {
    let mut lines = vec![table.title.to_string(), table.header.join(" | ")];
    lines.extend(table.rows.iter().map(|row| row.join(" | ")));
    lines
}

fn escape_pdf(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '(' | ')' | '\\' => format!("\\{}", c),
            c if c.is_ascii() && !c.is_ascii_control() => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

/// Minimal PDF 1.4: Letter pages of Helvetica text, 50 lines per page.
pub fn to_pdf(table: &ExportTable) -> Vec<u8> {
    let lines = report_lines(table);
    let pages: Vec<&[String]> = lines.chunks(PDF_LINES_PER_PAGE).collect();

    // Objects: 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
    let mut objects: Vec<String> = Vec::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + i * 2).collect();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" "),
        pages.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (page, id) in pages.iter().zip(&page_ids) {
        let mut stream = format!(
            "BT /F1 {} Tf {} TL 40 750 Td\n",
            PDF_FONT_SIZE, PDF_LINE_HEIGHT
        );
        for line in page.iter() {
            stream.push_str(&format!("({}) Tj T*\n", escape_pdf(line)));
        }
        stream.push_str("ET");

        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            id + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bitcoin_payload() -> Payload {
        Payload::new(json!({"price_history": {
            "dates": ["2024-01-01", "2024-01-02"],
            "open": [42000.123, 43000],
            "high": [43000, 44000],
            "low": [41000, 42500],
            "close": [43000, 43900.5]
        }}))
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let doc = build(
            Section::Bitcoin,
            &bitcoin_payload(),
            ExportFormat::Csv,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        assert_eq!(doc.filename, "bitcoin_data_2024-02-01.csv");
        assert_eq!(doc.mime, "text/csv");
        assert_eq!(
            String::from_utf8(doc.contents).unwrap(),
            "Date,Open (USD),High (USD),Low (USD),Close (USD)\n\
             2024-01-01,$42000.12,$43000.00,$41000.00,$43000.00\n\
             2024-01-02,$43000.00,$44000.00,$42500.00,$43900.50"
        );
    }

    #[test]
    fn csv_escapes_separators() {
        let table = ExportTable {
            title: "t",
            header: vec!["a".into(), "b".into()],
            rows: vec![vec!["x,y".into(), "say \"hi\"".into()]],
        };
        assert_eq!(to_csv(&table), "a,b\n\"x,y\",\"say \"\"hi\"\"\"");
    }

    #[test]
    fn record_exports_flatten_token_lists() {
        let payload = Payload::new(json!({"transactions": {
            "BTC": [{"timestamp": "2024-01-02 10:00:00", "token": "BTC", "type": "buy", "usd_value": 10}],
            "ETH": [{"timestamp": "2024-01-03 10:00:00", "token": "ETH", "type": "sell"}]
        }}));
        let table = export_table(Section::Blackrock, &payload);
        assert_eq!(table.header, vec!["Timestamp", "Token", "Type", "Value (USD)"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["2024-01-02 10:00:00", "BTC", "buy", "$10.00"]);
        assert_eq!(table.rows[1][3], "");
    }

    #[test]
    fn pdf_contains_every_line() {
        let doc = build(
            Section::Bitcoin,
            &bitcoin_payload(),
            ExportFormat::Pdf,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        assert_eq!(doc.filename, "bitcoin_data_2024-02-01.pdf");
        let text = String::from_utf8(doc.contents).unwrap();
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("(Bitcoin Price History) Tj"));
        assert!(text.contains("(Date | Open \\(USD\\) | High \\(USD\\) | Low \\(USD\\) | Close \\(USD\\)) Tj"));
        assert!(text.contains("(2024-01-02 | $43000.00 | $44000.00 | $42500.00 | $43900.50) Tj"));
    }

    #[test]
    fn pdf_paginates_long_reports() {
        let table = ExportTable {
            title: "long",
            header: vec!["n".into()],
            rows: (0..120).map(|i| vec![i.to_string()]).collect(),
        };
        let text = String::from_utf8(to_pdf(&table)).unwrap();
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("exports"));
        let doc = ExportDocument {
            filename: "lido_data_2024-01-01.csv".into(),
            mime: "text/csv",
            contents: b"a,b".to_vec(),
        };
        let path = sink.write(&doc).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"a,b");
    }

    #[test]
    fn directory_sink_rejects_a_file_target() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let sink = DirectorySink::new(file.path());
        let doc = ExportDocument {
            filename: "x.csv".into(),
            mime: "text/csv",
            contents: Vec::new(),
        };
        assert!(matches!(sink.write(&doc), Err(WhaleScopeError::ExportError(_))));
    }
}
