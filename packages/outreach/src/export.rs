use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::types::TargetRecord;

/// UTF-8 byte order mark. Spreadsheet tools key off it to decode non-ASCII
/// company names correctly.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 10] = [
    "ID",
    "Keyword",
    "Company Name",
    "Source URL",
    "Form URL",
    "CAPTCHA",
    "Status",
    "Error",
    "Submitted At",
    "Created At",
];

/// Serialize the full ordered field set to BOM-prefixed CSV, nulls as empty
/// strings, timestamps in RFC 3339.
pub fn export_csv(records: &[TargetRecord]) -> Result<Vec<u8>> {
    let mut out = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(HEADER)?;
        for record in records {
            writer.write_record([
                record.id.0.to_string(),
                record.keyword.clone(),
                record.company_name.clone(),
                record.source_url.clone(),
                record.form_url.clone().unwrap_or_default(),
                record.has_captcha.to_string(),
                record.status.as_str().to_owned(),
                record.error_message.clone().unwrap_or_default(),
                record
                    .submitted_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                record.created_at.to_rfc3339(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(out)
}

/// Timestamp-suffixed download filename.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("results_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TargetId, TargetStatus};
    use chrono::TimeZone;

    fn record() -> TargetRecord {
        TargetRecord {
            id: TargetId::new(),
            keyword: "acme".into(),
            company_name: "Acme 株式会社 A".into(),
            source_url: "https://example-a.com/?ref=1".into(),
            form_url: None,
            has_captcha: false,
            status: TargetStatus::Pending,
            error_message: None,
            submitted_at: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn starts_with_bom_then_header() {
        let bytes = export_csv(&[]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header.split(',').count(), 10);
        assert!(header.starts_with("ID,Keyword,Company Name"));
    }

    #[test]
    fn nulls_serialize_as_empty_fields() {
        let bytes = export_csv(&[record()]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let row = text.lines().nth(1).unwrap();
        // form_url, error_message and submitted_at are all unset.
        assert!(row.contains(",,"));
        assert!(row.contains("pending"));
    }

    #[test]
    fn non_ascii_names_survive() {
        let bytes = export_csv(&[record()]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("株式会社"));
    }

    #[test]
    fn filename_is_timestamp_suffixed() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 9, 5, 3).unwrap();
        assert_eq!(export_filename(now), "results_20260827_090503.csv");
    }
}
