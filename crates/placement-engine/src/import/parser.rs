use serde::Deserialize;
use std::io::Read;

/// One raw CSV row with its 1-based line number in the file (the header is line 1).
#[derive(Debug)]
pub(crate) struct ApprovalRow {
    pub(crate) line: usize,
    pub(crate) id: String,
    pub(crate) subject: String,
    pub(crate) status: String,
    pub(crate) organization_id: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    id: String,
    subject: String,
    #[serde(default)]
    status: String,
    organization_id: String,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ApprovalRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawRow>().enumerate() {
        let raw = record?;
        rows.push(ApprovalRow {
            line: index + 2,
            id: raw.id,
            subject: raw.subject,
            status: raw.status,
            organization_id: raw.organization_id,
        });
    }

    Ok(rows)
}
