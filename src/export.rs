use std::fs;
use std::io::{self, Write};
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::identity::IdentityRecord;

/// Writes records as tab-separated rows without a header line, ready to
/// paste into a spreadsheet.
pub fn export_tsv<W: Write>(records: &[IdentityRecord], writer: W) -> AppResult<()> {
    let mut tsv = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);
    for record in records {
        tsv.serialize(record)?;
    }
    tsv.flush()?;
    Ok(())
}

pub fn render_tsv(records: &[IdentityRecord]) -> AppResult<String> {
    let mut buffer = Vec::new();
    export_tsv(records, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

#[cfg(feature = "clipboard")]
pub fn copy_to_clipboard(records: &[IdentityRecord]) -> AppResult<()> {
    let text = render_tsv(records)?;
    let mut clipboard =
        arboard::Clipboard::new().map_err(|err| AppError::Clipboard(err.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|err| AppError::Clipboard(err.to_string()))?;
    info!(target: "export", rows = records.len(), "identities copied to clipboard");
    Ok(())
}

pub fn write_tsv_file(path: &Path, records: &[IdentityRecord]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    export_tsv(records, file)?;
    info!(
        target: "export",
        path = %path.display(),
        rows = records.len(),
        "identities written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn record(geo: &str, address: &str) -> IdentityRecord {
        IdentityRecord {
            geo: geo.into(),
            password: "Ab3$cd".into(),
            name: "Ana Lopez".into(),
            address: address.into(),
            birthday: "01.02.1990".into(),
            proxy: "socks5://es@proxy.example.com:9123".into(),
            ..IdentityRecord::default()
        }
    }

    #[test]
    fn writes_tab_separated_rows_without_header() {
        let mut out = Vec::new();
        export_tsv(
            &[
                record("ES", "Calle Mayor 10, 28013 Madrid"),
                record("DE", ""),
            ],
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "ES\t\tAb3$cd\t\tAna Lopez\tCalle Mayor 10, 28013 Madrid\t01.02.1990\t\tsocks5://es@proxy.example.com:9123"
        );
        assert_eq!(lines[1].split('\t').count(), 9);
        assert_eq!(lines[1].split('\t').nth(5), Some(""));
    }

    #[test]
    fn renders_the_same_rows_for_the_clipboard() {
        let records = [record("ES", "Calle Mayor 10, 28013 Madrid")];
        let mut written = Vec::new();
        export_tsv(&records, &mut written).unwrap();
        let rendered = render_tsv(&records).unwrap();
        assert_eq!(rendered.as_bytes(), written.as_slice());
        assert_eq!(render_tsv(&[]).unwrap(), "");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("identities.tsv");
        write_tsv_file(&path, &[record("ES", "Calle Mayor 10, 28013 Madrid")]).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ES\t"));
        assert!(contents.ends_with('\n'));
    }
}
