//! CSV bulk import of catalog instruments.

use std::fs;
use std::path::Path;

use crate::domain::catalog::Instrument;
use crate::domain::error::StockfolioError;

/// Read `symbol,sector,price` rows (after a header line) into raw
/// instrument records. Unlike the flat-file store, a bad row here is an
/// error rather than a skip: the engine vets and applies the batch
/// atomically, so a silently dropped row would be invisible to the user.
pub fn read_instruments(path: &Path) -> Result<Vec<Instrument>, StockfolioError> {
    let content = fs::read_to_string(path).map_err(|err| StockfolioError::Persistence {
        target: "import".to_string(),
        reason: format!("failed to read {}: {err}", path.display()),
    })?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|err| StockfolioError::InvalidInput {
            reason: format!("row {}: {err}", index + 1),
        })?;
        let symbol = field(&record, index, 0, "symbol")?;
        let sector = field(&record, index, 1, "sector")?;
        let price: f64 =
            field(&record, index, 2, "price")?
                .parse()
                .map_err(|err| StockfolioError::InvalidInput {
                    reason: format!("row {}: invalid price: {err}", index + 1),
                })?;
        rows.push(Instrument {
            symbol: symbol.to_string(),
            sector: sector.to_string(),
            price,
        });
    }
    Ok(rows)
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    column: usize,
    name: &str,
) -> Result<&'a str, StockfolioError> {
    record
        .get(column)
        .ok_or_else(|| StockfolioError::InvalidInput {
            reason: format!("row {}: missing {name} column", index + 1),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("instruments.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_rows_after_header() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "symbol,sector,price\n\
             AAPL,TECH,150.25\n\
             xom,energy,105.0\n",
        );

        let rows = read_instruments(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "AAPL");
        assert!((rows[0].price - 150.25).abs() < f64::EPSILON);
        // Raw casing is preserved; canonicalization is the engine's job.
        assert_eq!(rows[1].symbol, "xom");
    }

    #[test]
    fn bad_price_is_an_error_with_row_context() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "symbol,sector,price\n\
             AAPL,TECH,150.25\n\
             MSFT,TECH,cheap\n",
        );

        let err = read_instruments(&path).unwrap_err();
        match err {
            StockfolioError::InvalidInput { reason } => assert!(reason.contains("row 2")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "symbol,sector,price\n\
             AAPL,TECH\n",
        );

        assert!(read_instruments(&path).is_err());
    }

    #[test]
    fn missing_file_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        let err = read_instruments(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, StockfolioError::Persistence { .. }));
    }

    #[test]
    fn empty_file_yields_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "symbol,sector,price\n");
        assert!(read_instruments(&path).unwrap().is_empty());
    }
}
