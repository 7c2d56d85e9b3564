use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;

use crate::domain::coerce::parse_float;
use crate::domain::records::MarketPriceEntry;
use crate::error::ArtifactError;
use crate::storage::MARKET_PRICES_FILE;

/// Accepted header spellings per logical column, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPriceColumns {
    pub crop: Vec<String>,
    pub market: Vec<String>,
    pub price: Vec<String>,
}

impl Default for MarketPriceColumns {
    fn default() -> Self {
        Self {
            crop: vec!["crop".into(), "Crop".into()],
            market: vec!["market".into(), "Market".into()],
            price: vec!["price".into()],
        }
    }
}

/// Header positions resolved once per file.
struct ResolvedColumns {
    crop: Vec<usize>,
    market: Vec<usize>,
    price: Vec<usize>,
}

impl ResolvedColumns {
    fn resolve(headers: &StringRecord, columns: &MarketPriceColumns) -> Self {
        let mut index = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // Spreadsheet exports prefix the first header with a BOM.
            index.entry(name.trim_start_matches('\u{feff}').to_string()).or_insert(idx);
        }
        let lookup = |aliases: &[String]| -> Vec<usize> {
            aliases.iter().filter_map(|a| index.get(a.as_str()).copied()).collect()
        };
        Self {
            crop: lookup(&columns.crop),
            market: lookup(&columns.market),
            price: lookup(&columns.price),
        }
    }
}

fn first_non_empty<'r>(record: &'r StringRecord, positions: &[usize]) -> Option<&'r str> {
    positions
        .iter()
        .filter_map(|&idx| record.get(idx))
        .find(|v| !v.is_empty())
}

pub fn read(
    path: &Path,
    columns: &MarketPriceColumns,
) -> Result<Vec<MarketPriceEntry>, ArtifactError> {
    let file = std::fs::File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(file, columns)
}

/// Parses market price rows, skipping any row whose price is absent or not a number.
pub fn parse<R: std::io::Read>(
    reader: R,
    columns: &MarketPriceColumns,
) -> Result<Vec<MarketPriceEntry>, ArtifactError> {
    let csv_err = |source: csv::Error| ArtifactError::Csv {
        file: MARKET_PRICES_FILE,
        source,
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let resolved = ResolvedColumns::resolve(&headers, columns);

    let mut rows = Vec::new();
    let mut skipped: usize = 0;
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;

        let Some(price) = first_non_empty(&record, &resolved.price).and_then(parse_float) else {
            skipped += 1;
            tracing::warn!(
                file = MARKET_PRICES_FILE,
                row = idx + 1,
                record = ?record,
                "invalid price value; skipping row"
            );
            continue;
        };

        rows.push(MarketPriceEntry {
            crop: first_non_empty(&record, &resolved.crop).unwrap_or_default().to_string(),
            market: first_non_empty(&record, &resolved.market).unwrap_or_default().to_string(),
            price,
        });
    }

    if skipped > 0 {
        tracing::info!(
            file = MARKET_PRICES_FILE,
            kept = rows.len(),
            skipped,
            "market prices loaded with skipped rows"
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArtifactStore;

    fn parse_str(body: &str) -> Vec<MarketPriceEntry> {
        parse(body.as_bytes(), &MarketPriceColumns::default()).unwrap()
    }

    fn entry(crop: &str, market: &str, price: f64) -> MarketPriceEntry {
        MarketPriceEntry {
            crop: crop.into(),
            market: market.into(),
            price,
        }
    }

    #[test]
    fn skips_rows_with_bad_price_without_failing() {
        let rows = parse_str(
            "crop,market,price\n\
             Mustard,Jaipur,5400\n\
             Wheat,Kota,n/a\n\
             Gram,Alwar,\n\
             Barley,Ajmer, 2100.5 \n",
        );
        assert_eq!(
            rows,
            vec![entry("Mustard", "Jaipur", 5400.0), entry("Barley", "Ajmer", 2100.5)]
        );
    }

    #[test]
    fn non_finite_prices_are_skipped() {
        let rows = parse_str("crop,market,price\nRice,Patna,nan\nWheat,Kota,inf\nGram,Alwar,-Infinity\nJowar,Indore,10\n");
        assert_eq!(rows, vec![entry("Jowar", "Indore", 10.0)]);
    }

    #[test]
    fn accepts_capitalized_headers() {
        let rows = parse_str("Crop,Market,price\nRice,Patna,3000\n");
        assert_eq!(rows, vec![entry("Rice", "Patna", 3000.0)]);
    }

    #[test]
    fn lowercase_alias_wins_but_falls_back_when_empty() {
        let rows = parse_str("crop,Crop,market,price\nRice,Paddy,Patna,1\n,Paddy,Patna,2\n");
        assert_eq!(rows[0].crop, "Rice");
        assert_eq!(rows[1].crop, "Paddy");
    }

    #[test]
    fn missing_name_columns_default_to_empty() {
        let rows = parse_str("price\n12\n");
        assert_eq!(rows, vec![entry("", "", 12.0)]);
    }

    #[test]
    fn missing_price_column_skips_everything() {
        let rows = parse_str("crop,market\nRice,Patna\n");
        assert!(rows.is_empty());
    }

    #[test]
    fn short_rows_are_skipped() {
        let rows = parse_str("crop,market,price\nRice,Patna\nWheat,Kota,10\n");
        assert_eq!(rows, vec![entry("Wheat", "Kota", 10.0)]);
    }

    #[test]
    fn strips_bom_from_first_header() {
        let rows = parse_str("\u{feff}crop,market,price\nJowar,Indore,2500\n");
        assert_eq!(rows, vec![entry("Jowar", "Indore", 2500.0)]);
    }

    #[test]
    fn custom_aliases_are_honoured() {
        let columns = MarketPriceColumns {
            crop: vec!["commodity".into()],
            market: vec!["mandi".into()],
            price: vec!["modal_price".into()],
        };
        let rows = parse("commodity,mandi,modal_price\nOnion,Lasalgaon,1800\n".as_bytes(), &columns).unwrap();
        assert_eq!(rows, vec![entry("Onion", "Lasalgaon", 1800.0)]);
    }

    #[test]
    fn store_reads_csv_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MARKET_PRICES_FILE),
            "crop,market,price\nMustard,Jaipur,5400\nMustard,Kota,bad\n",
        )
        .unwrap();
        let rows = ArtifactStore::new(dir.path()).load_market_prices().unwrap();
        assert_eq!(rows, vec![entry("Mustard", "Jaipur", 5400.0)]);
    }

    #[test]
    fn empty_file_yields_no_rows() {
        assert!(parse_str("").is_empty());
    }
}
