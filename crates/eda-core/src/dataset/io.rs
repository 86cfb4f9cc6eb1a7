//! CSV decoding and encoding through Polars.
//!
//! Input is read with every column as a string so that type inference and
//! missing-value handling stay under this crate's rules, not Polars' own
//! schema inference.

use polars::prelude::{
    CsvParseOptions, CsvReadOptions, CsvWriter, DataFrame, DataType, IntoColumn, NamedFrom,
    SerReader, SerWriter, Series,
};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

use super::{ColumnValues, TabularDataset};
use crate::error::{EdaError, Result, ResultExt};

/// Raw column: header name and string cells (`None` for empty fields).
pub(super) type RawColumn = (String, Vec<Option<String>>);

/// Decode CSV bytes into raw string columns.
///
/// Empty input, invalid UTF-8, repeated header names and rows with more
/// fields than the header are parse errors.
pub(super) fn read_raw_columns(bytes: &[u8]) -> Result<Vec<RawColumn>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(EdaError::Parse("input is empty".to_string()));
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EdaError::Parse(format!("input is not valid UTF-8: {e}")))?;

    let header = read_header(text)?;
    let mut seen = HashSet::with_capacity(header.len());
    if let Some(name) = header.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(EdaError::Parse(format!("duplicate column name '{name}'")));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options())
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()
        .map_err(|e| EdaError::Parse(e.to_string()))?;

    debug!("Decoded CSV: {:?}", df.shape());

    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        let as_string = if series.dtype() == &DataType::String {
            series.clone()
        } else {
            series
                .cast(&DataType::String)
                .context(format!("Reading column '{}'", series.name()))?
        };
        let cells: Vec<Option<String>> = as_string
            .str()?
            .into_iter()
            .map(|cell| cell.map(str::to_string))
            .collect();
        columns.push((series.name().to_string(), cells));
    }
    Ok(columns)
}

/// Header names as written. Polars renames repeats to `<name>_duplicated_N`
/// when it reads a header, so the first row is read as data instead.
fn read_header(text: &str) -> Result<Vec<String>> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_n_rows(Some(1))
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options())
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()
        .map_err(|e| EdaError::Parse(e.to_string()))?;

    df.get_columns()
        .iter()
        .map(|column| {
            let name = column.as_materialized_series().str()?.get(0);
            Ok(name.unwrap_or_default().to_string())
        })
        .collect()
}

fn parse_options() -> CsvParseOptions {
    CsvParseOptions::default().with_quote_char(Some(b'"'))
}

/// Encode a dataset as CSV with a header row and no index column.
pub(super) fn write_csv(dataset: &TabularDataset) -> Result<Vec<u8>> {
    let columns = dataset
        .columns()
        .iter()
        .map(|column| {
            let series = match column.values() {
                ColumnValues::Numeric(values) if column.is_integral() => {
                    let ints: Vec<Option<i64>> =
                        values.iter().map(|v| v.map(|x| x as i64)).collect();
                    Series::new(column.name().into(), ints)
                }
                ColumnValues::Numeric(values) => Series::new(column.name().into(), values.clone()),
                ColumnValues::Categorical(values) => {
                    Series::new(column.name().into(), values.clone())
                }
            };
            series.into_column()
        })
        .collect::<Vec<_>>();

    let mut df = DataFrame::new(columns).context("Building output frame")?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)
        .context("Writing CSV")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    #[test]
    fn test_read_raw_columns_keeps_strings() {
        let columns = read_raw_columns(b"a,b\n1,x\n,y\n").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].0, "a");
        assert_eq!(columns[0].1, vec![Some("1".to_string()), None]);
        assert_eq!(
            columns[1].1,
            vec![Some("x".to_string()), Some("y".to_string())]
        );
    }

    #[test]
    fn test_read_quoted_fields() {
        let columns = read_raw_columns(b"name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(columns[0].1, vec![Some("Smith, J".to_string())]);
        assert_eq!(columns[1].1, vec![Some("said \"hi\"".to_string())]);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(
            read_raw_columns(b"").unwrap_err(),
            EdaError::Parse(_)
        ));
        assert!(matches!(
            read_raw_columns(b"  \n").unwrap_err(),
            EdaError::Parse(_)
        ));
    }

    #[test]
    fn test_repeated_header_is_parse_error() {
        let err = read_raw_columns(b"a,a\n1,2\n").unwrap_err();
        assert!(matches!(err, EdaError::Parse(_)));
        assert!(err.to_string().contains("duplicate column name 'a'"));
    }

    #[test]
    fn test_read_header_keeps_names_as_written() {
        let header = read_header("id,\"last, first\",id\n1,x,2\n").unwrap();
        assert_eq!(header, vec!["id", "last, first", "id"]);
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes = [b'a', b'\n', 0xff, 0xfe, b'\n'];
        assert!(matches!(
            read_raw_columns(&bytes).unwrap_err(),
            EdaError::Parse(_)
        ));
    }

    #[test]
    fn test_write_csv_formats() {
        let dataset = TabularDataset::new(vec![
            Column::integer("n", vec![Some(1.0), Some(2.0)]),
            Column::numeric("x", vec![Some(0.5), None]),
            Column::categorical("s", vec![Some("a,b".to_string()), None]),
        ])
        .unwrap();

        let text = String::from_utf8(write_csv(&dataset).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "n,x,s");
        assert_eq!(lines[1], "1,0.5,\"a,b\"");
        assert_eq!(lines[2], "2,,");
    }
}
