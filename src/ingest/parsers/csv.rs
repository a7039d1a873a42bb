use super::{Parser, REQUIRED_FIELDS};
use crate::error::{AltgraphError, Result};
use crate::ingest::{RawRecord, RawTags};

/// Comma-separated product files with a header row.
///
/// Columns are matched by (trimmed, case-insensitive) header name, so their order
/// does not matter and unknown columns are ignored. Double-quoted fields may contain
/// commas, newlines and `""` escapes.
pub struct CsvParser;

impl Parser for CsvParser {
    fn can_parse(&self, extension: &str) -> bool {
        extension == "csv"
    }

    fn parse(&self, content: &str, path: &str) -> Result<Vec<RawRecord>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut rows = split_rows(content)
            .map_err(|e| AltgraphError::Parse(format!("CSV parse error in {}: {}", path, e)))?
            .into_iter();

        let header = rows
            .next()
            .ok_or_else(|| AltgraphError::Parse(format!("CSV file {} has no header row", path)))?;
        let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut columns = [0usize; REQUIRED_FIELDS.len()];
        for (slot, field) in columns.iter_mut().zip(REQUIRED_FIELDS.iter()) {
            *slot = header.iter().position(|h| h == field).ok_or_else(|| {
                AltgraphError::Parse(format!("CSV file {} is missing column '{}'", path, field))
            })?;
        }

        let records = rows
            .enumerate()
            .map(|(idx, row)| {
                let cell = |col: usize| row.get(columns[col]).cloned().unwrap_or_default();
                RawRecord {
                    row: idx + 1,
                    id: cell(0),
                    category: cell(1),
                    brand: cell(2),
                    price: cell(3),
                    stock: cell(4),
                    tags: RawTags::Delimited(cell(5)),
                }
            })
            .collect();

        Ok(records)
    }
}

/// Split CSV text into rows of fields. Blank lines are skipped.
fn split_rows(content: &str) -> std::result::Result<Vec<Vec<String>>, String> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !row.is_empty() || quoted {
        row.push(field);
        push_row(&mut rows, row);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.len() == 1 && row[0].trim().is_empty() {
        return;
    }
    rows.push(row);
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,category,brand,price,stock,tags";

    #[test]
    fn test_parse_basic_rows() {
        let content = format!(
            "{}\nA,shoes,X,50,false,running\nB,shoes,X,40,true,running;light\n",
            HEADER
        );
        let records = CsvParser.parse(&content, "products.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].id, "A");
        assert_eq!(records[1].row, 2);
        assert_eq!(records[1].price, "40");
        assert_eq!(records[1].tags, RawTags::Delimited("running;light".to_string()));
    }

    #[test]
    fn test_columns_in_any_order_with_extras() {
        let content = "Tags, Stock ,price,notes,brand,category,id\nrunning,true,10,n/a,X,shoes,A\n";
        let records = CsvParser.parse(content, "products.csv").unwrap();
        let record = records[0].parse(';').unwrap();
        assert_eq!(record.id, "A");
        assert_eq!(record.brand, "X");
        assert!(record.in_stock);
        assert_eq!(record.tags, vec!["running"]);
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let content = "id,category,brand,price,stock\nA,shoes,X,50,false\n";
        let err = CsvParser.parse(content, "products.csv").unwrap_err();
        assert!(matches!(err, AltgraphError::Parse(_)));
        assert!(err.to_string().contains("tags"));
    }

    #[test]
    fn test_empty_file_is_parse_error() {
        assert!(CsvParser.parse("", "products.csv").is_err());
    }

    #[test]
    fn test_quoted_fields() {
        let content = format!(
            "{}\n\"A,1\",shoes,\"Brand \"\"Q\"\"\",50,false,\"running; trail\"\n",
            HEADER
        );
        let records = CsvParser.parse(&content, "products.csv").unwrap();
        assert_eq!(records[0].id, "A,1");
        assert_eq!(records[0].brand, "Brand \"Q\"");
        assert_eq!(records[0].tags, RawTags::Delimited("running; trail".to_string()));
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let content = format!("\u{feff}{}\r\n\r\nA,shoes,X,50,false,\r\n\r\n", HEADER);
        let records = CsvParser.parse(&content, "products.csv").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "A");
        assert_eq!(records[0].tags, RawTags::Delimited(String::new()));
    }

    #[test]
    fn test_short_row_yields_empty_cells() {
        let content = format!("{}\nA,shoes,X\n", HEADER);
        let records = CsvParser.parse(&content, "products.csv").unwrap();
        assert_eq!(records[0].price, "");
        assert!(records[0].parse(';').is_err());
    }

    #[test]
    fn test_unterminated_quote() {
        let content = format!("{}\n\"A,shoes,X,50,false,\n", HEADER);
        let err = CsvParser.parse(&content, "products.csv").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }
}
