//! Product rows before and after validation.

use serde::{Deserialize, Serialize};

use crate::error::{AltgraphError, Result};

/// Tags as they appear in the source, before tokenizing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTags {
    /// A single delimited string, e.g. `"running; light"`.
    Delimited(String),
    /// Tags already split by the source format (JSON arrays).
    List(Vec<String>),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::Delimited(String::new())
    }
}

/// One product row exactly as read from the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// 1-based position of the record in its source (header excluded).
    pub row: usize,
    pub id: String,
    pub category: String,
    pub brand: String,
    pub price: String,
    pub stock: String,
    pub tags: RawTags,
}

/// A validated product record, ready for the graph builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub in_stock: bool,
    /// Distinct, trimmed, non-empty tags in first-seen order.
    pub tags: Vec<String>,
}

impl RawRecord {
    /// Validate the row and convert it into a typed record.
    ///
    /// Fails with `MalformedRecord` when an identifier field is blank, the price is
    /// not a finite non-negative number, or the stock flag is not `true`/`false`.
    pub fn parse(&self, tag_delimiter: char) -> Result<ProductRecord> {
        let id = required_field(self.row, "id", &self.id)?;
        let category = required_field(self.row, "category", &self.category)?;
        let brand = required_field(self.row, "brand", &self.brand)?;
        let price = parse_price(self.row, &self.price)?;
        let in_stock = parse_stock(self.row, &self.stock)?;

        let tags = match &self.tags {
            RawTags::Delimited(raw) => parse_tag_list(raw, tag_delimiter),
            RawTags::List(items) => dedup_tags(items.iter().map(String::as_str)),
        };

        Ok(ProductRecord {
            id,
            category,
            brand,
            price,
            in_stock,
            tags,
        })
    }
}

/// Split a delimited tag string: tokens are trimmed, empty tokens dropped,
/// duplicates collapsed keeping the first occurrence.
pub fn parse_tag_list(raw: &str, delimiter: char) -> Vec<String> {
    dedup_tags(raw.split(delimiter))
}

fn dedup_tags<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() || tags.iter().any(|t| t == token) {
            continue;
        }
        tags.push(token.to_string());
    }
    tags
}

fn required_field(row: usize, name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AltgraphError::malformed(row, format!("{} is empty", name)));
    }
    Ok(value.to_string())
}

fn parse_price(row: usize, raw: &str) -> Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AltgraphError::malformed(row, format!("price '{}' is not a number", raw)))?;
    if !price.is_finite() || price < 0.0 {
        return Err(AltgraphError::malformed(
            row,
            format!("price '{}' must be a finite non-negative number", raw),
        ));
    }
    Ok(price)
}

fn parse_stock(row: usize, raw: &str) -> Result<bool> {
    let token = raw.trim();
    if token.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if token.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(AltgraphError::malformed(
            row,
            format!("stock '{}' is not true/false", raw),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(price: &str, stock: &str, tags: &str) -> RawRecord {
        RawRecord {
            row: 3,
            id: "A".to_string(),
            category: "shoes".to_string(),
            brand: "X".to_string(),
            price: price.to_string(),
            stock: stock.to_string(),
            tags: RawTags::Delimited(tags.to_string()),
        }
    }

    #[test]
    fn test_parse_valid_record() {
        let record = raw("49.5", "TRUE", "running;light").parse(';').unwrap();
        assert_eq!(record.id, "A");
        assert_eq!(record.category, "shoes");
        assert_eq!(record.price, 49.5);
        assert!(record.in_stock);
        assert_eq!(record.tags, vec!["running", "light"]);
    }

    #[test]
    fn test_stock_is_case_insensitive() {
        assert!(raw("1", "True", "").parse(';').unwrap().in_stock);
        assert!(!raw("1", "fAlSe", "").parse(';').unwrap().in_stock);
        assert!(!raw("1", " false ", "").parse(';').unwrap().in_stock);
    }

    #[test]
    fn test_unrecognized_stock_is_malformed() {
        let err = raw("1", "yes", "").parse(';').unwrap_err();
        assert!(matches!(err, AltgraphError::MalformedRecord { row: 3, .. }));
        assert!(raw("1", "", "").parse(';').is_err());
        assert!(raw("1", "0", "").parse(';').is_err());
    }

    #[test]
    fn test_non_numeric_price_is_malformed() {
        let err = raw("cheap", "true", "").parse(';').unwrap_err();
        assert!(err.to_string().contains("cheap"));
        assert!(raw("", "true", "").parse(';').is_err());
    }

    #[test]
    fn test_negative_or_non_finite_price_is_malformed() {
        assert!(raw("-1", "true", "").parse(';').is_err());
        assert!(raw("NaN", "true", "").parse(';').is_err());
        assert!(raw("inf", "true", "").parse(';').is_err());
        assert_eq!(raw("0", "true", "").parse(';').unwrap().price, 0.0);
    }

    #[test]
    fn test_blank_identifier_is_malformed() {
        let mut record = raw("1", "true", "");
        record.brand = "  ".to_string();
        let err = record.parse(';').unwrap_err();
        assert!(err.to_string().contains("brand"));
    }

    #[test]
    fn test_tags_trimmed_and_empty_tokens_dropped() {
        let tags = parse_tag_list(" running ;; light ; ;", ';');
        assert_eq!(tags, vec!["running", "light"]);
        assert!(parse_tag_list("", ';').is_empty());
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let tags = parse_tag_list("a;b;a; b", ';');
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let tags = parse_tag_list("a|b;c", '|');
        assert_eq!(tags, vec!["a", "b;c"]);
    }

    #[test]
    fn test_list_tags_normalized() {
        let mut record = raw("1", "true", "");
        record.tags = RawTags::List(vec![" x ".into(), "".into(), "x".into(), "y".into()]);
        assert_eq!(record.parse(';').unwrap().tags, vec!["x", "y"]);
    }
}
