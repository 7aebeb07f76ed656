//! Response body decoders.
//!
//! JSON bodies are decoded with `serde_json`. Tabular bodies are first turned
//! into text with the requested encoding (WHATWG labels, via `encoding_rs`)
//! and then handed to a [`TabularDecoder`] together with the caller's
//! [`TabularOptions`], untouched.

use std::borrow::Cow;

use encoding_rs::Encoding;
use log::debug;
use serde::de::DeserializeOwned;

use nssp_common::{Table, TabularOptions};

use crate::error::ClientError;

/// Encoding used for tabular bodies unless the caller picks another.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// How a response body should be decoded.
#[derive(Debug, Clone, PartialEq, Default)]
#[non_exhaustive]
pub enum DataFormat {
    /// Structured JSON.
    #[default]
    Json,
    /// Delimited text, decoded from bytes with `encoding`.
    Tabular {
        /// Encoding label, e.g. `utf-8`, `latin1`, `utf-16le`.
        encoding: String,
        /// Options forwarded to the tabular decoder.
        options: TabularOptions,
    },
}

impl DataFormat {
    /// Tabular decoding with UTF-8 and no options.
    #[must_use]
    pub fn tabular() -> Self {
        Self::Tabular {
            encoding: DEFAULT_ENCODING.to_string(),
            options: TabularOptions::new(),
        }
    }

    /// Replaces the encoding of a tabular format. JSON is left unchanged.
    #[must_use]
    pub fn with_encoding(self, label: impl Into<String>) -> Self {
        match self {
            Self::Tabular { options, .. } => Self::Tabular {
                encoding: label.into(),
                options,
            },
            json @ Self::Json => json,
        }
    }

    /// Replaces the options of a tabular format. JSON is left unchanged.
    #[must_use]
    pub fn with_options(self, options: TabularOptions) -> Self {
        match self {
            Self::Tabular { encoding, .. } => Self::Tabular { encoding, options },
            json @ Self::Json => json,
        }
    }

    /// Whether this format decodes delimited text.
    #[must_use]
    pub const fn is_tabular(&self) -> bool {
        matches!(self, Self::Tabular { .. })
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiData {
    /// Body decoded as JSON.
    Json(serde_json::Value),
    /// Body decoded as delimited text.
    Table(Table),
}

impl ApiData {
    /// The JSON value, if this is JSON data.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Table(_) => None,
        }
    }

    /// The table, if this is tabular data.
    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Json(_) => None,
        }
    }

    /// Converts into the JSON value, if this is JSON data.
    #[must_use]
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Table(_) => None,
        }
    }

    /// Converts into the table, if this is tabular data.
    #[must_use]
    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Json(_) => None,
        }
    }
}

/// Turns delimited text into a [`Table`].
///
/// Implementations receive the caller's options exactly as given and decide
/// for themselves which keys apply.
pub trait TabularDecoder: Send + Sync {
    /// Parses `text` into a table.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the text is malformed or an option value is
    /// unusable.
    fn decode(&self, text: &str, options: &TabularOptions) -> Result<Table, ClientError>;
}

/// CSV decoder backed by the `csv` crate.
///
/// Recognized options:
///
/// | key           | type   | default |
/// |---------------|--------|---------|
/// | `delimiter`   | string | `,`     |
/// | `quote`       | string | `"`     |
/// | `comment`     | string | none    |
/// | `has_headers` | bool   | `true`  |
/// | `flexible`    | bool   | `false` |
/// | `trim`        | bool   | `false` |
///
/// Other keys are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder;

impl CsvDecoder {
    fn single_byte(options: &TabularOptions, key: &str) -> Result<Option<u8>, ClientError> {
        let Some(value) = options.get(key) else {
            return Ok(None);
        };
        match value.as_str().map(str::as_bytes) {
            Some([byte]) => Ok(Some(*byte)),
            _ => Err(ClientError::Decode(format!(
                "option '{key}' must be a single-byte string, got {value}"
            ))),
        }
    }
}

impl TabularDecoder for CsvDecoder {
    fn decode(&self, text: &str, options: &TabularOptions) -> Result<Table, ClientError> {
        let has_headers = options.get_bool("has_headers").unwrap_or(true);

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(has_headers)
            .flexible(options.get_bool("flexible").unwrap_or(false))
            .comment(Self::single_byte(options, "comment")?);
        if let Some(delimiter) = Self::single_byte(options, "delimiter")? {
            builder.delimiter(delimiter);
        }
        if let Some(quote) = Self::single_byte(options, "quote")? {
            builder.quote(quote);
        }
        if options.get_bool("trim").unwrap_or(false) {
            builder.trim(csv::Trim::All);
        }

        let mut reader = builder.from_reader(text.as_bytes());

        let headers = if has_headers {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        if headers.is_empty() && rows.is_empty() {
            return Err(ClientError::Decode("no columns to parse".to_string()));
        }

        debug!(
            "Decoded table with {} columns and {} rows",
            headers.len(),
            rows.len()
        );
        Ok(Table::new(headers, rows))
    }
}

/// Decodes a JSON body.
///
/// # Errors
///
/// Returns [`ClientError::Json`] if the body is not valid JSON for `T`.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decodes `body` as text in the encoding named by `label`.
///
/// Decoding is strict: malformed input is an error rather than being
/// replaced. A byte order mark is kept as part of the text.
///
/// # Errors
///
/// Returns [`ClientError::UnknownEncoding`] for an unrecognized label and
/// [`ClientError::Decode`] for bytes that are invalid in that encoding.
pub fn decode_text<'a>(body: &'a [u8], label: &str) -> Result<Cow<'a, str>, ClientError> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ClientError::UnknownEncoding(label.to_string()))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            ClientError::Decode(format!("body is not valid {}", encoding.name()))
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn test_decode_json() {
        let value: serde_json::Value = decode_json(br#"{"count": 3, "rows": [1, 2]}"#).unwrap();
        assert_eq!(value, serde_json::json!({ "count": 3, "rows": [1, 2] }));

        let err = decode_json::<serde_json::Value>(b"not json").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_decode_text_utf8() {
        let text = decode_text("café".as_bytes(), DEFAULT_ENCODING).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn test_decode_text_latin1() {
        let body = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(&body, "latin1").unwrap(), "café");

        // The same bytes are not valid UTF-8
        let err = decode_text(&body, "utf-8").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_decode_text_multibyte_depends_on_encoding() {
        let body = "é".as_bytes();
        assert_eq!(decode_text(body, "utf-8").unwrap(), "é");
        assert_eq!(decode_text(body, "windows-1252").unwrap(), "Ã©");
    }

    #[test]
    fn test_decode_text_unknown_label() {
        let err = decode_text(b"abc", "klingon").unwrap_err();
        assert!(matches!(err, ClientError::UnknownEncoding(label) if label == "klingon"));
    }

    #[test]
    fn test_csv_with_headers() {
        let table = CsvDecoder
            .decode("date,count\n2024-01-01,12\n2024-01-02,7\n", &TabularOptions::new())
            .unwrap();

        assert_eq!(table.headers, vec!["date", "count"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "count"), Some("7"));
    }

    #[test]
    fn test_csv_without_headers() {
        let options = TabularOptions::new().with("has_headers", false);
        let table = CsvDecoder.decode("a,b\nc,d\n", &options).unwrap();

        assert!(table.headers.is_empty());
        assert_eq!(table.rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_csv_delimiter_and_trim() {
        let options = TabularOptions::new()
            .with("delimiter", ";")
            .with("trim", true);
        let table = CsvDecoder.decode("name ; value\n x ; 1 \n", &options).unwrap();

        assert_eq!(table.headers, vec!["name", "value"]);
        assert_eq!(table.rows, vec![vec!["x", "1"]]);
    }

    #[test]
    fn test_csv_comment_lines() {
        let options = TabularOptions::new().with("comment", "#");
        let table = CsvDecoder
            .decode("a,b\n# generated 2024-01-01\n1,2\n", &options)
            .unwrap();

        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_csv_ignores_unknown_options() {
        let options = TabularOptions::new()
            .with("na_values", serde_json::json!(["NA"]))
            .with("parse_dates", true);
        let table = CsvDecoder.decode("a\nNA\n", &options).unwrap();

        assert_eq!(table.rows, vec![vec!["NA"]]);
    }

    #[test]
    fn test_csv_ragged_rows() {
        let err = CsvDecoder
            .decode("a,b\n1,2,3\n", &TabularOptions::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::Csv(_)));
        assert!(err.is_parse_error());

        let options = TabularOptions::new().with("flexible", true);
        let table = CsvDecoder.decode("a,b\n1,2,3\n", &options).unwrap();
        assert_eq!(table.rows, vec![vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_csv_empty_body_is_an_error() {
        for text in ["", "\n"] {
            let err = CsvDecoder.decode(text, &TabularOptions::new()).unwrap_err();
            assert!(matches!(err, ClientError::Decode(ref msg) if msg == "no columns to parse"));
            assert!(err.is_parse_error());
        }

        let options = TabularOptions::new().with("has_headers", false);
        let err = CsvDecoder.decode("", &options).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_csv_header_only_is_an_empty_table() {
        let table = CsvDecoder.decode("a,b\n", &TabularOptions::new()).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_csv_bad_delimiter_option() {
        let options = TabularOptions::new().with("delimiter", "::");
        let err = CsvDecoder.decode("a::b\n", &options).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_data_format_builders() {
        let format = DataFormat::tabular()
            .with_encoding("latin1")
            .with_options(TabularOptions::new().with("delimiter", "|"));

        assert!(format.is_tabular());
        let DataFormat::Tabular { encoding, options } = format else {
            panic!("expected tabular format");
        };
        assert_eq!(encoding, "latin1");
        assert_eq!(options.get_str("delimiter"), Some("|"));

        let json = DataFormat::Json.with_encoding("latin1");
        assert_eq!(json, DataFormat::Json);
    }

    #[test]
    fn test_api_data_accessors() {
        let json = ApiData::Json(serde_json::json!([1]));
        assert!(json.as_json().is_some());
        assert!(json.as_table().is_none());
        assert_eq!(json.into_json(), Some(serde_json::json!([1])));

        let table = ApiData::Table(Table::default());
        assert!(table.as_table().is_some());
        assert!(table.clone().into_json().is_none());
        assert_eq!(table.into_table(), Some(Table::default()));
    }
}
