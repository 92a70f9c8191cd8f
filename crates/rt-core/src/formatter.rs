//! Output formatters for tabular report responses.
//!
//! The analytics API answers with CSV. The response is parsed once into a
//! [`Table`] and handed to the formatter selected on the query. Two
//! formatters are built in:
//!
//! - `array`: a list of [`Record`]s keyed by symbol-ized headers, with
//!   numeric cells converted to numbers
//! - `csv`: the [`Table`] itself, untouched
//!
//! Hosts add their own formatters through [`FormatterConfig`] or
//! [`FormatterRegistry::register`]; the registry never touches the file
//! system.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

static HEADER_PUNCTUATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\s\w]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+(?:_\d+)*$").unwrap());
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:_\d+)*)?(?:\.\d+(?:_\d+)*)?(?:[eE][+-]?\d+)?$").unwrap()
});

/// A single report row keyed by header, in header order.
pub type Record = Map<String, Value>;

/// A parsed tabular response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    raw_headers: Vec<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parses a CSV body whose first line is the header row.
    pub fn parse(body: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let raw_headers: Vec<String> = reader
            .headers()
            .map_err(|err| Error::InvalidResponse(err.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| Error::InvalidResponse(err.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(raw_headers, rows))
    }

    /// Builds a table from header text and raw cells.
    pub fn new(raw_headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = raw_headers.iter().map(|h| symbolize_header(h)).collect();
        Self {
            raw_headers,
            headers,
            rows,
        }
    }

    /// Symbol-ized header keys, e.g. `time_spent_seconds`.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Header text exactly as the server sent it.
    pub fn raw_headers(&self) -> &[String] {
        &self.raw_headers
    }

    /// Data rows as raw strings.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts every row into a record with numeric cells coerced.
    ///
    /// Short rows yield `null` for the missing trailing cells.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        let value = row.get(idx).map_or(Value::Null, |cell| convert_cell(cell));
                        (header.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }

    /// Renders the table back to CSV with the original header text.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer
            .write_record(&self.raw_headers)
            .map_err(|err| Error::InvalidResponse(err.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|err| Error::InvalidResponse(err.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| Error::InvalidResponse(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| Error::InvalidResponse(err.to_string()))
    }
}

/// Lower-cases a header, drops punctuation and joins words with `_`.
pub fn symbolize_header(header: &str) -> String {
    let lowered = header.to_lowercase();
    let stripped = HEADER_PUNCTUATION_RE.replace_all(&lowered, "");
    WHITESPACE_RE
        .replace_all(stripped.trim(), "_")
        .into_owned()
}

/// Converts integer-looking and float-looking cells to JSON numbers.
///
/// Empty cells become `null`.
pub fn convert_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::String(cell.to_string());
    }
    let digits = trimmed.replace('_', "");

    if INTEGER_RE.is_match(trimmed) {
        if let Ok(int) = digits.parse::<i64>() {
            return Value::Number(int.into());
        }
    }
    if (INTEGER_RE.is_match(trimmed) || FLOAT_RE.is_match(trimmed))
        && trimmed.bytes().any(|b| b.is_ascii_digit())
    {
        if let Some(number) = digits.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(cell.to_string())
}

/// The caller-facing shape of a resolved report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Output of the `array` formatter.
    Records(Vec<Record>),
    /// Output of the `csv` formatter.
    Table(Table),
    /// Output of a host-registered formatter.
    Custom(Value),
}

impl Report {
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Self::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// A named strategy converting a parsed response into a [`Report`].
///
/// Implementations must be stateless with respect to individual reports;
/// one instance is shared by every query that selects it.
pub trait ReportFormatter: Send + Sync {
    /// Name used to select this formatter, matched case-insensitively.
    fn name(&self) -> &str;

    fn format(&self, table: Table) -> Result<Report>;
}

/// Built-in `array` formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayFormatter;

impl ReportFormatter for ArrayFormatter {
    fn name(&self) -> &str {
        "array"
    }

    fn format(&self, table: Table) -> Result<Report> {
        Ok(Report::Records(table.records()))
    }
}

/// Built-in `csv` formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter;

impl ReportFormatter for CsvFormatter {
    fn name(&self) -> &str {
        "csv"
    }

    fn format(&self, table: Table) -> Result<Report> {
        Ok(Report::Table(table))
    }
}

/// Formatters supplied by the host, merged over the built-ins.
#[derive(Clone, Default)]
pub struct FormatterConfig {
    formatters: Vec<Arc<dyn ReportFormatter>>,
}

impl fmt::Debug for FormatterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterConfig")
            .field("formatters", &names(&self.formatters))
            .finish()
    }
}

impl FormatterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a formatter, returning the config for chaining.
    #[must_use]
    pub fn with(mut self, formatter: impl ReportFormatter + 'static) -> Self {
        self.push(Arc::new(formatter));
        self
    }

    pub fn push(&mut self, formatter: Arc<dyn ReportFormatter>) {
        self.formatters.push(formatter);
    }

    pub fn formatters(&self) -> &[Arc<dyn ReportFormatter>] {
        &self.formatters
    }

    /// Drops every host formatter, returning the config to its defaults.
    pub fn reset(&mut self) {
        self.formatters.clear();
    }
}

/// Name-to-formatter lookup.
#[derive(Clone)]
pub struct FormatterRegistry {
    config: FormatterConfig,
    formatters: Vec<Arc<dyn ReportFormatter>>,
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formatters", &self.all())
            .finish_non_exhaustive()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterRegistry {
    /// A registry holding only the built-in formatters.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        let formatters = resolve(&config);
        Self { config, formatters }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Registers a host formatter; it survives later reloads.
    pub fn register(&mut self, formatter: impl ReportFormatter + 'static) {
        self.config.push(Arc::new(formatter));
        self.reload();
    }

    /// Rebuilds the active set from the built-ins and the config.
    pub fn reload(&mut self) {
        self.formatters = resolve(&self.config);
    }

    /// Removes host formatters, leaving the built-ins.
    pub fn reset(&mut self) {
        self.config.reset();
        self.reload();
    }

    /// Names of every available formatter.
    pub fn all(&self) -> Vec<String> {
        names(&self.formatters)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Looks up a formatter by name, ignoring case.
    pub fn find(&self, name: &str) -> Result<Arc<dyn ReportFormatter>> {
        self.position(name)
            .map(|idx| Arc::clone(&self.formatters[idx]))
            .ok_or_else(|| Error::InvalidFormat {
                name: name.to_string(),
            })
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.formatters
            .iter()
            .position(|formatter| formatter.name().to_lowercase() == wanted)
    }
}

fn resolve(config: &FormatterConfig) -> Vec<Arc<dyn ReportFormatter>> {
    let mut formatters: Vec<Arc<dyn ReportFormatter>> =
        vec![Arc::new(ArrayFormatter), Arc::new(CsvFormatter)];
    for formatter in config.formatters() {
        let name = formatter.name().to_lowercase();
        match formatters
            .iter()
            .position(|existing| existing.name().to_lowercase() == name)
        {
            Some(idx) => formatters[idx] = Arc::clone(formatter),
            None => formatters.push(Arc::clone(formatter)),
        }
    }
    formatters
}

fn names(formatters: &[Arc<dyn ReportFormatter>]) -> Vec<String> {
    formatters.iter().map(|f| f.name().to_string()).collect()
}
