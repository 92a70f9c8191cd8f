//! Chainable report query builder.
//!
//! A [`ReportQuery`] accumulates wire parameters through builder calls and
//! resolves them with [`ReportQuery::all`]. Builder calls consume the query
//! and hand back the extended one; later terms overwrite earlier terms for
//! the same key. Cloning gives an independent copy.
//!
//! ```no_run
//! # fn main() -> rt_core::Result<()> {
//! let client = rt_core::ReportClient::new("API_KEY")?;
//! let records = client
//!     .activities()
//!     .where_("github.com", None)?
//!     .order_by("rank", None)?
//!     .records()?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::date::{self, DateInput};
use crate::error::{Error, Result};
use crate::formatter::{FormatterRegistry, Record, Report, Table};
use crate::requester::{KEY_PARAM, RequestParams, Requester};

/// Parameters sent with every request.
pub const BASE_PARAMS: [(&str, &str); 3] =
    [("format", "csv"), ("operation", "select"), ("version", "0")];

/// Output format used until [`ReportQuery::format`] is called.
pub const DEFAULT_FORMAT: &str = "array";

/// Level of aggregation for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Overview,
    Category,
    Activity,
    Productivity,
    Efficiency,
}

impl ReportKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Category => "category",
            Self::Activity => "activity",
            Self::Productivity => "productivity",
            Self::Efficiency => "efficiency",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordering axis of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Chronological; sent as the `interval` perspective.
    Time,
    Rank,
    Member,
}

impl Order {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Rank => "rank",
            Self::Member => "member",
        }
    }

    /// Value of the `perspective` wire parameter.
    pub const fn perspective(&self) -> &'static str {
        match self {
            Self::Time => "interval",
            Self::Rank => "rank",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Self::Time),
            "rank" => Ok(Self::Rank),
            "member" => Ok(Self::Member),
            _ => Err(Error::query(format!(
                "{s} is not a valid order (expected time, rank or member)"
            ))),
        }
    }
}

/// Time-bucket granularity for chronological reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Interval {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(Error::query(format!(
                "{s} is not a valid interval (expected minute, hour, day, week or month)"
            ))),
        }
    }
}

/// Wire keys set by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryKey {
    RestrictKind,
    Perspective,
    ResolutionTime,
    RestrictBegin,
    RestrictEnd,
    RestrictThing,
    RestrictThingy,
}

impl QueryKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RestrictKind => "restrict_kind",
            Self::Perspective => "perspective",
            Self::ResolutionTime => "resolution_time",
            Self::RestrictBegin => "restrict_begin",
            Self::RestrictEnd => "restrict_end",
            Self::RestrictThing => "restrict_thing",
            Self::RestrictThingy => "restrict_thingy",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder-derived wire parameters. Unset keys are absent, never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    values: BTreeMap<QueryKey, String>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`; an empty value clears it.
    pub fn set(&mut self, key: QueryKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    /// Sets `key` when `value` is present, clears it otherwise.
    pub fn set_opt(&mut self, key: QueryKey, value: Option<impl Into<String>>) {
        match value {
            Some(value) => self.set(key, value),
            None => self.clear(key),
        }
    }

    pub fn clear(&mut self, key: QueryKey) {
        self.values.remove(&key);
    }

    pub fn get(&self, key: QueryKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Applies `other` on top of `self`; `other` wins on shared keys.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(*key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (QueryKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Full parameter set for a request: base parameters, builder terms,
    /// then the API key when one is given.
    pub fn to_request_params(&self, api_key: Option<&str>) -> RequestParams {
        let mut params: RequestParams = BASE_PARAMS
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        for (key, value) in self.iter() {
            params.insert(key.as_str().to_string(), value.to_string());
        }
        if let Some(api_key) = api_key.filter(|key| !key.is_empty()) {
            params.insert(KEY_PARAM.to_string(), api_key.to_string());
        }
        params
    }
}

/// An accumulated report request.
#[derive(Clone)]
pub struct ReportQuery {
    params: QueryParameters,
    format: String,
    api_key: Option<String>,
    requester: Requester,
    formatters: Arc<FormatterRegistry>,
}

impl fmt::Debug for ReportQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportQuery")
            .field("params", &self.params)
            .field("format", &self.format)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ReportQuery {
    pub(crate) fn new(
        api_key: Option<String>,
        requester: Requester,
        formatters: Arc<FormatterRegistry>,
    ) -> Self {
        Self {
            params: QueryParameters::new(),
            format: DEFAULT_FORMAT.to_string(),
            api_key,
            requester,
            formatters,
        }
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    /// Name of the selected output formatter.
    pub fn format_name(&self) -> &str {
        &self.format
    }

    /// Sets the report kind. Efficiency reports are always chronological.
    #[must_use]
    pub fn kind(mut self, kind: ReportKind) -> Self {
        self.params.set(QueryKey::RestrictKind, kind.as_str());
        if kind == ReportKind::Efficiency {
            self.params.set(QueryKey::Perspective, Order::Time.perspective());
        }
        self
    }

    #[must_use]
    pub fn overview(self) -> Self {
        self.kind(ReportKind::Overview)
    }

    #[must_use]
    pub fn categories(self) -> Self {
        self.kind(ReportKind::Category)
    }

    #[must_use]
    pub fn activities(self) -> Self {
        self.kind(ReportKind::Activity)
    }

    #[must_use]
    pub fn productivity(self) -> Self {
        self.kind(ReportKind::Productivity)
    }

    #[must_use]
    pub fn efficiency(self) -> Self {
        self.kind(ReportKind::Efficiency)
    }

    /// Orders the report by `time`, `rank` or `member`, optionally bucketed
    /// by `minute`, `hour`, `day`, `week` or `month`.
    pub fn order_by(self, order: &str, interval: Option<&str>) -> Result<Self> {
        let order = order.parse::<Order>()?;
        let interval = interval.map(str::parse::<Interval>).transpose()?;
        Ok(self.order(order, interval))
    }

    /// Typed form of [`order_by`](Self::order_by).
    #[must_use]
    pub fn order(mut self, order: Order, interval: Option<Interval>) -> Self {
        self.params.set(QueryKey::Perspective, order.perspective());
        self.params.set_opt(QueryKey::ResolutionTime, interval.map(|i| i.as_str()));
        self
    }

    /// Restricts the report to a single day.
    pub fn date(mut self, date: impl Into<DateInput>) -> Result<Self> {
        let day = date::normalize(date)?;
        self.params.set(QueryKey::RestrictBegin, day.clone());
        self.params.set(QueryKey::RestrictEnd, day);
        Ok(self)
    }

    /// Sets the first day of the report range.
    pub fn from(mut self, date: impl Into<DateInput>) -> Result<Self> {
        self.params.set(QueryKey::RestrictBegin, date::normalize(date)?);
        Ok(self)
    }

    /// Sets the last day of the report range.
    ///
    /// The server requires a start day as well; a query with only an end
    /// day is rejected when resolved.
    pub fn to(mut self, date: impl Into<DateInput>) -> Result<Self> {
        self.params.set(QueryKey::RestrictEnd, date::normalize(date)?);
        Ok(self)
    }

    /// Restricts the report to one activity or category, and optionally to
    /// one document within it (activity reports only).
    pub fn where_(mut self, name: impl Into<String>, document: Option<&str>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument {
                argument: "name",
                reason: "an activity or category name is required",
            });
        }
        self.params.set(QueryKey::RestrictThing, name);
        self.params.set_opt(QueryKey::RestrictThingy, document);
        Ok(self)
    }

    /// Selects the output formatter by name.
    pub fn format(mut self, name: &str) -> Result<Self> {
        if !self.formatters.contains(name) {
            return Err(Error::InvalidFormat {
                name: name.to_string(),
            });
        }
        self.format = name.to_string();
        Ok(self)
    }

    /// Parameters this query would send, including the API key.
    pub fn request_params(&self) -> RequestParams {
        self.params.to_request_params(self.api_key.as_deref())
    }

    /// Fetches the report and parses it into a [`Table`].
    pub fn table(&self) -> Result<Table> {
        let body = self.requester.get(&self.request_params())?;
        Table::parse(&body)
    }

    /// Fetches the report and applies the selected formatter.
    ///
    /// Every call issues a new request.
    pub fn all(&self) -> Result<Report> {
        let formatter = self.formatters.find(&self.format)?;
        let table = self.table()?;
        tracing::debug!(
            format = formatter.name(),
            rows = table.len(),
            "formatting report"
        );
        formatter.format(table)
    }

    /// Fetches the report as records, regardless of the selected format.
    pub fn records(&self) -> Result<Vec<Record>> {
        Ok(self.table()?.records())
    }
}
