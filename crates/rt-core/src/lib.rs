//! Client library for the RescueTime analytics API.
//!
//! This crate covers the full report pipeline:
//! - Query building: a chainable [`ReportQuery`] translated into wire parameters
//! - Requesting: one blocking GET per resolution, with soft-error detection
//! - Formatting: a [`FormatterRegistry`] turning CSV responses into records,
//!   tables, or host-defined shapes

mod client;
pub mod date;
mod error;
pub mod formatter;
mod productivity;
pub mod query;
pub mod requester;

pub use client::{ReportClient, ReportClientBuilder};
pub use date::{DateInput, normalize};
pub use error::{Error, Result};
pub use formatter::{
    ArrayFormatter, CsvFormatter, FormatterConfig, FormatterRegistry, Record, Report,
    ReportFormatter, Table,
};
pub use productivity::ProductivityLevel;
pub use query::{Interval, Order, QueryKey, QueryParameters, ReportKind, ReportQuery};
pub use requester::{HttpResponse, HttpTransport, RequestParams, Requester, Transport};
