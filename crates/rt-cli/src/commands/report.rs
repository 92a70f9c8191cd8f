//! Report command: builds a query from the arguments, fetches and prints it.
//!
//! Records are printed as pretty JSON, tables as CSV with the server's
//! header row.

use std::io::Write;

use anyhow::{Context, Result};
use rt_core::{Report, ReportClient, ReportKind, ReportQuery};

use crate::ReportArgs;

/// Translates command-line arguments into a query.
pub fn build_query(client: &ReportClient, args: &ReportArgs) -> rt_core::Result<ReportQuery> {
    let mut query = client.query().kind(ReportKind::from(args.kind));

    if let Some(order) = &args.order {
        query = query.order_by(order, args.interval.as_deref())?;
    }
    if let Some(date) = &args.date {
        query = query.date(date)?;
    }
    if let Some(from) = &args.from {
        query = query.from(from)?;
    }
    if let Some(to) = &args.to {
        query = query.to(to)?;
    }
    if let Some(thing) = &args.thing {
        query = query.where_(thing, args.document.as_deref())?;
    }
    query.format(&args.format)
}

pub fn run<W: Write>(writer: &mut W, client: &ReportClient, args: &ReportArgs) -> Result<()> {
    let query = build_query(client, args).context("invalid report query")?;
    tracing::debug!(?query, "built report query");

    let report = query.all().context("failed to fetch report")?;
    render(writer, &report)
}

/// Writes a report in its natural text form.
pub fn render<W: Write>(writer: &mut W, report: &Report) -> Result<()> {
    match report {
        Report::Table(table) => {
            let csv = table.to_csv().context("failed to render CSV")?;
            write!(writer, "{csv}")?;
        }
        Report::Records(_) | Report::Custom(_) => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use insta::assert_snapshot;
    use rt_core::{HttpResponse, QueryKey, Table, Transport};

    use crate::ReportKindArg;

    const BODY: &str = "Rank,Time Spent (seconds),Activity\n1,5130,github.com\n2,90.5,iTerm\n";

    #[derive(Default)]
    struct Canned {
        queries: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl Transport for Canned {
        fn get(&self, _url: &str, query: &[(String, String)]) -> rt_core::Result<HttpResponse> {
            self.queries.lock().unwrap().push(query.to_vec());
            Ok(HttpResponse {
                status: 200,
                body: BODY.to_string(),
            })
        }
    }

    fn client(transport: &Arc<Canned>) -> ReportClient {
        ReportClient::builder()
            .api_key("AK")
            .transport(transport.clone())
            .build()
            .unwrap()
    }

    fn args(kind: ReportKindArg) -> ReportArgs {
        ReportArgs {
            kind,
            order: None,
            interval: None,
            date: None,
            from: None,
            to: None,
            thing: None,
            document: None,
            format: "array".to_string(),
        }
    }

    #[test]
    fn build_query_applies_every_option() {
        let transport = Arc::new(Canned::default());
        let query = build_query(
            &client(&transport),
            &ReportArgs {
                order: Some("time".to_string()),
                interval: Some("day".to_string()),
                from: Some("05/01/2015".to_string()),
                to: Some("2015/05/07".to_string()),
                thing: Some("github.com".to_string()),
                document: Some("README.md".to_string()),
                format: "csv".to_string(),
                ..args(ReportKindArg::Activities)
            },
        )
        .unwrap();

        let params = query.params();
        assert_eq!(params.get(QueryKey::RestrictKind), Some("activity"));
        assert_eq!(params.get(QueryKey::Perspective), Some("interval"));
        assert_eq!(params.get(QueryKey::ResolutionTime), Some("day"));
        assert_eq!(params.get(QueryKey::RestrictBegin), Some("2015-05-01"));
        assert_eq!(params.get(QueryKey::RestrictEnd), Some("2015-05-07"));
        assert_eq!(params.get(QueryKey::RestrictThing), Some("github.com"));
        assert_eq!(params.get(QueryKey::RestrictThingy), Some("README.md"));
        assert_eq!(query.format_name(), "csv");
    }

    #[test]
    fn build_query_rejects_bad_order_before_fetching() {
        let transport = Arc::new(Canned::default());
        let err = build_query(
            &client(&transport),
            &ReportArgs {
                order: Some("bogus".to_string()),
                ..args(ReportKindArg::Overview)
            },
        )
        .unwrap_err();
        assert!(matches!(err, rt_core::Error::InvalidQuery { .. }));
        assert!(transport.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn run_prints_records_as_json() {
        let transport = Arc::new(Canned::default());
        let mut output = Vec::new();
        run(&mut output, &client(&transport), &args(ReportKindArg::Activities)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r#"
        [
          {
            "rank": 1,
            "time_spent_seconds": 5130,
            "activity": "github.com"
          },
          {
            "rank": 2,
            "time_spent_seconds": 90.5,
            "activity": "iTerm"
          }
        ]
        "#);
    }

    #[test]
    fn run_prints_tables_as_csv() {
        let transport = Arc::new(Canned::default());
        let mut output = Vec::new();
        run(
            &mut output,
            &client(&transport),
            &ReportArgs {
                format: "csv".to_string(),
                ..args(ReportKindArg::Overview)
            },
        )
        .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), BODY);
    }

    #[test]
    fn render_custom_reports_as_json() {
        let mut output = Vec::new();
        render(&mut output, &Report::Custom(serde_json::json!({"rows": 2}))).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        {
          "rows": 2
        }
        "#);
    }

    #[test]
    fn render_empty_table_keeps_header_row() {
        let table = Table::new(vec!["Rank".to_string(), "Activity".to_string()], Vec::new());
        let mut output = Vec::new();
        render(&mut output, &Report::Table(table)).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Rank,Activity\n");
    }
}
