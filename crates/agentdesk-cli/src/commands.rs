//! Subcommand implementations.

use std::path::{Path, PathBuf};

use agentdesk_core::{AppConfig, BookingDraft, Credentials, FetchError, Record, ResourceKind};
use agentdesk_query::{ColumnSpec, QueryError};
use agentdesk_store::{DerivedView, JsonDirSource, ResourceTab, ViewStatus};

use crate::cli::{BookingArgs, Cli, ViewArgs};
use crate::error::CliError;

// =============================================================================
// Session
// =============================================================================

/// Everything a command needs besides its own arguments.
pub struct Session {
    pub source: JsonDirSource,
    pub credentials: Credentials,
    pub export_dir: PathBuf,
}

impl Session {
    pub fn new(data_dir: impl Into<PathBuf>, credentials: Credentials, export_dir: PathBuf) -> Self {
        Self {
            source: JsonDirSource::new(data_dir),
            credentials,
            export_dir,
        }
    }

    /// Combine flags with the config file. Flags win.
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Result<Self, CliError> {
        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| config.data.dir.clone())
            .ok_or(CliError::NoDataDir)?;
        let agent_id = cli
            .agent_id
            .clone()
            .or_else(|| config.session.agent_id.clone())
            .unwrap_or_default();
        let token = cli.token.clone().unwrap_or_default();

        let credentials = Credentials::new(agent_id, token);
        if credentials.is_anonymous() {
            tracing::warn!("No agent id or token given, requests are anonymous");
        }

        Ok(Self::new(data_dir, credentials, config.export.dir.clone()))
    }
}

/// Load `--config`, or the default config file if there is one.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    Ok(config)
}

// =============================================================================
// Commands
// =============================================================================

/// Fetch a resource and render the view as an aligned text table.
pub async fn list(session: &Session, args: &ViewArgs) -> Result<String, CliError> {
    let tab = open_tab(session, args).await?;
    let view = ready(tab.view())?;
    tracing::info!("{}: {} records", args.resource.label(), view.len());
    Ok(render_table(&view, &tab.engine().schema().columns))
}

/// Write the view's CSV report and return its path.
pub async fn export(
    session: &Session,
    args: &ViewArgs,
    out_dir: Option<&Path>,
) -> Result<PathBuf, CliError> {
    let tab = open_tab(session, args).await?;
    ready(tab.view())?;
    let file = tab.export()?;

    let dir = out_dir.unwrap_or(session.export_dir.as_path());
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CliError::Io(format!("{}: {}", dir.display(), e)))?;
    let path = dir.join(&file.file_name);
    tokio::fs::write(&path, &file.contents)
        .await
        .map_err(|e| CliError::Io(format!("{}: {}", path.display(), e)))?;

    tracing::info!(
        "Wrote {} ({} bytes, {})",
        path.display(),
        file.contents.len(),
        file.mime_type
    );
    Ok(path)
}

/// Validate the form, submit it, and return the stored booking along with the
/// refreshed view.
pub async fn add_booking(
    session: &Session,
    args: &BookingArgs,
) -> Result<(Record, DerivedView), CliError> {
    let draft = BookingDraft {
        client_name: args.client_name.clone(),
        destination: args.destination.clone(),
        start_date: args.start.clone(),
        end_date: args.end.clone(),
        amount_earned: args.amount.clone(),
    };
    let booking = draft.validate()?;
    let payload = booking.to_payload(&session.credentials);

    let tab = ResourceTab::new(ResourceKind::Bookings)?;
    let created = tab
        .create(&session.source, &session.credentials, payload)
        .await?;
    Ok((created, tab.view()))
}

// =============================================================================
// Helpers
// =============================================================================

async fn open_tab(session: &Session, args: &ViewArgs) -> Result<ResourceTab, CliError> {
    let mut tab = ResourceTab::new(args.resource)?;
    if let Some(search) = &args.search {
        tab.set_search(search.as_str());
    }
    tab.set_date_start(args.from);
    tab.set_date_end(args.to);
    if let Some(sort) = &args.sort {
        tab.set_sort(&sort.field, sort.direction)?;
    }

    tab.refetch(&session.source, &session.credentials).await;
    Ok(tab)
}

/// Turn a failed or rejected view into an error.
fn ready(view: DerivedView) -> Result<DerivedView, CliError> {
    match &view.status {
        ViewStatus::Ready => Ok(view),
        ViewStatus::NetworkFailed(msg) => Err(FetchError::Network(msg.clone()).into()),
        ViewStatus::DecodeFailed(msg) => Err(FetchError::Decode(msg.clone()).into()),
        ViewStatus::InvalidDateRange { start, end } => Err(QueryError::InvalidDateRange {
            start: *start,
            end: *end,
        }
        .into()),
        ViewStatus::QueryFailed(e) => Err(e.clone().into()),
        ViewStatus::NotLoaded => Err(FetchError::Network("no data loaded".to_string()).into()),
    }
}

/// Left-aligned columns separated by two spaces.
pub fn render_table(view: &DerivedView, columns: &[ColumnSpec]) -> String {
    let rows: Vec<Vec<String>> = view
        .records
        .iter()
        .map(|record| columns.iter().map(|c| c.render(record)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
    push_row(&mut out, header.iter().copied(), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    if rows.is_empty() {
        out.push_str("(no matching records)\n");
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_core::DraftError;
    use agentdesk_query::SortKey;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;

    fn record_ids(records: &[Arc<Record>]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.id())
            .map(|id| id.0)
            .collect()
    }

    fn session(dir: &Path) -> Session {
        Session::new(
            dir,
            Credentials::new("agent-7", "secret"),
            dir.join("reports"),
        )
    }

    fn seed_bookings(dir: &Path) {
        let body = json!([
            {"_id": "b1", "name": "Ravi", "start_date": "2024-01-10",
             "end_date": "2024-01-14", "amt_earned": 500},
            {"_id": "b2", "name": "Sunita, Rao", "start_date": "2024-02-05",
             "end_date": "2024-02-09", "amt_earned": 900},
        ]);
        std::fs::write(dir.join("bookings.json"), body.to_string()).unwrap();
    }

    fn view_args(resource: ResourceKind) -> ViewArgs {
        ViewArgs {
            resource,
            search: None,
            from: None,
            to: None,
            sort: None,
        }
    }

    #[tokio::test]
    async fn test_list_renders_table() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());

        let out = list(&session(dir.path()), &view_args(ResourceKind::Bookings))
            .await
            .unwrap();
        insta::assert_snapshot!(out, @r###"
        Booking ID  Client Name  Start Date  End Date    Amount Earned
        b2          Sunita, Rao  2024-02-05  2024-02-09  900
        b1          Ravi         2024-01-10  2024-01-14  500
        "###);
    }

    #[tokio::test]
    async fn test_list_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());
        let mut args = view_args(ResourceKind::Bookings);
        args.search = Some("meera".to_string());

        let out = list(&session(dir.path()), &args).await.unwrap();
        assert!(out.ends_with("(no matching records)\n"));
        assert_eq!(out.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_list_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = list(&session(dir.path()), &view_args(ResourceKind::Vouchers)).await;
        assert!(matches!(result, Err(CliError::Fetch(FetchError::Network(_)))));
    }

    #[tokio::test]
    async fn test_list_rejects_inverted_range() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());
        let mut args = view_args(ResourceKind::Bookings);
        args.from = NaiveDate::from_ymd_opt(2024, 3, 1);
        args.to = NaiveDate::from_ymd_opt(2024, 2, 1);

        let result = list(&session(dir.path()), &args).await;
        assert!(matches!(
            result,
            Err(CliError::Query(QueryError::InvalidDateRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_rejects_unsortable_column() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());
        let mut args = view_args(ResourceKind::Bookings);
        args.sort = Some(SortKey::new("name"));

        let result = list(&session(dir.path()), &args).await;
        assert!(matches!(
            result,
            Err(CliError::Query(QueryError::UnknownSortKey(_)))
        ));
    }

    #[tokio::test]
    async fn test_export_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());
        let mut args = view_args(ResourceKind::Bookings);
        args.sort = Some(SortKey::ascending("amt_earned"));

        let path = export(&session(dir.path()), &args, None).await.unwrap();
        assert_eq!(path, dir.path().join("reports").join("bookings-report.csv"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Booking ID,Client Name,Start Date,End Date,Amount Earned\n\
             b1,Ravi,2024-01-10,2024-01-14,500\n\
             b2,\"Sunita, Rao\",2024-02-05,2024-02-09,900\n"
        );
    }

    #[tokio::test]
    async fn test_export_reports_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = export(
            &session(dir.path()),
            &view_args(ResourceKind::Bookings),
            Some(blocker.as_path()),
        )
        .await;
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_ready_rejects_failed_evaluation() {
        let view = DerivedView {
            records: Vec::new(),
            status: ViewStatus::QueryFailed(QueryError::UnknownSortKey("voucherLink".into())),
            store_seq: 1,
        };
        assert!(matches!(
            ready(view),
            Err(CliError::Query(QueryError::UnknownSortKey(_)))
        ));
    }

    #[tokio::test]
    async fn test_add_booking_then_refetch() {
        let dir = tempfile::tempdir().unwrap();
        seed_bookings(dir.path());
        let args = BookingArgs {
            client_name: "Meera".to_string(),
            destination: "Goa".to_string(),
            start: "2024-03-01".to_string(),
            end: "2024-03-05".to_string(),
            amount: "1200".to_string(),
        };

        let (created, view) = add_booking(&session(dir.path()), &args).await.unwrap();
        assert_eq!(created.text("agent_id").as_deref(), Some("agent-7"));
        assert!(created.id().is_some());

        let ids = record_ids(&view.records);
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], created.id().unwrap().0);
        assert_eq!(&ids[1..], ["b2", "b1"]);
    }

    #[tokio::test]
    async fn test_add_booking_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = BookingArgs {
            client_name: "Meera".to_string(),
            destination: "Goa".to_string(),
            start: "2024-03-05".to_string(),
            end: "2024-03-01".to_string(),
            amount: "1200".to_string(),
        };

        let result = add_booking(&session(dir.path()), &args).await;
        assert!(matches!(
            result,
            Err(CliError::Draft(DraftError::EndBeforeStart))
        ));
        assert!(!dir.path().join("bookings.json").exists());
    }

    #[test]
    fn test_resolve_prefers_flags() {
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "agentdesk",
            "--data-dir",
            "/flag/data",
            "--agent-id",
            "flag-agent",
            "list",
            "bookings",
        ])
        .unwrap();
        let config = AppConfig::from_toml(
            "[data]\ndir = \"/config/data\"\n[session]\nagent_id = \"config-agent\"\n",
        )
        .unwrap();

        let session = Session::resolve(&cli, &config).unwrap();
        assert_eq!(session.source.root(), Path::new("/flag/data"));
        assert_eq!(session.credentials.agent_id, "flag-agent");
        assert!(!session.credentials.is_anonymous());
    }

    #[test]
    fn test_resolve_without_identity_is_anonymous() {
        use clap::Parser;

        let cli =
            Cli::try_parse_from(["agentdesk", "--data-dir", "/d", "list", "bookings"]).unwrap();
        let session = Session::resolve(&cli, &AppConfig::default()).unwrap();
        assert!(session.credentials.is_anonymous());
    }

    #[test]
    fn test_resolve_requires_data_dir() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["agentdesk", "list", "bookings"]).unwrap();
        assert!(matches!(
            Session::resolve(&cli, &AppConfig::default()),
            Err(CliError::NoDataDir)
        ));
    }
}
