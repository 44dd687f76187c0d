/// Integration tests for the alert dashboard path
///
/// Tests verify:
/// 1. Demo roster and tickets round-trip through the JSON file stores
/// 2. Client alerts sync into the append-only alert log exactly once
/// 3. Aggregation, severity totals and the filter/sort view agree
/// 4. The live monitor feeds breaches from a simulated plant
///
/// All stores live in a temporary directory; no network access is needed.
///
/// Run with: cargo test --test alert_dashboard_integration

use chrono::{DateTime, Duration, TimeZone, Utc};
use etpmon_service::analysis::aggregate::{aggregate, severity_totals};
use etpmon_service::analysis::buckets::TimeRangePreset;
use etpmon_service::analysis::view::{AlertQuery, SortOrder, owner_names};
use etpmon_service::clients::{Client, ClientRoster, demo_roster};
use etpmon_service::config::MonitorConfig;
use etpmon_service::ingest::simulator::ReadingSimulator;
use etpmon_service::model::{Alert, AlertType, MonitorError};
use etpmon_service::monitor::LiveMonitor;
use etpmon_service::store::{AlertLog, JsonFileStore, RecordStore, StoreError};
use etpmon_service::tickets::{
    Ticket, TicketDesk, TicketPriority, TicketQuery, TicketStatus, demo_tickets,
};
use std::time::Duration as StdDuration;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap()
}

struct Workspace {
    _dir: tempfile::TempDir,
    config: MonitorConfig,
}

fn setup_workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let toml = format!(
        "[storage]\ndata_dir = {:?}\n\n[monitor]\nplant = \"Test Plant\"\nseed = 21\n",
        dir.path().join("data").display().to_string()
    );
    let config = MonitorConfig::from_toml_str(&toml).expect("valid test config");
    Workspace { _dir: dir, config }
}

fn seeded_roster(ws: &Workspace) -> ClientRoster<JsonFileStore<Client>> {
    let store = JsonFileStore::<Client>::new(ws.config.storage.clients_path());
    store.save(&demo_roster(fixed_now())).expect("seed clients");
    ClientRoster::new(store)
}

fn alert_log(ws: &Workspace) -> AlertLog<JsonFileStore<Alert>> {
    AlertLog::new(JsonFileStore::new(ws.config.storage.alerts_path()))
}

fn alert(id: &str, alert_type: AlertType, timestamp: DateTime<Utc>) -> Alert {
    Alert {
        id: id.to_string(),
        alert_type,
        message: format!("alert {}", id),
        timestamp,
        owner_id: "1".to_string(),
        owner_name: "Sunshine Group".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[test]
fn test_roster_persists_across_store_instances() {
    let ws = setup_workspace();
    let roster = seeded_roster(&ws);

    let mut client = roster.find("2").expect("load").expect("Green Valley Corp");
    client.active_plants = 5;
    roster.update(client).expect("update");

    let reopened = ClientRoster::new(JsonFileStore::<Client>::new(ws.config.storage.clients_path()));
    let clients = reopened.list().expect("reload");
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[1].active_plants, 5, "update should be on disk");
    assert_eq!(clients[1].inactive_plants(), 3);
}

#[test]
fn test_alert_sync_is_idempotent() {
    let ws = setup_workspace();
    let roster = seeded_roster(&ws);
    let log = alert_log(&ws);

    let first = log.extend(roster.all_alerts().expect("alerts")).expect("sync");
    let second = log.extend(roster.all_alerts().expect("alerts")).expect("resync");

    assert_eq!(first, 3);
    assert_eq!(second, 0, "already-logged alerts must not be duplicated");
    assert_eq!(log.snapshot().expect("snapshot").len(), 3);
}

#[test]
fn test_appending_a_logged_id_is_rejected() {
    let ws = setup_workspace();
    let log = alert_log(&ws);
    log.append(alert("a1", AlertType::Info, fixed_now())).expect("first append");

    let err = log
        .append(alert("a1", AlertType::Critical, fixed_now()))
        .expect_err("duplicate id");
    assert!(matches!(err, StoreError::Rejected(MonitorError::DuplicateId(_))));
}

#[test]
fn test_corrupt_store_file_is_reported() {
    let ws = setup_workspace();
    let path = ws.config.storage.tickets_path();
    std::fs::create_dir_all(path.parent().expect("data dir")).expect("mkdir");
    std::fs::write(&path, "{ not json").expect("write");

    let desk = TicketDesk::new(JsonFileStore::<Ticket>::new(path));
    assert!(matches!(
        desk.list(&TicketQuery::default()),
        Err(StoreError::Json { .. })
    ));
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[test]
fn test_demo_alerts_land_in_the_last_day() {
    let ws = setup_workspace();
    let log = alert_log(&ws);
    log.extend(seeded_roster(&ws).all_alerts().expect("alerts")).expect("sync");
    let alerts = log.snapshot().expect("snapshot");

    let hourly = aggregate(&alerts, "1", TimeRangePreset::Last24Hours, &fixed_now()).expect("buckets");
    assert_eq!(hourly.len(), 24);
    // warning at 09:30, critical at 12:30
    let nine = hourly.iter().find(|r| r.label == "09:00").expect("09:00 bucket");
    let noon = hourly.iter().find(|r| r.label == "12:00").expect("12:00 bucket");
    assert_eq!((nine.warning, nine.total), (1, 1));
    assert_eq!((noon.critical, noon.total), (1, 1));
    assert_eq!(hourly.iter().map(|r| r.total).sum::<usize>(), 2);

    // Green Valley's info alert is a day old: outside 24h, inside 7d
    let gv_hourly = aggregate(&alerts, "2", TimeRangePreset::Last24Hours, &fixed_now()).expect("buckets");
    assert_eq!(gv_hourly.iter().map(|r| r.total).sum::<usize>(), 0);
    let gv_daily = aggregate(&alerts, "2", TimeRangePreset::Last7Days, &fixed_now()).expect("buckets");
    assert_eq!(gv_daily.len(), 7);
    assert_eq!(gv_daily.iter().map(|r| r.info).sum::<usize>(), 1);
}

#[test]
fn test_yearly_totals_match_severity_totals() {
    let now = fixed_now();
    let alerts = vec![
        alert("1", AlertType::Critical, now - Duration::days(40)),
        alert("2", AlertType::Warning, now - Duration::days(200)),
        alert("3", AlertType::Info, now - Duration::hours(3)),
        alert("4", AlertType::Critical, now - Duration::days(2)),
    ];

    let rows = aggregate(&alerts, "1", TimeRangePreset::LastYear, &now).expect("buckets");
    let totals = severity_totals(&alerts, Some("1"));

    assert_eq!(rows.len(), 12);
    assert_eq!(rows.last().map(|r| r.label.as_str()), Some("Mar"));
    assert_eq!(rows.iter().map(|r| r.critical).sum::<usize>(), totals.critical);
    assert_eq!(rows.iter().map(|r| r.warning).sum::<usize>(), totals.warning);
    assert_eq!(rows.iter().map(|r| r.info).sum::<usize>(), totals.info);
}

#[test]
fn test_alert_view_filters_and_sorts_synced_alerts() {
    let ws = setup_workspace();
    let log = alert_log(&ws);
    log.extend(seeded_roster(&ws).all_alerts().expect("alerts")).expect("sync");
    let alerts = log.snapshot().expect("snapshot");

    assert_eq!(owner_names(&alerts), vec!["Sunshine Group", "Green Valley Corp"]);

    let query = AlertQuery {
        owner: Some("Sunshine Group".to_string()),
        ..AlertQuery::default()
    };
    let newest_first = query.apply(&alerts);
    let ids: Vec<&str> = newest_first.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);

    let oldest_first = AlertQuery {
        order: SortOrder::Desc.toggle(),
        ..AlertQuery::default()
    }
    .apply(&alerts);
    assert_eq!(oldest_first.first().map(|a| a.id.as_str()), Some("3"));

    let search = AlertQuery {
        search: "SHUTDOWN".to_string(),
        ..AlertQuery::default()
    };
    assert_eq!(search.apply(&alerts).len(), 1);
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[test]
fn test_ticket_lifecycle_on_disk() {
    let ws = setup_workspace();
    let store = JsonFileStore::<Ticket>::new(ws.config.storage.tickets_path());
    store.save(&demo_tickets(fixed_now())).expect("seed tickets");
    let desk = TicketDesk::new(store);

    let ticket = desk
        .open(
            "Sunshine Group",
            "COD above limit",
            "COD reading exceeded 250 mg/L",
            TicketPriority::High,
            fixed_now(),
        )
        .expect("open");
    assert_eq!(ticket.id, "TICK-004");

    desk.assign(&ticket.id, "R. Kumar", fixed_now()).expect("assign");
    let resolved = desk
        .resolve(&ticket.id, "R. Kumar", "Recalibrated COD analyser", fixed_now())
        .expect("resolve");
    assert_eq!(resolved.status, TicketStatus::Resolved);
    assert_eq!(resolved.history.len(), 3);

    let again = desk.resolve(&ticket.id, "R. Kumar", "twice", fixed_now());
    assert!(matches!(
        again,
        Err(StoreError::Rejected(MonitorError::TicketAlreadyResolved(_)))
    ));

    let resolved_list = desk
        .list(&TicketQuery {
            status: Some(TicketStatus::Resolved),
            ..TicketQuery::default()
        })
        .expect("list");
    assert_eq!(resolved_list.len(), 2, "TICK-003 plus the new ticket");
}

// ---------------------------------------------------------------------------
// Live monitor
// ---------------------------------------------------------------------------

#[test]
fn test_monitor_uses_config_limits() {
    let config = MonitorConfig::from_toml_str(
        "[limits.pH]\nmin = 100.0\nmax = 200.0\n",
    )
    .expect("valid config");
    let limits = config.limit_table().expect("limits");

    let sim = ReadingSimulator::seeded("Test Plant", 8);
    let mut monitor = LiveMonitor::new(sim, limits);
    let outcomes = monitor.run(3, StdDuration::ZERO);

    for outcome in &outcomes {
        assert!(outcome.error.is_none());
        assert_eq!(outcome.breaches.len(), 1, "only the tightened pH band should trip");
        assert_eq!(outcome.breaches[0].reading.name, "pH");
    }
}
