//! etpmon: effluent treatment plant monitor
//!
//! Usage: etpmon [preset] [owner_id]
//!
//! Loads the config named by `ETPMON_CONFIG` (defaults otherwise), seeds the
//! JSON stores with demo data on first run, polls the readings source for the
//! configured number of cycles, then prints the alert distribution for one
//! client over the chosen time range (24h, 7d, 30d or 1y).

use std::error::Error;
use std::process;

use chrono::{Local, Utc};

use etpmon_service::analysis::aggregate::{aggregate, severity_totals};
use etpmon_service::analysis::buckets::TimeRangePreset;
use etpmon_service::analysis::trends::{Sample, daily_trend};
use etpmon_service::analysis::view::AlertQuery;
use etpmon_service::clients::{Client, ClientRoster, demo_roster};
use etpmon_service::config::MonitorConfig;
use etpmon_service::ingest::ReadingSource;
use etpmon_service::ingest::api::ApiReadingSource;
use etpmon_service::ingest::simulator::ReadingSimulator;
use etpmon_service::logging::{self, Component};
use etpmon_service::model::Alert;
use etpmon_service::monitor::LiveMonitor;
use etpmon_service::parameters::find_parameter;
use etpmon_service::store::{AlertLog, JsonFileStore, RecordStore};
use etpmon_service::tickets::{Ticket, TicketDesk, TicketQuery, TicketStatus, demo_tickets};

const DEFAULT_OWNER: &str = "1";
const RECENT_ALERTS: usize = 5;

fn main() {
    if let Err(e) = run() {
        logging::error(Component::System, None, &e.to_string());
        eprintln!("etpmon: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let preset: TimeRangePreset = match args.next() {
        Some(arg) => arg.parse()?,
        None => TimeRangePreset::default(),
    };
    let owner_id = args.next().unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let config = MonitorConfig::from_env()?;
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::info(
        Component::System,
        None,
        &format!("etpmon starting, data dir {}", config.storage.data_dir.display()),
    );

    // ---------------------------------------------------------------------
    // Stores
    // ---------------------------------------------------------------------

    let now = Utc::now();
    let client_store = JsonFileStore::<Client>::new(config.storage.clients_path());
    if client_store.load()?.is_empty() {
        client_store.save(&demo_roster(now))?;
        logging::info(Component::System, None, "seeded demo clients");
    }
    let ticket_store = JsonFileStore::<Ticket>::new(config.storage.tickets_path());
    if ticket_store.load()?.is_empty() {
        ticket_store.save(&demo_tickets(now))?;
        logging::info(Component::System, None, "seeded demo tickets");
    }

    let roster = ClientRoster::new(client_store);
    let desk = TicketDesk::new(ticket_store);
    let alert_log = AlertLog::new(JsonFileStore::<Alert>::new(config.storage.alerts_path()));

    let added = alert_log.extend(roster.all_alerts()?)?;
    if added > 0 {
        logging::info(Component::Store, None, &format!("{} client alerts synced", added));
    }

    // ---------------------------------------------------------------------
    // Live monitoring
    // ---------------------------------------------------------------------

    let limits = config.limit_table()?;
    let poll = &config.monitor;
    let source: Box<dyn ReadingSource> = match &poll.readings_url {
        Some(url) => {
            let mut api = ApiReadingSource::new(poll.plant.as_str(), url.as_str())?;
            if let Some(token) = &poll.token {
                api = api.with_token(token.as_str());
            }
            Box::new(api)
        }
        None => {
            let sim = match poll.seed {
                Some(seed) => ReadingSimulator::seeded(poll.plant.as_str(), seed),
                None => ReadingSimulator::new(poll.plant.as_str()),
            };
            Box::new(sim.with_excursions(poll.excursion_probability))
        }
    };

    let mut monitor = LiveMonitor::new(source, limits);
    let outcomes = monitor.run(poll.cycles, poll.refresh_interval());

    println!();
    println!("Live readings ({})", poll.plant);
    if let Some(last) = outcomes.iter().rev().find(|o| o.error.is_none()) {
        for reading in &last.readings {
            let unit = find_parameter(&reading.name).map_or("", |s| s.unit);
            let band = monitor
                .limits()
                .get(&reading.name)
                .map(|l| format!("[{}, {}]", l.min, l.max))
                .unwrap_or_default();
            let flag = if last.breaches.iter().any(|b| b.reading.name == reading.name) {
                "OUT OF RANGE"
            } else {
                "ok"
            };
            println!(
                "  {:<22} {:>10.2} {:<6} {:<14} {}",
                reading.name, reading.value, unit, band, flag
            );
        }

        // session history: every successful poll, bucketed by hour
        let samples: Vec<Sample> = outcomes.iter().flat_map(|o| o.samples()).collect();
        println!();
        println!("Session trend ({} polls)", outcomes.len());
        println!("  {:<22} {:>6} {:>10} {:>10} {:>10}", "parameter", "hour", "min", "max", "average");
        for reading in &last.readings {
            let points = daily_trend(&samples, &reading.name, TimeRangePreset::Last24Hours, &Local::now())?;
            for point in points.iter().filter(|p| p.count > 0) {
                println!(
                    "  {:<22} {:>6} {:>10.2} {:>10.2} {:>10.2}",
                    reading.name,
                    point.label,
                    point.min.unwrap_or(f64::NAN),
                    point.max.unwrap_or(f64::NAN),
                    point.average.unwrap_or(f64::NAN)
                );
            }
        }
    } else {
        println!("  no readings received");
    }

    // ---------------------------------------------------------------------
    // Alert distribution
    // ---------------------------------------------------------------------

    let alerts = alert_log.snapshot()?;
    let owner_name = roster
        .find(&owner_id)?
        .map(|c| c.name)
        .unwrap_or_else(|| format!("client {}", owner_id));
    let rows = aggregate(&alerts, &owner_id, preset, &Local::now())?;

    println!();
    println!("Alert distribution: {} ({})", owner_name, preset.display_name());
    println!("  {:<10} {:>8} {:>8} {:>8} {:>8}", preset.axis_label(), "critical", "warning", "info", "total");
    for row in rows.iter().filter(|r| r.total > 0) {
        println!(
            "  {:<10} {:>8} {:>8} {:>8} {:>8}",
            row.label, row.critical, row.warning, row.info, row.total
        );
    }
    let empty = rows.iter().filter(|r| r.total == 0).count();
    println!("  ({} of {} buckets without alerts)", empty, rows.len());

    let totals = severity_totals(&alerts, Some(&owner_id));
    println!(
        "  totals: {} critical, {} warning, {} info",
        totals.critical, totals.warning, totals.info
    );

    let recent = AlertQuery {
        owner: Some(owner_name.clone()),
        ..AlertQuery::default()
    }
    .apply(&alerts);
    println!();
    println!("Recent alerts");
    for alert in recent.iter().take(RECENT_ALERTS) {
        println!(
            "  {}  {:<8} {}",
            alert.timestamp.with_timezone(&Local).format("%b %-d %H:%M"),
            alert.alert_type,
            alert.message
        );
    }

    let open = desk.list(&TicketQuery {
        status: Some(TicketStatus::Open),
        ..TicketQuery::default()
    })?;
    println!();
    println!("Open tickets: {}", open.len());
    for ticket in &open {
        println!("  {} [{:?}] {}: {}", ticket.id, ticket.priority, ticket.client_name, ticket.subject);
    }

    Ok(())
}
