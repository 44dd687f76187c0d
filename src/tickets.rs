/// Support ticket tracker.
///
/// Tickets move open → in-progress → resolved. Each transition appends a
/// history event; resolved tickets are final.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::logging::{self, Component};
use crate::model::MonitorError;
use crate::store::{RecordStore, StoreError};

// ---------------------------------------------------------------------------
// Ticket types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketEvent {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
}

impl TicketEvent {
    fn new(timestamp: DateTime<Utc>, action: &str) -> Self {
        Self {
            timestamp,
            action: action.to_string(),
            engineer: None,
            notes: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub client_name: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_engineer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default)]
    pub history: Vec<TicketEvent>,
}

fn required(value: &str, field: &'static str) -> Result<String, MonitorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MonitorError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

impl Ticket {
    /// Opens a new ticket with a "Ticket Created" history entry.
    pub fn open(
        id: impl Into<String>,
        client_name: &str,
        subject: &str,
        description: &str,
        priority: TicketPriority,
        now: DateTime<Utc>,
    ) -> Result<Self, MonitorError> {
        Ok(Self {
            id: id.into(),
            client_name: required(client_name, "clientName")?,
            subject: required(subject, "subject")?,
            description: description.trim().to_string(),
            status: TicketStatus::Open,
            priority,
            created_at: now,
            assigned_engineer: None,
            resolution: None,
            history: vec![TicketEvent::new(now, "Ticket Created")],
        })
    }

    /// Assigns an engineer and moves the ticket to in-progress.
    pub fn assign(&mut self, engineer: &str, now: DateTime<Utc>) -> Result<(), MonitorError> {
        if self.status == TicketStatus::Resolved {
            return Err(MonitorError::TicketAlreadyResolved(self.id.clone()));
        }
        let engineer = required(engineer, "engineer")?;
        self.ensure_history();
        self.history.push(TicketEvent {
            engineer: Some(engineer.clone()),
            status: Some(TicketStatus::InProgress),
            ..TicketEvent::new(now, "Assigned to Engineer")
        });
        self.assigned_engineer = Some(engineer);
        self.status = TicketStatus::InProgress;
        Ok(())
    }

    /// Resolves the ticket. Both the engineer and the resolution note are
    /// required.
    pub fn resolve(
        &mut self,
        engineer: &str,
        resolution: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MonitorError> {
        if self.status == TicketStatus::Resolved {
            return Err(MonitorError::TicketAlreadyResolved(self.id.clone()));
        }
        let engineer = required(engineer, "engineer")?;
        let resolution = required(resolution, "resolution")?;
        self.ensure_history();
        self.history.push(TicketEvent {
            engineer: Some(engineer.clone()),
            notes: Some(resolution.clone()),
            status: Some(TicketStatus::Resolved),
            ..TicketEvent::new(now, "Resolved")
        });
        self.assigned_engineer = Some(engineer);
        self.resolution = Some(resolution);
        self.status = TicketStatus::Resolved;
        Ok(())
    }

    // older records were saved without a history
    fn ensure_history(&mut self) {
        if self.history.is_empty() {
            self.history.push(TicketEvent::new(self.created_at, "Ticket Created"));
        }
    }
}

// ---------------------------------------------------------------------------
// Ticket list view
// ---------------------------------------------------------------------------

/// Ticket list filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketQuery {
    pub search: String,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl TicketQuery {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let needle = self.search.to_lowercase();
        let search_ok = needle.is_empty()
            || ticket.subject.to_lowercase().contains(&needle)
            || ticket.client_name.to_lowercase().contains(&needle);
        search_ok
            && self.status.is_none_or(|s| ticket.status == s)
            && self.priority.is_none_or(|p| ticket.priority == p)
    }

    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        tickets.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

/// Next sequential id in the `TICK-NNN` series.
pub fn next_ticket_id(tickets: &[Ticket]) -> String {
    let highest = tickets
        .iter()
        .filter_map(|t| t.id.strip_prefix("TICK-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("TICK-{:03}", highest + 1)
}

// ---------------------------------------------------------------------------
// Ticket desk service
// ---------------------------------------------------------------------------

/// Ticket operations over a record store.
pub struct TicketDesk<S> {
    store: S,
}

impl<S: RecordStore<Ticket>> TicketDesk<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        Ok(query.apply(&self.store.load()?))
    }

    /// Opens a ticket under the next `TICK-NNN` id and returns it.
    pub fn open(
        &self,
        client_name: &str,
        subject: &str,
        description: &str,
        priority: TicketPriority,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let mut tickets = self.store.load()?;
        let ticket = Ticket::open(
            next_ticket_id(&tickets),
            client_name,
            subject,
            description,
            priority,
            now,
        )?;
        logging::info(
            Component::Tickets,
            Some(&ticket.id),
            &format!("opened for {}: {}", ticket.client_name, ticket.subject),
        );
        tickets.push(ticket.clone());
        self.store.save(&tickets)?;
        Ok(ticket)
    }

    pub fn assign(&self, id: &str, engineer: &str, now: DateTime<Utc>) -> Result<Ticket, StoreError> {
        self.modify(id, |t| t.assign(engineer, now))
    }

    pub fn resolve(
        &self,
        id: &str,
        engineer: &str,
        resolution: &str,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let ticket = self.modify(id, |t| t.resolve(engineer, resolution, now))?;
        logging::info(Component::Tickets, Some(id), "resolved");
        Ok(ticket)
    }

    fn modify<F>(&self, id: &str, change: F) -> Result<Ticket, StoreError>
    where
        F: FnOnce(&mut Ticket) -> Result<(), MonitorError>,
    {
        let mut tickets = self.store.load()?;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| MonitorError::NotFound(id.to_string()))?;
        change(ticket)?;
        let updated = ticket.clone();
        self.store.save(&tickets)?;
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

/// Demo tickets seeded into an empty ticket store, one per status.
pub fn demo_tickets(now: DateTime<Utc>) -> Vec<Ticket> {
    let day = Duration::days(1);
    let half_day = Duration::hours(12);

    let created = TicketEvent::new(now, "Ticket Created");
    let open = Ticket {
        id: "TICK-001".to_string(),
        client_name: "ABC Industries".to_string(),
        subject: "pH Sensor Malfunction".to_string(),
        description: "The pH sensor in Plant 2 is showing incorrect readings".to_string(),
        status: TicketStatus::Open,
        priority: TicketPriority::High,
        created_at: now,
        assigned_engineer: None,
        resolution: None,
        history: vec![created],
    };

    let in_progress = Ticket {
        id: "TICK-002".to_string(),
        client_name: "XYZ Manufacturing".to_string(),
        subject: "Flow Meter Calibration".to_string(),
        description: "Regular calibration request for flow meters".to_string(),
        status: TicketStatus::InProgress,
        priority: TicketPriority::Medium,
        created_at: now - day,
        assigned_engineer: Some("John Doe".to_string()),
        resolution: None,
        history: vec![
            TicketEvent::new(now - day, "Ticket Created"),
            TicketEvent {
                engineer: Some("John Doe".to_string()),
                ..TicketEvent::new(now - half_day, "Assigned to Engineer")
            },
        ],
    };

    let note = "Created and shared maintenance schedule for Q2";
    let resolved = Ticket {
        id: "TICK-003".to_string(),
        client_name: "Green Solutions Ltd".to_string(),
        subject: "Maintenance Schedule".to_string(),
        description: "Request for quarterly maintenance schedule".to_string(),
        status: TicketStatus::Resolved,
        priority: TicketPriority::Low,
        created_at: now - day * 2,
        assigned_engineer: Some("Jane Smith".to_string()),
        resolution: Some(note.to_string()),
        history: vec![
            TicketEvent::new(now - day * 2, "Ticket Created"),
            TicketEvent {
                engineer: Some("Jane Smith".to_string()),
                ..TicketEvent::new(now - day, "Assigned to Engineer")
            },
            TicketEvent {
                engineer: Some("Jane Smith".to_string()),
                notes: Some(note.to_string()),
                ..TicketEvent::new(now, "Resolved")
            },
        ],
    };

    vec![open, in_progress, resolved]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
