/// Client roster for the monitoring service.
///
/// A client is an industrial group operating one or more treatment plants.
/// Each client carries its own alert list; the alert dashboard works on the
/// flattened, owner-tagged form produced by `ClientRoster::all_alerts`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Alert, AlertType, MonitorError};
use crate::store::{RecordStore, StoreError};

// ---------------------------------------------------------------------------
// Client types
// ---------------------------------------------------------------------------

/// An alert as stored on its client, before owner tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub total_industries: u32,
    pub total_plants: u32,
    pub active_plants: u32,
    #[serde(default)]
    pub alerts: Vec<ClientAlert>,
}

impl Client {
    pub fn inactive_plants(&self) -> u32 {
        self.total_plants.saturating_sub(self.active_plants)
    }

    /// This client's alerts tagged with its id and name.
    pub fn owned_alerts(&self) -> impl Iterator<Item = Alert> + '_ {
        self.alerts.iter().map(|a| Alert {
            id: a.id.clone(),
            alert_type: a.alert_type,
            message: a.message.clone(),
            timestamp: a.timestamp,
            owner_id: self.id.clone(),
            owner_name: self.name.clone(),
        })
    }

    fn validate(&self) -> Result<(), MonitorError> {
        if self.id.trim().is_empty() {
            return Err(MonitorError::MissingField("id"));
        }
        if self.name.trim().is_empty() {
            return Err(MonitorError::MissingField("name"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Roster service
// ---------------------------------------------------------------------------

/// Client roster backed by a record store. Every mutation writes the whole
/// roster back.
pub struct ClientRoster<S> {
    store: S,
}

impl<S: RecordStore<Client>> ClientRoster<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Client>, StoreError> {
        self.store.load()
    }

    pub fn find(&self, id: &str) -> Result<Option<Client>, StoreError> {
        Ok(self.store.load()?.into_iter().find(|c| c.id == id))
    }

    pub fn add(&self, client: Client) -> Result<(), StoreError> {
        client.validate()?;
        let mut clients = self.store.load()?;
        if clients.iter().any(|c| c.id == client.id) {
            return Err(MonitorError::DuplicateId(client.id).into());
        }
        clients.push(client);
        self.store.save(&clients)
    }

    /// Replaces the client with the same id.
    pub fn update(&self, client: Client) -> Result<(), StoreError> {
        client.validate()?;
        let mut clients = self.store.load()?;
        let slot = clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or_else(|| MonitorError::NotFound(client.id.clone()))?;
        *slot = client;
        self.store.save(&clients)
    }

    pub fn remove(&self, id: &str) -> Result<Client, StoreError> {
        let mut clients = self.store.load()?;
        let index = clients
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| MonitorError::NotFound(id.to_string()))?;
        let removed = clients.remove(index);
        self.store.save(&clients)?;
        Ok(removed)
    }

    /// Every client's alerts, owner-tagged, in roster order.
    pub fn all_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        Ok(self
            .store
            .load()?
            .iter()
            .flat_map(|c| c.owned_alerts().collect::<Vec<_>>())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

/// The two demo clients seeded into an empty roster.
pub fn demo_roster(now: DateTime<Utc>) -> Vec<Client> {
    vec![
        Client {
            id: "1".to_string(),
            name: "Sunshine Group".to_string(),
            email: "contact@sunshinegroup.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            location: "Mumbai, Maharashtra".to_string(),
            total_industries: 3,
            total_plants: 15,
            active_plants: 12,
            alerts: vec![
                ClientAlert {
                    id: "1".to_string(),
                    alert_type: AlertType::Warning,
                    message: "Maintenance due for Plant A".to_string(),
                    timestamp: now - Duration::hours(5),
                },
                ClientAlert {
                    id: "2".to_string(),
                    alert_type: AlertType::Critical,
                    message: "Emergency shutdown in Plant B".to_string(),
                    timestamp: now - Duration::hours(2),
                },
            ],
        },
        Client {
            id: "2".to_string(),
            name: "Green Valley Corp".to_string(),
            email: "info@greenvalley.com".to_string(),
            phone: "+91 98765 43211".to_string(),
            location: "Bangalore, Karnataka".to_string(),
            total_industries: 2,
            total_plants: 8,
            active_plants: 7,
            alerts: vec![ClientAlert {
                id: "3".to_string(),
                alert_type: AlertType::Info,
                message: "Scheduled maintenance completed".to_string(),
                timestamp: now - Duration::days(1),
            }],
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
