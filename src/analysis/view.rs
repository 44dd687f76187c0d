//! Search, filter and sort over an alert list.

use serde::{Deserialize, Serialize};

use crate::model::{Alert, AlertType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Selection state of the alert list. `None` filters mean "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertQuery {
    pub search: String,
    pub alert_type: Option<AlertType>,
    /// Owner name, as shown in the company selector.
    pub owner: Option<String>,
    pub order: SortOrder,
}

impl AlertQuery {
    pub fn matches(&self, alert: &Alert) -> bool {
        let type_ok = self.alert_type.is_none_or(|t| alert.alert_type == t);
        let owner_ok = self.owner.as_deref().is_none_or(|o| alert.owner_name == o);
        type_ok && owner_ok && self.matches_search(alert)
    }

    fn matches_search(&self, alert: &Alert) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        alert.message.to_lowercase().contains(&needle)
            || alert.owner_name.to_lowercase().contains(&needle)
    }

    /// Returns the matching alerts sorted by timestamp. The sort is stable,
    /// so alerts sharing a timestamp keep their input order.
    pub fn apply(&self, alerts: &[Alert]) -> Vec<Alert> {
        let mut view: Vec<Alert> = alerts.iter().filter(|a| self.matches(a)).cloned().collect();
        match self.order {
            SortOrder::Asc => view.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortOrder::Desc => view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }
        view
    }
}

/// Distinct owner names in first-seen order, for the company selector.
pub fn owner_names(alerts: &[Alert]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for alert in alerts {
        if !names.contains(&alert.owner_name) {
            names.push(alert.owner_name.clone());
        }
    }
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
