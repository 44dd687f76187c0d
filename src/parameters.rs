/// Parameter registry for the effluent monitoring service.
///
/// Defines the canonical list of effluent parameters measured at each
/// treatment plant, along with their units and regulatory discharge bands.
/// This is the single source of truth for parameter names: readings are
/// validated against it at the data-source boundary, and the default
/// `LimitTable` handed to the threshold evaluator is built from it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::model::{MonitorError, ParameterLimit, Reading};

// ---------------------------------------------------------------------------
// Parameter names
// ---------------------------------------------------------------------------

/// The effluent parameters reported by a plant's sensor package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Ph,
    Cod,
    Bod,
    Tss,
    Tds,
    DissolvedOxygen,
    FlowRate,
    Temperature,
    ColorConcentration,
}

impl Parameter {
    /// Name used on readings and in the limit table.
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn unit(&self) -> &'static str {
        self.spec().unit
    }

    /// Registry entry for this parameter.
    pub fn spec(&self) -> &'static ParameterSpec {
        // registry order matches declaration order (checked in tests)
        &PARAMETER_REGISTRY[*self as usize]
    }

    fn key(&self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Cod => "cod",
            Parameter::Bod => "bod",
            Parameter::Tss => "tss",
            Parameter::Tds => "tds",
            Parameter::DissolvedOxygen => "do",
            Parameter::FlowRate => "flowrate",
            Parameter::Temperature => "temperature",
            Parameter::ColorConcentration => "colorconcentration",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = MonitorError;

    /// Accepts the display name ("Flow Rate") or the camelCase key used by
    /// plant payloads ("flowRate"), ignoring case, spaces and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        PARAMETER_REGISTRY
            .iter()
            .map(|spec| spec.parameter)
            .find(|p| p.key() == folded)
            .ok_or_else(|| MonitorError::UnknownParameter(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Metadata for a single monitored parameter.
pub struct ParameterSpec {
    pub parameter: Parameter,
    /// Name as it appears on readings.
    pub name: &'static str,
    /// Display unit; empty for dimensionless quantities.
    pub unit: &'static str,
    /// Regulatory discharge band.
    pub limit: ParameterLimit,
    pub description: &'static str,
}

/// All parameters monitored at ETP/STP outlets, in dashboard display order.
pub static PARAMETER_REGISTRY: &[ParameterSpec] = &[
    ParameterSpec {
        parameter: Parameter::Ph,
        name: "pH",
        unit: "",
        limit: ParameterLimit { min: 6.0, max: 9.0 },
        description: "Acidity of the treated effluent.",
    },
    ParameterSpec {
        parameter: Parameter::Cod,
        name: "COD",
        unit: "mg/L",
        limit: ParameterLimit { min: 0.0, max: 250.0 },
        description: "Chemical oxygen demand.",
    },
    ParameterSpec {
        parameter: Parameter::Bod,
        name: "BOD",
        unit: "mg/L",
        limit: ParameterLimit { min: 0.0, max: 30.0 },
        description: "Biochemical oxygen demand (5-day).",
    },
    ParameterSpec {
        parameter: Parameter::Tss,
        name: "TSS",
        unit: "mg/L",
        limit: ParameterLimit { min: 0.0, max: 100.0 },
        description: "Total suspended solids.",
    },
    ParameterSpec {
        parameter: Parameter::Tds,
        name: "TDS",
        unit: "mg/L",
        limit: ParameterLimit { min: 0.0, max: 2100.0 },
        description: "Total dissolved solids.",
    },
    ParameterSpec {
        parameter: Parameter::DissolvedOxygen,
        name: "DO",
        unit: "mg/L",
        limit: ParameterLimit { min: 4.0, max: 8.0 },
        description: "Dissolved oxygen. Low DO points at an aeration fault.",
    },
    ParameterSpec {
        parameter: Parameter::FlowRate,
        name: "Flow Rate",
        unit: "m³/h",
        limit: ParameterLimit { min: 0.0, max: 1000.0 },
        description: "Outlet discharge flow.",
    },
    ParameterSpec {
        parameter: Parameter::Temperature,
        name: "Temperature",
        unit: "°C",
        limit: ParameterLimit { min: 0.0, max: 40.0 },
        description: "Effluent temperature at the outlet.",
    },
    ParameterSpec {
        parameter: Parameter::ColorConcentration,
        name: "Color Concentration",
        unit: "Pt-Co",
        limit: ParameterLimit { min: 0.0, max: 100.0 },
        description: "Colour on the platinum-cobalt scale.",
    },
];

/// Looks up a registry entry by reading name. Returns `None` if not found.
pub fn find_parameter(name: &str) -> Option<&'static ParameterSpec> {
    PARAMETER_REGISTRY.iter().find(|s| s.name == name)
}

/// Data-source boundary check: rewrites every reading name to its canonical
/// registry name, failing on the first name the registry does not know or
/// the first NaN/infinite value.
pub fn validate_readings(readings: Vec<Reading>) -> Result<Vec<Reading>, MonitorError> {
    readings
        .into_iter()
        .map(|r| {
            let parameter: Parameter = r.name.parse()?;
            if !r.value.is_finite() {
                return Err(MonitorError::NonFiniteValue {
                    name: parameter.name().to_string(),
                    value: r.value,
                });
            }
            Ok(Reading::new(parameter.name(), r.value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Limit table
// ---------------------------------------------------------------------------

/// Immutable parameter-name → limit map handed to the threshold evaluator.
///
/// Built once at startup and never mutated afterwards; every constructor
/// validates `min <= max` for each entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitTable {
    limits: HashMap<String, ParameterLimit>,
}

impl LimitTable {
    /// The regulatory bands from `PARAMETER_REGISTRY`.
    pub fn standard() -> Self {
        let limits = PARAMETER_REGISTRY
            .iter()
            .map(|s| (s.name.to_string(), s.limit))
            .collect();
        Self { limits }
    }

    /// Builds a table from arbitrary `(name, min, max)` entries.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, MonitorError>
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let mut limits = HashMap::new();
        for (name, min, max) in entries {
            limits.insert(name.into(), ParameterLimit::new(min, max)?);
        }
        Ok(Self { limits })
    }

    /// Returns a copy with the given registry entries replaced.
    ///
    /// Names go through the same parsing as readings, so an override for a
    /// parameter no source can report fails with `UnknownParameter`.
    pub fn with_overrides<'a, I>(&self, overrides: I) -> Result<Self, MonitorError>
    where
        I: IntoIterator<Item = (&'a str, f64, f64)>,
    {
        let mut limits = self.limits.clone();
        for (name, min, max) in overrides {
            let parameter: Parameter = name.parse()?;
            limits.insert(parameter.name().to_string(), ParameterLimit::new(min, max)?);
        }
        Ok(Self { limits })
    }

    pub fn get(&self, name: &str) -> Option<&ParameterLimit> {
        self.limits.get(name)
    }

    /// Parameter names in the table, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.limits.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl Default for LimitTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
