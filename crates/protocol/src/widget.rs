use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a floating widget on the new tab page.
///
/// The set is closed. Declaration order is the canonical order used for
/// default-layout cascading and for serialization, so `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetId {
    Weather,
    Pomodoro,
    Tasks,
}

impl WidgetId {
    /// Every known widget, in canonical order.
    pub const ALL: [WidgetId; 3] = [WidgetId::Weather, WidgetId::Pomodoro, WidgetId::Tasks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Pomodoro => "pomodoro",
            Self::Tasks => "tasks",
        }
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWidget(pub String);

impl fmt::Display for UnknownWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown widget id: {}", self.0)
    }
}

impl std::error::Error for UnknownWidget {}

impl FromStr for WidgetId {
    type Err = UnknownWidget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownWidget(s.to_string()))
    }
}
