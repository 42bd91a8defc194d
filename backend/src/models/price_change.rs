use serde::{Deserialize, Serialize};

/// Percentage move between the baseline of a lookback window and the most
/// recent observation. `percentage` is always non-negative; the direction is
/// carried by `increased`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub percentage: f64,
    pub increased: bool,
}

impl PriceChange {
    /// A zero move carries no indicator in the UI.
    pub fn is_flat(&self) -> bool {
        self.percentage == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookbackWindow {
    Week,
    Month,
    Year,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 3] = [LookbackWindow::Week, LookbackWindow::Month, LookbackWindow::Year];

    pub fn days(self) -> u32 {
        match self {
            LookbackWindow::Week => 7,
            LookbackWindow::Month => 30,
            LookbackWindow::Year => 365,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeQuery {
    pub days: Option<u32>,
}
