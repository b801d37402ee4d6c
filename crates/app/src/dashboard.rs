use laundry_core::ChemicalId;

/// Home screen numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub chemical_count: usize,
    pub linen_count: usize,
    /// Chemicals at or below the configured low-stock threshold, in ledger order.
    pub low_stock: Vec<ChemicalId>,
}

impl DashboardSummary {
    /// Badge text for the chemicals entry, e.g. `"2 Low"`.
    pub fn low_stock_badge(&self) -> Option<String> {
        match self.low_stock.len() {
            0 => None,
            n => Some(format!("{n} Low")),
        }
    }

    /// Alert banner text, e.g. `"1 chemical running low on stock"`.
    pub fn low_stock_alert(&self) -> Option<String> {
        match self.low_stock.len() {
            0 => None,
            1 => Some("1 chemical running low on stock".to_string()),
            n => Some(format!("{n} chemicals running low on stock")),
        }
    }
}
