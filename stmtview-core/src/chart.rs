//! Category counts reshaped into pie-chart series.

use crate::format::{Rgb, palette_for};
use crate::model::CategoryCounts;

/// Parallel label/value/colour arrays, one entry per slice
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieChart {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<Rgb>,
}

impl PieChart {
    pub fn from_categories(categories: &CategoryCounts) -> Self {
        let labels: Vec<String> = categories.keys().map(str::to_string).collect();
        let values: Vec<u64> = categories.values().copied().collect();
        let colors = palette_for(labels.len());
        Self { labels, values, colors }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    /// Fraction of the total per slice; all zero when the total is zero.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.values
            .iter()
            .map(|v| if total == 0 { 0.0 } else { *v as f64 / total as f64 })
            .collect()
    }

    pub fn percentage(&self, index: usize) -> Option<f64> {
        let value = *self.values.get(index)?;
        let total = self.total();
        Some(if total == 0 { 0.0 } else { value as f64 * 100.0 / total as f64 })
    }

    /// `"Food: 3 (75.0%)"`
    pub fn tooltip(&self, index: usize) -> Option<String> {
        let pct = self.percentage(index)?;
        Some(format!("{}: {} ({:.1}%)", self.labels[index], self.values[index], pct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food_rent() -> CategoryCounts {
        serde_json::from_str(r#"{"Food": 3, "Rent": 1}"#).unwrap()
    }

    #[test]
    fn test_two_categories_in_key_order() {
        let chart = PieChart::from_categories(&food_rent());
        assert_eq!(chart.labels, vec!["Food", "Rent"]);
        assert_eq!(chart.values, vec![3, 1]);
        assert_eq!(chart.colors.len(), 2);
        assert_ne!(chart.colors[0], chart.colors[1]);
    }

    #[test]
    fn test_tooltip_reports_share_of_total() {
        let chart = PieChart::from_categories(&food_rent());
        assert_eq!(chart.tooltip(0).as_deref(), Some("Food: 3 (75.0%)"));
        assert_eq!(chart.tooltip(1).as_deref(), Some("Rent: 1 (25.0%)"));
        assert_eq!(chart.tooltip(2), None);
    }

    #[test]
    fn test_colours_cycle_past_palette() {
        let cats: CategoryCounts = (0..7).map(|i| (format!("c{i}"), 1u64)).collect();
        let chart = PieChart::from_categories(&cats);
        assert_eq!(chart.colors.len(), 7);
        assert_eq!(chart.colors[0], chart.colors[5]);
    }

    #[test]
    fn test_zero_total() {
        let cats: CategoryCounts = [("Empty", 0u64)].into_iter().collect();
        let chart = PieChart::from_categories(&cats);
        assert_eq!(chart.shares(), vec![0.0]);
        assert_eq!(chart.tooltip(0).as_deref(), Some("Empty: 0 (0.0%)"));
    }

    #[test]
    fn test_empty_categories() {
        let chart = PieChart::from_categories(&CategoryCounts::new());
        assert!(chart.is_empty());
        assert_eq!(chart.total(), 0);
    }
}
