use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the data pipeline and dashboard startup.
///
/// Only [`DashboardError::DataUnavailable`] and [`DashboardError::Config`] are
/// fatal; everything else is caught where it happens and shown next to the
/// chart that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// The source table is missing, unreadable, or lacks required columns.
    #[error("Data unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// Seasonal decomposition could not run on the given series.
    #[error("Unable to perform time series decomposition: {0}")]
    DecompositionError(String),

    /// The (year, month) filter matched no rows.
    #[error("No data for {year}-{month:02}")]
    EmptySelection { year: i32, month: u32 },

    /// A chart needs a column the loaded source does not carry.
    #[error("Column '{0}' is not present in the loaded data")]
    MissingColumn(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_message_names_path() {
        let err = DashboardError::DataUnavailable {
            path: PathBuf::from("/data/station.csv"),
            reason: "CSV missing 'wd' column".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/station.csv"));
        assert!(msg.contains("missing 'wd'"));
    }

    #[test]
    fn test_empty_selection_message() {
        let err = DashboardError::EmptySelection { year: 2013, month: 1 };
        assert_eq!(err.to_string(), "No data for 2013-01");
    }
}
