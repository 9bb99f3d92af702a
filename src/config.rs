use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::data::charts::{RenderSettings, DEFAULT_CORRELATION_COLUMNS};
use crate::data::filter::parse_month;
use crate::data::model::Column;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Air-quality analysis dashboard for hourly station data
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "air-quality-dashboard", version)]
pub struct Cli {
    /// Station table to load (.csv, .json or .parquet)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Season length of the PM2.5 decomposition, in hours
    #[arg(long)]
    pub period: Option<usize>,

    /// Year selected at startup
    #[arg(long)]
    pub year: Option<i32>,

    /// Month selected at startup (1-12 or a month name)
    #[arg(long)]
    pub month: Option<String>,
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

/// Dashboard settings. Every key is optional in the file.
///
/// ```toml
/// data-path = "PRSA_Data_Wanshouxigong_20130301-20170228.csv"
/// decomposition-period = 24
/// correlation-columns = ["PM2.5", "NO2", "TEMP", "PRES", "DEWP"]
/// forward-fill-on-load = []
/// year = 2015
/// month = "January"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub decomposition_period: usize,
    /// Initial columns of the interactive correlation heatmap.
    pub correlation_columns: Vec<String>,
    /// Columns imputed once, right after loading.
    pub forward_fill_on_load: Vec<String>,
    pub title: String,
    /// Selection at startup; first year / month present when unset.
    pub year: Option<i32>,
    pub month: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("PRSA_Data_Wanshouxigong_20130301-20170228.csv"),
            decomposition_period: 24,
            correlation_columns: DEFAULT_CORRELATION_COLUMNS
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            forward_fill_on_load: Vec::new(),
            title: "Air Quality Analysis Dashboard".to_string(),
            year: None,
            month: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DashboardError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// File settings (or defaults) with command-line flags applied on top.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(data) = &cli.data {
            config.data_path = data.clone();
        }
        if let Some(period) = cli.period {
            config.decomposition_period = period;
        }
        if cli.year.is_some() {
            config.year = cli.year;
        }
        if cli.month.is_some() {
            config.month = cli.month.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.decomposition_period < 2 {
            return Err(DashboardError::Config(format!(
                "decomposition-period must be at least 2, got {}",
                self.decomposition_period
            )));
        }
        self.correlation_columns()?;
        self.forward_fill_columns()?;
        self.initial_month()?;
        Ok(())
    }

    pub fn initial_month(&self) -> Result<Option<u32>> {
        self.month
            .as_deref()
            .map(|m| {
                parse_month(m)
                    .ok_or_else(|| DashboardError::Config(format!("month: '{m}' is not a month")))
            })
            .transpose()
    }

    pub fn correlation_columns(&self) -> Result<Vec<Column>> {
        resolve_columns(&self.correlation_columns, "correlation-columns")
    }

    pub fn forward_fill_columns(&self) -> Result<Vec<Column>> {
        let columns = resolve_columns(&self.forward_fill_on_load, "forward-fill-on-load")?;
        if let Some(ts) = columns.iter().find(|c| c.is_timestamp()) {
            return Err(DashboardError::Config(format!(
                "forward-fill-on-load: '{ts}' is a timestamp column"
            )));
        }
        Ok(columns)
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            decomposition_period: self.decomposition_period,
        }
    }
}

fn resolve_columns(names: &[String], key: &str) -> Result<Vec<Column>> {
    names
        .iter()
        .map(|name| {
            Column::from_name(name).ok_or_else(|| {
                DashboardError::Config(format!("{key}: unknown numeric column '{name}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.decomposition_period, 24);
        assert_eq!(config.correlation_columns().unwrap(), DEFAULT_CORRELATION_COLUMNS);
        assert!(config.forward_fill_columns().unwrap().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml(
            "decomposition-period = 12\nforward-fill-on-load = [\"PM2.5\", \"TEMP\"]\n",
        )
        .unwrap();
        assert_eq!(config.decomposition_period, 12);
        assert_eq!(
            config.forward_fill_columns().unwrap(),
            vec![Column::Pm25, Column::Temp]
        );
        assert_eq!(config.data_path, DashboardConfig::default().data_path);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [
            "decomposition-period = 1",
            "correlation-columns = [\"PM25\"]",
            "forward-fill-on-load = [\"hour\"]",
            "no-such-key = true",
            "month = \"Smarch\"",
        ] {
            let err = DashboardConfig::from_toml(bad).unwrap_err();
            assert!(matches!(err, DashboardError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "data-path = \"from-file.csv\"\ndecomposition-period = 12").unwrap();

        let cli = Cli {
            data: Some(PathBuf::from("from-cli.csv")),
            config: Some(file.path().to_path_buf()),
            month: Some("feb".to_string()),
            ..Cli::default()
        };
        let config = DashboardConfig::resolve(&cli).unwrap();
        assert_eq!(config.data_path, PathBuf::from("from-cli.csv"));
        assert_eq!(config.decomposition_period, 12);
        assert_eq!(config.initial_month().unwrap(), Some(2));

        let cli = Cli {
            period: Some(0),
            ..cli
        };
        assert!(DashboardConfig::resolve(&cli).is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["air-quality-dashboard", "--data", "x.csv", "--period", "48"]);
        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
        assert_eq!(cli.period, Some(48));
        assert!(cli.config.is_none());
    }
}
