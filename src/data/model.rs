use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Column – the numeric columns of a station table
// ---------------------------------------------------------------------------

/// Numeric columns of an hourly station table, named as in the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    No,
    Year,
    Month,
    Day,
    Hour,
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
    Temp,
    Pres,
    Dewp,
    Rain,
    Wspm,
}

impl Column {
    /// Canonical column order (matches the PRSA header).
    pub const ALL: [Column; 16] = [
        Column::No,
        Column::Year,
        Column::Month,
        Column::Day,
        Column::Hour,
        Column::Pm25,
        Column::Pm10,
        Column::So2,
        Column::No2,
        Column::Co,
        Column::O3,
        Column::Temp,
        Column::Pres,
        Column::Dewp,
        Column::Rain,
        Column::Wspm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::No => "No",
            Column::Year => "year",
            Column::Month => "month",
            Column::Day => "day",
            Column::Hour => "hour",
            Column::Pm25 => "PM2.5",
            Column::Pm10 => "PM10",
            Column::So2 => "SO2",
            Column::No2 => "NO2",
            Column::Co => "CO",
            Column::O3 => "O3",
            Column::Temp => "TEMP",
            Column::Pres => "PRES",
            Column::Dewp => "DEWP",
            Column::Rain => "RAIN",
            Column::Wspm => "WSPM",
        }
    }

    /// Resolve a header name. Matching is exact, as in the source file.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Whether a source table must carry this column to be loadable.
    pub fn is_required(self) -> bool {
        !matches!(self, Column::No | Column::Wspm)
    }

    /// Timestamp columns are integral and never missing.
    pub fn is_timestamp(self) -> bool {
        matches!(self, Column::Year | Column::Month | Column::Day | Column::Hour)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header name of the wind-direction column.
pub const WIND_DIRECTION: &str = "wd";
/// Header name of the optional station-name column.
pub const STATION: &str = "station";

// ---------------------------------------------------------------------------
// Pollutant – the choices offered by the distribution chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pollutant {
    #[default]
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 5] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Co,
    ];

    pub fn column(self) -> Column {
        match self {
            Pollutant::Pm25 => Column::Pm25,
            Pollutant::Pm10 => Column::Pm10,
            Pollutant::So2 => Column::So2,
            Pollutant::No2 => Column::No2,
            Pollutant::Co => Column::Co,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column().name())
    }
}

// ---------------------------------------------------------------------------
// Grouping keys
// ---------------------------------------------------------------------------

/// Categorical keys an aggregate can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Month,
    Hour,
    WindDirection,
}

/// A single group key value. Integer keys sort numerically, text keys
/// lexically, as a groupby over either kind of column would.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Integer(i) => write!(f, "{i}"),
            KeyValue::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one hourly observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub no: Option<i64>,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
    pub temp: Option<f64>,
    pub pres: Option<f64>,
    pub dewp: Option<f64>,
    pub rain: Option<f64>,
    /// Wind direction code (`N`, `NNE`, ...).
    pub wd: Option<String>,
    pub wspm: Option<f64>,
    pub station: Option<String>,
}

impl Record {
    /// A record stamped at the given time with every measurement missing.
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Record {
            year,
            month,
            day,
            hour,
            ..Default::default()
        }
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, column: Column, value: Option<f64>) -> Self {
        self.set(column, value);
        self
    }

    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::No => self.no.map(|n| n as f64),
            Column::Year => Some(self.year as f64),
            Column::Month => Some(self.month as f64),
            Column::Day => Some(self.day as f64),
            Column::Hour => Some(self.hour as f64),
            other => self.measurement(other).copied().flatten(),
        }
    }

    /// Assign a cell. Timestamp columns ignore a missing value.
    pub fn set(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::No => self.no = value.map(|v| v as i64),
            Column::Year => {
                if let Some(v) = value {
                    self.year = v as i32;
                }
            }
            Column::Month => {
                if let Some(v) = value {
                    self.month = v as u32;
                }
            }
            Column::Day => {
                if let Some(v) = value {
                    self.day = v as u32;
                }
            }
            Column::Hour => {
                if let Some(v) = value {
                    self.hour = v as u32;
                }
            }
            other => {
                if let Some(slot) = self.measurement_mut(other) {
                    *slot = value;
                }
            }
        }
    }

    pub fn key(&self, key: GroupKey) -> Option<KeyValue> {
        match key {
            GroupKey::Month => Some(KeyValue::Integer(self.month as i64)),
            GroupKey::Hour => Some(KeyValue::Integer(self.hour as i64)),
            GroupKey::WindDirection => self.wd.clone().map(KeyValue::Text),
        }
    }

    fn measurement(&self, column: Column) -> Option<&Option<f64>> {
        Some(match column {
            Column::Pm25 => &self.pm25,
            Column::Pm10 => &self.pm10,
            Column::So2 => &self.so2,
            Column::No2 => &self.no2,
            Column::Co => &self.co,
            Column::O3 => &self.o3,
            Column::Temp => &self.temp,
            Column::Pres => &self.pres,
            Column::Dewp => &self.dewp,
            Column::Rain => &self.rain,
            Column::Wspm => &self.wspm,
            _ => return None,
        })
    }

    pub(crate) fn measurement_mut(&mut self, column: Column) -> Option<&mut Option<f64>> {
        Some(match column {
            Column::Pm25 => &mut self.pm25,
            Column::Pm10 => &mut self.pm10,
            Column::So2 => &mut self.so2,
            Column::No2 => &mut self.no2,
            Column::Co => &mut self.co,
            Column::O3 => &mut self.o3,
            Column::Temp => &mut self.temp,
            Column::Pres => &mut self.pres,
            Column::Dewp => &mut self.dewp,
            Column::Rain => &mut self.rain,
            Column::Wspm => &mut self.wspm,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed selection indices.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// Numeric columns present in the source, in canonical order.
    columns: Vec<Column>,
    years: BTreeSet<i32>,
    months: BTreeSet<u32>,
}

impl Dataset {
    /// Build indices from loaded records. `columns` lists the numeric
    /// columns the source actually carried.
    pub fn from_records(records: Vec<Record>, columns: impl IntoIterator<Item = Column>) -> Self {
        let present: BTreeSet<Column> = columns.into_iter().collect();
        let columns = Column::ALL
            .iter()
            .copied()
            .filter(|c| present.contains(c))
            .collect();
        let years = records.iter().map(|r| r.year).collect();
        let months = records.iter().map(|r| r.month).collect();
        Dataset {
            records,
            columns,
            years,
            months,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Distinct months present, ascending.
    pub fn months(&self) -> &BTreeSet<u32> {
        &self.months
    }

    /// Station name of the first row that carries one.
    pub fn station(&self) -> Option<&str> {
        self.records.iter().find_map(|r| r.station.as_deref())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_round_trip() {
        for col in Column::ALL {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("pm2.5"), None);
        assert_eq!(Column::from_name(WIND_DIRECTION), None);
    }

    #[test]
    fn test_record_set_and_value() {
        let rec = Record::at(2013, 3, 1, 0)
            .with(Column::Pm25, Some(4.0))
            .with(Column::Temp, Some(-0.7))
            .with(Column::Year, None);
        assert_eq!(rec.value(Column::Pm25), Some(4.0));
        assert_eq!(rec.value(Column::Temp), Some(-0.7));
        assert_eq!(rec.value(Column::Rain), None);
        assert_eq!(rec.value(Column::Year), Some(2013.0));
        assert_eq!(rec.value(Column::No), None);
    }

    #[test]
    fn test_key_value_ordering() {
        let mut keys = vec![
            KeyValue::Integer(12),
            KeyValue::Integer(2),
            KeyValue::Text("NW".into()),
            KeyValue::Text("E".into()),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                KeyValue::Integer(2),
                KeyValue::Integer(12),
                KeyValue::Text("E".into()),
                KeyValue::Text("NW".into()),
            ]
        );
    }

    #[test]
    fn test_dataset_indices() {
        let ds = Dataset::from_records(
            vec![
                Record::at(2014, 2, 1, 0),
                Record::at(2013, 12, 1, 0),
                Record::at(2014, 2, 1, 1),
            ],
            [Column::Pm25, Column::Year, Column::Month],
        );
        assert_eq!(ds.years().iter().copied().collect::<Vec<_>>(), vec![2013, 2014]);
        assert_eq!(ds.months().iter().copied().collect::<Vec<_>>(), vec![2, 12]);
        assert_eq!(ds.columns(), &[Column::Year, Column::Month, Column::Pm25]);
        assert!(ds.has_column(Column::Pm25));
        assert!(!ds.has_column(Column::Wspm));
        assert_eq!(ds.station(), None);
    }

    #[test]
    fn test_station_from_first_named_row() {
        let named = Record {
            station: Some("Dongsi".to_string()),
            ..Record::at(2013, 3, 1, 1)
        };
        let ds = Dataset::from_records(vec![Record::at(2013, 3, 1, 0), named], [Column::Pm25]);
        assert_eq!(ds.station(), Some("Dongsi"));
    }
}
