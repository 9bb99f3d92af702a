use super::model::{Column, Dataset, Record};

// ---------------------------------------------------------------------------
// View – the rows matching a (year, month) selection
// ---------------------------------------------------------------------------

/// A non-owning subset of a [`Dataset`], kept as row indices in source order.
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    /// A view over every row.
    pub fn all(dataset: &'a Dataset) -> Self {
        View {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    /// One column of the view, missing cells kept as `None`.
    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        self.records().map(|r| r.value(column)).collect()
    }
}

/// Return the rows whose year and month equal the selection, in source order.
/// No match yields an empty view rather than an error.
pub fn filter(dataset: &Dataset, year: i32, month: u32) -> View<'_> {
    let indices = filtered_indices(dataset, |r| r.year == year && r.month == month);
    View { dataset, indices }
}

/// Rows of a single year, across all months.
pub fn filter_year(dataset: &Dataset, year: i32) -> View<'_> {
    let indices = filtered_indices(dataset, |r| r.year == year);
    View { dataset, indices }
}

fn filtered_indices(dataset: &Dataset, keep: impl Fn(&Record) -> bool) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| keep(r))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Month names
// ---------------------------------------------------------------------------

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parse a month given as `1`..`12`, a full English name, or a three-letter
/// abbreviation (case-insensitive).
pub fn parse_month(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(s) || (s.len() == 3 && name[..3].eq_ignore_ascii_case(s)))
        .map(|i| i as u32 + 1)
}

/// Full English month name, or `"?"` outside 1..=12.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}
