use super::model::{Column, Dataset};

/// Replace each missing value with the most recent preceding present one.
/// Leading gaps stay missing. Applying it twice changes nothing.
pub fn forward_fill(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    series
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

impl Dataset {
    /// Forward-fill one measurement column in place, in record order.
    /// Returns the number of cells that were filled; timestamp columns are
    /// never missing and are left alone.
    pub fn forward_fill(&mut self, column: Column) -> usize {
        let mut last = None;
        let mut filled = 0;
        for rec in self.records_mut() {
            let Some(slot) = rec.measurement_mut(column) else {
                return 0;
            };
            if slot.is_some() {
                last = *slot;
            } else if last.is_some() {
                *slot = last;
                filled += 1;
            }
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    #[test]
    fn test_forward_fill_series() {
        let s = [None, Some(1.0), None, None, Some(4.0), None];
        assert_eq!(
            forward_fill(&s),
            vec![None, Some(1.0), Some(1.0), Some(1.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn test_forward_fill_is_idempotent() {
        let s = [Some(2.0), None, None, Some(-1.0), None];
        let once = forward_fill(&s);
        assert_eq!(forward_fill(&once), once);
    }

    #[test]
    fn test_forward_fill_empty_and_all_missing() {
        assert!(forward_fill(&[]).is_empty());
        assert_eq!(forward_fill(&[None, None]), vec![None, None]);
    }

    #[test]
    fn test_dataset_forward_fill_in_place() {
        let mut ds = Dataset::from_records(
            vec![
                Record::at(2013, 3, 1, 0),
                Record::at(2013, 3, 1, 1).with(Column::Pm25, Some(9.0)),
                Record::at(2013, 3, 1, 2),
                Record::at(2013, 3, 1, 3).with(Column::Pm25, Some(3.0)),
            ],
            Column::ALL,
        );
        assert_eq!(ds.forward_fill(Column::Pm25), 1);
        let pm: Vec<_> = ds.records().iter().map(|r| r.pm25).collect();
        assert_eq!(pm, vec![None, Some(9.0), Some(9.0), Some(3.0)]);

        assert_eq!(ds.forward_fill(Column::Pm25), 0);
        let again: Vec<_> = ds.records().iter().map(|r| r.pm25).collect();
        assert_eq!(again, pm);

        assert_eq!(ds.forward_fill(Column::Hour), 0);
    }
}
