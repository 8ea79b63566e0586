use crate::logs::stats::AcceleratorCounts;

/// Labels and values for one frame of the bar chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartData {
    pub fn from_counts(counts: &AcceleratorCounts) -> Self {
        let (labels, values) = counts.iter().map(|(k, v)| (k.clone(), *v)).unzip();
        Self { labels, values }
    }

    pub fn value_of(&self, label: &str) -> Option<u64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|idx| self.values.get(idx).copied())
    }

    /// Reorder onto the known accelerator list so rows keep their place
    /// between frames.
    ///
    /// Known accelerators come first in their configured order, with 0 when
    /// absent. Labels the device reported that are not known follow, in the
    /// order they were reported.
    pub fn zero_filled(self, known: &[String]) -> Self {
        let mut labels = Vec::with_capacity(known.len() + self.labels.len());
        let mut values = Vec::with_capacity(labels.capacity());

        for name in known {
            labels.push(name.clone());
            values.push(self.value_of(name).unwrap_or(0));
        }
        for (label, value) in self.labels.into_iter().zip(self.values) {
            if !known.contains(&label) {
                labels.push(label);
                values.push(value);
            }
        }

        Self { labels, values }
    }
}

/// Bar length per value: `floor(width * value / max)`, at least one column
/// for any non-zero value and zero for zero.
pub fn bar_lengths(values: &[u64], width: u16) -> Vec<u16> {
    let max = values.iter().copied().max().unwrap_or(0);
    values
        .iter()
        .map(|&value| {
            if value == 0 || max == 0 {
                return 0;
            }
            let scaled = (u128::from(width) * u128::from(value) / u128::from(max)) as u16;
            scaled.max(1)
        })
        .collect()
}
