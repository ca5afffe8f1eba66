//! Per-epoch metric history

/// Ordered, append-only named series of per-epoch values
///
/// Each tracked series grows by exactly one value per completed epoch and
/// is read once at the end of training by the reporting hook.
#[derive(Debug, Clone, Default)]
pub struct History {
    series: Vec<(String, Vec<f32>)>,
}

impl History {
    /// Track the given series, in display order
    pub fn with_series(names: &[&str]) -> Self {
        Self {
            series: names.iter().map(|n| (n.to_string(), Vec::new())).collect(),
        }
    }

    /// Append one epoch value to a tracked series
    ///
    /// # Panics
    ///
    /// Panics if the series was not declared up front; the trainers own
    /// their series lists.
    pub fn append(&mut self, name: &str, value: f32) {
        let (_, values) = self
            .series
            .iter_mut()
            .find(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("unknown history series `{name}`"));
        values.push(value);
    }

    /// Values of one series
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// All series in declaration order
    pub fn series(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.series.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Number of completed epochs recorded
    pub fn epochs(&self) -> usize {
        self.series.first().map_or(0, |(_, v)| v.len())
    }
}
