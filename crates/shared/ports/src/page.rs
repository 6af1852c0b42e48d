use relay_core::{Page, Record};

/// Port for reading one reply's items
///
/// Mirrors how the venue exposes results: item `index`, field `name`, raw
/// string value. Implementations may read lazily from the venue while the
/// notification is being handled.
pub trait PageReader: Send + Sync {
    /// Number of items in the page
    fn len(&self) -> usize;

    /// Raw value of `name` on item `index`
    fn field(&self, index: usize, name: &str) -> Option<String>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect the given fields of item `index` into a record
    fn record(&self, index: usize, fields: &[&str]) -> Record {
        fields
            .iter()
            .filter_map(|name| {
                self.field(index, name)
                    .map(|value| (name.to_string(), value.trim().to_string()))
            })
            .collect()
    }
}

impl PageReader for Page {
    fn len(&self) -> usize {
        Page::len(self)
    }

    fn field(&self, index: usize, name: &str) -> Option<String> {
        self.row(index)
            .and_then(|row| row.get(name))
            .map(str::to_string)
    }
}
