//! Categorized views over a comparison's outputs.

use arachne_api::{Category, DiffRecord};
use std::collections::BTreeMap;

/// Index over one comparison's output differences: the output types present
/// in each category, and the records belonging to each type.
///
/// Borrowed views onto the raw records; building the index copies nothing
/// but names.
#[derive(Debug)]
pub struct OutputIndex<'a> {
    records: &'a [DiffRecord],
    /// Output types present per category, in first-seen order, no repeats.
    types_by_cat: BTreeMap<Category, Vec<&'a str>>,
    /// Record positions per output type.
    by_type: BTreeMap<&'a str, Vec<usize>>,
    /// Record position by variable name.
    by_name: BTreeMap<&'a str, usize>,
}

impl<'a> OutputIndex<'a> {
    pub fn new(records: &'a [DiffRecord]) -> Self {
        let mut types_by_cat: BTreeMap<Category, Vec<&str>> = BTreeMap::new();
        let mut by_type: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        let mut by_name = BTreeMap::new();

        for (i, record) in records.iter().enumerate() {
            let types = types_by_cat.entry(record.category).or_default();
            if !types.contains(&record.diff_type.as_str()) {
                types.push(&record.diff_type);
            }
            by_type.entry(record.diff_type.as_str()).or_default().push(i);
            by_name.insert(record.name.as_str(), i);
        }

        OutputIndex {
            records,
            types_by_cat,
            by_type,
            by_name,
        }
    }

    /// Total number of outputs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Output types present in the category, in first-seen order.
    pub fn types_in(&self, cat: Category) -> &[&'a str] {
        self.types_by_cat.get(&cat).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of outputs in the category.
    pub fn cat_size(&self, cat: Category) -> usize {
        self.types_in(cat)
            .iter()
            .map(|t| self.of_type(t).count())
            .sum()
    }

    /// The outputs of one type, in record order.
    pub fn of_type(&self, diff_type: &str) -> impl Iterator<Item = &'a DiffRecord> {
        self.by_type
            .get(diff_type)
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
    }

    /// Look up one output by variable name.
    pub fn get(&self, name: &str) -> Option<&'a DiffRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// All output variable names, sorted.
    pub fn names(&self) -> Vec<&'a str> {
        self.by_name.keys().copied().collect()
    }
}
