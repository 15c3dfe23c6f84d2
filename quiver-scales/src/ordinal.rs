use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexSet;

use crate::error::QuiverScaleError;

/// Maps discrete domain keys to discrete range values.
///
/// When the range is shorter than the domain it is reused cyclically.
/// Keys outside the domain map to `unknown`, if one is configured.
#[derive(Debug, Clone)]
pub struct OrdinalScale<D: Debug + Clone + Hash + Eq, R: Debug + Clone> {
    domain: IndexSet<D>,
    range: Vec<R>,
    unknown: Option<R>,
}

impl<D: Debug + Clone + Hash + Eq, R: Debug + Clone> OrdinalScale<D, R> {
    pub fn try_new(domain: Vec<D>, range: Vec<R>) -> Result<Self, QuiverScaleError> {
        if range.is_empty() {
            return Err(QuiverScaleError::EmptyRange);
        }
        Ok(Self {
            domain: domain.into_iter().collect(),
            range,
            unknown: None,
        })
    }

    pub fn with_unknown(mut self, unknown: R) -> Self {
        self.unknown = Some(unknown);
        self
    }

    pub fn scale(&self, key: &D) -> Option<R> {
        match self.domain.get_index_of(key) {
            Some(i) => Some(self.range[i % self.range.len()].clone()),
            None => self.unknown.clone(),
        }
    }

    pub fn domain(&self) -> impl Iterator<Item = &D> {
        self.domain.iter()
    }

    pub fn range(&self) -> &[R] {
        &self.range
    }

    pub fn unknown(&self) -> Option<&R> {
        self.unknown.as_ref()
    }
}
