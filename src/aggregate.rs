//! Multi-user set algebra over record collections.
//! Feed per-user collections to a `SetAggregator` (or call `aggregate`) and get the
//! union or intersection back, compared by a caller-selected key.

use crate::config::DEFAULT_EXCLUDE_FIELDS;
use crate::error::{Error, Result};
use crate::record::{canonical_key, clear_empty, identifier, project_id, strip_fields, Collection, Record};
use ahash::AHashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetMode {
    Union,
    Intersection,
}

/// Equality rule used to compare records across users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyGranularity {
    /// Records are projected to `{id}` and compared by identifier.
    IdentifierOnly,
    /// Records compare equal only when every remaining field matches.
    /// `exclude` names bookkeeping fields stripped before comparison.
    FullRecord { exclude: Vec<String> },
}

impl KeyGranularity {
    pub fn full_record() -> Self {
        Self::FullRecord { exclude: DEFAULT_EXCLUDE_FIELDS.iter().map(|s| s.to_string()).collect() }
    }

    /// Prepare a record for comparison and output.
    pub fn normalize(&self, rec: &Record) -> Record {
        match self {
            KeyGranularity::IdentifierOnly if rec.contains_key(crate::record::ID_FIELD) => project_id(rec),
            KeyGranularity::IdentifierOnly => {
                let mut out = rec.clone();
                clear_empty(&mut out);
                out
            }
            KeyGranularity::FullRecord { exclude } => {
                let mut out = rec.clone();
                clear_empty(&mut out);
                strip_fields(&mut out, exclude);
                out
            }
        }
    }
}

/// Derived comparison key for a normalized record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AggregationKey {
    Id(String),
    Full(String),
}

impl AggregationKey {
    pub fn of(rec: &Record, granularity: &KeyGranularity) -> Self {
        match granularity {
            KeyGranularity::IdentifierOnly => match identifier(rec) {
                Some(id) => AggregationKey::Id(id),
                None => AggregationKey::Full(canonical_key(rec)),
            },
            KeyGranularity::FullRecord { .. } => AggregationKey::Full(canonical_key(rec)),
        }
    }
}

/// Normalize every record of a collection under `granularity`.
pub fn normalize_collection(c: &[Record], granularity: &KeyGranularity) -> Collection {
    c.iter().map(|r| granularity.normalize(r)).collect()
}

/// Left-to-right accumulator. The first ingested collection seeds the result.
pub struct SetAggregator {
    mode: SetMode,
    granularity: KeyGranularity,
    inputs: usize,
    records: Collection,
    keys: AHashSet<AggregationKey>,
}

impl SetAggregator {
    pub fn new(mode: SetMode, granularity: KeyGranularity) -> Self {
        Self { mode, granularity, inputs: 0, records: Vec::new(), keys: AHashSet::new() }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn ingest(&mut self, collection: &[Record]) {
        self.inputs += 1;
        if self.inputs == 1 {
            // Kept verbatim until a second input arrives.
            self.records = normalize_collection(collection, &self.granularity);
            return;
        }
        if self.inputs == 2 {
            self.dedup_seed();
        }
        match self.mode {
            SetMode::Union => {
                for rec in collection {
                    let rec = self.granularity.normalize(rec);
                    if self.keys.insert(AggregationKey::of(&rec, &self.granularity)) {
                        self.records.push(rec);
                    }
                }
            }
            SetMode::Intersection => {
                let other: AHashSet<AggregationKey> = collection
                    .iter()
                    .map(|r| AggregationKey::of(&self.granularity.normalize(r), &self.granularity))
                    .collect();
                self.keys.retain(|k| other.contains(k));
                let keys = &self.keys;
                let granularity = &self.granularity;
                self.records.retain(|r| keys.contains(&AggregationKey::of(r, granularity)));
            }
        }
    }

    /// Collapse duplicates inside the seed collection once set semantics apply.
    fn dedup_seed(&mut self) {
        let seed = std::mem::take(&mut self.records);
        for rec in seed {
            if self.keys.insert(AggregationKey::of(&rec, &self.granularity)) {
                self.records.push(rec);
            }
        }
    }

    pub fn finish(self) -> Result<Collection> {
        if self.inputs == 0 {
            return Err(Error::EmptyInput);
        }
        tracing::debug!(inputs = self.inputs, mode = ?self.mode, records = self.records.len(), "aggregated");
        Ok(self.records)
    }
}

/// Union or intersection of per-user collections.
/// One collection is returned normalized but otherwise unchanged.
pub fn aggregate<C: AsRef<[Record]>>(
    collections: &[C],
    mode: SetMode,
    granularity: &KeyGranularity,
) -> Result<Collection> {
    let mut agg = SetAggregator::new(mode, granularity.clone());
    for c in collections {
        agg.ingest(c.as_ref());
    }
    agg.finish()
}
