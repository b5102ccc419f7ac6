//! Satellite catalog loading and selection.
//!
//! Records keep the order of the source feed; lookups by NORAD id and by
//! name go through side indexes into that ordered storage.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use sgp4::Elements;

use crate::error::{Result, TrackError};
use crate::time::Epoch;

pub const DEFAULT_CATALOG_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=stations&FORMAT=tle";

/// One catalogued object and its two-line elements.
#[derive(Debug, Clone)]
pub struct OrbitalElementSet {
    name: String,
    catalog_id: u64,
    elements: Elements,
}

impl OrbitalElementSet {
    pub fn from_elements(elements: Elements) -> Self {
        let catalog_id = elements.norad_id;
        let name = elements
            .object_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("NORAD {catalog_id}"));
        Self { name, catalog_id, elements }
    }

    pub fn from_tle(name: Option<&str>, line1: &str, line2: &str) -> Result<Self> {
        let name = name
            .map(|n| n.trim().trim_start_matches("0 ").trim().to_string())
            .filter(|n| !n.is_empty());
        let elements = Elements::from_tle(name, line1.trim().as_bytes(), line2.trim().as_bytes())
            .map_err(|e| TrackError::Load(format!("invalid TLE: {e}")))?;
        Ok(Self::from_elements(elements))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog_id(&self) -> u64 {
        self.catalog_id
    }

    pub fn international_designator(&self) -> Option<&str> {
        self.elements.international_designator.as_deref()
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// Reference epoch of the element set.
    pub fn epoch(&self) -> Epoch {
        Epoch::from_utc(self.elements.datetime.and_utc())
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<OrbitalElementSet>,
    by_id: HashMap<u64, usize>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. A record whose catalog id is already present
    /// replaces the earlier one in place.
    ///
    /// Names need not be unique; a name lookup resolves to the first record
    /// in catalog order that carries it.
    pub fn insert(&mut self, set: OrbitalElementSet) {
        let idx = match self.by_id.get(&set.catalog_id) {
            Some(&idx) => {
                warn!(
                    "[catalog] duplicate catalog id {} ({}), replacing earlier record",
                    set.catalog_id, set.name
                );
                let old = std::mem::replace(&mut self.entries[idx], set);
                if self.by_name.get(&old.name) == Some(&idx) {
                    match self.entries.iter().position(|e| e.name == old.name) {
                        Some(next) => self.by_name.insert(old.name, next),
                        None => self.by_name.remove(&old.name),
                    };
                }
                idx
            }
            None => {
                self.entries.push(set);
                self.entries.len() - 1
            }
        };

        let entry = &self.entries[idx];
        self.by_id.insert(entry.catalog_id, idx);
        match self.by_name.get(&entry.name) {
            Some(&first) if first < idx => {
                warn!(
                    "[catalog] {} (NORAD {}) shares its name with record {}, name lookups keep the earlier one",
                    entry.name,
                    entry.catalog_id,
                    first + 1
                );
            }
            _ => {
                self.by_name.insert(entry.name.clone(), idx);
            }
        }
    }

    /// Parses 3LE text (name line + two element lines). Bare 2LE records are
    /// accepted too and named after their catalog id.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect();

        let mut catalog = Self::new();
        let mut skipped = 0usize;
        let mut i = 0;
        while i + 1 < lines.len() {
            let (name, line1, line2, consumed) = if is_line(lines[i], '1') && is_line(lines[i + 1], '2') {
                (None, lines[i], lines[i + 1], 2)
            } else if i + 2 < lines.len() && is_line(lines[i + 1], '1') && is_line(lines[i + 2], '2') {
                (Some(lines[i]), lines[i + 1], lines[i + 2], 3)
            } else {
                i += 1;
                continue;
            };

            match OrbitalElementSet::from_tle(name, line1, line2) {
                Ok(set) => catalog.insert(set),
                Err(e) => {
                    skipped += 1;
                    debug!("[catalog] skipping record {:?}: {}", name, e);
                }
            }
            i += consumed;
        }

        if skipped > 0 {
            warn!("[catalog] skipped {} malformed records", skipped);
        }
        if catalog.is_empty() {
            return Err(TrackError::Load("no valid TLE records found".into()));
        }
        info!("[catalog] parsed {} element sets", catalog.len());
        Ok(catalog)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("[catalog] loading {:?}", path);
        let text = fs::read_to_string(path)
            .map_err(|e| TrackError::Load(format!("failed to read {path:?}: {e}")))?;
        Self::parse(&text)
    }

    /// Fetches the feed once; the whole request is bounded by `timeout`.
    pub fn fetch(url: &str, timeout: Duration) -> Result<Self> {
        info!("[catalog] fetching {} (timeout {:?})", url, timeout);
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let response = agent
            .get(url)
            .call()
            .map_err(|e| TrackError::Load(format!("HTTP error fetching {url}: {e}")))?;
        let body = response
            .into_string()
            .map_err(|e| TrackError::Load(format!("read error from {url}: {e}")))?;
        Self::parse(&body)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &OrbitalElementSet> {
        self.entries.iter()
    }

    pub fn get(&self, catalog_id: u64) -> Option<&OrbitalElementSet> {
        self.by_id.get(&catalog_id).map(|&i| &self.entries[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&OrbitalElementSet> {
        self.by_name.get(name.trim()).map(|&i| &self.entries[i])
    }
}

fn is_line(line: &str, number: char) -> bool {
    let mut chars = line.chars();
    chars.next() == Some(number) && chars.next() == Some(' ')
}

// ---------- Selection ----------

/// Resolves a 1-based index as shown in the catalog listing.
pub fn select_by_index(catalog: &Catalog, index: usize) -> Result<&OrbitalElementSet> {
    if index == 0 || index > catalog.len() {
        return Err(TrackError::InvalidSelection {
            input: index.to_string(),
            len: catalog.len(),
        });
    }
    Ok(&catalog.entries[index - 1])
}

/// Same as [`select_by_index`] for raw user input.
pub fn parse_selection<'a>(catalog: &'a Catalog, input: &str) -> Result<&'a OrbitalElementSet> {
    let index = input.trim().parse::<usize>().map_err(|_| TrackError::InvalidSelection {
        input: input.trim().to_string(),
        len: catalog.len(),
    })?;
    select_by_index(catalog, index)
}
