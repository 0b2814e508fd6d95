//! County name -> population lookup, loaded once and read-only afterwards.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::census::CensusClient;
use crate::error::Error;
use crate::models::CountyRecord;

#[derive(Debug, Clone, Default)]
pub struct CountyRegistry {
    counties: HashMap<String, CountyRecord>,
}

impl CountyRegistry {
    /// Load populations from the census endpoint. The first row is a header.
    pub async fn load(census: &CensusClient) -> Result<Self, Error> {
        let rows = census.fetch_rows().await?;
        if rows.len() < 2 {
            return Err(Error::DataSource("census returned no county rows".to_string()));
        }
        Self::from_rows(rows.into_iter().skip(1))
    }

    /// Load populations from a CSV snapshot with a header and `name,population` columns.
    pub fn from_csv_path(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path).map_err(|e| {
            Error::DataSource(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record =
                result.map_err(|e| Error::DataSource(format!("CSV parse error: {e}")))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Self::from_rows(rows)
    }

    /// Build from header-less `[name, population, ..]` rows, skipping any
    /// row that cannot be interpreted.
    pub fn from_rows<I>(rows: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut counties = HashMap::new();
        let mut skipped = 0usize;

        for row in rows {
            let (Some(raw_name), Some(raw_pop)) = (row.first(), row.get(1)) else {
                warn!("Skipping short population row: {:?}", row);
                skipped += 1;
                continue;
            };

            let Some(name) = parse_county_name(raw_name) else {
                warn!("Skipping row with unparseable county label {:?}", raw_name);
                skipped += 1;
                continue;
            };

            let population = match raw_pop.trim().parse::<u64>() {
                Ok(pop) if pop > 0 => pop,
                _ => {
                    warn!("Skipping {} with invalid population {:?}", name, raw_pop);
                    skipped += 1;
                    continue;
                }
            };

            if counties.contains_key(&name) {
                debug!("Duplicate county {}, keeping the later row", name);
            }
            counties.insert(name.clone(), CountyRecord { name, population });
        }

        if counties.is_empty() {
            return Err(Error::DataSource(format!(
                "population dataset had no usable county rows ({skipped} skipped)"
            )));
        }

        info!("Loaded {} counties ({} rows skipped)", counties.len(), skipped);
        Ok(Self { counties })
    }

    pub fn lookup(&self, name: &str) -> Option<&CountyRecord> {
        self.counties.get(name)
    }

    pub fn population(&self, name: &str) -> Result<u64, Error> {
        self.lookup(name)
            .map(|record| record.population)
            .ok_or_else(|| Error::InvalidInput(format!("unknown county {name:?}")))
    }

    /// County names in display order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .counties
            .values()
            .map(|record| record.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }
}

/// "Yolo County, California" -> "Yolo". Everything from the first " County"
/// onwards is dropped; labels without one (or with nothing before it) are rejected.
pub fn parse_county_name(raw: &str) -> Option<String> {
    let first = raw.chars().next()?.len_utf8();
    let idx = raw[first..].find(" County")? + first;
    let name = raw[..idx].trim();
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}
