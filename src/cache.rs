//! Decides whether a recompute can reuse the last fetched case count.
//!
//! The cache is keyed by "last fetch", not by county: an attendee-only
//! trigger reuses whatever was resolved last, and an explicit county
//! selection always refetches, even for the county already cached.

use tracing::debug;

use crate::cases::CaseCountSource;
use crate::error::Error;
use crate::models::{CacheEntry, CaseCount, Trigger};

pub async fn resolve<S>(
    source: &S,
    trigger: Trigger,
    requested_county: &str,
    cached: Option<CacheEntry>,
) -> Result<(CaseCount, CacheEntry), Error>
where
    S: CaseCountSource,
{
    let cases = match (cached, trigger) {
        (Some(entry), Trigger::AttendeeChanged) => {
            if entry.county != requested_county {
                debug!(
                    "Attendee change for {} reuses cases cached for {}",
                    requested_county, entry.county
                );
            } else {
                debug!("Reusing {} cached cases for {}", entry.cases, entry.county);
            }
            entry.cases
        }
        (None, _) | (Some(_), Trigger::CountyChanged) => {
            debug!("Fetching cases for {} ({:?})", requested_county, trigger);
            source.fetch(requested_county).await?
        }
    };

    Ok((
        cases,
        CacheEntry {
            county: requested_county.to_string(),
            cases,
        },
    ))
}
