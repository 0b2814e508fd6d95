//! One recompute: validate inputs, resolve cases through the cache, score.

use serde::Serialize;

use crate::cache;
use crate::cases::CaseCountSource;
use crate::error::Error;
use crate::models::{Attendance, CacheEntry, CaseCount, RiskResult, Trigger};
use crate::registry::CountyRegistry;
use crate::report;
use crate::risk;

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub trigger: Trigger,
    pub county: String,
    pub attendance: Attendance,
    pub cached: Option<CacheEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateResponse {
    pub county: String,
    pub attendees: u32,
    pub cases: CaseCount,
    pub population: u64,
    pub risk: RiskResult,
    pub attendee_label: String,
    /// Hand this back as `cached` on the next request.
    pub cache: CacheEntry,
}

pub fn resolve_attendance(attendance: Attendance) -> Result<u32, Error> {
    match attendance {
        Attendance::Slider(value) => risk::attendees_from_slider(value),
        Attendance::Count(count) => Ok(count),
    }
}

pub async fn update<S>(
    registry: &CountyRegistry,
    source: &S,
    request: UpdateRequest,
) -> Result<UpdateResponse, Error>
where
    S: CaseCountSource,
{
    // Both checks happen before any fetch.
    let population = registry.population(&request.county)?;
    let attendees = resolve_attendance(request.attendance)?;

    let (cases, cache) =
        cache::resolve(source, request.trigger, &request.county, request.cached).await?;
    let percentage = risk::compute(cases, population, attendees)?;

    Ok(UpdateResponse {
        county: request.county,
        attendees,
        cases,
        population,
        risk: RiskResult {
            percentage,
            label: report::risk_label(percentage),
        },
        attendee_label: report::attendee_label(attendees),
        cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::CountingSource;

    fn registry() -> CountyRegistry {
        CountyRegistry::from_rows(vec![
            vec!["Big County, California".to_string(), "1000000".to_string()],
            vec!["Yolo County, California".to_string(), "220500".to_string()],
        ])
        .unwrap()
    }

    fn request(trigger: Trigger, county: &str, attendance: Attendance) -> UpdateRequest {
        UpdateRequest {
            trigger,
            county: county.to_string(),
            attendance,
            cached: None,
        }
    }

    #[tokio::test]
    async fn computes_risk_and_labels() {
        let source = CountingSource::with(&[("Big", 3_000)]);
        let response = update(
            &registry(),
            &source,
            request(Trigger::CountyChanged, "Big", Attendance::Slider(1.7)),
        )
        .await
        .unwrap();

        assert_eq!(response.attendees, 50);
        assert_eq!(response.cases, 3_000);
        assert_eq!(response.population, 1_000_000);
        assert_eq!(response.risk.percentage, 14.0);
        assert_eq!(response.risk.label, "14 %");
        assert_eq!(response.attendee_label, "50 people attending");
        assert_eq!(
            response.cache,
            CacheEntry {
                county: "Big".to_string(),
                cases: 3_000
            }
        );
    }

    #[tokio::test]
    async fn unknown_county_never_fetches() {
        let source = CountingSource::default();
        let err = update(
            &registry(),
            &source,
            request(Trigger::CountyChanged, "Atlantis", Attendance::Count(5)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(source.calls.get(), 0);
    }

    #[tokio::test]
    async fn bad_slider_never_fetches() {
        let source = CountingSource::default();
        let err = update(
            &registry(),
            &source,
            request(Trigger::CountyChanged, "Yolo", Attendance::Slider(4.0)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(source.calls.get(), 0);
    }

    #[tokio::test]
    async fn cached_entry_is_reused_for_attendee_changes() {
        let source = CountingSource::with(&[("Big", 1)]);
        let mut req = request(Trigger::AttendeeChanged, "Big", Attendance::Count(1));
        req.cached = Some(CacheEntry {
            county: "Big".to_string(),
            cases: 3_000,
        });

        let response = update(&registry(), &source, req).await.unwrap();
        assert_eq!(source.calls.get(), 0);
        assert_eq!(response.cases, 3_000);
        assert_eq!(response.attendee_label, "1 person (just yourself) attending");
    }

    #[tokio::test]
    async fn fetch_failure_returns_no_response() {
        let source = CountingSource::default();
        source.fail.set(true);
        let result = update(
            &registry(),
            &source,
            request(Trigger::CountyChanged, "Yolo", Attendance::Count(10)),
        )
        .await;
        assert!(matches!(result, Err(Error::DataSource(_))));
    }
}
