//! Trailing-window confirmed case counts from the California open data portal.

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{body_snippet, Error};
use crate::models::CaseCount;

/// Anything that can answer "how many new cases in this county recently".
pub trait CaseCountSource {
    async fn fetch(&self, county: &str) -> Result<CaseCount, Error>;
}

/// Client for the CKAN `datastore_search_sql` action.
#[derive(Debug, Clone)]
pub struct CkanCaseClient {
    client: reqwest::Client,
    url: String,
    resource_id: String,
    window_days: i64,
}

#[derive(Debug, Deserialize)]
struct SqlResponse {
    #[serde(default = "default_success")]
    success: bool,
    result: Option<SqlResult>,
}

#[derive(Debug, Deserialize)]
struct SqlResult {
    #[serde(default)]
    records: Vec<Map<String, Value>>,
}

fn default_success() -> bool {
    true
}

impl CkanCaseClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url: config.cases_url.clone(),
            resource_id: config.cases_resource.clone(),
            window_days: config.window_days,
        }
    }
}

impl CaseCountSource for CkanCaseClient {
    async fn fetch(&self, county: &str) -> Result<CaseCount, Error> {
        let cutoff = cutoff_date(self.window_days);
        let sql = build_case_sql(&self.resource_id, county, cutoff);

        debug!("Fetching case count for {} since {}", county, cutoff);

        let resp = self
            .client
            .get(&self.url)
            .query(&[("sql", sql.as_str())])
            .send()
            .await
            .map_err(|e| Error::from_http("case registry", e))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::DataSource(format!(
                "case registry returned {} for {}: {}",
                status,
                county,
                body_snippet(&body)
            )));
        }

        let body: SqlResponse = resp.json().await.map_err(|e| {
            Error::DataSource(format!("case registry JSON parse error for {county}: {e}"))
        })?;

        let cases = extract_sum(body, county)?;
        debug!("{}: {} new cases in the last {} days", county, cases, self.window_days);
        Ok(cases)
    }
}

/// First day excluded from the window; rows strictly after it are counted.
pub fn cutoff_date(window_days: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(window_days.max(1))
}

pub fn build_case_sql(resource_id: &str, county: &str, cutoff: NaiveDate) -> String {
    format!(
        "SELECT SUM(newcountconfirmed) FROM \"{}\" WHERE date > '{}' AND county = '{}'",
        resource_id,
        cutoff.format("%Y-%m-%d"),
        county.replace('\'', "''")
    )
}

fn extract_sum(body: SqlResponse, county: &str) -> Result<CaseCount, Error> {
    if !body.success {
        return Err(Error::DataSource(format!(
            "case registry reported failure for {county}"
        )));
    }

    let record = body
        .result
        .and_then(|result| result.records.into_iter().next())
        .ok_or_else(|| {
            Error::DataSource(format!("case registry returned no records for {county}"))
        })?;

    let sum = record.get("sum").ok_or_else(|| {
        Error::DataSource(format!("case registry record for {county} has no sum"))
    })?;

    let value = match sum {
        // No rows in the window.
        Value::Null => 0,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| Error::DataSource(format!("non-integer case sum {n} for {county}")))?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            Error::DataSource(format!("unparseable case sum {s:?} for {county}"))
        })?,
        other => {
            return Err(Error::DataSource(format!(
                "unexpected case sum {other} for {county}"
            )))
        }
    };

    if value < 0 {
        warn!("Negative case sum {} for {}, treating as 0", value, county);
        return Ok(0);
    }
    Ok(value as CaseCount)
}
