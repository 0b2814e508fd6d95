//! US Census population estimates client.
//!
//! The endpoint answers with a JSON table: a header row followed by
//! `[NAME, POP, state, county]` rows. Cells are normalized to strings here;
//! interpreting them is the registry's job.

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{body_snippet, Error};

#[derive(Debug, Clone)]
pub struct CensusClient {
    client: reqwest::Client,
    url: String,
    state_fips: String,
    api_key: Option<String>,
}

impl CensusClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url: config.census_url.clone(),
            state_fips: config.state_fips.clone(),
            api_key: config.census_key.clone(),
        }
    }

    /// Fetch the population table, header row included.
    pub async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, Error> {
        let mut params = vec![
            ("get", "NAME,POP".to_string()),
            ("for", "county:*".to_string()),
            ("in", format!("state:{}", self.state_fips)),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        debug!("Fetching county populations from {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::from_http("census", e))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::DataSource(format!(
                "census returned {}: {}",
                status,
                body_snippet(&body)
            )));
        }

        let table: Vec<Vec<Value>> = resp
            .json()
            .await
            .map_err(|e| Error::DataSource(format!("census JSON parse error: {e}")))?;

        let rows: Vec<Vec<String>> = table
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        debug!("Census returned {} rows", rows.len());
        Ok(rows)
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CensusClient {
        let config = Config {
            census_url: format!("{}/data/2019/pep/population", server.uri()),
            census_key: Some("k3y".to_string()),
            ..Config::default()
        };
        CensusClient::new(config.http_client().unwrap(), &config)
    }

    #[tokio::test]
    async fn fetches_and_normalizes_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2019/pep/population"))
            .and(query_param("get", "NAME,POP"))
            .and(query_param("for", "county:*"))
            .and(query_param("in", "state:06"))
            .and(query_param("key", "k3y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                ["NAME", "POP", "state", "county"],
                ["Yolo County, California", "220500", "06", "113"],
                ["Alpine County, California", 1129, "06", "003"]
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server).fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "Yolo County, California");
        assert_eq!(rows[2][1], "1129");
    }

    #[tokio::test]
    async fn non_200_is_a_data_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_rows().await.unwrap_err();
        assert!(matches!(err, Error::DataSource(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn non_table_body_is_a_data_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "nope"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_rows().await.unwrap_err();
        assert!(matches!(err, Error::DataSource(_)));
    }
}
