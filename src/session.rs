//! A single interactive session: one county selection, one attendee count,
//! and the one cache entry threaded between recomputes.

use std::str::FromStr;

use tracing::warn;

use crate::cases::CaseCountSource;
use crate::error::Error;
use crate::estimate::{self, UpdateRequest, UpdateResponse};
use crate::models::{Attendance, CacheEntry, Trigger};
use crate::registry::CountyRegistry;

pub const INITIAL_SLIDER: f64 = 1.0;

pub struct Session<'a, S> {
    registry: &'a CountyRegistry,
    source: &'a S,
    county: Option<String>,
    attendance: Attendance,
    cache: Option<CacheEntry>,
    last: Option<UpdateResponse>,
}

impl<'a, S: CaseCountSource> Session<'a, S> {
    pub fn new(registry: &'a CountyRegistry, source: &'a S) -> Self {
        Self {
            registry,
            source,
            county: None,
            attendance: Attendance::Slider(INITIAL_SLIDER),
            cache: None,
            last: None,
        }
    }

    pub async fn select_county(&mut self, county: &str) -> Result<&UpdateResponse, Error> {
        self.recompute(Trigger::CountyChanged, county.to_string(), self.attendance)
            .await
    }

    pub async fn set_slider(&mut self, value: f64) -> Result<&UpdateResponse, Error> {
        let county = self.selected_county()?;
        self.recompute(Trigger::AttendeeChanged, county, Attendance::Slider(value))
            .await
    }

    pub async fn set_attendees(&mut self, count: u32) -> Result<&UpdateResponse, Error> {
        let county = self.selected_county()?;
        self.recompute(Trigger::AttendeeChanged, county, Attendance::Count(count))
            .await
    }

    /// Last successful result; `None` before the first one and after a failure.
    pub fn current(&self) -> Option<&UpdateResponse> {
        self.last.as_ref()
    }

    pub fn cache(&self) -> Option<&CacheEntry> {
        self.cache.as_ref()
    }

    fn selected_county(&self) -> Result<String, Error> {
        self.county
            .clone()
            .ok_or_else(|| Error::InvalidInput("no county selected yet".to_string()))
    }

    // Inputs are committed only once the recompute succeeds; on failure the
    // previous cache entry stays and the displayed result is cleared.
    async fn recompute(
        &mut self,
        trigger: Trigger,
        county: String,
        attendance: Attendance,
    ) -> Result<&UpdateResponse, Error> {
        let request = UpdateRequest {
            trigger,
            county: county.clone(),
            attendance,
            cached: self.cache.clone(),
        };

        match estimate::update(self.registry, self.source, request).await {
            Ok(response) => {
                self.county = Some(county);
                self.attendance = attendance;
                self.cache = Some(response.cache.clone());
                Ok(&*self.last.insert(response))
            }
            Err(err) => {
                warn!("Recompute for {} failed: {}", county, err);
                self.last = None;
                Err(err)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    County(String),
    Slider(f64),
    Attendees(u32),
    Show,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match (verb.to_ascii_lowercase().as_str(), rest) {
            ("county", name) if !name.is_empty() => Ok(SessionCommand::County(name.to_string())),
            ("slider", raw) => raw
                .parse::<f64>()
                .map(SessionCommand::Slider)
                .map_err(|_| Error::InvalidInput(format!("slider needs a number, got {raw:?}"))),
            ("attendees", raw) => raw
                .parse::<u32>()
                .map(SessionCommand::Attendees)
                .map_err(|_| Error::InvalidInput(format!("attendees needs a count, got {raw:?}"))),
            ("show", "") => Ok(SessionCommand::Show),
            ("quit" | "exit", "") => Ok(SessionCommand::Quit),
            _ => Err(Error::InvalidInput(format!("unrecognized command {line:?}"))),
        }
    }
}
