use crate::error::Error;
use crate::models::CaseCount;

pub const SLIDER_MIN: f64 = 0.0;
pub const SLIDER_MAX: f64 = 3.0;

/// Chance (0-100, whole percent) that at least one of `attendees` people is
/// currently infected.
pub fn compute(cases: CaseCount, population: u64, attendees: u32) -> Result<f64, Error> {
    Ok(exposure_probability(cases, population, attendees)?.round_ties_even())
}

/// Unrounded `(1 - (1 - prevalence)^attendees) * 100`. Not clamped: a case
/// count above the population still yields a number.
pub fn exposure_probability(
    cases: CaseCount,
    population: u64,
    attendees: u32,
) -> Result<f64, Error> {
    let prevalence = prevalence(cases, population)?;
    if attendees == 0 {
        return Ok(0.0);
    }
    Ok((1.0 - (1.0 - prevalence).powf(attendees as f64)) * 100.0)
}

/// Case share of the population, rounded to three decimals.
pub fn prevalence(cases: CaseCount, population: u64) -> Result<f64, Error> {
    if population == 0 {
        return Err(Error::InvalidInput("population must be positive".to_string()));
    }
    round_to(cases as f64 / population as f64, 3)
}

/// Exponential slider position -> head count: `round(10^value)`.
pub fn attendees_from_slider(value: f64) -> Result<u32, Error> {
    if !value.is_finite() || !(SLIDER_MIN..=SLIDER_MAX).contains(&value) {
        return Err(Error::InvalidInput(format!(
            "slider value {value} outside [{SLIDER_MIN}, {SLIDER_MAX}]"
        )));
    }
    Ok(10f64.powf(value).round_ties_even() as u32)
}

/// Decimal rounding of the exact stored value, ties to even.
fn round_to(value: f64, decimals: usize) -> Result<f64, Error> {
    format!("{value:.decimals$}")
        .parse::<f64>()
        .map_err(|e| Error::InvalidInput(format!("cannot round {value}: {e}")))
}
