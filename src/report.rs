use std::fmt::Write;

use chrono::NaiveDate;

use crate::estimate::UpdateResponse;

/// Slider marks shown on the dashboard: 1, 10, 100 and 1000 people.
pub const SLIDER_MARKS: [f64; 4] = [0.0, 1.0, 2.0, 3.0];

pub fn risk_label(risk: f64) -> String {
    format!("{risk:.0} %")
}

pub fn attendee_label(attendees: u32) -> String {
    let people = if attendees == 1 {
        "person (just yourself)"
    } else {
        "people"
    };
    format!("{attendees} {people} attending")
}

pub fn render_estimate(response: &UpdateResponse) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", response.attendee_label);
    let _ = writeln!(
        output,
        "{} chance of exposure in {} ({} recent cases, population {})",
        response.risk.label, response.county, response.cases, response.population
    );
    output
}

pub fn build_report(
    county: &str,
    window_days: i64,
    generated: NaiveDate,
    rows: &[UpdateResponse],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# COVID-19 Gathering Exposure Report");
    let _ = writeln!(
        output,
        "Generated for {} on {} (cases from the last {} days)",
        county, generated, window_days
    );
    let _ = writeln!(output);

    let Some(first) = rows.first() else {
        let _ = writeln!(output, "No estimates computed.");
        return output;
    };

    let _ = writeln!(output, "## County Data");
    let _ = writeln!(output, "- Population: {}", first.population);
    let _ = writeln!(output, "- Recent confirmed cases: {}", first.cases);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Chance At Least One Attendee Is Infected");
    let _ = writeln!(output, "| Attendees | Risk |");
    let _ = writeln!(output, "|---:|---:|");
    for row in rows {
        let _ = writeln!(output, "| {} | {} |", row.attendees, row.risk.label);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CacheEntry, RiskResult};

    fn response(attendees: u32, risk: f64) -> UpdateResponse {
        UpdateResponse {
            county: "Yolo".to_string(),
            attendees,
            cases: 600,
            population: 220_500,
            risk: RiskResult {
                percentage: risk,
                label: risk_label(risk),
            },
            attendee_label: attendee_label(attendees),
            cache: CacheEntry {
                county: "Yolo".to_string(),
                cases: 600,
            },
        }
    }

    #[test]
    fn attendee_label_is_singular_for_one() {
        assert_eq!(attendee_label(1), "1 person (just yourself) attending");
        assert_eq!(attendee_label(2), "2 people attending");
        assert_eq!(attendee_label(1000), "1000 people attending");
    }

    #[test]
    fn risk_label_shows_whole_percent() {
        assert_eq!(risk_label(42.0), "42 %");
        assert_eq!(risk_label(0.0), "0 %");
        assert_eq!(risk_label(100.0), "100 %");
    }

    #[test]
    fn render_mentions_county_and_risk() {
        let text = render_estimate(&response(10, 3.0));
        assert!(text.starts_with("10 people attending\n"));
        assert!(text.contains("3 % chance of exposure in Yolo"));
    }

    #[test]
    fn report_lists_each_mark() {
        let rows = vec![response(1, 0.0), response(10, 3.0), response(100, 24.0)];
        let date = NaiveDate::from_ymd_opt(2020, 12, 15).unwrap();
        let report = build_report("Yolo", 14, date, &rows);
        assert!(report.contains("Generated for Yolo on 2020-12-15"));
        assert!(report.contains("- Population: 220500"));
        assert!(report.contains("| 100 | 24 % |"));
    }

    #[test]
    fn empty_report_says_so() {
        let date = NaiveDate::from_ymd_opt(2020, 12, 15).unwrap();
        let report = build_report("Yolo", 14, date, &[]);
        assert!(report.contains("No estimates computed."));
    }
}
