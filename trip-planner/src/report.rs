// Combined report exports: plain text, Markdown and a CSV summary

use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::models::{StageName, StageResult, TripRequest};
use crate::pipeline::RunState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_DATE_FORMAT: &str = "%Y%m%d";
const UNAVAILABLE_SECTION: &str = "See full itinerary below";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(ExportFormat::Text),
            "md" => Ok(ExportFormat::Markdown),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Snapshot of a finished run, built on demand at export time.
#[derive(Debug, Clone)]
pub struct CombinedReport<'a> {
    request: &'a TripRequest,
    research: Option<&'a str>,
    guide: Option<&'a str>,
    itinerary: &'a str,
    generated_at: NaiveDateTime,
}

impl<'a> CombinedReport<'a> {
    /// `None` unless the run completed with a planning result.
    pub fn from_state(state: &'a RunState, generated_at: NaiveDateTime) -> Option<Self> {
        if !state.is_reportable() {
            return None;
        }
        let text = |stage| state.result(stage).and_then(StageResult::text);
        Some(Self {
            request: state.request.as_ref()?,
            research: text(StageName::Research),
            guide: text(StageName::Guide),
            itinerary: text(StageName::Planning)?,
            generated_at,
        })
    }

    pub fn render(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Text | ExportFormat::Markdown => self.document(),
            ExportFormat::Csv => self.csv_summary(),
        }
    }

    pub fn file_name(&self, format: ExportFormat) -> String {
        let prefix = match format {
            ExportFormat::Csv => "Travel_Summary",
            ExportFormat::Text | ExportFormat::Markdown => "Travel_Plan",
        };
        format!(
            "{}_{}_{}.{}",
            prefix,
            file_safe(&self.request.destination_city),
            self.generated_at.format(FILE_DATE_FORMAT),
            format.extension()
        )
    }

    fn document(&self) -> String {
        let request = self.request;
        format!(
            "# AI-POWERED TRIP PLAN TO {destination_upper}

**Generated on:** {generated}
**Trip Duration:** {date_from} to {date_to}

---

## {research_title}
{research}

---

## {guide_title}
{guide}

---

## {planning_title}
{itinerary}

---

**Interests:** {interests}
**Traveling from:** {from_city}
**Destination:** {destination}
",
            destination_upper = request.destination_city.to_uppercase(),
            generated = self.generated_at.format(TIMESTAMP_FORMAT),
            date_from = request.date_from,
            date_to = request.date_to,
            research_title = StageName::Research.section_title().to_uppercase(),
            research = self.research.unwrap_or(UNAVAILABLE_SECTION),
            guide_title = StageName::Guide.section_title().to_uppercase(),
            guide = self.guide.unwrap_or(UNAVAILABLE_SECTION),
            planning_title = StageName::Planning.section_title().to_uppercase(),
            itinerary = self.itinerary,
            interests = request.interests,
            from_city = request.from_city,
            destination = request.destination_city,
        )
    }

    fn csv_summary(&self) -> String {
        let request = self.request;
        let rows = [
            ("From City", request.from_city.clone()),
            ("Destination", request.destination_city.clone()),
            ("Departure Date", request.date_from.to_string()),
            ("Return Date", request.date_to.to_string()),
            ("Interests", request.interests.clone()),
            ("Generated", self.generated_at.format(TIMESTAMP_FORMAT).to_string()),
        ];

        let mut csv = String::from("Attribute,Value\n");
        for (attribute, value) in rows {
            csv.push_str(attribute);
            csv.push(',');
            csv.push_str(&csv_field(&value));
            csv.push('\n');
        }
        csv
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Keeps a city name usable inside a Content-Disposition file name.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn finished_state(request: TripRequest, degraded: bool) -> RunState {
        let mut state = RunState::default();
        state.begin(request);
        if degraded {
            state.record(StageName::Research, StageResult::Unavailable);
            state.record(StageName::Guide, StageResult::Unavailable);
        } else {
            state.record(StageName::Research, StageResult::Output("Visa-free for 90 days.".to_string()));
            state.record(StageName::Guide, StageResult::Output("Try the Mori Art Museum.".to_string()));
        }
        state.record(StageName::Planning, StageResult::Output("Day 1: Ueno Park.".to_string()));
        state.complete();
        state
    }

    fn paris_tokyo() -> TripRequest {
        TripRequest {
            from_city: "Paris".to_string(),
            destination_city: "Tokyo".to_string(),
            date_from: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            interests: "art".to_string(),
        }
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn csv_summary_has_the_six_rows_in_order() {
        let state = finished_state(paris_tokyo(), false);
        let report = CombinedReport::from_state(&state, generated_at()).unwrap();
        assert_eq!(
            report.render(ExportFormat::Csv),
            "Attribute,Value\n\
From City,Paris\n\
Destination,Tokyo\n\
Departure Date,2025-04-01\n\
Return Date,2025-04-05\n\
Interests,art\n\
Generated,2025-03-15 09:30:00\n"
        );
    }

    #[test]
    fn csv_quotes_values_with_commas() {
        let mut request = paris_tokyo();
        request.interests = "art, food and \"hidden\" bars".to_string();
        let state = finished_state(request, false);
        let csv = CombinedReport::from_state(&state, generated_at())
            .unwrap()
            .render(ExportFormat::Csv);
        assert!(csv.contains("Interests,\"art, food and \"\"hidden\"\" bars\"\n"));
    }

    #[test]
    fn document_has_title_sections_and_footer() {
        let state = finished_state(paris_tokyo(), false);
        let report = CombinedReport::from_state(&state, generated_at()).unwrap();
        let doc = report.render(ExportFormat::Markdown);

        assert!(doc.starts_with("# AI-POWERED TRIP PLAN TO TOKYO\n"));
        assert!(doc.contains("**Generated on:** 2025-03-15 09:30:00"));
        assert!(doc.contains("**Trip Duration:** 2025-04-01 to 2025-04-05"));
        let research = doc.find("## LOCATION INFORMATION\nVisa-free for 90 days.").unwrap();
        let guide = doc.find("## LOCAL GUIDE RECOMMENDATIONS\nTry the Mori Art Museum.").unwrap();
        let plan = doc.find("## COMPLETE TRAVEL ITINERARY\nDay 1: Ueno Park.").unwrap();
        assert!(research < guide && guide < plan);
        assert!(doc.ends_with("**Interests:** art\n**Traveling from:** Paris\n**Destination:** Tokyo\n"));
        assert_eq!(doc, report.render(ExportFormat::Text));
    }

    #[test]
    fn unavailable_sections_point_to_the_itinerary() {
        let state = finished_state(paris_tokyo(), true);
        let doc = CombinedReport::from_state(&state, generated_at())
            .unwrap()
            .render(ExportFormat::Text);
        assert!(doc.contains("## LOCATION INFORMATION\nSee full itinerary below\n"));
        assert!(doc.contains("## LOCAL GUIDE RECOMMENDATIONS\nSee full itinerary below\n"));
    }

    #[test]
    fn file_names_embed_destination_and_date() {
        let mut request = paris_tokyo();
        request.destination_city = "New York".to_string();
        let state = finished_state(request, false);
        let report = CombinedReport::from_state(&state, generated_at()).unwrap();
        assert_eq!(report.file_name(ExportFormat::Text), "Travel_Plan_New_York_20250315.txt");
        assert_eq!(report.file_name(ExportFormat::Markdown), "Travel_Plan_New_York_20250315.md");
        assert_eq!(report.file_name(ExportFormat::Csv), "Travel_Summary_New_York_20250315.csv");
    }

    #[test]
    fn unfinished_runs_have_no_report() {
        let mut state = RunState::default();
        assert!(CombinedReport::from_state(&state, generated_at()).is_none());
        state.begin(paris_tokyo());
        state.fail("stage failed");
        assert!(CombinedReport::from_state(&state, generated_at()).is_none());
    }

    #[test]
    fn rerun_leaves_no_trace_of_the_previous_report() {
        let mut state = finished_state(paris_tokyo(), false);
        let mut osaka = paris_tokyo();
        osaka.destination_city = "Osaka".to_string();
        state.begin(osaka);
        state.record(StageName::Research, StageResult::Output("Osaka research".to_string()));
        state.record(StageName::Guide, StageResult::Output("Osaka guide".to_string()));
        state.record(StageName::Planning, StageResult::Output("Osaka plan".to_string()));
        state.complete();

        let doc = CombinedReport::from_state(&state, generated_at())
            .unwrap()
            .render(ExportFormat::Text);
        assert!(!doc.contains("Visa-free"));
        assert!(!doc.contains("Mori Art"));
        assert!(!doc.contains("Ueno"));
        assert!(!doc.contains("Tokyo"));
    }
}
