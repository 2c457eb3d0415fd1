// Task templates: bind a trip to the instructions each agent works from

use crate::agents::AgentRole;
use crate::models::{StageName, TripRequest};

/// One unit of work for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub stage: StageName,
    pub agent: AgentRole,
    pub description: String,
    pub expected_output: String,
    /// Stages whose outputs are handed to this task as context.
    pub context: Vec<StageName>,
}

impl TaskSpec {
    /// Instructions with the declared context outputs appended verbatim.
    pub fn render(&self, outputs: &[(StageName, &str)]) -> String {
        let mut prompt = self.description.clone();
        let supplied: Vec<(StageName, &str)> = self
            .context
            .iter()
            .filter_map(|dep| {
                outputs
                    .iter()
                    .find(|(stage, _)| stage == dep)
                    .map(|(stage, text)| (*stage, *text))
            })
            .collect();

        if !supplied.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            for (stage, text) in supplied {
                prompt.push_str(&format!("\n## {}\n{}\n", stage.section_title(), text));
            }
        }
        prompt
    }
}

/// The three tasks of one run, in execution order.
pub fn build_tasks(request: &TripRequest) -> [TaskSpec; 3] {
    [
        location_task(request),
        guide_task(request),
        planner_task(request),
    ]
}

pub fn location_task(request: &TripRequest) -> TaskSpec {
    let TripRequest {
        from_city,
        destination_city,
        date_from,
        date_to,
        ..
    } = request;

    TaskSpec {
        stage: StageName::Research,
        agent: AgentRole::LocationExpert,
        description: format!(
            "Research comprehensive travel information for a trip from {from_city} to {destination_city} \
between {date_from} and {date_to}.

Use the search_web tool to find current information about:

1. **Visa Requirements**: whether travelers from {from_city} need a visa for {destination_city}
2. **Flight Options**: available flights, approximate costs, and travel time
3. **Local Transportation**: metro, buses, taxis, and ride-sharing in {destination_city}
4. **Weather**: typical conditions in {destination_city} during the travel dates
5. **Safety Information**: current safety advisories and travel warnings
6. **Currency & Budget**: local currency, exchange rates, and general cost of living

IMPORTANT: search for each of these topics. Do not rely on general knowledge alone; \
look for specific, up-to-date information."
        ),
        expected_output: "A comprehensive report including:
- Visa requirements and application process (if needed)
- Flight options with estimated costs
- Local transportation guide with prices
- Weather forecast and packing recommendations
- Safety tips and emergency contacts
- Budget estimates for accommodation, food, and activities
- Currency information and exchange tips"
            .to_string(),
        context: Vec::new(),
    }
}

pub fn guide_task(request: &TripRequest) -> TaskSpec {
    let TripRequest {
        destination_city,
        date_from,
        date_to,
        interests,
        ..
    } = request;

    TaskSpec {
        stage: StageName::Guide,
        agent: AgentRole::GuideExpert,
        description: format!(
            "Act as a local guide for {destination_city} and create personalized recommendations \
for a traveler interested in: {interests}.

Trip dates: {date_from} to {date_to}

Use the search_web tool to research and provide:

1. **Top Attractions**: must-see landmarks and attractions matching the interests
2. **Local Restaurants**: highly rated local eateries serving authentic cuisine, not tourist traps
3. **Cultural Experiences**: museums, theaters, festivals, or events during the travel dates
4. **Hidden Gems**: lesser-known spots that locals love
5. **Food Recommendations**: specific dishes to try and where to find them
6. **Nightlife/Entertainment**: evening activities, bars, clubs, or live music venues
7. **Shopping Areas**: local markets, boutiques, or shopping districts

IMPORTANT: search for current information including recent reviews, opening hours, and any \
special events or closures during the travel period."
        ),
        expected_output: "A detailed local guide including:
- Top 10-15 attractions with descriptions and why they match the interests
- 8-10 restaurant recommendations with specific dishes to try
- Cultural events or festivals happening during the visit
- 5-7 hidden gems off the beaten path
- Neighborhood guide with character descriptions
- Practical tips (best times to visit attractions, how to avoid crowds)
- Local customs and etiquette tips"
            .to_string(),
        context: Vec::new(),
    }
}

pub fn planner_task(request: &TripRequest) -> TaskSpec {
    let TripRequest {
        destination_city,
        date_from,
        date_to,
        interests,
        ..
    } = request;
    let days = request.trip_duration();

    TaskSpec {
        stage: StageName::Planning,
        agent: AgentRole::PlannerExpert,
        description: format!(
            "Create a comprehensive, day-by-day travel itinerary for {destination_city} \
from {date_from} to {date_to} ({days} days).

Traveler interests: {interests}

Use the information from the Location Expert and the Local Guide Expert (provided in context), \
and use the search_web tool to verify current information about:

1. **Accommodation**: 3-4 hotel or accommodation options with prices
2. **Daily Itinerary**: hour-by-hour plans for each day
3. **Activity Booking**: which activities need advance booking
4. **Meal Planning**: specific restaurants for breakfast, lunch, and dinner
5. **Transportation**: travel time and transport method between activities
6. **Budget Breakdown**: daily and total budget estimates
7. **Practical Tips**: booking links, contact numbers, and reservation advice

The itinerary should:
- Balance activities with rest time
- Group nearby attractions together to minimize travel
- Include backup options in case of bad weather
- Consider opening hours and peak times
- Stay within a reasonable budget

IMPORTANT: search for current prices, opening hours, and booking requirements."
        ),
        expected_output: format!(
            "A complete travel plan document including:

**EXECUTIVE SUMMARY**
- Trip overview and highlights
- Total estimated budget breakdown
- Key booking priorities

**ACCOMMODATION OPTIONS**
- 3-4 recommended hotels or accommodations with prices, locations, and pros/cons

**DAY-BY-DAY ITINERARY** (for all {days} days)
For each day:
- Morning activities (with times and locations)
- Lunch recommendation
- Afternoon activities (with times and locations)
- Dinner recommendation
- Evening activities (optional)
- Daily budget estimate
- Transportation notes

**BOOKING CHECKLIST**
- Activities requiring advance booking with links or contacts
- Restaurant reservations needed
- Transportation tickets to purchase

**PACKING LIST**
- Based on weather and planned activities

**EMERGENCY INFORMATION**
- Important phone numbers
- Hospital and clinic locations
- Embassy contact information

The plan should be detailed, practical, and ready to execute."
        ),
        context: vec![StageName::Research, StageName::Guide],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(start: (i32, u32, u32), end: (i32, u32, u32)) -> TripRequest {
        TripRequest {
            from_city: "Paris".to_string(),
            destination_city: "Tokyo".to_string(),
            date_from: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            date_to: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            interests: "art".to_string(),
        }
    }

    #[test]
    fn planner_embeds_inclusive_day_count() {
        let cases = [
            ((2025, 4, 1), (2025, 4, 5), 5),
            ((2025, 4, 1), (2025, 4, 1), 1),
            ((2024, 2, 27), (2024, 3, 1), 4),
            ((2025, 12, 30), (2026, 1, 2), 4),
        ];
        for (start, end, days) in cases {
            let task = planner_task(&request(start, end));
            assert!(task.description.contains(&format!("({} days)", days)));
            assert!(task
                .expected_output
                .contains(&format!("(for all {} days)", days)));
        }
    }

    #[test]
    fn tasks_run_in_order_and_only_planning_has_context() {
        let [research, guide, planning] = build_tasks(&request((2025, 4, 1), (2025, 4, 5)));
        assert_eq!(research.stage, StageName::Research);
        assert_eq!(guide.stage, StageName::Guide);
        assert_eq!(planning.stage, StageName::Planning);
        assert!(research.context.is_empty());
        assert!(guide.context.is_empty());
        assert_eq!(planning.context, vec![StageName::Research, StageName::Guide]);
        assert_eq!(planning.agent, AgentRole::PlannerExpert);
    }

    #[test]
    fn templates_embed_trip_parameters() {
        let trip = request((2025, 4, 1), (2025, 4, 5));
        let research = location_task(&trip);
        assert!(research.description.contains("from Paris to Tokyo"));
        assert!(research.description.contains("between 2025-04-01 and 2025-04-05"));
        assert!(research.description.contains("Visa Requirements"));

        let guide = guide_task(&trip);
        assert!(guide.description.contains("interested in: art"));
        assert!(guide.description.contains("Hidden Gems"));
    }

    #[test]
    fn planner_render_includes_prior_outputs_verbatim() {
        let task = planner_task(&request((2025, 4, 1), (2025, 4, 5)));
        let research = "Visa: none needed.\nMetro: Suica card, ¥200 per ride.";
        let guide = "Visit the Mori Art Museum; eat monjayaki in Tsukishima.";

        let prompt = task.render(&[(StageName::Research, research), (StageName::Guide, guide)]);
        assert!(prompt.starts_with(&task.description));
        assert!(prompt.contains(research));
        assert!(prompt.contains(guide));
        assert!(prompt.find(research) < prompt.find(guide));
    }

    #[test]
    fn undeclared_context_is_ignored() {
        let task = location_task(&request((2025, 4, 1), (2025, 4, 5)));
        let prompt = task.render(&[(StageName::Guide, "should not appear")]);
        assert_eq!(prompt, task.description);
    }
}
