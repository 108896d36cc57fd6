use regex::Regex;
use serde::{Deserialize, Serialize};

/// Order matches the stay-type picker; the backend accepts exactly these.
pub const STAY_TYPES: [&str; 4] = ["hotel", "camping", "glamping", "airbnb"];

pub const BUDGET_MIN: u32 = 100;
pub const BUDGET_MAX: u32 = 5000;
pub const BUDGET_STEP: u32 = 50;

pub const DEFAULT_ORIGIN: &str = "SFO";

#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub destinations: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub budget: u32,
    pub preferences: String,
    pub stay_type: String,
    pub origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripPlan {
    pub destination: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub budget: u32,
    #[serde(default)]
    pub preferences: String,
    pub stay_type: String,
    #[serde(default)]
    pub day_plans: Vec<DayPlan>,
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub stays: Vec<Stay>,
    #[serde(default)]
    pub shopping: Vec<ShopItem>,
}

impl TripPlan {
    /// Itinerary heading, e.g. "Kyoto, Osaka • 2026-04-01 → 2026-04-05".
    pub fn heading(&self) -> String {
        format!(
            "{} • {} → {}",
            self.destination.join(", "),
            self.start_date,
            self.end_date
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayPlan {
    pub day: i32,
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flight {
    pub airline: String,
    #[serde(rename = "from")]
    pub origin: String,
    pub to: String,
    pub depart: String,
    #[serde(default)]
    pub arrive: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub link: Option<String>,
}

impl Flight {
    pub fn summary_line(&self) -> String {
        format!("{} — ${}", self.airline, self.price)
    }

    pub fn route_line(&self) -> String {
        format!(
            "{} → {}",
            self.depart,
            self.arrive.as_deref().unwrap_or("?")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stay {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub price_per_night: i64,
    pub nights: i64,
    #[serde(default)]
    pub link: Option<String>,
}

impl Stay {
    pub fn summary_line(&self) -> String {
        let plural = if self.nights == 1 { "" } else { "s" };
        format!(
            "{} — ${}/night ({} night{})",
            self.name, self.price_per_night, self.nights, plural
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopItem {
    pub item: String,
    pub reason: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub est_price_usd: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
}

impl ShopItem {
    /// Reason, vendor, and rough price joined with bullets; empty parts
    /// are skipped.
    pub fn detail_line(&self) -> String {
        let mut parts = vec![self.reason.clone()];
        if let Some(vendor) = &self.vendor {
            parts.push(format!("Vendor: {vendor}"));
        }
        if let Some(price) = self.est_price_usd {
            parts.push(format!("~${price}"));
        }
        parts.join(" • ")
    }
}

pub fn is_iso_date(text: &str) -> bool {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$")
        .map(|pattern| pattern.is_match(text))
        .unwrap_or(false)
}

/// Which planner input has focus; Tab cycles in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerField {
    Destination,
    StartDate,
    EndDate,
    StayType,
    Budget,
    Preferences,
    Submit,
}

impl PlannerField {
    pub fn next(self) -> Self {
        match self {
            Self::Destination => Self::StartDate,
            Self::StartDate => Self::EndDate,
            Self::EndDate => Self::StayType,
            Self::StayType => Self::Budget,
            Self::Budget => Self::Preferences,
            Self::Preferences => Self::Submit,
            Self::Submit => Self::Destination,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Destination => Self::Submit,
            Self::StartDate => Self::Destination,
            Self::EndDate => Self::StartDate,
            Self::StayType => Self::EndDate,
            Self::Budget => Self::StayType,
            Self::Preferences => Self::Budget,
            Self::Submit => Self::Preferences,
        }
    }
}

/// Trip-preferences form state. Validation mirrors the backend's request
/// model: at least one destination, ISO dates in order, budget within the
/// slider range.
pub struct PlanForm {
    pub destinations: Vec<String>,
    pub destination_input: String,
    pub start_date: String,
    pub end_date: String,
    pub stay_type: usize,
    pub budget: u32,
    pub preferences: String,
    pub field: PlannerField,
}

impl PlanForm {
    pub fn new() -> Self {
        Self {
            destinations: Vec::new(),
            destination_input: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            stay_type: 0,
            budget: 1000,
            preferences: String::new(),
            field: PlannerField::Destination,
        }
    }

    pub fn stay_type(&self) -> &'static str {
        STAY_TYPES[self.stay_type % STAY_TYPES.len()]
    }

    pub fn cycle_stay_type(&mut self) {
        self.stay_type = (self.stay_type + 1) % STAY_TYPES.len();
    }

    pub fn budget_up(&mut self) {
        self.budget = (self.budget + BUDGET_STEP).min(BUDGET_MAX);
    }

    pub fn budget_down(&mut self) {
        self.budget = self.budget.saturating_sub(BUDGET_STEP).max(BUDGET_MIN);
    }

    /// Move the typed destination into the list. Duplicates and blank
    /// input are dropped silently.
    pub fn commit_destination(&mut self) {
        let destination = self.destination_input.trim();
        if destination.is_empty() {
            return;
        }
        if !self.destinations.iter().any(|d| d == destination) {
            self.destinations.push(destination.to_string());
        }
        self.destination_input.clear();
    }

    /// Add a picked autocomplete suggestion.
    pub fn add_destination(&mut self, destination: &str) {
        if !self.destinations.iter().any(|d| d == destination) {
            self.destinations.push(destination.to_string());
        }
        self.destination_input.clear();
    }

    pub fn remove_last_destination(&mut self) {
        self.destinations.pop();
    }

    /// "Start must be before end", shown once both dates are filled in.
    pub fn date_error(&self) -> Option<&'static str> {
        if self.start_date.is_empty() || self.end_date.is_empty() {
            return None;
        }
        if !is_iso_date(&self.start_date) || !is_iso_date(&self.end_date) {
            return Some("Dates must be YYYY-MM-DD");
        }
        // ISO dates order lexicographically.
        if self.start_date > self.end_date {
            return Some("Start must be before end");
        }
        None
    }

    pub fn can_submit(&self) -> bool {
        !self.destinations.is_empty()
            && !self.start_date.is_empty()
            && !self.end_date.is_empty()
            && self.date_error().is_none()
    }

    pub fn to_request(&self, origin: &str) -> PlanRequest {
        PlanRequest {
            destinations: self.destinations.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            budget: self.budget,
            preferences: self.preferences.clone(),
            stay_type: self.stay_type().to_string(),
            origin: origin.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PLAN: &str = r#"{
        "destination": ["Kyoto", "Osaka"],
        "start_date": "2026-04-01",
        "end_date": "2026-04-05",
        "budget": 2500,
        "preferences": "temples, food",
        "stay_type": "hotel",
        "day_plans": [
            {"day": 1, "date": "2026-04-01", "title": "Arrival",
             "summary": "Settle in", "activities": ["Check in", "Gion walk"]}
        ],
        "flights": [
            {"airline": "ANA", "from": "SFO", "to": "KIX",
             "depart": "2026-04-01T08:00:00", "arrive": "2026-04-02T14:10:00",
             "price": 980, "link": "https://example.com/f"}
        ],
        "stays": [
            {"name": "Hotel in Kyoto", "type": "hotel", "location": "Kyoto",
             "price_per_night": 140, "nights": 4}
        ],
        "shopping": [
            {"item": "Power bank", "reason": "All-day navigation & photos",
             "vendor": "Anker", "est_price_usd": 35.0}
        ]
    }"#;

    #[test]
    fn parses_full_plan_response() {
        let plan: TripPlan = serde_json::from_str(SAMPLE_PLAN).unwrap();
        assert_eq!(plan.destination, vec!["Kyoto", "Osaka"]);
        assert_eq!(plan.day_plans.len(), 1);
        assert_eq!(plan.flights[0].origin, "SFO");
        assert_eq!(plan.stays[0].kind, "hotel");
        assert_eq!(plan.shopping[0].est_price_usd, Some(35.0));
    }

    #[test]
    fn plan_heading_joins_destinations_and_dates() {
        let plan: TripPlan = serde_json::from_str(SAMPLE_PLAN).unwrap();
        assert_eq!(plan.heading(), "Kyoto, Osaka • 2026-04-01 → 2026-04-05");
    }

    #[test]
    fn display_lines_match_the_itinerary_layout() {
        let plan: TripPlan = serde_json::from_str(SAMPLE_PLAN).unwrap();
        assert_eq!(plan.flights[0].summary_line(), "ANA — $980");
        assert_eq!(
            plan.flights[0].route_line(),
            "2026-04-01T08:00:00 → 2026-04-02T14:10:00"
        );
        assert_eq!(
            plan.stays[0].summary_line(),
            "Hotel in Kyoto — $140/night (4 nights)"
        );
        assert_eq!(
            plan.shopping[0].detail_line(),
            "All-day navigation & photos • Vendor: Anker • ~$35"
        );
    }

    #[test]
    fn single_night_is_not_pluralized() {
        let stay = Stay {
            name: "Camping in Yosemite".to_string(),
            kind: "camping".to_string(),
            location: "Yosemite".to_string(),
            price_per_night: 40,
            nights: 1,
            link: None,
        };
        assert_eq!(
            stay.summary_line(),
            "Camping in Yosemite — $40/night (1 night)"
        );
    }

    #[test]
    fn date_error_requires_both_dates() {
        let mut form = PlanForm::new();
        form.start_date = "2026-04-05".to_string();
        assert_eq!(form.date_error(), None);

        form.end_date = "2026-04-01".to_string();
        assert_eq!(form.date_error(), Some("Start must be before end"));

        form.end_date = "2026-04-05".to_string();
        assert_eq!(form.date_error(), None);
    }

    #[test]
    fn malformed_dates_are_flagged() {
        let mut form = PlanForm::new();
        form.start_date = "april 1".to_string();
        form.end_date = "2026-04-05".to_string();
        assert_eq!(form.date_error(), Some("Dates must be YYYY-MM-DD"));
    }

    #[test]
    fn submit_gating() {
        let mut form = PlanForm::new();
        assert!(!form.can_submit());

        form.destination_input = "Kyoto".to_string();
        form.commit_destination();
        form.start_date = "2026-04-01".to_string();
        form.end_date = "2026-04-05".to_string();
        assert!(form.can_submit());

        form.end_date = "2026-03-01".to_string();
        assert!(!form.can_submit());
    }

    #[test]
    fn destinations_are_deduplicated() {
        let mut form = PlanForm::new();
        form.destination_input = " Kyoto ".to_string();
        form.commit_destination();
        form.add_destination("Kyoto");
        assert_eq!(form.destinations, vec!["Kyoto"]);
        assert_eq!(form.destination_input, "");
    }

    #[test]
    fn budget_stays_on_the_slider() {
        let mut form = PlanForm::new();
        form.budget = BUDGET_MAX;
        form.budget_up();
        assert_eq!(form.budget, BUDGET_MAX);

        form.budget = BUDGET_MIN;
        form.budget_down();
        assert_eq!(form.budget, BUDGET_MIN);

        form.budget_up();
        assert_eq!(form.budget, BUDGET_MIN + BUDGET_STEP);
    }

    #[test]
    fn request_uses_the_selected_stay_type() {
        let mut form = PlanForm::new();
        form.destination_input = "Bali".to_string();
        form.commit_destination();
        form.start_date = "2026-06-10".to_string();
        form.end_date = "2026-06-20".to_string();
        form.cycle_stay_type();
        form.cycle_stay_type();

        let request = form.to_request(DEFAULT_ORIGIN);
        assert_eq!(request.stay_type, "glamping");
        assert_eq!(request.origin, "SFO");
        assert_eq!(request.budget, 1000);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["destinations"], serde_json::json!(["Bali"]));
        assert_eq!(json["stay_type"], "glamping");
    }

    #[test]
    fn field_cycle_is_a_loop() {
        let mut field = PlannerField::Destination;
        for _ in 0..7 {
            field = field.next();
        }
        assert_eq!(field, PlannerField::Destination);
        assert_eq!(PlannerField::Destination.prev(), PlannerField::Submit);
    }
}
