use crate::converter::{self, FilterEntry};
use serde_json::{json, Map, Value};

/// Scores a result set against the filters that produced it. The returned
/// document is sent to the dashboard unchanged.
pub trait QualityAssessor: Send + Sync {
    fn assess(&self, detailed_results: &[Value], filters: &[FilterEntry]) -> Value;
}

/// Prospect fields whose presence makes a record worth contacting.
pub const SCORED_FIELDS: [&str; 10] = [
    "phone",
    "address",
    "postCode",
    "city",
    "vatNumber",
    "organisationNumber",
    "employees",
    "turnOver",
    "legalEntity",
    "description",
];

/// Share of records carrying each scored field, in percent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldCompleteness;

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

impl QualityAssessor for FieldCompleteness {
    fn assess(&self, detailed_results: &[Value], filters: &[FilterEntry]) -> Value {
        let total = detailed_results.len();
        let mut fields = Map::new();
        let mut sum = 0.0;

        for field in SCORED_FIELDS {
            let filled = detailed_results
                .iter()
                .filter(|record| is_filled(record.get(field)))
                .count();
            let share = percent(filled, total);
            sum += share;
            fields.insert(field.to_string(), json!(share));
        }

        let score = (sum / SCORED_FIELDS.len() as f64 * 10.0).round() / 10.0;
        let active_filters = filters.iter().filter(|f| converter::is_active(f)).count();

        json!({
            "total": total,
            "score": score,
            "fields": fields,
            "activeFilters": active_filters,
        })
    }
}
