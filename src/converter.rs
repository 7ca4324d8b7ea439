//! Translation of the UI filter payload into the shapes Prospector accepts,
//! and into a plain-language prompt for description generation.
//!
//! A filter entry arrives as `{filterCategory, type, title, value}`. Type `0`
//! is a multi-select whose value lists `{id, checked, title}` options; type
//! `1` is a range whose value is `{min_value, max_value}`. Entries of any
//! other type are accepted and then dropped by both conversions, matching
//! what the dashboard has always relied on.

use crate::errors::BridgeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const NO_MIN_VALUE: &str = "Inget minsta värde";
pub const NO_MAX_VALUE: &str = "Inget högsta värde";
pub const NO_RESTRICTIONS: &str = "Inga begränsningar på detta filter";

const MULTI_SELECT: i64 = 0;
const RANGE: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilterEntry {
    pub filter_category: Value,
    #[serde(rename = "type", default)]
    pub kind: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterOption {
    pub id: Value,
    #[serde(default, deserialize_with = "truthy")]
    pub checked: bool,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeBounds {
    #[serde(default)]
    pub min_value: Option<Value>,
    #[serde(default)]
    pub max_value: Option<Value>,
}

#[derive(Debug, Clone)]
pub enum FilterKind {
    MultiSelect(Vec<FilterOption>),
    Range(RangeBounds),
    Unrecognized(Value),
}

/// Any JSON value read as a flag: `null`, `false`, `0`, `""`, `[]` and `{}`
/// are false, everything else is true.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

/// Numeric type code of an entry. Only numbers count; `1.0` equals `1`.
fn type_code(kind: &Value) -> Option<i64> {
    let Value::Number(n) = kind else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0).then_some(f as i64)
}

#[derive(Debug, Clone)]
pub struct FilterEntry {
    pub filter_category: Value,
    pub title: String,
    pub kind: FilterKind,
}

impl TryFrom<RawFilterEntry> for FilterEntry {
    type Error = BridgeError;

    fn try_from(raw: RawFilterEntry) -> Result<Self, Self::Error> {
        let kind = match type_code(&raw.kind) {
            Some(MULTI_SELECT) => FilterKind::MultiSelect(
                serde_json::from_value(raw.value).map_err(|e| {
                    BridgeError::BadRequest(format!("multi-select filter value: {e}"))
                })?,
            ),
            Some(RANGE) => FilterKind::Range(
                serde_json::from_value(raw.value)
                    .map_err(|e| BridgeError::BadRequest(format!("range filter value: {e}")))?,
            ),
            _ => FilterKind::Unrecognized(raw.kind),
        };
        Ok(Self {
            filter_category: raw.filter_category,
            title: raw.title.unwrap_or_default(),
            kind,
        })
    }
}

/// Parse the `params` array of a filter request.
pub fn parse_entries(params: Vec<RawFilterEntry>) -> Result<Vec<FilterEntry>, BridgeError> {
    params.into_iter().map(FilterEntry::try_from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiFilter {
    Range {
        #[serde(rename = "filterCategory")]
        filter_category: Value,
        #[serde(rename = "SelectRange")]
        select_range: SelectRange,
    },
    Options {
        #[serde(rename = "filterCategory")]
        filter_category: Value,
        #[serde(rename = "SelectOption")]
        select_option: Vec<Value>,
    },
}

/// Lenient integer parse: strings and numbers convert, anything else is `None`.
fn to_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn to_param_list(entries: &[FilterEntry]) -> Vec<ApiFilter> {
    entries
        .iter()
        .filter_map(|entry| match &entry.kind {
            FilterKind::Range(bounds) => Some(ApiFilter::Range {
                filter_category: entry.filter_category.clone(),
                select_range: SelectRange {
                    min: to_int(bounds.min_value.as_ref()),
                    max: to_int(bounds.max_value.as_ref()),
                },
            }),
            FilterKind::MultiSelect(options) => Some(ApiFilter::Options {
                filter_category: entry.filter_category.clone(),
                select_option: options
                    .iter()
                    .filter(|o| o.checked)
                    .map(|o| o.id.clone())
                    .collect(),
            }),
            FilterKind::Unrecognized(_) => None,
        })
        .collect()
}

fn range_text(bounds: &RangeBounds) -> String {
    let mut value = match &bounds.min_value {
        Some(min) if !min.is_null() => format!("Minst, {}", display(min)),
        _ => NO_MIN_VALUE.to_string(),
    };
    // A missing max replaces whatever the min produced
    match &bounds.max_value {
        Some(max) if !max.is_null() => value.push_str(&format!("Högst, {}", display(max))),
        _ => value = NO_MAX_VALUE.to_string(),
    }
    value
}

fn options_text(options: &[FilterOption]) -> String {
    let checked: Vec<&str> = options
        .iter()
        .filter(|o| o.checked)
        .map(|o| o.title.as_str())
        .collect();
    if checked.is_empty() {
        NO_RESTRICTIONS.to_string()
    } else {
        checked.join(", ")
    }
}

pub fn to_prompt(entries: &[FilterEntry]) -> String {
    let mut prompt = String::new();
    for entry in entries {
        let value = match &entry.kind {
            FilterKind::Range(bounds) => range_text(bounds),
            FilterKind::MultiSelect(options) => options_text(options),
            FilterKind::Unrecognized(_) => continue,
        };
        prompt.push_str(&format!("{}: {}\n", entry.title, value));
    }
    prompt
}

/// Whether an entry narrows the search at all.
pub fn is_active(entry: &FilterEntry) -> bool {
    match &entry.kind {
        FilterKind::Range(bounds) => {
            !is_absent(bounds.min_value.as_ref()) || !is_absent(bounds.max_value.as_ref())
        }
        FilterKind::MultiSelect(options) => options.iter().any(|o| o.checked),
        FilterKind::Unrecognized(_) => false,
    }
}
