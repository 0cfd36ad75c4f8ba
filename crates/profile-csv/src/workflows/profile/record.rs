use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A loosely typed scalar from the scraped payload.
///
/// Rendering follows "use the value or empty" semantics: null, `false`, numeric zero
/// and the empty string all render as `""`. Arrays and objects are not scalars and are
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(Value);

impl FieldValue {
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::Null | Value::Array(_) | Value::Object(_) => false,
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_f64().map_or(false, |n| n != 0.0),
            Value::String(text) => !text.is_empty(),
        }
    }

    /// First present value of `self` and `fallback`.
    pub fn or<'a>(&'a self, fallback: &'a FieldValue) -> &'a FieldValue {
        if self.is_present() {
            self
        } else {
            fallback
        }
    }

    pub fn text(&self) -> String {
        if !self.is_present() {
            return String::new();
        }

        match &self.0 {
            Value::String(text) => text.clone(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => render_number(number),
            Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn render_number(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(int) = number.as_u64() {
        return int.to_string();
    }
    match number.as_f64() {
        // 2^53: beyond this f64 no longer holds every integer exactly.
        Some(float) if float.fract() == 0.0 && float.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", float as i64)
        }
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// One scraped professional profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    #[serde(rename = "linkedin_num_id")]
    pub identifier: FieldValue,
    #[serde(rename = "linkedin_id")]
    pub handle: FieldValue,
    #[serde(rename = "url")]
    pub canonical_url: FieldValue,
    #[serde(rename = "input_url")]
    pub source_url: FieldValue,
    #[serde(rename = "name")]
    pub display_name: FieldValue,
    #[serde(rename = "avatar")]
    pub avatar_url: FieldValue,
    #[serde(rename = "position")]
    pub headline: FieldValue,
    #[serde(rename = "city")]
    pub location_label: FieldValue,
    #[serde(rename = "about")]
    pub summary: FieldValue,
    #[serde(deserialize_with = "lenient_list")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(rename = "current_company", deserialize_with = "lenient_object")]
    pub current_organization: Option<CurrentOrganization>,
    #[serde(deserialize_with = "lenient_list")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub languages: Vec<LanguageEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub skills: Vec<SkillEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(rename = "company")]
    pub organization_name: FieldValue,
    #[serde(rename = "url")]
    pub organization_url: FieldValue,
    pub title: FieldValue,
    pub start_date: FieldValue,
    pub end_date: FieldValue,
    pub description: FieldValue,
    pub description_html: FieldValue,
    #[serde(deserialize_with = "lenient_list")]
    pub positions: Vec<PositionEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PositionEntry {
    pub title: FieldValue,
    pub start_date: FieldValue,
    pub end_date: FieldValue,
    pub description: FieldValue,
    pub description_html: FieldValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentOrganization {
    pub link: FieldValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub title: FieldValue,
    pub degree: FieldValue,
    #[serde(rename = "field")]
    pub field_of_study: FieldValue,
    pub start_year: FieldValue,
    pub end_year: FieldValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageEntry {
    pub title: FieldValue,
    #[serde(rename = "subtitle")]
    pub proficiency: FieldValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillEntry {
    pub name: FieldValue,
}

/// Accepts any JSON; non-arrays become empty and items that are not objects of the
/// expected shape are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|item| serde_json::from_value(item).ok()))
}
