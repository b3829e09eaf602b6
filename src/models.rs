use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the site's `search.json`, i.e. one published post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Element id of the post's entry inside the results container
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<FieldValue>,
    #[serde(default)]
    pub tags: Option<FieldValue>,
    #[serde(default)]
    pub author: Option<FieldValue>,
    #[serde(default)]
    pub date: Option<FieldValue>,
    #[serde(default)]
    pub url: Option<FieldValue>,
    #[serde(default)]
    pub content: Option<FieldValue>,
}

impl PostRecord {
    /// Look up a field by name; `None` when the index entry omits it
    pub fn field(&self, field: PostField) -> Option<&FieldValue> {
        match field {
            PostField::Title => self.title.as_ref(),
            PostField::Tags => self.tags.as_ref(),
            PostField::Author => self.author.as_ref(),
            PostField::Url => self.url.as_ref(),
            PostField::Date => self.date.as_ref(),
            PostField::Content => self.content.as_ref(),
        }
    }

    /// Title rendered as plain text, for listings
    pub fn title_text(&self) -> String {
        self.title.as_ref().map(FieldValue::concat).unwrap_or_default()
    }

    /// URL rendered as plain text, for listings
    pub fn url_text(&self) -> String {
        self.url.as_ref().map(FieldValue::concat).unwrap_or_default()
    }
}

/// Ids are stringified like any other value, so `null` becomes "null"
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(js_string(&value))
}

/// Searchable fields of a post record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostField {
    Title,
    Tags,
    Author,
    Url,
    Date,
    Content,
}

impl PostField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Tags => "tags",
            PostField::Author => "author",
            PostField::Url => "url",
            PostField::Date => "date",
            PostField::Content => "content",
        }
    }
}

/// A post field as it appears in the index.
///
/// The generator emits plain strings for most fields, lists for tags and
/// sometimes an object for the author. Each kind has its own
/// concatenation rule, see [`FieldValue::concat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldValue {
    /// A JSON array; elements are concatenated with no separator
    Sequence(Vec<String>),
    /// A JSON object (or `null`); values are concatenated in sorted key order
    Map(Vec<(String, String)>),
    /// Any other JSON value, stringified
    Scalar(String),
}

impl FieldValue {
    /// The string this field contributes to a searchee
    pub fn concat(&self) -> String {
        match self {
            FieldValue::Sequence(items) => items.concat(),
            FieldValue::Map(entries) => entries.iter().map(|(_, v)| v.as_str()).collect(),
            FieldValue::Scalar(s) => s.clone(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => FieldValue::Sequence(items.iter().map(js_string).collect()),
            // serde_json's default map is ordered by key
            Value::Object(map) => {
                FieldValue::Map(map.iter().map(|(k, v)| (k.clone(), js_string(v))).collect())
            }
            Value::Null => FieldValue::Map(Vec::new()),
            other => FieldValue::Scalar(js_string(&other)),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(field: FieldValue) -> Self {
        match field {
            FieldValue::Sequence(items) => Value::Array(items.into_iter().map(Value::String).collect()),
            FieldValue::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ),
            FieldValue::Scalar(s) => Value::String(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Scalar(s.to_string())
    }
}

/// Stringify a JSON value the way string concatenation does in a browser
pub fn js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
        }
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
