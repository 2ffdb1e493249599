use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prize {
    pub position: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub date: String,
    pub time: String,
    pub title: String,
    pub description: Option<String>,
    pub location_or_link: Option<String>,
}

/// Event description, either plain text or the content service's rich-text node tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Rich(Vec<Value>),
}

impl Default for Description {
    fn default() -> Self {
        Description::Rich(Vec::new())
    }
}

impl Description {
    pub fn plain_text(&self) -> String {
        let raw = match self {
            Description::Text(s) => return s.clone(),
            Description::Rich(nodes) => nodes.iter().map(node_text).collect::<Vec<_>>().join(" "),
        };
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn node_text(node: &Value) -> String {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_owned();
        }
    }
    match node.get("children").and_then(Value::as_array) {
        Some(children) => children.iter().map(node_text).collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Description,
    pub hero_video_url: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub demo_day_date: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub prizes: Vec<Prize>,
    #[serde(default, deserialize_with = "nullable")]
    pub schedule_items: Vec<ScheduleItem>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
