//! Portfolio content: experiences and skills

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Envelope used by every listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePayload {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub image_urls: Vec<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

/// A skill card.
///
/// The backend has been seen to send `imageUrls` as `null` or a bare string;
/// anything that is not an array decodes as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub image_urls: Vec<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: bool,
    pub id: String,
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn skill_json(image_urls: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "s1",
            "title": "Rust",
            "summary": "Systems",
            "body": "<p>body</p>",
            "imageUrls": image_urls,
            "tags": ["lang"],
            "visibility": "public",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        })
    }

    #[test]
    fn skill_image_urls_keep_arrays() {
        let skill: Skill = serde_json::from_value(skill_json(json!(["a.png", "b.png"]))).unwrap();
        assert_eq!(skill.image_urls, vec!["a.png", "b.png"]);
    }

    #[test]
    fn skill_image_urls_non_array_becomes_empty() {
        for raw in [json!(null), json!("a.png"), json!({ "0": "a.png" })] {
            let skill: Skill = serde_json::from_value(skill_json(raw)).unwrap();
            assert!(skill.image_urls.is_empty());
        }
    }

    #[test]
    fn payload_serializes_camel_case() {
        let payload = ExperiencePayload {
            title: "Lead".into(),
            image_urls: vec!["x.png".into()],
            visibility: Visibility::Private,
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["imageUrls"], json!(["x.png"]));
        assert_eq!(value["visibility"], json!("private"));
    }
}
