//! Remote row shape and conversion to and from [`Project`].
//!
//! Rows in the hosted table have drifted over time: ids are bigint or text,
//! images live under `images` or `project_images`, the live link under
//! `live_url` or `project_url`, and older rows may lack a slug or
//! timestamps. [`ProjectRow::into_project`] folds all of that into the
//! canonical record.

use chrono::{DateTime, Utc};
use folio_core::{slugify, Error, Project, ProjectPatch, Result, Video};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A project row as returned by the remote table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRow {
    #[serde(default)]
    pub id: JsonValue,
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub project_images: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub videos: Option<Vec<Video>>,
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub team_size: Option<JsonValue>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectRow {
    /// Normalize the row into a [`Project`].
    ///
    /// Missing timestamps are filled with `now`. Rows without an id or a
    /// title are rejected as malformed.
    pub fn into_project(self, now: DateTime<Utc>) -> Result<Project> {
        let id = scalar_string(&self.id)
            .ok_or_else(|| Error::RemoteUnavailable(format!("malformed row id: {}", self.id)))?;
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::RemoteUnavailable(format!("row {id} has no title")))?;

        let mut project_images = self.project_images.unwrap_or_default();
        for image in self.images.unwrap_or_default() {
            if !project_images.contains(&image) {
                project_images.push(image);
            }
        }

        let slug = self
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&title));
        let created_at = self.created_at.unwrap_or(now);

        Ok(Project {
            id,
            title,
            slug,
            subtitle: self.subtitle,
            description: self.description,
            content: self.content,
            image_url: self.image_url,
            project_images,
            videos: self.videos.unwrap_or_default(),
            technologies: self.technologies.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            featured: self.featured.unwrap_or(false),
            status: self
                .status
                .unwrap_or_else(|| folio_core::defaults::PROJECT_STATUS.to_string()),
            github_url: self.github_url,
            live_url: self.live_url.or(self.project_url),
            location: self.location,
            duration: self.duration,
            team_size: self.team_size.as_ref().and_then(scalar_string),
            user_id: self.user_id,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

fn scalar_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Body for inserting a project. An empty id is omitted so the table
/// assigns one.
#[derive(Debug, Serialize)]
pub struct InsertRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub title: &'a str,
    pub slug: &'a str,
    pub subtitle: &'a Option<String>,
    pub description: &'a Option<String>,
    pub content: &'a Option<String>,
    pub image_url: &'a Option<String>,
    pub project_images: &'a [String],
    pub videos: &'a [Video],
    pub technologies: &'a [String],
    pub tags: &'a [String],
    pub featured: bool,
    pub status: &'a str,
    pub github_url: &'a Option<String>,
    pub live_url: &'a Option<String>,
    pub location: &'a Option<String>,
    pub duration: &'a Option<String>,
    pub team_size: &'a Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Project> for InsertRow<'a> {
    fn from(p: &'a Project) -> Self {
        Self {
            id: (!p.id.is_empty()).then_some(p.id.as_str()),
            title: &p.title,
            slug: &p.slug,
            subtitle: &p.subtitle,
            description: &p.description,
            content: &p.content,
            image_url: &p.image_url,
            project_images: &p.project_images,
            videos: &p.videos,
            technologies: &p.technologies,
            tags: &p.tags,
            featured: p.featured,
            status: &p.status,
            github_url: &p.github_url,
            live_url: &p.live_url,
            location: &p.location,
            duration: &p.duration,
            team_size: &p.team_size,
            user_id: p.user_id.as_deref(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body for a partial update: only the patched columns plus `updated_at`.
pub fn update_body(patch: &ProjectPatch, updated_at: DateTime<Utc>) -> Result<JsonValue> {
    let mut body = serde_json::to_value(patch)?;
    if let JsonValue::Object(map) = &mut body {
        if let Some(JsonValue::String(title)) = map.get_mut("title") {
            *title = title.trim().to_string();
        }
        map.insert("updated_at".to_string(), serde_json::to_value(updated_at)?);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: JsonValue) -> ProjectRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_id_and_legacy_columns() {
        let now = Utc::now();
        let p = row(json!({
            "id": 42,
            "title": "Timber Supply Tracker",
            "images": ["a.png"],
            "project_images": ["b.png", "a.png"],
            "project_url": "https://timber.example.com",
            "team_size": 3
        }))
        .into_project(now)
        .unwrap();

        assert_eq!(p.id, "42");
        assert_eq!(p.slug, "timber-supply-tracker");
        assert_eq!(p.project_images, vec!["b.png", "a.png"]);
        assert_eq!(p.live_url.as_deref(), Some("https://timber.example.com"));
        assert_eq!(p.team_size.as_deref(), Some("3"));
        assert_eq!(p.created_at, now);
        assert_eq!(p.updated_at, now);
        assert_eq!(p.status, "published");
    }

    #[test]
    fn test_live_url_preferred_over_project_url() {
        let p = row(json!({
            "id": "abc",
            "title": "X",
            "live_url": "https://new.example.com",
            "project_url": "https://old.example.com"
        }))
        .into_project(Utc::now())
        .unwrap();
        assert_eq!(p.live_url.as_deref(), Some("https://new.example.com"));
    }

    #[test]
    fn test_updated_at_defaults_to_created_at() {
        let created: DateTime<Utc> = "2024-03-01T10:00:00Z".parse().unwrap();
        let p = row(json!({ "id": 1, "title": "X", "created_at": "2024-03-01T10:00:00Z" }))
            .into_project(Utc::now())
            .unwrap();
        assert_eq!(p.created_at, created);
        assert_eq!(p.updated_at, created);
    }

    #[test]
    fn test_malformed_rows_rejected() {
        let no_id = row(json!({ "id": null, "title": "X" }));
        assert!(matches!(
            no_id.into_project(Utc::now()),
            Err(Error::RemoteUnavailable(_))
        ));

        let no_title = row(json!({ "id": 1, "title": "  " }));
        assert!(no_title.into_project(Utc::now()).is_err());
    }

    #[test]
    fn test_insert_row_omits_empty_id() {
        let project = folio_core::NewProject::titled("WOOD-ID").into_project(
            String::new(),
            Utc::now(),
            None,
        );
        let body = serde_json::to_value(InsertRow::from(&project)).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("user_id").is_none());
        assert_eq!(body["slug"], "wood-id");
    }

    #[test]
    fn test_update_body_only_patched_columns() {
        let patch = ProjectPatch {
            title: Some("  Renamed ".into()),
            featured: Some(false),
            ..Default::default()
        };
        let at: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        let body = update_body(&patch, at).unwrap();
        let map = body.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["title"], "Renamed");
        assert_eq!(map["featured"], false);
        assert!(map.contains_key("updated_at"));
    }
}
