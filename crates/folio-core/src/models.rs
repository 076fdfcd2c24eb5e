//! Core data models for folio.
//!
//! These types are shared across all folio crates and represent the project
//! catalog entries in the shape both stores exchange with the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::slug::slugify;

// =============================================================================
// PROJECT TYPES
// =============================================================================

/// Video hosting provider for an embedded project video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    #[default]
    Youtube,
    Drive,
}

/// A video attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: VideoKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A portfolio project, the catalog's only entity.
///
/// Deserialization is lenient so blobs written by older versions of the
/// site still load: list, flag and status fields may be absent or `null`,
/// ids and team sizes may be numbers, `images` is accepted for
/// `project_images`, and `project_url` for `live_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Rich text/HTML, stored verbatim.
    #[serde(default)]
    pub content: Option<String>,
    /// Cover image: a URL or an embedded `data:` URI.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, alias = "images", deserialize_with = "null_as_default")]
    pub project_images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub videos: Vec<Video>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default = "default_status", deserialize_with = "null_as_status")]
    pub status: String,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default, alias = "project_url")]
    pub live_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub team_size: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> String {
    crate::defaults::PROJECT_STATUS.to_string()
}

impl Project {
    /// Slug to use for lookups: the stored one, or one derived from the title.
    pub fn effective_slug(&self) -> String {
        if self.slug.is_empty() {
            slugify(&self.title)
        } else {
            self.slug.clone()
        }
    }

    /// Copy of this project with embedded image payloads removed.
    ///
    /// Drops `data:` URIs and any image reference longer than `max_len`
    /// from `image_url` and `project_images`. Used when the full collection
    /// does not fit in local storage.
    pub fn without_embedded_images(&self, max_len: usize) -> Project {
        let keep = |s: &String| !is_embedded_image(s, max_len);
        Project {
            image_url: self.image_url.clone().filter(|s| keep(s)),
            project_images: self
                .project_images
                .iter()
                .filter(|s| keep(*s))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

/// True when an image reference carries its payload inline.
pub fn is_embedded_image(reference: &str, max_len: usize) -> bool {
    reference.starts_with("data:") || reference.len() > max_len
}

/// Request for creating a new project.
///
/// Only `title` is required. `slug` is derived from the title when absent,
/// and `id` is honoured only when the project is stored locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
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
    pub project_images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
}

impl NewProject {
    /// Create a request with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Reject requests without a usable title.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)
    }

    /// Build the stored record, stamping both timestamps with `now`.
    pub fn into_project(self, id: String, now: DateTime<Utc>, user_id: Option<String>) -> Project {
        let slug = match self.slug {
            Some(slug) if !slug.trim().is_empty() => slug,
            _ => slugify(&self.title),
        };
        Project {
            id,
            title: self.title.trim().to_string(),
            slug,
            subtitle: self.subtitle,
            description: self.description,
            content: self.content,
            image_url: self.image_url,
            project_images: self.project_images,
            videos: self.videos,
            technologies: self.technologies,
            tags: self.tags,
            featured: self.featured,
            status: self.status.unwrap_or_else(default_status),
            github_url: self.github_url,
            live_url: self.live_url,
            location: self.location,
            duration: self.duration,
            team_size: self.team_size,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a project. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<Video>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
}

impl ProjectPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &ProjectPatch::default()
    }

    /// Reject patches that would blank the title.
    pub fn validate(&self) -> Result<()> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    /// Merge this patch onto `project`, returning the updated record.
    ///
    /// `id`, `created_at`, `updated_at` and `user_id` are never touched here.
    /// A new title without an explicit slug re-derives the slug.
    pub fn apply(&self, project: &Project) -> Project {
        let mut next = project.clone();
        if let Some(title) = &self.title {
            next.title = title.trim().to_string();
            if self.slug.is_none() {
                next.slug = slugify(&next.title);
            }
        }
        if let Some(slug) = &self.slug {
            next.slug = slug.clone();
        }
        set_if(&mut next.subtitle, &self.subtitle);
        set_if(&mut next.description, &self.description);
        set_if(&mut next.content, &self.content);
        set_if(&mut next.image_url, &self.image_url);
        set_if(&mut next.github_url, &self.github_url);
        set_if(&mut next.live_url, &self.live_url);
        set_if(&mut next.location, &self.location);
        set_if(&mut next.duration, &self.duration);
        set_if(&mut next.team_size, &self.team_size);
        if let Some(images) = &self.project_images {
            next.project_images = images.clone();
        }
        if let Some(videos) = &self.videos {
            next.videos = videos.clone();
        }
        if let Some(technologies) = &self.technologies {
            next.technologies = technologies.clone();
        }
        if let Some(tags) = &self.tags {
            next.tags = tags.clone();
        }
        if let Some(featured) = self.featured {
            next.featured = featured;
        }
        if let Some(status) = &self.status {
            next.status = status.clone();
        }
        next
    }
}

fn set_if(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *field = Some(v.clone());
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("project title cannot be empty".to_string()));
    }
    Ok(())
}

// =============================================================================
// LENIENT FIELD DESERIALIZERS
// =============================================================================

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_status<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_status))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s)),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string, number or null, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Project {
        NewProject {
            technologies: vec!["Rust".into(), "PostGIS".into()],
            tags: vec!["gis".into()],
            image_url: Some("https://cdn.example.com/cover.png".into()),
            ..NewProject::titled("WOOD-ID")
        }
        .into_project("7".into(), Utc::now(), None)
    }

    #[test]
    fn test_into_project_derives_slug_and_stamps_times() {
        let now = Utc::now();
        let p = NewProject::titled("My New Project").into_project("a".into(), now, None);
        assert_eq!(p.slug, "my-new-project");
        assert_eq!(p.created_at, now);
        assert_eq!(p.updated_at, now);
        assert_eq!(p.status, "published");
        assert!(p.user_id.is_none());
    }

    #[test]
    fn test_into_project_keeps_explicit_slug() {
        let req = NewProject {
            slug: Some("custom".into()),
            ..NewProject::titled("Anything")
        };
        let p = req.into_project("a".into(), Utc::now(), Some("owner".into()));
        assert_eq!(p.slug, "custom");
        assert_eq!(p.user_id.as_deref(), Some("owner"));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        assert!(NewProject::titled("   ").validate().is_err());
        assert!(NewProject::titled("ok").validate().is_ok());
    }

    #[test]
    fn test_patch_apply_keeps_untouched_fields() {
        let original = sample();
        let patch = ProjectPatch {
            description: Some("Timber provenance".into()),
            featured: Some(true),
            ..Default::default()
        };
        let updated = patch.apply(&original);
        assert_eq!(updated.description.as_deref(), Some("Timber provenance"));
        assert!(updated.featured);
        assert_eq!(updated.title, original.title);
        assert_eq!(updated.technologies, original.technologies);
        assert_eq!(updated.image_url, original.image_url);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn test_patch_title_rederives_slug() {
        let updated = ProjectPatch {
            title: Some("Wood ID v2".into()),
            ..Default::default()
        }
        .apply(&sample());
        assert_eq!(updated.slug, "wood-id-v2");
    }

    #[test]
    fn test_patch_explicit_slug_wins() {
        let updated = ProjectPatch {
            title: Some("Wood ID v2".into()),
            slug: Some("wood".into()),
            ..Default::default()
        }
        .apply(&sample());
        assert_eq!(updated.slug, "wood");
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let original = sample();
        let patch = ProjectPatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.apply(&original), original);
    }

    #[test]
    fn test_patch_validate_rejects_blank_title() {
        let patch = ProjectPatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(patch.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_deserialize_legacy_shape() {
        let value = json!({
            "id": 12,
            "title": "WOOD-ID",
            "images": ["a.png", "b.png"],
            "project_url": "https://wood.example.com",
            "team_size": 4,
            "unknown_field": true
        });
        let p: Project = serde_json::from_value(value).unwrap();
        assert_eq!(p.id, "12");
        assert_eq!(p.project_images, vec!["a.png", "b.png"]);
        assert_eq!(p.live_url.as_deref(), Some("https://wood.example.com"));
        assert_eq!(p.team_size.as_deref(), Some("4"));
        assert_eq!(p.status, "published");
        assert!(p.slug.is_empty());
        assert_eq!(p.effective_slug(), "wood-id");
    }

    #[test]
    fn test_deserialize_null_fields_as_defaults() {
        let value = json!({
            "id": "1",
            "title": "Portfolio Website",
            "images": null,
            "videos": null,
            "technologies": null,
            "tags": null,
            "featured": null,
            "status": null
        });
        let p: Project = serde_json::from_value(value).unwrap();
        assert!(p.project_images.is_empty());
        assert!(p.videos.is_empty());
        assert!(p.technologies.is_empty());
        assert!(p.tags.is_empty());
        assert!(!p.featured);
        assert_eq!(p.status, "published");
    }

    #[test]
    fn test_deserialize_requires_title() {
        let value = json!({ "id": "1" });
        assert!(serde_json::from_value::<Project>(value).is_err());
    }

    #[test]
    fn test_video_kind_serializes_lowercase() {
        let video = Video {
            id: "v1".into(),
            title: "Demo".into(),
            url: "https://youtu.be/x".into(),
            kind: VideoKind::Drive,
            description: None,
        };
        let value = serde_json::to_value(&video).unwrap();
        assert_eq!(value["type"], "drive");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_without_embedded_images_strips_data_uris() {
        let mut p = sample();
        p.image_url = Some("data:image/png;base64,AAAA".into());
        p.project_images = vec![
            "https://cdn.example.com/1.png".into(),
            "data:image/jpeg;base64,BBBB".into(),
            "x".repeat(5000),
        ];
        let stripped = p.without_embedded_images(2048);
        assert!(stripped.image_url.is_none());
        assert_eq!(stripped.project_images, vec!["https://cdn.example.com/1.png"]);
        assert_eq!(stripped.title, p.title);
    }
}
