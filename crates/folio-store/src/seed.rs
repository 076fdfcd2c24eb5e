//! Deterministic sample catalog used when recovery finds nothing.

use chrono::{DateTime, TimeZone, Utc};
use folio_core::{slugify, Project, Video, VideoKind};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    title: &str,
    subtitle: &str,
    description: &str,
    technologies: &[&str],
    tags: &[&str],
    featured: bool,
    status: &str,
    created: i64,
) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        slug: slugify(title),
        subtitle: Some(subtitle.to_string()),
        description: Some(description.to_string()),
        content: Some(format!("<p>{}</p>", description)),
        image_url: None,
        project_images: Vec::new(),
        videos: Vec::new(),
        technologies: strings(technologies),
        tags: strings(tags),
        featured,
        status: status.to_string(),
        github_url: None,
        live_url: None,
        location: None,
        duration: None,
        team_size: None,
        user_id: None,
        created_at: at(created),
        updated_at: at(created),
    }
}

/// The fixed sample projects synthesized when no stored record survives.
///
/// Same ids, titles and timestamps on every call.
pub fn seed_projects() -> Vec<Project> {
    let mut wood_id = sample(
        "seed-wood-id",
        "WOOD-ID",
        "Timber species identification",
        "Identifies timber species from cross-section photographs in the field.",
        &["Python", "TensorFlow", "React Native"],
        &["machine-learning", "forestry"],
        true,
        "Live Demo",
        1_672_531_200,
    );
    wood_id.videos = vec![Video {
        id: "seed-wood-id-demo".to_string(),
        title: "WOOD-ID walkthrough".to_string(),
        url: "https://www.youtube.com/watch?v=wood-id-demo".to_string(),
        kind: VideoKind::Youtube,
        description: None,
    }];

    vec![
        wood_id,
        sample(
            "seed-land-registry",
            "Land Registry Ledger",
            "Parcel history on an append-only ledger",
            "Tracks land parcel transfers with a tamper-evident history.",
            &["Rust", "PostgreSQL"],
            &["gis", "ledger"],
            false,
            "Built",
            1_675_209_600,
        ),
        sample(
            "seed-flood-forecasting",
            "Coastal Flood Forecasting",
            "Tide and surge risk maps",
            "Combines tide gauges and storm surge models into daily risk maps.",
            &["Python", "xarray", "Leaflet"],
            &["climate", "research"],
            true,
            "Research",
            1_677_628_800,
        ),
    ]
}
