use serde::Serialize;

use super::recommendation::ContentCategory;

/// Practical guidance shown alongside a recommended content category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDetails {
    pub description: &'static str,
    pub techniques: &'static [&'static str],
    pub duration: &'static str,
    pub resources: &'static [&'static str],
}

impl ContentCategory {
    pub fn details(self) -> CategoryDetails {
        match self {
            ContentCategory::Meditation => CategoryDetails {
                description: "Mindfulness practices to reduce stress and improve mental clarity",
                techniques: &[
                    "Guided meditation",
                    "Body scan",
                    "Breathing meditation",
                    "Walking meditation",
                ],
                duration: "10-20 minutes daily",
                resources: &["Headspace", "Calm", "Insight Timer"],
            },
            ContentCategory::NatureSounds => CategoryDetails {
                description: "Natural audio environments for relaxation and stress relief",
                techniques: &["Rain sounds", "Ocean waves", "Forest sounds", "White noise"],
                duration: "Background listening or 15-30 minutes",
                resources: &["Rain Rain", "Noisli", "Brain.fm"],
            },
            ContentCategory::RelaxingMusic => CategoryDetails {
                description: "Therapeutic music to regulate emotions and reduce anxiety",
                techniques: &[
                    "Classical music",
                    "Nature sounds with music",
                    "Binaural beats",
                    "Instrumental music",
                ],
                duration: "30-60 minutes as needed",
                resources: &["Spotify wellness playlists", "YouTube Music", "Apple Music"],
            },
            ContentCategory::GuidedBreathing => CategoryDetails {
                description: "Structured breathing exercises for immediate stress relief",
                techniques: &[
                    "4-7-8 breathing",
                    "Box breathing",
                    "Progressive relaxation",
                    "Coherent breathing",
                ],
                duration: "5-15 minutes per session",
                resources: &["Breathe", "Pranayama", "Breathwrk"],
            },
            ContentCategory::ProfessionalTherapy => CategoryDetails {
                description:
                    "Professional psychological support for comprehensive mental health care",
                techniques: &[
                    "Cognitive Behavioral Therapy",
                    "Mindfulness-based therapy",
                    "Stress management",
                    "Individual counseling",
                ],
                duration: "45-60 minutes per session",
                resources: &[
                    "Licensed psychologists",
                    "Mental health counselors",
                    "Psychiatrists",
                ],
            },
            ContentCategory::Podcasts => CategoryDetails {
                description:
                    "Educational content for mental health awareness and coping strategies",
                techniques: &[
                    "Psychology podcasts",
                    "Self-help content",
                    "Meditation guides",
                    "Therapy sessions",
                ],
                duration: "20-60 minutes per episode",
                resources: &["Spotify", "Apple Podcasts", "Pocket Casts"],
            },
        }
    }
}
