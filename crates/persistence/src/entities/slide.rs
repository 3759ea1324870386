//! Slide entities (database row mappings).

use domain::models::{Slide, SlideTranslation};
use sqlx::FromRow;

/// Row of `slide_meta`.
#[derive(Debug, Clone, FromRow)]
pub struct SlideMetaEntity {
    pub id: i64,
    pub position: i32,
    pub active: bool,
}

/// Row of `slide_translations`.
#[derive(Debug, Clone, FromRow)]
pub struct SlideTranslationEntity {
    pub id: i64,
    pub language_id: i32,
    pub title: String,
    pub description: String,
    pub caption: String,
    pub url: String,
    pub image: String,
}

impl From<SlideTranslationEntity> for SlideTranslation {
    fn from(entity: SlideTranslationEntity) -> Self {
        Self {
            title: entity.title,
            caption: entity.caption,
            description: entity.description,
            target_url: entity.url,
            image_filename: entity.image,
        }
    }
}

impl SlideMetaEntity {
    /// Assembles the aggregate from its meta row and translation rows.
    pub fn into_slide(self, translations: Vec<SlideTranslationEntity>) -> Slide {
        Slide {
            id: Some(self.id),
            position: self.position,
            active: self.active,
            translations: translations
                .into_iter()
                .filter(|t| t.id == self.id)
                .map(|t| (t.language_id, t.into()))
                .collect(),
        }
    }
}

/// Joined slide listing row for one shop and language.
#[derive(Debug, Clone, FromRow)]
pub struct SlideRowEntity {
    pub id: i64,
    pub position: i32,
    pub active: bool,
    pub title: String,
    pub description: String,
    pub caption: String,
    pub url: String,
    pub image: String,
    /// Number of shops the slide is associated with.
    pub shop_count: i64,
}
