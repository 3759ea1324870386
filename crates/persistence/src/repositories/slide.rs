//! Slide repository for database operations.

use std::collections::BTreeMap;

use domain::models::{Slide, SlideTranslation, SlideView};
use domain::services::normalize_target_url;
use sqlx::{PgConnection, PgPool};

use crate::entities::{SlideMetaEntity, SlideRowEntity, SlideTranslationEntity};
use crate::metrics::QueryTimer;

/// Filters for [`SlideRepository::list_slides`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideListQuery {
    pub shop_id: i32,
    pub language_id: i32,
    pub active_only: bool,
    /// Include slides without an image in the requested language.
    pub include_imageless: bool,
}

impl SlideListQuery {
    /// Public rendering: active slides that have an image.
    pub fn displayable(shop_id: i32, language_id: i32) -> Self {
        Self {
            shop_id,
            language_id,
            active_only: true,
            include_imageless: false,
        }
    }

    /// Admin listing: every slide of the shop.
    pub fn admin(shop_id: i32, language_id: i32) -> Self {
        Self {
            shop_id,
            language_id,
            active_only: false,
            include_imageless: true,
        }
    }
}

/// Repository for slide aggregates and their shop associations.
#[derive(Clone)]
pub struct SlideRepository {
    pool: PgPool,
}

async fn write_translations(
    conn: &mut PgConnection,
    slide_id: i64,
    translations: &BTreeMap<i32, SlideTranslation>,
) -> Result<(), sqlx::Error> {
    for (language_id, translation) in translations {
        sqlx::query(
            r#"
            INSERT INTO slide_translations (id, language_id, title, description, caption, url, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id, language_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                caption = EXCLUDED.caption,
                url = EXCLUDED.url,
                image = EXCLUDED.image
            "#,
        )
        .bind(slide_id)
        .bind(language_id)
        .bind(&translation.title)
        .bind(&translation.description)
        .bind(&translation.caption)
        .bind(&translation.target_url)
        .bind(&translation.image_filename)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

impl SlideRepository {
    /// Creates a new SlideRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a slide with all its translations.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Slide>, sqlx::Error> {
        let timer = QueryTimer::new("find_slide_by_id");
        let meta = sqlx::query_as::<_, SlideMetaEntity>(
            "SELECT id, position, active FROM slide_meta WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(meta) = meta else {
            timer.record();
            return Ok(None);
        };

        let translations = sqlx::query_as::<_, SlideTranslationEntity>(
            r#"
            SELECT id, language_id, title, description, caption, url, image
            FROM slide_translations
            WHERE id = $1
            ORDER BY language_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await;
        let translations = timer.finish(translations)?;

        Ok(Some(meta.into_slide(translations)))
    }

    pub async fn exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("slide_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM slide_meta WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Inserts a new slide, its translations and its shop associations.
    /// Returns the new slide id.
    pub async fn create(&self, slide: &Slide, shop_ids: &[i32]) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("create_slide");
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO slide_meta (position, active) VALUES ($1, $2) RETURNING id",
        )
        .bind(slide.position)
        .bind(slide.active)
        .fetch_one(&mut *tx)
        .await?;

        write_translations(&mut *tx, id, &slide.translations).await?;

        for shop_id in shop_ids {
            sqlx::query(
                "INSERT INTO slides (id, shop_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(id)
    }

    /// Updates meta fields and upserts every translation of a persisted slide.
    /// Returns 0 when the slide no longer exists.
    pub async fn update(&self, slide: &Slide) -> Result<u64, sqlx::Error> {
        let id = slide.id.ok_or(sqlx::Error::RowNotFound)?;
        let timer = QueryTimer::new("update_slide");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE slide_meta SET position = $2, active = $3 WHERE id = $1")
            .bind(id)
            .bind(slide.position)
            .bind(slide.active)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            timer.record();
            return Ok(0);
        }

        write_translations(&mut *tx, id, &slide.translations).await?;

        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Deletes a slide with its translations and shop associations.
    /// Returns the distinct image filenames the slide referenced, or `None`
    /// when no such slide existed.
    pub async fn delete(&self, id: i64) -> Result<Option<Vec<String>>, sqlx::Error> {
        let timer = QueryTimer::new("delete_slide");
        let mut tx = self.pool.begin().await?;

        let images = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT image FROM slide_translations
            WHERE id = $1 AND image <> ''
            ORDER BY image
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM slides WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM slide_translations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM slide_meta WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();

        Ok((deleted > 0).then_some(images))
    }

    /// Ordered slide rows for one shop and language, with target links
    /// normalized against `base_url` and image URLs under `image_base_url`.
    pub async fn list_slides(
        &self,
        query: SlideListQuery,
        base_url: &str,
        image_base_url: &str,
    ) -> Result<Vec<SlideView>, sqlx::Error> {
        let timer = QueryTimer::new("list_slides");
        let rows = sqlx::query_as::<_, SlideRowEntity>(
            r#"
            SELECT m.id, m.position, m.active,
                   t.title, t.description, t.caption, t.url, t.image,
                   (SELECT COUNT(*) FROM slides s2 WHERE s2.id = m.id) AS shop_count
            FROM slides s
            JOIN slide_meta m ON m.id = s.id
            JOIN slide_translations t ON t.id = m.id AND t.language_id = $2
            WHERE s.shop_id = $1
              AND ($3 = FALSE OR m.active = TRUE)
              AND ($4 = TRUE OR t.image <> '')
            ORDER BY m.position ASC, m.id ASC
            "#,
        )
        .bind(query.shop_id)
        .bind(query.language_id)
        .bind(query.active_only)
        .bind(query.include_imageless)
        .fetch_all(&self.pool)
        .await;
        let rows = timer.finish(rows)?;

        Ok(rows
            .into_iter()
            .map(|row| SlideView {
                id: row.id,
                position: row.position,
                active: row.active,
                title: row.title,
                caption: row.caption,
                description: row.description,
                url: normalize_target_url(&row.url, base_url),
                image_url: if row.image.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", image_base_url, row.image)
                },
                image: row.image,
                is_shared: row.shop_count > 1,
            })
            .collect())
    }

    /// One more than the highest position among slides of the shop, or 1.
    pub async fn next_position(&self, shop_id: i32) -> Result<i32, sqlx::Error> {
        let timer = QueryTimer::new("next_slide_position");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT COALESCE(MAX(m.position), 0) + 1
            FROM slide_meta m
            JOIN slides s ON s.id = m.id
            WHERE s.shop_id = $1
            "#,
        )
        .bind(shop_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Shops the slide is associated with.
    pub async fn associated_shop_ids(&self, id: i64) -> Result<Vec<i32>, sqlx::Error> {
        let timer = QueryTimer::new("slide_shop_ids");
        let result = sqlx::query_scalar::<_, i32>(
            "SELECT shop_id FROM slides WHERE id = $1 ORDER BY shop_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Flips the active flag. Returns the new value, `None` for unknown ids.
    pub async fn toggle_active(&self, id: i64) -> Result<Option<bool>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_slide_active");
        let result = sqlx::query_scalar::<_, bool>(
            "UPDATE slide_meta SET active = NOT active WHERE id = $1 RETURNING active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Rewrites positions to 1..n following the order of `ids`.
    pub async fn update_positions(&self, ids: &[i64]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_slide_positions");
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;
        for (index, id) in ids.iter().enumerate() {
            updated += sqlx::query("UPDATE slide_meta SET position = $2 WHERE id = $1")
                .bind(id)
                .bind(index as i32 + 1)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Number of translation rows referencing an image file.
    pub async fn count_image_references(&self, image: &str) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_image_references");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM slide_translations WHERE image = $1",
        )
        .bind(image)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Copies every slide association of `old_shop_id` to `new_shop_id`.
    pub async fn duplicate_shop_associations(
        &self,
        old_shop_id: i32,
        new_shop_id: i32,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("duplicate_slide_shop_associations");
        let result = sqlx::query(
            r#"
            INSERT INTO slides (id, shop_id)
            SELECT id, $2 FROM slides WHERE shop_id = $1
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(old_shop_id)
        .bind(new_shop_id)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|r| r.rows_affected())
    }

    /// Every slide id, for uninstall.
    pub async fn all_ids(&self) -> Result<Vec<i64>, sqlx::Error> {
        let timer = QueryTimer::new("all_slide_ids");
        let result = sqlx::query_scalar::<_, i64>("SELECT id FROM slide_meta ORDER BY id")
            .fetch_all(&self.pool)
            .await;
        timer.finish(result)
    }
}
