//! Editable video gallery state.

use serde::Serialize;
use tracing::warn;

use super::client::TestimonialStore;
use super::model::{Testimonial, TestimonialUpdate, VideoDisplay, VideoSource};
use crate::error::ContentError;

/// One rendered gallery card.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryCard {
    #[serde(flatten)]
    pub record: Testimonial,
    pub display: VideoDisplay,
}

/// The testimonial gallery: records, edit mode, and the card being edited.
#[derive(Debug, Clone)]
pub struct Gallery {
    videos: Vec<Testimonial>,
    edit_mode: bool,
    editing: Option<TestimonialUpdate>,
}

impl Gallery {
    /// Three empty slots, shown until real videos exist.
    pub fn placeholders() -> Self {
        let slot = |id: i64, description: &str| Testimonial {
            id,
            client_name: format!("Клиент {id}"),
            description: description.to_string(),
            video_url: String::new(),
            video_source: VideoSource::Upload,
            sort_order: id as i32,
        };
        Self::from_records(vec![
            slot(1, "Разблокировка за 3 дня"),
            slot(2, "Разблокировка за 5 дней"),
            slot(3, "Разблокировка за 2 дня"),
        ])
    }

    pub fn from_records(videos: Vec<Testimonial>) -> Self {
        Self {
            videos,
            edit_mode: false,
            editing: None,
        }
    }

    /// Fetch records from the store; an empty store yields the placeholders.
    pub async fn load(store: &dyn TestimonialStore) -> Result<Self, ContentError> {
        let records = store.list().await?;
        if records.is_empty() {
            return Ok(Self::placeholders());
        }
        Ok(Self::from_records(records))
    }

    pub fn videos(&self) -> &[Testimonial] {
        &self.videos
    }

    /// Records with their render decision, in display order.
    pub fn cards(&self) -> Vec<GalleryCard> {
        self.videos
            .iter()
            .map(|record| GalleryCard {
                record: record.clone(),
                display: record.display(),
            })
            .collect()
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn toggle_edit_mode(&mut self) {
        self.edit_mode = !self.edit_mode;
    }

    /// Id of the card whose edit form is open.
    pub fn editing_id(&self) -> Option<i64> {
        self.editing.as_ref().map(|e| e.id)
    }

    /// Open the edit form for a card, prefilled with its values.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        match self.videos.iter().find(|v| v.id == id) {
            Some(record) => {
                self.editing = Some(record.to_update());
                true
            }
            None => false,
        }
    }

    /// The open edit form, if any.
    pub fn edit_form_mut(&mut self) -> Option<&mut TestimonialUpdate> {
        self.editing.as_mut()
    }

    /// Use a locally uploaded file for a card.
    pub fn attach_upload(&mut self, id: i64, local_url: impl Into<String>) -> bool {
        match self.videos.iter_mut().find(|v| v.id == id) {
            Some(record) => {
                record.video_url = local_url.into();
                record.video_source = VideoSource::Upload;
                true
            }
            None => false,
        }
    }

    /// Close the edit form, apply it locally and propose it to the store.
    ///
    /// The local change stays even if the store rejects it; the error is
    /// returned so the caller can tell the editor.
    pub async fn save(&mut self, store: &dyn TestimonialStore) -> Result<(), ContentError> {
        let Some(update) = self.editing.take() else {
            return Ok(());
        };

        let Some(record) = self.videos.iter_mut().find(|v| v.id == update.id) else {
            return Err(ContentError::NotFound { id: update.id });
        };
        record.apply(&update);

        match store.update(&update).await {
            Ok(saved) => {
                *record = saved;
                Ok(())
            }
            Err(e) => {
                warn!(
                    id = update.id,
                    video_source = %update.video_type,
                    error = %e,
                    "Testimonial edit kept locally only"
                );
                Err(e)
            }
        }
    }
}
