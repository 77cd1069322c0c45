//! Photo timeline over the attachment table.

use serde::Serialize;

use crate::models::{Attachment, DayMark};

/// Photos in send order with the position of each day's first photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoTimeline {
    /// Attachments sorted by message time
    pub photos: Vec<Attachment>,
    /// First photo of every calendar day, in order
    pub day_marks: Vec<DayMark>,
}

impl PhotoTimeline {
    /// Number of photos on the timeline
    #[must_use]
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Whether the timeline has no photos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

/// Sort `attachments` by message time (stable) and mark day boundaries.
#[must_use]
pub fn photo_timeline(attachments: &[Attachment]) -> PhotoTimeline {
    let mut photos = attachments.to_vec();
    photos.sort_by_key(|a| a.timestamp);

    let mut day_marks: Vec<DayMark> = Vec::new();
    for (index, photo) in photos.iter().enumerate() {
        let date = photo.timestamp.date();
        if day_marks.last().map_or(true, |mark| mark.date != date) {
            day_marks.push(DayMark { index, date });
        }
    }

    PhotoTimeline { photos, day_marks }
}
