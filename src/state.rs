use std::sync::Arc;

use anyhow::Result;
use talkcal_core::TalkCalendar;

use crate::settings::Settings;
use crate::upload::UploadStore;

/// Shared application state. Read-only once the server is up.
#[derive(Clone)]
pub struct AppState {
    pub calendar: Arc<TalkCalendar>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    /// Fails on calendar settings the core rejects (unknown zone, bad offset).
    pub fn new(settings: &Settings) -> Result<Self> {
        let calendar = TalkCalendar::new(&settings.calendar)?;
        let uploads = UploadStore::new(&settings.uploads.dir, &settings.server.public_url());
        Ok(Self::from_parts(calendar, uploads))
    }

    pub fn from_parts(calendar: TalkCalendar, uploads: UploadStore) -> Self {
        AppState {
            calendar: Arc::new(calendar),
            uploads: Arc::new(uploads),
        }
    }
}
