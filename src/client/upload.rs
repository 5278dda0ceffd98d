use chrono::{Local, NaiveDate};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};

use super::album::Album;
use super::api::PhotoUpload;
use super::tags::TagSet;
use super::{AlbumBackend, ClientError};
use crate::models::photo::Photo;
use crate::utils::validation::check_image;

pub const PROGRESS_TICK: Duration = Duration::from_millis(200);
const PROGRESS_STEP: u8 = 10;
const PROGRESS_CAP: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FileSelected,
    FormFilled,
    Uploading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        SelectedFile {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub caption: String,
    pub memory_note: String,
    pub date: NaiveDate,
    pub location: String,
    pub tags: TagSet,
}

impl UploadForm {
    pub fn new(date: NaiveDate) -> Self {
        UploadForm {
            title: String::new(),
            caption: String::new(),
            memory_note: String::new(),
            date,
            location: String::new(),
            tags: TagSet::new(),
        }
    }

    /// Title and caption are the only required fields.
    pub fn is_filled(&self) -> bool {
        !self.title.trim().is_empty() && !self.caption.trim().is_empty()
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

/// Cosmetic upload progress: it moves on a timer, not with transferred bytes.
#[derive(Debug)]
pub struct SimulatedProgress {
    tx: watch::Sender<u8>,
}

impl SimulatedProgress {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        SimulatedProgress { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }

    pub fn value(&self) -> u8 {
        *self.tx.borrow()
    }

    pub fn reset(&self) {
        self.tx.send_replace(0);
    }

    /// One timer step, never past 90 while the request is pending.
    pub fn advance(&self) {
        self.tx.send_modify(|value| *value = value.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP));
    }

    pub fn complete(&self) {
        self.tx.send_replace(100);
    }
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// `Idle → FileSelected → FormFilled → Uploading → Done | Failed`.
///
/// `Done` and `Failed` are the two outcomes of [`UploadFlow::submit`]: on
/// success the flow is back to `Idle`, on failure it stays `FormFilled` with
/// the error kept in [`UploadFlow::last_error`].
#[derive(Debug, Default)]
pub struct UploadFlow {
    file: Option<SelectedFile>,
    form: UploadForm,
    uploading: bool,
    last_error: Option<String>,
    progress: SimulatedProgress,
}

impl UploadFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UploadState {
        if self.uploading {
            UploadState::Uploading
        } else if self.file.is_none() {
            UploadState::Idle
        } else if self.form.is_filled() {
            UploadState::FormFilled
        } else {
            UploadState::FileSelected
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn form(&self) -> &UploadForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UploadForm {
        &mut self.form
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.progress.value()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Rejected files leave the flow exactly as it was.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), ClientError> {
        check_image(&file.mime_type, file.size()).map_err(|err| ClientError::Validation(err.to_string()))?;
        self.file = Some(file);
        self.last_error = None;
        self.progress.reset();
        Ok(())
    }

    /// Drops the selected file, clears the form and zeroes progress.
    pub fn reset(&mut self) {
        self.file = None;
        self.form = UploadForm::default();
        self.last_error = None;
        self.uploading = false;
        self.progress.reset();
    }

    pub async fn submit<B: AlbumBackend + ?Sized>(
        &mut self,
        backend: &B,
        album: &mut Album,
    ) -> Result<Photo, ClientError> {
        let upload = self.prepare()?;

        self.uploading = true;
        self.last_error = None;
        self.progress.reset();

        let request = backend.upload_photo(upload);
        tokio::pin!(request);
        let mut ticker = interval_at(Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
        let result = loop {
            tokio::select! {
                result = &mut request => break result,
                _ = ticker.tick() => self.progress.advance(),
            }
        };
        self.uploading = false;

        match result {
            Ok(photo) => {
                self.progress.complete();
                // subscribers see 100 before the reset drops it back to 0
                tokio::task::yield_now().await;
                log::info!("\"{}\" has been added to the album", photo.title);
                album.merge_photo(photo.clone());
                self.reset();
                Ok(photo)
            }
            Err(err) => {
                self.progress.reset();
                log::error!("Upload failed: {}", err);
                self.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    fn prepare(&self) -> Result<PhotoUpload, ClientError> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| ClientError::Validation("Please select an image to upload".to_string()))?;
        if !self.form.is_filled() {
            return Err(ClientError::Validation("Title and caption are required".to_string()));
        }

        let upload = PhotoUpload {
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes: file.bytes.clone(),
            title: self.form.title.trim().to_string(),
            caption: self.form.caption.trim().to_string(),
            memory_note: self.form.memory_note.trim().to_string(),
            date: self.form.date,
            location: self.form.location.trim().to_string(),
            tags: self.form.tags.to_vec(),
        };
        upload.check()?;
        Ok(upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeBackend;
    use crate::utils::validation::MAX_UPLOAD_BYTES;
    use std::sync::{Arc, Mutex};

    fn jpeg(size: usize) -> SelectedFile {
        SelectedFile::new("date.jpg", "image/jpeg", vec![0xFF; size])
    }

    fn filled_flow() -> UploadFlow {
        let mut flow = UploadFlow::new();
        flow.select_file(jpeg(2 * 1024 * 1024)).unwrap();
        let form = flow.form_mut();
        form.title = "Our First Date".to_string();
        form.caption = "The day everything changed".to_string();
        form.date = NaiveDate::from_ymd_opt(2023, 2, 14).unwrap();
        form.tags.add("first-date").unwrap();
        flow
    }

    #[test]
    fn states_follow_file_and_form() {
        let mut flow = UploadFlow::new();
        assert_eq!(flow.state(), UploadState::Idle);

        flow.select_file(jpeg(10)).unwrap();
        assert_eq!(flow.state(), UploadState::FileSelected);

        flow.form_mut().title = "Our First Date".to_string();
        assert_eq!(flow.state(), UploadState::FileSelected);
        flow.form_mut().caption = "The day everything changed".to_string();
        assert_eq!(flow.state(), UploadState::FormFilled);
    }

    #[test]
    fn rejected_file_keeps_previous_state() {
        let mut flow = UploadFlow::new();
        assert!(flow.select_file(SelectedFile::new("a.bmp", "image/bmp", vec![1, 2])).is_err());
        assert!(flow.select_file(jpeg(MAX_UPLOAD_BYTES + 1)).is_err());
        assert_eq!(flow.state(), UploadState::Idle);

        flow.select_file(jpeg(10)).unwrap();
        assert!(flow.select_file(SelectedFile::new("a.txt", "text/plain", vec![1])).is_err());
        assert_eq!(flow.file().map(|f| f.name.as_str()), Some("date.jpg"));
    }

    #[tokio::test]
    async fn unfilled_form_never_uploads() {
        let backend = FakeBackend::default();
        let mut album = Album::new();
        let mut flow = UploadFlow::new();

        assert!(matches!(
            flow.submit(&backend, &mut album).await,
            Err(ClientError::Validation(_))
        ));

        flow.select_file(jpeg(10)).unwrap();
        flow.form_mut().title = "Only a title".to_string();
        assert!(matches!(
            flow.submit(&backend, &mut album).await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn success_merges_and_resets() {
        let backend = FakeBackend::default();
        let mut album = Album::new();
        let mut flow = filled_flow();

        let photo = flow.submit(&backend, &mut album).await.unwrap();

        assert_eq!(album.photos().len(), 1);
        assert_eq!(album.photos()[0].id, photo.id);
        assert_eq!(photo.tags, vec!["first-date"]);
        assert_eq!(flow.state(), UploadState::Idle);
        assert!(flow.form().tags.is_empty());
        assert!(flow.form().title.is_empty());
        assert_eq!(flow.progress(), 0);

        let sent = backend.uploads();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].bytes.len(), 2 * 1024 * 1024);
    }

    #[tokio::test]
    async fn failure_returns_to_filled_form() {
        let backend = FakeBackend::failing();
        let mut album = Album::new();
        let mut flow = filled_flow();

        let err = flow.submit(&backend, &mut album).await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 500, .. }));
        assert_eq!(flow.state(), UploadState::FormFilled);
        assert_eq!(flow.last_error(), Some("Failed to create photo"));
        assert_eq!(flow.form().title, "Our First Date");
        assert!(flow.file().is_some());
        assert_eq!(flow.progress(), 0);
        assert!(album.photos().is_empty());
    }

    #[tokio::test]
    async fn tags_added_then_removed_submit_empty() {
        let backend = FakeBackend::default();
        let mut album = Album::new();
        let mut flow = filled_flow();
        flow.form_mut().tags.add("beach").unwrap();
        flow.form_mut().tags.remove("beach");
        flow.form_mut().tags.remove("first-date");

        flow.submit(&backend, &mut album).await.unwrap();
        assert!(backend.uploads()[0].tags.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_capped_until_the_request_resolves() {
        let backend = FakeBackend::default().with_upload_delay(Duration::from_secs(5));
        let mut album = Album::new();
        let mut flow = filled_flow();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut rx = flow.subscribe_progress();
        let recorder = {
            let seen = seen.clone();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let value = *rx.borrow_and_update();
                    seen.lock().unwrap().push(value);
                    if value == 100 {
                        break;
                    }
                }
            })
        };

        flow.submit(&backend, &mut album).await.unwrap();
        recorder.await.unwrap();
        assert_eq!(flow.progress(), 0);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.last(), Some(&100));
        let pending = &seen[..seen.len() - 1];
        assert!(pending.contains(&90));
        assert!(pending.iter().all(|value| *value <= 90));
    }

    #[test]
    fn simulated_progress_steps() {
        let progress = SimulatedProgress::new();
        for _ in 0..3 {
            progress.advance();
        }
        assert_eq!(progress.value(), 30);
        for _ in 0..20 {
            progress.advance();
        }
        assert_eq!(progress.value(), 90);
        progress.complete();
        assert_eq!(progress.value(), 100);
    }
}
