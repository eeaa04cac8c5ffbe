//! File intake and identification start-up

use super::App;
use crate::constants::STAGES;
use crate::error::IdentifyError;
use crate::intake::FileCandidate;
use crate::progress::{self, IdentificationJob};
use crate::session::Event;
use crate::types::UploadedImage;
use eframe::egui;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

impl App {
    pub(crate) fn open_file_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select a sneaker photo")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .set_directory(self.settings.last_open_dir_or_default())
            .pick_file()
        else {
            return;
        };

        if let Some(parent) = path.parent() {
            self.settings.last_open_dir = Some(parent.to_string_lossy().to_string());
        }
        match FileCandidate::from_path(&path) {
            Ok(candidate) => self.offer_file(candidate),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open selected file");
                self.dispatch(Event::FileRejected(e));
            }
        }
    }

    /// Take the first file dropped onto the window this frame
    pub(crate) fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.first() else {
            return;
        };
        if dropped.len() > 1 {
            debug!(count = dropped.len(), "Several files dropped, using the first");
        }
        match FileCandidate::from_dropped(file) {
            Some(candidate) => self.offer_file(candidate),
            None => {
                let name = file
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| file.name.clone());
                self.dispatch(Event::FileRejected(IdentifyError::ReadFailure(format!(
                    "Could not read dropped file {}",
                    name
                ))));
            }
        }
    }

    /// Decode the candidate on the runtime; the session decides on arrival
    /// whether it replaces the current image.
    pub(crate) fn offer_file(&mut self, candidate: FileCandidate) {
        info!(name = %candidate.name, mime = %candidate.mime, size = candidate.size, "File offered");
        let seq = self.loads.offer();
        self.runtime
            .spawn(progress::load_file(seq, candidate, self.tx.clone(), self.repaint_handle()));
    }

    pub(crate) fn is_loading_file(&self) -> bool {
        self.loads.is_pending()
    }

    pub(crate) fn start_identification(&mut self, attempt: u64, image: UploadedImage) {
        let Some(predictor) = self.predictor.clone() else {
            self.dispatch(Event::PredictionFailed {
                attempt,
                error: IdentifyError::network("Prediction service is not configured, check the log for details"),
            });
            return;
        };

        let token = CancellationToken::new();
        self.cancel_tokens.insert(attempt, token.clone());
        let job = IdentificationJob {
            attempt,
            image,
            predictor,
            stages: STAGES,
            pacing: 1.0,
            token,
            tx: self.tx.clone(),
            repaint: self.repaint_handle(),
        };
        self.runtime.spawn(progress::supervise(job));
    }
}
