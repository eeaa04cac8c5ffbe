//! Identification session state machine.
//!
//! `Session` owns every piece of mutable state of one upload-and-identify
//! session. `apply` is a pure reducer: it updates the state for an `Event`
//! and returns the `Effect`s the app layer has to carry out (toasts,
//! spawning the request, confirmation dialogs, animation). Nothing in here
//! touches the UI, the network or the clock.

use crate::error::IdentifyError;
use crate::types::*;

#[derive(Debug)]
pub enum Event {
    FileAccepted(UploadedImage),
    FileRejected(IdentifyError),
    TriggerRequested,
    ProgressAdvanced { attempt: u64, percent: u8, text: String },
    PredictionSucceeded { attempt: u64, prediction: RawPrediction },
    PredictionFailed { attempt: u64, error: IdentifyError },
    ResetRequested,
    ResetConfirmed,
    ResetDismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
}

#[derive(Debug)]
pub enum Effect {
    Toast(ToastKind, String),
    StartIdentification { attempt: u64, image: UploadedImage },
    /// Stop the cosmetic stages of an attempt; its request keeps running
    AbandonAttempt { attempt: u64 },
    AskResetConfirmation,
    StartBoxAnimation,
    /// Drop any box animation of a previous result
    ClearAnimation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: u8,
    pub text: String,
}

/// Comparable summary of everything the UI renders from a session
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: UiMode,
    pub file_name: Option<String>,
    pub has_image: bool,
    pub has_result: bool,
    pub error: Option<String>,
    pub progress: Option<Progress>,
    pub trigger_enabled: bool,
    pub trigger_label: TriggerLabel,
    pub confirm_reset: bool,
}

#[derive(Debug)]
pub struct Session {
    mode: UiMode,
    image: Option<UploadedImage>,
    /// Bumped whenever the image is replaced or dropped
    image_revision: u64,
    result: Option<PredictionResult>,
    error: Option<IdentifyError>,
    progress: Option<Progress>,
    /// Generation of the most recent identification; late outcomes of older
    /// attempts are ignored
    attempt: u64,
    trigger_label: TriggerLabel,
    file_name: Option<String>,
    confirm_reset: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            mode: UiMode::Idle,
            image: None,
            image_revision: 0,
            result: None,
            error: None,
            progress: None,
            attempt: 0,
            trigger_label: TriggerLabel::Start,
            file_name: None,
            confirm_reset: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn is_processing(&self) -> bool {
        self.mode == UiMode::Processing
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn image_revision(&self) -> u64 {
        self.image_revision
    }

    pub fn error(&self) -> Option<&IdentifyError> {
        self.error.as_ref()
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn trigger_label(&self) -> TriggerLabel {
        self.trigger_label
    }

    pub fn trigger_enabled(&self) -> bool {
        self.image.is_some() && !self.is_processing()
    }

    pub fn confirm_reset_pending(&self) -> bool {
        self.confirm_reset
    }

    /// The result, but only while the image it was computed for is present
    pub fn renderable_result(&self) -> Option<&PredictionResult> {
        let image = self.image.as_ref()?;
        self.result
            .as_ref()
            .filter(|r| r.source_size == image.dimensions())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            file_name: self.file_name.clone(),
            has_image: self.image.is_some(),
            has_result: self.result.is_some(),
            error: self.error.as_ref().map(|e| e.to_string()),
            progress: self.progress.clone(),
            trigger_enabled: self.trigger_enabled(),
            trigger_label: self.trigger_label,
            confirm_reset: self.confirm_reset,
        }
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::FileAccepted(image) => self.on_file_accepted(image),
            Event::FileRejected(error) => {
                // The running attempt keeps the banner; the rejection is
                // still reported
                if self.is_processing() {
                    return vec![Effect::Toast(ToastKind::Warning, error.to_string())];
                }
                self.error = Some(error);
                vec![]
            }
            Event::TriggerRequested => self.on_trigger(),
            Event::ProgressAdvanced { attempt, percent, text } => {
                if self.is_current(attempt) {
                    let behind = self.progress.as_ref().map_or(true, |p| percent >= p.percent);
                    if behind {
                        self.progress = Some(Progress { percent, text });
                    }
                }
                vec![]
            }
            Event::PredictionSucceeded { attempt, prediction } => {
                if !self.is_current(attempt) {
                    return vec![];
                }
                let Some(image) = &self.image else {
                    return vec![];
                };
                self.result = Some(prediction.into_result(image.dimensions()));
                self.mode = UiMode::Result;
                self.progress = None;
                self.trigger_label = TriggerLabel::Rerun;
                vec![
                    Effect::StartBoxAnimation,
                    Effect::Toast(ToastKind::Success, "Identification completed successfully!".into()),
                ]
            }
            Event::PredictionFailed { attempt, error } => {
                if self.is_current(attempt) {
                    self.error = Some(error);
                    self.mode = UiMode::Error;
                    self.progress = None;
                    self.trigger_label = TriggerLabel::Rerun;
                }
                vec![]
            }
            Event::ResetRequested => match self.mode {
                UiMode::Idle => vec![],
                UiMode::Processing => {
                    self.confirm_reset = true;
                    vec![Effect::AskResetConfirmation]
                }
                _ => self.reset(),
            },
            Event::ResetConfirmed => {
                if !self.confirm_reset {
                    return vec![];
                }
                let abandoned = self.attempt;
                let mut effects = vec![Effect::AbandonAttempt { attempt: abandoned }];
                effects.extend(self.reset());
                effects
            }
            Event::ResetDismissed => {
                self.confirm_reset = false;
                vec![]
            }
        }
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.is_processing() && attempt == self.attempt
    }

    fn on_file_accepted(&mut self, image: UploadedImage) -> Vec<Effect> {
        if self.is_processing() {
            return vec![Effect::Toast(
                ToastKind::Warning,
                "Please wait for the current identification to complete.".into(),
            )];
        }
        self.file_name = Some(image.name.clone());
        self.image = Some(image);
        self.image_revision += 1;
        self.result = None;
        self.error = None;
        self.progress = None;
        self.mode = UiMode::ImageLoaded;
        self.trigger_label = TriggerLabel::Start;
        vec![
            Effect::ClearAnimation,
            Effect::Toast(ToastKind::Success, "Image uploaded successfully!".into()),
        ]
    }

    fn on_trigger(&mut self) -> Vec<Effect> {
        if self.is_processing() {
            return vec![Effect::Toast(
                ToastKind::Warning,
                "Please wait for the current processing to complete.".into(),
            )];
        }
        let Some(image) = self.image.clone() else {
            return vec![Effect::Toast(ToastKind::Warning, "Please upload an image first.".into())];
        };
        self.attempt += 1;
        self.mode = UiMode::Processing;
        self.result = None;
        self.error = None;
        self.progress = Some(Progress { percent: 0, text: "Starting...".into() });
        vec![Effect::ClearAnimation, Effect::StartIdentification { attempt: self.attempt, image }]
    }

    fn reset(&mut self) -> Vec<Effect> {
        *self = Self {
            attempt: self.attempt + 1,
            image_revision: self.image_revision + 1,
            ..Self::default()
        };
        vec![
            Effect::ClearAnimation,
            Effect::Toast(ToastKind::Info, "Reset successfully, you can upload a new image.".into()),
        ]
    }
}
