//! App module - contains the main application state and logic

mod canvas;
mod export;
mod health;
mod identify;
mod modals;
mod shortcuts;
mod views;

use crate::animation::{BoxFrame, BoxGrowth};
use crate::predictor::{self, Predictor};
use crate::progress::{LoadTracker, Repaint, WorkerMessage};
use crate::session::{Effect, Event, Session};
use crate::settings::Settings;
use crate::theme;
use crate::ui::toast::Toast;
use eframe::egui;
use health::HealthState;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) ctx: egui::Context,
    pub(crate) session: Session,
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
    // Background work
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) predictor: Option<Arc<dyn Predictor>>,
    pub(crate) tx: UnboundedSender<WorkerMessage>,
    pub(crate) rx: UnboundedReceiver<WorkerMessage>,
    pub(crate) cancel_tokens: HashMap<u64, CancellationToken>,
    pub(crate) loads: LoadTracker,
    // Canvas
    pub(crate) image_texture: Option<egui::TextureHandle>,
    pub(crate) texture_revision: u64,
    pub(crate) animation: Option<BoxGrowth>,
    pub(crate) box_frame: Option<BoxFrame>,
    // Service status
    pub(crate) health: HealthState,
    pub(crate) health_check_started: bool,
    // Chrome
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    pub(crate) toast: Option<Toast>,
    // Central panel rect for toast positioning
    pub(crate) central_panel_rect: Option<egui::Rect>,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
    ) -> std::io::Result<Self> {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("identify-worker")
            .build()?;

        let predictor = match predictor::from_settings(&settings) {
            Ok(p) => Some(p),
            Err(e) => {
                error!(error = %e, "Failed to set up prediction client");
                None
            }
        };

        let (tx, rx) = unbounded_channel();

        Ok(Self {
            ctx: cc.egui_ctx.clone(),
            session: Session::new(),
            settings,
            data_dir,
            runtime,
            predictor,
            tx,
            rx,
            cancel_tokens: HashMap::new(),
            loads: LoadTracker::default(),
            image_texture: None,
            texture_revision: 0,
            animation: None,
            box_frame: None,
            health: HealthState::Checking,
            health_check_started: false,
            logo_texture: None,
            toast: None,
            central_panel_rect: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
        })
    }

    /// Feed an event to the session and carry out the resulting effects
    pub(crate) fn dispatch(&mut self, event: Event) {
        debug!(?event, "Session event");
        let effects = self.session.apply(event);
        debug!(
            attempt = self.session.attempt(),
            snapshot = ?self.session.snapshot(),
            effects = effects.len(),
            "Session updated"
        );
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Toast(kind, message) => {
                self.toast = Some(Toast::new(kind, message));
            }
            Effect::StartIdentification { attempt, image } => {
                self.start_identification(attempt, image);
            }
            Effect::AbandonAttempt { attempt } => {
                if let Some(token) = self.cancel_tokens.remove(&attempt) {
                    info!(attempt, "Abandoning identification");
                    token.cancel();
                }
            }
            // The modal is rendered from the session's pending flag
            Effect::AskResetConfirmation => {}
            Effect::StartBoxAnimation => self.start_box_animation(),
            Effect::ClearAnimation => {
                self.animation = None;
                self.box_frame = None;
            }
        }
    }

    /// Drain everything background tasks reported since the last frame
    pub(crate) fn poll_worker_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                WorkerMessage::Progress { attempt, percent, text } => {
                    self.dispatch(Event::ProgressAdvanced { attempt, percent, text: text.to_string() });
                }
                WorkerMessage::Finished { attempt, outcome } => {
                    self.cancel_tokens.remove(&attempt);
                    match outcome {
                        Ok(prediction) => self.dispatch(Event::PredictionSucceeded { attempt, prediction }),
                        Err(error) => self.dispatch(Event::PredictionFailed { attempt, error }),
                    }
                }
                WorkerMessage::FileLoaded { seq, result } => {
                    if !self.loads.settle(seq) {
                        debug!(seq, "Dropping load superseded by a later file");
                        continue;
                    }
                    match result {
                        Ok(image) => self.dispatch(Event::FileAccepted(image)),
                        Err(error) => self.dispatch(Event::FileRejected(error)),
                    }
                }
            }
        }
    }

    pub(crate) fn repaint_handle(&self) -> Repaint {
        let ctx = self.ctx.clone();
        Arc::new(move || ctx.request_repaint())
    }

    /// Stop the cosmetic stages of every running attempt
    pub(crate) fn cancel_all(&mut self) {
        for (attempt, token) in self.cancel_tokens.drain() {
            debug!(attempt, "Cancelling identification on shutdown");
            token.cancel();
        }
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.save(&self.data_dir);
    }
}
