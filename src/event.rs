use crate::launch::LaunchOutcome;
use eframe::egui;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, OnceLock};

#[derive(Debug)]
pub enum AppEvent {
    Launch(LaunchOutcome),
    ChatReply { request_id: u64, text: String },
}

/// Worker side of the UI event queue. Sending also wakes the UI so the
/// event is applied on the next frame.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<AppEvent>,
    repaint: Arc<OnceLock<egui::Context>>,
}

impl EventSender {
    pub fn channel() -> (Self, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let sender = Self {
            tx,
            repaint: Arc::new(OnceLock::new()),
        };
        (sender, rx)
    }

    /// Hooks up repaint requests once the window exists.
    pub fn attach(&self, ctx: &egui::Context) {
        let _ = self.repaint.set(ctx.clone());
    }

    pub fn send(&self, event: AppEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event dropped, UI has shut down");
            return;
        }
        if let Some(ctx) = self.repaint.get() {
            ctx.request_repaint();
        }
    }
}
