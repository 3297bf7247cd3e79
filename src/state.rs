// state.rs - Idle/compressing state machine owning the gallery

use crate::batch::ItemOutcome;
use crate::error::{Error, Result};
use crate::gallery::Gallery;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Compressing {
        files: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub added: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct Session {
    phase: Phase,
    drag_active: bool,
    dropped: Vec<PathBuf>,
    gallery: Gallery,
}

impl Session {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_compressing(&self) -> bool {
        matches!(self.phase, Phase::Compressing { .. })
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn set_drag_active(&mut self, active: bool) {
        self.drag_active = active;
    }

    /// Queue a dropped path until the drop gesture settles.
    ///
    /// Returns `true` when this is the first path of a new gesture and the
    /// caller has to schedule a flush. Drops during compression are refused.
    pub fn queue_drop(&mut self, path: PathBuf) -> Result<bool> {
        self.drag_active = false;
        if self.is_compressing() {
            tracing::warn!(path = %path.display(), "drop ignored while compressing");
            return Err(Error::Busy);
        }

        self.dropped.push(path);
        Ok(self.dropped.len() == 1)
    }

    pub fn take_dropped(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.dropped)
    }

    /// Enter the compressing phase for `files` accepted inputs.
    pub fn begin_batch(&mut self, files: usize) -> Result<()> {
        if self.is_compressing() {
            tracing::warn!(files, "batch refused, another one is in flight");
            return Err(Error::Busy);
        }

        self.phase = Phase::Compressing { files };
        Ok(())
    }

    /// Append every successful outcome in order and return to idle.
    pub fn finish_batch(&mut self, outcomes: Vec<ItemOutcome>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut images = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            match outcome.result {
                Ok(image) => {
                    summary.added += 1;
                    images.push(image);
                }
                Err(e) => {
                    tracing::error!(name = %outcome.name, "Error compressing image: {}", e);
                    summary.failed += 1;
                }
            }
        }

        self.gallery.extend(images);
        self.phase = Phase::Idle;

        tracing::info!(added = summary.added, failed = summary.failed, "batch settled");
        summary
    }

    pub fn remove(&mut self, index: usize) {
        self.gallery.remove(index);
    }

    pub fn clear(&mut self) {
        self.gallery.clear();
    }
}
