use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::color::StandardPalette;
use crate::consts::PSEUDO_MODE_CUSTOM;
use crate::error::Result;
use crate::header::FrameHeader;

use super::range::DisplayMode;

/// Immutable view of the display configuration used for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSnapshot {
    pub header: FrameHeader,
    pub mode: DisplayMode,
    /// Incremented on every update.
    pub version: u64,
}

impl ConfigSnapshot {
    pub fn new(header: FrameHeader) -> Self {
        let mode = DisplayMode::from_header(&header);
        Self {
            header,
            mode,
            version: 0,
        }
    }
}

/// Copy-on-write holder of the current [`ConfigSnapshot`].
///
/// Readers take an `Arc` and keep it for the whole frame; updates publish a
/// new snapshot and never touch one that is already handed out.
#[derive(Debug)]
pub struct SharedConfig {
    current: RwLock<Arc<ConfigSnapshot>>,
}

impl SharedConfig {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Publish a snapshot derived from the current one. On error nothing changes.
    pub fn update<F>(&self, f: F) -> Result<Arc<ConfigSnapshot>>
    where
        F: FnOnce(&ConfigSnapshot) -> Result<ConfigSnapshot>,
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = f(&guard)?;
        next.version = guard.version + 1;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        debug!(version = next.version, mode = next.mode.name(), "config updated");
        Ok(next)
    }

    /// Replace the header, keeping the current display mode.
    pub fn set_header(&self, header: FrameHeader) -> Arc<ConfigSnapshot> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(ConfigSnapshot {
            header,
            mode: guard.mode.clone(),
            version: guard.version + 1,
        });
        *guard = Arc::clone(&next);
        next
    }

    /// Apply a display-mode transition, mirroring custom mode into the header.
    pub fn transition<F>(&self, f: F) -> Result<Arc<ConfigSnapshot>>
    where
        F: FnOnce(&DisplayMode) -> Result<DisplayMode>,
    {
        self.update(|current| {
            let mode = f(&current.mode)?;
            let mut header = current.header.clone();
            match &mode {
                DisplayMode::Custom(custom) => {
                    header.pseudo_mode = PSEUDO_MODE_CUSTOM;
                    header.custom_pseudo = Some(custom.clone());
                }
                _ if header.pseudo_mode == PSEUDO_MODE_CUSTOM => {
                    header.pseudo_mode = StandardPalette::default().id();
                }
                _ => {}
            }
            Ok(ConfigSnapshot {
                header,
                mode,
                version: current.version,
            })
        })
    }
}
