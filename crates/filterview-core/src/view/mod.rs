//! The filtered photo view.
//!
//! [`ImageView`] owns the orientation-corrected base image and an optional
//! filtered image, talks to one attached [`ImageFilter`] at a time, and
//! feeds whichever buffer is displayed to the host renderer.
//!
//! # State machine
//!
//! ```text
//!            apply_filter(f), f has no parameters, accepted
//!   Idle ───────────────────────────────────────────────▶ Applying
//!    ▲  ▲                                                    │
//!    │  │ reset_filter / apply_filter(None)                  │ result processed
//!    │  │ apply_filter(f), f has parameters                  ▼
//!    │  └──────────────────────────────────────────────── Filtered
//!    │                                                       │
//!    └─────────────── apply_current_filter (commit) ─────────┘
//! ```
//!
//! Every accepted request carries a generation token. Attaching another
//! filter, resetting, or loading a new source abandons the outstanding
//! request, and a result that arrives for an abandoned request is dropped.
//!
//! `ApplyingChanged` is emitted at most once per public call, after the
//! other notifications of that call, and only when the flag differs from
//! what it was when the call started.
//!
//! Everything here runs on the host's UI thread. Filters may work on other
//! threads; their results wait in a channel until the host calls
//! [`ImageView::process_filter_results`].

mod events;
mod save;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Weak};

use tracing::{debug, info, trace, warn};

use crate::config::ViewConfig;
use crate::decode::{
    load_source, DecodedImage, ExifOrientationReader, Orientation, OrientationReader,
};
use crate::filter::{FilterOutput, FilterSink, ImageFilter};
use crate::render::{sync_texture_node, TextureHost, TextureNode};

pub use events::ViewEvent;
pub use save::{write_timestamped_jpeg, SaveError, SavedImage};

/// Where the view is in the filter workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// No filter output on display.
    Idle,
    /// A request was accepted and its result has not been processed yet.
    Applying,
    /// A filter result is on display.
    Filtered,
}

/// Photo view with orientation correction, filtering, commit and save.
pub struct ImageView {
    config: ViewConfig,
    reader: Box<dyn OrientationReader>,

    source: String,
    orientation: Orientation,
    implicit_size: (u32, u32),

    base: Arc<DecodedImage>,
    filtered: Option<Arc<DecodedImage>>,
    dirty: bool,

    filter: Option<Weak<dyn ImageFilter>>,
    issued: u64,
    awaiting: Option<u64>,
    results_tx: Sender<FilterOutput>,
    results_rx: Receiver<FilterOutput>,

    events: Vec<ViewEvent>,
}

impl ImageView {
    /// View that reads orientation from EXIF metadata.
    pub fn new(config: ViewConfig) -> Self {
        Self::with_orientation_reader(config, Box::new(ExifOrientationReader))
    }

    pub fn with_orientation_reader(config: ViewConfig, reader: Box<dyn OrientationReader>) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            config,
            reader,
            source: String::new(),
            orientation: Orientation::Normal,
            implicit_size: (0, 0),
            base: Arc::new(DecodedImage::null()),
            filtered: None,
            dirty: false,
            filter: None,
            issued: 0,
            awaiting: None,
            results_tx,
            results_rx,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Orientation read from the current source's metadata.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Pixel size of the orientation-corrected source; (0, 0) when loading failed.
    pub fn implicit_size(&self) -> (u32, u32) {
        self.implicit_size
    }

    pub fn is_applying(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn filter_state(&self) -> FilterState {
        if self.awaiting.is_some() {
            return FilterState::Applying;
        }
        match &self.filtered {
            Some(filtered) if !Arc::ptr_eq(filtered, &self.base) => FilterState::Filtered,
            _ => FilterState::Idle,
        }
    }

    /// Whether the displayed buffer changed since the last texture upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn base_image(&self) -> &Arc<DecodedImage> {
        &self.base
    }

    pub fn filtered_image(&self) -> Option<&Arc<DecodedImage>> {
        self.filtered.as_ref()
    }

    /// The displayed buffer: the filtered image when present, else the base.
    pub fn image(&self) -> Arc<DecodedImage> {
        Arc::clone(self.displayed())
    }

    fn displayed(&self) -> &Arc<DecodedImage> {
        self.filtered.as_ref().unwrap_or(&self.base)
    }

    /// Attached filter, if the host still keeps it alive.
    pub fn active_filter(&self) -> Option<Arc<dyn ImageFilter>> {
        self.filter.as_ref().and_then(Weak::upgrade)
    }

    /// Take every notification emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    /// Load a new source. Setting the current source again does nothing.
    ///
    /// A source that cannot be read or decoded leaves the view showing the
    /// null image.
    pub fn set_source(&mut self, source: &str) {
        if self.source == source {
            return;
        }
        let was_applying = self.is_applying();
        self.source = source.to_string();

        let (image, orientation) = match load_source(source, &*self.reader) {
            Ok(loaded) => {
                debug!(
                    source,
                    format = ?loaded.format,
                    orientation = ?loaded.orientation,
                    width = loaded.image.width,
                    height = loaded.image.height,
                    "loaded image"
                );
                (loaded.image, loaded.orientation)
            }
            Err(e) => {
                warn!(source, "failed to load image: {}", e);
                (DecodedImage::null(), Orientation::Normal)
            }
        };

        self.orientation = orientation;
        self.implicit_size = image.dimensions();
        self.base = Arc::new(image);
        self.filtered = None;
        self.abandon_request();
        self.dirty = true;

        self.emit(ViewEvent::SourceChanged(self.source.clone()));
        self.emit(ViewEvent::ImageChanged(self.image()));
        self.notify_applying(was_applying);
    }

    /// Attach `filter` (or detach with `None`).
    ///
    /// A filter without parameters is applied to the base image right away.
    /// A filter with parameters, or no filter at all, resets the view instead.
    pub fn apply_filter(&mut self, filter: Option<&Arc<dyn ImageFilter>>) {
        let was_applying = self.is_applying();
        self.filter = None;
        self.abandon_request();

        match filter {
            None => {
                debug!("filter detached");
                self.reset();
            }
            Some(filter) => {
                self.filter = Some(Arc::downgrade(filter));
                if filter.parameters().is_empty() {
                    self.request(filter);
                } else {
                    debug!(filter = filter.name(), "parameterized filter attached, resetting");
                    self.reset();
                }
            }
        }
        self.notify_applying(was_applying);
    }

    /// Run the attached filter again on the base image, e.g. after its
    /// parameters changed.
    pub fn reapply_filter(&mut self) {
        let was_applying = self.is_applying();
        match self.active_filter() {
            Some(filter) => self.request(&filter),
            None => trace!("reapply without a live filter"),
        }
        self.notify_applying(was_applying);
    }

    /// Reset the attached filter's parameters and show the base image.
    pub fn reset_filter(&mut self) {
        let was_applying = self.is_applying();
        self.reset();
        self.notify_applying(was_applying);
    }

    /// Apply queued filter results. Returns how many were accepted.
    pub fn process_filter_results(&mut self) -> usize {
        let was_applying = self.is_applying();
        let mut accepted = 0;
        while let Ok(output) = self.results_rx.try_recv() {
            if self.awaiting == Some(output.generation) {
                self.filter_applied(output.image);
                accepted += 1;
            } else {
                trace!(generation = output.generation, "dropping stale filter result");
            }
        }
        self.notify_applying(was_applying);
        accepted
    }

    /// Make the filtered image the new base. No-op when nothing is filtered.
    pub fn apply_current_filter(&mut self) {
        if let Some(filtered) = self.filtered.take() {
            debug!("committing filtered image");
            self.base = filtered;
        }
    }

    /// Commit, then write the base image as JPEG into the configured
    /// directory. Emits `ImageSaved` with the file name on success.
    pub fn save_image(&mut self) -> Result<SavedImage, SaveError> {
        self.apply_current_filter();

        let stamp = chrono::Utc::now().timestamp_millis();
        let saved = write_timestamped_jpeg(&self.base, &self.config, stamp).map_err(|e| {
            warn!("failed to save image: {}", e);
            e
        })?;

        info!(path = %saved.path.display(), "saved image");
        self.emit(ViewEvent::ImageSaved(saved.file_name.clone()));
        Ok(saved)
    }

    /// Reconcile the host's texture node with the displayed buffer.
    ///
    /// Returns `None` when there is nothing to show; the host drops its node.
    pub fn update_paint_node<H: TextureHost>(
        &mut self,
        old: Option<TextureNode<H::Texture>>,
        host: &mut H,
    ) -> Option<TextureNode<H::Texture>> {
        let sync = sync_texture_node(old, self.displayed(), self.dirty, self.implicit_size, host);
        if sync.uploaded {
            self.dirty = false;
        }
        sync.node
    }

    fn request(&mut self, filter: &Arc<dyn ImageFilter>) {
        self.issued += 1;
        let generation = self.issued;
        let sink = FilterSink::new(generation, self.results_tx.clone());

        if filter.apply(Arc::clone(&self.base), sink) {
            debug!(filter = filter.name(), generation, "filter request accepted");
            self.awaiting = Some(generation);
        } else {
            debug!(filter = filter.name(), "filter declined request");
        }
    }

    fn reset(&mut self) {
        if let Some(filter) = self.active_filter() {
            filter.reset_parameters();
        }

        self.filtered = Some(Arc::clone(&self.base));
        self.dirty = true;
        self.emit(ViewEvent::ImageChanged(self.image()));
        self.awaiting = None;
    }

    fn filter_applied(&mut self, image: DecodedImage) {
        self.filtered = Some(Arc::new(image));
        self.dirty = true;
        self.emit(ViewEvent::ImageChanged(self.image()));
        self.awaiting = None;
    }

    fn abandon_request(&mut self) {
        if let Some(generation) = self.awaiting.take() {
            debug!(generation, "abandoning outstanding filter request");
        }
    }

    fn notify_applying(&mut self, was_applying: bool) {
        let applying = self.is_applying();
        if applying != was_applying {
            self.emit(ViewEvent::ApplyingChanged(applying));
        }
    }

    fn emit(&mut self, event: ViewEvent) {
        self.events.push(event);
    }
}
