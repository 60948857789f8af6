//! Pluggable image filters.
//!
//! A filter is owned by the host and only borrowed by the view through a
//! weak reference. The view hands the filter its base image together with a
//! [`FilterSink`]; the filter reports its result by calling
//! [`FilterSink::deliver`], from any thread and at any later time. Results
//! are queued and only picked up when the view processes them on its own
//! thread.
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use filterview_core::filter::{GrayscaleFilter, ImageFilter};
//!
//! let filter: Arc<dyn ImageFilter> = Arc::new(GrayscaleFilter::new());
//! view.apply_filter(Some(&filter));
//! view.process_filter_results();
//! ```

mod adjust;
mod grayscale;

use std::sync::mpsc::Sender;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

pub use adjust::AdjustmentsFilter;
pub use grayscale::GrayscaleFilter;

/// One tunable parameter a filter exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParameter {
    /// Stable identifier, used with `set_parameter`.
    pub name: String,
    /// Current value.
    pub value: f32,
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Value restored by `reset_parameters`.
    pub default: f32,
}

impl FilterParameter {
    pub fn new(name: impl Into<String>, value: f32, min: f32, max: f32, default: f32) -> Self {
        Self {
            name: name.into(),
            value,
            min,
            max,
            default,
        }
    }
}

/// A filter capability consumed by the view.
pub trait ImageFilter: Send + Sync {
    /// Display name.
    fn name(&self) -> &str;

    /// Ordered parameter list. An empty list means the filter is applied as
    /// soon as it is attached; a non-empty one means the host drives
    /// application after the user has tuned the parameters.
    fn parameters(&self) -> Vec<FilterParameter>;

    /// Start filtering `image`. Returns `false` when the request is declined,
    /// in which case `sink` must not be used. When `true` is returned the
    /// result is reported through `sink`, synchronously or later.
    fn apply(&self, image: Arc<DecodedImage>, sink: FilterSink) -> bool;

    /// Restore every parameter to its default.
    fn reset_parameters(&self);
}

/// A finished filter result, tagged with the request it answers.
#[derive(Debug)]
pub struct FilterOutput {
    pub generation: u64,
    pub image: DecodedImage,
}

/// One-shot handle a filter uses to report its result.
#[derive(Debug)]
pub struct FilterSink {
    generation: u64,
    sender: Sender<FilterOutput>,
}

impl FilterSink {
    pub fn new(generation: u64, sender: Sender<FilterOutput>) -> Self {
        Self { generation, sender }
    }

    /// Request token this sink answers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report the filtered image.
    pub fn deliver(self, image: DecodedImage) {
        let output = FilterOutput {
            generation: self.generation,
            image,
        };
        if self.sender.send(output).is_err() {
            tracing::trace!(
                generation = self.generation,
                "view dropped before filter result arrived"
            );
        }
    }
}
