//! Parameterized adjustments filter that processes on a worker thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use super::{FilterParameter, FilterSink, ImageFilter};
use crate::adjustments::{apply_adjustments, Adjustments, EXPOSURE_RANGE, PERCENT_RANGE};
use crate::decode::DecodedImage;

const EXPOSURE: &str = "exposure";
const CONTRAST: &str = "contrast";
const TEMPERATURE: &str = "temperature";
const SATURATION: &str = "saturation";

/// Exposure, contrast, temperature and saturation.
///
/// Because it exposes parameters, attaching it to a view only resets it; the
/// host calls `reapply_filter` once the user has picked values. Out-of-range
/// values are stored as given and make `apply` decline.
#[derive(Debug, Default)]
pub struct AdjustmentsFilter {
    settings: Mutex<Adjustments>,
}

impl AdjustmentsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adjustments(adjustments: Adjustments) -> Self {
        Self {
            settings: Mutex::new(adjustments),
        }
    }

    /// Snapshot of the current values.
    pub fn adjustments(&self) -> Adjustments {
        *self.lock()
    }

    /// Set one parameter by name. Returns `false` for an unknown name.
    pub fn set_parameter(&self, name: &str, value: f32) -> bool {
        let mut settings = self.lock();
        match name {
            EXPOSURE => settings.exposure = value,
            CONTRAST => settings.contrast = value,
            TEMPERATURE => settings.temperature = value,
            SATURATION => settings.saturation = value,
            _ => return false,
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, Adjustments> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageFilter for AdjustmentsFilter {
    fn name(&self) -> &str {
        "Adjustments"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        let s = self.adjustments();
        let (emin, emax) = EXPOSURE_RANGE;
        let (pmin, pmax) = PERCENT_RANGE;
        vec![
            FilterParameter::new(EXPOSURE, s.exposure, emin, emax, 0.0),
            FilterParameter::new(CONTRAST, s.contrast, pmin, pmax, 0.0),
            FilterParameter::new(TEMPERATURE, s.temperature, pmin, pmax, 0.0),
            FilterParameter::new(SATURATION, s.saturation, pmin, pmax, 0.0),
        ]
    }

    fn apply(&self, image: Arc<DecodedImage>, sink: FilterSink) -> bool {
        if image.is_empty() {
            return false;
        }

        let settings = self.adjustments();
        if !settings.is_valid() {
            tracing::debug!(?settings, "declining adjustments with out-of-range values");
            return false;
        }

        let spawned = thread::Builder::new()
            .name("adjustments-filter".into())
            .spawn(move || {
                let mut out = (*image).clone();
                apply_adjustments(&mut out.pixels, &settings);
                sink.deliver(out);
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("failed to start adjustments worker: {}", e);
                false
            }
        }
    }

    fn reset_parameters(&self) {
        *self.lock() = Adjustments::default();
    }
}
