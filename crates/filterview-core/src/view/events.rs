//! Notifications the view emits for its host.

use std::sync::Arc;

use crate::decode::DecodedImage;

/// Something the host UI may want to react to.
///
/// Events are queued in emission order and handed out by
/// `ImageView::drain_events`.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A new source string was set.
    SourceChanged(String),
    /// The displayed image changed.
    ImageChanged(Arc<DecodedImage>),
    /// The busy flag flipped.
    ApplyingChanged(bool),
    /// An image was written; carries the bare file name.
    ImageSaved(String),
}
