//! Texture node synchronization with a host renderer.
//!
//! The host owns the GPU and the scene graph. It passes the node it got last
//! frame (if any) back in and keeps whatever comes out; dropping a node or a
//! texture releases it.

use crate::decode::DecodedImage;

/// Creates GPU textures from pixel buffers.
pub trait TextureHost {
    type Texture;

    fn create_texture(&mut self, image: &DecodedImage) -> Self::Texture;
}

/// Rectangle a node covers, in item coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeRect {
    pub fn from_size((width, height): (u32, u32)) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }
}

/// Which parts of a node the renderer has to resynchronize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyState {
    pub material: bool,
    pub geometry: bool,
}

impl DirtyState {
    pub fn is_clean(&self) -> bool {
        !self.material && !self.geometry
    }
}

/// A textured rectangle node.
#[derive(Debug)]
pub struct TextureNode<T> {
    texture: Option<T>,
    rect: NodeRect,
    dirty: DirtyState,
}

impl<T> Default for TextureNode<T> {
    fn default() -> Self {
        Self {
            texture: None,
            rect: NodeRect::default(),
            dirty: DirtyState::default(),
        }
    }
}

impl<T> TextureNode<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    pub fn rect(&self) -> NodeRect {
        self.rect
    }

    pub fn dirty(&self) -> DirtyState {
        self.dirty
    }

    /// Hand the pending dirty bits to the renderer and clear them.
    pub fn take_dirty(&mut self) -> DirtyState {
        std::mem::take(&mut self.dirty)
    }

    fn replace_texture(&mut self, texture: T, rect: NodeRect) {
        self.texture = Some(texture);
        self.rect = rect;
        self.dirty = DirtyState {
            material: true,
            geometry: true,
        };
    }
}

/// Outcome of [`sync_texture_node`].
#[derive(Debug)]
pub struct NodeSync<T> {
    /// Node to keep, or `None` when there is nothing to show.
    pub node: Option<TextureNode<T>>,
    /// Whether a new texture was uploaded.
    pub uploaded: bool,
}

/// Reconcile `old` with the displayed buffer.
///
/// A null `displayed` image tears the node down. Otherwise the node is
/// reused (or created) and a texture is uploaded when `dirty` is set or the
/// node has none yet.
pub fn sync_texture_node<H: TextureHost>(
    old: Option<TextureNode<H::Texture>>,
    displayed: &DecodedImage,
    dirty: bool,
    size: (u32, u32),
    host: &mut H,
) -> NodeSync<H::Texture> {
    if displayed.is_empty() {
        return NodeSync {
            node: None,
            uploaded: false,
        };
    }

    let mut node = old.unwrap_or_default();
    let uploaded = dirty || node.texture.is_none();
    if uploaded {
        let texture = host.create_texture(displayed);
        node.replace_texture(texture, NodeRect::from_size(size));
    }

    NodeSync {
        node: Some(node),
        uploaded,
    }
}
