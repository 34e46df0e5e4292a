use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ViewOptions;
use crate::view_model::{SpriteId, TileVisual};

use super::effects::{effects_for_depth, LayerEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Tile,
    Sprite,
}

/// Identity of a layer. Layers from an older `generation` no longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    pub depth: u32,
    pub kind: LayerKind,
    pub generation: u64,
}

/// Deepest slice a stack ever materializes.
pub const MAX_LAYER_DEPTH: u32 = 64;

/// Deepest slice to materialize for a view-model max Z level and an optional pinned override.
pub fn effective_max_depth(max_z_level: i32, show_underlying: Option<u32>) -> u32 {
    let max_depth = match show_underlying {
        Some(pinned) => i64::from(pinned) + 1,
        None => i64::from(max_z_level) + 1,
    };
    let capped = max_depth.clamp(0, i64::from(MAX_LAYER_DEPTH));
    u32::try_from(capped).unwrap_or(MAX_LAYER_DEPTH)
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    id: LayerId,
    effect: Option<Arc<LayerEffect>>,
    tiles: BTreeMap<(u32, u32), TileVisual>,
}

impl TileLayer {
    fn new(id: LayerId) -> Self {
        Self {
            id,
            effect: None,
            tiles: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn effect(&self) -> Option<&Arc<LayerEffect>> {
        self.effect.as_ref()
    }

    pub fn insert(&mut self, x: u32, y: u32, visual: TileVisual) {
        self.tiles.insert((x, y), visual);
    }

    pub fn remove(&mut self, x: u32, y: u32) -> Option<TileVisual> {
        self.tiles.remove(&(x, y))
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.tiles.contains_key(&(x, y))
    }

    pub fn tiles(&self) -> impl Iterator<Item = ((u32, u32), &TileVisual)> {
        self.tiles.iter().map(|(cell, visual)| (*cell, visual))
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Sprite container. Children paint in insertion order, last on top.
#[derive(Debug, Clone)]
pub struct SpriteLayer {
    id: LayerId,
    effect: Option<Arc<LayerEffect>>,
    sprites: Vec<SpriteId>,
}

impl SpriteLayer {
    fn new(id: LayerId) -> Self {
        Self {
            id,
            effect: None,
            sprites: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn effect(&self) -> Option<&Arc<LayerEffect>> {
        self.effect.as_ref()
    }

    pub fn sprites(&self) -> &[SpriteId] {
        &self.sprites
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.sprites.contains(&id)
    }

    pub(crate) fn push(&mut self, id: SpriteId) {
        if !self.contains(id) {
            self.sprites.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: SpriteId) -> bool {
        let before = self.sprites.len();
        self.sprites.retain(|child| *child != id);
        self.sprites.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LayerPair {
    pub tile: TileLayer,
    pub sprite: SpriteLayer,
}

impl LayerPair {
    pub fn depth(&self) -> u32 {
        self.tile.id.depth
    }
}

/// One tile/sprite layer pair per depth, `0..=max_depth`, indexed by depth.
#[derive(Debug, Clone)]
pub struct DepthLayerStack {
    generation: u64,
    pairs: Vec<LayerPair>,
}

impl DepthLayerStack {
    pub fn initialize(max_depth: u32, options: &ViewOptions) -> Self {
        Self::build(max_depth, options, 0)
    }

    /// A fresh, empty stack for `max_depth` whose layer identities differ from `self`'s.
    pub fn rebuilt(&self, max_depth: u32, options: &ViewOptions) -> Self {
        Self::build(max_depth, options, self.generation.wrapping_add(1))
    }

    fn build(max_depth: u32, options: &ViewOptions, generation: u64) -> Self {
        let pairs = (0..=max_depth)
            .map(|depth| LayerPair {
                tile: TileLayer::new(LayerId {
                    depth,
                    kind: LayerKind::Tile,
                    generation,
                }),
                sprite: SpriteLayer::new(LayerId {
                    depth,
                    kind: LayerKind::Sprite,
                    generation,
                }),
            })
            .collect();
        let mut stack = Self { generation, pairs };
        stack.apply_effects(options);
        stack
    }

    pub fn apply_effects(&mut self, options: &ViewOptions) {
        for pair in &mut self.pairs {
            let effects = effects_for_depth(pair.depth(), options);
            pair.tile.effect = effects.tile;
            pair.sprite.effect = effects.sprite;
        }
    }

    pub fn max_depth(&self) -> u32 {
        // `build` always materializes depth 0.
        (self.pairs.len() - 1) as u32
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains_depth(&self, depth: i32) -> bool {
        self.index_of(depth).is_some()
    }

    pub fn pair(&self, depth: i32) -> Option<&LayerPair> {
        self.index_of(depth).map(|index| &self.pairs[index])
    }

    pub fn pair_mut(&mut self, depth: i32) -> Option<&mut LayerPair> {
        self.index_of(depth).map(move |index| &mut self.pairs[index])
    }

    pub fn sprite_layer_mut_by_id(&mut self, id: LayerId) -> Option<&mut SpriteLayer> {
        if id.generation != self.generation || id.kind != LayerKind::Sprite {
            return None;
        }
        self.pairs
            .get_mut(id.depth as usize)
            .map(|pair| &mut pair.sprite)
    }

    pub fn tile_layer_mut_by_id(&mut self, id: LayerId) -> Option<&mut TileLayer> {
        if id.generation != self.generation || id.kind != LayerKind::Tile {
            return None;
        }
        self.pairs.get_mut(id.depth as usize).map(|pair| &mut pair.tile)
    }

    /// Deepest pair first; depth 0 paints last.
    pub fn back_to_front(&self) -> impl Iterator<Item = &LayerPair> {
        self.pairs.iter().rev()
    }

    /// Depth 0 first.
    pub fn front_to_back(&self) -> impl Iterator<Item = &LayerPair> {
        self.pairs.iter()
    }

    /// The sprite layer currently parenting `id`, if any.
    pub fn sprite_parent(&self, id: SpriteId) -> Option<LayerId> {
        self.pairs
            .iter()
            .find(|pair| pair.sprite.contains(id))
            .map(|pair| pair.sprite.id)
    }

    /// `(layer, children)` for every sprite layer, front to back.
    pub fn sprite_membership(&self) -> Vec<(LayerId, Vec<SpriteId>)> {
        self.pairs
            .iter()
            .map(|pair| (pair.sprite.id, pair.sprite.sprites.clone()))
            .collect()
    }

    fn index_of(&self, depth: i32) -> Option<usize> {
        let index = usize::try_from(depth).ok()?;
        (index < self.pairs.len()).then_some(index)
    }
}
