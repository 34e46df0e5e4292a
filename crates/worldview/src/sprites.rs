use std::collections::HashMap;

use tracing::{debug, warn};

use crate::coords::Vec2;
use crate::layers::{DepthLayerStack, LayerId};
use crate::view_model::{SpriteId, SpriteInfo, SpriteVisual};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedSprite {
    pub depth: i32,
    pub screen: Vec2,
    pub visual: SpriteVisual,
    parent: Option<LayerId>,
}

impl TrackedSprite {
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    fn contains_point(&self, point: Vec2) -> bool {
        let half = self.visual.half_size_px as f32;
        (point.x - self.screen.x).abs() <= half && (point.y - self.screen.y).abs() <= half
    }
}

/// Structural result of placing a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Unchanged,
    Attached(LayerId),
    Moved { from: LayerId, to: LayerId },
    Detached { from: LayerId },
}

/// Keeps every tracked sprite parented by the sprite layer of its current depth.
///
/// Depths outside `0..=max_depth` leave the sprite unparented but still tracked, so it
/// reappears once its depth comes back into range.
#[derive(Debug, Default)]
pub struct SpriteDepthRouter {
    sprites: HashMap<SpriteId, TrackedSprite>,
    attach_order: Vec<SpriteId>,
}

impl SpriteDepthRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, info: SpriteInfo, stack: &mut DepthLayerStack) -> Placement {
        match self.sprites.get_mut(&info.id) {
            Some(existing) => {
                warn!(sprite = info.id.0, "sprite_attached_twice");
                existing.depth = info.depth;
                existing.screen = info.screen;
                existing.visual = info.visual;
            }
            None => {
                self.sprites.insert(
                    info.id,
                    TrackedSprite {
                        depth: info.depth,
                        screen: info.screen,
                        visual: info.visual,
                        parent: None,
                    },
                );
                self.attach_order.push(info.id);
            }
        }
        self.place(info.id, stack).unwrap_or(Placement::Unchanged)
    }

    /// Records a depth change and re-places the sprite. `None` for untracked ids.
    pub fn set_depth(
        &mut self,
        id: SpriteId,
        depth: i32,
        stack: &mut DepthLayerStack,
    ) -> Option<Placement> {
        self.sprites.get_mut(&id)?.depth = depth;
        self.place(id, stack)
    }

    pub fn set_screen_position(&mut self, id: SpriteId, screen: Vec2) -> bool {
        match self.sprites.get_mut(&id) {
            Some(sprite) => {
                sprite.screen = screen;
                true
            }
            None => false,
        }
    }

    pub fn reroute(&mut self, id: SpriteId, stack: &mut DepthLayerStack) -> Option<Placement> {
        self.place(id, stack)
    }

    /// Re-places every sprite in attach order, e.g. after the stack was rebuilt.
    pub fn reroute_all(&mut self, stack: &mut DepthLayerStack) {
        for index in 0..self.attach_order.len() {
            let id = self.attach_order[index];
            self.place(id, stack);
        }
    }

    /// Stops tracking `id` and removes it from its layer.
    pub fn detach(&mut self, id: SpriteId, stack: &mut DepthLayerStack) -> bool {
        let Some(sprite) = self.sprites.remove(&id) else {
            return false;
        };
        self.attach_order.retain(|tracked| *tracked != id);
        if let Some(layer) = sprite
            .parent
            .and_then(|parent| stack.sprite_layer_mut_by_id(parent))
        {
            layer.remove(id);
        }
        true
    }

    pub fn get(&self, id: SpriteId) -> Option<&TrackedSprite> {
        self.sprites.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn ids(&self) -> &[SpriteId] {
        &self.attach_order
    }

    /// Only sprites in the front slice are selectable.
    pub fn object_click_target(&self, id: SpriteId) -> Option<SpriteId> {
        self.sprites
            .get(&id)
            .filter(|sprite| sprite.depth == 0)
            .map(|_| id)
    }

    /// Front-most rendered sprite under `point`: front layer first, last child first.
    pub fn hit_test(&self, point: Vec2, stack: &DepthLayerStack) -> Option<SpriteId> {
        stack.front_to_back().find_map(|pair| {
            pair.sprite.sprites().iter().rev().copied().find(|id| {
                self.sprites
                    .get(id)
                    .is_some_and(|sprite| sprite.contains_point(point))
            })
        })
    }

    fn place(&mut self, id: SpriteId, stack: &mut DepthLayerStack) -> Option<Placement> {
        let sprite = self.sprites.get_mut(&id)?;
        let target = stack.pair(sprite.depth).map(|pair| pair.sprite.id());
        if sprite.parent == target {
            return Some(Placement::Unchanged);
        }

        if let Some(layer) = sprite
            .parent
            .and_then(|parent| stack.sprite_layer_mut_by_id(parent))
        {
            layer.remove(id);
        }
        if let Some(layer) = target.and_then(|target| stack.sprite_layer_mut_by_id(target)) {
            layer.push(id);
        }

        let placement = match (sprite.parent, target) {
            (None, Some(to)) => Placement::Attached(to),
            (Some(from), Some(to)) => Placement::Moved { from, to },
            (Some(from), None) => Placement::Detached { from },
            (None, None) => Placement::Unchanged,
        };
        sprite.parent = target;
        debug!(sprite = id.0, depth = sprite.depth, placement = ?placement, "sprite_placed");
        Some(placement)
    }
}
