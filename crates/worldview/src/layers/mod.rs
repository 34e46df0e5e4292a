mod effects;
mod stack;

pub use effects::{
    effects_for_depth, DepthEffects, LayerEffect, BLUR_ITERATIONS, BLUR_RADIUS_PER_DEPTH,
    DARKEN_PER_DEPTH, MIN_BRIGHTNESS, SHADOW_COLOR, SHADOW_RADIUS,
};
pub use stack::{
    effective_max_depth, DepthLayerStack, MAX_LAYER_DEPTH, LayerId, LayerKind, LayerPair, SpriteLayer, TileLayer,
};
