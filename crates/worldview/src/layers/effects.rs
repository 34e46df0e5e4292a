use std::sync::Arc;

use crate::config::ViewOptions;

pub const DARKEN_PER_DEPTH: f32 = 0.3;
pub const MIN_BRIGHTNESS: f32 = -1.0;
pub const BLUR_RADIUS_PER_DEPTH: f32 = 5.0;
pub const BLUR_ITERATIONS: u32 = 3;
pub const SHADOW_RADIUS: f32 = 20.0;
pub const SHADOW_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Visual effect attached to a layer. `Compose` applies `inner` first and feeds its result to `outer`.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEffect {
    DropShadow { radius: f32, color: [u8; 4] },
    Darken { brightness: f32 },
    Blur { radius: f32, iterations: u32 },
    Compose {
        inner: Box<LayerEffect>,
        outer: Box<LayerEffect>,
    },
}

impl LayerEffect {
    pub fn compose(inner: LayerEffect, outer: LayerEffect) -> Self {
        LayerEffect::Compose {
            inner: Box::new(inner),
            outer: Box::new(outer),
        }
    }

    /// Stages in application order.
    pub fn stages(&self) -> Vec<&LayerEffect> {
        match self {
            LayerEffect::Compose { inner, outer } => {
                let mut stages = inner.stages();
                stages.extend(outer.stages());
                stages
            }
            single => vec![single],
        }
    }
}

/// Effects of one depth's layer pair, evaluated once and cached on the layers.
#[derive(Debug, Clone, Default)]
pub struct DepthEffects {
    pub tile: Option<Arc<LayerEffect>>,
    pub sprite: Option<Arc<LayerEffect>>,
}

pub fn effects_for_depth(depth: u32, options: &ViewOptions) -> DepthEffects {
    if depth == 0 {
        let tile = options.shadow_enabled.then(|| {
            Arc::new(LayerEffect::DropShadow {
                radius: SHADOW_RADIUS,
                color: SHADOW_COLOR,
            })
        });
        return DepthEffects { tile, sprite: None };
    }

    let darken = options.darken_enabled.then(|| LayerEffect::Darken {
        brightness: (-DARKEN_PER_DEPTH * depth as f32).max(MIN_BRIGHTNESS),
    });
    let blur = options.blur_enabled.then(|| LayerEffect::Blur {
        radius: BLUR_RADIUS_PER_DEPTH * depth as f32,
        iterations: BLUR_ITERATIONS,
    });
    let effect = match (darken, blur) {
        (Some(darken), Some(blur)) => Some(LayerEffect::compose(darken, blur)),
        (darken, blur) => darken.or(blur),
    }
    .map(Arc::new);

    DepthEffects {
        tile: effect.clone(),
        sprite: effect,
    }
}
