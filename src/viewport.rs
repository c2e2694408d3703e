//! Scale/translation state of the tree canvas.
//!
//! Gestures are fed in as plain events, one entry point per gesture kind.
//! Each gesture runs `Idle -> Active -> Idle`; the values it reports are
//! relative to the moment it began and get folded into the base values when
//! it ends, so consecutive gestures accumulate.

use crate::config::ViewportConfig;

/// Device-side size of the canvas container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl ViewportTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    /// Maps a scene point to the screen. Scaling happens about `pivot`,
    /// after the translation has moved the scene.
    pub fn apply(&self, point: (f32, f32), pivot: (f32, f32)) -> (f32, f32) {
        (
            pivot.0 + self.translate_x + self.scale * (point.0 - pivot.0),
            pivot.1 + self.translate_y + self.scale * (point.1 - pivot.1),
        )
    }

    pub fn to_svg(&self, pivot: (f32, f32)) -> String {
        format!(
            "translate({:.2} {:.2}) scale({:.4}) translate({:.2} {:.2})",
            pivot.0 + self.translate_x,
            pivot.1 + self.translate_y,
            self.scale,
            -pivot.0,
            -pivot.1
        )
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Active,
    Ended,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchEvent {
    pub phase: GesturePhase,
    /// Scale factor relative to the start of the gesture.
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanEvent {
    pub phase: GesturePhase,
    /// Translation since the start of the gesture.
    pub translation_x: f32,
    pub translation_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Active,
}

type InteractionObserver = Box<dyn FnMut(bool)>;

pub struct ViewportController {
    config: ViewportConfig,
    visible: (f32, f32),
    transform: ViewportTransform,
    initial: ViewportTransform,
    base_scale: f32,
    base_translation: (f32, f32),
    pinch: GestureState,
    pan: GestureState,
    interacting: bool,
    observers: Vec<InteractionObserver>,
}

impl ViewportController {
    /// Starts at scale 1 with the translation that puts `root_position`
    /// (scene units) in the middle of the visible container.
    ///
    /// A config that fails [`ViewportConfig::validate`] keeps its geometry but
    /// falls back to the default scale bounds and zoom step.
    pub fn new(root_position: (f32, f32), viewport: ViewportSize, config: &ViewportConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config.clone(),
            Err(err) => {
                log::warn!("{err}; using default scale bounds");
                let defaults = ViewportConfig::default();
                ViewportConfig {
                    min_scale: defaults.min_scale,
                    max_scale: defaults.max_scale,
                    zoom_step: defaults.zoom_step,
                    ..config.clone()
                }
            }
        };
        let visible = (config.visible_width(viewport.width), viewport.height);
        let initial = ViewportTransform {
            scale: config.clamp_scale(1.0),
            translate_x: visible.0 / 2.0 - root_position.0,
            translate_y: visible.1 / 2.0 - root_position.1,
        };
        log::debug!(
            "viewport init: visible {:.1}x{:.1}, offset ({:.1}, {:.1})",
            visible.0,
            visible.1,
            initial.translate_x,
            initial.translate_y
        );
        Self {
            config,
            visible,
            transform: initial,
            initial,
            base_scale: initial.scale,
            base_translation: (initial.translate_x, initial.translate_y),
            pinch: GestureState::Idle,
            pan: GestureState::Idle,
            interacting: false,
            observers: Vec::new(),
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn initial_transform(&self) -> ViewportTransform {
        self.initial
    }

    pub fn initial_offset(&self) -> (f32, f32) {
        (self.initial.translate_x, self.initial.translate_y)
    }

    /// Centre of the visible container; scaling pivots around it.
    pub fn pivot(&self) -> (f32, f32) {
        (self.visible.0 / 2.0, self.visible.1 / 2.0)
    }

    pub fn pinch_state(&self) -> GestureState {
        self.pinch
    }

    pub fn pan_state(&self) -> GestureState {
        self.pan
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Registers a callback fired whenever the interaction flag flips. Hosts
    /// use it to suspend their own scrolling while the canvas is handled.
    pub fn on_interaction_change(&mut self, observer: impl FnMut(bool) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn on_pinch(&mut self, event: PinchEvent) {
        match event.phase {
            GesturePhase::Began | GesturePhase::Active => {
                self.pinch = GestureState::Active;
                self.apply_pinch_factor(event.scale);
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                if self.pinch == GestureState::Active {
                    self.apply_pinch_factor(event.scale);
                }
                self.pinch = GestureState::Idle;
                self.base_scale = self.transform.scale;
                log::debug!("pinch {:?}: base scale {:.3}", event.phase, self.base_scale);
            }
        }
        self.sync_interaction();
    }

    pub fn on_pan(&mut self, event: PanEvent) {
        match event.phase {
            GesturePhase::Began | GesturePhase::Active => {
                self.pan = GestureState::Active;
                self.apply_pan_delta(event.translation_x, event.translation_y);
            }
            GesturePhase::Ended => {
                if self.pan == GestureState::Active {
                    self.apply_pan_delta(event.translation_x, event.translation_y);
                }
                self.pan = GestureState::Idle;
                self.base_translation = (self.transform.translate_x, self.transform.translate_y);
                log::debug!(
                    "pan ended: base translation ({:.1}, {:.1})",
                    self.base_translation.0,
                    self.base_translation.1
                );
            }
            GesturePhase::Cancelled => {
                self.pan = GestureState::Idle;
                self.transform.translate_x = self.base_translation.0;
                self.transform.translate_y = self.base_translation.1;
                log::debug!("pan cancelled: translation restored");
            }
        }
        self.sync_interaction();
    }

    pub fn zoom_in(&mut self) {
        self.set_discrete_scale(self.transform.scale * self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_discrete_scale(self.transform.scale / self.config.zoom_step);
    }

    /// Back to the centred starting view, not the scene origin.
    pub fn reset(&mut self) {
        self.transform = self.initial;
        self.base_scale = self.initial.scale;
        self.base_translation = (self.initial.translate_x, self.initial.translate_y);
    }

    fn set_discrete_scale(&mut self, scale: f32) {
        let next = self.config.clamp_scale(scale);
        self.transform.scale = next;
        self.base_scale = next;
    }

    fn apply_pinch_factor(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("ignoring pinch factor {factor}");
            return;
        }
        self.transform.scale = self.config.clamp_scale(self.base_scale * factor);
    }

    fn apply_pan_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.transform.translate_x = self.base_translation.0 + dx;
        self.transform.translate_y = self.base_translation.1 + dy;
    }

    fn sync_interaction(&mut self) {
        let active = self.pinch == GestureState::Active || self.pan == GestureState::Active;
        if active == self.interacting {
            return;
        }
        self.interacting = active;
        log::debug!("canvas interaction {}", if active { "started" } else { "ended" });
        for observer in &mut self.observers {
            observer(active);
        }
    }
}

impl std::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("transform", &self.transform)
            .field("initial", &self.initial)
            .field("base_scale", &self.base_scale)
            .field("base_translation", &self.base_translation)
            .field("pinch", &self.pinch)
            .field("pan", &self.pan)
            .field("interacting", &self.interacting)
            .field("observers", &self.observers.len())
            .finish()
    }
}
