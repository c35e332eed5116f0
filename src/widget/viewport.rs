//! On-screen keyboard compensation for touch devices.
//!
//! When the soft keyboard opens, the visual viewport shrinks while the layout
//! viewport does not. The difference is published as a CSS variable so the
//! composer can stay above the keyboard.

/// Offsets at or below this many CSS pixels are treated as noise.
pub const KEYBOARD_THRESHOLD_PX: f64 = 100.0;

/// Reaction to a visual viewport resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeAction {
    /// The input lost focus; publish `0px`.
    Reset,
    /// The input still has focus. `offset` is set when it exceeded the threshold;
    /// the conversation scrolls to its latest message either way.
    Follow { offset: Option<f64> },
}

/// Tracks the baseline height between focus and blur.
#[derive(Debug, Clone, Default)]
pub struct KeyboardAdapter {
    baseline: Option<f64>,
}

impl KeyboardAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether resize events are currently being observed.
    pub fn is_observing(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Record the baseline. Returns `true` if observation just started.
    pub fn on_focus(&mut self, viewport_height: f64) -> bool {
        let started = self.baseline.is_none();
        self.baseline = Some(viewport_height);
        started
    }

    pub fn on_resize(&self, visual_height: f64, input_focused: bool) -> ResizeAction {
        if !input_focused {
            return ResizeAction::Reset;
        }
        let offset = self
            .baseline
            .map(|baseline| baseline - visual_height)
            .filter(|offset| *offset > KEYBOARD_THRESHOLD_PX);
        ResizeAction::Follow { offset }
    }

    /// Forget the baseline. Returns `true` if observation was active.
    pub fn on_blur(&mut self) -> bool {
        self.baseline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_offset_above_threshold() {
        let mut adapter = KeyboardAdapter::new();
        assert!(adapter.on_focus(800.0));
        assert_eq!(
            adapter.on_resize(450.0, true),
            ResizeAction::Follow {
                offset: Some(350.0)
            }
        );
    }

    #[test]
    fn test_small_offsets_are_ignored() {
        let mut adapter = KeyboardAdapter::new();
        adapter.on_focus(800.0);
        assert_eq!(
            adapter.on_resize(700.0, true),
            ResizeAction::Follow { offset: None }
        );
        assert_eq!(
            adapter.on_resize(760.0, true),
            ResizeAction::Follow { offset: None }
        );
    }

    #[test]
    fn test_resize_without_focus_resets() {
        let mut adapter = KeyboardAdapter::new();
        adapter.on_focus(800.0);
        assert_eq!(adapter.on_resize(300.0, false), ResizeAction::Reset);
    }

    #[test]
    fn test_focus_blur_lifecycle() {
        let mut adapter = KeyboardAdapter::new();
        assert!(!adapter.on_blur());
        assert!(adapter.on_focus(800.0));
        assert!(!adapter.on_focus(780.0));
        assert_eq!(adapter.baseline(), Some(780.0));
        assert!(adapter.on_blur());
        assert!(!adapter.is_observing());
    }
}
