//! Run style and visibility derived from the owning layer.
//!
//! Invariants:
//! * Style depends only on the layer's color and color mode, never on the run text.
//! * A visible layer always renders fully opaque regardless of the display mode.
//! * Hidden + `Keep` preserves layout (zero opacity); hidden + `Collapse` removes
//!   the run from layout entirely.

use core_layers::{ColorMode, DisplayMode, Layer, Rgb};

/// Foreground used whenever the layer color is not the text color.
pub const NEUTRAL_FG: Rgb = Rgb::new(0x33, 0x41, 0x55);
/// Opacity of the highlight background tint.
pub const HIGHLIGHT_ALPHA: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub const fn opaque(rgb: Rgb) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    pub const fn transparent() -> Self {
        Self {
            rgb: Rgb::new(0, 0, 0),
            alpha: 0.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    /// Composite over an opaque backdrop.
    pub fn over(self, backdrop: Rgb) -> Rgb {
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Rgb::new(
            mix(self.rgb.r, backdrop.r),
            mix(self.rgb.g, backdrop.g),
            mix(self.rgb.b, backdrop.b),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStyle {
    pub background: Rgba,
    pub foreground: Rgba,
}

impl RunStyle {
    /// Style of text with no owning layer.
    pub const fn plain() -> Self {
        Self {
            background: Rgba::transparent(),
            foreground: Rgba::opaque(NEUTRAL_FG),
        }
    }
}

pub fn compute_run_style(layer: &Layer) -> RunStyle {
    match layer.color_mode {
        ColorMode::Highlight => RunStyle {
            background: Rgba {
                rgb: layer.color,
                alpha: HIGHLIGHT_ALPHA,
            },
            foreground: Rgba::opaque(NEUTRAL_FG),
        },
        ColorMode::TextColor => RunStyle {
            background: Rgba::transparent(),
            foreground: Rgba::opaque(layer.color),
        },
        ColorMode::Off => RunStyle::plain(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Zero opacity; layout space is kept.
    Hidden,
    /// Removed from layout.
    Collapsed,
}

impl Visibility {
    pub fn takes_space(self) -> bool {
        !matches!(self, Visibility::Collapsed)
    }
}

/// Runs without a known layer are always visible.
pub fn compute_run_visibility(layer: Option<&Layer>, mode: DisplayMode) -> Visibility {
    match layer {
        Some(l) if !l.visible => match mode {
            DisplayMode::Keep => Visibility::Hidden,
            DisplayMode::Collapse => Visibility::Collapsed,
        },
        _ => Visibility::Visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(mode: ColorMode) -> Layer {
        let mut l = Layer::new("layer-1", "Dialogue", Rgb::new(0x60, 0xa5, 0xfa));
        l.color_mode = mode;
        l
    }

    #[test]
    fn highlight_tints_background() {
        let style = compute_run_style(&layer(ColorMode::Highlight));
        assert_eq!(style.background.rgb, Rgb::new(0x60, 0xa5, 0xfa));
        assert_eq!(style.background.alpha, HIGHLIGHT_ALPHA);
        assert_eq!(style.foreground, Rgba::opaque(NEUTRAL_FG));
    }

    #[test]
    fn text_color_and_off() {
        let text = compute_run_style(&layer(ColorMode::TextColor));
        assert!(text.background.is_transparent());
        assert_eq!(text.foreground.rgb, Rgb::new(0x60, 0xa5, 0xfa));
        assert_eq!(compute_run_style(&layer(ColorMode::Off)), RunStyle::plain());
    }

    #[test]
    fn visibility_follows_display_mode_only_when_hidden() {
        let mut l = layer(ColorMode::Highlight);
        assert_eq!(compute_run_visibility(Some(&l), DisplayMode::Collapse), Visibility::Visible);
        l.visible = false;
        assert_eq!(compute_run_visibility(Some(&l), DisplayMode::Keep), Visibility::Hidden);
        assert_eq!(compute_run_visibility(Some(&l), DisplayMode::Collapse), Visibility::Collapsed);
        assert_eq!(compute_run_visibility(None, DisplayMode::Collapse), Visibility::Visible);
    }

    #[test]
    fn alpha_blend_over_white() {
        let tint = Rgba {
            rgb: Rgb::new(0, 0, 0),
            alpha: HIGHLIGHT_ALPHA,
        };
        assert_eq!(tint.over(Rgb::new(255, 255, 255)), Rgb::new(191, 191, 191));
        assert_eq!(Rgba::transparent().over(Rgb::new(1, 2, 3)), Rgb::new(1, 2, 3));
    }
}
