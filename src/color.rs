use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.55, 0.65);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Continuous gradients for heatmaps
// ---------------------------------------------------------------------------

/// Piecewise-linear colour gradient over `[min, max]`, blended in linear RGB.
#[derive(Debug, Clone)]
pub struct Gradient {
    stops: Vec<LinSrgb>,
    min: f64,
    max: f64,
}

impl Gradient {
    fn new(stops: &[(u8, u8, u8)], min: f64, max: f64) -> Self {
        let stops = stops
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
            .collect();
        Gradient { stops, min, max }
    }

    /// Blue → light grey → red over `[min, max]`.
    pub fn coolwarm(min: f64, max: f64) -> Self {
        Self::new(&[(59, 76, 192), (221, 221, 221), (180, 4, 38)], min, max)
    }

    /// Yellow → green → blue over `[min, max]`.
    pub fn yellow_green_blue(min: f64, max: f64) -> Self {
        Self::new(&[(255, 255, 217), (127, 205, 187), (29, 145, 192), (8, 29, 88)], min, max)
    }

    /// Colour for a value. Values outside the range are clamped; `None` is grey.
    pub fn color_for(&self, value: Option<f64>) -> Color32 {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return Color32::GRAY;
        };
        let span = self.max - self.min;
        let t = if span > 0.0 { ((v - self.min) / span).clamp(0.0, 1.0) } else { 0.5 };

        let segments = self.stops.len() - 1;
        let pos = t as f32 * segments as f32;
        let i = (pos.floor() as usize).min(segments - 1);
        let mixed = self.stops[i].mix(self.stops[i + 1], pos - i as f32);
        to_color32(Srgb::from_linear(mixed))
    }
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_distinct() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_gradient_endpoints_and_clamp() {
        let g = Gradient::coolwarm(-1.0, 1.0);
        assert_eq!(g.color_for(Some(-1.0)), Color32::from_rgb(59, 76, 192));
        assert_eq!(g.color_for(Some(1.0)), Color32::from_rgb(180, 4, 38));
        assert_eq!(g.color_for(Some(7.0)), g.color_for(Some(1.0)));
        assert_eq!(g.color_for(None), Color32::GRAY);
        assert_eq!(g.color_for(Some(f64::NAN)), Color32::GRAY);
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(text_color_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_color_on(Color32::from_rgb(8, 29, 88)), Color32::WHITE);
    }
}
