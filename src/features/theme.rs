use serde::Serialize;

/// Named colour slots the frontend uses to style itself.
///
/// The values have nothing to do with the analysed image; every response,
/// successful or not, carries the same [`COLOR_THEME`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTheme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent1: &'static str,
    pub accent2: &'static str,
    pub accent3: &'static str,
    pub accent4: &'static str,
    /// A CSS gradient, not a single colour.
    pub background: &'static str,
    pub text: &'static str,
    pub text_light: &'static str,
}

pub static COLOR_THEME: ColorTheme = ColorTheme {
    primary:    "#9DB5B2", // seafoam
    secondary:  "#B9D0C4", // mint
    accent1:    "#D4E5D8", // pale mint
    accent2:    "#F4C2C2", // blush
    accent3:    "#E8C5A0", // nude
    accent4:    "#F7F3E9", // cream
    background: "linear-gradient(135deg, #F7F3E9 0%, #D4E5D8 50%, #B9D0C4 100%)",
    text:       "#2d3436",
    text_light: "#636e72",
};
