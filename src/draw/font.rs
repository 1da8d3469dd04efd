//! Font descriptor for text annotations.

/// Font configuration for text rendering.
///
/// Passed through measurement and rendering so the on-screen preview, the
/// hit-test bounds and the final composite all use the same layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "JetBrains Mono")
    pub family: String,

    /// Font weight (e.g., "normal", "bold", "light" or numeric 100-900)
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "normal".to_string(),
            style: "normal".to_string(),
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Converts this font descriptor to a Pango font description string.
    ///
    /// Format: "Family Style Weight Size", with the size given in pixels
    /// ("px" suffix) so text scales with the Cairo transform rather than
    /// the display's DPI setting.
    pub fn to_pango_string(&self, size: f64) -> String {
        let mut parts = vec![self.family.clone()];

        if self.style.to_lowercase() != "normal" {
            parts.push(capitalize_first(&self.style));
        }

        if self.weight.to_lowercase() != "normal" {
            parts.push(capitalize_first(&self.weight));
        }

        parts.push(format!("{}px", size.round().max(1.0) as i32));

        parts.join(" ")
    }

    /// Builds a Pango layout for `text` on the given context.
    pub(crate) fn layout(&self, ctx: &cairo::Context, text: &str, size: f64) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(ctx);
        let desc = pango::FontDescription::from_string(&self.to_pango_string(size));
        layout.set_font_description(Some(&desc));
        layout.set_text(text);
        layout
    }
}

/// Capitalizes the first letter of a string.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pango_string_default() {
        let font = FontDescriptor::default();
        assert_eq!(font.to_pango_string(16.0), "Sans 16px");
    }

    #[test]
    fn pango_string_italic_bold() {
        let font = FontDescriptor::new(
            "Monospace".to_string(),
            "bold".to_string(),
            "italic".to_string(),
        );
        assert_eq!(font.to_pango_string(24.4), "Monospace Italic Bold 24px");
    }
}
