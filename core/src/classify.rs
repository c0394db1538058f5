//! Texture channel classification
//!
//! Derived per file from filename-suffix matching, never stored. The suffix
//! decides the encoder's color-space and compression-mode flags.

use std::path::Path;

/// Raster formats the encoder accepts as input.
pub const TEXTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Suffixes marking tangent-space normal maps.
pub const NORMAL_MAP_SUFFIXES: &[&str] = &["_normal", "_local"];

/// Suffixes marking non-color (linear) data channels.
pub const LINEAR_TEXTURE_SUFFIXES: &[&str] = &[
    "_metallic",
    "_roughness",
    "_ambient_occlusion",
    "_emissive",
    "_depth",
    "_disp",
];

/// How a texture's pixel data is to be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Tangent-space normal map: normal-map encoding, non-color format.
    Normal,
    /// Linear data channel (metallic, roughness, ...): non-color format,
    /// no sRGB transfer.
    Linear,
    /// Everything else is treated as sRGB color data.
    Color,
}

/// Classify a file stem by suffix.
///
/// The categories are disjoint (a stem matches at most one suffix list) and
/// exhaustive: anything without a recognized suffix is color data.
pub fn classify(stem: &str) -> TextureKind {
    if NORMAL_MAP_SUFFIXES.iter().any(|s| stem.contains(s)) {
        TextureKind::Normal
    } else if LINEAR_TEXTURE_SUFFIXES.iter().any(|s| stem.contains(s)) {
        TextureKind::Linear
    } else {
        TextureKind::Color
    }
}

/// Whether `path` is a raster image the encoder should consume.
pub fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXTURE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_normal_map_suffixes() {
        assert_eq!(classify("rock_normal"), TextureKind::Normal);
        assert_eq!(classify("brick_local"), TextureKind::Normal);
    }

    #[test]
    fn test_classify_linear_suffixes() {
        assert_eq!(classify("rock_roughness"), TextureKind::Linear);
        assert_eq!(classify("rock_metallic"), TextureKind::Linear);
        assert_eq!(classify("lamp_emissive"), TextureKind::Linear);
        assert_eq!(classify("floor_ambient_occlusion"), TextureKind::Linear);
        assert_eq!(classify("wall_depth"), TextureKind::Linear);
        assert_eq!(classify("wall_disp"), TextureKind::Linear);
    }

    #[test]
    fn test_classify_defaults_to_color() {
        assert_eq!(classify("rock"), TextureKind::Color);
        assert_eq!(classify("grass_green"), TextureKind::Color);
    }

    #[test]
    fn test_classify_is_exhaustive_over_suffix_lists() {
        // Every recognized suffix lands in exactly one category.
        for suffix in NORMAL_MAP_SUFFIXES {
            assert_eq!(classify(&format!("tex{suffix}")), TextureKind::Normal);
        }
        for suffix in LINEAR_TEXTURE_SUFFIXES {
            assert_eq!(classify(&format!("tex{suffix}")), TextureKind::Linear);
        }
    }

    #[test]
    fn test_is_raster() {
        assert!(is_raster(Path::new("textures/rock.png")));
        assert!(is_raster(Path::new("rock.JPG")));
        assert!(is_raster(Path::new("rock.jpeg")));
        assert!(!is_raster(Path::new("rock.ktx2")));
        assert!(!is_raster(Path::new("rock.toml")));
        assert!(!is_raster(Path::new("rock")));
    }
}
