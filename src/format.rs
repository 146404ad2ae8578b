//! Output format resolution
//!
//! Decides the output encoding for a given input, applying fallback policy:
//! keep the source format when possible, otherwise fall back to PNG (alpha)
//! or JPEG (opaque). Resolution is total - every accepted input yields a
//! well-defined output format, never an error.

use std::str::FromStr;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
    Tiff,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Tiff => "tiff",
        }
    }

    /// File extension used for output naming.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Whether the format can represent an alpha channel.
    pub fn supports_transparency(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "avif" => Ok(OutputFormat::Avif),
            "tiff" => Ok(OutputFormat::Tiff),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

/// Configured output-format selector: keep the source format or force one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSelector {
    Original,
    Explicit(OutputFormat),
}

impl FormatSelector {
    /// Parse the config string. Unknown names fall back to `Original` so a
    /// typo never hard-fails format selection for the whole run.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("original") {
            return FormatSelector::Original;
        }
        match OutputFormat::from_str(s) {
            Ok(fmt) => FormatSelector::Explicit(fmt),
            Err(_) => {
                tracing::warn!(selector = %s, "Unknown output format selector, keeping original");
                FormatSelector::Original
            }
        }
    }
}

/// Image extensions accepted as batch input (case-insensitive).
///
/// SVG is input-only: it always goes through the alpha fallback below since
/// it is never a valid output target.
const INPUT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "avif", "tiff", "svg",
];

/// Check if a file extension is an accepted image input.
pub fn is_supported_input(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    INPUT_EXTENSIONS.iter().any(|e| *e == ext)
}

/// Resolve the output format for one file.
///
/// With `Original`, the normalized source extension (`jpg` -> `jpeg`) is the
/// candidate; an explicit selector is used directly. A candidate outside the
/// supported output set (e.g. `svg`, `gif`) falls back to PNG when the
/// source carries alpha, JPEG otherwise.
pub fn resolve_output_format(
    selector: FormatSelector,
    source_ext: &str,
    has_alpha: bool,
) -> OutputFormat {
    let candidate = match selector {
        FormatSelector::Explicit(fmt) => return fmt,
        FormatSelector::Original => OutputFormat::from_str(source_ext),
    };

    match candidate {
        Ok(fmt) => fmt,
        Err(_) => {
            if has_alpha {
                OutputFormat::Png
            } else {
                OutputFormat::Jpeg
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
        assert_eq!("avif".parse::<OutputFormat>().unwrap(), OutputFormat::Avif);
        assert_eq!("tiff".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
        assert!("svg".parse::<OutputFormat>().is_err());
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(FormatSelector::parse("original"), FormatSelector::Original);
        assert_eq!(FormatSelector::parse("Original"), FormatSelector::Original);
        assert_eq!(
            FormatSelector::parse("webp"),
            FormatSelector::Explicit(OutputFormat::WebP)
        );
        // Unknown selector degrades to Original instead of failing the run
        assert_eq!(FormatSelector::parse("bmp"), FormatSelector::Original);
    }

    #[test]
    fn test_supported_inputs() {
        assert!(is_supported_input("jpg"));
        assert!(is_supported_input("JPEG"));
        assert!(is_supported_input("svg"));
        assert!(is_supported_input("Gif"));
        assert!(!is_supported_input("bmp"));
        assert!(!is_supported_input("txt"));
        assert!(!is_supported_input(""));
    }

    #[test]
    fn test_explicit_selector_wins() {
        let fmt = resolve_output_format(
            FormatSelector::Explicit(OutputFormat::Avif),
            "png",
            true,
        );
        assert_eq!(fmt, OutputFormat::Avif);
    }

    #[test]
    fn test_original_matches_explicit_for_supported_sources() {
        // Resolving `original` on a source whose extension is a supported
        // output must agree with setting that format explicitly.
        for (ext, fmt) in [
            ("jpeg", OutputFormat::Jpeg),
            ("jpg", OutputFormat::Jpeg),
            ("png", OutputFormat::Png),
            ("webp", OutputFormat::WebP),
            ("avif", OutputFormat::Avif),
            ("tiff", OutputFormat::Tiff),
        ] {
            let original = resolve_output_format(FormatSelector::Original, ext, false);
            let explicit =
                resolve_output_format(FormatSelector::Explicit(fmt), ext, false);
            assert_eq!(original, explicit, "mismatch for {}", ext);
        }
    }

    #[test]
    fn test_unsupported_source_falls_back_on_alpha() {
        let fmt = resolve_output_format(FormatSelector::Original, "svg", true);
        assert_eq!(fmt, OutputFormat::Png);

        let fmt = resolve_output_format(FormatSelector::Original, "svg", false);
        assert_eq!(fmt, OutputFormat::Jpeg);

        let fmt = resolve_output_format(FormatSelector::Original, "gif", true);
        assert_eq!(fmt, OutputFormat::Png);
    }

    #[test]
    fn test_transparency_support() {
        assert!(!OutputFormat::Jpeg.supports_transparency());
        assert!(OutputFormat::Png.supports_transparency());
        assert!(OutputFormat::WebP.supports_transparency());
        assert!(OutputFormat::Avif.supports_transparency());
        assert!(OutputFormat::Tiff.supports_transparency());
    }
}
