//! Transform planning
//!
//! Builds the ordered operation list for one file from static configuration
//! plus that file's metadata. The fixed ordering is a correctness
//! requirement: reorientation before resize (resize acts on upright
//! pixels), resize before watermark (watermark geometry uses final
//! dimensions), alpha flatten last (the watermark's own transparency is
//! preserved and only the final composite gets flattened).

use std::str::FromStr;

use crate::config::Config;
use crate::format::OutputFormat;
use crate::resize::FitMode;
use crate::watermark::parse_hex_color;

/// One planned operation. A closed set of variants rather than ad hoc
/// conditionals, so the planner's ordering invariant is enforced by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    /// Normalize any source-embedded EXIF orientation
    Reorient,
    /// Fit into a target box; never enlarges past source dimensions
    Resize {
        width: Option<u32>,
        height: Option<u32>,
        fit: FitMode,
    },
    /// Mild unparameterized edge enhancement
    Sharpen,
    /// Metadata handling on re-encode; exactly one per plan
    MetadataPolicy { strip: bool },
    /// Composite onto an opaque background; present only when the output
    /// format cannot represent alpha and the source has it
    FlattenAlpha { background: [u8; 3] },
}

/// Ordered plan for one file's processing. Built once, applied once,
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPlan {
    steps: Vec<TransformStep>,
}

impl TransformPlan {
    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    pub fn has_flatten(&self) -> bool {
        matches!(self.steps.last(), Some(TransformStep::FlattenAlpha { .. }))
    }
}

/// Decoded-source metadata the planner needs.
#[derive(Debug, Clone, Copy)]
pub struct SourceMeta {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
}

/// Build the ordered transform plan for one file.
pub fn plan_transforms(
    config: &Config,
    source: &SourceMeta,
    output_format: OutputFormat,
) -> TransformPlan {
    let mut steps = Vec::with_capacity(5);

    // 1. Reorientation is always planned first so all downstream geometry
    //    works in upright pixel space.
    steps.push(TransformStep::Reorient);

    // 2. Resize, clamped at plan time so a target box can never exceed the
    //    source on either axis.
    if config.resize.enabled {
        let fit = FitMode::from_str(&config.resize.fit).unwrap_or_else(|_| {
            tracing::warn!(fit = %config.resize.fit, "Unknown fit mode, using inside");
            FitMode::Inside
        });
        steps.push(TransformStep::Resize {
            width: config.resize.width.map(|w| w.min(source.width)),
            height: config.resize.height.map(|h| h.min(source.height)),
            fit,
        });
    }

    // 3. Sharpen
    if config.optimize.sharpen {
        steps.push(TransformStep::Sharpen);
    }

    // 4. Metadata policy: exactly one step, default strip.
    steps.push(TransformStep::MetadataPolicy {
        strip: config.optimize.remove_metadata,
    });

    // 5. Alpha flatten, last before encode, only when the encoder would
    //    otherwise be handed alpha it cannot represent.
    if !output_format.supports_transparency() && source.has_alpha {
        let background = parse_hex_color(&config.optimize.flatten_background)
            .map(|c| [c.r, c.g, c.b])
            .unwrap_or([255, 255, 255]);
        steps.push(TransformStep::FlattenAlpha { background });
    }

    TransformPlan { steps }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32, has_alpha: bool) -> SourceMeta {
        SourceMeta {
            width,
            height,
            has_alpha,
        }
    }

    #[test]
    fn test_minimal_plan() {
        let config = Config::default();
        let plan = plan_transforms(&config, &meta(800, 600, false), OutputFormat::Png);
        assert_eq!(
            plan.steps(),
            &[
                TransformStep::Reorient,
                TransformStep::MetadataPolicy { strip: true },
            ]
        );
    }

    #[test]
    fn test_full_plan_ordering() {
        let mut config = Config::default();
        config.resize.enabled = true;
        config.resize.width = Some(1200);
        config.optimize.sharpen = true;

        let plan = plan_transforms(&config, &meta(1920, 1080, true), OutputFormat::Jpeg);
        assert_eq!(
            plan.steps(),
            &[
                TransformStep::Reorient,
                TransformStep::Resize {
                    width: Some(1200),
                    height: None,
                    fit: FitMode::Inside,
                },
                TransformStep::Sharpen,
                TransformStep::MetadataPolicy { strip: true },
                TransformStep::FlattenAlpha {
                    background: [255, 255, 255],
                },
            ]
        );
        assert!(plan.has_flatten());
    }

    #[test]
    fn test_resize_never_exceeds_source() {
        let mut config = Config::default();
        config.resize.enabled = true;
        config.resize.width = Some(5000);
        config.resize.height = Some(9000);

        let plan = plan_transforms(&config, &meta(1920, 1080, false), OutputFormat::Png);
        let resize = plan
            .steps()
            .iter()
            .find(|s| matches!(s, TransformStep::Resize { .. }))
            .unwrap();
        assert_eq!(
            resize,
            &TransformStep::Resize {
                width: Some(1920),
                height: Some(1080),
                fit: FitMode::Inside,
            }
        );
    }

    #[test]
    fn test_flatten_only_for_jpeg_with_alpha() {
        let config = Config::default();

        // JPEG + alpha: flatten present, and last
        let plan = plan_transforms(&config, &meta(10, 10, true), OutputFormat::Jpeg);
        assert!(plan.has_flatten());

        // JPEG without alpha: absent
        let plan = plan_transforms(&config, &meta(10, 10, false), OutputFormat::Jpeg);
        assert!(!plan.has_flatten());

        // Alpha-capable outputs: absent even with alpha
        for fmt in [
            OutputFormat::Png,
            OutputFormat::WebP,
            OutputFormat::Avif,
            OutputFormat::Tiff,
        ] {
            let plan = plan_transforms(&config, &meta(10, 10, true), fmt);
            assert!(!plan.has_flatten(), "unexpected flatten for {:?}", fmt);
        }
    }

    #[test]
    fn test_metadata_preservation_requested() {
        let mut config = Config::default();
        config.optimize.remove_metadata = false;

        let plan = plan_transforms(&config, &meta(10, 10, false), OutputFormat::Png);
        assert!(plan
            .steps()
            .contains(&TransformStep::MetadataPolicy { strip: false }));
    }

    #[test]
    fn test_flatten_background_from_config() {
        let mut config = Config::default();
        config.optimize.flatten_background = "#000000".to_string();

        let plan = plan_transforms(&config, &meta(10, 10, true), OutputFormat::Jpeg);
        assert_eq!(
            plan.steps().last(),
            Some(&TransformStep::FlattenAlpha {
                background: [0, 0, 0],
            })
        );
    }

    #[test]
    fn test_unknown_fit_defaults_to_inside() {
        let mut config = Config::default();
        config.resize.enabled = true;
        config.resize.fit = "squish".to_string();

        let plan = plan_transforms(&config, &meta(10, 10, false), OutputFormat::Png);
        assert!(plan.steps().iter().any(|s| matches!(
            s,
            TransformStep::Resize {
                fit: FitMode::Inside,
                ..
            }
        )));
    }
}
