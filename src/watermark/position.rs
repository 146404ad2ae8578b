//! Anchor-based overlay placement.
//!
//! Nine named positions map to an anchor class carrying independent
//! horizontal and vertical classes. The geometry math below is driven by
//! those classes, never by the position strings themselves.

/// Relative placement along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisClass {
    Start,
    Center,
    End,
}

/// Named overlay anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    /// Pure lookup from position name. Unrecognized strings default to
    /// bottom-right.
    pub fn parse(s: &str) -> Anchor {
        match s {
            "topLeft" => Anchor::TopLeft,
            "top" => Anchor::Top,
            "topRight" => Anchor::TopRight,
            "left" => Anchor::Left,
            "center" => Anchor::Center,
            "right" => Anchor::Right,
            "bottomLeft" => Anchor::BottomLeft,
            "bottom" => Anchor::Bottom,
            "bottomRight" => Anchor::BottomRight,
            _ => Anchor::BottomRight,
        }
    }

    /// The (horizontal, vertical) axis classes for this anchor.
    pub fn classes(&self) -> (AxisClass, AxisClass) {
        match self {
            Anchor::TopLeft => (AxisClass::Start, AxisClass::Start),
            Anchor::Top => (AxisClass::Center, AxisClass::Start),
            Anchor::TopRight => (AxisClass::End, AxisClass::Start),
            Anchor::Left => (AxisClass::Start, AxisClass::Center),
            Anchor::Center => (AxisClass::Center, AxisClass::Center),
            Anchor::Right => (AxisClass::End, AxisClass::Center),
            Anchor::BottomLeft => (AxisClass::Start, AxisClass::End),
            Anchor::Bottom => (AxisClass::Center, AxisClass::End),
            Anchor::BottomRight => (AxisClass::End, AxisClass::End),
        }
    }
}

/// Resolved pixel offsets from the image edges.
///
/// At most one of top/bottom and one of left/right is set; a centered axis
/// receives no margin offset at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeOffsets {
    pub top: Option<u32>,
    pub bottom: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

/// Compute the margin offsets for an anchor. Margin applies only on the
/// start or end edges actually in use for each axis.
pub fn edge_offsets(anchor: Anchor, margin: u32) -> EdgeOffsets {
    let (h, v) = anchor.classes();
    let mut offsets = EdgeOffsets::default();

    match h {
        AxisClass::Start => offsets.left = Some(margin),
        AxisClass::End => offsets.right = Some(margin),
        AxisClass::Center => {}
    }
    match v {
        AxisClass::Start => offsets.top = Some(margin),
        AxisClass::End => offsets.bottom = Some(margin),
        AxisClass::Center => {}
    }

    offsets
}

/// Compute the top-left pixel position for an overlay of the given size.
///
/// Coordinates may be negative when the overlay is larger than the base;
/// the compositor clips to the visible region.
pub fn overlay_position(
    anchor: Anchor,
    base_w: u32,
    base_h: u32,
    overlay_w: u32,
    overlay_h: u32,
    margin: u32,
) -> (i64, i64) {
    let offsets = edge_offsets(anchor, margin);
    let (bw, bh) = (base_w as i64, base_h as i64);
    let (ow, oh) = (overlay_w as i64, overlay_h as i64);

    let x = match (offsets.left, offsets.right) {
        (Some(m), _) => m as i64,
        (_, Some(m)) => bw - ow - m as i64,
        _ => (bw - ow) / 2,
    };
    let y = match (offsets.top, offsets.bottom) {
        (Some(m), _) => m as i64,
        (_, Some(m)) => bh - oh - m as i64,
        _ => (bh - oh) / 2,
    };

    (x, y)
}
