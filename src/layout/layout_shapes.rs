//! Shapes of layout nodes.
//!
//! Each shape knows how to size itself from the metrics of its children, where to place
//! each child relative to its own top-left corner and how to write itself as text.
//! Shapes never see the arena: the tree hands them the child metrics they need.
//!
//! A `Parenthesis` is a leaf whose height depends on the siblings it encloses; for it the
//! tree passes the metrics of the enclosed run (at most one entry) instead of children.

use crate::layout::layout_geometry::{
    GLYPH_BASELINE, GLYPH_HEIGHT, GLYPH_WIDTH, KDCoordinate, KDPoint, KDSize,
};
use enum_dispatch::enum_dispatch;
use itertools::Itertools;

/// Size and baseline of one child, as seen by its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChildMetrics {
    pub size: KDSize,
    pub baseline: KDCoordinate,
}

impl ChildMetrics {
    pub fn new(size: KDSize, baseline: KDCoordinate) -> Self {
        ChildMetrics { size, baseline }
    }

    /// Part of the child below its baseline.
    pub fn descent(&self) -> KDCoordinate {
        self.size.height - self.baseline
    }
}

fn glyph_metrics() -> ChildMetrics {
    ChildMetrics::new(KDSize::new(GLYPH_WIDTH, GLYPH_HEIGHT), GLYPH_BASELINE)
}

/// Geometry and text behaviour of one kind of layout node.
#[enum_dispatch(LayoutKind)]
pub trait LayoutShape {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize;
    /// Distance from the top of the layout to its baseline.
    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate;
    /// Top-left corner of child `index`, relative to this layout's origin.
    fn position_of_child(&self, index: usize, children: &[ChildMetrics]) -> KDPoint;
    /// Text of this layout given the text of its children.
    fn serialize(&self, children: &[String]) -> String;
    fn name(&self) -> &'static str;
    /// Number of child slots this shape requires.
    fn expected_children(&self) -> Option<usize>;
    fn is_horizontal(&self) -> bool {
        false
    }
    fn is_left_parenthesis(&self) -> bool {
        false
    }
    fn is_right_parenthesis(&self) -> bool {
        false
    }
}

/// A single glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharLayout {
    pub ch: char,
}

impl LayoutShape for CharLayout {
    fn compute_size(&self, _children: &[ChildMetrics]) -> KDSize {
        KDSize::new(GLYPH_WIDTH, GLYPH_HEIGHT)
    }

    fn compute_baseline(&self, _children: &[ChildMetrics]) -> KDCoordinate {
        GLYPH_BASELINE
    }

    fn position_of_child(&self, index: usize, _children: &[ChildMetrics]) -> KDPoint {
        panic!("a character has no child {}", index)
    }

    fn serialize(&self, _children: &[String]) -> String {
        match self.ch {
            '×' | '·' => "*".to_string(),
            '−' => "-".to_string(),
            '÷' => "/".to_string(),
            other => other.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "Char"
    }

    fn expected_children(&self) -> Option<usize> {
        Some(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmptyColor {
    /// placeholder the user is expected to fill
    Yellow,
    /// matrix decoration cell
    Grey,
}

/// Placeholder square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyLayout {
    pub color: EmptyColor,
    pub visible: bool,
}

impl EmptyLayout {
    const MARGIN: KDCoordinate = 1;
}

impl LayoutShape for EmptyLayout {
    fn compute_size(&self, _children: &[ChildMetrics]) -> KDSize {
        let width = if self.visible {
            GLYPH_WIDTH - 2 * Self::MARGIN
        } else {
            0
        };
        KDSize::new(width, GLYPH_HEIGHT)
    }

    fn compute_baseline(&self, _children: &[ChildMetrics]) -> KDCoordinate {
        GLYPH_BASELINE
    }

    fn position_of_child(&self, index: usize, _children: &[ChildMetrics]) -> KDPoint {
        panic!("an empty layout has no child {}", index)
    }

    fn serialize(&self, _children: &[String]) -> String {
        String::new()
    }

    fn name(&self) -> &'static str {
        match self.color {
            EmptyColor::Yellow => "Empty",
            EmptyColor::Grey => "GreyEmpty",
        }
    }

    fn expected_children(&self) -> Option<usize> {
        Some(0)
    }
}

/// Horizontal run of children sharing one baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HorizontalLayout;

impl LayoutShape for HorizontalLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        if children.is_empty() {
            return KDSize::new(0, GLYPH_HEIGHT);
        }
        let width = children.iter().map(|c| c.size.width).sum();
        let ascent = children.iter().map(|c| c.baseline).max().unwrap_or(0);
        let descent = children.iter().map(|c| c.descent()).max().unwrap_or(0);
        KDSize::new(width, ascent + descent)
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        children
            .iter()
            .map(|c| c.baseline)
            .max()
            .unwrap_or(GLYPH_BASELINE)
    }

    fn position_of_child(&self, index: usize, children: &[ChildMetrics]) -> KDPoint {
        let x = children[..index].iter().map(|c| c.size.width).sum();
        let y = self.compute_baseline(children) - children[index].baseline;
        KDPoint::new(x, y)
    }

    fn serialize(&self, children: &[String]) -> String {
        children.concat()
    }

    fn name(&self) -> &'static str {
        "Horizontal"
    }

    fn expected_children(&self) -> Option<usize> {
        None
    }

    fn is_horizontal(&self) -> bool {
        true
    }
}

/// Numerator stacked over denominator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FractionLayout;

impl FractionLayout {
    const LINE_MARGIN: KDCoordinate = 2;
    const LINE_HEIGHT: KDCoordinate = 1;
    const HORIZONTAL_MARGIN: KDCoordinate = 2;
}

impl LayoutShape for FractionLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let (numerator, denominator) = (children[0], children[1]);
        let width = numerator.size.width.max(denominator.size.width) + 2 * Self::HORIZONTAL_MARGIN;
        let height = numerator.size.height
            + denominator.size.height
            + 2 * Self::LINE_MARGIN
            + Self::LINE_HEIGHT;
        KDSize::new(width, height)
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        children[0].size.height + Self::LINE_MARGIN
    }

    fn position_of_child(&self, index: usize, children: &[ChildMetrics]) -> KDPoint {
        let width = self.compute_size(children).width;
        let child = children[index];
        let x = (width - child.size.width) / 2;
        let y = if index == 0 {
            0
        } else {
            children[0].size.height + 2 * Self::LINE_MARGIN + Self::LINE_HEIGHT
        };
        KDPoint::new(x, y)
    }

    fn serialize(&self, children: &[String]) -> String {
        format!("(({})/({}))", children[0], children[1])
    }

    fn name(&self) -> &'static str {
        "Fraction"
    }

    fn expected_children(&self) -> Option<usize> {
        Some(2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerticalPosition {
    Superscript,
    Subscript,
}

/// Raised or lowered run following its base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerticalOffsetLayout {
    pub position: VerticalPosition,
}

impl VerticalOffsetLayout {
    const OFFSET: KDCoordinate = GLYPH_HEIGHT / 2;
}

impl LayoutShape for VerticalOffsetLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let child = children[0];
        KDSize::new(child.size.width, child.size.height + Self::OFFSET)
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        match self.position {
            VerticalPosition::Superscript => children[0].size.height,
            VerticalPosition::Subscript => Self::OFFSET,
        }
    }

    fn position_of_child(&self, _index: usize, _children: &[ChildMetrics]) -> KDPoint {
        match self.position {
            VerticalPosition::Superscript => KDPoint::ORIGIN,
            VerticalPosition::Subscript => KDPoint::new(0, Self::OFFSET),
        }
    }

    fn serialize(&self, children: &[String]) -> String {
        match self.position {
            VerticalPosition::Superscript => format!("^({})", children[0]),
            VerticalPosition::Subscript => format!("_({})", children[0]),
        }
    }

    fn name(&self) -> &'static str {
        match self.position {
            VerticalPosition::Superscript => "Superscript",
            VerticalPosition::Subscript => "Subscript",
        }
    }

    fn expected_children(&self) -> Option<usize> {
        Some(1)
    }
}

/// Radical sign over a radicand, with an optional index on the upper left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NthRootLayout {
    pub has_index: bool,
}

impl NthRootLayout {
    const RADIX_WIDTH: KDCoordinate = 8;
    const HEIGHT_MARGIN: KDCoordinate = 2;
    const WIDTH_MARGIN: KDCoordinate = 2;
    const LINE_THICKNESS: KDCoordinate = 1;

    fn index_metrics(&self, children: &[ChildMetrics]) -> ChildMetrics {
        if self.has_index {
            children[1]
        } else {
            ChildMetrics::default()
        }
    }

    /// Distance from the top of the layout to the radical's horizontal line.
    fn body_top(&self, children: &[ChildMetrics]) -> KDCoordinate {
        self.index_metrics(children).size.height / 2
    }

    fn radicand_origin(&self, children: &[ChildMetrics]) -> KDPoint {
        let index = self.index_metrics(children);
        KDPoint::new(
            index.size.width + Self::RADIX_WIDTH + Self::WIDTH_MARGIN,
            self.body_top(children) + Self::LINE_THICKNESS + Self::HEIGHT_MARGIN,
        )
    }
}

impl LayoutShape for NthRootLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let radicand = children[0];
        let origin = self.radicand_origin(children);
        let height = (origin.y + radicand.size.height).max(self.index_metrics(children).size.height);
        KDSize::new(origin.x + radicand.size.width + Self::WIDTH_MARGIN, height)
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        self.radicand_origin(children).y + children[0].baseline
    }

    fn position_of_child(&self, index: usize, children: &[ChildMetrics]) -> KDPoint {
        if index == 0 {
            self.radicand_origin(children)
        } else {
            KDPoint::ORIGIN
        }
    }

    fn serialize(&self, children: &[String]) -> String {
        if self.has_index {
            format!("root({},{})", children[0], children[1])
        } else {
            format!("√({})", children[0])
        }
    }

    fn name(&self) -> &'static str {
        "NthRoot"
    }

    fn expected_children(&self) -> Option<usize> {
        Some(if self.has_index { 2 } else { 1 })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParenthesisSide {
    Left,
    Right,
}

/// One side of a pair of parentheses, as tall as the run it encloses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParenthesisLayout {
    pub side: ParenthesisSide,
}

impl ParenthesisLayout {
    const WIDTH: KDCoordinate = 6;
    const VERTICAL_MARGIN: KDCoordinate = 2;

    fn enclosed(children: &[ChildMetrics]) -> ChildMetrics {
        children.first().copied().unwrap_or_else(glyph_metrics)
    }
}

impl LayoutShape for ParenthesisLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let enclosed = Self::enclosed(children);
        KDSize::new(Self::WIDTH, enclosed.size.height + 2 * Self::VERTICAL_MARGIN)
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        Self::enclosed(children).baseline + Self::VERTICAL_MARGIN
    }

    fn position_of_child(&self, index: usize, _children: &[ChildMetrics]) -> KDPoint {
        panic!("a parenthesis has no child {}", index)
    }

    fn serialize(&self, _children: &[String]) -> String {
        match self.side {
            ParenthesisSide::Left => "(".to_string(),
            ParenthesisSide::Right => ")".to_string(),
        }
    }

    fn name(&self) -> &'static str {
        match self.side {
            ParenthesisSide::Left => "LeftParenthesis",
            ParenthesisSide::Right => "RightParenthesis",
        }
    }

    fn expected_children(&self) -> Option<usize> {
        Some(0)
    }

    fn is_left_parenthesis(&self) -> bool {
        self.side == ParenthesisSide::Left
    }

    fn is_right_parenthesis(&self) -> bool {
        self.side == ParenthesisSide::Right
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BracketKind {
    AbsoluteValue,
    Floor,
    Ceiling,
}

/// Vertical bars (absolute value) or floor/ceiling brackets around one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BracketLayout {
    pub kind: BracketKind,
}

impl BracketLayout {
    const LINE_THICKNESS: KDCoordinate = 1;
    const HORIZONTAL_MARGIN: KDCoordinate = 2;
    const VERTICAL_MARGIN: KDCoordinate = 1;
}

impl LayoutShape for BracketLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let child = children[0];
        KDSize::new(
            child.size.width + 2 * (Self::LINE_THICKNESS + Self::HORIZONTAL_MARGIN),
            child.size.height + 2 * Self::VERTICAL_MARGIN,
        )
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        children[0].baseline + Self::VERTICAL_MARGIN
    }

    fn position_of_child(&self, _index: usize, _children: &[ChildMetrics]) -> KDPoint {
        KDPoint::new(
            Self::LINE_THICKNESS + Self::HORIZONTAL_MARGIN,
            Self::VERTICAL_MARGIN,
        )
    }

    fn serialize(&self, children: &[String]) -> String {
        let name = match self.kind {
            BracketKind::AbsoluteValue => "abs",
            BracketKind::Floor => "floor",
            BracketKind::Ceiling => "ceil",
        };
        format!("{}({})", name, children[0])
    }

    fn name(&self) -> &'static str {
        match self.kind {
            BracketKind::AbsoluteValue => "AbsoluteValue",
            BracketKind::Floor => "Floor",
            BracketKind::Ceiling => "Ceiling",
        }
    }

    fn expected_children(&self) -> Option<usize> {
        Some(1)
    }
}

/// Overline over one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConjugateLayout;

impl ConjugateLayout {
    const OVERLINE_THICKNESS: KDCoordinate = 1;
    const OVERLINE_MARGIN: KDCoordinate = 1;
    const HORIZONTAL_MARGIN: KDCoordinate = 1;
}

impl LayoutShape for ConjugateLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let child = children[0];
        KDSize::new(
            child.size.width + 2 * Self::HORIZONTAL_MARGIN,
            child.size.height + Self::OVERLINE_THICKNESS + Self::OVERLINE_MARGIN,
        )
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        children[0].baseline + Self::OVERLINE_THICKNESS + Self::OVERLINE_MARGIN
    }

    fn position_of_child(&self, _index: usize, _children: &[ChildMetrics]) -> KDPoint {
        KDPoint::new(
            Self::HORIZONTAL_MARGIN,
            Self::OVERLINE_THICKNESS + Self::OVERLINE_MARGIN,
        )
    }

    fn serialize(&self, children: &[String]) -> String {
        format!("conj({})", children[0])
    }

    fn name(&self) -> &'static str {
        "Conjugate"
    }

    fn expected_children(&self) -> Option<usize> {
        Some(1)
    }
}

/// Grid of cells between square brackets, children stored row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixLayout {
    pub rows: usize,
    pub columns: usize,
}

impl MatrixLayout {
    pub const ENTRY_MARGIN: KDCoordinate = 6;
    pub const BRACKET_WIDTH: KDCoordinate = 4;
    pub const VERTICAL_PADDING: KDCoordinate = 2;

    fn column_widths(&self, children: &[ChildMetrics]) -> Vec<KDCoordinate> {
        (0..self.columns)
            .map(|j| {
                (0..self.rows)
                    .map(|i| children[i * self.columns + j].size.width)
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// (ascent, descent) of every row.
    fn row_extents(&self, children: &[ChildMetrics]) -> Vec<(KDCoordinate, KDCoordinate)> {
        children
            .chunks(self.columns)
            .map(|row| {
                let ascent = row.iter().map(|c| c.baseline).max().unwrap_or(0);
                let descent = row.iter().map(|c| c.descent()).max().unwrap_or(0);
                (ascent, descent)
            })
            .collect()
    }
}

impl LayoutShape for MatrixLayout {
    fn compute_size(&self, children: &[ChildMetrics]) -> KDSize {
        let widths = self.column_widths(children);
        let rows = self.row_extents(children);
        let width = 2 * Self::BRACKET_WIDTH
            + widths.iter().sum::<KDCoordinate>()
            + (self.columns as KDCoordinate - 1) * Self::ENTRY_MARGIN;
        let height = 2 * Self::VERTICAL_PADDING
            + rows.iter().map(|(a, d)| a + d).sum::<KDCoordinate>()
            + (self.rows as KDCoordinate - 1) * Self::ENTRY_MARGIN;
        KDSize::new(width, height)
    }

    fn compute_baseline(&self, children: &[ChildMetrics]) -> KDCoordinate {
        (self.compute_size(children).height + 1) / 2
    }

    fn position_of_child(&self, index: usize, children: &[ChildMetrics]) -> KDPoint {
        let (row, column) = (index / self.columns, index % self.columns);
        let widths = self.column_widths(children);
        let rows = self.row_extents(children);
        let child = children[index];
        let x = Self::BRACKET_WIDTH
            + widths[..column].iter().sum::<KDCoordinate>()
            + column as KDCoordinate * Self::ENTRY_MARGIN
            + (widths[column] - child.size.width) / 2;
        let y = Self::VERTICAL_PADDING
            + rows[..row].iter().map(|(a, d)| a + d).sum::<KDCoordinate>()
            + row as KDCoordinate * Self::ENTRY_MARGIN
            + (rows[row].0 - child.baseline);
        KDPoint::new(x, y)
    }

    fn serialize(&self, children: &[String]) -> String {
        let rows = children
            .chunks(self.columns)
            .map(|row| format!("[{}]", row.join(",")))
            .join("");
        format!("[{}]", rows)
    }

    fn name(&self) -> &'static str {
        "Matrix"
    }

    fn expected_children(&self) -> Option<usize> {
        Some(self.rows * self.columns)
    }
}

/// Every layout node kind.
#[enum_dispatch]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    Char(CharLayout),
    Empty(EmptyLayout),
    Horizontal(HorizontalLayout),
    Fraction(FractionLayout),
    VerticalOffset(VerticalOffsetLayout),
    NthRoot(NthRootLayout),
    Parenthesis(ParenthesisLayout),
    Bracket(BracketLayout),
    Conjugate(ConjugateLayout),
    Matrix(MatrixLayout),
}

impl LayoutKind {
    pub fn char(ch: char) -> LayoutKind {
        match ch {
            '(' => LayoutKind::Parenthesis(ParenthesisLayout {
                side: ParenthesisSide::Left,
            }),
            ')' => LayoutKind::Parenthesis(ParenthesisLayout {
                side: ParenthesisSide::Right,
            }),
            other => LayoutKind::Char(CharLayout { ch: other }),
        }
    }

    pub fn empty(color: EmptyColor, visible: bool) -> LayoutKind {
        LayoutKind::Empty(EmptyLayout { color, visible })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            LayoutKind::Char(_) | LayoutKind::Empty(_) | LayoutKind::Parenthesis(_)
        )
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LayoutKind::Empty(_))
    }

    pub fn is_grey_empty(&self) -> bool {
        matches!(
            self,
            LayoutKind::Empty(EmptyLayout {
                color: EmptyColor::Grey,
                ..
            })
        )
    }

    pub fn is_parenthesis(&self) -> bool {
        matches!(self, LayoutKind::Parenthesis(_))
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, LayoutKind::Matrix(_))
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            LayoutKind::Char(c) => Some(c.ch),
            LayoutKind::Parenthesis(p) => Some(if p.side == ParenthesisSide::Left {
                '('
            } else {
                ')'
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph() -> ChildMetrics {
        glyph_metrics()
    }

    #[test]
    fn test_horizontal_aligns_baselines() {
        let tall = ChildMetrics::new(KDSize::new(10, 40), 30);
        let children = [glyph(), tall];
        let h = HorizontalLayout;
        assert_eq!(h.compute_size(&children), KDSize::new(20, 30 + 10));
        assert_eq!(h.compute_baseline(&children), 30);
        assert_eq!(h.position_of_child(0, &children), KDPoint::new(0, 21));
        assert_eq!(h.position_of_child(1, &children), KDPoint::new(10, 0));
    }

    #[test]
    fn test_fraction_centres_children() {
        let numerator = ChildMetrics::new(KDSize::new(30, 18), 9);
        let denominator = glyph();
        let f = FractionLayout;
        let children = [numerator, denominator];
        let size = f.compute_size(&children);
        assert_eq!(size, KDSize::new(34, 18 + 18 + 5));
        assert_eq!(f.compute_baseline(&children), 20);
        assert_eq!(f.position_of_child(0, &children), KDPoint::new(2, 0));
        assert_eq!(f.position_of_child(1, &children), KDPoint::new(12, 23));
    }

    #[test]
    fn test_superscript_raises_child() {
        let v = VerticalOffsetLayout {
            position: VerticalPosition::Superscript,
        };
        let children = [glyph()];
        assert_eq!(v.compute_size(&children), KDSize::new(10, 27));
        assert_eq!(v.compute_baseline(&children), 18);
    }

    #[test]
    fn test_matrix_serialization() {
        let m = MatrixLayout {
            rows: 2,
            columns: 2,
        };
        let cells: Vec<String> = ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect();
        assert_eq!(m.serialize(&cells), "[[1,2][3,4]]");
        let metrics = vec![glyph(); 4];
        let size = m.compute_size(&metrics);
        assert_eq!(size.width, 2 * 4 + 20 + 6);
        assert_eq!(size.height, 2 * 2 + 36 + 6);
    }

    #[test]
    fn test_parenthesis_kinds() {
        assert!(LayoutKind::char('(').is_left_parenthesis());
        assert!(LayoutKind::char(')').is_right_parenthesis());
        assert!(!LayoutKind::char('x').is_parenthesis());
        assert_eq!(LayoutKind::char('×').serialize(&[]), "*");
    }
}
