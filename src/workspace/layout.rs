//! ペイン分割ツリー
//!
//! 各ペインは二分木の葉として配置される。分割は葉を `Split` ノードへ
//! 置き換え、削除は兄弟ノードを親の位置へ引き上げる。

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// ペインID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub usize);

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 分割方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOrientation {
    /// 左右に並べる（Split Right）
    Horizontal,
    /// 上下に並べる（Split Down）
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
enum LayoutNode {
    Leaf(PaneId),
    Split {
        orientation: SplitOrientation,
        /// 先頭側の比率（0.0〜1.0）
        ratio: f32,
        first: Box<LayoutNode>,
        second: Box<LayoutNode>,
    },
}

impl LayoutNode {
    fn collect_leaves(&self, leaves: &mut Vec<PaneId>) {
        match self {
            LayoutNode::Leaf(id) => leaves.push(*id),
            LayoutNode::Split { first, second, .. } => {
                first.collect_leaves(leaves);
                second.collect_leaves(leaves);
            }
        }
    }

    fn replace_leaf(&mut self, target: PaneId, replacement: &mut Option<LayoutNode>) -> bool {
        match self {
            LayoutNode::Leaf(id) if *id == target => match replacement.take() {
                Some(node) => {
                    *self = node;
                    true
                }
                None => false,
            },
            LayoutNode::Leaf(_) => false,
            LayoutNode::Split { first, second, .. } => {
                first.replace_leaf(target, replacement) || second.replace_leaf(target, replacement)
            }
        }
    }

    /// `target` の葉を取り除く
    ///
    /// `SelfRemoved` はこのノード自身が `target` の葉だったことを表し、
    /// 親が兄弟ノードを引き上げる。
    fn remove_leaf(&mut self, target: PaneId) -> Removal {
        match self {
            LayoutNode::Leaf(id) if *id == target => Removal::SelfRemoved,
            LayoutNode::Leaf(_) => Removal::NotFound,
            LayoutNode::Split { first, second, .. } => {
                let promoted = match first.remove_leaf(target) {
                    // target は first 内にあったので、second を引き上げる
                    Removal::SelfRemoved => Some(std::mem::replace(
                        second.as_mut(),
                        LayoutNode::Leaf(target),
                    )),
                    Removal::Done => return Removal::Done,
                    Removal::NotFound => match second.remove_leaf(target) {
                        Removal::SelfRemoved => Some(std::mem::replace(
                            first.as_mut(),
                            LayoutNode::Leaf(target),
                        )),
                        Removal::Done => return Removal::Done,
                        Removal::NotFound => None,
                    },
                };

                match promoted {
                    Some(node) => {
                        *self = node;
                        Removal::Done
                    }
                    None => Removal::NotFound,
                }
            }
        }
    }

    /// `target` を直接の子に持つ分割の比率を変更する
    fn adjust_ratio(&mut self, target: PaneId, delta: f32) -> bool {
        match self {
            LayoutNode::Leaf(_) => false,
            LayoutNode::Split {
                ratio,
                first,
                second,
                ..
            } => {
                if matches!(first.as_ref(), LayoutNode::Leaf(id) if *id == target) {
                    *ratio = (*ratio + delta).clamp(0.1, 0.9);
                    true
                } else if matches!(second.as_ref(), LayoutNode::Leaf(id) if *id == target) {
                    *ratio = (*ratio - delta).clamp(0.1, 0.9);
                    true
                } else {
                    first.adjust_ratio(target, delta) || second.adjust_ratio(target, delta)
                }
            }
        }
    }

    fn reset_ratios(&mut self) {
        if let LayoutNode::Split {
            ratio,
            first,
            second,
            ..
        } = self
        {
            *ratio = 0.5;
            first.reset_ratios();
            second.reset_ratios();
        }
    }

    fn layout_with_dividers(
        &self,
        area: Rect,
        result: &mut Vec<(PaneId, Rect)>,
        dividers: &mut Vec<Rect>,
    ) {
        match self {
            LayoutNode::Leaf(id) => result.push((*id, area)),
            LayoutNode::Split {
                orientation,
                ratio,
                first,
                second,
            } => {
                let (first_area, divider_area, second_area) = split_area(area, *orientation, *ratio);

                if let Some(divider) = divider_area {
                    dividers.push(divider);
                }

                first.layout_with_dividers(first_area, result, dividers);
                second.layout_with_dividers(second_area, result, dividers);
            }
        }
    }
}

enum Removal {
    NotFound,
    SelfRemoved,
    Done,
}

fn split_area(area: Rect, orientation: SplitOrientation, ratio: f32) -> (Rect, Option<Rect>, Rect) {
    let (direction, dimension) = match orientation {
        SplitOrientation::Horizontal => (Direction::Horizontal, area.width),
        SplitOrientation::Vertical => (Direction::Vertical, area.height),
    };

    if dimension < 3 {
        let chunks = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        return (chunks[0], None, chunks[1]);
    }

    let divider_thickness: u16 = 1;
    let remainder = dimension - divider_thickness;
    let ratio = ratio.clamp(0.1, 0.9);
    let first = ((remainder as f32 * ratio).round() as u16).clamp(1, remainder - 1);
    let second = remainder - first;

    let chunks = Layout::default()
        .direction(direction)
        .constraints([
            Constraint::Length(first),
            Constraint::Length(divider_thickness),
            Constraint::Length(second),
        ])
        .split(area);

    (chunks[0], Some(chunks[1]), chunks[2])
}

/// ペインの配置ツリー
#[derive(Debug, Clone, PartialEq)]
pub struct PaneLayout {
    root: LayoutNode,
}

impl PaneLayout {
    /// 単一ペインのレイアウト
    pub fn new(root: PaneId) -> Self {
        Self {
            root: LayoutNode::Leaf(root),
        }
    }

    /// `target` を分割し、`new_pane` を後ろ側（右または下）に配置する
    pub fn split(&mut self, target: PaneId, orientation: SplitOrientation, new_pane: PaneId) -> bool {
        let mut replacement = Some(LayoutNode::Split {
            orientation,
            ratio: 0.5,
            first: Box::new(LayoutNode::Leaf(target)),
            second: Box::new(LayoutNode::Leaf(new_pane)),
        });
        self.root.replace_leaf(target, &mut replacement)
    }

    /// ペインを取り除く（最後の1つは取り除けない）
    pub fn remove(&mut self, target: PaneId) -> bool {
        if matches!(self.root, LayoutNode::Leaf(_)) {
            return false;
        }
        matches!(self.root.remove_leaf(target), Removal::Done)
    }

    pub fn contains(&self, pane: PaneId) -> bool {
        self.leaf_order().contains(&pane)
    }

    pub fn len(&self) -> usize {
        self.leaf_order().len()
    }

    /// 深さ優先（左→右、上→下）の葉の順序
    pub fn leaf_order(&self) -> Vec<PaneId> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }

    /// ペインの占有率を `delta` だけ増減する
    pub fn resize(&mut self, target: PaneId, delta: f32) -> bool {
        self.root.adjust_ratio(target, delta)
    }

    /// すべての分割比率を均等に戻す
    pub fn balance(&mut self) {
        self.root.reset_ratios();
    }

    /// 指定領域内でのペイン矩形
    pub fn layout_rects(&self, area: Rect) -> Vec<(PaneId, Rect)> {
        self.layout_rects_with_dividers(area).0
    }

    /// ペイン矩形と区切り線の領域
    pub fn layout_rects_with_dividers(&self, area: Rect) -> (Vec<(PaneId, Rect)>, Vec<Rect>) {
        let mut rects = Vec::new();
        let mut dividers = Vec::new();
        self.root.layout_with_dividers(area, &mut rects, &mut dividers);
        (rects, dividers)
    }
}
