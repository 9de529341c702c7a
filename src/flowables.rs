use crate::{
    canvas::Canvas,
    fonts::FontRegistry,
    paragraph::Paragraph,
    table::{CellContent, Table},
};

/// A unit of the story, placed in the frame one after the other.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderNode {
    Paragraph(Paragraph),
    /// Vertical space, the width only matters when the spacer sits in a table cell.
    Spacer { width: f32, height: f32 },
    /// Ends the current page.
    PageBreak,
    Table(Table),
}

impl RenderNode {
    pub fn spacer(height: f32) -> Self {
        RenderNode::Spacer { width: 1.0, height }
    }

    /// The height the node takes at the given width.
    pub fn wrap(&self, available_width: f32, fonts: &FontRegistry) -> f32 {
        match self {
            RenderNode::Paragraph(paragraph) => paragraph.wrap(available_width, fonts),
            RenderNode::Spacer { height, .. } => *height,
            RenderNode::PageBreak => 0.0,
            RenderNode::Table(table) => table.wrap(fonts),
        }
    }

    /// The width the node occupies, tables keep the width of their columns.
    pub fn natural_width(&self, available_width: f32) -> f32 {
        match self {
            RenderNode::Table(table) => table.width(),
            _ => available_width,
        }
    }

    pub fn space_before(&self) -> f32 {
        match self {
            RenderNode::Paragraph(paragraph) => paragraph.style.space_before,
            _ => 0.0,
        }
    }

    pub fn space_after(&self) -> f32 {
        match self {
            RenderNode::Paragraph(paragraph) => paragraph.style.space_after,
            _ => 0.0,
        }
    }

    /// Splits the node so that the first part fits into the available height. Spacers and
    /// page breaks never split.
    pub fn split(
        &self,
        available_width: f32,
        available_height: f32,
        fonts: &FontRegistry,
    ) -> Option<(RenderNode, RenderNode)> {
        match self {
            RenderNode::Paragraph(paragraph) => paragraph
                .split(available_width, available_height, fonts)
                .map(|(first, rest)| (RenderNode::Paragraph(first), RenderNode::Paragraph(rest))),
            RenderNode::Table(table) => table
                .split(available_height, fonts)
                .map(|(first, rest)| (RenderNode::Table(first), RenderNode::Table(rest))),
            RenderNode::Spacer { .. } | RenderNode::PageBreak => None,
        }
    }

    /// Draws the node below `top`, within `[x, x + available_width]`. Tables are centered.
    pub fn draw(&self, canvas: &mut Canvas, x: f32, top: f32, available_width: f32) {
        match self {
            RenderNode::Paragraph(paragraph) => paragraph.draw(canvas, x, top, available_width),
            RenderNode::Table(table) => {
                let left = x + (available_width - table.width()) / 2.0;
                table.draw(canvas, left, top);
            }
            RenderNode::Spacer { .. } | RenderNode::PageBreak => {}
        }
    }

    /// The number of nodes nested in this one, itself included.
    pub fn node_count(&self) -> usize {
        match self {
            RenderNode::Table(table) => {
                1 + table
                    .cells()
                    .map(|cell| match cell {
                        CellContent::Text(_) => 0,
                        CellContent::Flowables(nodes) => nodes.iter().map(RenderNode::node_count).sum(),
                    })
                    .sum::<usize>()
            }
            _ => 1,
        }
    }

    /// The text of every paragraph in the node, in reading order.
    pub fn plain_text(&self) -> Vec<String> {
        match self {
            RenderNode::Paragraph(paragraph) => vec![paragraph.plain_text()],
            RenderNode::Table(table) => table
                .cells()
                .flat_map(|cell| match cell {
                    CellContent::Text(text) => vec![text.clone()],
                    CellContent::Flowables(nodes) => nodes.iter().flat_map(RenderNode::plain_text).collect(),
                })
                .collect(),
            RenderNode::Spacer { .. } | RenderNode::PageBreak => Vec::new(),
        }
    }
}

impl From<Paragraph> for RenderNode {
    fn from(paragraph: Paragraph) -> Self {
        RenderNode::Paragraph(paragraph)
    }
}

impl From<Table> for RenderNode {
    fn from(table: Table) -> Self {
        RenderNode::Table(table)
    }
}

/// The ordered sequence of nodes that makes up a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Story {
    nodes: Vec<RenderNode>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<N: Into<RenderNode>>(&mut self, node: N) {
        self.nodes.push(node.into());
    }

    pub fn extend<I: IntoIterator<Item = RenderNode>>(&mut self, nodes: I) {
        self.nodes.extend(nodes);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<RenderNode> {
        self.nodes
    }
}
