//! Grid of cells with per-cell styles, resolved from a list of commands addressed by
//! `(column, row)` ranges where negative indices count from the end.

use std::ops::Range;

use crate::{
    canvas::{Canvas, PathPaint},
    error::ContextError,
    flowables::RenderNode,
    fonts::{FontId, FontRegistry},
    style::{Alignment, Color, BLACK},
};

/// The leading of string cells, it does not follow the font size.
const STRING_CELL_LEADING: f32 = 12.0;

/// An inclusive rectangle of cells. `(-1, -1)` is the last column of the last row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl CellRange {
    pub const ALL: CellRange = CellRange::new((0, 0), (-1, -1));

    pub const fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        CellRange { start, end }
    }

    /// All of the columns of a single row.
    pub const fn row(row: i32) -> Self {
        CellRange::new((0, row), (-1, row))
    }

    /// All of the rows of a single column.
    pub const fn column(column: i32) -> Self {
        CellRange::new((column, 0), (column, -1))
    }

    pub const fn cell(column: i32, row: i32) -> Self {
        CellRange::new((column, row), (column, row))
    }

    /// The column and row ranges covered in a table of the given size, if any.
    fn resolve(&self, column_count: usize, row_count: usize) -> Option<(Range<usize>, Range<usize>)> {
        let columns = resolve_span(self.start.0, self.end.0, column_count)?;
        let rows = resolve_span(self.start.1, self.end.1, row_count)?;
        Some((columns, rows))
    }
}

fn resolve_index(index: i32, count: usize) -> i64 {
    if index < 0 {
        count as i64 + index as i64
    } else {
        index as i64
    }
}

fn resolve_span(start: i32, end: i32, count: usize) -> Option<Range<usize>> {
    let start = resolve_index(start, count).max(0);
    let end = resolve_index(end, count).min(count as i64 - 1);
    if start > end {
        return None;
    }
    Some(start as usize..end as usize + 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

/// A stroke drawn along cell edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub width: f32,
    pub color: Color,
}

impl Rule {
    pub const fn new(width: f32, color: Color) -> Self {
        Rule { width, color }
    }
}

/// One styling instruction, commands are applied in order and later ones win.
#[derive(Clone, Debug, PartialEq)]
pub enum TableCommand {
    Background(CellRange, Color),
    /// Cycles the colors over the rows of the range.
    RowBackgrounds(CellRange, Vec<Color>),
    TextColor(CellRange, Color),
    Font(CellRange, FontId),
    FontSize(CellRange, f32),
    Align(CellRange, Alignment),
    VerticalAlign(CellRange, VerticalAlignment),
    LeftPadding(CellRange, f32),
    RightPadding(CellRange, f32),
    TopPadding(CellRange, f32),
    BottomPadding(CellRange, f32),
    /// Every edge of every cell of the range.
    Grid(CellRange, Rule),
    /// The outline of the range.
    Box(CellRange, Rule),
    LineBelow(CellRange, Rule),
    /// Rounds the corners of the whole table, backgrounds are clipped to it.
    RoundedCorners(f32),
}

/// The content of a cell: a plain string, or a stack of flowables.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    Text(String),
    Flowables(Vec<RenderNode>),
}

impl From<&str> for CellContent {
    fn from(text: &str) -> Self {
        CellContent::Text(text.to_string())
    }
}

impl From<String> for CellContent {
    fn from(text: String) -> Self {
        CellContent::Text(text)
    }
}

impl From<RenderNode> for CellContent {
    fn from(node: RenderNode) -> Self {
        CellContent::Flowables(vec![node])
    }
}

impl From<Vec<RenderNode>> for CellContent {
    fn from(nodes: Vec<RenderNode>) -> Self {
        CellContent::Flowables(nodes)
    }
}

/// The resolved style of one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellStyle {
    pub background: Option<Color>,
    pub text_color: Color,
    /// `None` stands for the default face of the font registry.
    pub font: Option<FontId>,
    pub font_size: f32,
    pub alignment: Alignment,
    pub vertical_alignment: VerticalAlignment,
    pub left_padding: f32,
    pub right_padding: f32,
    pub top_padding: f32,
    pub bottom_padding: f32,
    pub top_edge: Option<Rule>,
    pub bottom_edge: Option<Rule>,
    pub left_edge: Option<Rule>,
    pub right_edge: Option<Rule>,
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle {
            background: None,
            text_color: BLACK,
            font: None,
            font_size: 10.0,
            alignment: Alignment::Left,
            vertical_alignment: VerticalAlignment::Bottom,
            left_padding: 6.0,
            right_padding: 6.0,
            top_padding: 3.0,
            bottom_padding: 3.0,
            top_edge: None,
            bottom_edge: None,
            left_edge: None,
            right_edge: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TableRow {
    cells: Vec<CellContent>,
    styles: Vec<CellStyle>,
    height: Option<f32>,
}

/// A table flowable. Tables are laid out at their own width and centered in the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    column_widths: Vec<f32>,
    rows: Vec<TableRow>,
    repeat_rows: usize,
    corner_radius: f32,
}

impl Table {
    /// Creates an unstyled table, every row must have one cell per column.
    pub fn new(data: Vec<Vec<CellContent>>, column_widths: Vec<f32>) -> Result<Self, ContextError> {
        if column_widths.is_empty() {
            return Err(ContextError::content("A table needs at least one column"));
        }
        let mut rows = Vec::with_capacity(data.len());
        for (index, cells) in data.into_iter().enumerate() {
            if cells.len() != column_widths.len() {
                return Err(ContextError::content(format!(
                    "Row {} of the table has {} cells while the table has {} columns",
                    index,
                    cells.len(),
                    column_widths.len()
                )));
            }
            rows.push(TableRow {
                styles: vec![CellStyle::default(); cells.len()],
                cells,
                height: None,
            });
        }

        Ok(Table {
            column_widths,
            rows,
            repeat_rows: 0,
            corner_radius: 0.0,
        })
    }

    /// A single row table, each cell paired with the width of its column.
    pub fn from_cells(cells: Vec<(CellContent, f32)>) -> Self {
        let (cells, column_widths): (Vec<CellContent>, Vec<f32>) = cells.into_iter().unzip();
        Table {
            rows: vec![TableRow {
                styles: vec![CellStyle::default(); cells.len()],
                cells,
                height: None,
            }],
            column_widths,
            repeat_rows: 0,
            corner_radius: 0.0,
        }
    }

    /// Fixes the height of the rows, `None` entries are measured from the content.
    pub fn with_row_heights(mut self, heights: &[Option<f32>]) -> Self {
        for (row, height) in self.rows.iter_mut().zip(heights) {
            row.height = *height;
        }
        self
    }

    /// The number of leading rows drawn again at the top of every continuation.
    pub fn with_repeat_rows(mut self, repeat_rows: usize) -> Self {
        self.repeat_rows = repeat_rows;
        self
    }

    pub fn with_style(mut self, commands: &[TableCommand]) -> Self {
        for command in commands {
            self.apply(command);
        }
        self
    }

    pub fn column_widths(&self) -> &[f32] {
        &self.column_widths
    }

    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn repeat_rows(&self) -> usize {
        self.repeat_rows
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&CellContent> {
        self.rows.get(row).and_then(|row| row.cells.get(column))
    }

    pub fn cell_style(&self, column: usize, row: usize) -> Option<&CellStyle> {
        self.rows.get(row).and_then(|row| row.styles.get(column))
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellContent> {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }

    fn apply(&mut self, command: &TableCommand) {
        let range = match command {
            TableCommand::RoundedCorners(radius) => {
                self.corner_radius = *radius;
                return;
            }
            TableCommand::Background(range, _)
            | TableCommand::RowBackgrounds(range, _)
            | TableCommand::TextColor(range, _)
            | TableCommand::Font(range, _)
            | TableCommand::FontSize(range, _)
            | TableCommand::Align(range, _)
            | TableCommand::VerticalAlign(range, _)
            | TableCommand::LeftPadding(range, _)
            | TableCommand::RightPadding(range, _)
            | TableCommand::TopPadding(range, _)
            | TableCommand::BottomPadding(range, _)
            | TableCommand::Grid(range, _)
            | TableCommand::Box(range, _)
            | TableCommand::LineBelow(range, _) => range,
        };
        let Some((columns, rows)) = range.resolve(self.column_widths.len(), self.rows.len()) else {
            log::debug!("The table command {:?} addresses no cell", command);
            return;
        };

        for row in rows.clone() {
            for column in columns.clone() {
                let style = &mut self.rows[row].styles[column];
                match command {
                    TableCommand::Background(_, color) => style.background = Some(*color),
                    TableCommand::RowBackgrounds(_, colors) => {
                        if !colors.is_empty() {
                            style.background = Some(colors[(row - rows.start) % colors.len()]);
                        }
                    }
                    TableCommand::TextColor(_, color) => style.text_color = *color,
                    TableCommand::Font(_, font) => style.font = Some(*font),
                    TableCommand::FontSize(_, size) => style.font_size = *size,
                    TableCommand::Align(_, alignment) => style.alignment = *alignment,
                    TableCommand::VerticalAlign(_, alignment) => {
                        style.vertical_alignment = *alignment
                    }
                    TableCommand::LeftPadding(_, padding) => style.left_padding = *padding,
                    TableCommand::RightPadding(_, padding) => style.right_padding = *padding,
                    TableCommand::TopPadding(_, padding) => style.top_padding = *padding,
                    TableCommand::BottomPadding(_, padding) => style.bottom_padding = *padding,
                    TableCommand::Grid(_, rule) => {
                        style.top_edge = Some(*rule);
                        style.bottom_edge = Some(*rule);
                        style.left_edge = Some(*rule);
                        style.right_edge = Some(*rule);
                    }
                    TableCommand::Box(_, rule) => {
                        if row == rows.start {
                            style.top_edge = Some(*rule);
                        }
                        if row + 1 == rows.end {
                            style.bottom_edge = Some(*rule);
                        }
                        if column == columns.start {
                            style.left_edge = Some(*rule);
                        }
                        if column + 1 == columns.end {
                            style.right_edge = Some(*rule);
                        }
                    }
                    TableCommand::LineBelow(_, rule) => style.bottom_edge = Some(*rule),
                    TableCommand::RoundedCorners(_) => {}
                }
            }
        }
    }

    fn content_height(content: &CellContent, style: &CellStyle, inner_width: f32, fonts: &FontRegistry) -> f32 {
        let content_height = match content {
            CellContent::Text(text) => text.split('\n').count() as f32 * STRING_CELL_LEADING,
            CellContent::Flowables(nodes) => stack_height(nodes, inner_width, fonts),
        };
        content_height + style.top_padding + style.bottom_padding
    }

    /// The height of every row, fixed or measured from the tallest cell.
    pub fn row_heights(&self, fonts: &FontRegistry) -> Vec<f32> {
        self.rows
            .iter()
            .map(|row| {
                row.height.unwrap_or_else(|| {
                    row.cells
                        .iter()
                        .zip(row.styles.iter())
                        .zip(self.column_widths.iter())
                        .map(|((content, style), width)| {
                            let inner_width = width - style.left_padding - style.right_padding;
                            Self::content_height(content, style, inner_width, fonts)
                        })
                        .fold(0.0, f32::max)
                })
            })
            .collect()
    }

    pub fn wrap(&self, fonts: &FontRegistry) -> f32 {
        self.row_heights(fonts).iter().sum()
    }

    /// Splits between two rows, the repeated header rows start the second part again.
    pub fn split(&self, available_height: f32, fonts: &FontRegistry) -> Option<(Table, Table)> {
        let heights = self.row_heights(fonts);
        let header_rows = self.repeat_rows.min(self.rows.len());

        let mut used = 0.0;
        let mut fitting_rows = 0;
        for height in heights.iter() {
            if used + height > available_height + 1e-3 {
                break;
            }
            used += height;
            fitting_rows += 1;
        }
        if fitting_rows <= header_rows || fitting_rows >= self.rows.len() {
            return None;
        }

        let first = Table {
            rows: self.rows[..fitting_rows].to_vec(),
            ..self.clone()
        };
        let rest = Table {
            rows: self.rows[..header_rows]
                .iter()
                .chain(self.rows[fitting_rows..].iter())
                .cloned()
                .collect(),
            ..self.clone()
        };
        Some((first, rest))
    }

    /// Draws the table with its top left corner at `(x, top)`.
    pub fn draw(&self, canvas: &mut Canvas, x: f32, top: f32) {
        let fonts = canvas.fonts();
        let heights = self.row_heights(fonts);
        let total_height: f32 = heights.iter().sum();
        let total_width = self.width();
        let bottom = top - total_height;
        let rounded = self.corner_radius > 0.0;

        let mut row_tops = Vec::with_capacity(heights.len());
        let mut y = top;
        for height in heights.iter() {
            row_tops.push(y);
            y -= height;
        }
        let column_lefts: Vec<f32> = self
            .column_widths
            .iter()
            .scan(x, |left, width| {
                let column_left = *left;
                *left += width;
                Some(column_left)
            })
            .collect();

        canvas.save_state();
        if rounded {
            canvas.clip_round_rect(x, bottom, total_width, total_height, self.corner_radius);
        }
        for (row_index, row) in self.rows.iter().enumerate() {
            for (column_index, style) in row.styles.iter().enumerate() {
                if let Some(background) = style.background {
                    canvas.set_fill_color(background);
                    canvas.rect(
                        column_lefts[column_index],
                        row_tops[row_index] - heights[row_index],
                        self.column_widths[column_index],
                        heights[row_index],
                        PathPaint::Fill,
                    );
                }
            }
        }
        canvas.restore_state();

        for (row_index, row) in self.rows.iter().enumerate() {
            for (column_index, (content, style)) in row.cells.iter().zip(row.styles.iter()).enumerate() {
                let cell = CellFrame {
                    left: column_lefts[column_index],
                    top: row_tops[row_index],
                    width: self.column_widths[column_index],
                    height: heights[row_index],
                };
                draw_cell_content(canvas, content, style, &cell);
            }
        }

        canvas.save_state();
        for (row_index, row) in self.rows.iter().enumerate() {
            for (column_index, style) in row.styles.iter().enumerate() {
                let left = column_lefts[column_index];
                let right = left + self.column_widths[column_index];
                let cell_top = row_tops[row_index];
                let cell_bottom = cell_top - heights[row_index];
                let is_outer = |edge_on_border: bool| rounded && edge_on_border;

                let edges = [
                    (style.top_edge, row_index == 0, (left, cell_top, right, cell_top)),
                    (style.bottom_edge, row_index + 1 == self.rows.len(), (left, cell_bottom, right, cell_bottom)),
                    (style.left_edge, column_index == 0, (left, cell_bottom, left, cell_top)),
                    (style.right_edge, column_index + 1 == self.column_widths.len(), (right, cell_bottom, right, cell_top)),
                ];
                for (rule, on_border, (x1, y1, x2, y2)) in edges {
                    if let (Some(rule), false) = (rule, is_outer(on_border)) {
                        canvas.set_stroke_color(rule.color);
                        canvas.set_line_width(rule.width);
                        canvas.line(x1, y1, x2, y2);
                    }
                }
            }
        }
        // The outline of a rounded table follows its corners
        if let Some(rule) = self.outline_rule().filter(|_| rounded) {
            canvas.set_stroke_color(rule.color);
            canvas.set_line_width(rule.width);
            canvas.round_rect(x, bottom, total_width, total_height, self.corner_radius, PathPaint::Stroke);
        }
        canvas.restore_state();
    }

    fn outline_rule(&self) -> Option<Rule> {
        self.rows
            .first()
            .and_then(|row| row.styles.first())
            .and_then(|style| style.top_edge.or(style.left_edge))
    }
}

/// Vertical extent of a stack of flowables, the spacing between two of them is the space
/// after the first plus the space before the second.
pub(crate) fn stack_height(nodes: &[RenderNode], available_width: f32, fonts: &FontRegistry) -> f32 {
    let mut height = 0.0;
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            height += nodes[index - 1].space_after() + node.space_before();
        }
        height += node.wrap(available_width, fonts);
    }
    height
}

struct CellFrame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

fn draw_cell_content(canvas: &mut Canvas, content: &CellContent, style: &CellStyle, cell: &CellFrame) {
    let fonts = canvas.fonts();
    let cell_bottom = cell.top - cell.height;
    let inner_left = cell.left + style.left_padding;
    let inner_width = cell.width - style.left_padding - style.right_padding;

    match content {
        CellContent::Text(text) => {
            let font_id = style.font.unwrap_or_else(|| fonts.default_font());
            let lines: Vec<&str> = text.split('\n').collect();
            let block_height = lines.len() as f32 * STRING_CELL_LEADING;
            let first_baseline = match style.vertical_alignment {
                VerticalAlignment::Bottom => cell_bottom + style.bottom_padding + block_height - style.font_size,
                VerticalAlignment::Top => cell.top - style.top_padding - style.font_size,
                VerticalAlignment::Middle => {
                    cell_bottom
                        + (style.bottom_padding + cell.height - style.top_padding + block_height) / 2.0
                        - style.font_size
                }
            };

            canvas.save_state();
            canvas.set_fill_color(style.text_color);
            canvas.set_font(font_id, style.font_size);
            for (index, line) in lines.iter().enumerate() {
                let baseline = first_baseline - index as f32 * STRING_CELL_LEADING;
                match style.alignment {
                    Alignment::Center => canvas.draw_centred_string(
                        cell.left + (cell.width + style.left_padding - style.right_padding) / 2.0,
                        baseline,
                        line,
                    ),
                    Alignment::Right => {
                        canvas.draw_right_string(cell.left + cell.width - style.right_padding, baseline, line)
                    }
                    Alignment::Left | Alignment::Justify => canvas.draw_string(inner_left, baseline, line),
                }
            }
            canvas.restore_state();
        }
        CellContent::Flowables(nodes) => {
            let block_height = stack_height(nodes, inner_width, fonts);
            let mut y = match style.vertical_alignment {
                VerticalAlignment::Bottom => cell_bottom + style.bottom_padding + block_height,
                VerticalAlignment::Top => cell.top - style.top_padding,
                VerticalAlignment::Middle => {
                    cell_bottom + (style.bottom_padding + cell.height - style.top_padding + block_height) / 2.0
                }
            };
            for (index, node) in nodes.iter().enumerate() {
                if index > 0 {
                    y -= nodes[index - 1].space_after() + node.space_before();
                }
                let node_width = node.natural_width(inner_width);
                let node_left = match style.alignment {
                    Alignment::Center => inner_left + (inner_width - node_width) / 2.0,
                    Alignment::Right => inner_left + inner_width - node_width,
                    Alignment::Left | Alignment::Justify => inner_left,
                };
                node.draw(canvas, node_left, y, node_width);
                y -= node.wrap(inner_width, fonts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        paragraph::Paragraph,
        style::{Script, StyleName, StyleRegistry, MANDARIN, WHITE},
    };

    fn data(rows: usize, columns: usize) -> Vec<Vec<CellContent>> {
        (0..rows)
            .map(|row| (0..columns).map(|column| format!("r{}c{}", row, column).into()).collect())
            .collect()
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(CellRange::ALL.resolve(3, 4), Some((0..3, 0..4)));
        assert_eq!(CellRange::row(-1).resolve(3, 4), Some((0..3, 3..4)));
        assert_eq!(CellRange::new((0, 1), (-1, -1)).resolve(2, 1), None);
        assert_eq!(CellRange::cell(0, 5).resolve(2, 10), Some((0..1, 5..6)));
    }

    #[test]
    fn rows_with_the_wrong_cell_count_are_rejected() {
        let mut rows = data(3, 2);
        rows[1].pop();
        assert!(Table::new(rows, vec![50.0, 50.0]).is_err());
        assert!(Table::new(data(1, 1), vec![]).is_err());
    }

    #[test]
    fn later_commands_override_earlier_ones() {
        let table = Table::new(data(8, 2), vec![50.0, 50.0])
            .unwrap()
            .with_style(&[
                TableCommand::Background(CellRange::row(0), MANDARIN),
                TableCommand::RowBackgrounds(CellRange::new((0, 1), (-1, -1)), vec![WHITE, BLACK]),
                TableCommand::Background(CellRange::cell(0, 5), Color::from_rgb(0xFF, 0xF3, 0xE0)),
            ]);

        assert_eq!(table.cell_style(1, 0).unwrap().background, Some(MANDARIN));
        assert_eq!(table.cell_style(1, 1).unwrap().background, Some(WHITE));
        assert_eq!(table.cell_style(1, 2).unwrap().background, Some(BLACK));
        assert_eq!(
            table.cell_style(0, 5).unwrap().background,
            Some(Color::from_rgb(0xFF, 0xF3, 0xE0))
        );
        assert_eq!(table.cell_style(1, 5).unwrap().background, Some(WHITE));
    }

    #[test]
    fn boxes_only_set_the_outer_edges() {
        let rule = Rule::new(1.0, MANDARIN);
        let table = Table::new(data(2, 2), vec![50.0, 50.0])
            .unwrap()
            .with_style(&[TableCommand::Box(CellRange::ALL, rule)]);

        let top_left = table.cell_style(0, 0).unwrap();
        assert_eq!(top_left.top_edge, Some(rule));
        assert_eq!(top_left.left_edge, Some(rule));
        assert_eq!(top_left.right_edge, None);
        assert_eq!(top_left.bottom_edge, None);
        assert_eq!(table.cell_style(1, 1).unwrap().bottom_edge, Some(rule));
    }

    #[test]
    fn string_rows_are_measured_with_their_padding() {
        let fonts = FontRegistry::new();
        let table = Table::new(vec![vec!["one\ntwo".into(), "x".into()]], vec![50.0, 50.0])
            .unwrap()
            .with_style(&[TableCommand::TopPadding(CellRange::ALL, 5.0)]);

        similar_asserts::assert_eq!(table.row_heights(&fonts), vec![2.0 * 12.0 + 5.0 + 3.0]);
        let fixed = table.with_row_heights(&[Some(24.0)]);
        assert_eq!(fixed.wrap(&fonts), 24.0);
    }

    #[test]
    fn the_font_size_leaves_the_string_leading_unchanged() {
        let fonts = FontRegistry::new();
        let rows = || vec![vec!["one\ntwo\nthree".into()]];
        let default_size = Table::new(rows(), vec![100.0]).unwrap();
        let small_size = Table::new(rows(), vec![100.0])
            .unwrap()
            .with_style(&[TableCommand::FontSize(CellRange::ALL, 8.5)]);

        similar_asserts::assert_eq!(default_size.row_heights(&fonts), vec![3.0 * 12.0 + 3.0 + 3.0]);
        similar_asserts::assert_eq!(small_size.row_heights(&fonts), default_size.row_heights(&fonts));
    }

    #[test]
    fn flowable_cells_are_measured_from_their_stack() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let title = Paragraph::new("Log in", styles.get(StyleName::StepTitle));
        let description = Paragraph::new("Open the dashboard", styles.get(StyleName::StepDescription));
        let table = Table::new(
            vec![vec![vec![RenderNode::Paragraph(title), RenderNode::Paragraph(description)].into()]],
            vec![300.0],
        )
        .unwrap();

        similar_asserts::assert_eq!(table.row_heights(&fonts), vec![15.0 + 13.0 + 6.0]);
    }

    #[test]
    fn split_tables_repeat_their_header() {
        let fonts = FontRegistry::new();
        let table = Table::new(data(10, 2), vec![50.0, 50.0]).unwrap().with_repeat_rows(1);
        // Every row is 18 points high
        let (first, rest) = table.split(18.0 * 4.0, &fonts).unwrap();

        assert_eq!(first.row_count(), 4);
        assert_eq!(rest.row_count(), 7);
        assert_eq!(rest.cell(0, 0), Some(&CellContent::from("r0c0")));
        assert_eq!(rest.cell(0, 1), Some(&CellContent::from("r4c0")));
        assert!(table.split(18.0, &fonts).is_none());
        assert!(table.split(18.0 * 20.0, &fonts).is_none());
    }

    #[test]
    fn rounded_tables_clip_their_background() {
        let fonts = FontRegistry::new();
        let table = Table::new(data(1, 1), vec![100.0])
            .unwrap()
            .with_style(&[
                TableCommand::Background(CellRange::ALL, MANDARIN),
                TableCommand::Box(CellRange::ALL, Rule::new(1.0, MANDARIN)),
                TableCommand::RoundedCorners(4.0),
            ]);
        let mut canvas = Canvas::new(&fonts, 200.0, 200.0);
        table.draw(&mut canvas, 10.0, 100.0);

        let operators: Vec<&str> = canvas
            .operations()
            .iter()
            .map(|operation| operation.operator.as_str())
            .collect();
        let clip = operators.iter().position(|operator| *operator == "W").unwrap();
        let fill = operators.iter().position(|operator| *operator == "f").unwrap();
        assert!(clip < fill);
        // No straight edges, only the rounded outline
        assert_eq!(operators.iter().filter(|operator| **operator == "S").count(), 1);
    }
}
