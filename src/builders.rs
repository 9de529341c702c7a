//! The styled blocks the guides are made of: callouts, numbered steps, data tables and
//! table of contents rows. Each builder returns a finished node owning its children.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::ContextError,
    flowables::RenderNode,
    guide::CalloutLabels,
    paragraph::Paragraph,
    pdf::{centimeters_to_points, A4_WIDTH},
    style::{
        Alignment, Color, StyleName, StyleRegistry, BODY_TEXT, BORDER_COLOR, COD_GRAY, LIGHT_BG,
        MANDARIN, SECTION_BG, WHITE,
    },
    table::{CellContent, CellRange, Rule, Table, TableCommand, VerticalAlignment},
};

/// Width between the 2cm side margins of an A4 page.
pub fn printable_width() -> f32 {
    A4_WIDTH - centimeters_to_points(4.0)
}

/// Width of the text column of the numbered steps and of the table of contents rows.
fn content_column_width() -> f32 {
    A4_WIDTH - centimeters_to_points(4.5)
}

/// The palette of a callout box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Tip,
    #[serde(alias = "warn")]
    Warning,
    Info,
}

impl TipKind {
    /// Background color, border color and text style.
    pub fn palette(&self) -> (Color, Color, StyleName) {
        match self {
            TipKind::Tip => (
                Color::from_rgb(0xE8, 0xF5, 0xE9),
                Color::from_rgb(0x4C, 0xAF, 0x50),
                StyleName::TipText,
            ),
            TipKind::Warning => (
                Color::from_rgb(0xFF, 0xF8, 0xE1),
                Color::from_rgb(0xFF, 0x98, 0x00),
                StyleName::WarnText,
            ),
            TipKind::Info => (
                Color::from_rgb(0xE3, 0xF2, 0xFD),
                Color::from_rgb(0x21, 0x96, 0xF3),
                StyleName::InfoText,
            ),
        }
    }
}

impl FromStr for TipKind {
    type Err = ContextError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "tip" => Ok(TipKind::Tip),
            "warning" | "warn" => Ok(TipKind::Warning),
            "info" => Ok(TipKind::Info),
            _ => Err(ContextError::content(format!("Unknown callout kind {:?}", kind))),
        }
    }
}

/// Background of the header row of a reference table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    Dark,
    Accent,
}

/// How the first column of a reference table stands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstColumn {
    /// Bold, in the accent color.
    Accent,
    Bold,
    Plain,
}

/// The builders of one document, bound to its styles and to the labels of its language.
pub struct BoxBuilder<'a> {
    styles: &'a StyleRegistry,
    labels: &'a CalloutLabels,
}

impl<'a> BoxBuilder<'a> {
    pub fn new(styles: &'a StyleRegistry, labels: &'a CalloutLabels) -> Self {
        BoxBuilder { styles, labels }
    }

    pub fn styles(&self) -> &StyleRegistry {
        self.styles
    }

    fn paragraph(&self, text: &str, style: StyleName) -> RenderNode {
        RenderNode::Paragraph(Paragraph::new(text, self.styles.get(style)))
    }

    /// A rounded callout with the label of its kind in bold before the text.
    pub fn make_tip_box(&self, text: &str, kind: TipKind) -> RenderNode {
        let (background, border, style) = kind.palette();
        let label = self.labels.label(kind);
        let content = self.paragraph(&format!("<b>{}</b> {}", label, text), style);

        Table::from_cells(vec![(content.into(), printable_width())])
            .with_style(&[
                TableCommand::Background(CellRange::ALL, background),
                TableCommand::Box(CellRange::ALL, Rule::new(1.0, border)),
                TableCommand::LeftPadding(CellRange::ALL, 14.0),
                TableCommand::RightPadding(CellRange::ALL, 14.0),
                TableCommand::TopPadding(CellRange::ALL, 10.0),
                TableCommand::BottomPadding(CellRange::ALL, 10.0),
                TableCommand::RoundedCorners(4.0),
            ])
            .into()
    }

    /// A round badge with the number, next to the title and the optional description.
    pub fn make_numbered_step(&self, number: u32, title: &str, description: &str) -> RenderNode {
        let badge = Table::from_cells(vec![(
            self.paragraph(&number.to_string(), StyleName::StepNumber).into(),
            24.0,
        )])
        .with_row_heights(&[Some(24.0)])
        .with_style(&[
            TableCommand::Background(CellRange::ALL, MANDARIN),
            TableCommand::Align(CellRange::ALL, Alignment::Center),
            TableCommand::VerticalAlign(CellRange::ALL, VerticalAlignment::Middle),
            TableCommand::RoundedCorners(12.0),
        ]);

        let mut content = vec![self.paragraph(title, StyleName::StepTitle)];
        if !description.trim().is_empty() {
            content.push(self.paragraph(description, StyleName::StepDescription));
        }

        Table::from_cells(vec![
            (RenderNode::Table(badge).into(), 34.0),
            (content.into(), content_column_width()),
        ])
        .with_style(&[
            TableCommand::VerticalAlign(CellRange::ALL, VerticalAlignment::Top),
            TableCommand::LeftPadding(CellRange::cell(0, 0), 0.0),
            TableCommand::LeftPadding(CellRange::cell(1, 0), 8.0),
            TableCommand::TopPadding(CellRange::ALL, 4.0),
            TableCommand::BottomPadding(CellRange::ALL, 6.0),
        ])
        .into()
    }

    /// A header row followed by the data rows, as string cells.
    fn string_table(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        column_widths: Vec<f32>,
    ) -> Result<Table, ContextError> {
        let data = std::iter::once(header)
            .chain(rows.iter().map(Vec::as_slice))
            .map(|row| row.iter().map(|cell| CellContent::from(cell.as_str())).collect())
            .collect();
        Table::new(data, column_widths)
    }

    /// The commands shared by the data tables: a grid and alternating body rows.
    fn data_table_commands(&self) -> Vec<TableCommand> {
        vec![
            TableCommand::Grid(CellRange::ALL, Rule::new(0.5, BORDER_COLOR)),
            TableCommand::RowBackgrounds(CellRange::new((0, 1), (-1, -1)), vec![WHITE, LIGHT_BG]),
        ]
    }

    fn padding_commands(horizontal: f32, vertical: f32) -> [TableCommand; 4] {
        [
            TableCommand::LeftPadding(CellRange::ALL, horizontal),
            TableCommand::RightPadding(CellRange::ALL, horizontal),
            TableCommand::TopPadding(CellRange::ALL, vertical),
            TableCommand::BottomPadding(CellRange::ALL, vertical),
        ]
    }

    /// A data table with an accent header repeated on every page. Without column widths
    /// the printable width is shared evenly.
    pub fn make_table(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        column_widths: Option<&[f32]>,
    ) -> Result<RenderNode, ContextError> {
        Ok(self.accent_table(header, rows, column_widths, 9.0)?.into())
    }

    fn accent_table(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        column_widths: Option<&[f32]>,
        body_size: f32,
    ) -> Result<Table, ContextError> {
        let column_widths = match column_widths {
            Some(widths) => widths.to_vec(),
            None if header.is_empty() => Vec::new(),
            None => vec![(printable_width() / header.len() as f32).floor(); header.len()],
        };
        let fonts = self.styles.table_fonts;
        let body = CellRange::new((0, 1), (-1, -1));

        let mut commands = vec![
            TableCommand::Background(CellRange::row(0), MANDARIN),
            TableCommand::TextColor(CellRange::row(0), WHITE),
            TableCommand::Font(CellRange::row(0), fonts.header),
            TableCommand::FontSize(CellRange::row(0), 9.0),
            TableCommand::Font(body, fonts.body),
            TableCommand::FontSize(body, body_size),
            TableCommand::TextColor(body, BODY_TEXT),
        ];
        commands.extend(self.data_table_commands());
        commands.extend(Self::padding_commands(6.0, 5.0));
        commands.push(TableCommand::VerticalAlign(CellRange::ALL, VerticalAlignment::Middle));

        Ok(self
            .string_table(header, rows, column_widths)?
            .with_repeat_rows(1)
            .with_style(&commands))
    }

    /// The table of the order workflow, with a centered step column and the purchase and
    /// reception rows highlighted.
    pub fn make_status_table(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        column_widths: &[f32],
    ) -> Result<RenderNode, ContextError> {
        Ok(self
            .accent_table(header, rows, Some(column_widths), 8.5)?
            .with_style(&[
                TableCommand::Align(CellRange::column(0), Alignment::Center),
                TableCommand::Background(CellRange::cell(0, 5), Color::from_rgb(0xFF, 0xF3, 0xE0)),
                TableCommand::Background(CellRange::cell(0, 6), Color::from_rgb(0xF1, 0xF8, 0xE9)),
            ])
            .into())
    }

    /// The quick reference of common actions, with the action names in the accent color.
    pub fn make_shortcut_table(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        column_widths: &[f32],
    ) -> Result<RenderNode, ContextError> {
        let fonts = self.styles.table_fonts;
        let mut commands = vec![
            TableCommand::Background(CellRange::row(0), COD_GRAY),
            TableCommand::TextColor(CellRange::row(0), WHITE),
            TableCommand::Font(CellRange::row(0), fonts.header),
            TableCommand::FontSize(CellRange::row(0), 10.0),
            TableCommand::Font(CellRange::new((0, 1), (-1, -1)), fonts.body),
            TableCommand::FontSize(CellRange::new((0, 1), (-1, -1)), 9.5),
            TableCommand::Font(CellRange::new((0, 1), (0, -1)), fonts.emphasis),
            TableCommand::TextColor(CellRange::new((0, 1), (0, -1)), MANDARIN),
        ];
        commands.extend(self.data_table_commands());
        commands.extend(Self::padding_commands(10.0, 7.0));
        commands.push(TableCommand::VerticalAlign(CellRange::ALL, VerticalAlignment::Middle));

        Ok(self
            .string_table(header, rows, column_widths.to_vec())?
            .with_style(&commands)
            .into())
    }

    /// The smaller lookup tables of the collaborator guides: dashboard indicators, document
    /// types and vehicle statuses.
    pub fn make_reference_table(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        column_widths: &[f32],
        header_style: HeaderStyle,
        font_size: f32,
        first_column: FirstColumn,
    ) -> Result<RenderNode, ContextError> {
        let fonts = self.styles.table_fonts;
        let header_background = match header_style {
            HeaderStyle::Dark => COD_GRAY,
            HeaderStyle::Accent => MANDARIN,
        };
        let first_column_range = CellRange::new((0, 1), (0, -1));

        let mut commands = vec![
            TableCommand::Background(CellRange::row(0), header_background),
            TableCommand::TextColor(CellRange::row(0), WHITE),
            TableCommand::Font(CellRange::new((0, 1), (-1, -1)), fonts.body),
            TableCommand::Font(CellRange::row(0), fonts.header),
            TableCommand::FontSize(CellRange::ALL, font_size),
        ];
        match first_column {
            FirstColumn::Accent => {
                commands.push(TableCommand::Font(first_column_range, fonts.emphasis));
                commands.push(TableCommand::TextColor(first_column_range, MANDARIN));
            }
            FirstColumn::Bold => commands.push(TableCommand::Font(first_column_range, fonts.emphasis)),
            FirstColumn::Plain => {}
        }
        commands.extend(self.data_table_commands());
        commands.push(TableCommand::LeftPadding(CellRange::ALL, 8.0));
        commands.push(TableCommand::TopPadding(CellRange::ALL, 6.0));
        commands.push(TableCommand::BottomPadding(CellRange::ALL, 6.0));
        if first_column == FirstColumn::Accent {
            commands.push(TableCommand::VerticalAlign(CellRange::ALL, VerticalAlignment::Middle));
        }

        Ok(self
            .string_table(header, rows, column_widths.to_vec())?
            .with_style(&commands)
            .into())
    }

    /// One entry of the table of contents, underlined by a thin rule.
    pub fn make_toc_row(&self, number: &str, title: &str) -> RenderNode {
        Table::from_cells(vec![
            (self.paragraph(&format!("<b>{}</b>", number), StyleName::TocNumber).into(), 30.0),
            (self.paragraph(title, StyleName::TocItem).into(), content_column_width()),
        ])
        .with_style(&[
            TableCommand::VerticalAlign(CellRange::ALL, VerticalAlignment::Middle),
            TableCommand::BottomPadding(CellRange::ALL, 2.0),
            TableCommand::TopPadding(CellRange::ALL, 2.0),
            TableCommand::LineBelow(CellRange::ALL, Rule::new(0.3, Color::from_rgb(0xEE, 0xEE, 0xEE))),
        ])
        .into()
    }

    /// A square box in arbitrary colors, for notes that do not fit the callout palettes.
    pub fn make_callout(&self, text: &str, background: Color, border: Color) -> RenderNode {
        Table::from_cells(vec![(
            self.paragraph(text, StyleName::BoxText).into(),
            printable_width(),
        )])
        .with_style(&[
            TableCommand::Background(CellRange::ALL, background),
            TableCommand::Box(CellRange::ALL, Rule::new(1.0, border)),
            TableCommand::LeftPadding(CellRange::ALL, 14.0),
            TableCommand::RightPadding(CellRange::ALL, 14.0),
            TableCommand::TopPadding(CellRange::ALL, 10.0),
            TableCommand::BottomPadding(CellRange::ALL, 10.0),
        ])
        .into()
    }

    /// The centered box ending every guide.
    pub fn make_closing_box(&self, text: &str) -> RenderNode {
        Table::from_cells(vec![(
            self.paragraph(text, StyleName::Final).into(),
            printable_width(),
        )])
        .with_style(&[
            TableCommand::Background(CellRange::ALL, SECTION_BG),
            TableCommand::Box(CellRange::ALL, Rule::new(1.5, MANDARIN)),
            TableCommand::LeftPadding(CellRange::ALL, 20.0),
            TableCommand::RightPadding(CellRange::ALL, 20.0),
            TableCommand::TopPadding(CellRange::ALL, 16.0),
            TableCommand::BottomPadding(CellRange::ALL, 16.0),
            TableCommand::RoundedCorners(6.0),
        ])
        .into()
    }

    pub fn make_bullet(&self, text: &str) -> RenderNode {
        self.paragraph(&format!("&bull; {}", text), StyleName::Bullet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fonts::{CjkFontSource, FontRegistry},
        style::Script,
    };

    fn labels() -> CalloutLabels {
        CalloutLabels {
            tip: "TIP:".into(),
            warning: "IMPORTANT:".into(),
            info: "INFO:".into(),
        }
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn table(node: &RenderNode) -> &Table {
        match node {
            RenderNode::Table(table) => table,
            other => panic!("expected a table, found {:?}", other),
        }
    }

    #[test]
    fn warning_boxes_use_the_warning_palette() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        for text in ["x", "A much longer <b>warning</b> text"] {
            let node = builder.make_tip_box(text, "warn".parse().unwrap());
            let style = table(&node).cell_style(0, 0).unwrap();
            assert_eq!(style.background, Some(Color::from_hex("#FFF8E1").unwrap()));
            assert_eq!(
                style.top_edge.map(|rule| rule.color),
                Some(Color::from_hex("#FF9800").unwrap())
            );
            assert_eq!(table(&node).corner_radius(), 4.0);
        }
        similar_asserts::assert_eq!(
            builder.make_tip_box("x", TipKind::Warning).plain_text(),
            vec!["IMPORTANT: x"]
        );
        assert!("danger".parse::<TipKind>().is_err());
    }

    #[test]
    fn steps_without_description_have_one_node_less() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        let with_description = builder.make_numbered_step(3, "Open the order", "Click the order number");
        let without_description = builder.make_numbered_step(3, "Open the order", "");
        assert_eq!(
            with_description.node_count(),
            without_description.node_count() + 1
        );
        similar_asserts::assert_eq!(without_description.plain_text(), vec!["3", "Open the order"]);
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        let header = strings(&["Role", "Access", "Description"]);
        let rows = vec![strings(&["User", "Public site"])];
        assert!(builder.make_table(&header, &rows, None).is_err());
        assert!(builder
            .make_table(&header, &[strings(&["User", "Public site", "Client"])], Some(&[100.0, 100.0][..]))
            .is_err());
    }

    #[test]
    fn columns_share_the_printable_width_by_default() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        let node = builder
            .make_table(&strings(&["A", "B", "C"]), &[strings(&["1", "2", "3"])], None)
            .unwrap();
        let expected = (printable_width() / 3.0).floor();
        similar_asserts::assert_eq!(table(&node).column_widths(), &[expected, expected, expected]);
        assert_eq!(table(&node).repeat_rows(), 1);
    }

    #[test]
    fn status_tables_highlight_the_purchase_and_reception_rows() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        let rows: Vec<Vec<String>> = (1..=14)
            .map(|step| vec![step.to_string(), "Status".into(), "Docs".into(), "Action".into()])
            .collect();
        let node = builder
            .make_status_table(&strings(&["Step", "Status", "Documents", "Action"]), &rows, &[35.0, 95.0, 140.0, 195.0])
            .unwrap();
        let status_table = table(&node);

        assert_eq!(status_table.row_count(), 15);
        assert_eq!(
            status_table.cell_style(0, 5).unwrap().background,
            Some(Color::from_rgb(0xFF, 0xF3, 0xE0))
        );
        assert_eq!(status_table.cell_style(1, 5).unwrap().background, Some(WHITE));
        assert_eq!(status_table.cell_style(1, 6).unwrap().background, Some(LIGHT_BG));
        assert_eq!(status_table.cell_style(0, 3).unwrap().alignment, Alignment::Center);
        assert_eq!(status_table.cell_style(1, 3).unwrap().font_size, 8.5);
    }

    #[test]
    fn cjk_tables_set_every_cell_in_the_cjk_face() {
        let mut fonts = FontRegistry::new();
        let cjk = fonts.register_cjk(&CjkFontSource::default()).unwrap();
        let styles = StyleRegistry::new(&fonts, Script::Cjk(cjk)).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        let node = builder
            .make_shortcut_table(
                &strings(&["\u{64cd}\u{4f5c}", "\u{65b9}\u{6cd5}"]),
                &[strings(&["\u{8054}\u{7cfb}", "WhatsApp"])],
                &[120.0, 345.0],
            )
            .unwrap();
        let shortcut_table = table(&node);
        for (column, row) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(shortcut_table.cell_style(column, row).unwrap().font, Some(cjk));
        }
        assert_eq!(shortcut_table.cell_style(0, 1).unwrap().text_color, MANDARIN);
    }

    #[test]
    fn reference_tables_follow_their_options() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);
        let header = strings(&["Status", "Meaning"]);
        let rows = vec![strings(&["Pending", "Awaiting approval"])];

        let dark = builder
            .make_reference_table(&header, &rows, &[100.0, 365.0], HeaderStyle::Dark, 10.0, FirstColumn::Bold)
            .unwrap();
        let dark = table(&dark);
        assert_eq!(dark.cell_style(0, 0).unwrap().background, Some(COD_GRAY));
        assert_eq!(dark.cell_style(0, 1).unwrap().font, Some(fonts.lookup("Helvetica-Bold").unwrap()));
        assert_eq!(dark.cell_style(0, 1).unwrap().text_color, crate::style::BLACK);
        assert_eq!(dark.cell_style(1, 1).unwrap().right_padding, 6.0);
        assert_eq!(dark.cell_style(1, 1).unwrap().vertical_alignment, VerticalAlignment::Bottom);

        let accent = builder
            .make_reference_table(&header, &rows, &[175.0, 290.0], HeaderStyle::Accent, 9.5, FirstColumn::Accent)
            .unwrap();
        let accent = table(&accent);
        assert_eq!(accent.cell_style(1, 0).unwrap().background, Some(MANDARIN));
        assert_eq!(accent.cell_style(0, 1).unwrap().text_color, MANDARIN);
        assert_eq!(accent.cell_style(1, 1).unwrap().font_size, 9.5);
    }

    #[test]
    fn toc_rows_and_bullets_carry_their_markup() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let labels = labels();
        let builder = BoxBuilder::new(&styles, &labels);

        let row = builder.make_toc_row("1.", "Login and Roles");
        similar_asserts::assert_eq!(row.plain_text(), vec!["1.", "Login and Roles"]);
        assert!(table(&row).cell_style(1, 0).unwrap().bottom_edge.is_some());

        similar_asserts::assert_eq!(
            builder.make_bullet("<b>Order number</b>").plain_text(),
            vec!["\u{2022} Order number"]
        );
        let closing = builder.make_closing_box("Need help?");
        assert_eq!(table(&closing).cell_style(0, 0).unwrap().background, Some(SECTION_BG));
    }
}
