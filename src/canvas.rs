use lopdf::{content::Operation, Object, StringFormat};

use crate::{
    fonts::{FontId, FontRegistry},
    pdf::PdfPage,
    style::{Color, BLACK},
};

/// Control point distance of a cubic Bézier approximating a quarter circle, relative to the radius.
const KAPPA: f32 = 0.552_284_8;

/// Width of the outline stroked around glyphs to simulate a bold weight, relative to the font size.
const SYNTHETIC_BOLD_STROKE: f32 = 0.03;

/// How a path is painted once constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathPaint {
    Fill,
    Stroke,
}

impl PathPaint {
    fn operator(&self) -> &'static str {
        match self {
            PathPaint::Fill => "f",
            PathPaint::Stroke => "S",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    line_width: f32,
    font_id: FontId,
    font_size: f32,
}

/// The surface the page decorators and the flowables draw onto. Coordinates are in points,
/// with the origin in the bottom left corner of the page.
///
/// Every call records the equivalent content operations on the current page, `show_page`
/// closes the page and starts a new one with a fresh graphics state.
pub struct Canvas<'a> {
    fonts: &'a FontRegistry,
    page_width: f32,
    page_height: f32,
    operations: Vec<Operation>,
    pages: Vec<PdfPage>,
    state: GraphicsState,
    saved_states: Vec<GraphicsState>,
}

impl<'a> Canvas<'a> {
    pub fn new(fonts: &'a FontRegistry, page_width: f32, page_height: f32) -> Self {
        Canvas {
            fonts,
            page_width,
            page_height,
            operations: Vec::new(),
            pages: Vec::new(),
            state: Self::initial_state(fonts),
            saved_states: Vec::new(),
        }
    }

    fn initial_state(fonts: &FontRegistry) -> GraphicsState {
        GraphicsState {
            fill_color: BLACK,
            stroke_color: BLACK,
            line_width: 1.0,
            font_id: fonts.default_font(),
            font_size: 12.0,
        }
    }

    pub fn fonts(&self) -> &'a FontRegistry {
        self.fonts
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    /// The 1-based number of the page being drawn.
    pub fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    /// The operations recorded so far on the current page.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn save_state(&mut self) {
        self.saved_states.push(self.state);
        self.push("q", vec![]);
    }

    pub fn restore_state(&mut self) {
        match self.saved_states.pop() {
            Some(state) => {
                self.state = state;
                self.push("Q", vec![]);
            }
            None => log::warn!("Ignoring a graphics state restore without a matching save"),
        }
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
        self.push("rg", color_operands(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
        self.push("RG", color_operands(color));
    }

    pub fn set_line_width(&mut self, line_width: f32) {
        self.state.line_width = line_width;
        self.push("w", vec![Object::Real(line_width)]);
    }

    /// Selects the font of the following strings, it only takes effect in the text objects.
    pub fn set_font(&mut self, font_id: FontId, font_size: f32) {
        self.state.font_id = font_id;
        self.state.font_size = font_size;
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: PathPaint) {
        self.push("re", reals(&[x, y, width, height]));
        self.push(paint.operator(), vec![]);
    }

    pub fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32, paint: PathPaint) {
        self.round_rect_path(x, y, width, height, radius);
        self.push(paint.operator(), vec![]);
    }

    /// Restricts the following drawing to the inside of a rounded rectangle, until the
    /// graphics state is restored.
    pub fn clip_round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        self.round_rect_path(x, y, width, height, radius);
        self.push("W", vec![]);
        self.push("n", vec![]);
    }

    pub fn circle(&mut self, center_x: f32, center_y: f32, radius: f32, paint: PathPaint) {
        let control = radius * KAPPA;
        let (x, y) = (center_x, center_y);
        self.push("m", reals(&[x + radius, y]));
        self.push("c", reals(&[x + radius, y + control, x + control, y + radius, x, y + radius]));
        self.push("c", reals(&[x - control, y + radius, x - radius, y + control, x - radius, y]));
        self.push("c", reals(&[x - radius, y - control, x - control, y - radius, x, y - radius]));
        self.push("c", reals(&[x + control, y - radius, x + radius, y - control, x + radius, y]));
        self.push("h", vec![]);
        self.push(paint.operator(), vec![]);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push("m", reals(&[x1, y1]));
        self.push("l", reals(&[x2, y2]));
        self.push("S", vec![]);
    }

    /// Draws the text with its baseline starting at the given point.
    pub fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        let (font_id, font_size) = (self.state.font_id, self.state.font_size);
        self.draw_text(x, y, text, font_id, font_size, false);
    }

    /// Draws the text horizontally centred on the given point.
    pub fn draw_centred_string(&mut self, x: f32, y: f32, text: &str) {
        let width = self.string_width(text);
        self.draw_string(x - width / 2.0, y, text);
    }

    /// Draws the text so that it ends at the given point.
    pub fn draw_right_string(&mut self, x: f32, y: f32, text: &str) {
        let width = self.string_width(text);
        self.draw_string(x - width, y, text);
    }

    /// Width of the text in the current font.
    pub fn string_width(&self, text: &str) -> f32 {
        self.fonts
            .string_width(self.state.font_id, text, self.state.font_size)
    }

    /// Draws one run of text in the current fill color. When `synthetic_bold` is set the glyphs
    /// are filled and outlined with the same color, for faces that have no bold variant.
    pub fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font_id: FontId,
        font_size: f32,
        synthetic_bold: bool,
    ) {
        let encoded_text = self.fonts.encode(font_id, text);
        if encoded_text.is_empty() {
            return;
        }

        if synthetic_bold {
            self.push("q", vec![]);
            self.push("RG", color_operands(self.state.fill_color));
            self.push("w", vec![Object::Real(font_size * SYNTHETIC_BOLD_STROKE)]);
        }
        self.push("BT", vec![]);
        self.push(
            "Tf",
            vec![
                Object::Name(self.fonts.resource_name(font_id).as_bytes().to_vec()),
                Object::Real(font_size),
            ],
        );
        if synthetic_bold {
            self.push("Tr", vec![Object::Integer(2)]);
        }
        self.push("Td", reals(&[x, y]));
        self.push(
            "Tj",
            vec![Object::String(encoded_text, StringFormat::Hexadecimal)],
        );
        self.push("ET", vec![]);
        if synthetic_bold {
            self.push("Q", vec![]);
        }
    }

    /// Closes the current page, the next call draws onto a new page.
    pub fn show_page(&mut self) {
        if !self.saved_states.is_empty() {
            log::warn!(
                "Closing page {} with {} unrestored graphics states",
                self.page_number(),
                self.saved_states.len()
            );
            for _ in 0..self.saved_states.len() {
                self.push("Q", vec![]);
            }
            self.saved_states.clear();
        }
        let operations = std::mem::take(&mut self.operations);
        self.pages
            .push(PdfPage::new(self.page_width, self.page_height, operations));
        self.state = Self::initial_state(self.fonts);
    }

    /// Returns the closed pages, closing the current one first if anything was drawn on it.
    pub fn finish(mut self) -> Vec<PdfPage> {
        if !self.operations.is_empty() {
            self.show_page();
        }
        self.pages
    }

    fn round_rect_path(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let radius = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        if radius == 0.0 {
            self.push("re", reals(&[x, y, width, height]));
            return;
        }
        let control = radius * KAPPA;
        let (right, top) = (x + width, y + height);
        self.push("m", reals(&[x + radius, y]));
        self.push("l", reals(&[right - radius, y]));
        self.push("c", reals(&[right - radius + control, y, right, y + radius - control, right, y + radius]));
        self.push("l", reals(&[right, top - radius]));
        self.push("c", reals(&[right, top - radius + control, right - radius + control, top, right - radius, top]));
        self.push("l", reals(&[x + radius, top]));
        self.push("c", reals(&[x + radius - control, top, x, top - radius + control, x, top - radius]));
        self.push("l", reals(&[x, y + radius]));
        self.push("c", reals(&[x, y + radius - control, x + radius - control, y, x + radius, y]));
        self.push("h", vec![]);
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|value| Object::Real(*value)).collect()
}

fn color_operands(color: Color) -> Vec<Object> {
    reals(&color.to_pdf_components())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fonts::CjkFontSource, style::MANDARIN};

    fn operators(canvas: &Canvas) -> Vec<String> {
        canvas
            .operations()
            .iter()
            .map(|operation| operation.operator.clone())
            .collect()
    }

    fn real_operands(operation: &Operation) -> Vec<f32> {
        operation
            .operands
            .iter()
            .filter_map(|operand| match operand {
                Object::Real(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn filled_rectangles_are_recorded() {
        let fonts = FontRegistry::new();
        let mut canvas = Canvas::new(&fonts, 100.0, 100.0);
        canvas.save_state();
        canvas.set_fill_color(MANDARIN);
        canvas.rect(0.0, 0.0, 100.0, 8.0, PathPaint::Fill);
        canvas.restore_state();

        similar_asserts::assert_eq!(operators(&canvas), vec!["q", "rg", "re", "f", "Q"]);
    }

    #[test]
    fn centred_strings_are_shifted_by_half_their_width() {
        let fonts = FontRegistry::new();
        let mut canvas = Canvas::new(&fonts, 200.0, 200.0);
        canvas.set_font(fonts.lookup("Helvetica").unwrap(), 10.0);
        canvas.draw_centred_string(100.0, 50.0, "Hello");

        let position = canvas
            .operations()
            .iter()
            .find(|operation| operation.operator == "Td")
            .map(real_operands)
            .unwrap();
        assert!((position[0] - (100.0 - 22.78 / 2.0)).abs() < 1e-3);
        assert_eq!(position[1], 50.0);
    }

    #[test]
    fn synthetic_bold_strokes_the_glyphs() {
        let mut fonts = FontRegistry::new();
        let cjk = fonts.register_cjk(&CjkFontSource::default()).unwrap();
        let mut canvas = Canvas::new(&fonts, 200.0, 200.0);
        canvas.draw_text(10.0, 10.0, "\u{63d0}\u{793a}", cjk, 10.0, true);

        similar_asserts::assert_eq!(
            operators(&canvas),
            vec!["q", "RG", "w", "BT", "Tf", "Tr", "Td", "Tj", "ET", "Q"]
        );
    }

    #[test]
    fn text_without_encodable_characters_is_not_drawn() {
        let fonts = FontRegistry::new();
        let mut canvas = Canvas::new(&fonts, 200.0, 200.0);
        canvas.draw_string(10.0, 10.0, "\u{4e2d}\u{6587}");

        assert!(canvas.operations().is_empty());
    }

    #[test]
    fn pages_are_numbered_and_closed_balanced() {
        let fonts = FontRegistry::new();
        let mut canvas = Canvas::new(&fonts, 200.0, 200.0);
        assert_eq!(canvas.page_number(), 1);
        canvas.save_state();
        canvas.circle(100.0, 100.0, 20.0, PathPaint::Fill);
        canvas.show_page();
        assert_eq!(canvas.page_number(), 2);
        canvas.line(0.0, 0.0, 10.0, 10.0);

        let pages = canvas.finish();
        assert_eq!(pages.len(), 2);
        let first_page_operators: Vec<_> = pages[0]
            .operations()
            .iter()
            .map(|operation| operation.operator.as_str())
            .collect();
        assert_eq!(first_page_operators.first(), Some(&"q"));
        assert_eq!(first_page_operators.last(), Some(&"Q"));
    }

    #[test]
    fn degenerate_round_rects_become_plain_rectangles() {
        let fonts = FontRegistry::new();
        let mut canvas = Canvas::new(&fonts, 200.0, 200.0);
        canvas.round_rect(0.0, 0.0, 50.0, 20.0, 0.0, PathPaint::Stroke);

        similar_asserts::assert_eq!(operators(&canvas), vec!["re", "S"]);
    }
}
