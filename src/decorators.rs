use crate::{
    canvas::{Canvas, PathPaint},
    doc_template::PageContext,
    error::ContextError,
    fonts::{FontId, FontRegistry},
    guide::{Cover, Guide, RunningHeader},
    pdf::{centimeters_to_points, millimeters_to_points as mm},
    style::{Color, Script, BORDER_COLOR, COD_GRAY, MANDARIN, WHITE},
};

const CIRCLE_COLOR: Color = Color::from_rgb(0x2A, 0x2A, 0x2A);
const SUBTITLE_COLOR: Color = Color::from_rgb(0xFF, 0xCC, 0xAA);
const VERSION_COLOR: Color = Color::from_rgb(0x88, 0x88, 0x88);
const NOTICE_COLOR: Color = Color::from_rgb(0x66, 0x66, 0x66);
const HEADER_TEXT_COLOR: Color = Color::from_rgb(0x99, 0x99, 0x99);

/// The faces of the page chrome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChromeFonts {
    brand: FontId,
    title: FontId,
    text: FontId,
}

/// Draws the cover and the running header and footer of a guide.
pub struct PageChrome<'a> {
    cover: &'a Cover,
    header: &'a RunningHeader,
    fonts: ChromeFonts,
    title_size: f32,
}

impl<'a> PageChrome<'a> {
    pub fn new(guide: &'a Guide, fonts: &FontRegistry, script: Script) -> Result<Self, ContextError> {
        let helvetica = fonts.lookup("Helvetica")?;
        let helvetica_bold = fonts.lookup("Helvetica-Bold")?;
        let (chrome_fonts, title_size) = match script {
            Script::Latin => (
                ChromeFonts {
                    brand: helvetica_bold,
                    title: helvetica_bold,
                    text: helvetica,
                },
                30.0,
            ),
            Script::Cjk(cjk) => (
                ChromeFonts {
                    brand: helvetica_bold,
                    title: cjk,
                    text: cjk,
                },
                28.0,
            ),
        };

        Ok(PageChrome {
            cover: &guide.cover,
            header: &guide.header,
            fonts: chrome_fonts,
            title_size,
        })
    }

    /// The full bleed cover: dark background, accent bars, a decorative circle, the brand
    /// badge and the centered title block.
    pub fn draw_cover(&self, canvas: &mut Canvas, context: &PageContext) -> Result<(), ContextError> {
        let (width, height) = (context.page_width, context.page_height);
        let center = width / 2.0;

        canvas.save_state();
        canvas.set_fill_color(COD_GRAY);
        canvas.rect(0.0, 0.0, width, height, PathPaint::Fill);
        canvas.set_fill_color(MANDARIN);
        canvas.rect(0.0, height - mm(8.0), width, mm(8.0), PathPaint::Fill);
        canvas.set_fill_color(CIRCLE_COLOR);
        canvas.circle(center, height / 2.0 + mm(40.0), mm(80.0), PathPaint::Fill);

        canvas.set_fill_color(MANDARIN);
        canvas.round_rect(center - mm(50.0), height - mm(75.0), mm(100.0), mm(30.0), 6.0, PathPaint::Fill);
        canvas.set_fill_color(WHITE);
        canvas.set_font(self.fonts.brand, 24.0);
        canvas.draw_centred_string(center, height - mm(60.0), &self.cover.brand);

        canvas.set_font(self.fonts.title, self.title_size);
        canvas.draw_centred_string(center, height / 2.0 + mm(25.0), &self.cover.title);

        canvas.set_fill_color(SUBTITLE_COLOR);
        canvas.set_font(self.fonts.text, 16.0);
        for (index, line) in self.cover.subtitle.iter().enumerate() {
            canvas.draw_centred_string(center, height / 2.0 + mm(5.0) - index as f32 * mm(15.0), line);
        }

        canvas.set_stroke_color(MANDARIN);
        canvas.set_line_width(2.0);
        canvas.line(center - mm(40.0), height / 2.0 - mm(25.0), center + mm(40.0), height / 2.0 - mm(25.0));

        canvas.set_fill_color(VERSION_COLOR);
        canvas.set_font(self.fonts.text, 11.0);
        canvas.draw_centred_string(center, height / 2.0 - mm(40.0), &self.cover.version);
        canvas.set_fill_color(NOTICE_COLOR);
        canvas.set_font(self.fonts.text, 9.0);
        canvas.draw_centred_string(center, mm(25.0), &self.cover.notice);

        canvas.set_fill_color(MANDARIN);
        canvas.rect(0.0, 0.0, width, mm(4.0), PathPaint::Fill);
        canvas.restore_state();

        Ok(())
    }

    /// The accent rule with the title and version above the content, and the footer rule
    /// with the confidentiality notice and the page number below it.
    pub fn header_footer(&self, canvas: &mut Canvas, context: &PageContext) -> Result<(), ContextError> {
        let width = context.page_width;
        let height = context.page_height;
        let left = centimeters_to_points(2.0);
        let right = width - centimeters_to_points(2.0);

        canvas.save_state();
        canvas.set_stroke_color(MANDARIN);
        canvas.set_line_width(1.5);
        canvas.line(left, height - centimeters_to_points(1.5), right, height - centimeters_to_points(1.5));
        canvas.set_fill_color(HEADER_TEXT_COLOR);
        canvas.set_font(self.fonts.text, 8.0);
        canvas.draw_string(left, height - centimeters_to_points(1.3), &self.header.title);
        canvas.draw_right_string(right, height - centimeters_to_points(1.3), &self.header.version);

        canvas.set_stroke_color(BORDER_COLOR);
        canvas.set_line_width(0.5);
        canvas.line(left, centimeters_to_points(1.5), right, centimeters_to_points(1.5));
        canvas.draw_string(left, centimeters_to_points(1.0), &self.header.confidential);
        canvas.draw_right_string(
            right,
            centimeters_to_points(1.0),
            &self.header.page_label(context.page_number),
        );
        canvas.restore_state();

        Ok(())
    }
}
