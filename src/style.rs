use crate::{
    error::ContextError,
    fonts::{FontId, FontRegistry},
};

/// An RGB color with 8 bits per component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Color { red, green, blue }
    }

    /// Parses a `#RRGGBB` literal, the leading `#` is optional.
    pub fn from_hex(literal: &str) -> Result<Color, ContextError> {
        let digits = literal.trim().trim_start_matches('#');
        let component = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|component| u8::from_str_radix(component, 16).ok())
        };
        match (digits.len(), component(0..2), component(2..4), component(4..6)) {
            (6, Some(red), Some(green), Some(blue)) => Ok(Color::from_rgb(red, green, blue)),
            _ => Err(ContextError::content(format!(
                "The color {:?} is not a #RRGGBB literal",
                literal
            ))),
        }
    }

    /// The components scaled to the unit interval, as expected by the `rg` and `RG` operators.
    pub fn to_pdf_components(self) -> [f32; 3] {
        [
            self.red as f32 / 255.0,
            self.green as f32 / 255.0,
            self.blue as f32 / 255.0,
        ]
    }
}

pub const MANDARIN: Color = Color::from_rgb(0xE8, 0x5D, 0x04);
pub const COD_GRAY: Color = Color::from_rgb(0x1A, 0x1A, 0x1A);
pub const BODY_TEXT: Color = Color::from_rgb(0x33, 0x33, 0x33);
pub const LIGHT_TEXT: Color = Color::from_rgb(0x55, 0x55, 0x55);
pub const BORDER_COLOR: Color = Color::from_rgb(0xE0, 0xE0, 0xE0);
pub const LIGHT_BG: Color = Color::from_rgb(0xF8, 0xF8, 0xF8);
pub const SECTION_BG: Color = Color::from_rgb(0xFF, 0xF5, 0xEE);
pub const WHITE: Color = Color::from_rgb(0xFF, 0xFF, 0xFF);
pub const BLACK: Color = Color::from_rgb(0x00, 0x00, 0x00);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// The writing system of a guide, with the face used for its text when it isn't Latin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    Latin,
    Cjk(FontId),
}

/// The faces used for plain and `<b>` runs of a paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontFamily {
    pub regular: FontId,
    pub bold: FontId,
}

impl FontFamily {
    /// A family whose bold runs use the same face, CJK faces get a simulated bold instead.
    pub fn single(font_id: FontId) -> Self {
        FontFamily {
            regular: font_id,
            bold: font_id,
        }
    }

    pub fn select(&self, bold: bool) -> FontId {
        if bold {
            self.bold
        } else {
            self.regular
        }
    }
}

/// A fully specified paragraph style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSpec {
    pub name: String,
    pub font: FontFamily,
    pub font_size: f32,
    pub leading: f32,
    pub color: Color,
    pub alignment: Alignment,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
}

impl StyleSpec {
    /// A style with the defaults of a plain paragraph: size 10 on 12, black, left aligned.
    fn base(name: &str, font: FontFamily) -> Self {
        StyleSpec {
            name: name.to_string(),
            font,
            font_size: 10.0,
            leading: 12.0,
            color: BLACK,
            alignment: Alignment::Left,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
        }
    }

    /// Derives a variant which inherits every field and overrides the ones set by the closure.
    pub fn derive<F>(&self, name: &str, overrides: F) -> StyleSpec
    where
        F: FnOnce(&mut StyleSpec),
    {
        let mut variant = self.clone();
        variant.name = name.to_string();
        overrides(&mut variant);
        variant
    }
}

/// The names of the styles a guide is typeset with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleName {
    Heading1,
    Heading2,
    Heading3,
    Body,
    Bullet,
    TipText,
    WarnText,
    InfoText,
    TocItem,
    TocNumber,
    StepNumber,
    StepTitle,
    StepDescription,
    BoxText,
    Final,
}

/// The faces of the string cells of the data tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableFonts {
    pub header: FontId,
    pub body: FontId,
    /// Used by the highlighted first column of some tables.
    pub emphasis: FontId,
}

/// The fixed set of styles of one document, created once and never mutated.
#[derive(Clone, Debug)]
pub struct StyleRegistry {
    pub script: Script,
    pub table_fonts: TableFonts,
    heading_1: StyleSpec,
    heading_2: StyleSpec,
    heading_3: StyleSpec,
    body: StyleSpec,
    bullet: StyleSpec,
    tip_text: StyleSpec,
    warn_text: StyleSpec,
    info_text: StyleSpec,
    toc_item: StyleSpec,
    toc_number: StyleSpec,
    step_number: StyleSpec,
    step_title: StyleSpec,
    step_description: StyleSpec,
    box_text: StyleSpec,
    final_text: StyleSpec,
}

impl StyleRegistry {
    pub fn new(fonts: &FontRegistry, script: Script) -> Result<Self, ContextError> {
        let helvetica = fonts.lookup("Helvetica")?;
        let helvetica_bold = fonts.lookup("Helvetica-Bold")?;
        let latin = FontFamily {
            regular: helvetica,
            bold: helvetica_bold,
        };
        let latin_bold = FontFamily::single(helvetica_bold);

        // Leadings differ between the scripts: h1 h2 h3 body tip toc step_title step_desc
        let (text, heading, leadings, table_fonts) = match script {
            Script::Latin => (
                latin,
                latin_bold,
                [28.0, 22.0, 18.0, 15.0, 14.0, 18.0, 15.0, 13.0],
                TableFonts {
                    header: helvetica_bold,
                    body: helvetica,
                    emphasis: helvetica_bold,
                },
            ),
            Script::Cjk(cjk) => (
                FontFamily::single(cjk),
                FontFamily::single(cjk),
                [30.0, 24.0, 20.0, 17.0, 16.0, 20.0, 17.0, 15.0],
                TableFonts {
                    header: cjk,
                    body: cjk,
                    emphasis: cjk,
                },
            ),
        };
        let [h1_leading, h2_leading, h3_leading, body_leading, tip_leading, toc_leading, title_leading, description_leading] =
            leadings;

        let heading_1 = StyleSpec {
            font_size: 22.0,
            leading: h1_leading,
            color: MANDARIN,
            space_before: 20.0,
            space_after: 12.0,
            ..StyleSpec::base("h1", heading)
        };
        let heading_2 = StyleSpec {
            font_size: 16.0,
            leading: h2_leading,
            color: COD_GRAY,
            space_before: 16.0,
            space_after: 8.0,
            ..StyleSpec::base("h2", heading)
        };
        let heading_3 = StyleSpec {
            font_size: 13.0,
            leading: h3_leading,
            color: BODY_TEXT,
            space_before: 12.0,
            space_after: 6.0,
            ..StyleSpec::base("h3", heading)
        };
        let body = StyleSpec {
            font_size: 10.5,
            leading: body_leading,
            color: BODY_TEXT,
            alignment: Alignment::Justify,
            space_before: 4.0,
            space_after: 6.0,
            ..StyleSpec::base("body", text)
        };
        let tip_text = StyleSpec {
            font_size: 10.0,
            leading: tip_leading,
            color: Color::from_rgb(0x1B, 0x5E, 0x20),
            space_before: 2.0,
            space_after: 2.0,
            ..StyleSpec::base("tip_text", text)
        };
        let warn_text = tip_text.derive("warn_text", |spec| {
            spec.color = Color::from_rgb(0xB4, 0x53, 0x09)
        });
        let info_text = tip_text.derive("info_text", |spec| {
            spec.color = Color::from_rgb(0x0D, 0x47, 0xA1)
        });
        let toc_item = StyleSpec {
            font_size: 12.0,
            leading: toc_leading,
            color: COD_GRAY,
            space_before: 6.0,
            space_after: 6.0,
            left_indent: 10.0,
            ..StyleSpec::base("toc_item", text)
        };
        let toc_number = toc_item.derive("toc_num", |spec| spec.color = MANDARIN);
        let step_number = StyleSpec {
            font_size: 11.0,
            color: WHITE,
            alignment: Alignment::Center,
            ..StyleSpec::base("step_num", latin_bold)
        };
        let step_title = StyleSpec {
            font_size: 11.0,
            leading: title_leading,
            color: COD_GRAY,
            ..StyleSpec::base("step_title", heading)
        };
        let step_description = StyleSpec {
            font_size: 9.5,
            leading: description_leading,
            color: LIGHT_TEXT,
            ..StyleSpec::base("step_desc", text)
        };
        let bullet = body.derive("list", |spec| spec.left_indent = 15.0);
        let box_text = body.derive("box_text", |spec| spec.font_size = 10.0);
        let final_text = body.derive("final", |spec| {
            spec.alignment = Alignment::Center;
            spec.font_size = 11.0;
        });

        Ok(StyleRegistry {
            script,
            table_fonts,
            heading_1,
            heading_2,
            heading_3,
            body,
            bullet,
            tip_text,
            warn_text,
            info_text,
            toc_item,
            toc_number,
            step_number,
            step_title,
            step_description,
            box_text,
            final_text,
        })
    }

    pub fn get(&self, name: StyleName) -> &StyleSpec {
        match name {
            StyleName::Heading1 => &self.heading_1,
            StyleName::Heading2 => &self.heading_2,
            StyleName::Heading3 => &self.heading_3,
            StyleName::Body => &self.body,
            StyleName::Bullet => &self.bullet,
            StyleName::TipText => &self.tip_text,
            StyleName::WarnText => &self.warn_text,
            StyleName::InfoText => &self.info_text,
            StyleName::TocItem => &self.toc_item,
            StyleName::TocNumber => &self.toc_number,
            StyleName::StepNumber => &self.step_number,
            StyleName::StepTitle => &self.step_title,
            StyleName::StepDescription => &self.step_description,
            StyleName::BoxText => &self.box_text,
            StyleName::Final => &self.final_text,
        }
    }

    /// The style of a heading level, levels past 3 do not exist in the guides.
    pub fn heading(&self, level: u8) -> Result<&StyleSpec, ContextError> {
        match level {
            1 => Ok(&self.heading_1),
            2 => Ok(&self.heading_2),
            3 => Ok(&self.heading_3),
            _ => Err(ContextError::content(format!(
                "The heading level {} is not supported",
                level
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::CjkFontSource;

    #[test]
    fn hex_literals_are_parsed() {
        assert_eq!(Color::from_hex("#E85D04").unwrap(), MANDARIN);
        assert_eq!(Color::from_hex("fff5ee").unwrap(), SECTION_BG);
        assert!(Color::from_hex("#FFB30").is_err());
        assert!(Color::from_hex("#GGGGGG").is_err());
        assert!(Color::from_hex("#E85D04AA").is_err());
    }

    #[test]
    fn derived_styles_inherit_every_other_field() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let body = styles.get(StyleName::Body);
        let final_text = styles.get(StyleName::Final);

        assert_eq!(final_text.name, "final");
        assert_eq!(final_text.alignment, Alignment::Center);
        assert_eq!(final_text.font_size, 11.0);
        assert_eq!(final_text.leading, body.leading);
        assert_eq!(final_text.color, body.color);
        assert_eq!(final_text.space_after, body.space_after);
        assert_eq!(styles.get(StyleName::Bullet).left_indent, 15.0);
    }

    #[test]
    fn latin_headings_use_the_bold_face() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let heading = styles.get(StyleName::Heading1);

        assert_eq!(heading.font.regular, fonts.lookup("Helvetica-Bold").unwrap());
        assert_eq!(heading.font_size, 22.0);
        assert_eq!(heading.leading, 28.0);
        assert_eq!(heading.color, MANDARIN);
        assert_eq!(
            styles.get(StyleName::Body).font.bold,
            fonts.lookup("Helvetica-Bold").unwrap()
        );
    }

    #[test]
    fn cjk_styles_use_the_cjk_face_and_taller_leadings() {
        let mut fonts = FontRegistry::new();
        let cjk = fonts.register_cjk(&CjkFontSource::default()).unwrap();
        let styles = StyleRegistry::new(&fonts, Script::Cjk(cjk)).unwrap();

        assert_eq!(styles.get(StyleName::Heading1).font, FontFamily::single(cjk));
        assert_eq!(styles.get(StyleName::Heading1).leading, 30.0);
        assert_eq!(styles.get(StyleName::Body).leading, 17.0);
        assert_eq!(styles.get(StyleName::TocItem).leading, 20.0);
        assert_eq!(styles.table_fonts.header, cjk);
        // The step badge shows digits only and keeps the Latin face
        assert_eq!(
            styles.get(StyleName::StepNumber).font.regular,
            fonts.lookup("Helvetica-Bold").unwrap()
        );
    }

    #[test]
    fn heading_levels_past_three_are_rejected() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();

        assert!(styles.heading(3).is_ok());
        assert!(styles.heading(4).is_err());
    }
}
