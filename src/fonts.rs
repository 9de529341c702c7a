use lopdf::{Object, StringFormat};
use owned_ttf_parser::{AsFaceRef as _, Face, OwnedFace};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use unicode_normalization::UnicodeNormalization as _;

use crate::error::{ContextError, ErrorKind};

/// Advance widths of the printable ASCII range (U+0020 to U+007E) of Helvetica, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722, 722, 667,
    611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500,
    222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of the printable ASCII range of Helvetica-Bold, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722, 722, 667,
    611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556,
    278, 889, 611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Proportional widths of the half-width ASCII CIDs 1 to 95 of STSong-Light.
const ST_SONG_LIGHT_WIDTHS: [u16; 95] = [
    207, 270, 342, 467, 462, 797, 710, 239, 374, 374, 423, 605, 238, 375, 238, 334, 462, 462, 462,
    462, 462, 462, 462, 462, 462, 462, 238, 238, 605, 605, 605, 344, 748, 684, 560, 695, 739, 563,
    511, 729, 793, 318, 312, 666, 526, 896, 758, 772, 544, 772, 628, 465, 607, 753, 711, 972, 647,
    620, 607, 374, 333, 374, 606, 500, 239, 417, 503, 427, 529, 415, 264, 444, 518, 241, 230, 495,
    228, 793, 527, 524, 524, 504, 338, 336, 277, 517, 450, 652, 466, 452, 407, 370, 258, 370, 605,
];

/// The characters of the WinAnsi encoding outside of the ASCII and Latin-1 ranges, with their
/// code and their widths in Helvetica and Helvetica-Bold.
const WIN_ANSI_SPECIALS: [(char, u8, u16, u16); 18] = [
    ('\u{20AC}', 0x80, 556, 556),
    ('\u{201A}', 0x82, 222, 278),
    ('\u{0192}', 0x83, 556, 556),
    ('\u{201E}', 0x84, 333, 500),
    ('\u{2026}', 0x85, 1000, 1000),
    ('\u{2020}', 0x86, 556, 556),
    ('\u{2021}', 0x87, 556, 556),
    ('\u{2030}', 0x89, 1000, 1000),
    ('\u{2039}', 0x8B, 333, 333),
    ('\u{0152}', 0x8C, 1000, 1000),
    ('\u{2018}', 0x91, 222, 278),
    ('\u{2019}', 0x92, 222, 278),
    ('\u{201C}', 0x93, 333, 500),
    ('\u{201D}', 0x94, 333, 500),
    ('\u{2022}', 0x95, 350, 350),
    ('\u{2013}', 0x96, 556, 556),
    ('\u{2014}', 0x97, 1000, 1000),
    ('\u{203A}', 0x9B, 333, 333),
];

/// The two members of the Base-14 Helvetica family used by the guides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn ascii_widths(&self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Maps a character to its WinAnsi code and its width in 1/1000 em.
    fn encode_char(&self, character: char) -> Option<(u8, u16)> {
        let code = character as u32;
        if (0x20..=0x7E).contains(&code) {
            return Some((code as u8, self.ascii_widths()[(code - 0x20) as usize]));
        }
        if let Some((_, byte, regular, bold)) = WIN_ANSI_SPECIALS
            .iter()
            .find(|(special, ..)| *special == character)
        {
            let width = match self {
                StandardFont::Helvetica => *regular,
                StandardFont::HelveticaBold => *bold,
            };
            return Some((*byte, width));
        }
        if (0xA0..=0xFF).contains(&code) {
            // Accented letters are as wide as their base letter, the remaining symbols
            // are approximated with the width of a digit
            let width = character
                .to_string()
                .nfd()
                .next()
                .map(|base| base as u32)
                .filter(|base| (0x20..=0x7E).contains(base))
                .map(|base| self.ascii_widths()[(base - 0x20) as usize])
                .unwrap_or(556);
            let width = if code == 0xA0 { 278 } else { width };
            return Some((code as u8, width));
        }
        None
    }
}

/// The predefined Chinese CID fonts every PDF viewer resolves without embedding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CidFont {
    /// Simplified Chinese, Adobe-GB1 character collection.
    #[serde(rename = "STSong-Light")]
    StSongLight,
    /// Traditional Chinese, Adobe-CNS1 character collection.
    #[serde(rename = "MSung-Light")]
    MSungLight,
}

impl CidFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            CidFont::StSongLight => "STSong-Light",
            CidFont::MSungLight => "MSung-Light",
        }
    }

    fn encoding(&self) -> &'static str {
        match self {
            CidFont::StSongLight => "UniGB-UCS2-H",
            CidFont::MSungLight => "UniCNS-UCS2-H",
        }
    }

    fn ordering(&self) -> &'static str {
        match self {
            CidFont::StSongLight => "GB1",
            CidFont::MSungLight => "CNS1",
        }
    }

    fn supplement(&self) -> i64 {
        match self {
            CidFont::StSongLight => 2,
            CidFont::MSungLight => 0,
        }
    }

    fn font_bounding_box(&self) -> [i64; 4] {
        match self {
            CidFont::StSongLight => [-25, -254, 1000, 880],
            CidFont::MSungLight => [-160, -249, 1015, 888],
        }
    }

    /// Width in 1/1000 em of a character, half-width ASCII is proportional.
    fn char_width(&self, character: char) -> u16 {
        let code = character as u32;
        match self {
            CidFont::StSongLight if (0x20..=0x7E).contains(&code) => {
                ST_SONG_LIGHT_WIDTHS[(code - 0x20) as usize]
            }
            CidFont::MSungLight if (0x20..=0x7E).contains(&code) => 500,
            _ => 1000,
        }
    }

    /// The `W` array of the descendant font, covering the ASCII CIDs.
    fn width_objects(&self) -> Vec<Object> {
        match self {
            CidFont::StSongLight => vec![
                Object::Integer(1),
                Object::Array(
                    ST_SONG_LIGHT_WIDTHS
                        .iter()
                        .map(|width| Object::Integer(*width as i64))
                        .collect(),
                ),
            ],
            CidFont::MSungLight => vec![
                Object::Integer(1),
                Object::Integer(95),
                Object::Integer(500),
            ],
        }
    }
}

/// Where the face for Chinese text comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CjkFontSource {
    /// One of the predefined CID fonts, nothing is embedded.
    Predefined(CidFont),
    /// A TrueType (or OpenType with TrueType outlines) font file, embedded into the document.
    TrueType(PathBuf),
}

impl Default for CjkFontSource {
    fn default() -> Self {
        CjkFontSource::Predefined(CidFont::StSongLight)
    }
}

/// The (insofar) relevant vertical metrics of a font.
#[derive(Clone, Copy, Debug, Default)]
struct FontMetrics {
    ascent: i16,
    descent: i16,
    units_per_em: u16,
}

/// A font face loaded from a TTF font, together with its measure of units per em.
#[derive(Clone, Debug)]
struct TtfFontFace {
    /// The underlying font face which is represented through the `ttf_parser` crate.
    inner: std::sync::Arc<OwnedFace>,
    units_per_em: u16,
}

impl TtfFontFace {
    fn from_bytes(data: &[u8]) -> Result<Self, ContextError> {
        let face = OwnedFace::from_vec(data.to_vec(), 0).map_err(|error| {
            ContextError::with_error("Failed to parse font", &error).of_kind(ErrorKind::Font)
        })?;
        let units_per_em = face.as_face_ref().units_per_em();

        Ok(Self {
            inner: std::sync::Arc::new(face),
            units_per_em,
        })
    }

    fn face(&self) -> &Face<'_> {
        self.inner.as_face_ref()
    }

    fn font_metrics(&self) -> FontMetrics {
        FontMetrics {
            ascent: self.face().ascender(),
            descent: self.face().descender(),
            units_per_em: self.units_per_em,
        }
    }

    fn glyph_id(&self, character: char) -> Option<u16> {
        self.face().glyph_index(character).map(|glyph_id| glyph_id.0)
    }

    /// Horizontal advance of a glyph scaled to 1/1000 em.
    fn glyph_width(&self, glyph_id: u16) -> Option<u32> {
        self.face()
            .glyph_hor_advance(owned_ttf_parser::GlyphId(glyph_id))
            .map(|advance| (advance as f32 * 1000.0 / self.units_per_em as f32) as u32)
    }

    /// The association between the glyph IDs and the first character mapped to each of them
    /// by the unicode subtables of the font.
    fn glyph_ids(&self) -> BTreeMap<u16, char> {
        let mut gid_to_character = BTreeMap::new();
        let Some(cmap) = self.face().tables().cmap else {
            return gid_to_character;
        };

        for subtable in cmap
            .subtables
            .into_iter()
            .filter(|subtable| subtable.is_unicode())
        {
            subtable.codepoints(|codepoint| {
                if let Ok(character) = char::try_from(codepoint) {
                    if let Some(glyph_index) = subtable
                        .glyph_index(codepoint)
                        .filter(|index| index.0 > 0)
                    {
                        gid_to_character.entry(glyph_index.0).or_insert(character);
                    }
                }
            })
        }

        gid_to_character
    }
}

/// A TrueType face embedded as a composite (Type0) font.
#[derive(Clone, Debug)]
pub struct TrueTypeFont {
    bytes: Vec<u8>,
    face: TtfFontFace,
    base_font: String,
}

impl TrueTypeFont {
    /// Reads and parses the font file at the given path.
    pub fn from_path(font_path: &Path) -> Result<Self, ContextError> {
        let bytes = std::fs::read(font_path).map_err(|error| {
            ContextError::io(format!("Failed to read the font file {:?}", font_path), &error)
                .of_kind(ErrorKind::Font)
        })?;
        let face = TtfFontFace::from_bytes(&bytes)?;
        let stem = font_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "Embedded".to_string());
        let base_font = stem
            .chars()
            .map(|character| {
                if character.is_ascii_alphanumeric() {
                    character
                } else {
                    '-'
                }
            })
            .collect();

        Ok(TrueTypeFont {
            bytes,
            face,
            base_font,
        })
    }

    /// Builds the Type0 font dictionary, inserting the font program, the descriptor and the
    /// ToUnicode map into the document.
    fn insert_into_document(&self, inner_document: &mut lopdf::Document) -> lopdf::Dictionary {
        use lopdf::Object::*;
        let face_metrics = self.face.font_metrics();

        let font_stream = lopdf::Stream::new(
            lopdf::Dictionary::from_iter(vec![("Length1", Integer(self.bytes.len() as i64))]),
            self.bytes.clone(),
        );

        // Collect the widths and the characters of every mapped glyph, ordered by glyph ID
        let mut glyph_widths = BTreeMap::<u16, u32>::new();
        let mut cmap_blocks = Vec::<Vec<(u16, char)>>::new();
        let mut current_block = Vec::new();
        let mut current_high_byte = 0;
        for (glyph_id, character) in self.face.glyph_ids() {
            let Some(width) = self.face.glyph_width(glyph_id) else {
                log::warn!(
                    "Glyph {} of the font {:?} has no advance, leaving it out of the widths",
                    glyph_id,
                    self.base_font
                );
                continue;
            };
            glyph_widths.insert(glyph_id, width);

            // A bfchar block may neither cross a high byte boundary nor hold more than 100 entries
            if glyph_id >> 8 != current_high_byte || current_block.len() >= 100 {
                if !current_block.is_empty() {
                    cmap_blocks.push(std::mem::take(&mut current_block));
                }
                current_high_byte = glyph_id >> 8;
            }
            current_block.push((glyph_id, character));
        }
        if !current_block.is_empty() {
            cmap_blocks.push(current_block);
        }

        let to_unicode_stream = lopdf::Stream::new(
            lopdf::Dictionary::new(),
            generate_cid_to_unicode_map(&self.base_font, &cmap_blocks).into_bytes(),
        );
        let to_unicode_id = inner_document.add_object(to_unicode_stream);

        // Runs of consecutive glyph IDs become `first [w1 w2 ...]` entries of the `W` array
        let mut width_objects = Vec::<Object>::new();
        let mut run_start: Option<u16> = None;
        let mut previous_glyph_id = 0;
        let mut run_widths = Vec::<Object>::new();
        for (glyph_id, width) in glyph_widths {
            match run_start {
                Some(_) if glyph_id == previous_glyph_id + 1 => {}
                Some(start) => {
                    width_objects.push(Integer(start as i64));
                    width_objects.push(Array(std::mem::take(&mut run_widths)));
                    run_start = Some(glyph_id);
                }
                None => run_start = Some(glyph_id),
            }
            run_widths.push(Integer(width as i64));
            previous_glyph_id = glyph_id;
        }
        if let Some(start) = run_start {
            width_objects.push(Integer(start as i64));
            width_objects.push(Array(run_widths));
        }

        let scale = 1000.0 / face_metrics.units_per_em as f32;
        let ascent = (face_metrics.ascent as f32 * scale) as i64;
        let descent = (face_metrics.descent as f32 * scale) as i64;
        let font_descriptor = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("FontDescriptor".into())),
            ("FontName", Name(self.base_font.clone().into_bytes())),
            ("Ascent", Integer(ascent)),
            ("Descent", Integer(descent)),
            ("CapHeight", Integer(ascent)),
            ("ItalicAngle", Integer(0)),
            ("Flags", Integer(4)),
            ("StemV", Integer(80)),
            (
                "FontBBox",
                Array(vec![
                    Integer(0),
                    Integer(descent),
                    Integer(1000),
                    Integer(ascent),
                ]),
            ),
            ("FontFile2", Reference(inner_document.add_object(font_stream))),
        ]);
        let font_descriptor_id = inner_document.add_object(font_descriptor);

        let descendant_font = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("Font".into())),
            ("Subtype", Name("CIDFontType2".into())),
            ("BaseFont", Name(self.base_font.clone().into_bytes())),
            (
                "CIDSystemInfo",
                Dictionary(cid_system_info("Identity", 0)),
            ),
            ("FontDescriptor", Reference(font_descriptor_id)),
            ("W", Array(width_objects)),
            ("DW", Integer(1000)),
        ]);

        lopdf::Dictionary::from_iter(vec![
            ("Type", Name("Font".into())),
            ("Subtype", Name("Type0".into())),
            ("BaseFont", Name(self.base_font.clone().into_bytes())),
            ("Encoding", Name("Identity-H".into())),
            ("DescendantFonts", Array(vec![Dictionary(descendant_font)])),
            ("ToUnicode", Reference(to_unicode_id)),
        ])
    }
}

/// The face behind a registered font.
#[derive(Clone, Debug)]
pub enum FontFace {
    Standard(StandardFont),
    Cid(CidFont),
    TrueType(Box<TrueTypeFont>),
}

impl FontFace {
    /// The name the face is registered under.
    pub fn name(&self) -> &str {
        match self {
            FontFace::Standard(font) => font.base_font(),
            FontFace::Cid(font) => font.base_font(),
            FontFace::TrueType(font) => &font.base_font,
        }
    }

    /// Encodes one character as the bytes of a string operand together with its width in
    /// 1/1000 em. Returns `None` when the face cannot show the character.
    fn encode_char(&self, character: char) -> Option<(Vec<u8>, u32)> {
        match self {
            FontFace::Standard(font) => font
                .encode_char(character)
                .map(|(byte, width)| (vec![byte], width as u32)),
            FontFace::Cid(font) => {
                let mut units = [0u16; 2];
                match character.encode_utf16(&mut units) {
                    [unit] => Some((unit.to_be_bytes().to_vec(), font.char_width(character) as u32)),
                    _ => None,
                }
            }
            FontFace::TrueType(font) => {
                let glyph_id = font.face.glyph_id(character)?;
                let width = font.face.glyph_width(glyph_id).unwrap_or(1000);
                Some((glyph_id.to_be_bytes().to_vec(), width))
            }
        }
    }

    fn insert_into_document(&self, inner_document: &mut lopdf::Document) -> lopdf::Dictionary {
        use lopdf::Object::*;
        match self {
            FontFace::Standard(font) => lopdf::Dictionary::from_iter(vec![
                ("Type", Name("Font".into())),
                ("Subtype", Name("Type1".into())),
                ("BaseFont", Name(font.base_font().into())),
                ("Encoding", Name("WinAnsiEncoding".into())),
            ]),
            FontFace::Cid(font) => {
                let [left, bottom, right, top] = font.font_bounding_box();
                let font_descriptor = lopdf::Dictionary::from_iter(vec![
                    ("Type", Name("FontDescriptor".into())),
                    ("FontName", Name(font.base_font().into())),
                    ("Flags", Integer(6)),
                    (
                        "FontBBox",
                        Array(vec![
                            Integer(left),
                            Integer(bottom),
                            Integer(right),
                            Integer(top),
                        ]),
                    ),
                    ("ItalicAngle", Integer(0)),
                    ("Ascent", Integer(top)),
                    ("Descent", Integer(bottom)),
                    ("CapHeight", Integer(top)),
                    ("StemV", Integer(93)),
                ]);
                let font_descriptor_id = inner_document.add_object(font_descriptor);
                let descendant_font = lopdf::Dictionary::from_iter(vec![
                    ("Type", Name("Font".into())),
                    ("Subtype", Name("CIDFontType0".into())),
                    ("BaseFont", Name(font.base_font().into())),
                    (
                        "CIDSystemInfo",
                        Dictionary(cid_system_info(font.ordering(), font.supplement())),
                    ),
                    ("FontDescriptor", Reference(font_descriptor_id)),
                    ("DW", Integer(1000)),
                    ("W", Array(font.width_objects())),
                ]);

                lopdf::Dictionary::from_iter(vec![
                    ("Type", Name("Font".into())),
                    ("Subtype", Name("Type0".into())),
                    ("BaseFont", Name(font.base_font().into())),
                    ("Encoding", Name(font.encoding().into())),
                    ("DescendantFonts", Array(vec![Dictionary(descendant_font)])),
                ])
            }
            FontFace::TrueType(font) => font.insert_into_document(inner_document),
        }
    }
}

/// A handle to a font registered in a `FontRegistry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(usize);

#[derive(Clone, Debug)]
struct RegisteredFont {
    resource_name: String,
    face: FontFace,
}

/// The fonts available to a document, in registration order. Every font ends up in the
/// font resources of every page.
#[derive(Clone, Debug)]
pub struct FontRegistry {
    fonts: Vec<RegisteredFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// Creates a registry holding Helvetica and Helvetica-Bold.
    pub fn new() -> Self {
        let mut registry = FontRegistry { fonts: Vec::new() };
        registry.register(FontFace::Standard(StandardFont::Helvetica));
        registry.register(FontFace::Standard(StandardFont::HelveticaBold));
        registry
    }

    /// Registers a face, returning the existing handle if a face of the same name is known.
    pub fn register(&mut self, face: FontFace) -> FontId {
        if let Some(index) = self.fonts.iter().position(|font| font.face.name() == face.name()) {
            return FontId(index);
        }
        let resource_name = format!("F{}", self.fonts.len() + 1);
        log::debug!("Registering the font {:?} as {}", face.name(), resource_name);
        self.fonts.push(RegisteredFont {
            resource_name,
            face,
        });
        FontId(self.fonts.len() - 1)
    }

    /// Registers the face used for Chinese text. This has to happen before any Chinese text
    /// is measured.
    pub fn register_cjk(&mut self, source: &CjkFontSource) -> Result<FontId, ContextError> {
        let face = match source {
            CjkFontSource::Predefined(font) => FontFace::Cid(*font),
            CjkFontSource::TrueType(font_path) => {
                FontFace::TrueType(Box::new(TrueTypeFont::from_path(font_path)?))
            }
        };
        Ok(self.register(face))
    }

    /// Helvetica, which every registry starts with.
    pub fn default_font(&self) -> FontId {
        FontId(0)
    }

    /// Retrieve the handle of a font by its name.
    pub fn lookup(&self, name: &str) -> Result<FontId, ContextError> {
        self.fonts
            .iter()
            .position(|font| font.face.name() == name)
            .map(FontId)
            .ok_or_else(|| {
                ContextError::with_context(format!("The font {:?} is not registered", name))
                    .of_kind(ErrorKind::Font)
            })
    }

    pub fn face(&self, font_id: FontId) -> &FontFace {
        &self.fonts[font_id.0].face
    }

    pub fn resource_name(&self, font_id: FontId) -> &str {
        &self.fonts[font_id.0].resource_name
    }

    /// Whether the font holds Chinese glyphs, which have no bold variant.
    pub fn is_cjk(&self, font_id: FontId) -> bool {
        !matches!(self.face(font_id), FontFace::Standard(_))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Width of the text in points when set at the given size.
    pub fn string_width(&self, font_id: FontId, text: &str, font_size: f32) -> f32 {
        let face = self.face(font_id);
        let total: u32 = text
            .nfc()
            .filter_map(|character| face.encode_char(character))
            .map(|(_, width)| width)
            .sum();
        total as f32 * font_size / 1000.0
    }

    /// Encodes the text for a `Tj` operand, characters the font cannot show are skipped.
    pub fn encode(&self, font_id: FontId, text: &str) -> Vec<u8> {
        let face = self.face(font_id);
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for character in text.nfc() {
            match face.encode_char(character) {
                Some((encoded, _)) => bytes.extend(encoded),
                None => log::warn!(
                    "Unable to find the character {:?} in the font {:?}",
                    character,
                    face.name()
                ),
            }
        }
        bytes
    }

    /// Inserts every registered font into the document and returns the font resource dictionary.
    pub(crate) fn insert_into_document(
        &self,
        inner_document: &mut lopdf::Document,
    ) -> lopdf::Dictionary {
        let mut font_dictionary = lopdf::Dictionary::new();
        for font in self.fonts.iter() {
            let dictionary = font.face.insert_into_document(inner_document);
            let font_object_id = inner_document.add_object(dictionary);
            font_dictionary.set(
                font.resource_name.clone(),
                lopdf::Object::Reference(font_object_id),
            );
        }
        font_dictionary
    }
}

fn cid_system_info(ordering: &str, supplement: i64) -> lopdf::Dictionary {
    lopdf::Dictionary::from_iter(vec![
        (
            "Registry",
            Object::String("Adobe".into(), StringFormat::Literal),
        ),
        (
            "Ordering",
            Object::String(ordering.into(), StringFormat::Literal),
        ),
        ("Supplement", Object::Integer(supplement)),
    ])
}

/// Generates the ToUnicode CMap of an embedded font from its glyph to character blocks.
fn generate_cid_to_unicode_map(face_name: &str, cmap_blocks: &[Vec<(u16, char)>]) -> String {
    let mut cid_to_unicode_map = format!(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /{face_name}-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n"
    );

    for cmap_block in cmap_blocks {
        cid_to_unicode_map.push_str(&format!("{} beginbfchar\n", cmap_block.len()));
        for (glyph_id, character) in cmap_block {
            let mut units = [0u16; 2];
            let unicode: String = character
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04x}"))
                .collect();
            cid_to_unicode_map.push_str(&format!("<{glyph_id:04x}> <{unicode}>\n"));
        }
        cid_to_unicode_map.push_str("endbfchar\n");
    }

    cid_to_unicode_map.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );

    cid_to_unicode_map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_widths_follow_the_metrics() {
        let registry = FontRegistry::new();
        let helvetica = registry.lookup("Helvetica").unwrap();
        let helvetica_bold = registry.lookup("Helvetica-Bold").unwrap();

        // H (722) + e (556) + l (222) + l (222) + o (556) = 2278
        assert!((registry.string_width(helvetica, "Hello", 10.0) - 22.78).abs() < 1e-3);
        // H (722) + e (556) + l (278) + l (278) + o (611) = 2445
        assert!((registry.string_width(helvetica_bold, "Hello", 10.0) - 24.45).abs() < 1e-3);
    }

    #[test]
    fn accented_letters_take_the_width_of_their_base_letter() {
        let registry = FontRegistry::new();
        let helvetica = registry.lookup("Helvetica").unwrap();

        assert_eq!(
            registry.string_width(helvetica, "\u{e9}", 12.0),
            registry.string_width(helvetica, "e", 12.0)
        );
        similar_asserts::assert_eq!(registry.encode(helvetica, "caf\u{e9}"), b"caf\xe9".to_vec());
    }

    #[test]
    fn bullets_and_dashes_use_the_win_ansi_codes() {
        let registry = FontRegistry::new();
        let helvetica = registry.lookup("Helvetica").unwrap();

        similar_asserts::assert_eq!(
            registry.encode(helvetica, "\u{2022} a \u{2013} b"),
            vec![0x95, b' ', b'a', b' ', 0x96, b' ', b'b']
        );
    }

    #[test]
    fn characters_outside_win_ansi_are_skipped() {
        let registry = FontRegistry::new();
        let helvetica = registry.lookup("Helvetica").unwrap();

        similar_asserts::assert_eq!(registry.encode(helvetica, "a\u{4e2d}b"), b"ab".to_vec());
        assert_eq!(
            registry.string_width(helvetica, "a\u{4e2d}b", 10.0),
            registry.string_width(helvetica, "ab", 10.0)
        );
    }

    #[test]
    fn cjk_text_is_encoded_as_ucs2() {
        let mut registry = FontRegistry::new();
        let cjk = registry.register_cjk(&CjkFontSource::default()).unwrap();

        assert!(registry.is_cjk(cjk));
        assert_eq!(registry.resource_name(cjk), "F3");
        similar_asserts::assert_eq!(
            registry.encode(cjk, "\u{4e2d}A"),
            vec![0x4e, 0x2d, 0x00, 0x41]
        );
        // One full em for the ideograph, 684/1000 for the Latin capital
        assert!((registry.string_width(cjk, "\u{4e2d}A", 10.0) - 16.84).abs() < 1e-3);
    }

    #[test]
    fn registering_twice_returns_the_same_handle() {
        let mut registry = FontRegistry::new();
        let first = registry.register_cjk(&CjkFontSource::default()).unwrap();
        let second = registry.register_cjk(&CjkFontSource::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unknown_fonts_are_reported() {
        let registry = FontRegistry::new();
        let error = registry.lookup("Comic Sans").unwrap_err();

        assert_eq!(error.kind, ErrorKind::Font);
    }

    #[test]
    fn missing_true_type_files_are_reported() {
        let mut registry = FontRegistry::new();
        let error = registry
            .register_cjk(&CjkFontSource::TrueType(PathBuf::from(
                "does/not/exist/NotoSansSC.ttf",
            )))
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Font);
    }

    fn fixture_font_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/DejaVuSansMono.ttf")
    }

    #[test]
    fn true_type_text_is_encoded_as_glyph_ids() {
        let mut registry = FontRegistry::new();
        let font_id = registry
            .register_cjk(&CjkFontSource::TrueType(fixture_font_path()))
            .unwrap();
        let FontFace::TrueType(font) = registry.face(font_id) else {
            panic!("expected an embedded face");
        };

        assert_eq!(registry.face(font_id).name(), "DejaVuSansMono");
        let glyph_a = font.face.glyph_id('A').unwrap();
        let glyph_z = font.face.glyph_id('z').unwrap();
        let mut expected = glyph_a.to_be_bytes().to_vec();
        expected.extend(glyph_z.to_be_bytes());
        similar_asserts::assert_eq!(registry.encode(font_id, "Az"), expected);
        // The face has no ideographs, they are left out
        similar_asserts::assert_eq!(registry.encode(font_id, "A\u{4e2d}z"), expected);
        // Monospaced: every glyph has the same advance
        assert_eq!(
            registry.string_width(font_id, "i", 10.0),
            registry.string_width(font_id, "W", 10.0)
        );
    }

    #[test]
    fn true_type_widths_and_unicode_map_follow_the_glyph_ids() {
        let font = TrueTypeFont::from_path(&fixture_font_path()).unwrap();
        let mut inner_document = lopdf::Document::with_version("1.5");
        let dictionary = font.insert_into_document(&mut inner_document);

        let descendant_fonts = dictionary.get(b"DescendantFonts").and_then(Object::as_array).unwrap();
        let descendant_font = descendant_fonts[0].as_dict().unwrap();
        let widths = descendant_font.get(b"W").and_then(Object::as_array).unwrap();
        assert_eq!(widths.len() % 2, 0);
        // Runs never touch: each one starts past the end of the previous one
        let mut next_free_glyph_id = 0;
        for run in widths.chunks(2) {
            let first = run[0].as_i64().unwrap();
            let run_widths = run[1].as_array().unwrap();
            assert!(first >= next_free_glyph_id);
            assert!(!run_widths.is_empty());
            next_free_glyph_id = first + run_widths.len() as i64 + 1;
        }

        let to_unicode_id = dictionary.get(b"ToUnicode").and_then(Object::as_reference).unwrap();
        let to_unicode = inner_document.get_object(to_unicode_id).and_then(Object::as_stream).unwrap();
        let to_unicode_map = std::str::from_utf8(&to_unicode.content).unwrap();
        let mut in_block = false;
        let mut block_high_byte = None;
        for line in to_unicode_map.lines() {
            if line.ends_with("beginbfchar") {
                in_block = true;
                block_high_byte = None;
            } else if line == "endbfchar" {
                in_block = false;
            } else if in_block {
                // `<gggg> <uuuu>`: the high byte of the glyph ID is constant within a block
                let high_byte = &line[1..3];
                assert_eq!(*block_high_byte.get_or_insert(high_byte.to_string()), high_byte);
            }
        }
        assert!(to_unicode_map.contains("beginbfchar"));
    }

    #[test]
    fn cjk_source_is_read_from_configuration_json() {
        let source: CjkFontSource = serde_json::from_str(r#"{"predefined": "MSung-Light"}"#).unwrap();
        assert_eq!(source, CjkFontSource::Predefined(CidFont::MSungLight));

        let source: CjkFontSource = serde_json::from_str(r#"{"trueType": "fonts/cjk.ttf"}"#).unwrap();
        assert_eq!(source, CjkFontSource::TrueType(PathBuf::from("fonts/cjk.ttf")));
    }
}
