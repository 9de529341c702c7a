use lopdf::{content::Operation, Object, StringFormat};
use std::{io::BufWriter, mem, path::Path};
use time::OffsetDateTime;

use crate::{error::ContextError, fonts::FontRegistry};

/// Number of PDF points (1/72 inch) in a millimeter.
pub const POINTS_PER_MILLIMETER: f32 = 72.0 / 25.4;

/// Width of an A4 page in points.
pub const A4_WIDTH: f32 = 595.2756;

/// Height of an A4 page in points.
pub const A4_HEIGHT: f32 = 841.8898;

/// Converts millimeters to points. This function is used in order to present the data
/// in the format required by the PDF specification, while the layout is easier to reason
/// about in millimeters.
pub fn millimeters_to_points(millimeters: f32) -> f32 {
    millimeters * POINTS_PER_MILLIMETER
}

/// Converts centimeters to points.
pub fn centimeters_to_points(centimeters: f32) -> f32 {
    millimeters_to_points(centimeters * 10.0)
}

/// The representation of a PDF page: its size in points and the content operations drawn on it.
#[derive(Debug, Clone)]
pub struct PdfPage {
    pub width: f32,
    pub height: f32,
    pub(crate) operations: Vec<Operation>,
}

impl PdfPage {
    pub fn new(width: f32, height: f32, operations: Vec<Operation>) -> Self {
        PdfPage {
            width,
            height,
            operations,
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Encodes the operations of the page into its content stream.
    fn content_stream(&self) -> Result<lopdf::Stream, ContextError> {
        let stream_content = lopdf::content::Content {
            operations: self.operations.clone(),
        };
        let encoded_content = stream_content
            .encode()
            .map_err(|error| ContextError::with_error("Failed to encode the page content", &error))?;

        Ok(lopdf::Stream::new(lopdf::Dictionary::new(), encoded_content))
    }
}

/// The entries of the document information dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
}

/// This struct represents the actual PDF document on a high-level. It is an interface to the actual underlying
/// `lopdf::Document` with the addition of the PDF pages, the document ID and the document information.
pub struct PdfDocument {
    /// The underlying PDF document: this is a low-level interface and shouldn't be directly interacted with
    /// unless strictly necessary, anyway this is why it is exposed to the user.
    pub inner_document: lopdf::Document,
    /// The identifier of the document, it is used to in order to set the PDF `ID` tag.
    pub identifier: String,
    pub info: DocumentInfo,
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` by defaulting the underlying PDF document to version 1.5
    /// of the PDF specification and customly specifying the PDF identifier.
    pub fn new(pdf_document_identifier: String, info: DocumentInfo) -> Self {
        PdfDocument {
            inner_document: lopdf::Document::with_version("1.5"),
            identifier: pdf_document_identifier,
            info,
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page: PdfPage) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[PdfPage] {
        &self.pages
    }

    /// Write the pages and the fonts to the underlying document and finalize it.
    ///
    /// The instance ID is the second half of the `ID` entry of the trailer. It is passed
    /// in rather than generated so that rendering the same guide twice yields the same bytes.
    pub fn write_all(&mut self, instance_id: String, fonts: &FontRegistry) -> Result<(), ContextError> {
        use lopdf::Object::*;

        if self.pages.is_empty() {
            return Err(ContextError::with_context(
                "Unable to write a PDF document without pages",
            ));
        }

        // The dates are pinned to the epoch, a timestamp would make every run differ
        let epoch = to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH);
        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", Name("False".into())),
            ("CreationDate", String(epoch.clone().into_bytes(), StringFormat::Literal)),
            ("ModDate", String(epoch.into_bytes(), StringFormat::Literal)),
            ("Title", text_string(&self.info.title)),
            ("Author", text_string(&self.info.author)),
            ("Subject", text_string(&self.info.subject)),
            ("Creator", text_string(&self.info.creator)),
            (
                "Producer",
                text_string(concat!("guidepress ", env!("CARGO_PKG_VERSION"))),
            ),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        let pages_id = self.inner_document.new_object_id();
        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("Catalog".into())),
            ("PageLayout", Name("OneColumn".into())),
            ("PageMode", Name("UseNone".into())),
            ("Pages", Reference(pages_id)),
        ]);
        let catalog_id = self.inner_document.add_object(catalog);

        self.inner_document.trailer.set("Root", Reference(catalog_id));
        self.inner_document
            .trailer
            .set("Info", Reference(document_info_id));
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), StringFormat::Literal),
                String(instance_id.into_bytes(), StringFormat::Literal),
            ]),
        );

        // Every page shares the same resources, which reference all of the registered fonts
        let fonts_dictionary = fonts.insert_into_document(&mut self.inner_document);
        let fonts_dictionary_id = self.inner_document.add_object(fonts_dictionary);
        let resources = lopdf::Dictionary::from_iter(vec![
            ("Font", Reference(fonts_dictionary_id)),
            (
                "ProcSet",
                Array(vec![Name("PDF".into()), Name("Text".into())]),
            ),
        ]);
        let resources_id = self.inner_document.add_object(resources);

        let mut page_ids = Vec::<Object>::new();
        for page in self.pages.iter() {
            let content_id = self.inner_document.add_object(page.content_stream()?);
            let media_box = Array(vec![
                Integer(0),
                Integer(0),
                Real(page.width),
                Real(page.height),
            ]);
            let page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", Name("Page".into())),
                ("Parent", Reference(pages_id)),
                ("MediaBox", media_box.clone()),
                ("TrimBox", media_box),
                ("Rotate", Integer(0)),
                ("Resources", Reference(resources_id)),
                ("Contents", Reference(content_id)),
            ]);
            page_ids.push(Reference(self.inner_document.add_object(page_dictionary)));
        }

        let pages = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("Pages".into())),
            ("Count", Integer(self.pages.len() as i64)),
            ("Kids", Array(page_ids)),
        ]);
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        Ok(())
    }

    /// Optimize the PDF document (only superficially).
    pub fn optimize(&mut self) {
        self.inner_document.prune_objects();
        self.inner_document.delete_zero_length_streams();
        self.inner_document.renumber_objects();
        self.inner_document.compress();
    }

    /// Save the `PdfDocument` to bytes in order for it to be written to a file or further processed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, ContextError> {
        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        self.inner_document.save_to(&mut writer).map_err(|error| {
            ContextError::with_error("Error while saving the PDF document to bytes", &error)
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    /// Save the `PdfDocument` to the given path, replacing any existing file.
    pub fn save_to_file(&mut self, pdf_path: &Path) -> Result<(), ContextError> {
        let pdf_document_bytes = self.save_to_bytes()?;
        std::fs::write(pdf_path, pdf_document_bytes).map_err(|error| {
            ContextError::io(format!("Failed to write the PDF file {:?}", pdf_path), &error)
        })
    }
}

/// Derives the 32 characters identifier of a document from a stable key, such as `admin-en`.
pub fn document_identifier(key: &str) -> String {
    let mut identifier: String = key.bytes().map(|byte| format!("{:02X}", byte)).collect();
    identifier.truncate(32);
    format!("{:0<32}", identifier)
}

/// Encodes a string of the information dictionary, non ASCII text becomes UTF-16BE with a byte order mark.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(text.encode_utf16().flat_map(|unit| unit.to_be_bytes()));
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Formats the given time so that it matches what the PDF specification expects.
/// An example of it is the following: D:20170505150224+02'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_page_document() -> PdfDocument {
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(b"Hello".to_vec(), StringFormat::Hexadecimal)],
            ),
            Operation::new("ET", vec![]),
        ];
        let mut pdf_document = PdfDocument::new(
            document_identifier("admin-en"),
            DocumentInfo {
                title: "Guide".into(),
                ..Default::default()
            },
        );
        pdf_document.add_page(PdfPage::new(A4_WIDTH, A4_HEIGHT, operations));
        pdf_document
    }

    #[test]
    fn epoch_is_formatted_as_a_pdf_date() {
        similar_asserts::assert_eq!(
            to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH),
            "D:19700101000000+00'00'"
        );
    }

    #[test]
    fn identifiers_are_padded_to_32_characters() {
        let identifier = document_identifier("admin-en");
        assert_eq!(identifier.len(), 32);
        assert!(identifier.starts_with("61646D696E2D656E"));
        assert_eq!(document_identifier("collaborator-zh-and-a-very-long-suffix").len(), 32);
    }

    #[test]
    fn written_documents_can_be_loaded_back() {
        let mut pdf_document = single_page_document();
        pdf_document
            .write_all(document_identifier("instance"), &FontRegistry::new())
            .unwrap();
        pdf_document.optimize();
        let bytes = pdf_document.save_to_bytes().unwrap();

        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn documents_without_pages_are_rejected() {
        let mut pdf_document = PdfDocument::new(document_identifier("empty"), DocumentInfo::default());
        assert!(pdf_document
            .write_all(document_identifier("instance"), &FontRegistry::new())
            .is_err());
    }

    #[test]
    fn non_ascii_metadata_is_encoded_as_utf16() {
        match text_string("\u{6307}\u{5357}") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                similar_asserts::assert_eq!(bytes, vec![0xFE, 0xFF, 0x63, 0x07, 0x53, 0x57])
            }
            other => panic!("unexpected object {:?}", other),
        }
    }
}
