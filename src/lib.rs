//! Guidepress generates the administrator and collaborator user guides of the Driveby Africa
//! platform as PDF documents, in English, French and Chinese.
//!
//! The content of every guide is a JSON document, represented by the `Guide` struct, which is
//! compiled into the crate. A guide is turned into a `Story` of render nodes by the box builders,
//! the story is flowed through A4 pages by a `DocTemplate` which calls the page decorators
//! for the cover and the running header and footer, and the pages are finally written out
//! through the `PdfDocument` interface.
//!
//! The output is deterministic: rendering the same guide twice yields the same bytes, since
//! neither the identifiers nor the dates of the documents depend on the moment of the run.

/// This module contains the `ContextError` type which is the error type used throughout this library.
///
/// Every failure of the generation is fatal. The `ErrorKind` of an error tells whether the content of
/// a guide is malformed, a font is unusable, a file could not be read or written, or the rendering itself failed.
/// If an error happened in a function of another crate, then its message is kept as the source of the error.
pub mod error;

/// The fonts a document is typeset with.
///
/// The `FontRegistry` always holds the standard Helvetica faces, whose metrics are built in, and
/// optionally a face for the Chinese text: either one of the predefined CID fonts (STSong-Light by default),
/// which PDF viewers resolve without embedding anything, or a TrueType file which is embedded.
pub mod fonts;

/// The module where the `PdfDocument` interface for working with PDF documents is presented.
///
/// It wraps a `lopdf::Document`, writes the page content streams and the font resources into it,
/// and fills in the information dictionary and the trailer identifiers with fixed values.
pub mod pdf;

/// A page-oriented drawing surface recording PDF operations, in points from the bottom-left corner.
pub mod canvas;

/// The inline markup of the guide text: `<b>` runs, `<br/>` breaks and the XML entities.
pub mod markup;

/// Line breaking and drawing of styled paragraphs.
pub mod paragraph;

/// Grid tables with per-cell styling commands, rounded corners and row splitting across pages.
pub mod table;

/// The render nodes of a story and the `Story` itself.
pub mod flowables;

/// The page template: margins, the frame in which the story is flowed and the page decorators.
///
/// # Layout
///
/// Nodes are placed top to bottom in the frame of the current page. A node which doesn't fit is split
/// when it can be (paragraphs by lines, tables by rows), otherwise it is moved to the next page. A node
/// which doesn't even fit an empty frame is drawn anyway and a warning is logged.
pub mod doc_template;

/// The named paragraph styles and the brand colors of the guides.
pub mod style;

/// The content model of a guide and the guides compiled into the crate.
pub mod guide;

/// The box builders: callouts, numbered steps, data tables, table of contents rows and bullets.
pub mod builders;

/// The cover page and the running header and footer of the later pages.
pub mod decorators;

/// The configuration of a generation run.
pub mod configuration;

/// Assembling the story of a guide and rendering it to a PDF file.
pub mod assembler;
