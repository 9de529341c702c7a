use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    builders::{FirstColumn, HeaderStyle, TipKind},
    error::ContextError,
    style::Color,
};

/// The audience of a guide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    Admin,
    Collaborator,
}

impl GuideKind {
    pub const ALL: [GuideKind; 2] = [GuideKind::Admin, GuideKind::Collaborator];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuideKind::Admin => "admin",
            GuideKind::Collaborator => "collaborator",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
    Zh,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Zh => "zh",
        }
    }

    /// Whether the text of the language needs the CJK face.
    pub fn is_cjk(&self) -> bool {
        *self == Language::Zh
    }
}

/// The text of the cover page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    pub brand: String,
    pub title: String,
    /// Drawn one line under the other.
    pub subtitle: Vec<String>,
    pub version: String,
    pub notice: String,
}

/// The text of the header and footer of every page after the cover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningHeader {
    pub title: String,
    pub version: String,
    pub confidential: String,
    /// Contains `{page}`, replaced by the page number.
    pub page_label: String,
}

impl RunningHeader {
    pub fn page_label(&self, page_number: usize) -> String {
        self.page_label.replace("{page}", &page_number.to_string())
    }
}

/// The labels put in front of the callout texts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalloutLabels {
    pub tip: String,
    pub warning: String,
    pub info: String,
}

impl CalloutLabels {
    pub fn label(&self, kind: TipKind) -> &str {
        match kind {
            TipKind::Tip => &self.tip,
            TipKind::Warning => &self.warning,
            TipKind::Info => &self.info,
        }
    }
}

/// One element of the body of a guide, in reading order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Bullet {
        text: String,
    },
    Spacer {
        height: f32,
    },
    PageBreak,
    Toc {
        /// Pairs of section number and title.
        entries: Vec<(String, String)>,
    },
    Step {
        number: u32,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Tip {
        kind: TipKind,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_widths: Option<Vec<f32>>,
    },
    #[serde(rename_all = "camelCase")]
    StatusTable {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        column_widths: Vec<f32>,
    },
    #[serde(rename_all = "camelCase")]
    ShortcutTable {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        column_widths: Vec<f32>,
    },
    #[serde(rename_all = "camelCase")]
    ReferenceTable {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        column_widths: Vec<f32>,
        header_style: HeaderStyle,
        font_size: f32,
        first_column: FirstColumn,
    },
    /// A box in free colors, given as `#RRGGBB`.
    Callout {
        text: String,
        background: String,
        border: String,
    },
    ClosingBox {
        text: String,
    },
}

/// The complete content of one guide in one language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub guide: GuideKind,
    pub language: Language,
    /// Name of the generated file, inside the output directory.
    pub file_name: String,
    pub cover: Cover,
    pub header: RunningHeader,
    pub callout_labels: CalloutLabels,
    pub blocks: Vec<Block>,
}

impl Guide {
    /// One of the guides compiled into the binary.
    pub fn embedded(kind: GuideKind, language: Language) -> Result<Self, ContextError> {
        let content = match (kind, language) {
            (GuideKind::Admin, Language::En) => include_str!("../guides/admin-en.json"),
            (GuideKind::Admin, Language::Fr) => include_str!("../guides/admin-fr.json"),
            (GuideKind::Admin, Language::Zh) => include_str!("../guides/admin-zh.json"),
            (GuideKind::Collaborator, Language::En) => include_str!("../guides/collaborator-en.json"),
            (GuideKind::Collaborator, Language::Fr) => include_str!("../guides/collaborator-fr.json"),
            (GuideKind::Collaborator, Language::Zh) => include_str!("../guides/collaborator-zh.json"),
        };
        let guide: Guide = serde_json::from_str(content).map_err(|error| {
            ContextError::with_error(
                format!("Failed to parse the embedded {}-{} guide", kind.as_str(), language.as_str()),
                &error,
            )
            .of_kind(crate::error::ErrorKind::Content)
        })?;
        if guide.guide != kind || guide.language != language {
            return Err(ContextError::content(format!(
                "The embedded {}-{} guide declares itself as {}",
                kind.as_str(),
                language.as_str(),
                guide.key()
            )));
        }
        Ok(guide)
    }

    /// Every guide compiled into the binary, admin guides first.
    pub fn all_embedded() -> Result<Vec<Self>, ContextError> {
        GuideKind::ALL
            .iter()
            .flat_map(|kind| Language::ALL.iter().map(move |language| (*kind, *language)))
            .map(|(kind, language)| Guide::embedded(kind, language))
            .collect()
    }

    /// Reads a guide from a JSON file.
    pub fn from_path(guide_path: &Path) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(guide_path).map_err(|error| {
            ContextError::io(format!("Failed to read the guide file {:?}", guide_path), &error)
        })?;
        serde_json::from_str(&content).map_err(|error| {
            ContextError::with_error(format!("Failed to parse the guide file {:?}", guide_path), &error)
                .of_kind(crate::error::ErrorKind::Content)
        })
    }

    /// The stable name of the guide, such as `admin-en`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.guide.as_str(), self.language.as_str())
    }

    pub fn toc_entries(&self) -> &[(String, String)] {
        self.blocks
            .iter()
            .find_map(|block| match block {
                Block::Toc { entries } => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Checks the shape of the content before anything is laid out: table rows against their
    /// header, column widths against the columns, heading levels and callout colors.
    pub fn validate(&self) -> Result<(), ContextError> {
        for (index, block) in self.blocks.iter().enumerate() {
            let context = |message: String| {
                ContextError::content(format!("Block {} of the {} guide: {}", index, self.key(), message))
            };
            match block {
                Block::Heading { level, .. } if !(1..=3).contains(level) => {
                    return Err(context(format!("the heading level {} is not supported", level)));
                }
                Block::Table {
                    header,
                    rows,
                    column_widths,
                } => check_table(header, rows, column_widths.as_deref()).map_err(context)?,
                Block::StatusTable {
                    header,
                    rows,
                    column_widths,
                }
                | Block::ShortcutTable {
                    header,
                    rows,
                    column_widths,
                }
                | Block::ReferenceTable {
                    header,
                    rows,
                    column_widths,
                    ..
                } => check_table(header, rows, Some(column_widths.as_slice())).map_err(context)?,
                Block::Callout {
                    background, border, ..
                } => {
                    Color::from_hex(background)?;
                    Color::from_hex(border)?;
                }
                Block::Spacer { height } if *height < 0.0 => {
                    return Err(context(format!("the spacer height {} is negative", height)));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn check_table(header: &[String], rows: &[Vec<String>], column_widths: Option<&[f32]>) -> Result<(), String> {
    if header.is_empty() {
        return Err("the table has no columns".into());
    }
    if let Some(widths) = column_widths {
        if widths.len() != header.len() {
            return Err(format!(
                "{} column widths are given for {} columns",
                widths.len(),
                header.len()
            ));
        }
    }
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != header.len() {
            return Err(format!(
                "row {} has {} cells but the header has {}",
                row_index + 1,
                row.len(),
                header.len()
            ));
        }
    }
    Ok(())
}
