use std::path::PathBuf;

use crate::{
    builders::BoxBuilder,
    configuration::GeneratorConfiguration,
    decorators::PageChrome,
    doc_template::DocTemplate,
    error::ContextError,
    flowables::{RenderNode, Story},
    fonts::FontRegistry,
    guide::{Block, Guide},
    paragraph::Paragraph,
    pdf::{document_identifier, DocumentInfo},
    style::{Color, Script, StyleName, StyleRegistry},
};

/// Maps the blocks of a guide to render nodes, in reading order, after the blank cover page.
pub fn assemble_story(guide: &Guide, builder: &BoxBuilder) -> Result<Story, ContextError> {
    let styles = builder.styles();
    let mut story = Story::new();
    // The cover is drawn by the first page decorator alone
    story.push(RenderNode::spacer(1.0));
    story.push(RenderNode::PageBreak);

    for block in &guide.blocks {
        match block {
            Block::Heading { level, text } => story.push(Paragraph::new(text, styles.heading(*level)?)),
            Block::Paragraph { text } => story.push(Paragraph::new(text, styles.get(StyleName::Body))),
            Block::Bullet { text } => story.push(builder.make_bullet(text)),
            Block::Spacer { height } => story.push(RenderNode::spacer(*height)),
            Block::PageBreak => story.push(RenderNode::PageBreak),
            Block::Toc { entries } => story.extend(
                entries
                    .iter()
                    .map(|(number, title)| builder.make_toc_row(number, title)),
            ),
            Block::Step {
                number,
                title,
                description,
            } => story.push(builder.make_numbered_step(
                *number,
                title,
                description.as_deref().unwrap_or_default(),
            )),
            Block::Tip { kind, text } => story.push(builder.make_tip_box(text, *kind)),
            Block::Table {
                header,
                rows,
                column_widths,
            } => story.push(builder.make_table(header, rows, column_widths.as_deref())?),
            Block::StatusTable {
                header,
                rows,
                column_widths,
            } => story.push(builder.make_status_table(header, rows, column_widths)?),
            Block::ShortcutTable {
                header,
                rows,
                column_widths,
            } => story.push(builder.make_shortcut_table(header, rows, column_widths)?),
            Block::ReferenceTable {
                header,
                rows,
                column_widths,
                header_style,
                font_size,
                first_column,
            } => story.push(builder.make_reference_table(
                header,
                rows,
                column_widths,
                *header_style,
                *font_size,
                *first_column,
            )?),
            Block::Callout {
                text,
                background,
                border,
            } => story.push(builder.make_callout(
                text,
                Color::from_hex(background)?,
                Color::from_hex(border)?,
            )),
            Block::ClosingBox { text } => story.push(builder.make_closing_box(text)),
        }
    }

    log::debug!("Assembled {} nodes for the {} guide", story.len(), guide.key());
    Ok(story)
}

/// Renders a guide to the bytes of a PDF file.
pub fn render_guide(guide: &Guide, configuration: &GeneratorConfiguration) -> Result<Vec<u8>, ContextError> {
    guide.validate()?;

    let mut fonts = FontRegistry::new();
    let script = if guide.language.is_cjk() {
        Script::Cjk(fonts.register_cjk(&configuration.cjk_font)?)
    } else {
        Script::Latin
    };
    let styles = StyleRegistry::new(&fonts, script)?;
    let chrome = PageChrome::new(guide, &fonts, script)?;
    let builder = BoxBuilder::new(&styles, &guide.callout_labels);
    let story = assemble_story(guide, &builder)?;

    let key = guide.key();
    let info = DocumentInfo {
        title: guide.cover.title.clone(),
        author: configuration.document_author.clone(),
        subject: guide.header.title.clone(),
        creator: format!("guidepress {}", env!("CARGO_PKG_VERSION")),
    };
    let mut pdf_document = DocTemplate::new(document_identifier(&key), info)
        .on_first_page(|canvas, context| chrome.draw_cover(canvas, context))
        .on_later_pages(|canvas, context| chrome.header_footer(canvas, context))
        .build(story, &fonts)?;

    pdf_document.write_all(document_identifier(&format!("{}-instance", key)), &fonts)?;
    pdf_document.optimize();
    pdf_document.save_to_bytes()
}

/// Renders a guide and writes it into the output directory, which is created when missing.
pub fn generate_guide(guide: &Guide, configuration: &GeneratorConfiguration) -> Result<PathBuf, ContextError> {
    let pdf_document_bytes = render_guide(guide, configuration)?;

    std::fs::create_dir_all(&configuration.output_directory).map_err(|error| {
        ContextError::io(
            format!(
                "Failed to create the output directory {:?}",
                configuration.output_directory
            ),
            &error,
        )
    })?;
    let pdf_path = configuration.output_path(&guide.file_name);
    std::fs::write(&pdf_path, &pdf_document_bytes).map_err(|error| {
        ContextError::io(format!("Failed to write the PDF file {:?}", pdf_path), &error)
    })?;

    log::info!(
        "Generated the {} guide ({} bytes) at {:?}",
        guide.key(),
        pdf_document_bytes.len(),
        pdf_path
    );
    Ok(pdf_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        guide::{GuideKind, Language},
    };

    fn story_of(guide: &Guide) -> Story {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let builder = BoxBuilder::new(&styles, &guide.callout_labels);
        assemble_story(guide, &builder).unwrap()
    }

    #[test]
    fn the_story_starts_with_the_cover_page() {
        let guide = Guide::embedded(GuideKind::Admin, Language::En).unwrap();
        let story = story_of(&guide);

        assert_eq!(story.nodes()[0], RenderNode::spacer(1.0));
        assert_eq!(story.nodes()[1], RenderNode::PageBreak);
        // Every TOC entry becomes its own row
        let expected_length = 2 + guide.blocks.len() + guide.toc_entries().len() - 1;
        assert_eq!(story.len(), expected_length);
    }

    #[test]
    fn blocks_keep_their_order() {
        let mut guide = Guide::embedded(GuideKind::Collaborator, Language::En).unwrap();
        guide.blocks = vec![
            Block::Heading {
                level: 1,
                text: "1. Welcome".to_string(),
            },
            Block::Paragraph {
                text: "First <b>words</b>".to_string(),
            },
            Block::PageBreak,
            Block::Spacer { height: 12.0 },
        ];
        let story = story_of(&guide);

        similar_asserts::assert_eq!(story.nodes()[2].plain_text(), vec!["1. Welcome".to_string()]);
        similar_asserts::assert_eq!(story.nodes()[3].plain_text(), vec!["First words".to_string()]);
        assert_eq!(story.nodes()[4], RenderNode::PageBreak);
        assert_eq!(story.nodes()[5], RenderNode::spacer(12.0));
    }

    #[test]
    fn malformed_callout_colors_are_content_errors() {
        let mut guide = Guide::embedded(GuideKind::Collaborator, Language::Fr).unwrap();
        guide.blocks = vec![Block::Callout {
            text: "Note".to_string(),
            background: "orange".to_string(),
            border: "#E0E0E0".to_string(),
        }];
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let builder = BoxBuilder::new(&styles, &guide.callout_labels);

        let error = assemble_story(&guide, &builder).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Content);
    }

    #[test]
    fn mismatched_rows_stop_the_rendering() {
        let mut guide = Guide::embedded(GuideKind::Admin, Language::Fr).unwrap();
        guide.blocks.push(Block::Table {
            header: vec!["A".to_string(), "B".to_string()],
            rows: vec![vec!["only one".to_string()]],
            column_widths: None,
        });

        let error = render_guide(&guide, &GeneratorConfiguration::default()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Content);
    }
}
