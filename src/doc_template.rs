use std::collections::VecDeque;

use crate::{
    canvas::Canvas,
    error::ContextError,
    flowables::{RenderNode, Story},
    fonts::FontRegistry,
    pdf::{centimeters_to_points, DocumentInfo, PdfDocument, A4_HEIGHT, A4_WIDTH},
};

/// Inner padding of the frame on each side, in points.
const FRAME_PADDING: f32 = 6.0;

/// What a decorator knows about the page it draws on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageContext {
    /// 1-based, the cover is page 1.
    pub page_number: usize,
    pub page_width: f32,
    pub page_height: f32,
}

/// Draws the fixed elements of a page before its content.
pub type PageDecorator<'a> = Box<dyn Fn(&mut Canvas, &PageContext) -> Result<(), ContextError> + 'a>;

/// Page margins in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    /// 2.2cm at the top to leave room for the header band, 2cm elsewhere.
    pub fn guide() -> Self {
        Margins {
            top: centimeters_to_points(2.2),
            bottom: centimeters_to_points(2.0),
            left: centimeters_to_points(2.0),
            right: centimeters_to_points(2.0),
        }
    }
}

/// The outcome of offering a node to a frame.
pub enum AddResult {
    Placed,
    /// The first part was placed, the rest goes to the next frame.
    Split(RenderNode),
    /// Nothing was placed, the node goes to the next frame whole.
    Overflow(RenderNode),
}

/// The single content area of a page, filled from the top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    cursor_y: f32,
    at_top: bool,
}

impl Frame {
    pub fn new(x: f32, bottom: f32, width: f32, height: f32) -> Self {
        Frame {
            x,
            bottom,
            width,
            height,
            cursor_y: bottom + height,
            at_top: true,
        }
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }

    pub fn remaining_height(&self) -> f32 {
        (self.cursor_y - self.bottom).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.at_top
    }

    /// Places the node below the previous one. The space before a node is dropped at the top
    /// of the frame, the space after it is always kept.
    pub fn add(&mut self, node: RenderNode, canvas: &mut Canvas) -> AddResult {
        let fonts = canvas.fonts();
        let space_before = if self.at_top { 0.0 } else { node.space_before() };
        let available_height = self.cursor_y - space_before - self.bottom;
        if available_height <= 0.0 && !self.at_top {
            return AddResult::Overflow(node);
        }

        let height = node.wrap(self.width, fonts);
        if height <= available_height + 1e-3 {
            self.place(&node, height, space_before, canvas);
            return AddResult::Placed;
        }

        if let Some((first, rest)) = node.split(self.width, available_height, fonts) {
            let first_height = first.wrap(self.width, fonts);
            if first_height > 0.0 && first_height <= available_height + 1e-3 {
                self.place(&first, first_height, space_before, canvas);
                return AddResult::Split(rest);
            }
        }

        if self.at_top {
            log::warn!(
                "A node of {:.1}pt does not fit into an empty frame of {:.1}pt, it overflows the page",
                height,
                available_height
            );
            self.place(&node, height, space_before, canvas);
            return AddResult::Placed;
        }

        AddResult::Overflow(node)
    }

    fn place(&mut self, node: &RenderNode, height: f32, space_before: f32, canvas: &mut Canvas) {
        let top = self.cursor_y - space_before;
        node.draw(canvas, self.x, top, self.width);
        self.cursor_y = top - height - node.space_after();
        self.at_top = false;
    }
}

/// Lays a story out on A4 pages and runs the page decorators.
pub struct DocTemplate<'a> {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    identifier: String,
    info: DocumentInfo,
    on_first_page: Option<PageDecorator<'a>>,
    on_later_pages: Option<PageDecorator<'a>>,
}

impl<'a> DocTemplate<'a> {
    pub fn new(identifier: String, info: DocumentInfo) -> Self {
        DocTemplate {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margins: Margins::guide(),
            identifier,
            info,
            on_first_page: None,
            on_later_pages: None,
        }
    }

    pub fn on_first_page<F>(mut self, decorator: F) -> Self
    where
        F: Fn(&mut Canvas, &PageContext) -> Result<(), ContextError> + 'a,
    {
        self.on_first_page = Some(Box::new(decorator));
        self
    }

    pub fn on_later_pages<F>(mut self, decorator: F) -> Self
    where
        F: Fn(&mut Canvas, &PageContext) -> Result<(), ContextError> + 'a,
    {
        self.on_later_pages = Some(Box::new(decorator));
        self
    }

    /// A fresh frame inside the margins, shrunk by the frame padding.
    pub fn frame(&self) -> Frame {
        Frame::new(
            self.margins.left + FRAME_PADDING,
            self.margins.bottom + FRAME_PADDING,
            self.page_width - self.margins.left - self.margins.right - 2.0 * FRAME_PADDING,
            self.page_height - self.margins.top - self.margins.bottom - 2.0 * FRAME_PADDING,
        )
    }

    fn begin_page(&self, canvas: &mut Canvas) -> Result<Frame, ContextError> {
        let context = PageContext {
            page_number: canvas.page_number(),
            page_width: self.page_width,
            page_height: self.page_height,
        };
        let decorator = if context.page_number == 1 {
            &self.on_first_page
        } else {
            &self.on_later_pages
        };
        if let Some(decorator) = decorator {
            decorator(canvas, &context)?;
        }
        Ok(self.frame())
    }

    /// Flows the story through as many pages as needed. A page break starts a new page,
    /// unless it is the last node of the story.
    pub fn build(&self, story: Story, fonts: &FontRegistry) -> Result<PdfDocument, ContextError> {
        let mut canvas = Canvas::new(fonts, self.page_width, self.page_height);
        let mut queue: VecDeque<RenderNode> = story.into_nodes().into();
        let mut frame = self.begin_page(&mut canvas)?;

        while let Some(node) = queue.pop_front() {
            if node == RenderNode::PageBreak {
                if !queue.is_empty() {
                    canvas.show_page();
                    frame = self.begin_page(&mut canvas)?;
                }
                continue;
            }
            match frame.add(node, &mut canvas) {
                AddResult::Placed => {}
                AddResult::Split(rest) => {
                    log::debug!("Continuing a split node on page {}", canvas.page_number() + 1);
                    queue.push_front(rest);
                    canvas.show_page();
                    frame = self.begin_page(&mut canvas)?;
                }
                AddResult::Overflow(node) => {
                    queue.push_front(node);
                    canvas.show_page();
                    frame = self.begin_page(&mut canvas)?;
                }
            }
        }
        canvas.show_page();

        let pages = canvas.finish();
        log::debug!("Laid out {} pages for {:?}", pages.len(), self.info.title);
        let mut pdf_document = PdfDocument::new(self.identifier.clone(), self.info.clone());
        for page in pages {
            pdf_document.add_page(page);
        }
        Ok(pdf_document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        paragraph::Paragraph,
        pdf::document_identifier,
        style::{Script, StyleName, StyleRegistry},
    };
    use std::cell::RefCell;

    fn template<'a>() -> DocTemplate<'a> {
        DocTemplate::new(document_identifier("test"), DocumentInfo::default())
    }

    #[test]
    fn the_frame_sits_inside_the_margins() {
        let frame = template().frame();

        assert!((frame.x - (centimeters_to_points(2.0) + 6.0)).abs() < 1e-3);
        assert!((frame.width - (A4_WIDTH - centimeters_to_points(4.0) - 12.0)).abs() < 1e-3);
        assert!((frame.top() - (A4_HEIGHT - centimeters_to_points(2.2) - 6.0)).abs() < 1e-3);
    }

    #[test]
    fn decorators_run_once_per_page_with_the_page_number() {
        let fonts = FontRegistry::new();
        let first_pages = RefCell::new(Vec::new());
        let later_pages = RefCell::new(Vec::new());
        let mut story = Story::new();
        story.push(RenderNode::spacer(1.0));
        story.push(RenderNode::PageBreak);
        story.push(RenderNode::spacer(10.0));
        story.push(RenderNode::PageBreak);
        story.push(RenderNode::spacer(10.0));
        story.push(RenderNode::PageBreak);

        let pdf_document = template()
            .on_first_page(|_, context| {
                first_pages.borrow_mut().push(context.page_number);
                Ok(())
            })
            .on_later_pages(|_, context| {
                later_pages.borrow_mut().push(context.page_number);
                Ok(())
            })
            .build(story, &fonts)
            .unwrap();

        assert_eq!(pdf_document.pages().len(), 3);
        similar_asserts::assert_eq!(first_pages.into_inner(), vec![1]);
        similar_asserts::assert_eq!(later_pages.into_inner(), vec![2, 3]);
    }

    #[test]
    fn decorator_errors_abort_the_build() {
        let fonts = FontRegistry::new();
        let mut story = Story::new();
        story.push(RenderNode::spacer(1.0));

        let result = template()
            .on_first_page(|_, _| Err(ContextError::with_context("No cover")))
            .build(story, &fonts);
        assert!(result.is_err());
    }

    #[test]
    fn long_stories_flow_onto_new_pages() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let mut story = Story::new();
        for _ in 0..12 {
            story.push(Paragraph::new(
                &"The dashboard lists every vehicle order. ".repeat(20),
                styles.get(StyleName::Body),
            ));
        }

        let pdf_document = template().build(story, &fonts).unwrap();
        assert!(pdf_document.pages().len() > 2);
    }

    #[test]
    fn nodes_taller_than_a_page_are_still_placed() {
        let fonts = FontRegistry::new();
        let mut story = Story::new();
        story.push(RenderNode::spacer(2000.0));
        story.push(RenderNode::spacer(10.0));

        let pdf_document = template().build(story, &fonts).unwrap();
        assert_eq!(pdf_document.pages().len(), 2);
    }

    #[test]
    fn space_before_is_dropped_at_the_top_of_the_frame() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let heading = styles.get(StyleName::Heading1);
        let mut canvas = Canvas::new(&fonts, A4_WIDTH, A4_HEIGHT);
        let mut frame = template().frame();
        let top = frame.top();

        frame.add(Paragraph::new("Overview", heading).into(), &mut canvas);
        let after_first = top - heading.leading - heading.space_after;
        assert!((frame.remaining_height() - (after_first - frame.bottom)).abs() < 1e-3);

        frame.add(Paragraph::new("Details", heading).into(), &mut canvas);
        let after_second = after_first - heading.space_before - heading.leading - heading.space_after;
        assert!((frame.remaining_height() - (after_second - frame.bottom)).abs() < 1e-3);
    }
}
