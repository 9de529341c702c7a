use crate::{
    canvas::Canvas,
    fonts::FontRegistry,
    markup::{self, Fragment},
    style::{Alignment, StyleSpec},
};

/// Slack allowed when comparing widths, to absorb the rounding of the summed advances.
const WIDTH_TOLERANCE: f32 = 1e-3;

/// A run of characters sharing the same weight.
#[derive(Clone, Debug, PartialEq)]
struct Piece {
    text: String,
    bold: bool,
}

/// An unbreakable unit of a line: a word, or a single ideograph.
#[derive(Clone, Debug, PartialEq)]
struct Atom {
    pieces: Vec<Piece>,
    /// Whether collapsed whitespace separates the atom from the previous one.
    gap_before: bool,
}

impl Atom {
    fn push(&mut self, character: char, bold: bool) {
        match self.pieces.last_mut() {
            Some(piece) if piece.bold == bold => piece.text.push(character),
            _ => self.pieces.push(Piece {
                text: character.to_string(),
                bold,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Atom(Atom),
    Break,
}

/// A piece of text positioned on a line, `x` is relative to the start of the line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineRun {
    pub text: String,
    pub bold: bool,
    pub x: f32,
    pub width: f32,
}

/// One typeset line of a paragraph.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub runs: Vec<LineRun>,
    /// Width of the content before any justification.
    pub width: f32,
}

impl Line {
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|run| run.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Characters that may be broken around without a space: ideographs, kana, hangul and
/// their full width punctuation.
pub fn is_cjk_character(character: char) -> bool {
    matches!(
        character as u32,
        0x2E80..=0x9FFF | 0xAC00..=0xD7AF | 0xF900..=0xFAFF | 0xFE30..=0xFE4F | 0xFF00..=0xFFEF | 0x20000..=0x2FA1F
    )
}

/// Splits the fragments into atoms and forced breaks. Runs of whitespace collapse into a
/// single gap, and whitespace at the start of a line is dropped.
fn tokenize(fragments: &[Fragment]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<Atom> = None;
    let mut pending_gap = false;

    for fragment in fragments {
        match fragment {
            Fragment::LineBreak => {
                tokens.extend(current.take().map(Token::Atom));
                tokens.push(Token::Break);
                pending_gap = false;
            }
            Fragment::Text { text, bold } => {
                for character in text.chars() {
                    if character.is_whitespace() && character != '\u{a0}' {
                        tokens.extend(current.take().map(Token::Atom));
                        // A gap only exists between two atoms of the same line
                        pending_gap = !matches!(tokens.last(), None | Some(Token::Break));
                    } else if is_cjk_character(character) {
                        tokens.extend(current.take().map(Token::Atom));
                        let mut atom = Atom {
                            pieces: Vec::new(),
                            gap_before: pending_gap,
                        };
                        atom.push(character, *bold);
                        tokens.push(Token::Atom(atom));
                        pending_gap = false;
                    } else {
                        let atom = current.get_or_insert_with(|| Atom {
                            pieces: Vec::new(),
                            gap_before: std::mem::take(&mut pending_gap),
                        });
                        atom.push(character, *bold);
                    }
                }
            }
        }
    }
    tokens.extend(current.take().map(Token::Atom));

    tokens
}

/// A block of text in a single style, broken into lines at layout time.
///
/// A split paragraph keeps its whole text and only shows a window of its lines, so that
/// both halves break exactly like the unsplit paragraph would.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    fragments: Vec<Fragment>,
    pub style: StyleSpec,
    first_line: usize,
    line_count: Option<usize>,
}

impl Paragraph {
    pub fn new(text: &str, style: &StyleSpec) -> Self {
        Paragraph {
            fragments: markup::parse(text),
            style: style.clone(),
            first_line: 0,
            line_count: None,
        }
    }

    pub fn plain_text(&self) -> String {
        markup::plain_text(&self.fragments)
    }

    /// The lines of the paragraph (or of its window, when split) for the given width.
    pub fn lines(&self, available_width: f32, fonts: &FontRegistry) -> Vec<Line> {
        let line_width = (available_width - self.style.left_indent).max(0.0);
        let lines = self.break_lines(line_width, fonts);
        let end = match self.line_count {
            Some(count) => (self.first_line + count).min(lines.len()),
            None => lines.len(),
        };
        lines
            .into_iter()
            .take(end)
            .skip(self.first_line)
            .collect()
    }

    pub fn wrap(&self, available_width: f32, fonts: &FontRegistry) -> f32 {
        self.lines(available_width, fonts).len() as f32 * self.style.leading
    }

    /// Splits between two lines so that the first part fits into the available height.
    pub fn split(
        &self,
        available_width: f32,
        available_height: f32,
        fonts: &FontRegistry,
    ) -> Option<(Paragraph, Paragraph)> {
        let line_total = self.lines(available_width, fonts).len();
        let fitting_lines = ((available_height + WIDTH_TOLERANCE) / self.style.leading).floor();
        if fitting_lines < 1.0 || fitting_lines as usize >= line_total {
            return None;
        }
        let fitting_lines = fitting_lines as usize;

        let mut first = self.clone();
        first.line_count = Some(fitting_lines);
        first.style.space_after = 0.0;

        let mut rest = self.clone();
        rest.first_line = self.first_line + fitting_lines;
        rest.line_count = Some(line_total - fitting_lines);
        rest.style.space_before = 0.0;

        Some((first, rest))
    }

    /// Draws the lines with the first baseline one font size below `top`.
    pub fn draw(&self, canvas: &mut Canvas, x: f32, top: f32, available_width: f32) {
        let fonts = canvas.fonts();
        let lines = self.lines(available_width, fonts);
        if lines.is_empty() {
            return;
        }
        let left = x + self.style.left_indent;

        canvas.save_state();
        canvas.set_fill_color(self.style.color);
        for (index, line) in lines.iter().enumerate() {
            let baseline = top - self.style.font_size - index as f32 * self.style.leading;
            for run in line.runs.iter() {
                let font_id = self.style.font.select(run.bold);
                canvas.draw_text(
                    left + run.x,
                    baseline,
                    &run.text,
                    font_id,
                    self.style.font_size,
                    run.bold && fonts.is_cjk(font_id),
                );
            }
        }
        canvas.restore_state();
    }

    fn text_width(&self, text: &str, bold: bool, fonts: &FontRegistry) -> f32 {
        fonts.string_width(self.style.font.select(bold), text, self.style.font_size)
    }

    fn atom_width(&self, atom: &Atom, fonts: &FontRegistry) -> f32 {
        atom.pieces
            .iter()
            .map(|piece| self.text_width(&piece.text, piece.bold, fonts))
            .sum()
    }

    /// Greedy line filling, every line takes as many atoms as fit into the width. An atom
    /// wider than the line gets a line of its own.
    fn break_lines(&self, line_width: f32, fonts: &FontRegistry) -> Vec<Line> {
        let space_width = self.text_width(" ", false, fonts);
        let mut lines = Vec::new();
        let mut current: Vec<(Atom, f32)> = Vec::new();
        let mut current_width = 0.0;

        for token in tokenize(&self.fragments) {
            match token {
                Token::Break => {
                    let atoms = std::mem::take(&mut current);
                    lines.push(self.position(atoms, line_width, space_width, true, fonts));
                    current_width = 0.0;
                }
                Token::Atom(atom) => {
                    let atom_width = self.atom_width(&atom, fonts);
                    let gap = if atom.gap_before { space_width } else { 0.0 };
                    if !current.is_empty()
                        && current_width + gap + atom_width > line_width + WIDTH_TOLERANCE
                    {
                        let atoms = std::mem::take(&mut current);
                        lines.push(self.position(atoms, line_width, space_width, false, fonts));
                        current_width = 0.0;
                    }
                    current_width += if current.is_empty() {
                        atom_width
                    } else {
                        gap + atom_width
                    };
                    current.push((atom, atom_width));
                }
            }
        }
        if !current.is_empty() {
            lines.push(self.position(current, line_width, space_width, true, fonts));
        }

        lines
    }

    /// Positions the atoms of a line according to the alignment of the style. The last line
    /// of a paragraph and lines ended by a break are not justified.
    fn position(
        &self,
        atoms: Vec<(Atom, f32)>,
        line_width: f32,
        space_width: f32,
        last: bool,
        fonts: &FontRegistry,
    ) -> Line {
        let gap_count = atoms
            .iter()
            .skip(1)
            .filter(|(atom, _)| atom.gap_before)
            .count();
        let natural_width: f32 = atoms
            .iter()
            .enumerate()
            .map(|(index, (atom, width))| {
                if index > 0 && atom.gap_before {
                    width + space_width
                } else {
                    *width
                }
            })
            .sum();
        let slack = (line_width - natural_width).max(0.0);

        let justified = self.style.alignment == Alignment::Justify && !last && gap_count > 0;
        let (mut x, gap_width) = match self.style.alignment {
            Alignment::Center => (slack / 2.0, space_width),
            Alignment::Right => (slack, space_width),
            Alignment::Justify if justified => (0.0, space_width + slack / gap_count as f32),
            _ => (0.0, space_width),
        };

        let mut runs: Vec<LineRun> = Vec::new();
        for (index, (atom, _)) in atoms.into_iter().enumerate() {
            let gap = index > 0 && atom.gap_before;
            for (piece_index, piece) in atom.pieces.into_iter().enumerate() {
                let leading_gap = gap && piece_index == 0;
                let piece_width = self.text_width(&piece.text, piece.bold, fonts);
                // Justified gaps are wider than a space, so their atoms get runs of their own
                let mergeable = !(leading_gap && justified);
                match runs.last_mut() {
                    Some(previous) if mergeable && previous.bold == piece.bold => {
                        if leading_gap {
                            previous.text.push(' ');
                            previous.width += gap_width;
                        }
                        previous.text.push_str(&piece.text);
                        previous.width += piece_width;
                    }
                    _ => runs.push(LineRun {
                        text: piece.text,
                        bold: piece.bold,
                        x: if leading_gap { x + gap_width } else { x },
                        width: piece_width,
                    }),
                }
                if leading_gap {
                    x += gap_width;
                }
                x += piece_width;
            }
        }

        Line {
            runs,
            width: natural_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fonts::CjkFontSource,
        style::{Script, StyleName, StyleRegistry},
    };
    use rand::Rng as _;

    fn body_paragraph(text: &str) -> (FontRegistry, Paragraph) {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let paragraph = Paragraph::new(text, styles.get(StyleName::Body));
        (fonts, paragraph)
    }

    #[test]
    fn whitespace_is_collapsed() {
        let (fonts, paragraph) = body_paragraph("  Open   the\n dashboard  ");
        let lines = paragraph.lines(400.0, &fonts);

        assert_eq!(lines.len(), 1);
        similar_asserts::assert_eq!(lines[0].text(), "Open the dashboard");
    }

    #[test]
    fn line_breaks_force_new_lines() {
        let (fonts, paragraph) = body_paragraph("<b>Need help?</b><br/><br/>Contact us.");
        let lines = paragraph.lines(400.0, &fonts);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].runs[0].bold);
        assert!(lines[1].runs.is_empty());
        similar_asserts::assert_eq!(lines[2].text(), "Contact us.");
        assert_eq!(paragraph.wrap(400.0, &fonts), 3.0 * 15.0);
    }

    #[test]
    fn justified_lines_fill_the_width_except_the_last() {
        let (fonts, paragraph) = body_paragraph(&"vehicle order shipping ".repeat(20));
        let lines = paragraph.lines(300.0, &fonts);
        assert!(lines.len() > 2);

        for line in lines[..lines.len() - 1].iter() {
            let last_run = line.runs.last().unwrap();
            assert!((last_run.x + last_run.width - 300.0).abs() < 0.01);
        }
        let last_line = lines.last().unwrap();
        assert_eq!(last_line.runs.len(), 1);
        assert!(last_line.width < 300.0);
    }

    #[test]
    fn centered_lines_split_the_slack() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let paragraph = Paragraph::new("Thank you", styles.get(StyleName::Final));
        let lines = paragraph.lines(200.0, &fonts);

        let width = lines[0].width;
        assert!((lines[0].runs[0].x - (200.0 - width) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn ideographs_break_without_spaces() {
        let mut fonts = FontRegistry::new();
        let cjk = fonts.register_cjk(&CjkFontSource::default()).unwrap();
        let styles = StyleRegistry::new(&fonts, Script::Cjk(cjk)).unwrap();
        let paragraph = Paragraph::new(&"\u{8f66}\u{8f86}\u{8ba2}\u{5355}".repeat(10), styles.get(StyleName::Body));

        let lines = paragraph.lines(100.0, &fonts);
        assert!(lines.len() > 1);
        for line in lines.iter() {
            assert!(line.width <= 100.0 + 1e-3);
        }
    }

    #[test]
    fn overlong_words_get_a_line_of_their_own() {
        let (fonts, paragraph) = body_paragraph("a https://drivebyafrica.com/admin/vehicles/inventory b");
        let lines = paragraph.lines(60.0, &fonts);

        similar_asserts::assert_eq!(
            lines.iter().map(Line::text).collect::<Vec<_>>(),
            vec!["a", "https://drivebyafrica.com/admin/vehicles/inventory", "b"]
        );
    }

    #[test]
    fn split_parts_keep_the_original_lines() {
        let (fonts, paragraph) = body_paragraph(&"order ".repeat(120));
        let lines = paragraph.lines(200.0, &fonts);
        let (first, rest) = paragraph.split(200.0, 46.0, &fonts).unwrap();

        assert_eq!(first.lines(200.0, &fonts).len(), 3);
        assert_eq!(first.style.space_after, 0.0);
        assert_eq!(rest.style.space_before, 0.0);
        similar_asserts::assert_eq!(
            [first.lines(200.0, &fonts), rest.lines(200.0, &fonts)].concat(),
            lines
        );
        assert!(paragraph.split(200.0, 10.0, &fonts).is_none());
    }

    #[test]
    fn random_text_never_exceeds_the_width() {
        let fonts = FontRegistry::new();
        let styles = StyleRegistry::new(&fonts, Script::Latin).unwrap();
        let style = styles.get(StyleName::Body);
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let words: Vec<String> = (0..rng.gen_range(1..40))
                .map(|_| {
                    let length = rng.gen_range(1..8);
                    (0..length).map(|_| rng.gen_range('a'..='z')).collect()
                })
                .collect();
            let paragraph = Paragraph::new(&words.join(" "), style);
            let width = rng.gen_range(80.0..400.0);
            for line in paragraph.lines(width, &fonts) {
                assert!(line.width <= width + 1e-3, "{} > {}", line.width, width);
            }
        }
    }
}
