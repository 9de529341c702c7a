//! Inline markup of the guide text: `<b>` spans, `<br/>` breaks and a handful of entities.

/// A piece of inline content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    Text { text: String, bold: bool },
    LineBreak,
}

/// Parses the inline markup of a paragraph. Unknown tags and entities are kept as text.
pub fn parse(markup: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut text = String::new();
    let mut bold = false;
    let mut rest = markup;

    while let Some(character) = rest.chars().next() {
        match character {
            '<' => {
                if let Some((tag, remaining)) = tag_at(rest) {
                    match tag {
                        Tag::BoldStart | Tag::BoldEnd => {
                            flush(&mut fragments, &mut text, bold);
                            bold = tag == Tag::BoldStart;
                        }
                        Tag::LineBreak => {
                            flush(&mut fragments, &mut text, bold);
                            fragments.push(Fragment::LineBreak);
                        }
                    }
                    rest = remaining;
                    continue;
                }
            }
            '&' => {
                if let Some((decoded, remaining)) = entity_at(rest) {
                    text.push(decoded);
                    rest = remaining;
                    continue;
                }
            }
            _ => {}
        }
        text.push(character);
        rest = &rest[character.len_utf8()..];
    }
    flush(&mut fragments, &mut text, bold);

    fragments
}

/// The concatenated text of the fragments, with line breaks as newlines.
pub fn plain_text(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Text { text, .. } => text.as_str(),
            Fragment::LineBreak => "\n",
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    BoldStart,
    BoldEnd,
    LineBreak,
}

fn tag_at(input: &str) -> Option<(Tag, &str)> {
    let end = input.find('>')?;
    let name: String = input[1..end]
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let tag = match name.as_str() {
        "b" | "strong" => Tag::BoldStart,
        "/b" | "/strong" => Tag::BoldEnd,
        "br" | "br/" => Tag::LineBreak,
        _ => return None,
    };
    Some((tag, &input[end + 1..]))
}

fn entity_at(input: &str) -> Option<(char, &str)> {
    let end = input.find(';')?;
    // Entity names are short, anything longer is an ampersand in the text
    if end > 10 {
        return None;
    }
    let name = &input[1..end];
    let decoded = match name {
        "bull" => '\u{2022}',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hexadecimal) => u32::from_str_radix(hexadecimal, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, &input[end + 1..]))
}

fn flush(fragments: &mut Vec<Fragment>, text: &mut String, bold: bool) {
    if !text.is_empty() {
        fragments.push(Fragment::Text {
            text: std::mem::take(text),
            bold,
        });
    }
}
