use super::blocks::Block;

/// Where a section stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEnd {
    /// The next heading of any level.
    AnyHeading,
    /// The next heading at the same or a higher level; deeper sub-headings
    /// stay inside the section.
    SameLevel,
}

#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub level: u8,
    pub title: &'a str,
    pub blocks: &'a [Block],
}

impl<'a> Section<'a> {
    pub fn list_items(&self) -> impl Iterator<Item = (usize, &'a str, &'a str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::ListItem { indent, text, line } => Some((*indent, text.as_str(), line.as_str())),
            _ => None,
        })
    }
}

/// Find the first heading `level`/`title` and return the blocks after it,
/// up to the boundary chosen by `end` (or the end of the document).
pub fn locate<'a>(blocks: &'a [Block], level: u8, title: &str, end: SpanEnd) -> Option<Section<'a>> {
    let (start, heading_title) = blocks.iter().enumerate().find_map(|(i, b)| match b {
        Block::Heading { level: l, text } if *l == level && heading_matches(text, title) => {
            Some((i, text.as_str()))
        }
        _ => None,
    })?;

    let body = &blocks[start + 1..];
    let stop = body
        .iter()
        .position(|b| match (b, end) {
            (Block::Heading { .. }, SpanEnd::AnyHeading) => true,
            (Block::Heading { level: l, .. }, SpanEnd::SameLevel) => *l <= level,
            _ => false,
        })
        .unwrap_or(body.len());

    Some(Section {
        level,
        title: heading_title,
        blocks: &body[..stop],
    })
}

fn heading_matches(text: &str, title: &str) -> bool {
    text.trim().trim_end_matches([':', '：']).trim_end() == title
}
