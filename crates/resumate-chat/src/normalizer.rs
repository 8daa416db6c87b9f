//! Client turn → provider content.
//!
//! A message is classified into one [`TurnShape`] first and only that shape's
//! fields are read, so the fallback order lives in one place.

use resumate_llm::{Content, ContentPart};
use resumate_types::{ClientAttachment, ClientMessage, ClientMessagePart};

/// Wire shape a client message arrived in
#[derive(Debug, Clone, Copy)]
pub enum TurnShape<'a> {
    /// Typed parts (current clients)
    Parts(&'a [ClientMessagePart]),
    /// Flat content, optionally with legacy attachments
    Flat {
        content: Option<&'a str>,
        attachments: &'a [ClientAttachment],
    },
}

impl<'a> TurnShape<'a> {
    pub fn of(message: &'a ClientMessage) -> Self {
        match message.parts.as_deref() {
            Some(parts) if !parts.is_empty() => Self::Parts(parts),
            _ => Self::Flat {
                content: message.content.as_deref(),
                attachments: message.experimental_attachments.as_deref().unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind<'a> {
    Text(&'a str),
    File {
        content_type: Option<&'a str>,
        url: Option<&'a str>,
    },
    /// Client-side tool rendering state
    Tool,
    Other,
}

impl<'a> PartKind<'a> {
    fn of(part: &'a ClientMessagePart) -> Self {
        match part.kind.as_str() {
            "text" => Self::Text(part.text.as_deref().unwrap_or_default()),
            "file" => Self::File {
                content_type: part.content_type.as_deref(),
                url: part.url.as_deref(),
            },
            kind if kind.starts_with("tool-") || kind == "dynamic-tool" => Self::Tool,
            _ => Self::Other,
        }
    }
}

fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image")
}

fn part_block(part: &ClientMessagePart) -> Option<ContentPart> {
    match PartKind::of(part) {
        PartKind::Text(text) => Some(ContentPart::text(text)),
        PartKind::File {
            content_type: Some(content_type),
            url: Some(url),
        } if is_image(content_type) => Some(ContentPart::image_url(url, Some(content_type.to_string()))),
        // Provider cannot fetch arbitrary file URLs; pass the link as text
        PartKind::File { url: Some(url), .. } => Some(ContentPart::text(url)),
        PartKind::File { url: None, .. } | PartKind::Tool | PartKind::Other => None,
    }
}

fn attachment_block(attachment: &ClientAttachment) -> Option<ContentPart> {
    if is_image(&attachment.content_type) {
        Some(ContentPart::image_url(
            attachment.url.clone(),
            Some(attachment.content_type.clone()),
        ))
    } else if attachment.content_type.starts_with("text") {
        Some(ContentPart::text(attachment.url.clone()))
    } else {
        None
    }
}

/// Ordered content blocks for one message; never empty
pub fn content_blocks(message: &ClientMessage) -> Vec<ContentPart> {
    let mut blocks: Vec<ContentPart> = match TurnShape::of(message) {
        TurnShape::Parts(parts) => parts.iter().filter_map(part_block).collect(),
        TurnShape::Flat {
            content,
            attachments,
        } => content
            .map(ContentPart::text)
            .into_iter()
            .chain(attachments.iter().filter_map(attachment_block))
            .collect(),
    };

    if blocks.is_empty() {
        blocks.push(ContentPart::text(""));
    }
    blocks
}

/// Provider content for one message. A lone text block becomes a plain string.
pub fn normalize(message: &ClientMessage) -> Content {
    Content::from_parts(content_blocks(message))
}

/// Plain prompt text: flat content, else the non-empty text parts joined by a space
pub fn prompt_text(message: &ClientMessage) -> String {
    if let Some(content) = message.content.as_deref().filter(|c| !c.is_empty()) {
        return content.to_string();
    }

    message
        .parts
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|part| match PartKind::of(part) {
            PartKind::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
