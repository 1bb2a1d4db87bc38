//! HTML helpers for rendered page markup.
//!
//! Only two narrow operations are needed: pulling the candidate titles out of
//! a disambiguation page and turning rendered paragraphs into plain text.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

static LIST_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li").expect("Failed to compile `li` selector"));

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Failed to compile `a` selector"));

static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to compile `p` selector"));

/// Class marking table-of-contents entries
const TOC_CLASS: &str = "tocsection";

/// Text of the first anchor in every `<li>`, in document order
///
/// Table-of-contents items and items without an anchor are skipped.
pub fn extract_list_item_anchor_texts(html: &str) -> Vec<String> {
    let document = Html::parse_fragment(html);

    document
        .select(&LIST_ITEM)
        .filter(|item| !item.value().classes().any(|class| class.contains(TOC_CLASS)))
        .filter_map(|item| item.select(&ANCHOR).next())
        .map(|anchor| anchor.text().collect::<String>())
        .collect()
}

/// Plain text of every non-empty paragraph, footnote markers removed
pub fn strip_markup(html: &str) -> String {
    let document = Html::parse_fragment(html);

    document
        .select(&PARAGRAPH)
        .map(|paragraph| {
            let mut text = String::new();
            collect_text(paragraph, &mut text);
            text.trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "sup" => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}
