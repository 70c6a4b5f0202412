use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Marketplace tags shown as badge images on an item page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTag {
    #[serde(rename = "Adventure Coins")]
    AdventureCoins,
    #[serde(rename = "Rare")]
    Rare,
    #[serde(rename = "Pseudo Rare")]
    PseudoRare,
    #[serde(rename = "Legend")]
    Legend,
    #[serde(rename = "Seasonal")]
    Seasonal,
    #[serde(rename = "Special Offer")]
    SpecialOffer,
}

impl ItemTag {
    /// Maps the badge file stem (`/image-tags/<stem>large.png`) to a tag.
    pub fn from_badge(stem: &str) -> Option<Self> {
        match stem.to_ascii_lowercase().as_str() {
            "ac" => Some(ItemTag::AdventureCoins),
            "rare" => Some(ItemTag::Rare),
            "pseudo" => Some(ItemTag::PseudoRare),
            "legend" => Some(ItemTag::Legend),
            "seasonal" => Some(ItemTag::Seasonal),
            "special" => Some(ItemTag::SpecialOffer),
            _ => None,
        }
    }
}

/// Typed fields pulled from an item page; `None` means "not found".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemFields {
    pub name: Option<String>,
    /// Classified type, path-safe (`"one_handed_sword"`).
    pub kind: Option<String>,
    pub description: Option<String>,
    pub rarity: Option<String>,
    pub tags: Vec<ItemTag>,
    pub images: Vec<String>,
}

pub trait FieldExtractor: Send + Sync {
    fn extract(&self, html: &str, slug: &str) -> ItemFields;
}

/// Extractor for the wiki's item page layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct WikiFieldExtractor;

impl FieldExtractor for WikiFieldExtractor {
    fn extract(&self, html: &str, slug: &str) -> ItemFields {
        let doc = Html::parse_document(html);

        let name = first_text(&doc, "#page-title");
        let kind = last_text(&doc, "#breadcrumbs > a").map(|text| classify_type(&text));

        let mut srcs = Vec::new();
        if let Ok(sel) = Selector::parse("img") {
            srcs.extend(
                doc.select(&sel)
                    .filter_map(|img| img.value().attr("src"))
                    .map(str::trim)
                    .filter(|src| !src.is_empty()),
            );
        }

        ItemFields {
            name,
            kind,
            description: labelled_text(&doc, "Description"),
            rarity: labelled_text(&doc, "Rarity"),
            tags: badge_tags(&srcs),
            images: item_images(&srcs, slug),
        }
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case, spaces to underscores, path separators and other forbidden
/// filename characters replaced.
pub fn classify_type(text: &str) -> String {
    clean_text(text)
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).next()?;
    non_empty(clean_text(&node.text().collect::<String>()))
}

fn last_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).last()?;
    non_empty(clean_text(&node.text().collect::<String>()))
}

/// Text after `<strong>{label}:</strong>`, up to the next `<br>`.
fn labelled_text(doc: &Html, label: &str) -> Option<String> {
    let sel = Selector::parse("strong").ok()?;
    let strong = doc.select(&sel).find(|strong| {
        let text = clean_text(&strong.text().collect::<String>());
        text.strip_suffix(':')
            .map(str::trim_end)
            .is_some_and(|t| t.eq_ignore_ascii_case(label))
    })?;

    let mut buffer = String::new();
    for sibling in strong.next_siblings() {
        match sibling.value() {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(element) if element.name().eq_ignore_ascii_case("br") => break,
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(sibling) {
                    buffer.push(' ');
                    buffer.push_str(&element.text().collect::<String>());
                    buffer.push(' ');
                }
            }
            _ => {}
        }
    }
    non_empty(clean_text(&buffer))
}

fn badge_tags(srcs: &[&str]) -> Vec<ItemTag> {
    let mut tags = Vec::new();
    for src in srcs {
        let lower = src.to_ascii_lowercase();
        let Some(idx) = lower.find("/image-tags/") else {
            continue;
        };
        let file = &lower[idx + "/image-tags/".len()..];
        let tag = file
            .strip_suffix("large.png")
            .and_then(ItemTag::from_badge);
        if let Some(tag) = tag {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Hosted screenshots first, then images named after the item.
fn item_images(srcs: &[&str], slug: &str) -> Vec<String> {
    let hosted = srcs.iter().filter(|src| src.contains("imgur"));
    let named = srcs
        .iter()
        .filter(|src| !slug.is_empty() && src.contains(slug));

    let mut images: Vec<String> = Vec::new();
    for src in hosted.chain(named) {
        if !images.iter().any(|existing| existing == src) {
            images.push(src.to_string());
        }
    }
    images
}
