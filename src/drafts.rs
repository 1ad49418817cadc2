use crate::content::{normalize_tags, slugify};
use crate::models::{EditorialDraft, EditorialDraftRequest};

const DEFAULT_LOCATION: &str = "the city";

/// Builds deterministic placeholder copy for a new editorial.
///
/// The same request always yields the same draft, so editors can regenerate
/// without surprises.
pub fn generate_editorial(req: &EditorialDraftRequest) -> EditorialDraft {
    let title = req.title.trim().to_string();
    let location = req
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LOCATION);
    let tags = normalize_tags(&req.keywords);

    let excerpt = format!(
        "{title}: a closer look at how considered design is shaping new homes in {location}."
    );

    let mut content = format!("# {title}\n\n");
    content.push_str(&format!(
        "Across {location}, a new generation of residences is being shaped by light, \
         material and proportion. This editorial follows the ideas behind the work.\n\n"
    ));
    if tags.is_empty() {
        content.push_str(
            "## The approach\n\nEvery project begins with the site: its orientation, its \
             neighbours and the way people will move through it.\n",
        );
    } else {
        for tag in &tags {
            content.push_str(&format!(
                "## {}\n\nHow {} informs the layout, the palette and the everyday \
                 experience of living in {location}.\n\n",
                capitalize(tag),
                tag.to_lowercase()
            ));
        }
    }

    EditorialDraft {
        slug: slugify(&title),
        title,
        excerpt,
        content: content.trim_end().to_string(),
        tags,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
