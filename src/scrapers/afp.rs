//! AFP French-language service.

use super::{Verdict, document_of};
use crate::article::first_text;
use crate::models::{ArticleDraft, LocationHint};
use once_cell::sync::Lazy;
use scraper::Selector;

static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption.art-caption").unwrap());

pub fn extract(mut draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    draft.resize = true;
    draft.caption = first_text(&document, &CAPTION);

    if let Some((place, body)) = draft.article.as_deref().and_then(afp_trailing_dateline) {
        draft.location = LocationHint::Found(place);
        draft.article = Some(body);
    }
    Ok(draft)
}

/// AFP pages close with `"<timestamp> - <Place> (AFP) - © <year> AFP"`.
///
/// Returns the place and the body with that line removed and the dateline
/// moved to the front as `"<Place> (AFP) - "`.
pub fn afp_trailing_dateline(text: &str) -> Option<(String, String)> {
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.iter().rposition(|l| !l.trim().is_empty())?;
    let line = lines[last].trim();
    if !line.ends_with("AFP") {
        return None;
    }

    let (head, _) = line.split_once(" (AFP) - ©")?;
    let (_, place) = head.rsplit_once(" - ")?;
    let place = place.trim();
    if place.is_empty() {
        return None;
    }

    let body = lines[..last].join("\n");
    Some((place.to_string(), format!("{place} (AFP) - {}", body.trim())))
}
