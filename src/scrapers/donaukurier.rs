//! AFP and dpa copy syndicated through donaukurier.de.
//!
//! The feed mixes both agencies. Entries whose description mentions dpa are
//! credited to dpa; the source itself stays AFP.

use super::{DPA_COPYRIGHT, Verdict, document_of};
use crate::article::first_text;
use crate::feed::FeedEntry;
use crate::models::{ArticleDraft, Attribution, LocationHint};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption").unwrap());
static EMPHASIS: Lazy<Selector> = Lazy::new(|| Selector::parse("em").unwrap());

pub fn attribution_override(entry: &FeedEntry) -> Option<Attribution> {
    entry
        .description
        .contains("dpa")
        .then(|| Attribution::new("dpa", DPA_COPYRIGHT))
}

pub fn extract(mut draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    draft.resize = true;
    draft.caption = first_text(&document, &CAPTION);

    if draft.caption.is_some() {
        draft.article = draft.article.take().map(|body| drop_first_line(&body));
    }

    let is_dpa = draft.attribution.as_ref().is_some_and(|a| a.source_id == "dpa");
    let location = if is_dpa {
        draft.article.as_deref().and_then(dpa_dateline)
    } else {
        afp_em_dateline(&document)
    };
    if let Some(location) = location {
        draft.location = LocationHint::Found(location);
    }
    Ok(draft)
}

/// The page repeats the caption as the first body line.
fn drop_first_line(body: &str) -> String {
    let rest = body
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    rest.trim_start().to_string()
}

/// `"Berlin (dpa) - …"` → `"Berlin"`, read from the first line.
pub fn dpa_dateline(body: &str) -> Option<String> {
    let first = body.lines().find(|l| !l.trim().is_empty())?;
    let (place, _) = first.split_once(" (dpa)")?;
    let place = place.trim();
    (!place.is_empty()).then(|| place.to_string())
}

/// First `<em>` of the page reads `"Paris (AFP)"`.
fn afp_em_dateline(document: &Html) -> Option<String> {
    let em = first_text(document, &EMPHASIS)?;
    let (place, _) = em.split_once(" (AFP)")?;
    let place = place.trim();
    (!place.is_empty()).then(|| place.to_string())
}
