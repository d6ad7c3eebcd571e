//! ANSA (Agenzia Nazionale Stampa Associata).

use super::{Verdict, document_of};
use crate::article::{first_text, nested_text};
use crate::models::{ArticleDraft, LocationHint};
use once_cell::sync::Lazy;
use scraper::Selector;

static CAPTION_BOX: Lazy<Selector> = Lazy::new(|| Selector::parse("div.news-caption.hidden-phone").unwrap());
static EMPHASIS: Lazy<Selector> = Lazy::new(|| Selector::parse("em").unwrap());
static DATELINE: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"span[itemprop="dateline"]"#).unwrap());

pub fn extract(mut draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    draft.resize = true;
    draft.credits = nested_text(&document, &CAPTION_BOX, &EMPHASIS);
    if let Some(place) = first_text(&document, &DATELINE) {
        draft.location = LocationHint::Found(place);
    }
    Ok(draft)
}
