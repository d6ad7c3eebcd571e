//! SID (Sport-Informations-Dienst). Pages carry no dateline, so the place is
//! left to the geoparser.

use super::{Verdict, document_of};
use crate::article::first_text;
use crate::models::{ArticleDraft, LocationHint};
use once_cell::sync::Lazy;
use scraper::Selector;

static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("small").unwrap());

pub fn extract(mut draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    draft.resize = true;
    draft.caption = first_text(&document, &CAPTION);
    draft.location = LocationHint::Geoparse;
    Ok(draft)
}
