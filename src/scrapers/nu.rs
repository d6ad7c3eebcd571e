//! NU.nl. Video items and live blogs are skipped; ANP copy carries the ANP
//! copyright notice.

use super::{ANP_COPYRIGHT, Verdict, document_of};
use crate::article::first_text;
use crate::feed::FeedEntry;
use crate::models::{ArticleDraft, Attribution, LocationHint};
use once_cell::sync::Lazy;
use scraper::Selector;

static PHOTOGRAPHER: Lazy<Selector> = Lazy::new(|| Selector::parse("span.photographer").unwrap());

pub fn is_excluded_headline(headline: &str) -> bool {
    headline.contains("Video") || headline.contains("Liveblog")
}

pub fn attribution_override(entry: &FeedEntry) -> Option<Attribution> {
    (entry.author.trim() == "ANP").then(|| Attribution::new("NU.nl", ANP_COPYRIGHT))
}

pub fn extract(mut draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    draft.resize = true;
    draft.credits = first_text(&document, &PHOTOGRAPHER);
    draft.location = LocationHint::Geoparse;
    Ok(draft)
}
