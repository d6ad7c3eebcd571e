//! Associated Press story JSON.
//!
//! The feed entry points at a per-story JSON document. Stories carried by a
//! member newspaper (`localMemberName` set) or linked outside apnews.com may
//! not be redistributed and are rejected outright.

use super::{Rejection, Verdict};
use crate::article::collapse_whitespace;
use crate::models::{ArticleDraft, LocationHint};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApStory {
    #[serde(default)]
    local_member_name: Value,
    local_link_url: Option<String>,
    #[serde(rename = "storyHTML")]
    story_html: Option<String>,
    bylines: Option<String>,
    #[serde(default)]
    media_count: u32,
    #[serde(default)]
    media: Vec<ApMedia>,
    dateline: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApMedia {
    image_mime_type: Option<String>,
    gcs_base_url: Option<String>,
    image_file_extension: Option<String>,
    flattened_caption: Option<String>,
}

pub fn extract(mut draft: ArticleDraft, json: &str) -> Verdict<ArticleDraft> {
    let story: ApStory = serde_json::from_str(json).map_err(|_| Rejection::MalformedPayload)?;

    if !story.local_member_name.is_null() {
        return Err(Rejection::SyndicationRestricted);
    }
    match story.local_link_url.as_deref() {
        Some(link) if link.contains("apnews") => {}
        _ => return Err(Rejection::SyndicationRestricted),
    }

    let mut article = story_text(story.story_html.as_deref().unwrap_or_default());
    if let Some(bylines) = story.bylines.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        article.push_str("\n\n");
        article.push_str(bylines);
    }
    draft.article = Some(article);

    if story.media_count > 0 {
        if let Some(media) = story.media.first() {
            if media.image_mime_type.as_deref() == Some("image/jpeg") {
                draft.resize = true;
                draft.picture = match (&media.gcs_base_url, &media.image_file_extension) {
                    (Some(base), Some(ext)) => Some(format!("{base}400{ext}")),
                    _ => None,
                };
                draft.caption = media.flattened_caption.clone();
                draft.credits = draft.caption.as_deref().and_then(credits_from_caption);
            }
        }
    }

    if let Some(dateline) = story.dateline.filter(|d| !d.trim().is_empty()) {
        draft.location = LocationHint::Found(dateline);
    }
    Ok(draft)
}

/// Plain text of the story HTML, paragraphs separated by a blank line.
pub fn story_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let paragraphs: Vec<String> = fragment
        .select(&PARAGRAPH)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs.join("\n\n");
    }

    let text = fragment.root_element().text().collect::<String>().replace('\n', "\n\n");
    text.trim_end_matches("\n\n").to_string()
}

/// AP captions end with the photo credit in parentheses:
/// `"… (AP Photo/Jane Doe)"` → `"AP Photo/Jane Doe"`.
pub fn credits_from_caption(caption: &str) -> Option<String> {
    let caption = caption.trim_end();
    let (_, tail) = caption.rsplit_once('(')?;
    let credits = tail.strip_suffix(')')?.trim();
    (!credits.is_empty()).then(|| credits.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_text;
    use crate::models::Attribution;

    fn draft() -> ArticleDraft {
        let mut d = ArticleDraft::new(
            "https://storage.googleapis.com/ap/1.json",
            Attribution::new("AP", "© {year} AP"),
            1,
        );
        d.headline = Some("Storm hits coast".into());
        d
    }

    fn story(overrides: &str) -> String {
        let mut base: Value = serde_json::from_str(
            r#"{
              "localMemberName": null,
              "localLinkUrl": "https://apnews.com/abc",
              "storyHTML": "<p>MIAMI (AP) — A storm hit.</p>\n<p>More rain.</p>",
              "bylines": "By JANE DOE",
              "mediaCount": 1,
              "media": [{
                "imageMimeType": "image/jpeg",
                "gcsBaseUrl": "https://storage.googleapis.com/img/abc/",
                "imageFileExtension": ".jpeg",
                "flattenedCaption": "Waves crash ashore. (AP Photo/Wilfredo Lee)"
              }],
              "dateline": "MIAMI"
            }"#,
        )
        .unwrap();
        let patch: Value = serde_json::from_str(overrides).unwrap();
        for (k, v) in patch.as_object().unwrap() {
            base[k] = v.clone();
        }
        base.to_string()
    }

    #[test]
    fn test_full_story() {
        let d = extract(draft(), &story("{}")).unwrap();
        assert_eq!(
            d.article.as_deref(),
            Some("MIAMI (AP) — A storm hit.\n\nMore rain.\n\nBy JANE DOE")
        );
        assert_eq!(d.picture.as_deref(), Some("https://storage.googleapis.com/img/abc/400.jpeg"));
        assert!(d.resize);
        assert_eq!(d.credits.as_deref(), Some("AP Photo/Wilfredo Lee"));
        assert_eq!(d.location, LocationHint::Found("MIAMI".into()));

        let record = d.into_record(Some("MIAMI".into()), None).unwrap();
        assert_eq!(decode_text(&record.caption), "Waves crash ashore. (AP Photo/Wilfredo Lee)");
    }

    #[test]
    fn test_member_story_is_rejected() {
        let verdict = extract(draft(), &story(r#"{"localMemberName": "Miami Herald"}"#));
        assert_eq!(verdict.unwrap_err(), Rejection::SyndicationRestricted);
    }

    #[test]
    fn test_foreign_or_missing_link_is_rejected() {
        let foreign = extract(draft(), &story(r#"{"localLinkUrl": "https://example.com/x"}"#));
        assert_eq!(foreign.unwrap_err(), Rejection::SyndicationRestricted);
        let missing = extract(draft(), &story(r#"{"localLinkUrl": ""}"#));
        assert_eq!(missing.unwrap_err(), Rejection::SyndicationRestricted);
    }

    #[test]
    fn test_story_html_field_name() {
        let json = r#"{"localLinkUrl":"https://apnews.com/2","storyHTML":"<p>Body text.</p>","bylines":"By JANE DOE"}"#;
        let d = extract(draft(), json).unwrap();
        assert_eq!(d.article.as_deref(), Some("Body text.\n\nBy JANE DOE"));

        let wrong_case = r#"{"localLinkUrl":"https://apnews.com/2","storyHtml":"<p>Body text.</p>"}"#;
        assert_eq!(extract(draft(), wrong_case).unwrap().article.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert_eq!(extract(draft(), "<html>").unwrap_err(), Rejection::MalformedPayload);
    }

    #[test]
    fn test_non_jpeg_media_has_no_picture() {
        let d = extract(
            draft(),
            &story(r#"{"media": [{"imageMimeType": "video/mp4"}], "bylines": "", "dateline": null}"#),
        )
        .unwrap();
        assert_eq!(d.picture, None);
        assert_eq!(d.caption, None);
        assert!(!d.resize);
        assert_eq!(d.location, LocationHint::Absent);
        assert_eq!(d.article.as_deref(), Some("MIAMI (AP) — A storm hit.\n\nMore rain."));
    }

    #[test]
    fn test_story_text_without_paragraphs() {
        assert_eq!(story_text("Line one\nLine two\n"), "Line one\n\nLine two");
    }

    #[test]
    fn test_credits_from_caption() {
        assert_eq!(
            credits_from_caption("A (rare) sight. (AP Photo/John Doe)").as_deref(),
            Some("AP Photo/John Doe")
        );
        assert_eq!(credits_from_caption("No credit here"), None);
        assert_eq!(credits_from_caption("Empty ()"), None);
    }
}
