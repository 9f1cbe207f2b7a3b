//! Ordered candidate resolution.

use std::sync::Arc;

use perceiver_screen::ScreenPerceiver;
use webpilot_core_types::Target;

use crate::strategies;
use crate::types::{ResolutionAttempt, ResolveStrategy};

/// Produces the ordered candidate list for a requested target.
///
/// Strategy priority is fixed: literal selector, visible text (for
/// descriptive targets), structural XPath, fragment variants, keyword
/// tables, and finally OCR coordinates when a screenshot is available.
/// The order never varies between runs; callers try candidates
/// greedily and stop at the first that works.
pub struct ElementResolver {
    perceiver: Arc<ScreenPerceiver>,
}

impl ElementResolver {
    pub fn new(perceiver: Arc<ScreenPerceiver>) -> Self {
        Self { perceiver }
    }

    /// Full candidate sequence for a target. Never fails; an
    /// unresolvable target simply yields candidates that won't match,
    /// which the caller records as a step-level failure.
    pub async fn resolve(
        &self,
        target: &str,
        screenshot: Option<&[u8]>,
    ) -> Vec<ResolutionAttempt> {
        let target = target.trim();
        if target.is_empty() {
            return Vec::new();
        }

        // A coordinate target (produced by a previous OCR resolution)
        // is already a handle; nothing to generalize.
        if let Some(coords) = parse_coords(target) {
            return vec![ResolutionAttempt {
                strategy: ResolveStrategy::ExactSelector,
                candidate: coords,
            }];
        }

        let mut attempts = vec![ResolutionAttempt::selector(
            ResolveStrategy::ExactSelector,
            target,
        )];

        if !strategies::looks_like_selector(target) {
            attempts.push(ResolutionAttempt::selector(
                ResolveStrategy::TextContent,
                strategies::text_content(target),
            ));
        }

        if let Some(xpath) = strategies::css_to_xpath(target) {
            attempts.push(ResolutionAttempt::selector(
                ResolveStrategy::Structural,
                xpath,
            ));
        }

        for alt in strategies::fragment_alternatives(target) {
            attempts.push(ResolutionAttempt::selector(
                ResolveStrategy::FragmentAlternatives,
                alt,
            ));
        }

        for fallback in strategies::keyword_fallbacks(target) {
            attempts.push(ResolutionAttempt::selector(
                ResolveStrategy::KeywordFallback,
                fallback,
            ));
        }

        if let Some(frame) = screenshot {
            if let Some(hit) = self.perceiver.find_by_text(frame, target).await {
                let (x, y) = hit.bounds.center();
                attempts.push(ResolutionAttempt::coords(ResolveStrategy::OcrText, x, y));
            }
        }

        dedup_candidates(attempts)
    }
}

/// Parse the `coords:x,y` selector dialect back into a coordinate
/// target.
fn parse_coords(target: &str) -> Option<Target> {
    let rest = target.strip_prefix("coords:")?;
    let (x, y) = rest.split_once(',')?;
    Some(Target::Coords {
        x: x.trim().parse().ok()?,
        y: y.trim().parse().ok()?,
    })
}

/// Drop repeated candidates, keeping the earliest (highest-priority)
/// occurrence.
fn dedup_candidates(attempts: Vec<ResolutionAttempt>) -> Vec<ResolutionAttempt> {
    let mut seen: Vec<Target> = Vec::with_capacity(attempts.len());
    attempts
        .into_iter()
        .filter(|attempt| {
            if seen.contains(&attempt.candidate) {
                false
            } else {
                seen.push(attempt.candidate.clone());
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use perceiver_screen::{BoundingBox, OcrEngine, PerceiverError, TextBox};
    use pretty_assertions::assert_eq;

    struct FakeOcr {
        boxes: Vec<TextBox>,
    }

    #[async_trait]
    impl OcrEngine for FakeOcr {
        async fn extract_text(&self, _image: &[u8]) -> Result<String, PerceiverError> {
            Ok(String::new())
        }

        async fn extract_boxes(&self, _image: &[u8]) -> Result<Vec<TextBox>, PerceiverError> {
            Ok(self.boxes.clone())
        }
    }

    fn resolver_with_boxes(boxes: Vec<TextBox>) -> ElementResolver {
        ElementResolver::new(Arc::new(ScreenPerceiver::new(Arc::new(FakeOcr { boxes }))))
    }

    #[tokio::test]
    async fn login_btn_ordering_is_deterministic() {
        let resolver = resolver_with_boxes(Vec::new());
        let attempts = resolver.resolve("#login-btn", None).await;

        assert_eq!(
            attempts[0].candidate,
            Target::Selector("#login-btn".into())
        );
        assert_eq!(attempts[0].strategy, ResolveStrategy::ExactSelector);
        // Id-attribute variants come right after the literal, before
        // any text- or OCR-based candidate.
        assert_eq!(
            attempts[1].candidate,
            Target::Selector(r#"//*[@id="login-btn"]"#.into())
        );
        assert_eq!(
            attempts[2].candidate,
            Target::Selector(r#"[id="login-btn"]"#.into())
        );
        assert_eq!(
            attempts[3].candidate,
            Target::Selector(r#"[id*="login-btn"]"#.into())
        );
        assert!(attempts
            .iter()
            .all(|a| a.strategy != ResolveStrategy::TextContent
                && a.strategy != ResolveStrategy::OcrText));

        // Same input, same sequence.
        let again = resolver.resolve("#login-btn", None).await;
        assert_eq!(attempts, again);
    }

    #[tokio::test]
    async fn descriptive_target_gets_text_candidate() {
        let resolver = resolver_with_boxes(Vec::new());
        let attempts = resolver.resolve("Search button", None).await;
        assert_eq!(
            attempts[1],
            ResolutionAttempt::selector(
                ResolveStrategy::TextContent,
                r#"text="Search button""#
            )
        );
    }

    #[tokio::test]
    async fn ocr_candidate_is_last_and_needs_screenshot() {
        let resolver = resolver_with_boxes(vec![TextBox {
            text: "Sign in".into(),
            confidence: 0.9,
            bounds: BoundingBox::new(100, 40, 60, 20),
        }]);

        let without = resolver.resolve("Sign in", None).await;
        assert!(without
            .iter()
            .all(|a| a.strategy != ResolveStrategy::OcrText));

        let with = resolver.resolve("Sign in", Some(b"frame")).await;
        let last = with.last().unwrap();
        assert_eq!(last.strategy, ResolveStrategy::OcrText);
        assert_eq!(last.candidate, Target::Coords { x: 130, y: 50 });
    }

    #[tokio::test]
    async fn coords_dialect_round_trips() {
        let resolver = resolver_with_boxes(Vec::new());
        let attempts = resolver.resolve("coords:130,50", None).await;
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].candidate, Target::Coords { x: 130, y: 50 });
    }

    #[tokio::test]
    async fn empty_target_yields_nothing() {
        let resolver = resolver_with_boxes(Vec::new());
        assert!(resolver.resolve("  ", None).await.is_empty());
    }
}
