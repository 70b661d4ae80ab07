//! View model for post suggestion cards.

use crate::content::PostSummary;

/// Gradient laid over every card thumbnail.
pub const CARD_GRADIENT: &str = "linear-gradient(to left, rgba(0,0,0,0.2), rgba(0,0,0,0.7))";

/// Card and transition background colour.
pub const CARD_BACKGROUND: &str = "#111111";

/// Page transition played when following a card link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub effect: &'static str,
    pub direction: &'static str,
    /// Seconds.
    pub duration: u32,
    pub background: &'static str,
}

/// The cover transition every card uses.
pub const CARD_TRANSITION: Transition = Transition {
    effect: "cover",
    direction: "up",
    duration: 1,
    background: CARD_BACKGROUND,
};

/// Scroll-reveal attributes on the card article.
pub const CARD_REVEAL: [(&str, &str); 3] = [
    ("data-sal", "slide-up"),
    ("data-sal-duration", "800"),
    ("data-sal-easing", "ease"),
];

/// Everything a renderer needs to draw one suggestion card.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    /// `/<slug>/`.
    pub permalink: String,
    pub title: String,
    /// Primary tag name; the label is omitted when the post has no tag.
    pub tag_label: Option<String>,
    pub thumbnail: Option<String>,
    pub transition: Transition,
}

impl PostCard {
    #[must_use]
    pub fn from_summary(post: &PostSummary) -> Self {
        Self {
            permalink: post.permalink(),
            title: post.title.clone(),
            tag_label: post.primary_tag.as_ref().map(|tag| tag.name.clone()),
            thumbnail: post
                .feature_image_sharp
                .thumbnail_src()
                .map(str::to_string),
            transition: CARD_TRANSITION,
        }
    }

    /// CSS `background-image` value: the gradient, then the thumbnail.
    #[must_use]
    pub fn background_image(&self) -> String {
        match &self.thumbnail {
            Some(src) => format!("{CARD_GRADIENT}, url(\"{}\")", src.replace('"', "%22")),
            None => CARD_GRADIENT.to_string(),
        }
    }

    /// Full inline style for the card article.
    #[must_use]
    pub fn style(&self) -> String {
        format!(
            "background-image: {}; background-color: {CARD_BACKGROUND}; background-size: cover; background-position: center;",
            self.background_image()
        )
    }
}
