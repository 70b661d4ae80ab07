//! Post suggestion card component.

use ghostpress_core::{PostCard, PostSummary, suggestion::Transition};
use leptos::prelude::*;

/// A preview card linking to a post, played in with a cover transition.
///
/// The tag label is left out for posts without a primary tag.
#[component]
pub fn PostSuggestion(
    /// The post to preview.
    post: PostSummary,
) -> impl IntoView {
    let card = PostCard::from_summary(&post);
    let [effect, direction, duration, background] = transition_attributes(&card.transition);
    let style = card.style();
    let tag_label = card.tag_label.map(|name| view! { <span>{name}</span> });

    view! {
      <a
        href=card.permalink
        class="transition-link"
        data-transition=effect
        data-direction=direction
        data-duration=duration
        data-bg=background
      >
        <article
          class="next-article"
          style=style
          data-sal="slide-up"
          data-sal-duration="800"
          data-sal-easing="ease"
        >
          <div class="content">
            {tag_label}
            <h1 class="title">{card.title}</h1>
          </div>
        </article>
      </a>
    }
}

/// Data attribute values read by the client transition script.
fn transition_attributes(transition: &Transition) -> [String; 4] {
    [
        transition.effect.to_string(),
        transition.direction.to_string(),
        transition.duration.to_string(),
        transition.background.to_string(),
    ]
}
