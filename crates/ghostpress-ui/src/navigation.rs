//! Site navigation component.
//!
//! Renders the CMS navigation as a list of links. External links open in a
//! new browsing context with `rel="noopener noreferrer"`; internal links are
//! router links, so following them does not reload the page.

use ghostpress_core::{LinkKind, NavEntry, NavigationItem, navigation_entries};
use leptos::prelude::*;
use leptos_router::components::A;

/// Main navigation component.
///
/// Must be rendered inside a `leptos_router` `Router`.
#[component]
pub fn Navigation(
    /// Navigation items, in display order.
    data: Signal<Vec<NavigationItem>>,
) -> impl IntoView {
    view! {
      <ul class="categories">
        <For
          each=move || navigation_entries(&data.get())
          key=|entry| entry.key
          children=move |entry| {
            view! { <NavLink entry=entry /> }
          }
        />

      </ul>
    }
}

/// A single navigation entry.
#[component]
fn NavLink(
    /// The classified entry.
    entry: NavEntry,
) -> impl IntoView {
    let NavEntry {
        label, href, kind, ..
    } = entry;

    let link = match kind {
        LinkKind::Internal => view! {
          <A href=href attr:class="link">
            {label}
          </A>
        }
        .into_any(),
        LinkKind::External => {
            let (target, rel) = link_attributes(kind);
            view! {
              <a class="link" href=href target=target rel=rel>
                {label}
              </a>
            }
            .into_any()
        }
    };

    view! { <li class="entry">{link}</li> }
}

/// `target` and `rel` for a link of the given kind.
fn link_attributes(kind: LinkKind) -> (Option<&'static str>, Option<&'static str>) {
    (kind.target(), kind.rel())
}
