//! ghostpress UI Components
//!
//! Leptos components for the ghostpress frontend.
//!
//! # Components
//!
//! - [`Navigation`] - Site navigation from CMS settings
//! - [`PostSuggestion`] - Preview card linking to a post
//!
//! # Example
//!
//! ```ignore
//! use leptos::prelude::*;
//! use ghostpress_core::NavigationItem;
//! use ghostpress_ui::Navigation;
//! use leptos_router::components::Router;
//!
//! #[component]
//! fn Header() -> impl IntoView {
//!     let data = Signal::derive(|| vec![NavigationItem::new("Home", "/")]);
//!
//!     view! {
//!       <Router>
//!         <Navigation data=data />
//!       </Router>
//!     }
//! }
//! ```

pub mod navigation;
pub mod suggestion;

pub use navigation::Navigation;
pub use suggestion::PostSuggestion;
