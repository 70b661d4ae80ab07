//! HTML template system for page generation.
//!
//! Templates are plain strings with `{{ name }}` placeholders. A trailing `?`
//! (`{{ name? }}`) makes a placeholder optional. Values are inserted as-is;
//! callers escape text before putting it in the context.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A named template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    ///
    /// Substituted values are never re-scanned for placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut output = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some((before, after)) = rest.split_once("{{") {
            output.push_str(before);

            let (placeholder, tail) = after.split_once("}}").ok_or_else(|| {
                TemplateError::InvalidSyntax(format!("unclosed {{{{ in template {}", self.name))
            })?;

            let placeholder = placeholder.trim();
            let (name, optional) = match placeholder.strip_suffix('?') {
                Some(name) => (name.trim_end(), true),
                None => (placeholder, false),
            };

            match context.get(name) {
                Some(value) => output.push_str(value),
                None if optional => {}
                None => return Err(TemplateError::MissingVariable(name.to_string())),
            }

            rest = tail;
        }

        output.push_str(rest);
        Ok(output)
    }
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(Template::new("base", DEFAULT_BASE_TEMPLATE));
        registry.register(Template::new("post", DEFAULT_POST_TEMPLATE));
        registry.register(Template::new("page", DEFAULT_PAGE_TEMPLATE));
        registry.register(Template::new("list", DEFAULT_LIST_TEMPLATE));
        registry
    }

    /// Register a template, replacing any template with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?
            .render(context)
    }
}

/// Default base HTML template.
pub const DEFAULT_BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description? }}">
    <meta name="theme-color" content="{{ theme_color }}">
    <link rel="canonical" href="{{ canonical_url }}">
    {{ feed_link? }}
    {{ head_links? }}
    <link rel="stylesheet" href="/main.css">
    <style>
        .categories { display: flex; flex-wrap: wrap; gap: 1.5rem; list-style: none; margin: 0; padding: 0; }
        .categories .link { color: inherit; text-decoration: none; }
        .next-article { display: flex; align-items: flex-end; min-height: 16rem; padding: 2rem; color: #fff; }
        .next-article .title { margin: 0.25rem 0 0; }
        .transition-cover { position: fixed; inset: 0; z-index: 1000; transform: translateY(100%); }
        [data-sal] { opacity: 0; transition-property: opacity, transform; }
        [data-sal="slide-up"] { transform: translateY(20%); }
        [data-sal].sal-animate { opacity: 1; transform: none; }
    </style>
    {{ analytics? }}
    {{ service_worker? }}
</head>
<body>
    <header class="site-header">
        <a class="site-title" href="/" data-router-link>{{ site_title }}</a>
        <nav aria-label="Main navigation">{{ navigation }}</nav>
    </header>
    <main>
{{ content }}
    </main>
    <footer class="site-footer">
        <p>&copy; {{ year }} {{ site_title }}</p>
    </footer>
    <script>
    (function () {
        var observer = new IntersectionObserver(function (entries) {
            entries.forEach(function (entry) {
                if (!entry.isIntersecting) return;
                entry.target.classList.add("sal-animate");
                if ({{ reveal_once }}) observer.unobserve(entry.target);
            });
        }, { threshold: {{ reveal_threshold }} });

        function reveal(root) {
            root.querySelectorAll("[data-sal]").forEach(function (el) {
                var duration = el.dataset.salDuration;
                if (duration) el.style.transitionDuration = duration + "ms";
                if (el.dataset.salEasing) el.style.transitionTimingFunction = el.dataset.salEasing;
                observer.observe(el);
            });
        }

        function sameOrigin(link) {
            return link.origin === window.location.origin && !link.hasAttribute("download");
        }

        function navigate(url, push) {
            return fetch(url, { headers: { "Accept": "text/html" } })
                .then(function (response) {
                    if (!response.ok) throw new Error(response.status);
                    return response.text();
                })
                .then(function (html) {
                    var next = new DOMParser().parseFromString(html, "text/html");
                    var main = document.querySelector("main");
                    var nextMain = next.querySelector("main");
                    if (!main || !nextMain) throw new Error("no main element");
                    main.innerHTML = nextMain.innerHTML;
                    document.title = next.title;
                    if (push) history.pushState({ url: url }, "", url);
                    window.scrollTo(0, 0);
                    reveal(main);
                })
                .catch(function () { window.location.href = url; });
        }

        function plainClick(event) {
            return !(event.defaultPrevented || event.metaKey || event.ctrlKey || event.shiftKey
                || event.altKey || event.button !== 0);
        }

        document.addEventListener("click", function (event) {
            if (!plainClick(event)) return;
            var link = event.target.closest("a[data-router-link], a.transition-link");
            if (!link || link.target || !sameOrigin(link)) return;
            event.preventDefault();

            if (!link.classList.contains("transition-link")) {
                navigate(link.href, true);
                return;
            }

            var seconds = parseFloat(link.dataset.duration) || 1;
            var cover = document.createElement("div");
            cover.className = "transition-cover";
            cover.style.background = link.dataset.bg;
            cover.style.transition = "transform " + seconds / 2 + "s ease-in-out";
            document.body.appendChild(cover);
            requestAnimationFrame(function () { cover.style.transform = "translateY(0)"; });
            setTimeout(function () {
                navigate(link.href, true).then(function () {
                    cover.style.transform = "translateY(-100%)";
                    setTimeout(function () { cover.remove(); }, seconds * 500);
                });
            }, seconds * 500);
        });

        window.addEventListener("popstate", function () {
            navigate(window.location.href, false);
        });

        reveal(document);
    })();
    </script>
</body>
</html>
"##;

/// Default post template.
pub const DEFAULT_POST_TEMPLATE: &str = r##"<article class="post">
    <header class="post-header">
        {{ tag_label? }}
        <h1 class="post-title">{{ title }}</h1>
        <p class="post-meta">{{ author }}{{ date? }}</p>
    </header>
    {{ feature_image? }}
    <section class="post-content">
{{ body }}
    </section>
</article>
{{ suggestions? }}
"##;

/// Default static page template.
pub const DEFAULT_PAGE_TEMPLATE: &str = r##"<article class="page">
    <h1 class="page-title">{{ title }}</h1>
    {{ feature_image? }}
    <section class="page-content">
{{ body }}
    </section>
</article>
"##;

/// Default list template for the index, tag and author pages.
pub const DEFAULT_LIST_TEMPLATE: &str = r##"<section class="post-list">
    <h1 class="list-title">{{ title }}</h1>
    {{ description? }}
    <div class="post-feed">
{{ items }}
    </div>
</section>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_render() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new().with_var("name", "World");

        assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_multiple_variables() {
        let template = Template::new("test", "{{greeting}}, {{ name }}! {{ greeting }}");
        let ctx = TemplateContext::new()
            .with_var("greeting", "Hi")
            .with_var("name", "Ada");

        assert_eq!(template.render(&ctx).unwrap(), "Hi, Ada! Hi");
    }

    #[test]
    fn test_missing_variable() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let err = template.render(&TemplateContext::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable(name) if name == "name"));
    }

    #[test]
    fn test_optional_variable() {
        let template = Template::new("test", "Hello{{ suffix? }}!");
        assert_eq!(template.render(&TemplateContext::new()).unwrap(), "Hello!");

        let ctx = TemplateContext::new().with_var("suffix", ", World");
        assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = Template::new("test", "{{ a }}");
        let ctx = TemplateContext::new().with_var("a", "{{ b }}");
        assert_eq!(template.render(&ctx).unwrap(), "{{ b }}");
    }

    #[test]
    fn test_unclosed_placeholder() {
        let template = Template::new("test", "Hello, {{ name");
        assert!(matches!(
            template.render(&TemplateContext::new()),
            Err(TemplateError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_registry_defaults() {
        let registry = TemplateRegistry::new();
        for name in ["base", "post", "page", "list"] {
            assert!(registry.get(name).is_some(), "missing template {name}");
        }
        assert!(matches!(
            registry.render("missing", &TemplateContext::new()),
            Err(TemplateError::NotFound(_))
        ));
    }

    fn base_context() -> TemplateContext {
        TemplateContext::new()
            .with_var("lang", "en")
            .with_var("title", "Short Tech")
            .with_var("theme_color", "#15171A")
            .with_var("canonical_url", "https://shorttech.de/")
            .with_var("site_title", "Short Tech")
            .with_var("navigation", "")
            .with_var("content", "<p>Hi</p>")
            .with_var("year", "2020")
            .with_var("reveal_once", "true")
            .with_var("reveal_threshold", "0.1")
    }

    #[test]
    fn test_base_template_routes_internal_links() {
        let html = TemplateRegistry::new()
            .render("base", &base_context())
            .unwrap();

        assert!(html.contains(r#"closest("a[data-router-link], a.transition-link")"#));
        assert!(html.contains("history.pushState"));
        assert!(html.contains(r#"addEventListener("popstate""#));
        assert!(html.contains(r#"querySelector("main")"#));
        assert!(html.contains("<main>\n<p>Hi</p>\n    </main>"));
    }

    #[test]
    fn test_base_template_optional_head() {
        let html = TemplateRegistry::new()
            .render("base", &base_context())
            .unwrap();
        assert!(!html.contains("application/rss+xml"));
        assert!(!html.contains("serviceWorker"));

        let ctx = base_context()
            .with_var("feed_link", r#"<link rel="alternate" href="/rss/">"#)
            .with_var("service_worker", "<script>navigator.serviceWorker</script>");
        let html = TemplateRegistry::new().render("base", &ctx).unwrap();
        assert!(html.contains(r#"<link rel="alternate" href="/rss/">"#));
        assert!(html.contains("navigator.serviceWorker"));
    }

    #[test]
    fn test_registry_override() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("page", "<p>{{ title }}</p>"));

        let ctx = TemplateContext::new().with_var("title", "About");
        assert_eq!(registry.render("page", &ctx).unwrap(), "<p>About</p>");
    }
}
