//! Server-side HTML for the gallery page.

use std::fmt::Write as _;
use std::time::Duration;

use gallery_model::Artwork;

use crate::config::PageOptions;
use crate::lightbox::LightboxPhase;
use crate::view::{GalleryFrame, LightboxFrame, ReadyFrame};

/// Reload cadence of the loading placeholder.
const LOADING_REFRESH: Duration = Duration::from_secs(2);

/// Render the whole page for `frame`.
///
/// `refresh` is the slideshow cadence; pages showing a slide reload on it so
/// the visitor sees the rotation without client-side script. The loading
/// placeholder reloads on a short fixed cadence until the catalog arrives.
pub fn render(frame: &GalleryFrame, page: &PageOptions, refresh: Duration) -> String {
    match frame {
        GalleryFrame::Loading => layout(page, Some(LOADING_REFRESH), &render_loading()),
        GalleryFrame::Empty => layout(page, None, &render_empty()),
        GalleryFrame::Ready(ready) => {
            let refresh = ready.slide.as_ref().map(|_| refresh);
            layout(page, refresh, &render_ready(ready, page))
        }
    }
}

/// Minimal page for form errors.
pub fn render_message(page: &PageOptions, heading: &str, message: &str) -> String {
    let body = format!(
        "<div class=\"placeholder\"><div class=\"empty\"><h2>{}</h2><p>{}</p><p><a href=\"/\">Retour à la galerie</a></p></div></div>",
        escape_html(heading),
        escape_html(message)
    );
    layout(page, None, &body)
}

fn render_loading() -> String {
    "<div class=\"placeholder\" aria-busy=\"true\"><p class=\"loading\">Chargement de la galerie...</p></div>".to_string()
}

fn render_empty() -> String {
    "<div class=\"placeholder\"><div class=\"empty\"><h2>Galerie en préparation</h2><p>Les œuvres seront bientôt disponibles.</p></div></div>".to_string()
}

fn render_ready(frame: &ReadyFrame, page: &PageOptions) -> String {
    let mut body = String::new();
    body.push_str("<section class=\"hero\">");
    match &frame.slide {
        Some(slide) => {
            write!(
                &mut body,
                "<div class=\"slide\" data-index=\"{}\" data-count=\"{}\"><img src=\"{}\" alt=\"{}\"><div class=\"shade\"></div></div>",
                slide.index,
                slide.count,
                escape_html(&slide.artwork.image_url),
                escape_html(&slide.artwork.title)
            )
            .ok();
        }
        None => body.push_str("<div class=\"slide fallback\"></div>"),
    }
    write!(
        &mut body,
        "<div class=\"name\"><h1>{}</h1><p>{}</p></div>",
        escape_html(&page.artist),
        escape_html(&page.tagline)
    )
    .ok();
    body.push_str("</section>");

    body.push_str("<section class=\"works\"><div class=\"masonry-grid\">");
    let caption_class = if frame.captions_suppressed {
        "caption hide-on-mobile"
    } else {
        "caption"
    };
    for artwork in &frame.grid {
        render_card(&mut body, artwork, caption_class);
    }
    body.push_str("</div></section>");

    render_lightbox(&mut body, &frame.lightbox);
    body
}

fn render_card(body: &mut String, artwork: &Artwork, caption_class: &str) {
    write!(
        body,
        "<form class=\"artwork-card\" method=\"post\" action=\"/lightbox/{}\"><button type=\"submit\" aria-label=\"{}\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"><div class=\"{}\"><h3>{}</h3><p>{}</p></div></button></form>",
        artwork.id,
        escape_html(&artwork.title),
        escape_html(&artwork.image_url),
        escape_html(&artwork.title),
        caption_class,
        escape_html(&artwork.title),
        escape_html(&artwork.caption())
    )
    .ok();
}

fn render_lightbox(body: &mut String, lightbox: &LightboxFrame) {
    let Some(artwork) = &lightbox.artwork else {
        return;
    };
    if lightbox.phase == LightboxPhase::Closed {
        return;
    }
    write!(
        body,
        "<div class=\"lightbox\" role=\"dialog\" aria-modal=\"true\" aria-label=\"{}\" data-phase=\"{}\"><figure><img src=\"{}\" alt=\"{}\"><figcaption><h2>{}</h2><p>{}</p></figcaption></figure><form method=\"post\" action=\"/lightbox/close\"><button type=\"submit\" class=\"close\" aria-label=\"Fermer\" autofocus>&times;</button></form></div>",
        escape_html(&artwork.title),
        lightbox.phase.as_str(),
        escape_html(&artwork.image_url),
        escape_html(&artwork.title),
        escape_html(&artwork.title),
        escape_html(&artwork.caption())
    )
    .ok();
}

fn layout(page: &PageOptions, refresh: Option<Duration>, body: &str) -> String {
    let mut head = String::new();
    write!(&mut head, "<title>{}</title>", escape_html(&page.title)).ok();
    if let Some(description) = &page.description {
        write!(
            &mut head,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(description)
        )
        .ok();
    }
    if let Some(refresh) = refresh {
        write!(
            &mut head,
            "<meta http-equiv=\"refresh\" content=\"{}\">",
            refresh.as_secs().max(1)
        )
        .ok();
    }
    format!(
        "<!DOCTYPE html><html lang=\"fr\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">{}<style>{}</style></head><body><main>{}</main></body></html>",
        head,
        styles(),
        body
    )
}

fn styles() -> &'static str {
    "body { margin: 0; background: #000; color: #fff; font-family: 'Playfair Display', serif; }\n.placeholder { min-height: 100vh; display: flex; align-items: center; justify-content: center; text-align: center; }\n.placeholder .loading { font-size: 1.25rem; }\n.placeholder h2 { font-size: 1.9rem; margin-bottom: 1rem; }\n.placeholder p { opacity: 0.8; }\n.hero { position: relative; width: 100%; height: 90vh; overflow: hidden; }\n.slide { position: absolute; inset: 0; }\n.slide img { width: 100%; height: 100%; object-fit: cover; }\n.slide .shade { position: absolute; inset: 0; background: linear-gradient(to bottom, transparent, transparent, #000); }\n.slide.fallback { background: linear-gradient(to bottom, #111827, #000); }\n.name { position: absolute; bottom: 5rem; left: 50%; transform: translateX(-50%); text-align: center; z-index: 10; }\n.name h1 { font-size: 4rem; letter-spacing: 0.05em; margin: 0 0 1rem; }\n.name p { letter-spacing: 0.3em; text-transform: uppercase; opacity: 0.8; }\n.works { padding: 5rem 0; }\n.masonry-grid { max-width: 2000px; margin: 0 auto; columns: 3 320px; column-gap: 1rem; }\n.artwork-card { break-inside: avoid; margin: 0 0 1rem; }\n.artwork-card button { all: unset; position: relative; display: block; overflow: hidden; cursor: pointer; width: 100%; }\n.artwork-card img { width: 100%; height: auto; display: block; }\n.caption { position: absolute; bottom: 0; left: 0; right: 0; padding: 1rem; transform: translateY(0.5rem); transition: transform 300ms ease-out; }\n.artwork-card button:hover .caption { transform: translateY(0); }\n.caption h3 { margin: 0 0 0.25rem; font-size: 1.25rem; }\n.caption p { margin: 0; font-size: 0.875rem; opacity: 0.9; }\n@media (max-width: 767px) { .hide-on-mobile { display: none; } .name h1 { font-size: 2.25rem; } }\n.lightbox { position: fixed; inset: 0; z-index: 50; background: rgba(0, 0, 0, 0.92); display: flex; align-items: center; justify-content: center; transition: opacity 300ms; }\n.lightbox[data-phase=\"closing\"] { opacity: 0; }\n.lightbox figure { margin: 0; max-width: 90vw; max-height: 90vh; text-align: center; }\n.lightbox img { max-width: 90vw; max-height: 80vh; object-fit: contain; }\n.lightbox form { position: absolute; top: 1rem; right: 1rem; }\n.lightbox .close { font-size: 2rem; background: none; border: none; color: #fff; cursor: pointer; }"
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
