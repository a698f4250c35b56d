//! Server-rendered HTML pages for the web form.

use pulldown_cmark::{escape::escape_html, html, Event, Options, Parser, Tag};

use crate::agents::CrewOutput;

pub const PAGE_TITLE: &str = "Max: Startup Architect";
pub const HEADING: &str = "🚀 Max: Multi-Agent Startup Architect";
pub const DOWNLOAD_FILE_NAME: &str = "plan.md";

/// URL schemes a rendered link or image may point at
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;line-height:1.5}\
input[type=text]{width:100%;padding:.5rem;font-size:1rem;box-sizing:border-box}\
button{margin-top:.75rem;padding:.5rem 1rem;font-size:1rem;cursor:pointer}\
.notice{padding:.75rem 1rem;border-radius:.4rem;margin:1rem 0}\
.warning{background:#fff8e1;border:1px solid #f5c242}\
.error{background:#fdecea;border:1px solid #e57373}\
.blueprint{border-top:1px solid #ddd;margin-top:1.5rem}\
details{margin:1rem 0;color:#555}";

/// Message shown above the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
}

impl Notice {
    fn render(&self) -> String {
        let (class, text) = match self {
            Notice::Warning(text) => ("warning", text),
            Notice::Error(text) => ("error", text),
        };
        format!(r#"<div class="notice {}">{}</div>"#, class, escape(text))
    }
}

/// Escape text for use in HTML bodies and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

/// Whether a link target is relative or uses one of `SAFE_SCHEMES`
///
/// Browsers ignore whitespace and control characters inside a scheme, so
/// those are removed before looking at it.
fn is_safe_destination(dest: &str) -> bool {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    match cleaned.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(idx) if cleaned[idx..].starts_with(':') => {
            let scheme = cleaned[..idx].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

/// Render model output as HTML
///
/// Raw HTML in the markdown is shown as text, not interpreted. Links and
/// images with any other scheme than `SAFE_SCHEMES` lose their target and
/// keep only their text.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link(_, ref dest, _) | Tag::Image(_, ref dest, _))
        | Event::End(Tag::Link(_, ref dest, _) | Tag::Image(_, ref dest, _))
            if !is_safe_destination(dest) =>
        {
            None
        }
        other => Some(other),
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h1>{heading}</h1>\n{body}\n</body>\n</html>\n",
        title = PAGE_TITLE,
        style = STYLE,
        heading = HEADING,
        body = body,
    )
}

fn idea_form(idea: &str) -> String {
    format!(
        r#"<form method="post" action="/roadmap">
<label for="idea">What is your startup idea?</label>
<input type="text" id="idea" name="idea" value="{}" placeholder="e.g. AI for Norway travel">
<button type="submit">Generate Roadmap</button>
</form>"#,
        escape(idea)
    )
}

/// The input form, optionally with a notice and the previous input
pub fn form_page(idea: &str, notice: Option<&Notice>) -> String {
    let notice = notice.map(Notice::render).unwrap_or_default();
    layout(&format!("{}\n{}", idea_form(idea), notice))
}

/// The form followed by the crew's blueprint and a download button
pub fn result_page(idea: &str, output: &CrewOutput) -> String {
    let status: String = output
        .events
        .iter()
        .map(|e| format!("<li>{}</li>", escape(&e.event.to_string())))
        .collect();

    let body = format!(
        r#"{form}
<details><summary>✅ Success!</summary><ul>{status}</ul></details>
<section class="blueprint">
<h2>Final Blueprint</h2>
{blueprint}
</section>
<form method="post" action="/roadmap/download">
<textarea name="content" hidden>{raw}</textarea>
<button type="submit">Download (.md)</button>
</form>"#,
        form = idea_form(idea),
        status = status,
        blueprint = markdown_to_html(&output.raw),
        raw = escape(&output.raw),
    );

    layout(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{CrewEvent, TimedEvent};
    use chrono::Utc;
    use uuid::Uuid;

    fn output(raw: &str) -> CrewOutput {
        let crew_id = Uuid::new_v4();
        CrewOutput {
            crew_id,
            raw: raw.to_string(),
            tasks_output: vec![],
            events: vec![TimedEvent::now(CrewEvent::KickoffCompleted { crew_id })],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; 'Jerry'&lt;/b&gt;"
        );
    }

    #[test]
    fn markdown_lists_become_html() {
        let rendered = markdown_to_html("## Stack\n\n- Rust\n- Postgres\n");
        assert!(rendered.contains("<h2>Stack</h2>"));
        assert!(rendered.contains("<li>Rust</li>"));
    }

    #[test]
    fn raw_html_from_the_model_is_not_interpreted() {
        let rendered = markdown_to_html("<script>alert(1)</script>\n");
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn script_links_lose_their_target() {
        let rendered = markdown_to_html("[Acme](javascript:alert(document.cookie))");
        assert!(!rendered.contains("href"));
        assert!(!rendered.contains("javascript:"));
        assert!(rendered.contains("Acme"));

        let rendered = markdown_to_html("[Acme]( JavaScript:alert(1) )\n\n[Globex](java\tscript:alert(1))");
        assert!(!rendered.contains("href"));
    }

    #[test]
    fn script_images_are_not_rendered() {
        let rendered = markdown_to_html("![logo](data:text/html;base64,PHNjcmlwdD4=)");
        assert!(!rendered.contains("<img"));
        assert!(rendered.contains("logo"));
    }

    #[test]
    fn web_and_relative_links_are_kept() {
        let rendered = markdown_to_html(
            "[Acme](https://acme.example/a?b=c) [mail](mailto:hi@acme.example) [docs](/docs#stack)",
        );
        assert!(rendered.contains(r#"href="https://acme.example/a?b=c""#));
        assert!(rendered.contains(r#"href="mailto:hi@acme.example""#));
        assert!(rendered.contains(r#"href="/docs#stack""#));
    }

    #[test]
    fn form_page_keeps_input_and_shows_warning() {
        let page = form_page(
            "\"quoted\" idea",
            Some(&Notice::Warning("Please enter an idea first!".into())),
        );

        assert!(page.contains("What is your startup idea?"));
        assert!(page.contains(r#"value="&quot;quoted&quot; idea""#));
        assert!(page.contains(r#"<div class="notice warning">Please enter an idea first!</div>"#));
    }

    #[test]
    fn form_page_without_notice() {
        let page = form_page("", None);
        assert!(page.contains("Generate Roadmap"));
        assert!(!page.contains("class=\"notice"));
        assert!(page.contains("<title>Max: Startup Architect</title>"));
    }

    #[test]
    fn result_page_offers_download_of_raw_text() {
        let page = result_page("fjord tours", &output("- Acme & Co\n- <Globex>"));

        assert!(page.contains("<h2>Final Blueprint</h2>"));
        assert!(page.contains("Download (.md)"));
        assert!(page.contains(
            r#"<textarea name="content" hidden>- Acme &amp; Co
- &lt;Globex&gt;</textarea>"#
        ));
        assert!(page.contains("<li>Success!</li>"));
    }
}
