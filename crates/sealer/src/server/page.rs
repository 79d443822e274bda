//! The HTML form page served at `/index.html`.

use axum::response::Html;

const INDEX_TEMPLATE: &str = include_str!("../../assets/index.html");

/// Render the index page with `title` substituted into `<title>`.
pub fn render_index(title: &str) -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{{title}}", &escape_html(title)))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_substituted() {
        let Html(body) = render_index("/index.html");
        assert!(body.contains("<title>/index.html</title>"));
        assert!(body.contains(r#"action="/encrypt""#));
        assert!(body.contains(r#"name="plaintext""#));
    }

    #[test]
    fn title_is_escaped() {
        let Html(body) = render_index("<script>");
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<title><script>"));
    }
}
