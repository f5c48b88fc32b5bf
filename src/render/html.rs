//! HTML output for the web front-end.

use crate::aggregate::{DisplayLine, VideoGroupDisplay};
use crate::config::ServerSettings;
use crate::filters::{Channel, PublishYear, SearchFilter};

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn render_lines(lines: &[DisplayLine]) -> String {
    let mut html = String::new();
    for line in lines {
        match line {
            DisplayLine::Break => html.push_str("<br>"),
            DisplayLine::Text { text, url } => html.push_str(&format!(
                "<small><a href=\"{}\">{}... </a></small>",
                escape_html(url),
                escape_html(text)
            )),
        }
    }
    html
}

/// Render one video card.
pub fn render_card(card: &VideoGroupDisplay) -> String {
    format!(
        r#"<div class="card">
  <table>
    <tr>
      <th><a href="{url}"><img src="{thumb}" alt="" style="width: 192px; height: 106px"></a></th>
      <th><h2>{title}</h2></th>
    </tr>
  </table>
  <div><p>{lines}</p></div>
</div>
<br><br>
"#,
        url = escape_html(&card.url),
        thumb = escape_html(&card.thumbnail_url),
        title = escape_html(&card.title),
        lines = render_lines(&card.lines),
    )
}

/// State of the search form to echo back into the page.
#[derive(Debug, Clone, Default)]
pub struct PageForm {
    pub query: String,
    pub filter: SearchFilter,
}

fn render_form(form: &PageForm) -> String {
    let channels: String = Channel::ALL
        .iter()
        .map(|c| {
            let checked = if form.filter.channels.contains(c) { " checked" } else { "" };
            format!(
                concat!(
                    r#"<label><input type="checkbox" name="channel" value="{v}"{checked}>"#,
                    r#" {v}</label> "#
                ),
                v = c.as_str(),
                checked = checked
            )
        })
        .collect();

    let years: String = PublishYear::all()
        .iter()
        .map(|y| {
            let checked = if form.filter.years.contains(y) { " checked" } else { "" };
            format!(
                r#"<label><input type="checkbox" name="year" value="{v}"{checked}> {v}</label> "#,
                v = y,
                checked = checked
            )
        })
        .collect();

    format!(
        r#"<form method="get" action="/">
  <input type="text" name="q" value="{query}" placeholder="Search!" size="60">
  <button type="submit">Search</button>
  <details>
    <summary>Advanced Options</summary>
    <p>Channels: {channels}</p>
    <p>Years: {years}</p>
  </details>
</form>"#,
        query = escape_html(&form.query),
        channels = channels,
        years = years,
    )
}

/// Static text above the search form.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub title: String,
    pub intro: Vec<String>,
    pub index_notice: Option<String>,
}

impl From<&ServerSettings> for PageHeader {
    fn from(server: &ServerSettings) -> Self {
        Self {
            title: server.title.clone(),
            intro: server.intro.clone(),
            index_notice: server.index_notice.clone(),
        }
    }
}

impl Default for PageHeader {
    fn default() -> Self {
        Self::from(&ServerSettings::default())
    }
}

fn render_header(header: &PageHeader) -> String {
    let mut html = format!("<h1>{}</h1>\n", escape_html(&header.title));
    for paragraph in &header.intro {
        html.push_str(&format!("<p>{}</p>\n", escape_html(paragraph)));
    }
    if let Some(notice) = &header.index_notice {
        html.push_str(&format!(
            "<p class=\"info\" role=\"note\">{}</p>\n",
            escape_html(notice)
        ));
    }
    html
}

/// Render the full search page with the form and any result cards.
pub fn render_page(
    header: &PageHeader,
    form: &PageForm,
    cards: &[VideoGroupDisplay],
    notice: Option<&str>,
) -> String {
    let notice_html = notice
        .map(|n| format!("<p class=\"notice\">{}</p>", escape_html(n)))
        .unwrap_or_default();
    let cards_html: String = cards.iter().map(render_card).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
{header}{form}
{notice}
{cards}
</body>
</html>
"#,
        title = escape_html(&header.title),
        header = render_header(header),
        form = render_form(form),
        notice = notice_html,
        cards = cards_html,
    )
}
