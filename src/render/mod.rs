//! HTML rendering of result cards and the search page.

mod html;

pub use html::{escape_html, render_card, render_page, PageForm, PageHeader};
