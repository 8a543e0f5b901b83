// Page model and the one writer that turns it into markup.
//
// Pages are plain data (sections, tables, cells). `render_page` is the only
// place that produces HTML: dynamic text always goes through `Html::text` or
// an escaped attribute, and unescaped output is limited to `&'static str`
// template fragments.

use crate::chart::ChartImage;
use crate::util::escape_html;

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub numeric: bool,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell {
            text: s.into(),
            numeric: false,
        }
    }

    pub fn num(s: impl Into<String>) -> Self {
        Cell {
            text: s.into(),
            numeric: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub color: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Donut {
    /// `conic-gradient` stop list.
    pub stops: String,
    pub center: String,
    pub legend: Vec<LegendItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub label: String,
    /// Matched against `Page::active` to highlight the current page.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Note(String),
    /// A note ending with an emphasised value.
    Figure { text: String, value: String },
    Kpis(Vec<Kpi>),
    Donut(Donut),
    Table(Table),
    Chart {
        caption: String,
        image: Option<ChartImage>,
        fallback: Table,
    },
    Links(Vec<Link>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub file_name: String,
    pub title: String,
    pub active: String,
    pub header: Vec<Block>,
    pub sections: Vec<Section>,
}

struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(16 * 1024),
        }
    }

    fn raw(&mut self, s: &'static str) {
        self.buf.push_str(s);
    }

    fn text(&mut self, s: &str) {
        self.buf.push_str(&escape_html(s));
    }

    fn open(&mut self, tag: &'static str, attrs: &[(&'static str, &str)]) {
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape_html(value));
            self.buf.push('"');
        }
        self.buf.push('>');
    }

    fn close(&mut self, tag: &'static str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    fn element(&mut self, tag: &'static str, attrs: &[(&'static str, &str)], text: &str) {
        self.open(tag, attrs);
        self.text(text);
        self.close(tag);
    }

    fn finish(self) -> String {
        self.buf
    }
}

const MENU_SCRIPT: &str = "<script>\n\
function toggleMenu(){document.getElementById('menu').classList.toggle('open');\
document.getElementById('overlay').classList.toggle('show');}\n\
function closeMenu(){document.getElementById('menu').classList.remove('open');\
document.getElementById('overlay').classList.remove('show');}\n\
</script>\n";

/// Render one complete document.
pub fn render_page(page: &Page, nav: &[Link], site_title: &str, stylesheet: &str) -> String {
    let mut w = Html::new();
    w.raw("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n");
    w.raw("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n");
    w.element("title", &[], &page.title);
    w.raw("\n");
    w.open("link", &[("rel", "stylesheet"), ("href", stylesheet)]);
    w.raw("\n</head>\n<body>\n");

    write_nav(&mut w, nav, &page.active, site_title);

    w.open("main", &[("class", "content")]);
    w.raw("\n");
    if !page.header.is_empty() {
        w.open("header", &[("class", "page-head")]);
        w.element("h1", &[], &page.title);
        for block in &page.header {
            write_block(&mut w, block);
        }
        w.close("header");
        w.raw("\n");
    }
    for section in &page.sections {
        w.open("section", &[("class", "card"), ("id", section.id.as_str())]);
        w.element("h2", &[], &section.heading);
        for block in &section.blocks {
            write_block(&mut w, block);
        }
        w.close("section");
        w.raw("\n");
    }
    w.close("main");
    w.raw("\n<footer class=\"foot\">Tableau de bord généré automatiquement.</footer>\n");
    w.raw(MENU_SCRIPT);
    w.raw("</body>\n</html>\n");
    w.finish()
}

fn write_links(w: &mut Html, links: &[Link], active: &str) {
    for link in links {
        let class = if link.key == active { "active" } else { "" };
        w.open("a", &[("class", class), ("href", link.href.as_str())]);
        w.text(&link.label);
        w.close("a");
    }
}

fn write_nav(w: &mut Html, nav: &[Link], active: &str, site_title: &str) {
    w.raw("<header class=\"topbar\">\n<div class=\"brand\">");
    w.raw("<button class=\"burger\" onclick=\"toggleMenu()\">&#9776;</button>");
    w.element("span", &[("class", "site-title")], site_title);
    w.raw("</div>\n<nav class=\"quick\">");
    write_links(w, nav, active);
    w.raw("</nav>\n</header>\n");
    w.raw("<div class=\"overlay\" id=\"overlay\" onclick=\"closeMenu()\"></div>\n");
    w.raw("<aside class=\"menu\" id=\"menu\">");
    write_links(w, nav, active);
    w.raw("</aside>\n");
}

fn write_table(w: &mut Html, table: &Table) {
    w.raw("<div class=\"table-wrap\"><table>\n<thead><tr>");
    for h in &table.headers {
        w.element("th", &[], h);
    }
    w.raw("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        w.raw("<tr>");
        for cell in row {
            if cell.numeric {
                w.element("td", &[("class", "num")], &cell.text);
            } else {
                w.element("td", &[], &cell.text);
            }
        }
        w.raw("</tr>\n");
    }
    w.raw("</tbody></table></div>\n");
}

fn write_block(w: &mut Html, block: &Block) {
    match block {
        Block::Note(text) => w.element("p", &[("class", "muted")], text),
        Block::Figure { text, value } => {
            w.open("p", &[("class", "muted")]);
            w.text(text);
            w.raw(" ");
            w.element("strong", &[], value);
            w.close("p");
        }
        Block::Kpis(kpis) => {
            w.raw("<div class=\"kpis\">\n");
            for kpi in kpis {
                w.raw("<div class=\"kpi\">");
                w.element("div", &[("class", "label")], &kpi.label);
                w.element("div", &[("class", "value")], &kpi.value);
                w.raw("</div>\n");
            }
            w.raw("</div>\n");
        }
        Block::Donut(donut) => {
            w.raw("<div class=\"donut-wrap\">\n");
            let style = format!("--conic: {}", donut.stops);
            w.open("div", &[("class", "donut"), ("style", style.as_str())]);
            w.element("div", &[("class", "center")], &donut.center);
            w.close("div");
            w.raw("\n<ul class=\"legend\">\n");
            for item in &donut.legend {
                let dot = format!("background:{}", item.color);
                w.raw("<li>");
                w.open("span", &[("class", "dot"), ("style", dot.as_str())]);
                w.close("span");
                w.text(&item.label);
                w.element("span", &[("class", "num")], &item.value);
                w.raw("</li>\n");
            }
            w.raw("</ul>\n</div>\n");
        }
        Block::Table(table) => write_table(w, table),
        Block::Chart {
            caption,
            image,
            fallback,
        } => {
            w.raw("<figure class=\"chart\">");
            w.element("figcaption", &[], caption);
            match image {
                Some(img) => {
                    w.open(
                        "img",
                        &[("class", "chart-img"), ("src", img.src.as_str()), ("alt", img.alt.as_str())],
                    );
                }
                None => {
                    w.raw("<p class=\"muted\">Graphique indisponible, données en tableau.</p>\n");
                    write_table(w, fallback);
                }
            }
            w.raw("</figure>\n");
        }
        Block::Links(links) => {
            w.raw("<p class=\"muted\">Voir aussi : ");
            for (i, link) in links.iter().enumerate() {
                if i > 0 {
                    w.raw(", ");
                }
                w.element("a", &[("href", link.href.as_str())], &link.label);
            }
            w.raw("</p>\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(sections: Vec<Section>) -> Page {
        Page {
            file_name: "index.html".to_string(),
            title: "T & co".to_string(),
            active: "index".to_string(),
            header: vec![],
            sections,
        }
    }

    #[test]
    fn table_cells_are_escaped() {
        let table = Table {
            headers: vec!["Département".to_string()],
            rows: vec![vec![Cell::text("<script>alert('x')</script>")]],
        };
        let out = render_page(
            &page(vec![Section {
                id: "t".to_string(),
                heading: "H".to_string(),
                blocks: vec![Block::Table(table)],
            }]),
            &[],
            "Site",
            "style.css",
        );
        assert!(out.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!out.contains("<script>alert"));
        assert!(out.contains("<title>T &amp; co</title>"));
    }

    #[test]
    fn active_link_is_marked() {
        let nav = vec![
            Link {
                href: "index.html".to_string(),
                label: "Accueil".to_string(),
                key: "index".to_string(),
            },
            Link {
                href: "asvp.html".to_string(),
                label: "ASVP".to_string(),
                key: "asvp".to_string(),
            },
        ];
        let out = render_page(&page(vec![]), &nav, "Site", "style.css");
        assert!(out.contains("<a class=\"active\" href=\"index.html\">Accueil</a>"));
        assert!(out.contains("<a class=\"\" href=\"asvp.html\">ASVP</a>"));
    }

    #[test]
    fn missing_chart_falls_back_to_table() {
        let fallback = Table {
            headers: vec!["Département".to_string(), "Total".to_string()],
            rows: vec![vec![Cell::text("01"), Cell::num("8")]],
        };
        let out = render_page(
            &page(vec![Section {
                id: "c".to_string(),
                heading: "Chart".to_string(),
                blocks: vec![Block::Chart {
                    caption: "Top".to_string(),
                    image: None,
                    fallback,
                }],
            }]),
            &[],
            "Site",
            "style.css",
        );
        assert!(out.contains("Graphique indisponible"));
        assert!(out.contains("<td class=\"num\">8</td>"));
        assert!(!out.contains("<img"));
    }
}
