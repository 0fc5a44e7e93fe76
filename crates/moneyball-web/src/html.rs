// Server-side HTML assembly: page shell, escaping, and JSON-to-HTML tables.

use moneyball_core::overview::PageData;
use moneyball_core::quotes::Quote;
use moneyball_core::splits::{MetricKind, SplitsResult};
use serde_json::Value;
use std::fmt::Write;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Navigation entries: (href, label).
const NAV: &[(&str, &str)] = &[
    ("/home", "Home"),
    ("/scouting.html", "Scouting"),
    ("/shift.html", "Shift"),
    ("/statcast.html", "Statcast"),
    ("/roster.html", "Roster"),
    ("/abs.html", "ABS"),
    ("/blog.html", "Blog"),
    ("/bts.html", "Behind the Scenes"),
    ("/about.html", "About"),
];

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(s: &str) -> String {
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

/// Wrap `body` in the shared page shell. `active` is the nav href to mark.
pub fn layout(title: &str, active: &str, body: &str) -> String {
    let mut nav = String::new();
    for (href, label) in NAV {
        let class = if *href == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{href}\"{class}>{label}</a>");
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | Moneyball</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         <script src=\"{PLOTLY_CDN}\" charset=\"utf-8\"></script>\n\
         </head>\n<body>\n<nav>{nav}</nav>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

/// Render a JSON value for display. Arrays of objects become tables keyed by
/// the first row's fields; nested values fall back to compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Array(rows) if !rows.is_empty() && rows.iter().all(Value::is_object) => {
            render_table(rows)
        }
        Value::Array(items) => {
            let mut out = String::from("<ul>");
            for item in items {
                let _ = write!(out, "<li>{}</li>", scalar_text(item));
            }
            out.push_str("</ul>");
            out
        }
        Value::Object(map) => {
            let mut out = String::from("<dl>");
            for (k, v) in map {
                let _ = write!(out, "<dt>{}</dt><dd>{}</dd>", escape(k), scalar_text(v));
            }
            out.push_str("</dl>");
            out
        }
        other => format!("<p>{}</p>", scalar_text(other)),
    }
}

fn render_table(rows: &[Value]) -> String {
    let columns: Vec<&String> = rows[0]
        .as_object()
        .map(|o| o.keys().collect())
        .unwrap_or_default();

    let mut out = String::from("<table class=\"data\"><thead><tr>");
    for col in &columns {
        let _ = write!(out, "<th>{}</th>", escape(col));
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for col in &columns {
            let cell = row.get(col.as_str()).unwrap_or(&Value::Null);
            let _ = write!(out, "<td>{}</td>", scalar_text(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape(s),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.3}"),
            _ => n.to_string(),
        },
        other => escape(&other.to_string()),
    }
}

/// One `<section>` per entry of the page data.
pub fn page_data_sections(data: &PageData) -> String {
    let mut out = String::new();
    for (key, value) in data {
        let _ = write!(
            out,
            "<section class=\"overview\"><h2>{}</h2>{}</section>\n",
            escape(&humanize(key)),
            render_value(value)
        );
    }
    out
}

/// `"top_hitters_xwoba"` -> `"Top Hitters Xwoba"`.
pub fn humanize(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// Capitalize the first letter of each word and lowercase the rest.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

pub fn home_page(quote: Option<&Quote>, data: &PageData) -> String {
    let mut body = String::from("<h1>Moneyball</h1>\n");
    if let Some(q) = quote {
        let _ = write!(
            body,
            "<blockquote class=\"quote\"><p>{}</p><footer><a href=\"{}\">{}</a></footer></blockquote>\n",
            escape(&q.quote),
            escape(&q.link),
            escape(&q.author)
        );
    }
    body.push_str(&page_data_sections(data));
    layout("Home", "/home", &body)
}

pub fn statcast_page(data: &PageData) -> String {
    let body = format!("<h1>Statcast</h1>\n{}", page_data_sections(data));
    layout("Statcast", "/statcast.html", &body)
}

/// Saved shift figures: strings are HTML fragments exported offline and are
/// embedded as-is; objects are Plotly figure specs.
pub fn shift_page(figures: &PageData) -> String {
    let mut body = String::from("<h1>The Shift</h1>\n");
    for (name, figure) in figures {
        let _ = write!(body, "<section class=\"figure\" id=\"{}\">", escape(name));
        match figure {
            Value::String(fragment) => body.push_str(fragment),
            Value::Object(_) => body.push_str(&crate::chart::embed(figure, &format!("fig-{name}"))),
            other => body.push_str(&render_value(other)),
        }
        body.push_str("</section>\n");
    }
    layout("Shift", "/shift.html", &body)
}

/// Scouting form plus the splits grid.
pub fn scouting_page(result: &SplitsResult, requested: &str, figure: &Value) -> String {
    let mut body = String::from("<h1>Scouting</h1>\n");
    body.push_str(&scouting_form(&result.player, result.metric));

    if result.fell_back && !requested.trim().is_empty() {
        let _ = write!(
            body,
            "<p class=\"notice\">No data for {}; showing {} instead.</p>\n",
            escape(requested.trim()),
            escape(&result.player)
        );
    }
    let empty = result.empty_buckets();
    if !empty.is_empty() {
        let list = empty
            .iter()
            .map(|(dim, key)| format!("{} {}", dim.title(), escape(key)))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(
            body,
            "<p class=\"notice\">No {} data for: {list}.</p>\n",
            result.metric
        );
    }

    body.push_str(&crate::chart::embed(figure, "scouting-splits"));
    layout("Scouting", "/scouting.html", &body)
}

fn scouting_form(player: &str, metric: MetricKind) -> String {
    let mut options = String::new();
    for m in MetricKind::ALL {
        let selected = if m == metric { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{m}\"{selected}>{m}</option>");
    }
    format!(
        "<form method=\"post\" action=\"/scouting.html\" class=\"scouting\">\
         <input type=\"text\" name=\"player\" value=\"{}\" placeholder=\"Player name\">\
         <select name=\"metric\">{options}</select>\
         <button type=\"submit\">Go</button></form>\n",
        escape(player)
    )
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        "<h1>{status}</h1>\n<p>{}</p>\n<p><a href=\"/home\">Back to home</a></p>",
        escape(message)
    );
    layout("Error", "", &body)
}
