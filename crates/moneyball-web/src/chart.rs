// Plotly figure construction for the scouting splits grid.
//
// Figures are plain Plotly JSON (`data` + `layout`) rendered client-side by
// plotly.js. The grid is 2x2: shift | pitch type on top, platoon | inning
// below, with narrow left columns and a shared y axis per row.

use moneyball_core::palette::Palette;
use moneyball_core::splits::aggregate::AggregateRow;
use moneyball_core::splits::{DimensionSplits, SplitsResult};
use serde_json::{json, Value};

use crate::html::{escape, title_case};

/// Fixed y range so players are comparable at a glance.
pub const Y_RANGE: [f64; 2] = [0.0, 0.6];

const COLUMN_WIDTHS: [f64; 2] = [0.25, 0.75];
const HORIZONTAL_SPACING: f64 = 0.02;
const VERTICAL_SPACING: f64 = 0.15;
const ANNOTATION_COLOR: &str = "#989898";

/// x domains for the two grid columns.
fn column_domains() -> [[f64; 2]; 2] {
    let usable = 1.0 - HORIZONTAL_SPACING;
    let left = usable * COLUMN_WIDTHS[0];
    [[0.0, left], [left + HORIZONTAL_SPACING, 1.0]]
}

/// y domains for the two grid rows, top row first.
fn row_domains() -> [[f64; 2]; 2] {
    let height = (1.0 - VERTICAL_SPACING) / 2.0;
    [[1.0 - height, 1.0], [0.0, height]]
}

/// Bar label: mean to three places over the PA count.
fn bar_text(row: &AggregateRow) -> String {
    match row.mean {
        Some(mean) => format!("{mean:.3}<br><br>{}<br>PAs", row.plate_appearances),
        None => format!("no data<br><br>{}<br>PAs", row.plate_appearances),
    }
}

fn bar_trace(splits: &DimensionSplits, colors: Vec<String>, axis: usize) -> Value {
    let x: Vec<&str> = splits.rows.iter().map(|r| r.key.as_str()).collect();
    // Empty buckets sit at zero with a "no data" label.
    let y: Vec<f64> = splits.rows.iter().map(|r| r.mean.unwrap_or(0.0)).collect();
    let text: Vec<String> = splits.rows.iter().map(bar_text).collect();
    json!({
        "type": "bar",
        "name": splits.dimension.title(),
        "x": x,
        "y": y,
        "text": text,
        "textposition": "inside",
        "insidetextanchor": "start",
        "marker": { "color": colors },
        "xaxis": axis_ref("x", axis),
        "yaxis": axis_ref("y", axis),
    })
}

/// `("x", 1)` -> `"x"`, `("x", 3)` -> `"x3"`.
fn axis_ref(prefix: &str, axis: usize) -> String {
    if axis == 1 {
        prefix.to_string()
    } else {
        format!("{prefix}{axis}")
    }
}

fn layout_key(prefix: &str, axis: usize) -> String {
    if axis == 1 {
        format!("{prefix}axis")
    } else {
        format!("{prefix}axis{axis}")
    }
}

/// Dashed horizontal line across one subplot at the player's average.
fn reference_line(axis: usize, y: f64) -> Value {
    json!({
        "type": "line",
        "xref": format!("{} domain", axis_ref("x", axis)),
        "x0": 0,
        "x1": 1,
        "yref": axis_ref("y", axis),
        "y0": y,
        "y1": y,
        "line": { "color": "white", "dash": "dash" },
    })
}

fn reference_annotation(axis: usize, y: f64) -> Value {
    json!({
        "xref": format!("{} domain", axis_ref("x", axis)),
        "x": 1,
        "xanchor": "right",
        "yref": axis_ref("y", axis),
        "y": y,
        "yanchor": "bottom",
        "showarrow": false,
        "text": format!("<b>Player average ({y:.3})</b>"),
        "font": { "color": ANNOTATION_COLOR },
    })
}

fn row_colors(palette: &Palette, left: &DimensionSplits, right: &DimensionSplits) -> [Vec<String>; 2] {
    let left_len = left.rows.len();
    // Start the right subplot on the color after the left subplot's last bar.
    [
        palette.cycle(left_len, 0),
        palette.cycle(right.rows.len(), left_len % 2),
    ]
}

/// Build the 2x2 scouting figure for `result`.
pub fn scouting_figure(result: &SplitsResult) -> Value {
    let [shift_colors, pitch_colors] = row_colors(&result.palette, &result.shift, &result.pitch);
    let [platoon_colors, inning_colors] =
        row_colors(&result.palette, &result.platoon, &result.inning);

    let data = vec![
        bar_trace(&result.shift, shift_colors, 1),
        bar_trace(&result.pitch, pitch_colors, 2),
        bar_trace(&result.platoon, platoon_colors, 3),
        bar_trace(&result.inning, inning_colors, 4),
    ];

    let mut layout = serde_json::Map::new();
    layout.insert(
        "title".into(),
        json!({ "text": format!("{} {} Splits", escape(&title_case(&result.player)), result.metric) }),
    );
    layout.insert("showlegend".into(), json!(false));
    layout.insert("plot_bgcolor".into(), json!("#fff"));
    layout.insert("paper_bgcolor".into(), json!("white"));
    layout.insert("height".into(), json!(800));

    let cols = column_domains();
    let rows = row_domains();
    let grid = [
        (1, 0, 0, result.shift.dimension.title()),
        (2, 0, 1, result.pitch.dimension.title()),
        (3, 1, 0, result.platoon.dimension.title()),
        (4, 1, 1, result.inning.dimension.title()),
    ];
    for (axis, row, col, title) in grid {
        let left_axis = axis - col;
        layout.insert(
            layout_key("x", axis),
            json!({
                "domain": cols[col],
                "anchor": axis_ref("y", axis),
                "type": "category",
                "title": { "text": title },
            }),
        );
        let mut yaxis = json!({
            "domain": rows[row],
            "anchor": axis_ref("x", axis),
            "range": Y_RANGE,
            "tickformat": ".3f",
        });
        if col == 0 {
            yaxis["title"] = json!({ "text": result.metric.label() });
        } else {
            yaxis["matches"] = json!(axis_ref("y", left_axis));
            yaxis["showticklabels"] = json!(false);
        }
        layout.insert(layout_key("y", axis), yaxis);
    }

    if let Some(avg) = result.overall_mean {
        let shapes: Vec<Value> = (1..=4).map(|axis| reference_line(axis, avg)).collect();
        let annotations = vec![reference_annotation(2, avg), reference_annotation(4, avg)];
        layout.insert("shapes".into(), json!(shapes));
        layout.insert("annotations".into(), json!(annotations));
    }

    json!({ "data": data, "layout": Value::Object(layout) })
}

/// HTML fragment rendering `figure` into a new div with id `div_id`.
pub fn embed(figure: &Value, div_id: &str) -> String {
    let id = escape(div_id);
    let spec = serde_json::to_string(figure)
        .unwrap_or_else(|_| "{}".to_string())
        // Keep a literal "</script>" in chart text from closing the tag.
        .replace("</", "<\\/");
    format!(
        "<div id=\"{id}\" class=\"plotly-graph\"></div>\n\
         <script>(function() {{ var fig = {spec}; \
         Plotly.newPlot(\"{id}\", fig.data || [], fig.layout || {{}}, \
         {{\"displayModeBar\": false, \"responsive\": true}}); }})();</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneyball_core::db::EventRecord;
    use moneyball_core::splits::{aggregate_dimensions, MetricKind};

    fn result_for(records: &[EventRecord], overall: Option<f64>) -> SplitsResult {
        let [shift, pitch, inning, platoon] = aggregate_dimensions(records, MetricKind::Woba);
        SplitsResult {
            player: "seiya suzuki".into(),
            fell_back: false,
            metric: MetricKind::Woba,
            team: Some("Cubs".into()),
            overall_mean: overall,
            shift,
            pitch,
            inning,
            platoon,
            palette: Palette::new(vec!["#0E3386".into(), "#CC3433".into()]),
        }
    }

    fn rec(pitch: &str, inning: i64, align: &str, woba: Option<f64>) -> EventRecord {
        EventRecord {
            player_name: "Seiya Suzuki".into(),
            pitch_type: Some(pitch.into()),
            inning,
            fielding_alignment: Some(align.into()),
            pitcher_hand: Some("R".into()),
            woba_value: woba,
            events: Some("single".into()),
            ..EventRecord::default()
        }
    }

    #[test]
    fn figure_has_four_bar_traces_on_distinct_axes() {
        let records = vec![rec("FF", 1, "Standard", Some(0.4)), rec("SL", 10, "Strategic", Some(0.2))];
        let fig = scouting_figure(&result_for(&records, Some(0.3)));

        let data = fig["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        let axes: Vec<_> = data.iter().map(|t| t["xaxis"].as_str().unwrap()).collect();
        assert_eq!(axes, vec!["x", "x2", "x3", "x4"]);
        assert_eq!(data[1]["x"], json!(["Fastball", "Breaking"]));
        assert_eq!(data[3]["x"], json!(["1", "Extras"]));
    }

    #[test]
    fn layout_title_and_axes() {
        let fig = scouting_figure(&result_for(&[rec("FF", 1, "Standard", Some(0.4))], Some(0.4)));
        let layout = &fig["layout"];
        assert_eq!(layout["title"]["text"], "Seiya Suzuki wOBA Splits");
        assert_eq!(layout["height"], 800);
        assert_eq!(layout["yaxis"]["title"]["text"], "wOBA");
        assert_eq!(layout["yaxis2"]["matches"], "y");
        assert_eq!(layout["yaxis4"]["matches"], "y3");
        assert_eq!(layout["xaxis4"]["title"]["text"], "Inning");
        assert_eq!(layout["yaxis3"]["range"], json!([0.0, 0.6]));
    }

    #[test]
    fn reference_lines_on_every_subplot() {
        let fig = scouting_figure(&result_for(&[rec("FF", 1, "Standard", Some(0.4))], Some(0.4)));
        let shapes = fig["layout"]["shapes"].as_array().unwrap();
        assert_eq!(shapes.len(), 4);
        assert!(shapes.iter().all(|s| s["y0"] == json!(0.4)));
        let annotations = fig["layout"]["annotations"].as_array().unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0]["text"], "<b>Player average (0.400)</b>");
    }

    #[test]
    fn no_reference_lines_without_average() {
        let fig = scouting_figure(&result_for(&[rec("FF", 1, "Standard", None)], None));
        assert!(fig["layout"].get("shapes").is_none());
    }

    #[test]
    fn empty_bucket_drawn_at_zero_with_label() {
        let fig = scouting_figure(&result_for(&[rec("CH", 2, "Standard", None)], None));
        let pitch = &fig["data"][1];
        assert_eq!(pitch["y"], json!([0.0]));
        assert!(pitch["text"][0].as_str().unwrap().starts_with("no data"));
    }

    #[test]
    fn colors_alternate_across_a_row() {
        // One shift bucket: the pitch subplot starts on the second color.
        let records = vec![rec("FF", 1, "Standard", Some(0.4)), rec("SL", 2, "Standard", Some(0.2))];
        let fig = scouting_figure(&result_for(&records, None));
        assert_eq!(fig["data"][0]["marker"]["color"], json!(["#0E3386"]));
        assert_eq!(fig["data"][1]["marker"]["color"], json!(["#CC3433", "#0E3386"]));
    }

    #[test]
    fn bar_text_formats_mean_and_pas() {
        let row = AggregateRow {
            key: "Fastball".into(),
            mean: Some(0.41234),
            count: 3,
            plate_appearances: 2,
            records: 5,
        };
        assert_eq!(bar_text(&row), "0.412<br><br>2<br>PAs");
    }

    #[test]
    fn embed_neutralizes_script_close() {
        let fig = json!({ "data": [], "layout": { "title": { "text": "</script><b>x</b>" } } });
        let html = embed(&fig, "scouting-splits");
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("id=\"scouting-splits\""));
        assert!(html.contains("\"displayModeBar\": false"));
    }

    #[test]
    fn column_domains_respect_widths() {
        let [left, right] = column_domains();
        assert!((left[1] - 0.245).abs() < 1e-9);
        assert!((right[0] - 0.265).abs() < 1e-9);
        assert_eq!(right[1], 1.0);
    }
}
