//! Artifact export: document JSON, chart-input CSV, and the treemap page.
//!
//! File names are keyed by range so runs over different windows can share
//! one output directory:
//! - `tv_data_{range}.json`
//! - `chart_{range}.csv`
//! - `heatmap_{range}.html`

use anyhow::{Context, Result};
use heatlab_core::domain::HistoryRange;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::document::{ChartRow, TreemapDocument};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Paths of the files written for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub document_json: PathBuf,
    pub chart_csv: PathBuf,
    pub heatmap_html: PathBuf,
}

/// Writes a run's artifacts into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        Ok(Self { output_dir })
    }

    pub fn paths(&self, range: HistoryRange) -> ArtifactPaths {
        ArtifactPaths {
            document_json: self.output_dir.join(format!("tv_data_{range}.json")),
            chart_csv: self.output_dir.join(format!("chart_{range}.csv")),
            heatmap_html: self.output_dir.join(format!("heatmap_{range}.html")),
        }
    }

    pub fn write_all(&self, doc: &TreemapDocument, rows: &[ChartRow]) -> Result<ArtifactPaths> {
        let paths = self.paths(doc.meta.range);

        write_document_json(&paths.document_json, doc)?;
        write_chart_csv(&paths.chart_csv, rows)?;
        write_heatmap_html(&paths.heatmap_html, rows, doc.meta.range)?;

        info!(
            json = %paths.document_json.display(),
            csv = %paths.chart_csv.display(),
            html = %paths.heatmap_html.display(),
            "artifacts written"
        );
        Ok(paths)
    }
}

pub fn write_document_json(path: &Path, doc: &TreemapDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("Failed to serialize treemap document")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write document JSON {}", path.display()))?;
    Ok(())
}

/// Columns: sector, symbol, name, size, change_pct
pub fn chart_csv(rows: &[ChartRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["sector", "symbol", "name", "size", "change_pct"])?;

    for row in rows {
        let size = row.size.to_string();
        let pct = format!("{:.4}", row.color);
        wtr.write_record([
            row.path[0].as_str(),
            row.path[1].as_str(),
            row.name.as_str(),
            size.as_str(),
            pct.as_str(),
        ])?;
    }

    let bytes = wtr.into_inner().context("Failed to flush chart CSV")?;
    String::from_utf8(bytes).context("chart CSV is not valid UTF-8")
}

pub fn write_chart_csv(path: &Path, rows: &[ChartRow]) -> Result<()> {
    let csv = chart_csv(rows)?;
    std::fs::write(path, csv)
        .with_context(|| format!("Failed to write chart CSV {}", path.display()))?;
    Ok(())
}

/// Plotly treemap trace: one parent node per sector, one leaf per row.
///
/// Sector nodes carry the sum of their leaves' sizes and the size-weighted
/// mean of their colors.
pub fn treemap_trace(rows: &[ChartRow]) -> serde_json::Value {
    let mut sector_totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for row in rows {
        let (size, weighted) = sector_totals.entry(row.path[0].as_str()).or_default();
        *size += row.size;
        *weighted += row.size * row.color;
    }

    let mut ids = Vec::new();
    let mut labels = Vec::new();
    let mut parents = Vec::new();
    let mut values = Vec::new();
    let mut colors = Vec::new();
    let mut hover = Vec::new();

    for (sector, (size, weighted)) in &sector_totals {
        ids.push(sector.to_string());
        labels.push(sector.to_string());
        parents.push(String::new());
        values.push(*size);
        colors.push(if *size > 0.0 { weighted / size } else { 0.0 });
        hover.push(sector.to_string());
    }
    for row in rows {
        ids.push(format!("{}/{}", row.path[0], row.path[1]));
        labels.push(row.path[1].clone());
        parents.push(row.path[0].clone());
        values.push(row.size);
        colors.push(row.color);
        hover.push(row.name.clone());
    }

    json!({
        "type": "treemap",
        "ids": ids,
        "labels": labels,
        "parents": parents,
        "values": values,
        "customdata": hover,
        "branchvalues": "total",
        "marker": {
            "colors": colors,
            "colorscale": "RdYlGn",
            "cmid": 0,
            "colorbar": {"title": {"text": "% change"}},
        },
        "hovertemplate": "%{label}<br>%{customdata}<br>%{color:.2f}%<extra></extra>",
    })
}

pub fn render_heatmap_html(rows: &[ChartRow], range: HistoryRange) -> String {
    let trace = treemap_trace(rows);
    let layout = json!({
        "title": {"text": format!("Heatmap-style blocks (range={range})")},
        "margin": {"t": 50, "l": 25, "r": 25, "b": 25},
    });
    // Keep the embedded JSON from closing the script element.
    let data = format!("[{trace}]").replace("</", "<\\/");
    let layout = layout.to_string().replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Heatmap ({range})</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="heatmap" style="width:100%;height:95vh;"></div>
<script>
Plotly.newPlot("heatmap", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#
    )
}

pub fn write_heatmap_html(path: &Path, rows: &[ChartRow], range: HistoryRange) -> Result<()> {
    std::fs::write(path, render_heatmap_html(rows, range))
        .with_context(|| format!("Failed to write heatmap HTML {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sector: &str, symbol: &str, size: f64, color: f64) -> ChartRow {
        ChartRow {
            path: [sector.to_string(), symbol.to_string()],
            name: format!("{symbol} Corp"),
            size,
            color,
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = chart_csv(&[row("Banks", "VCB", 1.0, 2.5), row("Tech", "FPT", 1.0, -1.25)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "sector,symbol,name,size,change_pct");
        assert_eq!(lines[1], "Banks,VCB,VCB Corp,1,2.5000");
        assert_eq!(lines[2], "Tech,FPT,FPT Corp,1,-1.2500");
    }

    #[test]
    fn trace_has_sector_parents_then_leaves() {
        let trace = treemap_trace(&[
            row("Tech", "FPT", 2.0, 10.0),
            row("Banks", "VCB", 1.0, 4.0),
            row("Tech", "CMG", 2.0, -2.0),
        ]);
        assert_eq!(trace["ids"][0], "Banks");
        assert_eq!(trace["ids"][1], "Tech");
        assert_eq!(trace["parents"][2], "Tech");
        assert_eq!(trace["ids"][2], "Tech/FPT");
        assert_eq!(trace["values"][1], 4.0);
        assert_eq!(trace["marker"]["colors"][1], 4.0);
        assert_eq!(trace["marker"]["cmid"], 0);
    }

    #[test]
    fn html_embeds_range_and_escapes_script_close() {
        let html = render_heatmap_html(&[row("A</script>", "X", 1.0, 0.0)], HistoryRange::Year);
        assert!(html.contains("range=year"));
        assert!(html.contains("Plotly.newPlot"));
        assert!(!html.contains("A</script>"));
    }
}
