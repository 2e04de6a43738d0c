//! End-to-end checks: config loading through scene building and export

use nicefigs::canvas::{ArtistKind, Panel};
use nicefigs::config::{load_config, validate, ConfigSource, OverlayKind, SeriesSpec};
use nicefigs::layer::{self, Layer};
use nicefigs::style::{in_to_mm, in_to_pt, mm_to_in, pt_to_in};
use nicefigs::{
    render_spec, DataFrame, DataSource, ExportBase, ExternalData, NicefigsError, RenderOptions,
};
use polars::prelude::*;
use serde_json::json;
use std::fs;

#[test]
fn validation_is_idempotent() {
    let spec = validate(
        json!({
            "size": {"width": 89, "height": 67, "unit": "mm"},
            "preset": "ieee_single_col",
            "layout": {"rows": 1, "cols": 2, "shared_y": true},
            "axes_defaults": {"grid": {"show": false}},
            "panels": [
                {
                    "axes": {"title": {"text": "Latency", "weight": "bold"}, "xscale": "log"},
                    "series": [{"type": "cdf", "x": "latency_ms", "label": "baseline"}],
                    "overlays": [{"type": "vline", "x": 20, "color": "red", "linestyle": "dashed"}]
                },
                {"axes": {"legend": {"show": false}}}
            ],
            "export": {"path": "out/latency", "formats": ["png", "svg"]}
        }),
        None,
    )
    .unwrap();

    let again = validate(spec.as_raw(), None).unwrap();
    assert_eq!(again, spec);
}

#[test]
fn units_round_trip() {
    for v in [0.001, 0.5, 1.0, 3.5, 89.0, 1234.5678] {
        assert!((mm_to_in(in_to_mm(v)) - v).abs() < 1e-9 * v.max(1.0));
        assert!((pt_to_in(in_to_pt(v)) - v).abs() < 1e-9 * v.max(1.0));
    }
}

#[test]
fn overlay_files_expand_before_validation() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("band.yaml"), "- {type: band, x0: 0, x1: 1}\n").unwrap();
    fs::write(
        dir.path().join("figure.yaml"),
        "size: {width: 4, height: 3}\npanels:\n  - overlays: [band.yaml]\n",
    )
    .unwrap();

    let spec = load_config(ConfigSource::Path(dir.path().join("figure.yaml"))).unwrap();
    let overlays = spec.panels[0].overlays.as_ref().unwrap();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].kind, OverlayKind::Band);
    assert_eq!(overlays[0].x0, Some(0.0));
    assert_eq!(overlays[0].x1, Some(1.0));
}

fn latency_table() -> DataFrame {
    df! { "v" => [3.0, 1.0, 2.0] }.unwrap()
}

#[test]
fn cdf_series_is_sorted_with_rank_fractions() {
    let spec = validate(
        json!({
            "size": {"width": 4, "height": 3},
            "panels": [{"series": [{"type": "cdf", "x": "v"}]}]
        }),
        None,
    )
    .unwrap();
    let external = ExternalData::Single(DataSource::Frame(latency_table()));
    let figure = nicefigs::figure::render_figure(&spec, Some(&external)).unwrap();

    let panel = &figure.panels[0];
    match &panel.artists()[0].kind {
        ArtistKind::Line { xs, ys } => {
            assert_eq!(xs, &vec![1.0, 2.0, 3.0]);
            assert_eq!(ys, &vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
        }
        other => panic!("expected a line, got {:?}", other),
    }
}

#[test]
fn legend_pads_to_label_overrides() {
    let spec = validate(
        json!({
            "size": {"width": 4, "height": 3},
            "panels": [{
                "axes": {"legend": {"show": true, "labels": ["a", "b", "c"]}},
                "series": [{"type": "line", "x": "v", "y": "v", "label": "measured"}]
            }]
        }),
        None,
    )
    .unwrap();
    let external = ExternalData::Single(DataSource::Frame(latency_table()));
    let figure = nicefigs::figure::render_figure(&spec, Some(&external)).unwrap();

    let legend = figure.panels[0].legend.as_ref().unwrap();
    assert_eq!(legend.entries.len(), 3);
    assert_eq!(legend.labels(), vec!["a", "b", "c"]);
}

#[test]
fn range_ticks_are_inclusive() {
    let spec = validate(
        json!({
            "size": {"width": 4, "height": 3},
            "panels": [{"axes": {
                "limits": {"x": [0, 1]},
                "xticks": {"range": [0, 1, 0.25]}
            }}]
        }),
        None,
    )
    .unwrap();
    let figure = nicefigs::figure::render_figure(&spec, None).unwrap();
    let panel = &figure.panels[0];
    assert_eq!(
        panel.xaxis.tick_values(panel.xlim()),
        vec![0.0, 0.25, 0.5, 0.75, 1.0]
    );
}

#[test]
fn unused_grid_slots_are_hidden() {
    let spec = validate(
        json!({
            "size": {"width": 6, "height": 2},
            "layout": {"rows": 1, "cols": 3},
            "panels": [{}, {}]
        }),
        None,
    )
    .unwrap();
    let figure = nicefigs::figure::render_figure(&spec, None).unwrap();
    assert_eq!(figure.panels.len(), 3);
    assert_eq!(figure.visible_panels().count(), 2);
    assert!(!figure.panels[2].visible);
}

#[test]
fn rect_overlay_uses_explicit_colors() {
    let spec = validate(
        json!({
            "size": {"width": 4, "height": 3},
            "panels": [{"overlays": [{
                "type": "rect", "x": 0, "y": 0, "width": 2, "height": 1,
                "facecolor": "#eee", "edgecolor": "red"
            }]}]
        }),
        None,
    )
    .unwrap();
    let figure = nicefigs::figure::render_figure(&spec, None).unwrap();
    let artist = &figure.panels[0].artists()[0];

    assert_eq!(
        artist.kind,
        ArtistKind::Rect {
            x: 0.0,
            y: 0.0,
            width: 2.0,
            height: 1.0
        }
    );
    assert_eq!(artist.style.facecolor.as_deref(), Some("#eee"));
    assert_eq!(artist.style.edgecolor.as_deref(), Some("red"));
}

#[test]
fn theme_keys_lose_to_user_keys() {
    let spec = validate(
        json!({
            "theme": "light",
            "palette": "custom",
            "size": {"width": 4, "height": 3},
            "panels": [{}]
        }),
        None,
    )
    .unwrap();
    assert_eq!(spec.palette.as_deref(), Some("custom"));
}

#[test]
fn preset_fills_what_the_user_left_out() {
    let spec = validate(
        json!({
            "preset": "ieee_single_col",
            "font": {"size": 10},
            "panels": [{}]
        }),
        None,
    )
    .unwrap();
    assert_eq!(spec.size.width, 89.0);
    assert_eq!(spec.font.size, 10.0);
}

struct Marker(f64);

impl Layer for Marker {
    fn draw(&self, panel: &mut Panel, _table: &DataFrame) -> nicefigs::Result<()> {
        panel.add_artist(nicefigs::canvas::Artist::new(ArtistKind::HLine { y: self.0 }));
        Ok(())
    }
}

#[test]
fn registering_twice_keeps_the_last_constructor() {
    layer::register("marker_line", |_spec| Box::new(Marker(1.0)) as Box<dyn Layer>);
    layer::register("marker_line", |_spec| Box::new(Marker(2.0)) as Box<dyn Layer>);

    let spec = SeriesSpec::new(nicefigs::config::SeriesKind::Line);
    let renderer = layer::make("marker_line", &spec).unwrap();

    let figure = nicefigs::figure::make_grid(&Default::default(), 4.0, 3.0, 9.0);
    let mut panel = figure.panels[0].clone();
    renderer.draw(&mut panel, &DataFrame::empty()).unwrap();
    assert_eq!(panel.artists()[0].kind, ArtistKind::HLine { y: 2.0 });
    assert!(layer::registered().contains(&"marker_line".to_string()));
}

#[test]
fn unregistered_series_type_fails() {
    let spec = validate(
        json!({
            "size": {"width": 4, "height": 3},
            "panels": [{"series": [{"type": "heatmap", "x": "v"}]}]
        }),
        None,
    )
    .unwrap();
    let external = ExternalData::Single(DataSource::Frame(latency_table()));
    let err = nicefigs::figure::render_figure(&spec, Some(&external)).unwrap_err();
    assert!(matches!(err, NicefigsError::LayerNotFound(name) if name == "heatmap"));
}

fn write_project(formats: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("runs.csv"), "step,loss\n0,1.0\n1,0.6\n2,0.4\n3,0.3\n").unwrap();
    fs::write(
        dir.path().join("figure.yaml"),
        format!(
            "size: {{width: 3, height: 2}}\n\
             panels:\n\
             \x20 - axes: {{title: Loss, xlabel: step}}\n\
             \x20   series:\n\
             \x20     - {{type: line, x: step, y: loss, data: runs.csv, label: train}}\n\
             export: {{path: out/loss.png, dpi: 60, formats: {}}}\n",
            formats
        ),
    )
    .unwrap();
    dir
}

#[test]
fn render_writes_every_format_next_to_the_config() {
    let dir = write_project("[png, svg]");
    let written = nicefigs::render(dir.path().join("figure.yaml")).unwrap();

    assert_eq!(
        written,
        vec![dir.path().join("out/loss.png"), dir.path().join("out/loss.svg")]
    );
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn pdf_is_written_alongside_png() {
    let dir = write_project("[png, pdf]");
    let spec = load_config(ConfigSource::Path(dir.path().join("figure.yaml"))).unwrap();
    let written = render_spec(
        &spec,
        RenderOptions {
            export_base: ExportBase::Spec,
            external_data: None,
        },
    )
    .unwrap();

    assert_eq!(
        written,
        vec![dir.path().join("out/loss.png"), dir.path().join("out/loss.pdf")]
    );
    let pdf = fs::read(dir.path().join("out/loss.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}
