//! Series layers and the process-wide layer registry
//!
//! A layer is the renderer bound to one [`SeriesSpec`]. Layers are looked up by
//! series type name, so a plugin can add new types or shadow a built-in one:
//!
//! ```rust,ignore
//! use nicefigs::layer::{self, Layer};
//!
//! layer::register("line", |spec| Box::new(MyLine::new(spec.clone())));
//! let renderer = layer::make("line", &spec)?;
//! renderer.draw(&mut panel, &table)?;
//! ```
//!
//! Registration is last-write-wins and there is no unregistration.

mod bar;
mod cdf;
mod histogram;
mod line;
mod scatter;

pub use bar::BarLayer;
pub use cdf::CdfLayer;
pub use histogram::HistogramLayer;
pub use line::LineLayer;
pub use scatter::ScatterLayer;

use crate::canvas::{ArtistStyle, Panel};
use crate::config::SeriesSpec;
use crate::style::normalize_linestyle;
use crate::{DataFrame, NicefigsError, Result};
use polars::prelude::DataType;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Renderer for one series
pub trait Layer: Send {
    /// Draw the series from `table` onto `panel`
    fn draw(&self, panel: &mut Panel, table: &DataFrame) -> Result<()>;
}

/// Constructor stored in the registry
pub type LayerConstructor = Arc<dyn Fn(&SeriesSpec) -> Box<dyn Layer> + Send + Sync>;

static REGISTRY: LazyLock<RwLock<HashMap<String, LayerConstructor>>> =
    LazyLock::new(|| RwLock::new(builtin_layers()));

fn constructor<L: Layer + 'static>(build: fn(SeriesSpec) -> L) -> LayerConstructor {
    Arc::new(move |spec: &SeriesSpec| Box::new(build(spec.clone())) as Box<dyn Layer>)
}

fn builtin_layers() -> HashMap<String, LayerConstructor> {
    let mut layers = HashMap::new();
    layers.insert("line".to_string(), constructor(LineLayer::new));
    layers.insert("scatter".to_string(), constructor(ScatterLayer::new));
    layers.insert("bar".to_string(), constructor(BarLayer::new));
    layers.insert("hist".to_string(), constructor(HistogramLayer::new));
    layers.insert("cdf".to_string(), constructor(CdfLayer::new));
    // ecdf is the same estimator
    layers.insert("ecdf".to_string(), constructor(CdfLayer::new));
    layers
}

/// Associate `name` with a layer constructor, replacing any previous one
pub fn register<F>(name: &str, constructor: F)
where
    F: Fn(&SeriesSpec) -> Box<dyn Layer> + Send + Sync + 'static,
{
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if registry.insert(name.to_string(), Arc::new(constructor)).is_some() {
        tracing::debug!(layer = name, "Replaced registered layer");
    }
}

/// Construct the renderer registered under `name`, bound to `spec`
pub fn make(name: &str, spec: &SeriesSpec) -> Result<Box<dyn Layer>> {
    let constructor = {
        let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        registry.get(name).cloned()
    };
    match constructor {
        Some(constructor) => Ok(constructor(spec)),
        None => Err(NicefigsError::LayerNotFound(name.to_string())),
    }
}

/// Registered layer names, sorted
pub fn registered() -> Vec<String> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let mut names: Vec<String> = registry.keys().cloned().collect();
    names.sort();
    names
}

// =============================================================================
// Helpers shared by the built-in layers
// =============================================================================

/// The column name a layer needs, or a validation error naming the field
pub(crate) fn required_column<'a>(spec: &'a SeriesSpec, field: &str) -> Result<&'a str> {
    let column = match field {
        "x" => spec.x.as_deref(),
        _ => spec.y.as_deref(),
    };
    column.ok_or_else(|| {
        NicefigsError::validation(field, format!("required by '{}' series", spec.kind))
    })
}

fn column_not_found(table: &DataFrame, column: &str) -> NicefigsError {
    let available = table
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    NicefigsError::ColumnNotFound {
        column: column.to_string(),
        available,
    }
}

/// A column as floats; nulls become NaN
pub fn column_values(table: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let col = table
        .column(column)
        .map_err(|_| column_not_found(table, column))?;
    let series = col
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| NicefigsError::Data(format!("column '{}': {}", column, e)))?;
    let values = series
        .f64()
        .map_err(|e| NicefigsError::Data(format!("column '{}': {}", column, e)))?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// A string column's values, or `None` for non-string columns
pub fn column_strings(table: &DataFrame, column: &str) -> Result<Option<Vec<String>>> {
    let col = table
        .column(column)
        .map_err(|_| column_not_found(table, column))?;
    if col.dtype() != &DataType::String {
        return Ok(None);
    }
    let values = col
        .as_materialized_series()
        .str()
        .map_err(|e| NicefigsError::Data(format!("column '{}': {}", column, e)))?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(Some(values))
}

/// Stroke style of a series
pub(crate) fn series_style(spec: &SeriesSpec) -> ArtistStyle {
    ArtistStyle {
        color: Some(spec.style.color.clone()),
        linewidth: Some(spec.style.width),
        linestyle: Some(normalize_linestyle(&spec.style.style)),
        marker: spec.style.marker.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{ArtistKind, Bbox};
    use crate::config::SeriesKind;
    use polars::prelude::*;

    struct Nothing;

    impl Layer for Nothing {
        fn draw(&self, _panel: &mut Panel, _table: &DataFrame) -> Result<()> {
            Ok(())
        }
    }

    fn panel() -> Panel {
        Panel::new(
            0,
            0,
            0,
            Bbox {
                left: 0.1,
                bottom: 0.1,
                width: 0.8,
                height: 0.8,
            },
            (4.0, 3.0),
        )
    }

    #[test]
    fn test_builtins_registered() {
        let names = registered();
        for name in ["line", "scatter", "bar", "hist", "cdf", "ecdf"] {
            assert!(names.contains(&name.to_string()), "missing {}", name);
        }
        assert!(!names.contains(&"heatmap".to_string()));
    }

    #[test]
    fn test_unknown_layer() {
        let spec = SeriesSpec::new(SeriesKind::Heatmap);
        match make("heatmap", &spec) {
            Err(NicefigsError::LayerNotFound(name)) => assert_eq!(name, "heatmap"),
            _ => panic!("expected LayerNotFound"),
        }
    }

    #[test]
    fn test_register_overwrites() {
        register("unit_test_layer", |spec| Box::new(LineLayer::new(spec.clone())));
        register("unit_test_layer", |_| Box::new(Nothing));

        let mut spec = SeriesSpec::new(SeriesKind::Line);
        spec.x = Some("x".to_string());
        spec.y = Some("y".to_string());
        let df = df! { "x" => [1.0, 2.0], "y" => [3.0, 4.0] }.unwrap();

        let mut p = panel();
        make("unit_test_layer", &spec).unwrap().draw(&mut p, &df).unwrap();
        assert!(p.artists().is_empty());
    }

    #[test]
    fn test_missing_column() {
        let mut spec = SeriesSpec::new(SeriesKind::Line);
        spec.x = Some("missing".to_string());
        spec.y = Some("y".to_string());
        let df = df! { "x" => [1.0], "y" => [2.0] }.unwrap();

        let err = make("line", &spec).unwrap().draw(&mut panel(), &df).unwrap_err();
        match err {
            NicefigsError::ColumnNotFound { column, available } => {
                assert_eq!(column, "missing");
                assert_eq!(available, "x, y");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_column_values_casts_integers() {
        let df = df! { "n" => [1i64, 2, 3] }.unwrap();
        assert_eq!(column_values(&df, "n").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(column_strings(&df, "n").unwrap(), None);
    }

    #[test]
    fn test_line_draw() {
        let mut spec = SeriesSpec::new(SeriesKind::Line);
        spec.x = Some("x".to_string());
        spec.y = Some("y".to_string());
        spec.style.style = "--".to_string();
        spec.label = crate::config::TextLike::Literal("run".to_string());
        let df = df! { "x" => [0.0, 1.0], "y" => [2.0, 3.0] }.unwrap();

        let mut p = panel();
        make("line", &spec).unwrap().draw(&mut p, &df).unwrap();
        let artist = &p.artists()[0];
        assert_eq!(
            artist.kind,
            ArtistKind::Line {
                xs: vec![0.0, 1.0],
                ys: vec![2.0, 3.0]
            }
        );
        assert_eq!(artist.style.linestyle.as_deref(), Some("--"));
        assert_eq!(artist.label.as_deref(), Some("run"));
    }
}
