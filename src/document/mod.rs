//! Saving and loading canvas documents.
//!
//! A document is a [`literal`] table with a `version` field:
//!
//! - **Version 1** holds one flat grid (`width`, `height`, `grid`). Loading it
//!   yields a single "Background" drawn layer.
//! - **Version 2** holds the whole [`LayerState`]: every layer with its `id`,
//!   `name`, `type`, `visible`, `parentId` and kind-specific fields, plus
//!   `activeLayerId`.
//!
//! A grid is an array of rows; a row is an array of cells; a cell is
//! `{char, fg, bg}` with colors as `{r, g, b}`. The two transparency markers
//! are written as `{-1, -1, -1}` (unpainted half) and `{-2, -2, -2}`
//! (transparent text background).
//!
//! # Examples
//!
//! ```
//! use ansicanvas::document;
//! use ansicanvas::layer::LayerTree;
//!
//! let mut tree = LayerTree::new();
//! tree.add();
//! let text = document::to_string(tree.state());
//! let loaded = document::from_str(&text).unwrap();
//! assert_eq!(&loaded, tree.state());
//!
//! let err = document::from_str(r#"{ ["version"] = 9 }"#).unwrap_err();
//! assert_eq!(err.to_string(), "unsupported version 9");
//! ```

pub mod literal;

use self::literal::{Table, Value};
use crate::cell::Cell;
use crate::color::{Color, Rgb};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::grid::{COLS, Grid, ROWS};
use crate::layer::{
    Animation, DEFAULT_FRAME_DURATION_MS, Layer, LayerId, LayerKind, LayerState, TextAlign,
    TextBounds, TextLayer,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Version written by [`to_string`].
pub const CURRENT_VERSION: i64 = 2;

const BACKGROUND_NAME: &str = "Background";

/// Serialize a layer state as a version 2 document.
#[must_use]
pub fn to_string(state: &LayerState) -> String {
    let layers = state.layers().iter().map(|l| encode_layer(l).into()).collect();
    let doc = Table::new()
        .with("version", CURRENT_VERSION)
        .with("activeLayerId", state.active_layer_id().as_str())
        .with("layers", Table::array(layers));
    literal::write(&Value::Table(doc))
}

/// Serialize a single flat grid as a version 1 document.
#[must_use]
pub fn grid_to_string(grid: &Grid) -> String {
    let doc = Table::new()
        .with("version", 1i64)
        .with("width", COLS)
        .with("height", ROWS)
        .with("grid", encode_grid(grid));
    literal::write(&Value::Table(doc))
}

/// Parse a version 1 or version 2 document.
pub fn from_str(input: &str) -> Result<LayerState> {
    let value = literal::parse(input)?;
    let doc = value
        .as_table()
        .ok_or_else(|| Error::invalid("document", format!("expected a table, found {}", value.type_name())))?;

    let version = doc.get("version").ok_or(Error::MissingField("version"))?;
    let version = version
        .as_i64()
        .ok_or_else(|| Error::invalid("version", "expected an integer"))?;
    match version {
        1 => decode_v1(doc),
        2 => decode_v2(doc),
        other => Err(Error::UnsupportedVersion(other)),
    }
}

/// Write a document file.
pub fn save_to_path(path: impl AsRef<Path>, state: &LayerState) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_string(state))?;
    emit_log(
        LogLevel::Info,
        &format!(
            "saved {} layers to {}",
            state.layers().len(),
            path.display()
        ),
    );
    Ok(())
}

/// Read a document file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<LayerState> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let state = from_str(&text)?;
    emit_log(
        LogLevel::Info,
        &format!(
            "loaded {} layers from {}",
            state.layers().len(),
            path.display()
        ),
    );
    Ok(state)
}

// ============================================================================
// Encoding
// ============================================================================

fn encode_layer(layer: &Layer) -> Table {
    let mut table = Table::new()
        .with("id", layer.id.as_str())
        .with("name", layer.name.as_str())
        .with("visible", layer.visible);
    if let Some(parent) = &layer.parent_id {
        table.insert("parentId", parent.as_str());
    }
    match &layer.kind {
        LayerKind::Drawn(animation) => {
            let frames = animation.frames().iter().map(|g| encode_grid(g).into()).collect();
            table.insert("type", "drawn");
            table.insert("frames", Table::array(frames));
            table.insert("currentFrame", animation.current_index());
            table.insert("frameDuration", i64::from(animation.duration_ms()));
        }
        LayerKind::Text(text) => {
            let bounds = text.bounds();
            let overrides = text
                .char_colors()
                .iter()
                .map(|(&index, &color)| {
                    Table::array(vec![index.into(), encode_color(Color::Rgb(color)).into()]).into()
                })
                .collect();
            table.insert("type", "text");
            table.insert("text", text.text());
            let (r0, c0, r1, c1) = bounds.corners();
            table.insert(
                "bounds",
                Table::array(vec![r0.into(), c0.into(), r1.into(), c1.into()]),
            );
            table.insert("fg", encode_color(Color::Rgb(text.fg())));
            table.insert("align", text.align().as_str());
            table.insert("charColors", Table::array(overrides));
        }
        LayerKind::Group { collapsed } => {
            table.insert("type", "group");
            table.insert("collapsed", *collapsed);
        }
    }
    table
}

fn encode_grid(grid: &Grid) -> Table {
    Table::array(
        grid.rows()
            .map(|row| Table::array(row.iter().map(|c| encode_cell(c).into()).collect()).into())
            .collect(),
    )
}

fn encode_cell(cell: &Cell) -> Table {
    Table::array(vec![
        Value::Str(cell.ch.to_string()),
        encode_color(cell.fg).into(),
        encode_color(cell.bg).into(),
    ])
}

fn encode_color(color: Color) -> Table {
    let (r, g, b) = match color {
        Color::Rgb(rgb) => (i64::from(rgb.r), i64::from(rgb.g), i64::from(rgb.b)),
        Color::Unpainted => (-1, -1, -1),
        Color::Transparent => (-2, -2, -2),
    };
    Table::array(vec![r.into(), g.into(), b.into()])
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_v1(doc: &Table) -> Result<LayerState> {
    let grid = decode_grid(doc.get("grid"), "grid")?;
    let id = LayerId::new("layer-1");
    let layer = Layer::drawn(id.clone(), BACKGROUND_NAME, Animation::with_grid(grid));
    LayerState::from_parts(vec![layer], id).map_err(|reason| Error::invalid("layers", reason))
}

fn decode_v2(doc: &Table) -> Result<LayerState> {
    let layers = doc.get("layers").ok_or(Error::MissingField("layers"))?;
    let layers = layers
        .as_table()
        .ok_or_else(|| Error::invalid("layers", "expected an array"))?;
    let layers = layers
        .array
        .iter()
        .enumerate()
        .map(|(idx, value)| decode_layer(idx, value))
        .collect::<Result<Vec<_>>>()?;

    let active = match doc.get("activeLayerId") {
        Some(value) => LayerId::new(
            value
                .as_str()
                .ok_or_else(|| Error::invalid("activeLayerId", "expected a string"))?,
        ),
        None => layers
            .iter()
            .rev()
            .find(|layer| layer.is_drawable())
            .map(|layer| layer.id.clone())
            .ok_or_else(|| Error::invalid("layers", "no drawable layer"))?,
    };
    LayerState::from_parts(layers, active).map_err(|reason| Error::invalid("layers", reason))
}

fn decode_layer(idx: usize, value: &Value) -> Result<Layer> {
    let field = |name: &str| format!("layers[{}].{name}", idx + 1);
    let table = value
        .as_table()
        .ok_or_else(|| Error::invalid(format!("layers[{}]", idx + 1), "expected a table"))?;

    let id = required_str(table, "id", &field("id"))?;
    let name = optional_str(table, "name", &field("name"))?.unwrap_or(id);
    let visible = match table.get("visible") {
        Some(v) => v
            .as_bool()
            .ok_or_else(|| Error::invalid(field("visible"), "expected a boolean"))?,
        None => true,
    };
    let parent_id = optional_str(table, "parentId", &field("parentId"))?.map(LayerId::new);
    let kind = optional_str(table, "type", &field("type"))?.unwrap_or("drawn");

    let kind = match kind {
        "drawn" => LayerKind::Drawn(decode_animation(table, &field)?),
        "text" => LayerKind::Text(decode_text(table, &field)?),
        "group" => LayerKind::Group {
            collapsed: table.get("collapsed").and_then(Value::as_bool).unwrap_or(false),
        },
        other => return Err(Error::invalid(field("type"), format!("unknown layer type '{other}'"))),
    };

    Ok(Layer {
        id: LayerId::new(id),
        name: name.to_string(),
        visible,
        parent_id,
        kind,
    })
}

fn decode_animation(table: &Table, field: &dyn Fn(&str) -> String) -> Result<Animation> {
    // Single-frame layers may carry a plain `grid` instead of `frames`.
    let frames = match table.get("frames") {
        Some(frames) => frames
            .as_table()
            .ok_or_else(|| Error::invalid(field("frames"), "expected an array"))?
            .array
            .iter()
            .map(|frame| decode_grid(Some(frame), &field("frames")))
            .collect::<Result<Vec<_>>>()?,
        None => vec![decode_grid(table.get("grid"), "grid")?],
    };
    let current = optional_index(table, "currentFrame", &field("currentFrame"))?.unwrap_or(0);
    let duration = optional_index(table, "frameDuration", &field("frameDuration"))?
        .map_or(DEFAULT_FRAME_DURATION_MS, |d| u32::try_from(d).unwrap_or(u32::MAX));
    Animation::from_parts(frames, current, duration)
        .ok_or_else(|| Error::invalid(field("frames"), "a layer needs at least one frame"))
}

fn decode_text(table: &Table, field: &dyn Fn(&str) -> String) -> Result<TextLayer> {
    let text = optional_str(table, "text", &field("text"))?.unwrap_or("");
    let bounds = table
        .get("bounds")
        .and_then(Value::as_table)
        .ok_or_else(|| Error::invalid(field("bounds"), "expected {r0, c0, r1, c1}"))?;
    let corners = bounds
        .array
        .iter()
        .map(|v| as_index(v, &field("bounds")))
        .collect::<Result<Vec<_>>>()?;
    let [r0, c0, r1, c1] = corners[..] else {
        return Err(Error::invalid(field("bounds"), "expected four numbers"));
    };
    let fg = match table.get("fg") {
        Some(v) => decode_color(v, &field("fg"))?
            .rgb()
            .ok_or_else(|| Error::invalid(field("fg"), "text color cannot be a marker"))?,
        None => Rgb::WHITE,
    };
    let align = match optional_str(table, "align", &field("align"))? {
        Some(s) => TextAlign::parse(s)
            .ok_or_else(|| Error::invalid(field("align"), format!("unknown alignment '{s}'")))?,
        None => TextAlign::Left,
    };

    let mut char_colors = BTreeMap::new();
    if let Some(overrides) = table.get("charColors").and_then(Value::as_table) {
        for entry in &overrides.array {
            let pair = entry.as_table().map(|t| t.array.as_slice()).unwrap_or_default();
            let [index, color] = pair else {
                return Err(Error::invalid(field("charColors"), "expected {index, color} pairs"));
            };
            let index = as_index(index, &field("charColors"))?;
            if let Some(rgb) = decode_color(color, &field("charColors"))?.rgb() {
                char_colors.insert(index, rgb);
            }
        }
    }

    Ok(TextLayer::from_parts(
        text,
        TextBounds::new(r0, c0, r1, c1),
        fg,
        char_colors,
        align,
    ))
}

/// Decode a grid; short rows and missing rows stay blank, extra ones are
/// ignored.
fn decode_grid(value: Option<&Value>, field: &str) -> Result<Grid> {
    let Some(value) = value else {
        return Err(Error::MissingField("grid"));
    };
    let rows = value
        .as_table()
        .ok_or_else(|| Error::invalid(field, format!("expected an array, found {}", value.type_name())))?;

    let mut grid = Grid::new();
    for (row, cells) in rows.array.iter().take(ROWS).enumerate() {
        let cells = cells
            .as_table()
            .ok_or_else(|| Error::invalid(field, format!("row {} is not an array", row + 1)))?;
        for (col, cell) in cells.array.iter().take(COLS).enumerate() {
            grid.set(row, col, decode_cell(cell, field)?);
        }
    }
    Ok(grid)
}

fn decode_cell(value: &Value, field: &str) -> Result<Cell> {
    let parts = value.as_table().map(|t| t.array.as_slice()).unwrap_or_default();
    let [ch, fg, bg] = parts else {
        return Err(Error::invalid(field, "expected {char, fg, bg} cells"));
    };
    let ch = ch
        .as_str()
        .ok_or_else(|| Error::invalid(field, "cell character must be a string"))?
        .chars()
        .next()
        .unwrap_or(' ');
    Ok(Cell {
        ch,
        fg: decode_color(fg, field)?,
        bg: decode_color(bg, field)?,
    })
}

fn decode_color(value: &Value, field: &str) -> Result<Color> {
    let parts: Vec<i64> = value
        .as_table()
        .map(|t| t.array.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    match parts[..] {
        [-1, -1, -1] => Ok(Color::Unpainted),
        [-2, -2, -2] => Ok(Color::Transparent),
        [r, g, b] => {
            let channel = |c: i64| {
                u8::try_from(c).map_err(|_| Error::invalid(field, format!("color channel {c} out of range")))
            };
            Ok(Color::Rgb(Rgb::new(channel(r)?, channel(g)?, channel(b)?)))
        }
        _ => Err(Error::invalid(field, "expected a color {r, g, b}")),
    }
}

fn required_str<'a>(table: &'a Table, key: &str, field: &str) -> Result<&'a str> {
    optional_str(table, key, field)?.ok_or_else(|| Error::invalid(field, "missing"))
}

fn optional_str<'a>(table: &'a Table, key: &str, field: &str) -> Result<Option<&'a str>> {
    table
        .get(key)
        .map(|v| {
            v.as_str()
                .ok_or_else(|| Error::invalid(field, format!("expected a string, found {}", v.type_name())))
        })
        .transpose()
}

fn optional_index(table: &Table, key: &str, field: &str) -> Result<Option<usize>> {
    table.get(key).map(|v| as_index(v, field)).transpose()
}

fn as_index(value: &Value, field: &str) -> Result<usize> {
    value
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::invalid(field, "expected a non-negative integer"))
}
