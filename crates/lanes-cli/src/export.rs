//! SVG export of a validated layout.

use std::{fs::File, io::Write};

use log::{debug, error, info};
use svg::{
    Document,
    node::element::{Group, Rectangle},
};

use lanes::{LaidOutGroup, TimelineGraph};

use crate::error::CliError;

/// Writes the visible groups of a graph as SVG rectangles.
pub struct SvgExporter {
    file_name: String,
}

impl SvgExporter {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    /// Renders the visible children of `graph` into a document the size of
    /// the viewport.
    pub fn render(&self, graph: &TimelineGraph) -> Result<Document, CliError> {
        let children = graph.visible_children()?;
        let width = graph.viewport().width();
        let height = graph.viewport().height();

        let background = Rectangle::new()
            .set("width", width)
            .set("height", height)
            .set("fill", "white");

        let mut lanes = Group::new().set("class", "lanes");
        for child in children.iter() {
            if let Some(rect) = self.render_group(child) {
                lanes = lanes.add(rect);
            }
        }
        debug!(groups = children.len(); "SVG document rendered");

        Ok(Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height)
            .add(background)
            .add(lanes))
    }

    fn render_group(&self, child: &LaidOutGroup) -> Option<Rectangle> {
        let bounds = child.bounds()?;
        let layer = child.group().layer();
        Some(
            Rectangle::new()
                .set("x", bounds.x())
                .set("y", bounds.y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("fill", layer_fill(layer))
                .set("fill-opacity", if child.group().height().is_some() { 0.85 } else { 0.3 })
                .set("stroke", "#333333")
                .set("stroke-width", 1)
                .set("data-layer", layer)
                .set("data-level", child.group().level())
                .set("data-group", child.key().to_string()),
        )
    }

    /// Writes `doc` to the exporter's file.
    pub fn write_document(&self, doc: &Document) -> Result<(), CliError> {
        info!(file_name = self.file_name; "Creating SVG file");
        let mut file = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(CliError::Io(err));
            }
        };

        if let Err(err) = write!(file, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(CliError::Io(err));
        }

        Ok(())
    }
}

/// Spreads layers around the hue circle.
fn layer_fill(layer: i32) -> String {
    let hue = (i64::from(layer) * 67).rem_euclid(360);
    format!("hsl({hue}, 55%, 60%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_fill_wraps() {
        assert_eq!(layer_fill(0), "hsl(0, 55%, 60%)");
        assert_eq!(layer_fill(-1), "hsl(293, 55%, 60%)");
        assert_eq!(layer_fill(6), layer_fill(6 + 360));
    }
}
