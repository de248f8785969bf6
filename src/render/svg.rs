//! SVG generation

use facet_svg::facet_xml::SerializeOptions;
use facet_svg::{Group, Rect, SVG_NS, Svg, SvgNode, facet_xml};

use crate::errors::ExportError;

use super::context::RenderContext;
use super::shapes::{Layer, Shape, ShapeEnum};

/// Assemble the document: a background rect, then one group per layer in
/// back-to-front order. Shapes keep their order within a layer.
pub fn build_document(ctx: &RenderContext, shapes: &[ShapeEnum]) -> Svg {
    let size = ctx.size_px;
    let mut children = vec![SvgNode::Rect(Rect {
        x: Some(0.0),
        y: Some(0.0),
        width: Some(size),
        height: Some(size),
        fill: Some(ctx.config.background_color.clone()),
        stroke: None,
    })];

    for layer in Layer::ALL {
        let nodes: Vec<SvgNode> = shapes
            .iter()
            .filter(|s| s.layer() == layer)
            .flat_map(|s| s.render_svg(ctx))
            .collect();
        if nodes.is_empty() {
            continue;
        }
        children.push(SvgNode::G(Group {
            id: Some(layer.name().to_string()),
            class: Some("layer".to_string()),
            transform: None,
            children: nodes,
        }));
    }

    let dim = fmt_num(size);
    Svg {
        xmlns: None,
        width: Some(dim.clone()),
        height: Some(dim.clone()),
        view_box: Some(format!("0 0 {dim} {dim}")),
        children,
    }
}

/// Serialize a document, making sure the root carries the SVG namespace.
pub fn serialize(svg: &Svg) -> Result<String, ExportError> {
    fn format_float(value: f64, writer: &mut dyn std::io::Write) -> Result<(), std::io::Error> {
        write!(writer, "{}", fmt_num(value))
    }

    let options = SerializeOptions {
        float_formatter: Some(format_float),
        ..Default::default()
    };
    let mut xml = facet_xml::to_string_with_options(svg, &options)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;

    if !xml.contains("xmlns=") {
        if let Some(at) = xml.find("<svg") {
            xml.insert_str(at + "<svg".len(), &format!(" xmlns=\"{SVG_NS}\""));
        }
    }
    Ok(xml)
}

/// Round to a thousandth of a pixel, plenty for any display.
pub(crate) fn round_px(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    // avoid "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Shortest decimal form of a rounded pixel value.
pub(crate) fn fmt_num(value: f64) -> String {
    format!("{}", round_px(value))
}
