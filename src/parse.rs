//! Parse figure blocks into [`GeometryFigure`]s
//!
//! A block is first normalized (see [`normalize_block`]) and decoded as YAML.
//! When that fails the block is read as loose `key: value` lines, and when even
//! that finds nothing the whole text becomes the description of a generic
//! figure. Parsing never fails.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::errors::DecodeError;
use crate::schema::{
    Angle, Arc, ArcStyle, Circle, FigureType, GeometryFigure, Line, LineStyle, Point,
    Quadrilateral, Tangent, Triangle,
};

pub const DEFAULT_START_DELIMITER: &str = "[FIGURE]";
pub const DEFAULT_END_DELIMITER: &str = "[/FIGURE]";

/// Re-indent a block whose first line lost its indentation, then dedent it.
///
/// Figure blocks cut out of indented question text often look like
/// `type: x\n    description: y`. The first line is given the body's minimum
/// indent so that the common prefix can be stripped. Whitespace-only lines
/// become empty. A blank block normalizes to `""`.
pub fn normalize_block(block: &str) -> String {
    let mut lines: Vec<String> = block.split('\n').map(str::to_string).collect();

    let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };

    let first_indent = indent_of(&lines[first]);
    let min_body = lines[first + 1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min();

    match min_body {
        Some(body) if first_indent == 0 && body > 0 => {
            lines[first] = format!("{}{}", " ".repeat(body), lines[first]);
        }
        _ => {}
    }

    dedent(&lines)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn leading_ws(line: &str) -> &str {
    &line[..indent_of(line)]
}

fn dedent(lines: &[String]) -> String {
    let mut prefix: Option<&str> = None;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let ws = leading_ws(line);
        prefix = Some(match prefix {
            None => ws,
            Some(p) => common_prefix(p, ws),
        });
    }
    let prefix = prefix.unwrap_or("");

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                &l[prefix.len()..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, ca), cb)| ca == cb)
        .last()
        .map(|((i, c), _)| i + c.len_utf8())
        .unwrap_or(0);
    &a[..len]
}

/// Parser for figure blocks and for question text that embeds them
#[derive(Debug, Clone)]
pub struct FigureParser {
    start_delimiter: String,
    end_delimiter: String,
}

impl Default for FigureParser {
    fn default() -> Self {
        FigureParser::with_delimiters(DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER)
    }
}

impl FigureParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use other block markers. Matching stays ASCII case-insensitive.
    pub fn with_delimiters(start: impl Into<String>, end: impl Into<String>) -> Self {
        FigureParser {
            start_delimiter: start.into(),
            end_delimiter: end.into(),
        }
    }

    /// Parse one figure block (the text between the delimiters).
    pub fn parse(&self, block: &str) -> GeometryFigure {
        let normalized = normalize_block(block);
        match decode_structured(&normalized) {
            Ok(figure) => figure,
            Err(err) => {
                crate::log::debug!(error = %err, "structured decode failed, reading key/value lines");
                decode_simple(&normalized)
            }
        }
    }

    /// All delimited blocks in `text`, trimmed, in order.
    pub fn extract_figure_blocks(&self, text: &str) -> Vec<String> {
        let start = self.start_delimiter.to_ascii_lowercase();
        let end = self.end_delimiter.to_ascii_lowercase();
        if start.is_empty() || end.is_empty() {
            return Vec::new();
        }

        // ASCII lowercasing keeps byte offsets valid in the original text
        let haystack = text.to_ascii_lowercase();
        let mut blocks = Vec::new();
        let mut cursor = 0;
        while let Some(found) = haystack[cursor..].find(&start) {
            let body_start = cursor + found + start.len();
            let Some(len) = haystack[body_start..].find(&end) else {
                break;
            };
            blocks.push(text[body_start..body_start + len].trim().to_string());
            cursor = body_start + len + end.len();
        }
        blocks
    }

    /// Parse the first figure embedded in a question, if any.
    pub fn parse_from_question(&self, text: &str) -> Option<GeometryFigure> {
        self.extract_figure_blocks(text)
            .first()
            .map(|block| self.parse(block))
    }
}

// ============================================================================
// Structured decode
// ============================================================================

fn decode_structured(text: &str) -> Result<GeometryFigure, DecodeError> {
    let value: Value = serde_yaml::from_str(text)?;
    let Value::Mapping(map) = &value else {
        return Err(DecodeError::NotAMapping {
            found: value_kind(&value),
        });
    };

    let type_tag = get_string(map, "type").unwrap_or_else(|| "generic".to_string());
    let tag = match get_string(map, "subtype").filter(|s| !s.is_empty()) {
        Some(subtype) if subtype.contains('_') => subtype,
        Some(subtype) => format!("{type_tag}_{subtype}"),
        None => type_tag,
    };

    let mut figure = GeometryFigure::new(
        FigureType::from_tag(&tag),
        get_string(map, "description").unwrap_or_default(),
    );

    if let Some(elements) = map.get("elements").and_then(Value::as_sequence) {
        for element in elements {
            decode_element(element, &mut figure);
        }
    }

    figure.given_values = string_map(map.get("given_values"));
    figure
        .given_values
        .extend(string_map(map.get("given_angles")));
    figure.find_values = get_list(map, "find_values")
        .or_else(|| get_list(map, "find_angles"))
        .unwrap_or_default();
    figure.image_ref = get_string(map, "image_ref");
    figure.raw = Some(value.clone());

    Ok(figure)
}

const ELEMENT_KINDS: [&str; 8] = [
    "circle",
    "triangle",
    "quadrilateral",
    "tangent",
    "angle",
    "line",
    "point",
    "arc",
];

fn decode_element(element: &Value, figure: &mut GeometryFigure) {
    let Some(entry) = element.as_mapping() else {
        crate::log::debug!(?element, "skipping element that is not a mapping");
        return;
    };
    let Some((kind, body)) = ELEMENT_KINDS
        .iter()
        .find_map(|kind| entry.get(*kind).map(|body| (*kind, body)))
    else {
        crate::log::debug!(?entry, "skipping unknown element kind");
        return;
    };

    let empty = Mapping::new();
    let body = body.as_mapping().unwrap_or(&empty);

    match kind {
        "circle" => figure.circles.push(Circle {
            center: get_string(body, "center").unwrap_or_else(|| "O".into()),
            radius: get_f64(body, "radius"),
            radius_label: get_string(body, "radius_label"),
            points: get_list(body, "points").unwrap_or_default(),
        }),
        "triangle" => {
            let vertices = match get_list(body, "vertices").as_deref() {
                Some([a, b, c, ..]) => [a.clone(), b.clone(), c.clone()],
                _ => ["A", "B", "C"].map(String::from),
            };
            figure.triangles.push(Triangle {
                vertices,
                inscribed_in: get_string(body, "inscribed_in"),
                circumscribed_around: get_string(body, "circumscribed_around"),
                style: get_string(body, "style")
                    .map(|s| LineStyle::from_name(&s))
                    .unwrap_or_default(),
            });
        }
        "quadrilateral" => {
            let vertices = match get_list(body, "vertices").as_deref() {
                Some([a, b, c, d, ..]) => [a.clone(), b.clone(), c.clone(), d.clone()],
                _ => ["A", "B", "C", "D"].map(String::from),
            };
            figure.quadrilaterals.push(Quadrilateral {
                vertices,
                is_cyclic: get_bool(body, "cyclic").unwrap_or(false),
                inscribed_in: get_string(body, "inscribed_in"),
            });
        }
        "tangent" => figure.tangents.push(Tangent {
            circle_center: get_string(body, "circle").unwrap_or_else(|| "O".into()),
            point_of_tangency: get_string(body, "point").unwrap_or_else(|| "T".into()),
            external_point: get_string(body, "external_point"),
            label: get_string(body, "label"),
        }),
        "angle" => {
            let rays = get_list(body, "rays").unwrap_or_default();
            figure.angles.push(Angle {
                vertex: get_string(body, "vertex").unwrap_or_else(|| "A".into()),
                ray1_end: rays.first().cloned().unwrap_or_else(|| "B".into()),
                ray2_end: rays.get(1).cloned().unwrap_or_else(|| "C".into()),
                value: get_string(body, "value"),
                marked: get_bool(body, "marked").unwrap_or(false),
                arc_style: get_string(body, "arc_style")
                    .map(|s| ArcStyle::from_name(&s))
                    .unwrap_or_default(),
                is_major: get_bool(body, "major")
                    .or_else(|| get_bool(body, "is_major"))
                    .unwrap_or(false),
            });
        }
        "line" => {
            let points = get_list(body, "points").unwrap_or_default();
            figure.lines.push(Line {
                start: points.first().cloned().unwrap_or_else(|| "A".into()),
                end: points.get(1).cloned().unwrap_or_else(|| "B".into()),
                style: get_string(body, "style")
                    .map(|s| LineStyle::from_name(&s))
                    .unwrap_or_default(),
                label: get_string(body, "label"),
                is_ray: get_bool(body, "is_ray").unwrap_or(false),
                is_extended: get_bool(body, "extended").unwrap_or(false),
            });
        }
        "point" => figure.points.push(Point {
            label: get_string(body, "label").unwrap_or_else(|| "P".into()),
            x: get_f64(body, "x"),
            y: get_f64(body, "y"),
            on_circle: get_string(body, "on_circle"),
            description: get_string(body, "description"),
        }),
        "arc" => {
            let points = get_list(body, "points").unwrap_or_default();
            figure.arcs.push(Arc {
                circle_center: get_string(body, "circle").unwrap_or_else(|| "O".into()),
                start_point: points.first().cloned().unwrap_or_else(|| "A".into()),
                end_point: points.get(1).cloned().unwrap_or_else(|| "B".into()),
                label: get_string(body, "label"),
                is_major: get_bool(body, "major")
                    .or_else(|| get_bool(body, "is_major"))
                    .unwrap_or(false),
            });
        }
        _ => crate::log::debug!(kind, "element kind has no decoder"),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Scalars as text: `50` becomes `"50"`, `true` becomes `"true"`.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

fn get_string(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_string)
}

fn get_f64(map: &Mapping, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn get_bool(map: &Mapping, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A sequence of scalars, or a comma separated string.
fn get_list(map: &Mapping, key: &str) -> Option<Vec<String>> {
    match map.get(key)? {
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn string_map(value: Option<&Value>) -> IndexMap<String, String> {
    value
        .and_then(Value::as_mapping)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| Some((scalar_string(k)?, scalar_string(v)?)))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Fallback decode
// ============================================================================

fn decode_simple(text: &str) -> GeometryFigure {
    let mut pairs: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut current: Option<String> = None;

    for line in text.trim().lines() {
        let indented = line.starts_with([' ', '\t']);
        match line.split_once(':') {
            Some((key, value)) if !indented => {
                let key = key.trim().to_lowercase().replace(' ', "_");
                let value = value.trim();
                let entry = pairs.entry(key.clone()).or_default();
                entry.clear();
                if !value.is_empty() {
                    entry.push(value.to_string());
                }
                current = Some(key);
            }
            _ => {
                if let Some(values) = current.as_ref().and_then(|k| pairs.get_mut(k)) {
                    values.push(line.trim().to_string());
                }
            }
        }
    }

    if pairs.is_empty() {
        return GeometryFigure::new(FigureType::Generic, text.trim());
    }

    let pairs: IndexMap<String, String> = pairs
        .into_iter()
        .map(|(k, v)| (k, v.join("\n").trim().to_string()))
        .collect();

    let mut figure = GeometryFigure::new(
        pairs
            .get("type")
            .map(|t| FigureType::from_tag(t))
            .unwrap_or_default(),
        pairs.get("description").cloned().unwrap_or_default(),
    );
    figure.image_ref = pairs.get("image_ref").cloned().filter(|s| !s.is_empty());
    figure.raw = Some(Value::Mapping(
        pairs
            .into_iter()
            .map(|(k, v)| (Value::String(k), Value::String(v)))
            .collect(),
    ));
    figure
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_reindents_first_line() {
        let block = "type: circle_chord\n    description: chord AB\n    elements:\n      - circle: {center: O}";
        insta::assert_snapshot!(normalize_block(block), @r"
        type: circle_chord
        description: chord AB
        elements:
          - circle: {center: O}
        ");
    }

    #[test]
    fn normalize_is_idempotent() {
        for block in [
            "type: a\n    b: c\n      d: e",
            "\n\n   x: 1\n   y: 2\n",
            "a: 1\n\tb: 2",
            "",
            "   \n  \n",
        ] {
            let once = normalize_block(block);
            assert_eq!(normalize_block(&once), once, "block {block:?}");
        }
        assert_eq!(normalize_block("  \n \t\n"), "");
    }

    #[test]
    fn structured_decode_reads_elements() {
        let fig = FigureParser::new().parse(
            r#"
type: circle
subtype: tangent
description: PT is a tangent
elements:
  - circle: {center: O, radius: 3}
  - tangent: {circle: O, point: T, external_point: P}
  - angle: {vertex: T, rays: [O, P], value: 90, marked: true, arc_style: double}
  - line: {points: [O, P], style: dashed, extended: true}
  - point: {label: M, description: midpoint of OP}
  - arc: {circle: O, points: [A, B], major: true}
  - hexagon: {}
given_values: {OT: 3}
given_angles: {OTP: "90°"}
find_angles: [TOP]
"#,
        );
        assert_eq!(fig.figure_type, FigureType::CircleTangent);
        assert_eq!(fig.description, "PT is a tangent");
        assert_eq!(fig.circles[0].radius, Some(3.0));
        assert_eq!(fig.tangents[0].external_point.as_deref(), Some("P"));
        assert_eq!(fig.angles[0].value.as_deref(), Some("90"));
        assert_eq!(fig.angles[0].arc_style, ArcStyle::Double);
        assert!(fig.angles[0].marked);
        assert_eq!(fig.lines[0].style, LineStyle::Dashed);
        assert!(fig.lines[0].is_extended);
        assert_eq!(fig.points[0].description.as_deref(), Some("midpoint of OP"));
        assert!(fig.arcs[0].is_major);
        assert_eq!(fig.given_values.get("OT").map(String::as_str), Some("3"));
        assert_eq!(fig.given_values.get("OTP").map(String::as_str), Some("90°"));
        assert_eq!(fig.find_values, vec!["TOP".to_string()]);
        assert!(fig.raw.is_some());
    }

    #[test]
    fn subtype_with_underscore_is_the_whole_tag() {
        let fig = FigureParser::new().parse("type: x\nsubtype: cyclic_quadrilateral\ndescription: d");
        assert_eq!(fig.figure_type, FigureType::CyclicQuadrilateral);
    }

    #[test]
    fn lenient_element_defaults() {
        let fig = FigureParser::new().parse(
            "type: generic\ndescription: d\nelements:\n  - circle:\n  - triangle: {vertices: [X, Y]}\n  - angle: {rays: [Q]}\n  - point: {}\n",
        );
        assert_eq!(fig.circles[0].center, "O");
        assert_eq!(fig.triangles[0].vertices, ["A", "B", "C"].map(String::from));
        assert_eq!(fig.angles[0].vertex, "A");
        assert_eq!(fig.angles[0].ray1_end, "Q");
        assert_eq!(fig.angles[0].ray2_end, "C");
        assert_eq!(fig.points[0].label, "P");
    }

    #[test]
    fn fallback_reads_key_value_lines() {
        let fig = FigureParser::new().parse(
            "Type: circle_chord\nDescription: [chord AB\nand more\nImage Ref: img/q1.png\nNotes: x: y",
        );
        assert_eq!(fig.figure_type, FigureType::CircleChord);
        assert_eq!(fig.description, "[chord AB\nand more");
        assert_eq!(fig.image_ref.as_deref(), Some("img/q1.png"));
        let raw = fig.raw.unwrap();
        assert_eq!(raw.get("notes").and_then(Value::as_str), Some("x: y"));
    }

    #[test]
    fn degraded_figure_keeps_text() {
        let fig = FigureParser::new().parse("  Circle with centre O and chord AB  ");
        assert_eq!(fig.figure_type, FigureType::Generic);
        assert_eq!(fig.description, "Circle with centre O and chord AB");
        assert!(!fig.has_elements());
    }

    #[test]
    fn extracts_blocks_case_insensitively() {
        let parser = FigureParser::new();
        let text = "Q1. Find x.\n[figure]\n type: a \n[/Figure] then [FIGURE]b[/FIGURE] [FIGURE] open";
        assert_eq!(parser.extract_figure_blocks(text), vec!["type: a", "b"]);
    }

    #[test]
    fn custom_delimiters() {
        let parser = FigureParser::with_delimiters("<fig>", "</fig>");
        let fig = parser
            .parse_from_question("see <FIG>type: circle_chord\ndescription: c</FIG>")
            .unwrap();
        assert_eq!(fig.figure_type, FigureType::CircleChord);
        assert!(parser.parse_from_question("no figure here").is_none());
    }
}
