//! Automatic point layout
//!
//! Figures rarely give coordinates for every point. The engine seeds the
//! explicit ones and then runs a bounded fixed-point iteration: each pass
//! places circle centers, points on circles, polygon vertices, tangent points
//! and described points, in that order, using whatever earlier rules (or
//! earlier passes) have placed. Whatever is left goes on a fallback grid, so
//! every label of the figure ends up with a coordinate.

pub mod description;
pub mod geometry;

use std::collections::{HashMap, HashSet};

use glam::{DVec2, dvec2};
use indexmap::IndexMap;

use crate::config::LayoutConfig;
use crate::schema::{Circle, GeometryFigure};
use crate::types::{BBox, UnitVec};
use description::Relation;
use geometry::{line_intersection, point_along, point_on_circle, project_onto_line};

/// Resolved coordinates by label, in placement order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Positions(IndexMap<String, DVec2>);

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<DVec2> {
        self.0.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    /// Set a position, replacing any earlier one.
    pub fn insert(&mut self, label: impl Into<String>, pos: DVec2) -> Option<DVec2> {
        self.0.insert(label.into(), pos)
    }

    /// Set a position only if the label has none yet. Returns whether it was placed.
    fn place(&mut self, label: &str, pos: DVec2) -> bool {
        if self.0.contains_key(label) {
            return false;
        }
        self.0.insert(label.to_string(), pos);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DVec2)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Positions of all `labels`, or `None` if any is missing.
    pub fn all(&self, labels: &[&str]) -> Option<Vec<DVec2>> {
        labels.iter().map(|l| self.get(l)).collect()
    }

    /// The labels among `labels` that have no position
    pub fn missing<'l>(&self, labels: &[&'l str]) -> Vec<&'l str> {
        labels
            .iter()
            .copied()
            .filter(|l| !self.contains(l))
            .collect()
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.0.values())
    }

    /// Mean of all positions
    pub fn centroid(&self) -> Option<DVec2> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.values().sum::<DVec2>() / self.0.len() as f64)
    }
}

impl<S: Into<String>> FromIterator<(S, DVec2)> for Positions {
    fn from_iter<I: IntoIterator<Item = (S, DVec2)>>(iter: I) -> Self {
        Positions(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Computes a coordinate for every label a figure references
#[derive(Debug, Clone, Default)]
pub struct PointLayoutEngine {
    config: LayoutConfig,
}

impl PointLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        PointLayoutEngine { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Resolve positions for every label in `figure.all_point_labels()`.
    ///
    /// Never fails; labels no rule can place land on the fallback grid. The
    /// result is deterministic for a given figure and configuration.
    pub fn resolve(&self, figure: &GeometryFigure) -> Positions {
        let mut solver = Solver::new(&self.config, figure);
        solver.seed_explicit();

        for pass in 0..self.config.max_passes {
            let before = solver.positions.len();
            solver.place_circle_centers();
            solver.place_circle_points();
            solver.place_polygons();
            solver.place_tangents();
            solver.place_described();
            let placed = solver.positions.len() - before;
            crate::log::debug!(pass, placed, "layout pass");
            if placed == 0 {
                break;
            }
        }

        solver.place_described();
        solver.place_on_grid();
        solver.positions
    }
}

struct Solver<'a> {
    config: &'a LayoutConfig,
    figure: &'a GeometryFigure,
    positions: Positions,
    /// Described points without explicit coordinates (first definition of each label)
    relations: Vec<(&'a str, Relation)>,
    /// Ratios for on-segment points that did not state one, measured from the
    /// start of the segment as the point's description writes it
    inferred_ratios: HashMap<&'a str, f64>,
}

impl<'a> Solver<'a> {
    fn new(config: &'a LayoutConfig, figure: &'a GeometryFigure) -> Self {
        let mut seen = HashSet::new();
        let relations: Vec<(&'a str, Relation)> = figure
            .points
            .iter()
            .filter(|p| seen.insert(p.label.as_str()))
            .filter(|p| p.coords().is_none())
            .filter_map(|p| {
                let text = p.description.as_deref()?;
                let relation = Relation::parse(text);
                if relation.is_none() {
                    crate::log::debug!(label = %p.label, text, "description names no known relation");
                }
                Some((p.label.as_str(), relation?))
            })
            .collect();

        let inferred_ratios = infer_segment_ratios(config, &relations);

        Solver {
            config,
            figure,
            positions: Positions::new(),
            relations,
            inferred_ratios,
        }
    }

    fn radius(&self, circle: Option<&Circle>) -> f64 {
        circle
            .and_then(|c| c.radius)
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(self.config.default_radius)
    }

    fn seed_explicit(&mut self) {
        for point in &self.figure.points {
            if let Some((x, y)) = point.coords().filter(|(x, y)| x.is_finite() && y.is_finite()) {
                self.positions.place(&point.label, dvec2(x, y));
            }
        }
    }

    fn place_circle_centers(&mut self) {
        for (i, circle) in self.figure.circles.iter().enumerate() {
            let center = dvec2(i as f64 * self.config.circle_spacing, 0.0);
            self.positions.place(&circle.center, center);
        }
    }

    /// Spread unplaced circumference points clockwise from the top.
    fn place_circle_points(&mut self) {
        let figure = self.figure;
        for circle in &figure.circles {
            let Some(center) = self.positions.get(&circle.center) else {
                continue;
            };
            let radius = self.radius(Some(circle));

            let declared_on = figure
                .points
                .iter()
                .filter(|p| p.on_circle.as_deref() == Some(circle.center.as_str()))
                .map(|p| p.label.as_str());
            let mut pending: Vec<&str> = Vec::new();
            for label in circle.points.iter().map(String::as_str).chain(declared_on) {
                if !self.positions.contains(label) && !pending.contains(&label) {
                    pending.push(label);
                }
            }

            let step = 360.0 / pending.len().max(1) as f64;
            for (i, label) in pending.into_iter().enumerate() {
                let degrees = 90.0 - i as f64 * step;
                self.positions
                    .place(label, point_on_circle(center, radius, degrees));
            }
        }
    }

    fn place_polygons(&mut self) {
        let (figure, config) = (self.figure, self.config);
        for tri in &figure.triangles {
            self.place_polygon(
                &tri.vertices,
                tri.inscribed_in.as_deref(),
                &config.triangle_angles,
                &config.default_triangle,
            );
        }
        for quad in &figure.quadrilaterals {
            let support = quad.inscribed_in.as_deref().or_else(|| {
                quad.is_cyclic
                    .then(|| figure.circles.first().map(|c| c.center.as_str()))
                    .flatten()
            });
            self.place_polygon(
                &quad.vertices,
                support,
                &config.quadrilateral_angles,
                &config.default_quadrilateral,
            );
        }
    }

    /// Vertices go on the supporting circle when its center is known,
    /// otherwise onto the default shape.
    fn place_polygon(
        &mut self,
        vertices: &[String],
        support: Option<&str>,
        angles: &[f64],
        default_shape: &[[f64; 2]],
    ) {
        let on_circle = support.and_then(|center| {
            let pos = self.positions.get(center)?;
            Some((pos, self.radius(self.figure.circle(center))))
        });

        for ((vertex, &degrees), &[x, y]) in vertices.iter().zip(angles).zip(default_shape) {
            let pos = match on_circle {
                Some((center, radius)) => point_on_circle(center, radius, degrees),
                None => dvec2(x, y),
            };
            self.positions.place(vertex, pos);
        }
    }

    fn place_tangents(&mut self) {
        let figure = self.figure;
        for tangent in &figure.tangents {
            let Some(center) = self.positions.get(&tangent.circle_center) else {
                continue;
            };
            let radius = self.radius(figure.circle(&tangent.circle_center));
            self.positions
                .place(&tangent.point_of_tangency, center + dvec2(radius, 0.0));

            let Some(external) = tangent.external_point.as_deref() else {
                continue;
            };
            if self.positions.contains(external) {
                continue;
            }
            let Some(tangency) = self.positions.get(&tangent.point_of_tangency) else {
                continue;
            };
            match UnitVec::normalized(tangency - center) {
                Some(radial) => {
                    let pos = tangency + radial.perp() * self.config.tangent_length;
                    self.positions.place(external, pos);
                }
                None => {
                    crate::log::debug!(
                        external,
                        tangency = %tangent.point_of_tangency,
                        "tangency point coincides with the center; external point left unplaced"
                    );
                }
            }
        }
    }

    /// Evaluate every relation whose referents are all placed.
    fn place_described(&mut self) {
        let tolerance = self.config.tolerance;
        for (label, relation) in &self.relations {
            if self.positions.contains(label) {
                continue;
            }
            let Some(refs) = self.positions.all(&relation.referents()) else {
                crate::log::debug!(label, "relation deferred until its referents are placed");
                continue;
            };

            let pos = match relation {
                Relation::Intersection { .. } => {
                    line_intersection(refs[0], refs[1], refs[2], refs[3], tolerance)
                }
                Relation::Projection { .. } => {
                    Some(project_onto_line(refs[0], refs[1], refs[2], tolerance))
                }
                Relation::OnSegment { ratio, .. } => {
                    let t = ratio
                        .or_else(|| self.inferred_ratios.get(label).copied())
                        .unwrap_or(self.config.on_segment_ratio);
                    Some(point_along(refs[0], refs[1], t))
                }
                Relation::Midpoint { .. } => Some(point_along(refs[0], refs[1], 0.5)),
            };

            match pos {
                Some(pos) => {
                    self.positions.place(label, pos);
                }
                None => crate::log::debug!(label, ?relation, "relation has no solution"),
            }
        }
    }

    /// Put every still-unplaced label on the next free grid cell.
    fn place_on_grid(&mut self) {
        let mut cell = 0;
        for label in self.figure.all_point_labels() {
            if self.positions.contains(&label) {
                continue;
            }
            let pos = loop {
                let candidate = self.config.grid_cell(cell);
                cell += 1;
                if !self.is_occupied(candidate) {
                    break candidate;
                }
            };
            crate::log::warn!(label = %label, x = pos.x, y = pos.y, "no rule placed point; using fallback grid");
            self.positions.insert(label, pos);
        }
    }

    fn is_occupied(&self, candidate: DVec2) -> bool {
        self.positions
            .iter()
            .any(|(_, p)| p.distance(candidate) < self.config.tolerance)
    }
}

/// Alphabetic-order ratios for points placed "on" a segment without a stated ratio.
///
/// Points sharing an unordered segment are sorted by label: two of them take
/// the configured pair ratios, three or more split the segment evenly, and a
/// lone point keeps the default on-segment ratio.
fn infer_segment_ratios<'a>(
    config: &LayoutConfig,
    relations: &[(&'a str, Relation)],
) -> HashMap<&'a str, f64> {
    let mut groups: IndexMap<(&str, &str), Vec<(&'a str, bool)>> = IndexMap::new();
    for (label, relation) in relations {
        if let Relation::OnSegment {
            segment,
            ratio: None,
        } = relation
        {
            groups
                .entry(segment.unordered())
                .or_default()
                .push((*label, segment.is_reversed()));
        }
    }

    let mut ratios = HashMap::new();
    for (_, mut members) in groups {
        members.sort_by(|a, b| a.0.cmp(b.0));
        let n = members.len();
        for (k, (label, reversed)) in members.into_iter().enumerate() {
            let t = match n {
                1 => {
                    ratios.insert(label, config.on_segment_ratio);
                    continue;
                }
                2 => config.pair_ratios[k],
                _ => (k + 1) as f64 / (n + 1) as f64,
            };
            ratios.insert(label, if reversed { 1.0 - t } else { t });
        }
    }
    ratios
}
