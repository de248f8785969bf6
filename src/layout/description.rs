//! Relational point descriptions
//!
//! Free text such as "D is the foot of the altitude from A to BC" is scanned
//! for one of four phrases (see `description.pest`). Phrases are tried in a
//! fixed priority order; the first one found anywhere in the text decides the
//! relation. Point labels are single letters and come back upper-cased.

use pest::Parser;
use pest::iterators::Pair;

use crate::{DescriptionParser, Rule};

/// Two labels naming a segment or a line through them
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: String,
    pub end: String,
}

impl Segment {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Segment {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The same segment regardless of direction: `AB` and `BA` share a key.
    pub fn unordered(&self) -> (&str, &str) {
        if self.start <= self.end {
            (self.start.as_str(), self.end.as_str())
        } else {
            (self.end.as_str(), self.start.as_str())
        }
    }

    /// True when this segment runs against its unordered key
    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    fn from_pair(pair: Pair<'_, Rule>) -> Option<Self> {
        let mut labels = pair.into_inner().map(|p| p.as_str().to_ascii_uppercase());
        Some(Segment {
            start: labels.next()?,
            end: labels.next()?,
        })
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.start, self.end)
    }
}

/// How a point is placed relative to others
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// Intersection of the two (infinite) lines
    Intersection { first: Segment, second: Segment },
    /// Foot of the perpendicular from `point` to the line
    Projection { point: String, onto: Segment },
    /// Somewhere on the segment. `ratio` is measured from `segment.start`;
    /// `None` leaves it to the layout heuristic.
    OnSegment { segment: Segment, ratio: Option<f64> },
    Midpoint { segment: Segment },
}

impl Relation {
    /// Find the relation a description states, if any.
    pub fn parse(text: &str) -> Option<Relation> {
        if let Some(pair) = find(Rule::intersection, text) {
            let mut segments = pair.into_inner().filter_map(Segment::from_pair);
            return Some(Relation::Intersection {
                first: segments.next()?,
                second: segments.next()?,
            });
        }

        if let Some(pair) = find(Rule::projection, text) {
            let mut point = None;
            let mut onto = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::label => point = Some(inner.as_str().to_ascii_uppercase()),
                    Rule::segment => onto = Segment::from_pair(inner),
                    _ => {}
                }
            }
            return Some(Relation::Projection {
                point: point?,
                onto: onto?,
            });
        }

        if let Some(pair) = find(Rule::on_segment, text) {
            let segment = pair.into_inner().find_map(Segment::from_pair)?;
            let ratio = stated_ratio(text).or_else(|| {
                text.to_ascii_lowercase()
                    .contains("midpoint")
                    .then_some(0.5)
            });
            return Some(Relation::OnSegment { segment, ratio });
        }

        if let Some(pair) = find(Rule::midpoint, text) {
            let segment = pair.into_inner().find_map(Segment::from_pair)?;
            return Some(Relation::Midpoint { segment });
        }

        None
    }

    /// Labels that must be positioned before this relation can be evaluated
    pub fn referents(&self) -> Vec<&str> {
        match self {
            Relation::Intersection { first, second } => vec![
                first.start.as_str(),
                first.end.as_str(),
                second.start.as_str(),
                second.end.as_str(),
            ],
            Relation::Projection { point, onto } => {
                vec![point.as_str(), onto.start.as_str(), onto.end.as_str()]
            }
            Relation::OnSegment { segment, .. } | Relation::Midpoint { segment } => {
                vec![segment.start.as_str(), segment.end.as_str()]
            }
        }
    }
}

/// `ratio m:n` anywhere in the text, as the fraction `m / (m + n)`.
fn stated_ratio(text: &str) -> Option<f64> {
    let pair = find(Rule::ratio, text)?;
    let mut numbers = pair.into_inner().filter_map(|p| p.as_str().parse::<f64>().ok());
    let (m, n) = (numbers.next()?, numbers.next()?);
    let total = m + n;
    (total > 0.0).then(|| m / total)
}

/// Try `rule` at every word start; return the first match.
fn find(rule: Rule, text: &str) -> Option<Pair<'_, Rule>> {
    word_starts(text).find_map(|i| {
        DescriptionParser::parse(rule, &text[i..])
            .ok()
            .and_then(|mut pairs| pairs.next())
    })
}

fn word_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices()
        .filter(move |&(i, c)| {
            c.is_ascii_alphabetic()
                && text[..i]
                    .chars()
                    .next_back()
                    .is_none_or(|prev| !prev.is_alphanumeric())
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(s: &str) -> Segment {
        let mut c = s.chars();
        Segment::new(c.next().unwrap().to_string(), c.next().unwrap().to_string())
    }

    #[test]
    fn intersection_phrase() {
        assert_eq!(
            Relation::parse("P is the Intersection of AC and bd"),
            Some(Relation::Intersection {
                first: seg("AC"),
                second: seg("BD")
            })
        );
    }

    #[test]
    fn projection_and_altitude_phrases() {
        let expected = Some(Relation::Projection {
            point: "A".into(),
            onto: seg("BC"),
        });
        assert_eq!(Relation::parse("projection of A on BC"), expected);
        assert_eq!(Relation::parse("foot of the altitude from a to BC"), expected);
        assert_eq!(Relation::parse("projection of A onto BC"), expected);
    }

    #[test]
    fn on_segment_with_ratio() {
        match Relation::parse("D on side AB such that AD:DB is in ratio 3 : 4") {
            Some(Relation::OnSegment { segment, ratio }) => {
                assert_eq!(segment, seg("AB"));
                assert!((ratio.unwrap() - 3.0 / 7.0).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn on_segment_mentioning_midpoint() {
        assert_eq!(
            Relation::parse("on segment CD, its midpoint"),
            Some(Relation::OnSegment {
                segment: seg("CD"),
                ratio: Some(0.5)
            })
        );
    }

    #[test]
    fn on_segment_without_ratio() {
        assert_eq!(
            Relation::parse("point on AB"),
            Some(Relation::OnSegment {
                segment: seg("AB"),
                ratio: None
            })
        );
    }

    #[test]
    fn midpoint_phrase() {
        assert_eq!(
            Relation::parse("M is the midpoint of XY"),
            Some(Relation::Midpoint { segment: seg("XY") })
        );
    }

    #[test]
    fn words_are_not_segments() {
        // "the" is a word, not a two-letter label pair
        assert_eq!(Relation::parse("point on the circle"), None);
        // "on" inside "intersection" is not the on-segment phrase
        assert_eq!(Relation::parse("intersection of the chords"), None);
        assert_eq!(Relation::parse(""), None);
    }

    #[test]
    fn referents_in_order() {
        let rel = Relation::parse("intersection of AC and BD").unwrap();
        assert_eq!(rel.referents(), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn unordered_segment_key() {
        assert_eq!(seg("BA").unordered(), ("A", "B"));
        assert!(seg("BA").is_reversed());
        assert!(!seg("AB").is_reversed());
    }
}
