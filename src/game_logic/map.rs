use crate::game_logic::{
    DEFAULT_CHECKPOINT_RADIUS, DEFAULT_TRACK_COLOR, DEFAULT_TRACK_WIDTH, GENERATED_CHECKPOINTS,
    distance_to_quadratic_curve, distance_to_segment, point_in_polygon, point_on_quadratic_curve,
    quadratic_curve_length,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Plain `{x, y}` point as it appears in track JSON
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct TrackPoint {
    pub x: f32,
    pub y: f32,
}

impl From<TrackPoint> for Vec2 {
    fn from(p: TrackPoint) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for TrackPoint {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// One piece of a path-based track's centerline
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrackSegment {
    Line {
        start: TrackPoint,
        end: TrackPoint,
    },
    Curve {
        start: TrackPoint,
        control: TrackPoint,
        end: TrackPoint,
    },
}

impl TrackSegment {
    pub fn start(&self) -> Vec2 {
        match self {
            TrackSegment::Line { start, .. } | TrackSegment::Curve { start, .. } => (*start).into(),
        }
    }

    pub fn distance_to(&self, p: Vec2) -> f32 {
        match *self {
            TrackSegment::Line { start, end } => distance_to_segment(p, start.into(), end.into()),
            TrackSegment::Curve {
                start,
                control,
                end,
            } => distance_to_quadratic_curve(p, start.into(), control.into(), end.into()),
        }
    }

    pub fn length(&self) -> f32 {
        match *self {
            TrackSegment::Line { start, end } => Vec2::from(start).distance(end.into()),
            TrackSegment::Curve {
                start,
                control,
                end,
            } => quadratic_curve_length(start.into(), control.into(), end.into()),
        }
    }

    /// Point at fraction `t` of the segment (Bézier parameter for curves)
    pub fn point_at(&self, t: f32) -> Vec2 {
        match *self {
            TrackSegment::Line { start, end } => Vec2::from(start).lerp(end.into(), t),
            TrackSegment::Curve {
                start,
                control,
                end,
            } => point_on_quadratic_curve(start.into(), control.into(), end.into(), t),
        }
    }
}

/// Circular capture zone. Index 0 of a track's list is the start/finish line.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Checkpoint {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Track as exchanged with the editor and the track store
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub track_points: Vec<TrackSegment>,
    pub checkpoints: Vec<Checkpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<TrackPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl TrackDefinition {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace the checkpoints with `count` circles spaced evenly by arc length along the path
    pub fn auto_place_checkpoints(&mut self, count: usize) {
        self.checkpoints.clear();
        let lengths: Vec<f32> = self.track_points.iter().map(TrackSegment::length).collect();
        let total: f32 = lengths.iter().sum();
        if count == 0 || total <= 0.0 {
            return;
        }

        let spacing = total / count as f32;
        let mut travelled = 0.0;
        let mut placed = 0;
        for (segment, &length) in self.track_points.iter().zip(&lengths) {
            while placed < count && travelled + length >= spacing * placed as f32 {
                let along = spacing * placed as f32 - travelled;
                let t = if length > 0.0 { along / length } else { 0.0 };
                let p = segment.point_at(t.clamp(0.0, 1.0));
                self.checkpoints
                    .push(Checkpoint::new(p.x, p.y, DEFAULT_CHECKPOINT_RADIUS));
                placed += 1;
            }
            travelled += length;
        }
    }
}

/// Drivable area. Exactly one representation per track.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackShape {
    /// Closed polygon, last vertex joins the first
    Polygon(Vec<Vec2>),
    /// Centerline segments swept by a uniform width
    Path {
        segments: Vec<TrackSegment>,
        width: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    shape: TrackShape,
    checkpoints: Vec<Checkpoint>,
    start_position: Vec2,
    color: String,
    definition: TrackDefinition,
}

impl Default for Track {
    fn default() -> Self {
        Self::default_track()
    }
}

impl Track {
    /// Built-in track used when no custom layout is loaded
    pub fn default_track() -> Self {
        let polygon = vec![
            Vec2::new(80.0, 160.0),
            Vec2::new(720.0, 160.0),
            Vec2::new(760.0, 300.0),
            Vec2::new(720.0, 460.0),
            Vec2::new(80.0, 460.0),
            Vec2::new(40.0, 300.0),
        ];
        let checkpoints = vec![
            Checkpoint::new(200.0, 300.0, DEFAULT_CHECKPOINT_RADIUS), // start/finish
            Checkpoint::new(500.0, 250.0, DEFAULT_CHECKPOINT_RADIUS),
            Checkpoint::new(650.0, 350.0, DEFAULT_CHECKPOINT_RADIUS),
            Checkpoint::new(500.0, 400.0, DEFAULT_CHECKPOINT_RADIUS),
            Checkpoint::new(600.0, 400.0, DEFAULT_CHECKPOINT_RADIUS),
            Checkpoint::new(600.0, 200.0, DEFAULT_CHECKPOINT_RADIUS),
        ];

        Self {
            shape: TrackShape::Polygon(polygon),
            checkpoints,
            start_position: Vec2::new(200.0, 300.0),
            color: DEFAULT_TRACK_COLOR.to_string(),
            definition: TrackDefinition::default(),
        }
    }

    /// Build a track from an editor definition. An empty segment list falls back to the
    /// built-in track; bad widths and radii are repaired instead of rejected.
    pub fn from_definition(definition: TrackDefinition) -> Self {
        if definition.track_points.is_empty() {
            info!("Track has no segments, using the built-in track");
            let mut track = Self::default_track();
            if let Some(color) = &definition.track_color {
                track.color = color.clone();
            }
            track.definition = definition;
            return track;
        }

        let width = match definition.track_width {
            Some(w) if w.is_finite() && w > 0.0 => w,
            Some(w) => {
                warn!("Invalid track width {}, using {}", w, DEFAULT_TRACK_WIDTH);
                DEFAULT_TRACK_WIDTH
            }
            None => DEFAULT_TRACK_WIDTH,
        };

        let start_position = definition
            .start_position
            .map(Vec2::from)
            .unwrap_or_else(|| definition.track_points[0].start());

        let checkpoints = if definition.checkpoints.is_empty() {
            generate_checkpoints(&definition.track_points)
        } else {
            definition
                .checkpoints
                .iter()
                .map(|cp| {
                    if cp.radius.is_finite() && cp.radius > 0.0 {
                        *cp
                    } else {
                        warn!(
                            "Checkpoint at ({:.0}, {:.0}) has radius {}, using {}",
                            cp.x, cp.y, cp.radius, DEFAULT_CHECKPOINT_RADIUS
                        );
                        Checkpoint::new(cp.x, cp.y, DEFAULT_CHECKPOINT_RADIUS)
                    }
                })
                .collect()
        };

        let track = Self {
            shape: TrackShape::Path {
                segments: definition.track_points.clone(),
                width,
            },
            checkpoints,
            start_position,
            color: definition
                .track_color
                .clone()
                .unwrap_or_else(|| DEFAULT_TRACK_COLOR.to_string()),
            definition,
        };

        for index in track.off_track_checkpoints() {
            warn!("Checkpoint {} lies outside the drivable area", index);
        }
        info!(
            "Loaded track with {} segments and {} checkpoints",
            track.segment_count(),
            track.checkpoints.len()
        );
        track
    }

    /// Definition that reloads to an equivalent track
    pub fn to_definition(&self) -> TrackDefinition {
        let mut definition = self.definition.clone();
        if let TrackShape::Path { width, .. } = &self.shape {
            definition.track_width = Some(*width);
            definition.checkpoints = self.checkpoints.clone();
            definition.start_position = Some(self.start_position.into());
        }
        definition.track_color = Some(self.color.clone());
        definition
    }

    pub fn is_point_on_track(&self, p: Vec2) -> bool {
        match &self.shape {
            TrackShape::Polygon(polygon) => point_in_polygon(p, polygon),
            TrackShape::Path { segments, width } => {
                let half_width = width / 2.0;
                segments.iter().any(|seg| seg.distance_to(p) <= half_width)
            }
        }
    }

    /// Indices of checkpoints whose centers are not drivable
    pub fn off_track_checkpoints(&self) -> Vec<usize> {
        self.checkpoints
            .iter()
            .enumerate()
            .filter(|(_, cp)| !self.is_point_on_track(cp.center()))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn start_position(&self) -> Vec2 {
        self.start_position
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn shape(&self) -> &TrackShape {
        &self.shape
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    fn segment_count(&self) -> usize {
        match &self.shape {
            TrackShape::Polygon(_) => 0,
            TrackShape::Path { segments, .. } => segments.len(),
        }
    }
}

// six checkpoints picked from evenly spread segment starts
fn generate_checkpoints(segments: &[TrackSegment]) -> Vec<Checkpoint> {
    let last = segments.len().saturating_sub(1);
    (0..GENERATED_CHECKPOINTS)
        .filter_map(|i| {
            let index = (i * last) / (GENERATED_CHECKPOINTS - 1);
            segments.get(index).map(|seg| {
                let p = seg.start();
                Checkpoint::new(p.x, p.y, DEFAULT_CHECKPOINT_RADIUS)
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Rectangular loop of four straights with rounded corners, 80 wide
    pub(crate) const SAMPLE_TRACK_JSON: &str = r##"{
        "name": "Sample Loop",
        "trackPoints": [
            {"type": "line", "start": {"x": 150, "y": 100}, "end": {"x": 650, "y": 100}},
            {"type": "curve", "start": {"x": 650, "y": 100}, "control": {"x": 700, "y": 100}, "end": {"x": 700, "y": 150}},
            {"type": "line", "start": {"x": 700, "y": 150}, "end": {"x": 700, "y": 450}},
            {"type": "curve", "start": {"x": 700, "y": 450}, "control": {"x": 700, "y": 500}, "end": {"x": 650, "y": 500}},
            {"type": "line", "start": {"x": 650, "y": 500}, "end": {"x": 150, "y": 500}},
            {"type": "curve", "start": {"x": 150, "y": 500}, "control": {"x": 100, "y": 500}, "end": {"x": 100, "y": 450}},
            {"type": "line", "start": {"x": 100, "y": 450}, "end": {"x": 100, "y": 150}},
            {"type": "curve", "start": {"x": 100, "y": 150}, "control": {"x": 100, "y": 100}, "end": {"x": 150, "y": 100}}
        ],
        "checkpoints": [
            {"id": 1, "x": 150, "y": 100, "radius": 30},
            {"id": 2, "x": 400, "y": 100, "radius": 30},
            {"id": 3, "x": 700, "y": 300, "radius": 30},
            {"id": 4, "x": 400, "y": 500, "radius": 30},
            {"id": 5, "x": 100, "y": 300, "radius": 30}
        ],
        "trackWidth": 80,
        "trackColor": "#cc3300"
    }"##;

    pub(crate) fn sample_track() -> Track {
        Track::from_definition(TrackDefinition::from_json_str(SAMPLE_TRACK_JSON).unwrap())
    }

    fn probe_points() -> Vec<Vec2> {
        let mut probes = Vec::new();
        for x in (0..=800).step_by(25) {
            for y in (0..=600).step_by(25) {
                probes.push(Vec2::new(x as f32, y as f32));
            }
        }
        probes
    }

    #[test]
    fn test_checkpoints_are_on_track() {
        for track in [Track::default_track(), sample_track()] {
            for cp in track.checkpoints() {
                assert!(track.is_point_on_track(cp.center()), "{:?}", cp);
            }
            assert!(track.off_track_checkpoints().is_empty());
        }
    }

    #[test]
    fn test_path_track_is_union_of_capsules() {
        let track = sample_track();
        // on the centerline, within half width, and in the infield
        assert!(track.is_point_on_track(Vec2::new(400.0, 100.0)));
        assert!(track.is_point_on_track(Vec2::new(400.0, 139.0)));
        assert!(!track.is_point_on_track(Vec2::new(400.0, 141.0)));
        assert!(!track.is_point_on_track(Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn test_open_path_does_not_need_to_close() {
        let definition = TrackDefinition {
            track_points: vec![TrackSegment::Line {
                start: TrackPoint { x: 0.0, y: 0.0 },
                end: TrackPoint { x: 100.0, y: 0.0 },
            }],
            track_width: Some(20.0),
            ..Default::default()
        };
        let track = Track::from_definition(definition);
        assert!(track.is_point_on_track(Vec2::new(105.0, 5.0)));
        assert!(!track.is_point_on_track(Vec2::new(50.0, 11.0)));
        assert_eq!(track.start_position(), Vec2::ZERO);
    }

    #[test]
    fn test_empty_definition_falls_back_to_default() {
        let track = Track::from_definition(TrackDefinition::default());
        assert!(matches!(track.shape(), TrackShape::Polygon(_)));
        assert_eq!(track.checkpoints().len(), 6);
        assert_eq!(track.start_position(), Vec2::new(200.0, 300.0));
    }

    #[test]
    fn test_missing_checkpoints_are_generated() {
        let mut definition = TrackDefinition::from_json_str(SAMPLE_TRACK_JSON).unwrap();
        definition.checkpoints.clear();
        let track = Track::from_definition(definition);
        assert_eq!(track.checkpoints().len(), GENERATED_CHECKPOINTS);
        assert_eq!(track.checkpoints()[0].center(), Vec2::new(150.0, 100.0));
        // last generated checkpoint comes from the last segment
        assert_eq!(track.checkpoints()[5].center(), Vec2::new(100.0, 150.0));
    }

    #[test]
    fn test_bad_width_and_radius_are_repaired() {
        let mut definition = TrackDefinition::from_json_str(SAMPLE_TRACK_JSON).unwrap();
        definition.track_width = Some(-5.0);
        definition.checkpoints[1].radius = 0.0;
        let track = Track::from_definition(definition);
        match track.shape() {
            TrackShape::Path { width, .. } => assert_eq!(*width, DEFAULT_TRACK_WIDTH),
            _ => panic!("expected path track"),
        }
        assert_eq!(track.checkpoints()[1].radius, DEFAULT_CHECKPOINT_RADIUS);
    }

    #[test]
    fn test_save_reload_keeps_on_track_answers() {
        let track = sample_track();
        let json = track.to_definition().to_json_string().unwrap();
        let reloaded = Track::from_definition(TrackDefinition::from_json_str(&json).unwrap());

        for p in probe_points() {
            assert_eq!(track.is_point_on_track(p), reloaded.is_point_on_track(p), "{:?}", p);
        }
        assert_eq!(track.checkpoints(), reloaded.checkpoints());
        assert_eq!(reloaded.color(), "#cc3300");
        assert_eq!(reloaded.to_definition().name.as_deref(), Some("Sample Loop"));
    }

    #[test]
    fn test_default_track_round_trip() {
        let track = Track::default_track();
        let json = track.to_definition().to_json_string().unwrap();
        let reloaded = Track::from_definition(TrackDefinition::from_json_str(&json).unwrap());
        for p in probe_points() {
            assert_eq!(track.is_point_on_track(p), reloaded.is_point_on_track(p));
        }
    }

    #[test]
    fn test_auto_place_checkpoints_by_arc_length() {
        let mut definition = TrackDefinition {
            track_points: vec![
                TrackSegment::Line {
                    start: TrackPoint { x: 0.0, y: 0.0 },
                    end: TrackPoint { x: 300.0, y: 0.0 },
                },
                TrackSegment::Line {
                    start: TrackPoint { x: 300.0, y: 0.0 },
                    end: TrackPoint { x: 300.0, y: 300.0 },
                },
            ],
            ..Default::default()
        };
        definition.auto_place_checkpoints(6);

        let centers: Vec<Vec2> = definition.checkpoints.iter().map(Checkpoint::center).collect();
        assert_eq!(centers.len(), 6);
        assert!((centers[0] - Vec2::new(0.0, 0.0)).length() < 1e-3);
        assert!((centers[1] - Vec2::new(100.0, 0.0)).length() < 1e-3);
        assert!((centers[3] - Vec2::new(300.0, 0.0)).length() < 1e-3);
        assert!((centers[5] - Vec2::new(300.0, 200.0)).length() < 1e-3);
    }
}
