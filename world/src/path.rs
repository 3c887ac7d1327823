//! Fixed hero route and the follower that advances along it.

use dungeon_defence_core::{DungeonLayout, Facing, LayoutError, WorldPoint};

/// Divisor turning a speed constant into progress per elapsed millisecond.
const SPEED_SCALE: f32 = 10_000.0;

/// Straight line between two waypoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    start: WorldPoint,
    end: WorldPoint,
    length: f32,
}

impl Segment {
    fn new(start: WorldPoint, end: WorldPoint) -> Self {
        Self {
            start,
            end,
            length: start.distance(end),
        }
    }

    /// First point of the segment.
    #[must_use]
    pub const fn start(&self) -> WorldPoint {
        self.start
    }

    /// Last point of the segment.
    #[must_use]
    pub const fn end(&self) -> WorldPoint {
        self.end
    }
}

/// Ordered, contiguous chain of segments sampled by normalized progress.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    length: f32,
}

impl Path {
    /// Builds a path through the provided waypoints.
    ///
    /// Consecutive waypoints share endpoints, so the resulting segments are
    /// contiguous by construction.
    pub fn new(waypoints: &[WorldPoint]) -> Result<Self, LayoutError> {
        if waypoints.len() < 2 {
            return Err(LayoutError::TooFewWaypoints(waypoints.len()));
        }

        let segments: Vec<Segment> = waypoints
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .collect();
        let length = segments.iter().map(|segment| segment.length).sum();
        Ok(Self { segments, length })
    }

    /// Builds the path described by a layout, shifting waypoints by the grid offset.
    pub fn from_layout(layout: &DungeonLayout) -> Result<Self, LayoutError> {
        let shifted: Vec<WorldPoint> = layout
            .waypoints
            .iter()
            .map(|point| WorldPoint::new(point.x + layout.offset.x, point.y + layout.offset.y))
            .collect();
        Self::new(&shifted)
    }

    /// Segments composing the path in travel order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length of the path in world units.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// Point at `t = 0`.
    #[must_use]
    pub fn start(&self) -> WorldPoint {
        self.segments[0].start
    }

    /// Point at `t = 1`.
    #[must_use]
    pub fn end(&self) -> WorldPoint {
        self.segments[self.segments.len() - 1].end
    }

    /// Samples the path at normalized progress `t`.
    ///
    /// Negative progress clamps to the start. Progress beyond `1` has no
    /// further segment to sample and yields `None`, which callers treat as
    /// having reached the end of the path.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Option<WorldPoint> {
        if t.is_nan() || t > 1.0 {
            return None;
        }
        if t <= 0.0 || self.length <= 0.0 {
            return Some(self.start());
        }
        if t >= 1.0 {
            return Some(self.end());
        }

        let mut remaining = t * self.length;
        for segment in &self.segments {
            if segment.length <= 0.0 {
                continue;
            }
            if remaining <= segment.length {
                return Some(segment.start.lerp(segment.end, remaining / segment.length));
            }
            remaining -= segment.length;
        }
        Some(self.end())
    }
}

/// Progress of a single actor along a [`Path`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathFollower {
    progress: f32,
}

impl PathFollower {
    /// Creates a follower standing at the start of the path.
    #[must_use]
    pub const fn new() -> Self {
        Self { progress: 0.0 }
    }

    /// Current normalized progress.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress gained by moving at `speed` for `elapsed_ms`.
    #[must_use]
    pub fn step(speed: f32, elapsed_ms: f32) -> f32 {
        (speed / SPEED_SCALE) * elapsed_ms.max(0.0)
    }

    /// Returns `t` advanced by moving at `speed` for `elapsed_ms`.
    #[must_use]
    pub fn advance(t: f32, speed: f32, elapsed_ms: f32) -> f32 {
        t + Self::step(speed, elapsed_ms)
    }

    /// Advances the follower, capping progress at the end of the path.
    pub fn advance_by(&mut self, step: f32) -> f32 {
        self.progress = (self.progress + step.max(0.0)).min(1.0);
        self.progress
    }

    /// Reports whether the end of the path has been reached.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Decides facing by sampling the path one `step` ahead of the follower.
    ///
    /// Returns `None` when the lookahead runs past the end of the path.
    #[must_use]
    pub fn lookahead_facing(&self, path: &Path, current: WorldPoint, step: f32) -> Option<Facing> {
        let next = path.point_at(self.progress + step)?;
        Some(if next.x > current.x {
            Facing::Right
        } else if next.x < current.x {
            Facing::Left
        } else {
            Facing::Down
        })
    }
}
