/// One plotted run: its 1-based position in the newest-first list and its duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub position: f64,
    pub seconds: f64,
}

impl SeriesPoint {
    pub fn new(position: f64, seconds: f64) -> Self {
        Self { position, seconds }
    }
}

impl From<(f64, f64)> for SeriesPoint {
    fn from(v: (f64, f64)) -> Self {
        SeriesPoint {
            position: v.0,
            seconds: v.1,
        }
    }
}

impl From<SeriesPoint> for (f64, f64) {
    fn from(p: SeriesPoint) -> Self {
        (p.position, p.seconds)
    }
}
