use std::fmt;
use std::str::FromStr;

/// Listening period accepted by `user.gettopalbums`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Overall,
    SevenDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    TwelveMonths,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Overall,
        Period::SevenDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::TwelveMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Overall => "overall",
            Period::SevenDays => "7day",
            Period::OneMonth => "1month",
            Period::ThreeMonths => "3month",
            Period::SixMonths => "6month",
            Period::TwelveMonths => "12month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| format!("unknown period '{}'", s))
    }
}

/// Number of cells in a collage. Always a perfect square between 4 and 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize(usize);

impl GridSize {
    pub const ALLOWED: [usize; 9] = [4, 9, 16, 25, 36, 49, 64, 81, 100];

    pub fn new(count: usize) -> Option<Self> {
        Self::ALLOWED.contains(&count).then_some(Self(count))
    }

    pub fn count(&self) -> usize {
        self.0
    }

    /// Cells per row (and per column).
    pub fn side(&self) -> usize {
        // exact for every allowed count
        (2..=10).find(|side| side * side == self.0).unwrap_or(1)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(25)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub username: String,
    pub grid: GridSize,
    pub period: Period,
    pub include_labels: bool,
}

impl BuildRequest {
    pub fn new(username: String) -> Self {
        Self {
            username,
            grid: GridSize::default(),
            period: Period::default(),
            include_labels: true,
        }
    }

    pub fn with_grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_labels(mut self, include_labels: bool) -> Self {
        self.include_labels = include_labels;
        self
    }
}
