//! State → district → block error-rate tree.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLevel {
    State,
    District,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl RegionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionStatus::Excellent => "excellent",
            RegionStatus::Good => "good",
            RegionStatus::Warning => "warning",
            RegionStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionData {
    pub id: String,
    pub name: String,
    pub level: RegionLevel,
    /// Percent.
    pub error_rate: f32,
    pub total_surveys: u32,
    pub error_count: u32,
    pub status: RegionStatus,
    pub children: Vec<RegionData>,
}

fn district(id: &str, name: &str, rate: f32, total: u32, errors: u32, status: RegionStatus) -> RegionData {
    RegionData {
        id: id.into(),
        name: name.into(),
        level: RegionLevel::District,
        error_rate: rate,
        total_surveys: total,
        error_count: errors,
        status,
        children: Vec::new(),
    }
}

pub fn sample_regions() -> Vec<RegionData> {
    vec![
        RegionData {
            id: "GJ".into(),
            name: "Gujarat".into(),
            level: RegionLevel::State,
            error_rate: 4.2,
            total_surveys: 15_000,
            error_count: 630,
            status: RegionStatus::Good,
            children: vec![
                district("GJ-AHM", "Ahmadabad", 3.8, 5_000, 190, RegionStatus::Excellent),
                district("GJ-SUR", "Surat", 4.6, 4_000, 184, RegionStatus::Good),
            ],
        },
        RegionData {
            id: "MH".into(),
            name: "Maharashtra".into(),
            level: RegionLevel::State,
            error_rate: 6.8,
            total_surveys: 20_000,
            error_count: 1_360,
            status: RegionStatus::Warning,
            children: vec![
                district("MH-MUM", "Mumbai", 5.2, 8_000, 416, RegionStatus::Good),
                district("MH-PUN", "Pune", 8.4, 6_000, 504, RegionStatus::Warning),
            ],
        },
    ]
}

/// Depth-first search by id.
pub fn find_region<'a>(regions: &'a [RegionData], id: &str) -> Option<&'a RegionData> {
    regions.iter().find_map(|r| {
        if r.id == id {
            Some(r)
        } else {
            find_region(&r.children, id)
        }
    })
}

/// Pre-order walk as `(depth, region)`, the order the tree view draws rows.
pub fn flatten_regions(regions: &[RegionData]) -> Vec<(usize, &RegionData)> {
    fn walk<'a>(regions: &'a [RegionData], depth: usize, out: &mut Vec<(usize, &'a RegionData)>) {
        for region in regions {
            out.push((depth, region));
            walk(&region.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(regions, 0, &mut out);
    out
}
