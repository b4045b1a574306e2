//! Field agent performance records.

use chrono::NaiveDateTime;

use super::{at, matches_query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    Gold,
    Silver,
    Bronze,
    None,
}

impl Badge {
    pub fn as_str(self) -> &'static str {
        match self {
            Badge::Gold => "gold",
            Badge::Silver => "silver",
            Badge::Bronze => "bronze",
            Badge::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentPerformance {
    pub id: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub total_surveys: u32,
    pub error_count: u32,
    /// Percent.
    pub error_rate: f32,
    /// Percent.
    pub accuracy: f32,
    pub badge: Badge,
    pub last_active: NaiveDateTime,
    pub trend: Trend,
    pub common_errors: Vec<String>,
}

pub fn sample_agents() -> Vec<AgentPerformance> {
    vec![
        AgentPerformance {
            id: "AG001".into(),
            name: "Rajesh Kumar".into(),
            district: "Ahmadabad".into(),
            state: "Gujarat".into(),
            total_surveys: 150,
            error_count: 8,
            error_rate: 5.3,
            accuracy: 94.7,
            badge: Badge::Gold,
            last_active: at(2024, 1, 15, 10, 30),
            trend: Trend::Improving,
            common_errors: vec!["Missing phone numbers".into(), "Age verification".into()],
        },
        AgentPerformance {
            id: "AG002".into(),
            name: "Priya Patel".into(),
            district: "Surat".into(),
            state: "Gujarat".into(),
            total_surveys: 120,
            error_count: 15,
            error_rate: 12.5,
            accuracy: 87.5,
            badge: Badge::Silver,
            last_active: at(2024, 1, 15, 9, 15),
            trend: Trend::Stable,
            common_errors: vec!["Income validation".into(), "Location mismatches".into()],
        },
        AgentPerformance {
            id: "AG003".into(),
            name: "Mohammed Ali".into(),
            district: "Hyderabad".into(),
            state: "Telangana".into(),
            total_surveys: 200,
            error_count: 35,
            error_rate: 17.5,
            accuracy: 82.5,
            badge: Badge::Bronze,
            last_active: at(2024, 1, 14, 16, 45),
            trend: Trend::Declining,
            common_errors: vec![
                "Format errors".into(),
                "Duplicate entries".into(),
                "Missing data".into(),
            ],
        },
    ]
}

/// Agent list search; matches name and district.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    pub query: String,
}

impl AgentFilter {
    pub fn matches(&self, agent: &AgentPerformance) -> bool {
        matches_query(&self.query, &[agent.name.as_str(), agent.district.as_str()])
    }

    pub fn apply<'a>(&self, agents: &'a [AgentPerformance]) -> Vec<&'a AgentPerformance> {
        agents.iter().filter(|a| self.matches(a)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSummary {
    pub agents: usize,
    pub gold: usize,
    pub silver: usize,
    pub bronze: usize,
    /// Mean accuracy in percent; 0 for no agents.
    pub average_accuracy: f32,
}

impl AgentSummary {
    pub fn from_agents<'a>(agents: impl IntoIterator<Item = &'a AgentPerformance>) -> Self {
        let mut summary = Self {
            agents: 0,
            gold: 0,
            silver: 0,
            bronze: 0,
            average_accuracy: 0.0,
        };
        let mut accuracy_sum = 0.0f32;
        for agent in agents {
            summary.agents += 1;
            accuracy_sum += agent.accuracy;
            match agent.badge {
                Badge::Gold => summary.gold += 1,
                Badge::Silver => summary.silver += 1,
                Badge::Bronze => summary.bronze += 1,
                Badge::None => {}
            }
        }
        if summary.agents > 0 {
            summary.average_accuracy = accuracy_sum / summary.agents as f32;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_name_and_district() {
        let agents = sample_agents();
        let by = |q: &str| {
            AgentFilter { query: q.into() }
                .apply(&agents)
                .iter()
                .map(|a| a.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(by("ali"), vec!["AG003"]);
        assert_eq!(by("surat"), vec!["AG002"]);
        // State is not searched.
        assert!(by("telangana").is_empty());
    }

    #[test]
    fn summary_counts_badges_and_averages_accuracy() {
        let summary = AgentSummary::from_agents(&sample_agents());
        assert_eq!(summary.agents, 3);
        assert_eq!((summary.gold, summary.silver, summary.bronze), (1, 1, 1));
        assert!((summary.average_accuracy - 88.233).abs() < 0.01);

        let empty = AgentSummary::from_agents(&[]);
        assert_eq!(empty.agents, 0);
        assert_eq!(empty.average_accuracy, 0.0);
    }
}
