//! Chart readiness, requests and payload shaping
//!
//! Every chart type declares which parts of `AppState` it reads. The
//! [`ReadinessCoordinator`] uses that declaration to decide, per state
//! transition, whether the chart re-renders and whether it refetches.

mod adapter;
mod coordinator;
mod request;
mod view;

pub use adapter::{
    adapt, AdapterOptions, BarModel, ChartModel, Domain, EmptyReason, HeatmapCell, HeatmapModel,
    HeatmapPanel, HistogramModel, PlanEdge, PlanLine, PlanNode, QueryPlanModel, SunburstModel,
    SunburstSegment, SwimLane, SwimLanesModel, UirLine, UirModel,
};
pub use coordinator::{ChartStatus, Readiness, ReadinessCoordinator};
pub use request::{format_number, ChartRequest, ConfigKey, RequestConfig};
pub use view::{ChartView, SyncReport};

use crate::state::{AppState, ChartType};

/// A selection-context field a chart may watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    CurrentEvent,
    CurrentPipeline,
    CurrentOperator,
    CurrentBucketSize,
    CurrentTimeBucketSelection,
    CurrentInterpolation,
    CurrentMemoryAddressSelection,
    MemoryHeatmapsDifference,
}

impl Dependency {
    /// Value comparison of the watched field between two snapshots
    pub fn changed(&self, prev: &AppState, next: &AppState) -> bool {
        match self {
            Dependency::CurrentEvent => prev.current_event != next.current_event,
            Dependency::CurrentPipeline => prev.current_pipeline != next.current_pipeline,
            Dependency::CurrentOperator => prev.current_operator != next.current_operator,
            Dependency::CurrentBucketSize => prev.current_bucket_size != next.current_bucket_size,
            Dependency::CurrentTimeBucketSelection => {
                prev.current_time_bucket_selection_tuple != next.current_time_bucket_selection_tuple
            }
            Dependency::CurrentInterpolation => {
                prev.current_interpolation != next.current_interpolation
            }
            Dependency::CurrentMemoryAddressSelection => {
                prev.current_memory_address_selection_tuple
                    != next.current_memory_address_selection_tuple
            }
            Dependency::MemoryHeatmapsDifference => {
                prev.memory_heatmaps_difference_representation
                    != next.memory_heatmaps_difference_representation
            }
        }
    }
}

/// Upstream data a chart cannot query without
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prerequisite {
    Events,
    Operators,
    Pipelines,
}

impl Prerequisite {
    fn universe<'a>(&self, state: &'a AppState) -> Option<&'a Vec<String>> {
        match self {
            Prerequisite::Events => state.events.as_ref(),
            Prerequisite::Operators => state.operators.as_ref(),
            Prerequisite::Pipelines => state.pipelines.as_ref(),
        }
    }

    pub fn present(&self, state: &AppState) -> bool {
        self.universe(state).is_some()
    }

    pub fn changed(&self, prev: &AppState, next: &AppState) -> bool {
        self.universe(prev) != self.universe(next)
    }
}

/// Declared selector surface of one chart type
#[derive(Debug)]
pub struct ChartDependencies {
    /// Selection fields whose change invalidates fetched data
    pub fetch_params: &'static [Dependency],
    /// Universes that must be populated before any fetch
    pub prerequisites: &'static [Prerequisite],
    /// Fields read only while rendering
    pub render_only: &'static [Dependency],
    /// Request options recognized by the backend for this chart type
    pub config_keys: &'static [ConfigKey],
}

impl ChartDependencies {
    /// Every selection field the chart reads
    pub fn watched(&self) -> impl Iterator<Item = Dependency> + '_ {
        self.fetch_params.iter().chain(self.render_only).copied()
    }
}

static BAR_CHART: ChartDependencies = ChartDependencies {
    fetch_params: &[
        Dependency::CurrentEvent,
        Dependency::CurrentPipeline,
        Dependency::CurrentTimeBucketSelection,
    ],
    prerequisites: &[Prerequisite::Events],
    render_only: &[],
    config_keys: &[
        ConfigKey::Event,
        ConfigKey::Pipelines,
        ConfigKey::TimeFrom,
        ConfigKey::TimeTo,
    ],
};

static ACTIVITY_HISTOGRAM: ChartDependencies = ChartDependencies {
    fetch_params: &[Dependency::CurrentEvent, Dependency::CurrentBucketSize],
    prerequisites: &[Prerequisite::Events],
    render_only: &[],
    config_keys: &[ConfigKey::Event, ConfigKey::BucketSize],
};

static SWIM_LANES: ChartDependencies = ChartDependencies {
    fetch_params: &[
        Dependency::CurrentEvent,
        Dependency::CurrentBucketSize,
        Dependency::CurrentPipeline,
        Dependency::CurrentOperator,
        Dependency::CurrentTimeBucketSelection,
    ],
    prerequisites: &[Prerequisite::Events, Prerequisite::Operators],
    render_only: &[Dependency::CurrentInterpolation],
    config_keys: &[
        ConfigKey::Event,
        ConfigKey::BucketSize,
        ConfigKey::Pipelines,
        ConfigKey::Operators,
        ConfigKey::TimeFrom,
        ConfigKey::TimeTo,
    ],
};

static MEMORY_ACCESS_HEATMAP: ChartDependencies = ChartDependencies {
    fetch_params: &[
        Dependency::CurrentEvent,
        Dependency::CurrentBucketSize,
        Dependency::CurrentTimeBucketSelection,
        Dependency::CurrentMemoryAddressSelection,
    ],
    prerequisites: &[Prerequisite::Events, Prerequisite::Operators],
    render_only: &[Dependency::MemoryHeatmapsDifference],
    config_keys: &[
        ConfigKey::Event,
        ConfigKey::BucketSize,
        ConfigKey::TimeFrom,
        ConfigKey::TimeTo,
        ConfigKey::MemoryFrom,
        ConfigKey::MemoryTo,
    ],
};

static UIR_VIEWER: ChartDependencies = ChartDependencies {
    fetch_params: &[Dependency::CurrentEvent],
    prerequisites: &[Prerequisite::Events],
    render_only: &[],
    config_keys: &[ConfigKey::Event],
};

static QUERY_PLAN: ChartDependencies = ChartDependencies {
    fetch_params: &[Dependency::CurrentEvent],
    prerequisites: &[Prerequisite::Events, Prerequisite::Operators],
    render_only: &[Dependency::CurrentOperator],
    config_keys: &[ConfigKey::Event],
};

static SUNBURST: ChartDependencies = ChartDependencies {
    fetch_params: &[Dependency::CurrentEvent, Dependency::CurrentTimeBucketSelection],
    prerequisites: &[Prerequisite::Events, Prerequisite::Pipelines],
    render_only: &[Dependency::CurrentPipeline, Dependency::CurrentOperator],
    config_keys: &[ConfigKey::Event, ConfigKey::TimeFrom, ConfigKey::TimeTo],
};

/// Dependency declaration of a chart type
pub fn dependencies_of(chart_type: ChartType) -> &'static ChartDependencies {
    match chart_type {
        ChartType::BarChart => &BAR_CHART,
        ChartType::ActivityHistogram => &ACTIVITY_HISTOGRAM,
        // Both lane charts read the same selection context
        ChartType::SwimLanes | ChartType::SwimLanesAbsolute => &SWIM_LANES,
        ChartType::MemoryAccessHeatmap => &MEMORY_ACCESS_HEATMAP,
        ChartType::UirViewer => &UIR_VIEWER,
        ChartType::QueryPlan => &QUERY_PLAN,
        ChartType::Sunburst => &SUNBURST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Selection;

    #[test]
    fn test_every_chart_requests_an_event() {
        for chart_type in ChartType::ALL {
            let deps = dependencies_of(chart_type);
            assert!(deps.config_keys.contains(&ConfigKey::Event), "{chart_type}");
            assert!(deps.prerequisites.contains(&Prerequisite::Events), "{chart_type}");
        }
    }

    #[test]
    fn test_fetch_params_are_selection_context_only() {
        for chart_type in ChartType::ALL {
            for dep in dependencies_of(chart_type).fetch_params {
                assert!(!matches!(dep, Dependency::MemoryHeatmapsDifference));
            }
        }
    }

    #[test]
    fn test_dependency_change_uses_value_equality() {
        let prev = AppState::default();
        let mut next = prev.clone();
        next.current_operator = Selection::Only(vec!["scan".to_string()]);
        assert!(Dependency::CurrentOperator.changed(&prev, &next));

        let same = next.clone();
        assert!(!Dependency::CurrentOperator.changed(&next, &same));

        let mut tuple = prev.clone();
        tuple.current_time_bucket_selection_tuple = [-1.0, -1.0];
        assert!(!Dependency::CurrentTimeBucketSelection.changed(&prev, &tuple));
    }

    #[test]
    fn test_prerequisite_change_includes_population() {
        let prev = AppState::default();
        let mut next = prev.clone();
        assert!(!Prerequisite::Events.present(&next));

        next.events = Some(vec!["L1".to_string()]);
        assert!(Prerequisite::Events.present(&next));
        assert!(Prerequisite::Events.changed(&prev, &next));
        assert!(!Prerequisite::Operators.changed(&prev, &next));
    }
}
