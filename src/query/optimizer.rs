//! Cost-based query optimizer
//!
//! Turns a declarative [`GraphQuery`] into an ordered, cost-estimated
//! [`QueryPlan`]. Planning is pure and synchronous: no I/O, no statistics
//! collection, just heuristics over the query shape. The plan is an
//! auditable artifact independent of actual execution.

use crate::graph::PropertyValue;
use crate::query::GraphQuery;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;
use uuid::Uuid;

/// Baseline cardinality assumed for an unfiltered scan.
const BASELINE_CARDINALITY: u64 = 10_000;

/// Cost of scanning one entity type through the type index.
const TYPED_SCAN_COST: f64 = 100.0;
/// Cost of a full scan when no entity type restricts the query.
const FULL_SCAN_COST: f64 = 500.0;
/// Cost added by each property filter step.
const FILTER_STEP_COST: f64 = 25.0;
/// Cost added by a pagination step.
const LIMIT_STEP_COST: f64 = 5.0;

/// Selectivity assumed for identifier-like filters.
const IDENTIFIER_SELECTIVITY: f64 = 0.001;
/// Selectivity assumed for common categorical fields.
const CATEGORICAL_SELECTIVITY: f64 = 0.5;
/// Selectivity assumed for everything else.
const DEFAULT_SELECTIVITY: f64 = 0.1;
/// Lower clamp keeping the combined selectivity inside (0, 1].
const MIN_SELECTIVITY: f64 = 1e-9;

/// Field names treated as low-selectivity categorical attributes.
const CATEGORICAL_KEYS: &[&str] = &[
    "country", "city", "state", "region", "category", "status", "gender",
];

/// Operation performed by one plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanOperation {
    ScanByEntityType,
    FilterByProperty,
    Limit,
}

impl fmt::Display for PlanOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanOperation::ScanByEntityType => "ScanByEntityType",
            PlanOperation::FilterByProperty => "FilterByProperty",
            PlanOperation::Limit => "Limit",
        };
        write!(f, "{}", name)
    }
}

/// One step of an execution plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub operation: PlanOperation,
    /// Step parameters, in stable rendering order
    pub parameters: IndexMap<String, String>,
}

impl PlanStep {
    fn new(operation: PlanOperation) -> Self {
        PlanStep {
            operation,
            parameters: IndexMap::new(),
        }
    }

    fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }
}

/// An ordered, cost-estimated execution plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Plan steps in execution order
    pub steps: Vec<PlanStep>,

    /// Estimated cost, monotone in the number of steps
    pub estimated_cost: f64,

    /// Estimated fraction of entities surviving all filters, in (0, 1]
    pub estimated_selectivity: f64,

    /// Estimated number of matching entities
    pub estimated_cardinality: u64,

    /// Filtered properties that would benefit from an index
    pub recommended_indexes: Vec<String>,

    /// Whether an index scan is recommended for this query
    pub index_scan_recommended: bool,

    /// Human-readable descriptions of what the planner did
    pub optimizations: Vec<String>,
}

impl QueryPlan {
    /// Render a multi-line diagnostic summary of the plan
    pub fn to_readable_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Query plan ({} steps)", self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            let params: Vec<String> = step
                .parameters
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            let _ = writeln!(out, "  Step {}: {} [{}]", i + 1, step.operation, params.join(", "));
        }
        let _ = writeln!(
            out,
            "Cost: {:.2} (selectivity {:.4}, estimated rows {})",
            self.estimated_cost, self.estimated_selectivity, self.estimated_cardinality
        );
        if self.index_scan_recommended {
            let _ = writeln!(
                out,
                "Recommended indexes: {}",
                self.recommended_indexes.join(", ")
            );
        }
        for opt in &self.optimizations {
            let _ = writeln!(out, "  - {}", opt);
        }
        out
    }
}

/// Cost-based query planner
#[derive(Debug, Clone)]
pub struct CostBasedOptimizer {
    baseline_cardinality: u64,
}

impl CostBasedOptimizer {
    /// Create an optimizer with the default baseline cardinality
    pub fn new() -> Self {
        Self {
            baseline_cardinality: BASELINE_CARDINALITY,
        }
    }

    /// Override the baseline cardinality estimate
    pub fn with_baseline_cardinality(baseline_cardinality: u64) -> Self {
        Self {
            baseline_cardinality,
        }
    }

    /// Build an ordered, cost-estimated plan for a query
    ///
    /// Filters are reordered most-selective-first so that cheap, highly
    /// selective predicates cut the candidate set before expensive ones
    /// run. A query can never cost less than the same query with fewer
    /// constraints.
    pub fn optimize_query(&self, query: &GraphQuery) -> QueryPlan {
        let mut steps = Vec::new();
        let mut optimizations = Vec::new();
        let mut recommended_indexes = Vec::new();

        let scan_cost = match &query.entity_type {
            Some(entity_type) => {
                steps.push(
                    PlanStep::new(PlanOperation::ScanByEntityType)
                        .with("entity_type", entity_type.as_str()),
                );
                TYPED_SCAN_COST
            }
            None => FULL_SCAN_COST,
        };

        let mut filters: Vec<(&String, &PropertyValue, f64)> = query
            .property_filters
            .iter()
            .map(|(key, value)| (key, value, estimate_selectivity(key, value)))
            .collect();
        filters.sort_by(|a, b| {
            a.2.partial_cmp(&b.2)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        if filters.len() > 1 {
            optimizations.push(format!(
                "Reordered {} property filters most-selective-first",
                filters.len()
            ));
        }

        let mut selectivity = 1.0;
        for (key, value, estimate) in &filters {
            selectivity *= estimate;
            steps.push(
                PlanStep::new(PlanOperation::FilterByProperty)
                    .with("property", key.as_str())
                    .with("value", value.to_string())
                    .with("selectivity", format!("{:.4}", estimate)),
            );
            if is_identifier_like(key, value) {
                recommended_indexes.push((*key).clone());
                optimizations.push(format!("Recommended index on '{}'", key));
            }
        }
        let selectivity = selectivity.clamp(MIN_SELECTIVITY, 1.0);

        let mut cost = scan_cost + FILTER_STEP_COST * filters.len() as f64;
        if query.page_size.is_some() || query.skip > 0 {
            let mut step = PlanStep::new(PlanOperation::Limit).with("skip", query.skip.to_string());
            if let Some(page_size) = query.page_size {
                step = step.with("page_size", page_size.to_string());
            }
            steps.push(step);
            cost += LIMIT_STEP_COST;
            optimizations.push(format!(
                "Applied pagination (page_size={:?}, skip={})",
                query.page_size, query.skip
            ));
        }

        let estimated_cardinality =
            ((self.baseline_cardinality as f64 * selectivity).round() as u64).max(1);
        let index_scan_recommended = !recommended_indexes.is_empty();

        QueryPlan {
            steps,
            estimated_cost: cost,
            estimated_selectivity: selectivity,
            estimated_cardinality,
            recommended_indexes,
            index_scan_recommended,
            optimizations,
        }
    }
}

impl Default for CostBasedOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate the fraction of entities surviving one property filter.
fn estimate_selectivity(key: &str, value: &PropertyValue) -> f64 {
    if is_identifier_like(key, value) {
        return IDENTIFIER_SELECTIVITY;
    }
    let lower = key.to_ascii_lowercase();
    if CATEGORICAL_KEYS.contains(&lower.as_str()) {
        return CATEGORICAL_SELECTIVITY;
    }
    DEFAULT_SELECTIVITY
}

/// Identifier-like filters: the field name looks like a key, or the value
/// is an opaque high-cardinality token such as a GUID.
fn is_identifier_like(key: &str, value: &PropertyValue) -> bool {
    if key.to_ascii_lowercase().contains("id") {
        return true;
    }
    match value.as_string() {
        Some(s) => Uuid::parse_str(s).is_ok(),
        None => false,
    }
}
