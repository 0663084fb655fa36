//! Attribute predicates and the conjunctive query builder.
//!
//! The Search API wire format is a tree of nodes: a lone predicate is a
//! `terminal` node against the `text` service; two or more predicates are
//! wrapped in a `group` node with `logical_operator: "and"`. Conjunction is
//! order-insensitive in effect, so `Query` equality treats predicates as a
//! set — two surveys built from the same predicates in any order are the
//! same survey.

use serde::Serialize;
use serde_json::Value;

const EC_LINEAGE_ATTR: &str = "rcsb_polymer_entity.rcsb_ec_lineage.id";
const FORMULA_WEIGHT_ATTR: &str = "chem_comp.formula_weight";

/// Comparison operator for an attribute predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    ExactMatch,
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    fn wire(self) -> &'static str {
        match self {
            Comparison::ExactMatch => "exact_match",
            Comparison::GreaterOrEqual => "greater_or_equal",
            Comparison::LessOrEqual => "less_or_equal",
        }
    }
}

/// One attribute predicate: path, operator, literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub attribute: String,
    pub operator: Comparison,
    pub value: Value,
}

impl Predicate {
    pub fn new(attribute: &str, operator: Comparison, value: Value) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator,
            value,
        }
    }

    /// Enzyme Commission lineage exact match, e.g. `3.4.21.4`.
    /// Matches entries anywhere under the given EC node.
    pub fn ec_lineage(ec_number: &str) -> Self {
        Self::new(EC_LINEAGE_ATTR, Comparison::ExactMatch, Value::from(ec_number))
    }

    /// Lower bound on the formula weight of a bound chemical component.
    pub fn ligand_weight_min(dalton: f64) -> Self {
        Self::new(FORMULA_WEIGHT_ATTR, Comparison::GreaterOrEqual, Value::from(dalton))
    }

    /// Upper bound on the formula weight of a bound chemical component.
    pub fn ligand_weight_max(dalton: f64) -> Self {
        Self::new(FORMULA_WEIGHT_ATTR, Comparison::LessOrEqual, Value::from(dalton))
    }
}

/// Identifier space a query result is projected into.
///
/// Submitting the same query under both projections yields two views of the
/// same structural population: the matching entries, and the chemical
/// components those entries bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// 4-character PDB entry codes.
    Entry,
    /// 1-3 character chemical-component codes.
    MolDefinition,
}

impl ReturnType {
    pub fn wire(self) -> &'static str {
        match self {
            ReturnType::Entry => "entry",
            ReturnType::MolDefinition => "mol_definition",
        }
    }
}

/// A conjunction of attribute predicates.
#[derive(Debug, Clone, Default)]
pub struct Query {
    predicates: Vec<Predicate>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate to the conjunction.
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Builds the POST body for the given projection.
    pub(crate) fn to_request(&self, return_type: ReturnType) -> SearchRequest {
        let terminals: Vec<TerminalNode> =
            self.predicates.iter().map(TerminalNode::from_predicate).collect();

        let query = if terminals.len() == 1 {
            QueryNode::Terminal(terminals.into_iter().next().unwrap())
        } else {
            QueryNode::Group(GroupNode {
                node_type: "group",
                logical_operator: "and",
                nodes: terminals,
            })
        };

        SearchRequest {
            query,
            return_type: return_type.wire(),
            request_options: RequestOptions { return_all_hits: true },
        }
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        if self.predicates.len() != other.predicates.len() {
            return false;
        }
        // Order-insensitive multiset comparison
        let mut remaining: Vec<&Predicate> = other.predicates.iter().collect();
        for p in &self.predicates {
            match remaining.iter().position(|q| *q == p) {
                Some(i) => {
                    remaining.swap_remove(i);
                }
                None => return false,
            }
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest {
    query: QueryNode,
    return_type: &'static str,
    request_options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    return_all_hits: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum QueryNode {
    Terminal(TerminalNode),
    Group(GroupNode),
}

#[derive(Debug, Serialize)]
struct TerminalNode {
    #[serde(rename = "type")]
    node_type: &'static str,
    service: &'static str,
    parameters: TerminalParams,
}

impl TerminalNode {
    fn from_predicate(p: &Predicate) -> Self {
        Self {
            node_type: "terminal",
            service: "text",
            parameters: TerminalParams {
                attribute: p.attribute.clone(),
                operator: p.operator.wire(),
                value: p.value.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct TerminalParams {
    attribute: String,
    operator: &'static str,
    value: Value,
}

#[derive(Debug, Serialize)]
struct GroupNode {
    #[serde(rename = "type")]
    node_type: &'static str,
    logical_operator: &'static str,
    nodes: Vec<TerminalNode>,
}
