//! Ranked substitute search for an out-of-stock product.

use crate::graph::{discover_products, Graph};
use crate::search::constraints::satisfies_product;
use crate::search::scoring::{explain_products, score_products};
use crate::search::{Alternative, Outcome, Query, MAX_ALTERNATIVES};

/// Find up to [`MAX_ALTERNATIVES`] in-stock substitutes for `requested`.
///
/// Unknown ids yield an empty list; an in-stock product yields
/// [`Outcome::InStock`] without searching.
pub fn find_alternatives(
    graph: &Graph,
    requested: &str,
    max_price: f64,
    required_tags: &[String],
    preferred_brand: Option<&str>,
) -> Outcome {
    Finder::new(graph).find_with(requested, max_price, required_tags, preferred_brand)
}

/// Query runner over a shared, read-only graph.
#[derive(Debug, Clone, Copy)]
pub struct Finder<'g> {
    graph: &'g Graph,
    limit: usize,
}

impl<'g> Finder<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            limit: MAX_ALTERNATIVES,
        }
    }

    /// Cap the number of ranked alternatives returned, never above [`MAX_ALTERNATIVES`].
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_ALTERNATIVES);
        self
    }

    /// Run a [`Query`], defaulting the price ceiling to the requested product's price.
    pub fn find(&self, query: &Query) -> Outcome {
        let max_price = match query.max_price {
            Some(p) => p,
            None => match self.graph.product(&query.product_id) {
                Some(p) => p.price,
                None => return Outcome::Alternatives(Vec::new()),
            },
        };
        self.find_with(
            &query.product_id,
            max_price,
            &query.required_tags,
            query.preferred_brand.as_deref(),
        )
    }

    pub fn find_with(
        &self,
        requested: &str,
        max_price: f64,
        required_tags: &[String],
        preferred_brand: Option<&str>,
    ) -> Outcome {
        let req = match self.graph.product(requested) {
            Some(p) => p,
            None => {
                log::debug!("Requested product {} not in graph", requested);
                return Outcome::Alternatives(Vec::new());
            }
        };

        if req.in_stock {
            return Outcome::InStock {
                product_id: req.id.clone(),
            };
        }

        let candidates = match discover_products(self.graph, requested) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Discovery failed for {}: {}", requested, e);
                return Outcome::Alternatives(Vec::new());
            }
        };
        let discovered = candidates.len();

        let mut ranked: Vec<Alternative> = candidates
            .into_iter()
            .filter_map(|id| self.graph.product(id))
            .filter(|cand| satisfies_product(cand, max_price, required_tags, preferred_brand))
            .map(|cand| Alternative {
                product_id: cand.id.clone(),
                score: score_products(self.graph, req, cand),
                rules: explain_products(req, cand, required_tags)
                    .iter()
                    .map(|r| r.label().to_string())
                    .collect(),
            })
            .collect();
        let accepted = ranked.len();

        // Stable: equal scores keep discovery order.
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.limit);

        log::debug!(
            "Query {}: {} discovered, {} passed constraints, {} returned",
            requested,
            discovered,
            accepted,
            ranked.len()
        );

        Outcome::Alternatives(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::ingest::ProductRecord;

    fn product(
        id: &str,
        category: &str,
        brand: &str,
        price: f64,
        in_stock: bool,
        tags: &[&str],
    ) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            category: category.to_string(),
            brand: brand.to_string(),
            price,
            in_stock,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn graph_of(products: Vec<ProductRecord>) -> Graph {
        let mut builder = GraphBuilder::new();
        for p in products {
            builder.add_product(p);
        }
        builder.finish()
    }

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|t| t.to_string()).collect()
    }

    fn shoes() -> Graph {
        graph_of(vec![
            product("A", "shoes", "X", 50.0, false, &["running"]),
            product("B", "shoes", "X", 40.0, true, &["running", "light"]),
            product("C", "shoes", "Y", 60.0, true, &["running"]),
        ])
    }

    fn ranked(outcome: Outcome) -> Vec<Alternative> {
        match outcome {
            Outcome::Alternatives(list) => list,
            other => panic!("expected alternatives, got {:?}", other),
        }
    }

    #[test]
    fn test_shoes_scenario() {
        let graph = shoes();
        let results = ranked(find_alternatives(&graph, "A", 100.0, &tags(&["running"]), None));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].product_id, "B");
        assert_eq!(results[0].score, 5);
        assert_eq!(
            results[0].rules,
            vec!["Same Category", "All tags matched", "Cheaper than original", "Same brand"]
        );
        assert_eq!(results[1].product_id, "C");
        assert_eq!(results[1].score, 3);
        assert_eq!(
            results[1].rules,
            vec!["Same Category", "All tags matched", "Different brand"]
        );
    }

    #[test]
    fn test_in_stock_short_circuits() {
        let graph = shoes();
        let outcome = find_alternatives(&graph, "B", 0.0, &tags(&["nothing-has-this"]), Some("Q"));
        assert_eq!(
            outcome,
            Outcome::InStock {
                product_id: "B".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_product_is_empty() {
        let graph = shoes();
        let outcome = find_alternatives(&graph, "Z", 100.0, &[], None);
        assert_eq!(outcome, Outcome::Alternatives(Vec::new()));
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_category_name_is_not_a_product() {
        let graph = shoes();
        assert!(find_alternatives(&graph, "shoes", 100.0, &[], None).is_empty());
    }

    #[test]
    fn test_price_ceiling_excludes_candidate() {
        let graph = shoes();
        let results = ranked(find_alternatives(&graph, "A", 55.0, &[], None));
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn test_brand_preference_filters() {
        let graph = shoes();
        let results = ranked(find_alternatives(&graph, "A", 100.0, &[], Some("Y")));
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C"]);

        let results = ranked(find_alternatives(&graph, "A", 100.0, &[], Some("")));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_required_tags_filter() {
        let graph = shoes();
        let results = ranked(find_alternatives(&graph, "A", 100.0, &tags(&["light"]), None));
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn test_out_of_stock_candidates_skipped() {
        let graph = graph_of(vec![
            product("A", "shoes", "X", 50.0, false, &[]),
            product("B", "shoes", "X", 40.0, false, &[]),
            product("C", "shoes", "X", 45.0, true, &[]),
        ]);
        let results = ranked(find_alternatives(&graph, "A", 100.0, &[], None));
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C"]);
    }

    #[test]
    fn test_top_three_with_stable_ties() {
        // All candidates score 3 (same category, other brand, pricier); discovery
        // order through the category node is insertion order.
        let graph = graph_of(vec![
            product("A", "shoes", "X", 10.0, false, &[]),
            product("P1", "shoes", "Y", 20.0, true, &[]),
            product("P2", "shoes", "Y", 20.0, true, &[]),
            product("P3", "shoes", "Y", 20.0, true, &[]),
            product("P4", "shoes", "Y", 20.0, true, &[]),
            product("P5", "shoes", "X", 20.0, true, &[]),
        ]);
        let results = ranked(find_alternatives(&graph, "A", 100.0, &[], None));
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        // P5 scores 4 and moves to the front; ties keep P1, P2 order.
        assert_eq!(ids, vec!["P5", "P1", "P2"]);
        assert_eq!(results[0].score, 4);
        assert!(results[1..].iter().all(|a| a.score == 3));
    }

    #[test]
    fn test_ties_follow_discovery_order_not_input_order() {
        // E is listed before F, but A reaches F first (through t1, its earlier tag).
        // Both score 2: other category, same brand, cheaper.
        let graph = graph_of(vec![
            product("E", "hats", "X", 5.0, true, &["t2"]),
            product("A", "shoes", "X", 10.0, false, &["t1", "t2"]),
            product("F", "boots", "X", 5.0, true, &["t1"]),
        ]);
        let results = ranked(find_alternatives(&graph, "A", 100.0, &[], None));
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["F", "E"]);
        assert!(results.iter().all(|a| a.score == 2));
        assert_eq!(
            results[0].rules,
            vec!["Similar Category", "All tags matched", "Cheaper than original", "Same brand"]
        );
    }

    #[test]
    fn test_explanations_have_three_or_four_entries() {
        let graph = shoes();
        for required in [tags(&[]), tags(&["running"])] {
            let results = ranked(find_alternatives(&graph, "A", 100.0, &required, None));
            for alt in results {
                assert!((3..=4).contains(&alt.rules.len()), "{:?}", alt.rules);
                assert!(alt.score <= crate::search::MAX_SCORE);
            }
        }
    }

    #[test]
    fn test_query_defaults_max_price_to_requested_price() {
        let graph = shoes();
        // A costs 50: B (40) fits, C (60) does not.
        let outcome = Finder::new(&graph).find(&Query::new("A"));
        let ids: Vec<_> = ranked(outcome).into_iter().map(|a| a.product_id).collect();
        assert_eq!(ids, vec!["B".to_string()]);

        let outcome = Finder::new(&graph).find(&Query::new("A").max_price(60.0));
        assert_eq!(ranked(outcome).len(), 2);
    }

    #[test]
    fn test_query_unknown_product() {
        let graph = shoes();
        assert!(Finder::new(&graph).find(&Query::new("nope")).is_empty());
    }

    #[test]
    fn test_limit() {
        let graph = shoes();
        let finder = Finder::new(&graph).with_limit(1);
        let results = ranked(finder.find(&Query::new("A").max_price(100.0)));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_id, "B");
    }

    #[test]
    fn test_limit_never_exceeds_cap() {
        let graph = graph_of(vec![
            product("A", "shoes", "X", 10.0, false, &[]),
            product("P1", "shoes", "Y", 5.0, true, &[]),
            product("P2", "shoes", "Y", 5.0, true, &[]),
            product("P3", "shoes", "Y", 5.0, true, &[]),
            product("P4", "shoes", "Y", 5.0, true, &[]),
            product("P5", "shoes", "Y", 5.0, true, &[]),
        ]);
        let finder = Finder::new(&graph).with_limit(5);
        let results = ranked(finder.find(&Query::new("A").max_price(10.0)));
        assert_eq!(results.len(), MAX_ALTERNATIVES);
        let ids: Vec<_> = results.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_deterministic() {
        let graph = shoes();
        let first = find_alternatives(&graph, "A", 100.0, &[], None);
        let second = find_alternatives(&graph, "A", 100.0, &[], None);
        assert_eq!(first, second);
    }
}
