//! # Checklist Scenarios
//!
//! Full evaluations through `Evaluator::evaluate` with stub oracles.

mod common;

use common::{Checklist, RO, StubLiveness, evaluator, research_object};
use minim_core::{Graph, Level, SatisfactionLevel, Status, Term};
use minim_eval::{EvaluationError, EvaluationRequest, Evaluator};
use std::sync::Arc;

const ALL_LEVELS: [SatisfactionLevel; 3] = [
    SatisfactionLevel::MinimallySatisfies,
    SatisfactionLevel::NominallySatisfies,
    SatisfactionLevel::FullySatisfies,
];

async fn evaluate(
    evaluator: &Evaluator,
    artifact: Graph,
    constraints: Graph,
) -> Result<minim_core::EvaluationResult, EvaluationError> {
    let constraints = evaluator.load_constraints(&[constraints])?;
    let request = EvaluationRequest::new(Arc::new(artifact), constraints, RO, "Runnable");
    evaluator.evaluate(request).await
}

fn readme_checklist() -> Graph {
    Checklist::new("Runnable")
        .requirement(
            "Must",
            "readme",
            &[
                (
                    "exists",
                    Term::literal("?targetro ore:aggregates <http://example.org/ro/README>"),
                ),
                ("showpass", Term::literal("README present")),
                ("showfail", Term::literal("No README in %(targetro)s")),
            ],
        )
        .build()
}

// =============================================================================
// SCENARIOS A-C
// =============================================================================

mod scenario_a_b_c {
    use super::*;

    /// A: one MUST Exists rule matching once satisfies every level.
    #[tokio::test]
    async fn must_exists_matching() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&["README"]), readme_checklist())
            .await
            .expect("evaluate");

        assert_eq!(result.summary, ALL_LEVELS.to_vec());
        assert!(result.missing_must.is_empty());
        assert!(result.missing_should.is_empty());
        assert!(result.missing_may.is_empty());
        assert_eq!(result.items[0].message, "README present");
    }

    /// B: the same MUST rule matching nothing satisfies nothing.
    #[tokio::test]
    async fn must_exists_not_matching() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&["data.csv"]), readme_checklist())
            .await
            .expect("evaluate");

        assert!(result.summary.is_empty());
        assert_eq!(result.missing_must.len(), 1);
        assert_eq!(result.missing_must[0].message, format!("No README in {RO}"));
    }

    /// C: a SHOULD ForEach rule with one dead resource out of two.
    #[tokio::test]
    async fn should_foreach_with_dead_resource() {
        let dead = format!("{RO}gone.csv");
        let liveness = Arc::new(StubLiveness::with_dead(&[dead.as_str()]));
        let constraints = Checklist::new("Runnable")
            .requirement(
                "Should",
                "live_files",
                &[
                    ("query", Term::literal("?targetro ore:aggregates ?file")),
                    ("isLiveTemplate", Term::literal("{+file}")),
                    ("showfail", Term::literal("%(file)s is not accessible")),
                ],
            )
            .build();

        let result = evaluate(
            &evaluator(Arc::clone(&liveness)),
            research_object(&["data.csv", "gone.csv"]),
            constraints,
        )
        .await
        .expect("evaluate");

        assert_eq!(result.items[0].status, Status::Fail);
        assert_eq!(result.summary, vec![SatisfactionLevel::MinimallySatisfies]);
        assert_eq!(result.missing_should.len(), 1);
        assert!(
            result.missing_should[0]
                .message
                .starts_with(&format!("{dead} is not accessible"))
        );
        assert_eq!(liveness.calls(), 2);
    }
}

// =============================================================================
// NOMATCH
// =============================================================================

mod no_match {
    use super::*;

    fn foreach_checklist(min: Option<u64>) -> Graph {
        let mut properties = vec![
            ("query", Term::literal("?targetro ore:aggregates ?file")),
            ("showmiss", Term::literal("No files aggregated")),
        ];
        if let Some(min) = min {
            properties.push(("min", Term::integer(min)));
        }
        Checklist::new("Runnable")
            .requirement("Must", "files", &properties)
            .build()
    }

    /// Zero matches without a minimum is informational.
    #[tokio::test]
    async fn zero_matches_without_min() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&[]), foreach_checklist(None))
            .await
            .expect("evaluate");

        assert_eq!(result.items[0].status, Status::NoMatch);
        assert_eq!(result.summary, ALL_LEVELS.to_vec());
        assert!(result.missing(Level::Must).is_empty());
        assert_eq!(result.items[0].message, "No files aggregated");
    }

    /// Zero matches against `min = 1` is a failure.
    #[tokio::test]
    async fn zero_matches_with_min() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&[]), foreach_checklist(Some(1)))
            .await
            .expect("evaluate");

        assert_eq!(result.items[0].status, Status::Fail);
        assert!(result.summary.is_empty());
        assert_eq!(result.missing_must.len(), 1);
        assert_eq!(result.missing_must[0].message, "No files aggregated");
    }
}

// =============================================================================
// ROBUSTNESS
// =============================================================================

mod robustness {
    use super::*;

    /// Same inputs, same result.
    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let first = evaluate(&evaluator, research_object(&["README"]), readme_checklist())
            .await
            .expect("evaluate");
        let second = evaluate(&evaluator, research_object(&["README"]), readme_checklist())
            .await
            .expect("evaluate");
        assert_eq!(first, second);
    }

    /// A malformed pattern fails its own requirement only.
    #[tokio::test]
    async fn malformed_pattern_is_isolated() {
        let constraints = Checklist::new("Runnable")
            .requirement("May", "broken", &[("exists", Term::literal("?targetro ore:aggregates"))])
            .requirement(
                "Must",
                "readme",
                &[(
                    "exists",
                    Term::literal("?targetro ore:aggregates <http://example.org/ro/README>"),
                )],
            )
            .build();
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&["README"]), constraints)
            .await
            .expect("evaluate");

        assert_eq!(result.items[0].status, Status::Fail);
        assert_eq!(result.items[1].status, Status::Pass);
        assert_eq!(
            result.summary,
            vec![
                SatisfactionLevel::MinimallySatisfies,
                SatisfactionLevel::NominallySatisfies
            ]
        );
        assert!(result.missing_may[0].message.contains("query failed"));
    }

    /// A rule mixing kinds is reported as a failed requirement.
    #[tokio::test]
    async fn rejected_rule_fails_its_requirement() {
        let constraints = Checklist::new("Runnable")
            .requirement(
                "Should",
                "mixed",
                &[
                    ("command", Term::literal("python --version")),
                    ("query", Term::literal("?s ?p ?o")),
                ],
            )
            .build();
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&[]), constraints)
            .await
            .expect("evaluate");

        assert_eq!(result.summary, vec![SatisfactionLevel::MinimallySatisfies]);
        assert!(result.missing_should[0].message.contains("rule rejected"));
    }

    /// Command rules go through the environment oracle.
    #[tokio::test]
    async fn command_rule_uses_environment() {
        let constraints = Checklist::new("Runnable")
            .requirement(
                "Must",
                "python",
                &[
                    ("command", Term::literal("python --version")),
                    ("response", Term::literal(r"^Python 3\.")),
                    ("showpass", Term::literal("Found %(output)s")),
                ],
            )
            .build();
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&[]), constraints)
            .await
            .expect("evaluate");

        assert_eq!(result.summary, ALL_LEVELS.to_vec());
        assert_eq!(result.items[0].message, "Found Python 3.12.1");
    }

    /// Live resources must also satisfy the sub-pattern.
    #[tokio::test]
    async fn live_resources_without_sub_pattern_match_fail() {
        let constraints = Checklist::new("Runnable")
            .requirement(
                "Must",
                "titled_files",
                &[
                    ("query", Term::literal("?targetro ore:aggregates ?file")),
                    ("isLiveTemplate", Term::literal("{+file}")),
                    ("exists", Term::literal("?file <http://example.org/title> ?t")),
                ],
            )
            .build();
        let liveness = Arc::new(StubLiveness::default());
        let result = evaluate(
            &evaluator(Arc::clone(&liveness)),
            research_object(&["data.csv"]),
            constraints,
        )
        .await
        .expect("evaluate");

        assert_eq!(result.items[0].status, Status::Fail);
        assert!(result.summary.is_empty());
        assert_eq!(result.missing_must.len(), 1);
        assert_eq!(liveness.calls(), 1);
    }

    /// Worker counts outside the semaphore range still evaluate.
    #[tokio::test(start_paused = true)]
    async fn out_of_range_workers_still_evaluate() {
        for workers in [0, usize::MAX] {
            let config = minim_eval::EvalConfig {
                workers,
                ..minim_eval::EvalConfig::default()
            };
            let evaluator = common::evaluator_with(config, Arc::new(StubLiveness::default()));
            let result = evaluate(&evaluator, research_object(&["README"]), readme_checklist())
                .await
                .expect("evaluate");
            assert_eq!(result.items[0].status, Status::Pass);
            assert_eq!(result.summary, ALL_LEVELS.to_vec());
        }
    }

    /// Unknown purpose is the only fatal outcome.
    #[tokio::test]
    async fn unknown_purpose_is_fatal() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let constraints = evaluator
            .load_constraints(&[readme_checklist()])
            .expect("load");
        let request = EvaluationRequest::new(
            Arc::new(research_object(&["README"])),
            constraints,
            RO,
            "Archival",
        );
        assert!(matches!(
            evaluator.evaluate(request).await,
            Err(EvaluationError::Configuration(_))
        ));
    }

    /// Results serialize with camelCase labels.
    #[tokio::test]
    async fn result_serializes_to_json() {
        let evaluator = evaluator(Arc::new(StubLiveness::default()));
        let result = evaluate(&evaluator, research_object(&[]), readme_checklist())
            .await
            .expect("evaluate");
        let json = serde_json::to_value(&result).expect("json");

        assert_eq!(json["summary"], serde_json::json!([]));
        assert_eq!(json["missingMust"][0]["level"], "MUST");
        assert_eq!(json["items"][0]["status"], "FAIL");
    }
}
