//! Property tests: a visualized run and a headless run of the same request
//! agree on the final data and the result.

use algoviz_engine::{
    AlgoResult, AlgorithmId, AlgorithmKind, EngineConfig, Outcome, RunReport, RunRequest, Session,
    VisEvent, VisualModel,
};
use proptest::prelude::*;

fn run(request: RunRequest) -> (RunReport, Vec<VisEvent>) {
    let mut session = Session::new(EngineConfig::instant());
    let stream = session.start_run(request).expect("request is valid");
    let events = stream.collect_blocking();
    let report = session.finish().expect("a run was started");
    (report, events)
}

fn arb_algorithm() -> impl Strategy<Value = AlgorithmId> {
    proptest::sample::select(AlgorithmId::ALL.to_vec())
}

fn arb_request() -> impl Strategy<Value = RunRequest> {
    (
        arb_algorithm(),
        proptest::collection::vec(0i64..100, 1..24),
        0i64..100,
    )
        .prop_map(|(algorithm, mut values, target)| {
            if algorithm == AlgorithmId::BinarySearch {
                values.sort_unstable();
            }
            let request = RunRequest::new(algorithm, values);
            match algorithm.kind() {
                AlgorithmKind::Search => request.with_target(target),
                AlgorithmKind::Sort => request,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn visualize_flag_never_changes_the_answer(request in arb_request()) {
        let (visual, _) = run(request.clone().visualize(true));
        let (headless, _) = run(request.clone().visualize(false));

        prop_assert_eq!(&visual.values, &headless.values);
        prop_assert_eq!(&visual.outcome, &headless.outcome);
        prop_assert_eq!(visual.stats.comparisons, headless.stats.comparisons);
        prop_assert_eq!(headless.stats.steps, 0);
    }

    #[test]
    fn sorts_agree_with_std(values in proptest::collection::vec(-50i64..50, 1..32)) {
        let mut expected = values.clone();
        expected.sort_unstable();
        for algorithm in AlgorithmId::ALL {
            if algorithm.kind() != AlgorithmKind::Sort || algorithm == AlgorithmId::RadixSort {
                continue;
            }
            let (report, _) = run(RunRequest::new(algorithm, values.clone()).visualize(false));
            prop_assert_eq!(&report.values, &expected, "{}", algorithm);
        }
    }

    #[test]
    fn searches_report_a_matching_index(request in arb_request()) {
        prop_assume!(request.algorithm.kind() == AlgorithmKind::Search);
        let target = request.target.unwrap_or_default();
        let (report, _) = run(request.clone());

        match report.outcome {
            Outcome::Completed { result: AlgoResult::Found { index } } => {
                prop_assert_eq!(request.values[index], target);
            }
            Outcome::Completed { result: AlgoResult::NotFound } => {
                prop_assert!(!request.values.contains(&target));
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn model_replay_matches_final_data(request in arb_request()) {
        prop_assume!(request.algorithm.kind() == AlgorithmKind::Sort);
        let (report, events) = run(request);
        let model = VisualModel::from_events(&events);
        prop_assert_eq!(model.values(), report.values);
    }
}
