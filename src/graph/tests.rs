#[cfg(test)]
mod tests {
    use crate::graph::{END, FnStep, GraphError, GraphState, StateGraph, Step};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Pair {
        a: i32,
        b: i32,
        items: Vec<i32>,
    }

    #[derive(Debug, Default)]
    struct PairUpdate {
        a: Option<i32>,
        b: Option<i32>,
        items: Option<Vec<i32>>,
    }

    impl GraphState for Pair {
        type Update = PairUpdate;

        fn apply(&mut self, update: PairUpdate) {
            if let Some(a) = update.a {
                self.a = a;
            }
            if let Some(b) = update.b {
                self.b = b;
            }
            if let Some(items) = update.items {
                self.items = items;
            }
        }
    }

    /// 记录执行顺序的步骤
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Step<Pair> for Recorder {
        async fn run(&self, _state: &Pair) -> PairUpdate {
            self.log.lock().unwrap().push(self.name.to_string());
            PairUpdate::default()
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Recorder {
        Recorder {
            name,
            log: Arc::clone(log),
        }
    }

    #[tokio::test]
    async fn test_merge_is_field_level_last_write_wins() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step(
                "set_b",
                FnStep(|_: &Pair| PairUpdate {
                    b: Some(3),
                    ..Default::default()
                }),
            )
            .unwrap();
        graph.set_entry_point("set_b").connect("set_b", END);

        let state = graph
            .run(Pair {
                a: 1,
                b: 2,
                items: vec![],
            })
            .await
            .unwrap();

        assert_eq!(state.a, 1);
        assert_eq!(state.b, 3);
    }

    #[tokio::test]
    async fn test_sequence_update_replaces_instead_of_appending() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step(
                "first",
                FnStep(|_: &Pair| PairUpdate {
                    items: Some(vec![1, 2]),
                    ..Default::default()
                }),
            )
            .unwrap()
            .add_step(
                "second",
                FnStep(|_: &Pair| PairUpdate {
                    items: Some(vec![9]),
                    ..Default::default()
                }),
            )
            .unwrap();
        graph
            .set_entry_point("first")
            .connect("first", "second")
            .connect("second", END);

        let state = graph.run(Pair::default()).await.unwrap();
        assert_eq!(state.items, vec![9]);
    }

    #[tokio::test]
    async fn test_runs_in_edge_order_not_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("analyze", recorder("analyze", &log))
            .unwrap()
            .add_step("extract", recorder("extract", &log))
            .unwrap()
            .add_step("research", recorder("research", &log))
            .unwrap();
        graph
            .set_entry_point("extract")
            .connect("extract", "research")
            .connect("research", "analyze")
            .connect("analyze", END);

        graph.run(Pair::default()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["extract", "research", "analyze"]
        );
    }

    #[tokio::test]
    async fn test_missing_edge_ends_the_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("one", recorder("one", &log))
            .unwrap()
            .add_step("two", recorder("two", &log))
            .unwrap()
            .add_step("three", recorder("three", &log))
            .unwrap();
        // "two" 没有出边，"three" 永远不会被执行
        graph.set_entry_point("one").connect("one", "two");

        graph.run(Pair::default()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_explicit_end_edge_stops_immediately() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("only", recorder("only", &log))
            .unwrap()
            .add_step("unreached", recorder("unreached", &log))
            .unwrap();
        graph.set_entry_point("only").connect("only", END);

        graph.run(Pair::default()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["only"]);
    }

    #[tokio::test]
    async fn test_steps_see_previous_updates() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step(
                "set_a",
                FnStep(|_: &Pair| PairUpdate {
                    a: Some(10),
                    ..Default::default()
                }),
            )
            .unwrap()
            .add_step(
                "double_a_into_b",
                FnStep(|state: &Pair| PairUpdate {
                    b: Some(state.a * 2),
                    ..Default::default()
                }),
            )
            .unwrap();
        graph
            .set_entry_point("set_a")
            .connect("set_a", "double_a_into_b");

        let state = graph.run(Pair::default()).await.unwrap();
        assert_eq!(state, Pair { a: 10, b: 20, items: vec![] });
    }

    #[test]
    fn test_duplicate_step_name_is_rejected() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("extract", FnStep(|_: &Pair| PairUpdate::default()))
            .unwrap();

        let err = graph
            .add_step("extract", FnStep(|_: &Pair| PairUpdate::default()))
            .err();
        assert_eq!(err, Some(GraphError::DuplicateStep("extract".to_string())));
    }

    #[test]
    fn test_terminal_marker_is_not_a_step_name() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        let err = graph
            .add_step(END, FnStep(|_: &Pair| PairUpdate::default()))
            .err();
        assert_eq!(err, Some(GraphError::ReservedName(END.to_string())));
    }

    #[test]
    fn test_second_edge_from_same_step_overwrites_first() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("a", FnStep(|_: &Pair| PairUpdate::default()))
            .unwrap()
            .add_step("b", FnStep(|_: &Pair| PairUpdate::default()))
            .unwrap()
            .add_step("c", FnStep(|_: &Pair| PairUpdate::default()))
            .unwrap();
        graph.set_entry_point("a").connect("a", "b").connect("a", "c");

        assert_eq!(graph.execution_order().unwrap(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_missing_entry_point() {
        let graph: StateGraph<Pair> = StateGraph::new();
        let err = graph.run(Pair::default()).await.unwrap_err();
        assert_eq!(err, GraphError::MissingEntryPoint);
    }

    #[tokio::test]
    async fn test_unknown_step_is_reported_before_anything_runs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph.add_step("first", recorder("first", &log)).unwrap();
        graph.set_entry_point("first").connect("first", "ghost");

        let err = graph.run(Pair::default()).await.unwrap_err();
        assert_eq!(err, GraphError::UnknownStep("ghost".to_string()));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cycle_is_rejected_before_anything_runs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("ping", recorder("ping", &log))
            .unwrap()
            .add_step("pong", recorder("pong", &log))
            .unwrap();
        graph
            .set_entry_point("ping")
            .connect("ping", "pong")
            .connect("pong", "ping");

        let err = graph.run(Pair::default()).await.unwrap_err();
        assert_eq!(err, GraphError::Cycle("ping".to_string()));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_timed_records_each_step() {
        let mut graph: StateGraph<Pair> = StateGraph::new();
        graph
            .add_step("x", FnStep(|_: &Pair| PairUpdate::default()))
            .unwrap()
            .add_step("y", FnStep(|_: &Pair| PairUpdate::default()))
            .unwrap();
        graph.set_entry_point("x").connect("x", "y").connect("y", END);

        let (_state, timing) = graph.run_timed(Pair::default()).await.unwrap();
        assert_eq!(timing.phases(), vec!["x", "y"]);
    }
}
