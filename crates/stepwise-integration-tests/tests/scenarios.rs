//! End-to-end scenarios: generate a log, then play or project it.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use stepwise_algorithms::{
    is_heap, sort, Avl, Bst, Graph, Heap, HeapAction, HeapOrder, Request, SortAlgorithm,
    Structures,
};
use stepwise_integration_tests::{all_tagged, final_state, frames, rotations};
use stepwise_playback::{
    project, Controller, Phase, PlaybackConfig, PlaybackEvent, Player, Transport,
};
use stepwise_trace::{StepKind, Tag, Target};

#[test]
fn bubble_sort_three_elements() {
    let run = sort(SortAlgorithm::Bubble, &[3, 1, 2]);

    assert_eq!(run.log.count(StepKind::Compare), 3);
    assert!(run.log.count(StepKind::Swap) >= 1);

    let end = final_state(&run.log).unwrap();
    assert_eq!(end.array(), Some(&[1, 2, 3][..]));
    assert!(all_tagged(&end, 3, Tag::Sorted));
}

#[test]
fn bst_search_hits_after_three_compares() {
    let tree = Bst::build(&[50, 30, 70, 20, 40]).output;
    let run = tree.search(40);
    let node = tree.shape().find(40).unwrap();

    let steps = run.log.steps();
    let (last, before) = steps.split_last().unwrap();
    assert_eq!(last.tag, Tag::Found);
    assert_eq!(last.targets, vec![Target::Node(node)]);

    let compared: Vec<&str> = before
        .iter()
        .filter(|s| s.kind == StepKind::Compare)
        .map(|s| s.description.as_str())
        .collect();
    assert_eq!(compared.len(), 3);
    for (description, value) in compared.iter().zip([50, 30, 40]) {
        assert!(description.contains(&format!("with {value}")), "{description}");
    }

    let end = final_state(&run.log).unwrap();
    assert_eq!(end.tag_of(Target::Node(node)), Tag::Found);
}

#[test]
fn avl_ascending_insert_rotates_once() {
    let run = Avl::build(&[10, 20, 30]);
    assert_eq!(rotations(&run.log), 1);

    let end = final_state(&run.log).unwrap();
    assert_eq!(end.tree().and_then(|t| t.root_value()), Some(20));
}

#[test]
fn max_heap_extract() {
    let heap = Heap::build(HeapOrder::Max, &[90, 80, 70, 60, 50, 40, 30]).output;
    let run = heap.extract();

    assert_eq!(run.output.value, Some(90));
    let end = final_state(&run.log).unwrap();
    let items = end.array().unwrap();
    assert_eq!(items.first(), Some(&80));
    assert!(is_heap(HeapOrder::Max, items));
    assert!(!items.contains(&90));
}

#[test]
fn bfs_visits_a_first_and_f_last() {
    let graph = Graph::sample();
    let run = graph.bfs("A", None);

    let visited: Vec<u32> = run
        .log
        .steps()
        .iter()
        .filter(|s| s.tag == Tag::Visited)
        .filter_map(|s| match s.targets.first() {
            Some(Target::Vertex(v)) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(visited.first(), graph.vertex("A").as_ref());
    assert_eq!(visited.last(), graph.vertex("F").as_ref());
    assert_eq!(visited.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn speed_change_mid_playback_advances_one_step_per_tick() {
    let values: Vec<i64> = (0..10).rev().collect();
    let log = sort(SortAlgorithm::Insertion, &values).log;
    let (player, _task) = Player::spawn(PlaybackConfig::default(), log);
    let mut events = player.subscribe();

    player.set_speed(3.0).await.unwrap();
    player.play().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    player.set_speed(0.1).await.unwrap();
    tokio::time::sleep(Duration::from_secs(25)).await;
    let status = player.pause().await.unwrap();

    let mut cursors = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PlaybackEvent::Frame(frame) = event {
            cursors.push(frame.cursor);
        }
    }
    let expected: Vec<usize> = (1..=cursors.len()).collect();
    assert_eq!(cursors, expected);
    assert_eq!(status.current_step, cursors.len());
    // 3 fast ticks, the one already scheduled, then two 10 s ticks
    assert_eq!(cursors.len(), 6);
}

#[test]
fn replay_is_symmetric() {
    let run = sort(SortAlgorithm::Heap, &[4, 7, 1, 9, 3, 3, 8]);
    let expected = frames(&run.log).unwrap();
    let mut controller = Controller::new(Arc::new(run.log));

    for frame in &expected[1..] {
        controller.step_forward();
        assert_eq!(&controller.visual_state().unwrap(), frame);
    }
    for frame in expected.iter().rev().skip(1) {
        controller.step_backward();
        assert_eq!(&controller.visual_state().unwrap(), frame);
    }
    assert_eq!(controller.state().cursor(), 0);
}

#[test]
fn seeking_does_not_depend_on_history() {
    let run = Avl::build(&[5, 3, 8, 1, 4, 7, 9, 2, 6]);
    let total = run.log.len();
    let mut controller = Controller::new(Arc::new(run.log.clone()));

    controller.skip_to_end();
    for _ in 0..total / 2 {
        controller.step_backward();
    }
    let direct = project(&run.log, total - total / 2).unwrap();
    assert_eq!(controller.visual_state().unwrap(), direct);
}

#[test]
fn failed_log_plays_one_step() {
    let run = Structures::default().run(&Request::Heap {
        action: HeapAction::Extract,
    });
    assert!(run.log.is_failed());

    let mut controller = Controller::new(Arc::new(run.log));
    controller.play();
    controller.apply(Transport::Tick);
    assert_eq!(controller.state().phase(), Phase::Complete);
    let visual = controller.visual_state().unwrap();
    assert!(visual
        .description
        .as_deref()
        .is_some_and(|d| d.contains("empty heap")));
}

fn heap_op() -> impl Strategy<Value = Option<i64>> {
    prop::option::weighted(0.7, -50i64..50)
}

proptest! {
    #[test]
    fn replaying_heap_logs_keeps_heap_order(
        seed in prop::collection::vec(-50i64..50, 0..12),
        ops in prop::collection::vec(heap_op(), 1..25),
        max in any::<bool>(),
    ) {
        let order = if max { HeapOrder::Max } else { HeapOrder::Min };
        let mut heap = Heap::build(order, &seed).output;

        for op in ops {
            let (log, next) = match op {
                Some(value) => {
                    let run = heap.insert(value);
                    (run.log, run.output)
                }
                None => {
                    let run = heap.extract();
                    (run.log, run.output.structure)
                }
            };
            let end = final_state(&log).unwrap();
            prop_assert_eq!(end.array(), Some(next.items()));
            prop_assert!(is_heap(order, next.items()));
            heap = next;
        }
    }

    #[test]
    fn sort_replay_matches_output(
        values in prop::collection::vec(-100i64..100, 0..24),
        which in 0usize..6,
    ) {
        let algorithm = SortAlgorithm::ALL[which];
        let run = sort(algorithm, &values);
        let mut expected = values.clone();
        expected.sort();

        prop_assert_eq!(&run.output, &expected);
        let end = final_state(&run.log).unwrap();
        prop_assert_eq!(end.array(), Some(expected.as_slice()));
    }

    #[test]
    fn projection_is_pure(
        values in prop::collection::vec(-20i64..20, 0..10),
        cursor in 0usize..200,
    ) {
        let run = sort(SortAlgorithm::Merge, &values);
        let cursor = cursor.min(run.log.len());
        prop_assert_eq!(project(&run.log, cursor).unwrap(), project(&run.log, cursor).unwrap());
    }
}
