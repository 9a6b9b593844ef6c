use super::*;
use crate::content::testing::{Log, ScriptedContent, entries, new_log};
use crate::playable::composition::{Composition, Region};
use crate::playable::leaf::Leaf;
use crate::playable::timeline::Timeline;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn timeline_with(name: &str, duration: Duration, log: &Log) -> Timeline {
    let mut timeline = Timeline::new();
    timeline
        .push(Leaf::new(name).with_content(Box::new(ScriptedContent::new(name, duration, log))));
    timeline
}

/// Drain events until the session reports `Completed` or `Error`.
async fn collect_session(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx.recv().await.unwrap();
        let terminal = matches!(event, PlayerEvent::Completed | PlayerEvent::Error(_));
        events.push(event);
        if terminal {
            return events;
        }
    }
}

#[test]
fn rejects_zero_interval() {
    assert!(Player::new(Timeline::new(), Duration::ZERO).is_err());
}

#[tokio::test(start_paused = true)]
async fn completes_after_one_pass_without_wrapping() {
    let log = new_log();
    let mut player = Player::new(timeline_with("a", ms(2000), &log), ms(50)).unwrap();
    let mut rx = player.subscribe();

    player.play(PlayOptions::default()).await.unwrap();
    let events = collect_session(&mut rx).await;

    // 2000 ms at 50 ms per tick is exactly 40 ticks; completion lands before
    // the clock ever wraps, so no end-of-pass is reported.
    let progress = events
        .iter()
        .filter(|event| matches!(event, PlayerEvent::Progress(_)))
        .count();
    assert_eq!(progress, 40);
    assert_eq!(events.first(), Some(&PlayerEvent::Progress(ms(0))));
    assert_eq!(events.last(), Some(&PlayerEvent::Completed));
    assert!(!events.contains(&PlayerEvent::EndOfPass));
    assert_eq!(player.position(), Duration::ZERO);

    player.stop().await;
    assert!(!player.is_playing());
}

#[tokio::test(start_paused = true)]
async fn looping_emits_end_of_pass_each_wrap() {
    let log = new_log();
    let mut player = Player::new(timeline_with("a", ms(1000), &log), ms(500)).unwrap();
    let mut rx = player.subscribe();

    player.play(PlayOptions::looped()).await.unwrap();
    let mut wraps = 0;
    while wraps < 2 {
        if rx.recv().await.unwrap() == PlayerEvent::EndOfPass {
            wraps += 1;
        }
    }
    player.stop().await;
    assert!(!player.is_playing());

    if let Playable::Timeline(timeline) = &*player.root().lock().await {
        assert!(timeline.passes() >= 2);
    } else {
        panic!("root should still be a timeline");
    }
}

#[tokio::test(start_paused = true)]
async fn stop_preserves_position_and_replay_resumes() {
    let log = new_log();
    let mut player = Player::new(timeline_with("a", ms(5000), &log), ms(500)).unwrap();
    let mut rx = player.subscribe();

    player.play(PlayOptions::default()).await.unwrap();
    loop {
        if rx.recv().await.unwrap() == PlayerEvent::Progress(ms(1000)) {
            break;
        }
    }
    player.stop().await;
    assert_eq!(player.position(), ms(1000));

    // Stopping again is a no-op.
    player.stop().await;
    assert_eq!(player.position(), ms(1000));

    player.play(PlayOptions::default()).await.unwrap();
    assert_eq!(rx.recv().await.unwrap(), PlayerEvent::Progress(ms(1000)));
    player.stop().await;
}

#[tokio::test(start_paused = true)]
async fn seek_applies_to_the_next_session() {
    let log = new_log();
    let mut player = Player::new(timeline_with("a", ms(2000), &log), ms(500)).unwrap();
    let mut rx = player.subscribe();

    player.seek(ms(1000));
    player.play(PlayOptions::default()).await.unwrap();
    assert_eq!(
        collect_session(&mut rx).await,
        vec![
            PlayerEvent::Progress(ms(1000)),
            PlayerEvent::Progress(ms(1500)),
            PlayerEvent::Completed,
        ]
    );

    // An offset past the end wraps into the root's period instead of
    // clamping: 5000 into a 2000 ms root starts at 1000.
    player.seek(ms(5000));
    player.play(PlayOptions::default()).await.unwrap();
    assert_eq!(
        collect_session(&mut rx).await,
        vec![
            PlayerEvent::Progress(ms(1000)),
            PlayerEvent::Progress(ms(1500)),
            PlayerEvent::Completed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn completion_rewinds_so_replay_starts_from_zero() {
    let log = new_log();
    let mut player = Player::new(timeline_with("a", ms(1000), &log), ms(500)).unwrap();
    let mut rx = player.subscribe();

    player.play(PlayOptions::default()).await.unwrap();
    collect_session(&mut rx).await;

    player.play(PlayOptions::default()).await.unwrap();
    assert_eq!(rx.recv().await.unwrap(), PlayerEvent::Progress(ms(0)));
    player.stop().await;
}

#[tokio::test(start_paused = true)]
async fn unload_releases_the_whole_tree_exactly_once() {
    let log = new_log();
    let mut inner = Timeline::new();
    inner.push(Leaf::new("b").with_content(Box::new(ScriptedContent::new("b", ms(2000), &log))));
    let mut composition = Composition::new();
    composition.add_region(Region::new("main", serde_json::Value::Null, inner));

    let mut show = Timeline::new();
    show.push(Leaf::new("a").with_content(Box::new(ScriptedContent::new("a", ms(1000), &log))));
    show.push(composition);

    let mut player = Player::new(show, ms(500)).unwrap();
    let mut rx = player.subscribe();
    player.play(PlayOptions::default()).await.unwrap();
    loop {
        if let PlayerEvent::Progress(_) = rx.recv().await.unwrap() {
            break;
        }
    }
    player.stop().await;

    player.unload().await;
    assert_eq!(player.position(), Duration::ZERO);
    let after_first = entries(&log);
    assert!(after_first.contains(&"a:unload".to_string()));
    assert!(after_first.contains(&"b:unload".to_string()));

    // The handles are gone: a second unload reaches no content.
    player.unload().await;
    assert_eq!(entries(&log), after_first);
    assert_eq!(player.position(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn child_failure_surfaces_as_error_event() {
    let log = new_log();
    let mut timeline = Timeline::new();
    timeline.push(Leaf::new("bad").with_content(Box::new(
        ScriptedContent::new("bad", ms(1000), &log).failing_play(),
    )));
    let mut player = Player::new(timeline, ms(500)).unwrap();
    let mut rx = player.subscribe();

    player.play(PlayOptions::default()).await.unwrap();
    let events = collect_session(&mut rx).await;
    match events.last() {
        Some(PlayerEvent::Error(message)) => assert!(message.contains("bad refused play")),
        other => panic!("expected an error event, got {other:?}"),
    }

    player.stop().await;
    assert!(!player.is_playing());
}

#[tokio::test(start_paused = true)]
async fn zero_duration_root_completes_immediately() {
    let mut player = Player::new(Timeline::new(), ms(500)).unwrap();
    let mut rx = player.subscribe();

    player.play(PlayOptions::default()).await.unwrap();
    assert_eq!(rx.recv().await.unwrap(), PlayerEvent::Completed);
    assert!(!player.is_playing());
}
