// Integration tests for the recognition session controller
//
// These drive the controller with the scripted capability and check state,
// transcript and notifications after each step.

use speech_session::engine::{EngineEvent, RecognitionErrorKind, RecognitionSegment};
use speech_session::{
    Language, MessageKey, NotificationLog, RecognitionController, ScriptedCapability,
    SessionPhase, Severity,
};
use std::sync::Arc;

fn setup(language: Language) -> (ScriptedCapability, NotificationLog, RecognitionController) {
    let capability = ScriptedCapability::new();
    let notifications = NotificationLog::default();
    let controller = RecognitionController::new(
        Arc::new(capability.clone()),
        Arc::new(notifications.clone()),
        language,
    );
    (capability, notifications, controller)
}

fn result(result_index: usize, results: Vec<RecognitionSegment>) -> EngineEvent {
    EngineEvent::Result {
        result_index,
        results,
    }
}

fn error(kind: &str) -> EngineEvent {
    EngineEvent::Error {
        error: RecognitionErrorKind::from(kind),
    }
}

fn fin(text: &str) -> RecognitionSegment {
    RecognitionSegment::final_text(text)
}

fn interim(text: &str) -> RecognitionSegment {
    RecognitionSegment::interim(text)
}

#[test]
fn test_engine_configured_for_continuous_interim_recognition() {
    let (capability, notifications, controller) = setup(Language::Russian);

    assert_eq!(capability.engine_count(), 1);
    let config = capability.config(0).unwrap();
    assert!(config.continuous);
    assert!(config.interim_results);
    assert_eq!(config.language, Language::Russian);

    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert!(!controller.is_listening());
    assert!(controller.transcript().is_empty());
    assert!(notifications.recent().is_empty());
}

#[test]
fn test_start_listening_sets_flags_and_notifies() {
    let (capability, notifications, mut controller) = setup(Language::Kazakh);

    controller.start_listening();

    assert!(controller.is_listening());
    assert!(controller.intends_to_listen());
    assert_eq!(controller.phase(), SessionPhase::Listening);
    assert!(capability.is_running(0));

    let recent = notifications.recent();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].severity, Severity::Success);
    assert_eq!(recent[0].key, MessageKey::ListeningStarted);
    assert_eq!(recent[0].message, "Тыңдау басталды");
}

#[test]
fn test_failed_start_leaves_state_unchanged() {
    let (capability, notifications, mut controller) = setup(Language::Kazakh);
    capability.fail_next_starts(1);

    controller.start_listening();

    assert!(!controller.is_listening());
    assert!(!controller.intends_to_listen());
    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert!(notifications.recent().is_empty());
}

#[test]
fn test_start_while_running_is_refused_by_engine() {
    let (capability, notifications, mut controller) = setup(Language::Kazakh);

    controller.start_listening();
    controller.start_listening();

    assert!(controller.is_listening());
    assert_eq!(capability.start_calls(0), 2);
    assert_eq!(notifications.keys(), vec![MessageKey::ListeningStarted]);
}

#[test]
fn test_stop_listening_notifies_and_does_not_restart() {
    let (capability, notifications, mut controller) = setup(Language::Russian);
    controller.start_listening();

    controller.stop_listening();
    // The scripted engine queues an end event when stopped
    assert_eq!(controller.pump_pending(), 1);

    assert!(!controller.is_listening());
    assert!(!controller.intends_to_listen());
    assert!(!capability.is_running(0));
    assert_eq!(capability.start_calls(0), 1);
    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert_eq!(
        notifications.keys(),
        vec![MessageKey::ListeningStarted, MessageKey::ListeningStopped]
    );
    assert_eq!(notifications.recent()[1].severity, Severity::Info);
    assert_eq!(notifications.recent()[1].message, "Прослушивание остановлено");
}

#[test]
fn test_engine_end_while_intended_restarts_transparently() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();
    capability.emit(result(0, vec![fin("сәлем")]));
    controller.pump_pending();

    // Engine timed out on its own
    assert!(capability.end_session());
    controller.pump_pending();

    assert!(controller.is_listening());
    assert!(controller.intends_to_listen());
    assert_eq!(controller.phase(), SessionPhase::Listening);
    assert_eq!(capability.start_calls(0), 2);
    assert_eq!(controller.transcript(), "сәлем ");
}

#[test]
fn test_failed_restart_clears_intent() {
    let (capability, notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();
    capability.fail_next_starts(1);

    capability.end_session();
    controller.pump_pending();

    assert!(!controller.is_listening());
    assert!(!controller.intends_to_listen());
    assert_eq!(controller.phase(), SessionPhase::Idle);

    // A further end is the terminal path
    capability.end_session();
    controller.pump_pending();
    assert_eq!(capability.start_calls(0), 2);
    assert_eq!(notifications.keys(), vec![MessageKey::ListeningStarted]);
}

#[test]
fn test_every_error_stops_listening() {
    for kind in ["no-speech", "not-allowed", "network", "aborted", "something-new"] {
        let (_capability, _notifications, mut controller) = setup(Language::Russian);
        controller.start_listening();

        controller.handle_event(error(kind));

        assert!(!controller.is_listening(), "error {} should stop listening", kind);
        assert_eq!(controller.phase(), SessionPhase::Idle);
    }
}

#[test]
fn test_no_speech_error_is_informational() {
    let (_capability, notifications, mut controller) = setup(Language::Russian);
    controller.start_listening();

    controller.handle_event(error("no-speech"));

    let last = notifications.recent().pop().unwrap();
    assert_eq!(last.key, MessageKey::NoSpeech);
    assert_eq!(last.severity, Severity::Info);
    assert_eq!(last.message, "Речь не обнаружена");
}

#[test]
fn test_permission_denied_error_asks_for_microphone() {
    let (_capability, notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    controller.handle_event(error("not-allowed"));

    let last = notifications.recent().pop().unwrap();
    assert_eq!(last.key, MessageKey::PermissionDenied);
    assert_eq!(last.severity, Severity::Error);
    assert_eq!(last.message, "Микрофонға рұқсат беріңіз");
}

#[test]
fn test_unclassified_error_is_silent() {
    let (_capability, notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    controller.handle_event(error("network"));

    assert_eq!(notifications.keys(), vec![MessageKey::ListeningStarted]);
}

#[test]
fn test_error_keeps_intent_so_following_end_restarts() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    controller.handle_event(error("no-speech"));
    assert!(controller.intends_to_listen());

    capability.end_session();
    controller.pump_pending();

    assert_eq!(capability.start_calls(0), 2);
    assert_eq!(controller.phase(), SessionPhase::Listening);
    // The caller-visible flag stays as the error left it
    assert!(!controller.is_listening());
}

#[test]
fn test_interim_never_duplicated_and_final_appended_once() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    capability.emit(result(0, vec![fin("hello"), interim("wor")]));
    controller.pump_pending();
    assert_eq!(controller.transcript(), "hello wor");

    capability.emit(result(1, vec![fin("hello"), fin("world")]));
    controller.pump_pending();
    assert_eq!(controller.transcript(), "hello world ");
}

#[test]
fn test_finalized_text_independent_of_interleaved_interims() {
    let (capability, _notifications, mut controller) = setup(Language::Russian);
    controller.start_listening();

    let events = vec![
        result(0, vec![interim("при")]),
        result(0, vec![interim("привет")]),
        result(0, vec![fin("привет"), interim("ка")]),
        result(1, vec![fin("привет"), interim("как де")]),
        result(1, vec![fin("привет"), fin("как дела")]),
        result(2, vec![fin("привет"), fin("как дела"), interim("хорошо")]),
    ];
    for event in events {
        capability.emit(event);
    }
    controller.pump_pending();

    assert_eq!(controller.finalized_transcript(), "привет как дела ");
    assert_eq!(controller.transcript(), "привет как дела хорошо");
}

#[test]
fn test_clear_transcript_leaves_listening_and_engine_alone() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();
    capability.emit(result(0, vec![fin("бір"), interim("екі")]));
    controller.pump_pending();

    controller.clear_transcript();

    assert_eq!(controller.transcript(), "");
    assert!(controller.is_listening());
    assert!(controller.has_engine());
    assert!(capability.is_running(0));
    assert_eq!(capability.stop_calls(0), 0);
}

#[test]
fn test_unavailable_capability_notifies_and_ignores_controls() {
    let capability = ScriptedCapability::unavailable();
    let notifications = NotificationLog::default();
    let mut controller = RecognitionController::new(
        Arc::new(capability.clone()),
        Arc::new(notifications.clone()),
        Language::Russian,
    );

    let recent = notifications.recent();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].key, MessageKey::Unsupported);
    assert_eq!(recent[0].severity, Severity::Error);
    assert_eq!(recent[0].message, "Браузер не поддерживает распознавание речи");

    controller.start_listening();
    controller.stop_listening();
    controller.handle_event(EngineEvent::End);

    assert_eq!(capability.engine_count(), 0);
    assert!(!controller.is_listening());
    assert!(!controller.has_engine());
    assert_eq!(controller.phase(), SessionPhase::Unsupported);
    assert_eq!(notifications.recent().len(), 1);
}

#[test]
fn test_language_change_swaps_engine() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();
    capability.emit(result(0, vec![fin("сәлем")]));
    controller.pump_pending();

    controller.set_language(Language::Russian);

    // Old engine stopped and unsubscribed
    assert!(!capability.is_running(0));
    assert_eq!(capability.stop_calls(0), 1);
    assert!(!capability.is_subscribed(0));
    assert!(!capability.emit_to(0, result(0, vec![fin("stale")])));

    // New engine configured, not started
    assert_eq!(capability.engine_count(), 2);
    assert_eq!(capability.config(1).unwrap().language, Language::Russian);
    assert_eq!(capability.start_calls(1), 0);
    assert!(capability.is_subscribed(1));

    assert_eq!(controller.language(), Language::Russian);
    assert!(!controller.is_listening());
    assert!(!controller.intends_to_listen());
    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert_eq!(controller.transcript(), "сәлем ");

    controller.start_listening();
    capability.emit(result(0, vec![fin("привет")]));
    controller.pump_pending();
    assert_eq!(controller.transcript(), "сәлем привет ");
}

#[test]
fn test_same_language_is_a_no_op() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    controller.set_language(Language::Kazakh);

    assert_eq!(capability.engine_count(), 1);
    assert!(controller.is_listening());
}

#[test]
fn test_notifications_follow_current_language() {
    let (_capability, notifications, mut controller) = setup(Language::Kazakh);

    controller.set_language(Language::Russian);
    controller.start_listening();

    let last = notifications.recent().pop().unwrap();
    assert_eq!(last.language, Language::Russian);
    assert_eq!(last.message, "Прослушивание начато");
}

#[test]
fn test_teardown_releases_engine_and_is_terminal() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    controller.teardown();

    assert_eq!(controller.phase(), SessionPhase::TornDown);
    assert!(!controller.has_engine());
    assert!(!controller.is_listening());
    assert!(!capability.is_running(0));
    assert!(!capability.is_subscribed(0));

    controller.start_listening();
    controller.set_language(Language::Russian);

    assert_eq!(capability.engine_count(), 1);
    assert_eq!(controller.phase(), SessionPhase::TornDown);
}

#[test]
fn test_drop_stops_engine() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();

    drop(controller);

    assert!(!capability.is_running(0));
    assert!(!capability.is_subscribed(0));
}

#[tokio::test]
async fn test_next_event_delivers_queued_events() {
    let (capability, _notifications, mut controller) = setup(Language::Kazakh);
    controller.start_listening();
    capability.emit(result(0, vec![interim("a")]));

    let event = controller.next_event().await;
    controller.handle_event(event);

    assert_eq!(controller.transcript(), "a");
}
