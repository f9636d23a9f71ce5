use crate::common::{cache_of, journal, messages_of, Journal, RecordingChannel};
use membridge::editor::EditorMessage::{
    GoToOffset, PopDisplayedOffset, SetFocusedByte, StashDisplayedOffset,
};
use membridge::editor::ViewId;
use membridge::interceptor::VariableCache;
use membridge::navigator::{
    CommitAction, Navigator, OffsetPrompt, PickItem, SessionState, VariablePicker,
    NO_VARIABLES_PLACEHOLDER, SELECT_VARIABLE_PLACEHOLDER,
};
use membridge::offset::OffsetOrigin;
use membridge::registry::{ActiveDocument, EditorRegistry};

const PAGE: u64 = 4096;

fn picker(journal: &Journal, base_address: u64, cache: &VariableCache) -> VariablePicker {
    let mut picker =
        VariablePicker::new(RecordingChannel::new(1, journal), base_address, cache, PAGE);
    picker.show();
    picker
}

#[test]
fn test_nearby_variable_is_focused_in_place() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x1000"))]);
    let mut picker = picker(&journal, 0x0FF0, &cache);

    picker.highlight(0);
    let action = picker.on_accept();
    picker.on_hide();

    assert_eq!(action, Some(CommitAction::Focused(4096)));
    assert_eq!(picker.state(), SessionState::Committed);
    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 4096 },
            SetFocusedByte { offset: 4096 },
        ]
    );
}

#[test]
fn test_page_distance_boundary() {
    struct TestCase {
        reference: &'static str,
        base_address: u64,
        expected: CommitAction,
    }

    let cases = [
        TestCase {
            reference: "0x1000",
            base_address: 0,
            expected: CommitAction::Focused(4096),
        },
        TestCase {
            reference: "0x1001",
            base_address: 0,
            expected: CommitAction::OpenMemoryView(4097),
        },
        TestCase {
            reference: "0",
            base_address: 4096,
            expected: CommitAction::Focused(0),
        },
        TestCase {
            reference: "0",
            base_address: 4097,
            expected: CommitAction::OpenMemoryView(0),
        },
        TestCase {
            reference: "0xffffffffffffffff",
            base_address: 0,
            expected: CommitAction::OpenMemoryView(u64::MAX),
        },
    ];

    for tc in cases {
        let journal = journal();
        let cache = cache_of(&[("v", Some(tc.reference))]);
        let mut picker = picker(&journal, tc.base_address, &cache);
        picker.highlight(0);
        assert_eq!(picker.on_accept(), Some(tc.expected), "reference: {}", tc.reference);

        let focused = messages_of(&journal, 1)
            .into_iter()
            .any(|msg| matches!(msg, SetFocusedByte { .. }));
        assert_eq!(focused, matches!(tc.expected, CommitAction::Focused(_)));
    }
}

#[test]
fn test_decimal_reference_same_as_hex() {
    let journal = journal();
    let cache = cache_of(&[("hex", Some("0x1000")), ("dec", Some("4096"))]);
    let mut picker = picker(&journal, 0, &cache);

    picker.highlight(0);
    let hex = picker.last_value().unwrap();
    picker.highlight(1);
    let dec = picker.last_value().unwrap();

    assert_eq!(hex, dec);
    assert_eq!(hex.offset, 4096);
    assert_eq!(hex.origin, OffsetOrigin::VariableReference);
    assert_eq!(picker.on_accept(), Some(CommitAction::Focused(4096)));
}

#[test]
fn test_dismiss_without_highlight() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x1000"))]);
    let mut picker = picker(&journal, 0, &cache);

    picker.on_hide();
    picker.on_hide();

    assert_eq!(picker.state(), SessionState::Cancelled);
    assert_eq!(
        messages_of(&journal, 1),
        vec![StashDisplayedOffset, PopDisplayedOffset]
    );
}

#[test]
fn test_dismiss_after_preview_restores_offset() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x20")), ("y", Some("0x40"))]);
    let mut picker = picker(&journal, 0, &cache);

    picker.highlight(0);
    picker.highlight(1);
    picker.on_hide();

    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 0x20 },
            GoToOffset { offset: 0x40 },
            PopDisplayedOffset,
        ]
    );
}

#[test]
fn test_unresolvable_reference_keeps_last_value() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x20")), ("ptr", Some("&x"))]);
    let mut picker = picker(&journal, 0, &cache);

    picker.highlight(0);
    picker.highlight(1);
    assert_eq!(picker.last_value().map(|v| v.offset), Some(0x20));

    assert_eq!(picker.on_accept(), Some(CommitAction::Focused(0x20)));
    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 0x20 },
            SetFocusedByte { offset: 0x20 },
        ]
    );
}

#[test]
fn test_missing_reference_clears_preview() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x20")), ("reg", None)]);
    let mut picker = picker(&journal, 0, &cache);

    picker.highlight(0);
    picker.highlight(1);
    assert_eq!(picker.last_value(), None);

    picker.highlight(0);
    picker.on_active_changed(None);
    assert_eq!(picker.last_value(), None);

    // nothing to commit: accept is a non-committed exit
    assert_eq!(picker.on_accept(), None);
    assert_eq!(picker.state(), SessionState::Cancelled);
    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 0x20 },
            GoToOffset { offset: 0x20 },
            PopDisplayedOffset,
        ]
    );
}

#[test]
fn test_drop_while_prompting_pops_once() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x20"))]);
    {
        let mut picker = picker(&journal, 0, &cache);
        picker.highlight(0);
    }
    {
        let mut picker = picker(&journal, 0, &cache);
        picker.on_hide();
    }

    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 0x20 },
            PopDisplayedOffset,
            StashDisplayedOffset,
            PopDisplayedOffset,
        ]
    );
}

#[test]
fn test_finished_picker_ignores_input() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x20")), ("y", Some("0x30"))]);
    let mut picker = picker(&journal, 0, &cache);
    picker.highlight(0);
    picker.on_accept();

    picker.highlight(1);
    assert_eq!(picker.on_accept(), None);
    picker.on_hide();
    drop(picker);

    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 0x20 },
            SetFocusedByte { offset: 0x20 },
        ]
    );
}

#[test]
fn test_abort_commit_pops_once() {
    let journal = journal();
    let cache = cache_of(&[("buf", Some("0x10000"))]);
    let mut picker = picker(&journal, 0, &cache);
    picker.abort_commit();
    assert_eq!(picker.state(), SessionState::Prompting);

    picker.highlight(0);
    assert_eq!(picker.on_accept(), Some(CommitAction::OpenMemoryView(0x10000)));
    picker.abort_commit();
    picker.abort_commit();
    assert_eq!(picker.state(), SessionState::Cancelled);
    drop(picker);

    assert_eq!(
        messages_of(&journal, 1),
        vec![
            StashDisplayedOffset,
            GoToOffset { offset: 0x10000 },
            PopDisplayedOffset,
        ]
    );
}

#[test]
fn test_idle_picker_posts_nothing() {
    let journal = journal();
    let cache = cache_of(&[("x", Some("0x20"))]);
    let mut picker = VariablePicker::new(RecordingChannel::new(1, &journal), 0, &cache, PAGE);
    picker.highlight(0);
    assert_eq!(picker.on_accept(), None);
    drop(picker);

    assert!(journal.borrow().is_empty());
}

#[test]
fn test_picker_items() {
    let journal = journal();
    let empty = picker(&journal, 0, &VariableCache::new());
    assert!(empty.items().is_empty());
    assert_eq!(empty.placeholder(), NO_VARIABLES_PLACEHOLDER);

    let cache = cache_of(&[("x", Some("0x20")), ("reg", None)]);
    let picker = picker(&journal, 0, &cache);
    assert_eq!(picker.placeholder(), SELECT_VARIABLE_PLACEHOLDER);
    assert_eq!(
        picker.items(),
        &[
            PickItem {
                label: "x".to_string(),
                description: Some("0x20".to_string()),
            },
            PickItem {
                label: "reg".to_string(),
                description: None,
            },
        ]
    );
}

#[test]
fn test_offset_prompt() {
    let journal = journal();
    let mut prompt = OffsetPrompt::new(RecordingChannel::new(1, &journal));

    assert!(prompt.on_input_changed("0x1z").is_some());
    assert!(!prompt.submit("0x1z"));
    assert!(!prompt.submit("-5"));
    assert_eq!(prompt.state(), SessionState::Prompting);
    assert!(journal.borrow().is_empty());

    assert!(prompt.submit("0X1F"));
    assert_eq!(prompt.state(), SessionState::Committed);
    assert!(!prompt.submit("10"));
    assert_eq!(messages_of(&journal, 1), vec![SetFocusedByte { offset: 0x1f }]);
}

#[test]
fn test_offset_prompt_cancel() {
    let journal = journal();
    let mut prompt = OffsetPrompt::new(RecordingChannel::new(1, &journal));
    prompt.on_hide();
    assert_eq!(prompt.state(), SessionState::Cancelled);
    assert!(!prompt.submit("10"));
    assert!(journal.borrow().is_empty());
}

#[test]
fn test_navigator_channel_resolution() {
    let journal = journal();
    let navigator = Navigator::new(PAGE);
    let mut registry = EditorRegistry::new();
    let cache = cache_of(&[("x", Some("0x20"))]);

    assert!(navigator.go_to_offset(&registry).is_none());
    assert!(navigator.go_to_variable(&registry, &cache).is_none());

    registry.register_with_document(
        ViewId::from(1),
        RecordingChannel::new(1, &journal),
        ActiveDocument {
            base_address: 0x10_0000,
            uri: None,
        },
    );
    registry.register(ViewId::from(2), RecordingChannel::new(2, &journal));

    // nothing focused yet: first registered view is used
    let mut prompt = navigator.go_to_offset(&registry).unwrap();
    prompt.submit("1");
    assert_eq!(messages_of(&journal, 1), vec![SetFocusedByte { offset: 1 }]);

    registry.set_active(ViewId::from(2));
    let picker = navigator.go_to_variable(&registry, &cache).unwrap();
    assert_eq!(picker.state(), SessionState::Prompting);
    assert_eq!(picker.base_address(), 0);
    assert_eq!(messages_of(&journal, 2), vec![StashDisplayedOffset]);

    registry.set_active(ViewId::from(1));
    let mut picker = navigator.go_to_variable(&registry, &cache).unwrap();
    assert_eq!(picker.base_address(), 0x10_0000);
    picker.highlight(0);
    assert_eq!(picker.on_accept(), Some(CommitAction::OpenMemoryView(0x20)));
}
