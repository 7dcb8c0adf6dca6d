//! Property-based tests for the conversation state machine
//!
//! Drives the pure transition function with arbitrary event sequences and
//! folds `AppendMessage` effects into a timeline, the way the runtime does.

use super::*;
use crate::gateway::ChatExchange;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn at(offset: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(offset)
}

/// Minimal executor: applies a transition and folds effects
struct Harness {
    context: ConvContext,
    state: ConvState,
    timeline: Timeline,
    sends: usize,
}

impl Harness {
    fn new() -> Self {
        Self {
            context: ConvContext::default(),
            state: ConvState::default(),
            timeline: Timeline::new(),
            sends: 0,
        }
    }

    fn ready() -> Self {
        let mut harness = Self::new();
        harness.apply(Event::Initialize);
        harness.apply(Event::InitialDataLoaded {
            welcome: Some("Hi".to_string()),
            history: None,
            at: at(0),
        });
        harness
    }

    fn apply(&mut self, event: Event) -> bool {
        match transition(&self.state, &self.context, event) {
            Ok(result) => {
                self.state = result.new_state;
                for effect in result.effects {
                    match effect {
                        Effect::AppendMessage(message) => self.timeline.push(message),
                        Effect::SendMessage { .. } => self.sends += 1,
                        Effect::LoadInitialData { .. } => {}
                    }
                }
                true
            }
            Err(_) => false,
        }
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_blank() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 0..6)
        .prop_map(|chars| chars.into_iter().collect())
}

fn arb_exchange() -> impl Strategy<Value = ChatExchange> {
    ("[a-z?]{1,12}", "[a-z.]{1,12}", 0i64..10_000).prop_map(|(user, bot, secs)| ChatExchange {
        id: None,
        user_text: user,
        bot_text: bot,
        timestamp: at(secs),
    })
}

/// History as the server returns it: newest first
fn arb_history() -> impl Strategy<Value = Vec<ChatExchange>> {
    prop::collection::vec(arb_exchange(), 0..10).prop_map(|mut chats| {
        chats.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        chats
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Initialize),
        ("[a-zA-Z ]{0,20}", 0i64..100).prop_map(|(text, s)| Event::UserSubmit { text, at: at(s) }),
        ("[a-z ]{1,20}", 0i64..100)
            .prop_map(|(text, s)| Event::ReplyReceived { text, timestamp: at(s) }),
        (proptest::option::of("[a-z ]{0,20}"), 0i64..100)
            .prop_map(|(detail, s)| Event::ReplyFailed { detail, at: at(s) }),
        (
            proptest::option::of("[a-z ]{0,10}"),
            proptest::option::of(arb_history()),
        )
            .prop_map(|(welcome, history)| Event::InitialDataLoaded {
                welcome,
                history,
                at: at(0),
            }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Blank submissions never touch the timeline or the network
    #[test]
    fn blank_submit_is_noop(blanks in prop::collection::vec(arb_blank(), 1..8)) {
        let mut harness = Harness::ready();
        let before = harness.timeline.clone();

        for (text, offset) in blanks.into_iter().zip(1i64..) {
            let accepted = harness.apply(Event::UserSubmit { text, at: at(offset) });
            prop_assert!(!accepted);
        }

        prop_assert_eq!(&harness.timeline, &before);
        prop_assert_eq!(harness.sends, 0);
        prop_assert_eq!(&harness.state, &ConvState::Ready);
    }

    /// Whatever the gateway returned, initialization ends Ready with a non-empty timeline
    #[test]
    fn initialize_always_seeds_timeline(
        welcome in proptest::option::of("[a-z ]{0,10}"),
        history in proptest::option::of(arb_history()),
    ) {
        let mut harness = Harness::new();
        prop_assert!(harness.apply(Event::Initialize));
        let loaded = harness.apply(Event::InitialDataLoaded { welcome, history, at: at(0) });
        prop_assert!(loaded);

        prop_assert_eq!(&harness.state, &ConvState::Ready);
        prop_assert!(!harness.timeline.is_empty());
        prop_assert_eq!(harness.timeline.messages()[0].role(), Role::Bot);
    }

    /// Every exchange becomes user then bot, sharing a timestamp, oldest first
    #[test]
    fn history_expansion_preserves_pairing(history in arb_history()) {
        let messages = expand_history(history.clone());
        prop_assert_eq!(messages.len(), history.len() * 2);

        for (pair, exchange) in messages.chunks(2).zip(history.iter().rev()) {
            prop_assert_eq!(pair[0].role(), Role::User);
            prop_assert_eq!(pair[1].role(), Role::Bot);
            prop_assert_eq!(pair[0].text(), exchange.user_text.as_str());
            prop_assert_eq!(pair[1].text(), exchange.bot_text.as_str());
            prop_assert_eq!(pair[0].timestamp(), pair[1].timestamp());
        }

        let stamps: Vec<_> = messages.iter().map(Message::timestamp).collect();
        prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    /// The timeline only ever grows, and existing entries never change
    #[test]
    fn timeline_is_append_only(events in prop::collection::vec(arb_event(), 0..30)) {
        let mut harness = Harness::new();
        for event in events {
            let before = harness.timeline.clone();
            harness.apply(event);
            prop_assert!(harness.timeline.len() >= before.len());
            prop_assert_eq!(&harness.timeline.messages()[..before.len()], before.messages());
        }
    }

    /// At most one send is outstanding: sends minus replies is 0 or 1, and 1 only when Pending
    #[test]
    fn at_most_one_send_in_flight(events in prop::collection::vec(arb_event(), 0..30)) {
        let mut harness = Harness::ready();
        let mut resolved = 0usize;
        for event in events {
            let is_reply = matches!(event, Event::ReplyReceived { .. } | Event::ReplyFailed { .. });
            if harness.apply(event) && is_reply {
                resolved += 1;
            }
            let outstanding = harness.sends - resolved;
            prop_assert!(outstanding <= 1);
            prop_assert_eq!(outstanding == 1, harness.state.is_pending());
        }
    }

    /// Each accepted submit is eventually answered by exactly one bot message
    #[test]
    fn every_turn_resolves_with_bot_message(
        text in "[a-z]{1,10}",
        detail in proptest::option::of("[ a-z]{0,10}"),
        fails in any::<bool>(),
    ) {
        let mut harness = Harness::ready();
        let start = harness.timeline.len();

        let submitted = harness.apply(Event::UserSubmit { text, at: at(1) });
        prop_assert!(submitted);
        let reply = if fails {
            Event::ReplyFailed { detail, at: at(2) }
        } else {
            Event::ReplyReceived { text: "ok".to_string(), timestamp: at(2) }
        };
        prop_assert!(harness.apply(reply));

        prop_assert_eq!(harness.timeline.len(), start + 2);
        let last = harness.timeline.last().unwrap();
        prop_assert_eq!(last.role(), Role::Bot);
        prop_assert!(!last.text().trim().is_empty());
        prop_assert_eq!(&harness.state, &ConvState::Ready);
    }
}

#[test]
fn welcome_and_single_exchange_scenario() {
    let t = at(42);
    let mut harness = Harness::new();
    harness.apply(Event::Initialize);
    harness.apply(Event::InitialDataLoaded {
        welcome: Some("Hi".to_string()),
        history: Some(vec![ChatExchange {
            id: None,
            user_text: "Q".to_string(),
            bot_text: "A".to_string(),
            timestamp: t,
        }]),
        at: at(100),
    });

    let summary: Vec<_> = harness
        .timeline
        .messages()
        .iter()
        .map(|m| (m.role(), m.text().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Role::Bot, "Hi".to_string()),
            (Role::User, "Q".to_string()),
            (Role::Bot, "A".to_string()),
        ]
    );
    assert_eq!(harness.timeline.messages()[1].timestamp(), t);
    assert_eq!(harness.timeline.messages()[2].timestamp(), t);
}

#[test]
fn quick_questions_only_before_first_turn() {
    let mut harness = Harness::ready();
    assert_eq!(harness.timeline.quick_questions(), &QUICK_QUESTIONS);

    harness.apply(Event::UserSubmit {
        text: QUICK_QUESTIONS[0].to_string(),
        at: at(1),
    });
    assert!(harness.timeline.quick_questions().is_empty());
}
