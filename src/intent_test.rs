use super::*;
use crate::frame::Data;

fn frame(event: &str) -> Frame {
    Frame::new(event, Data::new())
}

#[test]
fn decodes_join() {
    let f = frame("join").with_data("displayName", "Alice").with_data("roomId", "R1");
    assert_eq!(
        Intent::try_from(&f).unwrap(),
        Intent::Join { display_name: "Alice".into(), room_id: "R1".into() }
    );
}

#[test]
fn decodes_legacy_join_room() {
    let f = frame("joinRoom").with_data("username", "Bob").with_data("roomId", "R1");
    assert_eq!(
        Intent::try_from(&f).unwrap(),
        Intent::Join { display_name: "Bob".into(), room_id: "R1".into() }
    );
}

#[test]
fn join_with_empty_fields_still_decodes() {
    let f = frame("join").with_data("displayName", "").with_data("roomId", "");
    assert!(matches!(Intent::try_from(&f), Ok(Intent::Join { .. })));
}

#[test]
fn join_missing_room_is_error() {
    let f = frame("join").with_data("displayName", "Alice");
    assert!(matches!(Intent::try_from(&f), Err(IntentError::MissingField("roomId"))));
}

#[test]
fn join_missing_name_is_error() {
    let f = frame("join").with_data("roomId", "R1");
    assert!(matches!(Intent::try_from(&f), Err(IntentError::MissingField("displayName"))));
}

#[test]
fn decodes_vote_from_label_and_number() {
    let f = frame("vote").with_data("value", "?");
    assert_eq!(Intent::try_from(&f).unwrap(), Intent::Vote(Card::Unsure));

    let f = frame("vote").with_data("value", 13);
    assert_eq!(Intent::try_from(&f).unwrap(), Intent::Vote(Card::Thirteen));
}

#[test]
fn vote_outside_deck_is_error() {
    let f = frame("vote").with_data("value", "7");
    assert!(matches!(Intent::try_from(&f), Err(IntentError::InvalidCard(_))));
}

#[test]
fn vote_without_value_is_error() {
    assert!(matches!(Intent::try_from(&frame("vote")), Err(IntentError::MissingField("value"))));
}

#[test]
fn decodes_reveal_and_reset_with_aliases() {
    assert_eq!(Intent::try_from(&frame("reveal")).unwrap(), Intent::Reveal);
    assert_eq!(Intent::try_from(&frame("revealVotes")).unwrap(), Intent::Reveal);
    assert_eq!(Intent::try_from(&frame("reset")).unwrap(), Intent::Reset);
    assert_eq!(Intent::try_from(&frame("resetVotes")).unwrap(), Intent::Reset);
}

#[test]
fn unknown_event_is_error() {
    assert!(matches!(Intent::try_from(&frame("leave")), Err(IntentError::UnknownEvent(e)) if e == "leave"));
}

#[test]
fn intent_names() {
    assert_eq!(Intent::Reveal.name(), "reveal");
    assert_eq!(Intent::Vote(Card::One).name(), "vote");
}
