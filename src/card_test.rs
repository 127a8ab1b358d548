use super::*;
use serde_json::json;

#[test]
fn parses_every_label_in_deck() {
    for card in Card::ALL {
        assert_eq!(card.label().parse::<Card>(), Ok(card));
    }
}

#[test]
fn parse_trims_whitespace() {
    assert_eq!(" 13 ".parse::<Card>(), Ok(Card::Thirteen));
}

#[test]
fn parse_rejects_values_outside_deck() {
    assert!("4".parse::<Card>().is_err());
    assert!("".parse::<Card>().is_err());
    assert!("coffee".parse::<Card>().is_err());
}

#[test]
fn from_json_accepts_integers_for_numeric_cards() {
    assert_eq!(Card::from_json(&json!(5)), Ok(Card::Five));
    assert_eq!(Card::from_json(&json!(100)), Ok(Card::Hundred));
    assert_eq!(Card::from_json(&json!("☕")), Ok(Card::Coffee));
}

#[test]
fn from_json_rejects_non_cards() {
    assert!(Card::from_json(&json!(7)).is_err());
    assert!(Card::from_json(&json!(-1)).is_err());
    assert!(Card::from_json(&json!(2.5)).is_err());
    assert!(Card::from_json(&json!(null)).is_err());
    assert!(Card::from_json(&json!(["5"])).is_err());
}

#[test]
fn serializes_as_label_string() {
    assert_eq!(serde_json::to_value(Card::Eight).unwrap(), json!("8"));
    assert_eq!(serde_json::to_value(Card::Unsure).unwrap(), json!("?"));
}

#[test]
fn deck_order_matches_ord() {
    let mut shuffled = vec![Card::Coffee, Card::Zero, Card::Twenty, Card::Unsure, Card::Three];
    shuffled.sort();
    assert_eq!(shuffled, vec![Card::Zero, Card::Three, Card::Twenty, Card::Unsure, Card::Coffee]);
}
