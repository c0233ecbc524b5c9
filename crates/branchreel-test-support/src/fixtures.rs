//! Story fixtures.

use branchreel_content::domain::document::StoryDocument;

/// A small story exercising every interaction kind.
///
/// * `intro` offers three choices; "Wait" has no target and ends the run.
/// * `bridge` is a 2s button check; `far_side` a 2s timing check.
/// * `cave` is a 3s A-S-D sequence check.
/// * `collapse` offers a choice pointing at the missing `hidden_room`.
/// * `broken` is a check with a zero duration.
/// * `river`, `treasure` and `ending_good` are terminal.
pub const SAMPLE_STORY_JSON: &str = r#"{
  "meta": {
    "title": "The Crossing",
    "mediaBase": "https://cdn.example.test/crossing",
    "startNodeId": "intro"
  },
  "nodes": [
    {
      "id": "intro",
      "mediaRef": "intro.mp4",
      "prompt": "Which way?",
      "choices": [
        { "label": "Left", "next": "bridge" },
        { "label": "Right", "next": "cave" },
        { "label": "Wait", "next": "" }
      ]
    },
    {
      "id": "bridge",
      "mediaRef": "bridge.mp4",
      "qte": { "kind": "button", "duration": 2.0, "successNext": "far_side", "failNext": "river" }
    },
    {
      "id": "far_side",
      "mediaRef": "far_side.mp4",
      "qte": { "kind": "timing", "duration": 2.0, "successNext": "ending_good", "failNext": "river" }
    },
    {
      "id": "cave",
      "mediaRef": "cave.mp4",
      "qte": {
        "kind": "sequence",
        "duration": 3.0,
        "sequence": ["A", "S", "D"],
        "successNext": "treasure",
        "failNext": "collapse"
      }
    },
    {
      "id": "collapse",
      "mediaRef": "collapse.mp4",
      "prompt": "The roof gives way.",
      "choices": [
        { "label": "Dig out", "next": "cave" },
        { "label": "Crawl deeper", "next": "hidden_room" }
      ]
    },
    {
      "id": "broken",
      "qte": { "kind": "button", "duration": 0, "successNext": "ending_good", "failNext": "river" }
    },
    { "id": "river", "mediaRef": "river.mp4" },
    { "id": "treasure", "mediaRef": "treasure.mp4" },
    { "id": "ending_good", "mediaRef": "ending_good.mp4" }
  ]
}"#;

/// Parses [`SAMPLE_STORY_JSON`].
///
/// # Panics
///
/// Panics if the fixture does not parse.
#[must_use]
pub fn sample_document() -> StoryDocument {
    serde_json::from_str(SAMPLE_STORY_JSON).expect("sample story fixture must parse")
}
