//! In-memory fakes of the GitHub contents API and the Scryfall collection
//! endpoint, mounted on wiremock servers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use collection_sync::Config;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const REPO: &str = "owner/cards";
pub const FILE_PATH: &str = "collection.csv";

/// Nothing listens on port 1, so the rate lookup falls back to 5.0
pub const UNREACHABLE_RATE_URL: &str = "http://127.0.0.1:1/json/last/USD-BRL";

#[derive(Default)]
struct FileState {
    content: Option<String>,
    revision: u32,
    /// Bump the revision right after the next GET, as if another writer
    /// committed between our read and our write
    interfere_after_get: bool,
    puts: usize,
}

impl FileState {
    fn sha(&self) -> Option<String> {
        self.content.as_ref().map(|_| format!("sha-{}", self.revision))
    }
}

/// A single file in a fake repository, honoring the `sha` precondition
#[derive(Clone, Default)]
pub struct FakeContents {
    state: Arc<Mutex<FileState>>,
}

impl FakeContents {
    pub fn with_content(content: &str) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().content = Some(content.to_string());
        fake
    }

    pub fn content(&self) -> Option<String> {
        self.state.lock().unwrap().content.clone()
    }

    pub fn puts(&self) -> usize {
        self.state.lock().unwrap().puts
    }

    pub fn interfere_after_next_get(&self) {
        self.state.lock().unwrap().interfere_after_get = true;
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path(format!("/repos/{REPO}/contents/{FILE_PATH}")))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }
}

impl Respond for FakeContents {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();

        match request.method.as_str() {
            "GET" => {
                let Some(content) = state.content.clone() else {
                    return ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" }));
                };
                let sha = state.sha();
                if state.interfere_after_get {
                    state.interfere_after_get = false;
                    state.revision += 1;
                }
                ResponseTemplate::new(200).set_body_json(json!({
                    "name": FILE_PATH,
                    "sha": sha,
                    "encoding": "base64",
                    "content": STANDARD.encode(content),
                }))
            }
            "PUT" => {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                let sent_sha = body["sha"].as_str().map(str::to_string);
                if sent_sha != state.sha() {
                    let message = match sent_sha {
                        Some(sha) => format!("{FILE_PATH} does not match {sha}"),
                        None => "Invalid request.\n\n\"sha\" wasn't supplied.".to_string(),
                    };
                    return ResponseTemplate::new(409).set_body_json(json!({ "message": message }));
                }

                let encoded = body["content"].as_str().unwrap();
                let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
                let created = state.content.is_none();
                state.content = Some(decoded);
                state.revision += 1;
                state.puts += 1;

                ResponseTemplate::new(if created { 201 } else { 200 })
                    .set_body_json(json!({ "content": { "sha": state.sha() } }))
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Card JSON the way Scryfall returns it
pub fn card_json(set: &str, cn: &str, name: &str, usd: Option<&str>) -> Value {
    json!({
        "id": format!("{set}-{cn}"),
        "name": name,
        "set": set,
        "set_name": format!("Set {}", set.to_uppercase()),
        "set_icon_svg_uri": format!("https://svgs.scryfall.io/sets/{set}.svg"),
        "collector_number": cn,
        "rarity": "rare",
        "released_at": "2024-08-02",
        "cmc": 3.0,
        "type_line": "Creature — Mouse Soldier",
        "mana_cost": "{1}{R}{W}",
        "colors": ["R", "W"],
        "oracle_text": "Haste",
        "power": "3",
        "toughness": "2",
        "prices": { "usd": usd, "usd_foil": null },
        "image_uris": { "normal": format!("https://cards.scryfall.io/{set}/{cn}.jpg") }
    })
}

/// Scryfall with a fixed catalog; unknown identifiers land in `not_found`
#[derive(Clone, Default)]
pub struct FakeScryfall {
    cards: Arc<HashMap<(String, String), Value>>,
}

impl FakeScryfall {
    pub fn new(cards: Vec<Value>) -> Self {
        let cards = cards
            .into_iter()
            .map(|c| {
                let key = (
                    c["set"].as_str().unwrap().to_string(),
                    c["collector_number"].as_str().unwrap().to_string(),
                );
                (key, c)
            })
            .collect();
        Self {
            cards: Arc::new(cards),
        }
    }

    fn lookup(&self, set: &str, cn: &str) -> Option<Value> {
        self.cards.get(&(set.to_string(), cn.to_string())).cloned()
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/cards/collection"))
            .respond_with(CollectionResponder(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/cards/[^/]+/[^/]+$"))
            .respond_with(SingleCardResponder(self.clone()))
            .mount(server)
            .await;
    }
}

struct CollectionResponder(FakeScryfall);

impl Respond for CollectionResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let mut data = Vec::new();
        let mut not_found = Vec::new();
        for id in body["identifiers"].as_array().unwrap() {
            let set = id["set"].as_str().unwrap();
            let cn = id["collector_number"].as_str().unwrap();
            match self.0.lookup(set, cn) {
                Some(card) => data.push(card),
                None => not_found.push(id.clone()),
            }
        }
        ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "not_found": not_found,
            "data": data
        }))
    }
}

struct SingleCardResponder(FakeScryfall);

impl Respond for SingleCardResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request.url.path().trim_start_matches('/').split('/').collect();
        match self.0.lookup(segments[1], segments[2]) {
            Some(card) => ResponseTemplate::new(200).set_body_json(card),
            None => ResponseTemplate::new(404).set_body_json(json!({
                "object": "error",
                "code": "not_found",
                "status": 404,
                "details": "No card found with the given ID or set code and collector number."
            })),
        }
    }
}

/// Config pointing every service at `server`, with the rate lookup failing
pub fn test_config(server_uri: &str) -> Config {
    Config {
        repo: REPO.to_string(),
        path: FILE_PATH.to_string(),
        token: Some("test_token".to_string()),
        scryfall_url: server_uri.to_string(),
        github_url: server_uri.to_string(),
        rate_url: UNREACHABLE_RATE_URL.to_string(),
        batch_delay: Duration::ZERO,
        ..Config::default()
    }
}
