#![forbid(unsafe_code)]

mod support;

use serde_json::json;
use support::*;

#[test]
fn changing_a_vote_replaces_it_instead_of_adding() {
    let mut server = Server::start_with_items("change_vote", &[5]);

    let added = server.call_ok(
        "tags.add",
        json!({ "item_id": 5, "tag_name": "Graphics", "auth": auth(1) }),
    );
    assert_eq!(added["tag_name"], "graphics");
    assert_eq!(added["vote_value"], 1);
    let tag_id = added["tag_id"].as_i64().expect("tag_id");

    for user in [2, 3] {
        let voted = server.call_ok(
            "tags.vote",
            json!({ "item_id": 5, "tag_id": tag_id, "vote": 1, "auth": auth(user) }),
        );
        assert_eq!(voted["removed"], false);
    }

    let changed = server.call_ok(
        "tags.vote",
        json!({ "package_id": 5, "tag_id": tag_id, "vote": -1, "auth": auth(1) }),
    );
    assert_eq!(changed["vote"], -1);
    assert_eq!(changed["vote_value"], -1);
    assert_eq!(changed["net_score"], 1);
    assert_eq!(changed["removed"], false);

    let listed = server.call_ok("items.tags", json!({ "item_id": 5, "auth": auth(1) }));
    assert_eq!(listed["tags"][0]["net_score"], 1);
    assert_eq!(listed["tags"][0]["user_vote"], -1);
}

#[test]
fn sole_voter_withdrawal_removes_association_and_tag() {
    let mut server = Server::start_with_items("sole_withdrawal", &[7]);

    let added = server.call_ok(
        "tags.add",
        json!({ "item_id": 7, "tag_name": "obsolete", "auth": auth(4) }),
    );
    let tag_id = added["tag_id"].as_i64().expect("tag_id");

    let withdrawn = server.call_ok(
        "tags.vote",
        json!({ "item_id": 7, "tag_id": tag_id, "vote": 0, "auth": auth(4) }),
    );
    assert_eq!(withdrawn["vote"], 0);
    assert_eq!(withdrawn["vote_value"], 0);
    assert_eq!(withdrawn["net_score"], 0);
    assert_eq!(withdrawn["removed"], true);

    let item_tags = server.call_ok("items.tags", json!({ "item_id": 7 }));
    assert!(tag_names(&item_tags).is_empty());
    let catalog = server.call_ok("tags.list", json!({}));
    assert!(!tag_names(&catalog).contains(&"obsolete".to_string()));

    let again = server.call(
        "tags.vote",
        json!({ "item_id": 7, "tag_id": tag_id, "vote": 1, "auth": auth(4) }),
    );
    assert_error(&again, -32004, "not_found");
}

#[test]
fn shared_tag_survives_pruning_on_one_item() {
    let mut server = Server::start_with_items("shared_tag", &[1, 2]);

    let first = server.call_ok(
        "tags.add",
        json!({ "item_id": 1, "tag_name": "cli", "auth": auth(1) }),
    );
    let second = server.call_ok(
        "tags.add",
        json!({ "item_id": 2, "tag_name": " CLI ", "auth": auth(2) }),
    );
    assert_eq!(first["tag_id"], second["tag_id"]);
    let tag_id = first["tag_id"].as_i64().expect("tag_id");

    let pruned = server.call_ok(
        "tags.vote",
        json!({ "item_id": 1, "tag_id": tag_id, "vote": -1, "auth": auth(1) }),
    );
    assert_eq!(pruned["removed"], true);
    assert_eq!(pruned["net_score"], 0);

    let catalog = server.call_ok("tags.list", json!({}));
    let cli = catalog["tags"]
        .as_array()
        .expect("tags")
        .iter()
        .find(|tag| tag["name"] == "cli")
        .expect("cli still listed");
    assert_eq!(cli["id"], tag_id);
    assert_eq!(cli["usage_count"], 1);

    let on_second = server.call_ok("items.tags", json!({ "item_id": 2 }));
    assert_eq!(tag_names(&on_second), vec!["cli".to_string()]);
    assert_eq!(on_second["tags"][0]["user_vote"], 0);
}

#[test]
fn tag_list_orders_by_usage_and_renders_timestamps() {
    let mut server = Server::start_with_items("tag_list", &[1, 2, 3]);

    for item in [1, 2, 3] {
        server.call_ok(
            "tags.add",
            json!({ "item_id": item, "tag_name": "rust", "auth": auth(1) }),
        );
    }
    for name in ["zsh", "async"] {
        server.call_ok(
            "tags.add",
            json!({ "item_id": 1, "tag_name": name, "auth": auth(1) }),
        );
    }

    let catalog = server.call_ok("tags.list", json!({ "limit": 10 }));
    assert_eq!(tag_names(&catalog), vec!["rust", "async", "zsh"]);
    assert_eq!(catalog["tags"][0]["usage_count"], 3);
    let created_at = catalog["tags"][0]["created_at"].as_str().expect("created_at");
    assert!(created_at.ends_with('Z'), "{created_at}");
    assert!(created_at.contains('T'), "{created_at}");

    let limited = server.call_ok("tags.list", json!({ "limit": 1 }));
    assert_eq!(tag_names(&limited), vec!["rust"]);

    let out_of_range = server.call_ok("tags.list", json!({ "limit": 0 }));
    assert_eq!(tag_names(&out_of_range).len(), 3);
}

#[test]
fn invalid_input_is_a_bad_request() {
    let mut server = Server::start_with_items("bad_request", &[1]);

    let blank = server.call(
        "tags.add",
        json!({ "item_id": 1, "tag_name": "   ", "auth": auth(1) }),
    );
    assert_error(&blank, -32602, "bad_request");

    let missing_name = server.call("tags.add", json!({ "item_id": 1, "auth": auth(1) }));
    assert_error(&missing_name, -32602, "bad_request");

    let too_long = server.call(
        "tags.add",
        json!({ "item_id": 1, "tag_name": "x".repeat(65), "auth": auth(1) }),
    );
    assert_error(&too_long, -32602, "bad_request");

    let added = server.call_ok(
        "tags.add",
        json!({ "item_id": 1, "tag_name": "ok", "auth": auth(1) }),
    );
    let tag_id = added["tag_id"].as_i64().expect("tag_id");

    let out_of_range = server.call(
        "tags.vote",
        json!({ "item_id": 1, "tag_id": tag_id, "vote": 2, "auth": auth(1) }),
    );
    assert_error(&out_of_range, -32602, "bad_request");
    assert_eq!(out_of_range["error"]["data"]["status"], 400);

    let wrong_type = server.call(
        "tags.vote",
        json!({ "item_id": "one", "tag_id": tag_id, "vote": 1, "auth": auth(1) }),
    );
    assert_error(&wrong_type, -32602, "bad_request");

    let missing_vote = server.call(
        "tags.vote",
        json!({ "item_id": 1, "tag_id": tag_id, "auth": auth(1) }),
    );
    assert_error(&missing_vote, -32602, "bad_request");

    let negative_item = server.call(
        "items.tags",
        json!({ "item_id": -3 }),
    );
    assert_error(&negative_item, -32602, "bad_request");

    let still_one = server.call_ok("items.tags", json!({ "item_id": 1 }));
    assert_eq!(still_one["tags"][0]["net_score"], 1);
}

#[test]
fn writes_require_an_authenticated_user() {
    let mut server = Server::start_with_items("unauthorized", &[1]);

    let anonymous = server.call("tags.add", json!({ "item_id": 1, "tag_name": "x" }));
    assert_error(&anonymous, -32001, "unauthorized");
    assert_eq!(anonymous["error"]["data"]["status"], 401);

    let zero_user = server.call(
        "tags.vote",
        json!({ "item_id": 1, "tag_id": 1, "vote": 1, "auth": auth(0) }),
    );
    assert_error(&zero_user, -32001, "unauthorized");

    let catalog = server.call_ok("tags.list", json!({}));
    assert!(tag_names(&catalog).is_empty());
}

#[test]
fn missing_targets_are_not_found() {
    let mut server = Server::start_with_items("not_found", &[1]);

    let unknown_item = server.call(
        "tags.add",
        json!({ "item_id": 99, "tag_name": "ghost", "auth": auth(1) }),
    );
    assert_error(&unknown_item, -32004, "not_found");
    assert_eq!(unknown_item["error"]["message"], "Item not found");

    let catalog = server.call_ok("tags.list", json!({}));
    assert!(tag_names(&catalog).is_empty());

    let unknown_tag = server.call(
        "tags.vote",
        json!({ "item_id": 1, "tag_id": 42, "vote": 1, "auth": auth(1) }),
    );
    assert_error(&unknown_tag, -32004, "not_found");
    assert_eq!(unknown_tag["error"]["message"], "Tag not found on item");

    let unknown_listing = server.call("items.tags", json!({ "item_id": 99 }));
    assert_error(&unknown_listing, -32004, "not_found");
}

#[test]
fn protocol_errors_and_notifications() {
    let mut server = Server::start_with_items("protocol", &[1]);

    server.send_line("{ not json");
    let parse_error = server.recv();
    assert_eq!(parse_error["error"]["code"], -32700);
    assert!(parse_error["id"].is_null());

    let unknown = server.call("tags.delete", json!({}));
    assert_error(&unknown, -32601, "method_not_found");

    server.send_line("[1, 2]");
    let invalid = server.recv();
    assert_eq!(invalid["error"]["code"], -32600);

    server.send(json!({
        "jsonrpc": "2.0",
        "method": "tags.add",
        "params": { "item_id": 1, "tag_name": "silent", "auth": auth(1) }
    }));
    let listed = server.call_ok("items.tags", json!({ "item_id": 1 }));
    assert_eq!(tag_names(&listed), vec!["silent".to_string()]);
}
