mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn bookmark_lifecycle() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup(server, &common::unique_email("life"), "123").await?;

    let empty: Value = client
        .get(server.url("/bookmarks"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(empty["data"], json!([]));

    let res = client
        .post(server.url("/bookmarks"))
        .bearer_auth(&token)
        .json(&json!({ "title": "First Bookmark", "link": "Link1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["data"]["id"].as_i64().expect("bookmark id");
    assert_eq!(created["data"]["title"], "First Bookmark");
    assert!(created["data"]["description"].is_null());

    let list: Value = client
        .get(server.url("/bookmarks"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));

    let res = client
        .get(server.url(&format!("/bookmarks/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(server.url(&format!("/bookmarks/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "description": "Read later" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let edited: Value = res.json().await?;
    assert_eq!(edited["data"]["description"], "Read later");
    assert_eq!(edited["data"]["title"], "First Bookmark");

    let res = client
        .delete(server.url(&format!("/bookmarks/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    let res = client
        .get(server.url(&format!("/bookmarks/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn foreign_bookmarks_look_absent() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let owner = common::signup(server, &common::unique_email("owner"), "123").await?;
    let intruder = common::signup(server, &common::unique_email("intruder"), "123").await?;

    let created: Value = client
        .post(server.url("/bookmarks"))
        .bearer_auth(&owner)
        .json(&json!({ "title": "Private", "link": "https://example.com" }))
        .send()
        .await?
        .json()
        .await?;
    let id = created["data"]["id"].as_i64().expect("bookmark id");
    let path = server.url(&format!("/bookmarks/{}", id));

    let get = client.get(&path).bearer_auth(&intruder).send().await?;
    let patch = client
        .patch(&path)
        .bearer_auth(&intruder)
        .json(&json!({ "title": "Mine now" }))
        .send()
        .await?;
    let delete = client.delete(&path).bearer_auth(&intruder).send().await?;
    let missing = client
        .get(server.url("/bookmarks/999999999"))
        .bearer_auth(&intruder)
        .send()
        .await?;

    assert_eq!(get.status(), StatusCode::NOT_FOUND);
    assert_eq!(patch.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let listed: Value = client
        .get(server.url("/bookmarks"))
        .bearer_auth(&intruder)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed["data"], json!([]));

    // owner's copy is untouched
    let mine: Value = client.get(&path).bearer_auth(&owner).send().await?.json().await?;
    assert_eq!(mine["data"]["title"], "Private");
    Ok(())
}

#[tokio::test]
async fn bookmark_input_is_validated() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::signup(server, &common::unique_email("valid"), "123").await?;

    let res = client
        .post(server.url("/bookmarks"))
        .bearer_auth(&token)
        .json(&json!({ "title": "No link" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await?;
    assert!(err["field_errors"]["link"].is_string());

    let res = client
        .get(server.url("/bookmarks/abc"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .patch(server.url("/bookmarks/1"))
        .bearer_auth(&token)
        .json(&json!({ "title": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
